use std::sync::Arc;

use anyhow::Result;
use facelog_core::CommandExtractor;
use tracing_subscriber::EnvFilter;

mod blob;
mod config;
mod dbus_interface;
mod service;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("facelogd starting");

    let config = config::Config::from_env();
    let (gallery, history) = facelog_store::open(&config.db_path)?;
    tracing::info!(db = %config.db_path.display(), "database opened");

    let vault = blob::ImageVault::new(&config.gallery_dir, &config.probe_dir)?;
    tracing::info!(
        gallery_dir = %config.gallery_dir.display(),
        probe_dir = %config.probe_dir.display(),
        "image vault ready"
    );

    let extractor = CommandExtractor::from_command_line(&config.encoder_command);
    tracing::info!(encoder = %config.encoder_command, "encoder configured");

    let facelog = Arc::new(service::Facelog::new(
        vault,
        gallery,
        history,
        Box::new(extractor),
    ));
    let dbus_service = dbus_interface::FacelogService::new(
        facelog,
        config.history_limit,
        config.gallery_limit,
    );

    let _conn = zbus::connection::Builder::session()?
        .name("dev.facelog.Facelog1")?
        .serve_at("/dev/facelog/Facelog1", dbus_service)?
        .build()
        .await?;

    tracing::info!("facelogd ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("facelogd shutting down");

    Ok(())
}
