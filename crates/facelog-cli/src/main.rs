use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

// `#[zbus::proxy]` generates `FacelogProxy` (async) against facelogd's
// session-bus interface.
#[zbus::proxy(
    interface = "dev.facelog.Facelog1",
    default_service = "dev.facelog.Facelog1",
    default_path = "/dev/facelog/Facelog1"
)]
trait Facelog {
    async fn register(
        &self,
        image: Vec<u8>,
        extension: &str,
        username: &str,
    ) -> zbus::Result<String>;
    async fn identify(&self, image: Vec<u8>, extension: &str) -> zbus::Result<String>;
    async fn gallery(&self, limit: u32) -> zbus::Result<String>;
    async fn history(&self, limit: u32) -> zbus::Result<String>;
    async fn status(&self) -> zbus::Result<String>;
}

#[derive(Parser)]
#[command(name = "facelog", about = "Face registration and identification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a user's face image
    Register {
        /// Username to attach to this face
        #[arg(short, long)]
        username: String,
        /// Image file (.jpg, .jpeg or .png)
        image: PathBuf,
    },
    /// Identify the person in a probe image
    Identify {
        /// Image file (.jpg, .jpeg or .png)
        image: PathBuf,
    },
    /// List recent registrations
    Gallery {
        /// Maximum rows (0 = server default)
        #[arg(short, long, default_value_t = 0)]
        limit: u32,
    },
    /// List recent identification attempts
    History {
        /// Maximum rows (0 = server default)
        #[arg(short, long, default_value_t = 0)]
        limit: u32,
    },
    /// Show daemon status
    Status,
}

/// Read the upload and its extension; the daemon re-validates both.
fn load_image(path: &Path) -> Result<(Vec<u8>, String)> {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy().into_owned()) else {
        bail!("{} has no file extension", path.display());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok((bytes, ext))
}

/// Re-indent the daemon's compact JSON for the terminal.
fn print_json(raw: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let conn = zbus::Connection::session()
        .await
        .context("failed to connect to the session bus (is facelogd running?)")?;
    let proxy = FacelogProxy::new(&conn).await?;

    match cli.command {
        Commands::Register { username, image } => {
            let (bytes, ext) = load_image(&image)?;
            let result = proxy.register(bytes, &ext, &username).await?;
            print_json(&result)?;
        }
        Commands::Identify { image } => {
            let (bytes, ext) = load_image(&image)?;
            let result = proxy.identify(bytes, &ext).await?;
            print_json(&result)?;
        }
        Commands::Gallery { limit } => {
            print_json(&proxy.gallery(limit).await?)?;
        }
        Commands::History { limit } => {
            print_json(&proxy.history(limit).await?)?;
        }
        Commands::Status => {
            print_json(&proxy.status().await?)?;
        }
    }

    Ok(())
}
