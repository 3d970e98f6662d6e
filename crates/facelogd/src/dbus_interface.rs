//! D-Bus surface for the facelog daemon.
//!
//! Bus name: dev.facelog.Facelog1
//! Object path: /dev/facelog/Facelog1
//!
//! Results cross the bus as JSON strings; the pipeline itself is
//! blocking (subprocess + SQLite), so every handler hops to the
//! blocking pool.

use std::sync::Arc;

use zbus::interface;

use crate::service::{Facelog, ServiceError};

pub struct FacelogService {
    facelog: Arc<Facelog>,
    history_limit: u32,
    gallery_limit: u32,
}

impl FacelogService {
    pub fn new(facelog: Arc<Facelog>, history_limit: u32, gallery_limit: u32) -> Self {
        Self {
            facelog,
            history_limit,
            gallery_limit,
        }
    }
}

/// Validation failures map to InvalidArgs so clients can tell their own
/// mistakes from server-side failures.
fn to_fdo(err: ServiceError) -> zbus::fdo::Error {
    if err.is_client_error() {
        zbus::fdo::Error::InvalidArgs(err.to_string())
    } else {
        tracing::error!(error = %err, "request failed");
        zbus::fdo::Error::Failed(err.to_string())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> zbus::fdo::Result<String> {
    serde_json::to_string(value).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
}

#[interface(name = "dev.facelog.Facelog1")]
impl FacelogService {
    /// Register a face image for `username`. Returns the registration
    /// result as JSON.
    async fn register(
        &self,
        image: Vec<u8>,
        extension: String,
        username: String,
    ) -> zbus::fdo::Result<String> {
        tracing::info!(username, bytes = image.len(), "register requested");
        let facelog = self.facelog.clone();
        let result = tokio::task::spawn_blocking(move || {
            facelog.register(&image, &extension, &username)
        })
        .await
        .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        to_json(&result.map_err(to_fdo)?)
    }

    /// Identify the person in a probe image. Returns a `status`-tagged
    /// JSON object: `no_faces`, `match_found` or `no_match`.
    async fn identify(&self, image: Vec<u8>, extension: String) -> zbus::fdo::Result<String> {
        tracing::info!(bytes = image.len(), "identify requested");
        let facelog = self.facelog.clone();
        let result =
            tokio::task::spawn_blocking(move || facelog.identify(&image, &extension))
                .await
                .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        to_json(&result.map_err(to_fdo)?)
    }

    /// Recent registrations as JSON, newest first. `limit` 0 means the
    /// configured default.
    async fn gallery(&self, limit: u32) -> zbus::fdo::Result<String> {
        let limit = if limit == 0 { self.gallery_limit } else { limit };
        let facelog = self.facelog.clone();
        let records = tokio::task::spawn_blocking(move || facelog.recent_registrations(limit))
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?
            .map_err(to_fdo)?;
        to_json(&records)
    }

    /// Recent identification attempts as JSON, newest first. `limit` 0
    /// means the configured default.
    async fn history(&self, limit: u32) -> zbus::fdo::Result<String> {
        let limit = if limit == 0 { self.history_limit } else { limit };
        let facelog = self.facelog.clone();
        let records = tokio::task::spawn_blocking(move || facelog.recent_history(limit))
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?
            .map_err(to_fdo)?;
        to_json(&records)
    }

    /// Daemon status information.
    async fn status(&self) -> zbus::fdo::Result<String> {
        let facelog = self.facelog.clone();
        let matchable = tokio::task::spawn_blocking(move || facelog.matchable_faces())
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?
            .map_err(to_fdo)?;
        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "matchable_faces": matchable,
        })
        .to_string())
    }
}
