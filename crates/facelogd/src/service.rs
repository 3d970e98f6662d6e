//! Registration and identification workflows.
//!
//! Both workflows share the same front half: validate the upload, persist
//! the image bytes, run the external encoder. Validation failures reject
//! before any side effect; after the image file is written there is no
//! compensating delete if a later step fails, so a failed database insert
//! can leave an orphaned (and unreferenced) file behind. That gap is
//! accepted, not fixed here.

use facelog_core::{
    match_probe, ExtractorError, MatchOutcome, SignatureError, SignatureExtractor,
};
use facelog_store::{GalleryRecord, GalleryStore, HistorySearch, HistoryStore, StorageError};
use serde::Serialize;
use thiserror::Error;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid file extension (accepted: .jpg, .jpeg, .png)")]
    InvalidExtension,
    #[error("upload is not a decodable image")]
    InvalidImage,
    #[error("failed to store image: {0}")]
    Blob(#[from] std::io::Error),
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl ServiceError {
    /// Validation errors are the caller's fault; everything else is ours.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidExtension | Self::InvalidImage)
    }
}

/// Result of a registration.
#[derive(Debug, Serialize)]
pub struct Registration {
    pub image: String,
    pub username: String,
    pub faces_detected: usize,
}

/// Result of an identification. The three outcomes are distinct on the
/// wire (`status` tag) and must never be conflated.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Identification {
    NoFaces {
        probe_image: String,
    },
    MatchFound {
        matched_username: String,
        confidence: f64,
        matched_image_id: i64,
        probe_image: String,
    },
    NoMatch {
        probe_image: String,
    },
}

/// The service object: owns the blob vault, both stores and the encoder
/// adapter. Stateless between calls; safe to share behind an `Arc`.
pub struct Facelog {
    vault: crate::blob::ImageVault,
    gallery: GalleryStore,
    history: HistoryStore,
    extractor: Box<dyn SignatureExtractor>,
}

impl Facelog {
    pub fn new(
        vault: crate::blob::ImageVault,
        gallery: GalleryStore,
        history: HistoryStore,
        extractor: Box<dyn SignatureExtractor>,
    ) -> Self {
        Self {
            vault,
            gallery,
            history,
            extractor,
        }
    }

    /// Register a user's face image.
    ///
    /// An image with no detectable face is still recorded (with an absent
    /// signature) so the upload shows up in the dashboard; it just never
    /// participates in matching.
    pub fn register(
        &self,
        image: &[u8],
        extension: &str,
        username: &str,
    ) -> Result<Registration, ServiceError> {
        let ext = validate_extension(extension)?;
        validate_image(image)?;

        let path = self.vault.save_gallery(image, &ext)?;
        let filepath = path.to_string_lossy().into_owned();

        let signatures = self.extractor.extract(&path)?;
        let faces_detected = signatures.len();
        self.gallery
            .add_record(username, &filepath, signatures.first())?;

        tracing::info!(username, image = %filepath, faces_detected, "user registered");
        Ok(Registration {
            image: filepath,
            username: username.to_string(),
            faces_detected,
        })
    }

    /// Identify the person in a probe image against the gallery.
    ///
    /// Every attempt that passes validation writes exactly one history
    /// row, whatever the outcome.
    pub fn identify(&self, image: &[u8], extension: &str) -> Result<Identification, ServiceError> {
        let ext = validate_extension(extension)?;
        validate_image(image)?;

        let path = self.vault.save_probe(image, &ext)?;
        let probe_image = path.to_string_lossy().into_owned();

        let signatures = self.extractor.extract(&path)?;
        // Multiple faces in one probe: the first reported face is used,
        // the rest are ignored.
        let Some(probe) = signatures.first() else {
            self.history.add_record(&probe_image, None)?;
            tracing::info!(probe = %probe_image, "no face detected");
            return Ok(Identification::NoFaces { probe_image });
        };

        let gallery = self.gallery.list_signatures()?;
        match match_probe(probe, &gallery)? {
            MatchOutcome::Match {
                record_id,
                username,
                confidence,
            } => {
                self.history
                    .add_record(&probe_image, Some((record_id, &username, confidence)))?;
                tracing::info!(
                    username = %username,
                    confidence,
                    record_id,
                    probe = %probe_image,
                    "match found"
                );
                Ok(Identification::MatchFound {
                    matched_username: username,
                    confidence,
                    matched_image_id: record_id,
                    probe_image,
                })
            }
            MatchOutcome::NoMatch => {
                self.history.add_record(&probe_image, None)?;
                tracing::info!(probe = %probe_image, gallery_size = gallery.len(), "no match");
                Ok(Identification::NoMatch { probe_image })
            }
        }
    }

    /// Recent registrations, newest first (dashboard read path).
    pub fn recent_registrations(&self, limit: u32) -> Result<Vec<GalleryRecord>, ServiceError> {
        Ok(self.gallery.list_recent(limit)?)
    }

    /// Recent identification attempts, newest first.
    pub fn recent_history(&self, limit: u32) -> Result<Vec<HistorySearch>, ServiceError> {
        Ok(self.history.list_recent(limit)?)
    }

    /// Number of gallery rows that can participate in matching.
    pub fn matchable_faces(&self) -> Result<usize, ServiceError> {
        Ok(self.gallery.list_signatures()?.len())
    }
}

/// Accepts `jpg` / `.JPG` / etc.; returns the canonical dotted lowercase
/// form used for stored filenames.
fn validate_extension(extension: &str) -> Result<String, ServiceError> {
    let bare = extension.trim_start_matches('.').to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.contains(&bare.as_str()) {
        Ok(format!(".{bare}"))
    } else {
        Err(ServiceError::InvalidExtension)
    }
}

fn validate_image(bytes: &[u8]) -> Result<(), ServiceError> {
    image::load_from_memory(bytes).map_err(|e| {
        tracing::debug!(error = %e, "upload rejected: not a decodable image");
        ServiceError::InvalidImage
    })?;
    Ok(())
}
