//! facelog-core — Facial signature model and gallery matching.
//!
//! Defines the signature vector type, the Euclidean first-acceptable
//! matcher, and the contract for the external signature encoder.

pub mod extractor;
pub mod matcher;
pub mod types;

pub use extractor::{CommandExtractor, ExtractorError, SignatureExtractor};
pub use matcher::{match_probe, MatchOutcome, MATCH_THRESHOLD};
pub use types::{GalleryEntry, Signature, SignatureError};
