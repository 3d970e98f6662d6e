use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("signature dimension mismatch: probe has {probe} values, gallery entry has {entry}")]
    DimensionMismatch { probe: usize, entry: usize },
    #[error("signature blob length {0} is not a multiple of 8")]
    MalformedBlob(usize),
}

/// Facial signature vector (one per detected face, fixed dimensionality).
///
/// Values are f64 to stay byte-compatible with the float64 blobs the
/// encoder emits and the store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub values: Vec<f64>,
}

impl Signature {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Euclidean distance to another signature. Lower = more similar.
    ///
    /// Signatures of different lengths never compare; that means two
    /// encoder versions are mixed in the gallery and the request must fail.
    pub fn distance(&self, other: &Signature) -> Result<f64, SignatureError> {
        if self.values.len() != other.values.len() {
            return Err(SignatureError::DimensionMismatch {
                probe: self.values.len(),
                entry: other.values.len(),
            });
        }
        let sum: f64 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        Ok(sum.sqrt())
    }

    /// Encode as a little-endian f64 blob for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * 8);
        for v in &self.values {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Decode a little-endian f64 blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() % 8 != 0 {
            return Err(SignatureError::MalformedBlob(bytes.len()));
        }
        let values = bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().expect("chunks_exact(8)")))
            .collect();
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One matchable row of the gallery snapshot: a registered identity
/// whose registration image yielded a signature.
#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub id: i64,
    pub username: String,
    pub signature: Signature,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_identical_is_zero() {
        let a = Signature::new(vec![0.1, 0.2, 0.3]);
        let b = a.clone();
        assert_eq!(a.distance(&b).unwrap(), 0.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Signature::new(vec![0.0, 0.0]);
        let b = Signature::new(vec![3.0, 4.0]);
        assert!((a.distance(&b).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Signature::new(vec![0.25, -0.5, 0.75]);
        let b = Signature::new(vec![-0.1, 0.4, 0.2]);
        assert_eq!(a.distance(&b).unwrap(), b.distance(&a).unwrap());
    }

    #[test]
    fn mismatched_dimensions_are_an_error() {
        let a = Signature::new(vec![1.0, 2.0]);
        let b = Signature::new(vec![1.0, 2.0, 3.0]);
        let err = a.distance(&b).unwrap_err();
        assert!(matches!(
            err,
            SignatureError::DimensionMismatch { probe: 2, entry: 3 }
        ));
    }

    #[test]
    fn blob_round_trip() {
        let a = Signature::new(vec![0.5, -1.25, 3.0e-7]);
        let decoded = Signature::from_bytes(&a.to_bytes()).unwrap();
        assert_eq!(a, decoded);
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let err = Signature::from_bytes(&[0u8; 13]).unwrap_err();
        assert!(matches!(err, SignatureError::MalformedBlob(13)));
    }
}
