//! Gallery matching.
//!
//! A probe signature is compared against the full gallery snapshot with
//! plain Euclidean distance. The matcher is a pure function of its inputs
//! and holds no state, so it is safe to call from concurrent request
//! handlers without synchronization.

use crate::types::{GalleryEntry, Signature, SignatureError};

/// Maximum Euclidean distance at which a probe is accepted as a match.
/// Inclusive: a distance of exactly 0.6 matches.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Outcome of matching one probe against the gallery.
///
/// "No face in the probe image" is decided before the matcher runs;
/// the matcher only ever sees a concrete probe signature.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Match {
        record_id: i64,
        username: String,
        confidence: f64,
    },
    NoMatch,
}

/// Find a registered identity for `probe`.
///
/// Walks the gallery in the order supplied and returns the FIRST entry
/// within [`MATCH_THRESHOLD`], even when a later entry would be closer.
/// First-acceptable (not best-match) is the original product behavior and
/// iteration order is the tie-break rule, so callers must not re-sort the
/// gallery before passing it in.
///
/// Confidence for an accepted match is exactly `1 - distance`; accepted
/// distances are <= 0.6, so confidence lands in [0.4, 1.0].
///
/// A dimension mismatch between the probe and any gallery entry aborts
/// the whole call: it means signatures from two incompatible encoder
/// versions are mixed and no comparison in the request can be trusted.
pub fn match_probe(
    probe: &Signature,
    gallery: &[GalleryEntry],
) -> Result<MatchOutcome, SignatureError> {
    for entry in gallery {
        let distance = probe.distance(&entry.signature)?;
        if distance <= MATCH_THRESHOLD {
            tracing::debug!(
                record_id = entry.id,
                username = %entry.username,
                distance,
                "probe accepted"
            );
            return Ok(MatchOutcome::Match {
                record_id: entry.id,
                username: entry.username.clone(),
                confidence: 1.0 - distance,
            });
        }
    }
    Ok(MatchOutcome::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, username: &str, values: Vec<f64>) -> GalleryEntry {
        GalleryEntry {
            id,
            username: username.to_string(),
            signature: Signature::new(values),
        }
    }

    #[test]
    fn empty_gallery_is_no_match() {
        let probe = Signature::new(vec![0.1, 0.2]);
        assert_eq!(match_probe(&probe, &[]).unwrap(), MatchOutcome::NoMatch);
    }

    #[test]
    fn first_acceptable_entry_wins_over_closer_later_entry() {
        // A sits at distance 0.5, B at 0.1. Both are acceptable; A comes
        // first and must win even though B is the better fit.
        let probe = Signature::new(vec![0.0, 0.0]);
        let gallery = vec![
            entry(1, "alice", vec![0.5, 0.0]),
            entry(2, "bob", vec![0.1, 0.0]),
        ];

        let outcome = match_probe(&probe, &gallery).unwrap();
        match outcome {
            MatchOutcome::Match {
                record_id,
                username,
                confidence,
            } => {
                assert_eq!(record_id, 1);
                assert_eq!(username, "alice");
                assert!((confidence - 0.5).abs() < 1e-12);
            }
            MatchOutcome::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let probe = Signature::new(vec![0.0]);
        let gallery = vec![entry(7, "edge", vec![0.6])];
        assert!(matches!(
            match_probe(&probe, &gallery).unwrap(),
            MatchOutcome::Match { record_id: 7, .. }
        ));
    }

    #[test]
    fn just_past_threshold_is_rejected() {
        let probe = Signature::new(vec![0.0]);
        let gallery = vec![entry(7, "edge", vec![0.6 + 1e-9])];
        assert_eq!(match_probe(&probe, &gallery).unwrap(), MatchOutcome::NoMatch);
    }

    #[test]
    fn confidence_is_one_minus_distance() {
        let probe = Signature::new(vec![0.0, 0.0]);
        let gallery = vec![entry(3, "carol", vec![0.3, 0.4])]; // distance 0.5
        match match_probe(&probe, &gallery).unwrap() {
            MatchOutcome::Match { confidence, .. } => {
                assert_eq!(confidence, 1.0 - 0.5);
            }
            MatchOutcome::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn identical_probe_yields_full_confidence() {
        let probe = Signature::new(vec![0.11, 0.22, 0.33]);
        let gallery = vec![entry(4, "dave", vec![0.11, 0.22, 0.33])];
        match match_probe(&probe, &gallery).unwrap() {
            MatchOutcome::Match { confidence, .. } => assert_eq!(confidence, 1.0),
            MatchOutcome::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn match_is_deterministic() {
        let probe = Signature::new(vec![0.2, 0.1]);
        let gallery = vec![
            entry(1, "a", vec![0.9, 0.9]),
            entry(2, "b", vec![0.25, 0.1]),
        ];
        let first = match_probe(&probe, &gallery).unwrap();
        for _ in 0..10 {
            assert_eq!(match_probe(&probe, &gallery).unwrap(), first);
        }
    }

    #[test]
    fn dimension_mismatch_aborts_the_call() {
        let probe = Signature::new(vec![0.0, 0.0]);
        let gallery = vec![entry(1, "a", vec![0.0, 0.0, 0.0])];
        assert!(match_probe(&probe, &gallery).is_err());
    }
}
