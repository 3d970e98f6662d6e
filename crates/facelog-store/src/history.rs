//! Identification audit log (the `recognition_history` table).

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use crate::{lock, SharedConn, StorageError};

/// One identification attempt, joined with the matched registration's
/// image path where the weak reference still resolves.
///
/// All four match fields are absent together for "no face" and
/// "no match" attempts. `matched_image_path` can be absent even when
/// `matched_image_id` is present: history outlives gallery rows.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySearch {
    pub id: i64,
    pub filepath: String,
    pub matched_image_id: Option<i64>,
    pub matched_username: Option<String>,
    pub confidence: Option<f64>,
    pub searched_at: DateTime<Utc>,
    pub matched_image_path: Option<String>,
}

pub struct HistoryStore {
    conn: SharedConn,
}

impl HistoryStore {
    pub(crate) fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    /// Append one attempt. `matched` carries (gallery id, username,
    /// confidence) for an accepted match and is `None` otherwise — the
    /// username is denormalized on purpose so history stays readable
    /// even if the gallery row disappears.
    pub fn add_record(
        &self,
        probe_filepath: &str,
        matched: Option<(i64, &str, f64)>,
    ) -> Result<i64, StorageError> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO recognition_history
                 (filepath, matched_image_id, matched_username, confidence, searched_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                probe_filepath,
                matched.map(|(id, _, _)| id),
                matched.map(|(_, name, _)| name),
                matched.map(|(_, _, confidence)| confidence),
                Utc::now(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, matched = matched.is_some(), "history record added");
        Ok(id)
    }

    /// Most recent attempts first, bounded by `limit` (the dashboard
    /// shows 50). The LEFT JOIN tolerates dangling matched ids.
    pub fn list_recent(&self, limit: u32) -> Result<Vec<HistorySearch>, StorageError> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT h.id, h.filepath, h.matched_image_id, h.matched_username,
                    h.confidence, h.searched_at, i.filepath
             FROM recognition_history h
             LEFT JOIN images i ON h.matched_image_id = i.id
             ORDER BY h.searched_at DESC, h.id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok(HistorySearch {
                id: row.get(0)?,
                filepath: row.get(1)?,
                matched_image_id: row.get(2)?,
                matched_username: row.get(3)?,
                confidence: row.get(4)?,
                searched_at: row.get(5)?,
                matched_image_path: row.get(6)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use crate::open_in_memory;
    use facelog_core::Signature;

    #[test]
    fn no_match_attempt_has_empty_match_fields() {
        let (_, history) = open_in_memory().unwrap();
        history.add_record("probes/p.jpg", None).unwrap();

        let recent = history.list_recent(50).unwrap();
        assert_eq!(recent.len(), 1);
        let rec = &recent[0];
        assert_eq!(rec.filepath, "probes/p.jpg");
        assert!(rec.matched_image_id.is_none());
        assert!(rec.matched_username.is_none());
        assert!(rec.confidence.is_none());
        assert!(rec.matched_image_path.is_none());
    }

    #[test]
    fn matched_attempt_joins_gallery_image_path() {
        let (gallery, history) = open_in_memory().unwrap();
        let sig = Signature::new(vec![0.1]);
        let image_id = gallery
            .add_record("alice", "images/alice.jpg", Some(&sig))
            .unwrap();
        history
            .add_record("probes/p.jpg", Some((image_id, "alice", 0.93)))
            .unwrap();

        let recent = history.list_recent(50).unwrap();
        let rec = &recent[0];
        assert_eq!(rec.matched_image_id, Some(image_id));
        assert_eq!(rec.matched_username.as_deref(), Some("alice"));
        assert_eq!(rec.confidence, Some(0.93));
        assert_eq!(rec.matched_image_path.as_deref(), Some("images/alice.jpg"));
    }

    #[test]
    fn dangling_reference_reads_as_unknown() {
        let (_, history) = open_in_memory().unwrap();
        // Gallery id 999 never existed; the row must still read back.
        history
            .add_record("probes/p.jpg", Some((999, "ghost", 0.8)))
            .unwrap();

        let recent = history.list_recent(50).unwrap();
        let rec = &recent[0];
        assert_eq!(rec.matched_image_id, Some(999));
        assert_eq!(rec.matched_username.as_deref(), Some("ghost"));
        assert!(rec.matched_image_path.is_none());
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let (_, history) = open_in_memory().unwrap();
        for i in 0..5 {
            history.add_record(&format!("probes/{i}.jpg"), None).unwrap();
        }
        let recent = history.list_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].filepath, "probes/4.jpg");
        assert_eq!(recent[2].filepath, "probes/2.jpg");
    }
}
