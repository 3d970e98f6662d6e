//! Registered-identity store (the `images` table).

use chrono::{DateTime, Utc};
use facelog_core::{GalleryEntry, Signature};
use rusqlite::params;
use serde::Serialize;

use crate::{lock, SharedConn, StorageError};

/// One registration row. `signature` is absent when the registration
/// image contained no detectable face; such rows are kept for audit but
/// never participate in matching.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryRecord {
    pub id: i64,
    pub username: String,
    pub filepath: String,
    #[serde(skip)]
    pub signature: Option<Signature>,
    pub created_at: DateTime<Utc>,
}

pub struct GalleryStore {
    conn: SharedConn,
}

impl GalleryStore {
    pub(crate) fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    /// Append one registration record. Single INSERT, so the row is
    /// either fully persisted or not at all. Returns the new row id.
    pub fn add_record(
        &self,
        username: &str,
        filepath: &str,
        signature: Option<&Signature>,
    ) -> Result<i64, StorageError> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO images (username, filepath, signature, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                username,
                filepath,
                signature.map(Signature::to_bytes),
                Utc::now(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, username, has_signature = signature.is_some(), "gallery record added");
        Ok(id)
    }

    /// The matchable gallery snapshot: every row with a signature, in
    /// insertion order. Matching is order-sensitive, so no re-sorting here.
    pub fn list_signatures(&self) -> Result<Vec<GalleryEntry>, StorageError> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT id, username, signature FROM images
             WHERE signature IS NOT NULL
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, username, blob) = row?;
            entries.push(GalleryEntry {
                id,
                username,
                signature: Signature::from_bytes(&blob)?,
            });
        }
        Ok(entries)
    }

    /// Most recent registrations first, bounded by `limit`.
    pub fn list_recent(&self, limit: u32) -> Result<Vec<GalleryRecord>, StorageError> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT id, username, filepath, signature, created_at FROM images
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<Vec<u8>>>(3)?,
                row.get::<_, DateTime<Utc>>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, username, filepath, blob, created_at) = row?;
            records.push(GalleryRecord {
                id,
                username,
                filepath,
                signature: blob.as_deref().map(Signature::from_bytes).transpose()?,
                created_at,
            });
        }
        Ok(records)
    }
}
