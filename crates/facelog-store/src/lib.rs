//! facelog-store — Append-only SQLite persistence.
//!
//! Two tables back the whole service: `images` (registered identities and
//! their signature blobs) and `recognition_history` (one row per
//! identification attempt). Both are insert-only; nothing in the service
//! updates or deletes rows. `recognition_history.matched_image_id` is a
//! weak reference into `images` — resolved with a LEFT JOIN at read time,
//! never enforced, so a dangling id degrades to "unknown" instead of
//! corrupting history reads.

mod error;
mod gallery;
mod history;

pub use error::StorageError;
pub use gallery::{GalleryRecord, GalleryStore};
pub use history::{HistorySearch, HistoryStore};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS images (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    filepath    TEXT NOT NULL,
    signature   BLOB,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS recognition_history (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    filepath          TEXT NOT NULL,
    matched_image_id  INTEGER,
    matched_username  TEXT,
    confidence        REAL,
    searched_at       TEXT NOT NULL
);
";

/// Handle to the single database connection, shared by both stores.
///
/// rusqlite's `Connection` is Send but not Sync; the mutex makes each
/// statement atomic from the callers' point of view, which is all the
/// append-only contract needs.
pub(crate) type SharedConn = Arc<Mutex<Connection>>;

pub(crate) fn lock(conn: &SharedConn) -> MutexGuard<'_, Connection> {
    conn.lock().expect("database mutex poisoned")
}

/// Open (creating if needed) the database at `path` and hand out the two
/// store objects over one shared connection.
pub fn open(path: &Path) -> Result<(GalleryStore, HistoryStore), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    init(conn)
}

/// In-memory database, for tests.
pub fn open_in_memory() -> Result<(GalleryStore, HistoryStore), StorageError> {
    init(Connection::open_in_memory()?)
}

fn init(conn: Connection) -> Result<(GalleryStore, HistoryStore), StorageError> {
    conn.execute_batch(SCHEMA)?;
    let shared: SharedConn = Arc::new(Mutex::new(conn));
    Ok((
        GalleryStore::new(shared.clone()),
        HistoryStore::new(shared),
    ))
}
