use facelog_core::SignatureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored signature is corrupt: {0}")]
    CorruptSignature(#[from] SignatureError),
}
