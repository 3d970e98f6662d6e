use std::path::PathBuf;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Directory for registration images.
    pub gallery_dir: PathBuf,
    /// Directory for identification probe images.
    pub probe_dir: PathBuf,
    /// External encoder command line (image path appended as last arg).
    pub encoder_command: String,
    /// Default row cap for history reads.
    pub history_limit: u32,
    /// Default row cap for recent-registration reads.
    pub gallery_limit: u32,
}

impl Config {
    /// Load configuration from `FACELOG_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("FACELOG_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        Self {
            db_path: std::env::var("FACELOG_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("facelog.sqlite")),
            gallery_dir: std::env::var("FACELOG_GALLERY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("images")),
            probe_dir: std::env::var("FACELOG_PROBE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("probes")),
            encoder_command: std::env::var("FACELOG_ENCODER_CMD")
                .unwrap_or_else(|_| "face-encoder".to_string()),
            history_limit: env_u32("FACELOG_HISTORY_LIMIT", 50),
            gallery_limit: env_u32("FACELOG_GALLERY_LIMIT", 100),
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("facelog")
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
