//! Image blob store.
//!
//! Original upload bytes land on the local filesystem under fresh
//! uuid-derived names; the database only ever holds the returned path.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

pub struct ImageVault {
    gallery_dir: PathBuf,
    probe_dir: PathBuf,
}

impl ImageVault {
    /// Create both image directories if they do not exist yet.
    pub fn new(gallery_dir: &Path, probe_dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(gallery_dir)?;
        std::fs::create_dir_all(probe_dir)?;
        Ok(Self {
            gallery_dir: gallery_dir.to_path_buf(),
            probe_dir: probe_dir.to_path_buf(),
        })
    }

    /// Persist a registration image. `ext` includes the leading dot.
    pub fn save_gallery(&self, bytes: &[u8], ext: &str) -> io::Result<PathBuf> {
        let path = self.gallery_dir.join(format!("{}{ext}", short_id()));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Persist a probe image.
    pub fn save_probe(&self, bytes: &[u8], ext: &str) -> io::Result<PathBuf> {
        let path = self.probe_dir.join(format!("probe_{}{ext}", short_id()));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// 8-hex-char reference, enough entropy for a single-node image folder.
fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_land_in_the_right_directories() {
        let dir = tempfile::tempdir().unwrap();
        let vault = ImageVault::new(&dir.path().join("g"), &dir.path().join("p")).unwrap();

        let g = vault.save_gallery(b"gal", ".jpg").unwrap();
        let p = vault.save_probe(b"pro", ".png").unwrap();

        assert!(g.starts_with(dir.path().join("g")));
        assert!(p.starts_with(dir.path().join("p")));
        assert_eq!(std::fs::read(&g).unwrap(), b"gal");
        assert_eq!(std::fs::read(&p).unwrap(), b"pro");
        assert!(g.extension().is_some_and(|e| e == "jpg"));
        assert!(p
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("probe_")));
    }

    #[test]
    fn fresh_reference_per_save() {
        let dir = tempfile::tempdir().unwrap();
        let vault = ImageVault::new(&dir.path().join("g"), &dir.path().join("p")).unwrap();
        let a = vault.save_gallery(b"x", ".jpg").unwrap();
        let b = vault.save_gallery(b"x", ".jpg").unwrap();
        assert_ne!(a, b);
    }
}
