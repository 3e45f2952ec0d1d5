//! Per-session temp storage for captured photos and the QR image.
//!
//! One session owns one scratch directory. Photos are written as
//! `photo_<1..N>.png` in capture order and the whole directory is wiped when
//! a new session starts and when a session ends, so no photo from a prior run
//! is ever visible to the next one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("temp storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Handle to the session scratch directory
#[derive(Debug, Clone)]
pub struct SessionStorage {
    root: PathBuf,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self {
            root: config::TEMP_DIR.clone(),
        }
    }

    /// Storage rooted at an explicit directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reset the scratch directory to an empty state.
    ///
    /// Removes any leftovers from a previous session before recreating the
    /// directory, so a crashed or aborted run cannot leak photos forward.
    pub fn prepare(&self) -> Result<(), StorageError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.root)?;
        log::info!("Temp storage ready at {}", self.root.display());
        Ok(())
    }

    /// Path of the photo with the given 1-based capture index
    pub fn photo_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("photo_{}.png", index))
    }

    /// Path the QR image is written to
    pub fn qr_path(&self) -> PathBuf {
        self.root.join("qr.png")
    }

    /// Photos currently present, in capture order
    pub fn captured_photos(&self) -> Vec<PathBuf> {
        (1..=config::TOTAL_PHOTOS)
            .map(|i| self.photo_path(i))
            .filter(|p| p.is_file())
            .collect()
    }

    /// Delete the scratch directory and everything in it
    pub fn cleanup(&self) -> Result<(), StorageError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                log::info!("Temp storage removed at {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for SessionStorage {
    fn default() -> Self {
        Self::new()
    }
}
