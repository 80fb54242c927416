//! The directory normalized artifacts are written to.
//!
//! A [`WorkDir`] is created lazily: nothing touches the filesystem until the
//! first artifact is written. Artifacts are named `<uuid v4>.<ext>` and
//! created with create-new semantics, so a write never clobbers an existing
//! file. [`WorkDir::clear`] removes every entry directly inside the directory
//! and then the directory itself.
//!
//! There is no locking: two processes clearing and writing the same
//! directory at once can race.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

/// Directory name used when no configuration says otherwise.
pub const DEFAULT_DIR_NAME: &str = "TempImgs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<system temp dir>/<dir_name>`.
    pub fn in_system_temp(dir_name: &str) -> Self {
        Self::new(std::env::temp_dir().join(dir_name))
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub fn ensure(&self) -> io::Result<&Path> {
        fs::create_dir_all(&self.root)?;
        Ok(&self.root)
    }

    /// A fresh, unused artifact path. Does not create anything.
    pub fn artifact_path(&self, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", Uuid::new_v4(), extension))
    }

    /// Write `bytes` to a new uniquely named artifact and return its path.
    pub fn write_artifact(&self, bytes: &[u8], extension: &str) -> io::Result<PathBuf> {
        self.ensure()?;
        let path = self.artifact_path(extension);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
        Ok(path)
    }

    /// Remove every entry directly inside the directory, then the directory.
    ///
    /// Returns `true` if the directory is gone afterwards, including when it
    /// never existed. Sub-directories are not descended into: they fail to
    /// delete as files, which leaves the directory non-empty and makes the
    /// final removal (and this call) fail.
    pub fn clear(&self) -> bool {
        if !self.exists() {
            return true;
        }

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            match entry {
                Ok(entry) => {
                    if let Err(e) = fs::remove_file(entry.path()) {
                        warn!(path = %entry.path().display(), "failed to delete temp entry: {e}");
                    }
                }
                Err(e) => warn!("failed to list temp directory: {e}"),
            }
        }

        match fs::remove_dir(&self.root) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.root.display(), "failed to remove temp directory: {e}");
                false
            }
        }
    }
}
