//! Filesystem store for the model artifact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::common::config::AppCfg;
use crate::common::error::{HearthError, HearthResult};

use super::domain::ArtifactStore;

/// Keeps the artifact at `<data_root>/models/<artifact_name>`.
///
/// Writes go to a temp file in the same directory and are renamed over the
/// target, so readers see either the old artifact or the new one.
pub struct FsArtifactStore {
    path: PathBuf,
}

impl FsArtifactStore {
    pub fn new(cfg: &AppCfg) -> Self {
        Self {
            path: cfg.models_dir().join(&cfg.artifact_name),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl ArtifactStore for FsArtifactStore {
    fn save(&self, bytes: &[u8]) -> HearthResult<()> {
        self.write_atomic(bytes).map_err(HearthError::persistence)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "artifact written");
        Ok(())
    }

    fn load(&self) -> HearthResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HearthError::persistence(e)),
        }
    }

    fn modified_at(&self) -> HearthResult<Option<DateTime<Utc>>> {
        match fs::metadata(&self.path) {
            Ok(meta) => {
                let modified = meta.modified().map_err(HearthError::persistence)?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HearthError::persistence(e)),
        }
    }
}
