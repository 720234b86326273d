//! Filesystem-backed retrain history stored as JSON lines.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use crate::common::config::AppCfg;
use crate::common::error::{HearthError, HearthResult};

use super::domain::{AuditRecord, AuditSink};

/// Append-only log at `<data_root>/audit/retrain_history.jsonl`.
pub struct FsAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FsAuditLog {
    pub fn new(cfg: &AppCfg) -> Self {
        Self::at(cfg.audit_dir().join("retrain_history.jsonl"))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_dirs(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(dir) => fs::create_dir_all(dir),
            None => Ok(()),
        }
    }
}

impl AuditSink for FsAuditLog {
    fn append(&self, record: &AuditRecord) -> HearthResult<()> {
        let line = serde_json::to_string(record).map_err(HearthError::persistence)?;

        let _guard = self.write_lock.lock();
        self.ensure_dirs().map_err(HearthError::persistence)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(HearthError::persistence)?;
        writeln!(file, "{line}").map_err(HearthError::persistence)?;
        Ok(())
    }

    fn history(&self) -> HearthResult<Vec<AuditRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HearthError::persistence(e)),
        };

        let mut records = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(HearthError::persistence)?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = n + 1, error = %e, "skipping unreadable audit entry"),
            }
        }
        records.reverse();
        Ok(records)
    }
}
