//! Dedicated slow-query log.
//!
//! Slow queries are recorded to their own rotating file, separate from the
//! diagnostic log, so operators can tail and ship them independently.

use crate::core::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Rotation settings for the slow-query log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowLogConfig {
    /// Rotate once the active file would grow past this many bytes.
    pub max_size_bytes: u64,
    /// How many rotated files to keep (`<path>.1` is the newest backup).
    pub max_backups: usize,
}

impl SlowLogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    pub fn max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }
}

impl Default for SlowLogConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 128 * 1024 * 1024,
            max_backups: 3,
        }
    }
}

struct ActiveFile {
    file: BufWriter<File>,
    written: u64,
}

/// Appends slow-query records to a dedicated file.
///
/// The registry swaps the whole logger on reconfiguration; writers on the
/// query path share one handle through their namespace.
pub struct SlowLogger {
    path: PathBuf,
    config: SlowLogConfig,
    active: Mutex<ActiveFile>,
}

impl SlowLogger {
    /// Open (or create) the log file at `path`, appending to existing
    /// content. Parent directories are created as needed.
    pub fn new(path: impl Into<PathBuf>, config: SlowLogConfig) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = Self::open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            config,
            active: Mutex::new(ActiveFile {
                file: BufWriter::new(file),
                written,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &SlowLogConfig {
        &self.config
    }

    /// Record one slow query.
    pub fn record(&self, sql: &str, elapsed: Duration) -> Result<()> {
        let line = format!(
            "{} cost={}ms sql={}\n",
            Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            elapsed.as_millis(),
            sql
        );

        let mut active = self.active.lock()?;
        if active.written > 0 && active.written + line.len() as u64 > self.config.max_size_bytes {
            self.rotate(&mut active)?;
        }
        active.file.write_all(line.as_bytes())?;
        active.file.flush()?;
        active.written += line.len() as u64;

        Ok(())
    }

    fn rotate(&self, active: &mut ActiveFile) -> Result<()> {
        active.file.flush()?;

        if self.config.max_backups == 0 {
            fs::remove_file(&self.path)?;
        } else {
            let oldest = self.backup_path(self.config.max_backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for i in (1..self.config.max_backups).rev() {
                let from = self.backup_path(i);
                if from.exists() {
                    fs::rename(&from, self.backup_path(i + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        active.file = BufWriter::new(Self::open_append(&self.path)?);
        active.written = 0;
        Ok(())
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.path.display(), index))
    }

    fn open_append(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }
}
