//! Flat-file persistence for usage stats.
//!
//! One small JSON file per (scope, identity) pair. Writes go through a temp
//! file + rename so an interrupted process never leaves a half-written file
//! behind, and readers recover from corruption by starting over from zero.
//!
//! The [`StatsStore`] trait keeps the locking/business logic in the tracker
//! independent of the backing store, so a different store can be swapped in
//! without touching either.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::Result;
use crate::tracking::stats::UsageStats;

// =============================================================================
// Store Trait
// =============================================================================

/// Exclusive-access guard over a store.
///
/// For file-backed stores this holds the OS advisory lock; dropping the guard
/// releases it. The lock must be held for the full read-modify-write cycle.
#[derive(Debug)]
pub struct StoreLock {
    _lock_file: Option<File>,
}

impl StoreLock {
    /// A guard that holds nothing (for in-memory stores).
    #[must_use]
    pub const fn noop() -> Self {
        Self { _lock_file: None }
    }
}

/// Persistence interface for usage stats.
pub trait StatsStore: Send + Sync {
    /// Load persisted stats.
    ///
    /// `Ok(None)` for a missing file; corrupted content is also reported as
    /// `Ok(None)` (with a warning) rather than a parse error.
    fn load(&self) -> Result<Option<UsageStats>>;

    /// Persist stats durably.
    fn save(&self, stats: &UsageStats) -> Result<()>;

    /// Acquire cross-process exclusive access, blocking until granted.
    ///
    /// Acquisition failures propagate; the store never proceeds
    /// unsynchronized.
    fn exclusive(&self) -> Result<StoreLock>;
}

// =============================================================================
// JSON File Store
// =============================================================================

/// [`StatsStore`] backed by one JSON file plus a sidecar lock file.
///
/// The advisory lock lives on `<path>.lock` rather than the stats file
/// itself: the stats file is replaced by rename on every save, which would
/// detach a lock held on its inode.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the given stats file path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing stats file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| "stats".into(), std::ffi::OsStr::to_os_string);
        name.push(".lock");
        self.path.with_file_name(name)
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> Result<Option<UsageStats>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&content) {
            Ok(stats) => Ok(Some(stats)),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "corrupt usage stats file, starting from zero"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, stats: &UsageStats) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(stats)?;
        write_atomic(&self.path, content.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "usage stats saved");
        Ok(())
    }

    fn exclusive(&self) -> Result<StoreLock> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;
        lock_file.lock_exclusive()?;
        Ok(StoreLock {
            _lock_file: Some(lock_file),
        })
    }
}

/// Write bytes atomically using temp file + rename.
/// This prevents corruption if the process is interrupted during write.
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Temp file must live in the same directory for the rename to be atomic
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("stats"),
        std::process::id()
    ));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, path)
}
