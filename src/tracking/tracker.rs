//! Concurrency-safe usage tracking.
//!
//! [`UsageTracker`] keeps a durable counter of tokens and requests per
//! (scope, identity) pair, with automatic daily rollover of the "today"
//! counters. Two layers of mutual exclusion are held across every
//! read-modify-write cycle:
//!
//! 1. An in-process lock from a [`LockRegistry`], shared by every tracker
//!    instance resolving to the same stats file. Protects against thread
//!    races within one process.
//! 2. An OS advisory file lock taken through the store. Protects against
//!    races between independent processes, which legitimately share files in
//!    `per_process` and `global` scopes.
//!
//! The daily-rollover check runs inside the locked critical section, so two
//! concurrent callers observing a stale date cannot double-apply or lose the
//! rollover.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::error::{LlmKitError, Result};
use crate::storage::paths::AppPaths;
use crate::storage::stats_file::{JsonFileStore, StatsStore};
use crate::tracking::stats::{Scope, UsageStats, today};

// =============================================================================
// Lock Registry
// =============================================================================

/// Registry of in-process locks keyed by canonicalized stats-file path.
///
/// Entries are created lazily and never removed; the key space is bounded by
/// the distinct (scope, identity) pairs a process touches.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock shared by all trackers resolving to `path`.
    #[must_use]
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(
            locks
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// The process-wide default registry.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<LockRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }
}

// =============================================================================
// Usage Tracker
// =============================================================================

/// Durable, concurrency-safe token/request counter.
///
/// Cloning is cheap; clones share the same store and locks.
#[derive(Clone)]
pub struct UsageTracker {
    scope: Scope,
    client_id: String,
    process_id: u32,
    path: PathBuf,
    store: Arc<dyn StatsStore>,
    guard: Arc<Mutex<()>>,
}

impl std::fmt::Debug for UsageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageTracker")
            .field("scope", &self.scope)
            .field("client_id", &self.client_id)
            .field("process_id", &self.process_id)
            .finish_non_exhaustive()
    }
}

impl UsageTracker {
    /// Create a tracker in the default per-user usage directory.
    ///
    /// A client id is auto-generated; pass one via [`with_client_id`]
    /// (`UsageTracker::with_client_id`) when the caller has a stable identity.
    ///
    /// # Errors
    ///
    /// Fails if the usage directory cannot be created.
    pub fn new(scope: Scope) -> Result<Self> {
        Self::build(AppPaths::new().usage_dir(), scope, None, LockRegistry::global())
    }

    /// Create a tracker with an explicit client identity.
    ///
    /// # Errors
    ///
    /// Fails if the usage directory cannot be created.
    pub fn with_client_id(scope: Scope, client_id: &str) -> Result<Self> {
        Self::build(
            AppPaths::new().usage_dir(),
            scope,
            Some(client_id.to_string()),
            LockRegistry::global(),
        )
    }

    /// Create a tracker using a specific directory (useful for tests).
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created.
    pub fn with_dir(dir: impl Into<PathBuf>, scope: Scope, client_id: Option<&str>) -> Result<Self> {
        Self::build(
            dir.into(),
            scope,
            client_id.map(str::to_string),
            LockRegistry::global(),
        )
    }

    /// Create a tracker with an explicit lock registry.
    ///
    /// Trackers only cooperate through in-process locks when they share a
    /// registry; embedders that assemble their own trackers should pass the
    /// same registry to all of them.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created.
    pub fn with_registry(
        dir: impl Into<PathBuf>,
        scope: Scope,
        client_id: Option<&str>,
        registry: &LockRegistry,
    ) -> Result<Self> {
        Self::build(dir.into(), scope, client_id.map(str::to_string), registry)
    }

    fn build(
        dir: PathBuf,
        scope: Scope,
        client_id: Option<String>,
        registry: &LockRegistry,
    ) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        let client_id =
            client_id.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let process_id = std::process::id();

        let file_name = match scope {
            Scope::PerClient => format!("usage_{}.json", sanitize_identity(&client_id)),
            Scope::PerProcess => format!("usage_process_{process_id}.json"),
            Scope::Global => "usage_global.json".to_string(),
        };

        // Canonicalize the directory so trackers built through different
        // spellings of the same path share one in-process lock.
        let canonical_dir = dir.canonicalize()?;
        let path = canonical_dir.join(file_name);
        let guard = registry.lock_for(&path);

        Ok(Self {
            scope,
            client_id,
            process_id,
            path: path.clone(),
            store: Arc::new(JsonFileStore::new(path)),
            guard,
        })
    }

    /// The tracker's scope.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// The tracker's client identity (always present, auto-generated if not
    /// supplied; only part of the file path for per-client scope).
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Record one completed provider call carrying `tokens_used` tokens.
    ///
    /// Each call counts as exactly one request, including zero-token calls.
    ///
    /// # Errors
    ///
    /// [`LlmKitError::InvalidTokenCount`] for negative values (no state is
    /// touched); lock or persistence failures propagate.
    pub fn record_usage(&self, tokens_used: i64) -> Result<()> {
        let Ok(tokens) = u64::try_from(tokens_used) else {
            return Err(LlmKitError::InvalidTokenCount { tokens: tokens_used });
        };

        let _process_lock = self.acquire_process_lock()?;
        let _file_lock = self.store.exclusive()?;

        let mut stats = self.load_or_fresh()?;
        if stats.roll_over_if_stale(today()) {
            tracing::debug!(scope = %self.scope, "daily usage counters rolled over");
        }
        stats.record(tokens);
        self.store.save(&stats)
    }

    /// Current stats snapshot, with daily rollover applied.
    ///
    /// A rollover detected here is persisted before returning, so memory and
    /// disk agree at the end of every call. The returned value is a copy;
    /// mutating it does not affect tracker state.
    ///
    /// # Errors
    ///
    /// Lock or persistence failures propagate. A missing or corrupt backing
    /// file is not an error; it yields fresh zero-valued stats.
    pub fn get_stats(&self) -> Result<UsageStats> {
        let _process_lock = self.acquire_process_lock()?;
        let _file_lock = self.store.exclusive()?;

        let mut stats = self.load_or_fresh()?;
        if stats.roll_over_if_stale(today()) {
            tracing::debug!(scope = %self.scope, "daily usage counters rolled over");
            self.store.save(&stats)?;
        }
        Ok(stats)
    }

    /// Zero all counters (daily and all-time) and persist immediately.
    ///
    /// # Errors
    ///
    /// Lock or persistence failures propagate.
    pub fn reset_stats(&self) -> Result<()> {
        let _process_lock = self.acquire_process_lock()?;
        let _file_lock = self.store.exclusive()?;

        let mut stats = self.load_or_fresh()?;
        stats.reset(today());
        self.store.save(&stats)
    }

    /// Path of the backing stats file.
    #[must_use]
    pub fn stats_path(&self) -> &Path {
        &self.path
    }

    fn acquire_process_lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.guard.lock().map_err(|_| LlmKitError::LockPoisoned {
            path: self.path.display().to_string(),
        })
    }

    fn load_or_fresh(&self) -> Result<UsageStats> {
        Ok(self
            .store
            .load()?
            .unwrap_or_else(|| UsageStats::fresh(self.fresh_client_id(), self.fresh_process_id())))
    }

    fn fresh_client_id(&self) -> Option<String> {
        match self.scope {
            Scope::PerClient => Some(self.client_id.clone()),
            Scope::PerProcess | Scope::Global => None,
        }
    }

    const fn fresh_process_id(&self) -> Option<u32> {
        match self.scope {
            Scope::PerProcess | Scope::Global => Some(self.process_id),
            Scope::PerClient => None,
        }
    }
}

/// Restrict an identity to filesystem-safe characters.
fn sanitize_identity(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
