//! engine
//!
//! The capture -> diff -> commit -> purge sequence.
//!
//! # Architecture
//!
//! [`Asset`] is the top-level handle for one versioned asset. Each
//! [`Asset::exec`] call runs the full sequence synchronously, in order:
//!
//! 1. acquire the per-asset advisory lock ([`lock`])
//! 2. ensure the on-disk layout exists ([`crate::core::paths`])
//! 3. capture the content into a temp file ([`capture`])
//! 4. compute the unified diff against the latest pointer
//!    ([`crate::diff`])
//! 5. on a non-empty diff, publish state entry, version entry, and
//!    pointer ([`commit`])
//! 6. prune history beyond the retention limits ([`purge`])
//!
//! No step retries; any failure aborts the call and surfaces as an
//! [`EngineError`]. Temp files clean themselves up on every path.
//!
//! # Modules
//!
//! - [`lock`] - Per-asset advisory lock (RAII)
//! - [`capture`] - Content sources and temp-file staging
//! - [`commit`] - Hard-link publish and pointer swap
//! - [`purge`] - Retention pruning and entry enumeration

pub mod capture;
pub mod commit;
pub mod lock;
pub mod purge;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use capture::ContentSource;
pub use lock::{AssetLock, LockError};

use crate::core::config::{AssetConfig, ConfigError};
use crate::core::paths::{AssetPaths, LayoutError};
use crate::core::types::{AssetName, Timestamp, TypeError};
use crate::diff::{DiffError, Differ, SystemDiff};

/// Errors surfaced by [`Asset`] operations.
///
/// Nothing is swallowed and nothing retries: a failed link, unlink, or
/// diff invocation aborts the current call. Callers should treat any
/// error from [`Asset::exec`] as "asset directory not verified
/// consistent" and inspect or re-run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An invalid asset name or timestamp.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Configuration rejected before any I/O.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Directory or pointer creation failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The per-asset lock could not be acquired.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Diff computation failed.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Content could not be produced or written to a temp file.
    #[error("failed to capture content: {0}")]
    Capture(#[source] io::Error),

    /// Diff output could not be staged for linking.
    #[error("failed to stage diff output: {0}")]
    Stage(#[source] io::Error),

    /// A hard link could not be created.
    #[error("failed to link {link}: {source}")]
    Link {
        link: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be removed.
    #[error("failed to unlink {path}: {source}")]
    Unlink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The latest pointer rename failed.
    #[error("failed to swap latest pointer: {0}")]
    Swap(#[source] io::Error),

    /// A history directory could not be enumerated.
    #[error("failed to list {dir}: {source}")]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An entry could not be read back.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle for one versioned asset, identified by `(root, name)`.
///
/// The diff collaborator is pluggable: [`Asset::new`] uses the external
/// `diff` tool, [`Asset::with_differ`] swaps in any [`Differ`] (e.g.
/// [`crate::diff::NativeDiff`]).
///
/// # Example
///
/// ```no_run
/// use snapvault::engine::Asset;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut asset = Asset::new("/var/lib/snapvault", "syslog")?;
/// asset.set_retain_versions(5)?;
///
/// // Literal content
/// asset.exec("fresh content\n")?;
///
/// // Or a producer, invoked exactly once
/// asset.exec_with(|| std::fs::read("/var/log/system.log"))?;
///
/// assert!(!asset.latest()?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Asset<D: Differ = SystemDiff> {
    paths: AssetPaths,
    config: AssetConfig,
    differ: D,
}

impl Asset<SystemDiff> {
    /// Create a handle with default configuration and the external
    /// `diff` tool as collaborator.
    ///
    /// Construction does no I/O; directories are created lazily on the
    /// first [`Asset::exec`].
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidAssetName` if `name` is not a safe
    /// path segment.
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self, TypeError> {
        let name = AssetName::new(name)?;
        Ok(Self {
            paths: AssetPaths::new(root.into(), name),
            config: AssetConfig::default(),
            differ: SystemDiff::default(),
        })
    }

    /// Create a handle with explicit configuration.
    ///
    /// # Errors
    ///
    /// Invalid names surface as [`EngineError::Type`], invalid retention
    /// values as [`EngineError::Config`] - both before any I/O.
    pub fn with_config(
        root: impl Into<PathBuf>,
        name: impl Into<String>,
        config: AssetConfig,
    ) -> Result<Self, EngineError> {
        let name = AssetName::new(name)?;
        config.validate()?;
        Ok(Self {
            paths: AssetPaths::new(root.into(), name),
            config,
            differ: SystemDiff::default(),
        })
    }
}

impl<D: Differ> Asset<D> {
    /// Swap the diff collaborator, keeping paths and configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use snapvault::diff::NativeDiff;
    /// use snapvault::engine::Asset;
    ///
    /// let asset = Asset::new("/tmp/vault", "syslog")
    ///     .unwrap()
    ///     .with_differ(NativeDiff);
    /// # let _ = asset;
    /// ```
    pub fn with_differ<E: Differ>(self, differ: E) -> Asset<E> {
        Asset {
            paths: self.paths,
            config: self.config,
            differ,
        }
    }

    /// The asset's path routing.
    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// The asset's current configuration.
    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Configure how many version entries a purge retains.
    ///
    /// Takes effect on the next purge; entries already beyond a lowered
    /// limit are removed then, not immediately.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RetentionTooSmall` for values below 1.
    pub fn set_retain_versions(&mut self, retain: usize) -> Result<(), ConfigError> {
        if retain < 1 {
            return Err(ConfigError::RetentionTooSmall(retain));
        }
        self.config.retain_versions = retain;
        Ok(())
    }

    /// Configure state (diff) retention. `None` keeps all diffs forever.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RetentionTooSmall` for `Some(0)`.
    pub fn set_retain_states(&mut self, retain: Option<usize>) -> Result<(), ConfigError> {
        if let Some(n) = retain {
            if n < 1 {
                return Err(ConfigError::RetentionTooSmall(n));
            }
        }
        self.config.retain_states = retain;
        Ok(())
    }

    /// Configure the umask applied to created files and directories.
    pub fn set_umask(&mut self, umask: u32) {
        self.config.umask = umask;
    }

    /// Report every link, unlink, and rename at `info` level.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    /// Capture literal content and commit it if it changed.
    ///
    /// Convenience wrapper around [`Asset::exec_with`] for buffers.
    pub fn exec(&self, content: impl AsRef<[u8]>) -> Result<(), EngineError> {
        let content = content.as_ref().to_vec();
        self.exec_with(move || Ok(content))
    }

    /// Run one full capture -> diff -> commit -> purge cycle.
    ///
    /// The producer is invoked exactly once, after the asset lock is
    /// held. When the produced content equals the latest pointer's
    /// content, nothing is published; history is still pruned, matching
    /// the legacy engine.
    ///
    /// # Errors
    ///
    /// Any lock, filesystem, or diff-tool failure aborts the call. There
    /// is no retry; a failed call may leave the asset directory in a
    /// state that needs inspection (temp files are still cleaned up).
    pub fn exec_with<S: ContentSource>(&self, source: S) -> Result<(), EngineError> {
        self.config.validate()?;
        // The asset dir must exist at the configured mode before the
        // lock file is created inside it.
        self.paths.ensure_asset_dir(&self.config)?;
        let _lock = AssetLock::acquire(&self.paths)?;

        // Timestamp the start of execution, before capture runs.
        let timestamp = Timestamp::now();
        self.paths.ensure_layout(&self.config)?;

        // Both temp files remove themselves on drop, so every return
        // path below leaves the asset directory free of staging debris.
        let current = capture::capture(&self.paths, self.config.file_mode(), source)
            .map_err(EngineError::Capture)?;
        let diff = self
            .differ
            .unified_diff(&self.paths.latest_path(), current.path())?;

        if !diff.is_empty() {
            let staged =
                capture::stage_bytes(&self.paths, self.config.file_mode(), diff.as_bytes())
                    .map_err(EngineError::Stage)?;
            let timestamp = self.free_timestamp(timestamp)?;
            commit::commit(
                &self.paths,
                &self.config,
                &timestamp,
                current.path(),
                staged.path(),
            )?;
        }

        purge::purge(&self.paths, &self.config)
    }

    /// The most recent full snapshot's content, empty if none exists.
    pub fn latest(&self) -> Result<Vec<u8>, EngineError> {
        match self.version_entries()?.first() {
            Some(path) => fs::read(path).map_err(|source| EngineError::Read {
                path: path.clone(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Version (full-snapshot) entry paths, newest-first.
    pub fn version_entries(&self) -> Result<Vec<PathBuf>, EngineError> {
        self.list(&self.paths.version_dir())
    }

    /// State (diff) entry paths, newest-first.
    pub fn state_entries(&self) -> Result<Vec<PathBuf>, EngineError> {
        self.list(&self.paths.state_dir())
    }

    /// Prune history beyond the retention limits.
    ///
    /// Runs automatically at the end of every [`Asset::exec`]; also
    /// callable on its own, e.g. after lowering a retention limit.
    pub fn purge(&self) -> Result<(), EngineError> {
        self.config.validate()?;
        self.paths.ensure_asset_dir(&self.config)?;
        let _lock = AssetLock::acquire(&self.paths)?;
        purge::purge(&self.paths, &self.config)
    }

    /// Pick the first timestamp for which no entry exists, appending a
    /// serial suffix when a same-second commit already landed.
    ///
    /// Serials are capped at [`Timestamp::MAX_SERIAL`]; exhausting them
    /// surfaces the overflow error rather than publishing a name that
    /// would break the sort order.
    fn free_timestamp(&self, base: Timestamp) -> Result<Timestamp, EngineError> {
        if self.is_free(&base) {
            return Ok(base);
        }
        let mut serial = 1;
        loop {
            let candidate = base.with_serial(serial)?;
            if self.is_free(&candidate) {
                return Ok(candidate);
            }
            serial += 1;
        }
    }

    fn is_free(&self, timestamp: &Timestamp) -> bool {
        !self.paths.state_entry(timestamp).exists()
            && !self.paths.version_entry(timestamp).exists()
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
        purge::list_entries(dir).map_err(|source| EngineError::List {
            dir: dir.to_path_buf(),
            source,
        })
    }
}
