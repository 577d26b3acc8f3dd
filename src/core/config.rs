//! core::config
//!
//! Per-asset configuration.
//!
//! # Retention
//!
//! Version (full-snapshot) retention and state (diff) retention are
//! independent knobs. Version retention defaults to 3 and must be at
//! least 1. State retention defaults to `None`, meaning diff entries
//! accumulate without bound - the legacy behavior, kept as an explicit
//! documented default rather than inherited silently.
//!
//! # Validation
//!
//! Retention values are validated in the setters and again in
//! [`AssetConfig::validate`], before any I/O happens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of version entries kept by the purger.
pub const DEFAULT_RETAIN_VERSIONS: usize = 3;

/// Default umask applied to created files and directories.
pub const DEFAULT_UMASK: u32 = 0o022;

/// Base mode for created files, before the umask is applied.
const FILE_MODE_BASE: u32 = 0o666;

/// Base mode for created directories, before the umask is applied.
const DIR_MODE_BASE: u32 = 0o777;

/// Errors from configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A retention count below 1 would delete the entire history.
    #[error("retention count must be at least 1, got {0}")]
    RetentionTooSmall(usize),
}

/// Configuration for a single asset.
///
/// # Example
///
/// ```
/// use snapvault::core::config::AssetConfig;
///
/// let config = AssetConfig::default();
/// assert_eq!(config.retain_versions, 3);
/// assert_eq!(config.retain_states, None);
/// assert_eq!(config.file_mode(), 0o644);
/// assert_eq!(config.dir_mode(), 0o755);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    /// Number of version (full-snapshot) entries retained by a purge.
    /// Must be at least 1.
    pub retain_versions: usize,

    /// Number of state (diff) entries retained by a purge, or `None` to
    /// keep all diffs forever (the default).
    pub retain_states: Option<usize>,

    /// Umask subtracted from the base modes 0666/0777 when creating
    /// files and directories. Ignored on non-Unix platforms.
    pub umask: u32,

    /// When true, every link, unlink, and rename is reported at `info`
    /// level instead of `debug`.
    pub verbose: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            retain_versions: DEFAULT_RETAIN_VERSIONS,
            retain_states: None,
            umask: DEFAULT_UMASK,
            verbose: false,
        }
    }
}

impl AssetConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RetentionTooSmall` if either retention knob
    /// is below 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retain_versions < 1 {
            return Err(ConfigError::RetentionTooSmall(self.retain_versions));
        }
        if let Some(n) = self.retain_states {
            if n < 1 {
                return Err(ConfigError::RetentionTooSmall(n));
            }
        }
        Ok(())
    }

    /// Mode for created files: 0666 minus the umask.
    pub fn file_mode(&self) -> u32 {
        FILE_MODE_BASE & !self.umask
    }

    /// Mode for created directories: 0777 minus the umask.
    pub fn dir_mode(&self) -> u32 {
        DIR_MODE_BASE & !self.umask
    }
}
