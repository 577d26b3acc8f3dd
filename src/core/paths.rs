//! core::paths
//!
//! Centralized path routing for an asset's on-disk layout.
//!
//! # Storage Layout
//!
//! All data for an asset lives under `<root>/<name>/`:
//! - `state/<timestamp>.txt` - unified diff entries, one per commit
//! - `latest/<timestamp>.txt` - full-snapshot entries, one per commit
//! - `latest.txt` - the latest pointer, baseline for the next diff
//! - `latest.txt.new` - staging name for the pointer rename swap
//! - `.lock` - advisory lock file
//!
//! The `latest/` directory name is historical: it holds the full version
//! history, not just the newest entry. The layout of `state/`, `latest/`
//! and `latest.txt` is bit-compatible with the legacy engine.
//!
//! **Hard rule:** no code outside this module computes these joins. All
//! storage locations are routed through [`AssetPaths`].

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::AssetConfig;
use crate::core::types::{AssetName, Timestamp};

/// File extension for state and version entries.
const ENTRY_EXT: &str = "txt";

/// Errors from layout creation.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or touch the latest pointer.
    #[error("failed to touch latest pointer {path}: {source}")]
    TouchPointer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Centralized path routing for one asset.
///
/// # Example
///
/// ```
/// use snapvault::core::paths::AssetPaths;
/// use snapvault::core::types::AssetName;
/// use std::path::{Path, PathBuf};
///
/// let paths = AssetPaths::new(
///     PathBuf::from("/var/lib/snapvault"),
///     AssetName::new("syslog").unwrap(),
/// );
///
/// assert_eq!(
///     paths.latest_path(),
///     Path::new("/var/lib/snapvault/syslog/latest.txt")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    root: PathBuf,
    name: AssetName,
}

impl AssetPaths {
    /// Create path routing for `(root, name)`.
    pub fn new(root: PathBuf, name: AssetName) -> Self {
        Self { root, name }
    }

    /// The asset's name.
    pub fn name(&self) -> &AssetName {
        &self.name
    }

    /// `<root>/<name>` - holds everything for this asset, including
    /// in-flight temp files.
    pub fn asset_dir(&self) -> PathBuf {
        self.root.join(self.name.as_str())
    }

    /// `<root>/<name>/state` - unified diff entries.
    pub fn state_dir(&self) -> PathBuf {
        self.asset_dir().join("state")
    }

    /// `<root>/<name>/latest` - full-snapshot entries.
    pub fn version_dir(&self) -> PathBuf {
        self.asset_dir().join("latest")
    }

    /// `<root>/<name>/latest.txt` - the latest pointer.
    pub fn latest_path(&self) -> PathBuf {
        self.asset_dir().join("latest.txt")
    }

    /// `<root>/<name>/latest.txt.new` - staging name the pointer swap
    /// renames from.
    pub fn staging_path(&self) -> PathBuf {
        self.asset_dir().join("latest.txt.new")
    }

    /// `<root>/<name>/.lock` - advisory lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.asset_dir().join(".lock")
    }

    /// Path of the state (diff) entry for `timestamp`.
    pub fn state_entry(&self, timestamp: &Timestamp) -> PathBuf {
        self.state_dir()
            .join(format!("{}.{ENTRY_EXT}", timestamp.as_str()))
    }

    /// Path of the version (snapshot) entry for `timestamp`.
    pub fn version_entry(&self, timestamp: &Timestamp) -> PathBuf {
        self.version_dir()
            .join(format!("{}.{ENTRY_EXT}", timestamp.as_str()))
    }

    /// Create the asset directory itself with the configured mode.
    ///
    /// The lock file lives in this directory, so this must run before
    /// lock acquisition; otherwise the directory would be created as a
    /// side effect at the process-default mode instead of the
    /// umask-derived one.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::CreateDir` if the directory cannot be
    /// created.
    pub fn ensure_asset_dir(&self, config: &AssetConfig) -> Result<(), LayoutError> {
        let dir = self.asset_dir();
        create_dir_all_with_mode(&dir, config.dir_mode())
            .map_err(|source| LayoutError::CreateDir { path: dir, source })
    }

    /// Create the asset's directories and touch the latest pointer.
    ///
    /// Idempotent: existing directories and a populated pointer are left
    /// untouched. Never deletes anything. Directory and file modes are
    /// derived from the config's umask (Unix only; modes are advisory
    /// elsewhere).
    ///
    /// # Errors
    ///
    /// Returns `LayoutError` if a directory cannot be created or the
    /// pointer cannot be touched.
    pub fn ensure_layout(&self, config: &AssetConfig) -> Result<(), LayoutError> {
        self.ensure_asset_dir(config)?;
        for dir in [self.state_dir(), self.version_dir()] {
            create_dir_all_with_mode(&dir, config.dir_mode()).map_err(|source| {
                LayoutError::CreateDir {
                    path: dir.clone(),
                    source,
                }
            })?;
        }

        // An empty pointer makes the first diff run against empty
        // content, so the first commit is recorded as pure additions.
        let pointer = self.latest_path();
        if !pointer.exists() {
            touch_with_mode(&pointer, config.file_mode()).map_err(|source| {
                LayoutError::TouchPointer {
                    path: pointer.clone(),
                    source,
                }
            })?;
        }

        Ok(())
    }
}

#[cfg(unix)]
fn create_dir_all_with_mode(dir: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(mode).create(dir)
}

#[cfg(not(unix))]
fn create_dir_all_with_mode(dir: &Path, _mode: u32) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

fn touch_with_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    set_mode(&file, mode)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &fs::File, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &fs::File, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths_in(dir: &TempDir) -> AssetPaths {
        AssetPaths::new(
            dir.path().to_path_buf(),
            AssetName::new("syslog").unwrap(),
        )
    }

    #[test]
    fn joins_are_deterministic() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let base = dir.path().join("syslog");
        assert_eq!(paths.state_dir(), base.join("state"));
        assert_eq!(paths.version_dir(), base.join("latest"));
        assert_eq!(paths.latest_path(), base.join("latest.txt"));

        let ts = Timestamp::parse("20260825-101530").unwrap();
        assert_eq!(
            paths.state_entry(&ts),
            base.join("state/20260825-101530.txt")
        );
        assert_eq!(
            paths.version_entry(&ts),
            base.join("latest/20260825-101530.txt")
        );
    }

    #[cfg(unix)]
    #[test]
    fn asset_dir_is_created_with_the_configured_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let config = AssetConfig {
            umask: 0o077,
            ..AssetConfig::default()
        };

        paths.ensure_asset_dir(&config).unwrap();
        let mode = fs::metadata(paths.asset_dir())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn ensure_layout_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let config = AssetConfig::default();

        paths.ensure_layout(&config).unwrap();
        assert!(paths.state_dir().is_dir());
        assert!(paths.version_dir().is_dir());
        assert!(paths.latest_path().is_file());

        // Second run is a no-op and does not clobber the pointer.
        fs::write(paths.latest_path(), b"content\n").unwrap();
        paths.ensure_layout(&config).unwrap();
        assert_eq!(fs::read(paths.latest_path()).unwrap(), b"content\n");
    }
}
