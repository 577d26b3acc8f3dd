//! engine::commit
//!
//! Publishing a new state entry, version entry, and latest pointer.
//!
//! # Hard links
//!
//! Each published name is a hard link to a temp file written by the
//! capture phase, so the content is stored once per commit regardless of
//! how many names reference it.
//!
//! # Pointer swap
//!
//! The latest pointer is replaced by linking the captured content to a
//! staging name and renaming it over `latest.txt`. Rename is atomic on a
//! single filesystem, so the pointer is never absent: a reader sees the
//! old content or the new content, nothing in between.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::EngineError;
use crate::core::config::AssetConfig;
use crate::core::paths::AssetPaths;
use crate::core::types::Timestamp;

/// Publish `current` and `diff` under `timestamp`.
///
/// Only called for a non-empty diff. Order matters: the state entry and
/// version entry are linked before the pointer swap, so a failure
/// partway through never leaves the pointer pointing at content that has
/// no version entry.
pub(crate) fn commit(
    paths: &AssetPaths,
    config: &AssetConfig,
    timestamp: &Timestamp,
    current: &Path,
    diff: &Path,
) -> Result<(), EngineError> {
    link(config, diff, &paths.state_entry(timestamp))?;
    link(config, current, &paths.version_entry(timestamp))?;
    swap_pointer(paths, config, current)?;
    Ok(())
}

/// Hard-link `target` to `link_path`.
fn link(config: &AssetConfig, target: &Path, link_path: &Path) -> Result<(), EngineError> {
    report(
        config.verbose,
        &format!("linking {} -> {}", target.display(), link_path.display()),
    );
    fs::hard_link(target, link_path).map_err(|source| EngineError::Link {
        link: link_path.to_path_buf(),
        source,
    })
}

/// Re-establish the latest pointer via an atomic rename.
fn swap_pointer(paths: &AssetPaths, config: &AssetConfig, current: &Path) -> Result<(), EngineError> {
    let staging = paths.staging_path();

    // A stale staging name can survive an interrupted commit.
    if staging.exists() {
        report(
            config.verbose,
            &format!("unlinking stale {}", staging.display()),
        );
        fs::remove_file(&staging).map_err(|source| EngineError::Unlink {
            path: staging.clone(),
            source,
        })?;
    }

    link(config, current, &staging)?;

    let pointer = paths.latest_path();
    report(
        config.verbose,
        &format!("renaming {} -> {}", staging.display(), pointer.display()),
    );
    fs::rename(&staging, &pointer).map_err(EngineError::Swap)
}

fn report(verbose: bool, message: &str) {
    if verbose {
        info!("{message}");
    } else {
        debug!("{message}");
    }
}
