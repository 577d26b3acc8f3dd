//! engine::purge
//!
//! Retention pruning of historical entries.
//!
//! Version entries are pruned to `retain_versions`. State entries are
//! pruned only when `retain_states` is set; the default keeps every diff
//! ever written, matching the legacy engine's behavior.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::EngineError;
use crate::core::config::AssetConfig;
use crate::core::paths::AssetPaths;

/// List entry files in `dir`, newest-first.
///
/// Entries are sorted by file stem, not full file name: stems are
/// timestamps whose lexicographic order is chronological, while the
/// `.txt` extension would make a serial-suffixed stem (`...-001`)
/// compare below its bare same-second sibling (`-` sorts before `.`).
/// A missing directory reads as empty.
pub(crate) fn list_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            entries.push(entry.path());
        }
    }
    entries.sort_by(|a, b| b.file_stem().cmp(&a.file_stem()));
    Ok(entries)
}

/// Prune version entries (and, when configured, state entries) beyond
/// the retention limits.
pub(crate) fn purge(paths: &AssetPaths, config: &AssetConfig) -> Result<(), EngineError> {
    prune_dir(&paths.version_dir(), config.retain_versions, config.verbose)?;
    if let Some(retain) = config.retain_states {
        prune_dir(&paths.state_dir(), retain, config.verbose)?;
    }
    Ok(())
}

fn prune_dir(dir: &Path, retain: usize, verbose: bool) -> Result<(), EngineError> {
    let entries = list_entries(dir).map_err(|source| EngineError::List {
        dir: dir.to_path_buf(),
        source,
    })?;

    for path in entries.iter().skip(retain) {
        if verbose {
            info!("unlinking {}", path.display());
        } else {
            debug!("unlinking {}", path.display());
        }
        fs::remove_file(path).map_err(|source| EngineError::Unlink {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AssetName;
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> AssetPaths {
        let paths = AssetPaths::new(dir.path().to_path_buf(), AssetName::new("asset").unwrap());
        paths.ensure_layout(&AssetConfig::default()).unwrap();
        paths
    }

    fn seed(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(format!("{name}.txt")), name).unwrap();
        }
    }

    #[test]
    fn entries_are_listed_newest_first() {
        let dir = TempDir::new().unwrap();
        let paths = setup(&dir);
        seed(
            &paths.version_dir(),
            &["20260825-101530", "20260825-101532", "20260825-101531"],
        );

        let listed = list_entries(&paths.version_dir()).unwrap();
        let names: Vec<_> = listed
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "20260825-101532.txt",
                "20260825-101531.txt",
                "20260825-101530.txt"
            ]
        );
    }

    #[test]
    fn serial_suffixed_entries_sort_after_their_second() {
        let dir = TempDir::new().unwrap();
        let paths = setup(&dir);
        seed(
            &paths.version_dir(),
            &["20260825-101530", "20260825-101530-001", "20260825-101529"],
        );

        let listed = list_entries(&paths.version_dir()).unwrap();
        let names: Vec<_> = listed
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "20260825-101530-001.txt",
                "20260825-101530.txt",
                "20260825-101529.txt"
            ]
        );
    }

    #[test]
    fn missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_entries(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn purge_keeps_newest_versions_only() {
        let dir = TempDir::new().unwrap();
        let paths = setup(&dir);
        seed(
            &paths.version_dir(),
            &["20260825-101530", "20260825-101531", "20260825-101532"],
        );
        seed(&paths.state_dir(), &["20260825-101530", "20260825-101531"]);

        let config = AssetConfig {
            retain_versions: 2,
            ..AssetConfig::default()
        };
        purge(&paths, &config).unwrap();

        let kept = list_entries(&paths.version_dir()).unwrap();
        assert_eq!(kept.len(), 2);
        assert!(paths.version_dir().join("20260825-101532.txt").exists());
        assert!(paths.version_dir().join("20260825-101531.txt").exists());
        assert!(!paths.version_dir().join("20260825-101530.txt").exists());

        // Diffs untouched by default.
        assert_eq!(list_entries(&paths.state_dir()).unwrap().len(), 2);
    }

    #[test]
    fn state_retention_prunes_diffs_when_set() {
        let dir = TempDir::new().unwrap();
        let paths = setup(&dir);
        seed(
            &paths.state_dir(),
            &["20260825-101530", "20260825-101531", "20260825-101532"],
        );

        let config = AssetConfig {
            retain_states: Some(1),
            ..AssetConfig::default()
        };
        purge(&paths, &config).unwrap();

        let kept = list_entries(&paths.state_dir()).unwrap();
        assert_eq!(kept.len(), 1);
        assert!(paths.state_dir().join("20260825-101532.txt").exists());
    }
}
