//! engine::capture
//!
//! Content capture into scoped temporary files.
//!
//! # Resource discipline
//!
//! Captured content and staged diff output live in `NamedTempFile`s
//! allocated inside the asset directory. The commit phase hard-links
//! them into place; the temp names themselves are removed on drop, so
//! every exit path - successful commit, no-change short-circuit, or
//! error - cleans up after itself. Allocating inside the asset directory
//! also keeps the hard links on one filesystem.

use std::io::{self, Write};

use tempfile::NamedTempFile;

use crate::core::paths::AssetPaths;

/// A source of asset content: a literal buffer or a producer invoked
/// exactly once (e.g. "read this log file now").
///
/// Any `FnOnce() -> io::Result<Vec<u8>>` closure is a `ContentSource`;
/// literal buffers go through [`crate::engine::Asset::exec`], which wraps
/// them in one.
pub trait ContentSource {
    /// Produce the content to store. Called exactly once.
    fn produce(self) -> io::Result<Vec<u8>>;
}

impl<F> ContentSource for F
where
    F: FnOnce() -> io::Result<Vec<u8>>,
{
    fn produce(self) -> io::Result<Vec<u8>> {
        self()
    }
}

/// Materialize the source's content into a temp file in the asset dir.
pub(crate) fn capture<S: ContentSource>(
    paths: &AssetPaths,
    file_mode: u32,
    source: S,
) -> io::Result<NamedTempFile> {
    let content = source.produce()?;
    stage_bytes(paths, file_mode, &content)
}

/// Write `bytes` to a fresh temp file in the asset dir.
pub(crate) fn stage_bytes(
    paths: &AssetPaths,
    file_mode: u32,
    bytes: &[u8],
) -> io::Result<NamedTempFile> {
    let mut tmp = tempfile::Builder::new()
        .prefix(paths.name().as_str())
        .tempfile_in(paths.asset_dir())?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    set_mode(tmp.as_file(), file_mode)?;
    Ok(tmp)
}

#[cfg(unix)]
fn set_mode(file: &std::fs::File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &std::fs::File, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AssetName;
    use std::fs;
    use tempfile::TempDir;

    fn paths_in(dir: &TempDir) -> AssetPaths {
        let paths = AssetPaths::new(dir.path().to_path_buf(), AssetName::new("asset").unwrap());
        fs::create_dir_all(paths.asset_dir()).unwrap();
        paths
    }

    #[test]
    fn capture_writes_producer_output() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let tmp = capture(&paths, 0o644, || Ok(b"payload\n".to_vec())).unwrap();
        assert_eq!(fs::read(tmp.path()).unwrap(), b"payload\n");
        assert!(tmp.path().starts_with(paths.asset_dir()));
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let tmp = stage_bytes(&paths, 0o644, b"x").unwrap();
        let path = tmp.path().to_path_buf();
        assert!(path.exists());
        drop(tmp);
        assert!(!path.exists());
    }

    #[test]
    fn producer_error_propagates() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let result = capture(&paths, 0o644, || {
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
        });
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn capture_applies_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let tmp = stage_bytes(&paths, 0o600, b"secret").unwrap();
        let mode = fs::metadata(tmp.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
