//! diff::native
//!
//! In-process unified diff on the `similar` crate.
//!
//! Produces the same headers as [`super::SystemDiff`] (`--- previous` /
//! `+++ current`) so state entries remain interchangeable regardless of
//! which collaborator wrote them. Content is diffed line-wise after a
//! lossy UTF-8 conversion; the engine versions text assets.

use std::fs;
use std::path::Path;

use similar::{DiffTag, TextDiff};

use super::{DiffError, DiffOutput, Differ};

/// Number of context lines around each hunk, matching `diff -u`.
const CONTEXT_RADIUS: usize = 3;

/// In-process diff collaborator.
///
/// Unlike [`super::SystemDiff`] this needs no external tool, at the cost
/// of byte-exact parity with a particular diff implementation's hunk
/// selection.
#[derive(Debug, Clone, Default)]
pub struct NativeDiff;

impl Differ for NativeDiff {
    fn unified_diff(&self, baseline: &Path, current: &Path) -> Result<DiffOutput, DiffError> {
        // A missing baseline reads as empty content, so a first-ever run
        // is recorded as pure additions.
        let old = read_or_empty(baseline)?;
        let new = read_or_empty(current)?;

        let old_text = String::from_utf8_lossy(&old);
        let new_text = String::from_utf8_lossy(&new);

        let diff = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref());
        if diff.ops().iter().all(|op| op.tag() == DiffTag::Equal) {
            return Ok(DiffOutput::unchanged());
        }

        let text = diff
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header("previous", "current")
            .to_string();
        Ok(DiffOutput::new(text.into_bytes()))
    }
}

fn read_or_empty(path: &Path) -> Result<Vec<u8>, DiffError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(DiffError::ReadInput {
            path: path.to_path_buf(),
            source,
        }),
    }
}
