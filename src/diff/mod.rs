//! diff
//!
//! Pluggable unified-diff collaborators.
//!
//! # Architecture
//!
//! The engine does not compute diffs itself. It hands a baseline path and
//! a current path to a [`Differ`] and gets back unified-diff text whose
//! emptiness doubles as the changed/unchanged verdict. Two
//! implementations are provided:
//!
//! - [`SystemDiff`] - shells out to an external `diff` tool, matching the
//!   legacy engine byte-for-byte
//! - [`NativeDiff`] - in-process, no external tool required
//!
//! Both emit the fixed labels `previous` and `current` in the `---`/`+++`
//! headers.

pub mod native;
pub mod system;

use std::path::Path;

use thiserror::Error;

pub use native::NativeDiff;
pub use system::SystemDiff;

/// Errors from diff computation.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The external diff tool could not be launched.
    #[error("failed to launch diff tool '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external diff tool reported trouble (exit status other than
    /// 0 "same" or 1 "different").
    #[error("diff tool failed with {status}: {stderr}")]
    Tool { status: String, stderr: String },

    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The result of one unified-diff computation.
///
/// Zero bytes of output means the two inputs are identical; the engine
/// uses this to short-circuit the commit phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutput {
    text: Vec<u8>,
}

impl DiffOutput {
    /// Wrap raw unified-diff text.
    pub fn new(text: Vec<u8>) -> Self {
        Self { text }
    }

    /// An empty output: no change.
    pub fn unchanged() -> Self {
        Self { text: Vec::new() }
    }

    /// True when the inputs were identical.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The diff text.
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Consume into the diff text.
    pub fn into_bytes(self) -> Vec<u8> {
        self.text
    }
}

/// A unified-diff computation collaborator.
///
/// Implementations compare the file at `baseline` against the file at
/// `current` and return unified-diff text with the headers
/// `--- previous` / `+++ current`. Identical inputs yield an empty
/// [`DiffOutput`].
pub trait Differ {
    fn unified_diff(&self, baseline: &Path, current: &Path) -> Result<DiffOutput, DiffError>;
}
