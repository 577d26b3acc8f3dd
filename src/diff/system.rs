//! diff::system
//!
//! Unified diff via an external tool.
//!
//! Invokes `diff -u --label previous --label current <baseline> <current>`
//! and captures stdout. This is the legacy collaborator: its output is
//! byte-identical to what the original engine stored, including the
//! `\ No newline at end of file` markers.
//!
//! Exit status contract (POSIX diff): 0 means the inputs are identical,
//! 1 means they differ, anything else is trouble and is surfaced as
//! [`DiffError::Tool`].

use std::path::Path;
use std::process::Command;

use super::{DiffError, DiffOutput, Differ};

/// External `diff` tool collaborator.
///
/// # Example
///
/// ```no_run
/// use snapvault::diff::{Differ, SystemDiff};
/// use std::path::Path;
///
/// let differ = SystemDiff::default();
/// let out = differ.unified_diff(Path::new("a.txt"), Path::new("b.txt"))?;
/// if out.is_empty() {
///     println!("no change");
/// }
/// # Ok::<(), snapvault::diff::DiffError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SystemDiff {
    program: String,
}

impl Default for SystemDiff {
    fn default() -> Self {
        Self::new("diff")
    }
}

impl SystemDiff {
    /// Use a specific diff program (e.g. `gdiff`, an absolute path).
    ///
    /// The program must accept `-u` and `--label`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Differ for SystemDiff {
    fn unified_diff(&self, baseline: &Path, current: &Path) -> Result<DiffOutput, DiffError> {
        let output = Command::new(&self.program)
            .arg("-u")
            .args(["--label", "previous", "--label", "current"])
            .arg(baseline)
            .arg(current)
            .output()
            .map_err(|source| DiffError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        match output.status.code() {
            Some(0) => Ok(DiffOutput::unchanged()),
            Some(1) => Ok(DiffOutput::new(output.stdout)),
            _ => Err(DiffError::Tool {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }
}
