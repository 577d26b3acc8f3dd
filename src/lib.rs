//! Snapvault - filesystem-native versioning for a single named text asset
//!
//! Snapvault captures the content of one named asset (a log file, a config
//! snapshot) on every invocation, diffs it against the last committed
//! content, and - only when the content changed - publishes a full
//! snapshot, a unified diff, and an updated latest pointer, then prunes
//! history beyond a retention limit.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`core`] - Domain types, configuration, and path routing
//! - [`diff`] - Pluggable unified-diff collaborators (external tool or
//!   in-process)
//! - [`engine`] - The capture -> diff -> commit -> purge sequence and the
//!   per-asset advisory lock
//!
//! # Correctness Invariants
//!
//! 1. A version entry and its state entry for a given timestamp are
//!    created together or not at all
//! 2. The latest pointer is replaced atomically (rename swap); it is never
//!    absent after first use
//! 3. Only one exec runs against an asset at a time (advisory lock)
//! 4. Temporary files are removed on every exit path
//!
//! # Example
//!
//! ```no_run
//! use snapvault::engine::Asset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let asset = Asset::new("/var/lib/snapvault", "syslog")?;
//! asset.exec_with(|| std::fs::read("/var/log/system.log"))?;
//! let content = asset.latest()?;
//! # let _ = content;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod diff;
pub mod engine;
