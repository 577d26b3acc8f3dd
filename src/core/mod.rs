//! core
//!
//! Domain types and storage routing for Snapvault.
//!
//! # Modules
//!
//! - [`types`] - Validated asset names and sortable timestamps
//! - [`config`] - Per-asset configuration (retention, modes, verbosity)
//! - [`paths`] - Centralized path routing for the on-disk layout

pub mod config;
pub mod paths;
pub mod types;
