//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`AssetName`] - Validated asset name, usable as a directory name
//! - [`Timestamp`] - Fixed-format, lexicographically sortable timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use snapvault::core::types::{AssetName, Timestamp};
//!
//! let name = AssetName::new("syslog").unwrap();
//! assert_eq!(name.as_str(), "syslog");
//!
//! // Path separators and dot-names are rejected
//! assert!(AssetName::new("logs/syslog").is_err());
//! assert!(AssetName::new("..").is_err());
//!
//! let ts = Timestamp::parse("20260825-101530").unwrap();
//! assert!(ts.with_serial(1).unwrap() > ts);
//! ```

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// A validated asset name.
///
/// The name becomes a directory component under the root directory, so
/// it must be safe to use as a single path segment:
/// - Cannot be empty
/// - Cannot be `.` or `..`
/// - Cannot start with `.`
/// - Cannot contain `/`, `\`, or NUL
///
/// # Example
///
/// ```
/// use snapvault::core::types::AssetName;
///
/// let name = AssetName::new("nginx-conf").unwrap();
/// assert_eq!(name.as_str(), "nginx-conf");
///
/// assert!(AssetName::new("").is_err());
/// assert!(AssetName::new(".hidden").is_err());
/// assert!(AssetName::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetName(String);

impl AssetName {
    /// Create a new validated asset name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidAssetName` if the name is not a safe
    /// single path segment.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidAssetName(
                "asset name cannot be empty".into(),
            ));
        }
        if name == "." || name == ".." {
            return Err(TypeError::InvalidAssetName(format!(
                "asset name cannot be '{name}'"
            )));
        }
        if name.starts_with('.') {
            return Err(TypeError::InvalidAssetName(
                "asset name cannot start with '.'".into(),
            ));
        }
        if name.contains('/') || name.contains('\\') || name.contains('\0') {
            return Err(TypeError::InvalidAssetName(
                "asset name cannot contain path separators or NUL".into(),
            ));
        }
        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetName> for String {
    fn from(name: AssetName) -> Self {
        name.0
    }
}

impl std::fmt::Display for AssetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Legacy timestamp format: date and time at second resolution.
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A fixed-format timestamp used as both file name and sort key.
///
/// The base form is `YYYYmmdd-HHMMSS` in local time, matching the legacy
/// on-disk layout. Two commits within the same second would collide on
/// the base form, so [`Timestamp::with_serial`] appends a zero-padded
/// `-NNN` suffix. ASCII `-` sorts below the digits, so for any second S:
///
/// ```text
/// S < S-001 < S-002 < ... < S+1
/// ```
///
/// and lexicographic order on the string form remains chronological.
///
/// # Example
///
/// ```
/// use snapvault::core::types::Timestamp;
///
/// let ts = Timestamp::parse("20260825-101530").unwrap();
/// assert_eq!(ts.as_str(), "20260825-101530");
///
/// let first = ts.with_serial(1).unwrap();
/// let second = ts.with_serial(2).unwrap();
/// assert_eq!(first.as_str(), "20260825-101530-001");
/// assert!(ts < first && first < second);
/// assert!(second < Timestamp::parse("20260825-101531").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

impl Timestamp {
    /// Capture the current local time at second resolution.
    pub fn now() -> Self {
        Self(Local::now().format(TIMESTAMP_FORMAT).to_string())
    }

    /// Parse a timestamp from its string form.
    ///
    /// Accepts the base form `YYYYmmdd-HHMMSS` and the serial-suffixed
    /// form `YYYYmmdd-HHMMSS-NNN`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTimestamp` if the string does not match
    /// either form.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), TypeError> {
        if !s.is_ascii() {
            return Err(TypeError::InvalidTimestamp(format!(
                "timestamp must be ASCII: {s}"
            )));
        }
        let (base, serial) = match s.len() {
            15 => (s, None),
            19 => {
                let (base, rest) = s.split_at(15);
                (base, Some(rest))
            }
            _ => {
                return Err(TypeError::InvalidTimestamp(format!(
                    "unexpected length {}: {s}",
                    s.len()
                )))
            }
        };

        if chrono::NaiveDateTime::parse_from_str(base, TIMESTAMP_FORMAT).is_err() {
            return Err(TypeError::InvalidTimestamp(format!(
                "not a {TIMESTAMP_FORMAT} timestamp: {s}"
            )));
        }

        if let Some(serial) = serial {
            let digits = &serial[1..];
            if !serial.starts_with('-') || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(TypeError::InvalidTimestamp(format!(
                    "malformed serial suffix: {s}"
                )));
            }
        }

        Ok(())
    }

    /// Largest serial suffix. The suffix field is three digits wide; a
    /// wider serial would sort before `-999` and break the ordering
    /// guarantee, so it is rejected instead.
    pub const MAX_SERIAL: u32 = 999;

    /// Derive a collision-disambiguated timestamp for the same second.
    ///
    /// Any existing serial suffix is replaced, so this can be called in a
    /// loop with increasing `serial` until a free name is found.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTimestamp` if `serial` exceeds
    /// [`Timestamp::MAX_SERIAL`].
    pub fn with_serial(&self, serial: u32) -> Result<Self, TypeError> {
        if serial > Self::MAX_SERIAL {
            return Err(TypeError::InvalidTimestamp(format!(
                "serial suffix {serial} exceeds {}",
                Self::MAX_SERIAL
            )));
        }
        let base = &self.0[..15];
        Ok(Self(format!("{base}-{serial:03}")))
    }

    /// Get the timestamp as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
