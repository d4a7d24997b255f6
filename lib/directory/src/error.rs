//! Error types for the directory crate.
//!
//! All of these propagate to the caller. A missing identifier or a missing
//! requested attribute is not an error; it only yields an incomplete
//! attribute set.

use std::fmt;

/// Errors from directory lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The values of one attribute could not be enumerated.
    LookupFailed { attribute: String, reason: String },
    /// The directory server could not be reached.
    ConnectionFailed { url: String, reason: String },
    /// The search identity was rejected.
    BindFailed { dn: String, reason: String },
    /// The search request failed.
    SearchFailed { filter: String, reason: String },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookupFailed { attribute, reason } => {
                write!(f, "failed to read values of attribute '{attribute}': {reason}")
            }
            Self::ConnectionFailed { url, reason } => {
                write!(f, "failed to connect to directory '{url}': {reason}")
            }
            Self::BindFailed { dn, reason } => {
                write!(f, "directory bind as '{dn}' failed: {reason}")
            }
            Self::SearchFailed { filter, reason } => {
                write!(f, "directory search '{filter}' failed: {reason}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}
