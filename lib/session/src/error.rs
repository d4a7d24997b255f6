//! Error types for the session crate.
//!
//! Errors are returned wrapped in a rootcause `Report`:
//! - `AuthenticationError`: the authenticator collaborator could not answer
//! - `ProfileError`: the user directory could not load or store a profile
//! - `RedirectError`: the single sign-out redirect could not be issued
//! - `ConfigError`: session configuration failed validation
//!
//! Most of these never reach the UI layer. The session controller logs them
//! and degrades to an anonymous or incomplete result instead.

use portico_core::Uid;
use std::fmt;

/// Errors from the authenticator collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The authenticator could not determine the current user.
    Unavailable { reason: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "authentication unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from the user directory collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// A profile was expected to exist but does not.
    NotFound { uid: Uid },
    /// The backing store rejected the operation.
    StorageFailed { uid: Uid, reason: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { uid } => write!(f, "no profile for user {uid}"),
            Self::StorageFailed { uid, reason } => {
                write!(f, "profile storage failed for user {uid}: {reason}")
            }
        }
    }
}

impl std::error::Error for ProfileError {}

/// Errors from issuing a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectError {
    /// The target could not be used as a redirect location.
    InvalidTarget { target: String, reason: String },
    /// A redirect was already issued for this response.
    AlreadyRedirected,
}

impl fmt::Display for RedirectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTarget { target, reason } => {
                write!(f, "cannot redirect to '{target}': {reason}")
            }
            Self::AlreadyRedirected => write!(f, "response already redirected"),
        }
    }
}

impl std::error::Error for RedirectError {}

/// Errors from validating session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is missing or blank.
    MissingValue { field: &'static str },
    /// The logout URL template has no `%s` placeholder.
    InvalidTemplate { template: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { field } => {
                write!(f, "session configuration value '{field}' can not be empty")
            }
            Self::InvalidTemplate { template } => {
                write!(
                    f,
                    "logout URL template '{template}' has no %s placeholder for the return URL"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_unavailable_display() {
        let err = AuthenticationError::Unavailable {
            reason: "ticket validation timed out".to_string(),
        };
        assert!(err.to_string().contains("authentication unavailable"));
        assert!(err.to_string().contains("ticket validation timed out"));
    }

    #[test]
    fn profile_storage_failed_display() {
        let err = ProfileError::StorageFailed {
            uid: Uid::new("alice"),
            reason: "read-only replica".to_string(),
        };
        assert!(err.to_string().contains("alice"));
        assert!(err.to_string().contains("read-only replica"));
    }

    #[test]
    fn redirect_invalid_target_display() {
        let err = RedirectError::InvalidTarget {
            target: "https://cas\n".to_string(),
            reason: "control character".to_string(),
        };
        assert!(err.to_string().contains("cannot redirect"));
    }

    #[test]
    fn config_missing_value_display() {
        let err = ConfigError::MissingValue { field: "site" };
        assert!(err.to_string().contains("'site'"));
    }
}
