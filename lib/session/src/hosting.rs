//! Hosting mode: embedded in a portal, or running standalone.

use serde::{Deserialize, Serialize};

use crate::context::RequestContext;

/// How the application is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostingMode {
    /// Running as a module inside a portal aggregator, which owns
    /// authentication and asserts the remote user.
    Embedded,
    /// Running as an independent web endpoint with its own authenticator.
    Standalone,
}

impl HostingMode {
    /// Returns the mode for a detector answer.
    #[must_use]
    pub fn from_embedded(embedded: bool) -> Self {
        if embedded {
            Self::Embedded
        } else {
            Self::Standalone
        }
    }

    #[must_use]
    pub fn is_embedded(self) -> bool {
        matches!(self, Self::Embedded)
    }
}

impl std::fmt::Display for HostingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::Standalone => write!(f, "standalone"),
        }
    }
}

/// Decides, from the first request of a session, whether we are embedded.
pub trait HostingModeDetector: Send + Sync {
    fn is_embedded(&self, ctx: &RequestContext) -> bool;
}

/// Detector that always gives the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHostingMode(pub HostingMode);

impl HostingModeDetector for FixedHostingMode {
    fn is_embedded(&self, _ctx: &RequestContext) -> bool {
        self.0.is_embedded()
    }
}
