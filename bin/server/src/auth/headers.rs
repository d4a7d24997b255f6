//! Identity and hosting mode taken from request headers.
//!
//! Both a fronting SSO proxy and an embedding portal authenticate users
//! before the request reaches us and assert the result in a header. The
//! session extractor copies the configured headers into the
//! [`RequestContext`]; these collaborators read them back.

use async_trait::async_trait;
use portico_core::Uid;
use portico_session::{
    AuthenticationError, Authenticator, FixedHostingMode, HostingMode, HostingModeDetector,
    RequestContext,
};
use rootcause::Report;
use std::sync::Arc;

use crate::config::{HostingConfig, HostingPolicy};

/// Reads the authenticated user from a header set by an SSO proxy.
#[derive(Debug, Clone)]
pub struct HeaderAuthenticator {
    header: String,
}

impl HeaderAuthenticator {
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

#[async_trait]
impl Authenticator for HeaderAuthenticator {
    async fn current_user(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Uid>, Report<AuthenticationError>> {
        match ctx.attribute(&self.header) {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Err(AuthenticationError::Unavailable {
                reason: format!("header '{}' is present but empty", self.header),
            }
            .into()),
            Some(value) => Ok(Some(Uid::new(value.trim()))),
        }
    }
}

/// Treats a session as embedded when its first request carries the portal
/// marker header.
#[derive(Debug, Clone)]
pub struct PortalMarkerDetector {
    header: String,
}

impl PortalMarkerDetector {
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl HostingModeDetector for PortalMarkerDetector {
    fn is_embedded(&self, ctx: &RequestContext) -> bool {
        ctx.attribute(&self.header).is_some()
    }
}

/// Returns the detector for the configured hosting policy.
#[must_use]
pub fn detector(config: &HostingConfig) -> Arc<dyn HostingModeDetector> {
    match config.mode {
        HostingPolicy::Auto => Arc::new(PortalMarkerDetector::new(&config.portal_marker_header)),
        HostingPolicy::Embedded => Arc::new(FixedHostingMode(HostingMode::Embedded)),
        HostingPolicy::Standalone => Arc::new(FixedHostingMode(HostingMode::Standalone)),
    }
}
