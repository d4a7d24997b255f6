//! Session and sign-out handling for the portico server.
//!
//! This module provides:
//! - Header-based authentication and hosting mode detection
//! - The session extractor that ties requests to server-side session state
//! - Session, preference and logout routes
//!
//! # Identity Sources
//!
//! The server never authenticates anyone itself. Standalone, a fronting SSO
//! proxy asserts the signed-in user in a header. Embedded, the portal asserts
//! the remote user in its own header and marks the requests it forwards.
//! Which headers are read is configured in [`HostingConfig`](crate::config::HostingConfig).

pub mod headers;
pub mod middleware;
pub mod routes;

pub use headers::{HeaderAuthenticator, PortalMarkerDetector, detector};
pub use middleware::{CurrentSession, SESSION_COOKIE};
pub use routes::{logout, session_info, set_accessibility, set_action, set_language};
