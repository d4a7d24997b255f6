//! Session identity tracking for portico.
//!
//! This crate provides:
//! - Per-session state (`SessionState`) with identity-change detection
//! - The session controller (`SessionController`) used by the UI layer
//! - Collaborator traits for authentication, profiles, hosting mode
//!   detection and redirects
//! - Single sign-out URL construction
//!
//! # Hosting Modes
//!
//! Embedded in a portal, the portal authenticates users and asserts the
//! remote user on every request; login and logout actions are never offered.
//! Standalone, an [`Authenticator`] answers who is signed in.
//!
//! # Example
//!
//! ```
//! use portico_session::{HostingMode, IdentityTransition, SessionConfig, SessionState};
//! use portico_core::Uid;
//!
//! let config = SessionConfig::builder(
//!     "https://cas.example.edu/cas/logout?service=%s",
//!     "1.0.0",
//!     "https://www.example.edu",
//! )
//! .build()
//! .expect("valid configuration");
//!
//! let mut state = SessionState::new(HostingMode::Embedded, &config);
//! assert_eq!(state.observe(&Uid::new("alice")), IdentityTransition::First);
//! assert!(state.observe(&Uid::new("bob")).is_reset());
//! ```

pub mod collaborator;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod hosting;
pub mod logout;
pub mod state;
pub mod user;

// Re-export main types at crate root
pub use collaborator::{
    Authenticator, InMemoryUserDirectory, RecordingRedirect, RedirectSink, UserDirectory,
};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use context::RequestContext;
pub use controller::{LogoutOutcome, Resolution, SessionController};
pub use error::{AuthenticationError, ConfigError, ProfileError, RedirectError};
pub use hosting::{FixedHostingMode, HostingMode, HostingModeDetector};
pub use logout::{return_url, single_logout_url};
pub use state::{IdentityTransition, SessionState};
pub use user::{DEFAULT_ACCESSIBILITY_MODE, UserProfile};
