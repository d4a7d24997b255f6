//! Per-session state.
//!
//! A `SessionState` lives as long as the user's session with the host. It
//! remembers which principal it last saw so that a change of identity within
//! one session can be detected and the UI navigation state reset.

use portico_core::Uid;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::hosting::HostingMode;

/// Outcome of observing an authenticated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentityTransition {
    /// No identifier had been observed in this session yet.
    First,
    /// Same identifier as the previous observation.
    Unchanged,
    /// A different principal took over the session. Dependent state was reset.
    Changed { previous: Uid },
}

impl IdentityTransition {
    /// Returns true if dependent state was reset.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// State kept for one user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Decided when the session was created; never changes afterwards.
    hosting_mode: HostingMode,
    /// Identifier of the last authenticated principal seen.
    last_uid: Option<Uid>,
    /// Current UI action token.
    action: Option<String>,
    /// Action token the UI navigated from.
    from_action: Option<String>,
    /// Accessibility mode used while nobody is authenticated.
    accessibility_mode: String,
    /// Language chosen during this session.
    language: Option<String>,
}

impl SessionState {
    /// Creates the state for a new session.
    #[must_use]
    pub fn new(hosting_mode: HostingMode, config: &SessionConfig) -> Self {
        tracing::debug!(%hosting_mode, "session created");
        Self {
            hosting_mode,
            last_uid: None,
            action: None,
            from_action: None,
            accessibility_mode: config.default_accessibility_mode().to_string(),
            language: None,
        }
    }

    #[must_use]
    pub fn hosting_mode(&self) -> HostingMode {
        self.hosting_mode
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.hosting_mode.is_embedded()
    }

    #[must_use]
    pub fn last_uid(&self) -> Option<&Uid> {
        self.last_uid.as_ref()
    }

    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn set_action(&mut self, action: Option<String>) {
        self.action = action;
    }

    #[must_use]
    pub fn from_action(&self) -> Option<&str> {
        self.from_action.as_deref()
    }

    pub fn set_from_action(&mut self, from_action: Option<String>) {
        self.from_action = from_action;
    }

    /// Returns the session-local accessibility mode.
    ///
    /// This is only meaningful while no user is authenticated; the session
    /// controller reads the profile value otherwise.
    #[must_use]
    pub fn local_accessibility_mode(&self) -> &str {
        &self.accessibility_mode
    }

    pub(crate) fn set_local_accessibility_mode(&mut self, mode: String) {
        self.accessibility_mode = mode;
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub(crate) fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    /// Clears the UI navigation state.
    pub fn reset(&mut self) {
        self.action = None;
        self.from_action = None;
    }

    /// Records `uid` as the current principal.
    ///
    /// When it differs from the previously observed principal, navigation
    /// state is reset before the new identifier is stored.
    pub fn observe(&mut self, uid: &Uid) -> IdentityTransition {
        match self.last_uid.replace(uid.clone()) {
            None => IdentityTransition::First,
            Some(previous) if previous == *uid => IdentityTransition::Unchanged,
            Some(previous) => {
                self.reset();
                tracing::debug!(%previous, current = %uid, "session identity changed");
                IdentityTransition::Changed { previous }
            }
        }
    }
}
