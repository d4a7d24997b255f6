//! Session controller: who is signed in, and what that means for the UI.
//!
//! The controller is shared by all sessions. Each operation receives the
//! session's [`SessionState`] and the current [`RequestContext`] explicitly.
//!
//! Collaborator failures never reach the caller. They are logged and the
//! operation degrades: an unavailable authenticator means an anonymous
//! request, a failed redirect means a logout that stayed local. The degraded
//! outcome is visible in the returned value.

use portico_core::Uid;
use rootcause::Report;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::collaborator::{Authenticator, RedirectSink, UserDirectory};
use crate::config::SessionConfig;
use crate::context::RequestContext;
use crate::error::ConfigError;
use crate::hosting::{HostingMode, HostingModeDetector};
use crate::logout::{return_url, single_logout_url};
use crate::state::{IdentityTransition, SessionState};
use crate::user::UserProfile;

/// Result of resolving the current user for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    user: Option<UserProfile>,
    transition: Option<IdentityTransition>,
    degraded: bool,
}

impl Resolution {
    fn anonymous(degraded: bool) -> Self {
        Self {
            user: None,
            transition: None,
            degraded,
        }
    }

    /// Returns the resolved profile, or `None` for an anonymous request.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn into_user(self) -> Option<UserProfile> {
        self.user
    }

    /// Returns how the observed identifier relates to the previous one.
    ///
    /// `None` when no identifier was obtained for this request.
    #[must_use]
    pub fn transition(&self) -> Option<&IdentityTransition> {
        self.transition.as_ref()
    }

    /// Returns true if a collaborator failed and the result was degraded.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Result of a logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// Single sign-out URL the client was (or should have been) sent to.
    pub target: String,
    /// False if the redirect could not be issued.
    pub redirected: bool,
}

/// Tracks the authenticated identity of sessions and exposes the session
/// operations used by the UI layer.
#[derive(Clone)]
pub struct SessionController {
    config: Arc<SessionConfig>,
    authenticator: Arc<dyn Authenticator>,
    users: Arc<dyn UserDirectory>,
    detector: Arc<dyn HostingModeDetector>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Creates a controller.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        config: SessionConfig,
        authenticator: Arc<dyn Authenticator>,
        users: Arc<dyn UserDirectory>,
        detector: Arc<dyn HostingModeDetector>,
    ) -> Result<Self, Report<ConfigError>> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            authenticator,
            users,
            detector,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Creates the state for a session whose first request is `ctx`.
    ///
    /// The hosting mode is decided here, once, for the session's lifetime.
    #[must_use]
    pub fn open_session(&self, ctx: &RequestContext) -> SessionState {
        let mode = HostingMode::from_embedded(self.detector.is_embedded(ctx));
        SessionState::new(mode, &self.config)
    }

    /// Resolves the current user and tracks identity changes.
    ///
    /// Embedded sessions take the remote user asserted by the portal;
    /// standalone sessions ask the authenticator. Whenever an identifier is
    /// obtained it is compared with the previous one, and a change resets the
    /// session's navigation state.
    pub async fn current_user(
        &self,
        state: &mut SessionState,
        ctx: &RequestContext,
    ) -> Resolution {
        let (uid, mut degraded) = if state.is_embedded() {
            (ctx.remote_user().cloned(), false)
        } else {
            match self.authenticator.current_user(ctx).await {
                Ok(uid) => (uid, false),
                Err(report) => {
                    warn!(error = %report, "authenticator unavailable, treating request as anonymous");
                    (None, true)
                }
            }
        };

        let Some(uid) = uid else {
            return Resolution::anonymous(degraded);
        };

        let transition = state.observe(&uid);

        let user = match self.users.get_user(&uid).await {
            Ok(user) => user,
            Err(report) => {
                warn!(%uid, error = %report, "profile lookup failed, treating request as anonymous");
                degraded = true;
                None
            }
        };
        if user.is_none() && !degraded {
            debug!(%uid, "authenticated user has no profile");
        }

        Resolution {
            user,
            transition: Some(transition),
            degraded,
        }
    }

    /// Returns true if the UI should offer a login action.
    pub async fn is_login_available(&self, state: &mut SessionState, ctx: &RequestContext) -> bool {
        if state.is_embedded() {
            return false;
        }
        !self.current_user(state, ctx).await.is_authenticated()
    }

    /// Returns true if the UI should offer a logout action.
    pub async fn is_logout_available(
        &self,
        state: &mut SessionState,
        ctx: &RequestContext,
    ) -> bool {
        if state.is_embedded() {
            return false;
        }
        self.current_user(state, ctx).await.is_authenticated()
    }

    /// Logs the session out locally and at the identity provider.
    ///
    /// The session state is replaced by a fresh one (same hosting mode)
    /// whose action token is the configured landing action, then the client
    /// is redirected to the single sign-out URL.
    pub fn logout<R>(
        &self,
        state: &mut SessionState,
        ctx: &RequestContext,
        sink: &mut R,
    ) -> LogoutOutcome
    where
        R: RedirectSink + ?Sized,
    {
        let return_to = return_url(ctx.request_url(), self.config.landing_page());
        let target = single_logout_url(self.config.logout_url_template(), &return_to);

        let previous: Option<Uid> = state.last_uid().cloned();
        *state = SessionState::new(state.hosting_mode(), &self.config);
        state.set_action(Some(self.config.landing_action().to_string()));

        let redirected = match sink.redirect(&target) {
            Ok(()) => true,
            Err(report) => {
                warn!(logout_url = %target, error = %report, "single sign-out redirect failed");
                false
            }
        };

        info!(uid = ?previous, redirected, "session logged out");
        LogoutOutcome { target, redirected }
    }

    /// Returns the accessibility mode in effect for this request.
    ///
    /// Authenticated users get their profile value; anonymous sessions get
    /// the session-local value.
    pub async fn accessibility_mode(
        &self,
        state: &mut SessionState,
        ctx: &RequestContext,
    ) -> String {
        match self.current_user(state, ctx).await.into_user() {
            Some(profile) => profile.accessibility_mode().to_string(),
            None => state.local_accessibility_mode().to_string(),
        }
    }

    /// Sets the accessibility mode.
    ///
    /// Writes the profile of the authenticated user, or the session-local
    /// value for anonymous sessions. Returns false if the profile could not
    /// be saved.
    pub async fn set_accessibility_mode(
        &self,
        state: &mut SessionState,
        ctx: &RequestContext,
        mode: impl Into<String>,
    ) -> bool {
        let mode = mode.into();
        match self.current_user(state, ctx).await.into_user() {
            Some(mut profile) => {
                profile.set_accessibility_mode(mode);
                self.save(profile).await
            }
            None => {
                state.set_local_accessibility_mode(mode);
                true
            }
        }
    }

    /// Sets the UI language for the session and, when someone is signed in,
    /// on their profile. Returns false if the profile could not be saved.
    pub async fn set_language(
        &self,
        state: &mut SessionState,
        ctx: &RequestContext,
        language: impl Into<String>,
    ) -> bool {
        let language = language.into();
        state.set_language(Some(language.clone()));
        match self.current_user(state, ctx).await.into_user() {
            Some(mut profile) => {
                profile.set_language(Some(language));
                self.save(profile).await
            }
            None => true,
        }
    }

    async fn save(&self, profile: UserProfile) -> bool {
        let uid = profile.uid().clone();
        match self.users.save_user(profile).await {
            Ok(()) => true,
            Err(report) => {
                warn!(%uid, error = %report, "failed to save profile");
                false
            }
        }
    }
}
