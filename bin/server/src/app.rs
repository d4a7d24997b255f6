//! Application state and router.

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, put},
};
use portico_core::RequestId;
use portico_directory::LdapUserService;
use portico_session::{ConfigError, InMemoryUserDirectory, SessionController};
use rootcause::Report;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, HeaderAuthenticator};
use crate::config::{CookieConfig, HostingConfig, ServerConfig};
use crate::directory::{self, UserLookup};
use crate::store::SessionStore;

/// Shared application state.
pub struct AppState {
    pub controller: SessionController,
    pub sessions: SessionStore,
    pub hosting: HostingConfig,
    pub cookies: CookieConfig,
    /// Directory lookups, when a directory server is configured.
    pub directory: Option<Arc<dyn UserLookup>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        controller: SessionController,
        sessions: SessionStore,
        hosting: HostingConfig,
        cookies: CookieConfig,
        directory: Option<Arc<dyn UserLookup>>,
    ) -> Self {
        Self {
            controller,
            sessions,
            hosting,
            cookies,
            directory,
        }
    }

    /// Wires the header-based collaborators, the in-memory profile store and
    /// the LDAP directory described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session configuration is invalid.
    pub fn from_config(config: ServerConfig) -> Result<Self, Report<ConfigError>> {
        let controller = SessionController::new(
            config.session,
            Arc::new(HeaderAuthenticator::new(
                &config.hosting.authenticated_user_header,
            )),
            Arc::new(InMemoryUserDirectory::new(config.profiles.auto_provision)),
            auth::detector(&config.hosting),
        )?;

        let directory = config.ldap.map(|ldap| {
            tracing::info!(url = %ldap.url, base_dn = %ldap.base_dn, "directory configured");
            Arc::new(LdapUserService::from_config(ldap)) as Arc<dyn UserLookup>
        });

        Ok(Self::new(
            controller,
            SessionStore::new(config.sessions.idle_timeout()),
            config.hosting,
            config.cookies,
            directory,
        ))
    }
}

/// Builds the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session", get(auth::session_info))
        .route("/session/accessibility", put(auth::set_accessibility))
        .route("/session/language", put(auth::set_language))
        .route("/session/action", put(auth::set_action))
        .route("/auth/logout", get(auth::logout))
        .route("/directory/users/{uid}", get(directory::get_user))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %RequestId::new(),
                )
            }),
        )
        .with_state(state)
}
