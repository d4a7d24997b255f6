//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server, loaded
//! via the `config` crate from an optional TOML file (path in
//! `PORTICO_CONFIG`) and then from `PORTICO_*` environment variables, with
//! `__` separating nested keys (e.g. `PORTICO_SESSION__VERSION`).
//!
//! See [`SessionConfig`] for the session controller settings and
//! [`LdapConfig`] for the directory settings.

use portico_core::Result;
use portico_directory::LdapConfig;
use portico_session::SessionConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::StartupError;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "PORTICO_CONFIG";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "PORTICO";

/// Server configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    /// Default: 127.0.0.1:3000
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Session controller configuration.
    pub session: SessionConfig,

    /// How the hosting mode and identities are read from requests.
    #[serde(default)]
    pub hosting: HostingConfig,

    #[serde(default)]
    pub cookies: CookieConfig,

    #[serde(default)]
    pub profiles: ProfileConfig,

    /// In-process session registry.
    #[serde(default)]
    pub sessions: SessionStoreConfig,

    /// Directory server. Directory routes answer 503 when absent.
    #[serde(default)]
    pub ldap: Option<LdapConfig>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// How the hosting mode of a new session is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingPolicy {
    /// Embedded when the first request carries the portal marker header.
    #[default]
    Auto,
    Embedded,
    Standalone,
}

/// Request headers used to detect the portal and read identities.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostingConfig {
    /// Default: auto
    #[serde(default)]
    pub mode: HostingPolicy,

    /// Header a portal adds to the requests it forwards.
    /// Default: "x-portal-context"
    #[serde(default = "default_portal_marker_header")]
    pub portal_marker_header: String,

    /// Header carrying the remote user asserted by the portal.
    /// Default: "x-portal-remote-user"
    #[serde(default = "default_remote_user_header")]
    pub remote_user_header: String,

    /// Header carrying the user authenticated by a fronting SSO proxy.
    /// Default: "x-forwarded-user"
    #[serde(default = "default_authenticated_user_header")]
    pub authenticated_user_header: String,
}

fn default_portal_marker_header() -> String {
    "x-portal-context".to_string()
}

fn default_remote_user_header() -> String {
    "x-portal-remote-user".to_string()
}

fn default_authenticated_user_header() -> String {
    "x-forwarded-user".to_string()
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            mode: HostingPolicy::default(),
            portal_marker_header: default_portal_marker_header(),
            remote_user_header: default_remote_user_header(),
            authenticated_user_header: default_authenticated_user_header(),
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CookieConfig {
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure: bool,
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: default_secure_cookies(),
        }
    }
}

/// Session registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStoreConfig {
    /// Minutes a session may stay unused before it is forgotten.
    /// Default: 30
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: u64,

    /// How often to sweep idle sessions.
    /// Default: 300 (5 minutes)
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

fn default_idle_timeout_minutes() -> u64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
        }
    }
}

impl SessionStoreConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_minutes.saturating_mul(60))
    }

    #[must_use]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

/// User profile store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileConfig {
    /// Create a profile with default preferences the first time an
    /// authenticated user is seen.
    #[serde(default)]
    pub auto_provision: bool,
}

impl ServerConfig {
    /// Loads configuration from the file named by `PORTICO_CONFIG`, if set,
    /// and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn load() -> Result<Self, StartupError> {
        let path = std::env::var_os(CONFIG_PATH_VAR);
        Self::from_sources(path.as_deref().map(Path::new), environment())
    }

    /// Loads configuration from an optional file, then `env`, later sources
    /// overriding earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, required configuration is
    /// missing, or validation fails.
    pub fn from_sources(
        file: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, StartupError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let config: Self = builder
            .add_source(env)
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| StartupError::Config {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that deserialization cannot.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), StartupError> {
        self.session.validate().map_err(|e| StartupError::Config {
            reason: e.to_string(),
        })?;

        let headers = [
            ("hosting.portal_marker_header", &self.hosting.portal_marker_header),
            ("hosting.remote_user_header", &self.hosting.remote_user_header),
            (
                "hosting.authenticated_user_header",
                &self.hosting.authenticated_user_header,
            ),
        ];
        for (field, name) in headers {
            if axum::http::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(StartupError::Config {
                    reason: format!("{field} '{name}' is not a valid header name"),
                }
                .into());
            }
        }

        let store = &self.sessions;
        if store.idle_timeout_minutes == 0 || store.cleanup_interval_seconds == 0 {
            return Err(StartupError::Config {
                reason: "sessions.idle_timeout_minutes and \
                         sessions.cleanup_interval_seconds must be positive"
                    .to_string(),
            }
            .into());
        }

        if let Some(ldap) = &self.ldap {
            if ldap.url.trim().is_empty() || ldap.base_dn.trim().is_empty() {
                return Err(StartupError::Config {
                    reason: "ldap.url and ldap.base_dn must not be empty".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Environment source for `PORTICO_*` variables.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("ldap.attributes")
}
