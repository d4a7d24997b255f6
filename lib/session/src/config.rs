//! Session controller configuration.
//!
//! The configuration is built once at startup, either through
//! [`SessionConfig::builder`] or by deserializing it as part of the host's
//! configuration, and validated before first use.

use rootcause::Report;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logout::RETURN_URL_PLACEHOLDER;
use crate::user::DEFAULT_ACCESSIBILITY_MODE;

/// Configuration for the session controller.
///
/// Fields with defaults can be omitted when loading from configuration sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Single sign-out URL with a `%s` placeholder for the encoded return URL
    /// (e.g., "https://cas.example.edu/cas/logout?service=%s").
    logout_url_template: String,
    /// Application version shown in the UI.
    version: String,
    /// Institution site URL shown in the UI.
    site: String,
    /// Page the identity provider sends the user back to after logout.
    /// Default: "welcome"
    #[serde(default = "default_landing_page")]
    landing_page: String,
    /// UI action token set after logout.
    /// Default: "welcome"
    #[serde(default = "default_landing_action")]
    landing_action: String,
    /// Accessibility mode of anonymous sessions.
    /// Default: "default"
    #[serde(default = "default_accessibility_mode")]
    default_accessibility_mode: String,
}

fn default_landing_page() -> String {
    "welcome".to_string()
}

fn default_landing_action() -> String {
    "welcome".to_string()
}

fn default_accessibility_mode() -> String {
    DEFAULT_ACCESSIBILITY_MODE.to_string()
}

impl SessionConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(
        logout_url_template: impl Into<String>,
        version: impl Into<String>,
        site: impl Into<String>,
    ) -> SessionConfigBuilder {
        SessionConfigBuilder::new(logout_url_template, version, site)
    }

    /// Checks that every required value is present and usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingValue` for blank required values and
    /// `ConfigError::InvalidTemplate` when the logout template has no
    /// placeholder for the return URL.
    pub fn validate(&self) -> Result<(), Report<ConfigError>> {
        let required = [
            ("logout_url_template", &self.logout_url_template),
            ("version", &self.version),
            ("site", &self.site),
            ("landing_page", &self.landing_page),
            ("landing_action", &self.landing_action),
            ("default_accessibility_mode", &self.default_accessibility_mode),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::MissingValue { field: *field }.into());
        }

        if !self.logout_url_template.contains(RETURN_URL_PLACEHOLDER) {
            return Err(ConfigError::InvalidTemplate {
                template: self.logout_url_template.clone(),
            }
            .into());
        }

        Ok(())
    }

    #[must_use]
    pub fn logout_url_template(&self) -> &str {
        &self.logout_url_template
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn site(&self) -> &str {
        &self.site
    }

    #[must_use]
    pub fn landing_page(&self) -> &str {
        &self.landing_page
    }

    #[must_use]
    pub fn landing_action(&self) -> &str {
        &self.landing_action
    }

    #[must_use]
    pub fn default_accessibility_mode(&self) -> &str {
        &self.default_accessibility_mode
    }
}

/// Builder for `SessionConfig`.
#[derive(Debug)]
pub struct SessionConfigBuilder {
    logout_url_template: String,
    version: String,
    site: String,
    landing_page: String,
    landing_action: String,
    default_accessibility_mode: String,
}

impl SessionConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(
        logout_url_template: impl Into<String>,
        version: impl Into<String>,
        site: impl Into<String>,
    ) -> Self {
        Self {
            logout_url_template: logout_url_template.into(),
            version: version.into(),
            site: site.into(),
            landing_page: default_landing_page(),
            landing_action: default_landing_action(),
            default_accessibility_mode: default_accessibility_mode(),
        }
    }

    #[must_use]
    pub fn landing_page(mut self, landing_page: impl Into<String>) -> Self {
        self.landing_page = landing_page.into();
        self
    }

    #[must_use]
    pub fn landing_action(mut self, landing_action: impl Into<String>) -> Self {
        self.landing_action = landing_action.into();
        self
    }

    #[must_use]
    pub fn default_accessibility_mode(mut self, mode: impl Into<String>) -> Self {
        self.default_accessibility_mode = mode.into();
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, see [`SessionConfig::validate`].
    pub fn build(self) -> Result<SessionConfig, Report<ConfigError>> {
        let config = SessionConfig {
            logout_url_template: self.logout_url_template,
            version: self.version,
            site: self.site,
            landing_page: self.landing_page,
            landing_action: self.landing_action,
            default_accessibility_mode: self.default_accessibility_mode,
        };
        config.validate()?;
        Ok(config)
    }
}
