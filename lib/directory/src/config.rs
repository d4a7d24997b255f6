//! Directory server configuration.

use serde::{Deserialize, Serialize};

use crate::mapper::{AttributeMapper, AttributeSelection};

/// Connection and mapping settings for an LDAP directory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Server URL (e.g., "ldaps://ldap.example.edu:636").
    pub url: String,
    /// DN to bind as before searching. Anonymous bind when absent.
    #[serde(default)]
    pub bind_dn: Option<String>,
    /// Password for `bind_dn`.
    #[serde(default)]
    pub bind_password: Option<String>,
    /// Search base (e.g., "ou=people,dc=example,dc=edu").
    pub base_dn: String,
    /// Attribute holding the user identifier.
    /// Default: "uid"
    #[serde(default = "default_uid_attribute")]
    pub uid_attribute: String,
    /// Attributes to extract. All attributes when absent.
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
}

fn default_uid_attribute() -> String {
    "uid".to_string()
}

impl LdapConfig {
    /// Creates a configuration for an anonymous bind extracting all attributes.
    #[must_use]
    pub fn new(url: impl Into<String>, base_dn: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bind_dn: None,
            bind_password: None,
            base_dn: base_dn.into(),
            uid_attribute: default_uid_attribute(),
            attributes: None,
        }
    }

    /// Returns the mapper configured by these settings.
    #[must_use]
    pub fn mapper(&self) -> AttributeMapper {
        AttributeMapper::new(
            self.uid_attribute.clone(),
            AttributeSelection::from(self.attributes.clone()),
        )
    }
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &self.bind_password.as_ref().map(|_| "<redacted>"))
            .field("base_dn", &self.base_dn)
            .field("uid_attribute", &self.uid_attribute)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: LdapConfig = serde_json::from_str(
            r#"{"url": "ldap://ldap.example.edu", "base_dn": "ou=people,dc=example,dc=edu"}"#,
        )
        .expect("deserialize");

        assert_eq!(config.uid_attribute, "uid");
        assert!(config.bind_dn.is_none());
        assert_eq!(config.mapper().selection(), &AttributeSelection::All);
    }

    #[test]
    fn named_attributes_build_named_mapper() {
        let mut config = LdapConfig::new("ldap://ldap.example.edu", "dc=example,dc=edu");
        config.uid_attribute = "sAMAccountName".to_string();
        config.attributes = Some(vec!["cn".to_string(), "mail".to_string()]);

        let mapper = config.mapper();
        assert_eq!(mapper.uid_attribute(), "sAMAccountName");
        assert_eq!(
            mapper.selection(),
            &AttributeSelection::Named(vec!["cn".to_string(), "mail".to_string()])
        );
    }

    #[test]
    fn debug_redacts_password() {
        let mut config = LdapConfig::new("ldap://ldap.example.edu", "dc=example,dc=edu");
        config.bind_password = Some("hunter2".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
