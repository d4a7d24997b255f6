//! Directory search collaborator.

use async_trait::async_trait;
use ldap3::{LdapConnAsync, Scope, SearchEntry};
use rootcause::Report;
use tracing::{debug, instrument};

use crate::config::LdapConfig;
use crate::error::DirectoryError;
use crate::record::DirectoryRecord;

/// Attribute list requesting every user attribute.
pub const ALL_ATTRIBUTES: &str = "*";

/// Runs searches against a directory.
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Record type produced by this source.
    type Record: DirectoryRecord + Send;

    /// Returns the entries matching `filter`, with `attributes` populated.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be searched.
    async fn search(
        &self,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<Self::Record>, Report<DirectoryError>>;
}

/// LDAP search over one connection per call.
#[derive(Debug, Clone)]
pub struct LdapSearch {
    config: LdapConfig,
}

impl LdapSearch {
    #[must_use]
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &LdapConfig {
        &self.config
    }
}

#[async_trait]
impl DirectorySearch for LdapSearch {
    type Record = SearchEntry;

    #[instrument(skip(self, attributes), fields(url = %self.config.url, base = %self.config.base_dn))]
    async fn search(
        &self,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<SearchEntry>, Report<DirectoryError>> {
        let (conn, mut ldap) = LdapConnAsync::new(&self.config.url).await.map_err(|e| {
            DirectoryError::ConnectionFailed {
                url: self.config.url.clone(),
                reason: e.to_string(),
            }
        })?;
        ldap3::drive!(conn);

        if let Some(dn) = &self.config.bind_dn {
            let password = self.config.bind_password.as_deref().unwrap_or_default();
            ldap.simple_bind(dn, password)
                .await
                .and_then(|result| result.success())
                .map_err(|e| DirectoryError::BindFailed {
                    dn: dn.clone(),
                    reason: e.to_string(),
                })?;
        }

        let attrs: Vec<&str> = attributes.iter().map(String::as_str).collect();
        let (entries, _) = ldap
            .search(&self.config.base_dn, Scope::Subtree, filter, attrs)
            .await
            .and_then(|result| result.success())
            .map_err(|e| DirectoryError::SearchFailed {
                filter: filter.to_string(),
                reason: e.to_string(),
            })?;

        if let Err(e) = ldap.unbind().await {
            debug!(error = %e, "directory unbind failed");
        }

        debug!(entries = entries.len(), "directory search complete");
        Ok(entries.into_iter().map(SearchEntry::construct).collect())
    }
}
