//! User lookups against a directory.

use ldap3::ldap_escape;
use rootcause::Report;

use crate::config::LdapConfig;
use crate::error::DirectoryError;
use crate::mapper::{AttributeMapper, AttributeSelection, DirectoryAttributeSet};
use crate::search::{ALL_ATTRIBUTES, DirectorySearch, LdapSearch};

/// Looks users up in a directory and maps the entries found.
#[derive(Debug, Clone)]
pub struct LdapUserService<S> {
    search: S,
    mapper: AttributeMapper,
}

impl LdapUserService<LdapSearch> {
    /// Creates a service talking to the LDAP server described by `config`.
    #[must_use]
    pub fn from_config(config: LdapConfig) -> Self {
        let mapper = config.mapper();
        Self::new(LdapSearch::new(config), mapper)
    }
}

impl<S: DirectorySearch> LdapUserService<S> {
    #[must_use]
    pub fn new(search: S, mapper: AttributeMapper) -> Self {
        Self { search, mapper }
    }

    #[must_use]
    pub fn mapper(&self) -> &AttributeMapper {
        &self.mapper
    }

    /// Returns the attributes of the user identified by `uid`.
    ///
    /// When several entries match, the first one wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the search or the mapping fails.
    pub async fn get_user(
        &self,
        uid: &str,
    ) -> Result<Option<DirectoryAttributeSet>, Report<DirectoryError>> {
        let filter = format!("({}={})", self.mapper.uid_attribute(), ldap_escape(uid));
        let entries = self
            .search
            .search(&filter, &self.requested_attributes())
            .await?;
        entries
            .first()
            .map(|entry| self.mapper.map(entry))
            .transpose()
    }

    /// Returns the attributes of every entry matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the search or any mapping fails.
    pub async fn search_users(
        &self,
        filter: &str,
    ) -> Result<Vec<DirectoryAttributeSet>, Report<DirectoryError>> {
        let entries = self
            .search
            .search(filter, &self.requested_attributes())
            .await?;
        entries.iter().map(|entry| self.mapper.map(entry)).collect()
    }

    fn requested_attributes(&self) -> Vec<String> {
        match self.mapper.selection() {
            AttributeSelection::All => vec![ALL_ATTRIBUTES.to_string()],
            AttributeSelection::Named(names) => {
                let uid = self.mapper.uid_attribute();
                let mut attrs = vec![uid.to_string()];
                attrs.extend(
                    names
                        .iter()
                        .filter(|name| !name.eq_ignore_ascii_case(uid))
                        .cloned(),
                );
                attrs
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Search that returns canned records and remembers its requests.
    struct StaticSearch {
        records: Vec<RawRecord>,
        requests: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl StaticSearch {
        fn new(records: Vec<RawRecord>) -> Self {
            Self {
                records,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, Vec<String>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DirectorySearch for StaticSearch {
        type Record = RawRecord;

        async fn search(
            &self,
            filter: &str,
            attributes: &[String],
        ) -> Result<Vec<RawRecord>, Report<DirectoryError>> {
            self.requests
                .lock()
                .unwrap()
                .push((filter.to_string(), attributes.to_vec()));
            Ok(self.records.clone())
        }
    }

    struct UnreachableSearch;

    #[async_trait]
    impl DirectorySearch for UnreachableSearch {
        type Record = RawRecord;

        async fn search(
            &self,
            _filter: &str,
            _attributes: &[String],
        ) -> Result<Vec<RawRecord>, Report<DirectoryError>> {
            Err(DirectoryError::ConnectionFailed {
                url: "ldap://ldap.example.edu".to_string(),
                reason: "connection refused".to_string(),
            }
            .into())
        }
    }

    fn alice() -> RawRecord {
        RawRecord::new()
            .with_text("uid", ["alice"])
            .with_text("cn", ["Alice Smith"])
            .with_text("mail", ["alice@example.edu"])
    }

    fn named_mapper() -> AttributeMapper {
        AttributeMapper::new(
            "uid",
            AttributeSelection::Named(vec!["cn".to_string(), "uid".to_string()]),
        )
    }

    #[tokio::test]
    async fn get_user_maps_first_entry() {
        let service = LdapUserService::new(StaticSearch::new(vec![alice()]), named_mapper());

        let set = service
            .get_user("alice")
            .await
            .expect("lookup")
            .expect("entry");

        assert_eq!(set.id(), Some("alice"));
        assert_eq!(set.first("cn"), Some("Alice Smith"));
        assert!(set.get("mail").is_none());
    }

    #[tokio::test]
    async fn get_user_requests_uid_and_named_attributes() {
        let service = LdapUserService::new(StaticSearch::new(vec![alice()]), named_mapper());
        service.get_user("alice").await.expect("lookup");

        let requests = service.search.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "(uid=alice)");
        assert_eq!(requests[0].1, vec!["uid".to_string(), "cn".to_string()]);
    }

    #[tokio::test]
    async fn get_user_escapes_filter_input() {
        let service = LdapUserService::new(StaticSearch::new(Vec::new()), named_mapper());
        let found = service.get_user("*)(uid=admin").await.expect("lookup");

        assert!(found.is_none());
        let filter = &service.search.requests()[0].0;
        assert!(!filter.contains("*)(uid=admin"));
        assert!(filter.starts_with("(uid="));
    }

    #[tokio::test]
    async fn all_selection_requests_every_attribute() {
        let service = LdapUserService::new(
            StaticSearch::new(vec![alice()]),
            AttributeMapper::new("uid", AttributeSelection::All),
        );
        let set = service
            .get_user("alice")
            .await
            .expect("lookup")
            .expect("entry");

        assert_eq!(service.search.requests()[0].1, vec!["*".to_string()]);
        assert_eq!(set.first("mail"), Some("alice@example.edu"));
    }

    #[tokio::test]
    async fn search_users_maps_every_entry() {
        let bob = RawRecord::new()
            .with_text("uid", ["bob"])
            .with_text("cn", ["Bob Martin"]);
        let service = LdapUserService::new(StaticSearch::new(vec![alice(), bob]), named_mapper());

        let sets = service
            .search_users("(objectClass=person)")
            .await
            .expect("search");

        let ids: Vec<_> = sets.iter().filter_map(|s| s.id()).collect();
        assert_eq!(ids, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn search_failure_propagates() {
        let service = LdapUserService::new(UnreachableSearch, named_mapper());
        let err = service.get_user("alice").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
