//! Mapping of directory records to user attribute sets.

use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DirectoryError;
use crate::record::{AttributeValue, DirectoryRecord};

/// Which attributes to extract from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelection {
    /// Every attribute present, keyed by its lower-cased name.
    All,
    /// Only these attributes, keyed exactly as listed.
    Named(Vec<String>),
}

impl From<Option<Vec<String>>> for AttributeSelection {
    fn from(names: Option<Vec<String>>) -> Self {
        names.map_or(Self::All, Self::Named)
    }
}

/// The user attributes found in one directory record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAttributeSet {
    id: Option<String>,
    attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryAttributeSet {
    /// Returns the value of the identifier attribute, if the record had one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.attributes
    }

    /// Returns the values stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// Returns the first value stored under `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.attributes.is_empty()
    }
}

/// Extracts user attributes from directory records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMapper {
    uid_attribute: String,
    selection: AttributeSelection,
}

impl AttributeMapper {
    #[must_use]
    pub fn new(uid_attribute: impl Into<String>, selection: AttributeSelection) -> Self {
        Self {
            uid_attribute: uid_attribute.into(),
            selection,
        }
    }

    #[must_use]
    pub fn uid_attribute(&self) -> &str {
        &self.uid_attribute
    }

    #[must_use]
    pub fn selection(&self) -> &AttributeSelection {
        &self.selection
    }

    /// Maps one record.
    ///
    /// A record without the identifier attribute maps to an empty set. Binary
    /// values are dropped. A requested attribute that is present keeps its
    /// key even when no string values remain; with [`AttributeSelection::All`]
    /// such an attribute is omitted.
    ///
    /// # Errors
    ///
    /// Propagates failures to enumerate the values of an attribute.
    pub fn map<R>(&self, record: &R) -> Result<DirectoryAttributeSet, Report<DirectoryError>>
    where
        R: DirectoryRecord + ?Sized,
    {
        let id = record
            .attribute_values(&self.uid_attribute)?
            .and_then(|values| text_values(&values).into_iter().next());
        let Some(id) = id else {
            tracing::debug!(uid_attribute = %self.uid_attribute, "record has no identifier");
            return Ok(DirectoryAttributeSet::default());
        };

        let mut attributes = BTreeMap::new();
        match &self.selection {
            AttributeSelection::Named(names) => {
                for name in names {
                    if let Some(values) = record.attribute_values(name)? {
                        attributes.insert(name.clone(), text_values(&values));
                    }
                }
            }
            AttributeSelection::All => {
                for name in record.attribute_names() {
                    if let Some(values) = record.attribute_values(&name)? {
                        insert_text(&mut attributes, name.to_lowercase(), &values);
                    }
                }
            }
        }

        Ok(DirectoryAttributeSet {
            id: Some(id),
            attributes,
        })
    }
}

fn text_values(values: &[AttributeValue]) -> Vec<String> {
    values
        .iter()
        .filter_map(AttributeValue::as_text)
        .map(str::to_string)
        .collect()
}

fn insert_text(
    attributes: &mut BTreeMap<String, Vec<String>>,
    key: String,
    values: &[AttributeValue],
) {
    let text = text_values(values);
    if !text.is_empty() {
        attributes.insert(key, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;

    /// Record whose `mail` attribute cannot be read.
    struct BrokenRecord;

    impl DirectoryRecord for BrokenRecord {
        fn attribute_names(&self) -> Vec<String> {
            vec!["uid".to_string(), "mail".to_string()]
        }

        fn attribute_values(
            &self,
            name: &str,
        ) -> Result<Option<Vec<AttributeValue>>, Report<DirectoryError>> {
            if name.eq_ignore_ascii_case("mail") {
                return Err(DirectoryError::LookupFailed {
                    attribute: name.to_string(),
                    reason: "referral not followed".to_string(),
                }
                .into());
            }
            Ok(Some(vec![AttributeValue::Text("carol".to_string())]))
        }
    }

    fn named(names: &[&str]) -> AttributeSelection {
        AttributeSelection::Named(names.iter().map(|n| n.to_string()).collect())
    }

    #[test]
    fn named_selection_omits_missing_attributes() {
        let record = RawRecord::new()
            .with_text("uid", ["alice"])
            .with_text("cn", ["Alice Smith"]);
        let mapper = AttributeMapper::new("uid", named(&["cn", "mail"]));

        let set = mapper.map(&record).expect("map");

        assert_eq!(set.id(), Some("alice"));
        assert_eq!(
            set.attributes(),
            &BTreeMap::from([("cn".to_string(), vec!["Alice Smith".to_string()])])
        );
        assert!(set.get("mail").is_none());
    }

    #[test]
    fn named_selection_keeps_requested_spelling() {
        let record = RawRecord::new()
            .with_text("uid", ["alice"])
            .with_text("displayname", ["Alice"]);
        let mapper = AttributeMapper::new("uid", named(&["displayName"]));

        let set = mapper.map(&record).expect("map");

        assert_eq!(set.first("displayName"), Some("Alice"));
        assert!(set.get("displayname").is_none());
    }

    #[test]
    fn all_selection_lowercases_and_drops_binary() {
        let record = RawRecord::new()
            .with_text("UID", ["bob"])
            .with_text("telephoneNumber", ["555-1111", "555-2222"])
            .with_binary("jpegPhoto", vec![0xff, 0xd8, 0xff, 0xe0]);
        let mapper = AttributeMapper::new("uid", AttributeSelection::All);

        let set = mapper.map(&record).expect("map");

        assert_eq!(set.id(), Some("bob"));
        assert_eq!(
            set.get("telephonenumber"),
            Some(&["555-1111".to_string(), "555-2222".to_string()][..])
        );
        assert!(set.get("jpegphoto").is_none());
        assert!(set.get("telephoneNumber").is_none());
        assert_eq!(set.get("uid"), Some(&["bob".to_string()][..]));
    }

    #[test]
    fn named_binary_attribute_keeps_empty_entry() {
        let record = RawRecord::new()
            .with_text("uid", ["erin"])
            .with_binary("jpegPhoto", vec![0xff, 0xd8]);
        let mapper = AttributeMapper::new("uid", named(&["jpegPhoto", "mail"]));

        let set = mapper.map(&record).expect("map");

        assert_eq!(set.get("jpegPhoto"), Some(&[][..]));
        assert!(set.get("mail").is_none());
    }

    #[test]
    fn mixed_values_keep_only_text() {
        let record = RawRecord::new().with_text("uid", ["dave"]).with_values(
            "description",
            vec![
                AttributeValue::Binary(vec![0, 1, 2]),
                AttributeValue::Text("staff".to_string()),
            ],
        );
        let mapper = AttributeMapper::new("uid", named(&["description"]));

        let set = mapper.map(&record).expect("map");

        assert_eq!(set.get("description"), Some(&["staff".to_string()][..]));
    }

    #[test]
    fn missing_identifier_yields_empty_set() {
        let record = RawRecord::new().with_text("cn", ["Nobody"]);
        for selection in [AttributeSelection::All, named(&["cn"])] {
            let set = AttributeMapper::new("uid", selection)
                .map(&record)
                .expect("not an error");
            assert!(set.id().is_none());
            assert!(set.attributes().is_empty());
            assert!(set.is_empty());
        }
    }

    #[test]
    fn lookup_failure_propagates() {
        let mapper = AttributeMapper::new("uid", named(&["mail"]));
        let err = mapper.map(&BrokenRecord).unwrap_err();
        assert!(err.to_string().contains("mail"));

        let mapper = AttributeMapper::new("uid", AttributeSelection::All);
        assert!(mapper.map(&BrokenRecord).is_err());
    }

    #[test]
    fn selection_from_optional_list() {
        assert_eq!(AttributeSelection::from(None), AttributeSelection::All);
        assert_eq!(
            AttributeSelection::from(Some(vec!["cn".to_string()])),
            named(&["cn"])
        );
    }

    #[test]
    fn attribute_set_serializes_to_json() {
        let record = RawRecord::new()
            .with_text("uid", ["alice"])
            .with_text("cn", ["Alice Smith"]);
        let set = AttributeMapper::new("uid", named(&["cn"]))
            .map(&record)
            .expect("map");

        let json = serde_json::to_value(&set).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"id": "alice", "attributes": {"cn": ["Alice Smith"]}})
        );
    }
}
