//! Raw directory records.
//!
//! A record is one search result entry: named attributes, each with zero or
//! more values, some of which may be binary (photos, certificates).
//! Attribute names are matched case-insensitively, as LDAP attribute
//! descriptions are.

use ldap3::SearchEntry;
use rootcause::Report;
use std::collections::BTreeSet;

use crate::error::DirectoryError;

/// One attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Binary(Vec<u8>),
}

impl AttributeValue {
    /// Returns the string form, or `None` for binary values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// A directory search result entry.
pub trait DirectoryRecord {
    /// Returns the names of all attributes present, as the source spells them.
    fn attribute_names(&self) -> Vec<String>;

    /// Returns the values of the attribute `name`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::LookupFailed` if the values cannot be
    /// enumerated.
    fn attribute_values(
        &self,
        name: &str,
    ) -> Result<Option<Vec<AttributeValue>>, Report<DirectoryError>>;
}

/// `SearchEntry::construct` puts an attribute in `bin_attrs` when it is
/// tagged `;binary` or any of its values is not valid UTF-8.
impl DirectoryRecord for SearchEntry {
    fn attribute_names(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.attrs.keys().chain(self.bin_attrs.keys()).collect();
        names.into_iter().cloned().collect()
    }

    fn attribute_values(
        &self,
        name: &str,
    ) -> Result<Option<Vec<AttributeValue>>, Report<DirectoryError>> {
        let text = self
            .attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values);
        let binary = self
            .bin_attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values);

        if text.is_none() && binary.is_none() {
            return Ok(None);
        }

        let values = text
            .into_iter()
            .flatten()
            .cloned()
            .map(AttributeValue::Text)
            .chain(
                binary
                    .into_iter()
                    .flatten()
                    .cloned()
                    .map(AttributeValue::Binary),
            )
            .collect();
        Ok(Some(values))
    }
}

/// In-memory record, for sources other than an LDAP server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    attributes: Vec<(String, Vec<AttributeValue>)>,
}

impl RawRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute with string values.
    #[must_use]
    pub fn with_text<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| AttributeValue::Text(v.into()))
            .collect();
        self.with_values(name, values)
    }

    /// Adds an attribute with one binary value.
    #[must_use]
    pub fn with_binary(self, name: &str, value: Vec<u8>) -> Self {
        self.with_values(name, vec![AttributeValue::Binary(value)])
    }

    /// Adds an attribute, appending to it if already present.
    #[must_use]
    pub fn with_values(mut self, name: &str, values: Vec<AttributeValue>) -> Self {
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => existing.extend(values),
            None => self.attributes.push((name.to_string(), values)),
        }
        self
    }
}

impl DirectoryRecord for RawRecord {
    fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|(name, _)| name.clone()).collect()
    }

    fn attribute_values(
        &self,
        name: &str,
    ) -> Result<Option<Vec<AttributeValue>>, Report<DirectoryError>> {
        Ok(self
            .attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.clone()))
    }
}
