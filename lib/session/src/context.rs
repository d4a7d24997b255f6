//! Per-request context handed to every session operation.

use portico_core::Uid;
use std::collections::BTreeMap;

/// What the hosting layer knows about the request being served.
///
/// The host builds one of these per request and passes it explicitly.
/// Attribute keys are lower-cased on insertion, so lookups by header name
/// are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Full URL of the current request.
    request_url: String,
    /// Remote user asserted by an embedding portal, if any.
    remote_user: Option<Uid>,
    /// Forwarded request attributes (typically headers).
    attributes: BTreeMap<String, String>,
}

impl RequestContext {
    /// Creates a context for a request to `request_url`.
    #[must_use]
    pub fn new(request_url: impl Into<String>) -> Self {
        Self {
            request_url: request_url.into(),
            remote_user: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Replaces the request URL, e.g. with the page a logout was requested from.
    #[must_use]
    pub fn with_request_url(mut self, request_url: impl Into<String>) -> Self {
        self.request_url = request_url.into();
        self
    }

    /// Sets the remote user asserted by the embedding host.
    #[must_use]
    pub fn with_remote_user(mut self, remote_user: Option<Uid>) -> Self {
        self.remote_user = remote_user;
        self
    }

    /// Adds a forwarded attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    #[must_use]
    pub fn remote_user(&self) -> Option<&Uid> {
        self.remote_user.as_ref()
    }

    /// Returns a forwarded attribute by case-insensitive name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
