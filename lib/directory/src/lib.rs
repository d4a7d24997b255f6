//! Directory attribute mapping for portico.
//!
//! Turns directory search results into flat user attribute sets keyed by
//! attribute name. Records come from an LDAP server ([`LdapSearch`]) or any
//! other [`DirectorySearch`] implementation.
//!
//! A record is identified by its uid attribute. Records without one map to
//! an empty [`DirectoryAttributeSet`]. Binary values (photos, certificates)
//! are never included.

pub mod config;
pub mod error;
pub mod mapper;
pub mod record;
pub mod search;
pub mod service;

pub use config::LdapConfig;
pub use error::DirectoryError;
pub use mapper::{AttributeMapper, AttributeSelection, DirectoryAttributeSet};
pub use record::{AttributeValue, DirectoryRecord, RawRecord};
pub use search::{ALL_ATTRIBUTES, DirectorySearch, LdapSearch};
pub use service::LdapUserService;
