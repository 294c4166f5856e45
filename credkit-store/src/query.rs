//! Canonical and legacy store queries.
//!
//! A [`Query`] is the ordered attribute mapping handed to the backing
//! store for every operation. The attribute vocabulary is closed and
//! carries the store's exact wire strings; ordering comes from the key
//! enum, so equal configurations serialize to byte-identical queries
//! across process runs.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::configuration::{Configuration, Protection, StorageFormat};
use crate::policy::AccessControlFlags;

/// Wire value for [`AttributeKey::Class`]: generic password items.
pub const CLASS_GENERIC_PASSWORD: &str = "genp";
/// Wire value for [`AttributeKey::TokenId`]: the secure-enclave token.
pub const TOKEN_SECURE_ENCLAVE: &str = "com.apple.setoken";
/// Wire value for [`AttributeKey::MatchLimit`]: return the first match.
pub const MATCH_LIMIT_ONE: &str = "m_LimitOne";
/// Wire value for [`AttributeKey::MatchLimit`]: return every match.
pub const MATCH_LIMIT_ALL: &str = "m_LimitAll";

/// Attribute names understood by the backing store.
///
/// The declaration order fixes query iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeKey {
    /// Item class (`class`).
    Class,
    /// Namespace / service identity (`svce`).
    Service,
    /// Access-group identifier (`agrp`); present only when sharing.
    AccessGroup,
    /// Accessibility class (`pdmn`).
    Accessible,
    /// Cloud synchronizability flag (`sync`); present only when cloud
    /// shared.
    Synchronizable,
    /// Data-protection backend selection (`nleg`); the one attribute absent
    /// from legacy-format queries.
    UseDataProtection,
    /// Hardware token marker for non-exportable key material (`tkid`).
    TokenId,
    /// Resolved access-control flags (`accc`).
    AccessControl,
    /// Custom access-control list (`acls`). Never produced by the query
    /// builder; observed on injected items and neutralized by the set path.
    AccessControlList,
    /// Logical key of an item (`acct`).
    Account,
    /// Payload bytes (`v_Data`).
    ValueData,
    /// Opaque reference to a stored item (`v_Ref`).
    ValueRef,
    /// Return the payload in result sets (`r_Data`).
    ReturnData,
    /// Return item attributes in result sets (`r_Attributes`).
    ReturnAttributes,
    /// Return an item reference in result sets (`r_Ref`).
    ReturnRef,
    /// Result-set size limit (`m_Limit`).
    MatchLimit,
}

impl AttributeKey {
    /// Returns the wire name of this attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Service => "svce",
            Self::AccessGroup => "agrp",
            Self::Accessible => "pdmn",
            Self::Synchronizable => "sync",
            Self::UseDataProtection => "nleg",
            Self::TokenId => "tkid",
            Self::AccessControl => "accc",
            Self::AccessControlList => "acls",
            Self::Account => "acct",
            Self::ValueData => "v_Data",
            Self::ValueRef => "v_Ref",
            Self::ReturnData => "r_Data",
            Self::ReturnAttributes => "r_Attributes",
            Self::ReturnRef => "r_Ref",
            Self::MatchLimit => "m_Limit",
        }
    }
}

/// Value of a single query attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// UTF-8 string attribute.
    Str(String),
    /// Raw payload bytes.
    Bytes(Vec<u8>),
    /// Boolean flag.
    Bool(bool),
    /// Resolved access-control flags.
    Flags(AccessControlFlags),
    /// Trusted-application list forming a custom ACL.
    TrustedApplications(Vec<String>),
    /// Opaque reference to a stored item.
    ItemRef(u64),
}

/// An ordered attribute mapping describing one store operation.
///
/// Queries are built fresh per call and never mutated in place by the
/// store façade: each operation clones the canonical query and adds its
/// operation-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query(BTreeMap<AttributeKey, AttributeValue>);

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets an attribute, replacing any existing value for the key.
    pub fn set(&mut self, key: AttributeKey, value: AttributeValue) {
        self.0.insert(key, value);
    }

    /// Returns the value for `key`, if set.
    #[must_use]
    pub fn get(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.0.get(&key)
    }

    /// Returns the string value for `key`, if set to one.
    #[must_use]
    pub fn str_value(&self, key: AttributeKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(AttributeValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the byte value for `key`, if set to one.
    #[must_use]
    pub fn bytes_value(&self, key: AttributeKey) -> Option<&[u8]> {
        match self.0.get(&key) {
            Some(AttributeValue::Bytes(value)) => Some(value),
            _ => None,
        }
    }

    /// Whether `key` is set to boolean `true`.
    #[must_use]
    pub fn flag(&self, key: AttributeKey) -> bool {
        matches!(self.0.get(&key), Some(AttributeValue::Bool(true)))
    }

    /// Iterates attributes in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, AttributeKey, AttributeValue> {
        self.0.iter()
    }

    /// Returns the number of attributes set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the query has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = (&'a AttributeKey, &'a AttributeValue);
    type IntoIter = btree_map::Iter<'a, AttributeKey, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Configuration {
    /// Builds the canonical query for this configuration.
    ///
    /// Pure and deterministic: equal configurations build
    /// attribute-for-attribute identical queries on every call, across
    /// process runs.
    #[must_use]
    pub fn query(&self) -> Query {
        self.query_for_format(StorageFormat::DataProtection)
    }

    /// Builds the query targeting the prior storage format, when one
    /// applies.
    ///
    /// Hardware-backed items never had a legacy form, so secure-enclave
    /// configurations return `None`.
    #[must_use]
    pub fn legacy_query(&self) -> Option<Query> {
        match self.protection() {
            Protection::SecureEnclave(_) => None,
            Protection::Accessibility(_) => Some(self.query_for_format(StorageFormat::Legacy)),
        }
    }

    fn query_for_format(&self, format: StorageFormat) -> Query {
        let mut query = Query::new();
        query.set(
            AttributeKey::Class,
            AttributeValue::Str(CLASS_GENERIC_PASSWORD.to_owned()),
        );
        query.set(
            AttributeKey::Service,
            AttributeValue::Str(self.service().as_str().to_owned()),
        );
        match self.protection() {
            Protection::Accessibility(accessibility) => {
                query.set(
                    AttributeKey::Accessible,
                    AttributeValue::Str(accessibility.as_str().to_owned()),
                );
            }
            Protection::SecureEnclave(access_control) => {
                query.set(
                    AttributeKey::TokenId,
                    AttributeValue::Str(TOKEN_SECURE_ENCLAVE.to_owned()),
                );
                query.set(
                    AttributeKey::AccessControl,
                    AttributeValue::Flags(access_control.flags()),
                );
            }
        }
        if let Some(group) = self.sharing().access_group() {
            query.set(
                AttributeKey::AccessGroup,
                AttributeValue::Str(group.as_str().to_owned()),
            );
        }
        if self.sharing().is_cloud_shared() {
            query.set(AttributeKey::Synchronizable, AttributeValue::Bool(true));
        }
        if format == StorageFormat::DataProtection {
            query.set(AttributeKey::UseDataProtection, AttributeValue::Bool(true));
        }
        query
    }
}
