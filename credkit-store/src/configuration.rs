//! Logical store configuration and service identity derivation.
//!
//! A [`Configuration`] is the validated, immutable description of one
//! logical store. Illegal combinations (a secure-enclave item that is also
//! cloud shared) are rejected by the constructor, never at query-build
//! time, so every constructed configuration builds a valid query.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;
use crate::policy::{Accessibility, SecureEnclaveAccessControl};
use crate::{StoreError, StoreResult};

/// A validated, non-empty access-group identifier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessGroup(String);

impl AccessGroup {
    /// Creates an access group from a non-empty identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyAccessGroup`] if `group` is empty.
    pub fn new(group: impl Into<String>) -> StoreResult<Self> {
        let group = group.into();
        if group.is_empty() {
            return Err(StoreError::EmptyAccessGroup);
        }
        Ok(Self(group))
    }

    /// Returns the access group as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccessGroup {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccessGroup> for String {
    fn from(group: AccessGroup) -> Self {
        group.0
    }
}

impl fmt::Debug for AccessGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessGroup({})", self.0)
    }
}

impl fmt::Display for AccessGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How items are shared beyond the creating process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SharingScope {
    /// Items are visible only to the creating application.
    Private,
    /// Items are shared with the applications in the given access group.
    AccessGroup(AccessGroup),
    /// Items are shared through the cloud keychain within the given access
    /// group.
    CloudShared(AccessGroup),
}

impl SharingScope {
    /// Returns the access group, when one applies to this scope.
    #[must_use]
    pub const fn access_group(&self) -> Option<&AccessGroup> {
        match self {
            Self::Private => None,
            Self::AccessGroup(group) | Self::CloudShared(group) => Some(group),
        }
    }

    /// Whether items under this scope synchronize through the cloud.
    #[must_use]
    pub const fn is_cloud_shared(&self) -> bool {
        matches!(self, Self::CloudShared(_))
    }
}

/// The protection policy guarding a configuration's items.
///
/// The two policy axes are mutually exclusive: an item is guarded either
/// by a software accessibility class or by a hardware access-control
/// policy, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protection {
    /// Software policy tied to device lock state.
    Accessibility(Accessibility),
    /// Hardware-backed, non-exportable key material gated by the given
    /// access-control policy.
    SecureEnclave(SecureEnclaveAccessControl),
}

/// Storage-format revision a query targets.
///
/// Kept as an explicit enum so query construction and migration never
/// consult a runtime platform-version check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageFormat {
    /// Current format: items carry the data-protection backend attribute.
    DataProtection,
    /// Prior format: the data-protection attribute did not exist.
    Legacy,
}

/// An immutable, validated description of one logical store.
///
/// Equality is structural: two configurations that agree on identifier,
/// protection, and sharing scope are equal, derive equal [`Service`]
/// identities, and build attribute-for-attribute identical queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    identifier: Identifier,
    protection: Protection,
    sharing: SharingScope,
}

impl Configuration {
    /// Creates a configuration, rejecting illegal combinations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EnclaveCloudSharing`] when `protection` is
    /// secure-enclave-backed and `sharing` is cloud shared; enclave key
    /// material is bound to one device and cannot synchronize.
    pub fn new(
        identifier: Identifier,
        protection: Protection,
        sharing: SharingScope,
    ) -> StoreResult<Self> {
        if matches!(protection, Protection::SecureEnclave(_)) && sharing.is_cloud_shared() {
            return Err(StoreError::EnclaveCloudSharing);
        }
        Ok(Self {
            identifier,
            protection,
            sharing,
        })
    }

    /// Returns the logical namespace identifier.
    #[must_use]
    pub const fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Returns the protection policy.
    #[must_use]
    pub const fn protection(&self) -> Protection {
        self.protection
    }

    /// Returns the sharing scope.
    #[must_use]
    pub const fn sharing(&self) -> &SharingScope {
        &self.sharing
    }

    /// Derives the service identity naming this configuration's namespace.
    ///
    /// Recomputed on every call and never cached; the derivation is a pure
    /// function of identifier, protection, and sharing scope.
    #[must_use]
    pub fn service(&self) -> Service {
        Service::derive(self)
    }
}

/// The derived namespace identity distinguishing one configuration's items
/// from another's within the same store.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Service(String);

impl Service {
    fn derive(configuration: &Configuration) -> Self {
        let protection = match configuration.protection {
            Protection::Accessibility(accessibility) => accessibility.as_str(),
            Protection::SecureEnclave(access_control) => access_control.as_str(),
        };
        let identifier = &configuration.identifier;
        let service = match &configuration.sharing {
            SharingScope::Private => format!("standard_{identifier}_{protection}"),
            SharingScope::AccessGroup(group) => {
                format!("shared_{group}_{identifier}_{protection}")
            }
            SharingScope::CloudShared(group) => {
                format!("cloud_{group}_{identifier}_{protection}")
            }
        };
        Self(service)
    }

    /// Returns the service identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service({})", self.0)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
