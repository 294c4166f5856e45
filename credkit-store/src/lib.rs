//! Deterministic query construction and secure keyed storage over a
//! platform credential store.
//!
//! # Overview
//!
//! A [`Configuration`] describes one logical store: a validated
//! [`Identifier`], a protection policy (a software [`Accessibility`] class
//! or a hardware-backed [`SecureEnclaveAccessControl`] policy), and a
//! [`SharingScope`]. From those three axes it derives a [`Service`]
//! identity and a canonical [`Query`] — the same attribute map on every
//! call, across process runs — which [`SecureStore`] composes with
//! per-operation attributes to drive an injected [`CredentialStore`].
//!
//! Writes are issued as delete-then-add rather than in-place update. The
//! platform store preserves a custom access-control list across updates,
//! which would let an attacker who planted an ACL-bearing fork of an item
//! keep covert access after a legitimate write; deleting the logical item
//! first guarantees no inherited ACL survives.
//!
//! Items written under the prior storage format are importable with
//! [`SecureStore::migrate_legacy_objects`], which copies each legacy item
//! into canonical form before (optionally) removing the original.
//!
//! # Example
//!
//! ```
//! use credkit_store::{
//!     backend::memory::MemoryCredentialStore, Accessibility, Configuration, Identifier,
//!     Protection, SecureStore, SharingScope,
//! };
//!
//! # fn main() -> credkit_store::StoreResult<()> {
//! let configuration = Configuration::new(
//!     Identifier::new("com.example.app")?,
//!     Protection::Accessibility(Accessibility::WhenUnlocked),
//!     SharingScope::Private,
//! )?;
//! let store = SecureStore::new(configuration, MemoryCredentialStore::new());
//! store.set_string("secret", "token")?;
//! assert_eq!(store.get_string("token")?.as_deref(), Some("secret"));
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod backend;
mod configuration;
mod error;
mod identifier;
mod migration;
mod policy;
mod query;
mod store;

pub use backend::{CredentialStore, Status};
pub use configuration::{
    AccessGroup, Configuration, Protection, Service, SharingScope, StorageFormat,
};
pub use error::{StoreError, StoreResult};
pub use identifier::Identifier;
pub use migration::MigrationOutcome;
pub use policy::{Accessibility, SecureEnclaveAccessControl};
pub use query::{
    AttributeKey, AttributeValue, Query, CLASS_GENERIC_PASSWORD, MATCH_LIMIT_ALL, MATCH_LIMIT_ONE,
    TOKEN_SECURE_ENCLAVE,
};
pub use store::SecureStore;
