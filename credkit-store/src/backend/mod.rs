//! External credential-store contract.
//!
//! The backing store is modeled as an injected capability rather than a
//! process-wide handle, so the façade can drive the real platform store in
//! production and [`memory::MemoryCredentialStore`] in tests.

pub mod memory;

use strum::Display;

use crate::query::Query;

/// Terminal status of a single store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Status {
    /// The operation completed.
    Success,
    /// No item matched the query.
    ItemNotFound,
    /// An item with the same identity already exists.
    DuplicateItem,
    /// The store failed for an unspecified reason.
    UnspecifiedFailure,
}

impl Status {
    /// Whether this status is [`Status::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Key-value credential store supporting attribute queries.
///
/// The store serializes concurrent operations per logical key at the OS
/// layer; this crate adds no locking of its own. Every call is synchronous
/// and terminal: it either returns a [`Status`] or the process is blocked
/// on OS policy outside this crate's control.
pub trait CredentialStore {
    /// Adds a new item described by `query`.
    fn add(&self, query: &Query) -> Status;

    /// Updates items matching `query` in place with `attributes`.
    ///
    /// The façade's set path never calls this: an in-place update preserves
    /// a pre-existing custom ACL on the item, which is exactly the hole the
    /// delete-then-add protocol closes.
    fn update(&self, query: &Query, attributes: &Query) -> Status;

    /// Deletes every item matching `query`.
    fn delete(&self, query: &Query) -> Status;

    /// Returns items matching `query`, shaped by the query's return flags.
    fn copy_matching(&self, query: &Query) -> (Status, Vec<Query>);
}

impl<T: CredentialStore + ?Sized> CredentialStore for &T {
    fn add(&self, query: &Query) -> Status {
        (**self).add(query)
    }

    fn update(&self, query: &Query, attributes: &Query) -> Status {
        (**self).update(query, attributes)
    }

    fn delete(&self, query: &Query) -> Status {
        (**self).delete(query)
    }

    fn copy_matching(&self, query: &Query) -> (Status, Vec<Query>) {
        (**self).copy_matching(query)
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn add(&self, query: &Query) -> Status {
        (**self).add(query)
    }

    fn update(&self, query: &Query, attributes: &Query) -> Status {
        (**self).update(query, attributes)
    }

    fn delete(&self, query: &Query) -> Status {
        (**self).delete(query)
    }

    fn copy_matching(&self, query: &Query) -> (Status, Vec<Query>) {
        (**self).copy_matching(query)
    }
}
