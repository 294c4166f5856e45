//! Store façade: keyed reads and writes over the canonical query.

use std::collections::HashSet;

use tracing::debug;

use crate::backend::{CredentialStore, Status};
use crate::configuration::Configuration;
use crate::query::{AttributeKey, AttributeValue, Query, MATCH_LIMIT_ALL, MATCH_LIMIT_ONE};
use crate::{StoreError, StoreResult};

/// Keyed secure storage bound to one [`Configuration`].
///
/// Every operation derives the canonical query fresh from the bound
/// configuration, adds its operation-specific attributes, and drives the
/// injected backing store. Nothing is cached between calls, so equal
/// configurations behave identically across instances and process runs.
pub struct SecureStore<S> {
    configuration: Configuration,
    store: S,
}

impl<S> SecureStore<S> {
    /// Creates a store bound to `configuration` over the given backing
    /// store.
    pub const fn new(configuration: Configuration, store: S) -> Self {
        Self {
            configuration,
            store,
        }
    }

    /// Returns the bound configuration.
    pub const fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub(crate) const fn backend(&self) -> &S {
        &self.store
    }
}

impl<S: CredentialStore> SecureStore<S> {
    fn keyed_query(&self, key: &str) -> Query {
        let mut query = self.configuration.query();
        query.set(AttributeKey::Account, AttributeValue::Str(key.to_owned()));
        query
    }

    /// Returns whether an item exists for `key`.
    ///
    /// Every status other than success folds into `false`: this probe does
    /// not distinguish an absent item from an unreachable store. Callers
    /// that need store health should use [`Self::can_access_store`].
    #[must_use]
    pub fn contains_object(&self, key: &str) -> bool {
        self.store.copy_matching(&self.keyed_query(key)).0.is_success()
    }

    /// Returns whether the backing store can be reached at all.
    ///
    /// Both a matching and an absent item count as reachable; only a
    /// store-level failure reports `false`.
    #[must_use]
    pub fn can_access_store(&self) -> bool {
        let mut query = self.configuration.query();
        query.set(
            AttributeKey::MatchLimit,
            AttributeValue::Str(MATCH_LIMIT_ONE.to_owned()),
        );
        matches!(
            self.store.copy_matching(&query).0,
            Status::Success | Status::ItemNotFound
        )
    }

    /// Fetches the payload stored for `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] on any backend failure other than
    /// not-found, and [`StoreError::MissingPayload`] when the result set
    /// carries no payload bytes.
    pub fn get_object(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut query = self.keyed_query(key);
        query.set(AttributeKey::ReturnData, AttributeValue::Bool(true));
        query.set(
            AttributeKey::MatchLimit,
            AttributeValue::Str(MATCH_LIMIT_ONE.to_owned()),
        );
        match self.store.copy_matching(&query) {
            (Status::Success, results) => {
                let item = results.first().ok_or(StoreError::MissingPayload)?;
                let bytes = item
                    .bytes_value(AttributeKey::ValueData)
                    .ok_or(StoreError::MissingPayload)?;
                Ok(Some(bytes.to_vec()))
            }
            (Status::ItemNotFound, _) => Ok(None),
            (status, _) => Err(StoreError::Store(status)),
        }
    }

    /// Fetches the payload stored for `key`, decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedUtf8`] when the payload is not valid
    /// UTF-8, plus the failures of [`Self::get_object`].
    pub fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        self.get_object(key)?
            .map(|bytes| String::from_utf8(bytes).map_err(|_| StoreError::MalformedUtf8))
            .transpose()
    }

    /// Stores `value` for `key`, replacing any existing item.
    ///
    /// The write is issued as an unconditional delete of the logical item
    /// followed by a fresh add carrying the default caller-only ACL. An
    /// in-place update would preserve a custom ACL planted on the item by
    /// another writer, so updates are never used. The order is
    /// delete-then-add: a failed add leaves no item rather than two.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the add is rejected.
    pub fn set_object(&self, value: &[u8], key: &str) -> StoreResult<()> {
        let delete_status = self.store.delete(&self.keyed_query(key));
        debug!(%delete_status, "cleared any existing item before add");
        let mut query = self.keyed_query(key);
        query.set(AttributeKey::ValueData, AttributeValue::Bytes(value.to_vec()));
        match self.store.add(&query) {
            Status::Success => Ok(()),
            status => Err(StoreError::Store(status)),
        }
    }

    /// Stores a UTF-8 string for `key`, replacing any existing item.
    ///
    /// # Errors
    ///
    /// See [`Self::set_object`].
    pub fn set_string(&self, value: &str, key: &str) -> StoreResult<()> {
        self.set_object(value.as_bytes(), key)
    }

    /// Removes the item stored for `key`.
    ///
    /// Removing an absent key succeeds, so the operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] on any failure other than not-found.
    pub fn remove_object(&self, key: &str) -> StoreResult<()> {
        match self.store.delete(&self.keyed_query(key)) {
            Status::Success | Status::ItemNotFound => Ok(()),
            status => Err(StoreError::Store(status)),
        }
    }

    /// Returns every logical key stored under this configuration's
    /// service.
    ///
    /// An empty store yields an empty set, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] on any failure other than not-found.
    pub fn all_keys(&self) -> StoreResult<HashSet<String>> {
        let mut query = self.configuration.query();
        query.set(AttributeKey::ReturnAttributes, AttributeValue::Bool(true));
        query.set(
            AttributeKey::MatchLimit,
            AttributeValue::Str(MATCH_LIMIT_ALL.to_owned()),
        );
        match self.store.copy_matching(&query) {
            (Status::Success, results) => Ok(results
                .iter()
                .filter_map(|item| item.str_value(AttributeKey::Account))
                .map(ToOwned::to_owned)
                .collect()),
            (Status::ItemNotFound, _) => Ok(HashSet::new()),
            (status, _) => Err(StoreError::Store(status)),
        }
    }
}
