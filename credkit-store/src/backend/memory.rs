//! In-memory credential store for testing.
//!
//! **FOR TESTING ONLY** — this store keeps items in a mutex-guarded list
//! and provides none of the platform's at-rest protection. It exists so
//! the façade and migration engine can be exercised without the real
//! store, and it reproduces the real store's observable semantics:
//!
//! - attribute-subset matching, with the data-protection attribute acting
//!   as a backend partition (a query without it only matches items written
//!   without it, and vice versa);
//! - duplicate detection on add;
//! - opaque item references that survive attribute changes but not
//!   delete-then-add;
//! - in-place update preserving a pre-existing custom ACL — the
//!   vulnerability the façade's set path neutralizes.

#![allow(clippy::significant_drop_tightening)]

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use zeroize::Zeroizing;

use crate::query::{AttributeKey, AttributeValue, Query, MATCH_LIMIT_ONE};

use super::{CredentialStore, Status};

struct StoredItem {
    id: u64,
    attributes: BTreeMap<AttributeKey, AttributeValue>,
    value: Option<Zeroizing<Vec<u8>>>,
    acl: Option<Vec<String>>,
}

struct Inner {
    next_id: u64,
    items: Vec<StoredItem>,
    fail_writes: bool,
    fail_reads: bool,
    fail_deletes: bool,
}

/// In-memory [`CredentialStore`] backed by a mutex-guarded item list.
pub struct MemoryCredentialStore {
    inner: Mutex<Inner>,
}

/// Keys that describe the operation rather than the stored item.
const fn is_filter_key(key: AttributeKey) -> bool {
    !matches!(
        key,
        AttributeKey::ValueData
            | AttributeKey::ValueRef
            | AttributeKey::AccessControlList
            | AttributeKey::ReturnData
            | AttributeKey::ReturnAttributes
            | AttributeKey::ReturnRef
            | AttributeKey::MatchLimit
    )
}

fn filter_attributes(query: &Query) -> BTreeMap<AttributeKey, AttributeValue> {
    query
        .iter()
        .filter(|(key, _)| is_filter_key(**key))
        .map(|(key, value)| (*key, value.clone()))
        .collect()
}

impl StoredItem {
    fn matches(&self, query: &Query) -> bool {
        if let Some(AttributeValue::ItemRef(id)) = query.get(AttributeKey::ValueRef) {
            return self.id == *id;
        }
        let filter = filter_attributes(query);
        // The data-protection attribute partitions the store: absence on
        // one side must mean absence on the other.
        if filter.contains_key(&AttributeKey::UseDataProtection)
            != self.attributes.contains_key(&AttributeKey::UseDataProtection)
        {
            return false;
        }
        filter
            .iter()
            .all(|(key, value)| self.attributes.get(key) == Some(value))
    }
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                items: Vec::new(),
                fail_writes: false,
                fail_reads: false,
                fail_deletes: false,
            }),
        }
    }

    /// Makes every subsequent write operation fail with
    /// [`Status::UnspecifiedFailure`] until called again with `false`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Makes every subsequent query fail with
    /// [`Status::UnspecifiedFailure`] until called again with `false`.
    /// Adds and deletes keep working, so failures can be injected on the
    /// read side alone.
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Makes every subsequent delete fail with
    /// [`Status::UnspecifiedFailure`] until called again with `false`.
    /// Adds and queries keep working, so failures can be injected on the
    /// delete side alone.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.lock().fail_deletes = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn add(&self, query: &Query) -> Status {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Status::UnspecifiedFailure;
        }
        let attributes = filter_attributes(query);
        if inner.items.iter().any(|item| item.attributes == attributes) {
            return Status::DuplicateItem;
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.items.push(StoredItem {
            id,
            attributes,
            value: query
                .bytes_value(AttributeKey::ValueData)
                .map(|bytes| Zeroizing::new(bytes.to_vec())),
            acl: match query.get(AttributeKey::AccessControlList) {
                Some(AttributeValue::TrustedApplications(applications)) => {
                    Some(applications.clone())
                }
                _ => None,
            },
        });
        Status::Success
    }

    fn update(&self, query: &Query, attributes: &Query) -> Status {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Status::UnspecifiedFailure;
        }
        let mut updated = false;
        for item in inner.items.iter_mut().filter(|item| item.matches(query)) {
            for (key, value) in attributes {
                match key {
                    AttributeKey::ValueData => {
                        if let AttributeValue::Bytes(bytes) = value {
                            item.value = Some(Zeroizing::new(bytes.clone()));
                        }
                    }
                    // The real store keeps an existing custom ACL across
                    // updates unless the new attributes name one.
                    AttributeKey::AccessControlList => {
                        if let AttributeValue::TrustedApplications(applications) = value {
                            item.acl = Some(applications.clone());
                        }
                    }
                    _ => {
                        if is_filter_key(*key) {
                            item.attributes.insert(*key, value.clone());
                        }
                    }
                }
            }
            updated = true;
        }
        if updated {
            Status::Success
        } else {
            Status::ItemNotFound
        }
    }

    fn delete(&self, query: &Query) -> Status {
        let mut inner = self.lock();
        if inner.fail_writes || inner.fail_deletes {
            return Status::UnspecifiedFailure;
        }
        let before = inner.items.len();
        inner.items.retain(|item| !item.matches(query));
        if inner.items.len() == before {
            Status::ItemNotFound
        } else {
            Status::Success
        }
    }

    fn copy_matching(&self, query: &Query) -> (Status, Vec<Query>) {
        let inner = self.lock();
        if inner.fail_reads {
            return (Status::UnspecifiedFailure, Vec::new());
        }
        let matches: Vec<&StoredItem> = inner
            .items
            .iter()
            .filter(|item| item.matches(query))
            .collect();
        if matches.is_empty() {
            return (Status::ItemNotFound, Vec::new());
        }
        let limit = if query.str_value(AttributeKey::MatchLimit) == Some(MATCH_LIMIT_ONE) {
            1
        } else {
            matches.len()
        };
        let results = matches
            .into_iter()
            .take(limit)
            .map(|item| {
                let mut result = Query::new();
                if query.flag(AttributeKey::ReturnAttributes) {
                    for (key, value) in &item.attributes {
                        result.set(*key, value.clone());
                    }
                    if let Some(applications) = &item.acl {
                        result.set(
                            AttributeKey::AccessControlList,
                            AttributeValue::TrustedApplications(applications.clone()),
                        );
                    }
                }
                if query.flag(AttributeKey::ReturnData) {
                    if let Some(value) = &item.value {
                        result.set(
                            AttributeKey::ValueData,
                            AttributeValue::Bytes(value.to_vec()),
                        );
                    }
                }
                if query.flag(AttributeKey::ReturnRef) {
                    result.set(AttributeKey::ValueRef, AttributeValue::ItemRef(item.id));
                }
                result
            })
            .collect();
        (Status::Success, results)
    }
}
