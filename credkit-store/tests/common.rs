//! Shared helpers for integration tests.

#![allow(dead_code)]

use credkit_store::backend::memory::MemoryCredentialStore;
use credkit_store::{
    Accessibility, AttributeKey, AttributeValue, Configuration, CredentialStore, Identifier,
    Protection, SharingScope, Status,
};

/// Builds a private configuration for the given namespace and policy.
pub fn private_configuration(name: &str, accessibility: Accessibility) -> Configuration {
    Configuration::new(
        Identifier::new(name).unwrap(),
        Protection::Accessibility(accessibility),
        SharingScope::Private,
    )
    .unwrap()
}

/// Writes an item directly under the configuration's legacy query,
/// bypassing the façade, the way software from before the storage-format
/// change did. `None` seeds an item with no payload at all.
pub fn seed_legacy_item(
    store: &MemoryCredentialStore,
    configuration: &Configuration,
    key: &str,
    value: Option<&[u8]>,
) {
    let mut query = configuration.legacy_query().unwrap();
    query.set(AttributeKey::Account, AttributeValue::Str(key.to_owned()));
    if let Some(value) = value {
        query.set(
            AttributeKey::ValueData,
            AttributeValue::Bytes(value.to_vec()),
        );
    }
    assert_eq!(store.add(&query), Status::Success);
}

/// Whether an item for `key` still exists under the legacy query form.
pub fn legacy_item_exists(
    store: &MemoryCredentialStore,
    configuration: &Configuration,
    key: &str,
) -> bool {
    let mut query = configuration.legacy_query().unwrap();
    query.set(AttributeKey::Account, AttributeValue::Str(key.to_owned()));
    store.copy_matching(&query).0.is_success()
}
