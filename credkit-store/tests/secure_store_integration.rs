//! Integration tests for the store façade against the in-memory backend.

mod common;

use std::collections::HashSet;

use strum::IntoEnumIterator;

use credkit_store::backend::memory::MemoryCredentialStore;
use credkit_store::{
    AccessGroup, Accessibility, AttributeKey, AttributeValue, Configuration, CredentialStore,
    Identifier, Protection, Query, SecureEnclaveAccessControl, SecureStore, SharingScope, Status,
    StoreError,
};

fn all_configurations() -> Vec<Configuration> {
    let identifier = || Identifier::new("com.example.integration").unwrap();
    let group = || AccessGroup::new("team.example").unwrap();
    let mut configurations = Vec::new();
    for accessibility in Accessibility::iter() {
        for sharing in [
            SharingScope::Private,
            SharingScope::AccessGroup(group()),
            SharingScope::CloudShared(group()),
        ] {
            configurations.push(
                Configuration::new(
                    identifier(),
                    Protection::Accessibility(accessibility),
                    sharing,
                )
                .unwrap(),
            );
        }
    }
    for access_control in SecureEnclaveAccessControl::iter() {
        for sharing in [SharingScope::Private, SharingScope::AccessGroup(group())] {
            configurations.push(
                Configuration::new(
                    identifier(),
                    Protection::SecureEnclave(access_control),
                    sharing,
                )
                .unwrap(),
            );
        }
    }
    configurations
}

#[test]
fn test_round_trip_for_every_policy_permutation() {
    for configuration in all_configurations() {
        let backend = MemoryCredentialStore::new();
        let store = SecureStore::new(configuration, &backend);
        store.set_string("hunter2", "password").unwrap();
        assert_eq!(
            store.get_string("password").unwrap().as_deref(),
            Some("hunter2")
        );
    }
}

#[test]
fn test_get_missing_key_returns_none() {
    let backend = MemoryCredentialStore::new();
    let store = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    assert_eq!(store.get_object("absent").unwrap(), None);
    assert_eq!(store.get_string("absent").unwrap(), None);
    assert!(!store.contains_object("absent"));
}

#[test]
fn test_set_replaces_existing_value() {
    let backend = MemoryCredentialStore::new();
    let store = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    store.set_string("first", "key").unwrap();
    store.set_string("second", "key").unwrap();
    assert_eq!(store.get_string("key").unwrap().as_deref(), Some("second"));
}

#[test]
fn test_remove_is_idempotent() {
    let backend = MemoryCredentialStore::new();
    let store = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    store.set_string("value", "key").unwrap();
    store.remove_object("key").unwrap();
    store.remove_object("key").unwrap();
    assert_eq!(store.get_string("key").unwrap(), None);
    store.remove_object("never-written").unwrap();
}

#[test]
fn test_all_keys_reflects_writes_and_removals() {
    let backend = MemoryCredentialStore::new();
    let store = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    assert!(store.all_keys().unwrap().is_empty());
    store.set_string("1", "a").unwrap();
    store.set_string("2", "b").unwrap();
    store.remove_object("a").unwrap();
    let expected: HashSet<String> = ["b".to_owned()].into();
    assert_eq!(store.all_keys().unwrap(), expected);
}

#[test]
fn test_stores_with_different_configurations_are_isolated() {
    let backend = MemoryCredentialStore::new();
    let unlocked = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    let after_first = SecureStore::new(
        common::private_configuration("app", Accessibility::AfterFirstUnlock),
        &backend,
    );
    unlocked.set_string("one", "key").unwrap();
    after_first.set_string("two", "key").unwrap();
    assert_eq!(unlocked.get_string("key").unwrap().as_deref(), Some("one"));
    assert_eq!(
        after_first.get_string("key").unwrap().as_deref(),
        Some("two")
    );
}

#[test]
fn test_get_string_fails_loudly_on_malformed_utf8() {
    let backend = MemoryCredentialStore::new();
    let store = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    store.set_object(&[0xFF, 0xFE, 0xFD], "binary").unwrap();
    assert_eq!(store.get_string("binary"), Err(StoreError::MalformedUtf8));
    assert_eq!(
        store.get_object("binary").unwrap().as_deref(),
        Some([0xFF, 0xFE, 0xFD].as_slice())
    );
}

#[test]
fn test_can_access_store_succeeds_on_empty_store() {
    let backend = MemoryCredentialStore::new();
    let store = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    assert!(store.can_access_store());
}

#[test]
fn test_unreachable_store_surfaces_on_every_read_path() {
    let backend = MemoryCredentialStore::new();
    let store = SecureStore::new(
        common::private_configuration("app", Accessibility::WhenUnlocked),
        &backend,
    );
    store.set_string("value", "key").unwrap();

    backend.set_fail_reads(true);
    assert!(!store.can_access_store());
    assert_eq!(
        store.get_object("key"),
        Err(StoreError::Store(Status::UnspecifiedFailure))
    );
    assert_eq!(
        store.all_keys(),
        Err(StoreError::Store(Status::UnspecifiedFailure))
    );
    // The probe-style contains call folds the failure into `false`; it
    // cannot tell an absent item from an unreachable store.
    assert!(!store.contains_object("key"));

    backend.set_fail_reads(false);
    assert_eq!(store.get_string("key").unwrap().as_deref(), Some("value"));
}

// Modeled on the access-control-list zero-day: an attacker plants an
// ACL-bearing fork of a target entry, then waits for a legitimate update
// to inherit the custom ACL. The set path must neutralize the fork.
#[test]
fn test_set_string_neutralizes_planted_access_control_list() {
    let backend = MemoryCredentialStore::new();
    let configuration = common::private_configuration("vuln-test", Accessibility::WhenUnlocked);
    let store = SecureStore::new(configuration.clone(), &backend);
    let key = "KeepIt";

    // Plant an entry carrying a custom ACL, bypassing the façade.
    let mut planted = configuration.query();
    planted.set(AttributeKey::Account, AttributeValue::Str(key.to_owned()));
    planted.set(
        AttributeKey::AccessControlList,
        AttributeValue::TrustedApplications(vec!["attacker-app".to_owned()]),
    );
    planted.set(
        AttributeKey::ValueData,
        AttributeValue::Bytes(b"Secret".to_vec()),
    );
    assert_eq!(backend.add(&planted), Status::Success);

    // The planted item is reachable through the façade.
    assert!(store.contains_object(key));

    // Capture a reference to the planted entry.
    let mut by_attributes = configuration.query();
    by_attributes.set(AttributeKey::Account, AttributeValue::Str(key.to_owned()));
    by_attributes.set(AttributeKey::ReturnRef, AttributeValue::Bool(true));
    let (status, results) = backend.copy_matching(&by_attributes);
    assert_eq!(status, Status::Success);
    let reference = results[0].get(AttributeKey::ValueRef).unwrap().clone();

    let mut by_reference = Query::new();
    by_reference.set(AttributeKey::ValueRef, reference);
    assert_eq!(backend.copy_matching(&by_reference).0, Status::Success);

    // A legitimate write must delete the planted entry, not update it.
    store.set_string("Safe", key).unwrap();

    // The captured reference is dead and the fresh item carries no ACL.
    assert_eq!(backend.copy_matching(&by_reference).0, Status::ItemNotFound);
    assert_eq!(store.get_string(key).unwrap().as_deref(), Some("Safe"));

    let mut read_attributes = configuration.query();
    read_attributes.set(AttributeKey::Account, AttributeValue::Str(key.to_owned()));
    read_attributes.set(AttributeKey::ReturnAttributes, AttributeValue::Bool(true));
    let (status, results) = backend.copy_matching(&read_attributes);
    assert_eq!(status, Status::Success);
    assert!(results[0].get(AttributeKey::AccessControlList).is_none());
}
