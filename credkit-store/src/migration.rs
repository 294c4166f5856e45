//! Migration of legacy-format items into the canonical format.

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::backend::{CredentialStore, Status};
use crate::query::{AttributeKey, AttributeValue, MATCH_LIMIT_ALL};
use crate::store::SecureStore;

/// Aggregate outcome of one migration run.
///
/// Failure variants halt further items but never roll back items already
/// migrated; partial progress is preserved and re-running is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// At least one item was rewritten in canonical form.
    Migrated {
        /// Items written under the canonical query.
        migrated: usize,
        /// Items skipped because an identical canonical copy already
        /// existed.
        already_present: usize,
    },
    /// The legacy query matched nothing that required a canonical write.
    NothingToMigrate,
    /// A legacy item was missing its key or payload.
    CouldNotDecodeItem,
    /// A canonical item for this key exists with a different payload; the
    /// canonical copy is never overwritten.
    ConflictingKey {
        /// The logical key in conflict.
        key: String,
    },
    /// Enumerating or reading items failed at the store boundary.
    CouldNotReadStore,
    /// Writing an item in canonical form failed.
    CouldNotWriteStore,
    /// Canonical writes succeeded but a legacy item could not be removed.
    RemovalFailed,
}

impl MigrationOutcome {
    /// Whether the run completed without failure.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Migrated { .. } | Self::NothingToMigrate)
    }
}

impl<S: CredentialStore> SecureStore<S> {
    /// Imports items written under the prior storage format.
    ///
    /// Each item matched by the legacy query is re-written under the
    /// canonical query. An item whose canonical copy already exists with
    /// the same payload is skipped and counted; a differing canonical
    /// payload halts the run with [`MigrationOutcome::ConflictingKey`]. A
    /// legacy item is deleted only after its canonical write succeeded and
    /// only when `remove_on_completion` is set; skipped items are always
    /// left in place.
    ///
    /// Configurations with no legacy form (hardware-backed items) report
    /// [`MigrationOutcome::NothingToMigrate`].
    #[must_use]
    pub fn migrate_legacy_objects(&self, remove_on_completion: bool) -> MigrationOutcome {
        let Some(legacy) = self.configuration().legacy_query() else {
            return MigrationOutcome::NothingToMigrate;
        };

        let mut enumerate = legacy.clone();
        enumerate.set(AttributeKey::ReturnAttributes, AttributeValue::Bool(true));
        enumerate.set(AttributeKey::ReturnData, AttributeValue::Bool(true));
        enumerate.set(
            AttributeKey::MatchLimit,
            AttributeValue::Str(MATCH_LIMIT_ALL.to_owned()),
        );
        let items = match self.backend().copy_matching(&enumerate) {
            (Status::Success, items) => items,
            (Status::ItemNotFound, _) => return MigrationOutcome::NothingToMigrate,
            (status, _) => {
                warn!(%status, "could not enumerate legacy items");
                return MigrationOutcome::CouldNotReadStore;
            }
        };

        let mut migrated = 0usize;
        let mut already_present = 0usize;
        for item in &items {
            let Some(key) = item
                .str_value(AttributeKey::Account)
                .filter(|key| !key.is_empty())
            else {
                warn!("legacy item carries no usable key");
                return MigrationOutcome::CouldNotDecodeItem;
            };
            let Some(payload) = item.bytes_value(AttributeKey::ValueData) else {
                warn!(key, "legacy item carries no payload");
                return MigrationOutcome::CouldNotDecodeItem;
            };
            let payload = Zeroizing::new(payload.to_vec());

            match self.get_object(key) {
                Ok(Some(existing)) => {
                    let existing = Zeroizing::new(existing);
                    if *existing == *payload {
                        // Canonical wins; the legacy copy stays put.
                        already_present += 1;
                        continue;
                    }
                    return MigrationOutcome::ConflictingKey {
                        key: key.to_owned(),
                    };
                }
                Ok(None) => {}
                Err(_) => return MigrationOutcome::CouldNotReadStore,
            }

            if self.set_object(&payload, key).is_err() {
                return MigrationOutcome::CouldNotWriteStore;
            }
            migrated += 1;
            debug!(key, "migrated legacy item");

            if remove_on_completion {
                let mut delete = legacy.clone();
                delete.set(AttributeKey::Account, AttributeValue::Str(key.to_owned()));
                if !matches!(
                    self.backend().delete(&delete),
                    Status::Success | Status::ItemNotFound
                ) {
                    return MigrationOutcome::RemovalFailed;
                }
            }
        }

        if migrated == 0 {
            MigrationOutcome::NothingToMigrate
        } else {
            MigrationOutcome::Migrated {
                migrated,
                already_present,
            }
        }
    }
}
