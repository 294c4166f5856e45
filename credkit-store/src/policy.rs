//! Accessibility and hardware access-control policies.
//!
//! These are the closed policy axes a [`crate::Configuration`] is built
//! from. [`Accessibility`] governs when an item is readable relative to
//! device lock state; [`SecureEnclaveAccessControl`] gates hardware-backed
//! items behind a user-attestation check and resolves to a distinct
//! [`AccessControlFlags`] combination at query-build time.

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// When an item is readable relative to device lock state, and whether it
/// may be restored onto another device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Accessibility {
    /// Readable while the device is unlocked; included in backups.
    WhenUnlocked,
    /// Readable any time after the first unlock since boot; included in backups.
    AfterFirstUnlock,
    /// Readable while the device is unlocked; never leaves this device.
    WhenUnlockedThisDeviceOnly,
    /// Readable after the first unlock since boot; never leaves this device.
    AfterFirstUnlockThisDeviceOnly,
    /// Readable while unlocked and only when a passcode is set; never leaves
    /// this device.
    WhenPasscodeSetThisDeviceOnly,
}

impl Accessibility {
    /// Returns the store's wire encoding for this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WhenUnlocked => "ak",
            Self::AfterFirstUnlock => "ck",
            Self::WhenUnlockedThisDeviceOnly => "aku",
            Self::AfterFirstUnlockThisDeviceOnly => "cku",
            Self::WhenPasscodeSetThisDeviceOnly => "akpu",
        }
    }
}

/// Resolved access-control flag combination for a hardware-backed item.
///
/// Bit values mirror the platform's published access-control constants, so
/// the built query is bit-exact against the real store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessControlFlags(u32);

impl AccessControlFlags {
    /// Presence of the user, satisfied by any enrolled factor.
    pub const USER_PRESENCE: Self = Self(1);
    /// Any enrolled biometry satisfies the check.
    pub const BIOMETRY_ANY: Self = Self(1 << 1);
    /// Only the currently enrolled biometric set satisfies the check.
    pub const BIOMETRY_CURRENT_SET: Self = Self(1 << 3);
    /// The device passcode satisfies the check.
    pub const DEVICE_PASSCODE: Self = Self(1 << 4);
    /// Combines the other constraints disjunctively.
    pub const OR: Self = Self(1 << 14);

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns the union of two flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Hardware-attestation policy for secure-enclave-backed items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum SecureEnclaveAccessControl {
    /// Presence of the user, via any enrolled factor.
    UserPresence,
    /// Any enrolled biometry.
    BiometricAny,
    /// The currently enrolled biometric set only.
    BiometricCurrentSet,
    /// The device passcode.
    DevicePasscode,
    /// Any enrolled biometry, or the device passcode.
    BiometricAnyOrDevicePasscode,
}

impl SecureEnclaveAccessControl {
    /// Resolves this policy to its access-control flag combination.
    #[must_use]
    pub const fn flags(self) -> AccessControlFlags {
        match self {
            Self::UserPresence => AccessControlFlags::USER_PRESENCE,
            Self::BiometricAny => AccessControlFlags::BIOMETRY_ANY,
            Self::BiometricCurrentSet => AccessControlFlags::BIOMETRY_CURRENT_SET,
            Self::DevicePasscode => AccessControlFlags::DEVICE_PASSCODE,
            Self::BiometricAnyOrDevicePasscode => AccessControlFlags::BIOMETRY_ANY
                .union(AccessControlFlags::OR)
                .union(AccessControlFlags::DEVICE_PASSCODE),
        }
    }

    /// Returns a short stable name used in service derivation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserPresence => "user-presence",
            Self::BiometricAny => "biometric-any",
            Self::BiometricCurrentSet => "biometric-current-set",
            Self::DevicePasscode => "device-passcode",
            Self::BiometricAnyOrDevicePasscode => "biometric-any-or-passcode",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_accessibility_wire_encodings_are_distinct() {
        let encodings: HashSet<&str> = Accessibility::iter().map(Accessibility::as_str).collect();
        assert_eq!(encodings.len(), Accessibility::iter().count());
    }

    #[test]
    fn test_each_access_control_resolves_to_distinct_flags() {
        let combinations: HashSet<u32> = SecureEnclaveAccessControl::iter()
            .map(|control| control.flags().bits())
            .collect();
        assert_eq!(combinations.len(), SecureEnclaveAccessControl::iter().count());
    }

    #[test]
    fn test_biometry_or_passcode_combines_disjunctively() {
        let flags = SecureEnclaveAccessControl::BiometricAnyOrDevicePasscode.flags();
        assert!(flags.contains(AccessControlFlags::BIOMETRY_ANY));
        assert!(flags.contains(AccessControlFlags::DEVICE_PASSCODE));
        assert!(flags.contains(AccessControlFlags::OR));
        assert!(!flags.contains(AccessControlFlags::USER_PRESENCE));
    }
}
