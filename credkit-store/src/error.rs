//! Error types for configuration construction and store operations.

use thiserror::Error;

use crate::backend::Status;

/// Errors surfaced by configuration construction and store operations.
///
/// Construction-time validation never produces a partially-built value: a
/// failing constructor returns one of the first three variants and no
/// instance. Store-boundary failures carry the backend status that caused
/// them and are reported once, synchronously, to the caller — nothing in
/// this crate retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An identifier string was empty.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// An access-group string was empty.
    #[error("access group must not be empty")]
    EmptyAccessGroup,

    /// A secure-enclave configuration requested cloud sharing.
    #[error("secure-enclave items cannot be cloud shared")]
    EnclaveCloudSharing,

    /// The backing store rejected an operation.
    #[error("credential store operation failed: {0}")]
    Store(Status),

    /// A result set entry carried no payload bytes.
    #[error("credential store returned an item without payload data")]
    MissingPayload,

    /// A stored payload could not be decoded as UTF-8.
    #[error("stored payload is not valid UTF-8")]
    MalformedUtf8,
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
