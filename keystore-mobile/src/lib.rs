//! Nostr Key Store Mobile FFI Bindings
//!
//! This crate provides UniFFI bindings for the key store, enabling
//! integration with iOS (Swift) and Android (Kotlin) host shells.
//!
//! # Architecture
//!
//! The FFI layer wraps the core `keystore-lib` functionality:
//! - Bech32 codec and protocol primitives (hex/string in, hex/string out)
//! - Key generation and password-protected backups
//! - A key registry over host-provided blob storage
//! - The plugin command dispatcher
//!
//! # Thread Safety
//!
//! All exposed types are thread-safe and can be used from any thread.

pub mod bridge;
pub mod crypto_ffi;
pub mod keys;
pub mod storage;

pub use bridge::{KeyInfo, NostrKeyStoreFFI};
pub use crypto_ffi::{Bech32Decoded, Bech32Variant};
pub use keys::{KeyBackup, NostrKeypair};
pub use storage::{BlobGetResult, BlobOperationResult, CallbackStorage, KeyBlobStorageCallback};

use keystore_lib::secure_storage::SecureStorageError;
use keystore_lib::{KeystoreError, KeystoreErrorCode};

// UniFFI scaffolding
uniffi::setup_scaffolding!();

// ============================================================================
// Error Types
// ============================================================================

/// Mobile-friendly error type.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum KeystoreMobileError {
    /// Malformed text input (bech32, envelope, hex).
    #[error("Format error: {msg}")]
    Format { msg: String },

    /// Invalid bit or block padding.
    #[error("Padding error: {msg}")]
    Padding { msg: String },

    /// Key, point or cipher rejected by the primitive.
    #[error("Crypto error: {msg}")]
    Crypto { msg: String },

    /// Resource not found.
    #[error("Not found: {msg}")]
    NotFound { msg: String },

    /// Validation error (invalid input, wrong password).
    #[error("Validation error: {msg}")]
    Validation { msg: String },

    /// Host storage failure.
    #[error("Storage error: {msg}")]
    Storage { msg: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {msg}")]
    Serialization { msg: String },

    /// Internal error (unexpected state).
    #[error("Internal error: {msg}")]
    Internal { msg: String },
}

impl From<KeystoreError> for KeystoreMobileError {
    fn from(e: KeystoreError) -> Self {
        let msg = e.message();
        match e.code() {
            KeystoreErrorCode::Format => Self::Format { msg },
            KeystoreErrorCode::Padding => Self::Padding { msg },
            KeystoreErrorCode::Crypto => Self::Crypto { msg },
            KeystoreErrorCode::NotFound => Self::NotFound { msg },
            KeystoreErrorCode::InvalidData => Self::Validation { msg },
            KeystoreErrorCode::Serialization => Self::Serialization { msg },
            KeystoreErrorCode::Storage => Self::Storage { msg },
            KeystoreErrorCode::Internal => Self::Internal { msg },
        }
    }
}

impl From<SecureStorageError> for KeystoreMobileError {
    fn from(e: SecureStorageError) -> Self {
        KeystoreError::from(e).into()
    }
}

impl From<serde_json::Error> for KeystoreMobileError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization { msg: e.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, KeystoreMobileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use keystore_lib::Bech32Error;

    #[test]
    fn error_kinds_survive_flattening() {
        let format: KeystoreMobileError = KeystoreError::from(Bech32Error::InvalidChecksum).into();
        assert!(matches!(format, KeystoreMobileError::Format { .. }));

        let padding: KeystoreMobileError = KeystoreError::from(Bech32Error::NonZeroPadding).into();
        assert!(matches!(padding, KeystoreMobileError::Padding { .. }));

        let missing: KeystoreMobileError = SecureStorageError::not_found("abc").into();
        assert!(matches!(missing, KeystoreMobileError::NotFound { .. }));

        let crypto: KeystoreMobileError = KeystoreError::Crypto("bad point".into()).into();
        assert!(crypto.to_string().contains("bad point"));
    }
}
