//! Error types for key-store operations.
//!
//! Every failure carries a [`KeystoreErrorCode`] so hosts can tell a
//! malformed input (format), a corrupted payload (padding) and a rejected
//! key or point (crypto) apart without parsing message text.

use crate::bech32::Bech32Error;
use crate::secure_storage::SecureStorageError;

/// Error codes for FFI and mobile integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum KeystoreErrorCode {
    /// Malformed text input (bech32, envelope, hex)
    Format = 1000,
    /// Invalid bit padding or block padding
    Padding = 2000,
    /// The secp256k1 or cipher primitive rejected its input
    Crypto = 3000,
    /// Key or resource not found
    NotFound = 4000,
    /// Invalid request/data
    InvalidData = 5000,
    /// Serialization error
    Serialization = 5002,
    /// Storage collaborator failure
    Storage = 7000,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for key-store operations.
#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    /// Bech32 decode or encode failure.
    #[error("bech32 error: {0}")]
    Bech32(#[from] Bech32Error),

    /// Encrypted payload is not of the form `<base64>?iv=<base64>`.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Cipher block padding was invalid after decryption.
    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    /// Elliptic-curve or cipher primitive rejected its input.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Invalid data provided.
    #[error("invalid {field}: {reason}")]
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Resource not found (key, alias, current selection).
    #[error("{resource_type} not found: {identifier}")]
    NotFound {
        /// Type of resource (e.g., "key", "current key")
        resource_type: String,
        /// Resource identifier
        identifier: String,
    },

    /// Storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(#[from] SecureStorageError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal/unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KeystoreError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> KeystoreErrorCode {
        match self {
            Self::Bech32(e) if e.is_padding_error() => KeystoreErrorCode::Padding,
            Self::Bech32(_) => KeystoreErrorCode::Format,
            Self::MalformedEnvelope(_) => KeystoreErrorCode::Format,
            Self::InvalidPadding(_) => KeystoreErrorCode::Padding,
            Self::Crypto(_) => KeystoreErrorCode::Crypto,
            Self::InvalidData { .. } => KeystoreErrorCode::InvalidData,
            Self::NotFound { .. } => KeystoreErrorCode::NotFound,
            Self::Storage(e) if e.is_not_found() => KeystoreErrorCode::NotFound,
            Self::Storage(_) => KeystoreErrorCode::Storage,
            Self::Serialization(_) => KeystoreErrorCode::Serialization,
            Self::Internal(_) => KeystoreErrorCode::Internal,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_format_error(&self) -> bool {
        self.code() == KeystoreErrorCode::Format
    }

    pub fn is_padding_error(&self) -> bool {
        self.code() == KeystoreErrorCode::Padding
    }

    pub fn is_crypto_error(&self) -> bool {
        self.code() == KeystoreErrorCode::Crypto
    }

    /// Create a crypto error from any primitive error.
    pub fn crypto(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Crypto(format!("{}: {}", context, err))
    }

    /// Create a not found error.
    pub fn not_found(resource_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for KeystoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bech32_errors_split_into_format_and_padding() {
        let err: KeystoreError = Bech32Error::MixedCase.into();
        assert_eq!(err.code(), KeystoreErrorCode::Format);
        assert!(err.is_format_error());

        let err: KeystoreError = Bech32Error::NonZeroPadding.into();
        assert_eq!(err.code(), KeystoreErrorCode::Padding);
        assert!(err.is_padding_error());
    }

    #[test]
    fn test_envelope_and_cipher_codes() {
        assert!(KeystoreError::MalformedEnvelope("no iv".into()).is_format_error());
        assert!(KeystoreError::InvalidPadding("bad block".into()).is_padding_error());
        assert!(KeystoreError::crypto("ecdh", "invalid point").is_crypto_error());
    }

    #[test]
    fn test_helper_constructors() {
        let err = KeystoreError::not_found("key", "abcd");
        assert_eq!(err.code(), KeystoreErrorCode::NotFound);
        assert_eq!(err.to_string(), "key not found: abcd");

        let err = KeystoreError::invalid_data("secret", "empty");
        assert_eq!(err.code(), KeystoreErrorCode::InvalidData);
    }

    #[test]
    fn test_storage_not_found_maps_to_not_found() {
        let err: KeystoreError = SecureStorageError::not_found("alias").into();
        assert_eq!(err.code(), KeystoreErrorCode::NotFound);
    }
}
