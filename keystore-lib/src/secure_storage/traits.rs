//! Core trait and error type for key-blob storage.

use std::fmt;
use std::sync::Arc;

/// Error codes for secure storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SecureStorageErrorCode {
    /// Blob not found
    NotFound = 1000,
    /// Access denied by the platform
    AccessDenied = 2000,
    /// Alias cannot be used as a storage key
    InvalidAlias = 4000,
    /// Filesystem or platform I/O failure
    Io = 5000,
    /// Internal error
    Internal = 9999,
}

/// Error type for secure storage operations.
#[derive(Debug)]
pub struct SecureStorageError {
    /// Error code for FFI/mobile integration
    pub code: SecureStorageErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Alias related to the error (if applicable)
    pub alias: Option<String>,
}

impl SecureStorageError {
    pub fn new(code: SecureStorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            alias: None,
        }
    }

    /// Create a "not found" error.
    pub fn not_found(alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            code: SecureStorageErrorCode::NotFound,
            message: format!("Blob not found: {}", alias),
            alias: Some(alias),
        }
    }

    /// Create an "invalid alias" error.
    pub fn invalid_alias(alias: impl Into<String>, reason: &str) -> Self {
        let alias = alias.into();
        Self {
            code: SecureStorageErrorCode::InvalidAlias,
            message: format!("Invalid alias: {}", reason),
            alias: Some(alias),
        }
    }

    /// Wrap an I/O failure for `alias`. Permission failures become `AccessDenied`.
    pub fn io(alias: impl Into<String>, err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::PermissionDenied => SecureStorageErrorCode::AccessDenied,
            _ => SecureStorageErrorCode::Io,
        };
        Self {
            code,
            message: err.to_string(),
            alias: Some(alias.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SecureStorageErrorCode::Internal, message)
    }

    /// Check if this error indicates the blob wasn't found.
    pub fn is_not_found(&self) -> bool {
        self.code == SecureStorageErrorCode::NotFound
    }
}

impl fmt::Display for SecureStorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{} (alias: {})", self.message, alias)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for SecureStorageError {}

/// Result type for secure storage operations.
pub type SecureStorageResult<T> = Result<T, SecureStorageError>;

/// Alias-keyed byte-blob store.
///
/// Implementations back this with whatever the platform offers (keychain,
/// app-private files, memory). A missing blob is `Ok(None)`, never an error.
pub trait SecureStorage: Send + Sync {
    /// Read the blob stored under `alias`.
    fn get(&self, alias: &str) -> SecureStorageResult<Option<Vec<u8>>>;

    /// Store `data` under `alias`, replacing any previous blob.
    fn put(&self, alias: &str, data: &[u8]) -> SecureStorageResult<()>;

    /// Remove the blob under `alias`.
    ///
    /// # Errors
    /// - `NotFound` if nothing is stored under `alias`
    fn delete(&self, alias: &str) -> SecureStorageResult<()>;
}

impl<S: SecureStorage + ?Sized> SecureStorage for Arc<S> {
    fn get(&self, alias: &str) -> SecureStorageResult<Option<Vec<u8>>> {
        (**self).get(alias)
    }

    fn put(&self, alias: &str, data: &[u8]) -> SecureStorageResult<()> {
        (**self).put(alias, data)
    }

    fn delete(&self, alias: &str) -> SecureStorageResult<()> {
        (**self).delete(alias)
    }
}
