//! Host-provided blob storage
//!
//! Mobile shells keep key blobs in the platform keystore (iOS Keychain,
//! Android Keystore-backed files). They implement
//! [`KeyBlobStorageCallback`] and hand it to
//! [`NostrKeyStoreFFI::from_callback`](crate::NostrKeyStoreFFI::from_callback);
//! [`CallbackStorage`] adapts it to `SecureStorage`.

use keystore_lib::secure_storage::{
    SecureStorage, SecureStorageError, SecureStorageErrorCode, SecureStorageResult,
};

/// Result type for blob get operations.
#[derive(Clone, Debug, uniffi::Record)]
pub struct BlobGetResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// The blob if found (None if not found but successful)
    pub data: Option<Vec<u8>>,
    /// Error message if failed
    pub error: Option<String>,
}

impl BlobGetResult {
    /// Create a success result.
    pub fn ok(data: Option<Vec<u8>>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    /// Create an error result.
    pub fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Result type for blob put/delete operations.
#[derive(Clone, Debug, uniffi::Record)]
pub struct BlobOperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Set by `delete` when nothing was stored under the alias
    pub not_found: bool,
    /// Error message if failed
    pub error: Option<String>,
}

impl BlobOperationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            not_found: false,
            error: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            not_found: true,
            error: None,
        }
    }

    pub fn err(message: String) -> Self {
        Self {
            success: false,
            not_found: false,
            error: Some(message),
        }
    }
}

/// Blob store implemented by the host shell.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync).
#[uniffi::export(callback_interface)]
pub trait KeyBlobStorageCallback: Send + Sync {
    /// Read the blob stored under `alias`.
    fn get(&self, alias: String) -> BlobGetResult;

    /// Store `data` under `alias`, replacing any previous blob.
    fn put(&self, alias: String, data: Vec<u8>) -> BlobOperationResult;

    /// Remove the blob under `alias`.
    fn delete(&self, alias: String) -> BlobOperationResult;
}

/// [`SecureStorage`] over a host callback.
pub struct CallbackStorage {
    callback: Box<dyn KeyBlobStorageCallback>,
}

impl CallbackStorage {
    pub fn new(callback: Box<dyn KeyBlobStorageCallback>) -> Self {
        Self { callback }
    }
}

fn host_error(alias: &str, error: Option<String>) -> SecureStorageError {
    SecureStorageError {
        code: SecureStorageErrorCode::Io,
        message: error.unwrap_or_else(|| "host storage failed".to_string()),
        alias: Some(alias.to_string()),
    }
}

impl SecureStorage for CallbackStorage {
    fn get(&self, alias: &str) -> SecureStorageResult<Option<Vec<u8>>> {
        let result = self.callback.get(alias.to_string());
        if result.success {
            Ok(result.data)
        } else {
            Err(host_error(alias, result.error))
        }
    }

    fn put(&self, alias: &str, data: &[u8]) -> SecureStorageResult<()> {
        let result = self.callback.put(alias.to_string(), data.to_vec());
        if result.success {
            Ok(())
        } else {
            Err(host_error(alias, result.error))
        }
    }

    fn delete(&self, alias: &str) -> SecureStorageResult<()> {
        let result = self.callback.delete(alias.to_string());
        if result.success {
            Ok(())
        } else if result.not_found {
            Err(SecureStorageError::not_found(alias))
        } else {
            Err(host_error(alias, result.error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapCallback {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl KeyBlobStorageCallback for MapCallback {
        fn get(&self, alias: String) -> BlobGetResult {
            BlobGetResult::ok(self.blobs.lock().unwrap().get(&alias).cloned())
        }

        fn put(&self, alias: String, data: Vec<u8>) -> BlobOperationResult {
            self.blobs.lock().unwrap().insert(alias, data);
            BlobOperationResult::ok()
        }

        fn delete(&self, alias: String) -> BlobOperationResult {
            match self.blobs.lock().unwrap().remove(&alias) {
                Some(_) => BlobOperationResult::ok(),
                None => BlobOperationResult::not_found(),
            }
        }
    }

    struct LockedCallback;

    impl KeyBlobStorageCallback for LockedCallback {
        fn get(&self, _alias: String) -> BlobGetResult {
            BlobGetResult::err("device locked".to_string())
        }

        fn put(&self, _alias: String, _data: Vec<u8>) -> BlobOperationResult {
            BlobOperationResult::err("device locked".to_string())
        }

        fn delete(&self, _alias: String) -> BlobOperationResult {
            BlobOperationResult::err("device locked".to_string())
        }
    }

    #[test]
    fn test_callback_storage_roundtrip() {
        let storage = CallbackStorage::new(Box::new(MapCallback::default()));
        assert_eq!(storage.get("a").unwrap(), None);

        storage.put("a", b"blob").unwrap();
        assert_eq!(storage.get("a").unwrap(), Some(b"blob".to_vec()));

        storage.delete("a").unwrap();
        assert!(storage.delete("a").unwrap_err().is_not_found());
    }

    #[test]
    fn test_host_failure_is_io_error() {
        let storage = CallbackStorage::new(Box::new(LockedCallback));
        let err = storage.get("a").unwrap_err();
        assert_eq!(err.code, SecureStorageErrorCode::Io);
        assert!(err.message.contains("device locked"));
        assert_eq!(err.alias.as_deref(), Some("a"));
        assert!(!storage.delete("a").unwrap_err().is_not_found());
    }
}
