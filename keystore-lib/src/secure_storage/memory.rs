//! In-memory blob storage.
//!
//! For tests and development only: blobs are not encrypted and are lost
//! when the process exits. Lock poisoning is reported as an error rather
//! than a panic.

use std::collections::HashMap;
use std::sync::RwLock;

use zeroize::Zeroize;

use super::traits::{SecureStorage, SecureStorageError, SecureStorageResult};

/// In-memory implementation of [`SecureStorage`].
pub struct InMemoryStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

fn lock_error(context: &str) -> SecureStorageError {
    SecureStorageError::internal(format!(
        "InMemoryStorage: lock poisoned during {}",
        context
    ))
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureStorage for InMemoryStorage {
    fn get(&self, alias: &str) -> SecureStorageResult<Option<Vec<u8>>> {
        let blobs = self.blobs.read().map_err(|_| lock_error("get"))?;
        Ok(blobs.get(alias).cloned())
    }

    fn put(&self, alias: &str, data: &[u8]) -> SecureStorageResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| lock_error("put"))?;
        if let Some(mut previous) = blobs.insert(alias.to_string(), data.to_vec()) {
            previous.zeroize();
        }
        Ok(())
    }

    fn delete(&self, alias: &str) -> SecureStorageResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| lock_error("delete"))?;
        match blobs.remove(alias) {
            Some(mut blob) => {
                blob.zeroize();
                Ok(())
            }
            None => Err(SecureStorageError::not_found(alias)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get("alias").unwrap(), None);

        storage.put("alias", b"blob").unwrap();
        assert_eq!(storage.get("alias").unwrap(), Some(b"blob".to_vec()));

        storage.delete("alias").unwrap();
        assert_eq!(storage.get("alias").unwrap(), None);
        assert!(storage.delete("alias").unwrap_err().is_not_found());
    }

    #[test]
    fn test_put_overwrites() {
        let storage = InMemoryStorage::new();
        storage.put("alias", b"one").unwrap();
        storage.put("alias", b"two").unwrap();
        assert_eq!(storage.get("alias").unwrap(), Some(b"two".to_vec()));
    }
}
