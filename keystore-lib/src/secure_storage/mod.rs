//! Alias-keyed blob storage for key material and the key index.
//!
//! Implementations:
//! - [`InMemoryStorage`] (tests and development)
//! - [`FileStorage`] (one file per alias in an app-private directory)
//!
//! Mobile hosts plug their keychain/keystore in through the same
//! [`SecureStorage`] trait.

mod file;
mod memory;
mod traits;

pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use traits::{SecureStorage, SecureStorageError, SecureStorageErrorCode, SecureStorageResult};
