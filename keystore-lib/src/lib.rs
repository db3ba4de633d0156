//! Nostr key-custody library.
//!
//! Stores signing keys behind a pluggable blob store and exposes the
//! protocol primitives a mobile host needs:
//!
//! - **Bech32/Bech32m**: checksummed `npub`/`nsec` text encoding
//! - **Events**: NIP-01 canonical ids and BIP-340 Schnorr signatures
//! - **Encryption**: ECDH shared secrets and NIP-04 `base64?iv=base64` envelopes
//! - **Custody**: a multi-key registry and the plugin command dispatcher
//!
//! # Example
//!
//! ```
//! use keystore_lib::{EventTemplate, InMemoryStorage, KeyRegistry};
//!
//! let registry = KeyRegistry::new(InMemoryStorage::new());
//! registry
//!     .add_key("main", "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5")
//!     .unwrap();
//!
//! let event = registry
//!     .sign_event(EventTemplate::new(1_700_000_000, 1, vec![], "hello"))
//!     .unwrap();
//! assert!(event.verify());
//! ```

pub mod bech32;
pub mod command;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod event;
pub mod registry;
pub mod secure_storage;

pub use bech32::{Bech32Error, Encoding, Int5};
pub use command::{dispatch, KeystoreCommand};
pub use config::KeystoreConfig;
pub use crypto::{PrivateKey, PublicKey};
pub use errors::{KeystoreError, KeystoreErrorCode};
pub use event::{EventTemplate, SignedEvent};
pub use registry::{KeyEntry, KeyIndex, KeyRegistry};
pub use secure_storage::{FileStorage, InMemoryStorage, SecureStorage, SecureStorageError};

/// Common result alias for key-store operations.
pub type Result<T> = std::result::Result<T, KeystoreError>;
