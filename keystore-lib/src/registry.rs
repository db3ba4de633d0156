//! Multi-key custody on top of a [`SecureStorage`] backend.
//!
//! The registry keeps two kinds of blobs:
//!
//! - the key index, a JSON object stored under
//!   [`KeystoreConfig::index_alias`]:
//!   `{"currentAlias": "<hex>", "<hex>": {"name", "publicKey", "isCurrent", "addedAt"}}`
//! - one 32-byte secret per key, stored under its public key hex.
//!
//! All index updates are read-modify-write under a registry-wide lock.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::KeystoreConfig;
use crate::crypto::{self, PrivateKey, PublicKey, KEY_LEN};
use crate::errors::KeystoreError;
use crate::event::{EventTemplate, SignedEvent};
use crate::secure_storage::SecureStorage;
use crate::Result;

/// One registered key as it appears in the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntry {
    pub name: String,
    pub public_key: String,
    #[serde(default)]
    pub is_current: bool,
    /// Unix seconds; absent on entries written by older hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<i64>,
}

/// The persisted key index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyIndex {
    /// Public key hex of the selected key, or empty.
    #[serde(rename = "currentAlias", default)]
    pub current_alias: String,
    #[serde(flatten)]
    pub keys: BTreeMap<String, KeyEntry>,
}

impl KeyIndex {
    pub fn current(&self) -> Option<&KeyEntry> {
        if self.current_alias.is_empty() {
            return None;
        }
        self.keys.get(&self.current_alias)
    }

    /// Point `currentAlias` at `alias` and keep every `isCurrent` flag in step.
    fn set_current(&mut self, alias: &str) {
        self.current_alias = alias.to_string();
        for (key, entry) in self.keys.iter_mut() {
            entry.is_current = key == alias;
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Key store over an alias-keyed blob backend.
pub struct KeyRegistry<S: SecureStorage> {
    storage: S,
    config: KeystoreConfig,
    index_lock: Mutex<()>,
}

impl<S: SecureStorage> KeyRegistry<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, KeystoreConfig::default())
    }

    pub fn with_config(storage: S, config: KeystoreConfig) -> Self {
        Self {
            storage,
            config,
            index_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &KeystoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Register a secret (`nsec` or hex) under `name` and make it current.
    ///
    /// Re-adding a known key renames it and selects it.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, secret)))]
    pub fn add_key(&self, name: &str, secret: &str) -> Result<PublicKey> {
        if name.trim().is_empty() {
            return Err(KeystoreError::invalid_data("name", "must not be empty"));
        }
        let key = PrivateKey::parse(
            secret,
            &self.config.secret_key_hrp,
            self.config.accept_hex_secrets,
        )?;
        let public_key = key.public_key();
        let alias = public_key.to_hex();

        let _guard = self.lock()?;
        let mut index = self.load_index()?;
        self.storage.put(&alias, key.as_bytes())?;

        let added_at = index
            .keys
            .get(&alias)
            .and_then(|entry| entry.added_at)
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        index.keys.insert(
            alias.clone(),
            KeyEntry {
                name: name.to_string(),
                public_key: alias.clone(),
                is_current: true,
                added_at: Some(added_at),
            },
        );
        index.set_current(&alias);
        self.save_index(&index)?;

        #[cfg(feature = "tracing")]
        tracing::info!(public_key = %alias, "key added");
        Ok(public_key)
    }

    /// Snapshot of the index.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn list_keys(&self) -> Result<KeyIndex> {
        let _guard = self.lock()?;
        self.load_index()
    }

    /// Make a registered key current.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn select_key(&self, public_key: &str) -> Result<KeyIndex> {
        let alias = self.resolve_alias(public_key)?;
        let _guard = self.lock()?;
        let mut index = self.load_index()?;
        if !index.keys.contains_key(&alias) {
            return Err(KeystoreError::not_found("key", alias));
        }
        index.set_current(&alias);
        self.save_index(&index)?;
        Ok(index)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn edit_key(&self, public_key: &str, name: &str) -> Result<KeyIndex> {
        if name.trim().is_empty() {
            return Err(KeystoreError::invalid_data("name", "must not be empty"));
        }
        let alias = self.resolve_alias(public_key)?;
        let _guard = self.lock()?;
        let mut index = self.load_index()?;
        let entry = index
            .keys
            .get_mut(&alias)
            .ok_or_else(|| KeystoreError::not_found("key", alias.clone()))?;
        entry.name = name.to_string();
        self.save_index(&index)?;
        Ok(index)
    }

    /// Export a registered secret as bech32 with the configured secret HRP.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn show_key(&self, public_key: &str) -> Result<Zeroizing<String>> {
        let alias = self.resolve_alias(public_key)?;
        let _guard = self.lock()?;
        if !self.load_index()?.keys.contains_key(&alias) {
            return Err(KeystoreError::not_found("key", alias));
        }
        self.load_private_key(&alias)?
            .to_bech32(&self.config.secret_key_hrp)
    }

    /// Remove a key and its secret. Clears the selection if it was current.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn delete_key(&self, public_key: &str) -> Result<KeyIndex> {
        let alias = self.resolve_alias(public_key)?;
        let _guard = self.lock()?;
        let mut index = self.load_index()?;
        if index.keys.remove(&alias).is_none() {
            return Err(KeystoreError::not_found("key", alias));
        }
        if index.current_alias == alias {
            index.current_alias.clear();
        }
        // Index first: a failed blob delete leaves an orphan secret, not a dangling entry.
        self.save_index(&index)?;

        match self.storage.delete(&alias) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                #[cfg(feature = "tracing")]
                tracing::warn!(public_key = %alias, "index entry had no stored secret");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(index)
    }

    /// Public key of the selected key.
    pub fn current_public_key(&self) -> Result<PublicKey> {
        let _guard = self.lock()?;
        let alias = self.current_alias()?;
        PublicKey::from_hex(&alias)
    }

    /// Sign a host event with the selected key.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, template), fields(kind = template.kind)))]
    pub fn sign_event(&self, template: EventTemplate) -> Result<SignedEvent> {
        let key = self.current_private_key()?;
        template.sign(&key)
    }

    /// Encrypt for `peer` (hex or bech32 public key) with the selected key.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, plaintext)))]
    pub fn encrypt(&self, peer: &str, plaintext: &str) -> Result<String> {
        let peer = PublicKey::parse(peer, &self.config.public_key_hrp)?;
        let key = self.current_private_key()?;
        crypto::encrypt(plaintext, key.shared_secret(&peer)?.as_slice())
    }

    /// Decrypt an envelope from `peer` with the selected key.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, envelope)))]
    pub fn decrypt(&self, peer: &str, envelope: &str) -> Result<String> {
        let peer = PublicKey::parse(peer, &self.config.public_key_hrp)?;
        let key = self.current_private_key()?;
        crypto::decrypt(envelope, key.shared_secret(&peer)?.as_slice())
    }

    fn current_private_key(&self) -> Result<PrivateKey> {
        let _guard = self.lock()?;
        let alias = self.current_alias()?;
        self.load_private_key(&alias)
    }

    fn current_alias(&self) -> Result<String> {
        let index = self.load_index()?;
        match index.current() {
            Some(entry) => Ok(entry.public_key.clone()),
            None => Err(KeystoreError::not_found(
                "current key",
                index.current_alias.clone(),
            )),
        }
    }

    /// Stored secrets are 32 raw bytes; text blobs (`nsec` or hex) are also read.
    fn load_private_key(&self, alias: &str) -> Result<PrivateKey> {
        let blob = Zeroizing::new(
            self.storage
                .get(alias)?
                .ok_or_else(|| KeystoreError::not_found("secret", alias))?,
        );
        let key = if blob.len() == KEY_LEN {
            PrivateKey::from_bytes(&blob)?
        } else {
            let text = std::str::from_utf8(&blob)
                .map_err(|_| KeystoreError::invalid_data("stored secret", "not 32 bytes or text"))?;
            PrivateKey::parse(text, &self.config.secret_key_hrp, true)?
        };

        if key.public_key().to_hex() != alias {
            return Err(KeystoreError::invalid_data(
                "stored secret",
                "does not match its public key",
            ));
        }
        Ok(key)
    }

    fn resolve_alias(&self, public_key: &str) -> Result<String> {
        if public_key.trim().is_empty() {
            return Err(KeystoreError::invalid_data("publicKey", "must not be empty"));
        }
        Ok(PublicKey::parse(public_key, &self.config.public_key_hrp)?.to_hex())
    }

    fn load_index(&self) -> Result<KeyIndex> {
        let Some(blob) = self.storage.get(&self.config.index_alias)? else {
            return Ok(KeyIndex::default());
        };
        if blob.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(KeyIndex::default());
        }
        serde_json::from_slice(&blob).map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %e, "stored key index is malformed");
            KeystoreError::Serialization(format!("key index: {}", e))
        })
    }

    fn save_index(&self, index: &KeyIndex) -> Result<()> {
        let json = serde_json::to_vec(index)?;
        self.storage.put(&self.config.index_alias, &json)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.index_lock
            .lock()
            .map_err(|_| KeystoreError::Internal("key registry lock poisoned".into()))
    }
}
