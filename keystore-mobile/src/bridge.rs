//! Key store object exposed to host shells
//!
//! [`NostrKeyStoreFFI`] owns a `KeyRegistry` over one of three blob
//! backends: memory (tests and previews), an app-private directory, or a
//! host callback backed by the platform keystore. Hosts either call the
//! typed methods or forward plugin requests verbatim through
//! [`NostrKeyStoreFFI::execute`].

use std::sync::Arc;

use keystore_lib::secure_storage::{FileStorage, InMemoryStorage, SecureStorage};
use keystore_lib::{EventTemplate, KeyEntry, KeyRegistry, KeystoreConfig, PublicKey};

use crate::storage::{CallbackStorage, KeyBlobStorageCallback};
use crate::Result;

/// One registered key as seen by the host.
#[derive(Clone, Debug, uniffi::Record)]
pub struct KeyInfo {
    pub name: String,
    pub public_key_hex: String,
    pub npub: String,
    pub is_current: bool,
    /// Unix seconds, absent for keys added by older hosts.
    pub added_at: Option<i64>,
}

impl KeyInfo {
    fn from_entry(entry: &KeyEntry, public_key_hrp: &str) -> Result<Self> {
        let npub = PublicKey::from_hex(&entry.public_key)?.to_bech32(public_key_hrp)?;
        Ok(Self {
            name: entry.name.clone(),
            public_key_hex: entry.public_key.clone(),
            npub,
            is_current: entry.is_current,
            added_at: entry.added_at,
        })
    }
}

/// Multi-key store for iOS/Android hosts.
#[derive(uniffi::Object)]
pub struct NostrKeyStoreFFI {
    registry: KeyRegistry<Arc<dyn SecureStorage>>,
}

impl NostrKeyStoreFFI {
    fn with_storage(storage: Arc<dyn SecureStorage>, config: KeystoreConfig) -> Arc<Self> {
        Arc::new(Self {
            registry: KeyRegistry::with_config(storage, config),
        })
    }

    fn key_infos(&self) -> Result<Vec<KeyInfo>> {
        let hrp = &self.registry.config().public_key_hrp;
        self.registry
            .list_keys()?
            .keys
            .values()
            .map(|entry| KeyInfo::from_entry(entry, hrp))
            .collect()
    }
}

#[uniffi::export]
impl NostrKeyStoreFFI {
    /// Store that forgets everything when dropped.
    #[uniffi::constructor]
    pub fn new_in_memory() -> Arc<Self> {
        Self::with_storage(Arc::new(InMemoryStorage::new()), KeystoreConfig::default())
    }

    /// One file per blob inside `path`, which must be app-private.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory for key files (created if missing)
    /// * `config_json` - Optional `KeystoreConfig` JSON
    #[uniffi::constructor]
    pub fn with_directory(path: String, config_json: Option<String>) -> Result<Arc<Self>> {
        let config = parse_config(config_json)?;
        let storage = FileStorage::with_prefix(path, config.file_prefix.clone())?;
        Ok(Self::with_storage(Arc::new(storage), config))
    }

    /// Blobs live wherever the host callback puts them.
    #[uniffi::constructor]
    pub fn from_callback(
        callback: Box<dyn KeyBlobStorageCallback>,
        config_json: Option<String>,
    ) -> Result<Arc<Self>> {
        let config = parse_config(config_json)?;
        Ok(Self::with_storage(Arc::new(CallbackStorage::new(callback)), config))
    }

    /// Register a secret (`nsec` or hex) and select it. Returns the public key hex.
    pub fn add_key(&self, name: String, secret: String) -> Result<String> {
        let secret = zeroize::Zeroizing::new(secret);
        Ok(self.registry.add_key(&name, &secret)?.to_hex())
    }

    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        self.key_infos()
    }

    /// The raw index object, as the plugin `listKeys` action returns it.
    pub fn list_keys_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.registry.list_keys()?)?)
    }

    pub fn select_key(&self, public_key: String) -> Result<()> {
        self.registry.select_key(&public_key)?;
        Ok(())
    }

    pub fn edit_key(&self, public_key: String, name: String) -> Result<()> {
        self.registry.edit_key(&public_key, &name)?;
        Ok(())
    }

    /// Export a stored secret as `nsec`.
    pub fn show_key(&self, public_key: String) -> Result<String> {
        Ok(self.registry.show_key(&public_key)?.to_string())
    }

    pub fn delete_key(&self, public_key: String) -> Result<()> {
        self.registry.delete_key(&public_key)?;
        Ok(())
    }

    /// Hex public key of the selected key.
    pub fn current_public_key(&self) -> Result<String> {
        Ok(self.registry.current_public_key()?.to_hex())
    }

    /// Sign an unsigned event (JSON object) with the selected key.
    pub fn sign_event(&self, event_json: String) -> Result<String> {
        let template: EventTemplate = serde_json::from_str(&event_json)?;
        let signed = self.registry.sign_event(template)?;
        Ok(serde_json::to_string(&signed)?)
    }

    pub fn encrypt(&self, peer_public_key: String, plaintext: String) -> Result<String> {
        let plaintext = zeroize::Zeroizing::new(plaintext);
        Ok(self.registry.encrypt(&peer_public_key, &plaintext)?)
    }

    pub fn decrypt(&self, peer_public_key: String, envelope: String) -> Result<String> {
        Ok(self.registry.decrypt(&peer_public_key, &envelope)?)
    }

    /// Run a plugin action with its JSON argument array; returns JSON.
    pub fn execute(&self, action: String, args_json: String) -> Result<String> {
        let result = keystore_lib::dispatch(&self.registry, &action, &args_json);
        #[cfg(feature = "tracing")]
        if let Err(e) = &result {
            tracing::debug!(action = %action, code = ?e.code(), "plugin action failed");
        }
        Ok(result?)
    }
}

fn parse_config(config_json: Option<String>) -> Result<KeystoreConfig> {
    match config_json {
        Some(json) => Ok(KeystoreConfig::from_json_str(&json)?),
        None => Ok(KeystoreConfig::default()),
    }
}
