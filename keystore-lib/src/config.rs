//! Key-store configuration.

use serde::{Deserialize, Serialize};

use crate::errors::KeystoreError;
use crate::Result;

/// Storage alias of the key index blob.
pub const DEFAULT_INDEX_ALIAS: &str = "nostrKeys";

/// File-name prefix used by [`FileStorage`](crate::secure_storage::FileStorage).
pub const DEFAULT_FILE_PREFIX: &str = "SKS_KEY_FILE";

/// HRP of bech32-encoded private keys.
pub const NSEC_HRP: &str = "nsec";

/// HRP of bech32-encoded public keys.
pub const NPUB_HRP: &str = "npub";

/// Configuration for a [`KeyRegistry`](crate::registry::KeyRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreConfig {
    /// Alias under which the key index JSON is stored.
    #[serde(default = "default_index_alias")]
    pub index_alias: String,

    /// File-name prefix for file-backed storage.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// HRP expected on `nsec` input and produced on export.
    #[serde(default = "default_secret_key_hrp")]
    pub secret_key_hrp: String,

    /// HRP used when rendering public keys.
    #[serde(default = "default_public_key_hrp")]
    pub public_key_hrp: String,

    /// Accept 64-char hex secrets in addition to bech32.
    #[serde(default = "default_accept_hex_secrets")]
    pub accept_hex_secrets: bool,
}

fn default_index_alias() -> String {
    DEFAULT_INDEX_ALIAS.to_string()
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_secret_key_hrp() -> String {
    NSEC_HRP.to_string()
}

fn default_public_key_hrp() -> String {
    NPUB_HRP.to_string()
}

fn default_accept_hex_secrets() -> bool {
    true
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            index_alias: default_index_alias(),
            file_prefix: default_file_prefix(),
            secret_key_hrp: default_secret_key_hrp(),
            public_key_hrp: default_public_key_hrp(),
            accept_hex_secrets: default_accept_hex_secrets(),
        }
    }
}

impl KeystoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a host-supplied JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that aliases and HRPs are usable.
    pub fn validate(&self) -> Result<()> {
        if self.index_alias.is_empty() {
            return Err(KeystoreError::invalid_data("index_alias", "must not be empty"));
        }
        for (field, hrp) in [
            ("secret_key_hrp", &self.secret_key_hrp),
            ("public_key_hrp", &self.public_key_hrp),
        ] {
            if hrp.is_empty() || hrp.len() > crate::bech32::MAX_HRP_LEN {
                return Err(KeystoreError::invalid_data(field, "hrp must be 1 to 83 characters"));
            }
        }
        Ok(())
    }

    pub fn with_index_alias(mut self, alias: impl Into<String>) -> Self {
        self.index_alias = alias.into();
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_secret_key_hrp(mut self, hrp: impl Into<String>) -> Self {
        self.secret_key_hrp = hrp.into();
        self
    }

    pub fn with_public_key_hrp(mut self, hrp: impl Into<String>) -> Self {
        self.public_key_hrp = hrp.into();
        self
    }

    /// Allow or refuse raw hex secrets.
    pub fn with_hex_secrets(mut self, accept: bool) -> Self {
        self.accept_hex_secrets = accept;
        self
    }
}
