//! Key management for the mobile key store
//!
//! FFI-safe secp256k1 key generation, NIP-19 formatting and password
//! protected backups.
//!
//! # Security
//!
//! - Secret keys should live in platform-secure storage (Keychain/EncryptedSharedPreferences)
//! - Intermediate secret buffers are zeroized after use
//! - Backups are encrypted with a password-derived key (Argon2 + AES-256-GCM)

use keystore_lib::{PrivateKey, PublicKey};
use zeroize::Zeroizing;

use crate::{KeystoreMobileError, Result};

const BACKUP_VERSION: u32 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// secp256k1 keypair in every text form a host needs.
#[derive(Clone, uniffi::Record)]
pub struct NostrKeypair {
    /// Secret key - 32 bytes, hex encoded.
    /// SENSITIVE: Store securely.
    pub secret_key_hex: String,
    /// Secret key as bech32 `nsec`.
    pub nsec: String,
    /// x-only public key - 32 bytes, hex encoded.
    pub public_key_hex: String,
    /// Public key as bech32 `npub`.
    pub npub: String,
}

impl NostrKeypair {
    fn from_private_key(key: &PrivateKey) -> Result<Self> {
        let public_key = key.public_key();
        Ok(Self {
            secret_key_hex: key.to_hex().to_string(),
            nsec: key.to_nsec()?.to_string(),
            public_key_hex: public_key.to_hex(),
            npub: public_key.to_npub()?,
        })
    }
}

/// Encrypted key backup for export/import.
#[derive(Clone, uniffi::Record)]
pub struct KeyBackup {
    /// Version of the backup format.
    pub version: u32,
    /// Encrypted secret key (AES-GCM).
    pub encrypted_data_hex: String,
    /// Salt for key derivation from password.
    pub salt_hex: String,
    /// Nonce for AES-GCM.
    pub nonce_hex: String,
    /// Public key (not encrypted, for identification).
    pub public_key_hex: String,
}

/// Generate a fresh random keypair.
#[uniffi::export]
pub fn generate_keypair() -> Result<NostrKeypair> {
    NostrKeypair::from_private_key(&PrivateKey::generate())
}

/// Derive the full keypair from a secret given as `nsec` or 64-char hex.
#[uniffi::export]
pub fn keypair_from_secret(secret: String) -> Result<NostrKeypair> {
    let secret = Zeroizing::new(secret);
    let key = PrivateKey::parse(secret.trim(), keystore_lib::config::NSEC_HRP, true)?;
    NostrKeypair::from_private_key(&key)
}

/// Format a hex public key as `npub`.
#[uniffi::export]
pub fn format_npub(public_key_hex: String) -> Result<String> {
    Ok(PublicKey::from_hex(&public_key_hex)?.to_npub()?)
}

/// Parse an `npub` (or hex) public key to hex.
#[uniffi::export]
pub fn parse_npub(npub: String) -> Result<String> {
    Ok(PublicKey::parse(npub.trim(), keystore_lib::config::NPUB_HRP)?.to_hex())
}

/// Export a secret key to a password-encrypted backup.
///
/// # Arguments
///
/// * `secret` - The secret key as `nsec` or hex.
/// * `password` - Password used to derive the encryption key.
#[uniffi::export]
pub fn export_key_backup(secret: String, password: String) -> Result<KeyBackup> {
    use aes_gcm::{
        aead::{Aead, KeyInit},
        Aes256Gcm, Nonce,
    };
    use rand::RngCore;

    let secret = Zeroizing::new(secret);
    let password = Zeroizing::new(password);
    let key = PrivateKey::parse(secret.trim(), keystore_lib::config::NSEC_HRP, true)?;

    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let encryption_key = derive_backup_key(password.as_bytes(), &salt)?;

    let cipher = Aes256Gcm::new_from_slice(&encryption_key[..]).map_err(|e| {
        KeystoreMobileError::Internal {
            msg: format!("Cipher init failed: {}", e),
        }
    })?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let encrypted = cipher
        .encrypt(nonce, &key.as_bytes()[..])
        .map_err(|e| KeystoreMobileError::Internal {
            msg: format!("Encryption failed: {}", e),
        })?;

    Ok(KeyBackup {
        version: BACKUP_VERSION,
        encrypted_data_hex: hex::encode(encrypted),
        salt_hex: hex::encode(salt),
        nonce_hex: hex::encode(nonce_bytes),
        public_key_hex: key.public_key().to_hex(),
    })
}

/// Import a keypair from an encrypted backup.
#[uniffi::export]
pub fn import_key_backup(backup: KeyBackup, password: String) -> Result<NostrKeypair> {
    use aes_gcm::{
        aead::{Aead, KeyInit},
        Aes256Gcm, Nonce,
    };

    if backup.version != BACKUP_VERSION {
        return Err(KeystoreMobileError::Validation {
            msg: format!("Unsupported backup version: {}", backup.version),
        });
    }

    let password = Zeroizing::new(password);
    let salt = decode_hex_field("salt", &backup.salt_hex)?;
    let nonce_bytes = decode_hex_field("nonce", &backup.nonce_hex)?;
    let encrypted = decode_hex_field("encrypted data", &backup.encrypted_data_hex)?;

    if nonce_bytes.len() != NONCE_LEN {
        return Err(KeystoreMobileError::Validation {
            msg: "Invalid nonce length".to_string(),
        });
    }

    let encryption_key = derive_backup_key(password.as_bytes(), &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&encryption_key[..]).map_err(|e| {
        KeystoreMobileError::Internal {
            msg: format!("Cipher init failed: {}", e),
        }
    })?;

    let decrypted = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), &encrypted[..])
            .map_err(|_| KeystoreMobileError::Validation {
                msg: "Invalid password or corrupted backup".to_string(),
            })?,
    );

    let key = PrivateKey::from_bytes(&decrypted)?;
    let keypair = NostrKeypair::from_private_key(&key)?;

    if !keypair.public_key_hex.eq_ignore_ascii_case(&backup.public_key_hex) {
        return Err(KeystoreMobileError::Validation {
            msg: "Backup public key mismatch".to_string(),
        });
    }

    Ok(keypair)
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

fn derive_backup_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let mut key = Zeroizing::new([0u8; 32]);
    argon2::Argon2::default()
        .hash_password_into(password, salt, &mut key[..])
        .map_err(|e| KeystoreMobileError::Internal {
            msg: format!("Key derivation failed: {}", e),
        })?;
    Ok(key)
}

fn decode_hex_field(field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| KeystoreMobileError::Validation {
        msg: format!("Invalid {}: {}", field, e),
    })
}
