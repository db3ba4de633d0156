//! Protocol primitives for host shells
//!
//! Thin hex/string wrappers over `keystore_lib::{bech32, crypto, event}`.
//! Secrets are accepted as 64-char hex or `nsec`; public keys as hex or
//! `npub`.

use keystore_lib::bech32::{self, Encoding, Int5};
use keystore_lib::config::{NPUB_HRP, NSEC_HRP};
use keystore_lib::crypto::{self, KEY_LEN, SIGNATURE_LEN};
use keystore_lib::{EventTemplate, PrivateKey, PublicKey, SignedEvent};
use zeroize::Zeroizing;

use crate::{KeystoreMobileError, Result};

/// Checksum variant of a bech32 string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum Bech32Variant {
    Bech32,
    Bech32m,
    NoChecksum,
}

impl From<Encoding> for Bech32Variant {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Bech32 => Self::Bech32,
            Encoding::Bech32m => Self::Bech32m,
            Encoding::NoChecksum => Self::NoChecksum,
        }
    }
}

impl From<Bech32Variant> for Encoding {
    fn from(variant: Bech32Variant) -> Self {
        match variant {
            Bech32Variant::Bech32 => Self::Bech32,
            Bech32Variant::Bech32m => Self::Bech32m,
            Bech32Variant::NoChecksum => Self::NoChecksum,
        }
    }
}

/// Decoded bech32 string.
#[derive(Clone, Debug, uniffi::Record)]
pub struct Bech32Decoded {
    /// Lowercase human-readable part.
    pub hrp: String,
    /// 5-bit symbols for [`bech32_decode`], regrouped bytes for [`bech32_decode_bytes`].
    pub data: Vec<u8>,
    pub encoding: Bech32Variant,
}

// ============================================================================
// Bech32
// ============================================================================

#[uniffi::export]
pub fn bech32_decode(input: String, no_checksum: bool) -> Result<Bech32Decoded> {
    let decoded = bech32::decode(&input, no_checksum).map_err(keystore_lib::KeystoreError::from)?;
    Ok(Bech32Decoded {
        hrp: decoded.hrp,
        data: decoded.data.into_iter().map(u8::from).collect(),
        encoding: decoded.encoding.into(),
    })
}

#[uniffi::export]
pub fn bech32_decode_bytes(input: String, no_checksum: bool) -> Result<Bech32Decoded> {
    let decoded =
        bech32::decode_bytes(&input, no_checksum).map_err(keystore_lib::KeystoreError::from)?;
    Ok(Bech32Decoded {
        hrp: decoded.hrp,
        data: decoded.bytes,
        encoding: decoded.encoding.into(),
    })
}

/// Regroup 5-bit symbols into bytes, skipping the first `offset` symbols.
#[uniffi::export]
pub fn bech32_int5_to_8(symbols: Vec<u8>, offset: u32) -> Result<Vec<u8>> {
    let symbols = to_int5(&symbols)?;
    Ok(bech32::int5_to_8(&symbols, offset as usize).map_err(keystore_lib::KeystoreError::from)?)
}

#[uniffi::export]
pub fn bech32_encode(hrp: String, symbols: Vec<u8>, encoding: Bech32Variant) -> Result<String> {
    let symbols = to_int5(&symbols)?;
    Ok(bech32::encode(&hrp, &symbols, encoding.into()).map_err(keystore_lib::KeystoreError::from)?)
}

#[uniffi::export]
pub fn bech32_encode_bytes(hrp: String, bytes: Vec<u8>, encoding: Bech32Variant) -> Result<String> {
    Ok(bech32::encode_bytes(&hrp, &bytes, encoding.into())
        .map_err(keystore_lib::KeystoreError::from)?)
}

// ============================================================================
// Events and signatures
// ============================================================================

/// NIP-01 event id as hex.
#[uniffi::export]
pub fn compute_event_id_hex(
    pubkey_hex: String,
    created_at: i64,
    kind: u32,
    tags: Vec<Vec<String>>,
    content: String,
) -> Result<String> {
    let id = crypto::compute_event_id(&pubkey_hex, created_at, kind, &tags, &content)?;
    Ok(hex::encode(id))
}

#[uniffi::export]
pub fn derive_public_key_hex(secret: String) -> Result<String> {
    Ok(parse_secret(secret)?.public_key().to_hex())
}

/// BIP-340 signature over a 32-byte digest.
#[uniffi::export]
pub fn sign_schnorr_hex(digest_hex: String, secret: String) -> Result<String> {
    let digest: [u8; KEY_LEN] = hex_to_array(&digest_hex)?;
    let key = parse_secret(secret)?;
    Ok(hex::encode(key.sign(&digest)?))
}

/// False on any malformed input or failed verification.
#[uniffi::export]
pub fn verify_schnorr(digest_hex: String, signature_hex: String, public_key_hex: String) -> bool {
    let (Ok(digest), Ok(signature), Ok(public_key)) = (
        hex_to_array::<KEY_LEN>(&digest_hex),
        hex_to_array::<SIGNATURE_LEN>(&signature_hex),
        hex_to_array::<KEY_LEN>(&public_key_hex),
    ) else {
        return false;
    };
    crypto::verify_signature(&digest, &signature, &public_key)
}

/// Sign an unsigned event object (JSON) and return the signed event JSON.
#[uniffi::export]
pub fn sign_event_json(event_json: String, secret: String) -> Result<String> {
    let template: EventTemplate = serde_json::from_str(&event_json)?;
    let signed = template.sign(&parse_secret(secret)?)?;
    Ok(serde_json::to_string(&signed)?)
}

#[uniffi::export]
pub fn verify_event_json(event_json: String) -> Result<bool> {
    let event: SignedEvent = serde_json::from_str(&event_json)?;
    Ok(event.verify())
}

// ============================================================================
// Key agreement and NIP-04
// ============================================================================

#[uniffi::export]
pub fn derive_shared_secret_hex(secret: String, peer_public_key: String) -> Result<String> {
    let key = parse_secret(secret)?;
    let peer = PublicKey::parse(&peer_public_key, NPUB_HRP)?;
    Ok(hex::encode(*key.shared_secret(&peer)?))
}

/// Encrypt with a 16, 24 or 32 byte key given as hex.
#[uniffi::export]
pub fn nip04_encrypt(plaintext: String, shared_secret_hex: String) -> Result<String> {
    let plaintext = Zeroizing::new(plaintext);
    let key = decode_key_hex(&shared_secret_hex)?;
    Ok(crypto::encrypt(&plaintext, &key)?)
}

#[uniffi::export]
pub fn nip04_decrypt(envelope: String, shared_secret_hex: String) -> Result<String> {
    let key = decode_key_hex(&shared_secret_hex)?;
    Ok(crypto::decrypt(&envelope, &key)?)
}

#[uniffi::export]
pub fn nip04_encrypt_to(plaintext: String, secret: String, peer_public_key: String) -> Result<String> {
    let plaintext = Zeroizing::new(plaintext);
    let key = parse_secret(secret)?;
    let peer = PublicKey::parse(&peer_public_key, NPUB_HRP)?;
    Ok(crypto::encrypt_to(&plaintext, key.as_bytes(), peer.as_bytes())?)
}

#[uniffi::export]
pub fn nip04_decrypt_from(envelope: String, secret: String, peer_public_key: String) -> Result<String> {
    let key = parse_secret(secret)?;
    let peer = PublicKey::parse(&peer_public_key, NPUB_HRP)?;
    Ok(crypto::decrypt_from(&envelope, key.as_bytes(), peer.as_bytes())?)
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

fn parse_secret(secret: String) -> Result<PrivateKey> {
    let secret = Zeroizing::new(secret);
    Ok(PrivateKey::parse(&secret, NSEC_HRP, true)?)
}

fn to_int5(symbols: &[u8]) -> Result<Vec<Int5>> {
    symbols
        .iter()
        .map(|&value| {
            Int5::try_from(value)
                .map_err(|e| KeystoreMobileError::from(keystore_lib::KeystoreError::from(e)))
        })
        .collect()
}

fn hex_to_array<const N: usize>(input: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(input).map_err(|e| KeystoreMobileError::Format {
        msg: format!("Invalid hex: {}", e),
    })?;
    bytes.try_into().map_err(|bytes: Vec<u8>| KeystoreMobileError::Format {
        msg: format!("Expected {} bytes, got {}", N, bytes.len()),
    })
}

fn decode_key_hex(input: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = hex::decode(input).map_err(|e| KeystoreMobileError::Format {
        msg: format!("Invalid key hex: {}", e),
    })?;
    Ok(Zeroizing::new(key))
}
