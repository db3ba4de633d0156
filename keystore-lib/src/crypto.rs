//! secp256k1 key handling, NIP-01 event ids, BIP-340 signatures and
//! NIP-04 encryption.
//!
//! Every function here is pure: keys come in per call and nothing is
//! retained afterwards. Randomness is only consumed for fresh IVs and
//! key generation.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use k256::elliptic_curve::ecdh::diffie_hellman;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::bech32::{self, Encoding};
use crate::config::{NPUB_HRP, NSEC_HRP};
use crate::errors::KeystoreError;
use crate::Result;

/// Length of secret keys, x-only public keys and digests.
pub const KEY_LEN: usize = 32;

/// Length of a BIP-340 signature.
pub const SIGNATURE_LEN: usize = 64;

/// AES block and IV length.
pub const IV_LEN: usize = 16;

/// Delimiter between ciphertext and IV in an envelope.
pub const IV_DELIMITER: &str = "?iv=";

/// A secp256k1 secret scalar with its x-only public key.
///
/// Wiped on drop; `Debug` never prints the key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    secret: [u8; KEY_LEN],
    #[zeroize(skip)]
    public: PublicKey,
}

impl PrivateKey {
    /// Generate a fresh key from the OS random source.
    pub fn generate() -> Self {
        let secret = k256::SecretKey::random(&mut OsRng);
        Self::from_secret_key(&secret)
    }

    /// Build from 32 raw bytes, rejecting zero and values not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_secret_key(&to_secret_key(bytes)?))
    }

    fn from_secret_key(secret: &k256::SecretKey) -> Self {
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&secret.to_bytes());
        let mut public = [0u8; KEY_LEN];
        public.copy_from_slice(&x_only(secret));
        Self {
            secret: bytes,
            public: PublicKey(public),
        }
    }

    pub fn from_hex(input: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(input.trim())
                .map_err(|e| KeystoreError::invalid_data("secret key hex", e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Parse a bech32 `nsec` string.
    pub fn from_nsec(input: &str) -> Result<Self> {
        Self::from_bech32(input, NSEC_HRP)
    }

    /// Parse a bech32 secret whose HRP must equal `hrp`.
    pub fn from_bech32(input: &str, hrp: &str) -> Result<Self> {
        let decoded = bech32::decode_bytes(input.trim(), false)?;
        let bytes = Zeroizing::new(decoded.bytes);
        if decoded.hrp != hrp {
            return Err(KeystoreError::invalid_data(
                "secret key",
                format!("expected hrp {}, got {}", hrp, decoded.hrp),
            ));
        }
        Self::from_bytes(&bytes)
    }

    /// Accept `nsec` bech32 or, when `accept_hex` is set, 64-char hex.
    pub fn parse(input: &str, hrp: &str, accept_hex: bool) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(KeystoreError::invalid_data("secret key", "empty"));
        }
        if accept_hex && input.len() == KEY_LEN * 2 && input.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Self::from_hex(input);
        }
        Self::from_bech32(input, hrp)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.secret
    }

    /// Hex export. The caller owns the secret text afterwards.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret))
    }

    pub fn to_nsec(&self) -> Result<Zeroizing<String>> {
        self.to_bech32(NSEC_HRP)
    }

    pub fn to_bech32(&self, hrp: &str) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(bech32::encode_bytes(
            hrp,
            &self.secret,
            Encoding::Bech32,
        )?))
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    pub fn sign(&self, digest: &[u8; KEY_LEN]) -> Result<[u8; SIGNATURE_LEN]> {
        sign(digest, &self.secret)
    }

    pub fn shared_secret(&self, peer: &PublicKey) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        derive_shared_secret(&self.secret, &peer.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A 32-byte x-only secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    /// Build from 32 bytes, requiring a valid x coordinate.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LEN {
            return Err(KeystoreError::invalid_data(
                "public key",
                format!("expected {} bytes, got {}", KEY_LEN, bytes.len()),
            ));
        }
        VerifyingKey::from_bytes(bytes).map_err(|e| KeystoreError::crypto("public key", e))?;
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn from_hex(input: &str) -> Result<Self> {
        let bytes = hex::decode(input.trim())
            .map_err(|e| KeystoreError::invalid_data("public key hex", e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_npub(input: &str) -> Result<Self> {
        Self::from_bech32(input, NPUB_HRP)
    }

    pub fn from_bech32(input: &str, hrp: &str) -> Result<Self> {
        let decoded = bech32::decode_bytes(input.trim(), false)?;
        if decoded.hrp != hrp {
            return Err(KeystoreError::invalid_data(
                "public key",
                format!("expected hrp {}, got {}", hrp, decoded.hrp),
            ));
        }
        Self::from_bytes(&decoded.bytes)
    }

    /// Hex or bech32 with `hrp`.
    pub fn parse(input: &str, hrp: &str) -> Result<Self> {
        let input = input.trim();
        if input.len() == KEY_LEN * 2 && input.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(input)
        } else {
            Self::from_bech32(input, hrp)
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_npub(&self) -> Result<String> {
        self.to_bech32(NPUB_HRP)
    }

    pub fn to_bech32(&self, hrp: &str) -> Result<String> {
        Ok(bech32::encode_bytes(hrp, &self.0, Encoding::Bech32)?)
    }

    pub fn verify(&self, digest: &[u8; KEY_LEN], signature: &[u8; SIGNATURE_LEN]) -> bool {
        verify_signature(digest, signature, &self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn to_secret_key(bytes: &[u8]) -> Result<k256::SecretKey> {
    // SecretKey::from_slice left-pads short input, so check the length first
    if bytes.len() != KEY_LEN {
        return Err(KeystoreError::invalid_data(
            "secret key",
            format!("expected {} bytes, got {}", KEY_LEN, bytes.len()),
        ));
    }
    k256::SecretKey::from_slice(bytes).map_err(|e| KeystoreError::crypto("secret key", e))
}

/// NIP-01 event id: SHA-256 of `[0, pubkey, created_at, kind, tags, content]`
/// serialized as compact JSON.
pub fn compute_event_id(
    pubkey_hex: &str,
    created_at: i64,
    kind: u32,
    tags: &[Vec<String>],
    content: &str,
) -> Result<[u8; KEY_LEN]> {
    let serialized = serde_json::to_string(&(0u8, pubkey_hex, created_at, kind, tags, content))?;
    Ok(Sha256::digest(serialized.as_bytes()).into())
}

/// x-only public key of a raw secret.
pub fn derive_public_key(private_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    let secret = to_secret_key(private_key)?;
    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(&x_only(&secret));
    Ok(out)
}

/// Compressed SEC1 encoding with the parity byte dropped.
fn x_only(secret: &k256::SecretKey) -> Vec<u8> {
    let point = secret.public_key().to_encoded_point(true);
    point.as_bytes()[1..].to_vec()
}

/// BIP-340 signature over a 32-byte digest with all-zero auxiliary data.
///
/// Deterministic for a given (digest, key) pair.
pub fn sign(digest: &[u8; KEY_LEN], private_key: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    to_secret_key(private_key)?;
    let signing_key =
        SigningKey::from_bytes(private_key).map_err(|e| KeystoreError::crypto("signing key", e))?;
    let signature = signing_key
        .sign_raw(digest, &[0u8; KEY_LEN])
        .map_err(|e| KeystoreError::crypto("schnorr sign", e))?;
    Ok(signature.to_bytes())
}

/// Check a BIP-340 signature. Malformed keys or signatures verify as `false`.
pub fn verify_signature(
    digest: &[u8; KEY_LEN],
    signature: &[u8; SIGNATURE_LEN],
    public_key: &[u8; KEY_LEN],
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::try_from(&signature[..]) else {
        return false;
    };
    verifying_key.verify_raw(digest, &signature).is_ok()
}

/// ECDH: x coordinate of `private_key * (0x02 || peer)`.
///
/// The peer is lifted with even parity. Since x(k·P) equals x(k·(-P)),
/// the result matches the peer's own derivation whatever its parity.
pub fn derive_shared_secret(
    private_key: &[u8],
    peer_public_key: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let secret = to_secret_key(private_key)?;
    if peer_public_key.len() != KEY_LEN {
        return Err(KeystoreError::invalid_data(
            "peer public key",
            format!("expected {} bytes, got {}", KEY_LEN, peer_public_key.len()),
        ));
    }

    let mut sec1 = [0u8; KEY_LEN + 1];
    sec1[0] = 0x02;
    sec1[1..].copy_from_slice(peer_public_key);
    let peer = k256::PublicKey::from_sec1_bytes(&sec1)
        .map_err(|e| KeystoreError::crypto("peer public key", e))?;

    let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    out.copy_from_slice(shared.raw_secret_bytes());
    Ok(out)
}

/// AES-CBC encrypt `plaintext` under `key` (16, 24 or 32 bytes) with a fresh
/// random IV, returning `base64(ciphertext)?iv=base64(iv)`.
pub fn encrypt(plaintext: &str, key: &[u8]) -> Result<String> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = match key.len() {
        16 => cbc_encrypt::<aes::Aes128>(key, &iv, plaintext.as_bytes())?,
        24 => cbc_encrypt::<aes::Aes192>(key, &iv, plaintext.as_bytes())?,
        32 => cbc_encrypt::<aes::Aes256>(key, &iv, plaintext.as_bytes())?,
        len => return Err(unsupported_key_len(len)),
    };

    Ok(format!(
        "{}{}{}",
        BASE64.encode(ciphertext),
        IV_DELIMITER,
        BASE64.encode(iv)
    ))
}

/// Reverse of [`encrypt`].
pub fn decrypt(envelope: &str, key: &[u8]) -> Result<String> {
    let (ciphertext_b64, iv_b64) = envelope.split_once(IV_DELIMITER).ok_or_else(|| {
        KeystoreError::MalformedEnvelope(format!("missing '{}' delimiter", IV_DELIMITER))
    })?;

    let ciphertext = BASE64
        .decode(ciphertext_b64)
        .map_err(|e| KeystoreError::MalformedEnvelope(format!("ciphertext base64: {}", e)))?;
    let iv = BASE64
        .decode(iv_b64)
        .map_err(|e| KeystoreError::MalformedEnvelope(format!("iv base64: {}", e)))?;
    if iv.len() != IV_LEN {
        return Err(KeystoreError::MalformedEnvelope(format!(
            "iv must be {} bytes, got {}",
            IV_LEN,
            iv.len()
        )));
    }
    if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
        return Err(KeystoreError::InvalidPadding(format!(
            "ciphertext length {} is not a positive multiple of {}",
            ciphertext.len(),
            IV_LEN
        )));
    }

    let plaintext = match key.len() {
        16 => cbc_decrypt::<aes::Aes128>(key, &iv, ciphertext)?,
        24 => cbc_decrypt::<aes::Aes192>(key, &iv, ciphertext)?,
        32 => cbc_decrypt::<aes::Aes256>(key, &iv, ciphertext)?,
        len => return Err(unsupported_key_len(len)),
    };

    String::from_utf8(plaintext)
        .map_err(|_| KeystoreError::MalformedEnvelope("plaintext is not valid UTF-8".into()))
}

/// [`encrypt`] with the ECDH secret of `private_key` and `peer_public_key`.
pub fn encrypt_to(plaintext: &str, private_key: &[u8], peer_public_key: &[u8]) -> Result<String> {
    let shared = derive_shared_secret(private_key, peer_public_key)?;
    encrypt(plaintext, shared.as_slice())
}

/// [`decrypt`] with the ECDH secret of `private_key` and `peer_public_key`.
pub fn decrypt_from(envelope: &str, private_key: &[u8], peer_public_key: &[u8]) -> Result<String> {
    let shared = derive_shared_secret(private_key, peer_public_key)?;
    decrypt(envelope, shared.as_slice())
}

fn unsupported_key_len(len: usize) -> KeystoreError {
    KeystoreError::crypto(
        "aes key",
        format!("unsupported key length {} (expected 16, 24 or 32)", len),
    )
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let mut buf = vec![0u8; plaintext.len() + IV_LEN];
    buf[..plaintext.len()].copy_from_slice(plaintext);

    let len = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| KeystoreError::crypto("aes init", e))?
        .encrypt_padded_mut::<Pkcs7>(&mut buf, plaintext.len())
        .map_err(|e| KeystoreError::crypto("aes encrypt", e))?
        .len();
    buf.truncate(len);
    Ok(buf)
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], mut ciphertext: Vec<u8>) -> Result<Vec<u8>>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let len = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| KeystoreError::crypto("aes init", e))?
        .decrypt_padded_mut::<Pkcs7>(&mut ciphertext)
        .map_err(|_| KeystoreError::InvalidPadding("invalid PKCS#7 block padding".into()))?
        .len();
    ciphertext.truncate(len);
    Ok(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NPUB_HEX: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";
    const NSEC_HEX: &str = "67dea2ed018072d675f5415ecfaed7d2597555e202d85b3d65ea4e58d2d92ffa";

    fn scalar(n: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        bytes
    }

    #[test]
    fn test_event_id_reference_vector() {
        let id = compute_event_id(NPUB_HEX, 1_700_000_000, 1, &[], "hello").unwrap();
        assert_eq!(
            hex::encode(id),
            "eeaf6019d3539958822e623fa80fea5459003a6d9bfbf79014b01fd9bb11d46b"
        );
    }

    #[test]
    fn test_event_id_escaping_is_not_html_safe() {
        let tags = vec![
            vec!["e".to_string(), "abc".to_string()],
            vec!["p".to_string(), NPUB_HEX.to_string(), "wss://relay".to_string()],
        ];
        let id = compute_event_id(
            NPUB_HEX,
            1_700_000_000,
            1,
            &tags,
            "line\n\"quoted\" <b>&</b> ünï",
        )
        .unwrap();
        assert_eq!(
            hex::encode(id),
            "0d008513bb5a626cbc9793c78da4fec5952c085243e14666ea156b1b4b4feff1"
        );
    }

    #[test]
    fn test_derive_public_key() {
        let sk = hex::decode(NSEC_HEX).unwrap();
        assert_eq!(hex::encode(derive_public_key(&sk).unwrap()), NPUB_HEX);
        assert_eq!(
            hex::encode(derive_public_key(&scalar(3)).unwrap()),
            "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9"
        );
    }

    #[test]
    fn test_invalid_scalars_are_crypto_errors() {
        assert!(derive_public_key(&[0u8; 32]).unwrap_err().is_crypto_error());
        assert!(derive_public_key(&[0xff; 32]).unwrap_err().is_crypto_error());
        let err = derive_public_key(&[1u8; 31]).unwrap_err();
        assert_eq!(err.code(), crate::errors::KeystoreErrorCode::InvalidData);
    }

    #[test]
    fn test_bip340_vector_with_zero_aux() {
        let sig = sign(&[0u8; 32], &scalar(3)).unwrap();
        assert_eq!(
            hex::encode(sig),
            "e907831f80848d1069a5371b402410364bdf1c5f8307b0084c55f1ce2dca8215\
             25f66a4a85ea8b71e482a74f382d2ce5ebeee8fdb2172f477df4900d310536c0"
        );
    }

    #[test]
    fn test_sign_is_deterministic_and_verifies() {
        let sk = hex::decode(NSEC_HEX).unwrap();
        let digest = compute_event_id(NPUB_HEX, 1_700_000_000, 1, &[], "hello").unwrap();
        let first = sign(&digest, &sk).unwrap();
        let second = sign(&digest, &sk).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            hex::encode(first),
            "40045d0127d727726c2be839764058c35f1824bc71b2dafff5fdfc9f897c1430\
             4f92e08d0c6be1db907483e2356f17110e786d693b70fa5fbf819460dea0b398"
        );

        let pk = derive_public_key(&sk).unwrap();
        assert!(verify_signature(&digest, &first, &pk));

        let mut tampered = digest;
        tampered[0] ^= 1;
        assert!(!verify_signature(&tampered, &first, &pk));
    }

    #[test]
    fn test_shared_secret_symmetry() {
        let a = scalar(3);
        let b = scalar(7);
        let pub_a = derive_public_key(&a).unwrap();
        let pub_b = derive_public_key(&b).unwrap();

        let ab = derive_shared_secret(&a, &pub_b).unwrap();
        let ba = derive_shared_secret(&b, &pub_a).unwrap();
        assert_eq!(*ab, *ba);
        assert_eq!(
            hex::encode(*ab),
            "352bbf4a4cdd12564f93fa332ce333301d9ad40271f8107181340aef25be59d5"
        );
    }

    #[test]
    fn test_shared_secret_with_odd_parity_peer() {
        // 6·G has an odd y coordinate
        let a = scalar(3);
        let b = scalar(6);
        let pub_b = derive_public_key(&b).unwrap();
        assert_eq!(
            hex::encode(pub_b),
            "fff97bd5755eeea420453a14355235d382f6472f8568a18b2f057a1460297556"
        );

        let ab = derive_shared_secret(&a, &pub_b).unwrap();
        let ba = derive_shared_secret(&b, &derive_public_key(&a).unwrap()).unwrap();
        assert_eq!(*ab, *ba);
        assert_eq!(
            hex::encode(*ab),
            "5601570cb47f238d2b0286db4a990fa0f3ba28d1a319f5e7cf55c2a2444da7cc"
        );
    }

    #[test]
    fn test_shared_secret_rejects_off_curve_peer() {
        // x = 5 has no point on secp256k1
        let err = derive_shared_secret(&scalar(3), &scalar(5)).unwrap_err();
        assert!(err.is_crypto_error());
    }

    #[test]
    fn test_encrypt_decrypt_all_key_sizes() {
        for len in [16usize, 24, 32] {
            let key = vec![7u8; len];
            let envelope = encrypt("hello nostr", &key).unwrap();
            assert!(envelope.contains("?iv="));
            assert_eq!(decrypt(&envelope, &key).unwrap(), "hello nostr");
        }
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = [1u8; 32];
        let first = encrypt("same", &key).unwrap();
        let second = encrypt("same", &key).unwrap();
        assert_ne!(first, second);
        assert_eq!(decrypt(&first, &key).unwrap(), "same");
        assert_eq!(decrypt(&second, &key).unwrap(), "same");
    }

    #[test]
    fn test_empty_plaintext_round_trips() {
        let key = [2u8; 32];
        let envelope = encrypt("", &key).unwrap();
        let (ct, _) = envelope.split_once("?iv=").unwrap();
        assert_eq!(BASE64.decode(ct).unwrap().len(), 16);
        assert_eq!(decrypt(&envelope, &key).unwrap(), "");
    }

    #[test]
    fn test_envelope_without_delimiter_is_format_error() {
        let err = decrypt("AAAA", &[0u8; 32]).unwrap_err();
        assert!(err.is_format_error());
        assert!(decrypt("!!!?iv=AAAAAAAAAAAAAAAAAAAAAA==", &[0u8; 32])
            .unwrap_err()
            .is_format_error());
    }

    #[test]
    fn test_envelope_splits_on_first_delimiter() {
        let key = [4u8; 32];
        let envelope = encrypt("hi", &key).unwrap();
        let (_, iv) = envelope.split_once("?iv=").unwrap();

        // Everything after the first delimiter is the iv, so the trailing copy
        // breaks the iv base64 while the ciphertext still decodes.
        let doubled = format!("{}?iv={}", envelope, iv);
        let err = decrypt(&doubled, &key).unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("iv base64"), "{err}");
    }

    #[test]
    fn test_short_ciphertext_is_padding_error() {
        let iv = BASE64.encode([0u8; 16]);
        let envelope = format!("{}?iv={}", BASE64.encode([0u8; 15]), iv);
        assert!(decrypt(&envelope, &[0u8; 32]).unwrap_err().is_padding_error());
    }

    #[test]
    fn test_wrong_key_fails_padding_or_utf8() {
        let envelope = encrypt("attack at dawn", &[9u8; 32]).unwrap();
        // a wrong key almost always breaks PKCS#7; if not, the bytes are garbage
        match decrypt(&envelope, &[8u8; 32]) {
            Ok(text) => assert_ne!(text, "attack at dawn"),
            Err(err) => assert!(err.is_padding_error() || err.is_format_error()),
        }
    }

    #[test]
    fn test_unsupported_key_length() {
        assert!(encrypt("x", &[0u8; 20]).unwrap_err().is_crypto_error());
    }

    #[test]
    fn test_encrypt_to_decrypt_from() {
        let alice = scalar(3);
        let bob = scalar(6);
        let alice_pub = derive_public_key(&alice).unwrap();
        let bob_pub = derive_public_key(&bob).unwrap();

        let envelope = encrypt_to("hi bob", &alice, &bob_pub).unwrap();
        assert_eq!(decrypt_from(&envelope, &bob, &alice_pub).unwrap(), "hi bob");
    }

    #[test]
    fn test_private_key_text_forms() {
        let nsec = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";
        let key = PrivateKey::from_nsec(nsec).unwrap();
        assert_eq!(key.to_hex().as_str(), NSEC_HEX);
        assert_eq!(key.to_nsec().unwrap().as_str(), nsec);
        assert_eq!(PrivateKey::parse(NSEC_HEX, "nsec", true).unwrap().as_bytes(), key.as_bytes());
        assert!(PrivateKey::parse(NSEC_HEX, "nsec", false).is_err());
        assert_eq!(format!("{:?}", key), "PrivateKey(<redacted>)");
    }

    #[test]
    fn test_private_key_rejects_npub() {
        let npub = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";
        let err = PrivateKey::from_nsec(npub).unwrap_err();
        assert_eq!(err.code(), crate::errors::KeystoreErrorCode::InvalidData);
    }

    #[test]
    fn test_public_key_text_forms() {
        let npub = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";
        let key = PublicKey::from_npub(npub).unwrap();
        assert_eq!(key.to_hex(), NPUB_HEX);
        assert_eq!(key.to_npub().unwrap(), npub);
        assert_eq!(PublicKey::parse(NPUB_HEX, "npub").unwrap(), key);
        assert_eq!(
            PrivateKey::from_hex(NSEC_HEX).unwrap().public_key(),
            key
        );
    }

    #[test]
    fn test_generated_keys_are_distinct() {
        let a = PrivateKey::generate();
        let b = PrivateKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert!(PrivateKey::from_bytes(a.as_bytes()).is_ok());
    }
}
