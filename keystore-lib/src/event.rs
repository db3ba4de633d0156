//! NIP-01 event templates and signed events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crypto::{self, PrivateKey, KEY_LEN, SIGNATURE_LEN};
use crate::Result;

/// Fields the signer computes; any incoming values are discarded.
const SIGNER_FIELDS: [&str; 3] = ["id", "pubkey", "sig"];

/// An unsigned event as supplied by the host.
///
/// Unknown fields are kept in `extra` and echoed back on the signed event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub created_at: i64,
    pub kind: u32,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventTemplate {
    pub fn new(created_at: i64, kind: u32, tags: Vec<Vec<String>>, content: impl Into<String>) -> Self {
        Self {
            created_at,
            kind,
            tags,
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// Template stamped with the current time.
    pub fn now(kind: u32, tags: Vec<Vec<String>>, content: impl Into<String>) -> Self {
        Self::new(chrono::Utc::now().timestamp(), kind, tags, content)
    }

    /// Parse a host event object.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Event id this template would get when signed by `pubkey_hex`.
    pub fn id_for(&self, pubkey_hex: &str) -> Result<[u8; KEY_LEN]> {
        crypto::compute_event_id(pubkey_hex, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Sign with `key`: pubkey from the key, id per NIP-01, BIP-340 signature over the id.
    pub fn sign(self, key: &PrivateKey) -> Result<SignedEvent> {
        let pubkey = key.public_key().to_hex();
        let id = self.id_for(&pubkey)?;
        let sig = key.sign(&id)?;

        let mut extra = self.extra;
        for field in SIGNER_FIELDS {
            extra.remove(field);
        }

        Ok(SignedEvent {
            id: hex::encode(id),
            pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig: hex::encode(sig),
            extra,
        })
    }
}

/// A signed NIP-01 event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedEvent {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u32,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    pub sig: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignedEvent {
    /// Recompute the id and check the signature against `pubkey`.
    ///
    /// Malformed hex in any field verifies as `false`.
    pub fn verify(&self) -> bool {
        let Ok(expected) = crypto::compute_event_id(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        ) else {
            return false;
        };
        if hex::encode(expected) != self.id.to_ascii_lowercase() {
            return false;
        }

        let (Some(pubkey), Some(sig)) = (
            decode_fixed::<KEY_LEN>(&self.pubkey),
            decode_fixed::<SIGNATURE_LEN>(&self.sig),
        ) else {
            return false;
        };
        crypto::verify_signature(&expected, &sig, &pubkey)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn decode_fixed<const N: usize>(input: &str) -> Option<[u8; N]> {
    let bytes = hex::decode(input).ok()?;
    bytes.try_into().ok()
}
