//! Key registry tests against file-backed storage.

use std::sync::Arc;

use keystore_lib::secure_storage::{FileStorage, SecureStorage};
use keystore_lib::{dispatch, EventTemplate, KeyRegistry, KeystoreConfig, KeystoreErrorCode, PrivateKey};
use serde_json::{json, Value};

const NSEC: &str = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";
const PUB_HEX: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";

#[test]
fn keys_survive_reopening_the_directory() {
    let dir = tempfile::tempdir().unwrap();

    {
        let registry = KeyRegistry::new(FileStorage::new(dir.path()).unwrap());
        registry.add_key("main", NSEC).unwrap();
    }

    assert!(dir.path().join("SKS_KEY_FILEnostrKeys").exists());
    assert!(dir.path().join(format!("SKS_KEY_FILE{}", PUB_HEX)).exists());

    let registry = KeyRegistry::new(FileStorage::new(dir.path()).unwrap());
    assert_eq!(registry.current_public_key().unwrap().to_hex(), PUB_HEX);
    let event = registry
        .sign_event(EventTemplate::new(1_700_000_000, 1, vec![], "hello"))
        .unwrap();
    assert_eq!(
        event.id,
        "eeaf6019d3539958822e623fa80fea5459003a6d9bfbf79014b01fd9bb11d46b"
    );
}

#[test]
fn delete_removes_secret_file_and_persists_index() {
    let dir = tempfile::tempdir().unwrap();
    let registry = KeyRegistry::new(FileStorage::new(dir.path()).unwrap());
    registry.add_key("main", NSEC).unwrap();
    registry.delete_key(PUB_HEX).unwrap();

    assert!(!dir.path().join(format!("SKS_KEY_FILE{}", PUB_HEX)).exists());

    let reopened = KeyRegistry::new(FileStorage::new(dir.path()).unwrap());
    let index = reopened.list_keys().unwrap();
    assert!(index.keys.is_empty());
    assert!(index.current_alias.is_empty());
}

#[test]
fn custom_config_changes_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let config = KeystoreConfig::new()
        .with_index_alias("index")
        .with_file_prefix("k_")
        .with_hex_secrets(false);
    let storage = FileStorage::with_prefix(dir.path(), config.file_prefix.clone()).unwrap();
    let registry = KeyRegistry::with_config(storage, config);

    let hex_secret = PrivateKey::generate().to_hex();
    assert!(registry.add_key("hex", &hex_secret).is_err());

    registry.add_key("main", NSEC).unwrap();
    assert!(dir.path().join("k_index").exists());
}

#[test]
fn shared_storage_through_arc() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()).unwrap());
    let registry = KeyRegistry::new(Arc::clone(&storage));
    registry.add_key("main", NSEC).unwrap();

    let raw = storage.get("nostrKeys").unwrap().unwrap();
    let index: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(index["currentAlias"], PUB_HEX);
}

#[test]
fn full_plugin_session() {
    let dir = tempfile::tempdir().unwrap();
    let registry = KeyRegistry::new(FileStorage::new(dir.path()).unwrap());

    let second = PrivateKey::generate();
    let second_hex = second.public_key().to_hex();

    dispatch(&registry, "addKey", &json!([{"name": "one", "privateKey": NSEC}]).to_string()).unwrap();
    dispatch(
        &registry,
        "addKey",
        &json!([{"name": "two", "privateKey": second.to_nsec().unwrap().as_str()}]).to_string(),
    )
    .unwrap();

    let current: Value =
        serde_json::from_str(&dispatch(&registry, "getPublicKey", "[]").unwrap()).unwrap();
    assert_eq!(current["pubKey"], second_hex.as_str());

    dispatch(&registry, "selectKey", &json!([{"publicKey": PUB_HEX}]).to_string()).unwrap();
    let listed: Value = serde_json::from_str(&dispatch(&registry, "listKeys", "[]").unwrap()).unwrap();
    assert_eq!(listed["currentAlias"], PUB_HEX);
    assert_eq!(listed[PUB_HEX]["isCurrent"], true);
    assert_eq!(listed[second_hex.as_str()]["isCurrent"], false);

    let err = dispatch(&registry, "nip44Encrypt", "[]").unwrap_err();
    assert_eq!(err.code(), KeystoreErrorCode::InvalidData);
}
