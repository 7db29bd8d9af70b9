//! Backup container behaviour through the public API

use std::sync::atomic::{AtomicUsize, Ordering};

use confvault::backup::{BackupManager, Stage};
use confvault::crypto::{seal, DerivedKey, KeyDerivation, NONCE_LEN, SALT_LEN};
use confvault::snapshot::{encode, join_container, ConfigSnapshot, MIN_CONTAINER_LEN};
use confvault::store::{ConfigStore, MemoryStore};
use confvault::VaultError;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Cheap derivation that counts its calls
#[derive(Default)]
struct CountingKdf {
    calls: AtomicUsize,
}

impl CountingKdf {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyDerivation for CountingKdf {
    fn derive(&self, password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        DerivedKey::from_bytes(hasher.finalize().into())
    }
}

/// Seal arbitrary plaintext the way a container would be built
fn hand_sealed(kdf: &CountingKdf, password: &str, plaintext: &[u8]) -> Vec<u8> {
    let salt = [9u8; SALT_LEN];
    let nonce = [3u8; NONCE_LEN];
    let key = kdf.derive(password, &salt);
    let sealed = seal(&key, &nonce, plaintext).unwrap();
    join_container(&salt, &nonce, &sealed)
}

fn ten_kb_blob() -> Vec<u8> {
    (0..10 * 1024).map(|i| (i * 31 % 251) as u8).collect()
}

#[test]
fn scenario_defaults_round_trip_with_real_kdf() {
    let manager = BackupManager::new();
    let snapshot = ConfigSnapshot::new();
    assert!(snapshot.use_default_peers);

    let container = manager.create_backup(&snapshot, "correcthorse").unwrap();
    let restored = manager.restore_backup(&container, "correcthorse").unwrap();

    assert_eq!(restored, snapshot);
    assert!(!restored.includes_blob());
}

#[test]
fn scenario_peers_and_blob_round_trip_with_real_kdf() {
    let manager = BackupManager::new();
    let snapshot = ConfigSnapshot {
        use_default_peers: false,
        ..ConfigSnapshot::new()
    }
    .with_peers([
        "tls://zeta.example:443",
        "tcp://alpha.example:7743",
        "tcp://[2001:db8::1]:9000",
    ])
    .with_blob(ten_kb_blob());

    let container = manager.create_backup(&snapshot, "longenoughpw").unwrap();
    let restored = manager.restore_backup(&container, "longenoughpw").unwrap();

    assert_eq!(
        restored.custom_peers,
        vec![
            "tls://zeta.example:443",
            "tcp://alpha.example:7743",
            "tcp://[2001:db8::1]:9000",
        ]
    );
    assert_eq!(restored.embedded_blob, Some(ten_kb_blob()));
    assert_eq!(restored, snapshot);
}

#[test]
fn hand_built_snapshot_restores_to_its_normalized_form() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);
    let snapshot = ConfigSnapshot {
        auth_secret: Some(String::new()),
        custom_peers: vec!["tcp://a:1 ".to_string(), String::new()],
        identity_address: Some(String::new()),
        ..ConfigSnapshot::new()
    };
    assert!(!snapshot.is_normalized());

    let container = manager.create_backup(&snapshot, "longenoughpw").unwrap();
    let restored = manager.restore_backup(&container, "longenoughpw").unwrap();

    assert_eq!(restored, snapshot.normalized());
    assert_eq!(restored.custom_peers, vec!["tcp://a:1"]);
    assert_eq!(restored.auth_secret, None);
    assert_eq!(restored.identity_address, None);
}

#[test]
fn scenario_seven_char_password_is_weak() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);

    let err = manager
        .create_backup(&ConfigSnapshot::new(), "short77")
        .unwrap_err();

    assert!(matches!(err, VaultError::WeakPassword { min_len: 8 }));
    assert_eq!(err.stage(), Some(Stage::Validating));
    assert_eq!(kdf.calls(), 0);
}

#[test]
fn scenario_missing_version_is_malformed() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);

    let mut payload: Value = serde_json::from_slice(&encode(&ConfigSnapshot::new()).unwrap()).unwrap();
    payload.as_object_mut().unwrap().remove("version");
    let container = hand_sealed(&kdf, "longenoughpw", &serde_json::to_vec(&payload).unwrap());

    let err = manager.restore_backup(&container, "longenoughpw").unwrap_err();
    assert!(matches!(err, VaultError::MalformedPayload));
    assert_eq!(err.stage(), Some(Stage::Codec));
}

#[test]
fn newer_version_is_rejected_before_other_fields() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);

    // Every other field is nonsense; the version gate must still win
    let payload = json!({ "version": 2, "timestamp": "yesterday", "peers": 17 });
    let container = hand_sealed(&kdf, "longenoughpw", &serde_json::to_vec(&payload).unwrap());

    let err = manager.restore_backup(&container, "longenoughpw").unwrap_err();
    assert!(matches!(
        err,
        VaultError::UnsupportedVersion {
            found: 2,
            supported: 1
        }
    ));
}

#[test]
fn every_flipped_bit_is_detected() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);
    let snapshot = ConfigSnapshot {
        auth_secret: Some("mailpass".into()),
        ..ConfigSnapshot::new()
    }
    .with_peers(["tcp://a:1"]);

    let container = manager.create_backup(&snapshot, "longenoughpw").unwrap();

    for index in 0..container.len() {
        for bit in [0u8, 7] {
            let mut tampered = container.clone();
            tampered[index] ^= 1 << bit;

            let result = manager.restore_backup(&tampered, "longenoughpw");
            assert!(
                matches!(result, Err(VaultError::AuthenticationFailure)),
                "flip of bit {} at byte {} went unnoticed",
                bit,
                index
            );
        }
    }
}

#[test]
fn truncated_or_extended_container_is_detected() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);
    let container = manager
        .create_backup(&ConfigSnapshot::new(), "longenoughpw")
        .unwrap();

    let truncated = &container[..container.len() - 1];
    assert!(matches!(
        manager.restore_backup(truncated, "longenoughpw"),
        Err(VaultError::AuthenticationFailure)
    ));

    let mut extended = container.clone();
    extended.push(0);
    assert!(matches!(
        manager.restore_backup(&extended, "longenoughpw"),
        Err(VaultError::AuthenticationFailure)
    ));
}

#[test]
fn wrong_password_and_tampering_look_the_same() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);
    let container = manager
        .create_backup(&ConfigSnapshot::new(), "longenoughpw")
        .unwrap();

    let wrong = manager.restore_backup(&container, "longenoughpX").unwrap_err();
    let mut tampered = container.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    let corrupt = manager.restore_backup(&tampered, "longenoughpw").unwrap_err();

    assert_eq!(wrong.to_string(), corrupt.to_string());
    assert!(wrong.is_authentication_failure());
}

#[test]
fn short_container_fails_before_key_derivation() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);

    for len in [0, 1, 44, MIN_CONTAINER_LEN - 1] {
        let err = manager
            .restore_backup(&vec![0u8; len], "longenoughpw")
            .unwrap_err();
        assert!(matches!(err, VaultError::ContainerTooShort { len: l } if l == len));
    }

    assert_eq!(kdf.calls(), 0);
}

#[test]
fn minimum_size_container_reaches_the_cipher() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);

    let err = manager
        .restore_backup(&[0u8; MIN_CONTAINER_LEN], "longenoughpw")
        .unwrap_err();

    assert!(matches!(err, VaultError::AuthenticationFailure));
    assert_eq!(kdf.calls(), 1);
}

#[test]
fn restore_ignores_password_policy() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);
    let snapshot = ConfigSnapshot::new();

    let container = hand_sealed(&kdf, "abc", &encode(&snapshot).unwrap());
    assert_eq!(manager.restore_backup(&container, "abc").unwrap(), snapshot);
}

#[test]
fn verify_password_matches_restore() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);
    let container = manager
        .create_backup(&ConfigSnapshot::new(), "longenoughpw")
        .unwrap();

    assert!(manager.verify_password(&container, "longenoughpw"));
    assert!(!manager.verify_password(&container, "otherpassword"));
    assert!(!manager.verify_password(&[0u8; 10], "longenoughpw"));
}

#[test]
fn store_round_trip_through_container() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);

    let mut source = MemoryStore::new();
    source.set_auth_secret("mailpass").unwrap();
    source
        .set_custom_peers(&["tcp://a:1".to_string(), "tls://b:2".to_string()])
        .unwrap();
    source.set_auto_start_enabled(false).unwrap();
    source.set_identity_address("abc@yggmail").unwrap();
    source.set_identity_public_key("abcdef").unwrap();
    source.set_onboarding_completed(true).unwrap();
    source.set_embedded_blob(&ten_kb_blob()).unwrap();

    let container = manager
        .export_from_store(&source, "longenoughpw", true)
        .unwrap();

    let mut target = MemoryStore::new();
    manager
        .import_into_store(&mut target, &container, "longenoughpw")
        .unwrap();

    assert_eq!(target, source);
}

#[test]
fn weak_password_export_reads_nothing() {
    let kdf = CountingKdf::default();
    let manager = BackupManager::with_key_derivation(&kdf);

    let err = manager
        .export_from_store(&MemoryStore::new(), "short", true)
        .unwrap_err();

    assert!(matches!(err, VaultError::WeakPassword { .. }));
    assert_eq!(kdf.calls(), 0);
}
