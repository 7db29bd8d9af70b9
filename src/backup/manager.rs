//! Backup manager for confvault
//!
//! Creates, restores and verifies encrypted backup containers, and moves
//! snapshots between containers and a [`ConfigStore`].

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::{generate_nonce, generate_salt, open, seal, KeyDerivation, Pbkdf2Sha256};
use crate::error::{VaultError, VaultResult};
use crate::snapshot::{decode, encode, join_container, split_container, ConfigSnapshot};
use crate::store::ConfigStore;

use super::stage::{Progress, Stage};

/// Minimum backup password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Stateless create/restore/verify orchestration
///
/// Holds only the key-derivation strategy, so one instance can serve any
/// number of concurrent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupManager<K = Pbkdf2Sha256> {
    kdf: K,
}

impl BackupManager<Pbkdf2Sha256> {
    /// Create a manager using PBKDF2-HMAC-SHA256
    pub fn new() -> Self {
        Self { kdf: Pbkdf2Sha256 }
    }
}

impl<K: KeyDerivation> BackupManager<K> {
    /// Create a manager with a custom key-derivation strategy
    pub fn with_key_derivation(kdf: K) -> Self {
        Self { kdf }
    }

    /// Encrypt a snapshot into a container
    ///
    /// The container holds [`ConfigSnapshot::normalized`]; restoring it returns
    /// exactly that form.
    ///
    /// # Errors
    ///
    /// [`VaultError::WeakPassword`] when the password is shorter than
    /// [`MIN_PASSWORD_LEN`] characters; encoding and cipher errors otherwise.
    pub fn create_backup(&self, snapshot: &ConfigSnapshot, password: &str) -> VaultResult<Vec<u8>> {
        let mut progress = Progress::start("create");
        let result = self.create_inner(snapshot, password, &mut progress);
        progress.finish(result)
    }

    fn create_inner(
        &self,
        snapshot: &ConfigSnapshot,
        password: &str,
        progress: &mut Progress,
    ) -> VaultResult<Vec<u8>> {
        progress.enter(Stage::Validating);
        check_password_strength(password)?;

        let salt = generate_salt();
        let nonce = generate_nonce();

        progress.enter(Stage::Deriving);
        let key = self.kdf.derive(password, &salt);

        progress.enter(Stage::Codec);
        if !snapshot.is_normalized() {
            debug!("snapshot peers or empty fields normalised for encoding");
        }
        let plaintext = Zeroizing::new(encode(snapshot)?);

        progress.enter(Stage::Ciphering);
        let sealed = seal(&key, &nonce, &plaintext)?;

        let container = join_container(&salt, &nonce, &sealed);
        info!(
            bytes = container.len(),
            includes_blob = snapshot.includes_blob(),
            "backup container created"
        );
        Ok(container)
    }

    /// Decrypt a container back into a snapshot
    ///
    /// No password policy applies here: the container may predate it.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ContainerTooShort`] before any key derivation
    /// - [`VaultError::AuthenticationFailure`] for a wrong password or any
    ///   modification of the container
    /// - [`VaultError::UnsupportedVersion`] / [`VaultError::MalformedPayload`]
    ///   when the decrypted payload cannot be used
    pub fn restore_backup(&self, container: &[u8], password: &str) -> VaultResult<ConfigSnapshot> {
        let mut progress = Progress::start("restore");
        let result = self.restore_inner(container, password, &mut progress);
        progress.finish(result)
    }

    fn restore_inner(
        &self,
        container: &[u8],
        password: &str,
        progress: &mut Progress,
    ) -> VaultResult<ConfigSnapshot> {
        progress.enter(Stage::Validating);
        let parts = split_container(container)?;

        progress.enter(Stage::Deriving);
        let key = self.kdf.derive(password, parts.salt);

        progress.enter(Stage::Ciphering);
        let plaintext = Zeroizing::new(open(&key, parts.nonce, parts.sealed)?);

        progress.enter(Stage::Codec);
        let snapshot = decode(&plaintext)?;

        info!(
            schema_version = snapshot.schema_version,
            created_at = snapshot.created_at,
            "backup container opened"
        );
        Ok(snapshot)
    }

    /// Check whether `password` opens `container` into a usable snapshot
    ///
    /// Runs the full restore and discards the result; every failure is `false`.
    pub fn verify_password(&self, container: &[u8], password: &str) -> bool {
        self.restore_backup(container, password).is_ok()
    }

    /// Read a snapshot from `store` and encrypt it
    ///
    /// The password is checked before anything is read from the store.
    pub fn export_from_store<S>(
        &self,
        store: &S,
        password: &str,
        include_blob: bool,
    ) -> VaultResult<Vec<u8>>
    where
        S: ConfigStore + ?Sized,
    {
        check_password_strength(password)?;
        let snapshot = store.snapshot_fields(include_blob)?;
        self.create_backup(&snapshot, password)
    }

    /// Decrypt `container` and write its fields into `store`
    ///
    /// The container is fully decrypted and decoded before the first store
    /// write, so a failed restore leaves the store untouched.
    pub fn import_into_store<S>(
        &self,
        store: &mut S,
        container: &[u8],
        password: &str,
    ) -> VaultResult<ConfigSnapshot>
    where
        S: ConfigStore + ?Sized,
    {
        let snapshot = self.restore_backup(container, password)?;
        store.apply_snapshot_fields(&snapshot)?;
        info!("backup restored into configuration store");
        Ok(snapshot)
    }
}

/// Enforce the create-time password policy
pub fn check_password_strength(password: &str) -> VaultResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::WeakPassword {
            min_len: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}
