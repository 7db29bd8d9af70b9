//! Configuration store abstraction
//!
//! The backup core reads a snapshot from, and writes a restored snapshot to,
//! a [`ConfigStore`]. Every field has its own getter and setter; the store is
//! not assumed to be transactional, so callers finish all fallible work
//! before the first setter runs.
//!
//! Two implementations ship with the crate:
//!
//! - [`FileStore`]: JSON files plus a database file under the confvault home
//! - [`MemoryStore`]: in-process state, for tests and embedding

pub mod file;
pub mod file_io;
pub mod memory;

use chrono::Utc;
use tracing::debug;

use crate::error::VaultResult;
use crate::snapshot::{ConfigSnapshot, CURRENT_SCHEMA_VERSION};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Synchronous get/set facade over the live application configuration
pub trait ConfigStore {
    /// Account password, if configured
    fn auth_secret(&self) -> VaultResult<Option<String>>;
    /// Replace the account password
    fn set_auth_secret(&mut self, secret: &str) -> VaultResult<()>;

    /// Saved custom peers (never the default set)
    fn custom_peers(&self) -> VaultResult<Vec<String>>;
    /// Replace the custom peer list; also switches off the default peer set
    fn set_custom_peers(&mut self, peers: &[String]) -> VaultResult<()>;

    /// Whether the default peer set is in use
    fn use_default_peers(&self) -> VaultResult<bool>;
    /// Select the default peer set or the custom list
    fn set_use_default_peers(&mut self, enabled: bool) -> VaultResult<()>;

    /// Whether the service starts on boot
    fn auto_start_enabled(&self) -> VaultResult<bool>;
    /// Enable or disable start on boot
    fn set_auto_start_enabled(&mut self, enabled: bool) -> VaultResult<()>;

    /// Identity (mail) address
    fn identity_address(&self) -> VaultResult<Option<String>>;
    /// Replace the identity address
    fn set_identity_address(&mut self, address: &str) -> VaultResult<()>;

    /// Identity public key
    fn identity_public_key(&self) -> VaultResult<Option<String>>;
    /// Replace the identity public key
    fn set_identity_public_key(&mut self, key: &str) -> VaultResult<()>;

    /// Whether onboarding has been completed
    fn onboarding_completed(&self) -> VaultResult<bool>;
    /// Mark onboarding completed or not
    fn set_onboarding_completed(&mut self, completed: bool) -> VaultResult<()>;

    /// Embedded database contents, if a database exists
    fn embedded_blob(&self) -> VaultResult<Option<Vec<u8>>>;
    /// Replace the embedded database contents
    fn set_embedded_blob(&mut self, blob: &[u8]) -> VaultResult<()>;

    /// Read every field into a snapshot stamped with the current time
    ///
    /// The blob is read only when `include_blob` is set; a missing database
    /// yields a snapshot without a blob.
    fn snapshot_fields(&self, include_blob: bool) -> VaultResult<ConfigSnapshot> {
        let embedded_blob = if include_blob {
            self.embedded_blob()?
        } else {
            None
        };

        Ok(ConfigSnapshot {
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: Utc::now().timestamp_millis(),
            auth_secret: self.auth_secret()?,
            custom_peers: self.custom_peers()?,
            use_default_peers: self.use_default_peers()?,
            auto_start_enabled: self.auto_start_enabled()?,
            identity_address: self.identity_address()?,
            identity_public_key: self.identity_public_key()?,
            onboarding_completed: self.onboarding_completed()?,
            embedded_blob,
        })
    }

    /// Write a restored snapshot back, field by field
    ///
    /// Absent optional fields and an empty peer list leave the current values
    /// untouched. The default-peer flag is written after the peer list, so it
    /// wins over the implicit switch in [`ConfigStore::set_custom_peers`].
    fn apply_snapshot_fields(&mut self, snapshot: &ConfigSnapshot) -> VaultResult<()> {
        if let Some(secret) = &snapshot.auth_secret {
            self.set_auth_secret(secret)?;
        }
        if !snapshot.custom_peers.is_empty() {
            self.set_custom_peers(&snapshot.custom_peers)?;
        }
        self.set_use_default_peers(snapshot.use_default_peers)?;
        self.set_auto_start_enabled(snapshot.auto_start_enabled)?;
        if let Some(address) = &snapshot.identity_address {
            self.set_identity_address(address)?;
        }
        if let Some(key) = &snapshot.identity_public_key {
            self.set_identity_public_key(key)?;
        }
        self.set_onboarding_completed(snapshot.onboarding_completed)?;
        if let Some(blob) = &snapshot.embedded_blob {
            self.set_embedded_blob(blob)?;
        }

        debug!(
            peers = snapshot.custom_peers.len(),
            blob_len = snapshot.blob_len(),
            "applied snapshot fields to store"
        );
        Ok(())
    }
}
