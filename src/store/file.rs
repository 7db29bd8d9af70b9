//! File-backed configuration store
//!
//! Layout under the confvault home directory:
//!
//! - `config.json`: peers, flags and identity fields
//! - `credentials.json`: the account password, owner-readable only on Unix
//! - `data/app.db`: the embedded database
//!
//! Each setter persists immediately with an atomic write.

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::paths::VaultPaths;
use crate::error::{VaultError, VaultResult};
use crate::snapshot::normalize_peers;

use super::file_io::{read_json, write_atomic, write_json_atomic, write_private_json_atomic};
use super::ConfigStore;

/// Non-secret configuration persisted in `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default)]
    pub custom_peers: Vec<String>,
    #[serde(default = "default_true")]
    pub use_default_peers: bool,
    #[serde(default = "default_true")]
    pub auto_start_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_public_key: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StoredConfig {
    fn default() -> Self {
        Self {
            custom_peers: Vec::new(),
            use_default_peers: true,
            auto_start_enabled: true,
            identity_address: None,
            identity_public_key: None,
            onboarding_completed: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_secret: Option<String>,
}

/// Configuration store backed by files in the confvault home
#[derive(Debug)]
pub struct FileStore {
    paths: VaultPaths,
    config: StoredConfig,
    credentials: StoredCredentials,
}

impl FileStore {
    /// Open the store, loading whatever is already on disk
    pub fn open(paths: VaultPaths) -> VaultResult<Self> {
        let config = read_json(paths.store_file())?;
        let credentials = read_json(paths.credentials_file())?;
        Ok(Self {
            paths,
            config,
            credentials,
        })
    }

    /// Current non-secret configuration
    pub fn config(&self) -> &StoredConfig {
        &self.config
    }

    /// Whether an account password is stored
    pub fn has_auth_secret(&self) -> bool {
        self.credentials.auth_secret.is_some()
    }

    /// Peers the service should connect to
    ///
    /// The default set applies when selected or when no custom peers exist.
    pub fn effective_peers(&self, default_peers: &[String]) -> Vec<String> {
        if self.config.use_default_peers || self.config.custom_peers.is_empty() {
            default_peers.to_vec()
        } else {
            self.config.custom_peers.clone()
        }
    }

    /// Size of the embedded database in bytes, if present
    pub fn database_len(&self) -> Option<u64> {
        fs::metadata(self.paths.database_file()).ok().map(|m| m.len())
    }

    /// Forget the identity address and public key
    pub fn clear_identity(&mut self) -> VaultResult<()> {
        self.config.identity_address = None;
        self.config.identity_public_key = None;
        self.save_config()
    }

    fn save_config(&self) -> VaultResult<()> {
        write_json_atomic(self.paths.store_file(), &self.config)
    }

    fn save_credentials(&self) -> VaultResult<()> {
        write_private_json_atomic(self.paths.credentials_file(), &self.credentials)
    }
}

impl ConfigStore for FileStore {
    fn auth_secret(&self) -> VaultResult<Option<String>> {
        Ok(self.credentials.auth_secret.clone())
    }

    fn set_auth_secret(&mut self, secret: &str) -> VaultResult<()> {
        self.credentials.auth_secret = Some(secret.to_string());
        self.save_credentials()
    }

    fn custom_peers(&self) -> VaultResult<Vec<String>> {
        Ok(self.config.custom_peers.clone())
    }

    fn set_custom_peers(&mut self, peers: &[String]) -> VaultResult<()> {
        self.config.custom_peers = normalize_peers(peers);
        self.config.use_default_peers = false;
        self.save_config()
    }

    fn use_default_peers(&self) -> VaultResult<bool> {
        Ok(self.config.use_default_peers)
    }

    fn set_use_default_peers(&mut self, enabled: bool) -> VaultResult<()> {
        self.config.use_default_peers = enabled;
        self.save_config()
    }

    fn auto_start_enabled(&self) -> VaultResult<bool> {
        Ok(self.config.auto_start_enabled)
    }

    fn set_auto_start_enabled(&mut self, enabled: bool) -> VaultResult<()> {
        self.config.auto_start_enabled = enabled;
        self.save_config()
    }

    fn identity_address(&self) -> VaultResult<Option<String>> {
        Ok(self.config.identity_address.clone())
    }

    fn set_identity_address(&mut self, address: &str) -> VaultResult<()> {
        self.config.identity_address = Some(address.to_string());
        self.save_config()
    }

    fn identity_public_key(&self) -> VaultResult<Option<String>> {
        Ok(self.config.identity_public_key.clone())
    }

    fn set_identity_public_key(&mut self, key: &str) -> VaultResult<()> {
        self.config.identity_public_key = Some(key.to_string());
        self.save_config()
    }

    fn onboarding_completed(&self) -> VaultResult<bool> {
        Ok(self.config.onboarding_completed)
    }

    fn set_onboarding_completed(&mut self, completed: bool) -> VaultResult<()> {
        self.config.onboarding_completed = completed;
        self.save_config()
    }

    fn embedded_blob(&self) -> VaultResult<Option<Vec<u8>>> {
        let path = self.paths.database_file();
        if !path.exists() {
            debug!("no database file to include");
            return Ok(None);
        }

        fs::read(&path)
            .map(Some)
            .map_err(|e| VaultError::Io(format!("Failed to read database: {}", e)))
    }

    fn set_embedded_blob(&mut self, blob: &[u8]) -> VaultResult<()> {
        write_atomic(self.paths.database_file(), blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        (FileStore::open(paths).unwrap(), temp_dir)
    }

    #[test]
    fn test_fresh_store_defaults() {
        let (store, _temp) = open_store();

        assert!(store.use_default_peers().unwrap());
        assert!(store.auto_start_enabled().unwrap());
        assert!(!store.onboarding_completed().unwrap());
        assert_eq!(store.auth_secret().unwrap(), None);
        assert_eq!(store.embedded_blob().unwrap(), None);
    }

    #[test]
    fn test_values_persist_across_open() {
        let (mut store, temp) = open_store();

        store.set_auth_secret("mailpass").unwrap();
        store
            .set_custom_peers(&["tcp://a:1".to_string(), " tls://b:2 ".to_string()])
            .unwrap();
        store.set_identity_address("abc@yggmail").unwrap();
        store.set_embedded_blob(&[1, 2, 3]).unwrap();

        let reopened =
            FileStore::open(VaultPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        assert_eq!(reopened.auth_secret().unwrap().as_deref(), Some("mailpass"));
        assert_eq!(reopened.custom_peers().unwrap(), vec!["tcp://a:1", "tls://b:2"]);
        assert!(!reopened.use_default_peers().unwrap());
        assert_eq!(
            reopened.identity_address().unwrap().as_deref(),
            Some("abc@yggmail")
        );
        assert_eq!(reopened.embedded_blob().unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(reopened.database_len(), Some(3));
    }

    #[test]
    fn test_secret_not_in_config_file() {
        let (mut store, temp) = open_store();
        store.set_auth_secret("mailpass").unwrap();
        store.set_auto_start_enabled(false).unwrap();

        let config = fs::read_to_string(temp.path().join("config.json")).unwrap();
        assert!(!config.contains("mailpass"));
    }

    #[cfg(unix)]
    #[test]
    fn test_credentials_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (mut store, temp) = open_store();
        store.set_auth_secret("mailpass").unwrap();
        store.set_auth_secret("newpass").unwrap();

        let mode = fs::metadata(temp.path().join("credentials.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o077, 0, "group/other bits set: {:o}", mode & 0o777);
        assert!(!temp.path().join("credentials.json.tmp").exists());
    }

    #[test]
    fn test_effective_peers() {
        let (mut store, _temp) = open_store();
        let defaults = vec!["tcp://default:1".to_string()];

        assert_eq!(store.effective_peers(&defaults), defaults);

        store.set_custom_peers(&["tcp://mine:2".to_string()]).unwrap();
        assert_eq!(store.effective_peers(&defaults), vec!["tcp://mine:2"]);

        store.set_use_default_peers(true).unwrap();
        assert_eq!(store.effective_peers(&defaults), defaults);
    }

    #[test]
    fn test_clear_identity() {
        let (mut store, _temp) = open_store();
        store.set_identity_address("abc@yggmail").unwrap();
        store.set_identity_public_key("abc").unwrap();

        store.clear_identity().unwrap();

        assert_eq!(store.identity_address().unwrap(), None);
        assert_eq!(store.identity_public_key().unwrap(), None);
    }
}
