//! In-memory configuration store

use crate::error::VaultResult;
use crate::snapshot::normalize_peers;

use super::ConfigStore;

/// Configuration held in plain fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    pub auth_secret: Option<String>,
    pub custom_peers: Vec<String>,
    pub use_default_peers: bool,
    pub auto_start_enabled: bool,
    pub identity_address: Option<String>,
    pub identity_public_key: Option<String>,
    pub onboarding_completed: bool,
    pub embedded_blob: Option<Vec<u8>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            auth_secret: None,
            custom_peers: Vec::new(),
            use_default_peers: true,
            auto_start_enabled: true,
            identity_address: None,
            identity_public_key: None,
            onboarding_completed: false,
            embedded_blob: None,
        }
    }
}

impl MemoryStore {
    /// Create a store with fresh-install defaults
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn auth_secret(&self) -> VaultResult<Option<String>> {
        Ok(self.auth_secret.clone())
    }

    fn set_auth_secret(&mut self, secret: &str) -> VaultResult<()> {
        self.auth_secret = Some(secret.to_string());
        Ok(())
    }

    fn custom_peers(&self) -> VaultResult<Vec<String>> {
        Ok(self.custom_peers.clone())
    }

    fn set_custom_peers(&mut self, peers: &[String]) -> VaultResult<()> {
        self.custom_peers = normalize_peers(peers);
        self.use_default_peers = false;
        Ok(())
    }

    fn use_default_peers(&self) -> VaultResult<bool> {
        Ok(self.use_default_peers)
    }

    fn set_use_default_peers(&mut self, enabled: bool) -> VaultResult<()> {
        self.use_default_peers = enabled;
        Ok(())
    }

    fn auto_start_enabled(&self) -> VaultResult<bool> {
        Ok(self.auto_start_enabled)
    }

    fn set_auto_start_enabled(&mut self, enabled: bool) -> VaultResult<()> {
        self.auto_start_enabled = enabled;
        Ok(())
    }

    fn identity_address(&self) -> VaultResult<Option<String>> {
        Ok(self.identity_address.clone())
    }

    fn set_identity_address(&mut self, address: &str) -> VaultResult<()> {
        self.identity_address = Some(address.to_string());
        Ok(())
    }

    fn identity_public_key(&self) -> VaultResult<Option<String>> {
        Ok(self.identity_public_key.clone())
    }

    fn set_identity_public_key(&mut self, key: &str) -> VaultResult<()> {
        self.identity_public_key = Some(key.to_string());
        Ok(())
    }

    fn onboarding_completed(&self) -> VaultResult<bool> {
        Ok(self.onboarding_completed)
    }

    fn set_onboarding_completed(&mut self, completed: bool) -> VaultResult<()> {
        self.onboarding_completed = completed;
        Ok(())
    }

    fn embedded_blob(&self) -> VaultResult<Option<Vec<u8>>> {
        Ok(self.embedded_blob.clone())
    }

    fn set_embedded_blob(&mut self, blob: &[u8]) -> VaultResult<()> {
        self.embedded_blob = Some(blob.to_vec());
        Ok(())
    }
}
