//! User settings for confvault
//!
//! Manages preferences for where backups go, whether the embedded database is
//! included by default, the built-in peer set and the log level.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::error::VaultError;
use crate::store::file_io::write_json_atomic;

/// Peers used when the user has not configured custom ones
pub const DEFAULT_PEERS: &[&str] = &["tcp://bra.zbin.eu:7743"];

/// User settings for confvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory for new backups; the home `backups/` directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// Include the embedded database in new backups unless told otherwise
    #[serde(default = "default_include_database")]
    pub include_database: bool,

    /// Built-in peer set used when custom peers are off or empty
    #[serde(default = "default_peers")]
    pub default_peers: Vec<String>,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_include_database() -> bool {
    true
}

fn default_peers() -> Vec<String> {
    DEFAULT_PEERS.iter().map(|p| p.to_string()).collect()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backup_dir: None,
            include_database: default_include_database(),
            default_peers: default_peers(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                VaultError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                VaultError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk atomically
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Directory new backups are written to
    pub fn effective_backup_dir(&self, paths: &VaultPaths) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| paths.backup_dir())
    }
}
