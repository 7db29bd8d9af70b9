//! Encrypted configuration backups
//!
//! # Architecture
//!
//! - `BackupManager`: create/restore/verify of containers, plus export from
//!   and import into a configuration store
//! - `file`: reading, writing and listing backup files
//! - `stage`: the per-call protocol stages
//!
//! # Backup Format
//!
//! ```text
//! salt (32 bytes) || nonce (12 bytes) || AES-256-GCM ciphertext || tag (16 bytes)
//! ```
//!
//! The key is PBKDF2-HMAC-SHA256 (100 000 rounds) over the backup password and
//! the salt. The plaintext is the JSON snapshot described in
//! [`crate::snapshot::codec`].
//!
//! # Example
//!
//! ```rust,ignore
//! use confvault::backup::BackupManager;
//! use confvault::store::MemoryStore;
//!
//! let manager = BackupManager::new();
//! let store = MemoryStore::new();
//!
//! let container = manager.export_from_store(&store, "correcthorse", true)?;
//!
//! let mut restored = MemoryStore::new();
//! manager.import_into_store(&mut restored, &container, "correcthorse")?;
//! ```

pub mod file;
mod manager;
mod stage;

pub use file::{
    generate_backup_filename, list_backups, read_container, resolve_backup_path,
    write_container, BackupFileInfo, BACKUP_FILE_EXTENSION,
};
pub use manager::{check_password_strength, BackupManager, MIN_PASSWORD_LEN};
pub use stage::Stage;
