//! confvault - encrypted backups of an application's private configuration
//!
//! Exports credentials, the network-peer list, identity keys and optionally an
//! embedded database as one password-protected, tamper-evident file, and
//! restores them again.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `snapshot`: the versioned configuration snapshot, its JSON payload and
//!   the binary container layout
//! - `crypto`: PBKDF2-HMAC-SHA256 key derivation and AES-256-GCM
//! - `backup`: create/restore/verify orchestration and backup files
//! - `store`: the configuration store the snapshot is read from and
//!   written back to
//! - `config`: path resolution and user settings
//! - `cli`: command handlers for the `confvault` binary
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use confvault::backup::BackupManager;
//! use confvault::snapshot::ConfigSnapshot;
//!
//! let manager = BackupManager::new();
//! let snapshot = ConfigSnapshot::new().with_peers(["tcp://peer.example:7743"]);
//!
//! let container = manager.create_backup(&snapshot, "correcthorse")?;
//! let restored = manager.restore_backup(&container, "correcthorse")?;
//! assert_eq!(restored, snapshot);
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod snapshot;
pub mod store;

pub use backup::BackupManager;
pub use error::{VaultError, VaultResult};
pub use snapshot::ConfigSnapshot;
