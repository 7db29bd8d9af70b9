//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup and store layers.

pub mod backup;
pub mod config;
mod password;

pub use backup::{handle_backup_command, BackupCommands};
pub use config::{handle_config_command, ConfigCommands, PeerCommands};
