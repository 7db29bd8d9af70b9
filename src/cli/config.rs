//! Configuration CLI commands
//!
//! Inspect and edit the configuration store that backups are taken from.

use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Subcommand};

use crate::config::paths::VaultPaths;
use crate::config::settings::Settings;
use crate::error::{VaultError, VaultResult};
use crate::store::{ConfigStore, FileStore};

use super::password::resolve_password;

/// Environment variable holding the account password for `config password`
pub const ACCOUNT_PASSWORD_ENV: &str = "CONFVAULT_ACCOUNT_PASSWORD";

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show paths, settings and the stored configuration
    Show,

    /// Manage network peers
    #[command(subcommand)]
    Peers(PeerCommands),

    /// Enable or disable starting the service automatically
    AutoStart {
        /// true or false
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },

    /// Set or clear the identity address and public key
    Identity {
        /// Mail address
        #[arg(long)]
        address: Option<String>,

        /// Public key
        #[arg(long)]
        public_key: Option<String>,

        /// Forget the stored identity
        #[arg(long, conflicts_with_all = ["address", "public_key"])]
        clear: bool,
    },

    /// Store the account password
    Password {
        /// Account password (prompted for when omitted)
        #[arg(long, env = ACCOUNT_PASSWORD_ENV, hide_env_values = true)]
        value: Option<String>,
    },

    /// Mark onboarding as completed or not
    Onboarding {
        /// true or false
        #[arg(action = ArgAction::Set)]
        completed: bool,
    },

    /// Replace the embedded database with a file's contents
    ImportDatabase {
        /// Database file to copy in
        file: PathBuf,
    },
}

/// Peer subcommands
#[derive(Subcommand)]
pub enum PeerCommands {
    /// List custom and effective peers
    List,

    /// Add a custom peer and switch to custom peers
    Add {
        /// Peer URI, e.g. tcp://host:port
        uri: String,
    },

    /// Remove a custom peer
    Remove {
        /// Peer URI
        uri: String,
    },

    /// Remove all custom peers and switch back to the defaults
    Clear,

    /// Use the built-in peer set
    UseDefault,

    /// Use the custom peer list
    UseCustom,
}

/// Handle a config command
pub fn handle_config_command(
    paths: &VaultPaths,
    settings: &Settings,
    store: &mut FileStore,
    cmd: ConfigCommands,
) -> VaultResult<()> {
    match cmd {
        ConfigCommands::Show => show_config(paths, settings, store),

        ConfigCommands::Peers(cmd) => handle_peer_command(settings, store, cmd),

        ConfigCommands::AutoStart { enabled } => {
            store.set_auto_start_enabled(enabled)?;
            println!("Auto-start {}.", if enabled { "enabled" } else { "disabled" });
            Ok(())
        }

        ConfigCommands::Identity {
            address,
            public_key,
            clear,
        } => {
            if clear {
                store.clear_identity()?;
                println!("Identity cleared.");
                return Ok(());
            }
            if address.is_none() && public_key.is_none() {
                return Err(VaultError::Config(
                    "Nothing to set: pass --address and/or --public-key".into(),
                ));
            }
            if let Some(address) = address {
                store.set_identity_address(address.trim())?;
                println!("Mail address set.");
            }
            if let Some(key) = public_key {
                store.set_identity_public_key(key.trim())?;
                println!("Public key set.");
            }
            Ok(())
        }

        ConfigCommands::Password { value } => {
            let password = resolve_password(value, "Account password: ")?;
            if password.is_empty() {
                return Err(VaultError::Config("Account password cannot be empty".into()));
            }
            store.set_auth_secret(&password)?;
            println!("Account password stored.");
            Ok(())
        }

        ConfigCommands::Onboarding { completed } => {
            store.set_onboarding_completed(completed)?;
            println!(
                "Onboarding marked as {}.",
                if completed { "completed" } else { "not completed" }
            );
            Ok(())
        }

        ConfigCommands::ImportDatabase { file } => {
            let contents = fs::read(&file).map_err(|e| {
                VaultError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;
            store.set_embedded_blob(&contents)?;
            println!("Database imported ({} bytes).", contents.len());
            Ok(())
        }
    }
}

fn handle_peer_command(
    settings: &Settings,
    store: &mut FileStore,
    cmd: PeerCommands,
) -> VaultResult<()> {
    match cmd {
        PeerCommands::List => {
            let custom = store.custom_peers()?;
            println!("Custom peers:");
            if custom.is_empty() {
                println!("  (none)");
            }
            for peer in &custom {
                println!("  - {}", peer);
            }
            println!();
            println!("Effective peers:");
            for peer in store.effective_peers(&settings.default_peers) {
                println!("  - {}", peer);
            }
        }

        PeerCommands::Add { uri } => {
            let uri = uri.trim().to_string();
            if uri.is_empty() {
                return Err(VaultError::Config("Peer URI cannot be empty".into()));
            }
            let mut peers = store.custom_peers()?;
            if peers.contains(&uri) {
                println!("Peer already configured: {}", uri);
            } else {
                peers.push(uri.clone());
                println!("Added peer: {}", uri);
            }
            store.set_custom_peers(&peers)?;
        }

        PeerCommands::Remove { uri } => {
            let uri = uri.trim();
            let mut peers = store.custom_peers()?;
            let before = peers.len();
            peers.retain(|p| p != uri);
            if peers.len() == before {
                return Err(VaultError::NotFound {
                    entity_type: "Peer",
                    identifier: uri.to_string(),
                });
            }
            let use_default = store.use_default_peers()?;
            store.set_custom_peers(&peers)?;
            store.set_use_default_peers(use_default || peers.is_empty())?;
            println!("Removed peer: {}", uri);
        }

        PeerCommands::Clear => {
            store.set_custom_peers(&[])?;
            store.set_use_default_peers(true)?;
            println!("Custom peers cleared; using the default peers.");
        }

        PeerCommands::UseDefault => {
            store.set_use_default_peers(true)?;
            println!("Using the default peers.");
        }

        PeerCommands::UseCustom => {
            if store.custom_peers()?.is_empty() {
                return Err(VaultError::Config(
                    "No custom peers configured: add one with 'confvault config peers add'"
                        .into(),
                ));
            }
            store.set_use_default_peers(false)?;
            println!("Using the custom peers.");
        }
    }

    Ok(())
}

fn show_config(paths: &VaultPaths, settings: &Settings, store: &FileStore) -> VaultResult<()> {
    println!("confvault Configuration");
    println!("=======================");
    println!("Home directory:   {}", paths.base_dir().display());
    println!("Backup directory: {}", settings.effective_backup_dir(paths).display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!();
    println!("Settings:");
    println!("  Include database in backups: {}", settings.include_database);
    println!("  Log level: {}", settings.log_level);
    println!();

    let config = store.config();
    println!("Stored configuration:");
    println!(
        "  Account password: {}",
        if store.has_auth_secret() { "set" } else { "not set" }
    );
    println!(
        "  Mail address:     {}",
        config.identity_address.as_deref().unwrap_or("-")
    );
    println!(
        "  Public key:       {}",
        config.identity_public_key.as_deref().unwrap_or("-")
    );
    println!(
        "  Peers:            {} ({} custom)",
        if config.use_default_peers { "default" } else { "custom" },
        config.custom_peers.len()
    );
    println!("  Auto-start:       {}", config.auto_start_enabled);
    println!("  Onboarding done:  {}", config.onboarding_completed);
    match store.database_len() {
        Some(len) => println!("  Database:         {} bytes", len),
        None => println!("  Database:         none"),
    }

    Ok(())
}
