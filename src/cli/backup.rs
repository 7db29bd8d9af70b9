//! Backup CLI commands
//!
//! Implements CLI commands for creating, restoring and inspecting encrypted
//! configuration backups.

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use clap::Subcommand;

use crate::backup::{
    generate_backup_filename, list_backups, read_container, resolve_backup_path,
    write_container, BackupManager,
};
use crate::config::paths::VaultPaths;
use crate::config::settings::Settings;
use crate::error::VaultResult;
use crate::snapshot::ConfigSnapshot;
use crate::store::FileStore;

use super::password::{resolve_new_password, resolve_password};

/// Environment variable holding the backup password
pub const PASSWORD_ENV: &str = "CONFVAULT_BACKUP_PASSWORD";

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new encrypted backup
    Create {
        /// Output file (defaults to a timestamped file in the backup directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave the embedded database out of the backup
        #[arg(long)]
        no_database: bool,

        /// Backup password (prompted for when omitted)
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore from a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Apply the backup instead of only showing its contents
        #[arg(short, long)]
        force: bool,

        /// Backup password (prompted for when omitted)
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },

    /// Check that a password opens a backup
    Verify {
        /// Backup filename or path
        backup: String,

        /// Backup password (prompted for when omitted)
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },

    /// Show information about a specific backup
    Info {
        /// Backup filename or path
        backup: String,

        /// Backup password (prompted for when omitted)
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &VaultPaths,
    settings: &Settings,
    store: &mut FileStore,
    cmd: BackupCommands,
) -> VaultResult<()> {
    let manager = BackupManager::new();
    let backup_dir = settings.effective_backup_dir(paths);

    match cmd {
        BackupCommands::Create {
            output,
            no_database,
            password,
        } => {
            let password = resolve_new_password(password)?;
            let include_database = settings.include_database && !no_database;

            println!("Creating backup...");
            let container = manager.export_from_store(&*store, &password, include_database)?;

            let backup_path = output
                .unwrap_or_else(|| backup_dir.join(generate_backup_filename(Utc::now())));
            write_container(&backup_path, &container)?;

            println!("Backup created: {}", display_name(&backup_path));
            println!("Location: {}", backup_path.display());
            println!("Size: {}", format_size(container.len() as u64));
            if include_database && store.database_len().is_none() {
                println!("Note: no database was found, so none was included.");
            }
        }

        BackupCommands::List { verbose } => {
            let backups = list_backups(&backup_dir)?;

            if backups.is_empty() {
                println!("No backups found in {}.", backup_dir.display());
                println!("Create one with: confvault backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = Utc::now().signed_duration_since(backup.created_at);
                let age_str = format_duration(age);

                if verbose {
                    println!(
                        "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        age_str,
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {})",
                        i + 1,
                        backup.filename,
                        age_str,
                        format_size(backup.size_bytes),
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore {
            backup,
            force,
            password,
        } => {
            let backup_path = resolve_backup_path(&backup_dir, &backup)?;
            let container = read_container(&backup_path)?;
            let password = resolve_password(password, "Backup password: ")?;

            if !force {
                let snapshot = manager.restore_backup(&container, &password)?;

                println!("Backup Information");
                println!("==================");
                println!("File: {}", backup_path.display());
                print_snapshot_summary(&snapshot);
                println!();
                println!("WARNING: This will overwrite the current configuration!");
                println!("To proceed, run again with --force flag:");
                println!("  confvault backup restore {} --force", backup);
                return Ok(());
            }

            println!("Restoring from backup...");
            let snapshot = manager.import_into_store(store, &container, &password)?;

            println!("Restore complete!");
            print_snapshot_summary(&snapshot);
        }

        BackupCommands::Verify { backup, password } => {
            let backup_path = resolve_backup_path(&backup_dir, &backup)?;
            let container = read_container(&backup_path)?;
            let password = resolve_password(password, "Backup password: ")?;

            // Full restore so the error says why verification failed
            manager.restore_backup(&container, &password)?;
            println!("Backup OK: {}", display_name(&backup_path));
        }

        BackupCommands::Info { backup, password } => {
            let backup_path = resolve_backup_path(&backup_dir, &backup)?;
            let container = read_container(&backup_path)?;
            let password = resolve_password(password, "Backup password: ")?;

            let snapshot = manager.restore_backup(&container, &password)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!("Size: {}", format_size(container.len() as u64));
            print_snapshot_summary(&snapshot);
        }
    }

    Ok(())
}

/// Print what a snapshot contains without revealing secrets
fn print_snapshot_summary(snapshot: &ConfigSnapshot) {
    let created = Utc
        .timestamp_millis_opt(snapshot.created_at)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("Created: {}", created);
    println!("Schema version: {}", snapshot.schema_version);
    println!();
    println!("Contents:");
    println!(
        "  Account password: {}",
        if snapshot.auth_secret.is_some() { "Yes" } else { "No" }
    );
    println!(
        "  Mail address:     {}",
        snapshot.identity_address.as_deref().unwrap_or("-")
    );
    println!(
        "  Public key:       {}",
        if snapshot.identity_public_key.is_some() {
            "Yes"
        } else {
            "No"
        }
    );
    println!("  Custom peers:     {}", snapshot.custom_peers.len());
    for peer in &snapshot.custom_peers {
        println!("    - {}", peer);
    }
    println!(
        "  Default peers:    {}",
        if snapshot.use_default_peers { "On" } else { "Off" }
    );
    println!(
        "  Auto-start:       {}",
        if snapshot.auto_start_enabled { "On" } else { "Off" }
    );
    println!(
        "  Onboarding done:  {}",
        if snapshot.onboarding_completed {
            "Yes"
        } else {
            "No"
        }
    );
    if snapshot.includes_blob() {
        println!(
            "  Database:         Yes ({})",
            format_size(snapshot.blob_len() as u64)
        );
    } else {
        println!("  Database:         No");
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
