use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use confvault::cli::{handle_backup_command, handle_config_command, BackupCommands, ConfigCommands};
use confvault::config::{paths::VaultPaths, settings::Settings};
use confvault::store::FileStore;
use confvault::VaultError;

#[derive(Parser)]
#[command(
    name = "confvault",
    version,
    about = "Encrypted backups of an application's private configuration",
    long_about = "confvault exports the account password, network peers, identity \
                  keys and optionally the embedded database into one \
                  password-protected, tamper-evident backup file, and restores \
                  them again."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the confvault home directory and default settings
    Init,

    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Configuration store commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if let Some(hint) = err.downcast_ref::<VaultError>().and_then(hint_for) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let paths = VaultPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(&settings);

    let mut store = FileStore::open(paths.clone())
        .with_context(|| format!("opening store in {}", paths.base_dir().display()))?;

    match cli.command {
        Some(Commands::Init) => {
            if paths.is_initialized() {
                println!("confvault is already initialized at: {}", paths.base_dir().display());
                return Ok(());
            }
            println!("Initializing confvault at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Backups will be written to: {}", settings.effective_backup_dir(&paths).display());
            println!("Run 'confvault backup create' to make your first backup.");
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&paths, &settings, &mut store, cmd)?;
        }
        Some(Commands::Config(cmd)) => {
            handle_config_command(&paths, &settings, &mut store, cmd)?;
        }
        None => {
            println!("confvault - encrypted configuration backups");
            println!();
            println!("Run 'confvault --help' for usage information.");
        }
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` overrides the configured level
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn hint_for(err: &VaultError) -> Option<&'static str> {
    match err {
        VaultError::AuthenticationFailure => {
            Some("Check the password. If it is right, the backup file has been modified or damaged.")
        }
        VaultError::UnsupportedVersion { .. } => {
            Some("This backup was made by a newer version of confvault; upgrade to restore it.")
        }
        VaultError::ContainerTooShort { .. } => Some("The file is not a confvault backup."),
        VaultError::NotFound { .. } => Some("Run 'confvault backup list' to see available backups."),
        _ => None,
    }
}
