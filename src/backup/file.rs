//! Backup files on disk
//!
//! Containers are written atomically and named
//! `confvault-backup-<epoch millis>.cvbackup` by default.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{VaultError, VaultResult};
use crate::store::file_io::write_atomic;

/// Extension of backup files (without the dot)
pub const BACKUP_FILE_EXTENSION: &str = "cvbackup";

const BACKUP_FILE_PREFIX: &str = "confvault-backup-";

/// Metadata about a backup file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupFileInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created (from the filename, else the file mtime)
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Default filename for a backup created at `now`
pub fn generate_backup_filename(now: DateTime<Utc>) -> String {
    format!(
        "{}{}.{}",
        BACKUP_FILE_PREFIX,
        now.timestamp_millis(),
        BACKUP_FILE_EXTENSION
    )
}

/// Write container bytes to `path` atomically
pub fn write_container(path: &Path, container: &[u8]) -> VaultResult<()> {
    write_atomic(path, container)?;
    info!(path = %path.display(), bytes = container.len(), "backup written");
    Ok(())
}

/// Read a whole container file
pub fn read_container(path: &Path) -> VaultResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        VaultError::Io(format!(
            "Failed to read backup file {}: {}",
            path.display(),
            e
        ))
    })
}

/// List backup files in `dir`, newest first
pub fn list_backups(dir: &Path) -> VaultResult<Vec<BackupFileInfo>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();

    for entry in fs::read_dir(dir)
        .map_err(|e| VaultError::Io(format!("Failed to read backup directory: {}", e)))?
    {
        let entry = entry
            .map_err(|e| VaultError::Io(format!("Failed to read directory entry: {}", e)))?;

        let path = entry.path();
        if path
            .extension()
            .map_or(false, |ext| ext == BACKUP_FILE_EXTENSION)
        {
            if let Some(info) = parse_backup_info(&path) {
                backups.push(info);
            }
        }
    }

    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(backups)
}

/// Most recent backup in `dir`
pub fn latest_backup(dir: &Path) -> VaultResult<Option<BackupFileInfo>> {
    Ok(list_backups(dir)?.into_iter().next())
}

/// Resolve a backup identifier to a file path
///
/// Accepts `latest`, an existing path, a filename inside `dir`, or a
/// filename inside `dir` without its extension.
pub fn resolve_backup_path(dir: &Path, backup: &str) -> VaultResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return latest_backup(dir)?
            .map(|b| b.path)
            .ok_or_else(|| VaultError::backup_not_found("latest"));
    }

    let path = PathBuf::from(backup);
    if path.is_file() {
        return Ok(path);
    }

    let in_dir = dir.join(backup);
    if in_dir.is_file() {
        return Ok(in_dir);
    }

    let with_ext = dir.join(format!("{}.{}", backup, BACKUP_FILE_EXTENSION));
    if with_ext.is_file() {
        return Ok(with_ext);
    }

    Err(VaultError::backup_not_found(backup))
}

fn parse_backup_info(path: &Path) -> Option<BackupFileInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let metadata = fs::metadata(path).ok()?;

    let created_at = parse_backup_timestamp(&filename).or_else(|| {
        metadata
            .modified()
            .ok()
            .map(DateTime::<Utc>::from)
    })?;

    Some(BackupFileInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes: metadata.len(),
    })
}

/// Parse the creation time out of a default backup filename
fn parse_backup_timestamp(filename: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = filename
        .strip_prefix(BACKUP_FILE_PREFIX)?
        .strip_suffix(BACKUP_FILE_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()?;
    Utc.timestamp_millis_opt(millis).single()
}
