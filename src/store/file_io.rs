//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::VaultError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, VaultError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| VaultError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| VaultError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), VaultError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| VaultError::Storage(format!("Failed to serialize data: {}", e)))?;
    write_atomic(path, &bytes)
}

/// Write JSON to a file atomically, readable only by its owner on Unix
///
/// The temp file is created with mode 0600 before any data is written, so the
/// contents are never visible to other users.
pub fn write_private_json_atomic<T, P>(path: P, data: &T) -> Result<(), VaultError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| VaultError::Storage(format!("Failed to serialize data: {}", e)))?;
    write_atomic_with(path.as_ref(), &bytes, true)
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all.
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), VaultError> {
    write_atomic_with(path.as_ref(), bytes, false)
}

fn write_atomic_with(path: &Path, bytes: &[u8], owner_only: bool) -> Result<(), VaultError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                VaultError::Io(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    // Temp file must live in the same directory for the rename to be atomic
    let temp_path = temp_path_for(path);

    let result = create_temp(&temp_path, owner_only)
        .map_err(|e| VaultError::Io(format!("Failed to create temp file: {}", e)))
        .and_then(|file| fill_temp(file, bytes))
        .and_then(|()| {
            fs::rename(&temp_path, path)
                .map_err(|e| VaultError::Io(format!("Failed to rename temp file: {}", e)))
        });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn create_temp(temp_path: &Path, owner_only: bool) -> io::Result<File> {
    // A leftover temp file may carry wider permissions than requested
    match fs::remove_file(temp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    if owner_only {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    options.open(temp_path)
}

fn fill_temp(file: File, bytes: &[u8]) -> Result<(), VaultError> {
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .map_err(|e| VaultError::Io(format!("Failed to write data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| VaultError::Io(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| VaultError::Io(format!("Failed to sync data: {}", e)))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: TestData = read_json(&path).unwrap();
        assert_eq!(data, TestData::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json_atomic(&path, &data).unwrap();
        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(data, loaded);
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blob.bin");

        write_atomic(&path, &[1, 2, 3]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert!(!temp_dir.path().join("blob.bin.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.json");

        write_json_atomic(&path, &TestData::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_json_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ nope").unwrap();

        let result: Result<TestData, _> = read_json(&path);
        assert!(matches!(result, Err(VaultError::Storage(_))));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = temp_dir.path().join("occupied");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inner"), "x").unwrap();

        let result = write_atomic(&path, b"data");

        assert!(matches!(result, Err(VaultError::Io(_))));
        assert!(!temp_dir.path().join("occupied.tmp").exists());
    }

    #[test]
    fn test_stale_temp_file_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blob.bin");
        fs::write(temp_dir.path().join("blob.bin.tmp"), "stale").unwrap();

        write_atomic(&path, &[9]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![9]);
        assert!(!temp_dir.path().join("blob.bin.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_private_write_is_owner_only_from_creation() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");

        // World-readable leftovers at both the target and the temp path
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let stale = temp_dir.path().join("secret.json.tmp");
        fs::write(&stale, "{}").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        let data = TestData {
            name: "secret".to_string(),
            value: 1,
        };
        write_private_json_atomic(&path, &data).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "group/other bits set: {:o}", mode & 0o777);
        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[cfg(unix)]
    #[test]
    fn test_private_temp_file_is_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let temp_path = temp_dir.path().join("secret.json.tmp");

        let file = create_temp(&temp_path, true).unwrap();
        drop(file);

        let mode = fs::metadata(&temp_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "group/other bits set: {:o}", mode & 0o777);
    }
}
