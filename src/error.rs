//! Custom error types for confvault
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.
//!
//! The first six variants are the backup protocol's failure modes. Their
//! messages are shown to users as-is, so they must never carry details about
//! the decrypted payload or hint at how close a password guess was.

use thiserror::Error;

use crate::backup::Stage;

/// The main error type for confvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Backup password rejected by the create-time policy
    #[error("Password too short: choose one with at least {min_len} characters")]
    WeakPassword { min_len: usize },

    /// Input is too small to be a container; raised before any crypto runs
    #[error("Not a backup file: {len} bytes is shorter than the minimum container size")]
    ContainerTooShort { len: usize },

    /// Wrong password or tampered/corrupted ciphertext (deliberately one variant)
    #[error("Wrong password or corrupted backup file")]
    AuthenticationFailure,

    /// The snapshot inside the container is newer than this build understands
    #[error("Backup format version {found} is not supported by this version (supports up to {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    /// Decrypted payload does not have the expected shape
    #[error("Backup payload is malformed")]
    MalformedPayload,

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization errors while encoding a backup payload
    #[error("JSON error: {0}")]
    Json(String),

    /// Cipher setup errors (not authentication failures)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl VaultError {
    /// Create a "not found" error for backup files
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// The protocol stage in which this error is raised, if it is a protocol error
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::WeakPassword { .. } | Self::ContainerTooShort { .. } => Some(Stage::Validating),
            Self::AuthenticationFailure | Self::Encryption(_) => Some(Stage::Ciphering),
            Self::UnsupportedVersion { .. } | Self::MalformedPayload | Self::Json(_) => {
                Some(Stage::Codec)
            }
            _ => None,
        }
    }

    /// Check if this error means the password could not open the container
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailure)
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for confvault operations
pub type VaultResult<T> = Result<T, VaultError>;
