//! Password input for CLI commands
//!
//! Passwords come from a flag/environment variable when given, otherwise from
//! a hidden terminal prompt.

use crate::backup::MIN_PASSWORD_LEN;
use crate::crypto::SecretString;
use crate::error::{VaultError, VaultResult};

/// Use the provided password, or prompt for an existing one
pub fn resolve_password(provided: Option<String>, prompt: &str) -> VaultResult<SecretString> {
    match provided {
        Some(password) => Ok(SecretString::new(password)),
        None => prompt_password(prompt),
    }
}

/// Use the provided password, or prompt for a new one with confirmation
///
/// A provided password is passed through unchecked; the backup manager
/// enforces the length policy.
pub fn resolve_new_password(provided: Option<String>) -> VaultResult<SecretString> {
    match provided {
        Some(password) => Ok(SecretString::new(password)),
        None => prompt_new_password(),
    }
}

/// Prompt for a new password with confirmation
fn prompt_new_password() -> VaultResult<SecretString> {
    loop {
        let pass1 = prompt_password("Enter backup password: ")?;

        if pass1.char_len() < MIN_PASSWORD_LEN {
            println!(
                "Password must be at least {} characters. Please try again.",
                MIN_PASSWORD_LEN
            );
            continue;
        }

        let pass2 = prompt_password("Confirm backup password: ")?;

        if pass1 != pass2 {
            println!("Passwords do not match. Please try again.");
            continue;
        }

        return Ok(pass1);
    }
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> VaultResult<SecretString> {
    rpassword::prompt_password(prompt)
        .map(SecretString::new)
        .map_err(|e| VaultError::Io(format!("Failed to read password: {}", e)))
}
