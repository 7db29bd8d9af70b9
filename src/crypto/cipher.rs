//! AES-256-GCM sealing and opening
//!
//! Provides authenticated encryption of the backup payload. The 16-byte tag
//! is appended to the ciphertext by the cipher and checked on every open; a
//! failed check is the only tamper signal and is never bypassed.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};

use crate::error::{VaultError, VaultResult};

use super::key_derivation::{DerivedKey, SALT_LEN};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_LEN: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_LEN: usize = 16;

/// Generate a random salt from the OS CSPRNG
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Generate a random nonce from the OS CSPRNG
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

fn cipher_for(key: &DerivedKey) -> VaultResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))
}

/// Encrypt `plaintext`, returning ciphertext with the tag appended
pub fn seal(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> VaultResult<Vec<u8>> {
    let cipher = cipher_for(key)?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))
}

/// Decrypt and authenticate `sealed` (ciphertext followed by tag)
///
/// Any tag mismatch, whether from a wrong key, a wrong nonce or altered
/// bytes, fails with [`VaultError::AuthenticationFailure`].
pub fn open(key: &DerivedKey, nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> VaultResult<Vec<u8>> {
    let cipher = cipher_for(key)?;
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| VaultError::AuthenticationFailure)
}
