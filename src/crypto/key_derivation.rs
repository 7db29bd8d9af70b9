//! Key derivation using PBKDF2-HMAC-SHA256
//!
//! Turns a backup password plus a random 32-byte salt into a 256-bit AES key.
//! The iteration count is fixed so that every container written by any build
//! can be opened by any other build with the same password.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Salt length in bytes
pub const SALT_LEN: usize = 32;

/// Derived key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// A derived encryption key, wiped from memory when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes
    pub fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey").field("key", &"[REDACTED]").finish()
    }
}

/// Password-based key derivation
///
/// Implementations must be deterministic: the same password and salt always
/// produce the same key.
pub trait KeyDerivation: Send + Sync {
    /// Derive a key from `password` and `salt`
    fn derive(&self, password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey;
}

impl<T: KeyDerivation + ?Sized> KeyDerivation for &T {
    fn derive(&self, password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
        (**self).derive(password, salt)
    }
}

/// PBKDF2 with HMAC-SHA256 at [`PBKDF2_ITERATIONS`] rounds
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2Sha256;

impl KeyDerivation for Pbkdf2Sha256 {
    fn derive(&self, password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
        let derived = DerivedKey::from_bytes(key);
        key.zeroize();
        derived
    }
}

/// Derive a key with the production KDF
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
    Pbkdf2Sha256.derive(password, salt)
}
