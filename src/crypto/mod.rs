//! Cryptographic functions for confvault
//!
//! Provides PBKDF2-HMAC-SHA256 key derivation and AES-256-GCM authenticated
//! encryption for backup containers.

pub mod cipher;
pub mod key_derivation;
pub mod secure_memory;

pub use cipher::{generate_nonce, generate_salt, open, seal, NONCE_LEN, TAG_LEN};
pub use key_derivation::{
    derive_key, DerivedKey, KeyDerivation, Pbkdf2Sha256, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN,
};
pub use secure_memory::SecretString;
