//! Binary container layout
//!
//! ```text
//! offset 0,  length 32: salt
//! offset 32, length 12: nonce
//! offset 44, length N:  ciphertext || 16-byte GCM tag
//! ```
//!
//! There is no magic number or header: the layout is fixed and every byte
//! after the nonce is authenticated by the tag.

use crate::crypto::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{VaultError, VaultResult};

/// Smallest structurally valid container: empty ciphertext plus tag
pub const MIN_CONTAINER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Borrowed view of the three container regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerParts<'a> {
    /// Key-derivation salt
    pub salt: &'a [u8; SALT_LEN],
    /// AES-GCM nonce
    pub nonce: &'a [u8; NONCE_LEN],
    /// Ciphertext with the tag as its final 16 bytes
    pub sealed: &'a [u8],
}

/// Split a container into salt, nonce and sealed payload
pub fn split_container(bytes: &[u8]) -> VaultResult<ContainerParts<'_>> {
    if bytes.len() < MIN_CONTAINER_LEN {
        return Err(VaultError::ContainerTooShort { len: bytes.len() });
    }

    let (salt, rest) = bytes.split_at(SALT_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    // Lengths are fixed by the split points above.
    let salt: &[u8; SALT_LEN] = salt
        .try_into()
        .map_err(|_| VaultError::ContainerTooShort { len: bytes.len() })?;
    let nonce: &[u8; NONCE_LEN] = nonce
        .try_into()
        .map_err(|_| VaultError::ContainerTooShort { len: bytes.len() })?;

    Ok(ContainerParts {
        salt,
        nonce,
        sealed,
    })
}

/// Concatenate salt, nonce and sealed payload into a container
pub fn join_container(salt: &[u8; SALT_LEN], nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
    out.extend_from_slice(salt);
    out.extend_from_slice(nonce);
    out.extend_from_slice(sealed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_len_is_sixty() {
        assert_eq!(MIN_CONTAINER_LEN, 60);
    }

    #[test]
    fn test_split_offsets() {
        let salt = [0x11u8; SALT_LEN];
        let nonce = [0x22u8; NONCE_LEN];
        let sealed = [0x33u8; 20];
        let bytes = join_container(&salt, &nonce, &sealed);

        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[..32], &salt);
        assert_eq!(&bytes[32..44], &nonce);

        let parts = split_container(&bytes).unwrap();
        assert_eq!(parts.salt, &salt);
        assert_eq!(parts.nonce, &nonce);
        assert_eq!(parts.sealed, &sealed);
    }

    #[test]
    fn test_exactly_minimum_is_accepted() {
        let bytes = vec![0u8; MIN_CONTAINER_LEN];
        let parts = split_container(&bytes).unwrap();
        assert_eq!(parts.sealed.len(), TAG_LEN);
    }

    #[test]
    fn test_short_input_rejected() {
        for len in [0, 1, 44, 59] {
            let bytes = vec![0u8; len];
            match split_container(&bytes) {
                Err(VaultError::ContainerTooShort { len: reported }) => assert_eq!(reported, len),
                other => panic!("expected ContainerTooShort for {} bytes, got {:?}", len, other),
            }
        }
    }
}
