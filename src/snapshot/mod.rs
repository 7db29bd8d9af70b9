//! Configuration snapshots and their on-disk container
//!
//! - `model`: the versioned [`ConfigSnapshot`]
//! - `codec`: snapshot <-> JSON plaintext payload
//! - `container`: salt || nonce || ciphertext-with-tag byte layout

pub mod codec;
pub mod container;
mod model;

pub use codec::{decode, encode};
pub use container::{join_container, split_container, ContainerParts, MIN_CONTAINER_LEN};
pub use model::{normalize_peers, ConfigSnapshot, CURRENT_SCHEMA_VERSION};
