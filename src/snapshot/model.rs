//! The configuration snapshot data model

use chrono::Utc;

/// Highest snapshot schema version this build reads and the one it writes
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Everything that goes into a backup, encrypted as one unit
///
/// A snapshot is transient: it is built from the live configuration store at
/// backup time, or from a decrypted container at restore time, and dropped
/// once its fields have been written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Schema version of this snapshot
    pub schema_version: u32,
    /// Creation time in epoch milliseconds (informational)
    pub created_at: i64,
    /// Account password, if one was ever configured
    pub auth_secret: Option<String>,
    /// Custom peer URIs, in user order
    pub custom_peers: Vec<String>,
    /// Use the built-in peer set instead of `custom_peers`
    pub use_default_peers: bool,
    /// Start the network service on boot
    pub auto_start_enabled: bool,
    /// Identity (mail) address derived by the network service
    pub identity_address: Option<String>,
    /// Identity public key
    pub identity_public_key: Option<String>,
    /// Whether the onboarding flow has been completed
    pub onboarding_completed: bool,
    /// Embedded database file; `Some(vec![])` means "included but empty"
    pub embedded_blob: Option<Vec<u8>>,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: 0,
            auth_secret: None,
            custom_peers: Vec::new(),
            use_default_peers: true,
            auto_start_enabled: true,
            identity_address: None,
            identity_public_key: None,
            onboarding_completed: false,
            embedded_blob: None,
        }
    }
}

impl ConfigSnapshot {
    /// Create an empty snapshot stamped with the current time
    pub fn new() -> Self {
        Self {
            created_at: Utc::now().timestamp_millis(),
            ..Default::default()
        }
    }

    /// Replace the custom peer list, normalising each entry
    pub fn with_peers<I, S>(mut self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.custom_peers = normalize_peers(peers);
        self
    }

    /// Attach an embedded blob
    pub fn with_blob(mut self, blob: impl Into<Vec<u8>>) -> Self {
        self.embedded_blob = Some(blob.into());
        self
    }

    /// Whether an embedded blob is carried (even an empty one)
    pub fn includes_blob(&self) -> bool {
        self.embedded_blob.is_some()
    }

    /// Size of the embedded blob in bytes, zero when absent
    pub fn blob_len(&self) -> usize {
        self.embedded_blob.as_ref().map_or(0, Vec::len)
    }

    /// The form this snapshot takes after a backup round trip
    ///
    /// Peers are normalised with [`normalize_peers`] and `Some("")` optional
    /// strings become `None`.
    pub fn normalized(&self) -> Self {
        Self {
            auth_secret: non_empty(&self.auth_secret),
            custom_peers: normalize_peers(&self.custom_peers),
            identity_address: non_empty(&self.identity_address),
            identity_public_key: non_empty(&self.identity_public_key),
            ..self.clone()
        }
    }

    /// Whether a backup round trip returns this snapshot unchanged
    pub fn is_normalized(&self) -> bool {
        let peers_ok = self
            .custom_peers
            .iter()
            .all(|p| !p.is_empty() && !p.contains('\n') && p.trim() == p);
        let strings_ok = [
            &self.auth_secret,
            &self.identity_address,
            &self.identity_public_key,
        ]
        .iter()
        .all(|value| value.as_deref() != Some(""));
        peers_ok && strings_ok
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

/// Normalise peer URIs: split on newlines, trim, drop blanks, keep order
///
/// Peers travel newline-joined on the wire, so only normalised lists
/// round-trip exactly.
pub fn normalize_peers<I, S>(peers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    peers
        .into_iter()
        .flat_map(|p| {
            p.as_ref()
                .split('\n')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect()
}
