//! Snapshot payload encoding
//!
//! The plaintext inside a container is a single JSON object:
//!
//! ```text
//! {
//!   "version": 1,
//!   "timestamp": 1700000000000,
//!   "password": "",                  // "" when absent
//!   "peers": "tcp://a:1\ntls://b:2",  // newline-joined
//!   "useDefaultPeers": false,
//!   "autoStart": true,
//!   "mailAddress": "",
//!   "publicKey": "",
//!   "includesDatabase": true,
//!   "databaseData": "AAEC...",        // standard base64, only if includesDatabase
//!   "onboardingCompleted": true
//! }
//! ```
//!
//! Empty strings are the wire encoding of "absent" and never leak into
//! [`ConfigSnapshot`]. Decoding failures never say which field was wrong.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{VaultError, VaultResult};

use super::model::{normalize_peers, ConfigSnapshot, CURRENT_SCHEMA_VERSION};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    version: u32,
    timestamp: i64,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    peers: Option<String>,
    use_default_peers: bool,
    auto_start: bool,
    #[serde(default)]
    mail_address: Option<String>,
    #[serde(default)]
    public_key: Option<String>,
    #[serde(default)]
    includes_database: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_data: Option<String>,
    #[serde(default = "default_onboarding_completed")]
    onboarding_completed: bool,
}

fn default_onboarding_completed() -> bool {
    true
}

fn sentinel(value: &Option<String>) -> Option<String> {
    Some(value.clone().unwrap_or_default())
}

fn absent_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Serialize a snapshot into the plaintext payload
///
/// The payload always describes [`ConfigSnapshot::normalized`]: peers are
/// written normalised and empty optional strings as the absent sentinel.
pub fn encode(snapshot: &ConfigSnapshot) -> VaultResult<Vec<u8>> {
    let wire = WirePayload {
        version: snapshot.schema_version,
        timestamp: snapshot.created_at,
        password: sentinel(&snapshot.auth_secret),
        peers: Some(normalize_peers(&snapshot.custom_peers).join("\n")),
        use_default_peers: snapshot.use_default_peers,
        auto_start: snapshot.auto_start_enabled,
        mail_address: sentinel(&snapshot.identity_address),
        public_key: sentinel(&snapshot.identity_public_key),
        includes_database: snapshot.includes_blob(),
        database_data: snapshot.embedded_blob.as_ref().map(|b| STANDARD.encode(b)),
        onboarding_completed: snapshot.onboarding_completed,
    };

    let bytes = serde_json::to_vec(&wire)
        .map_err(|e| VaultError::Json(format!("Failed to serialize snapshot: {}", e)))?;
    debug!(
        payload_len = bytes.len(),
        includes_blob = wire.includes_database,
        "encoded snapshot payload"
    );
    Ok(bytes)
}

/// Parse a plaintext payload back into a snapshot
///
/// The version gate runs before any other field is looked at, so a newer
/// payload reports [`VaultError::UnsupportedVersion`] even if its other
/// fields changed shape.
pub fn decode(bytes: &[u8]) -> VaultResult<ConfigSnapshot> {
    let value: Value = serde_json::from_slice(bytes).map_err(|_| VaultError::MalformedPayload)?;

    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(VaultError::MalformedPayload)?;
    if version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(VaultError::UnsupportedVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    let wire: WirePayload =
        serde_json::from_value(value).map_err(|_| VaultError::MalformedPayload)?;

    let embedded_blob = match (wire.includes_database, wire.database_data) {
        (true, Some(data)) => Some(
            STANDARD
                .decode(data.as_bytes())
                .map_err(|_| VaultError::MalformedPayload)?,
        ),
        // Written by producers that found no database file to include.
        (true, None) => None,
        (false, _) => None,
    };

    let peers = wire.peers.unwrap_or_default();

    Ok(ConfigSnapshot {
        schema_version: wire.version,
        created_at: wire.timestamp,
        auth_secret: absent_if_empty(wire.password),
        custom_peers: normalize_peers(peers.split('\n')),
        use_default_peers: wire.use_default_peers,
        auto_start_enabled: wire.auto_start,
        identity_address: absent_if_empty(wire.mail_address),
        identity_public_key: absent_if_empty(wire.public_key),
        onboarding_completed: wire.onboarding_completed,
        embedded_blob,
    })
}
