// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Breeze control plane.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Breeze configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with `BREEZE_*`
/// environment variable overrides. All sections default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BreezeConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// TURN credential issuance settings.
    #[serde(default)]
    pub turn: TurnConfig,

    /// File-transfer limits.
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Static API token table (stand-in for the platform auth service).
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum concurrent (pending/connecting/active) sessions per organization.
    #[serde(default = "default_max_sessions_per_org")]
    pub max_sessions_per_org: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_sessions_per_org: default_max_sessions_per_org(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8420
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_sessions_per_org() -> i64 {
    10
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory holding transfer chunk files and assembled artifacts.
    #[serde(default = "default_chunk_dir")]
    pub chunk_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            chunk_dir: default_chunk_dir(),
        }
    }
}

fn default_database_path() -> String {
    "breeze.db".to_string()
}

fn default_chunk_dir() -> String {
    "chunks".to_string()
}

/// TURN credential issuance configuration.
///
/// With no `secret` configured, TURN is omitted and only the public STUN
/// server is advertised. The `secret` must match the one configured on the
/// TURN server so it can independently validate issued credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TurnConfig {
    /// Shared secret for the time-limited REST credential scheme.
    #[serde(default)]
    pub secret: Option<String>,

    /// TURN server hostname. `None` omits TURN entries from the ICE list.
    #[serde(default)]
    pub host: Option<String>,

    /// TURN server port.
    #[serde(default = "default_turn_port")]
    pub port: u16,

    /// Realm embedded in issued usernames.
    #[serde(default = "default_turn_realm")]
    pub realm: String,

    /// Credential lifetime in seconds.
    #[serde(default = "default_turn_ttl")]
    pub ttl_secs: u64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            secret: None,
            host: None,
            port: default_turn_port(),
            realm: default_turn_realm(),
            ttl_secs: default_turn_ttl(),
        }
    }
}

fn default_turn_port() -> u16 {
    3478
}

fn default_turn_realm() -> String {
    "breeze".to_string()
}

fn default_turn_ttl() -> u64 {
    86400
}

/// File-transfer limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransferConfig {
    /// Hard ceiling on cumulative bytes per transfer.
    #[serde(default = "default_max_transfer_size")]
    pub max_transfer_size_bytes: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_transfer_size_bytes: default_max_transfer_size(),
        }
    }
}

fn default_max_transfer_size() -> u64 {
    2 * 1024 * 1024 * 1024 // 2 GiB
}

/// Static API token configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer tokens accepted by the gateway. Empty list means every
    /// request is rejected (fail-closed).
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

/// One accepted bearer token and the caller identity it resolves to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenEntry {
    /// The bearer token value.
    pub token: String,

    /// User id attributed to requests carrying this token.
    pub user_id: String,

    /// Home organization.
    pub org_id: String,

    /// Access scope: "organization" or "global".
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Extra organizations visible to an organization-scoped caller.
    #[serde(default)]
    pub accessible_org_ids: Vec<String>,
}

fn default_scope() -> String {
    "organization".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = BreezeConfig::default();
        assert_eq!(config.server.port, 8420);
        assert_eq!(config.server.max_sessions_per_org, 10);
        assert_eq!(config.turn.port, 3478);
        assert_eq!(config.turn.ttl_secs, 86400);
        assert!(config.turn.secret.is_none());
        assert_eq!(config.transfer.max_transfer_size_bytes, 2 * 1024 * 1024 * 1024);
        assert!(config.auth.tokens.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<BreezeConfig, _> =
            toml::from_str("[server]\nhots = \"0.0.0.0\"\n");
        assert!(result.is_err());
    }
}
