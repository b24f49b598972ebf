// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./breeze.toml` > `~/.config/breeze/breeze.toml`
//! > `/etc/breeze/breeze.toml`, with environment variable overrides via the
//! `BREEZE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BreezeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/breeze/breeze.toml` (system-wide)
/// 3. `~/.config/breeze/breeze.toml` (user XDG config)
/// 4. `./breeze.toml` (local directory)
/// 5. `BREEZE_*` environment variables
pub fn load_config() -> Result<BreezeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BreezeConfig::default()))
        .merge(Toml::file("/etc/breeze/breeze.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("breeze/breeze.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("breeze.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BreezeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BreezeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BreezeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BreezeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys stay intact: `BREEZE_SERVER_MAX_SESSIONS_PER_ORG` must map to
/// `server.max_sessions_per_org`, not `server.max.sessions.per.org`.
fn env_provider() -> Env {
    Env::prefixed("BREEZE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("turn_", "turn.", 1)
            .replacen("transfer_", "transfer.", 1)
            .replacen("auth_", "auth.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_applies_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.turn.port, 3478);
    }

    #[test]
    fn load_from_str_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [server]
            port = 9000
            max_sessions_per_org = 3

            [turn]
            secret = "s3cr3t"
            host = "turn.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_sessions_per_org, 3);
        assert_eq!(config.turn.secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.turn.host.as_deref(), Some("turn.example.com"));
    }

    #[test]
    fn unknown_section_key_fails_extraction() {
        let result = load_config_from_str("[turn]\nsekret = \"oops\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breeze.toml");
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\n").unwrap();
        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn token_entries_parse() {
        let config = load_config_from_str(
            r#"
            [[auth.tokens]]
            token = "tok-1"
            user_id = "user-1"
            org_id = "org-a"

            [[auth.tokens]]
            token = "tok-2"
            user_id = "admin"
            org_id = "org-root"
            scope = "global"
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.tokens.len(), 2);
        assert_eq!(config.auth.tokens[0].scope, "organization");
        assert_eq!(config.auth.tokens[1].scope, "global");
    }
}
