// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express.
//! Collects all failures instead of failing fast.

use crate::diagnostic::ConfigError;
use crate::model::BreezeConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &BreezeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.chunk_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.chunk_dir must not be empty".to_string(),
        });
    }

    // A TURN host without a shared secret would advertise relay entries no
    // client could authenticate against.
    if config.turn.host.is_some() && config.turn.secret.is_none() {
        errors.push(ConfigError::Validation {
            message: "turn.host is set but turn.secret is missing".to_string(),
        });
    }

    if config.turn.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "turn.ttl_secs must be greater than zero".to_string(),
        });
    }

    if config.transfer.max_transfer_size_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "transfer.max_transfer_size_bytes must be greater than zero".to_string(),
        });
    }

    if config.server.max_sessions_per_org < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.max_sessions_per_org must be at least 1, got {}",
                config.server.max_sessions_per_org
            ),
        });
    }

    for (i, token) in config.auth.tokens.iter().enumerate() {
        if token.token.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("auth.tokens[{i}].token must not be empty"),
            });
        }
        if token.scope != "organization" && token.scope != "global" {
            errors.push(ConfigError::Validation {
                message: format!(
                    "auth.tokens[{i}].scope must be \"organization\" or \"global\", got `{}`",
                    token.scope
                ),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
