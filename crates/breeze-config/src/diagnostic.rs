// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic rendering for configuration errors.
//!
//! Figment parse errors and semantic validation failures are collected into
//! `ConfigError` values and rendered through miette so startup failures are
//! readable rather than a single opaque string.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error suitable for diagnostic rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to parse or merge the configuration sources.
    #[error("{message}")]
    #[diagnostic(
        code(breeze::config::parse),
        help("check breeze.toml and BREEZE_* environment variables")
    )]
    Parse {
        /// Rendered figment error, including the offending key path.
        message: String,
    },

    /// A semantic constraint failed after deserialization.
    #[error("{message}")]
    #[diagnostic(code(breeze::config::validation))]
    Validation { message: String },
}

/// Convert a figment error (which may aggregate several failures) into
/// individual diagnostics.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Render all collected errors to stderr via miette's fancy reporter.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("{:?}", miette::Report::msg(error.to_string()));
    }
    eprintln!(
        "breeze: {} configuration error{} — startup aborted",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_message() {
        let e = ConfigError::Validation {
            message: "turn.host set without turn.secret".into(),
        };
        assert!(e.to_string().contains("turn.host"));
    }
}
