// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Breeze control plane.

use thiserror::Error;

/// The primary error type used across the signaling and transfer subsystems.
///
/// Variants map one-to-one onto the HTTP error taxonomy: the gateway crate
/// owns the status-code mapping, everything below it speaks `BreezeError`.
#[derive(Debug, Error)]
pub enum BreezeError {
    /// The requested session, transfer, or device does not exist — or lives
    /// in an organization the caller cannot access. The two cases are
    /// deliberately indistinguishable so existence never leaks.
    #[error("{entity} not found")]
    NotFound {
        /// Entity kind for log/response context ("session", "transfer", "device").
        entity: &'static str,
    },

    /// Ownership or org-scope check failed on an object the caller can
    /// otherwise prove exists.
    #[error("access denied")]
    AccessDenied,

    /// The operation was attempted outside its lifecycle guard. Carries the
    /// current status so clients can re-render deterministically.
    #[error("invalid state: operation not allowed while status is {current}")]
    InvalidState {
        /// The entity's status at the time of rejection.
        current: String,
    },

    /// The device is known but its agent is not online.
    #[error("device is offline")]
    DeviceOffline,

    /// Per-organization concurrent-session ceiling reached.
    #[error("session limit reached: {current_count} of {max_allowed} concurrent sessions in use")]
    AdmissionRejected {
        /// Sessions counted as concurrent (pending/connecting/active) at rejection time.
        current_count: i64,
        /// The configured ceiling.
        max_allowed: i64,
    },

    /// A chunk would push cumulative bytes past the transfer size ceiling.
    /// Nothing was written.
    #[error("chunk rejected: transfer would exceed {limit} bytes")]
    PayloadTooLarge {
        /// The hard ceiling in bytes.
        limit: u64,
    },

    /// Request body failed validation (oversized SDP, bad field, missing part).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Configuration errors (missing required fields, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Agent transport or chunk-store I/O errors.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors, including expected updates that
    /// affected zero rows.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BreezeError {
    /// Shorthand for the not-found variant.
    pub fn not_found(entity: &'static str) -> Self {
        BreezeError::NotFound { entity }
    }

    /// Wrap an arbitrary error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BreezeError::Storage {
            source: Box::new(source),
        }
    }
}
