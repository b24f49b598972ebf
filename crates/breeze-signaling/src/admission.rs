// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-organization admission control.
//!
//! Counts sessions holding a concurrency slot (pending, connecting,
//! active). This standalone check is advisory: the authoritative
//! enforcement happens inside `create_session_admitted`, where the count
//! and the insert share a transaction on the single writer thread, so two
//! racing creations cannot both slip under the ceiling.

use breeze_core::BreezeError;
use breeze_storage::Database;
use breeze_storage::queries::sessions;

/// Default per-organization concurrent-session ceiling.
pub const DEFAULT_MAX_CONCURRENT: i64 = 10;

/// Result of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub allowed: bool,
    pub current_count: i64,
}

/// Count concurrent sessions for `org_id` against `max_concurrent`.
pub async fn check_session_rate_limit(
    db: &Database,
    org_id: &str,
    max_concurrent: i64,
) -> Result<AdmissionDecision, BreezeError> {
    let current_count = sessions::count_concurrent(db, org_id).await?;
    Ok(AdmissionDecision {
        allowed: current_count < max_concurrent,
        current_count,
    })
}
