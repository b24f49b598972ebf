// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types and query result types for the storage layer.

use breeze_core::types::{SessionStatus, SessionType, TransferDirection, TransferStatus};
use serde::{Deserialize, Serialize};

/// A remote-access session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub device_id: String,
    pub org_id: String,
    pub user_id: String,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub webrtc_offer: Option<String>,
    pub webrtc_answer: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub duration_seconds: Option<i64>,
    pub bytes_transferred: Option<i64>,
    pub recording_url: Option<String>,
    pub created_at: String,
}

/// A file-transfer row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: String,
    pub session_id: Option<String>,
    pub device_id: String,
    pub org_id: String,
    pub user_id: String,
    pub direction: TransferDirection,
    pub remote_path: String,
    pub local_filename: String,
    pub size_bytes: i64,
    pub bytes_received: i64,
    pub status: TransferStatus,
    pub progress_percent: i64,
    pub error_message: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// Outcome of an admission-guarded session insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The session row was inserted.
    Admitted,
    /// The organization is at its concurrency ceiling; nothing was written.
    Rejected { current_count: i64 },
}

/// Result of atomically admitting one chunk into a transfer's byte counter.
#[derive(Debug, Clone, Copy)]
pub struct ChunkReservation {
    /// Cumulative bytes received including this chunk.
    pub bytes_received: i64,
    /// Declared total size from transfer creation.
    pub size_bytes: i64,
    /// Recomputed progress percentage (0..=100).
    pub progress_percent: i64,
    /// True once cumulative bytes reached the declared size (and the size
    /// is non-zero) — the caller must trigger assembly.
    pub complete: bool,
}

/// Optional filters for session listing.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub device_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub session_type: Option<SessionType>,
}

/// One page of rows plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Aggregate statistics over ended sessions.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    pub total_count: i64,
    pub total_duration_seconds: i64,
    pub total_bytes_transferred: i64,
    /// Most recently ended sessions, newest first.
    pub sessions: Vec<SessionRecord>,
}
