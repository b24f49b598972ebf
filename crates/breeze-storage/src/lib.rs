// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Breeze control plane.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! operations for sessions, ICE candidates, transfers, devices, and the
//! audit log. The single writer thread is what makes the admission-guarded
//! insert and the chunk counter updates atomic.

pub mod audit;
pub mod database;
pub mod directory;
pub mod migrations;
pub mod models;
pub mod queries;

pub use audit::SqliteAuditSink;
pub use database::{Database, now_rfc3339};
pub use directory::SqliteDeviceDirectory;
pub use models::{
    AdmissionOutcome, ChunkReservation, HistoryStats, Page, SessionFilter,
    SessionRecord, TransferRecord,
};
