// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The `Database` struct IS the single writer: every query module
//! accepts `&Database` and runs its closure on that thread, which is what
//! makes the admission count-then-insert and the chunk counter updates
//! atomic without extra locking. Do NOT create additional `Connection`
//! instances for writes.

use breeze_core::BreezeError;
use tokio_rusqlite::Connection;

use crate::migrations;

/// Handle to the single-writer SQLite database.
///
/// Cloning is cheap and shares the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, BreezeError> {
        let conn = Connection::open(path).await.map_err(|e| BreezeError::Storage {
            source: Box::new(e),
        })?;
        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            // Refinery errors are not rusqlite errors; carry them out
            // through the inner result like the query modules do.
            Ok(migrations::run_migrations(conn).map_err(|e| BreezeError::Storage {
                source: Box::new(e),
            }))
        })
        .await
        .map_err(map_tr_err)??;
        Ok(Self { conn })
    }

    /// Access the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the database, flushing WAL.
    pub async fn close(&self) -> Result<(), BreezeError> {
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| BreezeError::Storage {
                source: Box::new(e),
            })
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> BreezeError {
    BreezeError::Storage {
        source: Box::new(e),
    }
}

/// Current UTC timestamp in the RFC3339 millisecond format used across all
/// tables (`2026-01-01T00:00:00.000Z`).
pub fn now_rfc3339() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
