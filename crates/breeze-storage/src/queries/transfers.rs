// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transfer row operations.
//!
//! Chunk admission is the concurrency-sensitive part: `reserve_chunk` runs
//! the guard check, the per-index ledger lookup, the ceiling check, the
//! counter update, and the progress recomputation in one transaction on the
//! writer thread. Chunk ingestion for a single transfer therefore
//! serializes at the counter even when the HTTP layer races, while
//! different transfers proceed independently.

use std::str::FromStr;

use breeze_core::BreezeError;
use breeze_core::types::TransferStatus;
use rusqlite::{Row, params, params_from_iter, types::Value};

use crate::database::{Database, map_tr_err};
use crate::models::{ChunkReservation, Page, TransferRecord};

const TRANSFER_COLUMNS: &str = "id, session_id, device_id, org_id, user_id, direction, \
     remote_path, local_filename, size_bytes, bytes_received, status, \
     progress_percent, error_message, created_at, completed_at";

fn transfer_from_row(row: &Row<'_>) -> rusqlite::Result<TransferRecord> {
    let direction: String = row.get(5)?;
    let status: String = row.get(10)?;
    Ok(TransferRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        device_id: row.get(2)?,
        org_id: row.get(3)?,
        user_id: row.get(4)?,
        direction: FromStr::from_str(&direction).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        remote_path: row.get(6)?,
        local_filename: row.get(7)?,
        size_bytes: row.get(8)?,
        bytes_received: row.get(9)?,
        status: FromStr::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
        })?,
        progress_percent: row.get(11)?,
        error_message: row.get(12)?,
        created_at: row.get(13)?,
        completed_at: row.get(14)?,
    })
}

fn fetch_transfer(
    conn: &rusqlite::Connection,
    id: &str,
) -> rusqlite::Result<Option<TransferRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = ?1"
    ))?;
    match stmt.query_row(params![id], transfer_from_row) {
        Ok(rec) => Ok(Some(rec)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// `min(100, round(received / size * 100))`, or 0 for a zero-size transfer.
fn progress_percent(bytes_received: i64, size_bytes: i64) -> i64 {
    if size_bytes <= 0 {
        return 0;
    }
    let pct = (bytes_received as f64 / size_bytes as f64 * 100.0).round() as i64;
    pct.min(100)
}

/// Insert a new transfer row.
pub async fn create_transfer(db: &Database, record: &TransferRecord) -> Result<(), BreezeError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO transfers ({TRANSFER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
                ),
                params![
                    record.id,
                    record.session_id,
                    record.device_id,
                    record.org_id,
                    record.user_id,
                    record.direction.to_string(),
                    record.remote_path,
                    record.local_filename,
                    record.size_bytes,
                    record.bytes_received,
                    record.status.to_string(),
                    record.progress_percent,
                    record.error_message,
                    record.created_at,
                    record.completed_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a transfer by ID.
pub async fn get_transfer(db: &Database, id: &str) -> Result<Option<TransferRecord>, BreezeError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| fetch_transfer(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Size already on the ledger for this chunk index, if the index was seen
/// before.
fn ledgered_chunk(
    conn: &rusqlite::Connection,
    id: &str,
    chunk_index: i64,
) -> rusqlite::Result<Option<i64>> {
    match conn.query_row(
        "SELECT size_bytes FROM transfer_chunks
         WHERE transfer_id = ?1 AND chunk_index = ?2",
        params![id, chunk_index],
        |row| row.get(0),
    ) {
        Ok(size) => Ok(Some(size)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Atomically admit one chunk into the transfer's cumulative counter.
///
/// Rejects with `InvalidState` outside {pending, transferring} and with
/// `PayloadTooLarge` when the projected total would exceed `ceiling` — in
/// both cases nothing is written. A chunk index seen before replaces its
/// ledger entry rather than adding to the counter again, so a client retry
/// of an already-persisted chunk is idempotent. On success the row is
/// already marked `transferring` with its progress recomputed; the caller
/// persists the chunk bytes afterwards and triggers assembly when
/// `complete` is set.
pub async fn reserve_chunk(
    db: &Database,
    id: &str,
    chunk_index: u32,
    len: u64,
    ceiling: u64,
) -> Result<ChunkReservation, BreezeError> {
    let id = id.to_string();
    let chunk_index = chunk_index as i64;
    let len = len as i64;
    let ceiling = ceiling as i64;
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(rec) = fetch_transfer(&tx, &id)? else {
                return Ok(Err(BreezeError::not_found("transfer")));
            };
            if !rec.status.accepts_data() {
                return Ok(Err(BreezeError::InvalidState {
                    current: rec.status.to_string(),
                }));
            }
            let prior = ledgered_chunk(&tx, &id, chunk_index)?.unwrap_or(0);
            let projected = rec.bytes_received - prior + len;
            if projected > ceiling {
                return Ok(Err(BreezeError::PayloadTooLarge {
                    limit: ceiling as u64,
                }));
            }
            tx.execute(
                "INSERT INTO transfer_chunks (transfer_id, chunk_index, size_bytes)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (transfer_id, chunk_index)
                 DO UPDATE SET size_bytes = excluded.size_bytes",
                params![id, chunk_index, len],
            )?;
            let progress = progress_percent(projected, rec.size_bytes);
            tx.execute(
                "UPDATE transfers SET bytes_received = ?1, status = 'transferring',
                        progress_percent = ?2
                 WHERE id = ?3",
                params![projected, progress, id],
            )?;
            tx.commit()?;
            Ok(Ok(ChunkReservation {
                bytes_received: projected,
                size_bytes: rec.size_bytes,
                progress_percent: progress,
                complete: rec.size_bytes > 0 && projected >= rec.size_bytes,
            }))
        })
        .await
        .map_err(map_tr_err)?
}

/// Undo a reservation after a failed chunk write: drop the ledger entry
/// and take its bytes back out of the counter, so a retry of the same
/// chunk is not double-counted.
pub async fn release_chunk(db: &Database, id: &str, chunk_index: u32) -> Result<(), BreezeError> {
    let id = id.to_string();
    let chunk_index = chunk_index as i64;
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(rec) = fetch_transfer(&tx, &id)? else {
                return Ok(());
            };
            let Some(prior) = ledgered_chunk(&tx, &id, chunk_index)? else {
                return Ok(());
            };
            tx.execute(
                "DELETE FROM transfer_chunks WHERE transfer_id = ?1 AND chunk_index = ?2",
                params![id, chunk_index],
            )?;
            let reduced = (rec.bytes_received - prior).max(0);
            let progress = progress_percent(reduced, rec.size_bytes);
            tx.execute(
                "UPDATE transfers SET bytes_received = ?1, progress_percent = ?2 WHERE id = ?3",
                params![reduced, progress, id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a transfer completed: progress 100, `completed_at` stamped.
pub async fn complete_transfer(
    db: &Database,
    id: &str,
    now: &str,
) -> Result<TransferRecord, BreezeError> {
    set_terminal(db, id, TransferStatus::Completed, None, now).await
}

/// Mark a transfer failed with an error message. Terminal and non-retryable
/// for this transfer id.
pub async fn fail_transfer(
    db: &Database,
    id: &str,
    error_message: &str,
    now: &str,
) -> Result<TransferRecord, BreezeError> {
    set_terminal(db, id, TransferStatus::Failed, Some(error_message.to_string()), now).await
}

async fn set_terminal(
    db: &Database,
    id: &str,
    status: TransferStatus,
    error_message: Option<String>,
    now: &str,
) -> Result<TransferRecord, BreezeError> {
    let id = id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(rec) = fetch_transfer(&tx, &id)? else {
                return Ok(Err(BreezeError::not_found("transfer")));
            };
            if !rec.status.accepts_data() {
                return Ok(Err(BreezeError::InvalidState {
                    current: rec.status.to_string(),
                }));
            }
            let progress = match status {
                TransferStatus::Completed => 100,
                _ => rec.progress_percent,
            };
            tx.execute(
                "UPDATE transfers SET status = ?1, progress_percent = ?2,
                        error_message = ?3, completed_at = ?4
                 WHERE id = ?5",
                params![status.to_string(), progress, error_message, now, id],
            )?;
            let updated = fetch_transfer(&tx, &id)?;
            tx.commit()?;
            match updated {
                Some(rec) => Ok(Ok(rec)),
                None => Ok(Err(BreezeError::not_found("transfer"))),
            }
        })
        .await
        .map_err(map_tr_err)?
}

/// Agent-pushed progress update. Clamps progress to [0, 100]; setting a
/// terminal status stamps `completed_at`.
pub async fn update_progress(
    db: &Database,
    id: &str,
    progress: Option<i64>,
    status: Option<TransferStatus>,
    error_message: Option<String>,
    now: &str,
) -> Result<TransferRecord, BreezeError> {
    let id = id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(rec) = fetch_transfer(&tx, &id)? else {
                return Ok(Err(BreezeError::not_found("transfer")));
            };
            if !rec.status.accepts_data() {
                return Ok(Err(BreezeError::InvalidState {
                    current: rec.status.to_string(),
                }));
            }
            let new_status = status.unwrap_or(rec.status);
            let new_progress = match (progress, new_status) {
                (_, TransferStatus::Completed) => 100,
                (Some(p), _) => p.clamp(0, 100),
                (None, _) => rec.progress_percent,
            };
            let completed_at: Option<String> = if new_status.accepts_data() {
                rec.completed_at.clone()
            } else {
                Some(now.clone())
            };
            tx.execute(
                "UPDATE transfers SET status = ?1, progress_percent = ?2,
                        error_message = COALESCE(?3, error_message), completed_at = ?4
                 WHERE id = ?5",
                params![
                    new_status.to_string(),
                    new_progress,
                    error_message,
                    completed_at,
                    id
                ],
            )?;
            let updated = fetch_transfer(&tx, &id)?;
            tx.commit()?;
            match updated {
                Some(rec) => Ok(Ok(rec)),
                None => Ok(Err(BreezeError::not_found("transfer"))),
            }
        })
        .await
        .map_err(map_tr_err)?
}

/// Paginated transfer listing scoped to the given organizations.
pub async fn list_transfers(
    db: &Database,
    org_ids: Option<Vec<String>>,
    limit: i64,
    offset: i64,
) -> Result<Page<TransferRecord>, BreezeError> {
    db.connection()
        .call(move |conn| {
            let mut where_sql = String::new();
            let mut values: Vec<Value> = Vec::new();
            if let Some(orgs) = &org_ids {
                let placeholders: Vec<String> =
                    (1..=orgs.len()).map(|i| format!("?{i}")).collect();
                where_sql = format!(" WHERE org_id IN ({})", placeholders.join(", "));
                values.extend(orgs.iter().map(|o| Value::from(o.clone())));
            }
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM transfers{where_sql}"),
                params_from_iter(values.clone()),
                |row| row.get(0),
            )?;
            values.push(Value::from(limit));
            let limit_idx = values.len();
            values.push(Value::from(offset));
            let offset_idx = values.len();
            let mut stmt = conn.prepare(&format!(
                "SELECT {TRANSFER_COLUMNS} FROM transfers{where_sql}
                 ORDER BY created_at DESC LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
            ))?;
            let rows = stmt.query_map(params_from_iter(values), transfer_from_row)?;
            let mut items = Vec::new();
            for row in rows {
                items.push(row?);
            }
            Ok(Page { items, total })
        })
        .await
        .map_err(map_tr_err)
}
