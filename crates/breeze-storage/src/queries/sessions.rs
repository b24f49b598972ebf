// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session row operations: admission-guarded insert, guarded transitions,
//! ICE candidate append, listing, history, and stale cleanup.
//!
//! Guard lists are passed in by the signaling crate's transition table so
//! the set of legal source states lives in exactly one place. Every guarded
//! mutation is a conditional write; a zero-row update is re-read inside the
//! same closure to report either `NotFound` or `InvalidState` with the
//! current status.

use std::str::FromStr;

use breeze_core::BreezeError;
use breeze_core::types::{IceCandidate, SessionStatus};
use rusqlite::{Row, params, params_from_iter, types::Value};

use crate::database::{Database, map_tr_err};
use crate::models::{AdmissionOutcome, HistoryStats, Page, SessionFilter, SessionRecord};

const SESSION_COLUMNS: &str = "id, device_id, org_id, user_id, session_type, status, \
     webrtc_offer, webrtc_answer, started_at, ended_at, duration_seconds, \
     bytes_transferred, recording_url, created_at";

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let session_type: String = row.get(4)?;
    let status: String = row.get(5)?;
    Ok(SessionRecord {
        id: row.get(0)?,
        device_id: row.get(1)?,
        org_id: row.get(2)?,
        user_id: row.get(3)?,
        session_type: FromStr::from_str(&session_type).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        status: FromStr::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        webrtc_offer: row.get(6)?,
        webrtc_answer: row.get(7)?,
        started_at: row.get(8)?,
        ended_at: row.get(9)?,
        duration_seconds: row.get(10)?,
        bytes_transferred: row.get(11)?,
        recording_url: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn fetch_session(
    conn: &rusqlite::Connection,
    id: &str,
) -> rusqlite::Result<Option<SessionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
    ))?;
    match stmt.query_row(params![id], session_from_row) {
        Ok(rec) => Ok(Some(rec)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Render a guard list as a SQL IN set. Values come from the status enum's
/// Display impl, never from user input.
fn status_set(allowed: &[SessionStatus]) -> String {
    let quoted: Vec<String> = allowed.iter().map(|s| format!("'{s}'")).collect();
    format!("({})", quoted.join(", "))
}

/// Whole seconds between two RFC3339 timestamps written by this module,
/// rounded and clamped at zero.
fn elapsed_secs(from: &str, to: &str) -> i64 {
    let parse = |s: &str| chrono::DateTime::parse_from_rfc3339(s).ok();
    match (parse(from), parse(to)) {
        (Some(a), Some(b)) => {
            let millis = (b - a).num_milliseconds().max(0);
            ((millis as f64) / 1000.0).round() as i64
        }
        _ => 0,
    }
}

/// Guarded-mutation result carried out of the writer closure.
enum Mutation {
    Updated(SessionRecord),
    Missing,
    Guard(String),
}

fn mutation_to_result(m: Mutation) -> Result<SessionRecord, BreezeError> {
    match m {
        Mutation::Updated(rec) => Ok(rec),
        Mutation::Missing => Err(BreezeError::not_found("session")),
        Mutation::Guard(current) => Err(BreezeError::InvalidState { current }),
    }
}

/// Count sessions holding a concurrency slot for the organization.
pub async fn count_concurrent(db: &Database, org_id: &str) -> Result<i64, BreezeError> {
    let org_id = org_id.to_string();
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM sessions
                 WHERE org_id = ?1 AND status IN ('pending', 'connecting', 'active')",
                params![org_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new pending session, but only if the organization is below its
/// concurrency ceiling.
///
/// The count and the insert run in one transaction on the writer thread,
/// so two racing creations serialize and the loser observes the committed
/// count — the check-then-act window is closed here, not documented away.
pub async fn create_session_admitted(
    db: &Database,
    record: &SessionRecord,
    max_concurrent: i64,
) -> Result<AdmissionOutcome, BreezeError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let current: i64 = tx.query_row(
                "SELECT COUNT(*) FROM sessions
                 WHERE org_id = ?1 AND status IN ('pending', 'connecting', 'active')",
                params![record.org_id],
                |row| row.get(0),
            )?;
            if current >= max_concurrent {
                tx.commit()?;
                return Ok(AdmissionOutcome::Rejected {
                    current_count: current,
                });
            }
            tx.execute(
                "INSERT INTO sessions (id, device_id, org_id, user_id, session_type, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.device_id,
                    record.org_id,
                    record.user_id,
                    record.session_type.to_string(),
                    record.status.to_string(),
                    record.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(AdmissionOutcome::Admitted)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<SessionRecord>, BreezeError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| fetch_session(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Store the SDP offer and move the session to `connecting`, provided the
/// current status is in `allowed`.
pub async fn set_offer(
    db: &Database,
    id: &str,
    sdp: &str,
    allowed: &[SessionStatus],
) -> Result<SessionRecord, BreezeError> {
    let id = id.to_string();
    let sdp = sdp.to_string();
    let guard = status_set(allowed);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE sessions SET webrtc_offer = ?1, status = 'connecting'
                     WHERE id = ?2 AND status IN {guard}"
                ),
                params![sdp, id],
            )?;
            if changed == 0 {
                return Ok(match fetch_session(conn, &id)? {
                    Some(rec) => Mutation::Guard(rec.status.to_string()),
                    None => Mutation::Missing,
                });
            }
            match fetch_session(conn, &id)? {
                Some(rec) => Ok(Mutation::Updated(rec)),
                None => Ok(Mutation::Missing),
            }
        })
        .await
        .map_err(map_tr_err)
        .and_then(mutation_to_result)
}

/// Store the SDP answer, move the session to `active`, and stamp
/// `started_at` exactly once.
pub async fn set_answer(
    db: &Database,
    id: &str,
    sdp: &str,
    now: &str,
    allowed: &[SessionStatus],
) -> Result<SessionRecord, BreezeError> {
    let id = id.to_string();
    let sdp = sdp.to_string();
    let now = now.to_string();
    let guard = status_set(allowed);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE sessions SET webrtc_answer = ?1, status = 'active',
                            started_at = COALESCE(started_at, ?2)
                     WHERE id = ?3 AND status IN {guard}"
                ),
                params![sdp, now, id],
            )?;
            if changed == 0 {
                return Ok(match fetch_session(conn, &id)? {
                    Some(rec) => Mutation::Guard(rec.status.to_string()),
                    None => Mutation::Missing,
                });
            }
            match fetch_session(conn, &id)? {
                Some(rec) => Ok(Mutation::Updated(rec)),
                None => Ok(Mutation::Missing),
            }
        })
        .await
        .map_err(map_tr_err)
        .and_then(mutation_to_result)
}

/// Append one ICE candidate; returns the new candidate count.
///
/// The guard check, the next-sequence computation, and the insert share one
/// transaction, so concurrent appends serialize with gap-free ordering.
pub async fn append_ice_candidate(
    db: &Database,
    session_id: &str,
    candidate: &IceCandidate,
    now: &str,
    allowed: &[SessionStatus],
) -> Result<i64, BreezeError> {
    let session_id = session_id.to_string();
    let candidate = candidate.clone();
    let now = now.to_string();
    let allowed = allowed.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let status: Option<String> = match tx.query_row(
                "SELECT status FROM sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            ) {
                Ok(s) => Some(s),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            };
            let Some(status) = status else {
                return Ok(Err(None));
            };
            let parsed = SessionStatus::from_str(&status).ok();
            if !parsed.is_some_and(|s| allowed.contains(&s)) {
                return Ok(Err(Some(status)));
            }
            let next_seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq) + 1, 0) FROM ice_candidates WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO ice_candidates
                     (session_id, seq, candidate, sdp_mid, sdp_mline_index, username_fragment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    session_id,
                    next_seq,
                    candidate.candidate,
                    candidate.sdp_mid,
                    candidate.sdp_mline_index,
                    candidate.username_fragment,
                    now,
                ],
            )?;
            tx.commit()?;
            Ok(Ok(next_seq + 1))
        })
        .await
        .map_err(map_tr_err)?
        .map_err(|current| match current {
            Some(current) => BreezeError::InvalidState { current },
            None => BreezeError::not_found("session"),
        })
}

/// All candidates for a session in append order.
pub async fn get_ice_candidates(
    db: &Database,
    session_id: &str,
) -> Result<Vec<IceCandidate>, BreezeError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT candidate, sdp_mid, sdp_mline_index, username_fragment
                 FROM ice_candidates WHERE session_id = ?1 ORDER BY seq ASC",
            )?;
            let rows = stmt.query_map(params![session_id], |row| {
                Ok(IceCandidate {
                    candidate: row.get(0)?,
                    sdp_mid: row.get(1)?,
                    sdp_mline_index: row.get(2)?,
                    username_fragment: row.get(3)?,
                })
            })?;
            let mut candidates = Vec::new();
            for row in rows {
                candidates.push(row?);
            }
            Ok(candidates)
        })
        .await
        .map_err(map_tr_err)
}

/// Terminate a session: set `disconnected`, stamp `ended_at` once, compute
/// the rounded duration, and persist the optional byte count/recording URL.
pub async fn end_session(
    db: &Database,
    id: &str,
    bytes_transferred: Option<i64>,
    recording_url: Option<String>,
    now: &str,
) -> Result<SessionRecord, BreezeError> {
    let id = id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(rec) = fetch_session(&tx, &id)? else {
                return Ok(Mutation::Missing);
            };
            if rec.status.is_terminal() {
                return Ok(Mutation::Guard(rec.status.to_string()));
            }
            let basis = rec.started_at.as_deref().unwrap_or(&rec.created_at);
            let duration = elapsed_secs(basis, &now);
            tx.execute(
                "UPDATE sessions SET status = 'disconnected', ended_at = ?1,
                        duration_seconds = ?2,
                        bytes_transferred = COALESCE(?3, bytes_transferred),
                        recording_url = COALESCE(?4, recording_url)
                 WHERE id = ?5",
                params![now, duration, bytes_transferred, recording_url, id],
            )?;
            let updated = fetch_session(&tx, &id)?;
            tx.commit()?;
            match updated {
                Some(rec) => Ok(Mutation::Updated(rec)),
                None => Ok(Mutation::Missing),
            }
        })
        .await
        .map_err(map_tr_err)
        .and_then(mutation_to_result)
}

/// Bulk-disconnect every non-terminal session visible to the scope.
/// Returns the affected session ids.
pub async fn cleanup_stale(
    db: &Database,
    org_ids: Option<Vec<String>>,
    now: &str,
) -> Result<Vec<String>, BreezeError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut sql = format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE status IN ('pending', 'connecting', 'active')"
            );
            let mut values: Vec<Value> = Vec::new();
            if let Some(orgs) = &org_ids {
                let placeholders: Vec<String> =
                    (1..=orgs.len()).map(|i| format!("?{i}")).collect();
                sql.push_str(&format!(" AND org_id IN ({})", placeholders.join(", ")));
                values.extend(orgs.iter().map(|o| Value::from(o.clone())));
            }
            let stale: Vec<SessionRecord> = {
                let mut stmt = tx.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(values), session_from_row)?;
                let mut found = Vec::new();
                for row in rows {
                    found.push(row?);
                }
                found
            };
            let mut ids = Vec::with_capacity(stale.len());
            for rec in &stale {
                let basis = rec.started_at.as_deref().unwrap_or(&rec.created_at);
                let duration = elapsed_secs(basis, &now);
                tx.execute(
                    "UPDATE sessions SET status = 'disconnected', ended_at = ?1,
                            duration_seconds = ?2
                     WHERE id = ?3",
                    params![now, duration, rec.id],
                )?;
                ids.push(rec.id.clone());
            }
            tx.commit()?;
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}

/// Paginated, filterable session listing scoped to the given organizations
/// (`None` = global caller).
pub async fn list_sessions(
    db: &Database,
    org_ids: Option<Vec<String>>,
    filter: SessionFilter,
    limit: i64,
    offset: i64,
) -> Result<Page<SessionRecord>, BreezeError> {
    db.connection()
        .call(move |conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut values: Vec<Value> = Vec::new();
            if let Some(orgs) = &org_ids {
                let placeholders: Vec<String> = (values.len() + 1..=values.len() + orgs.len())
                    .map(|i| format!("?{i}"))
                    .collect();
                clauses.push(format!("org_id IN ({})", placeholders.join(", ")));
                values.extend(orgs.iter().map(|o| Value::from(o.clone())));
            }
            if let Some(device_id) = &filter.device_id {
                values.push(Value::from(device_id.clone()));
                clauses.push(format!("device_id = ?{}", values.len()));
            }
            if let Some(status) = filter.status {
                values.push(Value::from(status.to_string()));
                clauses.push(format!("status = ?{}", values.len()));
            }
            if let Some(session_type) = filter.session_type {
                values.push(Value::from(session_type.to_string()));
                clauses.push(format!("session_type = ?{}", values.len()));
            }
            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM sessions{where_sql}"),
                params_from_iter(values.clone()),
                |row| row.get(0),
            )?;

            values.push(Value::from(limit));
            let limit_idx = values.len();
            values.push(Value::from(offset));
            let offset_idx = values.len();
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions{where_sql}
                 ORDER BY created_at DESC LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
            ))?;
            let rows = stmt.query_map(params_from_iter(values), session_from_row)?;
            let mut items = Vec::new();
            for row in rows {
                items.push(row?);
            }
            Ok(Page { items, total })
        })
        .await
        .map_err(map_tr_err)
}

/// Aggregate stats plus the most recently ended sessions.
pub async fn history_stats(
    db: &Database,
    org_ids: Option<Vec<String>>,
    limit: i64,
) -> Result<HistoryStats, BreezeError> {
    db.connection()
        .call(move |conn| {
            let mut where_sql =
                "WHERE status IN ('disconnected', 'failed') AND ended_at IS NOT NULL".to_string();
            let mut values: Vec<Value> = Vec::new();
            if let Some(orgs) = &org_ids {
                let placeholders: Vec<String> =
                    (1..=orgs.len()).map(|i| format!("?{i}")).collect();
                where_sql.push_str(&format!(" AND org_id IN ({})", placeholders.join(", ")));
                values.extend(orgs.iter().map(|o| Value::from(o.clone())));
            }

            let (total_count, total_duration_seconds, total_bytes_transferred): (i64, i64, i64) =
                conn.query_row(
                    &format!(
                        "SELECT COUNT(*), COALESCE(SUM(duration_seconds), 0),
                                COALESCE(SUM(bytes_transferred), 0)
                         FROM sessions {where_sql}"
                    ),
                    params_from_iter(values.clone()),
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )?;

            values.push(Value::from(limit));
            let limit_idx = values.len();
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions {where_sql}
                 ORDER BY ended_at DESC LIMIT ?{limit_idx}"
            ))?;
            let rows = stmt.query_map(params_from_iter(values), session_from_row)?;
            let mut sessions = Vec::new();
            for row in rows {
                sessions.push(row?);
            }
            Ok(HistoryStats {
                total_count,
                total_duration_seconds,
                total_bytes_transferred,
                sessions,
            })
        })
        .await
        .map_err(map_tr_err)
}
