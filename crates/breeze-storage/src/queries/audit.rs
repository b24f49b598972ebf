// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit log writes.

use breeze_core::BreezeError;
use breeze_core::types::AuditEvent;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Append one audit entry.
pub async fn insert_audit(db: &Database, event: &AuditEvent, now: &str) -> Result<(), BreezeError> {
    let event = event.clone();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO audit_log (action, actor_user_id, org_id, details, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    event.action,
                    event.actor_user_id,
                    event.org_id,
                    event.details.to_string(),
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn insert_writes_one_row() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let event = AuditEvent {
            action: "session_initiated".into(),
            actor_user_id: "user-1".into(),
            org_id: "org-a".into(),
            details: serde_json::json!({"sessionId": "s1"}),
        };
        insert_audit(&db, &event, "2026-01-01T00:00:00.000Z")
            .await
            .unwrap();

        let (action, details): (String, String) = db
            .connection()
            .call(|conn| -> rusqlite::Result<(String, String)> {
                conn.query_row(
                    "SELECT action, details FROM audit_log ORDER BY id DESC LIMIT 1",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
            })
            .await
            .unwrap();
        assert_eq!(action, "session_initiated");
        assert!(details.contains("s1"));
        db.close().await.unwrap();
    }
}
