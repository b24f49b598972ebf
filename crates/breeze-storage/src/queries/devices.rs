// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device inventory reads (and the upsert used by enrollment tooling).

use std::str::FromStr;

use breeze_core::BreezeError;
use breeze_core::types::Device;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Get a device by ID.
pub async fn get_device(db: &Database, id: &str) -> Result<Option<Device>, BreezeError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, org_id, hostname, agent_id, status FROM devices WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                let status: String = row.get(4)?;
                Ok(Device {
                    id: row.get(0)?,
                    org_id: row.get(1)?,
                    hostname: row.get(2)?,
                    agent_id: row.get(3)?,
                    status: FromStr::from_str(&status).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                })
            });
            match result {
                Ok(device) => Ok(Some(device)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a device row.
pub async fn upsert_device(db: &Database, device: &Device) -> Result<(), BreezeError> {
    let device = device.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO devices (id, org_id, hostname, agent_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (id) DO UPDATE SET
                     org_id = excluded.org_id,
                     hostname = excluded.hostname,
                     agent_id = excluded.agent_id,
                     status = excluded.status",
                params![
                    device.id,
                    device.org_id,
                    device.hostname,
                    device.agent_id,
                    device.status.to_string(),
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
    use breeze_core::types::DeviceStatus;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_and_get_round_trips() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let device = Device {
            id: "dev-1".into(),
            org_id: "org-a".into(),
            hostname: "workstation-7".into(),
            agent_id: "agent-dev-1".into(),
            status: DeviceStatus::Online,
        };
        upsert_device(&db, &device).await.unwrap();

        let got = get_device(&db, "dev-1").await.unwrap().unwrap();
        assert_eq!(got.status, DeviceStatus::Online);
        assert_eq!(got.agent_id, "agent-dev-1");

        // Upsert flips status in place.
        let offline = Device {
            status: DeviceStatus::Offline,
            ..device
        };
        upsert_device(&db, &offline).await.unwrap();
        let got = get_device(&db, "dev-1").await.unwrap().unwrap();
        assert_eq!(got.status, DeviceStatus::Offline);

        assert!(get_device(&db, "missing").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
