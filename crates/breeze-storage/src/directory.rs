// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed `DeviceDirectory`.

use async_trait::async_trait;
use breeze_core::BreezeError;
use breeze_core::traits::DeviceDirectory;
use breeze_core::types::Device;

use crate::database::Database;
use crate::queries::devices;

/// Device directory reading the local `devices` table.
#[derive(Clone)]
pub struct SqliteDeviceDirectory {
    db: Database,
}

impl SqliteDeviceDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeviceDirectory for SqliteDeviceDirectory {
    async fn get(&self, device_id: &str) -> Result<Option<Device>, BreezeError> {
        devices::get_device(&self.db, device_id).await
    }
}
