// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed `AuditSink`.

use async_trait::async_trait;
use breeze_core::BreezeError;
use breeze_core::traits::AuditSink;
use breeze_core::types::AuditEvent;

use crate::database::{Database, now_rfc3339};
use crate::queries::audit as audit_queries;

/// Audit sink writing to the `audit_log` table on the shared writer
/// connection. Callers treat failures as non-fatal.
#[derive(Clone)]
pub struct SqliteAuditSink {
    db: Database,
}

impl SqliteAuditSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), BreezeError> {
        audit_queries::insert_audit(&self.db, &event, &now_rfc3339()).await
    }
}
