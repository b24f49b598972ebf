// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transfer orchestration.
//!
//! `TransferManager` owns the transfer protocol: creation against an online
//! device, serialized chunk ingestion with ceiling enforcement, assembly on
//! completion, cancellation, agent progress pushes, and streamed download.
//! The byte counter in the transfer row is authoritative; the chunk store
//! only holds bytes.

use std::sync::Arc;

use breeze_core::BreezeError;
use breeze_core::traits::{AgentTransport, AuditSink, ChunkStore, ChunkStream, DeviceDirectory};
use breeze_core::types::{
    AccessScope, AgentCommand, AuditEvent, AuthContext, Device, DeviceStatus, SessionStatus,
    TransferDirection, TransferStatus, commands,
};
use breeze_storage::queries::{sessions, transfers};
use breeze_storage::{Database, Page, TransferRecord, now_rfc3339};
use uuid::Uuid;

/// Request to create a transfer.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub device_id: String,
    /// Optional parent session; must be active and owned by the caller.
    pub session_id: Option<String>,
    pub direction: TransferDirection,
    pub remote_path: String,
    pub local_filename: String,
    /// Declared total size in bytes.
    pub size_bytes: i64,
}

pub struct TransferManager {
    db: Database,
    devices: Arc<dyn DeviceDirectory>,
    transport: Arc<dyn AgentTransport>,
    store: Arc<dyn ChunkStore>,
    audit: Arc<dyn AuditSink>,
    /// Hard ceiling on cumulative bytes per transfer.
    max_transfer_size_bytes: u64,
}

impl TransferManager {
    pub fn new(
        db: Database,
        devices: Arc<dyn DeviceDirectory>,
        transport: Arc<dyn AgentTransport>,
        store: Arc<dyn ChunkStore>,
        audit: Arc<dyn AuditSink>,
        max_transfer_size_bytes: u64,
    ) -> Self {
        Self {
            db,
            devices,
            transport,
            store,
            audit,
            max_transfer_size_bytes,
        }
    }

    /// Create a transfer against an online, in-scope device and notify its
    /// agent best effort.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        req: NewTransfer,
    ) -> Result<TransferRecord, BreezeError> {
        if req.remote_path.trim().is_empty() {
            return Err(BreezeError::Validation(
                "remote_path must not be empty".to_string(),
            ));
        }
        if req.local_filename.trim().is_empty() {
            return Err(BreezeError::Validation(
                "local_filename must not be empty".to_string(),
            ));
        }
        if req.size_bytes < 0 {
            return Err(BreezeError::Validation(
                "size_bytes must not be negative".to_string(),
            ));
        }
        if req.size_bytes as u64 > self.max_transfer_size_bytes {
            return Err(BreezeError::PayloadTooLarge {
                limit: self.max_transfer_size_bytes,
            });
        }

        let device = self.visible_device(ctx, &req.device_id).await?;
        if device.status != DeviceStatus::Online {
            return Err(BreezeError::DeviceOffline);
        }

        if let Some(session_id) = &req.session_id {
            let session = sessions::get_session(&self.db, session_id)
                .await?
                .ok_or_else(|| BreezeError::not_found("session"))?;
            if !ctx.can_access_org(&session.org_id) {
                return Err(BreezeError::not_found("session"));
            }
            if session.status != SessionStatus::Active {
                return Err(BreezeError::InvalidState {
                    current: session.status.to_string(),
                });
            }
        }

        let record = TransferRecord {
            id: Uuid::new_v4().to_string(),
            session_id: req.session_id,
            device_id: device.id.clone(),
            org_id: device.org_id.clone(),
            user_id: ctx.user_id.clone(),
            direction: req.direction,
            remote_path: req.remote_path,
            local_filename: req.local_filename,
            size_bytes: req.size_bytes,
            bytes_received: 0,
            status: TransferStatus::Pending,
            progress_percent: 0,
            error_message: None,
            created_at: now_rfc3339(),
            completed_at: None,
        };
        transfers::create_transfer(&self.db, &record).await?;

        let command = AgentCommand {
            command: commands::FILE_TRANSFER.to_string(),
            payload: serde_json::json!({
                "transferId": record.id,
                "direction": record.direction,
                "remotePath": record.remote_path,
                "fileName": record.local_filename,
                "sizeBytes": record.size_bytes,
            }),
        };
        if !self.transport.notify(&device.agent_id, command).await {
            tracing::debug!(
                transfer_id = %record.id,
                agent_id = %device.agent_id,
                "agent unreachable, transfer command not delivered"
            );
        }

        tracing::info!(
            transfer_id = %record.id,
            device_id = %device.id,
            direction = %record.direction,
            size_bytes = record.size_bytes,
            "transfer created"
        );
        self.audit_best_effort(AuditEvent {
            action: "transfer_created".to_string(),
            actor_user_id: ctx.user_id.clone(),
            org_id: record.org_id.clone(),
            details: serde_json::json!({
                "transferId": record.id,
                "deviceId": record.device_id,
                "direction": record.direction,
                "sizeBytes": record.size_bytes,
            }),
        })
        .await;
        Ok(record)
    }

    /// Fetch a transfer, with out-of-scope rows masked as missing.
    pub async fn get(&self, ctx: &AuthContext, id: &str) -> Result<TransferRecord, BreezeError> {
        self.visible_transfer(ctx, id).await
    }

    /// Paginated listing restricted to the caller's visible organizations.
    pub async fn list(
        &self,
        ctx: &AuthContext,
        limit: i64,
        offset: i64,
    ) -> Result<Page<TransferRecord>, BreezeError> {
        transfers::list_transfers(&self.db, ctx.visible_org_ids(), limit, offset).await
    }

    /// Ingest one chunk.
    ///
    /// The byte counter is reserved first inside a storage transaction, so
    /// racing chunks for one transfer serialize and the ceiling cannot be
    /// overshot. A retried chunk index replaces its earlier bytes rather
    /// than counting twice. A failed disk write releases the reservation
    /// and fails the transfer; reaching the declared size triggers
    /// assembly.
    pub async fn ingest_chunk(
        &self,
        ctx: &AuthContext,
        id: &str,
        index: u32,
        bytes: &[u8],
    ) -> Result<TransferRecord, BreezeError> {
        if bytes.is_empty() {
            return Err(BreezeError::Validation("chunk must not be empty".to_string()));
        }
        let transfer = self.owned_transfer(ctx, id).await?;
        if transfer.direction != TransferDirection::Upload {
            return Err(BreezeError::Validation(
                "chunks are only accepted for upload transfers".to_string(),
            ));
        }

        let reservation = transfers::reserve_chunk(
            &self.db,
            id,
            index,
            bytes.len() as u64,
            self.max_transfer_size_bytes,
        )
        .await?;

        if let Err(err) = self.store.save(id, index, bytes).await {
            transfers::release_chunk(&self.db, id, index).await?;
            let failed =
                transfers::fail_transfer(&self.db, id, "chunk write failed", &now_rfc3339())
                    .await?;
            tracing::error!(transfer_id = %id, %err, "chunk write failed, transfer failed");
            self.audit_transfer_failed(ctx, &failed).await;
            return Err(err);
        }

        if reservation.complete {
            return self.finish_assembly(ctx, id).await;
        }
        self.visible_transfer(ctx, id).await
    }

    async fn finish_assembly(
        &self,
        ctx: &AuthContext,
        id: &str,
    ) -> Result<TransferRecord, BreezeError> {
        match self.store.assemble(id).await {
            Ok(size) => {
                let completed = transfers::complete_transfer(&self.db, id, &now_rfc3339()).await?;
                tracing::info!(transfer_id = %id, size, "transfer assembled and completed");
                self.audit_best_effort(AuditEvent {
                    action: "transfer_completed".to_string(),
                    actor_user_id: ctx.user_id.clone(),
                    org_id: completed.org_id.clone(),
                    details: serde_json::json!({
                        "transferId": completed.id,
                        "sizeBytes": size,
                    }),
                })
                .await;
                Ok(completed)
            }
            Err(err) => {
                // Assembly failure is recorded on the transfer itself, not
                // thrown at the last chunk's request. The caller sees the
                // resulting failed status.
                let failed = transfers::fail_transfer(
                    &self.db,
                    id,
                    &format!("assembly failed: {err}"),
                    &now_rfc3339(),
                )
                .await?;
                tracing::error!(transfer_id = %id, %err, "assembly failed");
                self.audit_transfer_failed(ctx, &failed).await;
                Ok(failed)
            }
        }
    }

    /// Cancel an in-flight transfer and tell the agent to stop best effort.
    pub async fn cancel(&self, ctx: &AuthContext, id: &str) -> Result<TransferRecord, BreezeError> {
        let transfer = self.owned_transfer(ctx, id).await?;
        let cancelled =
            transfers::fail_transfer(&self.db, id, "Cancelled by user", &now_rfc3339()).await?;

        if let Some(device) = self.devices.get(&transfer.device_id).await? {
            let command = AgentCommand {
                command: commands::CANCEL_TRANSFER.to_string(),
                payload: serde_json::json!({ "transferId": id }),
            };
            self.transport.notify(&device.agent_id, command).await;
        }

        tracing::info!(transfer_id = %id, "transfer cancelled");
        self.audit_transfer_failed(ctx, &cancelled).await;
        Ok(cancelled)
    }

    /// Agent-pushed progress update.
    pub async fn update_progress(
        &self,
        ctx: &AuthContext,
        id: &str,
        progress: Option<i64>,
        status: Option<TransferStatus>,
        error_message: Option<String>,
    ) -> Result<TransferRecord, BreezeError> {
        if status == Some(TransferStatus::Pending) {
            return Err(BreezeError::Validation(
                "status cannot move back to pending".to_string(),
            ));
        }
        self.owned_transfer(ctx, id).await?;
        let updated =
            transfers::update_progress(&self.db, id, progress, status, error_message, &now_rfc3339())
                .await?;
        match updated.status {
            TransferStatus::Completed => {
                self.audit_best_effort(AuditEvent {
                    action: "transfer_completed".to_string(),
                    actor_user_id: ctx.user_id.clone(),
                    org_id: updated.org_id.clone(),
                    details: serde_json::json!({ "transferId": updated.id }),
                })
                .await;
            }
            TransferStatus::Failed => self.audit_transfer_failed(ctx, &updated).await,
            _ => {}
        }
        Ok(updated)
    }

    /// Open the assembled artifact for streaming. Only completed uploads
    /// have an artifact to download.
    pub async fn download(
        &self,
        ctx: &AuthContext,
        id: &str,
    ) -> Result<(TransferRecord, ChunkStream), BreezeError> {
        let transfer = self.visible_transfer(ctx, id).await?;
        if transfer.direction != TransferDirection::Upload {
            return Err(BreezeError::Validation(
                "only upload transfers can be downloaded".to_string(),
            ));
        }
        if transfer.status != TransferStatus::Completed {
            return Err(BreezeError::InvalidState {
                current: transfer.status.to_string(),
            });
        }
        let stream = self.store.stream(id).await?;
        Ok((transfer, stream))
    }

    async fn visible_device(
        &self,
        ctx: &AuthContext,
        device_id: &str,
    ) -> Result<Device, BreezeError> {
        let device = self
            .devices
            .get(device_id)
            .await?
            .ok_or_else(|| BreezeError::not_found("device"))?;
        if !ctx.can_access_org(&device.org_id) {
            return Err(BreezeError::not_found("device"));
        }
        Ok(device)
    }

    async fn visible_transfer(
        &self,
        ctx: &AuthContext,
        id: &str,
    ) -> Result<TransferRecord, BreezeError> {
        let transfer = transfers::get_transfer(&self.db, id)
            .await?
            .ok_or_else(|| BreezeError::not_found("transfer"))?;
        if !ctx.can_access_org(&transfer.org_id) {
            return Err(BreezeError::not_found("transfer"));
        }
        Ok(transfer)
    }

    /// Mutations require ownership within an organization scope.
    async fn owned_transfer(
        &self,
        ctx: &AuthContext,
        id: &str,
    ) -> Result<TransferRecord, BreezeError> {
        let transfer = self.visible_transfer(ctx, id).await?;
        if ctx.scope == AccessScope::Organization && transfer.user_id != ctx.user_id {
            return Err(BreezeError::AccessDenied);
        }
        Ok(transfer)
    }

    async fn audit_transfer_failed(&self, ctx: &AuthContext, transfer: &TransferRecord) {
        self.audit_best_effort(AuditEvent {
            action: "transfer_failed".to_string(),
            actor_user_id: ctx.user_id.clone(),
            org_id: transfer.org_id.clone(),
            details: serde_json::json!({
                "transferId": transfer.id,
                "errorMessage": transfer.error_message,
            }),
        })
        .await;
    }

    async fn audit_best_effort(&self, event: AuditEvent) {
        let action = event.action.clone();
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(%action, %err, "audit write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_store::FsChunkStore;
    use async_trait::async_trait;
    use tempfile::tempdir;
    use tokio::io::AsyncReadExt;
    use tokio::sync::Mutex;

    struct StaticDirectory {
        devices: Vec<Device>,
    }

    #[async_trait]
    impl DeviceDirectory for StaticDirectory {
        async fn get(&self, device_id: &str) -> Result<Option<Device>, BreezeError> {
            Ok(self.devices.iter().find(|d| d.id == device_id).cloned())
        }
    }

    struct RecordingTransport {
        sent: Mutex<Vec<(String, AgentCommand)>>,
    }

    #[async_trait]
    impl AgentTransport for RecordingTransport {
        async fn notify(&self, agent_id: &str, command: AgentCommand) -> bool {
            self.sent
                .lock()
                .await
                .push((agent_id.to_string(), command));
            true
        }
    }

    struct RecordingAudit {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditSink for RecordingAudit {
        async fn record(&self, event: AuditEvent) -> Result<(), BreezeError> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    struct Harness {
        manager: TransferManager,
        transport: Arc<RecordingTransport>,
        audit: Arc<RecordingAudit>,
        _dir: tempfile::TempDir,
    }

    async fn harness(ceiling: u64) -> Harness {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let devices = vec![
            Device {
                id: "dev-a".into(),
                org_id: "org-a".into(),
                hostname: "ws-1".into(),
                agent_id: "agent-a".into(),
                status: DeviceStatus::Online,
            },
            Device {
                id: "dev-a-offline".into(),
                org_id: "org-a".into(),
                hostname: "ws-2".into(),
                agent_id: "agent-a2".into(),
                status: DeviceStatus::Offline,
            },
        ];
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
        });
        let audit = Arc::new(RecordingAudit {
            events: Mutex::new(Vec::new()),
        });
        let manager = TransferManager::new(
            db,
            Arc::new(StaticDirectory { devices }),
            transport.clone(),
            Arc::new(FsChunkStore::new(dir.path().join("chunks"))),
            audit.clone(),
            ceiling,
        );
        Harness {
            manager,
            transport,
            audit,
            _dir: dir,
        }
    }

    fn org_user(user: &str, org: &str) -> AuthContext {
        AuthContext {
            user_id: user.into(),
            org_id: org.into(),
            scope: AccessScope::Organization,
            accessible_org_ids: vec![],
        }
    }

    fn upload(device_id: &str, size: i64) -> NewTransfer {
        NewTransfer {
            device_id: device_id.into(),
            session_id: None,
            direction: TransferDirection::Upload,
            remote_path: "/home/user/report.pdf".into(),
            local_filename: "report.pdf".into(),
            size_bytes: size,
        }
    }

    #[tokio::test]
    async fn upload_completes_and_downloads() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");

        let transfer = h.manager.create(&ctx, upload("dev-a", 12)).await.unwrap();
        assert_eq!(transfer.status, TransferStatus::Pending);
        {
            let sent = h.transport.sent.lock().await;
            assert_eq!(sent[0].1.command, "file_transfer");
            assert_eq!(sent[0].1.payload["transferId"], transfer.id);
        }

        let partial = h
            .manager
            .ingest_chunk(&ctx, &transfer.id, 0, b"hello, ")
            .await
            .unwrap();
        assert_eq!(partial.status, TransferStatus::Transferring);
        assert_eq!(partial.bytes_received, 7);
        assert_eq!(partial.progress_percent, 58);

        let done = h
            .manager
            .ingest_chunk(&ctx, &transfer.id, 1, b"world")
            .await
            .unwrap();
        assert_eq!(done.status, TransferStatus::Completed);
        assert_eq!(done.progress_percent, 100);
        assert!(done.completed_at.is_some());

        let (rec, mut stream) = h.manager.download(&ctx, &transfer.id).await.unwrap();
        assert_eq!(rec.local_filename, "report.pdf");
        assert_eq!(stream.len, 12);
        let mut body = String::new();
        stream.reader.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "hello, world");

        let actions: Vec<String> = h
            .audit
            .events
            .lock()
            .await
            .iter()
            .map(|e| e.action.clone())
            .collect();
        assert_eq!(actions, vec!["transfer_created", "transfer_completed"]);
    }

    #[tokio::test]
    async fn ceiling_rejects_chunk_without_side_effects() {
        let h = harness(10).await;
        let ctx = org_user("user-1", "org-a");
        let transfer = h.manager.create(&ctx, upload("dev-a", 10)).await.unwrap();
        h.manager
            .ingest_chunk(&ctx, &transfer.id, 0, b"12345678")
            .await
            .unwrap();

        let err = h
            .manager
            .ingest_chunk(&ctx, &transfer.id, 1, b"456")
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::PayloadTooLarge { limit: 10 }));

        let rec = h.manager.get(&ctx, &transfer.id).await.unwrap();
        assert_eq!(rec.bytes_received, 8);
        assert_eq!(rec.status, TransferStatus::Transferring);
    }

    #[tokio::test]
    async fn retried_chunk_does_not_complete_early() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");
        let transfer = h.manager.create(&ctx, upload("dev-a", 12)).await.unwrap();

        h.manager
            .ingest_chunk(&ctx, &transfer.id, 0, b"hello, ")
            .await
            .unwrap();
        // The client times out and resends chunk 0. The counter must not
        // move and the transfer must stay incomplete.
        let rec = h
            .manager
            .ingest_chunk(&ctx, &transfer.id, 0, b"hello, ")
            .await
            .unwrap();
        assert_eq!(rec.status, TransferStatus::Transferring);
        assert_eq!(rec.bytes_received, 7);
        assert_eq!(rec.progress_percent, 58);

        let done = h
            .manager
            .ingest_chunk(&ctx, &transfer.id, 1, b"world")
            .await
            .unwrap();
        assert_eq!(done.status, TransferStatus::Completed);
        assert_eq!(done.bytes_received, 12);

        let (_, mut stream) = h.manager.download(&ctx, &transfer.id).await.unwrap();
        assert_eq!(stream.len, 12);
        let mut body = String::new();
        stream.reader.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "hello, world");
    }

    #[tokio::test]
    async fn zero_size_declaration_is_accepted() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");
        let rec = h.manager.create(&ctx, upload("dev-a", 0)).await.unwrap();
        assert_eq!(rec.status, TransferStatus::Pending);
        assert_eq!(rec.progress_percent, 0);

        let err = h.manager.create(&ctx, upload("dev-a", -1)).await.unwrap_err();
        assert!(matches!(err, BreezeError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_declaration_is_rejected_at_create() {
        let h = harness(100).await;
        let ctx = org_user("user-1", "org-a");
        let err = h.manager.create(&ctx, upload("dev-a", 101)).await.unwrap_err();
        assert!(matches!(err, BreezeError::PayloadTooLarge { limit: 100 }));
    }

    #[tokio::test]
    async fn cancel_is_terminal_and_notifies_agent() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");
        let transfer = h.manager.create(&ctx, upload("dev-a", 100)).await.unwrap();

        let cancelled = h.manager.cancel(&ctx, &transfer.id).await.unwrap();
        assert_eq!(cancelled.status, TransferStatus::Failed);
        assert_eq!(cancelled.error_message.as_deref(), Some("Cancelled by user"));
        {
            let sent = h.transport.sent.lock().await;
            assert_eq!(sent.last().unwrap().1.command, "cancel_transfer");
        }

        let err = h
            .manager
            .ingest_chunk(&ctx, &transfer.id, 0, b"late")
            .await
            .unwrap_err();
        match err {
            BreezeError::InvalidState { current } => assert_eq!(current, "failed"),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn offline_device_rejects_creation() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");
        let err = h
            .manager
            .create(&ctx, upload("dev-a-offline", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::DeviceOffline));
    }

    #[tokio::test]
    async fn parent_session_must_be_active() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");
        let mut req = upload("dev-a", 10);
        req.session_id = Some("no-such-session".into());
        let err = h.manager.create(&ctx, req).await.unwrap_err();
        assert!(matches!(err, BreezeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn download_requires_completed_upload() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");
        let transfer = h.manager.create(&ctx, upload("dev-a", 10)).await.unwrap();

        let err = h.manager.download(&ctx, &transfer.id).await.unwrap_err();
        match err {
            BreezeError::InvalidState { current } => assert_eq!(current, "pending"),
            other => panic!("expected InvalidState, got {other:?}"),
        }

        let mut req = upload("dev-a", 10);
        req.direction = TransferDirection::Download;
        let down = h.manager.create(&ctx, req).await.unwrap();
        let err = h.manager.download(&ctx, &down.id).await.unwrap_err();
        assert!(matches!(err, BreezeError::Validation(_)));
    }

    #[tokio::test]
    async fn progress_updates_flow_and_terminate() {
        let h = harness(1 << 20).await;
        let ctx = org_user("user-1", "org-a");
        let transfer = h.manager.create(&ctx, upload("dev-a", 100)).await.unwrap();

        let rec = h
            .manager
            .update_progress(&ctx, &transfer.id, Some(40), None, None)
            .await
            .unwrap();
        assert_eq!(rec.progress_percent, 40);

        let rec = h
            .manager
            .update_progress(
                &ctx,
                &transfer.id,
                None,
                Some(TransferStatus::Failed),
                Some("agent aborted".into()),
            )
            .await
            .unwrap();
        assert_eq!(rec.status, TransferStatus::Failed);
        assert!(rec.completed_at.is_some());

        let actions: Vec<String> = h
            .audit
            .events
            .lock()
            .await
            .iter()
            .map(|e| e.action.clone())
            .collect();
        assert!(actions.contains(&"transfer_failed".to_string()));
    }

    #[tokio::test]
    async fn colleague_may_view_but_not_drive_a_transfer() {
        let h = harness(1 << 20).await;
        let owner = org_user("user-1", "org-a");
        let colleague = org_user("user-2", "org-a");
        let outsider = org_user("user-3", "org-b");

        let transfer = h.manager.create(&owner, upload("dev-a", 10)).await.unwrap();
        assert!(h.manager.get(&colleague, &transfer.id).await.is_ok());
        let err = h
            .manager
            .ingest_chunk(&colleague, &transfer.id, 0, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::AccessDenied));
        let err = h.manager.get(&outsider, &transfer.id).await.unwrap_err();
        assert!(matches!(err, BreezeError::NotFound { .. }));
    }
}
