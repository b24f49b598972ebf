// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle orchestration.
//!
//! `SessionLifecycle` is the single entry point for every session
//! operation. It owns the scoping rules (an out-of-scope session is
//! indistinguishable from a missing one), consults the transition table for
//! guards, relays offers to device agents best effort, and writes the audit
//! trail. HTTP handlers stay thin on top of it.

use std::sync::Arc;

use breeze_core::BreezeError;
use breeze_core::traits::{AuditSink, DeviceDirectory};
use breeze_core::types::{
    AuditEvent, AuthContext, Device, DeviceStatus, IceCandidate, IceServer, SessionStatus,
    SessionType,
};
use breeze_storage::queries::sessions;
use breeze_storage::{
    AdmissionOutcome, Database, HistoryStats, Page, SessionFilter, SessionRecord, now_rfc3339,
};
use uuid::Uuid;

use crate::ice::{self, TurnSettings};
use crate::relay::SignalingRelay;
use crate::transition::SessionEvent;

/// Upper bound on a single SDP document. Real offers are a few KB; anything
/// near this is malformed or hostile.
pub const MAX_SDP_BYTES: usize = 64 * 1024;

/// A session together with its relayed ICE candidates.
#[derive(Debug, Clone)]
pub struct SessionDetail {
    pub session: SessionRecord,
    pub ice_candidates: Vec<IceCandidate>,
}

/// Result of an offer submission: the updated session plus whether the
/// device agent was reachable for immediate delivery.
#[derive(Debug, Clone)]
pub struct OfferOutcome {
    pub session: SessionRecord,
    pub agent_notified: bool,
}

pub struct SessionLifecycle {
    db: Database,
    devices: Arc<dyn DeviceDirectory>,
    relay: SignalingRelay,
    audit: Arc<dyn AuditSink>,
    max_sessions_per_org: i64,
    turn: TurnSettings,
}

impl SessionLifecycle {
    pub fn new(
        db: Database,
        devices: Arc<dyn DeviceDirectory>,
        relay: SignalingRelay,
        audit: Arc<dyn AuditSink>,
        max_sessions_per_org: i64,
        turn: TurnSettings,
    ) -> Self {
        Self {
            db,
            devices,
            relay,
            audit,
            max_sessions_per_org,
            turn,
        }
    }

    /// The ICE server list for the caller's side of the connection.
    pub fn ice_servers(&self) -> Vec<IceServer> {
        ice::ice_servers(&self.turn, chrono::Utc::now())
    }

    /// Create a pending session against an online, in-scope device.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        device_id: &str,
        session_type: SessionType,
    ) -> Result<SessionRecord, BreezeError> {
        let device = self.visible_device(ctx, device_id).await?;
        if device.status != DeviceStatus::Online {
            return Err(BreezeError::DeviceOffline);
        }

        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            device_id: device.id.clone(),
            org_id: device.org_id.clone(),
            user_id: ctx.user_id.clone(),
            session_type,
            status: SessionStatus::Pending,
            webrtc_offer: None,
            webrtc_answer: None,
            started_at: None,
            ended_at: None,
            duration_seconds: None,
            bytes_transferred: None,
            recording_url: None,
            created_at: now_rfc3339(),
        };
        match sessions::create_session_admitted(&self.db, &record, self.max_sessions_per_org)
            .await?
        {
            AdmissionOutcome::Admitted => {}
            AdmissionOutcome::Rejected { current_count } => {
                tracing::info!(
                    org_id = %device.org_id,
                    current_count,
                    max_allowed = self.max_sessions_per_org,
                    "session rejected by concurrency limit"
                );
                return Err(BreezeError::AdmissionRejected {
                    current_count,
                    max_allowed: self.max_sessions_per_org,
                });
            }
        }

        tracing::info!(
            session_id = %record.id,
            device_id = %device.id,
            session_type = %session_type,
            "session created"
        );
        self.audit_best_effort(AuditEvent {
            action: "session_initiated".to_string(),
            actor_user_id: ctx.user_id.clone(),
            org_id: device.org_id.clone(),
            details: serde_json::json!({
                "sessionId": record.id,
                "deviceId": device.id,
                "sessionType": session_type,
            }),
        })
        .await;
        Ok(record)
    }

    /// Fetch a session with its candidate log.
    pub async fn get(&self, ctx: &AuthContext, id: &str) -> Result<SessionDetail, BreezeError> {
        let session = self.visible_session(ctx, id).await?;
        let ice_candidates = sessions::get_ice_candidates(&self.db, id).await?;
        Ok(SessionDetail {
            session,
            ice_candidates,
        })
    }

    /// Paginated listing restricted to the caller's visible organizations.
    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: SessionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Page<SessionRecord>, BreezeError> {
        sessions::list_sessions(&self.db, ctx.visible_org_ids(), filter, limit, offset).await
    }

    /// Aggregate history for the caller's visible organizations.
    pub async fn history(
        &self,
        ctx: &AuthContext,
        limit: i64,
    ) -> Result<HistoryStats, BreezeError> {
        sessions::history_stats(&self.db, ctx.visible_org_ids(), limit).await
    }

    /// Store the browser's SDP offer and relay it to the device agent.
    ///
    /// Relay delivery is best effort; an unreachable agent leaves the
    /// session in `connecting` with the offer persisted for reconnect.
    pub async fn submit_offer(
        &self,
        ctx: &AuthContext,
        id: &str,
        sdp: &str,
    ) -> Result<OfferOutcome, BreezeError> {
        validate_sdp(sdp)?;
        let existing = self.owned_session(ctx, id).await?;
        let session = sessions::set_offer(
            &self.db,
            id,
            sdp,
            SessionEvent::SubmitOffer.allowed_from(),
        )
        .await?;

        let mut agent_notified = false;
        match self.devices.get(&existing.device_id).await? {
            Some(device) => {
                let servers = self.ice_servers();
                agent_notified = self.relay.notify_offer(&device, &session, &servers).await;
            }
            None => {
                tracing::warn!(
                    session_id = %id,
                    device_id = %existing.device_id,
                    "device vanished from inventory, offer not relayed"
                );
            }
        }
        Ok(OfferOutcome {
            session,
            agent_notified,
        })
    }

    /// Store the agent's SDP answer; the session becomes `active`.
    pub async fn submit_answer(
        &self,
        ctx: &AuthContext,
        id: &str,
        sdp: &str,
    ) -> Result<SessionRecord, BreezeError> {
        validate_sdp(sdp)?;
        self.owned_session(ctx, id).await?;
        sessions::set_answer(
            &self.db,
            id,
            sdp,
            &now_rfc3339(),
            SessionEvent::SubmitAnswer.allowed_from(),
        )
        .await
    }

    /// Append one ICE candidate; returns the total candidate count.
    pub async fn add_ice_candidate(
        &self,
        ctx: &AuthContext,
        id: &str,
        candidate: &IceCandidate,
    ) -> Result<i64, BreezeError> {
        if candidate.candidate.is_empty() {
            return Err(BreezeError::Validation(
                "candidate must not be empty".to_string(),
            ));
        }
        self.owned_session(ctx, id).await?;
        sessions::append_ice_candidate(
            &self.db,
            id,
            candidate,
            &now_rfc3339(),
            SessionEvent::AddIceCandidate.allowed_from(),
        )
        .await
    }

    /// Terminate a session. Desktop sessions also get a best-effort
    /// `stop_desktop` to the agent so capture shuts down promptly.
    pub async fn end(
        &self,
        ctx: &AuthContext,
        id: &str,
        bytes_transferred: Option<i64>,
        recording_url: Option<String>,
    ) -> Result<SessionRecord, BreezeError> {
        self.owned_session(ctx, id).await?;
        let session = sessions::end_session(
            &self.db,
            id,
            bytes_transferred,
            recording_url,
            &now_rfc3339(),
        )
        .await?;

        if session.session_type == SessionType::Desktop {
            if let Some(device) = self.devices.get(&session.device_id).await? {
                self.relay.notify_stop(&device, &session.id).await;
            }
        }

        tracing::info!(
            session_id = %session.id,
            duration_seconds = session.duration_seconds,
            "session ended"
        );
        self.audit_best_effort(AuditEvent {
            action: "session_ended".to_string(),
            actor_user_id: ctx.user_id.clone(),
            org_id: session.org_id.clone(),
            details: serde_json::json!({
                "sessionId": session.id,
                "durationSeconds": session.duration_seconds,
                "bytesTransferred": session.bytes_transferred,
            }),
        })
        .await;
        Ok(session)
    }

    /// Disconnect every non-terminal session the caller can see. Returns
    /// the affected session ids.
    pub async fn cleanup_stale(&self, ctx: &AuthContext) -> Result<Vec<String>, BreezeError> {
        let ids =
            sessions::cleanup_stale(&self.db, ctx.visible_org_ids(), &now_rfc3339()).await?;
        if !ids.is_empty() {
            tracing::info!(count = ids.len(), "stale sessions disconnected");
            self.audit_best_effort(AuditEvent {
                action: "sessions_cleaned".to_string(),
                actor_user_id: ctx.user_id.clone(),
                org_id: ctx.org_id.clone(),
                details: serde_json::json!({ "sessionIds": ids }),
            })
            .await;
        }
        Ok(ids)
    }

    /// Device lookup with scope applied. Out-of-scope reads back as missing
    /// so callers cannot probe other organizations' inventory.
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

    /// Session lookup with scope applied, same masking rule as devices.
    async fn visible_session(
        &self,
        ctx: &AuthContext,
        id: &str,
    ) -> Result<SessionRecord, BreezeError> {
        let session = sessions::get_session(&self.db, id)
            .await?
            .ok_or_else(|| BreezeError::not_found("session"))?;
        if !ctx.can_access_org(&session.org_id) {
            return Err(BreezeError::not_found("session"));
        }
        Ok(session)
    }

    /// Mutations additionally require ownership: an org-scoped caller may
    /// see a colleague's session but not drive its signaling.
    async fn owned_session(
        &self,
        ctx: &AuthContext,
        id: &str,
    ) -> Result<SessionRecord, BreezeError> {
        let session = self.visible_session(ctx, id).await?;
        if ctx.scope == breeze_core::types::AccessScope::Organization
            && session.user_id != ctx.user_id
        {
            return Err(BreezeError::AccessDenied);
        }
        Ok(session)
    }

    async fn audit_best_effort(&self, event: AuditEvent) {
        let action = event.action.clone();
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(%action, %err, "audit write failed");
        }
    }
}

fn validate_sdp(sdp: &str) -> Result<(), BreezeError> {
    if sdp.is_empty() {
        return Err(BreezeError::Validation("sdp must not be empty".to_string()));
    }
    if sdp.len() > MAX_SDP_BYTES {
        return Err(BreezeError::Validation(format!(
            "sdp exceeds {MAX_SDP_BYTES} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use breeze_core::traits::AgentTransport;
    use breeze_core::types::{AccessScope, AgentCommand};
    use tempfile::tempdir;
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
        reachable: bool,
        sent: Mutex<Vec<(String, AgentCommand)>>,
    }

    #[async_trait]
    impl AgentTransport for RecordingTransport {
        async fn notify(&self, agent_id: &str, command: AgentCommand) -> bool {
            self.sent
                .lock()
                .await
                .push((agent_id.to_string(), command));
            self.reachable
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
        lifecycle: SessionLifecycle,
        transport: Arc<RecordingTransport>,
        audit: Arc<RecordingAudit>,
        _dir: tempfile::TempDir,
    }

    async fn harness(reachable: bool, max_sessions: i64) -> Harness {
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
            Device {
                id: "dev-b".into(),
                org_id: "org-b".into(),
                hostname: "ws-3".into(),
                agent_id: "agent-b".into(),
                status: DeviceStatus::Online,
            },
        ];
        let transport = Arc::new(RecordingTransport {
            reachable,
            sent: Mutex::new(Vec::new()),
        });
        let audit = Arc::new(RecordingAudit {
            events: Mutex::new(Vec::new()),
        });
        let lifecycle = SessionLifecycle::new(
            db,
            Arc::new(StaticDirectory { devices }),
            SignalingRelay::new(transport.clone()),
            audit.clone(),
            max_sessions,
            TurnSettings {
                secret: None,
                host: None,
                port: 3478,
                realm: "breeze".into(),
                ttl_secs: 86400,
            },
        );
        Harness {
            lifecycle,
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

    #[tokio::test]
    async fn full_handshake_reaches_active_and_ends() {
        let h = harness(true, 10).await;
        let ctx = org_user("user-1", "org-a");

        let session = h
            .lifecycle
            .create(&ctx, "dev-a", SessionType::Desktop)
            .await
            .unwrap();
        assert_eq!(session.status, SessionStatus::Pending);

        let outcome = h
            .lifecycle
            .submit_offer(&ctx, &session.id, "v=0 offer")
            .await
            .unwrap();
        assert_eq!(outcome.session.status, SessionStatus::Connecting);
        assert!(outcome.agent_notified);
        {
            let sent = h.transport.sent.lock().await;
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].0, "agent-a");
            assert_eq!(sent[0].1.command, "start_desktop");
            assert_eq!(sent[0].1.payload["offer"], "v=0 offer");
        }

        let active = h
            .lifecycle
            .submit_answer(&ctx, &session.id, "v=0 answer")
            .await
            .unwrap();
        assert_eq!(active.status, SessionStatus::Active);
        assert!(active.started_at.is_some());

        let count = h
            .lifecycle
            .add_ice_candidate(
                &ctx,
                &session.id,
                &IceCandidate {
                    candidate: "candidate:1".into(),
                    sdp_mid: Some("0".into()),
                    sdp_mline_index: Some(0),
                    username_fragment: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(count, 1);

        let ended = h
            .lifecycle
            .end(&ctx, &session.id, Some(4096), None)
            .await
            .unwrap();
        assert_eq!(ended.status, SessionStatus::Disconnected);
        assert_eq!(ended.bytes_transferred, Some(4096));
        // Desktop teardown notifies the agent.
        {
            let sent = h.transport.sent.lock().await;
            assert_eq!(sent.last().unwrap().1.command, "stop_desktop");
        }

        let actions: Vec<String> = h
            .audit
            .events
            .lock()
            .await
            .iter()
            .map(|e| e.action.clone())
            .collect();
        assert_eq!(actions, vec!["session_initiated", "session_ended"]);
    }

    #[tokio::test]
    async fn create_masks_out_of_scope_devices() {
        let h = harness(true, 10).await;
        let ctx = org_user("user-1", "org-a");

        let err = h
            .lifecycle
            .create(&ctx, "missing", SessionType::Terminal)
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::NotFound { .. }));

        // Another org's device reads back identically to a missing one.
        let err = h
            .lifecycle
            .create(&ctx, "dev-b", SessionType::Terminal)
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn create_rejects_offline_devices() {
        let h = harness(true, 10).await;
        let ctx = org_user("user-1", "org-a");
        let err = h
            .lifecycle
            .create(&ctx, "dev-a-offline", SessionType::Desktop)
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::DeviceOffline));
    }

    #[tokio::test]
    async fn admission_limit_surfaces_counts() {
        let h = harness(true, 1).await;
        let ctx = org_user("user-1", "org-a");
        h.lifecycle
            .create(&ctx, "dev-a", SessionType::Terminal)
            .await
            .unwrap();
        let err = h
            .lifecycle
            .create(&ctx, "dev-a", SessionType::Terminal)
            .await
            .unwrap_err();
        match err {
            BreezeError::AdmissionRejected {
                current_count,
                max_allowed,
            } => {
                assert_eq!(current_count, 1);
                assert_eq!(max_allowed, 1);
            }
            other => panic!("expected AdmissionRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_sdp_is_rejected_before_any_write() {
        let h = harness(true, 10).await;
        let ctx = org_user("user-1", "org-a");
        let session = h
            .lifecycle
            .create(&ctx, "dev-a", SessionType::Desktop)
            .await
            .unwrap();

        let big = "a".repeat(MAX_SDP_BYTES + 1);
        let err = h
            .lifecycle
            .submit_offer(&ctx, &session.id, &big)
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::Validation(_)));
        let detail = h.lifecycle.get(&ctx, &session.id).await.unwrap();
        assert_eq!(detail.session.status, SessionStatus::Pending);
        assert!(detail.session.webrtc_offer.is_none());
    }

    #[tokio::test]
    async fn colleague_may_view_but_not_drive_a_session() {
        let h = harness(true, 10).await;
        let owner = org_user("user-1", "org-a");
        let colleague = org_user("user-2", "org-a");
        let outsider = org_user("user-3", "org-b");

        let session = h
            .lifecycle
            .create(&owner, "dev-a", SessionType::Desktop)
            .await
            .unwrap();

        // Same org: visible, but mutations are denied.
        assert!(h.lifecycle.get(&colleague, &session.id).await.is_ok());
        let err = h
            .lifecycle
            .submit_offer(&colleague, &session.id, "v=0")
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::AccessDenied));

        // Other org: not even visible.
        let err = h.lifecycle.get(&outsider, &session.id).await.unwrap_err();
        assert!(matches!(err, BreezeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn unreachable_agent_still_persists_the_offer() {
        let h = harness(false, 10).await;
        let ctx = org_user("user-1", "org-a");
        let session = h
            .lifecycle
            .create(&ctx, "dev-a", SessionType::Desktop)
            .await
            .unwrap();
        let outcome = h
            .lifecycle
            .submit_offer(&ctx, &session.id, "v=0 offer")
            .await
            .unwrap();
        assert!(!outcome.agent_notified);
        assert_eq!(outcome.session.status, SessionStatus::Connecting);
        assert_eq!(outcome.session.webrtc_offer.as_deref(), Some("v=0 offer"));
    }

    #[tokio::test]
    async fn cleanup_only_touches_visible_orgs() {
        let h = harness(true, 10).await;
        let a = org_user("user-1", "org-a");
        let b = org_user("user-2", "org-b");
        let sa = h
            .lifecycle
            .create(&a, "dev-a", SessionType::Terminal)
            .await
            .unwrap();
        let sb = h
            .lifecycle
            .create(&b, "dev-b", SessionType::Terminal)
            .await
            .unwrap();

        let ids = h.lifecycle.cleanup_stale(&a).await.unwrap();
        assert_eq!(ids, vec![sa.id.clone()]);
        assert_eq!(
            h.lifecycle.get(&b, &sb.id).await.unwrap().session.status,
            SessionStatus::Pending
        );
        let actions: Vec<String> = h
            .audit
            .events
            .lock()
            .await
            .iter()
            .map(|e| e.action.clone())
            .collect();
        assert!(actions.contains(&"sessions_cleaned".to_string()));
    }

    #[tokio::test]
    async fn listing_and_history_are_org_scoped() {
        let h = harness(true, 10).await;
        let a = org_user("user-1", "org-a");
        let b = org_user("user-2", "org-b");
        let sa = h
            .lifecycle
            .create(&a, "dev-a", SessionType::Desktop)
            .await
            .unwrap();
        h.lifecycle
            .create(&b, "dev-b", SessionType::Desktop)
            .await
            .unwrap();

        let page = h
            .lifecycle
            .list(&a, SessionFilter::default(), 50, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, sa.id);

        h.lifecycle.end(&a, &sa.id, Some(10), None).await.unwrap();
        let stats = h.lifecycle.history(&a, 10).await.unwrap();
        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.total_bytes_transferred, 10);
    }
}
