// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Breeze workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Remote-session lifecycle status.
///
/// Transitions are monotonic along the graph enforced by the signaling
/// crate's transition table; `Disconnected` and `Failed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Connecting,
    Active,
    Disconnected,
    Failed,
}

impl SessionStatus {
    /// True for statuses that count toward an organization's concurrency limit.
    pub fn is_concurrent(self) -> bool {
        matches!(
            self,
            SessionStatus::Pending | SessionStatus::Connecting | SessionStatus::Active
        )
    }

    /// True once the session can never change state again.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Disconnected | SessionStatus::Failed)
    }
}

/// Kind of remote session being brokered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Terminal,
    Desktop,
    FileTransfer,
}

/// File-transfer job status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Transferring,
    Completed,
    Failed,
}

impl TransferStatus {
    /// True while the transfer can still accept chunks or progress updates.
    pub fn accepts_data(self) -> bool {
        matches!(self, TransferStatus::Pending | TransferStatus::Transferring)
    }
}

/// Direction of a file transfer, from the endpoint agent's point of view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Upload,
    Download,
}

/// Connectivity status of a managed device's agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
}

/// A managed endpoint as seen by the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub org_id: String,
    pub hostname: String,
    /// Identifier used to address the device's agent on the transport.
    pub agent_id: String,
    pub status: DeviceStatus,
}

/// Access scope of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    /// Scoped to a single organization plus any explicitly granted ones.
    Organization,
    /// Platform operators; every organization is visible.
    Global,
}

/// Authenticated, org-scoped caller identity.
///
/// Produced by the gateway's auth middleware and threaded through every
/// operation so scoping decisions happen at the lifecycle layer, not in
/// SQL string assembly.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub org_id: String,
    pub scope: AccessScope,
    /// Additional organizations visible to an `Organization`-scoped caller.
    pub accessible_org_ids: Vec<String>,
}

impl AuthContext {
    /// Whether the caller may see objects belonging to `org_id`.
    pub fn can_access_org(&self, org_id: &str) -> bool {
        match self.scope {
            AccessScope::Global => true,
            AccessScope::Organization => {
                self.org_id == org_id || self.accessible_org_ids.iter().any(|o| o == org_id)
            }
        }
    }

    /// The set of org ids a scoped query should be restricted to, or `None`
    /// for global callers.
    pub fn visible_org_ids(&self) -> Option<Vec<String>> {
        match self.scope {
            AccessScope::Global => None,
            AccessScope::Organization => {
                let mut orgs = vec![self.org_id.clone()];
                orgs.extend(self.accessible_org_ids.iter().cloned());
                Some(orgs)
            }
        }
    }
}

/// A single ICE candidate relayed between browser and agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        default,
        rename = "sdpMLineIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_mline_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// One STUN/TURN server entry handed to both peers.
///
/// Field names follow the browser `RTCIceServer` shape, which is also what
/// the Go agent's `ICEServerConfig` parser expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Agent command vocabulary. Names are part of the agent protocol and must
/// match the endpoint agent's dispatcher exactly.
pub mod commands {
    /// Start a WebRTC remote desktop session (payload: session id, offer SDP, ICE servers).
    pub const START_DESKTOP: &str = "start_desktop";
    /// Tear down a remote desktop session.
    pub const STOP_DESKTOP: &str = "stop_desktop";
    /// Begin a file transfer (payload: transfer id, direction, remote path).
    pub const FILE_TRANSFER: &str = "file_transfer";
    /// Abort an in-flight file transfer.
    pub const CANCEL_TRANSFER: &str = "cancel_transfer";
}

/// A command pushed to a device agent over the (external) agent transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCommand {
    /// Command name from the agent's vocabulary, e.g. `start_desktop`.
    pub command: String,
    pub payload: serde_json::Value,
}

/// A lifecycle event handed to the audit sink, best effort.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: String,
    pub actor_user_id: String,
    pub org_id: String,
    pub details: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_status_round_trips_through_strings() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Connecting,
            SessionStatus::Active,
            SessionStatus::Disconnected,
            SessionStatus::Failed,
        ] {
            let s = status.to_string();
            assert_eq!(SessionStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(SessionStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn concurrent_and_terminal_partitions() {
        assert!(SessionStatus::Pending.is_concurrent());
        assert!(SessionStatus::Connecting.is_concurrent());
        assert!(SessionStatus::Active.is_concurrent());
        assert!(!SessionStatus::Disconnected.is_concurrent());
        assert!(SessionStatus::Disconnected.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
    }

    #[test]
    fn session_type_serializes_snake_case() {
        let json = serde_json::to_string(&SessionType::FileTransfer).unwrap();
        assert_eq!(json, "\"file_transfer\"");
    }

    #[test]
    fn org_scoped_caller_sees_own_and_granted_orgs() {
        let ctx = AuthContext {
            user_id: "u1".into(),
            org_id: "org-a".into(),
            scope: AccessScope::Organization,
            accessible_org_ids: vec!["org-b".into()],
        };
        assert!(ctx.can_access_org("org-a"));
        assert!(ctx.can_access_org("org-b"));
        assert!(!ctx.can_access_org("org-c"));
        assert_eq!(
            ctx.visible_org_ids(),
            Some(vec!["org-a".to_string(), "org-b".to_string()])
        );
    }

    #[test]
    fn global_caller_sees_everything() {
        let ctx = AuthContext {
            user_id: "admin".into(),
            org_id: "org-root".into(),
            scope: AccessScope::Global,
            accessible_org_ids: vec![],
        };
        assert!(ctx.can_access_org("anything"));
        assert!(ctx.visible_org_ids().is_none());
    }

    #[test]
    fn ice_candidate_uses_camel_case_wire_names() {
        let cand = IceCandidate {
            candidate: "candidate:1 1 udp 2130706431 192.0.2.1 54400 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        };
        let json = serde_json::to_string(&cand).unwrap();
        assert!(json.contains("\"sdpMid\":\"0\""));
        assert!(json.contains("\"sdpMLineIndex\":0"));
        assert!(!json.contains("usernameFragment"));
    }
}
