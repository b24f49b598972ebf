// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort agent notification.
//!
//! After an offer moves a session to `connecting`, the relay hands the
//! agent a `start_desktop` command carrying the offer and the current ICE
//! server list. Delivery is a reachability signal, never an error: when the
//! agent is offline the persisted offer is picked up on reconnect, and a
//! late-arriving answer is still valid as long as the session guard holds.

use std::sync::Arc;

use async_trait::async_trait;
use breeze_core::traits::AgentTransport;
use breeze_core::types::{AgentCommand, Device, IceServer, commands};
use breeze_storage::SessionRecord;

/// Relay facade over the agent transport seam.
#[derive(Clone)]
pub struct SignalingRelay {
    transport: Arc<dyn AgentTransport>,
}

impl SignalingRelay {
    pub fn new(transport: Arc<dyn AgentTransport>) -> Self {
        Self { transport }
    }

    /// Push the session offer to the device agent. Returns reachability.
    pub async fn notify_offer(
        &self,
        device: &Device,
        session: &SessionRecord,
        ice_servers: &[IceServer],
    ) -> bool {
        let command = AgentCommand {
            command: commands::START_DESKTOP.to_string(),
            payload: serde_json::json!({
                "sessionId": session.id,
                "sessionType": session.session_type,
                "offer": session.webrtc_offer,
                "iceServers": ice_servers,
            }),
        };
        let delivered = self.transport.notify(&device.agent_id, command).await;
        if delivered {
            tracing::debug!(session_id = %session.id, agent_id = %device.agent_id, "offer relayed to agent");
        } else {
            tracing::warn!(
                session_id = %session.id,
                agent_id = %device.agent_id,
                "agent unreachable, offer will be delivered on reconnect"
            );
        }
        delivered
    }

    /// Tell the agent to tear the session down. Returns reachability.
    pub async fn notify_stop(&self, device: &Device, session_id: &str) -> bool {
        let command = AgentCommand {
            command: commands::STOP_DESKTOP.to_string(),
            payload: serde_json::json!({ "sessionId": session_id }),
        };
        let delivered = self.transport.notify(&device.agent_id, command).await;
        if !delivered {
            tracing::debug!(session_id, agent_id = %device.agent_id, "stop notification not delivered");
        }
        delivered
    }
}

/// Transport used until the agent WebSocket service is wired in: every
/// agent is unreachable, so signaling state persists and nothing blocks.
pub struct DisconnectedTransport;

#[async_trait]
impl AgentTransport for DisconnectedTransport {
    async fn notify(&self, _agent_id: &str, _command: AgentCommand) -> bool {
        false
    }
}
