// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the signaling and transfer subsystems.
//!
//! These are the seams to the rest of the platform: device inventory, the
//! agent command transport, raw chunk storage, and the audit writer. The
//! core never assumes a concrete implementation — the binary wires real
//! ones, tests wire recording fakes.

use std::fmt;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::BreezeError;
use crate::types::{AgentCommand, AuditEvent, Device};

/// Read-only view of the device inventory.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Look up a device by id. `None` when the device does not exist;
    /// org-scope filtering is the caller's job.
    async fn get(&self, device_id: &str) -> Result<Option<Device>, BreezeError>;
}

/// Best-effort delivery of commands to a device agent.
///
/// `notify` returns a reachability signal, not an acknowledgment: `true`
/// means the command was handed to a connected agent, `false` means the
/// agent is not currently reachable. Callers never treat `false` as an
/// error — persisted signaling state is delivered when the agent
/// reconnects.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn notify(&self, agent_id: &str, command: AgentCommand) -> bool;
}

/// A readable byte source for a completed transfer artifact.
pub struct ChunkStream {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    /// Exact artifact length, for `Content-Length`.
    pub len: u64,
}

impl fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStream")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Raw chunk storage for file transfers.
///
/// Implementations persist individual chunks keyed by `(transfer_id,
/// index)` and can assemble them into a single artifact once ingestion
/// finishes. Byte accounting authoritative for admission lives in the
/// transfer row, not here.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persist one chunk. Rewriting an existing index overwrites it.
    async fn save(&self, transfer_id: &str, index: u32, bytes: &[u8]) -> Result<(), BreezeError>;

    /// Concatenate all received chunks in index order into the final
    /// artifact. Returns the assembled size in bytes.
    async fn assemble(&self, transfer_id: &str) -> Result<u64, BreezeError>;

    /// Open the assembled artifact for streaming. Errors with `NotFound`
    /// when the artifact is missing despite a completed transfer — that
    /// data-loss case must surface explicitly.
    async fn stream(&self, transfer_id: &str) -> Result<ChunkStream, BreezeError>;
}

/// Best-effort audit trail writer.
///
/// Failures are logged and swallowed by callers; audit is never part of
/// the primary transaction.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), BreezeError>;
}
