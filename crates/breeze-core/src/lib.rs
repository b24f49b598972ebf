// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Breeze remote-session control plane.
//!
//! This crate provides the error taxonomy, domain types, and collaborator
//! trait definitions shared across the Breeze workspace. The signaling,
//! transfer, and gateway crates all depend on the seams defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::BreezeError;
pub use traits::{AgentTransport, AuditSink, ChunkStore, ChunkStream, DeviceDirectory};
pub use types::{
    AccessScope, AgentCommand, AuditEvent, AuthContext, Device, DeviceStatus, IceCandidate,
    IceServer, SessionStatus, SessionType, TransferDirection, TransferStatus,
};
