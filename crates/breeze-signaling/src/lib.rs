// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebRTC signaling for remote sessions: the lifecycle state machine,
//! per-organization admission control, TURN credential issuance, and
//! best-effort relay of offers to device agents.

pub mod admission;
pub mod ice;
pub mod lifecycle;
pub mod relay;
pub mod transition;

pub use admission::{AdmissionDecision, DEFAULT_MAX_CONCURRENT, check_session_rate_limit};
pub use ice::{TurnCredentials, TurnSettings, generate_turn_credentials, ice_servers};
pub use lifecycle::{MAX_SDP_BYTES, OfferOutcome, SessionDetail, SessionLifecycle};
pub use relay::{DisconnectedTransport, SignalingRelay};
pub use transition::SessionEvent;
