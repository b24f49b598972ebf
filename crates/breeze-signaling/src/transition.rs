// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session transition table.
//!
//! Every mutating session operation consults this table instead of keeping
//! its own allowed-states list. Legal transitions:
//!
//! | from                       | event         | to           |
//! |----------------------------|---------------|--------------|
//! | pending, connecting        | submit offer  | connecting   |
//! | connecting                 | submit answer | active       |
//! | connecting, active         | add candidate | (unchanged)  |
//! | pending/connecting/active  | end           | disconnected |
//! | pending/connecting/active  | stale cleanup | disconnected |
//!
//! `disconnected` and `failed` are terminal: nothing moves a session out of
//! them. A second offer while `connecting` is an idempotent overwrite.

use breeze_core::types::SessionStatus;

/// A mutating event applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SubmitOffer,
    SubmitAnswer,
    AddIceCandidate,
    End,
    CleanupStale,
}

impl SessionEvent {
    /// Statuses from which this event is legal.
    pub fn allowed_from(self) -> &'static [SessionStatus] {
        use SessionStatus::*;
        match self {
            SessionEvent::SubmitOffer => &[Pending, Connecting],
            SessionEvent::SubmitAnswer => &[Connecting],
            SessionEvent::AddIceCandidate => &[Connecting, Active],
            SessionEvent::End | SessionEvent::CleanupStale => &[Pending, Connecting, Active],
        }
    }

    /// Whether the event is legal from `current`.
    pub fn permits(self, current: SessionStatus) -> bool {
        self.allowed_from().contains(&current)
    }
}
