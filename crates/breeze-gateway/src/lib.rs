// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Breeze control plane: the session and transfer
//! REST surface, bearer-token authentication, and the error-to-status
//! mapping.

pub mod auth;
pub mod error;
pub mod server;
pub mod sessions;
pub mod transfers;

pub use auth::AuthState;
pub use server::{GatewayState, router, start_server};
