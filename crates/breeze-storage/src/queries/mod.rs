// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Every function takes `&Database` and runs on the
//! single writer thread.

pub mod audit;
pub mod devices;
pub mod sessions;
pub mod transfers;
