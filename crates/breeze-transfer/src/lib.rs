// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunked file transfers: creation, serialized chunk ingestion with a hard
//! byte ceiling, assembly, cancellation, agent progress pushes, and streamed
//! download of assembled artifacts.

pub mod fs_store;
pub mod manager;

pub use fs_store::FsChunkStore;
pub use manager::{NewTransfer, TransferManager};
