// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `breeze serve` command implementation.
//!
//! Wires the storage layer, signaling and transfer managers, and the HTTP
//! gateway from the validated configuration, then serves until the process
//! is stopped. The agent transport is the disconnected stand-in until the
//! agent WebSocket service lands; signaling state persists either way.

use std::str::FromStr;
use std::sync::Arc;

use breeze_config::model::BreezeConfig;
use breeze_core::BreezeError;
use breeze_core::traits::AgentTransport;
use breeze_core::types::{AccessScope, AuthContext};
use breeze_gateway::{AuthState, GatewayState, start_server};
use breeze_signaling::{DisconnectedTransport, SessionLifecycle, SignalingRelay, TurnSettings};
use breeze_storage::{Database, SqliteAuditSink, SqliteDeviceDirectory};
use breeze_transfer::{FsChunkStore, TransferManager};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `breeze serve` command.
pub async fn run_serve(config: BreezeConfig) -> Result<(), BreezeError> {
    init_tracing(&config.server.log_level);
    info!("starting breeze serve");

    let db = Database::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "database opened");

    let directory = Arc::new(SqliteDeviceDirectory::new(db.clone()));
    let audit = Arc::new(SqliteAuditSink::new(db.clone()));
    let transport: Arc<dyn AgentTransport> = Arc::new(DisconnectedTransport);

    let turn = TurnSettings {
        secret: config.turn.secret.clone(),
        host: config.turn.host.clone(),
        port: config.turn.port,
        realm: config.turn.realm.clone(),
        ttl_secs: config.turn.ttl_secs,
    };
    if turn.host.is_none() {
        info!("no TURN host configured, advertising STUN only");
    }

    let sessions = Arc::new(SessionLifecycle::new(
        db.clone(),
        directory.clone(),
        SignalingRelay::new(transport.clone()),
        audit.clone(),
        config.server.max_sessions_per_org,
        turn,
    ));
    let transfers = Arc::new(TransferManager::new(
        db,
        directory,
        transport,
        Arc::new(FsChunkStore::new(&config.storage.chunk_dir)),
        audit,
        config.transfer.max_transfer_size_bytes,
    ));

    if config.auth.tokens.is_empty() {
        warn!("no auth tokens configured, every API request will be rejected");
    }
    let auth = AuthState::new(config.auth.tokens.iter().map(|entry| {
        (
            entry.token.clone(),
            AuthContext {
                user_id: entry.user_id.clone(),
                org_id: entry.org_id.clone(),
                // Scope strings are validated at config load.
                scope: AccessScope::from_str(&entry.scope).unwrap_or(AccessScope::Organization),
                accessible_org_ids: entry.accessible_org_ids.clone(),
            },
        )
    }));

    let cancel = shutdown::install_signal_handler();

    start_server(
        &config.server.host,
        config.server.port,
        GatewayState { sessions, transfers },
        auth,
        cancel,
    )
    .await?;

    info!("breeze serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("breeze={log_level},warn")));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
