// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TURN credential issuance and the ICE server list.
//!
//! Implements the standard time-limited REST credential scheme: the
//! username is `<unix-expiry>:<realm>` and the credential is
//! `base64(HMAC-SHA1(secret, username))`. Any TURN server sharing the same
//! secret can validate the expiry and recompute the credential without
//! talking to us. Everything here is a pure function of configuration plus
//! the clock — safe under unlimited concurrency.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use breeze_core::types::IceServer;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Public STUN fallback, the same one the endpoint agent defaults to when
/// handed an empty server list.
pub const PUBLIC_STUN: &str = "stun:stun.l.google.com:19302";

/// TURN issuance settings.
///
/// Mirrors `TurnConfig` from `breeze-config` so this crate does not depend
/// on the config crate.
#[derive(Debug, Clone, Default)]
pub struct TurnSettings {
    pub secret: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub realm: String,
    pub ttl_secs: u64,
}

/// A time-limited TURN credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnCredentials {
    /// `<unix-expiry>:<realm>`.
    pub username: String,
    /// `base64(HMAC-SHA1(secret, username))`.
    pub credential: String,
    /// Unix seconds after which the pair is invalid.
    pub expires_at: i64,
}

fn sign(secret: &str, username: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(username.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Issue a credential pair valid for `ttl_secs` from `now`, or `None` when
/// no shared secret is configured (TURN omitted).
pub fn generate_turn_credentials(
    settings: &TurnSettings,
    now: DateTime<Utc>,
) -> Option<TurnCredentials> {
    let secret = settings.secret.as_deref()?;
    let expires_at = now.timestamp() + settings.ttl_secs as i64;
    let username = format!("{expires_at}:{}", settings.realm);
    let credential = sign(secret, &username);
    Some(TurnCredentials {
        username,
        credential,
        expires_at,
    })
}

/// Validate a credential pair the way a TURN server sharing the secret
/// would: the username's expiry must be in the future and the credential
/// must match the recomputed HMAC.
pub fn verify_turn_credential(
    secret: &str,
    username: &str,
    credential: &str,
    now: DateTime<Utc>,
) -> bool {
    let Some((expiry, _realm)) = username.split_once(':') else {
        return false;
    };
    let Ok(expiry) = expiry.parse::<i64>() else {
        return false;
    };
    if expiry < now.timestamp() {
        return false;
    }
    sign(secret, username) == credential
}

/// The ICE server list handed to both peers: always the public STUN server,
/// plus UDP and TCP TURN entries when a relay host is configured.
pub fn ice_servers(settings: &TurnSettings, now: DateTime<Utc>) -> Vec<IceServer> {
    let mut servers = vec![IceServer {
        urls: vec![PUBLIC_STUN.to_string()],
        username: None,
        credential: None,
    }];

    if let Some(host) = settings.host.as_deref() {
        if let Some(creds) = generate_turn_credentials(settings, now) {
            servers.push(IceServer {
                urls: vec![
                    format!("turn:{host}:{}?transport=udp", settings.port),
                    format!("turn:{host}:{}?transport=tcp", settings.port),
                ],
                username: Some(creds.username),
                credential: Some(creds.credential),
            });
        }
    }

    servers
}
