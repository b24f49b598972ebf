// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication middleware.
//!
//! Resolves `Authorization: Bearer <token>` against a static token table
//! and attaches the resulting org-scoped [`AuthContext`] as a request
//! extension. An empty table rejects everything (fail-closed). This is the
//! workspace stand-in for the platform auth service; the `AuthContext`
//! contract downstream is what matters.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use breeze_core::types::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    tokens: Arc<HashMap<String, AuthContext>>,
}

impl AuthState {
    pub fn new(entries: impl IntoIterator<Item = (String, AuthContext)>) -> Self {
        Self {
            tokens: Arc::new(entries.into_iter().collect()),
        }
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

/// Validate the bearer token and attach the caller's `AuthContext`.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.tokens.is_empty() {
        tracing::error!("gateway has no tokens configured, rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token.and_then(|t| auth.tokens.get(t)) {
        Some(ctx) => {
            request.extensions_mut().insert(ctx.clone());
            Ok(next.run(request).await)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeze_core::types::AccessScope;

    #[test]
    fn debug_does_not_leak_tokens() {
        let state = AuthState::new([(
            "super-secret".to_string(),
            AuthContext {
                user_id: "u1".into(),
                org_id: "org-a".into(),
                scope: AccessScope::Organization,
                accessible_org_ids: vec![],
            },
        )]);
        let rendered = format!("{state:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
