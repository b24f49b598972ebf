// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session endpoints.
//!
//! Thin handlers over [`SessionLifecycle`]: deserialize camelCase wire
//! bodies, thread the caller's `AuthContext`, map `BreezeError` via
//! `ApiError`. No business rules live here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use breeze_core::types::{AuthContext, IceCandidate, IceServer, SessionStatus, SessionType};
use breeze_storage::{SessionFilter, SessionRecord};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::server::GatewayState;

/// Wire shape of a session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: String,
    pub device_id: String,
    pub org_id: String,
    pub user_id: String,
    pub session_type: SessionType,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webrtc_offer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webrtc_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_transferred: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
    pub created_at: String,
}

impl From<SessionRecord> for SessionDto {
    fn from(rec: SessionRecord) -> Self {
        Self {
            id: rec.id,
            device_id: rec.device_id,
            org_id: rec.org_id,
            user_id: rec.user_id,
            session_type: rec.session_type,
            status: rec.status,
            webrtc_offer: rec.webrtc_offer,
            webrtc_answer: rec.webrtc_answer,
            started_at: rec.started_at,
            ended_at: rec.ended_at,
            duration_seconds: rec.duration_seconds,
            bytes_transferred: rec.bytes_transferred,
            recording_url: rec.recording_url,
            created_at: rec.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub device_id: String,
    pub session_type: SessionType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default, rename = "type")]
    pub session_type: Option<SessionType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionDto>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub total_count: i64,
    pub total_duration_seconds: i64,
    pub total_bytes_transferred: i64,
    pub sessions: Vec<SessionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub session: SessionDto,
    pub ice_candidates: Vec<IceCandidate>,
    pub ice_candidates_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SdpRequest {
    pub sdp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    #[serde(flatten)]
    pub session: SessionDto,
    pub agent_notified: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCountResponse {
    pub ice_candidates_count: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    #[serde(default)]
    pub bytes_transferred: Option<i64>,
    #[serde(default)]
    pub recording_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServersResponse {
    pub ice_servers: Vec<IceServer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub cleaned_session_ids: Vec<String>,
    pub count: usize,
}

/// Page query to (limit, offset, page) with `per_page` capped at 100.
pub(crate) fn page_params(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let per_page = per_page.unwrap_or(50).clamp(1, 100);
    let page = page.unwrap_or(1).max(1);
    (per_page, (page - 1) * per_page, page)
}

/// POST /sessions
pub async fn create_session(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionDto>)> {
    let session = state
        .sessions
        .create(&ctx, &body.device_id, body.session_type)
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /sessions
pub async fn list_sessions(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListSessionsQuery>,
) -> ApiResult<Json<ListSessionsResponse>> {
    let (limit, offset, page) = page_params(query.page, query.per_page);
    let filter = SessionFilter {
        device_id: query.device_id,
        status: query.status,
        session_type: query.session_type,
    };
    let result = state.sessions.list(&ctx, filter, limit, offset).await?;
    Ok(Json(ListSessionsResponse {
        sessions: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page,
        per_page: limit,
    }))
}

/// GET /sessions/history
pub async fn session_history(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let stats = state.sessions.history(&ctx, limit).await?;
    Ok(Json(HistoryResponse {
        total_count: stats.total_count,
        total_duration_seconds: stats.total_duration_seconds,
        total_bytes_transferred: stats.total_bytes_transferred,
        sessions: stats.sessions.into_iter().map(Into::into).collect(),
    }))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionDetailResponse>> {
    let detail = state.sessions.get(&ctx, &id).await?;
    Ok(Json(SessionDetailResponse {
        session: detail.session.into(),
        ice_candidates_count: detail.ice_candidates.len(),
        ice_candidates: detail.ice_candidates,
    }))
}

/// GET /ice-servers
pub async fn ice_servers(
    State(state): State<GatewayState>,
    Extension(_ctx): Extension<AuthContext>,
) -> Json<IceServersResponse> {
    Json(IceServersResponse {
        ice_servers: state.sessions.ice_servers(),
    })
}

/// POST /sessions/{id}/offer
pub async fn submit_offer(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<SdpRequest>,
) -> ApiResult<Json<OfferResponse>> {
    let outcome = state.sessions.submit_offer(&ctx, &id, &body.sdp).await?;
    Ok(Json(OfferResponse {
        session: outcome.session.into(),
        agent_notified: outcome.agent_notified,
    }))
}

/// POST /sessions/{id}/answer
pub async fn submit_answer(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<SdpRequest>,
) -> ApiResult<Json<SessionDto>> {
    let session = state.sessions.submit_answer(&ctx, &id, &body.sdp).await?;
    Ok(Json(session.into()))
}

/// POST /sessions/{id}/ice
pub async fn add_ice_candidate(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(candidate): Json<IceCandidate>,
) -> ApiResult<Json<IceCountResponse>> {
    let count = state.sessions.add_ice_candidate(&ctx, &id, &candidate).await?;
    Ok(Json(IceCountResponse {
        ice_candidates_count: count,
    }))
}

/// POST /sessions/{id}/end
pub async fn end_session(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<EndSessionRequest>,
) -> ApiResult<Json<SessionDto>> {
    let session = state
        .sessions
        .end(&ctx, &id, body.bytes_transferred, body.recording_url)
        .await?;
    Ok(Json(session.into()))
}

/// DELETE /sessions/stale
pub async fn cleanup_stale(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<CleanupResponse>> {
    let ids = state.sessions.cleanup_stale(&ctx).await?;
    Ok(Json(CleanupResponse {
        count: ids.len(),
        cleaned_session_ids: ids,
    }))
}
