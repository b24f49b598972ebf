// SPDX-FileCopyrightText: 2026 Breeze Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transfer endpoints.
//!
//! Chunk upload is a multipart form with a `chunkIndex` text part and a
//! `chunk` file part. Download streams the assembled artifact with an exact
//! `Content-Length`, never buffering it in memory.

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use breeze_core::BreezeError;
use breeze_core::types::{AuthContext, TransferDirection, TransferStatus};
use breeze_storage::TransferRecord;
use breeze_transfer::NewTransfer;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::error::ApiResult;
use crate::server::GatewayState;
use crate::sessions::page_params;

/// Wire shape of a transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDto {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub device_id: String,
    pub org_id: String,
    pub user_id: String,
    pub direction: TransferDirection,
    pub remote_path: String,
    pub local_filename: String,
    pub size_bytes: i64,
    pub bytes_received: i64,
    pub status: TransferStatus,
    pub progress_percent: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<TransferRecord> for TransferDto {
    fn from(rec: TransferRecord) -> Self {
        Self {
            id: rec.id,
            session_id: rec.session_id,
            device_id: rec.device_id,
            org_id: rec.org_id,
            user_id: rec.user_id,
            direction: rec.direction,
            remote_path: rec.remote_path,
            local_filename: rec.local_filename,
            size_bytes: rec.size_bytes,
            bytes_received: rec.bytes_received,
            status: rec.status,
            progress_percent: rec.progress_percent,
            error_message: rec.error_message,
            created_at: rec.created_at,
            completed_at: rec.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub device_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    pub direction: TransferDirection,
    pub remote_path: String,
    pub local_filename: String,
    pub size_bytes: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransfersQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransfersResponse {
    pub transfers: Vec<TransferDto>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    #[serde(default)]
    pub progress_percent: Option<i64>,
    #[serde(default)]
    pub status: Option<TransferStatus>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// POST /transfers
pub async fn create_transfer(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CreateTransferRequest>,
) -> ApiResult<(StatusCode, Json<TransferDto>)> {
    let transfer = state
        .transfers
        .create(
            &ctx,
            NewTransfer {
                device_id: body.device_id,
                session_id: body.session_id,
                direction: body.direction,
                remote_path: body.remote_path,
                local_filename: body.local_filename,
                size_bytes: body.size_bytes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(transfer.into())))
}

/// GET /transfers
pub async fn list_transfers(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListTransfersQuery>,
) -> ApiResult<Json<ListTransfersResponse>> {
    let (limit, offset, page) = page_params(query.page, query.per_page);
    let result = state.transfers.list(&ctx, limit, offset).await?;
    Ok(Json(ListTransfersResponse {
        transfers: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page,
        per_page: limit,
    }))
}

/// GET /transfers/{id}
pub async fn get_transfer(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TransferDto>> {
    let transfer = state.transfers.get(&ctx, &id).await?;
    Ok(Json(transfer.into()))
}

/// POST /transfers/{id}/cancel
pub async fn cancel_transfer(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TransferDto>> {
    let transfer = state.transfers.cancel(&ctx, &id).await?;
    Ok(Json(transfer.into()))
}

/// POST /transfers/{id}/chunks
pub async fn upload_chunk(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<TransferDto>> {
    let mut index: Option<u32> = None;
    let mut bytes: Option<axum::body::Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BreezeError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("chunkIndex") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| BreezeError::Validation(format!("unreadable chunkIndex: {e}")))?;
                index = Some(text.trim().parse().map_err(|_| {
                    BreezeError::Validation(format!("chunkIndex `{text}` is not a valid index"))
                })?);
            }
            Some("chunk") => {
                bytes = Some(field.bytes().await.map_err(|e| {
                    BreezeError::Validation(format!("unreadable chunk part: {e}"))
                })?);
            }
            _ => {}
        }
    }
    let index =
        index.ok_or_else(|| BreezeError::Validation("missing chunkIndex part".to_string()))?;
    let bytes = bytes.ok_or_else(|| BreezeError::Validation("missing chunk part".to_string()))?;

    let transfer = state.transfers.ingest_chunk(&ctx, &id, index, &bytes).await?;
    Ok(Json(transfer.into()))
}

/// GET /transfers/{id}/download
pub async fn download_transfer(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let (transfer, stream) = state.transfers.download(&ctx, &id).await?;
    let body = Body::from_stream(ReaderStream::new(stream.reader));
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, stream.len.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    sanitize_filename(&transfer.local_filename)
                ),
            ),
        ],
        body,
    )
        .into_response())
}

/// PATCH /transfers/{id}/progress
pub async fn update_progress(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<ProgressRequest>,
) -> ApiResult<Json<TransferDto>> {
    let transfer = state
        .transfers
        .update_progress(&ctx, &id, body.progress_percent, body.status, body.error_message)
        .await?;
    Ok(Json(transfer.into()))
}

/// Strip quotes and control characters so the filename cannot escape the
/// disposition header.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}
