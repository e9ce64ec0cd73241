//! Share inspection and password verification.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use dropshare_core::AppError;

use crate::dto::request::VerifyPasswordRequest;
use crate::dto::response::{ShareResponse, VerifyResponse};
use crate::error::ApiResult;
use crate::extractors::{ShareCredentials, parse_share_id};
use crate::state::AppState;

/// GET /api/shares/{share_id}
pub async fn inspect_share(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
    ShareCredentials(credentials): ShareCredentials,
) -> ApiResult<Json<ShareResponse>> {
    let id = parse_share_id(&share_id)?;
    let access = state.lifecycle.inspect(&id, &credentials).await?;

    let (access_token, token_expires_at) = match access.access_token {
        Some(token) => (Some(token.token), Some(token.expires_at)),
        None => (None, None),
    };

    Ok(Json(ShareResponse {
        success: true,
        share: access.view,
        access_token,
        token_expires_at,
    }))
}

/// POST /api/shares/{share_id}/verify
pub async fn verify_password(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
    Json(req): Json<VerifyPasswordRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let id = parse_share_id(&share_id)?;
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let token = state.lifecycle.unlock(&id, &req.password).await?;
    Ok(Json(VerifyResponse {
        success: true,
        access_token: token.token,
        expires_at: token.expires_at,
    }))
}
