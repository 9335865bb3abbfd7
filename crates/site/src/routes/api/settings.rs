//! Settings API handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::extract::{ApiJson, ApiPath};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// A setting as returned by the API. `value` is `null` when unset.
#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: Option<String>,
}

/// Body of a setting update.
#[derive(Debug, Deserialize)]
pub struct SettingUpdate {
    pub value: String,
}

/// GET /api/settings/{key}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<SettingResponse>> {
    let value = state.store().get_setting(&key).await?;
    Ok(Json(SettingResponse { key, value }))
}

/// PUT /api/settings/{key}
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
    ApiJson(body): ApiJson<SettingUpdate>,
) -> Result<Json<SettingResponse>> {
    if key.trim().is_empty() {
        return Err(AppError::BadRequest("Setting key is required".to_string()));
    }
    let value = state.store().set_setting(&key, &body.value).await?;
    tracing::info!(key = %key, "Setting updated");
    Ok(Json(SettingResponse {
        key,
        value: Some(value),
    }))
}
