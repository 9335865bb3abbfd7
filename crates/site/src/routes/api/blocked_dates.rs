//! Blocked period API handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use rjukan_stays_core::{BlockedDate, BlockedDateId, NewBlockedDate};

use super::DeleteResponse;
use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::state::AppState;

/// GET /api/blocked-dates
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BlockedDate>>> {
    Ok(Json(state.store().list_blocked_dates().await?))
}

/// POST /api/blocked-dates
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewBlockedDate>,
) -> Result<(StatusCode, Json<BlockedDate>)> {
    let blocked = state.bookings().block_dates(input).await?;
    Ok((StatusCode::CREATED, Json(blocked)))
}

/// DELETE /api/blocked-dates/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BlockedDateId>,
) -> Result<Json<DeleteResponse>> {
    let success = state.store().delete_blocked_date(id).await?;
    tracing::info!(blocked_date_id = %id, "Blocked period deleted");
    Ok(Json(DeleteResponse { success }))
}
