//! Booking API handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use rjukan_stays_core::{Booking, BookingId, BookingStatus, NewBooking};

use super::DeleteResponse;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for listing bookings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Body of a status update.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

fn parse_status(raw: &str) -> Result<BookingStatus> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown status: {raw}")))
}

/// List bookings, newest first.
///
/// GET /api/bookings[?status=pending|approved|denied]
///
/// The `pending` and `approved` filters use the store's review-queue and
/// check-in orderings.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Booking>>> {
    let store = state.store();
    let bookings = match query.status.as_deref().map(parse_status).transpose()? {
        None => store.list_bookings().await?,
        Some(BookingStatus::Pending) => store.list_pending().await?,
        Some(BookingStatus::Approved) => store.list_approved().await?,
        Some(BookingStatus::Denied) => store
            .list_bookings()
            .await?
            .into_iter()
            .filter(|b| b.status == BookingStatus::Denied)
            .collect(),
    };
    Ok(Json(bookings))
}

/// GET /api/bookings/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookingId>,
) -> Result<Json<Booking>> {
    state
        .store()
        .get_booking(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Booking {id}")))
}

/// Submit a stay request.
///
/// POST /api/bookings
///
/// The booking is always created `pending`; a `status` in the body is
/// ignored.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewBooking>,
) -> Result<(StatusCode, Json<Booking>)> {
    let booking = state.bookings().submit(input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Approve or deny a booking.
///
/// PATCH /api/bookings/{id}
#[instrument(skip(state, body), fields(status = %body.status))]
pub async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookingId>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Booking>> {
    let status = parse_status(&body.status)?;
    let booking = state.bookings().set_status(id, status).await?;
    Ok(Json(booking))
}

/// DELETE /api/bookings/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookingId>,
) -> Result<Json<DeleteResponse>> {
    let success = state.store().delete_booking(id).await?;
    tracing::info!(booking_id = %id, "Booking deleted");
    Ok(Json(DeleteResponse { success }))
}
