//! JSON API consumed by the booking page and admin tooling.
//!
//! Errors are returned as `{"error": "<message>"}` with the matching status
//! code (see [`crate::error::AppError`]), including malformed ids and
//! bodies rejected by the [`extract`] wrappers.

pub mod blocked_dates;
pub mod bookings;
pub mod extract;
pub mod settings;

use axum::{Json, Router, extract::State, routing::get};

use rjukan_stays_core::DateRange;

use crate::error::Result;
use crate::state::AppState;

/// Create the API routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(bookings::list).post(bookings::create))
        .route(
            "/bookings/{id}",
            get(bookings::show)
                .patch(bookings::update_status)
                .delete(bookings::delete),
        )
        .route(
            "/blocked-dates",
            get(blocked_dates::list).post(blocked_dates::create),
        )
        .route(
            "/blocked-dates/{id}",
            axum::routing::delete(blocked_dates::delete),
        )
        .route("/unavailable-dates", get(unavailable_dates))
        .route("/settings/{key}", get(settings::show).put(settings::update))
}

/// Busy intervals from approved stays and blocked periods.
///
/// GET /api/unavailable-dates
pub async fn unavailable_dates(State(state): State<AppState>) -> Result<Json<Vec<DateRange>>> {
    let intervals = state.bookings().unavailable_intervals().await?;
    Ok(Json(intervals))
}

/// Body of a successful delete.
#[derive(Debug, serde::Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}
