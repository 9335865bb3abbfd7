//! HTTP route handlers for the booking site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Booking page with availability calendar
//! POST /book                              - Submit a stay request (form)
//!
//! # Admin console
//! GET  /admin                             - Dashboard
//! POST /admin/bookings/{id}/status        - Approve or deny
//! POST /admin/bookings/{id}/delete        - Delete a booking
//! POST /admin/blocked-dates               - Block a period
//! POST /admin/blocked-dates/{id}/delete   - Unblock a period
//! POST /admin/settings                    - Update the admin email
//!
//! # JSON API
//! GET    /api/bookings[?status=]          - List bookings
//! POST   /api/bookings                    - Submit a stay request
//! GET    /api/bookings/{id}               - Booking detail
//! PATCH  /api/bookings/{id}               - Approve or deny
//! DELETE /api/bookings/{id}               - Delete a booking
//! GET    /api/blocked-dates               - List blocked periods
//! POST   /api/blocked-dates               - Block a period
//! DELETE /api/blocked-dates/{id}          - Unblock a period
//! GET    /api/unavailable-dates           - Busy intervals
//! GET    /api/settings/{key}              - Read a setting
//! PUT    /api/settings/{key}              - Write a setting
//! ```

pub mod admin;
pub mod api;
pub mod home;

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use chrono::NaiveDate;

use crate::error::AppError;
use crate::state::AppState;

/// Create the admin console routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/bookings/{id}/status", post(admin::update_status))
        .route("/bookings/{id}/delete", post(admin::delete_booking))
        .route("/blocked-dates", post(admin::create_blocked_date))
        .route("/blocked-dates/{id}/delete", post(admin::delete_blocked_date))
        .route("/settings", post(admin::update_settings))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Public booking page
        .route("/", get(home::index))
        .route("/book", post(home::book))
        // Admin console
        .nest("/admin", admin_routes())
        // JSON API
        .nest("/api", api::routes())
}

/// Render a template, falling back to a plain error page.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Parse an optional `YYYY-MM-DD` form field. Blank means absent.
pub(crate) fn form_date(raw: &str, label: &str) -> Result<Option<NaiveDate>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{label} must be a date (YYYY-MM-DD).")))
}

/// Human-readable date for pages, e.g. `Mon 10 Jun 2024`.
pub(crate) fn display_date(date: NaiveDate) -> String {
    date.format("%a %-d %b %Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_date() {
        assert_eq!(form_date("", "Check-in").unwrap(), None);
        assert_eq!(form_date("  ", "Check-in").unwrap(), None);
        assert_eq!(
            form_date("2024-06-10", "Check-in").unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
        );

        let err = form_date("10/06/2024", "Check-in").unwrap_err();
        assert_eq!(
            err.public_message(),
            "Check-in must be a date (YYYY-MM-DD)."
        );
    }

    #[test]
    fn test_display_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(display_date(date), "Mon 10 Jun 2024");
    }
}
