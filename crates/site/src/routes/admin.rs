//! Admin console.
//!
//! A single dashboard page plus form posts that redirect back to it with a
//! `notice` or `error` query parameter.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use rjukan_stays_core::{
    BlockedDate, BlockedDateId, Booking, BookingId, BookingStatus, Email, NewBlockedDate,
};

use super::{display_date, form_date, render};
use crate::error::AppError;
use crate::services::{Dashboard, Stats};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Booking view for templates.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub id: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub check_in: String,
    pub check_out: String,
    pub nights: i64,
    pub guests: u32,
    pub message: String,
    pub status: String,
    pub created_at: String,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.as_i32(),
            guest_name: booking.guest_name.clone(),
            guest_email: booking.guest_email.to_string(),
            guest_phone: booking.guest_phone.clone().unwrap_or_default(),
            check_in: display_date(booking.check_in),
            check_out: display_date(booking.check_out),
            nights: booking.stay().nights(),
            guests: booking.guests,
            message: booking.message.clone().unwrap_or_default(),
            status: booking.status.to_string(),
            created_at: booking.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// Blocked period view for templates.
#[derive(Debug, Clone)]
pub struct BlockedDateView {
    pub id: i32,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

impl From<&BlockedDate> for BlockedDateView {
    fn from(blocked: &BlockedDate) -> Self {
        Self {
            id: blocked.id.as_i32(),
            start_date: display_date(blocked.start_date),
            end_date: display_date(blocked.end_date),
            reason: blocked.reason.clone().unwrap_or_default(),
        }
    }
}

/// Admin dashboard template.
#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub notice: Option<String>,
    pub error: Option<String>,
    pub stats: Stats,
    pub pending: Vec<BookingView>,
    pub upcoming: Vec<BookingView>,
    pub bookings: Vec<BookingView>,
    pub blocked_dates: Vec<BlockedDateView>,
    pub admin_email: String,
}

/// Banner parameters carried by redirects.
#[derive(Debug, Default, Deserialize)]
pub struct BannerQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Approve/deny form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Block-dates form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlockForm {
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

/// Settings form.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub admin_email: String,
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Redirect to the dashboard with a banner describing `result`.
fn back_to_dashboard(result: Result<String, AppError>) -> Redirect {
    let (key, message) = match result {
        Ok(notice) => ("notice", notice),
        Err(e) => {
            e.report();
            ("error", e.public_message())
        }
    };
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, &message)
        .finish();
    Redirect::to(&format!("/admin?{query}"))
}

// =============================================================================
// Handlers
// =============================================================================

/// Dashboard page.
///
/// GET /admin
#[instrument(skip(state, banner))]
pub async fn index(State(state): State<AppState>, Query(banner): Query<BannerQuery>) -> Html<String> {
    let mut error = banner.error;

    let dashboard = match state.bookings().dashboard().await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load dashboard");
            error.get_or_insert_with(|| "Bookings could not be loaded.".to_string());
            Dashboard::default()
        }
    };

    let admin_email = match state.store().get_setting("admin_email").await {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load admin email setting");
            String::new()
        }
    };

    let today = Utc::now().date_naive();
    let template = AdminTemplate {
        notice: banner.notice,
        error,
        stats: dashboard.stats,
        pending: dashboard.pending.iter().map(BookingView::from).collect(),
        upcoming: dashboard
            .approved
            .iter()
            .filter(|b| b.check_out > today)
            .map(BookingView::from)
            .collect(),
        bookings: dashboard.all.iter().map(BookingView::from).collect(),
        blocked_dates: dashboard.blocked_dates.iter().map(BlockedDateView::from).collect(),
        admin_email,
    };

    render(&template)
}

/// Approve or deny a booking.
///
/// POST /admin/bookings/{id}/status
#[instrument(skip(state, form), fields(status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let result = async {
        let status: BookingStatus = form
            .status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Unknown status: {}", form.status)))?;
        let booking = state.bookings().set_status(id, status).await?;
        Ok::<_, AppError>(format!(
            "Booking for {} ({}) {}.",
            booking.guest_name,
            booking.stay(),
            booking.status
        ))
    }
    .await;

    back_to_dashboard(result)
}

/// Delete a booking.
///
/// POST /admin/bookings/{id}/delete
#[instrument(skip(state))]
pub async fn delete_booking(State(state): State<AppState>, Path(id): Path<BookingId>) -> Redirect {
    let result = state
        .store()
        .delete_booking(id)
        .await
        .map(|_| {
            tracing::info!(booking_id = %id, "Booking deleted");
            format!("Booking {id} deleted.")
        })
        .map_err(AppError::from);

    back_to_dashboard(result)
}

/// Block a period.
///
/// POST /admin/blocked-dates
#[instrument(skip(state, form), fields(start = %form.start_date, end = %form.end_date))]
pub async fn create_blocked_date(
    State(state): State<AppState>,
    Form(form): Form<BlockForm>,
) -> Redirect {
    let result = async {
        let input = NewBlockedDate {
            start_date: form_date(&form.start_date, "Start date")?,
            end_date: form_date(&form.end_date, "End date")?,
            reason: Some(form.reason.clone()),
        };
        let blocked = state.bookings().block_dates(input).await?;
        Ok::<_, AppError>(format!("Blocked {}.", blocked.period()))
    }
    .await;

    back_to_dashboard(result)
}

/// Unblock a period.
///
/// POST /admin/blocked-dates/{id}/delete
#[instrument(skip(state))]
pub async fn delete_blocked_date(
    State(state): State<AppState>,
    Path(id): Path<BlockedDateId>,
) -> Redirect {
    let result = state
        .store()
        .delete_blocked_date(id)
        .await
        .map(|_| {
            tracing::info!(blocked_date_id = %id, "Blocked period deleted");
            "Blocked period removed.".to_string()
        })
        .map_err(AppError::from);

    back_to_dashboard(result)
}

/// Update the admin email setting.
///
/// POST /admin/settings
#[instrument(skip(state, form))]
pub async fn update_settings(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    let result = async {
        let email = Email::parse(&form.admin_email)
            .map_err(|e| AppError::BadRequest(format!("Admin email: {e}")))?;
        let stored = state.store().set_setting("admin_email", email.as_str()).await?;
        tracing::info!(admin_email = %stored, "Admin email updated");
        Ok::<_, AppError>(format!("Admin email set to {stored}."))
    }
    .await;

    back_to_dashboard(result)
}
