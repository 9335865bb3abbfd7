//! Public booking page.
//!
//! Shows which nights are taken over the coming months and takes stay
//! requests. Submissions go through the booking service, so the page never
//! has the last word on availability.

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;

use rjukan_stays_core::availability::{self, DateRange};
use rjukan_stays_core::NewBooking;

use super::{display_date, form_date, render};
use crate::error::AppError;
use crate::state::AppState;

/// How many calendar months the booking page shows.
const CALENDAR_MONTHS: u32 = 3;

// =============================================================================
// View Types
// =============================================================================

/// One night in the availability calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub number: u32,
    pub unavailable: bool,
    pub past: bool,
}

/// One month in the availability calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    pub label: String,
    /// Empty cells before the 1st in a Monday-first grid.
    pub leading_blanks: usize,
    pub days: Vec<CalendarDay>,
}

/// A busy period as listed on the page.
#[derive(Debug, Clone)]
pub struct PeriodView {
    pub start: String,
    pub end: String,
}

impl From<&DateRange> for PeriodView {
    fn from(range: &DateRange) -> Self {
        Self {
            start: display_date(range.start),
            end: display_date(range.end),
        }
    }
}

/// Stay request form, as posted by the page.
///
/// Every field is a string so a half-filled form can be shown again.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: String,
    pub message: String,
}

impl BookingForm {
    /// Convert to store input. Blank fields become absent and are reported
    /// by validation downstream.
    fn to_new_booking(&self) -> Result<NewBooking, AppError> {
        let guests = match self.guests.trim() {
            "" => None,
            raw => Some(raw.parse::<u32>().map_err(|_| {
                AppError::BadRequest("Number of guests must be a whole number.".to_string())
            })?),
        };

        Ok(NewBooking {
            guest_name: self.guest_name.clone(),
            guest_email: self.guest_email.clone(),
            guest_phone: Some(self.guest_phone.clone()),
            check_in: form_date(&self.check_in, "Check-in")?,
            check_out: form_date(&self.check_out, "Check-out")?,
            guests,
            message: Some(self.message.clone()),
        })
    }
}

/// Booking page template.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub notice: Option<String>,
    pub error: Option<String>,
    pub calendar: Vec<CalendarMonth>,
    pub unavailable: Vec<PeriodView>,
    pub form: BookingForm,
    pub contact_email: String,
}

// =============================================================================
// Calendar
// =============================================================================

/// Build `months` calendar months starting with the month containing `today`.
#[must_use]
pub fn calendar(today: NaiveDate, months: u32, busy: &[DateRange]) -> Vec<CalendarMonth> {
    let Some(first_of_this_month) = today.with_day(1) else {
        return Vec::new();
    };

    (0..months)
        .filter_map(|offset| {
            let first = first_of_this_month.checked_add_months(Months::new(offset))?;
            let next = first.checked_add_months(Months::new(1))?;
            let days = (0..(next - first).num_days())
                .filter_map(|d| first.checked_add_days(Days::new(u64::try_from(d).ok()?)))
                .map(|date| CalendarDay {
                    number: date.day(),
                    unavailable: availability::is_date_unavailable(date, busy),
                    past: date < today,
                })
                .collect();

            Some(CalendarMonth {
                label: first.format("%B %Y").to_string(),
                leading_blanks: first.weekday().num_days_from_monday() as usize,
                days,
            })
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// Booking page.
///
/// GET /
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Html<String> {
    render(&page(&state, None, None, BookingForm::default()).await)
}

/// Submit a stay request from the booking form.
///
/// POST /book
///
/// Re-renders the page with a banner; a rejected request keeps the form
/// filled in and responds with the error's status code.
#[instrument(skip(state, form), fields(check_in = %form.check_in, check_out = %form.check_out))]
pub async fn book(State(state): State<AppState>, Form(form): Form<BookingForm>) -> impl IntoResponse {
    let result = match form.to_new_booking() {
        Ok(input) => state.bookings().submit(input).await.map_err(AppError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(booking) => {
            let notice = format!(
                "Thank you, {}! Your request for {} is pending approval. We'll be in touch at {}.",
                booking.guest_name,
                booking.stay(),
                booking.guest_email
            );
            let template = page(&state, Some(notice), None, BookingForm::default()).await;
            (StatusCode::OK, render(&template))
        }
        Err(e) => {
            e.report();
            let template = page(&state, None, Some(e.public_message()), form).await;
            (e.status(), render(&template))
        }
    }
}

async fn page(
    state: &AppState,
    notice: Option<String>,
    mut error: Option<String>,
    form: BookingForm,
) -> HomeTemplate {
    let busy = match state.bookings().unavailable_intervals().await {
        Ok(busy) => busy,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load unavailable dates");
            error.get_or_insert_with(|| {
                "Availability could not be loaded. Please try again shortly.".to_string()
            });
            Vec::new()
        }
    };

    let contact_email = match state.store().get_setting("admin_email").await {
        Ok(Some(email)) => email,
        Ok(None) => state.config().store.admin_email.clone(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load admin email setting");
            state.config().store.admin_email.clone()
        }
    };

    let today = Utc::now().date_naive();
    let mut upcoming: Vec<DateRange> = busy.iter().filter(|r| r.end > today).copied().collect();
    upcoming.sort();

    HomeTemplate {
        notice,
        error,
        calendar: calendar(today, CALENDAR_MONTHS, &busy),
        unavailable: upcoming.iter().map(PeriodView::from).collect(),
        form,
        contact_email,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_calendar_marks_nights_but_not_departure_day() {
        let busy = [DateRange::new(date("2024-06-10"), date("2024-06-15")).unwrap()];
        let months = calendar(date("2024-06-01"), 1, &busy);
        assert_eq!(months.len(), 1);

        let june = &months[0];
        assert_eq!(june.label, "June 2024");
        assert_eq!(june.days.len(), 30);
        // 1 June 2024 is a Saturday.
        assert_eq!(june.leading_blanks, 5);

        let taken: Vec<u32> = june
            .days
            .iter()
            .filter(|d| d.unavailable)
            .map(|d| d.number)
            .collect();
        assert_eq!(taken, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_calendar_spans_year_end_and_marks_past_days() {
        let months = calendar(date("2024-12-20"), 3, &[]);
        let labels: Vec<&str> = months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["December 2024", "January 2025", "February 2025"]);

        assert!(months[0].days[18].past);
        assert!(!months[0].days[19].past);
        assert_eq!(months[2].days.len(), 28);
    }

    #[test]
    fn test_form_conversion() {
        let form = BookingForm {
            guest_name: "Kari".to_string(),
            guest_email: "kari@example.no".to_string(),
            check_in: "2024-06-10".to_string(),
            check_out: "2024-06-15".to_string(),
            guests: " 3 ".to_string(),
            ..BookingForm::default()
        };
        let input = form.to_new_booking().unwrap();
        assert_eq!(input.guests, Some(3));
        assert_eq!(input.check_in, Some(date("2024-06-10")));

        let blank = BookingForm::default().to_new_booking().unwrap();
        assert_eq!(blank.guests, None);
        assert_eq!(blank.check_in, None);

        let bad = BookingForm {
            guests: "two".to_string(),
            ..BookingForm::default()
        };
        assert!(matches!(bad.to_new_booking(), Err(AppError::BadRequest(_))));
    }
}
