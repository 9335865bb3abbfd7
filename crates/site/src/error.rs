//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. API handlers return `Result<T, AppError>`;
//! the response body is `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use rjukan_stays_core::{AvailabilityError, StoreError};

use crate::services::bookings::BookingError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[source] StoreError),

    /// Requested dates collide with an approved stay or blocked period.
    #[error("Selected dates are not available: {0}")]
    Unavailable(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Path, query or body could not be extracted.
    #[error("Rejected request ({status}): {message}")]
    Rejected {
        /// Status chosen by the extractor.
        status: StatusCode,
        /// Extractor's description of the problem.
        message: String,
    },
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::Validation(_)) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::CONFLICT,
            Self::Rejected { status, .. } => *status,
            Self::Store(StoreError::Storage(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to guests and admins.
    ///
    /// Storage and internal failures are reduced to a generic message.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(StoreError::Validation(msg))
            | Self::BadRequest(msg)
            | Self::Rejected { message: msg, .. } => msg.clone(),
            Self::Store(StoreError::NotFound) => "Not found".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unavailable(_) => {
                "Selected dates are not available. Please choose different dates.".to_string()
            }
            Self::Store(StoreError::Storage(_)) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Logs server-side failures and reports them to Sentry.
    pub fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Store(e) => Self::Store(e),
            BookingError::Availability(AvailabilityError::InvalidRange { .. }) => Self::BadRequest(
                "Check-out date must be after check-in date.".to_string(),
            ),
            BookingError::Availability(e @ AvailabilityError::Unavailable { .. }) => {
                Self::Unavailable(e.to_string())
            }
            BookingError::NotFound(id) => Self::NotFound(format!("Booking {id}")),
        }
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    Self::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
