//! Integration tests for Rjukan Stays.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests (file store in a temp directory)
//! cargo test -p rjukan-stays-integration-tests
//!
//! # Include PostgreSQL store tests
//! STAYS_TEST_DATABASE_URL=postgres://localhost/stays_test \
//!     cargo test -p rjukan-stays-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `booking_api` - JSON API against a file store
//! - `site_pages` - Booking page and admin console form flows
//! - `pg_store` - `PostgreSQL` store contract (skipped without a database)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use rjukan_stays_core::BookingStore;
use rjukan_stays_site::config::SiteConfig;
use rjukan_stays_site::db::FileStore;
use rjukan_stays_site::state::AppState;

/// Admin email seeded into every test store.
pub const TEST_ADMIN_EMAIL: &str = "host@example.no";

/// A router over a file store in a temporary directory.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn BookingStore>,
    _dir: tempfile::TempDir,
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

impl TestApp {
    /// Build the site router over an empty file store.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().into_owned();

        let config = SiteConfig::from_lookup(|key| match key {
            "STAYS_DATA_DIR" => Some(data_dir.clone()),
            "STAYS_ADMIN_EMAIL" => Some(TEST_ADMIN_EMAIL.to_string()),
            _ => None,
        })
        .unwrap();

        let store: Arc<dyn BookingStore> = Arc::new(
            FileStore::open(&config.store.data_dir, &config.store.admin_email)
                .await
                .unwrap(),
        );
        let router = rjukan_stays_site::app(AppState::new(config, Arc::clone(&store)));

        Self {
            router,
            store,
            _dir: dir,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Send a JSON body with the given method.
    pub async fn json(&self, method: &str, uri: &str, body: &Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST a url-encoded form.
    pub async fn form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Submit a stay request through the API and return the created booking.
    pub async fn create_booking(&self, name: &str, check_in: &str, check_out: &str) -> Value {
        let response = self
            .json(
                "POST",
                "/api/bookings",
                &serde_json::json!({
                    "guest_name": name,
                    "guest_email": format!("{}@example.no", name.to_lowercase()),
                    "check_in": check_in,
                    "check_out": check_out,
                    "guests": 2,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.json()
    }
}
