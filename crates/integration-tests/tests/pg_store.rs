//! Integration tests for the `PostgreSQL` store.
//!
//! These tests need a disposable database:
//!
//! ```bash
//! STAYS_TEST_DATABASE_URL=postgres://localhost/stays_test \
//!     cargo test -p rjukan-stays-integration-tests --test pg_store
//! ```
//!
//! Without `STAYS_TEST_DATABASE_URL` every test returns early. All tests
//! share one database, so they run serially behind a lock and start from
//! truncated tables.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{NaiveDate, TimeZone, Utc};
use secrecy::SecretString;
use tokio::sync::Mutex;

use rjukan_stays_core::{
    BlockedDate, BlockedDateId, Booking, BookingId, BookingStatus, BookingStore, Email,
    NewBlockedDate, NewBooking, StoreError, StoreSnapshot,
};
use rjukan_stays_site::db::{self, PgStore};

fn db_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

async fn test_store() -> Option<PgStore> {
    let url = std::env::var("STAYS_TEST_DATABASE_URL").ok()?;
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    let store = PgStore::new(pool);
    store.migrate().await.unwrap();
    sqlx::query("TRUNCATE bookings, blocked_dates, settings RESTART IDENTITY")
        .execute(store.pool())
        .await
        .unwrap();
    Some(store)
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn request(name: &str, check_in: &str, check_out: &str) -> NewBooking {
    NewBooking {
        guest_name: name.to_string(),
        guest_email: "guest@example.no".to_string(),
        check_in: Some(date(check_in)),
        check_out: Some(date(check_out)),
        guests: Some(2),
        ..NewBooking::default()
    }
}

// =============================================================================
// Bookings
// =============================================================================

#[tokio::test]
async fn test_create_and_transition_booking() {
    let _guard = db_lock().lock().await;
    let Some(store) = test_store().await else {
        return;
    };

    let booking = store
        .create_booking(request("Kari", "2024-06-10", "2024-06-15"))
        .await
        .unwrap();
    assert_eq!(booking.id, BookingId::new(1));
    assert_eq!(booking.status, BookingStatus::Pending);

    let approved = store
        .update_status(booking.id, BookingStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, BookingStatus::Approved);

    let denied = store
        .update_status(booking.id, BookingStatus::Denied)
        .await
        .unwrap();
    assert_eq!(denied.status, BookingStatus::Denied);

    assert!(matches!(
        store.update_status(booking.id, BookingStatus::Pending).await,
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        store.update_status(BookingId::new(99), BookingStatus::Denied).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn test_list_orders_and_idempotent_delete() {
    let _guard = db_lock().lock().await;
    let Some(store) = test_store().await else {
        return;
    };

    let a = store.create_booking(request("A", "2024-08-01", "2024-08-05")).await.unwrap();
    let b = store.create_booking(request("B", "2024-06-01", "2024-06-05")).await.unwrap();
    store.create_booking(request("C", "2024-07-01", "2024-07-05")).await.unwrap();
    for id in [a.id, b.id] {
        store.update_status(id, BookingStatus::Approved).await.unwrap();
    }

    let ids = |bookings: Vec<Booking>| bookings.iter().map(|b| b.id.as_i32()).collect::<Vec<_>>();
    assert_eq!(ids(store.list_approved().await.unwrap()), vec![2, 1]);
    assert_eq!(ids(store.list_pending().await.unwrap()), vec![3]);
    assert_eq!(ids(store.list_bookings().await.unwrap()), vec![3, 2, 1]);

    assert!(store.delete_booking(BookingId::new(2)).await.unwrap());
    assert!(store.delete_booking(BookingId::new(2)).await.unwrap());
    assert_eq!(store.get_booking(BookingId::new(2)).await.unwrap(), None);
}

// =============================================================================
// Blocked Dates and Settings
// =============================================================================

#[tokio::test]
async fn test_blocked_dates_and_settings() {
    let _guard = db_lock().lock().await;
    let Some(store) = test_store().await else {
        return;
    };

    let blocked = store
        .create_blocked_date(NewBlockedDate {
            start_date: Some(date("2024-07-01")),
            end_date: Some(date("2024-07-10")),
            reason: Some("Maintenance".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(blocked.id, BlockedDateId::new(1));
    assert_eq!(store.list_blocked_dates().await.unwrap(), vec![blocked.clone()]);
    assert!(store.delete_blocked_date(blocked.id).await.unwrap());

    store.seed_setting("admin_email", "first@example.no").await.unwrap();
    store.seed_setting("admin_email", "second@example.no").await.unwrap();
    assert_eq!(
        store.get_setting("admin_email").await.unwrap().as_deref(),
        Some("first@example.no")
    );
    assert_eq!(
        store.set_setting("admin_email", "host@example.no").await.unwrap(),
        "host@example.no"
    );
    assert!(store.health_check().await.is_ok());
}

// =============================================================================
// Import
// =============================================================================

#[tokio::test]
async fn test_import_snapshot_keeps_ids_and_advances_sequences() {
    let _guard = db_lock().lock().await;
    let Some(store) = test_store().await else {
        return;
    };

    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let snapshot = StoreSnapshot {
        bookings: vec![Booking {
            id: BookingId::new(7),
            guest_name: "Kari".to_string(),
            guest_email: Email::parse("kari@example.no").unwrap(),
            guest_phone: Some("+47 400 00 000".to_string()),
            check_in: date("2024-06-10"),
            check_out: date("2024-06-15"),
            guests: 3,
            message: None,
            status: BookingStatus::Approved,
            created_at,
        }],
        blocked_dates: vec![BlockedDate {
            id: BlockedDateId::new(4),
            start_date: date("2024-07-01"),
            end_date: date("2024-07-10"),
            reason: None,
            created_at,
        }],
        settings: BTreeMap::from([("admin_email".to_string(), "host@example.no".to_string())]),
    };

    assert_eq!(store.import_snapshot(&snapshot).await.unwrap(), (1, 1));
    // Re-running skips existing records.
    assert_eq!(store.import_snapshot(&snapshot).await.unwrap(), (0, 0));

    let imported = store.get_booking(BookingId::new(7)).await.unwrap().unwrap();
    assert_eq!(imported, snapshot.bookings[0]);

    let next = store
        .create_booking(request("Ola", "2024-08-01", "2024-08-03"))
        .await
        .unwrap();
    assert_eq!(next.id, BookingId::new(8));

    assert_eq!(store.snapshot().await.unwrap().settings, snapshot.settings);
}
