//! `PostgreSQL` storage.
//!
//! Queries are checked at runtime (`sqlx::query_as::<_, Row>`) so the crate
//! builds without a live database. Ids come from the table sequences, which
//! makes concurrent inserts safe without any application-side locking.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::instrument;

use rjukan_stays_core::store::{self, StoreError, StoreResult};
use rjukan_stays_core::{
    BlockedDate, BlockedDateId, Booking, BookingId, BookingStatus, BookingStore, Email,
    NewBlockedDate, NewBooking, StoreSnapshot,
};

// =============================================================================
// Internal Row Types
// =============================================================================

const BOOKING_COLUMNS: &str = "id, guest_name, guest_email, guest_phone, check_in, check_out, \
                               guests, message, status, created_at";

const BLOCKED_DATE_COLUMNS: &str = "id, start_date, end_date, reason, created_at";

/// Internal row type for booking queries.
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: BookingId,
    guest_name: String,
    guest_email: String,
    guest_phone: Option<String>,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: i32,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse().map_err(|e: String| {
            StoreError::storage(format!("data corruption in booking {}: {e}", row.id))
        })?;
        let guests = u32::try_from(row.guests).map_err(|_| {
            StoreError::storage(format!(
                "data corruption in booking {}: guests = {}",
                row.id, row.guests
            ))
        })?;

        Ok(Self {
            id: row.id,
            guest_name: row.guest_name,
            guest_email: Email::from_stored(row.guest_email),
            guest_phone: row.guest_phone,
            check_in: row.check_in,
            check_out: row.check_out,
            guests,
            message: row.message,
            status,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for blocked period queries.
#[derive(Debug, sqlx::FromRow)]
struct BlockedDateRow {
    id: BlockedDateId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BlockedDateRow> for BlockedDate {
    fn from(row: BlockedDateRow) -> Self {
        Self {
            id: row.id,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> StoreResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

fn db_error(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Database query failed");
    StoreError::storage(err)
}

fn guests_column(guests: u32) -> StoreResult<i32> {
    i32::try_from(guests).map_err(|_| StoreError::validation("number of guests is too large"))
}

// =============================================================================
// Store
// =============================================================================

/// Booking store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::migrate::MigrateError` if a migration fails.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Store `value` under `key` unless the key already has a value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the query fails.
    pub async fn seed_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO NOTHING
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    /// Copy a file-store snapshot into the database in one transaction.
    ///
    /// Ids, statuses and timestamps are kept as they are. Records whose id
    /// already exists are skipped; settings are overwritten. The sequences
    /// are moved past the largest imported id afterwards.
    ///
    /// Returns the number of bookings and blocked periods inserted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if any statement fails; nothing is
    /// written in that case.
    #[instrument(skip(self, snapshot), fields(
        bookings = snapshot.bookings.len(),
        blocked_dates = snapshot.blocked_dates.len(),
    ))]
    pub async fn import_snapshot(&self, snapshot: &StoreSnapshot) -> StoreResult<(u64, u64)> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut bookings = 0;
        for booking in &snapshot.bookings {
            let result = sqlx::query(
                r"
                INSERT INTO bookings (id, guest_name, guest_email, guest_phone, check_in,
                                      check_out, guests, message, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (id) DO NOTHING
                ",
            )
            .bind(booking.id)
            .bind(&booking.guest_name)
            .bind(booking.guest_email.as_str())
            .bind(booking.guest_phone.as_deref())
            .bind(booking.check_in)
            .bind(booking.check_out)
            .bind(guests_column(booking.guests)?)
            .bind(booking.message.as_deref())
            .bind(booking.status.as_str())
            .bind(booking.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
            bookings += result.rows_affected();
        }

        let mut blocked = 0;
        for period in &snapshot.blocked_dates {
            let result = sqlx::query(
                r"
                INSERT INTO blocked_dates (id, start_date, end_date, reason, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO NOTHING
                ",
            )
            .bind(period.id)
            .bind(period.start_date)
            .bind(period.end_date)
            .bind(period.reason.as_deref())
            .bind(period.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
            blocked += result.rows_affected();
        }

        for (key, value) in &snapshot.settings {
            sqlx::query(
                r"
                INSERT INTO settings (key, value)
                VALUES ($1, $2)
                ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
                ",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for table in ["bookings", "blocked_dates"] {
            let sql = format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                 COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
            );
            sqlx::query(&sql)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        tracing::info!(bookings, blocked, "Snapshot imported");
        Ok((bookings, blocked))
    }

    /// Every collection, for export and comparison.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if a query fails.
    pub async fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let settings: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(StoreSnapshot {
            bookings: self.list_bookings().await?,
            blocked_dates: self.list_blocked_dates().await?,
            settings: settings.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }

    async fn bookings_query(&self, sql: &str) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        into_bookings(rows)
    }
}

#[async_trait]
impl BookingStore for PgStore {
    #[instrument(skip(self, input))]
    async fn create_booking(&self, input: NewBooking) -> StoreResult<Booking> {
        let valid = input.validate()?;
        let sql = format!(
            r"
            INSERT INTO bookings (guest_name, guest_email, guest_phone, check_in, check_out,
                                  guests, message, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING {BOOKING_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(&valid.guest_name)
            .bind(valid.guest_email.as_str())
            .bind(valid.guest_phone.as_deref())
            .bind(valid.stay.start)
            .bind(valid.stay.end)
            .bind(guests_column(valid.guests)?)
            .bind(valid.message.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        row.try_into()
    }

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, id DESC");
        self.bookings_query(&sql).await
    }

    async fn list_pending(&self) -> StoreResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = 'pending' \
             ORDER BY created_at ASC, id ASC"
        );
        self.bookings_query(&sql).await
    }

    async fn list_approved(&self) -> StoreResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = 'approved' \
             ORDER BY check_in ASC, id ASC"
        );
        self.bookings_query(&sql).await
    }

    async fn get_booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Booking::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: BookingId, status: BookingStatus) -> StoreResult<Booking> {
        store::ensure_decision(status)?;
        let sql = format!("UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {BOOKING_COLUMNS}");
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }

    #[instrument(skip(self))]
    async fn delete_booking(&self, id: BookingId) -> StoreResult<bool> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(true)
    }

    #[instrument(skip(self, input))]
    async fn create_blocked_date(&self, input: NewBlockedDate) -> StoreResult<BlockedDate> {
        let valid = input.validate()?;
        let sql = format!(
            r"
            INSERT INTO blocked_dates (start_date, end_date, reason)
            VALUES ($1, $2, $3)
            RETURNING {BLOCKED_DATE_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, BlockedDateRow>(&sql)
            .bind(valid.period.start)
            .bind(valid.period.end)
            .bind(valid.reason.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.into())
    }

    async fn list_blocked_dates(&self) -> StoreResult<Vec<BlockedDate>> {
        let sql =
            format!("SELECT {BLOCKED_DATE_COLUMNS} FROM blocked_dates ORDER BY start_date ASC, id ASC");
        let rows = sqlx::query_as::<_, BlockedDateRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(BlockedDate::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_blocked_date(&self, id: BlockedDateId) -> StoreResult<bool> {
        sqlx::query("DELETE FROM blocked_dates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(true)
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    #[instrument(skip(self, value))]
    async fn set_setting(&self, key: &str, value: &str) -> StoreResult<String> {
        sqlx::query_scalar::<_, String>(
            r"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            RETURNING value
            ",
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
