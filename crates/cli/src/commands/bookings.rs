//! Booking listing command.

use rjukan_stays_core::{Booking, BookingStatus};

use super::{CommandError, open_configured_store};

/// Print bookings, optionally filtered by status.
///
/// Uses the same orderings as the site: pending oldest first, approved by
/// check-in, everything else newest first.
///
/// # Errors
///
/// Returns an error for an unknown status or if the store cannot be read.
pub async fn list(status: Option<&str>) -> Result<(), CommandError> {
    let status = status
        .map(|s| {
            s.parse::<BookingStatus>()
                .map_err(|_| CommandError::InvalidStatus(s.to_owned()))
        })
        .transpose()?;

    let store = open_configured_store().await?;
    let bookings = match status {
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

    #[allow(clippy::print_stdout)]
    {
        for booking in &bookings {
            println!("{}", format_booking(booking));
        }
    }
    tracing::info!("{} bookings", bookings.len());
    Ok(())
}

/// One line per booking: id, status, dates, guest.
fn format_booking(booking: &Booking) -> String {
    format!(
        "{:>4}  {:<8}  {}  {:>2} nights  {} guests  {} <{}>",
        booking.id.as_i32(),
        booking.status,
        booking.stay(),
        booking.stay().nights(),
        booking.guests,
        booking.guest_name,
        booking.guest_email
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rjukan_stays_core::{BookingId, Email};

    use super::*;

    #[test]
    fn test_format_booking() {
        let booking = Booking {
            id: BookingId::new(7),
            guest_name: "Kari Nordmann".to_owned(),
            guest_email: Email::parse("kari@example.no").unwrap(),
            guest_phone: None,
            check_in: "2024-06-10".parse().unwrap(),
            check_out: "2024-06-15".parse().unwrap(),
            guests: 2,
            message: None,
            status: BookingStatus::Approved,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        };

        assert_eq!(
            format_booking(&booking),
            "   7  approved  2024-06-10 to 2024-06-15   5 nights  2 guests  Kari Nordmann <kari@example.no>"
        );
    }
}
