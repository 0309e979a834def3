use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle status.
///
/// `Confirmed` is the only non-terminal state: a booking either gets checked
/// in on its date, cancelled before the cutoff, or expired by the sweeper
/// once the date has passed. The three other states accept no further
/// transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    CheckedIn,
    Cancelled,
    Expired,
}

impl BookingStatus {
    /// Active bookings occupy their seat; cancelled/expired ones free it.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::CheckedIn)
    }

    pub fn is_terminal(self) -> bool {
        self != BookingStatus::Confirmed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Expired => "expired",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "checked_in" => Ok(BookingStatus::CheckedIn),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "expired" => Ok(BookingStatus::Expired),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One employee holding one seat for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub seat_id: Uuid,
    pub booking_date: NaiveDate,
    pub status: BookingStatus,
    /// Set exactly when the status becomes `checked_in`, never earlier than
    /// the booking date's start.
    pub check_in_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// A freshly reserved booking. Creation always lands in `Confirmed`.
    pub fn new(employee_id: Uuid, seat_id: Uuid, booking_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            seat_id,
            booking_date,
            status: BookingStatus::Confirmed,
            check_in_time: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Filter for an employee's booking history.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_confirmed_and_checked_in_are_active() {
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::CheckedIn.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(!BookingStatus::Expired.is_active());
    }

    #[test]
    fn confirmed_is_the_only_non_terminal_state() {
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(BookingStatus::CheckedIn.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Expired.is_terminal());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::Cancelled,
            BookingStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("checked-in".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn new_booking_is_confirmed_without_check_in_time() {
        let booking = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        );
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.check_in_time.is_none());
    }
}
