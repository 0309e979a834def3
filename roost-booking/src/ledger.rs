use crate::models::{Booking, BookingFilter, BookingStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use roost_shared::{PageParams, Paginated};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The seat already has an active booking for that date.
    #[error("seat is already booked for {date}")]
    SeatTaken { seat_id: Uuid, date: NaiveDate },

    /// The employee already holds an active booking for that date,
    /// regardless of seat.
    #[error("employee already has a booking for {date}")]
    EmployeeAlreadyBooked { employee_id: Uuid, date: NaiveDate },

    /// Compare-and-set mismatch: the booking moved between read and write.
    #[error("booking was already updated (expected {expected}, found {actual})")]
    Stale {
        expected: BookingStatus,
        actual: BookingStatus,
    },

    #[error("booking not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Per-day booking counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DayStats {
    /// Active bookings (confirmed + checked_in).
    pub total: u64,
    pub confirmed: u64,
    pub checked_in: u64,
}

/// The authoritative store of booking records — the sole writer of booking
/// rows.
///
/// Implementations must make `insert` atomic against both uniqueness
/// invariants (one active booking per seat per day, one per employee per
/// day) and `transition` a compare-and-set on the current status: of two
/// racing writers, exactly one wins and the loser observes a typed error.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn get(&self, id: Uuid) -> LedgerResult<Option<Booking>>;

    async fn find_active(&self, seat_id: Uuid, date: NaiveDate) -> LedgerResult<Option<Booking>>;

    async fn find_active_for_employee(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> LedgerResult<Option<Booking>>;

    /// Creates a confirmed booking, or fails with `SeatTaken` /
    /// `EmployeeAlreadyBooked` so callers can produce the right message.
    async fn insert(
        &self,
        employee_id: Uuid,
        seat_id: Uuid,
        date: NaiveDate,
    ) -> LedgerResult<Booking>;

    /// Compare-and-set status update. `check_in_time` is recorded only when
    /// the target status is `checked_in`.
    async fn transition(
        &self,
        id: Uuid,
        expected: BookingStatus,
        to: BookingStatus,
        check_in_time: Option<DateTime<Utc>>,
    ) -> LedgerResult<Booking>;

    /// All bookings touching a date, active or not. Reconciliation input.
    async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<Booking>>;

    /// Ordered `booking_date DESC, created_at DESC`.
    async fn list_for_employee(
        &self,
        employee_id: Uuid,
        filter: &BookingFilter,
        page: PageParams,
    ) -> LedgerResult<Paginated<Booking>>;

    /// Confirmed bookings whose date is before `today` — sweeper input.
    async fn find_stale(&self, today: NaiveDate) -> LedgerResult<Vec<Booking>>;

    async fn stats_for_date(&self, date: NaiveDate) -> LedgerResult<DayStats>;
}
