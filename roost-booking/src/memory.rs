use crate::ledger::{BookingLedger, DayStats, LedgerError, LedgerResult};
use crate::models::{Booking, BookingFilter, BookingStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use roost_shared::{PageParams, Paginated};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory booking ledger.
///
/// A single async mutex guards the whole ledger state, so the uniqueness
/// probes inside `insert` and the compare-and-set inside `transition` are
/// atomic with their writes: of two concurrent inserts for the same seat and
/// date, exactly one can hold the lock first and the other observes the
/// fresh row.
pub struct MemoryLedger {
    bookings: Mutex<HashMap<Uuid, Booking>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingLedger for MemoryLedger {
    async fn get(&self, id: Uuid) -> LedgerResult<Option<Booking>> {
        Ok(self.bookings.lock().await.get(&id).cloned())
    }

    async fn find_active(&self, seat_id: Uuid, date: NaiveDate) -> LedgerResult<Option<Booking>> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .find(|b| b.seat_id == seat_id && b.booking_date == date && b.is_active())
            .cloned())
    }

    async fn find_active_for_employee(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> LedgerResult<Option<Booking>> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .find(|b| b.employee_id == employee_id && b.booking_date == date && b.is_active())
            .cloned())
    }

    async fn insert(
        &self,
        employee_id: Uuid,
        seat_id: Uuid,
        date: NaiveDate,
    ) -> LedgerResult<Booking> {
        let mut bookings = self.bookings.lock().await;

        if bookings
            .values()
            .any(|b| b.seat_id == seat_id && b.booking_date == date && b.is_active())
        {
            return Err(LedgerError::SeatTaken { seat_id, date });
        }
        if bookings
            .values()
            .any(|b| b.employee_id == employee_id && b.booking_date == date && b.is_active())
        {
            return Err(LedgerError::EmployeeAlreadyBooked { employee_id, date });
        }

        let booking = Booking::new(employee_id, seat_id, date);
        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: BookingStatus,
        to: BookingStatus,
        check_in_time: Option<DateTime<Utc>>,
    ) -> LedgerResult<Booking> {
        let mut bookings = self.bookings.lock().await;
        let booking = bookings.get_mut(&id).ok_or(LedgerError::NotFound)?;

        if booking.status != expected {
            return Err(LedgerError::Stale {
                expected,
                actual: booking.status,
            });
        }

        booking.status = to;
        if to == BookingStatus::CheckedIn {
            booking.check_in_time = check_in_time;
        }
        Ok(booking.clone())
    }

    async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<Booking>> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|b| b.booking_date == date)
            .cloned()
            .collect())
    }

    async fn list_for_employee(
        &self,
        employee_id: Uuid,
        filter: &BookingFilter,
        page: PageParams,
    ) -> LedgerResult<Paginated<Booking>> {
        let bookings = self.bookings.lock().await;
        let mut matched: Vec<Booking> = bookings
            .values()
            .filter(|b| b.employee_id == employee_id)
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .filter(|b| filter.date.map_or(true, |d| b.booking_date == d))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.booking_date
                .cmp(&a.booking_date)
                .then(b.created_at.cmp(&a.created_at))
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    async fn find_stale(&self, today: NaiveDate) -> LedgerResult<Vec<Booking>> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|b| b.status == BookingStatus::Confirmed && b.booking_date < today)
            .cloned()
            .collect())
    }

    async fn stats_for_date(&self, date: NaiveDate) -> LedgerResult<DayStats> {
        let bookings = self.bookings.lock().await;
        let mut stats = DayStats::default();
        for booking in bookings.values().filter(|b| b.booking_date == date) {
            match booking.status {
                BookingStatus::Confirmed => {
                    stats.confirmed += 1;
                    stats.total += 1;
                }
                BookingStatus::CheckedIn => {
                    stats.checked_in += 1;
                    stats.total += 1;
                }
                _ => {}
            }
        }
        Ok(stats)
    }
}
