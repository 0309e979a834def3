use crate::ledger::{BookingLedger, LedgerError, LedgerResult};
use crate::models::{Booking, BookingFilter, BookingStatus};
use crate::policy::LifecyclePolicy;
use chrono::{Datelike, NaiveDate};
use roost_core::Clock;
use roost_shared::{PageParams, Paginated};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// The requested date is before today or past the booking horizon.
    #[error("booking date {date} is outside the allowed booking window")]
    OutsideHorizon { date: NaiveDate },

    /// Missing, or owned by someone else — indistinguishable on purpose.
    #[error("booking not found")]
    NotFound,

    #[error("booking can no longer be cancelled")]
    CancellationClosed,

    #[error("booking can only be checked in on its own date")]
    CheckInUnavailable,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Transactional façade over the ledger: validates against the lifecycle
/// policy and the booking horizon, then commits exactly one ledger write.
/// Every mutation either lands completely or returns a typed error with no
/// state changed.
pub struct BookingManager {
    ledger: Arc<dyn BookingLedger>,
    policy: LifecyclePolicy,
    /// 0 = bookable through the end of the current month; each extra unit
    /// adds a whole month.
    horizon_months: u32,
    clock: Arc<dyn Clock>,
}

/// Last bookable day: the end of the month `extra_months` after `today`.
fn horizon_end(today: NaiveDate, extra_months: u32) -> NaiveDate {
    let next = today.year() * 12 + today.month0() as i32 + extra_months as i32 + 1;
    let year = next.div_euclid(12);
    let month = next.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("valid month start")
        .pred_opt()
        .expect("valid month end")
}

impl BookingManager {
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        policy: LifecyclePolicy,
        horizon_months: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            policy,
            horizon_months,
            clock,
        }
    }

    pub fn ledger(&self) -> &Arc<dyn BookingLedger> {
        &self.ledger
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Reserves a seat for the employee on the given date.
    pub async fn book(
        &self,
        employee_id: Uuid,
        seat_id: Uuid,
        date: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let today = self.clock.local_now().date();
        if date < today || date > horizon_end(today, self.horizon_months) {
            return Err(BookingError::OutsideHorizon { date });
        }

        let booking = self.ledger.insert(employee_id, seat_id, date).await?;
        info!(
            booking_id = %booking.id,
            employee_id = %employee_id,
            seat_id = %seat_id,
            %date,
            "booking created"
        );
        Ok(booking)
    }

    /// Cancels the caller's confirmed booking, subject to the cutoff rule.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self.load_owned(booking_id, employee_id).await?;

        if !self.policy.can_cancel(&booking, self.clock.local_now()) {
            return Err(BookingError::CancellationClosed);
        }

        let booking = self
            .ledger
            .transition(
                booking_id,
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
                None,
            )
            .await?;
        info!(booking_id = %booking.id, employee_id = %employee_id, "booking cancelled");
        Ok(booking)
    }

    /// Checks the caller in to today's booking and stamps the check-in time.
    pub async fn check_in(
        &self,
        booking_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self.load_owned(booking_id, employee_id).await?;

        if !self.policy.can_check_in(&booking, self.clock.local_now()) {
            return Err(BookingError::CheckInUnavailable);
        }

        let booking = self
            .ledger
            .transition(
                booking_id,
                BookingStatus::Confirmed,
                BookingStatus::CheckedIn,
                Some(self.clock.now_utc()),
            )
            .await?;
        info!(booking_id = %booking.id, employee_id = %employee_id, "booking checked in");
        Ok(booking)
    }

    pub async fn my_bookings(
        &self,
        employee_id: Uuid,
        filter: &BookingFilter,
        page: PageParams,
    ) -> LedgerResult<Paginated<Booking>> {
        self.ledger.list_for_employee(employee_id, filter, page).await
    }

    async fn load_owned(
        &self,
        booking_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .ledger
            .get(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;
        if booking.employee_id != employee_id {
            return Err(BookingError::NotFound);
        }
        Ok(booking)
    }
}
