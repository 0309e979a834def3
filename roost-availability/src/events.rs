use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refresh notice pushed to presentation layers after a successful mutation.
///
/// Every book, cancel and check-in invalidates exactly two views: the
/// availability grid for the booking's date and the booking list of the
/// employee who owns it. Consumers re-fetch those and nothing else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshEvent {
    pub availability_for_date: NaiveDate,
    pub bookings_for_employee: Uuid,
}

impl RefreshEvent {
    pub fn new(availability_for_date: NaiveDate, bookings_for_employee: Uuid) -> Self {
        Self {
            availability_for_date,
            bookings_for_employee,
        }
    }
}
