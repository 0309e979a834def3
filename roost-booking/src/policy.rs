use crate::models::{Booking, BookingStatus};
use chrono::{NaiveDateTime, NaiveTime};

/// Time-window rules for booking transitions.
///
/// All predicates are pure: "now" is the office-local wall clock injected by
/// the caller, never read from the system. The cancellation cutoff exists so
/// a same-day seat freed at the last minute is not wasted — after the cutoff
/// nobody realistically picks it up.
#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    cancel_cutoff: NaiveTime,
}

impl LifecyclePolicy {
    pub fn new(cancel_cutoff: NaiveTime) -> Self {
        Self { cancel_cutoff }
    }

    pub fn cancel_cutoff(&self) -> NaiveTime {
        self.cancel_cutoff
    }

    /// A confirmed booking for a future date can always be cancelled; one
    /// for today only strictly before the cutoff. The cutoff instant itself
    /// is already too late.
    pub fn can_cancel(&self, booking: &Booking, now: NaiveDateTime) -> bool {
        if booking.status != BookingStatus::Confirmed {
            return false;
        }
        let today = now.date();
        booking.booking_date > today
            || (booking.booking_date == today && now.time() < self.cancel_cutoff)
    }

    /// Check-in is only possible on the booking's own date.
    pub fn can_check_in(&self, booking: &Booking, now: NaiveDateTime) -> bool {
        booking.status == BookingStatus::Confirmed && booking.booking_date == now.date()
    }

    /// A confirmed booking whose date has fully elapsed is due for expiry.
    /// Checked-in bookings never expire.
    pub fn is_expired(&self, booking: &Booking, now: NaiveDateTime) -> bool {
        booking.status == BookingStatus::Confirmed && booking.booking_date < now.date()
    }
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        // 10:30 matches the office rule; deployments override it in config.
        Self::new(NaiveTime::from_hms_opt(10, 30, 0).expect("valid cutoff"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn booking_for(date: NaiveDate) -> Booking {
        Booking::new(Uuid::new_v4(), Uuid::new_v4(), date)
    }

    fn at(date: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn same_day_cancel_flips_exactly_at_the_cutoff() {
        let policy = LifecyclePolicy::default();
        let booking = booking_for(day(10));

        assert!(policy.can_cancel(&booking, at(day(10), 10, 29, 59)));
        // The cutoff instant is not cancellable.
        assert!(!policy.can_cancel(&booking, at(day(10), 10, 30, 0)));
        assert!(!policy.can_cancel(&booking, at(day(10), 10, 30, 1)));
    }

    #[test]
    fn future_bookings_ignore_the_cutoff() {
        let policy = LifecyclePolicy::default();
        let booking = booking_for(day(11));
        assert!(policy.can_cancel(&booking, at(day(10), 14, 0, 0)));
    }

    #[test]
    fn past_or_non_confirmed_bookings_cannot_be_cancelled() {
        let policy = LifecyclePolicy::default();

        let stale = booking_for(day(9));
        assert!(!policy.can_cancel(&stale, at(day(10), 9, 0, 0)));

        let mut checked_in = booking_for(day(10));
        checked_in.status = BookingStatus::CheckedIn;
        assert!(!policy.can_cancel(&checked_in, at(day(10), 9, 0, 0)));
    }

    #[test]
    fn check_in_requires_the_booking_date() {
        let policy = LifecyclePolicy::default();

        let booking = booking_for(day(10));
        assert!(policy.can_check_in(&booking, at(day(10), 9, 0, 0)));
        assert!(!policy.can_check_in(&booking, at(day(9), 9, 0, 0)));
        assert!(!policy.can_check_in(&booking, at(day(11), 9, 0, 0)));

        let mut cancelled = booking_for(day(10));
        cancelled.status = BookingStatus::Cancelled;
        assert!(!policy.can_check_in(&cancelled, at(day(10), 9, 0, 0)));
    }

    #[test]
    fn expiry_applies_to_stale_confirmed_bookings_only() {
        let policy = LifecyclePolicy::default();

        let stale = booking_for(day(9));
        assert!(policy.is_expired(&stale, at(day(10), 0, 5, 0)));

        let today = booking_for(day(10));
        assert!(!policy.is_expired(&today, at(day(10), 23, 59, 59)));

        let mut checked_in = booking_for(day(9));
        checked_in.status = BookingStatus::CheckedIn;
        assert!(!policy.is_expired(&checked_in, at(day(10), 0, 5, 0)));
    }

    #[test]
    fn custom_cutoff_is_honoured() {
        let policy = LifecyclePolicy::new(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let booking = booking_for(day(10));
        assert!(policy.can_cancel(&booking, at(day(10), 11, 59, 59)));
        assert!(!policy.can_cancel(&booking, at(day(10), 12, 0, 0)));
    }
}
