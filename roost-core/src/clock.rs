use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Source of time for every component that makes a time-based decision.
///
/// The lifecycle policy and the reservation manager never read the system
/// clock directly; they take a `Clock` so tests can pin "now" to an exact
/// instant (the cancellation cutoff is a one-second boundary).
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Local wall-clock time. Booking dates and the cancellation cutoff are
    /// office-local concepts, so policy decisions run on this value.
    fn local_now(&self) -> NaiveDateTime;
}

/// Production clock backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a single instant, for tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0)
    }

    fn local_now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_returns_pinned_instant() {
        let instant = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(10, 29, 59)
            .unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.local_now(), instant);
        assert_eq!(clock.now_utc().naive_utc(), instant);
    }
}
