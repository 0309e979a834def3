use crate::ledger::{BookingLedger, LedgerError, LedgerResult};
use crate::models::BookingStatus;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counts from one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: u64,
    pub expired: u64,
    pub skipped: u64,
}

/// Transitions stale confirmed bookings to `expired`.
///
/// Expiry is server-authoritative: clients never decide that a booking has
/// lapsed, they only ever observe the status the sweeper wrote. The sweep is
/// idempotent — a second run over the same data finds nothing left to do —
/// and row failures are logged and skipped, never fatal to the rest of the
/// batch.
pub struct ExpirySweeper {
    ledger: Arc<dyn BookingLedger>,
}

impl ExpirySweeper {
    pub fn new(ledger: Arc<dyn BookingLedger>) -> Self {
        Self { ledger }
    }

    /// Expires every confirmed booking dated before `today`.
    pub async fn sweep(&self, today: NaiveDate) -> LedgerResult<SweepReport> {
        let stale = self.ledger.find_stale(today).await?;
        let mut report = SweepReport {
            scanned: stale.len() as u64,
            ..Default::default()
        };

        for booking in stale {
            match self
                .ledger
                .transition(
                    booking.id,
                    BookingStatus::Confirmed,
                    BookingStatus::Expired,
                    None,
                )
                .await
            {
                Ok(_) => report.expired += 1,
                Err(LedgerError::Stale { actual, .. }) => {
                    // Lost the race to a cancel or another sweep; fine either way.
                    debug!(booking_id = %booking.id, %actual, "stale booking already transitioned");
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(booking_id = %booking.id, error = %err, "failed to expire booking");
                    report.skipped += 1;
                }
            }
        }

        if report.scanned > 0 {
            info!(
                scanned = report.scanned,
                expired = report.expired,
                skipped = report.skipped,
                "expiry sweep finished"
            );
        }
        Ok(report)
    }
}
