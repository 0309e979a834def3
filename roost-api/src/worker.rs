use roost_booking::{BookingLedger, ExpirySweeper};
use roost_core::Clock;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

/// Background expiry sweeper.
///
/// Runs once at startup (catching up on anything missed while the service
/// was down) and then on the configured interval. The sweep itself is
/// idempotent and skips rows it loses races on, so overlapping runs across
/// replicas are harmless.
pub async fn start_expiry_worker(
    ledger: Arc<dyn BookingLedger>,
    clock: Arc<dyn Clock>,
    interval_seconds: u64,
) {
    let sweeper = ExpirySweeper::new(ledger);
    let interval = Duration::from_secs(interval_seconds.max(1));

    info!("Expiry worker started, sweeping every {:?}", interval);

    loop {
        let today = clock.local_now().date();
        if let Err(e) = sweeper.sweep(today).await {
            error!("Expiry sweep failed: {e:#}");
        }
        sleep(interval).await;
    }
}
