use roost_availability::RefreshEvent;
use roost_booking::BookingManager;
use roost_core::identity::EmployeeRepository;
use roost_core::Clock;
use roost_inventory::SeatRepository;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub seats: Arc<dyn SeatRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub manager: Arc<BookingManager>,
    pub clock: Arc<dyn Clock>,
    /// Refresh notices for the presentation layer; every successful mutation
    /// sends exactly one.
    pub refresh_tx: broadcast::Sender<RefreshEvent>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn publish_refresh(&self, event: RefreshEvent) {
        // Nobody listening is fine; the stream endpoint resubscribes at will.
        let _ = self.refresh_tx.send(event);
    }
}
