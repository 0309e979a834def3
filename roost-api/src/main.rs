use roost_api::{app, worker, AppState, AuthConfig};
use roost_booking::{BookingLedger, BookingManager, LifecyclePolicy, MemoryLedger};
use roost_core::identity::{EmployeeRepository, MemoryEmployeeDirectory};
use roost_core::{Clock, SystemClock};
use roost_inventory::{MemorySeatStore, SeatRepository};
use roost_store::{DbClient, PgBookingLedger, PgEmployeeDirectory, PgSeatStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roost_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = roost_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Roost API on port {}", config.server.port);

    let (seats, employees, ledger): (
        Arc<dyn SeatRepository>,
        Arc<dyn EmployeeRepository>,
        Arc<dyn BookingLedger>,
    ) = match &config.database {
        Some(database) => {
            let db = DbClient::new(&database.url)
                .await
                .expect("Failed to connect to Postgres");
            db.migrate().await.expect("Failed to run migrations");
            (
                Arc::new(PgSeatStore::new(db.pool.clone())),
                Arc::new(PgEmployeeDirectory::new(db.pool.clone())),
                Arc::new(PgBookingLedger::new(db.pool.clone())),
            )
        }
        None => {
            tracing::warn!("No database configured; running on in-memory stores");
            (
                Arc::new(MemorySeatStore::new()),
                Arc::new(MemoryEmployeeDirectory::new()),
                Arc::new(MemoryLedger::new()),
            )
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let policy = LifecyclePolicy::new(config.booking_rules.cancel_cutoff);
    let manager = Arc::new(BookingManager::new(
        ledger.clone(),
        policy,
        config.booking_rules.horizon_months,
        clock.clone(),
    ));

    // Background expiry sweeper; also catches up once at startup.
    tokio::spawn(worker::start_expiry_worker(
        ledger,
        clock.clone(),
        config.booking_rules.sweep_interval_seconds,
    ));

    let (refresh_tx, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        seats,
        employees,
        manager,
        clock,
        refresh_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
