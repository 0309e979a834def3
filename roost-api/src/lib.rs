use axum::{http::Method, Router};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod availability;
pub mod bookings;
pub mod error;
pub mod state;
pub mod stream;
pub mod worker;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Mutations are bounded; a timed-out caller must not assume failure (the
    // write may have committed) and retries land on the ledger's conflict
    // response. The event stream stays outside the timeout.
    Router::new()
        .merge(availability::routes())
        .merge(bookings::routes())
        .merge(admin::routes())
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .merge(stream::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
