use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use roost_availability::{reconcile, SeatView};
use roost_inventory::Seat;
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/seats", get(list_seats))
        .route("/v1/seats/availability", get(seat_availability))
}

/// GET /v1/seats
/// The plain seat inventory, in seat-number order.
async fn list_seats(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<Json<Vec<Seat>>, AppError> {
    let seats = state.seats.list_all().await?;
    Ok(Json(seats))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    date: NaiveDate,
}

/// GET /v1/seats/availability?date=YYYY-MM-DD
/// The reconciled per-seat grid for the viewing employee.
async fn seat_availability(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<SeatView>>, AppError> {
    let viewer = claims.employee_id()?;

    let seats = state.seats.list_all().await?;
    let bookings = state.manager.ledger().list_for_date(query.date).await?;

    Ok(Json(reconcile(&seats, &bookings, viewer)))
}
