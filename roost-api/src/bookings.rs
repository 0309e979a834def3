use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use roost_availability::RefreshEvent;
use roost_booking::{Booking, BookingFilter, BookingStatus};
use roost_shared::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/me", get(my_bookings))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
        .route("/v1/bookings/{id}/check-in", post(check_in_booking))
}

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    seat_id: Uuid,
    booking_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    message: String,
    booking_id: Uuid,
    seat_id: Uuid,
    booking_date: NaiveDate,
    status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_in_time: Option<DateTime<Utc>>,
}

impl BookingResponse {
    fn new(message: &str, booking: &Booking) -> Self {
        Self {
            message: message.to_string(),
            booking_id: booking.id,
            seat_id: booking.seat_id,
            booking_date: booking.booking_date,
            status: booking.status,
            check_in_time: booking.check_in_time,
        }
    }
}

/// POST /v1/bookings
async fn create_booking(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let employee_id = claims.employee_id()?;

    let booking = state
        .manager
        .book(employee_id, req.seat_id, req.booking_date)
        .await?;

    state.publish_refresh(RefreshEvent::new(booking.booking_date, employee_id));
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse::new("Seat booked", &booking)),
    ))
}

/// POST /v1/bookings/{id}/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    claims: Claims,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let employee_id = claims.employee_id()?;

    let booking = state.manager.cancel(booking_id, employee_id).await?;

    state.publish_refresh(RefreshEvent::new(booking.booking_date, employee_id));
    Ok(Json(BookingResponse::new("Booking cancelled", &booking)))
}

/// POST /v1/bookings/{id}/check-in
async fn check_in_booking(
    State(state): State<AppState>,
    claims: Claims,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let employee_id = claims.employee_id()?;

    let booking = state.manager.check_in(booking_id, employee_id).await?;

    state.publish_refresh(RefreshEvent::new(booking.booking_date, employee_id));
    Ok(Json(BookingResponse::new("Checked in", &booking)))
}

#[derive(Debug, Deserialize)]
struct MyBookingsQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    status: Option<String>,
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct MyBooking {
    id: Uuid,
    seat_id: Uuid,
    seat_number: String,
    booking_date: NaiveDate,
    status: BookingStatus,
    check_in_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// GET /v1/bookings/me
async fn my_bookings(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<MyBookingsQuery>,
) -> Result<Json<Paginated<MyBooking>>, AppError> {
    let employee_id = claims.employee_id()?;

    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<BookingStatus>())
        .transpose()
        .map_err(AppError::Validation)?;
    let filter = BookingFilter {
        status,
        date: query.date,
    };
    let page = PageParams::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(roost_shared::pagination::DEFAULT_PAGE_SIZE),
    );

    let bookings = state.manager.my_bookings(employee_id, &filter, page).await?;

    // Join seat numbers; deleted seats still resolve for historic rows.
    let mut seat_numbers: HashMap<Uuid, String> = HashMap::new();
    for booking in &bookings.items {
        if !seat_numbers.contains_key(&booking.seat_id) {
            let number = state
                .seats
                .get(booking.seat_id)
                .await?
                .map(|s| s.seat_number)
                .unwrap_or_else(|| "unknown".to_string());
            seat_numbers.insert(booking.seat_id, number);
        }
    }

    Ok(Json(bookings.map(|b| MyBooking {
        id: b.id,
        seat_id: b.seat_id,
        seat_number: seat_numbers
            .get(&b.seat_id)
            .cloned()
            .unwrap_or_default(),
        booking_date: b.booking_date,
        status: b.status,
        check_in_time: b.check_in_time,
        created_at: b.created_at,
    })))
}
