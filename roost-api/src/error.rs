use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roost_booking::{BookingError, LedgerError};
use roost_core::identity::EmployeeError;
use roost_inventory::SeatError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Unauthenticated(String),
    Forbidden(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                // Never leak internals; clients get a generic retryable body.
                "Internal server error".to_string()
            }
            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {msg}");
                msg
            }
            AppError::Unauthenticated(msg) | AppError::Forbidden(msg) => {
                tracing::info!("Access refused: {msg}");
                msg
            }
            AppError::Validation(msg) | AppError::NotFound(msg) => {
                tracing::debug!("Client error: {msg}");
                msg
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Each ledger failure keeps its own user-facing message so the booking UI
/// can tell "pick another seat" apart from "you already booked today".
impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::SeatTaken { .. } => {
                AppError::Conflict("Seat already booked for this date".to_string())
            }
            LedgerError::EmployeeAlreadyBooked { .. } => {
                AppError::Conflict("You already have a booking for this date".to_string())
            }
            LedgerError::Stale { .. } => {
                AppError::Conflict("This booking was already updated".to_string())
            }
            LedgerError::NotFound => AppError::NotFound("Booking not found".to_string()),
            LedgerError::Storage(err) => AppError::Internal(err),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::OutsideHorizon { date } => AppError::Validation(format!(
                "Booking date {date} is outside the allowed booking window"
            )),
            BookingError::NotFound => AppError::NotFound("Booking not found".to_string()),
            BookingError::CancellationClosed => {
                AppError::Forbidden("This booking can no longer be cancelled".to_string())
            }
            BookingError::CheckInUnavailable => {
                AppError::Forbidden("Check-in is only available on the booking date".to_string())
            }
            BookingError::Ledger(err) => err.into(),
        }
    }
}

impl From<SeatError> for AppError {
    fn from(err: SeatError) -> Self {
        match err {
            SeatError::DuplicateSeatNumber(number) => {
                AppError::Conflict(format!("Seat {number} already exists"))
            }
            SeatError::EmptySeatNumber => {
                AppError::Validation("Seat number must not be empty".to_string())
            }
            SeatError::NotFound => AppError::NotFound("Seat not found".to_string()),
            SeatError::Storage(err) => AppError::Internal(err),
        }
    }
}

impl From<EmployeeError> for AppError {
    fn from(err: EmployeeError) -> Self {
        match err {
            EmployeeError::DuplicateBadge(badge) => {
                AppError::Conflict(format!("Badge {badge} is already registered"))
            }
            EmployeeError::EmptyBadge => {
                AppError::Validation("Badge must not be empty".to_string())
            }
            EmployeeError::NotFound => AppError::NotFound("Employee not found".to_string()),
            EmployeeError::Storage(err) => AppError::Internal(err),
        }
    }
}
