use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roost_shared::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable physical seat.
///
/// Identity is `id`; `seat_number` is the human label printed on the desk and
/// must be unique among non-deleted seats. Deletion is always soft so that
/// historic bookings keep a valid reference for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub seat_number: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Seat {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    #[error("seat not found")]
    NotFound,

    #[error("seat number {0} already exists")]
    DuplicateSeatNumber(String),

    #[error("seat number must not be empty")]
    EmptySeatNumber,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type SeatResult<T> = Result<T, SeatError>;

/// Canonical form of a seat number: trimmed, upper-cased.
///
/// Uniqueness is checked against this form, so "a-12 " and "A-12" are the
/// same seat.
pub fn normalize_seat_number(raw: &str) -> SeatResult<String> {
    let normalized = raw.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(SeatError::EmptySeatNumber);
    }
    Ok(normalized)
}

/// Data access seam for the seat inventory.
#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> SeatResult<Option<Seat>>;

    /// Non-deleted seats in seat-number order, paginated, with an optional
    /// case-insensitive substring search.
    async fn list(&self, search: Option<&str>, page: PageParams) -> SeatResult<Paginated<Seat>>;

    /// The full non-deleted inventory in seat-number order. This ordering is
    /// what the availability reconciler preserves.
    async fn list_all(&self) -> SeatResult<Vec<Seat>>;

    async fn create(&self, seat_number: &str) -> SeatResult<Seat>;

    /// Renames a seat; the uniqueness check excludes the seat itself.
    async fn update(&self, id: Uuid, seat_number: &str) -> SeatResult<Seat>;

    /// Soft delete. The seat disappears from future availability; bookings
    /// that reference it remain untouched.
    async fn soft_delete(&self, id: Uuid) -> SeatResult<Seat>;

    async fn count_active(&self) -> SeatResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_uppercases() {
        assert_eq!(normalize_seat_number("  a-12 ").unwrap(), "A-12");
        assert_eq!(normalize_seat_number("B7").unwrap(), "B7");
    }

    #[test]
    fn blank_seat_number_is_rejected() {
        assert!(matches!(
            normalize_seat_number("   "),
            Err(SeatError::EmptySeatNumber)
        ));
    }
}
