use crate::seat::{normalize_seat_number, Seat, SeatError, SeatRepository, SeatResult};
use async_trait::async_trait;
use chrono::Utc;
use roost_shared::{PageParams, Paginated};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory seat inventory used by tests and single-node deployments.
pub struct MemorySeatStore {
    seats: Mutex<HashMap<Uuid, Seat>>,
}

impl MemorySeatStore {
    pub fn new() -> Self {
        Self {
            seats: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySeatStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_active(seats: &HashMap<Uuid, Seat>) -> Vec<Seat> {
    let mut active: Vec<Seat> = seats.values().filter(|s| !s.is_deleted()).cloned().collect();
    active.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
    active
}

#[async_trait]
impl SeatRepository for MemorySeatStore {
    async fn get(&self, id: Uuid) -> SeatResult<Option<Seat>> {
        Ok(self.seats.lock().await.get(&id).cloned())
    }

    async fn list(&self, search: Option<&str>, page: PageParams) -> SeatResult<Paginated<Seat>> {
        let seats = self.seats.lock().await;
        let mut active = sorted_active(&seats);
        if let Some(search) = search {
            let needle = search.to_uppercase();
            active.retain(|s| s.seat_number.contains(needle.as_str()));
        }

        let total = active.len() as u64;
        let items = active
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    async fn list_all(&self) -> SeatResult<Vec<Seat>> {
        let seats = self.seats.lock().await;
        Ok(sorted_active(&seats))
    }

    async fn create(&self, seat_number: &str) -> SeatResult<Seat> {
        let seat_number = normalize_seat_number(seat_number)?;

        let mut seats = self.seats.lock().await;
        if seats
            .values()
            .any(|s| !s.is_deleted() && s.seat_number == seat_number)
        {
            return Err(SeatError::DuplicateSeatNumber(seat_number));
        }

        let seat = Seat {
            id: Uuid::new_v4(),
            seat_number,
            created_at: Utc::now(),
            deleted_at: None,
        };
        seats.insert(seat.id, seat.clone());
        Ok(seat)
    }

    async fn update(&self, id: Uuid, seat_number: &str) -> SeatResult<Seat> {
        let seat_number = normalize_seat_number(seat_number)?;

        let mut seats = self.seats.lock().await;
        if !seats.contains_key(&id) {
            return Err(SeatError::NotFound);
        }
        if seats
            .values()
            .any(|s| s.id != id && !s.is_deleted() && s.seat_number == seat_number)
        {
            return Err(SeatError::DuplicateSeatNumber(seat_number));
        }

        let seat = seats.get_mut(&id).ok_or(SeatError::NotFound)?;
        seat.seat_number = seat_number;
        Ok(seat.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> SeatResult<Seat> {
        let mut seats = self.seats.lock().await;
        let seat = seats.get_mut(&id).ok_or(SeatError::NotFound)?;
        if seat.deleted_at.is_none() {
            seat.deleted_at = Some(Utc::now());
        }
        Ok(seat.clone())
    }

    async fn count_active(&self) -> SeatResult<u64> {
        let seats = self.seats.lock().await;
        Ok(seats.values().filter(|s| !s.is_deleted()).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_normalizes_and_rejects_duplicates() {
        let store = MemorySeatStore::new();
        let seat = store.create(" a-12 ").await.unwrap();
        assert_eq!(seat.seat_number, "A-12");

        let err = store.create("A-12").await.unwrap_err();
        assert!(matches!(err, SeatError::DuplicateSeatNumber(n) if n == "A-12"));
    }

    #[tokio::test]
    async fn update_uniqueness_excludes_self() {
        let store = MemorySeatStore::new();
        let seat = store.create("A-1").await.unwrap();
        store.create("A-2").await.unwrap();

        // Renaming to its own number is a no-op, not a conflict.
        let renamed = store.update(seat.id, "a-1").await.unwrap();
        assert_eq!(renamed.seat_number, "A-1");

        let err = store.update(seat.id, "A-2").await.unwrap_err();
        assert!(matches!(err, SeatError::DuplicateSeatNumber(_)));
    }

    #[tokio::test]
    async fn soft_deleted_seats_leave_listings_and_free_their_number() {
        let store = MemorySeatStore::new();
        let seat = store.create("A-1").await.unwrap();
        store.soft_delete(seat.id).await.unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.count_active().await.unwrap(), 0);
        // The row itself survives for historic bookings.
        assert!(store.get(seat.id).await.unwrap().is_some());

        // A deleted seat no longer blocks its number.
        store.create("A-1").await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_by_seat_number_and_paginates() {
        let store = MemorySeatStore::new();
        for number in ["B-2", "A-1", "C-3"] {
            store.create(number).await.unwrap();
        }

        let page = store.list(None, PageParams::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        let numbers: Vec<&str> = page.items.iter().map(|s| s.seat_number.as_str()).collect();
        assert_eq!(numbers, vec!["A-1", "B-2"]);

        let page = store.list(Some("c"), PageParams::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].seat_number, "C-3");
    }
}
