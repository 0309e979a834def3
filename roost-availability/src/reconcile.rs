use roost_booking::{Booking, BookingStatus};
use roost_inventory::Seat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// What one seat looks like to one viewer on one date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeatViewStatus {
    Available,
    /// Actively booked by someone else. Opaque: the view never says by whom.
    Booked,
    /// The viewer's own confirmed booking.
    Mine,
    /// The viewer's own checked-in booking.
    CheckedIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub seat_id: Uuid,
    pub seat_number: String,
    pub status: SeatViewStatus,
}

/// Derives the per-seat availability grid for a date.
///
/// Pure over its inputs: the same (seats, bookings, viewer) always produces
/// the same sequence, in inventory order. `bookings` must already be
/// restricted to the date being viewed; non-active rows are ignored here.
/// If a seat somehow carries both a confirmed and a checked-in booking, the
/// checked-in one wins.
pub fn reconcile(
    seats: &[Seat],
    bookings: &[Booking],
    viewing_employee_id: Uuid,
) -> Vec<SeatView> {
    let mut active_by_seat: HashMap<Uuid, &Booking> = HashMap::new();
    for booking in bookings.iter().filter(|b| b.is_active()) {
        match active_by_seat.get(&booking.seat_id) {
            Some(existing)
                if existing.status == BookingStatus::CheckedIn
                    || booking.status != BookingStatus::CheckedIn => {}
            _ => {
                active_by_seat.insert(booking.seat_id, booking);
            }
        }
    }

    seats
        .iter()
        .map(|seat| {
            let status = match active_by_seat.get(&seat.id) {
                None => SeatViewStatus::Available,
                Some(booking) if booking.employee_id != viewing_employee_id => {
                    SeatViewStatus::Booked
                }
                Some(booking) if booking.status == BookingStatus::CheckedIn => {
                    SeatViewStatus::CheckedIn
                }
                Some(_) => SeatViewStatus::Mine,
            };
            SeatView {
                seat_id: seat.id,
                seat_number: seat.seat_number.clone(),
                status,
            }
        })
        .collect()
}
