pub mod import;
pub mod inventory;
pub mod seat;

pub use import::{import_seats, ImportReport};
pub use inventory::MemorySeatStore;
pub use seat::{normalize_seat_number, Seat, SeatError, SeatRepository, SeatResult};
