pub mod events;
pub mod reconcile;

pub use events::RefreshEvent;
pub use reconcile::{reconcile, SeatView, SeatViewStatus};
