pub mod expiry;
pub mod ledger;
pub mod manager;
pub mod memory;
pub mod models;
pub mod policy;

pub use expiry::{ExpirySweeper, SweepReport};
pub use ledger::{BookingLedger, DayStats, LedgerError, LedgerResult};
pub use manager::{BookingError, BookingManager};
pub use memory::MemoryLedger;
pub use models::{Booking, BookingFilter, BookingStatus};
pub use policy::LifecyclePolicy;
