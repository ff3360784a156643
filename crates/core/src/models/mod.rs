//! Data models for ParkPro

mod apartment;
mod booking;
mod slot;
mod snapshot;
mod stay;
mod suggestion;

pub use apartment::*;
pub use booking::*;
pub use slot::*;
pub use snapshot::*;
pub use stay::*;
pub use suggestion::*;
