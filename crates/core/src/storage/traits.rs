//! Storage repository traits
//!
//! The booking log can live in the local SQLite database or behind the
//! network server; both sides speak this interface.

use crate::error::Result;
use crate::models::{Booking, BookingId, Snapshot};

/// Booking log operations
pub trait BookingRepository {
    /// Directory and every stored booking
    fn load_state(&self) -> Result<Snapshot>;

    /// Store a booking
    ///
    /// Appending an id that is already stored succeeds without change. A
    /// booking overlapping another on the same slot fails with
    /// [`Error::SlotUnavailable`](crate::Error::SlotUnavailable).
    fn append_booking(&self, booking: &Booking) -> Result<()>;

    /// Delete a booking, returning whether it existed
    fn remove_booking(&self, id: BookingId) -> Result<bool>;
}

impl<T: BookingRepository + ?Sized> BookingRepository for &T {
    fn load_state(&self) -> Result<Snapshot> {
        (**self).load_state()
    }

    fn append_booking(&self, booking: &Booking) -> Result<()> {
        (**self).append_booking(booking)
    }

    fn remove_booking(&self, id: BookingId) -> Result<bool> {
        (**self).remove_booking(id)
    }
}
