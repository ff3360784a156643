//! Availability check - the primitive both suggesters are built on

use chrono::NaiveDateTime;

use crate::models::{Booking, SlotId, StayInterval};

/// Whether `slot_id` is free throughout `[start, end)`
///
/// Only bookings on `slot_id` are considered. A booking ending exactly at
/// `start`, or starting exactly at `end`, leaves the slot available.
pub fn is_slot_available(
    slot_id: &SlotId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    bookings: &[Booking],
) -> bool {
    let query = StayInterval::new(start, end);
    !bookings
        .iter()
        .filter(|b| &b.slot_id == slot_id)
        .any(|b| query.overlaps(&b.interval()))
}
