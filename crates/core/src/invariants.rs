//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::directory::Directory;
use crate::models::{Booking, BookingId};

/// Pairs of bookings on the same slot whose intervals overlap
pub fn find_overlapping_bookings(bookings: &[Booking]) -> Vec<(BookingId, BookingId)> {
    let mut conflicts = Vec::new();
    for (i, a) in bookings.iter().enumerate() {
        for b in &bookings[i + 1..] {
            if a.slot_id == b.slot_id && a.interval().overlaps(&b.interval()) {
                conflicts.push((a.id, b.id));
            }
        }
    }
    conflicts
}

/// Validate that no two bookings double-book a slot
pub fn assert_booking_log_invariants(bookings: &[Booking]) {
    let conflicts = find_overlapping_bookings(bookings);
    debug_assert!(
        conflicts.is_empty(),
        "Booking log double-books a slot: {:?}",
        conflicts
    );

    let unique: HashSet<_> = bookings.iter().map(|b| b.id).collect();
    debug_assert!(
        unique.len() == bookings.len(),
        "Booking log contains duplicate ids"
    );
}

/// Validate that a single booking is well formed
pub fn assert_booking_invariants(booking: &Booking) {
    debug_assert!(
        booking.start < booking.end,
        "Booking {} ends before it starts",
        booking.id
    );
}

/// Validate that slot ownership is 1:1 and references resolve
pub fn assert_directory_invariants(directory: &Directory) {
    for slot in &directory.slots {
        let owner = directory.find_apartment(&slot.owner_apartment_id);
        debug_assert!(
            owner.is_some(),
            "Slot {} is owned by unknown apartment {}",
            slot.id,
            slot.owner_apartment_id
        );
        if let Some(owner) = owner {
            debug_assert!(
                owner.parking_slot_id.as_ref() == Some(&slot.id),
                "Slot {} owner {} does not point back to it",
                slot.id,
                owner.id
            );
        }
    }

    for apartment in &directory.apartments {
        if let Some(slot_id) = apartment.owned_slot() {
            debug_assert!(
                directory.find_slot(slot_id).is_some(),
                "Apartment {} owns unknown slot {}",
                apartment.id,
                slot_id
            );
        }
    }

    let slot_ids: HashSet<_> = directory.slots.iter().map(|s| &s.id).collect();
    debug_assert!(
        slot_ids.len() == directory.slots.len(),
        "Directory contains duplicate slot ids"
    );
}
