//! Slot allocation engine
//!
//! Pure, synchronous queries over a caller-supplied snapshot:
//!
//! - [`is_slot_available`]: is one slot free over an interval
//! - [`suggest_single`]: every slot free for the whole stay, own slot first
//! - [`suggest_split`]: two slots sharing the stay with one handoff date,
//!   meant for when [`suggest_single`] comes back empty
//!
//! Identical inputs always yield identical, identically ordered outputs.

mod availability;
mod single;
mod split;

pub use availability::is_slot_available;
pub use single::suggest_single;
pub use split::{suggest_split, MAX_SPLIT_SUGGESTIONS};

use chrono::NaiveDateTime;

use crate::models::{Offer, Snapshot, StayRequest};

/// Run the single-slot search, falling back to the split search when it
/// finds nothing
pub fn suggest(request: &StayRequest, snapshot: &Snapshot) -> Offer {
    let single = suggest_single(
        &request.apartment_id,
        request.start,
        request.end,
        &snapshot.directory.apartments,
        &snapshot.directory.slots,
        &snapshot.bookings,
    );
    if !single.is_empty() {
        return Offer {
            single,
            split: Vec::new(),
        };
    }

    let split = suggest_split(
        &request.apartment_id,
        request.start,
        request.end,
        &snapshot.directory.apartments,
        &snapshot.directory.slots,
        &snapshot.bookings,
    );
    Offer { single, split }
}

/// Number of slots no booking occupies at `at`
pub fn free_slot_count(at: NaiveDateTime, snapshot: &Snapshot) -> usize {
    snapshot
        .directory
        .slots
        .iter()
        .filter(|slot| {
            !snapshot
                .bookings
                .iter()
                .any(|b| b.slot_id == slot.id && b.is_active_at(at))
        })
        .count()
}
