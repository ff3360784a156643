//! Split-stay suggester
//!
//! Covers a stay with two slots when no single slot is free throughout. Each
//! interior calendar day of the stay is tried as the handoff date, starting
//! at midnight of that day. The search is greedy: one pick per half, no
//! three-way splits.

use chrono::NaiveDateTime;
use tracing::trace;

use super::is_slot_available;
use crate::models::{
    start_of_day, Apartment, ApartmentId, Booking, ParkingSlot, SlotId, SplitSuggestion,
    StayInterval, Suggestion,
};

/// Upper bound on split suggestions returned for one stay
pub const MAX_SPLIT_SUGGESTIONS: usize = 3;

/// Pairs of slots that together cover `[start, end)` with one handoff
///
/// Returns nothing for stays touching fewer than two calendar days. Results
/// follow the chronological order of the handoff dates; at most
/// [`MAX_SPLIT_SUGGESTIONS`] are returned. An apartment missing from the
/// directory is searched for without any own-slot preference.
pub fn suggest_split(
    apartment_id: &ApartmentId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    apartments: &[Apartment],
    slots: &[ParkingSlot],
    bookings: &[Booking],
) -> Vec<SplitSuggestion> {
    let days = StayInterval::new(start, end).calendar_days();
    if days.len() < 2 {
        return Vec::new();
    }

    let own_id = apartments
        .iter()
        .find(|a| &a.id == apartment_id)
        .and_then(|a| a.parking_slot_id.as_ref());

    let mut results = Vec::new();

    // First and last day would leave one half empty
    for &split_date in &days[1..days.len() - 1] {
        let handoff = start_of_day(split_date);

        let first_half: Vec<&ParkingSlot> = slots
            .iter()
            .filter(|s| is_slot_available(&s.id, start, handoff, bookings))
            .collect();
        let second_half: Vec<&ParkingSlot> = slots
            .iter()
            .filter(|s| is_slot_available(&s.id, handoff, end, bookings))
            .collect();

        let (Some(first), Some(second)) =
            (pick(&first_half, own_id), pick(&second_half, own_id))
        else {
            trace!(%split_date, "No slot for one half of the stay");
            continue;
        };

        if first.id == second.id {
            continue;
        }

        results.push(SplitSuggestion {
            first: Suggestion::from_slot(first, Some(&first.id) == own_id),
            second: Suggestion::from_slot(second, Some(&second.id) == own_id),
            split_date,
        });

        if results.len() >= MAX_SPLIT_SUGGESTIONS {
            break;
        }
    }

    results
}

/// The apartment's own slot when it is among `candidates`, else the first one
fn pick<'a>(candidates: &[&'a ParkingSlot], own_id: Option<&SlotId>) -> Option<&'a ParkingSlot> {
    candidates
        .iter()
        .find(|s| Some(&s.id) == own_id)
        .or_else(|| candidates.first())
        .copied()
}
