//! Booking controller
//!
//! Owns the current [`Snapshot`] and is the only place it changes. Queries
//! hand the snapshot to the allocation engine by reference; writes are
//! planned here, committed by whatever backend the caller uses, then applied
//! back as a [`Transition`].

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info};

use crate::allocation::{self, is_slot_available};
use crate::error::{Error, Result};
use crate::invariants;
use crate::models::{
    Booking, BookingId, Offer, ParkingSlot, Snapshot, SlotId, SplitSuggestion, StayRequest,
};

/// Guest label used when a request carries none
pub const DEFAULT_GUEST_NAME: &str = "Guest";

/// A discrete change to the booking log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Append(Booking),
    Remove(BookingId),
}

/// One row of the booking history, resolved for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub booking_id: BookingId,
    pub apartment_name: String,
    pub guest_name: String,
    pub slot_name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub created_at: DateTime<Utc>,
}

pub struct Controller {
    snapshot: Snapshot,
}

impl Controller {
    pub fn new(snapshot: Snapshot) -> Self {
        invariants::assert_directory_invariants(&snapshot.directory);
        invariants::assert_booking_log_invariants(&snapshot.bookings);
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Swap in freshly loaded state
    pub fn replace(&mut self, snapshot: Snapshot) {
        info!(
            slots = snapshot.directory.slots.len(),
            bookings = snapshot.bookings.len(),
            "Snapshot replaced"
        );
        self.snapshot = snapshot;
    }

    /// Single-slot suggestions, or split suggestions when there are none
    pub fn query(&self, request: &StayRequest) -> Offer {
        let offer = allocation::suggest(request, &self.snapshot);
        debug!(
            apartment_id = %request.apartment_id,
            single = offer.single.len(),
            split = offer.split.len(),
            "Stay queried"
        );
        offer
    }

    /// Build the booking for taking `slot_id` over the whole stay
    pub fn plan_single(&self, request: &StayRequest, slot_id: &SlotId) -> Result<Booking> {
        self.plan_segment(request, slot_id, request.start, request.end)
    }

    /// Build both halves of a split stay
    ///
    /// The first half ends and the second begins at midnight of the split
    /// date, the instant the suggestion was checked against.
    pub fn plan_split(
        &self,
        request: &StayRequest,
        split: &SplitSuggestion,
    ) -> Result<[Booking; 2]> {
        let handoff = split.handoff();
        if handoff <= request.start || handoff >= request.end {
            return Err(Error::InvalidOperation(format!(
                "split date {} is outside the stay",
                split.split_date
            )));
        }
        if split.first.slot_id == split.second.slot_id {
            return Err(Error::InvalidOperation(
                "split stay needs two different slots".into(),
            ));
        }

        let first = self.plan_segment(request, &split.first.slot_id, request.start, handoff)?;
        let second = self.plan_segment(request, &split.second.slot_id, handoff, request.end)?;
        Ok([first, second])
    }

    fn plan_segment(
        &self,
        request: &StayRequest,
        slot_id: &SlotId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Booking> {
        if start >= end {
            return Err(Error::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        if self
            .snapshot
            .directory
            .find_apartment(&request.apartment_id)
            .is_none()
        {
            return Err(Error::NotFound(format!("apartment {}", request.apartment_id)));
        }
        let slot = self.slot(slot_id)?;
        if !is_slot_available(&slot.id, start, end, &self.snapshot.bookings) {
            return Err(Error::SlotUnavailable(format!(
                "{} is taken between {} and {}",
                slot.name, start, end
            )));
        }

        let guest = request
            .guest_name
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_GUEST_NAME);

        Ok(Booking::new(request.apartment_id.clone(), slot.id.clone(), start, end)
            .with_guest(guest.to_string()))
    }

    fn slot(&self, slot_id: &SlotId) -> Result<&ParkingSlot> {
        self.snapshot
            .directory
            .find_slot(slot_id)
            .ok_or_else(|| Error::NotFound(format!("slot {}", slot_id)))
    }

    /// Apply a committed change to the read model
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Append(booking) => {
                invariants::assert_booking_invariants(&booking);
                if self.snapshot.bookings.iter().any(|b| b.id == booking.id) {
                    debug!(booking_id = %booking.id, "Booking already applied");
                } else {
                    info!(booking_id = %booking.id, slot_id = %booking.slot_id, "Booking added");
                    self.snapshot.bookings.push(booking);
                }
            }
            Transition::Remove(booking_id) => {
                let before = self.snapshot.bookings.len();
                self.snapshot.bookings.retain(|b| b.id != booking_id);
                if self.snapshot.bookings.len() < before {
                    info!(booking_id = %booking_id, "Booking removed");
                }
            }
        }
        invariants::assert_booking_log_invariants(&self.snapshot.bookings);
    }

    /// Booking log, newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        let directory = &self.snapshot.directory;
        self.snapshot
            .bookings
            .iter()
            .rev()
            .map(|b| HistoryEntry {
                booking_id: b.id,
                apartment_name: directory.apartment_name(&b.apartment_id),
                guest_name: b
                    .guest_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GUEST_NAME.to_string()),
                slot_name: directory.slot_name(&b.slot_id),
                start: b.start,
                end: b.end,
                created_at: b.created_at,
            })
            .collect()
    }

    /// Slots not occupied at `at`
    pub fn free_slot_count(&self, at: NaiveDateTime) -> usize {
        allocation::free_slot_count(at, &self.snapshot)
    }
}
