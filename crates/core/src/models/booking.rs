//! Booking model - a slot reserved for one stay

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApartmentId, SlotId, StayInterval};

/// Booking identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub Uuid);

impl BookingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A committed reservation of one slot over `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub apartment_id: ApartmentId,
    pub slot_id: SlotId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub guest_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        apartment_id: ApartmentId,
        slot_id: SlotId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: BookingId::new(),
            apartment_id,
            slot_id,
            start,
            end,
            guest_name: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_guest(mut self, guest_name: String) -> Self {
        self.guest_name = Some(guest_name);
        self
    }

    pub fn interval(&self) -> StayInterval {
        StayInterval::new(self.start, self.end)
    }

    /// Whether the booking occupies its slot at the given instant
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}
