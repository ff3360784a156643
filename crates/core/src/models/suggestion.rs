//! Suggestion results produced by the allocation engine (never persisted)

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{start_of_day, ParkingSlot, SlotId};

/// A slot that can take the whole (or one half of a) stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub slot_id: SlotId,
    pub slot_name: String,
    pub floor: Option<String>,
    /// The slot is owned by the requesting apartment
    pub is_priority: bool,
}

impl Suggestion {
    pub fn from_slot(slot: &ParkingSlot, is_priority: bool) -> Self {
        Self {
            slot_id: slot.id.clone(),
            slot_name: slot.name.clone(),
            floor: slot.floor.clone(),
            is_priority,
        }
    }
}

/// Two slots covering one stay, handing over on `split_date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSuggestion {
    pub first: Suggestion,
    pub second: Suggestion,
    pub split_date: NaiveDate,
}

impl SplitSuggestion {
    /// Instant occupancy moves from the first slot to the second
    pub fn handoff(&self) -> NaiveDateTime {
        start_of_day(self.split_date)
    }
}

/// Everything the engine can offer for one stay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub single: Vec<Suggestion>,
    pub split: Vec<SplitSuggestion>,
}

impl Offer {
    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.split.is_empty()
    }
}
