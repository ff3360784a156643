//! Apartment model - the unit a guest stay belongs to

use serde::{Deserialize, Serialize};

use super::SlotId;

/// Stable apartment identifier (e.g. `apt-6`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApartmentId(pub String);

impl ApartmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApartmentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An apartment in the building directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: ApartmentId,
    pub name: String,
    pub has_parking: bool,
    /// The slot attached to this apartment, if any
    pub parking_slot_id: Option<SlotId>,
}

impl Apartment {
    pub fn new(id: ApartmentId, name: String) -> Self {
        Self {
            id,
            name,
            has_parking: false,
            parking_slot_id: None,
        }
    }

    pub fn with_slot(mut self, slot_id: SlotId) -> Self {
        self.has_parking = true;
        self.parking_slot_id = Some(slot_id);
        self
    }

    /// The owned slot, only when the apartment is flagged as having parking
    pub fn owned_slot(&self) -> Option<&SlotId> {
        if self.has_parking {
            self.parking_slot_id.as_ref()
        } else {
            None
        }
    }
}
