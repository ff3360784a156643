//! Parking slot model

use serde::{Deserialize, Serialize};

use super::ApartmentId;

/// Stable slot identifier (e.g. `ps-6`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub String);

impl SlotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single physical parking space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSlot {
    pub id: SlotId,
    pub name: String,
    pub floor: Option<String>,
    pub owner_apartment_id: ApartmentId,
}

impl ParkingSlot {
    pub fn new(id: SlotId, name: String, owner_apartment_id: ApartmentId) -> Self {
        Self {
            id,
            name,
            floor: None,
            owner_apartment_id,
        }
    }

    pub fn with_floor(mut self, floor: String) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Floor label for display, `N/A` when unknown
    pub fn floor_label(&self) -> &str {
        self.floor.as_deref().unwrap_or("N/A")
    }
}
