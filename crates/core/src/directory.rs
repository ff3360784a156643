//! Apartment and slot directory
//!
//! The directory is built from a TOML roster with one `[[unit]]` per
//! apartment. Roster order is directory order, which the allocation engine
//! uses as its tie-break.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Apartment, ApartmentId, ParkingSlot, SlotId};

/// Roster shipped with the crate
const BUILTIN_ROSTER: &str = include_str!("../data/roster.toml");

/// Placeholder roster sheets use for "no value"
const NOT_AVAILABLE: &str = "N/A";

/// Roster file as written by the property manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default, rename = "unit")]
    pub units: Vec<RosterUnit>,
}

/// One apartment line of the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUnit {
    /// Apartment number
    pub apt: String,
    /// Parking floor label
    #[serde(default)]
    pub floor: Option<String>,
    /// Parking slot number
    #[serde(default)]
    pub slot: Option<String>,
}

impl RosterUnit {
    pub fn new(apt: impl Into<String>) -> Self {
        Self {
            apt: apt.into(),
            floor: None,
            slot: None,
        }
    }

    pub fn with_slot(mut self, floor: Option<&str>, slot: &str) -> Self {
        self.floor = floor.map(str::to_string);
        self.slot = Some(slot.to_string());
        self
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != NOT_AVAILABLE)
}

/// Apartments and parking slots, in directory order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub apartments: Vec<Apartment>,
    pub slots: Vec<ParkingSlot>,
}

impl Directory {
    pub fn new(apartments: Vec<Apartment>, slots: Vec<ParkingSlot>) -> Self {
        Self { apartments, slots }
    }

    /// Directory of the building the roster ships with
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_ROSTER)
    }

    /// Load a roster file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse roster TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let roster: Roster = toml::from_str(content)?;
        Self::from_roster(&roster.units)
    }

    /// Build the directory from roster units
    ///
    /// Apartment `N` becomes `apt-N`; its slot, when it has one, becomes
    /// `ps-N` so that ownership stays 1:1 even when two units share a slot
    /// number on paper.
    pub fn from_roster(units: &[RosterUnit]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut apartments = Vec::with_capacity(units.len());
        let mut slots = Vec::new();

        for unit in units {
            let apt = unit.apt.trim();
            if apt.is_empty() {
                return Err(Error::Roster("unit with empty apartment number".into()));
            }
            if !seen.insert(apt.to_string()) {
                return Err(Error::Roster(format!("duplicate apartment {}", apt)));
            }

            let apartment_id = ApartmentId::new(format!("apt-{}", apt));
            let mut apartment = Apartment::new(apartment_id.clone(), format!("Apartment {}", apt));

            if let Some(slot_number) = present(&unit.slot) {
                let slot_id = SlotId::new(format!("ps-{}", apt));
                let mut slot = ParkingSlot::new(
                    slot_id.clone(),
                    format!("Slot {}", slot_number),
                    apartment_id,
                );
                if let Some(floor) = present(&unit.floor) {
                    slot = slot.with_floor(floor.to_string());
                }
                apartment = apartment.with_slot(slot_id);
                slots.push(slot);
            }

            apartments.push(apartment);
        }

        Ok(Self { apartments, slots })
    }

    pub fn find_apartment(&self, id: &ApartmentId) -> Option<&Apartment> {
        self.apartments.iter().find(|a| &a.id == id)
    }

    pub fn find_slot(&self, id: &SlotId) -> Option<&ParkingSlot> {
        self.slots.iter().find(|s| &s.id == id)
    }

    /// Resolve user input: either a full id (`apt-6`) or the bare number (`6`)
    pub fn lookup_apartment(&self, input: &str) -> Option<&Apartment> {
        let input = input.trim();
        self.find_apartment(&ApartmentId::new(input)).or_else(|| {
            self.find_apartment(&ApartmentId::new(format!("apt-{}", input)))
        })
    }

    /// Resolve user input: a full id (`ps-6`) or a slot number (`118`)
    ///
    /// A number printed on more than one slot is refused with the ids that
    /// carry it.
    pub fn lookup_slot(&self, input: &str) -> Result<&ParkingSlot> {
        let input = input.trim();
        if let Some(slot) = self.find_slot(&SlotId::new(input)) {
            return Ok(slot);
        }
        let by_name = format!("Slot {}", input);
        let matches: Vec<&ParkingSlot> =
            self.slots.iter().filter(|s| s.name == by_name).collect();
        match matches.as_slice() {
            [] => Err(Error::NotFound(format!("slot {}", input))),
            [slot] => Ok(*slot),
            many => {
                let ids: Vec<&str> = many.iter().map(|s| s.id.as_str()).collect();
                Err(Error::InvalidOperation(format!(
                    "slot number {} is shared by {}, pick one by id",
                    input,
                    ids.join(", ")
                )))
            }
        }
    }

    pub fn apartment_name(&self, id: &ApartmentId) -> String {
        self.find_apartment(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn slot_name(&self, id: &SlotId) -> String {
        self.find_slot(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_roster() {
        let directory = Directory::builtin().unwrap();
        assert_eq!(directory.apartments.len(), 45);
        assert_eq!(directory.slots.len(), 25);

        let apt6 = directory.lookup_apartment("6").unwrap();
        assert_eq!(apt6.name, "Apartment 6");
        assert_eq!(apt6.owned_slot(), Some(&SlotId::new("ps-6")));

        let slot = directory.find_slot(&SlotId::new("ps-6")).unwrap();
        assert_eq!(slot.name, "Slot 118");
        assert_eq!(slot.floor.as_deref(), Some("5"));
        assert_eq!(slot.owner_apartment_id, apt6.id);
    }

    #[test]
    fn test_unit_without_parking() {
        let directory = Directory::builtin().unwrap();
        let apt2 = directory.lookup_apartment("apt-2").unwrap();
        assert!(!apt2.has_parking);
        assert!(apt2.parking_slot_id.is_none());
    }

    #[test]
    fn test_slot_without_floor() {
        let directory = Directory::builtin().unwrap();
        let slot = directory.find_slot(&SlotId::new("ps-21")).unwrap();
        assert_eq!(slot.name, "Slot 126");
        assert!(slot.floor.is_none());
        assert_eq!(slot.floor_label(), "N/A");
    }

    #[test]
    fn test_placeholder_values_are_absent() {
        let toml = r#"
[[unit]]
apt = "2"
floor = "N/A"
slot = "N/A"

[[unit]]
apt = "6"
floor = "5"
slot = "118"
"#;
        let directory = Directory::from_toml(toml).unwrap();
        assert_eq!(directory.apartments.len(), 2);
        assert_eq!(directory.slots.len(), 1);
        assert!(!directory.apartments[0].has_parking);
    }

    #[test]
    fn test_duplicate_apartment_rejected() {
        let units = vec![RosterUnit::new("6"), RosterUnit::new(" 6 ")];
        assert!(matches!(
            Directory::from_roster(&units),
            Err(Error::Roster(_))
        ));
    }

    #[test]
    fn test_empty_apartment_rejected() {
        let units = vec![RosterUnit::new("  ")];
        assert!(Directory::from_roster(&units).is_err());
    }

    #[test]
    fn test_lookup_slot_by_number() {
        let directory = Directory::builtin().unwrap();
        assert_eq!(directory.lookup_slot("118").unwrap().id, SlotId::new("ps-6"));
        assert_eq!(directory.lookup_slot("ps-105").unwrap().name, "Slot 101");
        assert!(matches!(directory.lookup_slot("999"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_lookup_shared_slot_number() {
        let directory = Directory::builtin().unwrap();
        match directory.lookup_slot("126") {
            Err(Error::InvalidOperation(reason)) => {
                assert!(reason.contains("ps-21"));
                assert!(reason.contains("ps-51"));
            }
            other => panic!("unexpected lookup {:?}", other),
        }
        assert_eq!(directory.lookup_slot("ps-51").unwrap().name, "Slot 126");
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("roster.toml");
        fs::write(
            &path,
            "[[unit]]\napt = \"1\"\nfloor = \"B\"\nslot = \"7\"\n",
        )
        .unwrap();

        let directory = Directory::load(&path).unwrap();
        assert_eq!(directory.slots[0].name, "Slot 7");
        assert_eq!(directory.slots[0].floor.as_deref(), Some("B"));
    }
}
