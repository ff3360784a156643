//! Apartment and slot directory storage

use rusqlite::{params, Connection, Row};
use tracing::{info, instrument};

use crate::directory::Directory;
use crate::error::Result;
use crate::models::{Apartment, ApartmentId, ParkingSlot, SlotId};

pub struct DirectoryStore<'a> {
    conn: &'a Connection,
}

impl<'a> DirectoryStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_apartment(row: &Row<'_>) -> rusqlite::Result<Apartment> {
        Ok(Apartment {
            id: ApartmentId(row.get(0)?),
            name: row.get(1)?,
            has_parking: row.get(2)?,
            parking_slot_id: row.get::<_, Option<String>>(3)?.map(SlotId),
        })
    }

    fn map_slot(row: &Row<'_>) -> rusqlite::Result<ParkingSlot> {
        Ok(ParkingSlot {
            id: SlotId(row.get(0)?),
            name: row.get(1)?,
            floor: row.get(2)?,
            owner_apartment_id: ApartmentId(row.get(3)?),
        })
    }

    /// Overwrite the stored directory, keeping the given order
    #[instrument(skip(self, directory), fields(apartments = directory.apartments.len(), slots = directory.slots.len()))]
    pub fn replace(&self, directory: &Directory) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM apartments", [])?;
        tx.execute("DELETE FROM parking_slots", [])?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO apartments (id, name, has_parking, parking_slot_id, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, apartment) in directory.apartments.iter().enumerate() {
                insert.execute(params![
                    apartment.id.as_str(),
                    apartment.name,
                    apartment.has_parking,
                    apartment.parking_slot_id.as_ref().map(SlotId::as_str),
                    position as i64,
                ])?;
            }
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO parking_slots (id, name, floor, owner_apartment_id, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, slot) in directory.slots.iter().enumerate() {
                insert.execute(params![
                    slot.id.as_str(),
                    slot.name,
                    slot.floor,
                    slot.owner_apartment_id.as_str(),
                    position as i64,
                ])?;
            }
        }

        tx.commit()?;
        info!("Directory stored");
        Ok(())
    }

    /// Load the stored directory in roster order
    pub fn load(&self) -> Result<Directory> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, has_parking, parking_slot_id
             FROM apartments ORDER BY position",
        )?;
        let apartments = stmt
            .query_map([], Self::map_apartment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, name, floor, owner_apartment_id
             FROM parking_slots ORDER BY position",
        )?;
        let slots = stmt
            .query_map([], Self::map_slot)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Directory::new(apartments, slots))
    }
}
