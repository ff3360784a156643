//! Booking log storage operations

use rusqlite::{params, Connection, Row};
use tracing::{debug, instrument, warn};

use super::parse::{format_instant, parse_datetime, parse_instant, parse_uuid, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{ApartmentId, Booking, BookingId, SlotId};

const BOOKING_COLUMNS: &str =
    "id, apartment_id, slot_id, start_at, end_at, guest_name, created_at";

pub struct BookingStore<'a> {
    conn: &'a Connection,
}

impl<'a> BookingStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_booking(row: &Row<'_>) -> rusqlite::Result<Booking> {
        Ok(Booking {
            id: BookingId(parse_uuid(0, &row.get::<_, String>(0)?)?),
            apartment_id: ApartmentId(row.get(1)?),
            slot_id: SlotId(row.get(2)?),
            start: parse_instant(3, &row.get::<_, String>(3)?)?,
            end: parse_instant(4, &row.get::<_, String>(4)?)?,
            guest_name: row.get(5)?,
            created_at: parse_datetime(6, &row.get::<_, String>(6)?)?,
        })
    }

    /// Append a booking, refusing to double-book its slot
    ///
    /// Re-appending a booking whose id is already stored is a no-op, so a
    /// retried write cannot duplicate.
    #[instrument(skip(self, booking), fields(booking_id = %booking.id, slot_id = %booking.slot_id))]
    pub fn append(&self, booking: &Booking) -> Result<()> {
        if booking.start >= booking.end {
            return Err(Error::InvalidInterval {
                start: booking.start.to_string(),
                end: booking.end.to_string(),
            });
        }

        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM bookings WHERE id = ?1",
                params![booking.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            debug!("Booking already stored");
            return Ok(());
        }

        let start = format_instant(&booking.start);
        let end = format_instant(&booking.end);
        let conflict: Option<String> = tx
            .query_row(
                "SELECT id FROM bookings
                 WHERE slot_id = ?1 AND start_at < ?3 AND ?2 < end_at
                 LIMIT 1",
                params![booking.slot_id.as_str(), start, end],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(conflict) = conflict {
            warn!(conflict = %conflict, "Refusing overlapping booking");
            return Err(Error::SlotUnavailable(format!(
                "slot {} overlaps booking {}",
                booking.slot_id, conflict
            )));
        }

        tx.execute(
            "INSERT INTO bookings (id, apartment_id, slot_id, start_at, end_at, guest_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                booking.id.to_string(),
                booking.apartment_id.as_str(),
                booking.slot_id.as_str(),
                start,
                end,
                booking.guest_name,
                booking.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Find booking by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookings WHERE id = ?1",
            BOOKING_COLUMNS
        ))?;
        let booking = stmt
            .query_row(params![id.to_string()], Self::map_booking)
            .optional()?;
        Ok(booking)
    }

    /// All bookings in the order they were appended
    pub fn list(&self) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookings ORDER BY rowid",
            BOOKING_COLUMNS
        ))?;
        let bookings = stmt
            .query_map([], Self::map_booking)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    /// Bookings on one slot, earliest start first
    pub fn list_for_slot(&self, slot_id: &SlotId) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookings WHERE slot_id = ?1 ORDER BY start_at",
            BOOKING_COLUMNS
        ))?;
        let bookings = stmt
            .query_map(params![slot_id.as_str()], Self::map_booking)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    /// Delete a booking, returning whether it existed
    #[instrument(skip(self))]
    pub fn remove(&self, id: BookingId) -> Result<bool> {
        let count = self.conn.execute(
            "DELETE FROM bookings WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(count > 0)
    }
}
