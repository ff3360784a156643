//! SQLite storage layer for the booking log and directory

mod bookings;
mod directories;
mod migrations;
mod parse;
mod traits;

use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;

use crate::directory::Directory;
use crate::error::Result;
use crate::models::{Booking, BookingId, SlotId, Snapshot};

pub use bookings::BookingStore;
pub use directories::DirectoryStore;
pub use parse::INSTANT_FORMAT;
pub use traits::BookingRepository;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        migrations::current_version(&self.conn).unwrap_or(0)
    }

    pub fn bookings(&self) -> BookingStore<'_> {
        BookingStore::new(&self.conn)
    }

    pub fn directory(&self) -> DirectoryStore<'_> {
        DirectoryStore::new(&self.conn)
    }

    /// Store `directory` as the one bookings are resolved against
    ///
    /// Bookings are kept; ones naming a slot or apartment that no longer
    /// exists stay in the log and show up by id.
    pub fn replace_directory(&self, directory: &Directory) -> Result<()> {
        self.directory().replace(directory)
    }

    pub fn list_bookings_for_slot(&self, slot_id: &SlotId) -> Result<Vec<Booking>> {
        self.bookings().list_for_slot(slot_id)
    }
}

impl BookingRepository for Database {
    fn load_state(&self) -> Result<Snapshot> {
        let directory = self.directory().load()?;
        let bookings = self.bookings().list()?;
        Ok(Snapshot::new(directory, bookings))
    }

    fn append_booking(&self, booking: &Booking) -> Result<()> {
        self.bookings().append(booking)
    }

    fn remove_booking(&self, id: BookingId) -> Result<bool> {
        self.bookings().remove(id)
    }
}
