//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Apartment directory, `position` keeps roster order
            CREATE TABLE IF NOT EXISTS apartments (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                has_parking INTEGER NOT NULL DEFAULT 0,
                parking_slot_id TEXT,
                position INTEGER NOT NULL
            );

            -- Slot directory
            CREATE TABLE IF NOT EXISTS parking_slots (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                floor TEXT,
                owner_apartment_id TEXT NOT NULL,
                position INTEGER NOT NULL
            );

            -- Booking log; directory rows may be rewritten, so no foreign keys
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                apartment_id TEXT NOT NULL,
                slot_id TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                guest_name TEXT,
                created_at TEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_apartments_position ON apartments(position);
            CREATE INDEX IF NOT EXISTS idx_parking_slots_position ON parking_slots(position);

            -- Overlap checks scan one slot ordered by start
            CREATE INDEX IF NOT EXISTS idx_bookings_slot_start ON bookings(slot_id, start_at);
            CREATE INDEX IF NOT EXISTS idx_bookings_created ON bookings(created_at);
        "#,
    },
    Migration {
        version: 3,
        description: "Store stay instants with nanoseconds",
        sql: r#"
            UPDATE bookings SET start_at = start_at || '.000000000' WHERE length(start_at) = 19;
            UPDATE bookings SET end_at = end_at || '.000000000' WHERE length(end_at) = 19;
        "#,
    },
];

/// Create the version tracking table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Highest applied version, 0 for a fresh database
pub(super) fn current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Apply one migration and record it atomically
fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        params![
            migration.version,
            migration.description,
            Utc::now().to_rfc3339()
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let from = current_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > from).collect();
    if pending.is_empty() {
        debug!(version = from, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );
        apply(conn, migration)?;
    }

    let to = current_version(conn)?;
    info!(from, to, "Database schema updated");
    Ok(())
}
