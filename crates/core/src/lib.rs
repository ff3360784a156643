//! ParkPro Core Library
//!
//! Directory models, the slot allocation engine, the booking controller and
//! SQLite storage for the ParkPro guest parking planner.

pub mod allocation;
pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod invariants;
pub mod models;
pub mod storage;

pub use allocation::{
    free_slot_count, is_slot_available, suggest, suggest_single, suggest_split,
    MAX_SPLIT_SUGGESTIONS,
};
pub use config::{AppDirs, RemoteSettings, ServerSettings, Settings};
pub use controller::{Controller, HistoryEntry, Transition, DEFAULT_GUEST_NAME};
pub use directory::{Directory, Roster, RosterUnit};
pub use error::{Error, Result};
pub use models::*;
pub use storage::{BookingRepository, Database};
