//! Immutable state handed to one allocation query

use serde::{Deserialize, Serialize};

use super::Booking;
use crate::directory::Directory;

/// Directory plus booking log, as loaded from a backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub directory: Directory,
    pub bookings: Vec<Booking>,
}

impl Snapshot {
    pub fn new(directory: Directory, bookings: Vec<Booking>) -> Self {
        Self {
            directory,
            bookings,
        }
    }
}
