//! Where the booking log lives

use parkpro_core::{Booking, BookingId, BookingRepository, Database, Snapshot};
use parkpro_net::{RemoteClient, Result};

pub enum Backend {
    Local(Database),
    Remote(RemoteClient),
}

impl Backend {
    pub async fn load_state(&self) -> Result<Snapshot> {
        match self {
            Backend::Local(db) => Ok(db.load_state()?),
            Backend::Remote(client) => client.load_state().await,
        }
    }

    pub async fn append_booking(&self, booking: &Booking) -> Result<()> {
        match self {
            Backend::Local(db) => Ok(db.append_booking(booking)?),
            Backend::Remote(client) => client.append_booking(booking).await,
        }
    }

    pub async fn remove_booking(&self, id: BookingId) -> Result<bool> {
        match self {
            Backend::Local(db) => Ok(db.remove_booking(id)?),
            Backend::Remote(client) => client.remove_booking(id).await,
        }
    }
}
