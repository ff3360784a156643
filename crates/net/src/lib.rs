//! ParkPro Network Library
//!
//! Shares one booking log between several front desks over TCP.
//!
//! # Architecture
//!
//! - **Server**: hosts a [`BookingRepository`](parkpro_core::BookingRepository),
//!   usually the local SQLite database
//! - **Client**: one connection per request, retried with backoff
//! - **Protocol**: Length-prefixed JSON messages
//!
//! # Usage
//!
//! ```ignore
//! let server = BookingServer::start(bind, token.clone(), Database::open(path)?).await?;
//!
//! let client = RemoteClient::new(server.addr(), token);
//! let snapshot = client.load_state().await?;
//! client.append_booking(&booking).await?;
//! ```

pub mod client;
pub mod error;
mod frame;
pub mod protocol;
pub mod server;

pub use client::RemoteClient;
pub use error::{Error, Result};
pub use frame::MAX_FRAME_SIZE;
pub use protocol::{Message, RejectKind};
pub use server::BookingServer;
