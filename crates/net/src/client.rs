//! Client for a remote booking log
//!
//! Every call opens its own connection, greets the server and sends one
//! request. Connection failures are retried with exponential backoff;
//! refusals from the server are returned at once.

use std::net::SocketAddr;
use std::time::Duration;

use parkpro_core::{Booking, BookingId, Error as CoreError, RemoteSettings, Snapshot};
use rand::Rng;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{Message, RejectKind};

/// Attempts per request unless configured otherwise
pub const DEFAULT_RETRIES: u32 = 3;

/// Delay before the first retry unless configured otherwise
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// Upper bound on one connect-greet-request exchange
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RemoteClient {
    addr: SocketAddr,
    token: String,
    retries: u32,
    initial_backoff: Duration,
}

impl RemoteClient {
    pub fn new(addr: SocketAddr, token: String) -> Self {
        Self {
            addr,
            token,
            retries: DEFAULT_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }

    pub fn from_settings(settings: &RemoteSettings) -> Result<Self> {
        let addr = settings.socket_addr()?;
        Ok(Self::new(addr, settings.token.clone()).with_retries(
            settings.retries,
            Duration::from_millis(settings.initial_backoff_ms),
        ))
    }

    /// Override the retry policy; `retries` counts total attempts
    pub fn with_retries(mut self, retries: u32, initial_backoff: Duration) -> Self {
        self.retries = retries.max(1);
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn load_state(&self) -> Result<Snapshot> {
        match self.request(Message::LoadState).await? {
            Message::State { snapshot } => Ok(snapshot),
            other => Err(unexpected(&other)),
        }
    }

    /// Store a booking on the server
    ///
    /// Safe to retry: the server treats a repeated id as already stored.
    pub async fn append_booking(&self, booking: &Booking) -> Result<()> {
        let request = Message::AppendBooking {
            booking: booking.clone(),
        };
        match self.request(request).await? {
            Message::Appended { booking_id } if booking_id == booking.id => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete a booking, returning whether the server had it
    pub async fn remove_booking(&self, id: BookingId) -> Result<bool> {
        match self.request(Message::RemoveBooking { booking_id: id }).await? {
            Message::Removed {
                booking_id,
                existed,
            } if booking_id == id => Ok(existed),
            other => Err(unexpected(&other)),
        }
    }

    /// Round-trip to the server
    pub async fn ping(&self) -> Result<()> {
        match self.request(Message::Ping).await? {
            Message::Pong => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Send `request`, retrying transient failures
    async fn request(&self, request: Message) -> Result<Message> {
        let mut delay = self.initial_backoff;
        let mut attempt = 1;
        loop {
            let outcome = tokio::time::timeout(REQUEST_TIMEOUT, self.exchange(&request))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "request timed out",
                    )))
                });

            match outcome {
                Ok(Message::Rejected { kind, reason }) => return Err(refusal(kind, reason)),
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let wait = delay + jitter(delay);
                    warn!(
                        addr = %self.addr,
                        attempt,
                        delay_ms = wait.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    return Err(Error::RetriesExhausted {
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One connection, one greeting, one request
    async fn exchange(&self, request: &Message) -> Result<Message> {
        debug!(addr = %self.addr, "Connecting to booking server");
        let stream = TcpStream::connect(self.addr).await?;
        let (mut reader, mut writer) = tokio::io::split(stream);

        write_frame(
            &mut writer,
            &Message::Hello {
                token: self.token.clone(),
            },
        )
        .await?;
        match read_frame(&mut reader).await? {
            Message::Welcome => {}
            reply @ Message::Rejected { .. } => return Ok(reply),
            other => return Err(unexpected(&other)),
        }

        write_frame(&mut writer, request).await?;
        let reply = read_frame(&mut reader).await?;
        debug!(addr = %self.addr, "Request answered");
        Ok(reply)
    }
}

/// Up to a quarter of `delay`, so clients retrying together spread out
fn jitter(delay: Duration) -> Duration {
    let max = delay.as_millis() as u64 / 4;
    if max == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max))
}

fn refusal(kind: RejectKind, reason: String) -> Error {
    match kind {
        RejectKind::Unauthorized => Error::Rejected(reason),
        RejectKind::SlotUnavailable => Error::Core(CoreError::SlotUnavailable(reason)),
        RejectKind::NotFound => Error::Core(CoreError::NotFound(reason)),
        RejectKind::InvalidInterval | RejectKind::Invalid => {
            Error::Core(CoreError::InvalidOperation(reason))
        }
    }
}

fn unexpected(reply: &Message) -> Error {
    Error::Protocol(format!("Unexpected reply: {:?}", reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::BookingServer;
    use chrono::NaiveDate;
    use parkpro_core::{ApartmentId, Database, Directory, SlotId};
    use tokio::net::TcpListener;

    fn make_booking(slot: &str, start_day: u32, end_day: u32) -> Booking {
        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        Booking::new(
            ApartmentId::new("apt-6"),
            SlotId::new(slot),
            day(start_day).and_hms_opt(16, 0, 0).unwrap(),
            day(end_day).and_hms_opt(11, 0, 0).unwrap(),
        )
    }

    async fn start() -> BookingServer {
        let db = Database::open_in_memory().unwrap();
        db.replace_directory(&Directory::builtin().unwrap()).unwrap();
        BookingServer::start("127.0.0.1:0".parse().unwrap(), "secret".into(), db)
            .await
            .unwrap()
    }

    fn client(server: &BookingServer, token: &str) -> RemoteClient {
        RemoteClient::new(server.addr(), token.into())
            .with_retries(2, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_append_and_load() {
        let server = start().await;
        let client = client(&server, "secret");
        let booking = make_booking("ps-6", 1, 2);

        client.ping().await.unwrap();
        client.append_booking(&booking).await.unwrap();
        // A retried append is harmless
        client.append_booking(&booking).await.unwrap();

        let snapshot = client.load_state().await.unwrap();
        assert_eq!(snapshot.bookings, vec![booking]);
        assert_eq!(snapshot.directory.slots.len(), 25);
        server.shutdown();
    }

    #[tokio::test]
    async fn test_overlap_refused_without_retry() {
        let server = start().await;
        let client = client(&server, "secret");
        client
            .append_booking(&make_booking("ps-6", 1, 3))
            .await
            .unwrap();

        let result = client.append_booking(&make_booking("ps-6", 2, 4)).await;
        assert!(matches!(
            result,
            Err(Error::Core(CoreError::SlotUnavailable(_)))
        ));
        server.shutdown();
    }

    #[tokio::test]
    async fn test_remove() {
        let server = start().await;
        let client = client(&server, "secret");
        let booking = make_booking("ps-6", 1, 2);
        client.append_booking(&booking).await.unwrap();

        assert!(client.remove_booking(booking.id).await.unwrap());
        assert!(!client.remove_booking(booking.id).await.unwrap());
        server.shutdown();
    }

    #[tokio::test]
    async fn test_wrong_token() {
        let server = start().await;
        let result = client(&server, "guess").load_state().await;
        assert!(matches!(result, Err(Error::Rejected(_))));
        server.shutdown();
    }

    #[tokio::test]
    async fn test_unreachable_server_exhausts_retries() {
        // Reserve a port, then free it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RemoteClient::new(addr, "secret".into())
            .with_retries(3, Duration::from_millis(5));
        match client.load_state().await {
            Err(Error::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_jitter_bounded() {
        let delay = Duration::from_millis(400);
        for _ in 0..50 {
            assert!(jitter(delay) <= Duration::from_millis(100));
        }
        assert_eq!(jitter(Duration::from_millis(3)), Duration::ZERO);
    }
}
