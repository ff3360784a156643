//! TCP server for the shared booking log
//!
//! Each connection opens with a `Hello` carrying the shared token, then
//! sends requests one at a time; every request gets exactly one reply.
//! All connections share one backend behind a mutex, so appends are
//! serialized and the backend's overlap check is final.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parkpro_core::BookingRepository;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{Message, RejectKind};

/// How long a new connection may take to send its `Hello`
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Booking log server handle
pub struct BookingServer {
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
}

impl BookingServer {
    /// Bind `bind` and serve `backend` until [`shutdown`](Self::shutdown)
    pub async fn start<B>(bind: SocketAddr, token: String, backend: B) -> Result<Self>
    where
        B: BookingRepository + Send + 'static,
    {
        let listener = TcpListener::bind(bind).await?;
        let bound_addr = listener.local_addr()?;

        info!(addr = %bound_addr, "Booking server started");

        let (shutdown_tx, _) = broadcast::channel(1);
        let shared = Arc::new(Shared {
            token,
            backend: Mutex::new(backend),
        });

        tokio::spawn(accept_loop(listener, shared, shutdown_tx.clone()));

        Ok(BookingServer {
            addr: bound_addr,
            shutdown_tx,
        })
    }

    /// Get the server's bound address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and drop every open connection
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        info!("Server shutdown initiated");
    }
}

struct Shared<B> {
    token: String,
    backend: Mutex<B>,
}

async fn accept_loop<B>(
    listener: TcpListener,
    shared: Arc<Shared<B>>,
    shutdown_tx: broadcast::Sender<()>,
) where
    B: BookingRepository + Send + 'static,
{
    let mut shutdown_rx = shutdown_tx.subscribe();
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        debug!(addr = %addr, "New connection");
                        let shared = shared.clone();
                        let shutdown_rx = shutdown_tx.subscribe();
                        tokio::spawn(handle_connection(stream, addr, shared, shutdown_rx));
                    }
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Accept loop shutting down");
                break;
            }
        }
    }
}

async fn handle_connection<B>(
    stream: TcpStream,
    addr: SocketAddr,
    shared: Arc<Shared<B>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) where
    B: BookingRepository + Send + 'static,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    let greeting = tokio::time::timeout(
        HANDSHAKE_TIMEOUT,
        handshake(&mut reader, &mut writer, &shared.token),
    );
    tokio::select! {
        result = greeting => match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(addr = %addr, error = %e, "Handshake failed");
                return;
            }
            Err(_) => {
                warn!(addr = %addr, "Handshake timed out");
                return;
            }
        },
        _ = shutdown_rx.recv() => {
            debug!(addr = %addr, "Closing connection for shutdown");
            return;
        }
    }
    debug!(addr = %addr, "Client authenticated");

    loop {
        let msg = tokio::select! {
            result = read_frame(&mut reader) => result,
            _ = shutdown_rx.recv() => {
                debug!(addr = %addr, "Closing connection for shutdown");
                break;
            }
        };

        let request = match msg {
            Ok(msg) => msg,
            Err(Error::ConnectionClosed) => {
                debug!(addr = %addr, "Connection closed");
                break;
            }
            Err(e) => {
                warn!(addr = %addr, error = %e, "Read error");
                break;
            }
        };

        let reply = respond(request, &shared.backend).await;
        if let Err(e) = write_frame(&mut writer, &reply).await {
            debug!(addr = %addr, error = %e, "Write failed");
            break;
        }
    }
}

/// Expect `Hello` with the right token and answer it
async fn handshake(
    reader: &mut ReadHalf<TcpStream>,
    writer: &mut WriteHalf<TcpStream>,
    token: &str,
) -> Result<()> {
    match read_frame(reader).await? {
        Message::Hello { token: offered } if offered == token => {
            write_frame(writer, &Message::Welcome).await
        }
        Message::Hello { .. } => {
            let reason = "Invalid token".to_string();
            write_frame(
                writer,
                &Message::Rejected {
                    kind: RejectKind::Unauthorized,
                    reason: reason.clone(),
                },
            )
            .await?;
            Err(Error::Rejected(reason))
        }
        _ => {
            let reason = "Expected Hello".to_string();
            write_frame(
                writer,
                &Message::Rejected {
                    kind: RejectKind::Unauthorized,
                    reason: reason.clone(),
                },
            )
            .await?;
            Err(Error::Protocol(reason))
        }
    }
}

/// Run one request against the backend
async fn respond<B: BookingRepository>(request: Message, backend: &Mutex<B>) -> Message {
    match request {
        Message::LoadState => match backend.lock().await.load_state() {
            Ok(snapshot) => Message::State { snapshot },
            Err(e) => {
                error!(error = %e, "Loading state failed");
                Message::rejected(&e)
            }
        },
        Message::AppendBooking { booking } => {
            let booking_id = booking.id;
            match backend.lock().await.append_booking(&booking) {
                Ok(()) => {
                    info!(booking_id = %booking_id, slot_id = %booking.slot_id, "Booking appended");
                    Message::Appended { booking_id }
                }
                Err(e) => {
                    warn!(booking_id = %booking_id, error = %e, "Append refused");
                    Message::rejected(&e)
                }
            }
        }
        Message::RemoveBooking { booking_id } => {
            match backend.lock().await.remove_booking(booking_id) {
                Ok(existed) => {
                    info!(booking_id = %booking_id, existed, "Booking removed");
                    Message::Removed {
                        booking_id,
                        existed,
                    }
                }
                Err(e) => {
                    warn!(booking_id = %booking_id, error = %e, "Remove failed");
                    Message::rejected(&e)
                }
            }
        }
        Message::Ping => Message::Pong,
        other => {
            debug!(message = ?other, "Unexpected request");
            Message::Rejected {
                kind: RejectKind::Invalid,
                reason: "Unexpected message".into(),
            }
        }
    }
}
