//! Network protocol message types
//!
//! All messages are JSON-serialized and length-prefixed on the wire.

use parkpro_core::{Booking, BookingId, Error as CoreError, Snapshot};
use serde::{Deserialize, Serialize};

/// Why the server refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectKind {
    Unauthorized,
    SlotUnavailable,
    InvalidInterval,
    NotFound,
    Invalid,
}

impl RejectKind {
    /// Classify a backend failure for the wire
    pub fn of(error: &CoreError) -> Self {
        match error {
            CoreError::SlotUnavailable(_) => RejectKind::SlotUnavailable,
            CoreError::InvalidInterval { .. } => RejectKind::InvalidInterval,
            CoreError::NotFound(_) => RejectKind::NotFound,
            _ => RejectKind::Invalid,
        }
    }
}

/// Network protocol messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// First frame on every connection
    Hello { token: String },

    /// Server accepted the token
    Welcome,

    /// Request the directory and the booking log
    LoadState,

    State { snapshot: Snapshot },

    AppendBooking { booking: Booking },

    Appended { booking_id: BookingId },

    RemoveBooking { booking_id: BookingId },

    /// `existed` is false when the id was unknown
    Removed { booking_id: BookingId, existed: bool },

    Rejected { kind: RejectKind, reason: String },

    /// Ping to keep connection alive
    Ping,

    /// Pong response to ping
    Pong,
}

impl Message {
    /// Serialize message to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Reply for a failed backend call
    pub fn rejected(error: &CoreError) -> Self {
        let reason = match error {
            CoreError::SlotUnavailable(reason) | CoreError::NotFound(reason) => reason.clone(),
            other => other.to_string(),
        };
        Message::Rejected {
            kind: RejectKind::of(error),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use parkpro_core::{ApartmentId, SlotId};

    #[test]
    fn test_tagged_encoding() {
        let bytes = Message::Hello {
            token: "secret".into(),
        }
        .to_bytes()
        .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["type"], "Hello");
        assert_eq!(json["token"], "secret");

        let json: serde_json::Value = serde_json::from_slice(
            &Message::rejected(&CoreError::SlotUnavailable("taken".into()))
                .to_bytes()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(json["type"], "Rejected");
        assert_eq!(json["kind"], "slot_unavailable");
    }

    #[test]
    fn test_booking_survives_the_wire() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let booking = Booking::new(
            ApartmentId::new("apt-6"),
            SlotId::new("ps-6"),
            day.and_hms_opt(16, 0, 0).unwrap(),
            day.succ_opt().unwrap().and_hms_opt(11, 0, 0).unwrap(),
        )
        .with_guest("Ada".into());
        let msg = Message::AppendBooking { booking };

        let decoded = Message::from_bytes(&msg.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_reject_kinds() {
        assert_eq!(
            RejectKind::of(&CoreError::NotFound("slot ps-0".into())),
            RejectKind::NotFound
        );
        assert_eq!(
            RejectKind::of(&CoreError::Config("bad".into())),
            RejectKind::Invalid
        );
    }
}
