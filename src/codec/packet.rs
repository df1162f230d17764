//! The decoded `Packet` aggregate (§3).

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::codec::address::Address;
use crate::codec::command::Command;
use crate::codec::message::MessageSet;

/// A fully decoded NASA packet, owned by the live session's history ring
/// (§3 "Ownership & lifetime"). Read-only once constructed.
#[derive(Debug, Clone)]
pub struct Packet {
    pub source: Address,
    pub destination: Address,
    pub command: Command,
    pub messages: Vec<MessageSet>,
    pub raw_frame: Bytes,
    pub timestamp: DateTime<Utc>,
}

impl Packet {
    /// Render `timestamp` as `YYYY-MM-DD HH:MM:SS.mmm` (§4.2).
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }

    /// Ordered message numbers, lowercase 4-hex-digit zero-padded, as used
    /// in the signature string (§4.4).
    pub fn message_id_hexes(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| format!("{:04x}", m.message_number))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::command::{DataType, PacketType};

    fn sample_packet() -> Packet {
        Packet {
            source: Address::decode([0x20, 0x00, 0x00]),
            destination: Address::decode([0x10, 0x00, 0x00]),
            command: Command {
                packet_information: false,
                protocol_version: 0,
                retry_count: 0,
                packet_type: PacketType::Normal,
                data_type: DataType::Notification,
                packet_number: 1,
            },
            messages: vec![],
            raw_frame: Bytes::from_static(&[0x32, 0x34]),
            timestamp: DateTime::parse_from_rfc3339("2026-07-28T10:00:00.123Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn timestamp_format_has_millis() {
        let p = sample_packet();
        assert_eq!(p.timestamp_string(), "2026-07-28 10:00:00.123");
    }

    #[test]
    fn message_id_hexes_lowercase_padded() {
        use crate::codec::message::Value;
        let mut p = sample_packet();
        p.messages.push(MessageSet { message_number: 0x40, value: Value::Enum(0) });
        assert_eq!(p.message_id_hexes(), vec!["0040".to_string()]);
    }
}
