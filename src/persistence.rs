//! Replay/export envelope (§6.3): a compact, forward-compatible JSON format
//! for persisting and reloading a capture.
//!
//! Grounded on the reference crate's `serde`-derived wire/record types
//! (`payload::data` structs), adapted here to a short-coded field schema
//! that is explicitly allowed to evolve (§9 "Open questions").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::command::{DataType, PacketType};
use crate::codec::{Address, Command, MessageSet, Packet, Value};
use crate::error::NasaError;

/// One persisted `MessageSet` record, short-coded per §6.3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedMessage {
    /// message number
    pub mn: u16,
    /// message number, hex
    pub mnh: String,
    /// message type (wire kind) as a short tag
    pub mt: String,
    /// message type name (symbolic), if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtn: Option<String>,
    /// raw numeric value
    pub v: i64,
    /// readable rendering
    pub rv: String,
    /// symbolic name, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
}

/// One persisted packet record, short-coded per §6.3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedPacket {
    /// timestamp, ISO-8601
    pub t: DateTime<Utc>,
    /// source address, dotted hex
    pub s: String,
    /// source address, readable (with class name)
    pub sr: String,
    /// destination address, dotted hex
    pub d: String,
    /// destination address, readable
    pub dr: String,
    /// packet type, short tag
    pub pt: String,
    /// packet type name
    pub ptn: String,
    /// data type, short tag
    pub dt: String,
    /// data type name
    pub dtn: String,
    /// packet number
    pub pn: u8,
    /// protocol version
    pub pv: u8,
    /// retry count
    pub rc: u8,
    /// messages
    pub m: Vec<PersistedMessage>,
    /// raw frame, hex-encoded
    pub rd: String,
    /// raw frame, hex-encoded with a human byte-count hint
    pub rdh: String,
}

/// Top-level envelope persisted to / loaded from disk (§6.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayEnvelope {
    pub version: u32,
    #[serde(rename = "exportedAt")]
    pub exported_at: DateTime<Utc>,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    pub p: Vec<PersistedPacket>,
}

const ENVELOPE_VERSION: u32 = 1;

impl PersistedMessage {
    fn from_message(m: &MessageSet) -> Self {
        let mt = match m.value {
            Value::Enum(_) => "enum",
            Value::Variable(_) => "variable",
            Value::LongVariable(_) => "long_variable",
            Value::Structure(_) => "structure",
        };
        let raw = match &m.value {
            Value::Enum(v) => *v as i64,
            Value::Variable(v) => *v as i64,
            Value::LongVariable(v) => *v as i64,
            Value::Structure(bytes) => bytes.len() as i64,
        };
        Self {
            mn: m.message_number,
            mnh: format!("{:04x}", m.message_number),
            mt: mt.to_string(),
            mtn: m.name().map(|s| s.to_string()),
            v: raw,
            rv: m.readable(),
            n: m.name().map(|s| s.to_string()),
        }
    }
}

impl PersistedPacket {
    fn from_packet(p: &Packet) -> Self {
        Self {
            t: p.timestamp,
            s: p.source.dotted_hex(),
            sr: p.source.to_string(),
            d: p.destination.dotted_hex(),
            dr: p.destination.to_string(),
            pt: format!("{:?}", p.command.packet_type),
            ptn: p.command.packet_type.to_string(),
            dt: format!("{:?}", p.command.data_type),
            dtn: p.command.data_type.to_string(),
            pn: p.command.packet_number,
            pv: p.command.protocol_version,
            rc: p.command.retry_count,
            m: p.messages.iter().map(PersistedMessage::from_message).collect(),
            rd: hex::encode(&p.raw_frame),
            rdh: format!("{} bytes", p.raw_frame.len()),
        }
    }

    /// Reconstruct a `Packet` from a persisted record. Tolerant of unknown
    /// `pt`/`dt` short tags: they fall back to `Unknown(0)` rather than
    /// failing the whole load (§6.3 "readers MUST ignore unknown fields").
    fn to_packet(&self) -> Result<Packet, NasaError> {
        let source = parse_dotted_hex(&self.s)
            .ok_or_else(|| NasaError::Replay(format!("bad source address: {}", self.s)))?;
        let destination = parse_dotted_hex(&self.d)
            .ok_or_else(|| NasaError::Replay(format!("bad destination address: {}", self.d)))?;

        let packet_type = match self.ptn.as_str() {
            "StandBy" => PacketType::StandBy,
            "Normal" => PacketType::Normal,
            "Gathering" => PacketType::Gathering,
            "Install" => PacketType::Install,
            "Download" => PacketType::Download,
            _ => PacketType::Unknown(0),
        };
        let data_type = match self.dtn.as_str() {
            "Undefined" => DataType::Undefined,
            "Read" => DataType::Read,
            "Write" => DataType::Write,
            "Request" => DataType::Request,
            "Notification" => DataType::Notification,
            "Response" => DataType::Response,
            "Ack" => DataType::Ack,
            "Nack" => DataType::Nack,
            _ => DataType::Unknown(0),
        };

        let raw_frame = hex::decode(&self.rd)
            .map(bytes::Bytes::from)
            .map_err(|e| NasaError::Replay(format!("bad raw_frame hex: {e}")))?;

        let messages = self
            .m
            .iter()
            .map(|pm| {
                let value = match pm.mt.as_str() {
                    "enum" => Value::Enum(pm.v as u8),
                    "variable" => Value::Variable(pm.v as i16),
                    "long_variable" => Value::LongVariable(pm.v as i32),
                    _ => Value::Structure(Vec::new()),
                };
                MessageSet { message_number: pm.mn, value }
            })
            .collect();

        Ok(Packet {
            source,
            destination,
            command: Command {
                packet_information: false,
                protocol_version: self.pv,
                retry_count: self.rc,
                packet_type,
                data_type,
                packet_number: self.pn,
            },
            messages,
            raw_frame,
            timestamp: self.t,
        })
    }
}

fn parse_dotted_hex(s: &str) -> Option<Address> {
    let mut parts = s.split('.');
    let class = u8::from_str_radix(parts.next()?, 16).ok()?;
    let channel = u8::from_str_radix(parts.next()?, 16).ok()?;
    let node = u8::from_str_radix(parts.next()?, 16).ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Address::decode([class, channel, node]))
}

/// Serialize a capture to the replay envelope (§6.3).
pub fn export(packets: &[Packet]) -> ReplayEnvelope {
    ReplayEnvelope {
        version: ENVELOPE_VERSION,
        exported_at: Utc::now(),
        total_count: packets.len(),
        p: packets.iter().map(PersistedPacket::from_packet).collect(),
    }
}

/// Parse a replay envelope from JSON text.
pub fn import(json: &str) -> Result<Vec<Packet>, NasaError> {
    let envelope: ReplayEnvelope = serde_json::from_str(json)?;
    envelope.p.iter().map(PersistedPacket::to_packet).collect()
}
