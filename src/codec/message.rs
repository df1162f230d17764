//! NASA `MessageSet` wire shape and readable-value rendering (§3, §4.3).

use std::fmt;

use crate::constants::{
    known_message_name, FAN_MODE_NAMES, MESSAGE_KIND_MASK, MESSAGE_KIND_SHIFT, MSG_FAN_MODE,
    MSG_OPERATION_MODE, OPERATION_MODE_NAMES,
};

/// The wire shape selected by the top 3 bits of `message_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Enum,
    Variable,
    LongVariable,
    Structure,
}

impl MessageKind {
    /// Derive the wire shape from a raw `message_number`.
    pub fn from_message_number(message_number: u16) -> Self {
        match (message_number & MESSAGE_KIND_MASK) >> MESSAGE_KIND_SHIFT {
            0 => MessageKind::Enum,
            1 => MessageKind::Variable,
            2 => MessageKind::LongVariable,
            _ => MessageKind::Structure,
        }
    }

    /// Fixed payload length in bytes, or `None` for `Structure` (variable).
    pub fn fixed_payload_len(self) -> Option<usize> {
        match self {
            MessageKind::Enum => Some(1),
            MessageKind::Variable => Some(2),
            MessageKind::LongVariable => Some(4),
            MessageKind::Structure => None,
        }
    }
}

/// The dynamically-shaped value carried by a `MessageSet` (§9 "Dynamic
/// value field"): the raw bits are preserved exactly, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Enum(u8),
    Variable(i16),
    LongVariable(i32),
    Structure(Vec<u8>),
}

impl Value {
    pub fn kind(&self) -> MessageKind {
        match self {
            Value::Enum(_) => MessageKind::Enum,
            Value::Variable(_) => MessageKind::Variable,
            Value::LongVariable(_) => MessageKind::LongVariable,
            Value::Structure(_) => MessageKind::Structure,
        }
    }

    /// The payload bytes as they appear on the wire.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        match self {
            Value::Enum(v) => vec![*v],
            Value::Variable(v) => v.to_be_bytes().to_vec(),
            Value::LongVariable(v) => v.to_be_bytes().to_vec(),
            Value::Structure(bytes) => bytes.clone(),
        }
    }

    /// Signed numeric interpretation, used by the temperature rendering
    /// heuristic regardless of whether the underlying kind is signed.
    fn signed(&self) -> i64 {
        match self {
            Value::Enum(v) => *v as i64,
            Value::Variable(v) => *v as i64,
            Value::LongVariable(v) => *v as i64,
            Value::Structure(_) => 0,
        }
    }

    /// Raw unsigned/absolute numeric value, used for non-temperature
    /// decimal rendering and equality-to-zero checks.
    fn raw_numeric(&self) -> i64 {
        self.signed()
    }
}

/// One decoded `MessageSet` record (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSet {
    pub message_number: u16,
    pub value: Value,
}

impl MessageSet {
    /// Total on-wire size: 2 (id) + payload.
    pub fn wire_len(&self) -> usize {
        2 + self.value.to_wire_bytes().len()
    }

    /// Re-serialise this record to its original wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        out.extend_from_slice(&self.message_number.to_be_bytes());
        out.extend(self.value.to_wire_bytes());
        out
    }

    /// The known symbolic name for this message number, if any.
    pub fn name(&self) -> Option<&'static str> {
        known_message_name(self.message_number)
    }

    /// The "readable" secondary rendering described in §4.3. Observational
    /// only — consumers that need numeric values must use `self.value`.
    pub fn readable(&self) -> String {
        let name = self.name();

        if let Some(name) = name {
            if name.contains("temp") {
                let tenths = self.signed_for_temp();
                return format!("{:.1}°C", tenths as f64 / 10.0);
            }
            if name.contains("power") {
                return if self.value.raw_numeric() != 0 {
                    "ON".to_string()
                } else {
                    "OFF".to_string()
                };
            }
        }

        if self.message_number == MSG_OPERATION_MODE {
            return render_enum_table(&OPERATION_MODE_NAMES, self.value.raw_numeric());
        }
        if MSG_FAN_MODE.contains(&self.message_number) {
            return render_enum_table(&FAN_MODE_NAMES, self.value.raw_numeric());
        }

        match &self.value {
            Value::Structure(bytes) => hex::encode_upper(bytes),
            _ => self.value.raw_numeric().to_string(),
        }
    }

    fn signed_for_temp(&self) -> i64 {
        self.value.signed()
    }
}

fn render_enum_table(names: &[&str], value: i64) -> String {
    if value >= 0 && (value as usize) < names.len() {
        names[value as usize].to_string()
    } else {
        format!("Unknown({value})")
    }
}

impl fmt::Display for MessageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}={}",
            self.message_number,
            self.readable()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_message_number() {
        assert_eq!(MessageKind::from_message_number(0x4000), MessageKind::Enum);
        assert_eq!(MessageKind::from_message_number(0x4201), MessageKind::Variable);
        assert_eq!(MessageKind::from_message_number(0x8413), MessageKind::LongVariable);
        assert_eq!(MessageKind::from_message_number(0x4601), MessageKind::Structure);
    }

    #[test]
    fn roundtrip_encode() {
        let m = MessageSet {
            message_number: 0x4201,
            value: Value::Variable(-10),
        };
        let bytes = m.encode();
        assert_eq!(bytes.len(), m.wire_len());
        assert_eq!(&bytes[0..2], &0x4201u16.to_be_bytes());
        assert_eq!(&bytes[2..4], &(-10i16).to_be_bytes());
    }

    #[test]
    fn power_renders_on_off() {
        let on = MessageSet { message_number: 0x4000, value: Value::Enum(1) };
        let off = MessageSet { message_number: 0x4000, value: Value::Enum(0) };
        assert_eq!(on.readable(), "ON");
        assert_eq!(off.readable(), "OFF");
    }

    #[test]
    fn temp_renders_one_decimal() {
        let m = MessageSet { message_number: 0x4201, value: Value::Variable(220) };
        assert_eq!(m.readable(), "22.0°C");
        let below_zero = MessageSet { message_number: 0x4201, value: Value::Variable(-55) };
        assert_eq!(below_zero.readable(), "-5.5°C");
    }

    #[test]
    fn operation_mode_table() {
        let m = MessageSet { message_number: 0x4001, value: Value::Enum(2) };
        assert_eq!(m.readable(), "Dry");
        let out_of_range = MessageSet { message_number: 0x4001, value: Value::Enum(200) };
        assert_eq!(out_of_range.readable(), "Unknown(200)");
    }

    #[test]
    fn fan_mode_table() {
        let m = MessageSet { message_number: 0x4006, value: Value::Enum(3) };
        assert_eq!(m.readable(), "High");
        let m2 = MessageSet { message_number: 0x4007, value: Value::Enum(4) };
        assert_eq!(m2.readable(), "Turbo");
    }

    #[test]
    fn unknown_number_decimal_string() {
        let m = MessageSet { message_number: 0x8413, value: Value::LongVariable(256) };
        assert_eq!(m.readable(), "256");
        assert_eq!(m.name(), None);
    }
}
