//! NASA bus address: `class.channel.node`, 3 bytes on the wire.

use std::fmt;

use crate::constants::address_class_name;

/// A 3-byte NASA bus address (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub class: u8,
    pub channel: u8,
    pub node: u8,
}

impl Address {
    /// Decode an address from its 3 wire bytes.
    pub fn decode(bytes: [u8; 3]) -> Self {
        Self {
            class: bytes[0],
            channel: bytes[1],
            node: bytes[2],
        }
    }

    /// Encode the address back to its 3 wire bytes.
    pub fn encode(&self) -> [u8; 3] {
        [self.class, self.channel, self.node]
    }

    /// The symbolic class name, or `None` if the class code is unknown.
    pub fn class_name(&self) -> Option<&'static str> {
        address_class_name(self.class)
    }

    /// Dotted upper-case hex form, e.g. `20.00.00`.
    pub fn dotted_hex(&self) -> String {
        format!("{:02X}.{:02X}.{:02X}", self.class, self.channel, self.node)
    }
}

impl fmt::Display for Address {
    /// Human form, e.g. `Indoor(20.00.00)`; unknown classes render as
    /// `Unknown(CC.HH.NN)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.class_name().unwrap_or("Unknown");
        write!(f, "{name}({})", self.dotted_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_encode_roundtrip() {
        let addr = Address::decode([0x20, 0x00, 0x01]);
        assert_eq!(addr.encode(), [0x20, 0x00, 0x01]);
    }

    #[test]
    fn known_class_renders_name() {
        let addr = Address::decode([0x20, 0x00, 0x00]);
        assert_eq!(addr.dotted_hex(), "20.00.00");
        assert_eq!(addr.to_string(), "Indoor(20.00.00)");
    }

    #[test]
    fn unknown_class_renders_unknown() {
        let addr = Address::decode([0x99, 0x00, 0x00]);
        assert_eq!(addr.to_string(), "Unknown(99.00.00)");
    }
}
