//! NASA protocol codec primitives: addresses, commands, message sets, CRC,
//! and the decoded `Packet` aggregate (§3, §6.1).

pub mod address;
pub mod command;
pub mod crc;
pub mod message;
pub mod packet;

pub use address::Address;
pub use command::{Command, DataType, PacketType};
pub use crc::crc16;
pub use message::{MessageKind, MessageSet, Value};
pub use packet::Packet;
