//! A passive sniffer and decoder for the Samsung "NASA" HVAC field-bus
//! protocol: frame reassembly, packet decoding, signature-based grouping,
//! and a live capture session that fans decoded packets out to subscribers.
//!
//! ## Usage
//!
//! ```rust
//! use nasa_sniffer::{codec, reassembler, decoder};
//! use bytes::BytesMut;
//!
//! let mut buf = BytesMut::new();
//! buf.extend_from_slice(&[0x32, 0x00, 0x0E]);
//! buf.extend_from_slice(&[0u8; 10]);
//! let crc = codec::crc16(&buf[3..13]);
//! buf.extend_from_slice(&crc.to_be_bytes());
//! buf.extend_from_slice(&[0x34]);
//!
//! let (frames, _resyncs) = reassembler::reassemble(&mut buf);
//! for frame in frames {
//!     match decoder::decode(frame) {
//!         Ok(packet) => println!("{}", packet.timestamp_string()),
//!         Err(e) => eprintln!("decode error: {e}"),
//!     }
//! }
//! ```

pub mod analyser;
pub mod codec;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod reassembler;
pub mod session;
pub mod transport;
pub mod util;

pub use analyser::{AnalyserStats, PacketAnalyser, PacketGroup};
pub use codec::{Address, Command, DataType, MessageKind, MessageSet, Packet, PacketType, Value};
pub use error::{DecodeError, NasaError};
pub use logging::{init_logger, log_info};
pub use reassembler::{reassemble, ResyncEvent};
pub use session::{DiagnosticEvent, LiveSession, SessionEvent, SessionState, Sink, Subscription};
pub use transport::Transport;
