//! Common utility functions shared across the crate: hex encoding/decoding
//! and rate-limited structured logging helpers.

pub mod hex;
pub mod logging;

pub use hex::{decode_hex, encode_hex, format_hex_compact, pretty_hex};
pub use logging::{log_frame_hex, LogThrottle, ThrottleManager};
