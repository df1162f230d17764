//! # NASA Sniffer Error Handling
//!
//! Defines the error taxonomy used throughout the crate: the decode-time
//! kinds from §7, plus the ambient transport/config/replay concerns that
//! wrap them at the process boundary.

use thiserror::Error;

/// Decode-time failure kinds (§7). All are non-fatal: the pipeline reports
/// these to the session's diagnostic sink and continues with the next frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// `raw_frame[0] != 0x32`.
    #[error("invalid start byte: 0x{0:02X}")]
    InvalidStart(u8),

    /// Declared frame length falls outside `[16, 1500]`.
    #[error("unexpected frame size: {0}")]
    UnexpectedSize(usize),

    /// `size_field + 2` does not match the actual candidate frame length.
    #[error("size mismatch: declared {declared}, actual {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    /// `raw_frame[last] != 0x34`.
    #[error("invalid end byte: 0x{0:02X}")]
    InvalidEnd(u8),

    /// Recomputed CRC-16 does not match the trailing CRC field.
    #[error("CRC mismatch: expected 0x{expected:04X}, actual 0x{actual:04X}")]
    CrcError { expected: u16, actual: u16 },

    /// A message record's declared payload would overrun the CRC trailer.
    #[error("truncated message at cursor {cursor}")]
    TruncatedMessage { cursor: usize },

    /// Message decoding finished short of or past the expected CRC offset.
    #[error("trailing bytes: cursor {cursor}, expected {expected}")]
    TrailingBytes { cursor: usize, expected: usize },
}

/// Top-level error type for the sniffer. Decode errors are carried inline
/// (see `DecodeError`) and are not fatal; the remaining variants here cover
/// the ambient concerns (transport, configuration, replay, I/O) per §7a.
#[derive(Debug, Error)]
pub enum NasaError {
    /// A decode error, carried with the raw bytes that produced it.
    #[error("decode error: {source}")]
    Decode {
        #[source]
        source: DecodeError,
        raw: Vec<u8>,
    },

    /// Transport-level failure (connect/read/close).
    #[error("transport error: {0}")]
    Transport(String),

    /// Startup misconfiguration (§7 "fatal errors").
    #[error("configuration error: {0}")]
    Config(String),

    /// A persisted replay file could not be read or parsed (§6.3).
    #[error("replay error: {0}")]
    Replay(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure for the replay envelope.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
