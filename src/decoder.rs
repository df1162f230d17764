//! Packet decoder: validates one candidate frame and produces either a
//! `Packet` or a typed `DecodeError` (§4.2).

use bytes::Bytes;
use chrono::Utc;

use crate::codec::{Address, Command, MessageKind, MessageSet, Packet, Value};
use crate::constants::{
    ADDRESS_LEN, COMMAND_LEN, CRC_LEN, END_LEN, FRAME_END, FRAME_HEADER_OFFSET, FRAME_MAX_LEN,
    FRAME_MIN_LEN, FRAME_START,
};
use crate::error::DecodeError;

/// Decode one candidate frame (as extracted by the reassembler) into a
/// `Packet`. Never panics on malformed input; every failure path returns a
/// `DecodeError` (§7 "non-fatal").
pub fn decode(frame: Bytes) -> Result<Packet, DecodeError> {
    let len = frame.len();

    if frame.first().copied() != Some(FRAME_START) {
        return Err(DecodeError::InvalidStart(frame.first().copied().unwrap_or(0)));
    }

    if !(FRAME_MIN_LEN..=FRAME_MAX_LEN).contains(&len) {
        return Err(DecodeError::UnexpectedSize(len));
    }

    let declared = (((frame[1] as usize) << 8) | frame[2] as usize) + 2;
    if declared != len {
        return Err(DecodeError::SizeMismatch { declared, actual: len });
    }

    if frame[len - 1] != FRAME_END {
        return Err(DecodeError::InvalidEnd(frame[len - 1]));
    }

    let crc_offset = len - CRC_LEN - END_LEN;
    let expected = u16::from_be_bytes([frame[crc_offset], frame[crc_offset + 1]]);
    let actual = crate::codec::crc16(&frame[FRAME_HEADER_OFFSET..crc_offset]);
    let _span = crate::util::logging::span_crc_validation(expected, actual).entered();
    if expected != actual {
        return Err(DecodeError::CrcError { expected, actual });
    }
    drop(_span);

    let mut cursor = FRAME_HEADER_OFFSET;
    let source = Address::decode(read_array::<3>(&frame, &mut cursor, ADDRESS_LEN));
    let destination = Address::decode(read_array::<3>(&frame, &mut cursor, ADDRESS_LEN));
    let command = Command::decode(read_array::<3>(&frame, &mut cursor, COMMAND_LEN));

    let capacity = frame[cursor];
    cursor += 1;

    let end = crc_offset; // len - 3
    let mut messages = Vec::with_capacity(capacity as usize);

    for _ in 0..capacity {
        if cursor + 2 > end {
            return Err(DecodeError::TruncatedMessage { cursor });
        }
        let message_number = u16::from_be_bytes([frame[cursor], frame[cursor + 1]]);
        cursor += 2;

        let kind = MessageKind::from_message_number(message_number);
        let value = match kind {
            MessageKind::Enum => {
                if cursor + 1 > end {
                    return Err(DecodeError::TruncatedMessage { cursor });
                }
                let v = frame[cursor];
                cursor += 1;
                Value::Enum(v)
            }
            MessageKind::Variable => {
                if cursor + 2 > end {
                    return Err(DecodeError::TruncatedMessage { cursor });
                }
                let v = i16::from_be_bytes([frame[cursor], frame[cursor + 1]]);
                cursor += 2;
                Value::Variable(v)
            }
            MessageKind::LongVariable => {
                if cursor + 4 > end {
                    return Err(DecodeError::TruncatedMessage { cursor });
                }
                let v = i32::from_be_bytes([
                    frame[cursor],
                    frame[cursor + 1],
                    frame[cursor + 2],
                    frame[cursor + 3],
                ]);
                cursor += 4;
                Value::LongVariable(v)
            }
            MessageKind::Structure => {
                // Absorbs all remaining payload bytes (§3, §9 "Structure
                // messages"); any record after it is therefore out of data.
                let bytes = frame[cursor..end].to_vec();
                cursor = end;
                Value::Structure(bytes)
            }
        };

        messages.push(MessageSet { message_number, value });
    }

    if cursor != end {
        return Err(DecodeError::TrailingBytes { cursor, expected: end });
    }

    Ok(Packet {
        source,
        destination,
        command,
        messages,
        raw_frame: frame,
        timestamp: Utc::now(),
    })
}

fn read_array<const N: usize>(frame: &[u8], cursor: &mut usize, len: usize) -> [u8; N] {
    debug_assert_eq!(N, len);
    let mut out = [0u8; N];
    out.copy_from_slice(&frame[*cursor..*cursor + len]);
    *cursor += len;
    out
}
