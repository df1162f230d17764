//! Resynchronising byte-stream reassembler (§4.1).
//!
//! Grounded on the teacher's incremental `FrameHandler::parse_frame`
//! (cache-on-incomplete, re-invoke-on-more-data) and its use of
//! `bytes::BytesMut` as the append-only transport buffer.

use bytes::{Bytes, BytesMut};

use crate::constants::{FRAME_MAX_LEN, FRAME_MIN_LEN, FRAME_START};

/// A diagnostic reporting bytes discarded while searching for the next
/// start delimiter (§4.1, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncEvent {
    pub skipped: usize,
}

/// Scan `buf` for candidate frames, mutating it in place to the remaining
/// tail. Pure with respect to the bytes it has not yet consumed: every
/// invocation consumes zero or more bytes from the front and never
/// revisits them, so calling this repeatedly as more bytes arrive (even
/// one byte at a time) is equivalent to calling it once on the full
/// stream (§8 "Idempotence").
pub fn reassemble(buf: &mut BytesMut) -> (Vec<Bytes>, Vec<ResyncEvent>) {
    let mut frames = Vec::new();
    let mut resyncs = Vec::new();

    loop {
        if buf.is_empty() {
            break;
        }

        if buf[0] != FRAME_START {
            match buf.iter().position(|&b| b == FRAME_START) {
                Some(offset) => {
                    resyncs.push(ResyncEvent { skipped: offset });
                    let _ = buf.split_to(offset);
                }
                None => {
                    let skipped = buf.len();
                    buf.clear();
                    resyncs.push(ResyncEvent { skipped });
                    break;
                }
            }
            continue;
        }

        // Await length: need the 2-byte size field before we can decide anything.
        if buf.len() < 3 {
            break;
        }

        let declared = (((buf[1] as usize) << 8) | buf[2] as usize) + 2;

        if declared < FRAME_MIN_LEN || declared > FRAME_MAX_LEN {
            // Spurious 0x32: treat as data, not a frame start. Advance by 1
            // and resume scanning from step 1 (§4.1 step 3 / Open Questions).
            resyncs.push(ResyncEvent { skipped: 1 });
            let _ = buf.split_to(1);
            continue;
        }

        // Await full frame.
        if buf.len() < declared {
            break;
        }

        let frame = buf.split_to(declared).freeze();
        frames.push(frame);
    }

    (frames, resyncs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_frame() -> Vec<u8> {
        // size_field = 0x000E -> declared len = 16; zero-filled body; CRC
        // computed over bytes [3..13) which are all zero -> crc16(&[0u8;10]).
        let mut frame = vec![0x32, 0x00, 0x0E];
        frame.extend(std::iter::repeat(0u8).take(10)); // addr/addr/cmd/capacity
        let crc = crate::codec::crc16(&frame[3..13]);
        frame.extend(crc.to_be_bytes());
        frame.push(0x34);
        assert_eq!(frame.len(), 16);
        frame
    }

    #[test]
    fn minimal_decode_single_invocation() {
        let mut buf = BytesMut::from(&minimal_frame()[..]);
        let (frames, resyncs) = reassemble(&mut buf);
        assert_eq!(frames.len(), 1);
        assert!(resyncs.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn resync_then_decode() {
        let mut data = vec![0xAA, 0xBB, 0xCC];
        data.extend(minimal_frame());
        let mut buf = BytesMut::from(&data[..]);
        let (frames, resyncs) = reassemble(&mut buf);
        assert_eq!(frames.len(), 1);
        assert_eq!(resyncs, vec![ResyncEvent { skipped: 3 }]);
    }

    #[test]
    fn chunked_input_across_invocations() {
        let frame = minimal_frame();
        let chunk_sizes = [1, 2, 3, 4, 6];
        assert_eq!(chunk_sizes.iter().sum::<usize>(), frame.len());

        let mut buf = BytesMut::new();
        let mut all_frames = Vec::new();
        let mut offset = 0;
        for size in chunk_sizes {
            buf.extend_from_slice(&frame[offset..offset + size]);
            offset += size;
            let (frames, _resyncs) = reassemble(&mut buf);
            all_frames.extend(frames);
        }

        assert_eq!(all_frames.len(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn oversized_declared_length_triggers_resync() {
        // size_field = 0xFFFF -> declared = 65537, way over FRAME_MAX_LEN.
        let mut data = vec![0x32, 0xFF, 0xFF];
        data.extend(minimal_frame());
        let mut buf = BytesMut::from(&data[..]);
        let (frames, resyncs) = reassemble(&mut buf);
        assert_eq!(frames.len(), 1);
        assert_eq!(resyncs[0].skipped, 1);
    }

    #[test]
    fn one_byte_at_a_time_matches_single_shot() {
        let frame = minimal_frame();

        let mut whole_buf = BytesMut::from(&frame[..]);
        let (whole_frames, _) = reassemble(&mut whole_buf);

        let mut byte_buf = BytesMut::new();
        let mut byte_frames = Vec::new();
        for &b in &frame {
            byte_buf.extend_from_slice(&[b]);
            let (frames, _) = reassemble(&mut byte_buf);
            byte_frames.extend(frames);
        }

        assert_eq!(whole_frames, byte_frames);
    }

    #[test]
    fn no_start_byte_discards_everything() {
        let mut buf = BytesMut::from(&b"garbagebytes"[..]);
        let (frames, resyncs) = reassemble(&mut buf);
        assert!(frames.is_empty());
        assert_eq!(resyncs, vec![ResyncEvent { skipped: 12 }]);
        assert!(buf.is_empty());
    }

    #[test]
    fn incomplete_frame_waits_for_more_data() {
        let frame = minimal_frame();
        let mut buf = BytesMut::from(&frame[..frame.len() - 1]);
        let (frames, resyncs) = reassemble(&mut buf);
        assert!(frames.is_empty());
        assert!(resyncs.is_empty());
        assert_eq!(buf.len(), frame.len() - 1);
    }
}
