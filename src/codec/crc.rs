//! CRC-16/CCITT-FALSE (a.k.a. XMODEM: poly 0x1021, init 0x0000, no
//! reflection, no final XOR) over the NASA frame body.
//!
//! Grounded on the bit-banged block CRC in the teacher's wM-Bus block
//! validation (same shift-xor structure, different polynomial/init), but
//! delegated to the `crc` crate's table-driven implementation since this
//! polynomial/init/reflect combination is a named, well-known algorithm.

use crc::{Crc, CRC_16_XMODEM};

const NASA_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute the CRC-16 used to protect `raw_frame[3 .. len-3]`.
pub fn crc16(data: &[u8]) -> u16 {
    NASA_CRC.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_of_empty_is_zero() {
        // init = 0x0000, no xorout: an empty message leaves the register untouched.
        assert_eq!(crc16(&[]), 0x0000);
    }

    #[test]
    fn crc_is_deterministic() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(crc16(&data), crc16(&data));
    }

    #[test]
    fn crc_differs_on_bit_flip() {
        let mut data = [0x10, 0x20, 0x30, 0x40];
        let original = crc16(&data);
        data[1] ^= 0x01;
        assert_ne!(crc16(&data), original);
    }
}
