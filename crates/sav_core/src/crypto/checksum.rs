//! Record and block checksums.
//!
//! Records use a 16-bit wrapping sum of their decrypted payload words; blocks
//! use CRC16-CCITT (polynomial 0x1021, initial value 0xFFFF, no reflection,
//! no final xor) over their data region.

use crc_any::CRCu16;

/// Wrapping sum of the little-endian words in `bytes`. A trailing odd byte is ignored.
pub fn additive_sum(bytes: &[u8]) -> u16 {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .fold(0u16, u16::wrapping_add)
}

pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
    let mut crc = CRCu16::crc16ccitt_false();
    crc.digest(bytes);
    crc.get_crc()
}
