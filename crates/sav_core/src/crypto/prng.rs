//! Keystream used by the record and battle-stat ciphers.
//!
//! The games run a 32-bit linear congruential generator, but the state is
//! held in 64 bits and only bits 16..32 of each new state are handed out,
//! so the upper half of the state never influences the output.

const MULTIPLIER: u64 = 0x41C6_4E6D;
const INCREMENT: u64 = 0x6073;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStream {
    state: u64,
}

impl KeyStream {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Stream for the shuffled 128-byte payload, seeded with the additive checksum.
    pub fn record(checksum: u16) -> Self {
        Self::new(u64::from(checksum))
    }

    /// Stream for the battle-stat region, seeded with the personality value.
    pub fn battle_stats(personality: u32) -> Self {
        Self::new(u64::from(personality))
    }

    pub fn next_word(&mut self) -> u16 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        ((self.state >> 16) & 0xFFFF) as u16
    }

    /// XORs every little-endian word of `bytes` with the stream, in place.
    pub fn apply(&mut self, bytes: &mut [u8]) {
        for pair in bytes.chunks_exact_mut(2) {
            let word = u16::from_le_bytes([pair[0], pair[1]]) ^ self.next_word();
            pair.copy_from_slice(&word.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_words_from_zero_seed() {
        let mut stream = KeyStream::new(0);
        // state1 = 0x6073, state2 = 0x6073 * 0x41C64E6D + 0x6073
        assert_eq!(stream.next_word(), 0x0000);
        let expected_state = 0x6073u64 * 0x41C6_4E6D + 0x6073;
        assert_eq!(stream.next_word(), ((expected_state >> 16) & 0xFFFF) as u16);
    }

    #[test]
    fn output_is_bits_16_to_31_of_new_state() {
        let mut stream = KeyStream::record(0xBEEF);
        let mut state = 0xBEEFu64;
        for _ in 0..64 {
            state = state.wrapping_mul(0x41C6_4E6D).wrapping_add(0x6073);
            assert_eq!(stream.next_word(), (state >> 16) as u16);
        }
    }

    #[test]
    fn apply_is_an_involution() {
        let original: Vec<u8> = (0u8..40).collect();
        let mut bytes = original.clone();
        KeyStream::battle_stats(0xDEAD_BEEF).apply(&mut bytes);
        assert_ne!(bytes, original);
        KeyStream::battle_stats(0xDEAD_BEEF).apply(&mut bytes);
        assert_eq!(bytes, original);
    }
}
