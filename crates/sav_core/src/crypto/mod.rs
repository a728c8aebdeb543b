pub mod checksum;
pub mod prng;

pub use checksum::{additive_sum, crc16_ccitt};
pub use prng::KeyStream;
