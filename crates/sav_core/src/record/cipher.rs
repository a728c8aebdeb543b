use log::debug;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::crypto::{KeyStream, additive_sum};
use crate::reader::{u16_at, u32_at};
use crate::record::shuffle::{PAYLOAD_LEN, PAYLOAD_OFFSET};

pub const RECORD_SIZE: usize = 0xEC;
pub const PERSONALITY_OFFSET: usize = 0x0;
pub const CHECKSUM_OFFSET: usize = 0x6;
pub const PAYLOAD_END: usize = PAYLOAD_OFFSET + PAYLOAD_LEN;
pub const BATTLE_STATS_OFFSET: usize = 0x88;
/// Party records carry the full 100-byte battle-stat region; only the first
/// 20 bytes (level, HP and the six stats) are interpreted.
pub const BATTLE_STATS_LEN: usize = RECORD_SIZE - BATTLE_STATS_OFFSET;

/// A party record with its payload and battle stats in plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedRecord {
    bytes: [u8; RECORD_SIZE],
    stored_checksum: u16,
    computed_checksum: u16,
}

impl DecryptedRecord {
    pub fn bytes(&self) -> &[u8; RECORD_SIZE] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8; RECORD_SIZE] {
        &mut self.bytes
    }

    pub fn into_bytes(self) -> [u8; RECORD_SIZE] {
        self.bytes
    }

    pub fn personality(&self) -> u32 {
        u32_at(&self.bytes, PERSONALITY_OFFSET)
    }

    pub fn stored_checksum(&self) -> u16 {
        self.stored_checksum
    }

    pub fn computed_checksum(&self) -> u16 {
        self.computed_checksum
    }

    pub fn is_valid(&self) -> bool {
        self.stored_checksum == self.computed_checksum
    }

    pub fn verify(&self) -> Result<(), CoreError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(CoreError::new(
            CoreErrorCode::RecordChecksumMismatch,
            format!(
                "record checksum mismatch: stored={:#06x}, computed={:#06x}",
                self.stored_checksum, self.computed_checksum
            ),
        ))
    }
}

fn record_array(bytes: &[u8]) -> Result<[u8; RECORD_SIZE], CoreError> {
    bytes
        .get(..RECORD_SIZE)
        .and_then(|b| <[u8; RECORD_SIZE]>::try_from(b).ok())
        .ok_or_else(|| {
            CoreError::malformed(format!(
                "party record too short: len={}, need {RECORD_SIZE}",
                bytes.len()
            ))
        })
}

/// Decrypts a 236-byte party record.
///
/// A checksum mismatch is not an error here: the result reports it through
/// [`DecryptedRecord::is_valid`] and [`DecryptedRecord::verify`].
pub fn decrypt_record(ciphertext: &[u8]) -> Result<DecryptedRecord, CoreError> {
    let mut bytes = record_array(ciphertext)?;
    let personality = u32_at(&bytes, PERSONALITY_OFFSET);
    let stored_checksum = u16_at(&bytes, CHECKSUM_OFFSET);

    KeyStream::record(stored_checksum).apply(&mut bytes[PAYLOAD_OFFSET..PAYLOAD_END]);
    let computed_checksum = additive_sum(&bytes[PAYLOAD_OFFSET..PAYLOAD_END]);
    KeyStream::battle_stats(personality).apply(&mut bytes[BATTLE_STATS_OFFSET..RECORD_SIZE]);

    debug!(
        "decrypted record pid={personality:#010x} stored={stored_checksum:#06x} computed={computed_checksum:#06x}"
    );

    Ok(DecryptedRecord {
        bytes,
        stored_checksum,
        computed_checksum,
    })
}

/// Encrypts a plaintext record, stamping the freshly computed payload sum
/// into the checksum field.
pub fn encrypt_record(plaintext: &[u8]) -> Result<[u8; RECORD_SIZE], CoreError> {
    let mut bytes = record_array(plaintext)?;
    let personality = u32_at(&bytes, PERSONALITY_OFFSET);
    let checksum = additive_sum(&bytes[PAYLOAD_OFFSET..PAYLOAD_END]);

    bytes[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_le_bytes());
    KeyStream::record(checksum).apply(&mut bytes[PAYLOAD_OFFSET..PAYLOAD_END]);
    KeyStream::battle_stats(personality).apply(&mut bytes[BATTLE_STATS_OFFSET..RECORD_SIZE]);

    debug!("encrypted record pid={personality:#010x} checksum={checksum:#06x}");
    Ok(bytes)
}
