//! Block order of a record's 128-byte payload.
//!
//! The payload holds four 32-byte sub-blocks A..D. Their physical order is one
//! of the 24 permutations of ABCD, chosen by bits 13..18 of the personality
//! value. Row `n` of [`SHUFFLE_TABLE`] is the n-th permutation in
//! lexicographic order; `slots[b]` is the physical slot of logical block `b`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};

pub const BLOCK_SIZE: usize = 32;
pub const BLOCK_COUNT: usize = 4;
/// Personality, unused half-word and checksum precede the payload.
pub const PAYLOAD_OFFSET: usize = 0x8;
pub const PAYLOAD_LEN: usize = BLOCK_SIZE * BLOCK_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockId {
    A,
    B,
    C,
    D,
}

impl BlockId {
    pub const ALL: [BlockId; BLOCK_COUNT] = [BlockId::A, BlockId::B, BlockId::C, BlockId::D];

    pub fn from_index(index: usize) -> Result<Self, CoreError> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::InvalidBlockIndex,
                format!("invalid block index {index}, expected 0-3"),
            )
        })
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        };
        write!(f, "{c}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleRow {
    /// Logical block stored in each physical slot.
    pub order: [BlockId; BLOCK_COUNT],
    /// Physical slot holding each logical block.
    pub slots: [u8; BLOCK_COUNT],
}

impl ShuffleRow {
    pub fn block_offset(&self, block: BlockId) -> usize {
        PAYLOAD_OFFSET + usize::from(self.slots[block.index()]) * BLOCK_SIZE
    }
}

const fn row(order: [BlockId; 4], slots: [u8; 4]) -> ShuffleRow {
    ShuffleRow { order, slots }
}

use BlockId::{A, B, C, D};

pub static SHUFFLE_TABLE: [ShuffleRow; 24] = [
    row([A, B, C, D], [0, 1, 2, 3]),
    row([A, B, D, C], [0, 1, 3, 2]),
    row([A, C, B, D], [0, 2, 1, 3]),
    row([A, C, D, B], [0, 3, 1, 2]),
    row([A, D, B, C], [0, 2, 3, 1]),
    row([A, D, C, B], [0, 3, 2, 1]),
    row([B, A, C, D], [1, 0, 2, 3]),
    row([B, A, D, C], [1, 0, 3, 2]),
    row([B, C, A, D], [2, 0, 1, 3]),
    row([B, C, D, A], [3, 0, 1, 2]),
    row([B, D, A, C], [2, 0, 3, 1]),
    row([B, D, C, A], [3, 0, 2, 1]),
    row([C, A, B, D], [1, 2, 0, 3]),
    row([C, A, D, B], [1, 3, 0, 2]),
    row([C, B, A, D], [2, 1, 0, 3]),
    row([C, B, D, A], [3, 1, 0, 2]),
    row([C, D, A, B], [2, 3, 0, 1]),
    row([C, D, B, A], [3, 2, 0, 1]),
    row([D, A, B, C], [1, 2, 3, 0]),
    row([D, A, C, B], [1, 3, 2, 0]),
    row([D, B, A, C], [2, 1, 3, 0]),
    row([D, B, C, A], [3, 1, 2, 0]),
    row([D, C, A, B], [2, 3, 1, 0]),
    row([D, C, B, A], [3, 2, 1, 0]),
];

pub fn shift_index(personality: u32) -> usize {
    (((personality >> 13) & 0x1F) % 24) as usize
}

pub fn shuffle_row(personality: u32) -> &'static ShuffleRow {
    &SHUFFLE_TABLE[shift_index(personality)]
}

/// Offset of `block` from the start of the record.
pub fn locate(block: BlockId, personality: u32) -> usize {
    shuffle_row(personality).block_offset(block)
}

pub fn locate_index(block: usize, personality: u32) -> Result<usize, CoreError> {
    Ok(locate(BlockId::from_index(block)?, personality))
}

/// The 32 bytes of `block` within a decrypted record.
pub fn block_slice(record: &[u8], block: BlockId, personality: u32) -> Result<&[u8], CoreError> {
    let start = locate(block, personality);
    record.get(start..start + BLOCK_SIZE).ok_or_else(|| {
        CoreError::malformed(format!(
            "record too short for block {block}: len={}, need {}",
            record.len(),
            start + BLOCK_SIZE
        ))
    })
}
