#![allow(dead_code)]

use sav_core::crypto::crc16_ccitt;
use sav_core::encrypt_record;
use sav_core::record::RECORD_SIZE;
use sav_core::record::shuffle::{BlockId, locate};
use sav_core::sav::{CHUNK_SIZE, MAGIC_JP_INTL, SAVE_SIZE};

const SMALL_SIZE: usize = 0xCF2C;
const BIG_SIZE: usize = 0x121E4;
const PARTY_OFFSET: usize = 0xA0;

/// Record holding only a personality, species and level; other fields are
/// filled in through the session API.
fn record(personality: u32, species: u16, level: u8) -> [u8; RECORD_SIZE] {
    let mut rec = [0u8; RECORD_SIZE];
    rec[0..4].copy_from_slice(&personality.to_le_bytes());
    let a = locate(BlockId::A, personality);
    rec[a..a + 2].copy_from_slice(&species.to_le_bytes());
    let c = locate(BlockId::C, personality);
    rec[c..c + 2].copy_from_slice(&0xFFFFu16.to_le_bytes());
    rec[0x88 + 4] = level;
    encrypt_record(&rec).expect("encrypt should succeed")
}

fn footer(bytes: &mut [u8], start: usize, size: usize, id: u32, save_number: u32) {
    let f = start + size - 0x14;
    bytes[f..f + 4].copy_from_slice(&id.to_le_bytes());
    bytes[f + 4..f + 8].copy_from_slice(&save_number.to_le_bytes());
    bytes[f + 8..f + 12].copy_from_slice(&(size as u32).to_le_bytes());
    bytes[f + 12..f + 16].copy_from_slice(&MAGIC_JP_INTL.to_le_bytes());
    let crc = crc16_ccitt(&bytes[start..start + size - 0x14]);
    bytes[start + size - 2..start + size].copy_from_slice(&crc.to_le_bytes());
}

/// A Platinum save whose party is `(personality, species, level)` triples.
pub fn platinum_save(party: &[(u32, u16, u8)]) -> Vec<u8> {
    let mut bytes = vec![0u8; SAVE_SIZE];
    for slot in 0..2 {
        let base = slot * CHUNK_SIZE;
        let count_at = base + PARTY_OFFSET - 4;
        bytes[count_at..count_at + 4].copy_from_slice(&(party.len() as u32).to_le_bytes());
        for (i, &(pid, species, level)) in party.iter().enumerate() {
            let at = base + PARTY_OFFSET + i * RECORD_SIZE;
            bytes[at..at + RECORD_SIZE].copy_from_slice(&record(pid, species, level));
        }
        let id = 0x100 + slot as u32;
        let save_number = 10 - slot as u32;
        footer(&mut bytes, base, SMALL_SIZE, id, save_number);
        footer(&mut bytes, base + SMALL_SIZE, BIG_SIZE, id, save_number);
    }
    bytes
}

pub fn party_record_offset(slot: usize, index: usize) -> usize {
    slot * CHUNK_SIZE + PARTY_OFFSET + index * RECORD_SIZE
}
