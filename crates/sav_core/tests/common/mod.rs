#![allow(dead_code)]

use sav_core::crypto::crc16_ccitt;
use sav_core::record::RECORD_SIZE;
use sav_core::record::shuffle::{BlockId, locate};
use sav_core::sav::{CHUNK_SIZE, GameVersion, MAGIC_JP_INTL, SAVE_SIZE};
use sav_core::{Charset, Stats, encrypt_record};

pub const BATTLE: usize = 0x88;

/// Plaintext contents of one synthetic party member.
#[derive(Debug, Clone)]
pub struct Mon {
    pub personality: u32,
    pub species: u16,
    pub held_item: u16,
    pub ability: u8,
    pub evs: Stats,
    pub ivs: Stats,
    pub nickname: String,
    pub level: u8,
    pub stats: Stats,
}

impl Mon {
    pub fn new(personality: u32, species: u16) -> Self {
        Self {
            personality,
            species,
            held_item: 0,
            ability: 1,
            evs: Stats::default(),
            ivs: Stats::default(),
            nickname: "MON".to_string(),
            level: 5,
            stats: Stats::new(20, 10, 10, 10, 10, 10),
        }
    }

    /// Species 461 at level 58.
    pub fn known_vector() -> Self {
        Self {
            personality: 0x7C21_3A96,
            species: 461,
            held_item: 0x00EA,
            ability: 46,
            evs: Stats::new(0, 255, 0, 0, 3, 252),
            ivs: Stats::new(25, 1, 23, 25, 5, 17),
            nickname: "WEAVILE".to_string(),
            level: 58,
            stats: Stats::new(163, 181, 93, 63, 106, 215),
        }
    }

    pub fn plaintext(&self) -> [u8; RECORD_SIZE] {
        let mut rec = [0u8; RECORD_SIZE];
        rec[0..4].copy_from_slice(&self.personality.to_le_bytes());

        let a = locate(BlockId::A, self.personality);
        rec[a..a + 2].copy_from_slice(&self.species.to_le_bytes());
        rec[a + 2..a + 4].copy_from_slice(&self.held_item.to_le_bytes());
        rec[a + 0x0D] = self.ability;
        let ev_order = [
            self.evs.hp,
            self.evs.attack,
            self.evs.defense,
            self.evs.speed,
            self.evs.sp_attack,
            self.evs.sp_defense,
        ];
        for (i, ev) in ev_order.into_iter().enumerate() {
            rec[a + 0x10 + i] = ev as u8;
        }

        let b = locate(BlockId::B, self.personality);
        let iv_order = [
            self.ivs.hp,
            self.ivs.attack,
            self.ivs.defense,
            self.ivs.speed,
            self.ivs.sp_attack,
            self.ivs.sp_defense,
        ];
        let mut word = 0u32;
        for (i, iv) in iv_order.into_iter().enumerate() {
            word |= u32::from(iv) << (i * 5);
        }
        let stored = word.to_le_bytes().map(u8::reverse_bits);
        rec[b + 0x10..b + 0x14].copy_from_slice(&stored);

        let c = locate(BlockId::C, self.personality);
        let name = Charset::builtin()
            .encode_nickname(&self.nickname)
            .expect("test nickname should encode");
        rec[c..c + 22].copy_from_slice(&name);

        rec[BATTLE + 4] = self.level;
        rec[BATTLE + 6..BATTLE + 8].copy_from_slice(&self.stats.hp.to_le_bytes());
        let stat_order = [
            self.stats.hp,
            self.stats.attack,
            self.stats.defense,
            self.stats.speed,
            self.stats.sp_attack,
            self.stats.sp_defense,
        ];
        for (i, stat) in stat_order.into_iter().enumerate() {
            let at = BATTLE + 8 + i * 2;
            rec[at..at + 2].copy_from_slice(&stat.to_le_bytes());
        }
        rec
    }

    pub fn encrypted(&self) -> [u8; RECORD_SIZE] {
        encrypt_record(&self.plaintext()).expect("encrypt should succeed")
    }
}

pub struct Geometry {
    pub small_size: usize,
    pub big_start: usize,
    pub big_size: usize,
    pub crc_trim: usize,
    pub party_offset: usize,
}

pub fn geometry(version: GameVersion) -> Geometry {
    match version {
        GameVersion::Platinum => Geometry {
            small_size: 0xCF2C,
            big_start: 0xCF2C,
            big_size: 0x121E4,
            crc_trim: 0x14,
            party_offset: 0xA0,
        },
        GameVersion::HeartGoldSoulSilver => Geometry {
            small_size: 0xF628,
            big_start: 0xF700,
            big_size: 0x12310,
            crc_trim: 0x10,
            party_offset: 0x98,
        },
    }
}

/// Builds a full 512 KiB save with valid footers in both chunks.
#[derive(Debug, Clone)]
pub struct SaveBuilder {
    pub version: GameVersion,
    pub save_numbers: [u32; 2],
    pub small_ids: [u32; 2],
    pub big_ids: [u32; 2],
    pub party: [Vec<Mon>; 2],
    pub magic: u32,
}

impl SaveBuilder {
    pub fn new(version: GameVersion, party: Vec<Mon>) -> Self {
        Self {
            version,
            save_numbers: [5, 4],
            small_ids: [0x1111, 0x2222],
            big_ids: [0x1111, 0x2222],
            party: [party.clone(), party],
            magic: MAGIC_JP_INTL,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let g = geometry(self.version);
        let mut bytes = vec![0u8; SAVE_SIZE];
        for slot in 0..2 {
            let base = slot * CHUNK_SIZE;
            // filler so the CRC covers something other than zeros
            for (i, b) in bytes[base..base + 0x80].iter_mut().enumerate() {
                *b = (i as u8) ^ (slot as u8 * 0x5A);
            }
            let party = &self.party[slot];
            let count_at = base + g.party_offset - 4;
            bytes[count_at..count_at + 4].copy_from_slice(&(party.len() as u32).to_le_bytes());
            for (i, mon) in party.iter().enumerate() {
                let at = base + g.party_offset + i * RECORD_SIZE;
                bytes[at..at + RECORD_SIZE].copy_from_slice(&mon.encrypted());
            }

            let small = base;
            let big = base + g.big_start;
            bytes[big..big + 0x40].fill(0xA5 ^ slot as u8);
            write_footer(&mut bytes, small, g.small_size, self.small_ids[slot], self.save_numbers[slot], self.magic);
            write_footer(&mut bytes, big, g.big_size, self.big_ids[slot], self.save_numbers[slot], self.magic);
        }
        refresh_checksums(&mut bytes, self.version);
        bytes
    }
}

fn write_footer(bytes: &mut [u8], start: usize, size: usize, id: u32, save_number: u32, magic: u32) {
    let f = start + size - 0x14;
    bytes[f..f + 4].copy_from_slice(&id.to_le_bytes());
    bytes[f + 4..f + 8].copy_from_slice(&save_number.to_le_bytes());
    bytes[f + 8..f + 12].copy_from_slice(&(size as u32).to_le_bytes());
    bytes[f + 12..f + 16].copy_from_slice(&magic.to_le_bytes());
}

/// Recomputes every block CRC in place.
pub fn refresh_checksums(bytes: &mut [u8], version: GameVersion) {
    let g = geometry(version);
    for slot in 0..2 {
        let base = slot * CHUNK_SIZE;
        for (start, size) in [(base, g.small_size), (base + g.big_start, g.big_size)] {
            let crc = crc16_ccitt(&bytes[start..start + size - g.crc_trim]);
            let at = start + size - 2;
            bytes[at..at + 2].copy_from_slice(&crc.to_le_bytes());
        }
    }
}

pub fn party_record_offset(version: GameVersion, slot: usize, index: usize) -> usize {
    slot * CHUNK_SIZE + geometry(version).party_offset + index * RECORD_SIZE
}

pub fn sample_party() -> Vec<Mon> {
    let mut second = Mon::new(0x0001_4000, 25);
    second.nickname = "PIKA".to_string();
    vec![Mon::known_vector(), second, Mon::new(0xFFFF_FFFF, 1)]
}
