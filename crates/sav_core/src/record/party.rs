use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::core_api::CoreError;
use crate::lookup::{nature_index, nature_name};
use crate::reader::LittleEndianReader;
use crate::record::cipher::{
    BATTLE_STATS_OFFSET, CHECKSUM_OFFSET, DecryptedRecord, PERSONALITY_OFFSET, RECORD_SIZE,
};
use crate::record::fields::{
    ABILITY_OFFSET, CURRENT_HP_OFFSET, EV_OFFSET, EXPERIENCE_OFFSET, FRIENDSHIP_OFFSET,
    HELD_ITEM_OFFSET, IV_OFFSET, IvWord, LEVEL_OFFSET, MOVE_COUNT, MOVES_OFFSET, NICKNAME_LEN,
    NICKNAME_OFFSET, OT_ID_OFFSET, OT_SECRET_ID_OFFSET, SPECIES_OFFSET, STATS_OFFSET, Stats,
};
use crate::record::shuffle::{BlockId, block_slice};

/// Decoded view of one plaintext party record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMember {
    pub personality: u32,
    pub checksum: u16,
    pub species: u16,
    pub held_item: u16,
    pub ot_id: u16,
    pub ot_secret_id: u16,
    pub experience: u32,
    pub friendship: u8,
    pub ability: u8,
    pub evs: Stats,
    pub moves: [u16; MOVE_COUNT],
    pub ivs: Stats,
    pub is_egg: bool,
    pub is_nicknamed: bool,
    pub nickname_units: [u16; NICKNAME_LEN / 2],
    pub level: u8,
    pub current_hp: u16,
    pub stats: Stats,
}

impl PartyMember {
    pub fn from_record(record: &DecryptedRecord) -> Result<Self, CoreError> {
        Self::decode(record.bytes())
    }

    pub fn decode(plaintext: &[u8]) -> Result<Self, CoreError> {
        if plaintext.len() < RECORD_SIZE {
            return Err(CoreError::malformed(format!(
                "party record too short: len={}, need {RECORD_SIZE}",
                plaintext.len()
            )));
        }
        let mut header = LittleEndianReader::new(Cursor::new(plaintext));
        header.seek_to(PERSONALITY_OFFSET as u64)?;
        let personality = header.read_u32()?;
        header.seek_to(CHECKSUM_OFFSET as u64)?;
        let checksum = header.read_u16()?;

        let mut a = LittleEndianReader::new(Cursor::new(block_slice(
            plaintext,
            BlockId::A,
            personality,
        )?));
        a.seek_to(SPECIES_OFFSET as u64)?;
        let species = a.read_u16()?;
        a.seek_to(HELD_ITEM_OFFSET as u64)?;
        let held_item = a.read_u16()?;
        a.seek_to(OT_ID_OFFSET as u64)?;
        let ot_id = a.read_u16()?;
        a.seek_to(OT_SECRET_ID_OFFSET as u64)?;
        let ot_secret_id = a.read_u16()?;
        a.seek_to(EXPERIENCE_OFFSET as u64)?;
        let experience = a.read_u32()?;
        a.seek_to(FRIENDSHIP_OFFSET as u64)?;
        let friendship = a.read_u8()?;
        a.seek_to(ABILITY_OFFSET as u64)?;
        let ability = a.read_u8()?;
        a.seek_to(EV_OFFSET as u64)?;
        let ev_bytes = a.read_bytes::<6>()?;
        let evs = Stats::from_storage_order(ev_bytes.map(u16::from));

        let mut b = LittleEndianReader::new(Cursor::new(block_slice(
            plaintext,
            BlockId::B,
            personality,
        )?));
        b.seek_to(MOVES_OFFSET as u64)?;
        let moves = b.read_u16_array::<MOVE_COUNT>()?;
        b.seek_to(IV_OFFSET as u64)?;
        let iv_word = IvWord::decode(b.read_bytes::<4>()?);

        let mut c = LittleEndianReader::new(Cursor::new(block_slice(
            plaintext,
            BlockId::C,
            personality,
        )?));
        c.seek_to(NICKNAME_OFFSET as u64)?;
        let nickname_units = c.read_u16_array::<{ NICKNAME_LEN / 2 }>()?;

        let mut battle = LittleEndianReader::new(Cursor::new(&plaintext[BATTLE_STATS_OFFSET..]));
        battle.seek_to(LEVEL_OFFSET as u64)?;
        let level = battle.read_u8()?;
        battle.seek_to(CURRENT_HP_OFFSET as u64)?;
        let current_hp = battle.read_u16()?;
        battle.seek_to(STATS_OFFSET as u64)?;
        let stats = Stats::from_storage_order(battle.read_u16_array::<6>()?);

        Ok(Self {
            personality,
            checksum,
            species,
            held_item,
            ot_id,
            ot_secret_id,
            experience,
            friendship,
            ability,
            evs,
            moves,
            ivs: iv_word.ivs,
            is_egg: iv_word.is_egg,
            is_nicknamed: iv_word.is_nicknamed,
            nickname_units,
            level,
            current_hp,
            stats,
        })
    }

    pub fn nature_index(&self) -> usize {
        nature_index(self.personality)
    }

    pub fn nature(&self) -> &'static str {
        // personality % 25 is always a valid index
        nature_name(self.nature_index()).unwrap_or("Hardy")
    }

    pub fn nickname(&self, charset: &Charset) -> String {
        charset.decode(&self.nickname_units)
    }
}
