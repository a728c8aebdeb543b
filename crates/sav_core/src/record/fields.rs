//! Field addresses inside a decrypted party record.

use serde::{Deserialize, Serialize};

use crate::core_api::CoreError;
use crate::record::cipher::BATTLE_STATS_OFFSET;
use crate::record::shuffle::{BlockId, locate};

// Block A
pub const SPECIES_OFFSET: usize = 0x00;
pub const HELD_ITEM_OFFSET: usize = 0x02;
pub const OT_ID_OFFSET: usize = 0x04;
pub const OT_SECRET_ID_OFFSET: usize = 0x06;
pub const EXPERIENCE_OFFSET: usize = 0x08;
pub const FRIENDSHIP_OFFSET: usize = 0x0C;
pub const ABILITY_OFFSET: usize = 0x0D;
pub const EV_OFFSET: usize = 0x10;

// Block B
pub const MOVES_OFFSET: usize = 0x00;
pub const MOVE_COUNT: usize = 4;
pub const IV_OFFSET: usize = 0x10;

// Block C
pub const NICKNAME_OFFSET: usize = 0x00;
pub const NICKNAME_LEN: usize = 22;
/// Visible characters; the 0xFFFF terminator takes the eleventh code unit.
pub const NICKNAME_MAX_CHARS: usize = 10;
pub const NICKNAME_TERMINATOR: u16 = 0xFFFF;

// Battle stats, relative to the battle-stat region
pub const LEVEL_OFFSET: usize = 0x04;
pub const CURRENT_HP_OFFSET: usize = 0x06;
pub const STATS_OFFSET: usize = 0x08;

pub const MAX_EV: u16 = 255;
pub const MAX_IV: u16 = 31;
pub const MAX_LEVEL: u8 = 100;

const IV_BITS: u32 = 5;
const IV_MASK: u32 = 0x1F;
const EGG_BIT: u32 = 1 << 30;
const NICKNAMED_BIT: u32 = 1 << 31;

/// Six per-stat values. Field order follows the usual display order; the
/// record stores them with speed ahead of the special stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

impl Stats {
    pub fn new(hp: u16, attack: u16, defense: u16, sp_attack: u16, sp_defense: u16, speed: u16) -> Self {
        Self {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }

    /// hp, atk, def, spe, spa, spd
    pub fn storage_order(&self) -> [u16; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.speed,
            self.sp_attack,
            self.sp_defense,
        ]
    }

    pub fn from_storage_order(values: [u16; 6]) -> Self {
        let [hp, attack, defense, speed, sp_attack, sp_defense] = values;
        Self {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }

    /// hp, atk, def, spa, spd, spe
    pub fn display_order(&self) -> [u16; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
    }

    pub fn total(&self) -> u32 {
        self.display_order().iter().map(|&v| u32::from(v)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    HeldItem,
    Ability,
    Evs,
    Ivs,
    Nickname,
    Level,
    BattleStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Shuffled(BlockId),
    BattleStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLocation {
    pub region: Region,
    pub offset: usize,
    /// Bytes available at `offset`.
    pub capacity: usize,
}

impl FieldLocation {
    /// Offset of the field from the start of a record with this personality.
    pub fn resolve(&self, personality: u32) -> usize {
        match self.region {
            Region::Shuffled(block) => locate(block, personality) + self.offset,
            Region::BattleStats => BATTLE_STATS_OFFSET + self.offset,
        }
    }
}

impl FieldKind {
    pub fn location(self) -> FieldLocation {
        let (region, offset, capacity) = match self {
            Self::HeldItem => (Region::Shuffled(BlockId::A), HELD_ITEM_OFFSET, 2),
            Self::Ability => (Region::Shuffled(BlockId::A), ABILITY_OFFSET, 1),
            Self::Evs => (Region::Shuffled(BlockId::A), EV_OFFSET, 6),
            Self::Ivs => (Region::Shuffled(BlockId::B), IV_OFFSET, 4),
            Self::Nickname => (Region::Shuffled(BlockId::C), NICKNAME_OFFSET, NICKNAME_LEN),
            Self::Level => (Region::BattleStats, LEVEL_OFFSET, 1),
            Self::BattleStats => (Region::BattleStats, STATS_OFFSET, 12),
        };
        FieldLocation {
            region,
            offset,
            capacity,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::HeldItem => "held_item",
            Self::Ability => "ability",
            Self::Evs => "evs",
            Self::Ivs => "ivs",
            Self::Nickname => "nickname",
            Self::Level => "level",
            Self::BattleStats => "battle_stats",
        }
    }
}

/// Packed individual values with the two flag bits that share their word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvWord {
    pub ivs: Stats,
    pub is_egg: bool,
    pub is_nicknamed: bool,
}

impl IvWord {
    pub fn encode(&self) -> Result<[u8; 4], CoreError> {
        let mut word = 0u32;
        for (i, value) in self.ivs.storage_order().into_iter().enumerate() {
            if value > MAX_IV {
                return Err(CoreError::field_encoding(format!(
                    "individual value {value} exceeds {MAX_IV}"
                )));
            }
            word |= u32::from(value) << (i as u32 * IV_BITS);
        }
        if self.is_egg {
            word |= EGG_BIT;
        }
        if self.is_nicknamed {
            word |= NICKNAMED_BIT;
        }
        Ok(word.to_le_bytes().map(u8::reverse_bits))
    }

    pub fn decode(stored: [u8; 4]) -> Self {
        let word = u32::from_le_bytes(stored.map(u8::reverse_bits));
        let mut values = [0u16; 6];
        for (i, value) in values.iter_mut().enumerate() {
            *value = ((word >> (i as u32 * IV_BITS)) & IV_MASK) as u16;
        }
        Self {
            ivs: Stats::from_storage_order(values),
            is_egg: word & EGG_BIT != 0,
            is_nicknamed: word & NICKNAMED_BIT != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_order_puts_speed_fourth() {
        let stats = Stats::new(1, 2, 3, 4, 5, 6);
        assert_eq!(stats.storage_order(), [1, 2, 3, 6, 4, 5]);
        assert_eq!(Stats::from_storage_order(stats.storage_order()), stats);
    }

    #[test]
    fn iv_word_round_trips_with_flags() {
        let word = IvWord {
            ivs: Stats::new(0, 31, 14, 5, 21, 30),
            is_egg: false,
            is_nicknamed: true,
        };
        let stored = word.encode().unwrap();
        assert_eq!(IvWord::decode(stored), word);
    }

    #[test]
    fn iv_bytes_are_bit_reversed() {
        let word = IvWord {
            ivs: Stats::new(1, 0, 0, 0, 0, 0),
            ..IvWord::default()
        };
        assert_eq!(word.encode().unwrap(), [0x80, 0, 0, 0]);
    }

    #[test]
    fn iv_above_31_is_rejected() {
        let word = IvWord {
            ivs: Stats::new(32, 0, 0, 0, 0, 0),
            ..IvWord::default()
        };
        let err = word.encode().expect_err("32 does not fit five bits");
        assert_eq!(err.code, crate::core_api::CoreErrorCode::FieldEncoding);
    }

    #[test]
    fn battle_stat_fields_ignore_personality() {
        let level = FieldKind::Level.location();
        assert_eq!(level.resolve(0), 0x8C);
        assert_eq!(level.resolve(0xFFFF_FFFF), 0x8C);
        assert_eq!(FieldKind::BattleStats.location().resolve(7), 0x90);
    }

    #[test]
    fn shuffled_fields_follow_their_block() {
        // row 0 is ABCD
        assert_eq!(FieldKind::HeldItem.location().resolve(0), 0x0A);
        assert_eq!(FieldKind::Ivs.location().resolve(0), 0x38);
        assert_eq!(FieldKind::Nickname.location().resolve(0), 0x48);
        // row 23 is DCBA
        assert_eq!(FieldKind::Evs.location().resolve(23 << 13), 0x78);
    }
}
