use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::core_api::CoreError;
use crate::record::fields::{FieldKind, IvWord, MAX_EV, MAX_LEVEL, Stats};

/// New value for one record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    HeldItem(u16),
    Ability(u8),
    Evs(Stats),
    Ivs(Stats),
    Nickname(String),
    Level(u8),
    BattleStats(Stats),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::HeldItem(_) => FieldKind::HeldItem,
            Self::Ability(_) => FieldKind::Ability,
            Self::Evs(_) => FieldKind::Evs,
            Self::Ivs(_) => FieldKind::Ivs,
            Self::Nickname(_) => FieldKind::Nickname,
            Self::Level(_) => FieldKind::Level,
            Self::BattleStats(_) => FieldKind::BattleStats,
        }
    }

    /// On-disk bytes for the value. Range checks happen here, before any
    /// record is touched.
    pub fn to_bytes(&self, charset: &Charset) -> Result<Vec<u8>, CoreError> {
        match self {
            Self::HeldItem(id) => Ok(id.to_le_bytes().to_vec()),
            Self::Ability(id) => Ok(vec![*id]),
            Self::Evs(evs) => evs
                .storage_order()
                .into_iter()
                .map(|ev| {
                    u8::try_from(ev).map_err(|_| {
                        CoreError::field_encoding(format!("effort value {ev} exceeds {MAX_EV}"))
                    })
                })
                .collect(),
            Self::Ivs(ivs) => {
                let word = IvWord {
                    ivs: *ivs,
                    ..IvWord::default()
                };
                Ok(word.encode()?.to_vec())
            }
            Self::Nickname(name) => Ok(charset.encode_nickname(name)?.to_vec()),
            Self::Level(level) => {
                if !(1..=MAX_LEVEL).contains(level) {
                    return Err(CoreError::field_encoding(format!(
                        "level {level} outside 1..={MAX_LEVEL}"
                    )));
                }
                Ok(vec![*level])
            }
            Self::BattleStats(stats) => Ok(stats
                .storage_order()
                .into_iter()
                .flat_map(u16::to_le_bytes)
                .collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    pub party_index: usize,
    pub value: FieldValue,
}

impl WriteRequest {
    pub fn new(party_index: usize, value: FieldValue) -> Self {
        Self { party_index, value }
    }

    pub fn held_item(party_index: usize, item: u16) -> Self {
        Self::new(party_index, FieldValue::HeldItem(item))
    }

    pub fn ability(party_index: usize, ability: u8) -> Self {
        Self::new(party_index, FieldValue::Ability(ability))
    }

    pub fn evs(party_index: usize, evs: Stats) -> Self {
        Self::new(party_index, FieldValue::Evs(evs))
    }

    pub fn ivs(party_index: usize, ivs: Stats) -> Self {
        Self::new(party_index, FieldValue::Ivs(ivs))
    }

    pub fn nickname(party_index: usize, name: impl Into<String>) -> Self {
        Self::new(party_index, FieldValue::Nickname(name.into()))
    }

    pub fn level(party_index: usize, level: u8) -> Self {
        Self::new(party_index, FieldValue::Level(level))
    }

    pub fn battle_stats(party_index: usize, stats: Stats) -> Self {
        Self::new(party_index, FieldValue::BattleStats(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_api::CoreErrorCode;

    #[test]
    fn evs_serialize_in_storage_order() {
        let bytes = FieldValue::Evs(Stats::new(0, 0, 0, 252, 252, 6))
            .to_bytes(&Charset::builtin())
            .unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 6, 252, 252]);
    }

    #[test]
    fn ev_above_255_is_rejected() {
        let err = FieldValue::Evs(Stats::new(256, 0, 0, 0, 0, 0))
            .to_bytes(&Charset::builtin())
            .expect_err("256 does not fit a byte");
        assert_eq!(err.code, CoreErrorCode::FieldEncoding);
    }

    #[test]
    fn battle_stats_are_little_endian_words() {
        let bytes = FieldValue::BattleStats(Stats::new(65535, 0, 124, 333, 255, 7000))
            .to_bytes(&Charset::builtin())
            .unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..2], &[0xFF, 0xFF]);
        assert_eq!(&bytes[6..8], &7000u16.to_le_bytes());
        assert_eq!(&bytes[10..12], &255u16.to_le_bytes());
    }

    #[test]
    fn scalar_widths() {
        let charset = Charset::builtin();
        assert_eq!(FieldValue::HeldItem(0x0144).to_bytes(&charset).unwrap(), vec![0x44, 0x01]);
        assert_eq!(FieldValue::Ability(26).to_bytes(&charset).unwrap(), vec![26]);
        assert_eq!(FieldValue::Level(58).to_bytes(&charset).unwrap(), vec![58]);
    }

    #[test]
    fn level_zero_and_101_are_rejected() {
        let charset = Charset::builtin();
        assert!(FieldValue::Level(0).to_bytes(&charset).is_err());
        assert!(FieldValue::Level(101).to_bytes(&charset).is_err());
        assert!(FieldValue::Level(100).to_bytes(&charset).is_ok());
    }

    #[test]
    fn nickname_serializes_to_full_field() {
        let bytes = FieldValue::Nickname("trainer".into())
            .to_bytes(&Charset::builtin())
            .unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(&bytes[14..16], &[0xFF, 0xFF]);
    }
}
