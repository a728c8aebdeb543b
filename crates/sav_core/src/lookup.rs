use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;

use crate::charset::{Charset, parse_id, parse_table_lines};
use crate::core_api::{CoreError, CoreErrorCode};

pub const ITEMS_FILE: &str = "items.txt";
pub const ABILITIES_FILE: &str = "abilities.txt";
pub const CHARSET_FILE: &str = "charset.txt";

pub const NATURE_NAMES: [&str; 25] = [
    "Hardy", "Lonely", "Brave", "Adamant", "Naughty", "Bold", "Docile", "Relaxed", "Impish", "Lax",
    "Timid", "Hasty", "Serious", "Jolly", "Naive", "Modest", "Mild", "Quiet", "Bashful", "Rash",
    "Calm", "Gentle", "Sassy", "Careful", "Quirky",
];

/// Stats a nature can raise or lower, in nature-table order.
const NATURE_STATS: [&str; 5] = ["attack", "defense", "speed", "sp_attack", "sp_defense"];

pub fn nature_index(personality: u32) -> usize {
    (personality % 25) as usize
}

pub fn nature_name(index: usize) -> Option<&'static str> {
    NATURE_NAMES.get(index).copied()
}

/// `(raised, lowered)` stat names, or `None` for the five neutral natures.
pub fn nature_effect(index: usize) -> Option<(&'static str, &'static str)> {
    if index >= NATURE_NAMES.len() {
        return None;
    }
    let (up, down) = (index / 5, index % 5);
    (up != down).then(|| (NATURE_STATS[up], NATURE_STATS[down]))
}

/// Id → display name table read from `id|name` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: BTreeMap<u16, String>,
}

impl NameTable {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let mut names = BTreeMap::new();
        for (_, (id, name)) in parse_table_lines(text)? {
            names.insert(id, name.trim().to_string());
        }
        Ok(Self { names })
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        let table = Self::parse(&text)?;
        debug!("loaded {} names from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: u16) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Case-insensitive name search.
    pub fn id_of(&self, name: &str) -> Option<u16> {
        let wanted = name.trim();
        self.names
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(wanted))
            .map(|(&id, _)| id)
    }

    /// Accepts either a known name or a numeric id (`0x` hex allowed).
    pub fn resolve(&self, name_or_id: &str, what: &str) -> Result<u16, CoreError> {
        if let Some(id) = self.id_of(name_or_id) {
            return Ok(id);
        }
        parse_id(name_or_id.trim()).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("unknown {what} {name_or_id:?}"),
            )
        })
    }
}

/// Caller-owned name resolution context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    pub charset: Charset,
    pub items: NameTable,
    pub abilities: NameTable,
}

impl Lookup {
    pub fn new(charset: Charset, items: NameTable, abilities: NameTable) -> Self {
        Self {
            charset,
            items,
            abilities,
        }
    }

    /// Loads whichever of `items.txt`, `abilities.txt` and `charset.txt`
    /// exist under `dir`. A charset file extends the built-in table.
    pub fn load_dir(dir: &Path) -> Result<Self, CoreError> {
        if !dir.is_dir() {
            return Err(CoreError::new(
                CoreErrorCode::Io,
                format!("data directory {} does not exist", dir.display()),
            ));
        }
        let mut lookup = Self::default();

        let items = dir.join(ITEMS_FILE);
        if items.is_file() {
            lookup.items = NameTable::load(&items)?;
        }
        let abilities = dir.join(ABILITIES_FILE);
        if abilities.is_file() {
            lookup.abilities = NameTable::load(&abilities)?;
        }
        let charset = dir.join(CHARSET_FILE);
        if charset.is_file() {
            let text = fs::read_to_string(&charset).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!("failed to read {}: {e}", charset.display()),
                )
            })?;
            lookup.charset.extend_from_str(&text)?;
        }
        Ok(lookup)
    }

    pub fn item_name(&self, id: u16) -> Option<&str> {
        self.items.name(id)
    }

    pub fn ability_name(&self, id: u16) -> Option<&str> {
        self.abilities.name(id)
    }
}
