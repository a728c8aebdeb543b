//! In-game character set.
//!
//! Text in a record is a sequence of 16-bit code units. [`Charset`] maps them
//! to and from `char`. The built-in table covers the Latin letters, digits,
//! punctuation and space used by the western releases; a fuller table can be
//! loaded from `code|char` lines.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::record::fields::{NICKNAME_LEN, NICKNAME_MAX_CHARS, NICKNAME_TERMINATOR};

const DIGITS_START: u16 = 0x0121;
const UPPER_START: u16 = 0x012B;
const LOWER_START: u16 = 0x0145;
const PUNCTUATION_START: u16 = 0x01AB;
const SPACE: u16 = 0x01DE;

const PUNCTUATION: [char; 27] = [
    '!', '?', ',', '.', '…', '･', '/', '‘', '’', '“', '”', '„', '«', '»', '(', ')', '♂', '♀', '+',
    '-', '*', '#', '=', '&', '~', ':', ';',
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    by_code: BTreeMap<u16, char>,
    by_char: BTreeMap<char, u16>,
}

impl Default for Charset {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Charset {
    pub fn empty() -> Self {
        Self {
            by_code: BTreeMap::new(),
            by_char: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut charset = Self::empty();
        for (i, c) in ('0'..='9').enumerate() {
            charset.insert(DIGITS_START + i as u16, c);
        }
        for (i, c) in ('A'..='Z').enumerate() {
            charset.insert(UPPER_START + i as u16, c);
        }
        for (i, c) in ('a'..='z').enumerate() {
            charset.insert(LOWER_START + i as u16, c);
        }
        for (i, &c) in PUNCTUATION.iter().enumerate() {
            charset.insert(PUNCTUATION_START + i as u16, c);
        }
        charset.insert(SPACE, ' ');
        charset
    }

    /// Parses `code|char` lines. Codes may be decimal or `0x` hex; blank lines
    /// and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let mut charset = Self::empty();
        charset.extend_from_str(text)?;
        Ok(charset)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        Self::parse(&text)
    }

    /// Adds or overrides entries from `code|char` text.
    pub fn extend_from_str(&mut self, text: &str) -> Result<(), CoreError> {
        for (line_no, (code, value)) in parse_table_lines(text)? {
            let mut chars = value.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(CoreError::new(
                    CoreErrorCode::Parse,
                    format!("line {line_no}: expected a single character, got {value:?}"),
                ));
            };
            self.insert(code, c);
        }
        Ok(())
    }

    pub fn insert(&mut self, code: u16, c: char) {
        if let Some(old) = self.by_code.insert(code, c) {
            self.by_char.remove(&old);
        }
        self.by_char.insert(c, code);
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn decode_char(&self, code: u16) -> Option<char> {
        self.by_code.get(&code).copied()
    }

    pub fn encode_char(&self, c: char) -> Result<u16, CoreError> {
        let lookup = match c {
            '\'' => '’',
            '"' => '”',
            other => other,
        };
        self.by_char.get(&lookup).copied().ok_or_else(|| {
            CoreError::field_encoding(format!("character {c:?} has no in-game encoding"))
        })
    }

    /// Decodes code units up to the first terminator. Unknown units end the
    /// text as well.
    pub fn decode(&self, units: &[u16]) -> String {
        units
            .iter()
            .take_while(|&&u| u != NICKNAME_TERMINATOR)
            .map_while(|&u| self.decode_char(u))
            .collect()
    }

    /// Encodes a nickname into its fixed 22-byte field: code units, one
    /// 0xFFFF terminator, zero padding.
    pub fn encode_nickname(&self, name: &str) -> Result<[u8; NICKNAME_LEN], CoreError> {
        let count = name.chars().count();
        if count > NICKNAME_MAX_CHARS {
            return Err(CoreError::field_encoding(format!(
                "nickname {name:?} has {count} characters, at most {NICKNAME_MAX_CHARS} fit"
            )));
        }
        let mut field = [0u8; NICKNAME_LEN];
        let units = name
            .chars()
            .map(|c| self.encode_char(c))
            .chain(std::iter::once(Ok(NICKNAME_TERMINATOR)));
        for (slot, unit) in field.chunks_exact_mut(2).zip(units) {
            slot.copy_from_slice(&unit?.to_le_bytes());
        }
        Ok(field)
    }

    pub fn decode_nickname(&self, field: &[u8]) -> String {
        let units: Vec<u16> = field
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        self.decode(&units)
    }
}

/// Splits `id|value` lines, returning `(line number, (id, value))`.
pub(crate) fn parse_table_lines(text: &str) -> Result<Vec<(usize, (u16, &str))>, CoreError> {
    let mut out = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((id, value)) = line.split_once('|') else {
            return Err(CoreError::new(
                CoreErrorCode::Parse,
                format!("line {line_no}: expected `id|value`, got {line:?}"),
            ));
        };
        let id = parse_id(id.trim()).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("line {line_no}: invalid id {:?}", id.trim()),
            )
        })?;
        out.push((line_no, (id, value)));
    }
    Ok(out)
}

pub(crate) fn parse_id(text: &str) -> Option<u16> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
