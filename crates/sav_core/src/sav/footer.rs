use std::fmt;
use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::core_api::CoreError;
use crate::reader::LittleEndianReader;

pub const FOOTER_SIZE: usize = 0x14;
pub const MAGIC_JP_INTL: u32 = 0x2006_0623;
pub const MAGIC_KR: u32 = 0x2007_0903;

/// Trailer at the end of every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    pub identifier: u32,
    pub save_number: u32,
    pub block_size: u32,
    pub magic: u32,
    pub reserved: u16,
    pub checksum: u16,
}

impl Footer {
    pub fn parse(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() < FOOTER_SIZE {
            return Err(CoreError::malformed(format!(
                "footer too short: len={}, need {FOOTER_SIZE}",
                bytes.len()
            )));
        }
        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        Ok(Self {
            identifier: r.read_u32()?,
            save_number: r.read_u32()?,
            block_size: r.read_u32()?,
            magic: r.read_u32()?,
            reserved: r.read_u16()?,
            checksum: r.read_u16()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; FOOTER_SIZE] {
        let mut out = [0u8; FOOTER_SIZE];
        out[0x00..0x04].copy_from_slice(&self.identifier.to_le_bytes());
        out[0x04..0x08].copy_from_slice(&self.save_number.to_le_bytes());
        out[0x08..0x0C].copy_from_slice(&self.block_size.to_le_bytes());
        out[0x0C..0x10].copy_from_slice(&self.magic.to_le_bytes());
        out[0x10..0x12].copy_from_slice(&self.reserved.to_le_bytes());
        out[0x12..0x14].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }

    pub fn has_known_magic(&self) -> bool {
        matches!(self.magic, MAGIC_JP_INTL | MAGIC_KR)
    }
}

impl fmt::Display for Footer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={:#010x} save#={} size={:#x} magic={:#010x} checksum={:#06x}",
            self.identifier, self.save_number, self.block_size, self.magic, self.checksum
        )
    }
}
