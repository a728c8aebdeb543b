//! Save file layout: two redundant chunks, each a small and a big block
//! closed by a [`Footer`].

pub mod footer;

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::crypto::crc16_ccitt;
use crate::layout::ByteRange;
use crate::reader::u32_at;
use crate::record::RECORD_SIZE;

pub use footer::{FOOTER_SIZE, Footer, MAGIC_JP_INTL, MAGIC_KR};

pub const SAVE_SIZE: usize = 0x80000;
pub const CHUNK_SIZE: usize = 0x40000;
pub const MAX_PARTY_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameVersion {
    Platinum,
    HeartGoldSoulSilver,
}

impl GameVersion {
    pub const ALL: [GameVersion; 2] = [GameVersion::Platinum, GameVersion::HeartGoldSoulSilver];

    pub fn layout(self) -> &'static VersionLayout {
        match self {
            Self::Platinum => &PLATINUM_LAYOUT,
            Self::HeartGoldSoulSilver => &HGSS_LAYOUT,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Platinum => "plat",
            Self::HeartGoldSoulSilver => "hgss",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Platinum => "Platinum",
            Self::HeartGoldSoulSilver => "HeartGold/SoulSilver",
        }
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for GameVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plat" | "platinum" | "pt" => Ok(Self::Platinum),
            "hgss" | "heartgold" | "soulsilver" | "hg" | "ss" => Ok(Self::HeartGoldSoulSilver),
            other => Err(CoreError::new(
                CoreErrorCode::Parse,
                format!("unknown game {other:?}, expected plat or hgss"),
            )),
        }
    }
}

/// Fixed per-version block geometry, relative to a chunk's base offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionLayout {
    pub small_block_size: usize,
    pub big_block_start: usize,
    pub big_block_size: usize,
    /// Bytes at the end of a block left out of its CRC.
    pub checksum_exclusion: usize,
    /// Party section, relative to the small block.
    pub party_offset: usize,
}

pub static PLATINUM_LAYOUT: VersionLayout = VersionLayout {
    small_block_size: 0xCF2C,
    big_block_start: 0xCF2C,
    big_block_size: 0x121E4,
    checksum_exclusion: FOOTER_SIZE,
    party_offset: 0xA0,
};

/// HGSS pads 0xD8 bytes between the blocks and checksums the footer's
/// identifier along with the data.
pub static HGSS_LAYOUT: VersionLayout = VersionLayout {
    small_block_size: 0xF628,
    big_block_start: 0xF628 + 0xD8,
    big_block_size: 0x12310,
    checksum_exclusion: 0x10,
    party_offset: 0x98,
};

impl VersionLayout {
    pub fn small_block_range(&self, slot: ChunkSlot) -> ByteRange {
        ByteRange::new(slot.offset(), self.small_block_size)
    }

    pub fn big_block_range(&self, slot: ChunkSlot) -> ByteRange {
        ByteRange::new(slot.offset() + self.big_block_start, self.big_block_size)
    }

    pub fn checksum_range(&self, block: ByteRange) -> ByteRange {
        ByteRange {
            start: block.start,
            end: block.end - self.checksum_exclusion,
        }
    }
}

fn footer_range(block: ByteRange) -> ByteRange {
    ByteRange {
        start: block.end - FOOTER_SIZE,
        end: block.end,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkSlot {
    First,
    Second,
}

impl ChunkSlot {
    pub const ALL: [ChunkSlot; 2] = [ChunkSlot::First, ChunkSlot::Second];

    pub fn offset(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => CHUNK_SIZE,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl fmt::Display for ChunkSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk@{:#x}", self.offset())
    }
}

/// A footer-terminated region of the save. Holds addresses, not bytes, so it
/// stays usable while the buffer it came from is being rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub slot: ChunkSlot,
    pub range: ByteRange,
    pub footer: Footer,
}

impl Block {
    fn read(bytes: &[u8], slot: ChunkSlot, range: ByteRange) -> Result<Self, CoreError> {
        let footer = Footer::parse(footer_range(range).slice(bytes)?)?;
        Ok(Self {
            slot,
            range,
            footer,
        })
    }

    pub fn address(&self) -> usize {
        self.range.start
    }

    /// Location of the footer's checksum field: the last two bytes of the block.
    pub fn checksum_address(&self) -> usize {
        self.range.end - 2
    }

    pub fn compute_checksum(&self, bytes: &[u8], layout: &VersionLayout) -> Result<u16, CoreError> {
        Ok(crc16_ccitt(layout.checksum_range(self.range).slice(bytes)?))
    }

    pub fn verify(&self, bytes: &[u8], layout: &VersionLayout) -> Result<(), CoreError> {
        let computed = self.compute_checksum(bytes, layout)?;
        if computed != self.footer.checksum {
            return Err(CoreError::new(
                CoreErrorCode::ChunkChecksumMismatch,
                format!(
                    "block at {:#x}: footer checksum {:#06x}, computed {computed:#06x}",
                    self.address(),
                    self.footer.checksum
                ),
            ));
        }
        Ok(())
    }
}

/// A small block paired with a big block. For a physical chunk both come
/// from the same slot; the latest chunk may mix slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub small: Block,
    pub big: Block,
}

impl Chunk {
    pub fn verify(&self, bytes: &[u8], layout: &VersionLayout) -> Result<(), CoreError> {
        self.small.verify(bytes, layout)?;
        self.big.verify(bytes, layout)
    }

    pub fn is_valid(&self, bytes: &[u8], layout: &VersionLayout) -> bool {
        self.verify(bytes, layout).is_ok()
    }

    pub fn party_base(&self, layout: &VersionLayout) -> usize {
        self.small.address() + layout.party_offset
    }
}

/// Read-only view of a 512 KiB save with an identified version.
#[derive(Debug, Clone, Copy)]
pub struct Savefile<'a> {
    bytes: &'a [u8],
    version: GameVersion,
}

impl<'a> Savefile<'a> {
    /// Checks the size, identifies the version and, when `hint` is given,
    /// requires it to agree.
    pub fn new(bytes: &'a [u8], hint: Option<GameVersion>) -> Result<Self, CoreError> {
        check_size(bytes)?;
        let version = identify(bytes)?;
        if let Some(hint) = hint.filter(|&hint| hint != version) {
            return Err(CoreError::malformed(format!(
                "save identifies as {version}, not {hint}"
            )));
        }
        Ok(Self { bytes, version })
    }

    /// Skips identification; only the size is checked.
    pub fn with_version(bytes: &'a [u8], version: GameVersion) -> Result<Self, CoreError> {
        check_size(bytes)?;
        Ok(Self { bytes, version })
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn version(&self) -> GameVersion {
        self.version
    }

    pub fn layout(&self) -> &'static VersionLayout {
        self.version.layout()
    }

    pub fn chunk(&self, slot: ChunkSlot) -> Result<Chunk, CoreError> {
        let layout = self.layout();
        Ok(Chunk {
            small: Block::read(self.bytes, slot, layout.small_block_range(slot))?,
            big: Block::read(self.bytes, slot, layout.big_block_range(slot))?,
        })
    }

    pub fn validate_chunk(&self, chunk: &Chunk) -> Result<(), CoreError> {
        chunk.verify(self.bytes, self.layout())
    }

    /// Both physical chunks must pass their CRCs.
    pub fn validate(&self) -> Result<(), CoreError> {
        for slot in ChunkSlot::ALL {
            let chunk = self.chunk(slot)?;
            self.validate_chunk(&chunk).map_err(|e| {
                warn!("{slot} failed validation: {}", e.message);
                CoreError::new(e.code, format!("{slot}: {}", e.message))
            })?;
        }
        Ok(())
    }

    /// The small block with the higher save number (the first chunk on a
    /// tie), paired with the big block whose footer identifier matches it.
    pub fn latest_chunk(&self) -> Result<Chunk, CoreError> {
        let first = self.chunk(ChunkSlot::First)?;
        let second = self.chunk(ChunkSlot::Second)?;

        let small = if first.small.footer.save_number >= second.small.footer.save_number {
            first.small
        } else {
            second.small
        };
        let big = if small.footer.identifier == first.big.footer.identifier {
            first.big
        } else {
            second.big
        };
        debug!(
            "latest chunk: small from {} (save#={}), big from {}",
            small.slot, small.footer.save_number, big.slot
        );
        Ok(Chunk { small, big })
    }

    pub fn party_size(&self, chunk: &Chunk) -> Result<usize, CoreError> {
        let base = chunk.party_base(self.layout());
        ByteRange::new(base - 4, 4).check_within(self.bytes.len())?;
        let count = u32_at(self.bytes, base - 4) as usize;
        if count > MAX_PARTY_SIZE {
            return Err(CoreError::malformed(format!(
                "party count {count} exceeds {MAX_PARTY_SIZE}"
            )));
        }
        Ok(count)
    }

    pub fn party_record_range(&self, chunk: &Chunk, index: usize) -> Result<ByteRange, CoreError> {
        party_record_range(chunk, self.layout(), index)
    }

    pub fn party_record(&self, chunk: &Chunk, index: usize) -> Result<&'a [u8], CoreError> {
        self.party_record_range(chunk, index)?.slice(self.bytes)
    }
}

pub(crate) fn party_record_range(
    chunk: &Chunk,
    layout: &VersionLayout,
    index: usize,
) -> Result<ByteRange, CoreError> {
    if index >= MAX_PARTY_SIZE {
        return Err(CoreError::new(
            CoreErrorCode::InvalidPartyIndex,
            format!("party index {index} out of range 0..{MAX_PARTY_SIZE}"),
        ));
    }
    Ok(ByteRange::new(
        chunk.party_base(layout) + index * RECORD_SIZE,
        RECORD_SIZE,
    ))
}

fn check_size(bytes: &[u8]) -> Result<(), CoreError> {
    if bytes.len() != SAVE_SIZE {
        return Err(CoreError::malformed(format!(
            "save must be {SAVE_SIZE:#x} bytes, got {:#x}",
            bytes.len()
        )));
    }
    Ok(())
}

fn layout_matches(bytes: &[u8], layout: &VersionLayout) -> bool {
    let slot = ChunkSlot::Second;
    let footers = [
        (layout.small_block_range(slot), layout.small_block_size),
        (layout.big_block_range(slot), layout.big_block_size),
    ];
    footers.iter().all(|&(range, size)| {
        footer_range(range)
            .slice(bytes)
            .and_then(Footer::parse)
            .is_ok_and(|footer| footer.block_size as usize == size && footer.has_known_magic())
    })
}

/// Identifies the game from the second chunk's footers.
pub fn identify(bytes: &[u8]) -> Result<GameVersion, CoreError> {
    for version in GameVersion::ALL {
        if layout_matches(bytes, version.layout()) {
            debug!("identified save as {version}");
            return Ok(version);
        }
    }
    Err(CoreError::malformed("unrecognized game version"))
}

/// Identifies the save and checks both chunks' CRCs.
pub fn validate_savefile(bytes: &[u8]) -> Result<GameVersion, CoreError> {
    let save = Savefile::new(bytes, None)?;
    save.validate()?;
    Ok(save.version())
}

pub fn select_latest_chunk(bytes: &[u8], version: GameVersion) -> Result<Chunk, CoreError> {
    Savefile::with_version(bytes, version)?.latest_chunk()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_from_cli_names() {
        assert_eq!("plat".parse::<GameVersion>().unwrap(), GameVersion::Platinum);
        assert_eq!(
            "HGSS".parse::<GameVersion>().unwrap(),
            GameVersion::HeartGoldSoulSilver
        );
        assert!("diamond".parse::<GameVersion>().is_err());
    }

    #[test]
    fn block_ranges_per_version() {
        let plat = GameVersion::Platinum.layout();
        assert_eq!(plat.big_block_range(ChunkSlot::First).start, 0xCF2C);
        assert_eq!(plat.big_block_range(ChunkSlot::Second).end, 0x40000 + 0xCF2C + 0x121E4);
        let hgss = GameVersion::HeartGoldSoulSilver.layout();
        assert_eq!(hgss.big_block_range(ChunkSlot::First).start, 0xF700);
        let small = hgss.small_block_range(ChunkSlot::First);
        assert_eq!(hgss.checksum_range(small).end, 0xF618);
        assert_eq!(plat.checksum_range(plat.small_block_range(ChunkSlot::First)).end, 0xCF18);
    }

    #[test]
    fn wrong_size_is_malformed() {
        let err = Savefile::new(&[0u8; 0x1000], None).expect_err("too small");
        assert_eq!(err.code, CoreErrorCode::MalformedSavefile);
    }

    #[test]
    fn blank_save_is_unrecognized() {
        let bytes = vec![0u8; SAVE_SIZE];
        let err = identify(&bytes).expect_err("no footers");
        assert_eq!(err.code, CoreErrorCode::MalformedSavefile);
    }

    #[test]
    fn party_index_past_six_is_rejected() {
        let bytes = vec![0u8; SAVE_SIZE];
        let save = Savefile::with_version(&bytes, GameVersion::Platinum).unwrap();
        let chunk = save.chunk(ChunkSlot::First).unwrap();
        let err = save.party_record_range(&chunk, 6).expect_err("slot 6");
        assert_eq!(err.code, CoreErrorCode::InvalidPartyIndex);
        assert_eq!(save.party_record_range(&chunk, 1).unwrap().start, 0xA0 + 0xEC);
    }
}
