use serde::{Deserialize, Serialize};

use crate::record::PartyMember;
use crate::sav::{ChunkSlot, Footer, GameVersion};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockInfo {
    pub address: usize,
    pub footer: Footer,
    pub checksum_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkStatus {
    pub slot: ChunkSlot,
    pub small: BlockInfo,
    pub big: BlockInfo,
}

impl ChunkStatus {
    pub fn is_valid(&self) -> bool {
        self.small.checksum_valid && self.big.checksum_valid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub game: GameVersion,
    pub party_size: usize,
    pub chunks: Vec<ChunkStatus>,
    /// Slot the authoritative small block was taken from.
    pub latest_small: ChunkSlot,
    /// Slot of the big block paired with it by footer identifier.
    pub latest_big: ChunkSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartyEntry {
    pub index: usize,
    pub checksum_valid: bool,
    pub member: PartyMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    /// The newest chunk fails its CRC; the session reads and writes the
    /// older chunk instead.
    LatestChunkCorrupt,
    /// The chunk not selected as latest fails its CRC.
    BackupChunkCorrupt,
    /// The record at this party index fails its additive checksum and
    /// cannot be edited.
    CorruptPartyRecord(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_query: bool,
    pub can_apply_edits: bool,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    pub fn editable(issues: Vec<CapabilityIssue>) -> Self {
        Self {
            can_query: true,
            can_apply_edits: true,
            issues,
        }
    }

    pub fn can_edit_slot(&self, index: usize) -> bool {
        self.can_apply_edits
            && !self
                .issues
                .contains(&CapabilityIssue::CorruptPartyRecord(index))
    }
}
