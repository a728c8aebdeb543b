use log::{debug, warn};

use crate::charset::Charset;
use crate::lookup::Lookup;
use crate::record::{PartyMember, Stats, decrypt_record};
use crate::sav::{Block, Chunk, ChunkSlot, GameVersion, Savefile, VersionLayout};
use crate::writer::{WriteRequest, apply_write_requests};

use super::error::{CoreError, CoreErrorCode};
use super::types::{BlockInfo, Capabilities, CapabilityIssue, ChunkStatus, PartyEntry, Snapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug)]
pub struct Session {
    game: GameVersion,
    original: Vec<u8>,
    working: Vec<u8>,
    charset: Charset,
    chunk: Chunk,
    snapshot: Snapshot,
    capabilities: Capabilities,
    party: Vec<PartyEntry>,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Opens a save held in memory.
    ///
    /// The newest chunk is used when it passes its CRCs, otherwise the other
    /// chunk is. Only a save with no intact chunk fails to open. A corrupt
    /// chunk or a party record with a bad checksum is reported through
    /// [`Session::capabilities`].
    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        hint: Option<GameVersion>,
    ) -> Result<Session, CoreError> {
        let bytes = bytes.as_ref();
        let save = Savefile::new(bytes, hint)?;
        let game = save.version();
        let latest = save.latest_chunk()?;
        let backup = save.chunk(latest.small.slot.other())?;

        let mut issues = Vec::new();
        let chunk = match save.validate_chunk(&latest) {
            Ok(()) => {
                if let Err(e) = save.validate_chunk(&backup) {
                    warn!("backup chunk is corrupt: {}", e.message);
                    issues.push(CapabilityIssue::BackupChunkCorrupt);
                }
                latest
            }
            Err(latest_err) => {
                save.validate_chunk(&backup).map_err(|e| {
                    CoreError::new(
                        CoreErrorCode::ChunkChecksumMismatch,
                        format!(
                            "both chunks are corrupt: latest: {}; backup: {}",
                            latest_err.message, e.message
                        ),
                    )
                })?;
                warn!(
                    "latest chunk is corrupt ({}), falling back to {}",
                    latest_err.message, backup.small.slot
                );
                issues.push(CapabilityIssue::LatestChunkCorrupt);
                backup
            }
        };

        let party = decode_party(&save, &chunk)?;
        for entry in party.iter().filter(|entry| !entry.checksum_valid) {
            warn!("party slot {} fails its record checksum", entry.index);
            issues.push(CapabilityIssue::CorruptPartyRecord(entry.index));
        }

        let snapshot = build_snapshot(&save, &chunk, party.len())?;
        debug!("opened {game} save with {} party member(s)", party.len());

        Ok(Session {
            game,
            original: bytes.to_vec(),
            working: bytes.to_vec(),
            charset: Charset::builtin(),
            chunk,
            snapshot,
            capabilities: Capabilities::editable(issues),
            party,
        })
    }
}

impl Session {
    pub fn game(&self) -> GameVersion {
        self.game
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// The authoritative small/big block pair.
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn party(&self) -> &[PartyEntry] {
        &self.party
    }

    pub fn party_member(&self, index: usize) -> Option<&PartyEntry> {
        self.party.get(index)
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    /// Replaces the character table used to encode nicknames.
    pub fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }

    pub fn is_modified(&self) -> bool {
        self.original != self.working
    }

    pub fn to_bytes_unmodified(&self) -> Result<Vec<u8>, CoreError> {
        Ok(self.original.clone())
    }

    pub fn to_bytes_modified(&self) -> Result<Vec<u8>, CoreError> {
        Ok(self.working.clone())
    }

    /// Runs `requests` as one transaction: either every edit lands or the
    /// working buffer is left as it was.
    pub fn apply(&mut self, requests: &[WriteRequest]) -> Result<(), CoreError> {
        let updated = apply_write_requests(
            &self.working,
            self.game,
            &self.chunk,
            requests,
            &self.charset,
        )?;
        let save = Savefile::with_version(&updated, self.game)?;
        let chunk = reread_chunk(&save, &self.chunk)?;
        let party = decode_party(&save, &chunk)?;
        let snapshot = build_snapshot(&save, &chunk, party.len())?;

        self.working = updated;
        self.chunk = chunk;
        self.party = party;
        self.snapshot = snapshot;
        Ok(())
    }

    pub fn set_held_item(&mut self, index: usize, item: u16) -> Result<(), CoreError> {
        self.apply(&[WriteRequest::held_item(index, item)])
    }

    pub fn set_held_item_by_name(
        &mut self,
        index: usize,
        name: &str,
        lookup: &Lookup,
    ) -> Result<(), CoreError> {
        let item = lookup.items.resolve(name, "item")?;
        self.set_held_item(index, item)
    }

    pub fn set_ability(&mut self, index: usize, ability: u8) -> Result<(), CoreError> {
        self.apply(&[WriteRequest::ability(index, ability)])
    }

    pub fn set_ability_by_name(
        &mut self,
        index: usize,
        name: &str,
        lookup: &Lookup,
    ) -> Result<(), CoreError> {
        let id = lookup.abilities.resolve(name, "ability")?;
        let ability = u8::try_from(id).map_err(|_| {
            CoreError::new(
                CoreErrorCode::FieldEncoding,
                format!("ability id {id} does not fit one byte"),
            )
        })?;
        self.set_ability(index, ability)
    }

    pub fn set_evs(&mut self, index: usize, evs: Stats) -> Result<(), CoreError> {
        self.apply(&[WriteRequest::evs(index, evs)])
    }

    pub fn set_ivs(&mut self, index: usize, ivs: Stats) -> Result<(), CoreError> {
        self.apply(&[WriteRequest::ivs(index, ivs)])
    }

    pub fn set_nickname(&mut self, index: usize, name: &str) -> Result<(), CoreError> {
        self.apply(&[WriteRequest::nickname(index, name)])
    }

    pub fn set_level(&mut self, index: usize, level: u8) -> Result<(), CoreError> {
        self.apply(&[WriteRequest::level(index, level)])
    }

    pub fn set_battle_stats(&mut self, index: usize, stats: Stats) -> Result<(), CoreError> {
        self.apply(&[WriteRequest::battle_stats(index, stats)])
    }
}

/// Same block pair as `chunk`, with footers read again from `save`.
fn reread_chunk(save: &Savefile<'_>, chunk: &Chunk) -> Result<Chunk, CoreError> {
    Ok(Chunk {
        small: save.chunk(chunk.small.slot)?.small,
        big: save.chunk(chunk.big.slot)?.big,
    })
}

fn decode_party(save: &Savefile<'_>, chunk: &Chunk) -> Result<Vec<PartyEntry>, CoreError> {
    let size = save.party_size(chunk)?;
    let mut party = Vec::with_capacity(size);
    for index in 0..size {
        let record = decrypt_record(save.party_record(chunk, index)?)?;
        party.push(PartyEntry {
            index,
            checksum_valid: record.is_valid(),
            member: PartyMember::from_record(&record)?,
        });
    }
    Ok(party)
}

fn block_info(bytes: &[u8], block: &Block, layout: &VersionLayout) -> BlockInfo {
    BlockInfo {
        address: block.address(),
        footer: block.footer,
        checksum_valid: block.verify(bytes, layout).is_ok(),
    }
}

fn build_snapshot(
    save: &Savefile<'_>,
    chunk: &Chunk,
    party_size: usize,
) -> Result<Snapshot, CoreError> {
    let layout = save.layout();
    let mut chunks = Vec::with_capacity(ChunkSlot::ALL.len());
    for slot in ChunkSlot::ALL {
        let physical = save.chunk(slot)?;
        chunks.push(ChunkStatus {
            slot,
            small: block_info(save.bytes(), &physical.small, layout),
            big: block_info(save.bytes(), &physical.big, layout),
        });
    }
    Ok(Snapshot {
        game: save.version(),
        party_size,
        chunks,
        latest_small: chunk.small.slot,
        latest_big: chunk.big.slot,
    })
}
