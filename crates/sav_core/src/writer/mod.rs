//! Transactional write-back of field edits into party records.
//!
//! Records are decrypted into a staging arena the first time a request
//! touches them, patched there, then re-encrypted into a copy of the save
//! whose small-block CRC is repaired. The caller's buffer is never modified;
//! any failure discards the staged work.

pub mod request;

use std::collections::BTreeMap;

use log::debug;

use crate::charset::Charset;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::record::fields::{FieldKind, FieldLocation, IvWord};
use crate::record::{DecryptedRecord, decrypt_record, encrypt_record};
use crate::sav::{Chunk, GameVersion, Savefile};

pub use request::{FieldValue, WriteRequest};

/// Decrypted records keyed by party index.
#[derive(Debug, Default)]
struct StagingArena {
    records: BTreeMap<usize, DecryptedRecord>,
}

impl StagingArena {
    fn record_mut(
        &mut self,
        save: &Savefile<'_>,
        chunk: &Chunk,
        index: usize,
    ) -> Result<&mut DecryptedRecord, CoreError> {
        if !self.records.contains_key(&index) {
            let record = decrypt_record(save.party_record(chunk, index)?)?;
            record.verify().map_err(|e| {
                CoreError::new(e.code, format!("party slot {index}: {}", e.message))
            })?;
            self.records.insert(index, record);
        }
        self.records.get_mut(&index).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::InvalidPartyIndex,
                format!("party slot {index} was not staged"),
            )
        })
    }
}

/// Copies `bytes` into the field at `location`. Bytes that do not fit the
/// field are an overflow, not a truncation.
pub(crate) fn stage_bytes(
    record: &mut DecryptedRecord,
    location: FieldLocation,
    bytes: &[u8],
) -> Result<(), CoreError> {
    if bytes.len() > location.capacity {
        return Err(CoreError::new(
            CoreErrorCode::WriteOverflow,
            format!(
                "{} bytes do not fit a {}-byte field",
                bytes.len(),
                location.capacity
            ),
        ));
    }
    let start = location.resolve(record.personality());
    let dest = record
        .bytes_mut()
        .get_mut(start..start + bytes.len())
        .ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::WriteOverflow,
                format!("field at {start:#x} runs past the end of the record"),
            )
        })?;
    dest.copy_from_slice(bytes);
    Ok(())
}

/// The egg and nickname flags share the IV word; an IV write keeps them.
fn keep_iv_flags(record: &DecryptedRecord, location: FieldLocation, bytes: &mut [u8]) {
    let start = location.resolve(record.personality());
    let mut current = [0u8; 4];
    current.copy_from_slice(&record.bytes()[start..start + 4]);
    let current = IvWord::decode(current);

    let mut incoming = [0u8; 4];
    incoming.copy_from_slice(&bytes[..4]);
    let merged = IvWord {
        is_egg: current.is_egg,
        is_nicknamed: current.is_nicknamed,
        ..IvWord::decode(incoming)
    };
    if let Ok(encoded) = merged.encode() {
        bytes[..4].copy_from_slice(&encoded);
    }
}

/// Applies `requests` to the party of `chunk` and returns the updated save.
/// `save` itself is left untouched whether or not this succeeds.
pub fn apply_write_requests(
    save: &[u8],
    version: GameVersion,
    chunk: &Chunk,
    requests: &[WriteRequest],
    charset: &Charset,
) -> Result<Vec<u8>, CoreError> {
    let view = Savefile::with_version(save, version)?;
    let party_size = view.party_size(chunk)?;
    let mut arena = StagingArena::default();

    for request in requests {
        let index = request.party_index;
        if index >= party_size {
            return Err(CoreError::new(
                CoreErrorCode::InvalidPartyIndex,
                format!("party slot {index} is empty, party has {party_size} members"),
            ));
        }
        let kind = request.value.kind();
        let mut bytes = request.value.to_bytes(charset)?;
        let location = kind.location();
        let record = arena.record_mut(&view, chunk, index)?;
        if kind == FieldKind::Ivs && bytes.len() == 4 {
            keep_iv_flags(record, location, &mut bytes);
        }
        stage_bytes(record, location, &bytes)?;
        debug!("staged {} for party slot {index}", kind.name());
    }

    let mut out = save.to_vec();
    if arena.records.is_empty() {
        return Ok(out);
    }

    for (&index, record) in &arena.records {
        let encrypted = encrypt_record(record.bytes())?;
        view.party_record_range(chunk, index)?
            .slice_mut(&mut out)?
            .copy_from_slice(&encrypted);
    }

    let layout = version.layout();
    let checksum = chunk.small.compute_checksum(&out, layout)?;
    let at = chunk.small.checksum_address();
    out[at..at + 2].copy_from_slice(&checksum.to_le_bytes());
    debug!(
        "rewrote {} record(s), small block checksum {checksum:#06x} at {at:#x}",
        arena.records.len()
    );
    Ok(out)
}
