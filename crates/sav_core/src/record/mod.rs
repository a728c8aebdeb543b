//! Party records: block shuffle, cipher, field addressing and decoding.

pub mod cipher;
pub mod fields;
pub mod party;
pub mod shuffle;

pub use cipher::{DecryptedRecord, RECORD_SIZE, decrypt_record, encrypt_record};
pub use fields::{FieldKind, FieldLocation, IvWord, Region, Stats};
pub use party::PartyMember;
pub use shuffle::{BlockId, block_slice, locate, locate_index, shift_index};
