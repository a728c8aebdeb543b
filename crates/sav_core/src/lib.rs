pub mod charset;
pub mod core_api;
pub mod crypto;
pub mod layout;
pub mod lookup;
pub mod reader;
pub mod record;
pub mod sav;
pub mod writer;

pub use charset::Charset;
pub use lookup::{Lookup, NameTable};
pub use record::{DecryptedRecord, PartyMember, Stats, decrypt_record, encrypt_record};
pub use sav::{Chunk, GameVersion, Savefile, select_latest_chunk, validate_savefile};
pub use writer::{FieldValue, WriteRequest, apply_write_requests};
