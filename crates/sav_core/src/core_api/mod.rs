mod engine;
mod error;
mod types;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{BlockInfo, Capabilities, CapabilityIssue, ChunkStatus, PartyEntry, Snapshot};
