use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    /// Wrong total size, unrecognized version, or an out-of-range header value.
    MalformedSavefile,
    /// CRC16 over a block's data region disagrees with its footer.
    ChunkChecksumMismatch,
    /// Additive checksum over a decrypted record disagrees with the stored one.
    RecordChecksumMismatch,
    InvalidBlockIndex,
    /// A value cannot be represented in its on-disk field.
    FieldEncoding,
    /// Serialized bytes do not fit the destination field.
    WriteOverflow,
    InvalidPartyIndex,
    /// Name table text or a name lookup that cannot be resolved.
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::MalformedSavefile, message)
    }

    pub fn field_encoding(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::FieldEncoding, message)
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData => {
                Self::malformed(e.to_string())
            }
            _ => Self::new(CoreErrorCode::Io, e.to_string()),
        }
    }
}
