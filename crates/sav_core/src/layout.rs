use crate::core_api::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], CoreError> {
        self.check_within(bytes.len())?;
        Ok(&bytes[self.start..self.end])
    }

    pub fn slice_mut<'a>(&self, bytes: &'a mut [u8]) -> Result<&'a mut [u8], CoreError> {
        self.check_within(bytes.len())?;
        Ok(&mut bytes[self.start..self.end])
    }

    pub fn check_within(&self, file_len: usize) -> Result<(), CoreError> {
        if self.end < self.start {
            return Err(CoreError::malformed(format!(
                "invalid byte range {:#x}..{:#x}",
                self.start, self.end
            )));
        }
        if self.end > file_len {
            return Err(CoreError::malformed(format!(
                "byte range {:#x}..{:#x} exceeds buffer length {:#x}",
                self.start, self.end, file_len
            )));
        }
        Ok(())
    }
}
