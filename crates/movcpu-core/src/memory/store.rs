//! Flat little-endian byte store with bounds-checked, width-aware access.

use crate::{
    validate_access, ConfigError, FaultCode, OperandWidth, DEFAULT_MEMORY_BYTES, MAX_MEMORY_BYTES,
};

/// Contiguous byte buffer addressed from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemoryStore {
    bytes: Box<[u8]>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::zeroed(DEFAULT_MEMORY_BYTES)
    }
}

impl MemoryStore {
    /// Allocates a zeroed store of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MemoryTooLarge`] when `len` exceeds
    /// [`MAX_MEMORY_BYTES`].
    pub fn new(len: usize) -> Result<Self, ConfigError> {
        if len > MAX_MEMORY_BYTES {
            return Err(ConfigError::MemoryTooLarge {
                requested: len,
                max: MAX_MEMORY_BYTES,
            });
        }
        Ok(Self::zeroed(len))
    }

    fn zeroed(len: usize) -> Self {
        Self {
            bytes: vec![0; len].into_boxed_slice(),
        }
    }

    /// Total addressable size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-sized store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw view of the whole buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads `width` bytes at `address` as a little-endian unsigned value.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBoundsAccess`] when the access does not fit.
    pub fn read(&self, address: i64, width: OperandWidth) -> Result<u64, FaultCode> {
        let range = validate_access(address, width, self.len())?;
        let mut raw = [0_u8; 8];
        raw[..width.byte_len()].copy_from_slice(&self.bytes[range]);
        Ok(u64::from_le_bytes(raw))
    }

    /// Writes the low `width` bytes of `value` at `address`, little-endian.
    ///
    /// Memory is left untouched when the access does not fit.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBoundsAccess`] when the access does not fit.
    pub fn write(&mut self, address: i64, width: OperandWidth, value: u64) -> Result<(), FaultCode> {
        let range = validate_access(address, width, self.len())?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes()[..width.byte_len()]);
        Ok(())
    }

    /// Copies `image` into the store starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBoundsAccess`] when the image would run past
    /// the end of the buffer; nothing is copied in that case.
    pub fn load(&mut self, offset: usize, image: &[u8]) -> Result<(), FaultCode> {
        let end = offset
            .checked_add(image.len())
            .filter(|end| *end <= self.len())
            .ok_or(FaultCode::OutOfBoundsAccess {
                address: i64::try_from(offset).unwrap_or(i64::MAX),
                width: 1,
            })?;
        self.bytes[offset..end].copy_from_slice(image);
        Ok(())
    }

    /// Copies as much of `image` as fits starting at address zero and
    /// returns the number of bytes copied.
    pub fn load_prefix(&mut self, image: &[u8]) -> usize {
        let len = image.len().min(self.bytes.len());
        self.bytes[..len].copy_from_slice(&image[..len]);
        len
    }
}
