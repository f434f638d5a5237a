//! Operand width type shared by registers, memory and the executor.

use crate::FaultCode;

/// Number of bytes a move transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum OperandWidth {
    /// 1 byte (`b` suffix).
    Byte = 1,
    /// 2 bytes (`w` suffix).
    Word = 2,
    /// 4 bytes (`l` suffix).
    Long = 4,
    /// 8 bytes (`q` suffix).
    Quad = 8,
}

impl OperandWidth {
    /// Every width in ascending size order.
    pub const ALL: [Self; 4] = [Self::Byte, Self::Word, Self::Long, Self::Quad];

    /// Returns the width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u8 {
        self as u8
    }

    /// Returns the width in bytes as a `usize` for buffer arithmetic.
    #[must_use]
    pub const fn byte_len(self) -> usize {
        self as usize
    }

    /// Mask selecting the low `bytes()` bytes of a 64-bit value.
    #[must_use]
    pub const fn mask(self) -> u64 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
            Self::Long => 0xFFFF_FFFF,
            Self::Quad => u64::MAX,
        }
    }

    /// Returns the AT&T mnemonic suffix for this width.
    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            Self::Byte => 'b',
            Self::Word => 'w',
            Self::Long => 'l',
            Self::Quad => 'q',
        }
    }

    /// Returns `true` when `value` is representable in this width as either a
    /// signed or an unsigned quantity.
    #[must_use]
    pub const fn fits_immediate(self, value: i64) -> bool {
        match self {
            Self::Byte => value >= i8::MIN as i64 && value <= u8::MAX as i64,
            Self::Word => value >= i16::MIN as i64 && value <= u16::MAX as i64,
            Self::Long => value >= i32::MIN as i64 && value <= u32::MAX as i64,
            Self::Quad => true,
        }
    }
}

impl TryFrom<u8> for OperandWidth {
    type Error = FaultCode;

    fn try_from(bytes: u8) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(Self::Byte),
            2 => Ok(Self::Word),
            4 => Ok(Self::Long),
            8 => Ok(Self::Quad),
            _ => Err(FaultCode::InvalidOperandWidth { bytes }),
        }
    }
}
