//! Operand and instruction model shared by the line parser and the executor.

use std::fmt;

use crate::{OperandWidth, Register};

/// Addressing expression `displacement(base, index, scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemoryOperand {
    /// Signed constant offset.
    pub displacement: i64,
    /// Optional base register.
    pub base: Option<Register>,
    /// Optional index register.
    pub index: Option<Register>,
    /// Index multiplier; ignored when `index` is absent.
    pub scale: u8,
}

impl MemoryOperand {
    /// Absolute address with no registers involved.
    #[must_use]
    pub const fn absolute(displacement: i64) -> Self {
        Self {
            displacement,
            base: None,
            index: None,
            scale: 1,
        }
    }

    /// `displacement(base)` form.
    #[must_use]
    pub const fn based(displacement: i64, base: Register) -> Self {
        Self {
            displacement,
            base: Some(base),
            index: None,
            scale: 1,
        }
    }

    /// Full `displacement(base, index, scale)` form.
    #[must_use]
    pub const fn indexed(
        displacement: i64,
        base: Option<Register>,
        index: Register,
        scale: u8,
    ) -> Self {
        Self {
            displacement,
            base,
            index: Some(index),
            scale,
        }
    }
}

impl fmt::Display for MemoryOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.displacement != 0 || (self.base.is_none() && self.index.is_none()) {
            write!(f, "{}", self.displacement)?;
        }
        if self.base.is_none() && self.index.is_none() {
            return Ok(());
        }
        write!(f, "(")?;
        if let Some(base) = self.base {
            write!(f, "{base}")?;
        }
        if let Some(index) = self.index {
            write!(f, ",{index},{}", self.scale)?;
        }
        write!(f, ")")
    }
}

/// Tagged operand variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Operand {
    /// Register slot.
    Register(Register),
    /// Read-only literal constant.
    Immediate(i64),
    /// Memory addressing expression.
    Memory(MemoryOperand),
}

impl Operand {
    /// Returns the operand kind without its payload.
    #[must_use]
    pub const fn kind(&self) -> OperandKind {
        match self {
            Self::Register(_) => OperandKind::Register,
            Self::Immediate(_) => OperandKind::Immediate,
            Self::Memory(_) => OperandKind::Memory,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(reg) => write!(f, "{reg}"),
            Self::Immediate(value) => write!(f, "${value}"),
            Self::Memory(mem) => write!(f, "{mem}"),
        }
    }
}

/// Operand kind tag used in trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum OperandKind {
    Register,
    Immediate,
    Memory,
}

/// One move instruction ready for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instruction {
    /// Number of bytes transferred.
    pub width: OperandWidth,
    /// Value being copied.
    pub source: Operand,
    /// Location receiving the value; never an immediate.
    pub destination: Operand,
}

impl Instruction {
    /// Builds a move of `width` bytes from `source` to `destination`.
    #[must_use]
    pub const fn new(width: OperandWidth, source: Operand, destination: Operand) -> Self {
        Self {
            width,
            source,
            destination,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mov{} {}, {}",
            self.width.suffix(),
            self.source,
            self.destination
        )
    }
}
