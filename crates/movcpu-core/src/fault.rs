use thiserror::Error;

/// Fault classes used for reporting and recovery policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Parser and executor disagree about the instruction model.
    Contract,
    /// Memory access fell outside the backing buffer.
    Memory,
    /// Immediate literal does not fit the operand width.
    Immediate,
}

/// Fault taxonomy raised by the register file, memory store and executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultCode {
    /// Operand width is not one of 1, 2, 4 or 8 bytes.
    #[error("invalid operand width: {bytes} bytes")]
    InvalidOperandWidth {
        /// Rejected width in bytes.
        bytes: u8,
    },
    /// Index scale is not one of 1, 2, 4 or 8.
    #[error("invalid index scale: {scale}")]
    InvalidScale {
        /// Rejected scale factor.
        scale: u8,
    },
    /// Instruction names an immediate as its destination.
    #[error("immediate operand cannot be a move destination")]
    InvalidDestination,
    /// Memory access does not fit inside the backing buffer.
    #[error("memory access of {width} bytes at {address:#x} is out of bounds")]
    OutOfBoundsAccess {
        /// Effective address of the access.
        address: i64,
        /// Access width in bytes.
        width: u8,
    },
    /// Immediate literal does not fit in the instruction width.
    #[error("immediate {value} does not fit in {width} bytes")]
    ImmediateOverflow {
        /// Literal as written.
        value: i64,
        /// Instruction width in bytes.
        width: u8,
    },
}

impl FaultCode {
    /// Returns the reporting class for this fault.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::InvalidOperandWidth { .. }
            | Self::InvalidScale { .. }
            | Self::InvalidDestination => FaultClass::Contract,
            Self::OutOfBoundsAccess { .. } => FaultClass::Memory,
            Self::ImmediateOverflow { .. } => FaultClass::Immediate,
        }
    }

    /// Faults that only invalidate the current line instead of halting the core.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        matches!(self.class(), FaultClass::Immediate)
    }
}

#[cfg(test)]
mod tests {
    use super::{FaultClass, FaultCode};

    #[test]
    fn only_immediate_overflow_is_recoverable() {
        assert!(FaultCode::ImmediateOverflow { value: 300, width: 1 }.is_recoverable());
        assert!(!FaultCode::InvalidOperandWidth { bytes: 3 }.is_recoverable());
        assert!(!FaultCode::InvalidScale { scale: 3 }.is_recoverable());
        assert!(!FaultCode::InvalidDestination.is_recoverable());
        assert!(!FaultCode::OutOfBoundsAccess {
            address: 4096,
            width: 1
        }
        .is_recoverable());
    }

    #[test]
    fn class_mapping_matches_fault_taxonomy() {
        assert_eq!(
            FaultCode::InvalidOperandWidth { bytes: 0 }.class(),
            FaultClass::Contract
        );
        assert_eq!(
            FaultCode::InvalidScale { scale: 5 }.class(),
            FaultClass::Contract
        );
        assert_eq!(FaultCode::InvalidDestination.class(), FaultClass::Contract);
        assert_eq!(
            FaultCode::OutOfBoundsAccess {
                address: -1,
                width: 8
            }
            .class(),
            FaultClass::Memory
        );
        assert_eq!(
            FaultCode::ImmediateOverflow {
                value: -129,
                width: 1
            }
            .class(),
            FaultClass::Immediate
        );
    }

    #[test]
    fn messages_carry_offending_values() {
        let fault = FaultCode::OutOfBoundsAccess {
            address: 0xFFE,
            width: 4,
        };
        assert_eq!(
            fault.to_string(),
            "memory access of 4 bytes at 0xffe is out of bounds"
        );
        assert_eq!(
            FaultCode::InvalidScale { scale: 3 }.to_string(),
            "invalid index scale: 3"
        );
    }
}
