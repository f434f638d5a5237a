use crate::OperandWidth;

/// Number of general-purpose registers (`rax..r15`).
pub const GENERAL_REGISTER_COUNT: usize = 16;

/// General-purpose register identifier in architectural index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    Rax = 0,
    Rbx = 1,
    Rcx = 2,
    Rdx = 3,
    Rsi = 4,
    Rdi = 5,
    Rbp = 6,
    Rsp = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

const REGISTER_NAMES: [&str; GENERAL_REGISTER_COUNT] = [
    "rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rbp", "rsp", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];

impl Register {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::Rax,
        Self::Rbx,
        Self::Rcx,
        Self::Rdx,
        Self::Rsi,
        Self::Rdi,
        Self::Rbp,
        Self::Rsp,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
        Self::R15,
    ];

    /// Returns the array index for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a register by its slot index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < GENERAL_REGISTER_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Canonical lowercase name without the `%` sigil.
    #[must_use]
    pub const fn name(self) -> &'static str {
        REGISTER_NAMES[self.index()]
    }

    /// Looks up a register by canonical name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTER_NAMES
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
            .and_then(Self::from_index)
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.name())
    }
}

/// The sixteen 64-bit general-purpose registers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    gpr: [u64; GENERAL_REGISTER_COUNT],
}

impl RegisterFile {
    /// Reads the full 64-bit register value.
    #[must_use]
    pub const fn get(&self, reg: Register) -> u64 {
        self.gpr[reg.index()]
    }

    /// Replaces the full 64-bit register value.
    pub const fn set(&mut self, reg: Register, value: u64) {
        self.gpr[reg.index()] = value;
    }

    /// Reads the low `width` bytes of a register.
    #[must_use]
    pub const fn read(&self, reg: Register, width: OperandWidth) -> u64 {
        self.gpr[reg.index()] & width.mask()
    }

    /// Writes the low `width` bytes of a register.
    ///
    /// Byte and word writes merge into the existing value. A long write
    /// zero-extends into the upper half, matching x86-64 behavior for 32-bit
    /// register destinations. A quad write replaces the register.
    pub const fn write(&mut self, reg: Register, width: OperandWidth, value: u64) {
        let slot = &mut self.gpr[reg.index()];
        *slot = match width {
            OperandWidth::Byte | OperandWidth::Word => {
                (*slot & !width.mask()) | (value & width.mask())
            }
            OperandWidth::Long => value & OperandWidth::Long.mask(),
            OperandWidth::Quad => value,
        };
    }

    /// Returns all register values in index order.
    #[must_use]
    pub const fn values(&self) -> &[u64; GENERAL_REGISTER_COUNT] {
        &self.gpr
    }
}
