//! Mnemonic table for the `mov` family.

use std::fmt;

use movcpu_core::OperandWidth;

/// Recognized `mov` mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// 1-byte move.
    Movb,
    /// 2-byte move.
    Movw,
    /// 4-byte move; zero-extends register destinations.
    Movl,
    /// 8-byte move.
    Movq,
    /// Unsuffixed move; always 8 bytes.
    Mov,
}

const MNEMONIC_TABLE: [(&str, Mnemonic); 5] = [
    ("movb", Mnemonic::Movb),
    ("movw", Mnemonic::Movw),
    ("movl", Mnemonic::Movl),
    ("movq", Mnemonic::Movq),
    ("mov", Mnemonic::Mov),
];

impl Mnemonic {
    /// Canonical lowercase spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Movb => "movb",
            Self::Movw => "movw",
            Self::Movl => "movl",
            Self::Movq => "movq",
            Self::Mov => "mov",
        }
    }

    /// Transfer width selected by the mnemonic.
    ///
    /// The parser only accepts 64-bit register names, so an unsuffixed `mov`
    /// always operates on 8 bytes.
    #[must_use]
    pub const fn width(self) -> OperandWidth {
        match self {
            Self::Movb => OperandWidth::Byte,
            Self::Movw => OperandWidth::Word,
            Self::Movl => OperandWidth::Long,
            Self::Movq | Self::Mov => OperandWidth::Quad,
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves a mnemonic token, ignoring ASCII case.
///
/// The longest table entry that prefixes `token` wins, and it must cover the
/// whole token: `movq` resolves, `movqx` does not.
#[must_use]
pub fn match_mnemonic(token: &str) -> Option<Mnemonic> {
    MNEMONIC_TABLE
        .iter()
        .filter(|(name, _)| {
            token
                .get(..name.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(name))
        })
        .max_by_key(|(name, _)| name.len())
        .filter(|(name, _)| name.len() == token.len())
        .map(|(_, mnemonic)| *mnemonic)
}
