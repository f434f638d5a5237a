//! AT&T-syntax line parser and run driver for the movcpu core.

/// Line-level error reporting types.
pub mod errors;
/// Mnemonic table for the `mov` family.
pub mod mnemonic;
/// Line parser producing executable instructions.
pub mod parser;
/// Run session feeding lines into a CPU context.
pub mod session;
/// Source loading from files and readers.
pub mod source;
