//! CPU register-file and run-state primitives.

/// General-purpose register identifiers and storage.
pub mod registers;
/// Run-state machine with fault latching.
pub mod run_state;

pub use registers::{Register, RegisterFile, GENERAL_REGISTER_COUNT};
pub use run_state::RunState;
