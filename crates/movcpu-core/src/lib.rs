//! Core of a minimal x86-64 style `mov` machine: registers, flat memory,
//! addressing and width-aware moves.

/// Fault taxonomy raised by the core.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Operand width type.
pub mod width;
pub use width::OperandWidth;

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{Register, RegisterFile, RunState, GENERAL_REGISTER_COUNT};

/// Memory model primitives and the sample image.
pub mod memory;
pub use memory::{
    validate_access, MemoryStore, DEFAULT_MEMORY_BYTES, MAX_MEMORY_BYTES, SAMPLE_MEMORY_IMAGE,
};

/// Operand and instruction model.
pub mod operand;
pub use operand::{Instruction, MemoryOperand, Operand, OperandKind};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    ConfigError, CpuConfig, CpuContext, ImmediatePolicy, NullTraceSink, ScalePolicy, StepOutcome,
    TraceEvent, TraceSink,
};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, resolve_effective_address, step_one, ExecuteState,
    PendingWrite, ARCHITECTURAL_SCALES,
};

/// Register and memory dump rendering.
pub mod dump;
pub use dump::{
    format_memory_dump, format_register_dump, MemoryDump, RegisterDump, DEFAULT_REGISTER_MASK,
};

#[cfg(test)]
use proptest as _;
