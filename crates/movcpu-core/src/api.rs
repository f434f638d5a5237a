//! Public host-facing API for embedding the move core.

use thiserror::Error;

use crate::{
    FaultCode, Instruction, MemoryStore, OperandKind, OperandWidth, Register, RegisterFile,
    RunState, DEFAULT_MEMORY_BYTES, SAMPLE_MEMORY_IMAGE,
};

/// Configuration rejected while building a [`CpuContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Requested memory size is above [`crate::MAX_MEMORY_BYTES`].
    #[error("memory size of {requested} bytes exceeds the {max}-byte limit")]
    MemoryTooLarge {
        /// Size asked for in bytes.
        requested: usize,
        /// Largest accepted size in bytes.
        max: usize,
    },
}

/// Which index scale factors the address resolver accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ScalePolicy {
    /// Only 1, 2, 4 and 8, as encodable on x86-64.
    #[default]
    Architectural,
    /// Any 8-bit multiplier.
    Unrestricted,
}

/// How immediates wider than the instruction width are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ImmediatePolicy {
    /// Reject with [`FaultCode::ImmediateOverflow`].
    #[default]
    Strict,
    /// Keep the low bytes silently.
    Truncate,
}

/// Top-level immutable configuration for a CPU context.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuConfig {
    /// Size of the flat memory region in bytes.
    pub memory_bytes: usize,
    /// Loads [`SAMPLE_MEMORY_IMAGE`] at address zero.
    pub preload_sample: bool,
    /// Accepted index scale factors.
    pub scale_policy: ScalePolicy,
    /// Oversized immediate handling.
    pub immediate_policy: ImmediatePolicy,
    /// Enables trace callback dispatch in [`crate::step_one`].
    pub tracing_enabled: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            memory_bytes: DEFAULT_MEMORY_BYTES,
            preload_sample: false,
            scale_policy: ScalePolicy::Architectural,
            immediate_policy: ImmediatePolicy::Strict,
            tracing_enabled: false,
        }
    }
}

/// Register file, memory and run state owned by one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuContext {
    /// Configuration the context was built with.
    pub config: CpuConfig,
    /// General-purpose registers.
    pub registers: RegisterFile,
    /// Flat memory region.
    pub memory: MemoryStore,
    /// Current execution state.
    pub run_state: RunState,
    /// Number of instructions retired since construction or reset.
    pub retired: u64,
}

impl Default for CpuContext {
    fn default() -> Self {
        Self::from_parts(&CpuConfig::default(), MemoryStore::default())
    }
}

impl CpuContext {
    /// Creates a context with zeroed registers and memory sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MemoryTooLarge`] when `config.memory_bytes`
    /// exceeds [`crate::MAX_MEMORY_BYTES`].
    pub fn with_config(config: &CpuConfig) -> Result<Self, ConfigError> {
        let memory = MemoryStore::new(config.memory_bytes)?;
        Ok(Self::from_parts(config, memory))
    }

    fn from_parts(config: &CpuConfig, mut memory: MemoryStore) -> Self {
        if config.preload_sample {
            memory.load_prefix(&SAMPLE_MEMORY_IMAGE);
        }

        Self {
            config: config.clone(),
            registers: RegisterFile::default(),
            memory,
            run_state: RunState::Running,
            retired: 0,
        }
    }

    /// Seeds a register with a full 64-bit value.
    #[must_use]
    pub fn with_register(mut self, reg: Register, value: u64) -> Self {
        self.registers.set(reg, value);
        self
    }

    /// Stages and commits one instruction without run-state latching.
    ///
    /// # Errors
    ///
    /// Returns the fault raised while resolving operands or validating the
    /// destination. The context is unchanged on error.
    pub fn execute(&mut self, instr: &Instruction) -> Result<(), FaultCode> {
        let exec = crate::execute_instruction(instr, self)?;
        crate::commit_execution(self, &exec)
    }

    /// Clears registers, latched faults and the retire counter. Memory is
    /// kept as is.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::default();
        self.run_state = RunState::Running;
        self.retired = 0;
    }
}

/// Output status from one instruction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired and its write is visible.
    Retired,
    /// Instruction was refused without side effects; execution may continue.
    Rejected {
        /// Recoverable fault that refused the instruction.
        cause: FaultCode,
    },
    /// Fatal fault; the context is latched and refuses further steps.
    Fault {
        /// Fault that stopped execution.
        cause: FaultCode,
    },
}

/// Trace events emitted in execution order when tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// An instruction is about to be resolved.
    InstructionStart {
        /// Instruction width.
        width: OperandWidth,
    },
    /// Source operand resolved to a concrete value.
    SourceRead {
        /// Kind of operand the value came from.
        operand: OperandKind,
        /// Value truncated to the instruction width.
        value: u64,
    },
    /// A register was written.
    RegisterWrite {
        /// Destination register.
        register: Register,
        /// Write width.
        width: OperandWidth,
        /// Full register value before the write.
        before: u64,
        /// Full register value after the write.
        after: u64,
    },
    /// Memory was written.
    MemoryWrite {
        /// Effective address.
        address: i64,
        /// Write width.
        width: OperandWidth,
        /// Value stored little-endian.
        value: u64,
    },
    /// A fault was raised.
    FaultRaised {
        /// Raised fault.
        cause: FaultCode,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Trace sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
