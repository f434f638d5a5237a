//! Move execution pipeline.
//!
//! An instruction runs in two phases:
//! 1. Stage: resolve the source value and validate the destination
//! 2. Commit: perform the single register or memory write
//!
//! Faults are precise: staging never mutates the context, so a faulting
//! instruction leaves registers and memory exactly as they were.

#![allow(clippy::cast_sign_loss)]

mod address;

pub use address::{resolve_effective_address, ARCHITECTURAL_SCALES};

use crate::{
    validate_access, CpuContext, FaultCode, ImmediatePolicy, Instruction, Operand, OperandKind,
    OperandWidth, Register, RunState, StepOutcome, TraceEvent, TraceSink,
};

/// Destination selected during staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingWrite {
    /// Width-aware register write.
    Register(Register),
    /// Little-endian memory write at a bounds-checked address.
    Memory {
        /// Effective address.
        address: i64,
    },
}

/// Side effects staged for one instruction, applied by [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecuteState {
    /// Transfer width.
    pub width: OperandWidth,
    /// Kind of the source operand.
    pub source_kind: OperandKind,
    /// Source value truncated to `width`.
    pub source_value: u64,
    /// Where the value lands.
    pub write: PendingWrite,
}

/// Resolves the source and validates the destination without touching the
/// context.
///
/// # Errors
///
/// - [`FaultCode::ImmediateOverflow`] for an oversized immediate under
///   [`ImmediatePolicy::Strict`]
/// - [`FaultCode::InvalidScale`] from address resolution
/// - [`FaultCode::OutOfBoundsAccess`] when either memory operand does not fit
/// - [`FaultCode::InvalidDestination`] for an immediate destination
pub fn execute_instruction(
    instr: &Instruction,
    ctx: &CpuContext,
) -> Result<ExecuteState, FaultCode> {
    let width = instr.width;
    let source_value = read_source(&instr.source, width, ctx)?;

    let write = match instr.destination {
        Operand::Register(reg) => PendingWrite::Register(reg),
        Operand::Memory(mem) => {
            let address =
                resolve_effective_address(&mem, &ctx.registers, ctx.config.scale_policy)?;
            validate_access(address, width, ctx.memory.len())?;
            PendingWrite::Memory { address }
        }
        Operand::Immediate(_) => return Err(FaultCode::InvalidDestination),
    };

    Ok(ExecuteState {
        width,
        source_kind: instr.source.kind(),
        source_value,
        write,
    })
}

fn read_source(source: &Operand, width: OperandWidth, ctx: &CpuContext) -> Result<u64, FaultCode> {
    match *source {
        Operand::Register(reg) => Ok(ctx.registers.read(reg, width)),
        Operand::Immediate(value) => {
            if ctx.config.immediate_policy == ImmediatePolicy::Strict
                && !width.fits_immediate(value)
            {
                return Err(FaultCode::ImmediateOverflow {
                    value,
                    width: width.bytes(),
                });
            }
            Ok(value as u64 & width.mask())
        }
        Operand::Memory(mem) => {
            let address =
                resolve_effective_address(&mem, &ctx.registers, ctx.config.scale_policy)?;
            ctx.memory.read(address, width)
        }
    }
}

/// Applies a staged instruction and bumps the retire counter.
///
/// # Errors
///
/// Returns [`FaultCode::OutOfBoundsAccess`] only if the memory region shrank
/// between staging and commit.
pub fn commit_execution(ctx: &mut CpuContext, exec: &ExecuteState) -> Result<(), FaultCode> {
    match exec.write {
        PendingWrite::Register(reg) => ctx.registers.write(reg, exec.width, exec.source_value),
        PendingWrite::Memory { address } => {
            ctx.memory.write(address, exec.width, exec.source_value)?;
        }
    }
    ctx.retired = ctx.retired.wrapping_add(1);
    Ok(())
}

/// Runs one instruction with run-state latching and optional tracing.
///
/// A latched context refuses to run and reports the latched fault. Recoverable
/// faults produce [`StepOutcome::Rejected`] and leave the context running;
/// anything else latches.
pub fn step_one(ctx: &mut CpuContext, instr: &Instruction, trace: &mut dyn TraceSink) -> StepOutcome {
    if let RunState::FaultLatched(cause) = ctx.run_state {
        return StepOutcome::Fault { cause };
    }

    let tracing = ctx.config.tracing_enabled;
    let mut emit = |event| {
        if tracing {
            trace.on_event(event);
        }
    };

    emit(TraceEvent::InstructionStart { width: instr.width });

    let result = execute_instruction(instr, ctx).and_then(|exec| {
        let before = match exec.write {
            PendingWrite::Register(reg) => ctx.registers.get(reg),
            PendingWrite::Memory { .. } => 0,
        };
        commit_execution(ctx, &exec)?;
        Ok((exec, before))
    });

    match result {
        Ok((exec, before)) => {
            emit(TraceEvent::SourceRead {
                operand: exec.source_kind,
                value: exec.source_value,
            });
            emit(match exec.write {
                PendingWrite::Register(register) => TraceEvent::RegisterWrite {
                    register,
                    width: exec.width,
                    before,
                    after: ctx.registers.get(register),
                },
                PendingWrite::Memory { address } => TraceEvent::MemoryWrite {
                    address,
                    width: exec.width,
                    value: exec.source_value,
                },
            });
            StepOutcome::Retired
        }
        Err(cause) => {
            emit(TraceEvent::FaultRaised { cause });
            if cause.is_recoverable() {
                StepOutcome::Rejected { cause }
            } else {
                ctx.run_state = RunState::FaultLatched(cause);
                StepOutcome::Fault { cause }
            }
        }
    }
}
