//! Run session: feeds source lines through the parser and the executor.

use std::path::PathBuf;

use movcpu_core::{
    resolve_effective_address, step_one, validate_access, CpuContext, FaultCode, Instruction,
    Operand, StepOutcome, TraceSink,
};

use crate::errors::{ErrorCollection, LineError, SourceLoc};
use crate::parser::{parse_line, OperandColumns, ParsedLine};
use crate::source::SourceContent;

/// Result of feeding one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Nothing to execute.
    Blank,
    /// The instruction retired.
    Executed,
    /// The line was rejected; the run continues.
    Skipped(LineError),
    /// A fatal fault stopped the run; the context stays latched.
    Halted(LineError),
}

/// Summary of a run over a whole source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Instructions retired.
    pub executed: usize,
    /// Lines skipped with recoverable errors, in source order.
    pub skipped: ErrorCollection,
    /// The fault that stopped the run, if any.
    pub fatal: Option<LineError>,
}

impl RunReport {
    /// Returns `true` when every line was consumed without a fatal fault.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.fatal.is_none()
    }
}

/// CPU context plus the label used when reporting line errors.
#[derive(Debug, Clone)]
pub struct Session {
    context: CpuContext,
    file: PathBuf,
}

impl Session {
    /// Creates a session around `context`, labelling errors with `file`.
    #[must_use]
    pub fn new(context: CpuContext, file: impl Into<PathBuf>) -> Self {
        Self {
            context,
            file: file.into(),
        }
    }

    /// Read access to registers and memory.
    #[must_use]
    pub const fn context(&self) -> &CpuContext {
        &self.context
    }

    /// Consumes the session, returning the context.
    #[must_use]
    pub fn into_context(self) -> CpuContext {
        self.context
    }

    /// Parses and executes one line.
    ///
    /// Parse errors and recoverable faults skip the line. Any other fault
    /// latches the context, and every later line reports the same fault.
    pub fn feed_line(
        &mut self,
        text: &str,
        line_number: usize,
        trace: &mut dyn TraceSink,
    ) -> LineOutcome {
        let (instruction, columns) = match parse_line(text, line_number) {
            Ok(ParsedLine::Blank) => return LineOutcome::Blank,
            Ok(ParsedLine::Instruction {
                instruction,
                columns,
                ..
            }) => (instruction, columns),
            Err(error) => return LineOutcome::Skipped(LineError::from_parse(self.file.clone(), error)),
        };

        let latched = self.context.run_state.latched_fault().is_some();
        let outcome = step_one(&mut self.context, &instruction, trace);
        let location = |cause| {
            let column = if latched {
                columns.mnemonic
            } else {
                self.fault_column(&instruction, columns, cause)
            };
            SourceLoc::new(self.file.clone(), line_number, column)
        };

        match outcome {
            StepOutcome::Retired => LineOutcome::Executed,
            StepOutcome::Rejected { cause } => {
                LineOutcome::Skipped(LineError::from_fault(location(cause), cause))
            }
            StepOutcome::Fault { cause } => {
                LineOutcome::Halted(LineError::from_fault(location(cause), cause))
            }
        }
    }

    /// Column of the operand responsible for `cause`. A faulting step leaves
    /// the context unchanged, so the source is re-resolved to tell which
    /// memory operand faulted.
    fn fault_column(&self, instr: &Instruction, columns: OperandColumns, cause: FaultCode) -> usize {
        match cause {
            FaultCode::ImmediateOverflow { .. } => columns.source,
            FaultCode::InvalidDestination => columns.destination,
            FaultCode::InvalidOperandWidth { .. } => columns.mnemonic,
            FaultCode::OutOfBoundsAccess { .. } | FaultCode::InvalidScale { .. } => {
                if self.source_faults(instr) {
                    columns.source
                } else {
                    columns.destination
                }
            }
        }
    }

    fn source_faults(&self, instr: &Instruction) -> bool {
        let Operand::Memory(mem) = instr.source else {
            return false;
        };
        let ctx = &self.context;
        resolve_effective_address(&mem, &ctx.registers, ctx.config.scale_policy)
            .and_then(|address| validate_access(address, instr.width, ctx.memory.len()))
            .is_err()
    }

    /// Runs every line of `source` in order, stopping at the first fatal
    /// fault. Errors are labelled with the source's path.
    pub fn run_source(&mut self, source: &SourceContent, trace: &mut dyn TraceSink) -> RunReport {
        self.file = PathBuf::from(&source.file_path);
        let mut report = RunReport::default();

        for line in &source.lines {
            match self.feed_line(&line.text, line.original_line, trace) {
                LineOutcome::Blank => {}
                LineOutcome::Executed => report.executed += 1,
                LineOutcome::Skipped(error) => report.skipped.push(error),
                LineOutcome::Halted(error) => {
                    report.fatal = Some(error);
                    break;
                }
            }
        }

        report
    }
}
