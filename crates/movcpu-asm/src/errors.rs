//! Line-level error reporting for a run over source text.
//!
//! Every error formats to stderr in the standard style:
//! ```text
//! program.s:10:5: error: message
//! ```

use std::fmt;
use std::path::PathBuf;

use movcpu_core::FaultCode;
use thiserror::Error;

use crate::parser::{ParseError, ParseErrorKind};

/// A source location for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLoc {
    /// File path, or a label such as `<stdin>`.
    pub file: PathBuf,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number (1 if unknown).
    pub column: usize,
}

impl SourceLoc {
    /// Creates a new source location.
    #[must_use]
    pub const fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// What went wrong on a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineErrorKind {
    /// The line did not parse.
    #[error(transparent)]
    Parse(ParseErrorKind),
    /// The executor refused the instruction.
    #[error(transparent)]
    Fault(FaultCode),
}

/// A line error with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: error: {kind}")]
pub struct LineError {
    /// The kind of error.
    pub kind: LineErrorKind,
    /// Where it happened.
    pub location: SourceLoc,
}

impl LineError {
    /// Wraps a parse error, keeping its line and column.
    #[must_use]
    pub fn from_parse(file: PathBuf, error: ParseError) -> Self {
        Self {
            kind: LineErrorKind::Parse(error.kind),
            location: SourceLoc::new(file, error.location.line, error.location.column),
        }
    }

    /// Wraps an executor fault raised by the instruction at `location`.
    #[must_use]
    pub const fn from_fault(location: SourceLoc, cause: FaultCode) -> Self {
        Self {
            kind: LineErrorKind::Fault(cause),
            location,
        }
    }

    /// Returns `true` when the error stops the run instead of skipping the
    /// line.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match &self.kind {
            LineErrorKind::Parse(_) => false,
            LineErrorKind::Fault(cause) => !cause.is_recoverable(),
        }
    }

    /// Formats the error for stderr output.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        self.to_string()
    }
}

/// A collection of multiple errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCollection {
    errors: Vec<LineError>,
}

impl ErrorCollection {
    /// Creates an empty error collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error to the collection.
    pub fn push(&mut self, error: LineError) {
        self.errors.push(error);
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns an iterator over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &LineError> {
        self.errors.iter()
    }

    /// Formats all errors for stderr output, one per line.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        self.errors
            .iter()
            .map(LineError::format_for_stderr)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorCollection {}

impl FromIterator<LineError> for ErrorCollection {
    fn from_iter<T: IntoIterator<Item = LineError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a LineError;
    type IntoIter = std::slice::Iter<'a, LineError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
