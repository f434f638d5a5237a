//! Line parser for AT&T-syntax `mov` instructions.
//!
//! One source line produces either a blank result or a single executable
//! [`Instruction`]. The grammar is:
//!
//! ```text
//! line     := ws* (mnemonic ws+ operand (ws* ',' ws* operand)*)? ws*
//! operand  := '%' reg | '$' int | int? '(' ws* ('%' reg)? ws* (',' ws* '%' reg ws* (',' ws* scale)?)? ws* ')'
//!           | int
//! int      := ('-' | '+')? (digits | '0x' hexdigits)
//! ```

use movcpu_core::{Instruction, MemoryOperand, Operand, Register};
use thiserror::Error;

use crate::mnemonic::{match_mnemonic, Mnemonic};

/// Number of operands every `mov` form takes.
pub const OPERAND_COUNT: usize = 2;

/// A successfully parsed source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine {
    /// Empty or whitespace-only line.
    Blank,
    /// Executable instruction.
    Instruction {
        /// Mnemonic as resolved from the table.
        mnemonic: Mnemonic,
        /// Width and operands ready for the executor.
        instruction: Instruction,
        /// Where each operand starts on the line.
        columns: OperandColumns,
    },
}

/// 1-indexed columns of the mnemonic and both operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandColumns {
    /// Column of the mnemonic.
    pub mnemonic: usize,
    /// Column of the source operand.
    pub source: usize,
    /// Column of the destination operand.
    pub destination: usize,
}

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed byte column.
    pub column: usize,
}

/// Parse error with source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// Location of the error.
    pub location: SourceLocation,
    /// Kind of parse error.
    pub kind: ParseErrorKind,
}

/// Classification of parse errors. Every kind is recoverable: the line is
/// skipped and execution continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Mnemonic token is not in the table.
    #[error("unknown instruction: {0}")]
    UnknownInstruction(String),
    /// Operand text does not follow the operand grammar.
    #[error("malformed operand: {0}")]
    MalformedOperand(String),
    /// Unexpected text after the last operand.
    #[error("trailing garbage after operand: {0}")]
    TrailingGarbage(String),
    /// Operand count differs from [`OPERAND_COUNT`].
    #[error("expected 2 operands, found {found}")]
    WrongOperandCount {
        /// Operands actually present.
        found: usize,
    },
}

/// Result of parsing a single line.
pub type ParseResult = Result<ParsedLine, ParseError>;

/// Parses a source line into a [`ParsedLine`].
///
/// # Errors
///
/// Returns a [`ParseError`] for unknown mnemonics, malformed operands,
/// trailing text or a wrong operand count. Immediate destinations are
/// reported as malformed operands.
pub fn parse_line(line: &str, line_number: usize) -> ParseResult {
    let mut cursor = Cursor::new(line, line_number);
    cursor.skip_whitespace();
    if cursor.at_end() {
        return Ok(ParsedLine::Blank);
    }

    let mnemonic_column = cursor.column();
    let token = cursor.take_while(|byte| !byte.is_ascii_whitespace());
    let mnemonic = match_mnemonic(token).ok_or_else(|| {
        cursor.error_at(
            mnemonic_column,
            ParseErrorKind::UnknownInstruction(token.to_string()),
        )
    })?;

    let operands = cursor.operand_list()?;
    let [(source, source_column), (destination, destination_column)] = operands[..] else {
        let column = operands
            .get(OPERAND_COUNT)
            .map_or_else(|| cursor.column(), |(_, column)| *column);
        return Err(cursor.error_at(
            column,
            ParseErrorKind::WrongOperandCount {
                found: operands.len(),
            },
        ));
    };

    if let Operand::Immediate(value) = destination {
        return Err(cursor.error_at(
            destination_column,
            ParseErrorKind::MalformedOperand(format!("immediate ${value} cannot be a destination")),
        ));
    }

    Ok(ParsedLine::Instruction {
        mnemonic,
        instruction: Instruction::new(mnemonic.width(), source, destination),
        columns: OperandColumns {
            mnemonic: mnemonic_column,
            source: source_column,
            destination: destination_column,
        },
    })
}

/// Byte cursor over one line.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    const fn new(text: &'a str, line: usize) -> Self {
        Self { text, pos: 0, line }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    const fn bump(&mut self) {
        self.pos += 1;
    }

    const fn column(&self) -> usize {
        self.pos + 1
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn take_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(|byte| byte.is_ascii_whitespace());
    }

    const fn error_at(&self, column: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            location: SourceLocation {
                line: self.line,
                column,
            },
            kind,
        }
    }

    fn malformed(&self, column: usize, message: impl Into<String>) -> ParseError {
        self.error_at(column, ParseErrorKind::MalformedOperand(message.into()))
    }

    /// Next token up to a separator, for error messages.
    fn offending_token(&self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c == ',' || c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        &rest[..end]
    }

    fn operand_list(&mut self) -> Result<Vec<(Operand, usize)>, ParseError> {
        let mut operands = Vec::with_capacity(OPERAND_COUNT);
        self.skip_whitespace();
        if self.at_end() {
            return Ok(operands);
        }

        loop {
            self.skip_whitespace();
            let column = self.column();
            if self.at_end() {
                return Err(self.malformed(column, "missing operand after ','"));
            }
            operands.push((self.operand()?, column));

            self.skip_whitespace();
            match self.peek() {
                None => return Ok(operands),
                Some(b',') => self.bump(),
                Some(_) => {
                    return Err(self.error_at(
                        self.column(),
                        ParseErrorKind::TrailingGarbage(self.rest().trim_end().to_string()),
                    ));
                }
            }
        }
    }

    fn operand(&mut self) -> Result<Operand, ParseError> {
        match self.peek() {
            Some(b'%') => self.register().map(Operand::Register),
            Some(b'$') => {
                let column = self.column();
                self.bump();
                match self.integer()? {
                    Some(value) => Ok(Operand::Immediate(value)),
                    None => Err(self.malformed(
                        column,
                        format!("expected integer after '$', found `{}`", self.offending_token()),
                    )),
                }
            }
            _ => self.memory().map(Operand::Memory),
        }
    }

    fn register(&mut self) -> Result<Register, ParseError> {
        let column = self.column();
        self.bump();
        let name = self.take_while(|byte| byte.is_ascii_alphanumeric());
        Register::from_name(name)
            .ok_or_else(|| self.malformed(column, format!("unknown register %{name}")))
    }

    /// Parses an optionally signed decimal or `0x` hexadecimal literal.
    ///
    /// Returns `None` without consuming anything when no literal starts here.
    /// Literals outside the signed 64-bit range are malformed.
    fn integer(&mut self) -> Result<Option<i64>, ParseError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some(b'-') => {
                self.bump();
                true
            }
            Some(b'+') => {
                self.bump();
                false
            }
            _ => false,
        };

        let digits = self.take_while(|byte| byte.is_ascii_alphanumeric());
        if digits.is_empty() {
            if self.pos == start {
                return Ok(None);
            }
            return Err(self.malformed(start + 1, "expected digits after sign"));
        }

        let magnitude = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => digits.parse::<u64>(),
        };
        let literal = &self.text[start..self.pos];
        let invalid = || self.malformed(start + 1, format!("invalid integer `{literal}`"));
        let magnitude = magnitude.map_err(|_| invalid())?;

        let value = if negative {
            0_i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        };
        value.map(Some).ok_or_else(invalid)
    }

    fn memory(&mut self) -> Result<MemoryOperand, ParseError> {
        let column = self.column();
        let displacement = self.integer()?;

        if self.peek() != Some(b'(') {
            return match displacement {
                Some(displacement)
                    if self
                        .peek()
                        .is_none_or(|byte| byte == b',' || byte.is_ascii_whitespace()) =>
                {
                    Ok(MemoryOperand::absolute(displacement))
                }
                _ => Err(self.malformed(
                    self.column(),
                    format!("unexpected `{}`", self.offending_token()),
                )),
            };
        }
        self.bump();
        self.skip_whitespace();

        let base = match self.peek() {
            Some(b'%') => Some(self.register()?),
            _ => None,
        };
        self.skip_whitespace();

        let mut index = None;
        let mut scale = 1;
        if self.peek() == Some(b',') {
            self.bump();
            self.skip_whitespace();
            if self.peek() != Some(b'%') {
                return Err(self.malformed(self.column(), "expected index register"));
            }
            index = Some(self.register()?);
            self.skip_whitespace();

            if self.peek() == Some(b',') {
                self.bump();
                self.skip_whitespace();
                scale = self.scale()?;
                self.skip_whitespace();
            }
        }

        if self.peek() != Some(b')') {
            return Err(self.malformed(self.column(), "expected ')'"));
        }
        self.bump();

        if base.is_none() && index.is_none() {
            return Err(self.malformed(column, "memory reference names no register"));
        }

        Ok(MemoryOperand {
            displacement: displacement.unwrap_or(0),
            base,
            index,
            scale,
        })
    }

    fn scale(&mut self) -> Result<u8, ParseError> {
        let column = self.column();
        let digits = self.take_while(|byte| byte.is_ascii_digit());
        digits
            .parse::<u8>()
            .map_err(|_| self.malformed(column, format!("invalid scale `{digits}`")))
    }
}
