//! Text rendering of register and memory contents for diagnostic output.

use std::fmt;

use crate::{MemoryStore, Register, RegisterFile};

/// Register mask selecting `rax`, `rcx` and `rdx`.
pub const DEFAULT_REGISTER_MASK: u16 = 0b0000_0000_0000_1101;

/// Display adapter listing the registers selected by a bit mask.
///
/// Bit `i` of the mask selects the register with index `i`.
#[derive(Debug, Clone, Copy)]
pub struct RegisterDump<'a> {
    registers: &'a RegisterFile,
    mask: u16,
}

impl<'a> RegisterDump<'a> {
    /// Wraps `registers` for rendering.
    #[must_use]
    pub const fn new(registers: &'a RegisterFile, mask: u16) -> Self {
        Self { registers, mask }
    }
}

impl fmt::Display for RegisterDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reg in Register::ALL {
            if (self.mask >> reg.index()) & 1 == 1 {
                writeln!(f, "{reg}:  {:016X}", self.registers.get(reg))?;
            }
        }
        Ok(())
    }
}

/// Display adapter rendering a `rows` x `cols` grid of memory bytes from
/// address zero.
///
/// Row `r` starts at offset `r * cols`. Cells past the end of the store are
/// left out, and so are rows that would be empty.
#[derive(Debug, Clone, Copy)]
pub struct MemoryDump<'a> {
    memory: &'a MemoryStore,
    rows: usize,
    cols: usize,
}

impl<'a> MemoryDump<'a> {
    /// Wraps `memory` for rendering.
    #[must_use]
    pub const fn new(memory: &'a MemoryStore, rows: usize, cols: usize) -> Self {
        Self { memory, rows, cols }
    }
}

impl fmt::Display for MemoryDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "      ")?;
        for col in 0..self.cols {
            write!(f, "+{col}    ")?;
        }
        writeln!(f)?;

        let bytes = self.memory.as_bytes();
        for row in 0..self.rows {
            let Some(start) = row.checked_mul(self.cols).filter(|start| *start < bytes.len())
            else {
                break;
            };
            let end = start.saturating_add(self.cols).min(bytes.len());

            write!(f, "0x{start:02X}: ")?;
            for byte in &bytes[start..end] {
                write!(f, "0x{byte:02X}  ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders one `%name:  VALUE` line per register selected in `mask`.
#[must_use]
pub fn format_register_dump(registers: &RegisterFile, mask: u16) -> String {
    RegisterDump::new(registers, mask).to_string()
}

/// Renders a `rows` x `cols` hex grid of memory starting at address zero.
#[must_use]
pub fn format_memory_dump(memory: &MemoryStore, rows: usize, cols: usize) -> String {
    MemoryDump::new(memory, rows, cols).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_memory_dump, format_register_dump, DEFAULT_REGISTER_MASK};
    use crate::{MemoryStore, Register, RegisterFile, SAMPLE_MEMORY_IMAGE};

    #[test]
    fn register_dump_follows_mask_order() {
        let mut regs = RegisterFile::default();
        regs.set(Register::Rax, 8);
        regs.set(Register::Rcx, 3);
        regs.set(Register::R15, 0xDEAD_BEEF);

        assert_eq!(
            format_register_dump(&regs, DEFAULT_REGISTER_MASK),
            "%rax:  0000000000000008\n%rcx:  0000000000000003\n%rdx:  0000000000000000\n"
        );
        assert_eq!(
            format_register_dump(&regs, 1 << 15),
            "%r15:  00000000DEADBEEF\n"
        );
        assert_eq!(format_register_dump(&regs, 0), "");
    }

    #[test]
    fn memory_dump_renders_header_and_rows() {
        let mut memory = MemoryStore::new(64).expect("size within limit");
        memory.load(0, &SAMPLE_MEMORY_IMAGE).expect("sample fits");

        let dump = format_memory_dump(&memory, 2, 4);
        assert_eq!(
            dump,
            "      +0    +1    +2    +3    \n\
             0x00: 0xE0  0xEA  0x64  0xD4  \n\
             0x04: 0xCE  0x66  0x55  0x7C  \n"
        );
    }

    #[test]
    fn memory_dump_row_offsets_scale_with_columns() {
        let memory = MemoryStore::new(64).expect("size within limit");
        let dump = format_memory_dump(&memory, 3, 16);
        let offsets: Vec<&str> = dump.lines().skip(1).map(|line| &line[..5]).collect();

        assert_eq!(offsets, ["0x00:", "0x10:", "0x20:"]);
    }

    #[test]
    fn memory_dump_clips_to_buffer() {
        let memory = MemoryStore::new(6).expect("size within limit");
        let dump = format_memory_dump(&memory, 4, 4);
        let rows: Vec<&str> = dump.lines().collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], "0x04: 0x00  0x00  ");
    }
}
