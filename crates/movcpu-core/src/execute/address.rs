//! Effective-address computation for memory operands.

use crate::{FaultCode, MemoryOperand, RegisterFile, ScalePolicy};

/// Index scale factors encodable on x86-64.
pub const ARCHITECTURAL_SCALES: [u8; 4] = [1, 2, 4, 8];

/// Computes `displacement + base + index * scale` with wrapping signed
/// 64-bit arithmetic.
///
/// Absent registers contribute zero. Register contents are reinterpreted as
/// signed. No bounds checking happens here; the memory store owns that.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidScale`] when an index register is present and
/// `policy` is [`ScalePolicy::Architectural`] with a scale outside
/// [`ARCHITECTURAL_SCALES`].
#[allow(clippy::cast_possible_wrap)]
pub fn resolve_effective_address(
    mem: &MemoryOperand,
    regs: &RegisterFile,
    policy: ScalePolicy,
) -> Result<i64, FaultCode> {
    let base = mem.base.map_or(0, |reg| regs.get(reg) as i64);

    let scaled_index = match mem.index {
        None => 0,
        Some(reg) => {
            if policy == ScalePolicy::Architectural && !ARCHITECTURAL_SCALES.contains(&mem.scale) {
                return Err(FaultCode::InvalidScale { scale: mem.scale });
            }
            (regs.get(reg) as i64).wrapping_mul(i64::from(mem.scale))
        }
    };

    Ok(mem
        .displacement
        .wrapping_add(base)
        .wrapping_add(scaled_index))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::resolve_effective_address;
    use crate::{FaultCode, MemoryOperand, Register, RegisterFile, ScalePolicy};

    fn regs() -> RegisterFile {
        let mut regs = RegisterFile::default();
        regs.set(Register::Rax, 0x3);
        regs.set(Register::Rcx, 0x10);
        regs
    }

    #[test]
    fn unrestricted_scale_matches_shorthand_reference_arithmetic() {
        let mem = MemoryOperand::indexed(2, Some(Register::Rcx), Register::Rax, 3);

        assert_eq!(
            resolve_effective_address(&mem, &regs(), ScalePolicy::Unrestricted),
            Ok(0x1B)
        );
    }

    #[test]
    fn architectural_policy_rejects_scale_three() {
        let mem = MemoryOperand::indexed(2, Some(Register::Rcx), Register::Rax, 3);

        assert_eq!(
            resolve_effective_address(&mem, &regs(), ScalePolicy::Architectural),
            Err(FaultCode::InvalidScale { scale: 3 })
        );
    }

    #[rstest]
    #[case(1, 0x15)]
    #[case(2, 0x18)]
    #[case(4, 0x1E)]
    #[case(8, 0x2A)]
    fn architectural_scales_are_applied(#[case] scale: u8, #[case] expected: i64) {
        let mem = MemoryOperand::indexed(2, Some(Register::Rcx), Register::Rax, scale);

        assert_eq!(
            resolve_effective_address(&mem, &regs(), ScalePolicy::Architectural),
            Ok(expected)
        );
    }

    #[test]
    fn missing_registers_contribute_zero() {
        let absolute = MemoryOperand::absolute(40);
        assert_eq!(
            resolve_effective_address(&absolute, &regs(), ScalePolicy::Architectural),
            Ok(40)
        );

        let index_only = MemoryOperand::indexed(0, None, Register::Rax, 8);
        assert_eq!(
            resolve_effective_address(&index_only, &regs(), ScalePolicy::Architectural),
            Ok(24)
        );
    }

    #[test]
    fn scale_is_ignored_without_index() {
        let mem = MemoryOperand {
            displacement: 1,
            base: Some(Register::Rcx),
            index: None,
            scale: 3,
        };

        assert_eq!(
            resolve_effective_address(&mem, &regs(), ScalePolicy::Architectural),
            Ok(0x11)
        );
    }

    #[test]
    fn negative_displacement_and_wrapping_registers() {
        let mut regs = RegisterFile::default();
        regs.set(Register::Rbp, u64::MAX);

        let mem = MemoryOperand::based(-8, Register::Rbp);
        assert_eq!(
            resolve_effective_address(&mem, &regs, ScalePolicy::Architectural),
            Ok(-9)
        );
    }
}
