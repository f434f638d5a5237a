//! Property coverage for register width rules, memory bounds and addressing.

use movcpu_core::{
    resolve_effective_address, CpuContext, FaultCode, Instruction, MemoryOperand, MemoryStore,
    NullTraceSink, Operand, OperandWidth, Register, RegisterFile, RunState, ScalePolicy,
    StepOutcome, ARCHITECTURAL_SCALES,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn any_width() -> impl Strategy<Value = OperandWidth> {
    prop::sample::select(OperandWidth::ALL.to_vec())
}

fn any_register() -> impl Strategy<Value = Register> {
    prop::sample::select(Register::ALL.to_vec())
}

proptest! {
    #[test]
    fn property_memory_write_then_read_returns_low_bytes(
        width in any_width(),
        value in any::<u64>(),
        address in 0_i64..4088,
    ) {
        let mut memory = MemoryStore::default();
        prop_assert!(memory.write(address, width, value).is_ok());
        prop_assert_eq!(memory.read(address, width), Ok(value & width.mask()));
    }

    #[test]
    fn property_register_write_then_read_returns_low_bytes(
        width in any_width(),
        reg in any_register(),
        initial in any::<u64>(),
        value in any::<u64>(),
    ) {
        let mut regs = RegisterFile::default();
        regs.set(reg, initial);
        regs.write(reg, width, value);
        prop_assert_eq!(regs.read(reg, width), value & width.mask());
    }

    #[test]
    fn property_long_writes_zero_extend_and_narrow_writes_merge(
        width in any_width(),
        reg in any_register(),
        initial in any::<u64>(),
        value in any::<u64>(),
    ) {
        let mut regs = RegisterFile::default();
        regs.set(reg, initial);
        regs.write(reg, width, value);

        let expected = match width {
            OperandWidth::Byte | OperandWidth::Word => {
                (initial & !width.mask()) | (value & width.mask())
            }
            OperandWidth::Long => value & 0xFFFF_FFFF,
            OperandWidth::Quad => value,
        };
        prop_assert_eq!(regs.get(reg), expected);
    }

    #[test]
    fn property_writes_touch_only_the_target_register(
        width in any_width(),
        reg in any_register(),
        value in any::<u64>(),
    ) {
        let mut regs = RegisterFile::default();
        for other in Register::ALL {
            regs.set(other, 0x0101_0101_0101_0101);
        }
        regs.write(reg, width, value);

        for other in Register::ALL.into_iter().filter(|other| *other != reg) {
            prop_assert_eq!(regs.get(other), 0x0101_0101_0101_0101);
        }
    }

    #[test]
    fn property_out_of_bounds_store_is_fatal_and_leaves_memory(
        width in any_width(),
        address in prop_oneof![i64::MIN..0, 4090_i64..i64::MAX],
        value in any::<u64>(),
    ) {
        let mut ctx = CpuContext::default().with_register(Register::Rax, value);
        let before = ctx.memory.clone();
        let instr = Instruction::new(
            width,
            Operand::Register(Register::Rax),
            Operand::Memory(MemoryOperand::absolute(address)),
        );
        let in_bounds = usize::try_from(address)
            .is_ok_and(|start| start + width.byte_len() <= ctx.memory.len());
        prop_assume!(!in_bounds);

        let cause = FaultCode::OutOfBoundsAccess { address, width: width.bytes() };
        prop_assert_eq!(step_one(&mut ctx, &instr), StepOutcome::Fault { cause });
        prop_assert_eq!(&ctx.memory, &before);
        prop_assert_eq!(ctx.run_state, RunState::FaultLatched(cause));
    }

    #[test]
    fn property_effective_address_is_wrapping_sum(
        displacement in any::<i64>(),
        base in any::<u64>(),
        index in any::<u64>(),
        scale_slot in 0_usize..4,
    ) {
        let scale = ARCHITECTURAL_SCALES[scale_slot];
        let mut regs = RegisterFile::default();
        regs.set(Register::Rsi, base);
        regs.set(Register::Rdi, index);
        let mem = MemoryOperand::indexed(displacement, Some(Register::Rsi), Register::Rdi, scale);

        let expected = displacement
            .wrapping_add(i64::from_ne_bytes(base.to_ne_bytes()))
            .wrapping_add(i64::from_ne_bytes(index.to_ne_bytes()).wrapping_mul(i64::from(scale)));
        prop_assert_eq!(
            resolve_effective_address(&mem, &regs, ScalePolicy::Architectural),
            Ok(expected)
        );
    }

    #[test]
    fn property_non_architectural_scales_are_rejected(scale in any::<u8>()) {
        prop_assume!(!ARCHITECTURAL_SCALES.contains(&scale));
        let mem = MemoryOperand::indexed(0, None, Register::Rax, scale);

        prop_assert_eq!(
            resolve_effective_address(&mem, &RegisterFile::default(), ScalePolicy::Architectural),
            Err(FaultCode::InvalidScale { scale })
        );
        prop_assert!(
            resolve_effective_address(&mem, &RegisterFile::default(), ScalePolicy::Unrestricted)
                .is_ok()
        );
    }
}

fn step_one(ctx: &mut CpuContext, instr: &Instruction) -> StepOutcome {
    movcpu_core::step_one(ctx, instr, &mut NullTraceSink)
}

#[test]
fn register_to_register_move_copies_value() {
    let mut ctx = CpuContext::default().with_register(Register::R12, 0xFEED_FACE_CAFE_BEEF);
    let instr = Instruction::new(
        OperandWidth::Quad,
        Operand::Register(Register::R12),
        Operand::Register(Register::R13),
    );

    assert_eq!(step_one(&mut ctx, &instr), StepOutcome::Retired);
    assert_eq!(ctx.registers.get(Register::R13), 0xFEED_FACE_CAFE_BEEF);
    assert_eq!(ctx.registers.get(Register::R12), 0xFEED_FACE_CAFE_BEEF);
}
