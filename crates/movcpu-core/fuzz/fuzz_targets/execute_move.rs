#![no_main]

use libfuzzer_sys::fuzz_target;
use movcpu_core::{
    validate_access, CpuConfig, CpuContext, ImmediatePolicy, Instruction, MemoryOperand,
    NullTraceSink, Operand, OperandWidth, Register, ScalePolicy, StepOutcome,
};

fn register(byte: u8) -> Register {
    Register::ALL[usize::from(byte) % Register::ALL.len()]
}

fn operand(data: &[u8]) -> Operand {
    let mut disp = [0_u8; 8];
    disp.copy_from_slice(&data[2..10]);
    let displacement = i64::from_le_bytes(disp);

    match data[0] % 3 {
        0 => Operand::Register(register(data[1])),
        1 => Operand::Immediate(displacement),
        _ => Operand::Memory(MemoryOperand {
            displacement,
            base: (data[1] & 0x10 != 0).then(|| register(data[1])),
            index: (data[1] & 0x20 != 0).then(|| register(data[1] >> 2)),
            scale: data[10],
        }),
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 24 {
        return;
    }

    let width = OperandWidth::ALL[usize::from(data[0]) % OperandWidth::ALL.len()];
    let config = CpuConfig {
        memory_bytes: usize::from(data[1]) * 16,
        preload_sample: data[1] & 1 == 1,
        scale_policy: if data[2] & 1 == 0 {
            ScalePolicy::Architectural
        } else {
            ScalePolicy::Unrestricted
        },
        immediate_policy: if data[2] & 2 == 0 {
            ImmediatePolicy::Strict
        } else {
            ImmediatePolicy::Truncate
        },
        tracing_enabled: data[2] & 4 != 0,
    };
    let instr = Instruction::new(width, operand(&data[2..13]), operand(&data[13..24]));

    let Ok(mut ctx) = CpuContext::with_config(&config) else {
        return;
    };
    let mut events = Vec::new();
    let _ = movcpu_core::step_one(&mut ctx, &instr, &mut events);
    let latched = ctx.run_state.latched_fault();
    let second = movcpu_core::step_one(&mut ctx, &instr, &mut NullTraceSink);
    if let Some(cause) = latched {
        assert_eq!(second, StepOutcome::Fault { cause });
    }

    let address = i64::from(data[3]) - 128;
    let _ = validate_access(address, width, ctx.memory.len());
});
