//! Instruction timing.
//!
//! Cycle counts depend on the operation and on the addressing modes
//! of its operands.  Constant-generator operands cost the same as
//! register operands.  These figures follow the cycle tables in the
//! MSP430x5xx/MSP430x6xx family user's guide.
use base::prelude::*;

/// Cycles taken to enter an interrupt handler.
pub const INTERRUPT_CYCLES: u32 = 6;
pub(crate) const JUMP_CYCLES: u32 = 2;
pub(crate) const RETI_CYCLES: u32 = 5;
pub(crate) const RET_CYCLES: u32 = 4;
pub(crate) const RETA_CYCLES: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceClass {
    Register,
    Indirect,
    AutoIncrement,
    Indexed,
}

fn source_class(op: &Operand) -> SourceClass {
    if op.is_register_like() {
        return SourceClass::Register;
    }
    match op.mode() {
        AddressingMode::Register => SourceClass::Register,
        AddressingMode::Indirect => SourceClass::Indirect,
        AddressingMode::IndirectAutoIncrement | AddressingMode::Immediate => {
            SourceClass::AutoIncrement
        }
        AddressingMode::Indexed | AddressingMode::Symbolic | AddressingMode::Absolute => {
            SourceClass::Indexed
        }
    }
}

/// Cycles for a Format I instruction without an extension prefix.
pub(crate) fn double_operand_cycles(src: &Operand, dst: &Operand) -> u32 {
    let to_pc = dst.mode() == AddressingMode::Register && dst.register_name() == Register::PC;
    let to_memory = dst.mode() != AddressingMode::Register;
    match (source_class(src), to_pc, to_memory) {
        (SourceClass::Register, _, true) => 4,
        (SourceClass::Register, true, _) => 2,
        (SourceClass::Register, _, _) => 1,
        (SourceClass::Indirect, _, true) => 5,
        (SourceClass::Indirect, _, _) => 2,
        (SourceClass::AutoIncrement, _, true) => 5,
        (SourceClass::AutoIncrement, true, _) => 3,
        (SourceClass::AutoIncrement, _, _) => 2,
        (SourceClass::Indexed, _, true) => 6,
        (SourceClass::Indexed, _, _) => 3,
    }
}

/// Cycles for a Format II instruction without an extension prefix.
pub(crate) fn single_operand_cycles(opcode: SingleOperandOpcode, op: &Operand) -> u32 {
    let class = source_class(op);
    match opcode {
        SingleOperandOpcode::Rrc
        | SingleOperandOpcode::Rra
        | SingleOperandOpcode::Swpb
        | SingleOperandOpcode::Sxt => match class {
            SourceClass::Register => 1,
            SourceClass::Indirect | SourceClass::AutoIncrement => 3,
            SourceClass::Indexed => 4,
        },
        SingleOperandOpcode::Push => match class {
            SourceClass::Register => 3,
            SourceClass::Indirect | SourceClass::AutoIncrement => 4,
            SourceClass::Indexed => 5,
        },
        SingleOperandOpcode::Call => match (class, op.mode()) {
            (SourceClass::Register | SourceClass::Indirect, _) => 4,
            (SourceClass::AutoIncrement, _) => 5,
            (SourceClass::Indexed, AddressingMode::Absolute) => 6,
            (SourceClass::Indexed, _) => 5,
        },
    }
}

/// Cycles for an instruction carrying an extension prefix, where
/// `repetitions` is the number of times a register-mode instruction
/// executes.
pub(crate) fn extended_cycles(base: u32, register_form: bool, repeatable: bool, repetitions: u32) -> u32 {
    if register_form && repeatable {
        1 + repetitions
    } else {
        base + 1
    }
}

pub(crate) fn calla_cycles(target: &Operand) -> u32 {
    match target.mode() {
        AddressingMode::Register | AddressingMode::Immediate => 5,
        _ => 6,
    }
}

/// PUSHM and POPM.
pub(crate) fn multiple_register_cycles(count: u8) -> u32 {
    2 + u32::from(count)
}

/// RRCM, RRAM, RLAM and RRUM.
pub(crate) fn rotate_cycles(count: u8) -> u32 {
    u32::from(count)
}

pub(crate) fn address_instruction_cycles(inst: &AddressInstruction) -> u32 {
    let src = inst.source();
    let dst = inst.destination();
    match (inst.opcode(), src.mode(), dst.mode()) {
        (AddressOpcode::Mova, AddressingMode::Register, AddressingMode::Register) => 1,
        (AddressOpcode::Mova, AddressingMode::Register, _) => 4,
        (AddressOpcode::Mova, AddressingMode::Immediate, _) => 2,
        (
            AddressOpcode::Mova,
            AddressingMode::Indirect | AddressingMode::IndirectAutoIncrement,
            _,
        ) => 3,
        (AddressOpcode::Mova, _, _) => 4,
        (_, AddressingMode::Immediate, _) => 3,
        (_, _, _) => 1,
    }
}
