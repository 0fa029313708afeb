//! Conversion from [`Instruction`] values to instruction words.
use super::super::opcode::{AddressOpcode, SingleOperandOpcode};
use super::super::operand::{AddressingMode, Operand};
use super::super::types::OperandWidth;
use super::{Extension, Instruction, Repetition};

const PREFIX: u16 = 0x1800;

fn prefix_word(ext: &Extension, al: u16) -> u16 {
    let low = match ext {
        Extension::Register { repeat, zero_carry } => {
            let zc = if *zero_carry { 1 << 8 } else { 0 };
            zc | match repeat {
                Repetition::Times(n) => u16::from(n.saturating_sub(1)) & 0xF,
                Repetition::CountIn(r) => (1 << 7) | u16::from(r.number()),
            }
        }
        Extension::Memory { src_high, dst_high } => {
            (u16::from(*src_high & 0xF) << 7) | u16::from(*dst_high & 0xF)
        }
    };
    PREFIX | (al << 6) | low
}

/// The A/L and B/W bits which select `width` under a prefix.
fn extended_width_bits(width: OperandWidth) -> (u16, u16) {
    match width {
        OperandWidth::Byte => (1, 1),
        OperandWidth::Word => (1, 0),
        OperandWidth::AddressWord => (0, 1),
    }
}

fn bw_bit(width: OperandWidth) -> u16 {
    if width == OperandWidth::Byte {
        1
    } else {
        0
    }
}

fn address_opcode_number(opcode: AddressOpcode) -> u16 {
    match opcode {
        AddressOpcode::Mova => 0,
        AddressOpcode::Cmpa => 1,
        AddressOpcode::Adda => 2,
        AddressOpcode::Suba => 3,
    }
}

fn reg(op: &Operand) -> u16 {
    u16::from(op.register_name().number())
}

impl Instruction {
    /// The instruction's prefix (if any) and instruction word.  The
    /// extension words holding operand values are not included.
    pub fn encode(&self) -> Vec<u16> {
        match *self {
            Instruction::DoubleOperand(inst) => {
                let (s, as_bits) = inst.source().source_fields();
                let (d, ad) = inst.destination().destination_fields();
                let (al, bw) = match inst.extension() {
                    Some(_) => extended_width_bits(inst.width()),
                    None => (1, bw_bit(inst.width())),
                };
                let word = (inst.opcode().number() << 12)
                    | (s << 8)
                    | (ad << 7)
                    | (bw << 6)
                    | (as_bits << 4)
                    | d;
                match inst.extension() {
                    Some(ext) => vec![prefix_word(&ext, al), word],
                    None => vec![word],
                }
            }
            Instruction::SingleOperand(inst) => {
                let (r, as_bits) = inst.operand().source_fields();
                let (al, bw) = match (inst.extension(), inst.opcode()) {
                    (None, _) => (1, bw_bit(inst.width())),
                    (
                        Some(_),
                        SingleOperandOpcode::Swpb | SingleOperandOpcode::Sxt,
                    ) => match inst.width() {
                        OperandWidth::AddressWord => (0, 0),
                        _ => (1, 0),
                    },
                    (Some(_), _) => extended_width_bits(inst.width()),
                };
                let word = 0x1000 | (inst.opcode().number() << 7) | (bw << 6) | (as_bits << 4) | r;
                match inst.extension() {
                    Some(ext) => vec![prefix_word(&ext, al), word],
                    None => vec![word],
                }
            }
            Instruction::Jump(jump) => {
                let offset = (jump.offset() as u16) & 0x3FF;
                vec![0x2000 | (jump.condition().number() << 10) | offset]
            }
            Instruction::Reti => vec![0x1300],
            Instruction::Calla(calla) => {
                let target = calla.target();
                let (mode, low) = match target.mode() {
                    AddressingMode::Register => (0x4, reg(&target)),
                    AddressingMode::Indexed => (0x5, reg(&target)),
                    AddressingMode::Indirect => (0x6, reg(&target)),
                    AddressingMode::IndirectAutoIncrement => (0x7, reg(&target)),
                    AddressingMode::Absolute => (0x8, u16::from(calla.high())),
                    AddressingMode::Symbolic => (0x9, u16::from(calla.high())),
                    AddressingMode::Immediate => (0xB, u16::from(calla.high())),
                };
                vec![0x1300 | (mode << 4) | low]
            }
            Instruction::Pushm(range) => {
                let w = if range.width() == OperandWidth::Word {
                    0x1500
                } else {
                    0x1400
                };
                vec![w | (u16::from(range.count() - 1) << 4) | u16::from(range.highest().number())]
            }
            Instruction::Popm(range) => {
                let w = if range.width() == OperandWidth::Word {
                    0x1700
                } else {
                    0x1600
                };
                vec![w | (u16::from(range.count() - 1) << 4) | u16::from(range.lowest().number())]
            }
            Instruction::Rotate(rot) => {
                let op = if rot.width() == OperandWidth::Word {
                    0x5
                } else {
                    0x4
                };
                vec![
                    (u16::from(rot.count() - 1) << 10)
                        | (rot.kind().number() << 8)
                        | (op << 4)
                        | u16::from(rot.register().number()),
                ]
            }
            Instruction::Address(inst) => {
                let src = inst.source();
                let dst = inst.destination();
                let high = u16::from(inst.high());
                let (s, op, d) = match (src.mode(), dst.mode()) {
                    (AddressingMode::Indirect, _) => (reg(&src), 0x0, reg(&dst)),
                    (AddressingMode::IndirectAutoIncrement, _) => (reg(&src), 0x1, reg(&dst)),
                    (AddressingMode::Absolute, _) => (high, 0x2, reg(&dst)),
                    (AddressingMode::Indexed | AddressingMode::Symbolic, _) => {
                        (reg(&src), 0x3, reg(&dst))
                    }
                    (AddressingMode::Register, AddressingMode::Absolute) => (reg(&src), 0x6, high),
                    (AddressingMode::Register, AddressingMode::Register) => (
                        reg(&src),
                        0xC | address_opcode_number(inst.opcode()),
                        reg(&dst),
                    ),
                    (AddressingMode::Register, _) => (reg(&src), 0x7, reg(&dst)),
                    (AddressingMode::Immediate, _) => (
                        high,
                        0x8 | address_opcode_number(inst.opcode()),
                        reg(&dst),
                    ),
                };
                vec![(s << 8) | (op << 4) | d]
            }
            Instruction::Nop
            | Instruction::Ret
            | Instruction::Reta
            | Instruction::Br(_)
            | Instruction::Dint
            | Instruction::Eint => self.canonical().encode(),
        }
    }
}
