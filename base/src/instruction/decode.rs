//! Conversion from instruction words to [`Instruction`] values.
use super::super::error::DecodeFailure;
use super::super::opcode::{
    AddressOpcode, Condition, DoubleOperandOpcode, RotateKind, SingleOperandOpcode,
};
use super::super::operand::{AddressingMode, Operand};
use super::super::register::Register;
use super::super::types::OperandWidth;
use super::{
    AddressInstruction, Calla, DoubleOperand, Extension, Instruction, Jump, RegisterRange,
    Repetition, RotateMultiple, SingleOperand,
};

/// The result of decoding: an instruction and the number of
/// instruction words it occupies (2 when an extension prefix is
/// present, otherwise 1).  The instruction's extension words follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub instruction: Instruction,
    pub opcode_words: usize,
}

impl Decoded {
    /// Total length of the instruction in words, extension words
    /// included.
    pub fn total_words(&self) -> usize {
        self.opcode_words + self.instruction.extension_word_count()
    }
}

const fn field(word: u16, shift: u32, mask: u16) -> u16 {
    (word >> shift) & mask
}

const fn is_prefix(word: u16) -> bool {
    word & 0xF800 == 0x1800
}

/// Decode the instruction at the start of `words`.  Only the
/// instruction word and any prefix are examined; extension words
/// need not be present.
pub fn decode(words: &[u16]) -> Result<Decoded, DecodeFailure> {
    match words {
        [] => Err(DecodeFailure::Truncated),
        [prefix, rest @ ..] if is_prefix(*prefix) => {
            let word = *rest.first().ok_or(DecodeFailure::Truncated)?;
            Ok(Decoded {
                instruction: decode_extended(*prefix, word)?,
                opcode_words: 2,
            })
        }
        [word, ..] => Ok(Decoded {
            instruction: Instruction::try_from(*word)?,
            opcode_words: 1,
        }),
    }
}

impl TryFrom<u16> for Instruction {
    type Error = DecodeFailure;

    /// Decode a single instruction word (no extension prefix).
    fn try_from(w: u16) -> Result<Instruction, DecodeFailure> {
        match w >> 12 {
            0x0 => decode_address_group(w),
            0x1 => {
                if is_prefix(w) {
                    Err(DecodeFailure::Truncated)
                } else {
                    decode_format_ii_group(w)
                }
            }
            0x2 | 0x3 => {
                let offset = i32::from(field(w, 0, 0x3FF));
                // Sign-extend the 10-bit word offset.
                let offset = if offset & 0x200 != 0 {
                    offset - 0x400
                } else {
                    offset
                };
                Ok(Instruction::Jump(Jump::new(
                    Condition::from_field(field(w, 10, 7)),
                    offset,
                )?))
            }
            _ => decode_format_i(w, plain_width(w), None).map(recognise_emulated),
        }
    }
}

fn plain_width(w: u16) -> OperandWidth {
    if field(w, 6, 1) == 1 {
        OperandWidth::Byte
    } else {
        OperandWidth::Word
    }
}

fn decode_format_i(
    w: u16,
    width: OperandWidth,
    extension: Option<Extension>,
) -> Result<Instruction, DecodeFailure> {
    let opcode = DoubleOperandOpcode::try_from(field(w, 12, 0xF))
        .map_err(|_| DecodeFailure::InvalidOpcode(w))?;
    let src = Operand::from_source_fields(Register::from_field(field(w, 8, 0xF)), field(w, 4, 3));
    let dst = Operand::from_destination_fields(Register::from_field(w), field(w, 7, 1));
    let inst = match extension {
        None => DoubleOperand::new(opcode, width, src, dst)?,
        Some(ext) => DoubleOperand::extended(opcode, width, src, dst, ext)?,
    };
    Ok(Instruction::DoubleOperand(inst))
}

/// Replace the canonical encodings of the emulated instructions by
/// their names.
fn recognise_emulated(inst: Instruction) -> Instruction {
    let Instruction::DoubleOperand(d) = inst else {
        return inst;
    };
    if d.width() != OperandWidth::Word || d.extension().is_some() {
        return inst;
    }
    let src = d.source();
    let dst = d.destination();
    let sp_pop = src.mode() == AddressingMode::IndirectAutoIncrement
        && src.register_name() == Register::SP;
    match (d.opcode(), dst.mode(), dst.register_name()) {
        (DoubleOperandOpcode::Mov, AddressingMode::Register, Register::R3)
            if src == Operand::register(Register::CG) =>
        {
            Instruction::Nop
        }
        (DoubleOperandOpcode::Mov, AddressingMode::Register, Register::R0) if sp_pop => {
            Instruction::Ret
        }
        (DoubleOperandOpcode::Mov, AddressingMode::Register, Register::R0) => {
            Instruction::Br(src)
        }
        (DoubleOperandOpcode::Bic, AddressingMode::Register, Register::R2)
            if src.constant_value() == Some(8) =>
        {
            Instruction::Dint
        }
        (DoubleOperandOpcode::Bis, AddressingMode::Register, Register::R2)
            if src.constant_value() == Some(8) =>
        {
            Instruction::Eint
        }
        _ => inst,
    }
}

fn decode_single(
    w: u16,
    width: OperandWidth,
    extension: Option<Extension>,
) -> Result<Instruction, DecodeFailure> {
    let opcode =
        SingleOperandOpcode::try_from(field(w, 7, 7)).map_err(|_| DecodeFailure::InvalidOpcode(w))?;
    let operand = Operand::from_source_fields(Register::from_field(w), field(w, 4, 3));
    let inst = match extension {
        None => SingleOperand::new(opcode, width, operand)?,
        Some(ext) => SingleOperand::extended(opcode, width, operand, ext)?,
    };
    Ok(Instruction::SingleOperand(inst))
}

/// Words 1000h-17FFh: Format II, RETI, CALLA, PUSHM and POPM.
fn decode_format_ii_group(w: u16) -> Result<Instruction, DecodeFailure> {
    if w & 0xFC00 == 0x1400 {
        let width = if field(w, 8, 1) == 0 {
            OperandWidth::AddressWord
        } else {
            OperandWidth::Word
        };
        let count = field(w, 4, 0xF) as u8 + 1;
        let reg = field(w, 0, 0xF);
        return if field(w, 9, 1) == 0 {
            Ok(Instruction::Pushm(RegisterRange::new(
                width,
                count,
                Register::from_field(reg),
            )?))
        } else {
            // POPM encodes the lowest register, Rdst - n + 1.
            let highest = reg + u16::from(count) - 1;
            if highest > 15 {
                return Err(DecodeFailure::InvalidOpcode(w));
            }
            Ok(Instruction::Popm(RegisterRange::new(
                width,
                count,
                Register::from_field(highest),
            )?))
        };
    }
    if w & 0xFF00 == 0x1300 {
        return decode_calla_group(w);
    }
    decode_single(w, plain_width(w), None)
}

fn decode_calla_group(w: u16) -> Result<Instruction, DecodeFailure> {
    let reg = Register::from_field(w);
    let low = field(w, 0, 0xF) as u8;
    let calla = |target: Operand, high: u8| -> Result<Instruction, DecodeFailure> {
        Ok(Instruction::Calla(Calla::new(target, high)?))
    };
    match field(w, 4, 0xF) {
        0x0 if w == 0x1300 => Ok(Instruction::Reti),
        0x4 => calla(Operand::register(reg), 0),
        0x5 => calla(Operand::indexed(reg), 0),
        0x6 => calla(Operand::indirect(reg)?, 0),
        0x7 => calla(Operand::autoincrement(reg)?, 0),
        0x8 => calla(Operand::absolute(), low),
        0x9 => calla(Operand::symbolic(), low),
        0xB => calla(Operand::immediate(), low),
        _ => Err(DecodeFailure::InvalidOpcode(w)),
    }
}

/// Words 0000h-0FFFh: MOVA, CMPA, ADDA, SUBA and the multiple-bit
/// rotations.
fn decode_address_group(w: u16) -> Result<Instruction, DecodeFailure> {
    let src_field = field(w, 8, 0xF);
    let src = Register::from_field(src_field);
    let dst = Register::from_field(w);
    let address = |opcode: AddressOpcode,
                   s: Operand,
                   d: Operand,
                   high: u16|
     -> Result<Instruction, DecodeFailure> {
        Ok(Instruction::Address(AddressInstruction::new(
            opcode, s, d, high as u8,
        )?))
    };
    let reg = Operand::register;
    let inst = match field(w, 4, 0xF) {
        0x0 => address(AddressOpcode::Mova, Operand::indirect(src)?, reg(dst), 0)?,
        0x1 => {
            if src == Register::SP && dst == Register::PC {
                Instruction::Reta
            } else {
                address(
                    AddressOpcode::Mova,
                    Operand::autoincrement(src)?,
                    reg(dst),
                    0,
                )?
            }
        }
        0x2 => address(AddressOpcode::Mova, Operand::absolute(), reg(dst), src_field)?,
        0x3 => address(AddressOpcode::Mova, Operand::indexed(src), reg(dst), 0)?,
        n @ (0x4 | 0x5) => {
            let width = if n == 0x4 {
                OperandWidth::AddressWord
            } else {
                OperandWidth::Word
            };
            Instruction::Rotate(RotateMultiple::new(
                RotateKind::from_field(field(w, 8, 3)),
                width,
                field(w, 10, 3) as u8 + 1,
                dst,
            )?)
        }
        0x6 => address(AddressOpcode::Mova, reg(src), Operand::absolute(), field(w, 0, 0xF))?,
        0x7 => address(AddressOpcode::Mova, reg(src), Operand::indexed(dst), 0)?,
        n @ 0x8..=0xB => {
            let opcode = address_opcode(n);
            address(opcode, Operand::immediate(), reg(dst), src_field)?
        }
        n => address(address_opcode(n), reg(src), reg(dst), 0)?,
    };
    Ok(inst)
}

fn address_opcode(n: u16) -> AddressOpcode {
    match n & 3 {
        0 => AddressOpcode::Mova,
        1 => AddressOpcode::Cmpa,
        2 => AddressOpcode::Adda,
        _ => AddressOpcode::Suba,
    }
}

/// Decode an instruction preceded by an MSP430X extension prefix.
fn decode_extended(prefix: u16, w: u16) -> Result<Instruction, DecodeFailure> {
    let al = field(prefix, 6, 1);
    let bw = field(w, 6, 1);
    match w >> 12 {
        0x4..=0xF => {
            let width = extended_width(prefix, al, bw)?;
            let register_operands = field(w, 4, 3) == 0 && field(w, 7, 1) == 0;
            let ext = prefix_extension(prefix, register_operands, true);
            decode_format_i(w, width, Some(ext))
        }
        0x1 if w & 0xFC00 == 0x1000 && field(w, 7, 7) <= 4 => {
            let opcode = SingleOperandOpcode::try_from(field(w, 7, 7))
                .map_err(|_| DecodeFailure::InvalidOpcode(w))?;
            let width = match opcode {
                // SWPBX.A and SXTX.A use A/L=0, B/W=0.
                SingleOperandOpcode::Swpb | SingleOperandOpcode::Sxt => match (al, bw) {
                    (0, 0) => OperandWidth::AddressWord,
                    (1, 0) => OperandWidth::Word,
                    _ => return Err(DecodeFailure::ReservedWidth(prefix)),
                },
                _ => extended_width(prefix, al, bw)?,
            };
            let ext = prefix_extension(prefix, field(w, 4, 3) == 0, false);
            decode_single(w, width, Some(ext))
        }
        _ => Err(DecodeFailure::MisplacedPrefix { prefix, word: w }),
    }
}

fn extended_width(prefix: u16, al: u16, bw: u16) -> Result<OperandWidth, DecodeFailure> {
    match (al, bw) {
        (1, 0) => Ok(OperandWidth::Word),
        (1, _) => Ok(OperandWidth::Byte),
        (0, 1) => Ok(OperandWidth::AddressWord),
        _ => Err(DecodeFailure::ReservedWidth(prefix)),
    }
}

/// Interpret the prefix's low bits.  A single-operand instruction
/// takes bits 19:16 of its operand from bits 3:0 of the prefix.
fn prefix_extension(prefix: u16, register_operands: bool, has_source: bool) -> Extension {
    if register_operands {
        let repeat = if field(prefix, 7, 1) == 1 {
            Repetition::CountIn(Register::from_field(prefix))
        } else {
            Repetition::Times(field(prefix, 0, 0xF) as u8 + 1)
        };
        Extension::Register {
            repeat,
            zero_carry: field(prefix, 8, 1) == 1,
        }
    } else {
        Extension::Memory {
            src_high: if has_source {
                field(prefix, 7, 0xF) as u8
            } else {
                0
            },
            dst_high: field(prefix, 0, 0xF) as u8,
        }
    }
}
