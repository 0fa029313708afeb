//! Decoded representations of MSP430 and MSP430X instructions.
//!
//! An MSP430 instruction is a 16-bit word, optionally followed by one
//! or two extension words holding indexes, absolute addresses or
//! immediate values.  The top bits of the word select the format:
//!
//! | Bits 15:12 | Format |
//! |------------|--------|
//! | `0000` | MSP430X address instructions (MOVA, ADDA, RRCM, ...) |
//! | `0001` | Format II (single operand), PUSHM/POPM, CALLA, and the MSP430X extension prefix |
//! | `001x` | Format III (conditional jump) |
//! | `0100`-`1111` | Format I (double operand) |
//!
//! Format I double-operand words are laid out like this:
//!
//! |opcode |S-Reg  |Ad |B/W|As  |D-Reg  |
//! |-------|-------|---|---|----|-------|
//! |15-12  |11-8   |7  |6  |5-4 |3-0    |
//!
//! An MSP430X extension prefix (`00011` in bits 15:11) may precede a
//! Format I or Format II instruction.  It widens the instruction to
//! 20 bits (A/L bit), supplies bits 19:16 of its 20-bit index,
//! address or immediate, or (for register operands) a repetition
//! count.  The prefix is part of the instruction; it is not counted
//! among the extension words which trail the instruction word.
//!
//! Every instruction value here has passed construction-time
//! validation, so the execution engine never sees an instruction
//! that cannot be encoded.
use serde::Serialize;

use super::error::InstructionError;
use super::opcode::{
    AddressOpcode, Condition, DoubleOperandOpcode, RotateKind, SingleOperandOpcode,
};
use super::operand::{AddressingMode, Operand};
use super::register::Register;
use super::types::OperandWidth;

mod decode;
mod encode;
mod format;

pub use decode::{decode, Decoded};

/// The three instruction formats.  The MSP430X address instructions
/// are classified by their operand count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstructionFormat {
    /// Format I.
    DoubleOperand,
    /// Format II.
    SingleOperand,
    /// Format III.
    Jump,
}

/// How many times a repeatable MSP430X register-mode instruction
/// executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Repetition {
    /// Execute 1-16 times.
    Times(u8),
    /// Execute (Rn & 0xF) + 1 times.
    CountIn(Register),
}

impl Repetition {
    pub const ONCE: Repetition = Repetition::Times(1);
}

/// The content of an MSP430X extension prefix word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Extension {
    /// All operands are registers.  The instruction may be repeated,
    /// and ZC forces the carry input of each repetition to zero.
    Register {
        repeat: Repetition,
        zero_carry: bool,
    },
    /// At least one operand is in memory.  `src_high` and `dst_high`
    /// are bits 19:16 of the source and destination index, address
    /// or immediate value respectively.
    Memory { src_high: u8, dst_high: u8 },
}

impl Extension {
    /// A prefix which only widens (or narrows) the operation.
    pub const fn plain(register_operands: bool) -> Extension {
        if register_operands {
            Extension::Register {
                repeat: Repetition::ONCE,
                zero_carry: false,
            }
        } else {
            Extension::Memory {
                src_high: 0,
                dst_high: 0,
            }
        }
    }

    fn validate(&self, register_operands: bool) -> Result<(), InstructionError> {
        match self {
            Extension::Register { repeat, .. } => {
                if !register_operands {
                    return Err(InstructionError::InvalidSourceMode(AddressingMode::Register));
                }
                match repeat {
                    Repetition::Times(n) if !(1..=16).contains(n) => {
                        Err(InstructionError::RepeatCountOutOfRange(*n))
                    }
                    _ => Ok(()),
                }
            }
            Extension::Memory { src_high, dst_high } => {
                if register_operands {
                    Err(InstructionError::InvalidSourceMode(AddressingMode::Register))
                } else if *src_high > 0xF || *dst_high > 0xF {
                    Err(InstructionError::ValueOutOfRange(u32::from(
                        (*src_high).max(*dst_high),
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }

    pub const fn src_high(&self) -> u8 {
        match self {
            Extension::Memory { src_high, .. } => *src_high,
            Extension::Register { .. } => 0,
        }
    }

    pub const fn dst_high(&self) -> u8 {
        match self {
            Extension::Memory { dst_high, .. } => *dst_high,
            Extension::Register { .. } => 0,
        }
    }
}

fn check_width(width: OperandWidth, extension: &Option<Extension>) -> Result<(), InstructionError> {
    if width == OperandWidth::AddressWord && extension.is_none() {
        Err(InstructionError::InvalidWidth(width))
    } else {
        Ok(())
    }
}

/// A Format I (double-operand) instruction, optionally extended to
/// its MSP430X `...X` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DoubleOperand {
    opcode: DoubleOperandOpcode,
    width: OperandWidth,
    src: Operand,
    dst: Operand,
    extension: Option<Extension>,
}

impl DoubleOperand {
    pub fn new(
        opcode: DoubleOperandOpcode,
        width: OperandWidth,
        src: Operand,
        dst: Operand,
    ) -> Result<DoubleOperand, InstructionError> {
        DoubleOperand::build(opcode, width, src, dst, None)
    }

    /// Build the MSP430X form (`MOVX`, `ADDX`, ...).
    pub fn extended(
        opcode: DoubleOperandOpcode,
        width: OperandWidth,
        src: Operand,
        dst: Operand,
        extension: Extension,
    ) -> Result<DoubleOperand, InstructionError> {
        DoubleOperand::build(opcode, width, src, dst, Some(extension))
    }

    fn build(
        opcode: DoubleOperandOpcode,
        width: OperandWidth,
        src: Operand,
        dst: Operand,
        extension: Option<Extension>,
    ) -> Result<DoubleOperand, InstructionError> {
        dst.check_destination()?;
        check_width(width, &extension)?;
        if let Some(ext) = &extension {
            ext.validate(
                src.mode() == AddressingMode::Register && dst.mode() == AddressingMode::Register,
            )?;
        }
        Ok(DoubleOperand {
            opcode,
            width,
            src,
            dst,
            extension,
        })
    }

    pub fn opcode(&self) -> DoubleOperandOpcode {
        self.opcode
    }

    pub fn width(&self) -> OperandWidth {
        self.width
    }

    pub fn source(&self) -> Operand {
        self.src
    }

    pub fn destination(&self) -> Operand {
        self.dst
    }

    pub fn extension(&self) -> Option<Extension> {
        self.extension
    }

    pub fn extension_word_count(&self) -> usize {
        self.src.extension_words() + self.dst.extension_words()
    }
}

/// A Format II (single-operand) instruction other than RETI,
/// optionally extended to its MSP430X form (`RRCX`, `PUSHX`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SingleOperand {
    opcode: SingleOperandOpcode,
    width: OperandWidth,
    operand: Operand,
    extension: Option<Extension>,
}

impl SingleOperand {
    pub fn new(
        opcode: SingleOperandOpcode,
        width: OperandWidth,
        operand: Operand,
    ) -> Result<SingleOperand, InstructionError> {
        SingleOperand::build(opcode, width, operand, None)
    }

    pub fn extended(
        opcode: SingleOperandOpcode,
        width: OperandWidth,
        operand: Operand,
        extension: Extension,
    ) -> Result<SingleOperand, InstructionError> {
        SingleOperand::build(opcode, width, operand, Some(extension))
    }

    fn build(
        opcode: SingleOperandOpcode,
        width: OperandWidth,
        operand: Operand,
        extension: Option<Extension>,
    ) -> Result<SingleOperand, InstructionError> {
        check_width(width, &extension)?;
        if opcode.is_read_modify_write() && operand.mode() == AddressingMode::Immediate {
            return Err(InstructionError::InvalidSourceMode(operand.mode()));
        }
        match opcode {
            SingleOperandOpcode::Swpb | SingleOperandOpcode::Sxt
                if width == OperandWidth::Byte =>
            {
                return Err(InstructionError::InvalidWidth(width));
            }
            // CALL has no MSP430X prefix form; CALLA takes its place.
            SingleOperandOpcode::Call if width != OperandWidth::Word || extension.is_some() => {
                return Err(InstructionError::InvalidWidth(width));
            }
            _ => (),
        }
        if let Some(ext) = &extension {
            ext.validate(operand.mode() == AddressingMode::Register)?;
            if ext.src_high() != 0 {
                return Err(InstructionError::ValueOutOfRange(u32::from(ext.src_high())));
            }
        }
        Ok(SingleOperand {
            opcode,
            width,
            operand,
            extension,
        })
    }

    pub fn opcode(&self) -> SingleOperandOpcode {
        self.opcode
    }

    pub fn width(&self) -> OperandWidth {
        self.width
    }

    pub fn operand(&self) -> Operand {
        self.operand
    }

    pub fn extension(&self) -> Option<Extension> {
        self.extension
    }

    pub fn extension_word_count(&self) -> usize {
        self.operand.extension_words()
    }
}

/// A Format III conditional (or unconditional) relative jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Jump {
    condition: Condition,
    offset: i16,
}

impl Jump {
    pub const MIN_OFFSET: i32 = -512;
    pub const MAX_OFFSET: i32 = 511;

    /// `offset` counts words, relative to the word following the jump.
    pub fn new(condition: Condition, offset: i32) -> Result<Jump, InstructionError> {
        if (Jump::MIN_OFFSET..=Jump::MAX_OFFSET).contains(&offset) {
            Ok(Jump {
                condition,
                // The range check above guarantees this fits.
                offset: offset as i16,
            })
        } else {
            Err(InstructionError::JumpOffsetOutOfRange(offset))
        }
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn offset(&self) -> i16 {
        self.offset
    }

    /// The jump displacement in bytes.
    pub fn displacement(&self) -> i32 {
        2 * i32::from(self.offset)
    }
}

/// CALLA: call with a 20-bit return address.
///
/// The target may be given in any mode except a constant generator.
/// For `&abs20`, `EDE` and `#imm20` forms, `high` holds bits 19:16 of
/// the address (they are encoded in the instruction word itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Calla {
    target: Operand,
    high: u8,
}

impl Calla {
    pub fn new(target: Operand, high: u8) -> Result<Calla, InstructionError> {
        if target.constant_value().is_some() {
            return Err(InstructionError::InvalidSourceMode(target.mode()));
        }
        let carries_high = matches!(
            target.mode(),
            AddressingMode::Absolute | AddressingMode::Symbolic | AddressingMode::Immediate
        );
        if high > 0xF || (high != 0 && !carries_high) {
            return Err(InstructionError::ValueOutOfRange(u32::from(high)));
        }
        Ok(Calla { target, high })
    }

    pub fn target(&self) -> Operand {
        self.target
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn extension_word_count(&self) -> usize {
        self.target.extension_words()
    }
}

/// The registers moved by PUSHM or POPM: `count` registers ending at
/// `highest`, i.e. `highest - count + 1 ..= highest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RegisterRange {
    width: OperandWidth,
    count: u8,
    highest: Register,
}

impl RegisterRange {
    pub fn new(
        width: OperandWidth,
        count: u8,
        highest: Register,
    ) -> Result<RegisterRange, InstructionError> {
        if width == OperandWidth::Byte {
            return Err(InstructionError::InvalidWidth(width));
        }
        if count == 0 || count > 16 || count > highest.number() + 1 {
            return Err(InstructionError::RegisterCountOutOfRange(count));
        }
        Ok(RegisterRange {
            width,
            count,
            highest,
        })
    }

    pub fn width(&self) -> OperandWidth {
        self.width
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn highest(&self) -> Register {
        self.highest
    }

    pub fn lowest(&self) -> Register {
        Register::from_field(u16::from(self.highest.number() + 1 - self.count))
    }

    /// The registers in ascending order.
    pub fn registers(&self) -> impl DoubleEndedIterator<Item = Register> {
        let low = self.lowest().number();
        (low..=self.highest.number()).map(|n| Register::from_field(u16::from(n)))
    }
}

/// RRCM, RRAM, RLAM or RRUM: shift a register by 1 to 4 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RotateMultiple {
    kind: RotateKind,
    width: OperandWidth,
    count: u8,
    register: Register,
}

impl RotateMultiple {
    pub fn new(
        kind: RotateKind,
        width: OperandWidth,
        count: u8,
        register: Register,
    ) -> Result<RotateMultiple, InstructionError> {
        if width == OperandWidth::Byte {
            return Err(InstructionError::InvalidWidth(width));
        }
        if !(1..=4).contains(&count) {
            return Err(InstructionError::RotateCountOutOfRange(count));
        }
        Ok(RotateMultiple {
            kind,
            width,
            count,
            register,
        })
    }

    pub fn kind(&self) -> RotateKind {
        self.kind
    }

    pub fn width(&self) -> OperandWidth {
        self.width
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn register(&self) -> Register {
        self.register
    }
}

/// MOVA, CMPA, ADDA and SUBA.  These always operate on 20-bit
/// address-words.
///
/// MOVA accepts these operand combinations:
///
/// | Source | Destination |
/// |--------|-------------|
/// | `Rsrc` | `Rdst` |
/// | `@Rsrc` | `Rdst` |
/// | `@Rsrc+` | `Rdst` |
/// | `&abs20` | `Rdst` |
/// | `x(Rsrc)` | `Rdst` |
/// | `#imm20` | `Rdst` |
/// | `Rsrc` | `&abs20` |
/// | `Rsrc` | `x(Rdst)` |
///
/// CMPA, ADDA and SUBA accept only `Rsrc` or `#imm20` as source and
/// `Rdst` as destination.  `high` holds bits 19:16 of an `&abs20` or
/// `#imm20` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AddressInstruction {
    opcode: AddressOpcode,
    src: Operand,
    dst: Operand,
    high: u8,
}

impl AddressInstruction {
    pub fn new(
        opcode: AddressOpcode,
        src: Operand,
        dst: Operand,
        high: u8,
    ) -> Result<AddressInstruction, InstructionError> {
        use AddressingMode as M;
        if src.constant_value().is_some() {
            return Err(InstructionError::InvalidSourceMode(src.mode()));
        }
        let valid = match opcode {
            AddressOpcode::Mova => match (src.mode(), dst.mode()) {
                (M::Register, M::Register | M::Absolute | M::Indexed | M::Symbolic) => true,
                (
                    M::Indirect
                    | M::IndirectAutoIncrement
                    | M::Absolute
                    | M::Indexed
                    | M::Symbolic
                    | M::Immediate,
                    M::Register,
                ) => true,
                _ => false,
            },
            AddressOpcode::Cmpa | AddressOpcode::Adda | AddressOpcode::Suba => {
                matches!(src.mode(), M::Register | M::Immediate) && dst.mode() == M::Register
            }
        };
        if !valid {
            return Err(if dst.mode() == M::Register {
                InstructionError::InvalidSourceMode(src.mode())
            } else {
                InstructionError::InvalidDestinationMode(dst.mode())
            });
        }
        let carries_high =
            matches!(src.mode(), M::Absolute | M::Immediate) || dst.mode() == M::Absolute;
        if high > 0xF || (high != 0 && !carries_high) {
            return Err(InstructionError::ValueOutOfRange(u32::from(high)));
        }
        Ok(AddressInstruction {
            opcode,
            src,
            dst,
            high,
        })
    }

    pub fn opcode(&self) -> AddressOpcode {
        self.opcode
    }

    pub fn source(&self) -> Operand {
        self.src
    }

    pub fn destination(&self) -> Operand {
        self.dst
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn extension_word_count(&self) -> usize {
        self.src.extension_words() + self.dst.extension_words()
    }
}

/// A decoded instruction.
///
/// The emulated instructions (NOP, RET, RETA, BR, DINT, EINT) are
/// kept as distinct variants so that callers and tests can refer to
/// them by name; [`Instruction::canonical`] gives the real
/// instruction each one is an alias for, and the execution engine
/// runs that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Instruction {
    DoubleOperand(DoubleOperand),
    SingleOperand(SingleOperand),
    Jump(Jump),
    Reti,
    Calla(Calla),
    Pushm(RegisterRange),
    Popm(RegisterRange),
    Rotate(RotateMultiple),
    Address(AddressInstruction),
    /// `MOV R3,R3`
    Nop,
    /// `MOV @SP+,PC`
    Ret,
    /// `MOVA @SP+,PC`
    Reta,
    /// `MOV src,PC`
    Br(Operand),
    /// `BIC #8,SR`
    Dint,
    /// `BIS #8,SR`
    Eint,
}

/// Bit 3 of SR is the general interrupt enable.
const GIE_CONSTANT: i32 = 8;

impl Instruction {
    /// Build `BR src`.
    pub fn branch(src: Operand) -> Instruction {
        Instruction::Br(src)
    }

    /// Build a conditional jump; fails for offsets outside -512..=511.
    pub fn jump(condition: Condition, offset: i32) -> Result<Instruction, InstructionError> {
        Jump::new(condition, offset).map(Instruction::Jump)
    }

    /// The real instruction for which an emulated instruction is an
    /// alias.  Other instructions are returned unchanged.
    pub fn canonical(&self) -> Instruction {
        let mov_to_pc = |src: Operand| {
            DoubleOperand {
                opcode: DoubleOperandOpcode::Mov,
                width: OperandWidth::Word,
                src,
                dst: Operand::register(Register::PC),
                extension: None,
            }
        };
        let gie = |opcode: DoubleOperandOpcode| {
            DoubleOperand {
                opcode,
                width: OperandWidth::Word,
                // 8 is always a constant the generators can produce.
                src: Operand::constant(GIE_CONSTANT).unwrap_or(Operand::immediate()),
                dst: Operand::register(Register::SR),
                extension: None,
            }
        };
        match self {
            Instruction::Nop => Instruction::DoubleOperand(DoubleOperand {
                opcode: DoubleOperandOpcode::Mov,
                width: OperandWidth::Word,
                src: Operand::register(Register::CG),
                dst: Operand::register(Register::CG),
                extension: None,
            }),
            Instruction::Ret => Instruction::DoubleOperand(mov_to_pc(sp_autoincrement())),
            Instruction::Br(src) => Instruction::DoubleOperand(mov_to_pc(*src)),
            Instruction::Dint => Instruction::DoubleOperand(gie(DoubleOperandOpcode::Bic)),
            Instruction::Eint => Instruction::DoubleOperand(gie(DoubleOperandOpcode::Bis)),
            Instruction::Reta => Instruction::Address(AddressInstruction {
                opcode: AddressOpcode::Mova,
                src: sp_autoincrement(),
                dst: Operand::register(Register::PC),
                high: 0,
            }),
            other => *other,
        }
    }

    pub fn is_emulated(&self) -> bool {
        matches!(
            self,
            Instruction::Nop
                | Instruction::Ret
                | Instruction::Reta
                | Instruction::Br(_)
                | Instruction::Dint
                | Instruction::Eint
        )
    }

    pub fn format(&self) -> InstructionFormat {
        match self.canonical() {
            Instruction::DoubleOperand(_) | Instruction::Address(_) => {
                InstructionFormat::DoubleOperand
            }
            Instruction::Jump(_) => InstructionFormat::Jump,
            _ => InstructionFormat::SingleOperand,
        }
    }

    /// The number of extension words which must trail the
    /// instruction word(s).
    pub fn extension_word_count(&self) -> usize {
        match self.canonical() {
            Instruction::DoubleOperand(inst) => inst.extension_word_count(),
            Instruction::SingleOperand(inst) => inst.extension_word_count(),
            Instruction::Calla(inst) => inst.extension_word_count(),
            Instruction::Address(inst) => inst.extension_word_count(),
            _ => 0,
        }
    }

    /// True if the instruction is preceded by an MSP430X extension
    /// prefix word.
    pub fn has_prefix(&self) -> bool {
        match self {
            Instruction::DoubleOperand(inst) => inst.extension.is_some(),
            Instruction::SingleOperand(inst) => inst.extension.is_some(),
            _ => false,
        }
    }

    pub fn width(&self) -> OperandWidth {
        match self.canonical() {
            Instruction::DoubleOperand(inst) => inst.width,
            Instruction::SingleOperand(inst) => inst.width,
            Instruction::Pushm(range) | Instruction::Popm(range) => range.width,
            Instruction::Rotate(rot) => rot.width,
            Instruction::Calla(_) | Instruction::Address(_) => OperandWidth::AddressWord,
            _ => OperandWidth::Word,
        }
    }

    /// The source operand, for instructions which have one.
    pub fn source(&self) -> Option<Operand> {
        match self.canonical() {
            Instruction::DoubleOperand(inst) => Some(inst.src),
            Instruction::Address(inst) => Some(inst.src),
            Instruction::SingleOperand(inst) => Some(inst.operand),
            Instruction::Calla(inst) => Some(inst.target),
            _ => None,
        }
    }

    /// The destination operand, for instructions which have one.
    pub fn destination(&self) -> Option<Operand> {
        match self.canonical() {
            Instruction::DoubleOperand(inst) => Some(inst.dst),
            Instruction::Address(inst) => Some(inst.dst),
            Instruction::SingleOperand(inst) if inst.opcode.is_read_modify_write() => {
                Some(inst.operand)
            }
            Instruction::Rotate(rot) => Some(Operand::register(rot.register)),
            _ => None,
        }
    }
}

fn sp_autoincrement() -> Operand {
    // SP is never a constant generator, so this cannot fail.
    Operand::autoincrement(Register::SP).unwrap_or(Operand::immediate())
}
