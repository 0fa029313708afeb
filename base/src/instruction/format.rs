//! Human-oriented formatting for instructions (or parts of instructions).
//!
//! Operand values live in extension words, which are not part of an
//! [`Instruction`], so operands needing one are rendered with
//! placeholder names (`x(R5)`, `EDE`, `&EDE`, `#N`) in the style of
//! the MSP430 family user's guide.
use std::fmt::{self, Display, Formatter};

use super::super::operand::{AddressingMode, Operand};
use super::super::types::OperandWidth;
use super::{
    AddressInstruction, Calla, DoubleOperand, Extension, Instruction, RegisterRange, Repetition,
    SingleOperand,
};

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let r = self.register_name();
        match self.mode() {
            AddressingMode::Register => write!(f, "{r}"),
            AddressingMode::Indexed => write!(f, "x({r})"),
            AddressingMode::Symbolic => f.write_str("EDE"),
            AddressingMode::Absolute => f.write_str("&EDE"),
            AddressingMode::Indirect => write!(f, "@{r}"),
            AddressingMode::IndirectAutoIncrement => write!(f, "@{r}+"),
            AddressingMode::Immediate => match self.constant_value() {
                Some(n) => write!(f, "#{n}"),
                None => f.write_str("#N"),
            },
        }
    }
}

/// Renders the repetition part of an extended register-mode
/// instruction, e.g. `RPT #4 ` or `RPT R5 `.
fn write_repetition(f: &mut Formatter<'_>, ext: Option<Extension>) -> Result<(), fmt::Error> {
    if let Some(Extension::Register { repeat, zero_carry }) = ext {
        match repeat {
            Repetition::Times(1) => (),
            Repetition::Times(n) => write!(f, "RPT #{n} ")?,
            Repetition::CountIn(r) => write!(f, "RPT {r} ")?,
        }
        if zero_carry {
            f.write_str("ZC ")?;
        }
    }
    Ok(())
}

fn write_mnemonic(
    f: &mut Formatter<'_>,
    name: &str,
    extended: bool,
    width: OperandWidth,
) -> Result<(), fmt::Error> {
    let x = if extended { "X" } else { "" };
    write!(f, "{name}{x}{}", width.suffix())
}

impl Display for DoubleOperand {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write_repetition(f, self.extension())?;
        write_mnemonic(
            f,
            self.opcode().mnemonic(),
            self.extension().is_some(),
            self.width(),
        )?;
        write!(f, " {},{}", self.source(), self.destination())
    }
}

impl Display for SingleOperand {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write_repetition(f, self.extension())?;
        write_mnemonic(
            f,
            self.opcode().mnemonic(),
            self.extension().is_some(),
            self.width(),
        )?;
        write!(f, " {}", self.operand())
    }
}

impl Display for Calla {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "CALLA {}", self.target())
    }
}

impl Display for AddressInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{} {},{}",
            self.opcode().mnemonic(),
            self.source(),
            self.destination()
        )
    }
}

fn write_range(f: &mut Formatter<'_>, name: &str, range: &RegisterRange) -> Result<(), fmt::Error> {
    write!(
        f,
        "{name}{} #{},{}",
        range.width().suffix(),
        range.count(),
        range.highest()
    )
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Instruction::DoubleOperand(inst) => inst.fmt(f),
            Instruction::SingleOperand(inst) => inst.fmt(f),
            Instruction::Jump(jump) => {
                write!(f, "{} $", jump.condition())?;
                match jump.displacement() + 2 {
                    0 => Ok(()),
                    n if n > 0 => write!(f, "+{n}"),
                    n => write!(f, "{n}"),
                }
            }
            Instruction::Reti => f.write_str("RETI"),
            Instruction::Calla(inst) => inst.fmt(f),
            Instruction::Pushm(range) => write_range(f, "PUSHM", range),
            Instruction::Popm(range) => write_range(f, "POPM", range),
            Instruction::Rotate(rot) => write!(
                f,
                "{}{} #{},{}",
                rot.kind().mnemonic(),
                rot.width().suffix(),
                rot.count(),
                rot.register()
            ),
            Instruction::Address(inst) => inst.fmt(f),
            Instruction::Nop => f.write_str("NOP"),
            Instruction::Ret => f.write_str("RET"),
            Instruction::Reta => f.write_str("RETA"),
            Instruction::Br(src) => write!(f, "BR {src}"),
            Instruction::Dint => f.write_str("DINT"),
            Instruction::Eint => f.write_str("EINT"),
        }
    }
}
