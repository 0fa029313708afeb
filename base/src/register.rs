//! Names of the sixteen CPU registers.
//!
//! Four of the registers have special functions:
//!
//! | Register | Alias | Function |
//! | -------- | ----- | -------- |
//! | R0 | PC  | Program counter; always even. |
//! | R1 | SP  | Stack pointer; always even. |
//! | R2 | SR  | Status register; also constant generator CG1. |
//! | R3 | CG2 | Constant generator; never holds data. |
//!
//! R4-R15 are general purpose.
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::ConversionFailed;

#[repr(u8)]
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl Register {
    pub const PC: Register = Register::R0;
    pub const SP: Register = Register::R1;
    pub const SR: Register = Register::R2;
    pub const CG: Register = Register::R3;

    pub const ALL: [Register; 16] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
        Register::R8,
        Register::R9,
        Register::R10,
        Register::R11,
        Register::R12,
        Register::R13,
        Register::R14,
        Register::R15,
    ];

    pub const fn number(&self) -> u8 {
        *self as u8
    }

    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Extract a register number from a 4-bit instruction field.
    /// Only the bottom four bits of `field` are examined.
    pub const fn from_field(field: u16) -> Register {
        Register::ALL[(field & 0xF) as usize]
    }

    /// PC and SP can only hold even values.
    pub const fn is_word_aligned(&self) -> bool {
        matches!(self, Register::R0 | Register::R1)
    }

    /// R2 and R3 double as the constant generators.
    pub const fn is_constant_generator(&self) -> bool {
        matches!(self, Register::R2 | Register::R3)
    }
}

impl TryFrom<u8> for Register {
    type Error = ConversionFailed;
    fn try_from(n: u8) -> Result<Register, ConversionFailed> {
        Register::ALL
            .get(usize::from(n))
            .copied()
            .ok_or(ConversionFailed::TooLarge)
    }
}

impl From<Register> for u8 {
    fn from(r: Register) -> u8 {
        r.number()
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Register::R0 => f.write_str("PC"),
            Register::R1 => f.write_str("SP"),
            Register::R2 => f.write_str("SR"),
            other => write!(f, "R{}", other.number()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_number_round_trip() {
        for n in 0..16_u8 {
            let r = Register::try_from(n).expect("valid register number");
            assert_eq!(r.number(), n);
            assert_eq!(Register::from_field(u16::from(n) | 0xFFF0), r);
        }
        assert_eq!(Register::try_from(16_u8), Err(ConversionFailed::TooLarge));
    }

    #[test]
    fn test_register_display() {
        assert_eq!(Register::PC.to_string(), "PC");
        assert_eq!(Register::SP.to_string(), "SP");
        assert_eq!(Register::SR.to_string(), "SR");
        assert_eq!(Register::R3.to_string(), "R3");
        assert_eq!(Register::R15.to_string(), "R15");
    }
}
