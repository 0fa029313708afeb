//! Operand addressing modes.
//!
//! Source operands are encoded in a 2-bit `As` field plus a register
//! number; destination operands in a 1-bit `Ad` field plus a register
//! number.  The register number changes the meaning of some
//! encodings:
//!
//! | As | Rn | Mode | Extension word |
//! | -- | -- | ---- | -------------- |
//! | 00 | any | Register `Rn` (R3 reads as 0) | no |
//! | 01 | R0 | Symbolic `EDE` | yes |
//! | 01 | R2 | Absolute `&EDE` | yes |
//! | 01 | R3 | Constant `#1` | no |
//! | 01 | other | Indexed `x(Rn)` | yes |
//! | 10 | R2 | Constant `#4` | no |
//! | 10 | R3 | Constant `#2` | no |
//! | 10 | other | Indirect `@Rn` | no |
//! | 11 | R0 | Immediate `#N` | yes |
//! | 11 | R2 | Constant `#8` | no |
//! | 11 | R3 | Constant `#-1` | no |
//! | 11 | other | Indirect autoincrement `@Rn+` | no |
//!
//! Destinations only have the first two rows (`Ad` = 0 or 1).
use serde::Serialize;

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::InstructionError;
use super::register::Register;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressingMode {
    Register,
    Indexed,
    Symbolic,
    Absolute,
    Indirect,
    IndirectAutoIncrement,
    Immediate,
}

impl AddressingMode {
    /// Indirect, autoincrement and immediate modes exist only for
    /// source operands.
    pub const fn is_valid_destination(&self) -> bool {
        matches!(
            self,
            AddressingMode::Register
                | AddressingMode::Indexed
                | AddressingMode::Symbolic
                | AddressingMode::Absolute
        )
    }

    /// Modes which take their index or address from an extension
    /// word.
    pub const fn is_indexed_form(&self) -> bool {
        matches!(
            self,
            AddressingMode::Indexed | AddressingMode::Symbolic | AddressingMode::Absolute
        )
    }
}

/// An operand: an addressing mode applied to a register.
///
/// Constant-generator operands are represented as `Immediate` with a
/// known value; they need no extension word.  The constant 0 is
/// simply register mode on R3, which always reads as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Operand {
    mode: AddressingMode,
    register: Register,
    constant: Option<i8>,
}

impl Operand {
    pub const fn register(r: Register) -> Operand {
        Operand {
            mode: AddressingMode::Register,
            register: r,
            constant: None,
        }
    }

    /// `x(Rn)`.  Indexing from PC is symbolic mode and indexing from
    /// SR (or R3, which reads as zero) is absolute mode, so those
    /// registers yield the corresponding operand.
    pub const fn indexed(r: Register) -> Operand {
        match r {
            Register::R0 => Operand::symbolic(),
            Register::R2 | Register::R3 => Operand::absolute(),
            _ => Operand {
                mode: AddressingMode::Indexed,
                register: r,
                constant: None,
            },
        }
    }

    /// `EDE`: an address relative to the extension word holding it.
    pub const fn symbolic() -> Operand {
        Operand {
            mode: AddressingMode::Symbolic,
            register: Register::PC,
            constant: None,
        }
    }

    /// `&EDE`.
    pub const fn absolute() -> Operand {
        Operand {
            mode: AddressingMode::Absolute,
            register: Register::SR,
            constant: None,
        }
    }

    /// `@Rn`.  The `As` encodings which would mean `@SR` and `@R3`
    /// are constant generators instead.
    pub fn indirect(r: Register) -> Result<Operand, InstructionError> {
        if r.is_constant_generator() {
            Err(InstructionError::InvalidSourceMode(AddressingMode::Indirect))
        } else {
            Ok(Operand {
                mode: AddressingMode::Indirect,
                register: r,
                constant: None,
            })
        }
    }

    /// `@Rn+`.  `@PC+` is immediate mode.
    pub fn autoincrement(r: Register) -> Result<Operand, InstructionError> {
        match r {
            Register::R0 => Ok(Operand::immediate()),
            Register::R2 | Register::R3 => Err(InstructionError::InvalidSourceMode(
                AddressingMode::IndirectAutoIncrement,
            )),
            _ => Ok(Operand {
                mode: AddressingMode::IndirectAutoIncrement,
                register: r,
                constant: None,
            }),
        }
    }

    /// `#N`, taking its value from an extension word.
    pub const fn immediate() -> Operand {
        Operand {
            mode: AddressingMode::Immediate,
            register: Register::PC,
            constant: None,
        }
    }

    /// `#N` for one of the values the constant generators produce.
    pub fn constant(value: i32) -> Result<Operand, InstructionError> {
        let (register, value) = match value {
            0 => return Ok(Operand::register(Register::CG)),
            1 => (Register::R3, 1),
            2 => (Register::R3, 2),
            -1 => (Register::R3, -1),
            4 => (Register::R2, 4),
            8 => (Register::R2, 8),
            other => return Err(InstructionError::InvalidConstant(other)),
        };
        Ok(Operand {
            mode: AddressingMode::Immediate,
            register,
            constant: Some(value),
        })
    }

    /// Decode a source operand from its `As` field and register
    /// number.
    pub fn from_source_fields(r: Register, as_bits: u16) -> Operand {
        match (as_bits & 3, r) {
            (0, _) => Operand::register(r),
            (1, Register::R3) => Operand::cg(r, 1),
            (1, _) => Operand::indexed(r),
            (2, Register::R2) => Operand::cg(r, 4),
            (2, Register::R3) => Operand::cg(r, 2),
            (2, _) => Operand {
                mode: AddressingMode::Indirect,
                register: r,
                constant: None,
            },
            (_, Register::R0) => Operand::immediate(),
            (_, Register::R2) => Operand::cg(r, 8),
            (_, Register::R3) => Operand::cg(r, -1),
            (_, _) => Operand {
                mode: AddressingMode::IndirectAutoIncrement,
                register: r,
                constant: None,
            },
        }
    }

    /// Decode a destination operand from its `Ad` bit and register
    /// number.
    pub fn from_destination_fields(r: Register, ad_bit: u16) -> Operand {
        if ad_bit & 1 == 0 {
            Operand::register(r)
        } else {
            Operand::indexed(r)
        }
    }

    const fn cg(register: Register, value: i8) -> Operand {
        Operand {
            mode: AddressingMode::Immediate,
            register,
            constant: Some(value),
        }
    }

    pub const fn mode(&self) -> AddressingMode {
        self.mode
    }

    pub const fn register_name(&self) -> Register {
        self.register
    }

    /// The value supplied by a constant generator, if this operand
    /// is one.
    pub const fn constant_value(&self) -> Option<i32> {
        match self.constant {
            Some(n) => Some(n as i32),
            None => None,
        }
    }

    /// The number of extension words (0 or 1) this operand consumes.
    pub const fn extension_words(&self) -> usize {
        match self.mode {
            AddressingMode::Indexed | AddressingMode::Symbolic | AddressingMode::Absolute => 1,
            AddressingMode::Immediate => {
                if self.constant.is_some() {
                    0
                } else {
                    1
                }
            }
            AddressingMode::Register
            | AddressingMode::Indirect
            | AddressingMode::IndirectAutoIncrement => 0,
        }
    }

    /// True for operands which are read from or written to a
    /// register rather than memory (constants included).
    pub const fn is_register_like(&self) -> bool {
        matches!(self.mode, AddressingMode::Register)
            || (matches!(self.mode, AddressingMode::Immediate) && self.constant.is_some())
    }

    pub fn check_destination(&self) -> Result<(), InstructionError> {
        if self.mode.is_valid_destination() {
            Ok(())
        } else {
            Err(InstructionError::InvalidDestinationMode(self.mode))
        }
    }

    /// The register number and `As` bits which encode this operand
    /// as a source.
    pub const fn source_fields(&self) -> (u16, u16) {
        let as_bits: u16 = match (self.mode, self.constant) {
            (AddressingMode::Register, _) => 0,
            (
                AddressingMode::Indexed | AddressingMode::Symbolic | AddressingMode::Absolute,
                _,
            ) => 1,
            (AddressingMode::Indirect, _) => 2,
            (AddressingMode::IndirectAutoIncrement, _) => 3,
            (AddressingMode::Immediate, None) => 3,
            (AddressingMode::Immediate, Some(1 | 4)) => {
                // #1 is R3/01, #4 is R2/10.
                if self.register.number() == 3 {
                    1
                } else {
                    2
                }
            }
            (AddressingMode::Immediate, Some(2)) => 2,
            (AddressingMode::Immediate, Some(_)) => 3,
        };
        (self.register.number() as u16, as_bits)
    }

    /// The register number and `Ad` bit which encode this operand as
    /// a destination.  Only meaningful for valid destinations.
    pub const fn destination_fields(&self) -> (u16, u16) {
        let ad = if matches!(self.mode, AddressingMode::Register) {
            0
        } else {
            1
        };
        (self.register.number() as u16, ad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_generators() {
        let cases: [(Register, u16, i32); 5] = [
            (Register::R3, 1, 1),
            (Register::R3, 2, 2),
            (Register::R3, 3, -1),
            (Register::R2, 2, 4),
            (Register::R2, 3, 8),
        ];
        for (reg, as_bits, value) in cases {
            let op = Operand::from_source_fields(reg, as_bits);
            assert_eq!(op.mode(), AddressingMode::Immediate);
            assert_eq!(op.constant_value(), Some(value));
            assert_eq!(op.extension_words(), 0);
            assert_eq!(op.source_fields(), (u16::from(reg.number()), as_bits));
            assert_eq!(Operand::constant(value), Ok(op));
        }
        assert_eq!(
            Operand::constant(0),
            Ok(Operand::register(Register::R3))
        );
        assert_eq!(
            Operand::constant(3),
            Err(InstructionError::InvalidConstant(3))
        );
    }

    #[test]
    fn test_special_register_encodings() {
        assert_eq!(
            Operand::from_source_fields(Register::R0, 1).mode(),
            AddressingMode::Symbolic
        );
        assert_eq!(
            Operand::from_source_fields(Register::R2, 1).mode(),
            AddressingMode::Absolute
        );
        assert_eq!(
            Operand::from_source_fields(Register::R0, 3),
            Operand::immediate()
        );
        assert_eq!(Operand::immediate().extension_words(), 1);
        assert_eq!(Operand::autoincrement(Register::R0), Ok(Operand::immediate()));
        assert!(Operand::indirect(Register::R2).is_err());
    }

    #[test]
    fn test_destination_restrictions() {
        let indirect = Operand::indirect(Register::R5).expect("valid test data");
        assert_eq!(
            indirect.check_destination(),
            Err(InstructionError::InvalidDestinationMode(
                AddressingMode::Indirect
            ))
        );
        assert!(Operand::immediate().check_destination().is_err());
        assert!(Operand::indexed(Register::R9).check_destination().is_ok());
        assert!(Operand::absolute().check_destination().is_ok());
    }

    #[test]
    fn test_source_fields_round_trip() {
        for r in Register::ALL {
            for as_bits in 0..4_u16 {
                let op = Operand::from_source_fields(r, as_bits);
                let (n, a) = op.source_fields();
                let reg = Register::from_field(n);
                assert_eq!(Operand::from_source_fields(reg, a), op);
            }
        }
    }
}
