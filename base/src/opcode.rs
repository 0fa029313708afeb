//! Opcode numbers for the three instruction formats and for the
//! MSP430X address instructions.
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

#[cfg(test)]
use test_strategy::Arbitrary;

/// Format I (double-operand) opcodes; the value is bits 15:12 of the
/// instruction word.
#[repr(u8)]
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DoubleOperandOpcode {
    Mov = 0x4,
    Add = 0x5,
    Addc = 0x6,
    Subc = 0x7,
    Sub = 0x8,
    Cmp = 0x9,
    Dadd = 0xA,
    Bit = 0xB,
    Bic = 0xC,
    Bis = 0xD,
    Xor = 0xE,
    And = 0xF,
}

impl DoubleOperandOpcode {
    pub const fn number(&self) -> u16 {
        *self as u16
    }

    /// CMP and BIT compute flags but discard their result.
    pub const fn stores_result(&self) -> bool {
        !matches!(self, DoubleOperandOpcode::Cmp | DoubleOperandOpcode::Bit)
    }

    /// MOV, BIC and BIS leave the status flags alone.
    pub const fn affects_flags(&self) -> bool {
        !matches!(
            self,
            DoubleOperandOpcode::Mov | DoubleOperandOpcode::Bic | DoubleOperandOpcode::Bis
        )
    }

    /// MOV does not read its destination.
    pub const fn reads_destination(&self) -> bool {
        !matches!(self, DoubleOperandOpcode::Mov)
    }

    pub const fn mnemonic(&self) -> &'static str {
        match self {
            DoubleOperandOpcode::Mov => "MOV",
            DoubleOperandOpcode::Add => "ADD",
            DoubleOperandOpcode::Addc => "ADDC",
            DoubleOperandOpcode::Subc => "SUBC",
            DoubleOperandOpcode::Sub => "SUB",
            DoubleOperandOpcode::Cmp => "CMP",
            DoubleOperandOpcode::Dadd => "DADD",
            DoubleOperandOpcode::Bit => "BIT",
            DoubleOperandOpcode::Bic => "BIC",
            DoubleOperandOpcode::Bis => "BIS",
            DoubleOperandOpcode::Xor => "XOR",
            DoubleOperandOpcode::And => "AND",
        }
    }
}

impl TryFrom<u16> for DoubleOperandOpcode {
    type Error = u16;
    fn try_from(n: u16) -> Result<DoubleOperandOpcode, u16> {
        use DoubleOperandOpcode::*;
        match n {
            0x4 => Ok(Mov),
            0x5 => Ok(Add),
            0x6 => Ok(Addc),
            0x7 => Ok(Subc),
            0x8 => Ok(Sub),
            0x9 => Ok(Cmp),
            0xA => Ok(Dadd),
            0xB => Ok(Bit),
            0xC => Ok(Bic),
            0xD => Ok(Bis),
            0xE => Ok(Xor),
            0xF => Ok(And),
            _ => Err(n),
        }
    }
}

/// Format II (single-operand) opcodes; the value is bits 9:7 of the
/// instruction word.  RETI (6) has no operand and is represented
/// separately, and 7 is the CALLA group.
#[repr(u8)]
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SingleOperandOpcode {
    Rrc = 0,
    Swpb = 1,
    Rra = 2,
    Sxt = 3,
    Push = 4,
    Call = 5,
}

impl SingleOperandOpcode {
    pub const fn number(&self) -> u16 {
        *self as u16
    }

    /// RRC, SWPB, RRA and SXT write their result back to the operand.
    pub const fn is_read_modify_write(&self) -> bool {
        matches!(
            self,
            SingleOperandOpcode::Rrc
                | SingleOperandOpcode::Swpb
                | SingleOperandOpcode::Rra
                | SingleOperandOpcode::Sxt
        )
    }

    pub const fn mnemonic(&self) -> &'static str {
        match self {
            SingleOperandOpcode::Rrc => "RRC",
            SingleOperandOpcode::Swpb => "SWPB",
            SingleOperandOpcode::Rra => "RRA",
            SingleOperandOpcode::Sxt => "SXT",
            SingleOperandOpcode::Push => "PUSH",
            SingleOperandOpcode::Call => "CALL",
        }
    }
}

impl TryFrom<u16> for SingleOperandOpcode {
    type Error = u16;
    fn try_from(n: u16) -> Result<SingleOperandOpcode, u16> {
        match n {
            0 => Ok(SingleOperandOpcode::Rrc),
            1 => Ok(SingleOperandOpcode::Swpb),
            2 => Ok(SingleOperandOpcode::Rra),
            3 => Ok(SingleOperandOpcode::Sxt),
            4 => Ok(SingleOperandOpcode::Push),
            5 => Ok(SingleOperandOpcode::Call),
            _ => Err(n),
        }
    }
}

/// Format III jump conditions; the value is bits 12:10 of the
/// instruction word.
#[repr(u8)]
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Condition {
    /// JNE/JNZ: jump if Z is clear.
    Jne = 0,
    /// JEQ/JZ: jump if Z is set.
    Jeq = 1,
    /// JNC/JLO: jump if C is clear.
    Jnc = 2,
    /// JC/JHS: jump if C is set.
    Jc = 3,
    Jn = 4,
    /// Jump if N xor V is clear.
    Jge = 5,
    /// Jump if N xor V is set.
    Jl = 6,
    Jmp = 7,
}

impl Condition {
    pub const JZ: Condition = Condition::Jeq;
    pub const JNZ: Condition = Condition::Jne;

    pub const ALL: [Condition; 8] = [
        Condition::Jne,
        Condition::Jeq,
        Condition::Jnc,
        Condition::Jc,
        Condition::Jn,
        Condition::Jge,
        Condition::Jl,
        Condition::Jmp,
    ];

    pub const fn number(&self) -> u16 {
        *self as u16
    }

    pub const fn from_field(field: u16) -> Condition {
        Condition::ALL[(field & 7) as usize]
    }

    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Condition::Jne => "JNE",
            Condition::Jeq => "JEQ",
            Condition::Jnc => "JNC",
            Condition::Jc => "JC",
            Condition::Jn => "JN",
            Condition::Jge => "JGE",
            Condition::Jl => "JL",
            Condition::Jmp => "JMP",
        }
    }
}

/// The four MSP430X multiple-bit rotations; the value is bits 9:8 of
/// the instruction word.
#[repr(u8)]
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RotateKind {
    /// RRCM: rotate right through carry.
    Rrc = 0,
    /// RRAM: arithmetic shift right.
    Rra = 1,
    /// RLAM: arithmetic shift left.
    Rla = 2,
    /// RRUM: logical shift right.
    Rru = 3,
}

impl RotateKind {
    pub const fn number(&self) -> u16 {
        *self as u16
    }

    pub const fn from_field(field: u16) -> RotateKind {
        match field & 3 {
            0 => RotateKind::Rrc,
            1 => RotateKind::Rra,
            2 => RotateKind::Rla,
            _ => RotateKind::Rru,
        }
    }

    pub const fn mnemonic(&self) -> &'static str {
        match self {
            RotateKind::Rrc => "RRCM",
            RotateKind::Rra => "RRAM",
            RotateKind::Rla => "RLAM",
            RotateKind::Rru => "RRUM",
        }
    }
}

/// The MSP430X address-word arithmetic instructions.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressOpcode {
    Mova,
    Cmpa,
    Adda,
    Suba,
}

impl AddressOpcode {
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            AddressOpcode::Mova => "MOVA",
            AddressOpcode::Cmpa => "CMPA",
            AddressOpcode::Adda => "ADDA",
            AddressOpcode::Suba => "SUBA",
        }
    }
}

impl Display for DoubleOperandOpcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.mnemonic())
    }
}

impl Display for SingleOperandOpcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.mnemonic())
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.mnemonic())
    }
}
