//! The register file: sixteen 20-bit registers.
//!
//! Writes are truncated to the width of the operation which made
//! them: a byte write clears bits 19:8, a word write clears bits
//! 19:16 and an address-word write keeps all 20 bits.  PC and SP
//! always hold even values; R3 always reads as zero and ignores
//! writes.
use std::fmt::{self, Debug, Formatter};

use serde::Serialize;

use base::prelude::*;

use super::status::StatusFlags;

#[derive(Clone, PartialEq, Eq, Default, Serialize)]
pub struct RegisterFile {
    regs: [u32; 16],
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        RegisterFile::default()
    }

    /// Read the full 20 bits of a register.
    pub fn read(&self, r: Register) -> u32 {
        if r == Register::CG {
            0
        } else {
            self.regs[r.index()]
        }
    }

    /// Write `value` to `r` as an operation of width `width` would.
    pub fn write(&mut self, r: Register, value: u32, width: OperandWidth) {
        let mut value = width.truncate(value);
        if r.is_word_aligned() {
            value &= !1;
        }
        if r != Register::CG {
            self.regs[r.index()] = value;
        }
    }

    /// Write a 20-bit value with sign extension from the sign bit of
    /// `from`.  Only SXT writes registers this way.
    pub fn write_sign_extended(&mut self, r: Register, value: u32, from: OperandWidth) {
        let extended = from.sign_extend(value) as u32;
        self.write(r, extended, OperandWidth::AddressWord)
    }

    pub fn pc(&self) -> Address {
        Address::truncating(self.read(Register::PC))
    }

    pub fn set_pc(&mut self, pc: Address) {
        self.write(Register::PC, u32::from(pc), OperandWidth::AddressWord)
    }

    pub fn sp(&self) -> Address {
        Address::truncating(self.read(Register::SP))
    }

    pub fn set_sp(&mut self, sp: Address) {
        self.write(Register::SP, u32::from(sp), OperandWidth::AddressWord)
    }

    pub fn status(&self) -> StatusFlags {
        StatusFlags::from_bits(self.read(Register::SR) as u16)
    }

    pub fn set_status(&mut self, sr: StatusFlags) {
        self.write(Register::SR, u32::from(sr.bits()), OperandWidth::Word)
    }
}

impl Debug for RegisterFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let mut list = f.debug_map();
        for r in Register::ALL {
            list.entry(&r.to_string(), &format_args!("{:05X}", self.read(r)));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_write_truncates_to_width() {
        let mut regs = RegisterFile::new();
        regs.write(Register::R5, 0xF_FFFF, OperandWidth::Byte);
        assert_eq!(regs.read(Register::R5), 0xFF);
        regs.write(Register::R5, 0xF_FFFF, OperandWidth::Word);
        assert_eq!(regs.read(Register::R5), 0xFFFF);
        regs.write(Register::R5, 0xF_FFFF, OperandWidth::AddressWord);
        assert_eq!(regs.read(Register::R5), 0xF_FFFF);
    }

    #[test]
    fn test_pc_and_sp_stay_even() {
        let mut regs = RegisterFile::new();
        regs.write(Register::PC, 0x1001, OperandWidth::Word);
        assert_eq!(regs.read(Register::PC), 0x1000);
        regs.write(Register::SP, 0x2_0003, OperandWidth::AddressWord);
        assert_eq!(regs.read(Register::SP), 0x2_0002);
    }

    #[test]
    fn test_r3_reads_as_zero() {
        let mut regs = RegisterFile::new();
        regs.write(Register::CG, 0x1234, OperandWidth::Word);
        assert_eq!(regs.read(Register::CG), 0);
    }

    #[test]
    fn test_sign_extension() {
        let mut regs = RegisterFile::new();
        regs.write_sign_extended(Register::R4, 0x80, OperandWidth::Byte);
        assert_eq!(regs.read(Register::R4), 0xF_FF80);
        regs.write_sign_extended(Register::R4, 0x7F, OperandWidth::Byte);
        assert_eq!(regs.read(Register::R4), 0x7F);
    }

    #[proptest]
    fn byte_writes_clear_upper_bits(
        #[strategy(4..16_u8)] n: u8,
        #[strategy(0..=0xF_FFFF_u32)] before: u32,
        value: u32,
    ) {
        let r = Register::try_from(n).expect("valid test data");
        let mut regs = RegisterFile::new();
        regs.write(r, before, OperandWidth::AddressWord);
        regs.write(r, value, OperandWidth::Byte);
        assert_eq!(regs.read(r) & !0xFF, 0);
        regs.write(r, before, OperandWidth::AddressWord);
        regs.write(r, value, OperandWidth::Word);
        assert_eq!(regs.read(r) & !0xFFFF, 0);
        regs.write(r, value, OperandWidth::AddressWord);
        assert_eq!(regs.read(r), value & 0xF_FFFF);
    }
}
