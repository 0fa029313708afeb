//! The MSP430X registers and its address space are 20 bits wide.
//! Plain MSP430 code only ever sees the bottom 16 bits, and byte
//! operations only the bottom 8; [`OperandWidth`] captures which of
//! those views an operation uses.
use std::fmt::{self, Debug, Display, Formatter, LowerHex, UpperHex};

use serde::Serialize;

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::ConversionFailed;

/// The `IndexBy` trait implements address arithmetic (adding a signed
/// or unsigned value to an address).
///
/// Address arithmetic on the MSP430X wraps modulo 2^20; an indexed
/// operand whose base plus index runs off the top of the address
/// space comes back in at the bottom.  Whether the resulting address
/// is actually backed by memory is for the memory to decide.
pub trait IndexBy<T> {
    fn index_by(&self, delta: T) -> Address;
}

/// A 20-bit MSP430X address.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Address(#[cfg_attr(test, strategy(0..=Address::MASK))] u32);

impl Address {
    pub const BITS: u32 = 20;
    pub const MASK: u32 = (1 << Self::BITS) - 1;
    pub const ZERO: Address = Address(0);
    pub const MAX: Address = Address(Self::MASK);

    /// Build an address constant, failing at compile time if it does
    /// not fit in 20 bits.  Used by the [`u20!`](crate::u20) macro.
    pub const fn new<const N: u32>() -> Address {
        struct Helper<const M: u32>;
        impl<const M: u32> Helper<M> {
            const A: Address = {
                if M > Address::MASK {
                    panic!("input value is out of range")
                } else {
                    Address(M)
                }
            };
        }
        Helper::<N>::A
    }

    /// Keep only the bottom 20 bits of `bits`.
    pub const fn truncating(bits: u32) -> Address {
        Address(bits & Self::MASK)
    }

    /// Join the four high bits carried by an extension prefix (or
    /// an instruction's own opcode word) to a 16-bit extension word.
    pub const fn from_parts(high: u8, low: u16) -> Address {
        Address((((high & 0xF) as u32) << 16) | low as u32)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn low_word(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    pub const fn high_nibble(&self) -> u8 {
        ((self.0 >> 16) & 0xF) as u8
    }

    /// Instructions and word operands live at even addresses.
    pub const fn is_aligned(&self) -> bool {
        self.0 & 1 == 0
    }

    /// Add `n` without wrapping; `None` means the result would fall
    /// outside the 20-bit address space.
    pub fn checked_add(&self, n: u32) -> Option<Address> {
        self.0
            .checked_add(n)
            .filter(|sum| *sum <= Self::MASK)
            .map(Address)
    }

    /// Subtract `n` without wrapping below address 0.
    pub fn checked_sub(&self, n: u32) -> Option<Address> {
        self.0.checked_sub(n).map(Address)
    }
}

impl IndexBy<i32> for Address {
    fn index_by(&self, delta: i32) -> Address {
        Address::truncating(self.0.wrapping_add_signed(delta))
    }
}

impl IndexBy<u32> for Address {
    fn index_by(&self, delta: u32) -> Address {
        Address::truncating(self.0.wrapping_add(delta))
    }
}

impl From<u16> for Address {
    fn from(w: u16) -> Address {
        Address(u32::from(w))
    }
}

impl From<Address> for u32 {
    fn from(a: Address) -> u32 {
        a.0
    }
}

impl TryFrom<u32> for Address {
    type Error = ConversionFailed;
    fn try_from(n: u32) -> Result<Address, ConversionFailed> {
        if n > Address::MASK {
            Err(ConversionFailed::TooLarge)
        } else {
            Ok(Address(n))
        }
    }
}

impl TryFrom<usize> for Address {
    type Error = ConversionFailed;
    fn try_from(n: usize) -> Result<Address, ConversionFailed> {
        match u32::try_from(n) {
            Ok(n) => Address::try_from(n),
            Err(_) => Err(ConversionFailed::TooLarge),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:05X}h", self.0)
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Address({:#07x})", self.0)
    }
}

impl LowerHex for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        LowerHex::fmt(&self.0, f)
    }
}

impl UpperHex for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        UpperHex::fmt(&self.0, f)
    }
}

/// The width of the data an instruction operates on.
///
/// Plain MSP430 instructions select between `Byte` and `Word` with
/// their B/W bit.  MSP430X instructions (those preceded by an
/// extension prefix, and the address instructions such as MOVA) can
/// also operate on 20-bit address-words.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperandWidth {
    Byte,
    Word,
    AddressWord,
}

impl OperandWidth {
    /// Mask selecting the bits of a register or datum which are
    /// significant at this width.
    pub const fn mask(&self) -> u32 {
        match self {
            OperandWidth::Byte => 0xFF,
            OperandWidth::Word => 0xFFFF,
            OperandWidth::AddressWord => Address::MASK,
        }
    }

    /// The most significant (sign) bit at this width.
    pub const fn sign_bit(&self) -> u32 {
        match self {
            OperandWidth::Byte => 0x80,
            OperandWidth::Word => 0x8000,
            OperandWidth::AddressWord => 0x8_0000,
        }
    }

    pub const fn bits(&self) -> u32 {
        match self {
            OperandWidth::Byte => 8,
            OperandWidth::Word => 16,
            OperandWidth::AddressWord => 20,
        }
    }

    /// Number of bytes occupied in memory.  An address-word occupies
    /// two consecutive words, the upper one holding bits 19:16 in
    /// its low nibble.
    pub const fn memory_bytes(&self) -> u32 {
        match self {
            OperandWidth::Byte => 1,
            OperandWidth::Word => 2,
            OperandWidth::AddressWord => 4,
        }
    }

    pub const fn truncate(&self, value: u32) -> u32 {
        value & self.mask()
    }

    pub const fn is_negative(&self, value: u32) -> bool {
        value & self.sign_bit() != 0
    }

    /// Reinterpret the bottom bits of `value` as a signed quantity of
    /// this width.
    pub const fn sign_extend(&self, value: u32) -> i32 {
        let shift = 32 - self.bits();
        ((value << shift) as i32) >> shift
    }

    /// The assembler suffix (`.B`, `.A`) which selects this width.
    pub const fn suffix(&self) -> &'static str {
        match self {
            OperandWidth::Byte => ".B",
            OperandWidth::Word => "",
            OperandWidth::AddressWord => ".A",
        }
    }
}
