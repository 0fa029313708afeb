//! The status register (R2).
//!
//! | Bit | Name | Meaning |
//! | --- | ---- | ------- |
//! | 0 | C | Carry |
//! | 1 | Z | Zero |
//! | 2 | N | Negative |
//! | 3 | GIE | General interrupt enable |
//! | 4 | CPUOFF | CPU halted (low-power mode) |
//! | 5 | OSCOFF | Oscillator off |
//! | 6 | SCG0 | System clock generator 0 off |
//! | 7 | SCG1 | System clock generator 1 off |
//! | 8 | V | Overflow |
//!
//! Bits 9-15 are reserved.
use std::fmt::{self, Debug, Formatter};

use serde::Serialize;

/// The arithmetic flags computed by an ALU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Flags {
    pub n: bool,
    pub z: bool,
    pub c: bool,
    pub v: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusFlags(u16);

impl StatusFlags {
    pub const C: u16 = 1 << 0;
    pub const Z: u16 = 1 << 1;
    pub const N: u16 = 1 << 2;
    pub const GIE: u16 = 1 << 3;
    pub const CPUOFF: u16 = 1 << 4;
    pub const OSCOFF: u16 = 1 << 5;
    pub const SCG0: u16 = 1 << 6;
    pub const SCG1: u16 = 1 << 7;
    pub const V: u16 = 1 << 8;

    const ARITHMETIC: u16 = Self::C | Self::Z | Self::N | Self::V;

    pub const fn from_bits(bits: u16) -> StatusFlags {
        StatusFlags(bits)
    }

    pub const fn bits(&self) -> u16 {
        self.0
    }

    const fn get(&self, mask: u16) -> bool {
        self.0 & mask != 0
    }

    fn set(&mut self, mask: u16, value: bool) {
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    pub const fn carry(&self) -> bool {
        self.get(Self::C)
    }

    pub const fn zero(&self) -> bool {
        self.get(Self::Z)
    }

    pub const fn negative(&self) -> bool {
        self.get(Self::N)
    }

    pub const fn overflow(&self) -> bool {
        self.get(Self::V)
    }

    pub const fn gie(&self) -> bool {
        self.get(Self::GIE)
    }

    pub const fn cpu_off(&self) -> bool {
        self.get(Self::CPUOFF)
    }

    pub const fn oscoff(&self) -> bool {
        self.get(Self::OSCOFF)
    }

    pub const fn scg0(&self) -> bool {
        self.get(Self::SCG0)
    }

    pub const fn scg1(&self) -> bool {
        self.get(Self::SCG1)
    }

    pub fn set_carry(&mut self, value: bool) {
        self.set(Self::C, value)
    }

    pub fn set_zero(&mut self, value: bool) {
        self.set(Self::Z, value)
    }

    pub fn set_negative(&mut self, value: bool) {
        self.set(Self::N, value)
    }

    pub fn set_overflow(&mut self, value: bool) {
        self.set(Self::V, value)
    }

    pub fn set_gie(&mut self, value: bool) {
        self.set(Self::GIE, value)
    }

    pub fn set_cpu_off(&mut self, value: bool) {
        self.set(Self::CPUOFF, value)
    }

    pub fn set_oscoff(&mut self, value: bool) {
        self.set(Self::OSCOFF, value)
    }

    pub fn set_scg0(&mut self, value: bool) {
        self.set(Self::SCG0, value)
    }

    pub fn set_scg1(&mut self, value: bool) {
        self.set(Self::SCG1, value)
    }

    /// The four arithmetic flags.
    pub fn flags(&self) -> Flags {
        Flags {
            n: self.negative(),
            z: self.zero(),
            c: self.carry(),
            v: self.overflow(),
        }
    }

    /// Overwrite all four arithmetic flags together, leaving the
    /// mode bits alone.
    pub fn apply(&mut self, flags: Flags) {
        self.0 &= !Self::ARITHMETIC;
        self.set_negative(flags.n);
        self.set_zero(flags.z);
        self.set_carry(flags.c);
        self.set_overflow(flags.v);
    }
}

impl Debug for StatusFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        const NAMES: [(u16, &str); 9] = [
            (StatusFlags::V, "V"),
            (StatusFlags::SCG1, "SCG1"),
            (StatusFlags::SCG0, "SCG0"),
            (StatusFlags::OSCOFF, "OSCOFF"),
            (StatusFlags::CPUOFF, "CPUOFF"),
            (StatusFlags::GIE, "GIE"),
            (StatusFlags::N, "N"),
            (StatusFlags::Z, "Z"),
            (StatusFlags::C, "C"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(mask, _)| self.get(*mask))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "StatusFlags({:#06x} [{}])", self.0, set.join(" "))
    }
}
