//! Execution-time failures.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use base::prelude::*;

/// A memory read or write which the memory implementation refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemoryOpFailure {
    /// Nothing is mapped at the address.
    NotMapped(Address),
    /// The address is mapped to something which cannot be written.
    ReadOnly(Address),
}

impl MemoryOpFailure {
    pub fn address(&self) -> Address {
        match self {
            MemoryOpFailure::NotMapped(a) | MemoryOpFailure::ReadOnly(a) => *a,
        }
    }
}

impl Display for MemoryOpFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            MemoryOpFailure::NotMapped(addr) => {
                write!(f, "address {addr} is not mapped to functioning memory")
            }
            MemoryOpFailure::ReadOnly(addr) => {
                write!(f, "address {addr} is mapped to read-only memory")
            }
        }
    }
}

impl Error for MemoryOpFailure {}

/// The ways in which executing an instruction can fail.
///
/// Whenever `execute` returns one of these, the register file and
/// memory are exactly as they were before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmulationError {
    /// The caller supplied a different number of extension words
    /// than the instruction needs.
    ExtensionWordMismatch { expected: usize, supplied: usize },
    /// A push would move SP below address 0 or write outside memory,
    /// or a pop would read outside memory.  The value is SP at the
    /// time of the failing access.
    StackOverflow(Address),
    /// The instruction computed an odd value for PC.
    MisalignedTarget(Address),
    /// A computed address lies outside the 20-bit address space or
    /// outside the memory.
    AddressOutOfRange(Address),
}

impl Display for EmulationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EmulationError::ExtensionWordMismatch { expected, supplied } => write!(
                f,
                "instruction needs {expected} extension word(s) but {supplied} were supplied"
            ),
            EmulationError::StackOverflow(sp) => {
                write!(f, "stack access at SP={sp} is outside memory")
            }
            EmulationError::MisalignedTarget(target) => {
                write!(f, "control transfer to odd address {target}")
            }
            EmulationError::AddressOutOfRange(addr) => {
                write!(f, "address {addr} is out of range")
            }
        }
    }
}

impl Error for EmulationError {}

impl From<MemoryOpFailure> for EmulationError {
    fn from(e: MemoryOpFailure) -> EmulationError {
        EmulationError::AddressOutOfRange(e.address())
    }
}
