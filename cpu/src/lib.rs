//! This crate executes decoded MSP430X instructions against a
//! register file and a memory, reporting the cycles each takes.
#![crate_name = "cpu"]

mod alu;
mod clock;
mod error;
mod execute;
mod interrupt;
mod memory;
mod registers;
mod resolver;
mod stack;
mod status;
mod step;
mod timing;
mod transaction;

pub use clock::{Clock, CycleClock, DEFAULT_FREQUENCY_HZ};
pub use error::{EmulationError, MemoryOpFailure};
pub use execute::execute;
pub use interrupt::accept_interrupt;
pub use memory::{
    read_word, read_words, BadMemorySize, FlatMemory, Memory, MemoryConfiguration,
    MAX_MEMORY_SIZE, MIN_MEMORY_SIZE,
};
pub use registers::RegisterFile;
pub use status::{Flags, StatusFlags};
pub use step::{step, StepFailure, StepOutcome};
pub use timing::INTERRUPT_CYCLES;

/// The word at this address holds the address execution starts from
/// after reset.
pub const RESET_VECTOR: base::prelude::Address = base::u20!(0xFFFE);
