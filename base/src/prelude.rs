//! The prelude exports the structs which are useful in representing
//! MSP430X instructions and machine state.  Providing this prelude is
//! the main purpose of the base crate.
pub use super::error::*;
pub use super::instruction::*;
pub use super::opcode::*;
pub use super::operand::*;
pub use super::register::*;
pub use super::types::IndexBy;
pub use super::types::*;
pub use super::u20;
