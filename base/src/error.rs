//! Basic error reporting.

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use super::operand::AddressingMode;
use super::types::OperandWidth;

/// Represents a failure to convert to or from one of the fixed-width
/// types defined in the base crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionFailed {
    TooLarge,
    TooSmall,
}

impl Error for ConversionFailed {}

impl Display for ConversionFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConversionFailed::TooLarge => f.write_str("value is too large"),
            ConversionFailed::TooSmall => f.write_str("value is too small"),
        }
    }
}

/// Signals that an instruction value could not be built because the
/// requested combination of fields does not describe a valid
/// instruction.  These are detected when the instruction is
/// constructed, so an instruction which exists can always be handed
/// to the execution engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionError {
    /// Conditional jump offsets are 10-bit signed word counts.
    JumpOffsetOutOfRange(i32),
    /// Indirect, autoincrement and immediate operands can only be
    /// used as a source.
    InvalidDestinationMode(AddressingMode),
    /// The operation cannot take its operand in this mode (for
    /// example RRC with an immediate operand, which would have
    /// nowhere to store its result).
    InvalidSourceMode(AddressingMode),
    /// The constant generators can only produce 0, 1, 2, 4, 8 and -1.
    InvalidConstant(i32),
    /// The operation does not exist at this width (e.g. SWPB.B).
    InvalidWidth(OperandWidth),
    /// PUSHM/POPM move between 1 and 16 registers, and may not run
    /// off either end of the register file.
    RegisterCountOutOfRange(u8),
    /// RRCM, RRAM, RLAM and RRUM rotate by 1 to 4 bits.
    RotateCountOutOfRange(u8),
    /// A repetition count must be between 1 and 16.
    RepeatCountOutOfRange(u8),
    /// An instruction field holds a value too wide for its encoding.
    ValueOutOfRange(u32),
}

impl Display for InstructionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            InstructionError::JumpOffsetOutOfRange(n) => {
                write!(f, "jump offset {n} is outside the range -512..=511")
            }
            InstructionError::InvalidDestinationMode(mode) => {
                write!(f, "addressing mode {mode:?} cannot be used for a destination")
            }
            InstructionError::InvalidSourceMode(mode) => {
                write!(f, "addressing mode {mode:?} cannot be used for this operand")
            }
            InstructionError::InvalidConstant(n) => {
                write!(f, "{n} is not a value the constant generators can produce")
            }
            InstructionError::InvalidWidth(w) => {
                write!(f, "operation is not available at width {w:?}")
            }
            InstructionError::RegisterCountOutOfRange(n) => {
                write!(f, "register count {n} is out of range")
            }
            InstructionError::RotateCountOutOfRange(n) => {
                write!(f, "rotate count {n} is outside the range 1..=4")
            }
            InstructionError::RepeatCountOutOfRange(n) => {
                write!(f, "repeat count {n} is outside the range 1..=16")
            }
            InstructionError::ValueOutOfRange(n) => {
                write!(f, "value {n:#x} does not fit in its instruction field")
            }
        }
    }
}

impl Error for InstructionError {}

/// Signals that a sequence of words could not be decoded into an
/// instruction.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailure {
    /// No words were supplied, or an extension prefix was the last
    /// word supplied.
    Truncated,
    /// The word does not correspond to a known operation.
    InvalidOpcode(u16),
    /// An extension prefix selected the reserved A/L=0, B/W=0 width.
    ReservedWidth(u16),
    /// An extension prefix preceded something other than a Format I
    /// or Format II instruction.
    MisplacedPrefix { prefix: u16, word: u16 },
    /// The fields decoded correctly but describe an invalid
    /// instruction.
    Invalid(InstructionError),
}

impl Debug for DecodeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeFailure::Truncated => f.write_str("Truncated"),
            DecodeFailure::InvalidOpcode(w) => write!(f, "InvalidOpcode({w:#06x})"),
            DecodeFailure::ReservedWidth(w) => write!(f, "ReservedWidth({w:#06x})"),
            DecodeFailure::MisplacedPrefix { prefix, word } => {
                write!(f, "MisplacedPrefix({prefix:#06x}, {word:#06x})")
            }
            DecodeFailure::Invalid(e) => write!(f, "Invalid({e:?})"),
        }
    }
}

impl Display for DecodeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeFailure::Truncated => f.write_str("instruction is truncated"),
            DecodeFailure::InvalidOpcode(w) => write!(f, "invalid opcode {w:04X}h"),
            DecodeFailure::ReservedWidth(w) => {
                write!(f, "extension word {w:04X}h selects a reserved operand width")
            }
            DecodeFailure::MisplacedPrefix { prefix, word } => write!(
                f,
                "extension word {prefix:04X}h cannot precede instruction {word:04X}h"
            ),
            DecodeFailure::Invalid(e) => write!(f, "invalid instruction: {e}"),
        }
    }
}

impl Error for DecodeFailure {}

impl From<InstructionError> for DecodeFailure {
    fn from(e: InstructionError) -> DecodeFailure {
        DecodeFailure::Invalid(e)
    }
}
