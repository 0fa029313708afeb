//! Fetch, decode and execute a single instruction.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use tracing::{event, Level};

use base::prelude::*;

use super::error::EmulationError;
use super::execute::execute;
use super::memory::{read_word, read_words, Memory};
use super::registers::RegisterFile;

/// What happened in one successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Where the instruction was fetched from.
    pub address: Address,
    pub instruction: Instruction,
    pub cycles: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFailure {
    /// The words at `address` are not an instruction.
    Decode {
        address: Address,
        failure: DecodeFailure,
    },
    /// The instruction could not be fetched or executed.
    Execute(EmulationError),
}

impl Display for StepFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            StepFailure::Decode { address, failure } => {
                write!(f, "cannot decode instruction at {address}: {failure}")
            }
            StepFailure::Execute(e) => write!(f, "execution failed: {e}"),
        }
    }
}

impl Error for StepFailure {}

impl From<EmulationError> for StepFailure {
    fn from(e: EmulationError) -> StepFailure {
        StepFailure::Execute(e)
    }
}

fn fetch<M: Memory + ?Sized>(
    mem: &mut M,
    at: Address,
) -> Result<(Instruction, usize), StepFailure> {
    let decode_failure = |failure| StepFailure::Decode {
        address: at,
        failure,
    };
    let first = read_word(mem, at).map_err(EmulationError::from)?;
    let mut words = vec![first];
    if let Err(DecodeFailure::Truncated) = base::instruction::decode(&words) {
        // An extension prefix; its instruction word follows.
        words.push(read_word(mem, at.index_by(2_u32)).map_err(EmulationError::from)?);
    }
    let decoded = base::instruction::decode(&words).map_err(decode_failure)?;
    Ok((decoded.instruction, decoded.opcode_words))
}

/// Execute the instruction at PC.
///
/// PC is advanced past the instruction and its extension words
/// before execution, except for jumps, which compute their target
/// from the address of the jump itself.  Like [`execute`], a failed
/// step changes neither `regs` nor `mem`.
pub fn step<M: Memory + ?Sized>(
    regs: &mut RegisterFile,
    mem: &mut M,
) -> Result<StepOutcome, StepFailure> {
    let address = regs.pc();
    let (instruction, opcode_words) = fetch(mem, address)?;
    let ext_count = instruction.extension_word_count();
    let ext_start = address.index_by(2 * opcode_words as u32);
    let ext = read_words(mem, ext_start, ext_count).map_err(EmulationError::from)?;

    let mut staged = regs.clone();
    if instruction.format() != InstructionFormat::Jump {
        let length = 2 * (opcode_words + ext_count) as u32;
        let next = address
            .checked_add(length)
            .ok_or(EmulationError::AddressOutOfRange(address))?;
        staged.set_pc(next);
    }
    event!(Level::TRACE, "{address}: {instruction}");
    let cycles = execute(&instruction, &mut staged, mem, &ext)?;
    *regs = staged;
    Ok(StepOutcome {
        address,
        instruction,
        cycles,
    })
}
