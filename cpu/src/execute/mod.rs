//! Instruction execution.
//!
//! [`execute`] runs one decoded instruction against a register file
//! and a memory, returning the number of CPU cycles it took.  The
//! work for each family of instructions is done by an `op_*` method
//! on [`Executor`]:
//!
//! - Format I (MOV, ADD, ..., AND and their `...X` forms):
//!   [`Executor::op_double_operand`]
//! - Format II (RRC, SWPB, RRA, SXT, PUSH, CALL):
//!   [`Executor::op_single_operand`]
//! - Format III (the conditional jumps): [`Executor::op_jump`]
//! - RETI, CALLA, PUSHM and POPM: [`Executor::op_reti`],
//!   [`Executor::op_calla`], [`Executor::op_pushm`],
//!   [`Executor::op_popm`]
//! - MOVA, CMPA, ADDA, SUBA and RRCM, RRAM, RLAM, RRUM:
//!   [`Executor::op_address`], [`Executor::op_rotate`]
//!
//! The emulated instructions run as the real instructions they stand
//! for, except that RET and RETA pop through the stack discipline
//! so that they fail the same way RETI and POPM do.
//!
//! On entry, PC must address the word following the instruction
//! (and its extension words), except for Format III jumps, where PC
//! addresses the jump instruction itself.
use tracing::{event, span, Level};

use base::prelude::*;

use super::error::EmulationError;
use super::memory::Memory;
use super::registers::RegisterFile;
use super::resolver::{write_location, ExtensionWords, Location};
use super::stack;
use super::timing::{RETA_CYCLES, RET_CYCLES};
use super::transaction::Transaction;

mod op_address;
mod op_control;
mod op_double;
mod op_jump;
mod op_single;

#[cfg(test)]
mod tests;

/// Execute `instruction`, whose extension words are `ext`.
///
/// On success the new state is committed and the cycle count is
/// returned.  On failure neither `regs` nor `mem` has changed.
pub fn execute<M: Memory + ?Sized>(
    instruction: &Instruction,
    regs: &mut RegisterFile,
    mem: &mut M,
    ext: &[u16],
) -> Result<u32, EmulationError> {
    let span = span!(Level::TRACE, "execute", pc = %regs.pc());
    let _enter = span.enter();

    let expected = instruction.extension_word_count();
    if ext.len() != expected {
        event!(
            Level::DEBUG,
            "{instruction} needs {expected} extension words but {} were supplied",
            ext.len()
        );
        return Err(EmulationError::ExtensionWordMismatch {
            expected,
            supplied: ext.len(),
        });
    }

    let mut executor = Executor {
        tx: Transaction::begin(regs, mem),
        ext: ExtensionWords::new(ext, regs.pc()),
    };
    match executor.dispatch(instruction) {
        Ok(cycles) => {
            let Executor { tx, .. } = executor;
            tx.commit(regs)?;
            event!(Level::TRACE, "executed {instruction} in {cycles} cycles");
            Ok(cycles)
        }
        Err(e) => {
            event!(Level::DEBUG, "{instruction} failed: {e}");
            Err(e)
        }
    }
}

/// Executes one instruction against staged state.
pub(crate) struct Executor<'m, 'e, M: Memory + ?Sized> {
    tx: Transaction<'m, M>,
    ext: ExtensionWords<'e>,
}

impl<M: Memory + ?Sized> Executor<'_, '_, M> {
    fn dispatch(&mut self, instruction: &Instruction) -> Result<u32, EmulationError> {
        match instruction {
            Instruction::DoubleOperand(inst) => self.op_double_operand(inst),
            Instruction::SingleOperand(inst) => self.op_single_operand(inst),
            Instruction::Jump(jump) => self.op_jump(jump),
            Instruction::Reti => self.op_reti(),
            Instruction::Calla(calla) => self.op_calla(calla),
            Instruction::Pushm(range) => self.op_pushm(range),
            Instruction::Popm(range) => self.op_popm(range),
            Instruction::Rotate(rot) => self.op_rotate(rot),
            Instruction::Address(inst) => self.op_address(inst),
            Instruction::Ret => {
                let target = stack::pop(&mut self.tx, OperandWidth::Word)?;
                self.branch_to(target)?;
                Ok(RET_CYCLES)
            }
            Instruction::Reta => {
                let target = stack::pop(&mut self.tx, OperandWidth::AddressWord)?;
                self.branch_to(target)?;
                Ok(RETA_CYCLES)
            }
            Instruction::Nop
            | Instruction::Br(_)
            | Instruction::Dint
            | Instruction::Eint => self.dispatch(&instruction.canonical()),
        }
    }

    /// Load PC with `target`, which must be even and inside memory.
    fn branch_to(&mut self, target: u32) -> Result<(), EmulationError> {
        let target = Address::try_from(target)
            .map_err(|_| EmulationError::AddressOutOfRange(Address::truncating(target)))?;
        if !target.is_aligned() {
            return Err(EmulationError::MisalignedTarget(target));
        }
        if target.bits() >= self.tx.memory_size() {
            return Err(EmulationError::AddressOutOfRange(target));
        }
        self.tx.regs.set_pc(target);
        Ok(())
    }

    /// Store a result.  Results written to PC are branches.
    fn store(
        &mut self,
        location: Location,
        value: u32,
        width: OperandWidth,
    ) -> Result<(), EmulationError> {
        match location {
            Location::Register(Register::PC) => self.branch_to(width.truncate(value)),
            other => write_location(&mut self.tx, other, value, width),
        }
    }

    /// The number of times a register-mode `...X` instruction runs.
    fn repetitions(&self, extension: Option<Extension>) -> (u32, bool) {
        match extension {
            Some(Extension::Register { repeat, zero_carry }) => {
                let count = match repeat {
                    Repetition::Times(n) => u32::from(n),
                    Repetition::CountIn(r) => (self.tx.regs.read(r) & 0xF) + 1,
                };
                (count, zero_carry)
            }
            _ => (1, false),
        }
    }
}
