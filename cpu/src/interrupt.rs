//! Interrupt entry.
//!
//! Accepting an interrupt pushes PC and SR, clears SR (apart from
//! SCG0) and loads PC from the interrupt vector.  Bits 19:16 of PC
//! are saved in bits 15:12 of the pushed SR, which is where RETI
//! expects to find them.
use tracing::{event, Level};

use base::prelude::*;

use super::error::EmulationError;
use super::memory::Memory;
use super::registers::RegisterFile;
use super::stack;
use super::status::StatusFlags;
use super::timing::INTERRUPT_CYCLES;
use super::transaction::Transaction;

/// Enter the handler whose address is in the vector word at
/// `vector`, returning the cycles taken.  As with `execute`, a
/// failure changes nothing.
pub fn accept_interrupt<M: Memory + ?Sized>(
    regs: &mut RegisterFile,
    mem: &mut M,
    vector: Address,
) -> Result<u32, EmulationError> {
    let mut tx = Transaction::begin(regs, mem);
    let pc = tx.regs.read(Register::PC);
    let sr = tx.regs.status();

    stack::push(&mut tx, pc & 0xFFFF, OperandWidth::Word)?;
    let saved_sr = u32::from(sr.bits() & 0x0FFF) | ((pc >> 16) << 12);
    stack::push(&mut tx, saved_sr, OperandWidth::Word)?;

    tx.regs
        .set_status(StatusFlags::from_bits(sr.bits() & StatusFlags::SCG0));
    let handler = Address::from(tx.read(vector, OperandWidth::Word)? as u16);
    if !handler.is_aligned() {
        return Err(EmulationError::MisalignedTarget(handler));
    }
    tx.regs.set_pc(handler);
    tx.commit(regs)?;
    event!(
        Level::DEBUG,
        "accepted interrupt through vector {vector}; handler at {handler}"
    );
    Ok(INTERRUPT_CYCLES)
}
