//! Stack discipline shared by PUSH, CALL, CALLA, RET, RETI, PUSHM,
//! POPM and interrupt entry.
//!
//! The stack grows downwards.  A push decrements SP and then stores
//! at the new SP; a pop loads from SP and then increments it.  Bytes
//! and words occupy two bytes of stack, address-words four.  The
//! whole range an access needs is checked before SP moves.
use base::prelude::*;

use super::error::EmulationError;
use super::memory::Memory;
use super::transaction::Transaction;

fn slot_size(width: OperandWidth) -> u32 {
    match width {
        OperandWidth::Byte | OperandWidth::Word => 2,
        OperandWidth::AddressWord => 4,
    }
}

pub(crate) fn push<M: Memory + ?Sized>(
    tx: &mut Transaction<'_, M>,
    value: u32,
    width: OperandWidth,
) -> Result<(), EmulationError> {
    let sp = tx.regs.sp();
    let new_sp = sp
        .checked_sub(slot_size(width))
        .ok_or(EmulationError::StackOverflow(sp))?;
    tx.check_write(new_sp, width)
        .map_err(|_| EmulationError::StackOverflow(sp))?;
    tx.write(new_sp, value, width)?;
    tx.regs.set_sp(new_sp);
    Ok(())
}

pub(crate) fn pop<M: Memory + ?Sized>(
    tx: &mut Transaction<'_, M>,
    width: OperandWidth,
) -> Result<u32, EmulationError> {
    let sp = tx.regs.sp();
    let new_sp = sp
        .checked_add(slot_size(width))
        .ok_or(EmulationError::StackOverflow(sp))?;
    tx.check_read(sp, width)
        .map_err(|_| EmulationError::StackOverflow(sp))?;
    let value = tx.read(sp, width)?;
    tx.regs.set_sp(new_sp);
    Ok(value)
}
