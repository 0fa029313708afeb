use tracing::{event, Level};

use base::prelude::*;

use super::Executor;
use crate::error::EmulationError;
use crate::memory::Memory;
use crate::resolver::{read_location, resolve, Location, Reach};
use crate::stack;
use crate::status::StatusFlags;
use crate::timing::{calla_cycles, multiple_register_cycles, RETI_CYCLES};

/// SR bits 15:12 carry PC bits 19:16 while on the stack.
const SAVED_PC_HIGH_SHIFT: u32 = 12;

/// ## Subroutine and stack instructions
///
/// - RETI: [`Executor::op_reti`]
/// - CALLA: [`Executor::op_calla`]
/// - PUSHM, POPM: [`Executor::op_pushm`], [`Executor::op_popm`]
impl<M: Memory + ?Sized> Executor<'_, '_, M> {
    /// Return from interrupt: pop SR, then PC.
    pub(crate) fn op_reti(&mut self) -> Result<u32, EmulationError> {
        let saved_sr = stack::pop(&mut self.tx, OperandWidth::Word)?;
        let pc_low = stack::pop(&mut self.tx, OperandWidth::Word)?;
        let target = ((saved_sr >> SAVED_PC_HIGH_SHIFT) << 16) | pc_low;
        let sr = StatusFlags::from_bits((saved_sr & 0x0FFF) as u16);
        event!(Level::TRACE, "RETI restores {sr:?}");
        self.tx.regs.set_status(sr);
        self.branch_to(target)?;
        Ok(RETI_CYCLES)
    }

    /// Push the 20-bit return address and branch.
    pub(crate) fn op_calla(&mut self, calla: &Calla) -> Result<u32, EmulationError> {
        let width = OperandWidth::AddressWord;
        let target_operand = calla.target();
        // EDE carries a full 20-bit offset; x(Rdst) a signed 16-bit one.
        let reach = match target_operand.mode() {
            AddressingMode::Symbolic => Reach::Extended { high: calla.high() },
            _ => Reach::Address { high: calla.high() },
        };
        let location = resolve(&target_operand, width, reach, &mut self.ext, &mut self.tx)?;
        let target = read_location(&mut self.tx, location, width)?;
        let return_address = self.tx.regs.read(Register::PC);
        stack::push(&mut self.tx, return_address, width)?;
        self.branch_to(target)?;
        Ok(calla_cycles(&target_operand))
    }

    /// Push registers, highest first, so that the lowest-numbered
    /// register ends up at the lowest address.
    pub(crate) fn op_pushm(&mut self, range: &RegisterRange) -> Result<u32, EmulationError> {
        for r in range.registers().rev() {
            let value = self.tx.regs.read(r);
            stack::push(&mut self.tx, value, range.width())?;
        }
        Ok(multiple_register_cycles(range.count()))
    }

    pub(crate) fn op_popm(&mut self, range: &RegisterRange) -> Result<u32, EmulationError> {
        for r in range.registers() {
            let value = stack::pop(&mut self.tx, range.width())?;
            self.store(Location::Register(r), value, range.width())?;
        }
        Ok(multiple_register_cycles(range.count()))
    }
}
