use base::prelude::*;

use super::Executor;
use crate::alu;
use crate::error::EmulationError;
use crate::memory::Memory;
use crate::resolver::{read_location, resolve, Location, Reach};
use crate::timing::{address_instruction_cycles, rotate_cycles};

/// ## 20-bit address instructions
///
/// - MOVA, CMPA, ADDA, SUBA: [`Executor::op_address`]
/// - RRCM, RRAM, RLAM, RRUM: [`Executor::op_rotate`]
impl<M: Memory + ?Sized> Executor<'_, '_, M> {
    pub(crate) fn op_address(&mut self, inst: &AddressInstruction) -> Result<u32, EmulationError> {
        let width = OperandWidth::AddressWord;
        let reach = Reach::Address { high: inst.high() };
        let src = resolve(&inst.source(), width, reach, &mut self.ext, &mut self.tx)?;
        let dst = resolve(
            &inst.destination(),
            width,
            reach,
            &mut self.ext,
            &mut self.tx,
        )?;
        let src_value = read_location(&mut self.tx, src, width)?;

        match inst.opcode() {
            AddressOpcode::Mova => self.store(dst, src_value, width)?,
            opcode => {
                let dst_value = read_location(&mut self.tx, dst, width)?;
                let (result, flags) = match opcode {
                    AddressOpcode::Adda => alu::add(src_value, dst_value, false, width),
                    _ => alu::subtract(src_value, dst_value, true, width),
                };
                let mut status = self.tx.regs.status();
                status.apply(flags);
                self.tx.regs.set_status(status);
                if opcode != AddressOpcode::Cmpa {
                    self.store(dst, result, width)?;
                }
            }
        }
        Ok(address_instruction_cycles(inst))
    }

    /// Shift or rotate a register by 1-4 bits.  The flags are those
    /// of the last single-bit step.
    pub(crate) fn op_rotate(&mut self, rot: &RotateMultiple) -> Result<u32, EmulationError> {
        let width = rot.width();
        let location = Location::Register(rot.register());
        let mut value = read_location(&mut self.tx, location, width)?;
        let mut status = self.tx.regs.status();
        for _ in 0..rot.count() {
            let (result, flags) = match rot.kind() {
                RotateKind::Rrc => alu::rrc(value, status.carry(), width),
                RotateKind::Rra => alu::rra(value, width),
                RotateKind::Rla => alu::rla(value, width),
                RotateKind::Rru => alu::rru(value, width),
            };
            status.apply(flags);
            value = result;
        }
        self.tx.regs.set_status(status);
        self.store(location, value, width)?;
        Ok(rotate_cycles(rot.count()))
    }
}
