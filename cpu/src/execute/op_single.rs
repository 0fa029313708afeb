use base::prelude::*;

use super::Executor;
use crate::alu;
use crate::error::EmulationError;
use crate::memory::Memory;
use crate::resolver::{read_location, resolve, Location, Reach};
use crate::stack;
use crate::timing::{extended_cycles, single_operand_cycles};

/// ## Format II
///
/// - RRC, RRA, SWPB, SXT (and `...X`): read, modify and write back
///   the operand.
/// - PUSH, PUSHX: push the operand.
/// - CALL: push PC and branch.
impl<M: Memory + ?Sized> Executor<'_, '_, M> {
    pub(crate) fn op_single_operand(&mut self, inst: &SingleOperand) -> Result<u32, EmulationError> {
        let opcode = inst.opcode();
        let width = inst.width();
        let operand = inst.operand();
        let reach = match inst.extension() {
            None => Reach::Word,
            // The prefix's destination nibble extends the only operand.
            Some(ext) => Reach::Extended {
                high: ext.dst_high(),
            },
        };
        let (count, zero_carry) = self.repetitions(inst.extension());
        let location = resolve(&operand, width, reach, &mut self.ext, &mut self.tx)?;

        match opcode {
            SingleOperandOpcode::Push => {
                let value = read_location(&mut self.tx, location, width)?;
                stack::push(&mut self.tx, value, width)?;
            }
            SingleOperandOpcode::Call => {
                let target = read_location(&mut self.tx, location, OperandWidth::Word)?;
                let return_address = self.tx.regs.read(Register::PC);
                stack::push(&mut self.tx, return_address, OperandWidth::Word)?;
                self.branch_to(target)?;
            }
            SingleOperandOpcode::Rrc
            | SingleOperandOpcode::Rra
            | SingleOperandOpcode::Swpb
            | SingleOperandOpcode::Sxt => {
                for _ in 0..count {
                    self.modify(opcode, location, width, zero_carry)?;
                }
            }
        }

        let base = single_operand_cycles(opcode, &operand);
        Ok(match inst.extension() {
            None => base,
            Some(ext) => extended_cycles(
                base,
                matches!(ext, Extension::Register { .. }),
                opcode.is_read_modify_write(),
                count,
            ),
        })
    }

    fn modify(
        &mut self,
        opcode: SingleOperandOpcode,
        location: Location,
        width: OperandWidth,
        zero_carry: bool,
    ) -> Result<(), EmulationError> {
        let value = read_location(&mut self.tx, location, width)?;
        let mut status = self.tx.regs.status();
        let carry = !zero_carry && status.carry();
        let (result, flags) = match opcode {
            SingleOperandOpcode::Rrc => alu::rrc(value, carry, width),
            SingleOperandOpcode::Rra => alu::rra(value, width),
            SingleOperandOpcode::Sxt => alu::sxt(value, width),
            SingleOperandOpcode::Swpb => {
                // SWPB leaves the flags alone.
                let result = alu::swpb(value, width);
                return self.store(location, result, width);
            }
            SingleOperandOpcode::Push | SingleOperandOpcode::Call => {
                return Ok(());
            }
        };
        status.apply(flags);
        self.tx.regs.set_status(status);
        match (opcode, location) {
            // In register mode SXT extends the sign through bit 19.
            (SingleOperandOpcode::Sxt, Location::Register(r)) if r != Register::PC => {
                self.tx
                    .regs
                    .write_sign_extended(r, result, OperandWidth::Byte);
                Ok(())
            }
            _ => self.store(location, result, width),
        }
    }
}
