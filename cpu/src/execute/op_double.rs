use base::prelude::*;

use super::Executor;
use crate::alu;
use crate::error::EmulationError;
use crate::memory::Memory;
use crate::resolver::{read_location, resolve, Reach};
use crate::timing::{double_operand_cycles, extended_cycles};

/// ## Format I
///
/// MOV, ADD, ADDC, SUBC, SUB, CMP, DADD, BIT, BIC, BIS, XOR and AND,
/// together with their `...X` forms.
impl<M: Memory + ?Sized> Executor<'_, '_, M> {
    pub(crate) fn op_double_operand(&mut self, inst: &DoubleOperand) -> Result<u32, EmulationError> {
        let opcode = inst.opcode();
        let width = inst.width();
        let (src_reach, dst_reach) = match inst.extension() {
            None => (Reach::Word, Reach::Word),
            Some(ext) => (
                Reach::Extended {
                    high: ext.src_high(),
                },
                Reach::Extended {
                    high: ext.dst_high(),
                },
            ),
        };
        let (count, zero_carry) = self.repetitions(inst.extension());

        // Autoincrement of the source happens before the destination
        // address is computed.
        let src = resolve(&inst.source(), width, src_reach, &mut self.ext, &mut self.tx)?;
        let dst = resolve(
            &inst.destination(),
            width,
            dst_reach,
            &mut self.ext,
            &mut self.tx,
        )?;

        for _ in 0..count {
            let src_value = read_location(&mut self.tx, src, width)?;
            let dst_value = if opcode.reads_destination() {
                read_location(&mut self.tx, dst, width)?
            } else {
                0
            };
            let mut status = self.tx.regs.status();
            let carry = !zero_carry && status.carry();
            let (result, flags) = alu::double_operand(opcode, width, src_value, dst_value, carry);
            if let Some(flags) = flags {
                status.apply(flags);
                self.tx.regs.set_status(status);
            }
            // A result stored into SR replaces the flags just set.
            if opcode.stores_result() {
                self.store(dst, result, width)?;
            }
        }

        let base = double_operand_cycles(&inst.source(), &inst.destination());
        Ok(match inst.extension() {
            None => base,
            Some(ext) => extended_cycles(
                base,
                matches!(ext, Extension::Register { .. }),
                true,
                count,
            ),
        })
    }
}
