use base::prelude::*;

use super::Executor;
use crate::error::EmulationError;
use crate::memory::Memory;
use crate::status::StatusFlags;
use crate::timing::JUMP_CYCLES;

/// Decide whether a conditional jump is taken.
pub(crate) fn condition_holds(condition: Condition, sr: StatusFlags) -> bool {
    match condition {
        Condition::Jne => !sr.zero(),
        Condition::Jeq => sr.zero(),
        Condition::Jnc => !sr.carry(),
        Condition::Jc => sr.carry(),
        Condition::Jn => sr.negative(),
        Condition::Jge => sr.negative() == sr.overflow(),
        Condition::Jl => sr.negative() != sr.overflow(),
        Condition::Jmp => true,
    }
}

/// ## Format III
///
/// JNE, JEQ, JNC, JC, JN, JGE, JL and JMP.  Taken or not, a jump
/// takes two cycles.
impl<M: Memory + ?Sized> Executor<'_, '_, M> {
    pub(crate) fn op_jump(&mut self, jump: &Jump) -> Result<u32, EmulationError> {
        let pc = self.tx.regs.pc();
        let next = pc
            .checked_add(2)
            .ok_or(EmulationError::AddressOutOfRange(pc))?;
        if condition_holds(jump.condition(), self.tx.regs.status()) {
            let target = i64::from(next.bits()) + i64::from(jump.displacement());
            let target = u32::try_from(target)
                .map_err(|_| EmulationError::AddressOutOfRange(Address::truncating(target as u32)))?;
            self.branch_to(target)?;
        } else {
            self.tx.regs.set_pc(next);
        }
        Ok(JUMP_CYCLES)
    }
}
