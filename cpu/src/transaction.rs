//! Staged machine state for a single instruction.
//!
//! An instruction works on a copy of the register file, and its
//! memory writes are held back until it completes.  Every write is
//! checked against the memory when it is staged, so committing
//! cannot fail part-way.  If the instruction fails, the transaction
//! is dropped and nothing has changed.
use tracing::{event, Level};

use base::prelude::*;

use super::error::EmulationError;
use super::memory::{access_address, from_bytes, to_bytes, Memory};
use super::registers::RegisterFile;

pub(crate) struct Transaction<'m, M: Memory + ?Sized> {
    pub(crate) regs: RegisterFile,
    mem: &'m mut M,
    pending: Vec<(Address, u8)>,
}

impl<'m, M: Memory + ?Sized> Transaction<'m, M> {
    pub(crate) fn begin(regs: &RegisterFile, mem: &'m mut M) -> Transaction<'m, M> {
        Transaction {
            regs: regs.clone(),
            mem,
            pending: Vec::new(),
        }
    }

    pub(crate) fn memory_size(&self) -> u32 {
        self.mem.size()
    }

    fn read_byte(&mut self, addr: Address) -> Result<u8, EmulationError> {
        // Later writes win, so search newest first.
        if let Some((_, b)) = self.pending.iter().rev().find(|(a, _)| *a == addr) {
            return Ok(*b);
        }
        Ok(self.mem.read_byte(addr)?)
    }

    /// Check that a value of width `width` at `addr` is readable.
    pub(crate) fn check_read(&self, addr: Address, width: OperandWidth) -> Result<(), EmulationError> {
        let addr = access_address(addr, width);
        Ok(self.mem.check_read(addr, width.memory_bytes())?)
    }

    /// Check that a value of width `width` at `addr` is writable.
    pub(crate) fn check_write(
        &self,
        addr: Address,
        width: OperandWidth,
    ) -> Result<(), EmulationError> {
        let addr = access_address(addr, width);
        Ok(self.mem.check_write(addr, width.memory_bytes())?)
    }

    pub(crate) fn read(&mut self, addr: Address, width: OperandWidth) -> Result<u32, EmulationError> {
        self.check_read(addr, width)?;
        let start = access_address(addr, width);
        let mut bytes = [0_u8; 4];
        for (i, b) in bytes
            .iter_mut()
            .enumerate()
            .take(width.memory_bytes() as usize)
        {
            *b = self.read_byte(start.index_by(i as u32))?;
        }
        Ok(from_bytes(&bytes, width))
    }

    pub(crate) fn write(
        &mut self,
        addr: Address,
        value: u32,
        width: OperandWidth,
    ) -> Result<(), EmulationError> {
        self.check_write(addr, width)?;
        let start = access_address(addr, width);
        for (i, b) in to_bytes(value, width).into_iter().enumerate() {
            self.pending.push((start.index_by(i as u32), b));
        }
        Ok(())
    }

    /// Apply the staged changes.
    pub(crate) fn commit(self, regs: &mut RegisterFile) -> Result<(), EmulationError> {
        for (addr, b) in self.pending {
            if let Err(e) = self.mem.write_byte(addr, b) {
                // check_write accepted this address, so the memory
                // implementation is inconsistent.
                event!(
                    Level::ERROR,
                    "memory refused a write it had already accepted: {e}"
                );
                return Err(e.into());
            }
        }
        *regs = self.regs;
        Ok(())
    }
}
