//! The addressing-mode resolver.
//!
//! Resolving an operand turns it into a [`Location`]: a register, a
//! constant, or a memory address.  Resolution consumes extension
//! words and applies autoincrement, so it must happen exactly once
//! per operand, source before destination.
use base::prelude::*;

use super::error::EmulationError;
use super::memory::Memory;
use super::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Location {
    Register(Register),
    Constant(u32),
    Memory(Address),
}

/// How an extension word combines with its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reach {
    /// Plain MSP430 instructions: indices are signed 16-bit values,
    /// absolute addresses and immediates are 16 bits, and an
    /// effective address outside the 20-bit space is an error.
    Word,
    /// `...X` instructions: the prefix supplies bits 19:16 of the
    /// index, address or immediate, and address arithmetic wraps.
    Extended { high: u8 },
    /// Address instructions and CALLA: indices are signed 16-bit
    /// values, `high` supplies bits 19:16 of absolute addresses and
    /// immediates, and address arithmetic wraps.
    Address { high: u8 },
}

/// The extension words trailing an instruction, consumed in order.
pub(crate) struct ExtensionWords<'a> {
    words: &'a [u16],
    next: usize,
    /// The address just past the last extension word.
    end: Address,
}

impl<'a> ExtensionWords<'a> {
    pub(crate) fn new(words: &'a [u16], end: Address) -> ExtensionWords<'a> {
        ExtensionWords {
            words,
            next: 0,
            end,
        }
    }

    /// Take the next word, along with the address it was fetched from.
    fn take(&mut self) -> Result<(Address, u16), EmulationError> {
        match self.words.get(self.next) {
            Some(w) => {
                let back = (self.words.len() - self.next) as i32;
                let at = self.end.index_by(-2 * back);
                self.next += 1;
                Ok((at, *w))
            }
            None => Err(EmulationError::ExtensionWordMismatch {
                expected: self.next + 1,
                supplied: self.words.len(),
            }),
        }
    }
}

fn autoincrement_step(r: Register, width: OperandWidth) -> u32 {
    match width {
        OperandWidth::Byte if r.is_word_aligned() => 2,
        other => other.memory_bytes(),
    }
}

/// Add a signed 16-bit index to `base`.  Unless `wrap` is set, an
/// effective address outside the 20-bit space is an error.
fn offset(base: u32, index: u16, wrap: bool) -> Result<Address, EmulationError> {
    let sum = i64::from(base) + i64::from(index as i16);
    if wrap {
        Ok(Address::truncating(sum as u32))
    } else {
        u32::try_from(sum)
            .ok()
            .and_then(|bits| Address::try_from(bits).ok())
            .ok_or(EmulationError::AddressOutOfRange(Address::truncating(sum as u32)))
    }
}

pub(crate) fn resolve<M: Memory + ?Sized>(
    operand: &Operand,
    width: OperandWidth,
    reach: Reach,
    ext: &mut ExtensionWords<'_>,
    tx: &mut Transaction<'_, M>,
) -> Result<Location, EmulationError> {
    if let Some(value) = operand.constant_value() {
        return Ok(Location::Constant(width.truncate(value as u32)));
    }
    let r = operand.register_name();
    match operand.mode() {
        AddressingMode::Register => Ok(Location::Register(r)),
        AddressingMode::Indirect => Ok(Location::Memory(Address::truncating(tx.regs.read(r)))),
        AddressingMode::IndirectAutoIncrement => {
            let value = tx.regs.read(r);
            let step = autoincrement_step(r, width);
            tx.regs
                .write(r, value.wrapping_add(step), OperandWidth::AddressWord);
            Ok(Location::Memory(Address::truncating(value)))
        }
        AddressingMode::Immediate => {
            let (_, w) = ext.take()?;
            let value = match reach {
                Reach::Word => u32::from(w),
                Reach::Extended { high } | Reach::Address { high } => {
                    Address::from_parts(high, w).bits()
                }
            };
            Ok(Location::Constant(width.truncate(value)))
        }
        AddressingMode::Absolute => {
            let (_, w) = ext.take()?;
            Ok(Location::Memory(match reach {
                Reach::Word => Address::from(w),
                Reach::Extended { high } | Reach::Address { high } => {
                    Address::from_parts(high, w)
                }
            }))
        }
        AddressingMode::Indexed | AddressingMode::Symbolic => {
            let (at, w) = ext.take()?;
            let base = if operand.mode() == AddressingMode::Symbolic {
                at.bits()
            } else {
                tx.regs.read(r)
            };
            match reach {
                Reach::Word => offset(base, w, false),
                Reach::Address { .. } => offset(base, w, true),
                Reach::Extended { high } => {
                    let index = Address::from_parts(high, w).bits();
                    Ok(Address::truncating(base.wrapping_add(index)))
                }
            }
            .map(Location::Memory)
        }
    }
}

pub(crate) fn read_location<M: Memory + ?Sized>(
    tx: &mut Transaction<'_, M>,
    location: Location,
    width: OperandWidth,
) -> Result<u32, EmulationError> {
    match location {
        Location::Register(r) => Ok(width.truncate(tx.regs.read(r))),
        Location::Constant(value) => Ok(width.truncate(value)),
        Location::Memory(addr) => tx.read(addr, width),
    }
}

/// Store `value`.  Constants cannot be written, so writes to them
/// vanish, as do writes to R3.
pub(crate) fn write_location<M: Memory + ?Sized>(
    tx: &mut Transaction<'_, M>,
    location: Location,
    value: u32,
    width: OperandWidth,
) -> Result<(), EmulationError> {
    match location {
        Location::Register(r) => {
            tx.regs.write(r, value, width);
            Ok(())
        }
        Location::Constant(_) => Ok(()),
        Location::Memory(addr) => tx.write(addr, value, width),
    }
}
