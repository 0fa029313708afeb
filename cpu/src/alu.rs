//! Arithmetic and logic, with the status flags each operation
//! produces.
//!
//! All values are unsigned and already truncated to the operation's
//! width.  N is always the most significant bit of the result at
//! that width, and Z is set when the result is zero.  Operations
//! which leave the flags alone return `None` for them.
use base::prelude::*;

use super::status::Flags;

fn nz(value: u32, width: OperandWidth) -> (bool, bool) {
    (width.is_negative(value), width.truncate(value) == 0)
}

/// Add with carry, returning the result and the flags of an ADD.
pub(crate) fn add(src: u32, dst: u32, carry: bool, width: OperandWidth) -> (u32, Flags) {
    let mask = width.mask();
    let sum = u64::from(src & mask) + u64::from(dst & mask) + u64::from(carry);
    let result = (sum as u32) & mask;
    let (n, z) = nz(result, width);
    let src_neg = width.is_negative(src);
    let dst_neg = width.is_negative(dst);
    (
        result,
        Flags {
            n,
            z,
            c: sum > u64::from(mask),
            v: src_neg == dst_neg && n != src_neg,
        },
    )
}

/// Compute `dst - src - 1 + carry` (so carry=1 is a plain
/// subtraction).  As on the hardware, C is set when there is no
/// borrow.
pub(crate) fn subtract(src: u32, dst: u32, carry: bool, width: OperandWidth) -> (u32, Flags) {
    add(!src & width.mask(), dst, carry, width)
}

/// Decimal (BCD) addition with carry.  V is undefined on the
/// hardware; we clear it.
pub(crate) fn decimal_add(src: u32, dst: u32, carry: bool, width: OperandWidth) -> (u32, Flags) {
    let mut carry = u32::from(carry);
    let mut result = 0_u32;
    for digit in 0..width.bits() / 4 {
        let shift = digit * 4;
        let mut d = ((src >> shift) & 0xF) + ((dst >> shift) & 0xF) + carry;
        if d > 9 {
            d = (d + 6) & 0xF;
            carry = 1;
        } else {
            carry = 0;
        }
        result |= d << shift;
    }
    let (n, z) = nz(result, width);
    (
        result,
        Flags {
            n,
            z,
            c: carry != 0,
            v: false,
        },
    )
}

/// Flags for AND, BIT and SXT: C is the inverse of Z and V is clear.
pub(crate) fn logical_flags(result: u32, width: OperandWidth) -> Flags {
    let (n, z) = nz(result, width);
    Flags {
        n,
        z,
        c: !z,
        v: false,
    }
}

/// Execute a Format I operation.  `carry` is the carry input for
/// ADDC, SUBC and DADD.
pub(crate) fn double_operand(
    opcode: DoubleOperandOpcode,
    width: OperandWidth,
    src: u32,
    dst: u32,
    carry: bool,
) -> (u32, Option<Flags>) {
    let src = width.truncate(src);
    let dst = width.truncate(dst);
    match opcode {
        DoubleOperandOpcode::Mov => (src, None),
        DoubleOperandOpcode::Add => with_flags(add(src, dst, false, width)),
        DoubleOperandOpcode::Addc => with_flags(add(src, dst, carry, width)),
        DoubleOperandOpcode::Sub | DoubleOperandOpcode::Cmp => {
            with_flags(subtract(src, dst, true, width))
        }
        DoubleOperandOpcode::Subc => with_flags(subtract(src, dst, carry, width)),
        DoubleOperandOpcode::Dadd => with_flags(decimal_add(src, dst, carry, width)),
        DoubleOperandOpcode::Bit | DoubleOperandOpcode::And => {
            let r = src & dst;
            (r, Some(logical_flags(r, width)))
        }
        DoubleOperandOpcode::Bic => (dst & !src, None),
        DoubleOperandOpcode::Bis => (dst | src, None),
        DoubleOperandOpcode::Xor => {
            let r = src ^ dst;
            let mut flags = logical_flags(r, width);
            flags.v = width.is_negative(src) && width.is_negative(dst);
            (r, Some(flags))
        }
    }
}

fn with_flags((value, flags): (u32, Flags)) -> (u32, Option<Flags>) {
    (value, Some(flags))
}

/// Rotate right through carry.
pub(crate) fn rrc(value: u32, carry: bool, width: OperandWidth) -> (u32, Flags) {
    let value = width.truncate(value);
    let result = (value >> 1) | if carry { width.sign_bit() } else { 0 };
    shifted_flags(result, value & 1 != 0, width)
}

/// Arithmetic shift right; the sign bit is kept.
pub(crate) fn rra(value: u32, width: OperandWidth) -> (u32, Flags) {
    let value = width.truncate(value);
    let result = (value >> 1) | (value & width.sign_bit());
    shifted_flags(result, value & 1 != 0, width)
}

/// Logical shift right.
pub(crate) fn rru(value: u32, width: OperandWidth) -> (u32, Flags) {
    let value = width.truncate(value);
    shifted_flags(value >> 1, value & 1 != 0, width)
}

/// Arithmetic shift left.  V is undefined on the hardware; we clear
/// it.
pub(crate) fn rla(value: u32, width: OperandWidth) -> (u32, Flags) {
    let value = width.truncate(value);
    let result = width.truncate(value << 1);
    shifted_flags(result, width.is_negative(value), width)
}

fn shifted_flags(result: u32, carry_out: bool, width: OperandWidth) -> (u32, Flags) {
    let (n, z) = nz(result, width);
    (
        result,
        Flags {
            n,
            z,
            c: carry_out,
            v: false,
        },
    )
}

/// Swap the bytes of the low word.  Bits 19:16 survive only at
/// address-word width.
pub(crate) fn swpb(value: u32, width: OperandWidth) -> u32 {
    let low = value & 0xFFFF;
    let swapped = ((low & 0xFF) << 8) | (low >> 8);
    match width {
        OperandWidth::AddressWord => (value & 0xF_0000) | swapped,
        _ => swapped,
    }
}

/// Sign-extend bit 7 through the whole of `width`.
pub(crate) fn sxt(value: u32, width: OperandWidth) -> (u32, Flags) {
    let result = width.truncate(OperandWidth::Byte.sign_extend(value) as u32);
    (result, logical_flags(result, width))
}
