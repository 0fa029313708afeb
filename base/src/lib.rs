//! The `base` crate defines the MSP430-related things which are
//! useful in both a simulator and other associated tools.  The idea
//! is that if you want to write an assembler or a disassembler, it
//! would depend on the base crate but would not need to depend on
//! the simulator library itself.

mod error;
mod types;

pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod prelude;
pub mod register;

/// Build an [`Address`](prelude::Address) constant, checking at
/// compile time that it fits in 20 bits.
#[macro_export]
macro_rules! u20 {
    ($n:expr) => {
        $crate::prelude::Address::new::<{ $n }>()
    };
}

#[test]
fn test_u20() {
    use prelude::Address;
    let m: Address = u20!(0x1_2345);
    let n: Address = Address::try_from(0x1_2345_u32).expect("test data should be in range");
    assert_eq!(m, n);
    assert_eq!(u20!(0xF_FFFF), Address::MAX);
}
