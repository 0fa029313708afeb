//! Byte-addressable memory.
//!
//! The MSP430X address space is 20 bits wide, and all multi-byte
//! quantities are stored little-endian.  Word accesses ignore bit 0
//! of the address, as the hardware does.  A 20-bit address-word
//! occupies two words: the low word holds bits 15:0 and bits 3:0 of
//! the following word hold bits 19:16.
//!
//! Peripheral registers are not modelled here; a caller wanting them
//! supplies its own [`Memory`] implementation which gives certain
//! addresses side effects.
use std::fmt::{self, Debug, Formatter};

use tracing::{event, Level};

use base::prelude::*;

use super::error::MemoryOpFailure;

/// Smallest supported memory: the 16-bit address space.
pub const MIN_MEMORY_SIZE: u32 = 1 << 16;
/// Largest supported memory: the full 20-bit address space.
pub const MAX_MEMORY_SIZE: u32 = 1 << 20;

/// Memory as seen by the execution engine.
pub trait Memory {
    /// The number of bytes of backed memory, starting at address 0.
    fn size(&self) -> u32;

    /// Fetch a byte.
    fn read_byte(&mut self, addr: Address) -> Result<u8, MemoryOpFailure>;

    /// Store a byte.
    fn write_byte(&mut self, addr: Address, value: u8) -> Result<(), MemoryOpFailure>;

    /// Check that `len` bytes starting at `addr` could be read.
    fn check_read(&self, addr: Address, len: u32) -> Result<(), MemoryOpFailure> {
        check_range(self.size(), addr, len)
    }

    /// Check that `len` bytes starting at `addr` could be written.
    /// Implementations with read-only regions override this.
    fn check_write(&self, addr: Address, len: u32) -> Result<(), MemoryOpFailure> {
        check_range(self.size(), addr, len)
    }
}

fn check_range(size: u32, addr: Address, len: u32) -> Result<(), MemoryOpFailure> {
    match u32::from(addr).checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(MemoryOpFailure::NotMapped(addr)),
    }
}

/// Describes the memory to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfiguration {
    /// Size in bytes; between 64 KiB and 1 MiB.
    pub size: u32,
}

impl Default for MemoryConfiguration {
    fn default() -> MemoryConfiguration {
        MemoryConfiguration {
            size: MIN_MEMORY_SIZE,
        }
    }
}

/// Signals that a [`MemoryConfiguration`] asked for an unsupported size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadMemorySize(pub u32);

impl fmt::Display for BadMemorySize {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "memory size {:#x} is outside the supported range {MIN_MEMORY_SIZE:#x}..={MAX_MEMORY_SIZE:#x}",
            self.0
        )
    }
}

impl std::error::Error for BadMemorySize {}

/// Plain RAM with no memory-mapped peripherals.
pub struct FlatMemory {
    bytes: Vec<u8>,
}

impl FlatMemory {
    pub fn new(config: &MemoryConfiguration) -> Result<FlatMemory, BadMemorySize> {
        if !(MIN_MEMORY_SIZE..=MAX_MEMORY_SIZE).contains(&config.size) {
            return Err(BadMemorySize(config.size));
        }
        let size = usize::try_from(config.size).map_err(|_| BadMemorySize(config.size))?;
        event!(Level::DEBUG, "creating {size} bytes of flat memory");
        Ok(FlatMemory {
            bytes: vec![0; size],
        })
    }

    /// Copy `image` into memory starting at `base`.
    pub fn load(&mut self, base: Address, image: &[u8]) -> Result<(), MemoryOpFailure> {
        let len = u32::try_from(image.len()).map_err(|_| MemoryOpFailure::NotMapped(base))?;
        self.check_write(base, len)?;
        let start = u32::from(base) as usize;
        self.bytes[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Debug for FlatMemory {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("FlatMemory")
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Memory for FlatMemory {
    fn size(&self) -> u32 {
        // The constructor limits the size to 1 MiB.
        self.bytes.len() as u32
    }

    fn read_byte(&mut self, addr: Address) -> Result<u8, MemoryOpFailure> {
        self.bytes
            .get(u32::from(addr) as usize)
            .copied()
            .ok_or(MemoryOpFailure::NotMapped(addr))
    }

    fn write_byte(&mut self, addr: Address, value: u8) -> Result<(), MemoryOpFailure> {
        match self.bytes.get_mut(u32::from(addr) as usize) {
            Some(b) => {
                *b = value;
                Ok(())
            }
            None => Err(MemoryOpFailure::NotMapped(addr)),
        }
    }
}

/// The address at which an access of the given width actually starts.
pub fn access_address(addr: Address, width: OperandWidth) -> Address {
    match width {
        OperandWidth::Byte => addr,
        OperandWidth::Word | OperandWidth::AddressWord => Address::truncating(u32::from(addr) & !1),
    }
}

/// Read a little-endian 16-bit word.
pub fn read_word<M: Memory + ?Sized>(mem: &mut M, addr: Address) -> Result<u16, MemoryOpFailure> {
    let addr = access_address(addr, OperandWidth::Word);
    mem.check_read(addr, 2)?;
    let lo = mem.read_byte(addr)?;
    let hi = mem.read_byte(addr.index_by(1_u32))?;
    Ok(u16::from_le_bytes([lo, hi]))
}

/// Read `count` consecutive words starting at `addr`.
pub fn read_words<M: Memory + ?Sized>(
    mem: &mut M,
    addr: Address,
    count: usize,
) -> Result<Vec<u16>, MemoryOpFailure> {
    (0..count)
        .map(|i| read_word(mem, addr.index_by(2 * i as u32)))
        .collect()
}

/// Split a value into the bytes which represent it in memory at the
/// given width.
pub fn to_bytes(value: u32, width: OperandWidth) -> Vec<u8> {
    match width {
        OperandWidth::Byte => vec![value as u8],
        OperandWidth::Word => (value as u16).to_le_bytes().to_vec(),
        OperandWidth::AddressWord => {
            let [a, b, c, _] = (value & Address::MASK).to_le_bytes();
            vec![a, b, c & 0xF, 0]
        }
    }
}

/// Reassemble a value from its in-memory bytes at the given width.
pub fn from_bytes(bytes: &[u8], width: OperandWidth) -> u32 {
    let byte = |i: usize| u32::from(bytes.get(i).copied().unwrap_or(0));
    match width {
        OperandWidth::Byte => byte(0),
        OperandWidth::Word => byte(0) | byte(1) << 8,
        OperandWidth::AddressWord => byte(0) | byte(1) << 8 | (byte(2) & 0xF) << 16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base::u20;

    fn small_memory() -> FlatMemory {
        FlatMemory::new(&MemoryConfiguration::default()).expect("valid test configuration")
    }

    #[test]
    fn test_memory_size_limits() {
        assert!(FlatMemory::new(&MemoryConfiguration { size: 0x8000 }).is_err());
        assert!(FlatMemory::new(&MemoryConfiguration { size: 0x20_0000 }).is_err());
        let mem = FlatMemory::new(&MemoryConfiguration {
            size: MAX_MEMORY_SIZE,
        })
        .expect("1MiB is supported");
        assert_eq!(mem.size(), MAX_MEMORY_SIZE);
    }

    #[test]
    fn test_words_are_little_endian() {
        let mut mem = small_memory();
        mem.load(u20!(0x200), &[0x34, 0x12]).expect("in range");
        assert_eq!(read_word(&mut mem, u20!(0x200)), Ok(0x1234));
        // Bit 0 of a word address is ignored.
        assert_eq!(read_word(&mut mem, u20!(0x201)), Ok(0x1234));
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut mem = small_memory();
        assert_eq!(
            read_word(&mut mem, u20!(0x10000)),
            Err(MemoryOpFailure::NotMapped(u20!(0x10000)))
        );
        assert!(mem.check_read(u20!(0xFFFF), 2).is_err());
        assert!(mem.check_read(u20!(0xFFFE), 2).is_ok());
    }

    #[test]
    fn test_address_word_layout() {
        let bytes = to_bytes(0xA_BCDE, OperandWidth::AddressWord);
        assert_eq!(bytes, vec![0xDE, 0xBC, 0x0A, 0x00]);
        assert_eq!(from_bytes(&bytes, OperandWidth::AddressWord), 0xA_BCDE);
        assert_eq!(to_bytes(0x1234, OperandWidth::Byte), vec![0x34]);
    }
}
