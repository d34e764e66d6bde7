//! 16-bit address decoding for the cartridge, RAM and I/O regions.

use crate::error::{Access, Error, MemoryError, Region};
use crate::input::Input;

mod init;
mod joypad;

pub use joypad::{SELECT_DIRECTION, SELECT_STANDARD};

pub const ROM_BANK_0_START: u16 = 0x0000;
pub const ROM_BANK_0_END: u16 = 0x3FFF;
pub const ROM_BANK_0_SIZE: usize = 0x4000;

pub const ROM_BANK_N_START: u16 = 0x4000;
pub const ROM_BANK_N_END: u16 = 0x7FFF;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
pub const VRAM_SIZE: usize = 0x2000;

pub const EXT_RAM_START: u16 = 0xA000;
pub const EXT_RAM_END: u16 = 0xBFFF;

pub const WRAM_START: u16 = 0xC000;
pub const WRAM_END: u16 = 0xDFFF;
pub const WRAM_SIZE: usize = 0x2000;

/// 0xE000..=0xFDFF aliases working RAM this many bytes lower.
pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFDFF;
pub const ECHO_RAM_OFFSET: u16 = 0x2000;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFEFF;

pub const JOYPAD_ADDR: u16 = 0xFF00;

pub const IO_START: u16 = 0xFF00;
pub const IO_END: u16 = 0xFF7F;
pub const IO_SIZE: usize = 0x80;

pub const ZERO_PAGE_START: u16 = 0xFF80;
pub const ZERO_PAGE_END: u16 = 0xFFFF;
pub const ZERO_PAGE_SIZE: usize = 0x80;

/// A value known to lie inside the 16-bit address space.
///
/// The core itself works on `u16` throughout, so this only matters at the
/// edges: tooling that takes addresses from a user or a file goes through
/// `TryFrom`, which is where `AddressOutOfBounds` comes from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Address(u16);

impl Address {
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }

    fn checked(raw: i64) -> Result<Self, MemoryError> {
        u16::try_from(raw)
            .map(Address)
            .map_err(|_| MemoryError::AddressOutOfBounds { addr: raw })
    }
}

impl From<u16> for Address {
    fn from(value: u16) -> Self {
        Address(value)
    }
}

impl From<Address> for u16 {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Address {
    type Error = MemoryError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Address::checked(value)
    }
}

impl TryFrom<i32> for Address {
    type Error = MemoryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Address::checked(value.into())
    }
}

impl TryFrom<u32> for Address {
    type Error = MemoryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Address::checked(value.into())
    }
}

impl TryFrom<usize> for Address {
    type Error = MemoryError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match i64::try_from(value) {
            Ok(raw) => Address::checked(raw),
            Err(_) => Err(MemoryError::AddressOutOfBounds { addr: i64::MAX }),
        }
    }
}

/// Backing storage for every mapped region plus the read-only cartridge.
///
/// Simplifications:
/// - Only the first 16 KiB cartridge bank is mapped; banked ROM, external
///   RAM and sprite memory report `RegionNotImplemented`.
/// - I/O registers other than the joypad are plain bytes with no side
///   effects.
#[derive(Clone, Debug)]
pub struct MemoryMap {
    cartridge: Box<[u8]>,
    input: Input,
    vram: Box<[u8; VRAM_SIZE]>,
    wram: Box<[u8; WRAM_SIZE]>,
    io: Box<[u8; IO_SIZE]>,
    zero_page: Box<[u8; ZERO_PAGE_SIZE]>,
}

impl MemoryMap {
    /// Map a cartridge image. Anything past the first bank is kept but not
    /// addressable until bank switching exists.
    pub fn new(cartridge: impl Into<Box<[u8]>>, input: Input) -> Result<Self, Error> {
        let cartridge = cartridge.into();
        if cartridge.len() < ROM_BANK_0_SIZE {
            return Err(Error::CartridgeTooSmall {
                len: cartridge.len(),
                min: ROM_BANK_0_SIZE,
            });
        }
        if cartridge.len() > ROM_BANK_0_SIZE {
            log::debug!(
                "cartridge is {} bytes, only bank 0 will be mapped",
                cartridge.len()
            );
        }

        let mut map = Self {
            cartridge,
            input,
            vram: Box::new([0; VRAM_SIZE]),
            wram: Box::new([0; WRAM_SIZE]),
            io: Box::new([0; IO_SIZE]),
            zero_page: Box::new([0; ZERO_PAGE_SIZE]),
        };
        map.reset();
        Ok(map)
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8, MemoryError> {
        let value = match addr {
            ROM_BANK_0_START..=ROM_BANK_0_END => self.cartridge[addr as usize],
            ROM_BANK_N_START..=ROM_BANK_N_END => {
                return Err(unmapped(Region::BankedRom, addr, Access::Read))
            }
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize],
            EXT_RAM_START..=EXT_RAM_END => {
                return Err(unmapped(Region::ExternalRam, addr, Access::Read))
            }
            WRAM_START..=WRAM_END => self.wram[(addr - WRAM_START) as usize],
            ECHO_RAM_START..=ECHO_RAM_END => {
                self.wram[(addr - ECHO_RAM_OFFSET - WRAM_START) as usize]
            }
            OAM_START..=OAM_END => {
                return Err(unmapped(Region::SpriteMemory, addr, Access::Read))
            }
            JOYPAD_ADDR => self.read_joypad(),
            IO_START..=IO_END => self.io[(addr - IO_START) as usize],
            ZERO_PAGE_START..=ZERO_PAGE_END => self.zero_page[(addr - ZERO_PAGE_START) as usize],
        };
        Ok(value)
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        match addr {
            // Cartridge ROM ignores writes. Bank-select writes would land here
            // once a mapper exists.
            ROM_BANK_0_START..=ROM_BANK_N_END => {}
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize] = value,
            EXT_RAM_START..=EXT_RAM_END => {
                return Err(unmapped(Region::ExternalRam, addr, Access::Write))
            }
            WRAM_START..=WRAM_END => self.wram[(addr - WRAM_START) as usize] = value,
            ECHO_RAM_START..=ECHO_RAM_END => {
                self.wram[(addr - ECHO_RAM_OFFSET - WRAM_START) as usize] = value
            }
            OAM_START..=OAM_END => {
                return Err(unmapped(Region::SpriteMemory, addr, Access::Write))
            }
            JOYPAD_ADDR => self.write_joypad(value),
            IO_START..=IO_END => self.io[(addr - IO_START) as usize] = value,
            ZERO_PAGE_START..=ZERO_PAGE_END => {
                self.zero_page[(addr - ZERO_PAGE_START) as usize] = value
            }
        }
        Ok(())
    }

    /// Little-endian read of two consecutive bytes. A word at 0xFFFF has its
    /// high byte outside the address space and fails.
    pub fn read_word(&self, addr: u16) -> Result<u16, MemoryError> {
        let lo = self.read_byte(addr)?;
        let hi = self.read_byte(next_address(addr)?)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Little-endian write of two consecutive bytes, low byte first. Not
    /// atomic: if the high byte fails the low byte has already been stored.
    pub fn write_word(&mut self, addr: u16, value: u16) -> Result<(), MemoryError> {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo)?;
        self.write_byte(next_address(addr)?, hi)
    }
}

fn next_address(addr: u16) -> Result<u16, MemoryError> {
    addr.checked_add(1)
        .ok_or(MemoryError::AddressOutOfBounds {
            addr: i64::from(addr) + 1,
        })
}

fn unmapped(region: Region, addr: u16, access: Access) -> MemoryError {
    MemoryError::RegionNotImplemented {
        region,
        addr,
        access,
    }
}
