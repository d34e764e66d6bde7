use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for anything the core can fail on.
///
/// Every variant is fatal: the core never retries or substitutes a default
/// value, the caller decides whether to stop the machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Cpu(#[from] CpuError),

    #[error("cartridge image is {len} bytes, at least {min} are required")]
    CartridgeTooSmall { len: usize, min: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// The address does not fit in the 16-bit address space. Kept wide so
    /// the offending value can be reported as given.
    #[error("[{addr}] address out of bounds")]
    AddressOutOfBounds { addr: i64 },

    #[error("{access} [{addr:#06X}] {region} not yet implemented")]
    RegionNotImplemented {
        region: Region,
        addr: u16,
        access: Access,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// No table entry exists for this opcode. CB-prefixed opcodes are
    /// reported as `0x100 + byte`.
    #[error("invalid opcode {opcode:#05X} at PC={pc:#06X}")]
    InvalidOpcode { opcode: u16, pc: u16 },

    #[error("unimplemented opcode {opcode:#05X} ({name}) at PC={pc:#06X}")]
    UnimplementedOpcode {
        opcode: u16,
        name: String,
        pc: u16,
    },
}

/// Direction of the memory access that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("R"),
            Access::Write => f.write_str("W"),
        }
    }
}

/// Address regions that exist on hardware but are not mapped by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    BankedRom,
    ExternalRam,
    SpriteMemory,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::BankedRom => "banked ROM",
            Region::ExternalRam => "external RAM",
            Region::SpriteMemory => "sprite memory (OAM)",
        };
        f.write_str(name)
    }
}
