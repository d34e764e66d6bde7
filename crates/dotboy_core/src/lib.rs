pub mod cpu;
pub mod emulator;
mod error;
pub mod input;
pub mod memory_map;

pub use cpu::{Cpu, Flags, Register, Registers};
pub use emulator::{Breakpoint, Emulator, StopReason};
pub use error::{Access, CpuError, Error, MemoryError, Region, Result};
pub use input::{Button, Input};
pub use memory_map::{Address, MemoryMap};

/// Address the cartridge header hands control to after the boot sequence.
pub const CARTRIDGE_ENTRY_POINT: u16 = 0x0100;
