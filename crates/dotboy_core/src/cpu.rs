//! LR35902 instruction engine.
//!
//! One `tick` fetches, decodes and executes a whole instruction against the
//! owned [`MemoryMap`]. There is no interrupt dispatch, timer or video
//! stepping here; HALT and STOP simply park the core until [`Cpu::wake`].

mod alu;
mod cb;
mod exec;
mod helpers;
pub mod opcode;
mod regs;

pub use regs::{Flags, Register, Registers};

use crate::error::{CpuError, Result};
use crate::memory_map::MemoryMap;
use crate::CARTRIDGE_ENTRY_POINT;
use opcode::{Immediate, OpcodeEntry, Operation};

pub struct Cpu {
    regs: Registers,
    memory: MemoryMap,
    halted: bool,
    stopped: bool,
    /// Interrupt master enable. Tracked for EI/DI/RETI, nothing consumes it.
    ime: bool,
    total_cycles: u64,
}

impl Cpu {
    /// Power-on state: every register zero and PC at 0x0000.
    pub fn new(memory: MemoryMap) -> Self {
        Self {
            regs: Registers::default(),
            memory,
            halted: false,
            stopped: false,
            ime: false,
            total_cycles: 0,
        }
    }

    /// Put the core in the state the boot ROM leaves behind on a DMG, so a
    /// cartridge can start at its entry point without one.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.regs.set_af(0x01B0);
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = 0xFFFE;
        self.regs.pc = CARTRIDGE_ENTRY_POINT;

        self.halted = false;
        self.stopped = false;
        self.ime = false;
        self.total_cycles = 0;
        log::debug!("CPU reset, PC=0x{:04X}", self.regs.pc);
    }

    /// Execute one instruction and return the T-cycles it took.
    ///
    /// Returns 0 without touching anything while halted or stopped. On
    /// error the registers and the cycle counter are left as they were
    /// before the instruction; bytes it already stored stay in memory.
    pub fn tick(&mut self) -> Result<u32> {
        if self.halted || self.stopped {
            return Ok(0);
        }

        let saved = self.regs;
        let pc = self.regs.pc;
        match self.step(pc) {
            Ok(cycles) => {
                self.total_cycles += u64::from(cycles);
                Ok(cycles)
            }
            Err(err) => {
                self.regs = saved;
                log::error!(
                    "CPU fault at PC=0x{pc:04X} (SP=0x{sp:04X} AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X}): {err}",
                    sp = self.regs.sp,
                    af = self.regs.af(),
                    bc = self.regs.bc(),
                    de = self.regs.de(),
                    hl = self.regs.hl(),
                );
                Err(err)
            }
        }
    }

    fn step(&mut self, pc: u16) -> Result<u32> {
        let code = u16::from(self.memory.read_byte(pc)?);
        let entry = opcode::lookup(code).ok_or(CpuError::InvalidOpcode { opcode: code, pc })?;
        self.dispatch(code, pc, entry)
    }

    /// Run the table entry for the opcode byte at `pc`. PC only moves once
    /// the entry is known to have an executor.
    fn dispatch(&mut self, code: u16, pc: u16, entry: &OpcodeEntry) -> Result<u32> {
        let operation = entry.executable(code, pc)?;
        log::trace!("{pc:04X}: {code:02X} {}", entry.name);

        self.regs.pc = pc.wrapping_add(1);
        let extra = self.execute(operation)?;
        Ok(entry.cycles + extra)
    }

    /// Release HALT or STOP. Stands in for the interrupt or joypad event that
    /// would resume the core on hardware.
    pub fn wake(&mut self) {
        if self.halted || self.stopped {
            log::debug!("waking CPU at PC=0x{:04X}", self.regs.pc);
        }
        self.halted = false;
        self.stopped = false;
    }

    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn register(&self, register: Register) -> u16 {
        self.regs.get(register)
    }

    pub fn set_register(&mut self, register: Register, value: u16) {
        self.regs.set(register, value);
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.regs.flag(flag)
    }

    pub fn memory(&self) -> &MemoryMap {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryMap {
        &mut self.memory
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn ime(&self) -> bool {
        self.ime
    }

    /// Cycles consumed by every successful `tick` since the last reset.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Render the instruction at `addr` with its operands filled in and
    /// return it with its length in bytes. Opcode holes come back as a
    /// one-byte `DB` line.
    pub fn disassemble(&self, addr: u16) -> Result<(String, u8)> {
        let byte = self.memory.read_byte(addr)?;
        let Some(entry) = opcode::lookup(u16::from(byte)) else {
            return Ok((format!("DB ${byte:02X}"), 1));
        };
        let Some(operation) = entry.operation else {
            return Ok((entry.name.clone(), entry.length));
        };

        if operation == Operation::PrefixCb {
            let cb = self.memory.read_byte(addr.wrapping_add(1))?;
            let name = opcode::lookup(opcode::CB_BASE + u16::from(cb))
                .map(|cb_entry| cb_entry.name.clone())
                .unwrap_or_else(|| format!("DB $CB,${cb:02X}"));
            return Ok((name, 2));
        }

        let next = addr.wrapping_add(1);
        let operand = match operation.immediate() {
            Immediate::None => return Ok((entry.name.clone(), entry.length)),
            Immediate::D8 => format!("${:02X}", self.memory.read_byte(next)?),
            Immediate::A8 => format!("($FF{:02X})", self.memory.read_byte(next)?),
            Immediate::D16 | Immediate::A16 => {
                let lo = self.memory.read_byte(next)?;
                let hi = self.memory.read_byte(next.wrapping_add(1))?;
                format!("${:04X}", u16::from_le_bytes([lo, hi]))
            }
            Immediate::R8 => {
                let offset = self.memory.read_byte(next)? as i8;
                if let Operation::Jr(_) = operation {
                    // Show where the jump lands rather than the raw offset.
                    let target = addr
                        .wrapping_add(u16::from(entry.length))
                        .wrapping_add_signed(offset.into());
                    format!("${target:04X}")
                } else {
                    format!("{offset:+}")
                }
            }
        };

        let text = match operation.immediate() {
            // "(a8)" already carries its parentheses in the operand.
            Immediate::A8 => entry.name.replace("(a8)", &operand),
            // The signed operand brings its own sign.
            Immediate::R8 => entry.name.replace("+r8", &operand).replace("r8", &operand),
            other => entry.name.replace(other.placeholder(), &operand),
        };
        Ok((text, entry.length))
    }
}
