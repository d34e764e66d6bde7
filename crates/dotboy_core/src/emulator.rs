use std::fmt;

use crate::cpu::Cpu;
use crate::error::Result;
use crate::input::Input;
use crate::memory_map::MemoryMap;

/// Condition that stops [`Emulator::run`] before an instruction executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Breakpoint {
    /// PC equals this address.
    Pc(u16),
    /// The byte at PC is this opcode.
    Opcode(u8),
}

/// Why [`Emulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Breakpoint(Breakpoint),
    BudgetExhausted,
    Halted,
    Stopped,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Breakpoint(Breakpoint::Pc(addr)) => {
                write!(f, "breakpoint at PC=0x{addr:04X}")
            }
            StopReason::Breakpoint(Breakpoint::Opcode(opcode)) => {
                write!(f, "breakpoint on opcode 0x{opcode:02X}")
            }
            StopReason::BudgetExhausted => f.write_str("tick budget exhausted"),
            StopReason::Halted => f.write_str("CPU halted"),
            StopReason::Stopped => f.write_str("CPU stopped"),
        }
    }
}

/// Cartridge-only machine: a CPU and the memory map it owns.
pub struct Emulator {
    cpu: Cpu,
}

impl Emulator {
    /// Map `cartridge` and start at the cartridge entry point with post-boot
    /// register and I/O values.
    pub fn new(cartridge: impl Into<Box<[u8]>>) -> Result<Self> {
        let memory = MemoryMap::new(cartridge, Input::default())?;
        let mut cpu = Cpu::new(memory);
        cpu.reset();
        log::info!("emulator ready, PC=0x{:04X}", cpu.regs().pc);
        Ok(Self { cpu })
    }

    /// Reset CPU and memory. The cartridge and the current input survive.
    pub fn reset(&mut self) {
        self.cpu.memory_mut().reset();
        self.cpu.reset();
    }

    /// Execute a single instruction.
    pub fn tick(&mut self) -> Result<u32> {
        self.cpu.tick()
    }

    /// Tick until a breakpoint matches, `budget` instructions have run, or
    /// the CPU halts or stops.
    ///
    /// Breakpoints are checked before each instruction except the first, so
    /// calling `run` again after a breakpoint steps past it.
    pub fn run(&mut self, budget: u64, breakpoints: &[Breakpoint]) -> Result<StopReason> {
        for executed in 0..budget {
            if self.cpu.halted() {
                return Ok(StopReason::Halted);
            }
            if self.cpu.stopped() {
                return Ok(StopReason::Stopped);
            }
            if executed > 0 {
                if let Some(hit) = self.matching_breakpoint(breakpoints)? {
                    log::debug!("hit {hit:?} after {executed} instructions");
                    return Ok(StopReason::Breakpoint(hit));
                }
            }
            self.cpu.tick()?;
        }

        if self.cpu.halted() {
            Ok(StopReason::Halted)
        } else if self.cpu.stopped() {
            Ok(StopReason::Stopped)
        } else {
            Ok(StopReason::BudgetExhausted)
        }
    }

    fn matching_breakpoint(&self, breakpoints: &[Breakpoint]) -> Result<Option<Breakpoint>> {
        if breakpoints.is_empty() {
            return Ok(None);
        }

        let pc = self.cpu.regs().pc;
        let mut opcode = None;
        for &bp in breakpoints {
            let hit = match bp {
                Breakpoint::Pc(addr) => addr == pc,
                Breakpoint::Opcode(code) => {
                    // Only read memory when an opcode breakpoint asks for it.
                    let byte = match opcode {
                        Some(byte) => byte,
                        None => {
                            let byte = self.cpu.memory().read_byte(pc)?;
                            opcode = Some(byte);
                            byte
                        }
                    };
                    byte == code
                }
            };
            if hit {
                return Ok(Some(bp));
            }
        }
        Ok(None)
    }

    pub fn input_mut(&mut self) -> &mut Input {
        self.cpu.memory_mut().input_mut()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }
}

#[cfg(test)]
mod tests;
