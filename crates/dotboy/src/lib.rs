use std::path::PathBuf;

use anyhow::{Context, Result};
use dotboy_core::{Breakpoint, Cpu, Emulator, Flags, StopReason};
use typed_builder::TypedBuilder;

pub const DEFAULT_TICKS: u64 = 1_000_000;

/// Everything the runner needs to know about one session.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunOptions {
    pub rom: PathBuf,
    /// Upper bound on executed instructions.
    #[builder(default = DEFAULT_TICKS)]
    pub ticks: u64,
    #[builder(default)]
    pub breakpoints: Vec<Breakpoint>,
}

/// Load the ROM, run it until something stops it and print the machine
/// state.
pub fn run(options: RunOptions) -> Result<StopReason> {
    let rom = std::fs::read(&options.rom)
        .with_context(|| format!("failed to read ROM '{}'", options.rom.display()))?;
    log::info!("Playing ROM path: '{}'", options.rom.display());

    let mut emulator = Emulator::new(rom)
        .with_context(|| format!("failed to map cartridge '{}'", options.rom.display()))?;

    let result = emulator.run(options.ticks, &options.breakpoints);
    // Dump before reporting, so a fault still shows where it happened.
    print!("{}", dump_state(emulator.cpu()));
    let reason = result.context("emulation stopped with an error")?;

    println!("stop: {reason}");
    Ok(reason)
}

/// Registers, flags and the next instruction, one block of text.
pub fn dump_state(cpu: &Cpu) -> String {
    let regs = cpu.regs();
    let flag = |f: Flags, name: char| if regs.flag(f) { name } else { '-' };

    let next = match cpu.disassemble(regs.pc) {
        Ok((text, _)) => text,
        Err(err) => format!("<{err}>"),
    };

    format!(
        "AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X}\n\
         flags={}{}{}{} ime={} halted={} stopped={} cycles={}\n\
         next: {next}\n",
        regs.af(),
        regs.bc(),
        regs.de(),
        regs.hl(),
        regs.sp,
        regs.pc,
        flag(Flags::Z, 'Z'),
        flag(Flags::N, 'N'),
        flag(Flags::H, 'H'),
        flag(Flags::C, 'C'),
        u8::from(cpu.ime()),
        u8::from(cpu.halted()),
        u8::from(cpu.stopped()),
        cpu.total_cycles()
    )
}
