use super::*;
use crate::error::{CpuError, Error};
use crate::input::Button;

/// Cartridge with `program` placed at the entry point.
fn emulator_with_program(program: &[u8]) -> Emulator {
    let mut rom = vec![0u8; 0x4000];
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    Emulator::new(rom).unwrap()
}

#[test]
fn new_starts_at_entry_point_with_post_boot_state() {
    let emu = emulator_with_program(&[]);

    assert_eq!(emu.cpu().regs().pc, 0x0100);
    assert_eq!(emu.cpu().regs().sp, 0xFFFE);
    assert_eq!(emu.cpu().memory().read_byte(0xFF40).unwrap(), 0x91);
}

#[test]
fn new_rejects_short_cartridge() {
    assert!(matches!(
        Emulator::new(vec![0u8; 16]),
        Err(Error::CartridgeTooSmall { len: 16, .. })
    ));
}

#[test]
fn pc_breakpoint_stops_before_executing() {
    let mut emu = emulator_with_program(&[0x00, 0x00, 0x00, 0x3C]);
    let breakpoints = [Breakpoint::Pc(0x0103)];

    let reason = emu.run(100, &breakpoints).unwrap();

    assert_eq!(reason, StopReason::Breakpoint(Breakpoint::Pc(0x0103)));
    assert_eq!(emu.cpu().regs().pc, 0x0103);
    assert_eq!(emu.cpu().regs().a, 0x01);

    // Resuming runs the instruction under the breakpoint.
    let reason = emu.run(1, &breakpoints).unwrap();
    assert_eq!(reason, StopReason::BudgetExhausted);
    assert_eq!(emu.cpu().regs().a, 0x02);
}

#[test]
fn opcode_breakpoint_matches_byte_at_pc() {
    let mut emu = emulator_with_program(&[0x00, 0x00, 0x3C]);

    let reason = emu.run(100, &[Breakpoint::Opcode(0x3C)]).unwrap();

    assert_eq!(reason, StopReason::Breakpoint(Breakpoint::Opcode(0x3C)));
    assert_eq!(emu.cpu().regs().pc, 0x0102);
}

#[test]
fn breakpoint_on_starting_pc_is_skipped_once() {
    // JR -2 loops on itself.
    let mut emu = emulator_with_program(&[0x18, 0xFE]);

    let reason = emu.run(10, &[Breakpoint::Pc(0x0100)]).unwrap();

    assert_eq!(reason, StopReason::Breakpoint(Breakpoint::Pc(0x0100)));
    assert_eq!(emu.cpu().total_cycles(), 12);
}

#[test]
fn budget_bounds_the_number_of_instructions() {
    let mut emu = emulator_with_program(&[0x18, 0xFE]);

    let reason = emu.run(5, &[]).unwrap();

    assert_eq!(reason, StopReason::BudgetExhausted);
    assert_eq!(emu.cpu().total_cycles(), 5 * 12);
}

#[test]
fn run_stops_on_halt_and_stop() {
    let mut emu = emulator_with_program(&[0x00, 0x76]);
    assert_eq!(emu.run(10, &[]).unwrap(), StopReason::Halted);
    assert_eq!(emu.cpu().regs().pc, 0x0102);

    // Still halted: nothing runs.
    assert_eq!(emu.run(10, &[]).unwrap(), StopReason::Halted);
    assert_eq!(emu.cpu().regs().pc, 0x0102);

    let mut emu = emulator_with_program(&[0x10, 0x00]);
    assert_eq!(emu.run(10, &[]).unwrap(), StopReason::Stopped);
    assert_eq!(emu.cpu().regs().pc, 0x0102);
}

#[test]
fn run_propagates_cpu_errors() {
    let mut emu = emulator_with_program(&[0x00, 0xFD]);

    let err = emu.run(10, &[]).unwrap_err();

    assert_eq!(
        err,
        Error::Cpu(CpuError::InvalidOpcode {
            opcode: 0xFD,
            pc: 0x0101
        })
    );
}

#[test]
fn reset_restores_entry_state_and_clears_ram() {
    let mut emu = emulator_with_program(&[0xEA, 0x00, 0xC0]); // LD (0xC000), A
    emu.tick().unwrap();
    assert_eq!(emu.cpu().memory().read_byte(0xC000).unwrap(), 0x01);

    emu.reset();

    assert_eq!(emu.cpu().regs().pc, 0x0100);
    assert_eq!(emu.cpu().total_cycles(), 0);
    assert_eq!(emu.cpu().memory().read_byte(0xC000).unwrap(), 0x00);
}

#[test]
fn input_reaches_the_joypad_register() {
    let mut emu = emulator_with_program(&[]);
    emu.input_mut().set(Button::Up, true);
    emu.cpu_mut()
        .memory_mut()
        .write_byte(0xFF00, crate::memory_map::SELECT_DIRECTION)
        .unwrap();

    let p1 = emu.cpu().memory().read_byte(0xFF00).unwrap();

    assert_eq!(p1 & 0b0100, 0);
}

#[test]
fn stop_reason_display() {
    assert_eq!(
        StopReason::Breakpoint(Breakpoint::Pc(0x0150)).to_string(),
        "breakpoint at PC=0x0150"
    );
    assert_eq!(StopReason::Halted.to_string(), "CPU halted");
}
