use super::{MemoryMap, IO_START, JOYPAD_ADDR};
use crate::input::Button;

/// P1 bit 5: the game is polling the direction pad.
pub const SELECT_DIRECTION: u8 = 0b0010_0000;
/// P1 bit 4: the game is polling the A/B/Select/Start group.
pub const SELECT_STANDARD: u8 = 0b0001_0000;

const SELECT_MASK: u8 = SELECT_DIRECTION | SELECT_STANDARD;
/// Bits 7-6 are not connected and always read back as 1.
const UNUSED_HIGH_BITS: u8 = 0b1100_0000;

impl MemoryMap {
    /// Compose the P1 register from the stored select bits and the input
    /// snapshot.
    ///
    /// Lines are active-low: a selected group pulls a line to 0 when the
    /// matching button is held. With no group selected nothing drives the
    /// lines and the low nibble reads 0.
    pub(super) fn read_joypad(&self) -> u8 {
        let select = self.io[(JOYPAD_ADDR - IO_START) as usize] & SELECT_MASK;
        let direction = select & SELECT_DIRECTION != 0;
        let standard = select & SELECT_STANDARD != 0;
        if !direction && !standard {
            return UNUSED_HIGH_BITS;
        }

        // (bit, direction button, standard button)
        let lines = [
            (3, Button::Down, Button::Start),
            (2, Button::Up, Button::Select),
            (1, Button::Left, Button::B),
            (0, Button::Right, Button::A),
        ];

        let mut low = 0x0F;
        for (bit, dpad, button) in lines {
            let pulled = (direction && self.input.is_pressed(dpad))
                || (standard && self.input.is_pressed(button));
            if pulled {
                low &= !(1u8 << bit);
            }
        }

        UNUSED_HIGH_BITS | select | low
    }

    /// Only the two select bits of P1 are writable.
    pub(super) fn write_joypad(&mut self, value: u8) {
        self.io[(JOYPAD_ADDR - IO_START) as usize] = value & SELECT_MASK;
    }
}
