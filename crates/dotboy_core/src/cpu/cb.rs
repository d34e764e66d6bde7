use super::opcode::{RotOp, R8};
use super::{Cpu, Flags};
use crate::error::Result;

impl Cpu {
    /// Rotate, shift or swap an 8-bit operand in place.
    ///
    /// Z comes from the result and N/H are cleared. C takes the bit shifted
    /// out, except for SWAP which clears it.
    pub(super) fn cb_rotate(&mut self, op: RotOp, target: R8) -> Result<()> {
        let value = self.read_r8(target)?;
        let carry_in = self.regs.flag(Flags::C);

        let (result, carry_out) = match op {
            RotOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            RotOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            RotOp::Rl => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
            RotOp::Rr => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
            RotOp::Sla => (value << 1, value & 0x80 != 0),
            // Arithmetic shift keeps the sign bit.
            RotOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            RotOp::Swap => (value.rotate_left(4), false),
            RotOp::Srl => (value >> 1, value & 0x01 != 0),
        };

        let mut flags = Flags::empty();
        flags.set(Flags::Z, result == 0);
        flags.set(Flags::C, carry_out);
        self.regs.flags = flags;

        self.write_r8(target, result)
    }

    /// BIT b,r: Z is set when the bit is clear. C survives.
    pub(super) fn cb_bit(&mut self, bit: u8, target: R8) -> Result<()> {
        let value = self.read_r8(target)?;
        self.regs.set_flag(Flags::Z, value & (1 << bit) == 0);
        self.regs.set_flag(Flags::N, false);
        self.regs.set_flag(Flags::H, true);
        Ok(())
    }

    /// RES/SET b,r. Flags are untouched.
    pub(super) fn cb_write_bit(&mut self, bit: u8, target: R8, set: bool) -> Result<()> {
        let value = self.read_r8(target)?;
        let mask = 1u8 << bit;
        let result = if set { value | mask } else { value & !mask };
        self.write_r8(target, result)
    }

    /// RLCA, RRCA, RLA and RRA. Unlike the CB forms they always clear Z.
    pub(super) fn rotate_a(&mut self, left: bool, through_carry: bool) {
        let a = self.regs.a;
        let carry_in = u8::from(self.regs.flag(Flags::C));

        let (result, carry_out) = match (left, through_carry) {
            (true, false) => (a.rotate_left(1), a & 0x80 != 0),
            (false, false) => (a.rotate_right(1), a & 0x01 != 0),
            (true, true) => ((a << 1) | carry_in, a & 0x80 != 0),
            (false, true) => ((a >> 1) | (carry_in << 7), a & 0x01 != 0),
        };

        self.regs.flags = if carry_out { Flags::C } else { Flags::empty() };
        self.regs.a = result;
    }
}
