use super::opcode::AluOp;
use super::{Cpu, Flags};

impl Cpu {
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.alu_add(value, false),
            AluOp::Adc => self.alu_add(value, true),
            AluOp::Sub => self.regs.a = self.alu_sub(value, false),
            AluOp::Sbc => self.regs.a = self.alu_sub(value, self.regs.flag(Flags::C)),
            AluOp::And => self.alu_logic(self.regs.a & value, true),
            AluOp::Xor => self.alu_logic(self.regs.a ^ value, false),
            AluOp::Or => self.alu_logic(self.regs.a | value, false),
            // CP is SUB with the result thrown away.
            AluOp::Cp => {
                self.alu_sub(value, false);
            }
        }
    }

    /// ADD/ADC on A. `use_carry` selects ADC.
    fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = u8::from(use_carry && self.regs.flag(Flags::C));

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = u16::from(a) + u16::from(value) + u16::from(carry_in);
        let result = full as u8;

        let mut flags = Flags::empty();
        flags.set(Flags::Z, result == 0);
        flags.set(Flags::H, half > 0x0F);
        flags.set(Flags::C, full > 0xFF);
        self.regs.flags = flags;
        self.regs.a = result;
    }

    /// A minus `value` minus the borrow. Sets flags and returns the result
    /// without storing it, so CP can share it.
    fn alu_sub(&mut self, value: u8, borrow: bool) -> u8 {
        let a = self.regs.a;
        let carry_in = i16::from(borrow);

        let half = i16::from(a & 0x0F) - i16::from(value & 0x0F) - carry_in;
        let full = i16::from(a) - i16::from(value) - carry_in;
        let result = full as u8;

        let mut flags = Flags::N;
        flags.set(Flags::Z, result == 0);
        flags.set(Flags::H, half < 0);
        flags.set(Flags::C, full < 0);
        self.regs.flags = flags;
        result
    }

    /// AND/OR/XOR share everything but the H flag, which only AND sets.
    fn alu_logic(&mut self, result: u8, half_carry: bool) {
        let mut flags = Flags::empty();
        flags.set(Flags::Z, result == 0);
        flags.set(Flags::H, half_carry);
        self.regs.flags = flags;
        self.regs.a = result;
    }

    /// INC r / INC (HL). Carry is left alone.
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.set_flag(Flags::Z, result == 0);
        self.regs.set_flag(Flags::N, false);
        self.regs.set_flag(Flags::H, value & 0x0F == 0x0F);
        result
    }

    /// DEC r / DEC (HL). Carry is left alone.
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.set_flag(Flags::Z, result == 0);
        self.regs.set_flag(Flags::N, true);
        self.regs.set_flag(Flags::H, value & 0x0F == 0);
        result
    }

    /// `ADD HL,rr`: Z untouched, H and C from bits 11 and 15.
    pub(super) fn alu_add_hl(&mut self, value: u16) {
        let hl = self.regs.hl();

        self.regs.set_flag(Flags::N, false);
        self.regs.set_flag(Flags::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.regs
            .set_flag(Flags::C, u32::from(hl) + u32::from(value) > 0xFFFF);

        self.regs.set_hl(hl.wrapping_add(value));
    }

    /// Signed byte added to a 16-bit base, as in `ADD SP,r8` and
    /// `LD HL,SP+r8`. Z and N are cleared; H and C come from the low byte.
    pub(super) fn alu_add_sp_signed(&mut self, base: u16, imm8: u8) -> u16 {
        let offset = imm8 as i8 as i16 as u16;

        let mut flags = Flags::empty();
        flags.set(Flags::H, (base & 0x000F) + (offset & 0x000F) > 0x000F);
        flags.set(Flags::C, (base & 0x00FF) + (offset & 0x00FF) > 0x00FF);
        self.regs.flags = flags;

        base.wrapping_add(offset)
    }

    /// Decimal adjust after a BCD add or subtract.
    ///
    /// N, H and C are all read before A changes. N is preserved, H is
    /// cleared, C ends up set whenever the upper digit needed correcting.
    pub(super) fn alu_daa(&mut self) {
        let subtract = self.regs.flag(Flags::N);
        let half = self.regs.flag(Flags::H);
        let carry = self.regs.flag(Flags::C);
        let mut a = self.regs.a;

        let mut adjust = 0u8;
        if carry || (!subtract && a > 0x99) {
            adjust |= 0x60;
        }
        if half || (!subtract && a & 0x0F > 0x09) {
            adjust |= 0x06;
        }

        a = if subtract {
            a.wrapping_sub(adjust)
        } else {
            a.wrapping_add(adjust)
        };

        self.regs.set_flag(Flags::Z, a == 0);
        self.regs.set_flag(Flags::H, false);
        self.regs.set_flag(Flags::C, adjust & 0x60 != 0);
        self.regs.a = a;
    }

    pub(super) fn alu_cpl(&mut self) {
        self.regs.a = !self.regs.a;
        self.regs.set_flag(Flags::N, true);
        self.regs.set_flag(Flags::H, true);
    }

    pub(super) fn alu_scf(&mut self) {
        self.regs.set_flag(Flags::N, false);
        self.regs.set_flag(Flags::H, false);
        self.regs.set_flag(Flags::C, true);
    }

    pub(super) fn alu_ccf(&mut self) {
        let carry = self.regs.flag(Flags::C);
        self.regs.set_flag(Flags::N, false);
        self.regs.set_flag(Flags::H, false);
        self.regs.set_flag(Flags::C, !carry);
    }
}
