use super::opcode::{Cond, Ind, R16Stack, R16, R8};
use super::{Cpu, Flags};
use crate::error::Result;

impl Cpu {
    /// Read an 8-bit operand. `(HL)` goes through the memory map.
    #[inline]
    pub(super) fn read_r8(&self, r: R8) -> Result<u8> {
        let value = match r {
            R8::B => self.regs.b,
            R8::C => self.regs.c,
            R8::D => self.regs.d,
            R8::E => self.regs.e,
            R8::H => self.regs.h,
            R8::L => self.regs.l,
            R8::HlInd => self.memory.read_byte(self.regs.hl())?,
            R8::A => self.regs.a,
        };
        Ok(value)
    }

    #[inline]
    pub(super) fn write_r8(&mut self, r: R8, value: u8) -> Result<()> {
        match r {
            R8::B => self.regs.b = value,
            R8::C => self.regs.c = value,
            R8::D => self.regs.d = value,
            R8::E => self.regs.e = value,
            R8::H => self.regs.h = value,
            R8::L => self.regs.l = value,
            R8::HlInd => self.memory.write_byte(self.regs.hl(), value)?,
            R8::A => self.regs.a = value,
        }
        Ok(())
    }

    #[inline]
    pub(super) fn read_r16(&self, rr: R16) -> u16 {
        match rr {
            R16::BC => self.regs.bc(),
            R16::DE => self.regs.de(),
            R16::HL => self.regs.hl(),
            R16::SP => self.regs.sp,
        }
    }

    #[inline]
    pub(super) fn write_r16(&mut self, rr: R16, value: u16) {
        match rr {
            R16::BC => self.regs.set_bc(value),
            R16::DE => self.regs.set_de(value),
            R16::HL => self.regs.set_hl(value),
            R16::SP => self.regs.sp = value,
        }
    }

    /// Resolve an indirect operand, applying the post-increment or
    /// post-decrement of the `(HL+)`/`(HL-)` forms.
    pub(super) fn ind_addr(&mut self, ind: Ind) -> u16 {
        match ind {
            Ind::BC => self.regs.bc(),
            Ind::DE => self.regs.de(),
            Ind::HLInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Ind::HLDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    pub(super) fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::NZ => !self.regs.flag(Flags::Z),
            Cond::Z => self.regs.flag(Flags::Z),
            Cond::NC => !self.regs.flag(Flags::C),
            Cond::C => self.regs.flag(Flags::C),
            Cond::Always => true,
        }
    }

    #[inline]
    pub(super) fn fetch8(&mut self) -> Result<u8> {
        let value = self.memory.read_byte(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    #[inline]
    pub(super) fn fetch16(&mut self) -> Result<u16> {
        let lo = self.fetch8()?;
        let hi = self.fetch8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    #[inline]
    pub(super) fn push_u16(&mut self, value: u16) -> Result<()> {
        let [lo, hi] = value.to_le_bytes();
        // Stack grows downward. We want memory[SP] = low, memory[SP+1] = high.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write_byte(self.regs.sp, hi)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write_byte(self.regs.sp, lo)?;
        Ok(())
    }

    #[inline]
    pub(super) fn pop_u16(&mut self) -> Result<u16> {
        let lo = self.memory.read_byte(self.regs.sp)?;
        let hi = self.memory.read_byte(self.regs.sp.wrapping_add(1))?;
        self.regs.sp = self.regs.sp.wrapping_add(2);
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub(super) fn push_pair(&mut self, rr: R16Stack) -> Result<()> {
        let value = match rr {
            R16Stack::BC => self.regs.bc(),
            R16Stack::DE => self.regs.de(),
            R16Stack::HL => self.regs.hl(),
            R16Stack::AF => self.regs.af(),
        };
        self.push_u16(value)
    }

    /// POP AF drops the low nibble of F like any other write to it.
    pub(super) fn pop_pair(&mut self, rr: R16Stack) -> Result<()> {
        let value = self.pop_u16()?;
        match rr {
            R16Stack::BC => self.regs.set_bc(value),
            R16Stack::DE => self.regs.set_de(value),
            R16Stack::HL => self.regs.set_hl(value),
            R16Stack::AF => self.regs.set_af(value),
        }
        Ok(())
    }

    /// Relative jump helper used by JR/JR cc.
    ///
    /// The displacement is a signed 8-bit offset relative to the address
    /// following the operand. Returns whether the branch was taken.
    pub(super) fn jr(&mut self, cond: bool) -> Result<bool> {
        let offset = self.fetch8()? as i8;
        if cond {
            self.regs.pc = self.regs.pc.wrapping_add_signed(offset.into());
        }
        Ok(cond)
    }

    /// Absolute jump helper used by JP and JP cc.
    pub(super) fn jp(&mut self, cond: bool) -> Result<bool> {
        let addr = self.fetch16()?;
        if cond {
            self.regs.pc = addr;
        }
        Ok(cond)
    }

    /// CALL and CALL cc. The pushed return address is the one after the
    /// operand.
    pub(super) fn call(&mut self, cond: bool) -> Result<bool> {
        let addr = self.fetch16()?;
        if cond {
            self.push_u16(self.regs.pc)?;
            self.regs.pc = addr;
        }
        Ok(cond)
    }

    pub(super) fn ret(&mut self, cond: bool) -> Result<bool> {
        if cond {
            self.regs.pc = self.pop_u16()?;
        }
        Ok(cond)
    }

    pub(super) fn rst(&mut self, vector: u8) -> Result<()> {
        self.push_u16(self.regs.pc)?;
        self.regs.pc = u16::from(vector);
        Ok(())
    }
}
