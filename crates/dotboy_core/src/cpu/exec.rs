use super::opcode::{self, Operation, CB_BASE};
use super::Cpu;
use crate::error::{CpuError, Result};

impl Cpu {
    /// Run one decoded operation with PC already past the opcode byte.
    ///
    /// Returns the cycles to charge on top of the table cost: the taken
    /// penalty of a conditional branch, or the whole CB entry's cost for the
    /// prefix.
    pub(super) fn execute(&mut self, operation: Operation) -> Result<u32> {
        match operation {
            Operation::Nop => {}
            Operation::Stop => {
                // The byte after STOP is part of the instruction.
                self.fetch8()?;
                log::debug!("STOP at PC=0x{:04X}", self.regs.pc.wrapping_sub(2));
                self.stopped = true;
            }
            Operation::Halt => {
                log::debug!("HALT at PC=0x{:04X}", self.regs.pc.wrapping_sub(1));
                self.halted = true;
            }
            Operation::Di => self.ime = false,
            Operation::Ei => self.ime = true,

            Operation::LdR16Imm(rr) => {
                let value = self.fetch16()?;
                self.write_r16(rr, value);
            }
            Operation::LdIndA(ind) => {
                let addr = self.ind_addr(ind);
                self.memory.write_byte(addr, self.regs.a)?;
            }
            Operation::LdAInd(ind) => {
                let addr = self.ind_addr(ind);
                self.regs.a = self.memory.read_byte(addr)?;
            }
            Operation::LdImm16Sp => {
                let addr = self.fetch16()?;
                self.memory.write_word(addr, self.regs.sp)?;
            }
            Operation::IncR16(rr) => {
                let value = self.read_r16(rr).wrapping_add(1);
                self.write_r16(rr, value);
            }
            Operation::DecR16(rr) => {
                let value = self.read_r16(rr).wrapping_sub(1);
                self.write_r16(rr, value);
            }
            Operation::AddHl(rr) => {
                let value = self.read_r16(rr);
                self.alu_add_hl(value);
            }

            Operation::IncR8(r) => {
                let value = self.read_r8(r)?;
                let result = self.alu_inc8(value);
                self.write_r8(r, result)?;
            }
            Operation::DecR8(r) => {
                let value = self.read_r8(r)?;
                let result = self.alu_dec8(value);
                self.write_r8(r, result)?;
            }
            Operation::LdR8Imm(r) => {
                let value = self.fetch8()?;
                self.write_r8(r, value)?;
            }
            Operation::LdR8R8(dst, src) => {
                let value = self.read_r8(src)?;
                self.write_r8(dst, value)?;
            }

            Operation::Rlca => self.rotate_a(true, false),
            Operation::Rrca => self.rotate_a(false, false),
            Operation::Rla => self.rotate_a(true, true),
            Operation::Rra => self.rotate_a(false, true),
            Operation::Daa => self.alu_daa(),
            Operation::Cpl => self.alu_cpl(),
            Operation::Scf => self.alu_scf(),
            Operation::Ccf => self.alu_ccf(),

            Operation::Alu(op, r) => {
                let value = self.read_r8(r)?;
                self.alu(op, value);
            }
            Operation::AluImm(op) => {
                let value = self.fetch8()?;
                self.alu(op, value);
            }

            Operation::Jr(cond) => {
                let taken = self.jr(self.condition(cond))?;
                return Ok(cond.penalty(taken, 4));
            }
            Operation::Jp(cond) => {
                let taken = self.jp(self.condition(cond))?;
                return Ok(cond.penalty(taken, 4));
            }
            Operation::JpHl => self.regs.pc = self.regs.hl(),
            Operation::Call(cond) => {
                let taken = self.call(self.condition(cond))?;
                return Ok(cond.penalty(taken, 12));
            }
            Operation::Ret(cond) => {
                let taken = self.ret(self.condition(cond))?;
                return Ok(cond.penalty(taken, 12));
            }
            Operation::Reti => {
                self.ret(true)?;
                self.ime = true;
            }
            Operation::Rst(vector) => self.rst(vector)?,
            Operation::Pop(rr) => self.pop_pair(rr)?,
            Operation::Push(rr) => self.push_pair(rr)?,

            Operation::LdhImmA => {
                let offset = self.fetch8()?;
                self.memory.write_byte(0xFF00 | u16::from(offset), self.regs.a)?;
            }
            Operation::LdhAImm => {
                let offset = self.fetch8()?;
                self.regs.a = self.memory.read_byte(0xFF00 | u16::from(offset))?;
            }
            Operation::LdhCA => {
                self.memory
                    .write_byte(0xFF00 | u16::from(self.regs.c), self.regs.a)?;
            }
            Operation::LdhAC => {
                self.regs.a = self.memory.read_byte(0xFF00 | u16::from(self.regs.c))?;
            }
            Operation::LdImm16A => {
                let addr = self.fetch16()?;
                self.memory.write_byte(addr, self.regs.a)?;
            }
            Operation::LdAImm16 => {
                let addr = self.fetch16()?;
                self.regs.a = self.memory.read_byte(addr)?;
            }
            Operation::AddSpImm => {
                let imm = self.fetch8()?;
                self.regs.sp = self.alu_add_sp_signed(self.regs.sp, imm);
            }
            Operation::LdHlSpImm => {
                let imm = self.fetch8()?;
                let value = self.alu_add_sp_signed(self.regs.sp, imm);
                self.regs.set_hl(value);
            }
            Operation::LdSpHl => self.regs.sp = self.regs.hl(),

            Operation::PrefixCb => return self.execute_cb(),
            Operation::Rot(op, r) => self.cb_rotate(op, r)?,
            Operation::Bit(bit, r) => self.cb_bit(bit, r)?,
            Operation::Res(bit, r) => self.cb_write_bit(bit, r, false)?,
            Operation::Set(bit, r) => self.cb_write_bit(bit, r, true)?,
        }
        Ok(0)
    }

    /// Fetch the byte after 0xCB and run its entry from the CB half of the
    /// table.
    fn execute_cb(&mut self) -> Result<u32> {
        let prefix_pc = self.regs.pc.wrapping_sub(1);
        let code = CB_BASE + u16::from(self.fetch8()?);

        let entry = opcode::lookup(code).ok_or(CpuError::InvalidOpcode {
            opcode: code,
            pc: prefix_pc,
        })?;
        let operation = entry.executable(code, prefix_pc)?;

        let extra = self.execute(operation)?;
        Ok(entry.cycles + extra)
    }
}
