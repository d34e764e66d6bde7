//! Static decode table for the main and CB-prefixed opcode spaces.
//!
//! Slots 0x000-0x0FF hold the main table and 0x100-0x1FF the CB table. The
//! table is built once from the x/y/z bit fields of each opcode; a slot with
//! no entry is an opcode hole.

use std::fmt;

use lazy_static::lazy_static;

use crate::error::CpuError;

pub const CB_BASE: u16 = 0x100;
pub const TABLE_SIZE: usize = 0x200;

/// 8-bit operand in the standard `r` encoding order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum R8 {
    B,
    C,
    D,
    E,
    H,
    L,
    HlInd,
    A,
}

impl R8 {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => R8::B,
            1 => R8::C,
            2 => R8::D,
            3 => R8::E,
            4 => R8::H,
            5 => R8::L,
            6 => R8::HlInd,
            _ => R8::A,
        }
    }
}

/// 16-bit operand of the `rp` table (loads, INC/DEC, ADD HL).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum R16 {
    BC,
    DE,
    HL,
    SP,
}

impl R16 {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => R16::BC,
            1 => R16::DE,
            2 => R16::HL,
            _ => R16::SP,
        }
    }
}

/// 16-bit operand of the `rp2` table (PUSH/POP), where AF replaces SP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum R16Stack {
    BC,
    DE,
    HL,
    AF,
}

impl R16Stack {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => R16Stack::BC,
            1 => R16Stack::DE,
            2 => R16Stack::HL,
            _ => R16Stack::AF,
        }
    }
}

/// Indirect address forms used by `LD (rr),A` and `LD A,(rr)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ind {
    BC,
    DE,
    HLInc,
    HLDec,
}

impl Ind {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Ind::BC,
            1 => Ind::DE,
            2 => Ind::HLInc,
            _ => Ind::HLDec,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    NZ,
    Z,
    NC,
    C,
    Always,
}

impl Cond {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Cond::NZ,
            1 => Cond::Z,
            2 => Cond::NC,
            _ => Cond::C,
        }
    }

    /// Extra cycles a conditional branch costs when it is taken.
    /// Unconditional forms carry their full cost in the table.
    pub fn penalty(self, taken: bool, cycles: u32) -> u32 {
        if taken && self != Cond::Always {
            cycles
        } else {
            0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

/// Rotate/shift group of the CB table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl RotOp {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => RotOp::Rlc,
            1 => RotOp::Rrc,
            2 => RotOp::Rl,
            3 => RotOp::Rr,
            4 => RotOp::Sla,
            5 => RotOp::Sra,
            6 => RotOp::Swap,
            _ => RotOp::Srl,
        }
    }
}

/// Everything the executor knows how to do, with operands already decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,

    LdR16Imm(R16),
    LdIndA(Ind),
    LdAInd(Ind),
    LdImm16Sp,
    IncR16(R16),
    DecR16(R16),
    AddHl(R16),

    IncR8(R8),
    DecR8(R8),
    LdR8Imm(R8),
    LdR8R8(R8, R8),

    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,

    Alu(AluOp, R8),
    AluImm(AluOp),

    Jr(Cond),
    Jp(Cond),
    JpHl,
    Call(Cond),
    Ret(Cond),
    Reti,
    Rst(u8),
    Pop(R16Stack),
    Push(R16Stack),

    LdhImmA,
    LdhAImm,
    LdhCA,
    LdhAC,
    LdImm16A,
    LdAImm16,
    AddSpImm,
    LdHlSpImm,
    LdSpHl,

    PrefixCb,
    Rot(RotOp, R8),
    Bit(u8, R8),
    Res(u8, R8),
    Set(u8, R8),
}

/// Kind of inline operand following the opcode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Immediate {
    None,
    /// Unsigned byte.
    D8,
    /// Little-endian word.
    D16,
    /// Offset into 0xFF00.
    A8,
    /// Little-endian absolute address.
    A16,
    /// Signed byte.
    R8,
}

impl Immediate {
    /// Placeholder text used for this operand in mnemonics.
    pub fn placeholder(self) -> &'static str {
        match self {
            Immediate::None => "",
            Immediate::D8 => "d8",
            Immediate::D16 => "d16",
            Immediate::A8 => "a8",
            Immediate::A16 => "a16",
            Immediate::R8 => "r8",
        }
    }

    pub fn size(self) -> u8 {
        match self {
            Immediate::None => 0,
            Immediate::D8 | Immediate::A8 | Immediate::R8 => 1,
            Immediate::D16 | Immediate::A16 => 2,
        }
    }
}

impl Operation {
    pub fn immediate(self) -> Immediate {
        match self {
            Operation::LdR16Imm(_) => Immediate::D16,
            Operation::LdImm16Sp
            | Operation::Jp(_)
            | Operation::Call(_)
            | Operation::LdImm16A
            | Operation::LdAImm16 => Immediate::A16,
            Operation::LdR8Imm(_) | Operation::AluImm(_) => Immediate::D8,
            Operation::LdhImmA | Operation::LdhAImm => Immediate::A8,
            Operation::Jr(_) | Operation::AddSpImm | Operation::LdHlSpImm => Immediate::R8,
            _ => Immediate::None,
        }
    }

    /// Encoded size in bytes, opcode included. STOP swallows the byte
    /// after it and every CB instruction is two bytes.
    pub fn length(self) -> u8 {
        match self {
            Operation::Stop
            | Operation::PrefixCb
            | Operation::Rot(..)
            | Operation::Bit(..)
            | Operation::Res(..)
            | Operation::Set(..) => 2,
            other => 1 + other.immediate().size(),
        }
    }

    /// True for operations that may load PC with something other than the
    /// next instruction's address.
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Operation::Jr(_)
                | Operation::Jp(_)
                | Operation::JpHl
                | Operation::Call(_)
                | Operation::Ret(_)
                | Operation::Reti
                | Operation::Rst(_)
        )
    }
}

/// One slot of the opcode table.
#[derive(Clone, Debug)]
pub struct OpcodeEntry {
    pub name: String,
    pub length: u8,
    /// Base cost in T-cycles. Taken conditional branches add to it.
    pub cycles: u32,
    /// `None` marks an opcode that is known but has no executor.
    pub operation: Option<Operation>,
}

impl OpcodeEntry {
    fn new(operation: Operation, cycles: u32) -> Self {
        Self {
            name: operation.to_string(),
            length: operation.length(),
            cycles,
            operation: Some(operation),
        }
    }

    /// The operation to run for `code` fetched at `pc`, or
    /// `UnimplementedOpcode` when the slot has no executor.
    pub fn executable(&self, code: u16, pc: u16) -> Result<Operation, CpuError> {
        self.operation.ok_or_else(|| CpuError::UnimplementedOpcode {
            opcode: code,
            name: self.name.clone(),
            pc,
        })
    }
}

lazy_static! {
    static ref TABLE: [Option<OpcodeEntry>; TABLE_SIZE] =
        std::array::from_fn(|slot| build_entry(slot as u16));
}

/// Look up a slot. CB-prefixed opcodes live at `CB_BASE + byte`.
pub fn lookup(code: u16) -> Option<&'static OpcodeEntry> {
    TABLE.get(usize::from(code))?.as_ref()
}

fn build_entry(code: u16) -> Option<OpcodeEntry> {
    let (operation, cycles) = if code < CB_BASE {
        decode_main(code as u8)?
    } else {
        decode_cb((code - CB_BASE) as u8)
    };
    Some(OpcodeEntry::new(operation, cycles))
}

fn decode_main(opcode: u8) -> Option<(Operation, u32)> {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let q = y & 0x01;
    let mem = |r: R8, reg: u32, hl: u32| if r == R8::HlInd { hl } else { reg };

    let decoded = match (x, z) {
        (0, 0) => match y {
            0 => (Operation::Nop, 4),
            1 => (Operation::LdImm16Sp, 20),
            2 => (Operation::Stop, 4),
            3 => (Operation::Jr(Cond::Always), 12),
            _ => (Operation::Jr(Cond::from_bits(y - 4)), 8),
        },
        (0, 1) if q == 0 => (Operation::LdR16Imm(R16::from_bits(p)), 12),
        (0, 1) => (Operation::AddHl(R16::from_bits(p)), 8),
        (0, 2) if q == 0 => (Operation::LdIndA(Ind::from_bits(p)), 8),
        (0, 2) => (Operation::LdAInd(Ind::from_bits(p)), 8),
        (0, 3) if q == 0 => (Operation::IncR16(R16::from_bits(p)), 8),
        (0, 3) => (Operation::DecR16(R16::from_bits(p)), 8),
        (0, 4) => {
            let r = R8::from_bits(y);
            (Operation::IncR8(r), mem(r, 4, 12))
        }
        (0, 5) => {
            let r = R8::from_bits(y);
            (Operation::DecR8(r), mem(r, 4, 12))
        }
        (0, 6) => {
            let r = R8::from_bits(y);
            (Operation::LdR8Imm(r), mem(r, 8, 12))
        }
        (0, _) => {
            let op = match y {
                0 => Operation::Rlca,
                1 => Operation::Rrca,
                2 => Operation::Rla,
                3 => Operation::Rra,
                4 => Operation::Daa,
                5 => Operation::Cpl,
                6 => Operation::Scf,
                _ => Operation::Ccf,
            };
            (op, 4)
        }

        // LD (HL),(HL) is where HALT sits.
        (1, 6) if y == 6 => (Operation::Halt, 4),
        (1, _) => {
            let dst = R8::from_bits(y);
            let src = R8::from_bits(z);
            let cycles = if dst == R8::HlInd || src == R8::HlInd { 8 } else { 4 };
            (Operation::LdR8R8(dst, src), cycles)
        }

        (2, _) => {
            let r = R8::from_bits(z);
            (Operation::Alu(AluOp::from_bits(y), r), mem(r, 4, 8))
        }

        (_, 0) => match y {
            0..=3 => (Operation::Ret(Cond::from_bits(y)), 8),
            4 => (Operation::LdhImmA, 12),
            5 => (Operation::AddSpImm, 16),
            6 => (Operation::LdhAImm, 12),
            _ => (Operation::LdHlSpImm, 12),
        },
        (_, 1) if q == 0 => (Operation::Pop(R16Stack::from_bits(p)), 12),
        (_, 1) => match p {
            0 => (Operation::Ret(Cond::Always), 16),
            1 => (Operation::Reti, 16),
            2 => (Operation::JpHl, 4),
            _ => (Operation::LdSpHl, 8),
        },
        (_, 2) => match y {
            0..=3 => (Operation::Jp(Cond::from_bits(y)), 12),
            4 => (Operation::LdhCA, 8),
            5 => (Operation::LdImm16A, 16),
            6 => (Operation::LdhAC, 8),
            _ => (Operation::LdAImm16, 16),
        },
        (_, 3) => match y {
            0 => (Operation::Jp(Cond::Always), 16),
            1 => (Operation::PrefixCb, 4),
            6 => (Operation::Di, 4),
            7 => (Operation::Ei, 4),
            _ => return None,
        },
        (_, 4) => match y {
            0..=3 => (Operation::Call(Cond::from_bits(y)), 12),
            _ => return None,
        },
        (_, 5) if q == 0 => (Operation::Push(R16Stack::from_bits(p)), 16),
        (_, 5) => match p {
            0 => (Operation::Call(Cond::Always), 24),
            _ => return None,
        },
        (_, 6) => (Operation::AluImm(AluOp::from_bits(y)), 8),
        (_, _) => (Operation::Rst(y * 8), 16),
    };
    Some(decoded)
}

/// CB costs exclude the 4 cycles already charged for the prefix byte.
fn decode_cb(opcode: u8) -> (Operation, u32) {
    let y = (opcode >> 3) & 0x07;
    let r = R8::from_bits(opcode);
    let on_hl = r == R8::HlInd;

    match opcode >> 6 {
        0 => (Operation::Rot(RotOp::from_bits(y), r), if on_hl { 12 } else { 4 }),
        1 => (Operation::Bit(y, r), if on_hl { 8 } else { 4 }),
        2 => (Operation::Res(y, r), if on_hl { 12 } else { 4 }),
        _ => (Operation::Set(y, r), if on_hl { 12 } else { 4 }),
    }
}

impl fmt::Display for R8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            R8::B => "B",
            R8::C => "C",
            R8::D => "D",
            R8::E => "E",
            R8::H => "H",
            R8::L => "L",
            R8::HlInd => "(HL)",
            R8::A => "A",
        };
        f.write_str(name)
    }
}

impl fmt::Display for R16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            R16::BC => "BC",
            R16::DE => "DE",
            R16::HL => "HL",
            R16::SP => "SP",
        };
        f.write_str(name)
    }
}

impl fmt::Display for R16Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            R16Stack::BC => "BC",
            R16Stack::DE => "DE",
            R16Stack::HL => "HL",
            R16Stack::AF => "AF",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Ind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ind::BC => "(BC)",
            Ind::DE => "(DE)",
            Ind::HLInc => "(HL+)",
            Ind::HLDec => "(HL-)",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Cond {
    /// Writes the condition followed by a comma, or nothing for `Always`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self {
            Cond::NZ => "NZ,",
            Cond::Z => "Z,",
            Cond::NC => "NC,",
            Cond::C => "C,",
            Cond::Always => "",
        };
        f.write_str(prefix)
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self {
            AluOp::Add => "ADD A,",
            AluOp::Adc => "ADC A,",
            AluOp::Sub => "SUB ",
            AluOp::Sbc => "SBC A,",
            AluOp::And => "AND ",
            AluOp::Xor => "XOR ",
            AluOp::Or => "OR ",
            AluOp::Cp => "CP ",
        };
        f.write_str(prefix)
    }
}

impl fmt::Display for RotOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotOp::Rlc => "RLC",
            RotOp::Rrc => "RRC",
            RotOp::Rl => "RL",
            RotOp::Rr => "RR",
            RotOp::Sla => "SLA",
            RotOp::Sra => "SRA",
            RotOp::Swap => "SWAP",
            RotOp::Srl => "SRL",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Operation::Nop => f.write_str("NOP"),
            Operation::Stop => f.write_str("STOP"),
            Operation::Halt => f.write_str("HALT"),
            Operation::Di => f.write_str("DI"),
            Operation::Ei => f.write_str("EI"),

            Operation::LdR16Imm(rr) => write!(f, "LD {rr},d16"),
            Operation::LdIndA(ind) => write!(f, "LD {ind},A"),
            Operation::LdAInd(ind) => write!(f, "LD A,{ind}"),
            Operation::LdImm16Sp => f.write_str("LD (a16),SP"),
            Operation::IncR16(rr) => write!(f, "INC {rr}"),
            Operation::DecR16(rr) => write!(f, "DEC {rr}"),
            Operation::AddHl(rr) => write!(f, "ADD HL,{rr}"),

            Operation::IncR8(r) => write!(f, "INC {r}"),
            Operation::DecR8(r) => write!(f, "DEC {r}"),
            Operation::LdR8Imm(r) => write!(f, "LD {r},d8"),
            Operation::LdR8R8(dst, src) => write!(f, "LD {dst},{src}"),

            Operation::Rlca => f.write_str("RLCA"),
            Operation::Rrca => f.write_str("RRCA"),
            Operation::Rla => f.write_str("RLA"),
            Operation::Rra => f.write_str("RRA"),
            Operation::Daa => f.write_str("DAA"),
            Operation::Cpl => f.write_str("CPL"),
            Operation::Scf => f.write_str("SCF"),
            Operation::Ccf => f.write_str("CCF"),

            Operation::Alu(op, r) => write!(f, "{op}{r}"),
            Operation::AluImm(op) => write!(f, "{op}d8"),

            Operation::Jr(cond) => write!(f, "JR {cond}r8"),
            Operation::Jp(cond) => write!(f, "JP {cond}a16"),
            Operation::JpHl => f.write_str("JP HL"),
            Operation::Call(cond) => write!(f, "CALL {cond}a16"),
            Operation::Ret(Cond::Always) => f.write_str("RET"),
            Operation::Ret(cond) => {
                let text = cond.to_string();
                write!(f, "RET {}", text.trim_end_matches(','))
            }
            Operation::Reti => f.write_str("RETI"),
            Operation::Rst(vector) => write!(f, "RST {vector:02X}H"),
            Operation::Pop(rr) => write!(f, "POP {rr}"),
            Operation::Push(rr) => write!(f, "PUSH {rr}"),

            Operation::LdhImmA => f.write_str("LDH (a8),A"),
            Operation::LdhAImm => f.write_str("LDH A,(a8)"),
            Operation::LdhCA => f.write_str("LD (C),A"),
            Operation::LdhAC => f.write_str("LD A,(C)"),
            Operation::LdImm16A => f.write_str("LD (a16),A"),
            Operation::LdAImm16 => f.write_str("LD A,(a16)"),
            Operation::AddSpImm => f.write_str("ADD SP,r8"),
            Operation::LdHlSpImm => f.write_str("LD HL,SP+r8"),
            Operation::LdSpHl => f.write_str("LD SP,HL"),

            Operation::PrefixCb => f.write_str("PREFIX CB"),
            Operation::Rot(op, r) => write!(f, "{op} {r}"),
            Operation::Bit(bit, r) => write!(f, "BIT {bit},{r}"),
            Operation::Res(bit, r) => write!(f, "RES {bit},{r}"),
            Operation::Set(bit, r) => write!(f, "SET {bit},{r}"),
        }
    }
}
