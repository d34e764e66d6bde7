use bitflags::bitflags;

bitflags! {
    /// Flag bits in the F register.
    ///
    /// Bits 3-0 do not exist on hardware. Converting from a raw byte goes
    /// through `from_bits_truncate`, so they always read back as zero.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u8 {
        /// Zero
        const Z = 0b1000_0000;
        /// Subtract
        const N = 0b0100_0000;
        /// Half carry (out of bit 3, or bit 11 for 16-bit adds)
        const H = 0b0010_0000;
        /// Carry
        const C = 0b0001_0000;
    }
}

/// Register names for generic access from tooling and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

impl Register {
    pub const ALL: [Register; 14] = [
        Register::A,
        Register::F,
        Register::B,
        Register::C,
        Register::D,
        Register::E,
        Register::H,
        Register::L,
        Register::AF,
        Register::BC,
        Register::DE,
        Register::HL,
        Register::SP,
        Register::PC,
    ];

    pub fn is_wide(self) -> bool {
        matches!(
            self,
            Register::AF | Register::BC | Register::DE | Register::HL | Register::SP | Register::PC
        )
    }
}

/// Register file of the LR35902.
///
/// Pairs are not stored separately: `bc()` and friends compose the two
/// 8-bit halves on every call, high byte first, so a write through either
/// view is visible through the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub flags: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn f(&self) -> u8 {
        self.flags.bits()
    }

    #[inline]
    pub fn set_f(&mut self, value: u8) {
        self.flags = Flags::from_bits_truncate(value);
    }

    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f()])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.set_f(f);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flags, value: bool) {
        self.flags.set(flag, value);
    }

    /// Read any register, zero-extended for the 8-bit ones.
    pub fn get(&self, register: Register) -> u16 {
        match register {
            Register::A => self.a.into(),
            Register::F => self.f().into(),
            Register::B => self.b.into(),
            Register::C => self.c.into(),
            Register::D => self.d.into(),
            Register::E => self.e.into(),
            Register::H => self.h.into(),
            Register::L => self.l.into(),
            Register::AF => self.af(),
            Register::BC => self.bc(),
            Register::DE => self.de(),
            Register::HL => self.hl(),
            Register::SP => self.sp,
            Register::PC => self.pc,
        }
    }

    /// Write any register. 8-bit registers keep the low byte of `value`.
    pub fn set(&mut self, register: Register, value: u16) {
        let low = value as u8;
        match register {
            Register::A => self.a = low,
            Register::F => self.set_f(low),
            Register::B => self.b = low,
            Register::C => self.c = low,
            Register::D => self.d = low,
            Register::E => self.e = low,
            Register::H => self.h = low,
            Register::L => self.l = low,
            Register::AF => self.set_af(value),
            Register::BC => self.set_bc(value),
            Register::DE => self.set_de(value),
            Register::HL => self.set_hl(value),
            Register::SP => self.sp = value,
            Register::PC => self.pc = value,
        }
    }
}
