//! YM7128B Register Definitions
//!
//! The chip exposes 31 write-only byte registers: 16 tap gains, 4 mix levels,
//! 2 cross-feed coefficients and 9 tap delays. The emulator keeps them readable.

use std::fmt;
use std::str::FromStr;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::{Result, Ym7128bError};

/// Number of registers
pub const REGISTER_COUNT: usize = 31;

/// YM7128B Register Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum Register {
    /// Tap 1 left gain
    Gl1 = 0x00,
    /// Tap 2 left gain
    Gl2 = 0x01,
    /// Tap 3 left gain
    Gl3 = 0x02,
    /// Tap 4 left gain
    Gl4 = 0x03,
    /// Tap 5 left gain
    Gl5 = 0x04,
    /// Tap 6 left gain
    Gl6 = 0x05,
    /// Tap 7 left gain
    Gl7 = 0x06,
    /// Tap 8 left gain
    Gl8 = 0x07,
    /// Tap 1 right gain
    Gr1 = 0x08,
    /// Tap 2 right gain
    Gr2 = 0x09,
    /// Tap 3 right gain
    Gr3 = 0x0A,
    /// Tap 4 right gain
    Gr4 = 0x0B,
    /// Tap 5 right gain
    Gr5 = 0x0C,
    /// Tap 6 right gain
    Gr6 = 0x0D,
    /// Tap 7 right gain
    Gr7 = 0x0E,
    /// Tap 8 right gain
    Gr8 = 0x0F,
    /// Master level
    Vm = 0x10,
    /// Center (dry) level
    Vc = 0x11,
    /// Left wet level
    Vl = 0x12,
    /// Right wet level
    Vr = 0x13,
    /// Cross-feed coefficient for the `T0` tap
    C0 = 0x14,
    /// Cross-feed coefficient for the sample following `T0`
    C1 = 0x15,
    /// Cross-feed tap delay
    T0 = 0x16,
    /// Tap 1 delay
    T1 = 0x17,
    /// Tap 2 delay
    T2 = 0x18,
    /// Tap 3 delay
    T3 = 0x19,
    /// Tap 4 delay
    T4 = 0x1A,
    /// Tap 5 delay
    T5 = 0x1B,
    /// Tap 6 delay
    T6 = 0x1C,
    /// Tap 7 delay
    T7 = 0x1D,
    /// Tap 8 delay
    T8 = 0x1E,
}

/// Register kind, which selects the decoding rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterClass {
    /// Sign + 2 dB magnitude gain (`GL*`, `GR*`, `VM`, `VC`, `VL`, `VR`)
    Gain,
    /// 6-bit two's complement coefficient (`C0`, `C1`)
    Coefficient,
    /// 5-bit tap delay (`T0..T8`)
    Tap,
}

impl Register {
    /// All registers in address order
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::Gl1,
        Register::Gl2,
        Register::Gl3,
        Register::Gl4,
        Register::Gl5,
        Register::Gl6,
        Register::Gl7,
        Register::Gl8,
        Register::Gr1,
        Register::Gr2,
        Register::Gr3,
        Register::Gr4,
        Register::Gr5,
        Register::Gr6,
        Register::Gr7,
        Register::Gr8,
        Register::Vm,
        Register::Vc,
        Register::Vl,
        Register::Vr,
        Register::C0,
        Register::C1,
        Register::T0,
        Register::T1,
        Register::T2,
        Register::T3,
        Register::T4,
        Register::T5,
        Register::T6,
        Register::T7,
        Register::T8,
    ];

    /// Convert a raw register address (0-30) to a Register
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::from_u8(addr)
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }

    /// Datasheet mnemonic (`GL1`, `VM`, `T0`, ...)
    pub fn mnemonic(&self) -> &'static str {
        const MNEMONICS: [&str; REGISTER_COUNT] = [
            "GL1", "GL2", "GL3", "GL4", "GL5", "GL6", "GL7", "GL8", "GR1", "GR2", "GR3", "GR4",
            "GR5", "GR6", "GR7", "GR8", "VM", "VC", "VL", "VR", "C0", "C1", "T0", "T1", "T2",
            "T3", "T4", "T5", "T6", "T7", "T8",
        ];
        MNEMONICS[*self as usize]
    }

    /// Decoding rule of this register
    pub fn class(&self) -> RegisterClass {
        match self {
            Register::C0 | Register::C1 => RegisterClass::Coefficient,
            r if *r >= Register::T0 => RegisterClass::Tap,
            _ => RegisterClass::Gain,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            RegisterClass::Gain => write!(f, "{} (Gain, R{})", self.mnemonic(), self.addr()),
            RegisterClass::Coefficient => {
                write!(f, "{} (Cross-feed, R{})", self.mnemonic(), self.addr())
            }
            RegisterClass::Tap => write!(f, "{} (Tap delay, R{})", self.mnemonic(), self.addr()),
        }
    }
}

impl FromStr for Register {
    type Err = Ym7128bError;

    fn from_str(s: &str) -> Result<Self> {
        Register::ALL
            .iter()
            .copied()
            .find(|r| r.mnemonic().eq_ignore_ascii_case(s))
            .ok_or_else(|| Ym7128bError::ConfigError(format!("unknown register: {s}")))
    }
}

/// Raw register file (31 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterFile {
    /// Register values R0-R30
    pub registers: [u8; REGISTER_COUNT],
}

impl RegisterFile {
    /// Create a new register file with all values set to 0
    pub fn new() -> Self {
        RegisterFile {
            registers: [0; REGISTER_COUNT],
        }
    }

    /// Create a register file from a full register vector
    pub fn from_array(registers: [u8; REGISTER_COUNT]) -> Self {
        RegisterFile { registers }
    }

    /// Read a register value
    pub fn read(&self, addr: u8) -> Result<u8> {
        self.registers
            .get(addr as usize)
            .copied()
            .ok_or(Ym7128bError::InvalidRegisterAddress(addr))
    }

    /// Write a register value; out-of-range addresses leave the file untouched
    pub fn write(&mut self, addr: u8, value: u8) -> Result<()> {
        let slot = self
            .registers
            .get_mut(addr as usize)
            .ok_or(Ym7128bError::InvalidRegisterAddress(addr))?;
        *slot = value;
        Ok(())
    }

    /// Read a register by name
    #[inline]
    pub fn get(&self, reg: Register) -> u8 {
        self.registers[reg as usize]
    }

    /// Write a register by name
    #[inline]
    pub fn set(&mut self, reg: Register, value: u8) {
        self.registers[reg as usize] = value;
    }

    /// Clear every register to 0 (power-on state)
    pub fn clear(&mut self) {
        self.registers = [0; REGISTER_COUNT];
    }

    /// Get all registers as a slice
    pub fn as_slice(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
