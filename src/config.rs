//! Engine configuration
//!
//! [`ChipConfig`] selects an engine, its processing rate and the register
//! vector to program, and builds a ready-to-run [`Ym7128bBackend`]. It is
//! serde-serializable so hosts can keep register vectors as JSON:
//!
//! ```json
//! { "mode": "ideal", "sample_rate": 48000, "registers": [0, 0, ...] }
//! ```

use serde::{Deserialize, Serialize};

use crate::backend::Ym7128bBackend;
use crate::ym7128b::constants::{INPUT_RATE, OUTPUT_RATE, OVERSAMPLING};
use crate::ym7128b::{
    Chip, ChipMode, FixedMath, FixedModel, FloatMath, FloatModel, HalfBand, IdealModel, Model,
    Oversampling, Passthrough, Register, RegisterFile, ShortModel,
};
use crate::{Result, Ym7128bError};

/// Engine selection plus register vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Engine
    pub mode: ChipMode,
    /// Processing rate; must be the chip input rate for Fixed and Float
    pub sample_rate: u32,
    /// Register values written after reset
    pub registers: RegisterFile,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            mode: ChipMode::default(),
            sample_rate: INPUT_RATE,
            registers: RegisterFile::default(),
        }
    }
}

impl ChipConfig {
    /// Configuration for `mode` at `sample_rate` with all registers cleared
    pub fn new(mode: ChipMode, sample_rate: u32) -> Self {
        Self {
            mode,
            sample_rate,
            registers: RegisterFile::default(),
        }
    }

    /// Configuration for `mode` at its native rate
    ///
    /// Fixed and Float run at the chip input rate; Ideal and Short default to
    /// the chip output rate.
    pub fn for_mode(mode: ChipMode) -> Self {
        let sample_rate = if mode.is_rate_configurable() {
            OUTPUT_RATE
        } else {
            INPUT_RATE
        };
        Self::new(mode, sample_rate)
    }

    /// Assign a register by mnemonic (`"VM"`, `"t3"`, ...)
    pub fn set(&mut self, mnemonic: &str, value: u8) -> Result<&mut Self> {
        let reg: Register = mnemonic.parse()?;
        self.registers.set(reg, value);
        Ok(self)
    }

    /// Read a register by mnemonic
    pub fn get(&self, mnemonic: &str) -> Result<u8> {
        let reg: Register = mnemonic.parse()?;
        Ok(self.registers.get(reg))
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ChipConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the rate against the selected engine
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Ym7128bError::ConfigError(
                "sample rate must be non-zero".to_string(),
            ));
        }
        if !self.mode.is_rate_configurable() && self.sample_rate != INPUT_RATE {
            return Err(Ym7128bError::ConfigError(format!(
                "{} engine runs at {INPUT_RATE} Hz, not {} Hz",
                self.mode, self.sample_rate
            )));
        }
        Ok(())
    }

    /// Construct, set up, reset, program and start the selected engine
    pub fn build(&self) -> Result<Box<dyn Ym7128bBackend>> {
        self.validate()?;
        log::debug!("building {} engine at {} Hz", self.mode, self.sample_rate);
        match self.mode {
            ChipMode::Fixed => {
                self.start_engine::<FixedModel, HalfBand<FixedMath>, OVERSAMPLING>()
            }
            ChipMode::Float => {
                self.start_engine::<FloatModel, HalfBand<FloatMath>, OVERSAMPLING>()
            }
            ChipMode::Ideal => self.start_engine::<IdealModel, Passthrough, 1>(),
            ChipMode::Short => self.start_engine::<ShortModel, Passthrough, 1>(),
        }
    }

    fn start_engine<M, O, const N: usize>(&self) -> Result<Box<dyn Ym7128bBackend>>
    where
        M: Model,
        O: Oversampling<M::Arith, N> + 'static,
    {
        let mut chip = Chip::<M, O, N>::with_sample_rate(self.sample_rate)?;
        chip.reset();
        chip.load_registers(&self.registers.registers)?;
        chip.start()?;
        Ok(Box::new(chip))
    }
}
