//! YM7128B Surround Processor Emulator
//!
//! An emulator of the Yamaha YM7128B surround processor: a register
//! programmable digital delay with eight gain-weighted output taps, a
//! cross-feed pair and dry/wet mixing, driven by a mono input and producing
//! stereo output.
//!
//! # Engines
//! - `Fixed`: bit-exact fixed-point model of the chip, 2x oversampled output
//! - `Float`: the same pipeline in `f32`, 2x oversampled output
//! - `Ideal`: continuous-time model at any sample rate, fractional taps
//! - `Short`: 16-bit fixed-point model at any sample rate
//!
//! # Backend Trait
//! The [`Ym7128bBackend`] trait hides the engine type so a host can pick an
//! engine at runtime, typically through [`ChipConfig`].
//!
//! # Quick start
//! ## Concrete engine
//! ```
//! use ym7128b::ym7128b::{ChipFloat, Register};
//!
//! let mut chip = ChipFloat::new().unwrap();
//! chip.reset();
//! chip.write(Register::Vm.addr(), 0x3F).unwrap(); // Master 0 dB
//! chip.write(Register::Vl.addr(), 0x3F).unwrap(); // Left wet 0 dB
//! chip.write(Register::Gl1.addr(), 0x3F).unwrap(); // Tap 1 left 0 dB
//! chip.write(Register::T1.addr(), 0x10).unwrap(); // Tap 1 at ~52 ms
//! chip.start().unwrap();
//!
//! let frame = chip.process_normalized(0.5).unwrap();
//! assert_eq!(frame.left.len(), 2);
//! ```
//!
//! ## Engine selected at runtime
//! ```
//! use ym7128b::{ChipConfig, ChipMode, Ym7128bBackend};
//!
//! let mut config = ChipConfig::new(ChipMode::Ideal, 48_000);
//! config.set("VM", 0x3F).unwrap();
//! config.set("VC", 0x3F).unwrap();
//!
//! let mut chip = config.build().unwrap();
//! let mut output = vec![0.0; 4 * 2 * chip.oversampling()];
//! chip.process_interleaved(&[0.1, 0.2, 0.3, 0.4], &mut output).unwrap();
//! ```

#![warn(missing_docs)]

use std::collections::TryReserveError;

pub mod backend; // Backend trait abstraction
pub mod config; // Engine selection and register vectors
pub mod ym7128b; // YM7128B Emulation (core)

/// Error types for YM7128B emulator operations
#[derive(thiserror::Error, Debug)]
pub enum Ym7128bError {
    /// Register address outside `0..=30`
    #[error("Invalid register address: {0}")]
    InvalidRegisterAddress(u8),

    /// Operation called in a lifecycle state that does not allow it
    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    /// Delay line memory could not be reserved
    #[error("Allocation failure: {0}")]
    AllocationFailure(#[from] TryReserveError),

    /// Caller-provided output buffer too short for one frame
    #[error("Frame shape mismatch: expected {expected} samples, got {actual}")]
    FrameShape {
        /// Required number of samples
        expected: usize,
        /// Provided number of samples
        actual: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for Ym7128bError {
    /// Converts a JSON (de)serialization failure into `Ym7128bError::ConfigError`.
    fn from(err: serde_json::Error) -> Self {
        Ym7128bError::ConfigError(format!("JSON: {err}"))
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, Ym7128bError>;

// Public API exports
pub use backend::Ym7128bBackend;
pub use config::ChipConfig;
pub use ym7128b::{
    ChipFixed, ChipFloat, ChipIdeal, ChipMode, ChipShort, ChipState, Register, RegisterFile,
    StereoFrame,
};
