//! YM7128B surround processor emulation
//!
//! One generic pipeline serves all four engines:
//!
//! ```text
//! input ─► delay line ─► tap/gain network ─► oversampler ─► stereo frame
//!              ▲                 ▲
//!              └── registers ────┘ (decoded on every write)
//! ```
//!
//! The chip walks through `Constructed -> Reset -> Started -> Stopped`;
//! see [`ChipState`].

use std::fmt;

use super::arithmetic::{Arithmetic, FixedMath, FloatMath};
use super::constants::{INPUT_RATE, OVERSAMPLING};
use super::decoder::{decode, CoefficientsOf};
use super::mixer::Mixer;
use super::model::{ChipMode, FixedModel, FloatModel, IdealModel, Model, Sample, ShortModel};
use super::oversampler::{HalfBand, Oversampling, Passthrough};
use super::registers::{Register, RegisterFile, REGISTER_COUNT};
use crate::{Result, Ym7128bError};

/// Bit-exact fixed-point engine at the chip rate, 2x oversampled
pub type ChipFixed = Chip<FixedModel, HalfBand<FixedMath>, OVERSAMPLING>;

/// Floating-point engine at the chip rate, 2x oversampled
pub type ChipFloat = Chip<FloatModel, HalfBand<FloatMath>, OVERSAMPLING>;

/// Continuous-time engine at a configurable rate
pub type ChipIdeal = Chip<IdealModel, Passthrough, 1>;

/// 16-bit fixed-point engine at a configurable rate
pub type ChipShort = Chip<ShortModel, Passthrough, 1>;

/// Lifecycle state of a chip instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipState {
    /// Allocated; the rate may be configured via `setup`
    Constructed,
    /// Registers and history cleared, ready to start
    Reset,
    /// Processing samples
    Started,
    /// Processing halted; `start` resumes
    Stopped,
}

impl fmt::Display for ChipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChipState::Constructed => "constructed",
            ChipState::Reset => "reset",
            ChipState::Started => "started",
            ChipState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Stereo output of one processed input sample
///
/// Each channel carries `N` samples in time order (`N = 2` for the
/// oversampled engines).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoFrame<S, const N: usize> {
    /// Left channel samples
    pub left: [S; N],
    /// Right channel samples
    pub right: [S; N],
}

impl<S: Copy, const N: usize> StereoFrame<S, N> {
    /// Apply `f` to every sample of both channels
    pub fn map<T>(self, f: impl Fn(S) -> T) -> StereoFrame<T, N> {
        StereoFrame {
            left: self.left.map(&f),
            right: self.right.map(&f),
        }
    }

    /// Convert native samples to normalized `f32`
    pub fn to_normalized<A>(self) -> StereoFrame<f32, N>
    where
        A: Arithmetic<Sample = S>,
    {
        self.map(A::to_normalized)
    }
}

/// YM7128B chip instance
///
/// `M` selects the numeric model, `O` the output stage and `N` the number of
/// output samples per input sample. Use the [`ChipFixed`], [`ChipFloat`],
/// [`ChipIdeal`] and [`ChipShort`] aliases.
///
/// # Example
///
/// ```
/// use ym7128b::ym7128b::{ChipFixed, Register};
///
/// let mut chip = ChipFixed::new().unwrap();
/// chip.reset();
/// chip.write(Register::Vm.addr(), 0x3F).unwrap();
/// chip.write(Register::Vc.addr(), 0x3F).unwrap();
/// chip.start().unwrap();
///
/// let frame = chip.process(0.5).unwrap();
/// assert_eq!(frame.left.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Chip<M: Model, O, const N: usize> {
    registers: RegisterFile,
    mixer: Mixer<M>,
    oversampler_left: O,
    oversampler_right: O,
    sample_rate: u32,
    state: ChipState,
}

impl<M, O, const N: usize> Chip<M, O, N>
where
    M: Model,
    O: Oversampling<M::Arith, N>,
{
    /// Create a chip at the model's default rate
    ///
    /// The delay line is allocated here; an allocation failure is reported as
    /// [`Ym7128bError::AllocationFailure`].
    pub fn new() -> Result<Self> {
        let registers = RegisterFile::new();
        let sample_rate = M::DEFAULT_RATE;
        let mixer = Mixer::new(
            M::buffer_len(sample_rate),
            decode::<M>(&registers, sample_rate),
        )?;
        log::debug!(
            "{} chip constructed at {sample_rate} Hz, delay line {} samples",
            M::MODE,
            mixer.capacity()
        );

        Ok(Chip {
            registers,
            mixer,
            oversampler_left: O::default(),
            oversampler_right: O::default(),
            sample_rate,
            state: ChipState::Constructed,
        })
    }

    /// Create a chip and configure its processing rate
    pub fn with_sample_rate(sample_rate: u32) -> Result<Self> {
        let mut chip = Self::new()?;
        chip.setup(sample_rate)?;
        Ok(chip)
    }

    /// Engine of this chip
    pub fn mode(&self) -> ChipMode {
        M::MODE
    }

    /// Lifecycle state
    pub fn state(&self) -> ChipState {
        self.state
    }

    /// Processing (input) rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output rate in Hz
    pub fn output_rate(&self) -> u32 {
        self.sample_rate * N as u32
    }

    /// Register file
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Decoded operating coefficients
    pub fn coefficients(&self) -> &CoefficientsOf<M> {
        self.mixer.coefficients()
    }

    /// Select the processing rate
    ///
    /// Legal only before the first `reset`. Only the Ideal and Short engines
    /// accept rates other than the chip input rate; a new rate reallocates the
    /// delay line.
    pub fn setup(&mut self, sample_rate: u32) -> Result<()> {
        if self.state != ChipState::Constructed {
            return Err(Ym7128bError::PreconditionViolation(format!(
                "setup on a {} chip",
                self.state
            )));
        }
        if sample_rate == 0 {
            return Err(Ym7128bError::ConfigError(
                "sample rate must be non-zero".to_string(),
            ));
        }
        if !M::MODE.is_rate_configurable() {
            if sample_rate != INPUT_RATE {
                return Err(Ym7128bError::ConfigError(format!(
                    "{} chip runs at {INPUT_RATE} Hz, not {sample_rate} Hz",
                    M::MODE
                )));
            }
            return Ok(());
        }
        if sample_rate == self.sample_rate {
            return Ok(());
        }

        // Build the replacement first so a failed allocation leaves the chip intact
        let mixer = Mixer::new(
            M::buffer_len(sample_rate),
            decode::<M>(&self.registers, sample_rate),
        )?;
        self.mixer = mixer;
        self.sample_rate = sample_rate;
        log::debug!(
            "{} chip set up at {sample_rate} Hz, delay line {} samples",
            M::MODE,
            self.mixer.capacity()
        );
        Ok(())
    }

    /// Clear registers, delay line and oversampler history
    pub fn reset(&mut self) {
        self.registers.clear();
        self.mixer.reset();
        self.oversampler_left.reset();
        self.oversampler_right.reset();
        self.redecode();
        self.state = ChipState::Reset;
        log::debug!("{} chip reset", M::MODE);
    }

    /// Begin processing
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            ChipState::Constructed => Err(Ym7128bError::PreconditionViolation(
                "start before reset".to_string(),
            )),
            ChipState::Started => Ok(()),
            ChipState::Reset | ChipState::Stopped => {
                self.state = ChipState::Started;
                log::debug!("{} chip started", M::MODE);
                Ok(())
            }
        }
    }

    /// Halt processing; no effect unless started
    pub fn stop(&mut self) {
        if self.state == ChipState::Started {
            self.state = ChipState::Stopped;
            log::debug!("{} chip stopped", M::MODE);
        }
    }

    /// Write a register and decode it immediately
    pub fn write(&mut self, addr: u8, value: u8) -> Result<()> {
        self.require_reset("write")?;
        self.registers.write(addr, value)?;
        if let Some(reg) = Register::from_addr(addr) {
            log::trace!("{}: wrote {value:02X} to {}", M::MODE, reg.mnemonic());
        }
        self.redecode();
        Ok(())
    }

    /// Read a register
    pub fn read(&self, addr: u8) -> Result<u8> {
        self.registers.read(addr)
    }

    /// Replace the whole register file, decoding once
    pub fn load_registers(&mut self, registers: &[u8; REGISTER_COUNT]) -> Result<()> {
        self.require_reset("load registers")?;
        self.registers = RegisterFile::from_array(*registers);
        log::trace!("{}: loaded registers {registers:02X?}", M::MODE);
        self.redecode();
        Ok(())
    }

    /// Process one normalized mono sample into native output samples
    ///
    /// Fixed and Short engines clamp the input to `[-1, 1]`.
    #[inline]
    pub fn process(&mut self, input: f32) -> Result<StereoFrame<Sample<M>, N>> {
        if self.state != ChipState::Started {
            return Err(Ym7128bError::PreconditionViolation(format!(
                "process on a {} chip",
                self.state
            )));
        }

        let (left, right) = self.mixer.process(M::Arith::from_normalized(input));
        Ok(StereoFrame {
            left: self.oversampler_left.process(left),
            right: self.oversampler_right.process(right),
        })
    }

    /// Process one normalized mono sample into normalized output samples
    #[inline]
    pub fn process_normalized(&mut self, input: f32) -> Result<StereoFrame<f32, N>> {
        Ok(self.process(input)?.to_normalized::<M::Arith>())
    }

    fn require_reset(&self, operation: &str) -> Result<()> {
        if self.state == ChipState::Constructed {
            return Err(Ym7128bError::PreconditionViolation(format!(
                "{operation} before reset"
            )));
        }
        Ok(())
    }

    fn redecode(&mut self) {
        self.mixer
            .set_coefficients(decode::<M>(&self.registers, self.sample_rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ym7128b::constants::{BUFFER_LENGTH, OUTPUT_RATE};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_chip_is_constructed() {
        let chip = ChipFixed::new().unwrap();
        assert_eq!(chip.state(), ChipState::Constructed);
        assert_eq!(chip.mode(), ChipMode::Fixed);
        assert_eq!(chip.sample_rate(), INPUT_RATE);
        assert_eq!(chip.output_rate(), OUTPUT_RATE);
        assert_eq!(chip.mixer.capacity(), BUFFER_LENGTH);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut chip = ChipFloat::new().unwrap();
        assert!(matches!(
            chip.start(),
            Err(Ym7128bError::PreconditionViolation(_))
        ));
        assert!(chip.process(0.0).is_err());

        chip.reset();
        assert_eq!(chip.state(), ChipState::Reset);
        assert!(chip.process(0.0).is_err());

        chip.start().unwrap();
        chip.start().unwrap();
        assert_eq!(chip.state(), ChipState::Started);
        assert!(chip.process(0.0).is_ok());

        chip.stop();
        assert_eq!(chip.state(), ChipState::Stopped);
        assert!(chip.process(0.0).is_err());
        chip.stop();
        assert_eq!(chip.state(), ChipState::Stopped);

        chip.start().unwrap();
        assert!(chip.process(0.0).is_ok());
    }

    #[test]
    fn test_write_requires_reset() {
        let mut chip = ChipShort::new().unwrap();
        assert!(matches!(
            chip.write(0, 0x3F),
            Err(Ym7128bError::PreconditionViolation(_))
        ));
        assert!(chip.load_registers(&[0; REGISTER_COUNT]).is_err());

        chip.reset();
        chip.write(Register::Vm.addr(), 0x3F).unwrap();
        assert_eq!(chip.read(Register::Vm.addr()).ok(), Some(0x3F));
    }

    #[test]
    fn test_write_redecodes() {
        let mut chip = ChipFixed::new().unwrap();
        chip.reset();
        assert_eq!(chip.coefficients().master, 0);

        chip.write(Register::Vm.addr(), 0x3F).unwrap();
        assert_eq!(chip.coefficients().master, 0x7FF0);

        chip.write(Register::T4.addr(), 31).unwrap();
        assert_eq!(chip.coefficients().taps[4], 2355);
    }

    #[test]
    fn test_invalid_write_leaves_state() {
        let mut chip = ChipIdeal::new().unwrap();
        chip.reset();
        chip.write(Register::Gl1.addr(), 0x2A).unwrap();
        let registers = *chip.registers();
        let coefficients = *chip.coefficients();

        let err = chip.write(REGISTER_COUNT as u8, 0xFF).unwrap_err();
        assert!(matches!(err, Ym7128bError::InvalidRegisterAddress(31)));
        assert_eq!(*chip.registers(), registers);
        assert_eq!(*chip.coefficients(), coefficients);
        assert!(chip.read(0xFF).is_err());
    }

    #[test]
    fn test_setup_rules() {
        let mut fixed = ChipFixed::new().unwrap();
        fixed.setup(INPUT_RATE).unwrap();
        assert!(matches!(
            fixed.setup(44_100),
            Err(Ym7128bError::ConfigError(_))
        ));

        let mut ideal = ChipIdeal::new().unwrap();
        assert!(matches!(ideal.setup(0), Err(Ym7128bError::ConfigError(_))));
        ideal.setup(48_000).unwrap();
        assert_eq!(ideal.sample_rate(), 48_000);
        assert_eq!(ideal.output_rate(), 48_000);

        ideal.reset();
        assert!(matches!(
            ideal.setup(44_100),
            Err(Ym7128bError::PreconditionViolation(_))
        ));
        ideal.start().unwrap();
        assert!(ideal.setup(44_100).is_err());
        assert_eq!(ideal.sample_rate(), 48_000);
    }

    #[test]
    fn test_setup_rejected_after_stop() {
        let mut ideal = ChipIdeal::new().unwrap();
        ideal.reset();
        ideal.start().unwrap();
        ideal.stop();
        assert!(matches!(
            ideal.setup(44_100),
            Err(Ym7128bError::PreconditionViolation(_))
        ));
        assert_eq!(ideal.sample_rate(), INPUT_RATE);
        ideal.start().unwrap();
        assert_eq!(ideal.sample_rate(), INPUT_RATE);

        let mut short = ChipShort::with_sample_rate(44_100).unwrap();
        short.reset();
        short.start().unwrap();
        short.stop();
        assert!(matches!(
            short.setup(48_000),
            Err(Ym7128bError::PreconditionViolation(_))
        ));
        assert_eq!(short.sample_rate(), 44_100);
        assert_eq!(short.mixer.capacity(), 4412);
    }

    #[test]
    fn test_setup_rescales_taps() {
        let mut short = ChipShort::with_sample_rate(44_100).unwrap();
        short.reset();
        short.write(Register::T8.addr(), 31).unwrap();
        assert_eq!(short.coefficients().taps[8], 4410);
        assert_eq!(short.mixer.capacity(), 4412);
    }

    #[test]
    fn test_reset_clears_registers() {
        let mut chip = ChipFloat::new().unwrap();
        chip.reset();
        chip.load_registers(&[0x3F; REGISTER_COUNT]).unwrap();
        assert_eq!(chip.registers().as_slice(), &[0x3F; REGISTER_COUNT]);

        chip.reset();
        assert_eq!(chip.registers().as_slice(), &[0; REGISTER_COUNT]);
        assert_eq!(chip.coefficients().master, 0.0);
    }

    #[test]
    fn test_normalized_frame() {
        let mut chip = ChipIdeal::new().unwrap();
        chip.reset();
        chip.write(Register::Vm.addr(), 0x3F).unwrap();
        chip.write(Register::Vc.addr(), 0x1F).unwrap();
        chip.start().unwrap();

        let frame = chip.process_normalized(0.25).unwrap();
        assert_abs_diff_eq!(frame.left[0], -0.25);
        assert_abs_diff_eq!(frame.right[0], -0.25);
    }

    #[test]
    fn test_frame_map() {
        let frame = StereoFrame {
            left: [1i16, 2],
            right: [3, 4],
        };
        let doubled = frame.map(|s| s * 2);
        assert_eq!(doubled.left, [2, 4]);
        assert_eq!(doubled.right, [6, 8]);
    }
}
