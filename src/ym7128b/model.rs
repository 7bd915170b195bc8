//! Engine models
//!
//! A [`Model`] binds an [`Arithmetic`] to a decoding discipline and a tap
//! representation. The four engines of the emulator are:
//!
//! | Model          | Arithmetic    | Decoding   | Taps               | Rate        |
//! |----------------|---------------|------------|--------------------|-------------|
//! | [`FixedModel`] | [`FixedMath`] | quantized  | integer, chip rate | 23 550 Hz   |
//! | [`FloatModel`] | [`FloatMath`] | continuous | integer, chip rate | 23 550 Hz   |
//! | [`ShortModel`] | [`ShortMath`] | quantized  | integer, any rate  | configurable|
//! | [`IdealModel`] | [`FloatMath`] | continuous | fractional         | configurable|

use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::arithmetic::{Arithmetic, FixedMath, FloatMath, ShortMath};
use super::constants::{BUFFER_LENGTH, INPUT_RATE, MAX_TAP_DELAY, OVERSAMPLING};
use super::decoder::{continuous, quantized};
use super::delay_line::DelayLine;
use crate::Ym7128bError;

/// Native sample type of the model `M`
pub type Sample<M> = <<M as Model>::Arith as Arithmetic>::Sample;

/// Engine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipMode {
    /// Bit-exact fixed-point chip model
    #[default]
    Fixed,
    /// Floating-point chip model
    Float,
    /// Continuous-time model at an arbitrary rate
    Ideal,
    /// 16-bit fixed-point model at an arbitrary rate
    Short,
}

impl ChipMode {
    /// All modes
    pub const ALL: [ChipMode; 4] = [
        ChipMode::Fixed,
        ChipMode::Float,
        ChipMode::Ideal,
        ChipMode::Short,
    ];

    /// Lowercase mode name
    pub fn name(&self) -> &'static str {
        match self {
            ChipMode::Fixed => "fixed",
            ChipMode::Float => "float",
            ChipMode::Ideal => "ideal",
            ChipMode::Short => "short",
        }
    }

    /// Output samples emitted per input sample
    pub fn oversampling(&self) -> usize {
        match self {
            ChipMode::Fixed | ChipMode::Float => OVERSAMPLING,
            ChipMode::Ideal | ChipMode::Short => 1,
        }
    }

    /// Whether `setup` accepts rates other than the chip input rate
    pub fn is_rate_configurable(&self) -> bool {
        matches!(self, ChipMode::Ideal | ChipMode::Short)
    }
}

impl fmt::Display for ChipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChipMode {
    type Err = Ym7128bError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChipMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Ym7128bError::ConfigError(format!("unknown chip mode: {s}")))
    }
}

/// Numeric model of one engine
pub trait Model: Sized + Send + Sync + 'static {
    /// Sample arithmetic
    type Arith: Arithmetic;

    /// Resolved tap position
    type Tap: Copy + Default + PartialEq + Debug + Send + Sync;

    /// Mode tag
    const MODE: ChipMode;

    /// Processing rate right after construction
    const DEFAULT_RATE: u32 = INPUT_RATE;

    /// Decode a gain code
    fn gain(code: u8) -> Sample<Self>;

    /// Decode a cross-feed coefficient code
    fn coefficient(code: u8) -> Sample<Self>;

    /// Resolve a tap code at `sample_rate`
    fn tap(code: u8, sample_rate: u32) -> Self::Tap;

    /// Position one chip sample after `tap`
    fn cross_feed_next(tap: Self::Tap, sample_rate: u32) -> Self::Tap;

    /// Delay line capacity needed at `sample_rate`
    fn buffer_len(sample_rate: u32) -> usize;

    /// Read the delay line at a resolved tap
    fn read_tap(line: &DelayLine<Sample<Self>>, tap: Self::Tap) -> Sample<Self>;
}

/// Fixed-point chip model, bit-exact to the quantized tables
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedModel;

impl Model for FixedModel {
    type Arith = FixedMath;
    type Tap = usize;

    const MODE: ChipMode = ChipMode::Fixed;

    fn gain(code: u8) -> i16 {
        quantized::gain(code)
    }

    fn coefficient(code: u8) -> i16 {
        quantized::coefficient(code)
    }

    fn tap(code: u8, _sample_rate: u32) -> usize {
        quantized::tap(code)
    }

    fn cross_feed_next(tap: usize, _sample_rate: u32) -> usize {
        tap + 1
    }

    fn buffer_len(_sample_rate: u32) -> usize {
        BUFFER_LENGTH
    }

    #[inline]
    fn read_tap(line: &DelayLine<i16>, tap: usize) -> i16 {
        line.read(tap)
    }
}

/// Floating-point chip model: chip topology and rate, unquantized gains
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatModel;

impl Model for FloatModel {
    type Arith = FloatMath;
    type Tap = usize;

    const MODE: ChipMode = ChipMode::Float;

    fn gain(code: u8) -> f32 {
        continuous::gain(code)
    }

    fn coefficient(code: u8) -> f32 {
        continuous::coefficient(code)
    }

    fn tap(code: u8, _sample_rate: u32) -> usize {
        let position = continuous::tap_at_rate(code, INPUT_RATE).round() as usize;
        position.min(MAX_TAP_DELAY)
    }

    fn cross_feed_next(tap: usize, _sample_rate: u32) -> usize {
        tap + 1
    }

    fn buffer_len(_sample_rate: u32) -> usize {
        BUFFER_LENGTH
    }

    #[inline]
    fn read_tap(line: &DelayLine<f32>, tap: usize) -> f32 {
        line.read(tap)
    }
}

/// Q1.15 model running at a configurable rate
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortModel;

impl Model for ShortModel {
    type Arith = ShortMath;
    type Tap = usize;

    const MODE: ChipMode = ChipMode::Short;

    fn gain(code: u8) -> i16 {
        quantized::gain(code)
    }

    fn coefficient(code: u8) -> i16 {
        quantized::coefficient(code)
    }

    fn tap(code: u8, sample_rate: u32) -> usize {
        quantized::tap_at_rate(code, sample_rate)
    }

    fn cross_feed_next(tap: usize, _sample_rate: u32) -> usize {
        tap + 1
    }

    fn buffer_len(sample_rate: u32) -> usize {
        (sample_rate / 10) as usize + 2
    }

    #[inline]
    fn read_tap(line: &DelayLine<i16>, tap: usize) -> i16 {
        line.read(tap)
    }
}

/// Continuous-time model: fractional taps at a configurable rate
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealModel;

impl IdealModel {
    /// Samples per chip input period at `sample_rate`
    fn chip_period(sample_rate: u32) -> f64 {
        sample_rate as f64 / INPUT_RATE as f64
    }
}

impl Model for IdealModel {
    type Arith = FloatMath;
    type Tap = f32;

    const MODE: ChipMode = ChipMode::Ideal;

    fn gain(code: u8) -> f32 {
        continuous::gain(code)
    }

    fn coefficient(code: u8) -> f32 {
        continuous::coefficient(code)
    }

    fn tap(code: u8, sample_rate: u32) -> f32 {
        continuous::tap_at_rate(code, sample_rate)
    }

    fn cross_feed_next(tap: f32, sample_rate: u32) -> f32 {
        tap + Self::chip_period(sample_rate) as f32
    }

    fn buffer_len(sample_rate: u32) -> usize {
        let span = sample_rate as f64 * 0.1 + Self::chip_period(sample_rate);
        span.ceil() as usize + 2
    }

    #[inline]
    fn read_tap(line: &DelayLine<f32>, tap: f32) -> f32 {
        line.read_interpolated(tap)
    }
}
