//! Register decoding
//!
//! Turns the raw register file into the operating [`Coefficients`] of an
//! engine. Two disciplines exist:
//!
//! - [`quantized`]: constant lookup tables reproducing the chip's internal
//!   quantization steps (Fixed and Short engines)
//! - [`continuous`]: closed-form formulas with the same nominal step sizes
//!   (Float and Ideal engines)
//!
//! Which discipline an engine uses is chosen by its [`Model`] implementation.

use super::constants::{
    COEFF_VALUE_BITS, COEFF_VALUE_MASK, GAIN_DATA_MASK, GAIN_LANE_COUNT, GAIN_MAGNITUDE_MASK,
    GAIN_SIGN_BIT, GAIN_STEP_DB, TAP_COUNT, TAP_VALUE_MASK, TAP_VALUE_MAX,
};
use super::model::{Model, Sample};
use super::registers::{Register, RegisterFile};

/// Operating parameters derived from the register file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients<S, T> {
    /// `GL1..GL8`: left gain of taps `T1..T8`
    pub gains_left: [S; GAIN_LANE_COUNT],
    /// `GR1..GR8`: right gain of taps `T1..T8`
    pub gains_right: [S; GAIN_LANE_COUNT],
    /// `VM`: master level
    pub master: S,
    /// `VC`: dry level
    pub center: S,
    /// `VL`: left wet level
    pub left: S,
    /// `VR`: right wet level
    pub right: S,
    /// `C0`: cross-feed weight of the `T0` tap
    pub c0: S,
    /// `C1`: cross-feed weight of the sample following `T0`
    pub c1: S,
    /// `T0..T8`: resolved tap positions
    pub taps: [T; TAP_COUNT],
    /// Position of the sample one chip clock after `T0`
    pub cross_feed_next: T,
}

/// Coefficient set of the engine `M`
pub type CoefficientsOf<M> = Coefficients<Sample<M>, <M as Model>::Tap>;

/// Decode a full register file for the engine `M` running at `sample_rate`.
///
/// Pure function of its inputs: equal registers always decode equally.
pub fn decode<M: Model>(regs: &RegisterFile, sample_rate: u32) -> CoefficientsOf<M> {
    let lane = |base: Register, index: usize| M::gain(regs.registers[base as usize + index]);
    let taps: [M::Tap; TAP_COUNT] = std::array::from_fn(|index| {
        M::tap(regs.registers[Register::T0 as usize + index], sample_rate)
    });

    Coefficients {
        gains_left: std::array::from_fn(|index| lane(Register::Gl1, index)),
        gains_right: std::array::from_fn(|index| lane(Register::Gr1, index)),
        master: M::gain(regs.get(Register::Vm)),
        center: M::gain(regs.get(Register::Vc)),
        left: M::gain(regs.get(Register::Vl)),
        right: M::gain(regs.get(Register::Vr)),
        c0: M::coefficient(regs.get(Register::C0)),
        c1: M::coefficient(regs.get(Register::C1)),
        cross_feed_next: M::cross_feed_next(taps[0], sample_rate),
        taps,
    }
}

/// Quantized decoding through constant tables
pub mod quantized {
    use super::super::constants::{GAIN_TABLE, TAP_TABLE};
    use super::*;

    /// Q1.15 gain of a gain code
    #[inline]
    pub fn gain(code: u8) -> i16 {
        GAIN_TABLE[(code & GAIN_DATA_MASK) as usize]
    }

    /// Q1.15 cross-feed coefficient: the 6-bit code occupies the top bits
    #[inline]
    pub fn coefficient(code: u8) -> i16 {
        let shift = 16 - COEFF_VALUE_BITS;
        (((code & COEFF_VALUE_MASK) as u16) << shift) as i16
    }

    /// Tap delay in samples at the chip input rate
    #[inline]
    pub fn tap(code: u8) -> usize {
        TAP_TABLE[(code & TAP_VALUE_MASK) as usize] as usize
    }

    /// Tap delay in samples at an arbitrary rate, rounded to the nearest sample
    #[inline]
    pub fn tap_at_rate(code: u8, sample_rate: u32) -> usize {
        let steps = TAP_VALUE_MAX as u64;
        let max_delay = (sample_rate / 10) as u64;
        let code = (code & TAP_VALUE_MASK) as u64;
        ((code * max_delay + steps / 2) / steps) as usize
    }
}

/// Continuous decoding through closed-form formulas
pub mod continuous {
    use super::*;

    /// Gain of a gain code: sign bit set is positive, magnitude in 2 dB steps
    #[inline]
    pub fn gain(code: u8) -> f32 {
        let magnitude = code & GAIN_MAGNITUDE_MASK;
        if magnitude == 0 {
            return 0.0;
        }
        let attenuation_db = (magnitude as f32 - GAIN_MAGNITUDE_MASK as f32) * GAIN_STEP_DB;
        let level = 10.0_f32.powf(attenuation_db / 20.0);
        if code & GAIN_SIGN_BIT != 0 {
            level
        } else {
            -level
        }
    }

    /// Cross-feed coefficient: 6-bit two's complement over 32
    #[inline]
    pub fn coefficient(code: u8) -> f32 {
        let shift = 8 - COEFF_VALUE_BITS;
        let signed = ((code << shift) as i8) >> shift;
        signed as f32 / (1 << (COEFF_VALUE_BITS - 1)) as f32
    }

    /// Tap delay in seconds (0 to 100 ms)
    #[inline]
    pub fn tap_seconds(code: u8) -> f32 {
        (code & TAP_VALUE_MASK) as f32 * 0.1 / TAP_VALUE_MAX as f32
    }

    /// Tap position in (fractional) samples at `sample_rate`
    #[inline]
    pub fn tap_at_rate(code: u8, sample_rate: u32) -> f32 {
        tap_seconds(code) * sample_rate as f32
    }
}
