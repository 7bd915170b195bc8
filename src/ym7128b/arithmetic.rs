//! Numeric representations of the processing pipeline
//!
//! Every engine runs the same tap/gain network; what differs is how a sample
//! is stored and how products and sums are rounded. [`Arithmetic`] captures
//! exactly that, so the rounding rules of each engine stay in one place:
//!
//! - [`FixedMath`]: Q1.15 words, 14-bit signals, rounded and saturated (the silicon)
//! - [`ShortMath`]: Q1.15 words, full 16-bit signals, truncated and saturated
//! - [`FloatMath`]: `f32`, no quantization and no saturation

use std::fmt::Debug;

use num_traits::Zero;

use super::constants::{FIXED_DECIMALS, FIXED_MAX, FIXED_ROUNDING, SIGNAL_MASK};

/// Sample storage and arithmetic of one engine
pub trait Arithmetic: 'static {
    /// Native sample (and gain) word
    type Sample: Copy + Zero + PartialEq + Debug + Send + Sync;

    /// Convert a normalized input sample to the native word
    fn from_normalized(value: f32) -> Self::Sample;

    /// Convert a native word to a normalized sample
    fn to_normalized(sample: Self::Sample) -> f32;

    /// Multiply a signal by a gain or coefficient
    fn mul(sample: Self::Sample, gain: Self::Sample) -> Self::Sample;

    /// Add two signals
    fn add(a: Self::Sample, b: Self::Sample) -> Self::Sample;
}

/// Clamp a normalized sample to full scale, mapping NaN to silence
#[inline]
fn clamp_normalized(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        num_traits::clamp(value, -1.0, 1.0)
    }
}

#[inline]
fn saturate(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Bit-exact chip arithmetic
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMath;

impl Arithmetic for FixedMath {
    type Sample = i16;

    #[inline]
    fn from_normalized(value: f32) -> i16 {
        let scaled = clamp_normalized(value) * FIXED_MAX as f32;
        (scaled as i16) & SIGNAL_MASK
    }

    #[inline]
    fn to_normalized(sample: i16) -> f32 {
        sample as f32 / FIXED_MAX as f32
    }

    #[inline]
    fn mul(sample: i16, gain: i16) -> i16 {
        let product = (sample as i32 * gain as i32 + FIXED_ROUNDING) >> FIXED_DECIMALS;
        saturate(product) & SIGNAL_MASK
    }

    #[inline]
    fn add(a: i16, b: i16) -> i16 {
        a.saturating_add(b) & SIGNAL_MASK
    }
}

/// Reduced fixed-point arithmetic: plain Q1.15 with truncating products
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortMath;

impl Arithmetic for ShortMath {
    type Sample = i16;

    #[inline]
    fn from_normalized(value: f32) -> i16 {
        (clamp_normalized(value) * FIXED_MAX as f32) as i16
    }

    #[inline]
    fn to_normalized(sample: i16) -> f32 {
        sample as f32 / FIXED_MAX as f32
    }

    #[inline]
    fn mul(sample: i16, gain: i16) -> i16 {
        saturate((sample as i32 * gain as i32) >> FIXED_DECIMALS)
    }

    #[inline]
    fn add(a: i16, b: i16) -> i16 {
        a.saturating_add(b)
    }
}

/// Floating-point arithmetic; values are only clamped by the output codec
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatMath;

impl Arithmetic for FloatMath {
    type Sample = f32;

    #[inline]
    fn from_normalized(value: f32) -> f32 {
        value
    }

    #[inline]
    fn to_normalized(sample: f32) -> f32 {
        sample
    }

    #[inline]
    fn mul(sample: f32, gain: f32) -> f32 {
        sample * gain
    }

    #[inline]
    fn add(a: f32, b: f32) -> f32 {
        a + b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fixed_input_conversion_clamps_and_quantizes() {
        assert_eq!(FixedMath::from_normalized(0.0), 0);
        assert_eq!(FixedMath::from_normalized(1.0), 32764);
        assert_eq!(FixedMath::from_normalized(2.5), 32764);
        assert_eq!(FixedMath::from_normalized(-1.0), -32768);
        assert_eq!(FixedMath::from_normalized(-7.0), -32768);
        assert_eq!(FixedMath::from_normalized(f32::NAN), 0);
        assert_eq!(FixedMath::from_normalized(0.5) & 3, 0);
    }

    #[test]
    fn test_fixed_mul_rounds_and_saturates() {
        // 0.5 * 0.5
        assert_eq!(FixedMath::mul(0x4000, 0x4000), 0x2000);
        // -1.0 * -1.0 overflows Q1.15 and saturates
        assert_eq!(FixedMath::mul(i16::MIN, i16::MIN), 32764);
        // Gain of zero
        assert_eq!(FixedMath::mul(12345, 0), 0);
    }

    #[test]
    fn test_fixed_add_saturates_without_wrapping() {
        assert_eq!(FixedMath::add(30000, 30000), 32764);
        assert_eq!(FixedMath::add(-30000, -30000), -32768);
        assert_eq!(FixedMath::add(100, -100), 0);
    }

    #[test]
    fn test_short_keeps_low_bits() {
        assert_eq!(ShortMath::from_normalized(1.0), 32767);
        assert_eq!(ShortMath::mul(3, 0x7FFF), 2);
        assert_eq!(ShortMath::add(i16::MAX, 1), i16::MAX);
        assert_eq!(ShortMath::add(i16::MIN, -1), i16::MIN);
    }

    #[test]
    fn test_float_is_plain() {
        assert_abs_diff_eq!(FloatMath::mul(0.5, -0.25), -0.125);
        assert_abs_diff_eq!(FloatMath::add(0.75, 0.75), 1.5);
        assert_abs_diff_eq!(FloatMath::from_normalized(1.5), 1.5);
    }

    #[test]
    fn test_normalization_scale() {
        assert_abs_diff_eq!(FixedMath::to_normalized(32767), 1.0);
        assert_abs_diff_eq!(ShortMath::to_normalized(-16384), -0.500_015_3, epsilon = 1e-6);
    }
}
