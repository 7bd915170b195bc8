//! Output reconstruction
//!
//! The chip DAC runs at twice the processing rate. [`HalfBand`] rebuilds the
//! doubled stream with a 19-tap half-band FIR evaluated polyphase: every other
//! coefficient of the zero-stuffed filter is zero except the center one, so
//! each input frame yields one interpolated sample (10-tap convolution) and
//! one plain delayed sample.
//!
//! Engines that run at the host rate use [`Passthrough`].

use num_traits::Zero;

use super::arithmetic::{Arithmetic, FixedMath, FloatMath};
use super::constants::{
    FIXED_DECIMALS, FIXED_ROUNDING, OVERSAMPLER_KERNEL_FIXED, OVERSAMPLER_KERNEL_FLOAT,
    OVERSAMPLER_LATENCY, OVERSAMPLER_PHASE_LENGTH, SIGNAL_MASK,
};

/// Rate conversion from the processing rate to the output rate
pub trait Oversampling<A: Arithmetic, const N: usize>: Default + Clone + Send {
    /// Clear the filter history
    fn reset(&mut self);

    /// Feed one processed sample, returning `N` output samples in time order
    fn process(&mut self, input: A::Sample) -> [A::Sample; N];
}

/// Arithmetic that can evaluate the interpolating half-band phase
pub trait HalfBandArithmetic: Arithmetic {
    /// Convolve the interpolating phase with `history`, where `history[j]` is
    /// the input `j` frames ago
    fn interpolate(history: &[Self::Sample; OVERSAMPLER_PHASE_LENGTH]) -> Self::Sample;
}

impl HalfBandArithmetic for FixedMath {
    #[inline]
    fn interpolate(history: &[i16; OVERSAMPLER_PHASE_LENGTH]) -> i16 {
        let accumulator: i32 = history
            .iter()
            .zip(OVERSAMPLER_KERNEL_FIXED.iter())
            .map(|(&sample, &kernel)| sample as i32 * kernel as i32)
            .sum();
        let scaled = (accumulator + FIXED_ROUNDING) >> FIXED_DECIMALS;
        (scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16) & SIGNAL_MASK
    }
}

impl HalfBandArithmetic for FloatMath {
    #[inline]
    fn interpolate(history: &[f32; OVERSAMPLER_PHASE_LENGTH]) -> f32 {
        history
            .iter()
            .zip(OVERSAMPLER_KERNEL_FLOAT.iter())
            .map(|(&sample, &kernel)| sample * kernel)
            .sum()
    }
}

/// 2x polyphase half-band interpolator
pub struct HalfBand<A: Arithmetic> {
    /// Most recent inputs, newest first
    history: [A::Sample; OVERSAMPLER_PHASE_LENGTH],
}

impl<A: Arithmetic> HalfBand<A> {
    /// Create an interpolator with silent history
    pub fn new() -> Self {
        Self {
            history: [A::Sample::zero(); OVERSAMPLER_PHASE_LENGTH],
        }
    }
}

impl<A: Arithmetic> Default for HalfBand<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Arithmetic> Clone for HalfBand<A> {
    fn clone(&self) -> Self {
        Self {
            history: self.history,
        }
    }
}

impl<A: Arithmetic> std::fmt::Debug for HalfBand<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalfBand")
            .field("history", &self.history)
            .finish()
    }
}

impl<A: HalfBandArithmetic> Oversampling<A, 2> for HalfBand<A> {
    fn reset(&mut self) {
        self.history = [A::Sample::zero(); OVERSAMPLER_PHASE_LENGTH];
    }

    #[inline]
    fn process(&mut self, input: A::Sample) -> [A::Sample; 2] {
        self.history.rotate_right(1);
        self.history[0] = input;
        [
            A::interpolate(&self.history),
            self.history[OVERSAMPLER_LATENCY],
        ]
    }
}

/// Identity stage for engines without oversampling
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<A: Arithmetic> Oversampling<A, 1> for Passthrough {
    fn reset(&mut self) {}

    #[inline]
    fn process(&mut self, input: A::Sample) -> [A::Sample; 1] {
        [input]
    }
}
