//! YM7128B Tap/Gain Network
//!
//! Combines the delay line taps into the stereo output:
//!
//! - Taps `T1..T8` weighted by `GL1..GL8` (left) and `GR1..GR8` (right)
//! - Cross-feed pair at `T0` weighted by `C0` and `C1`, shared by both sides
//! - Wet levels `VL`/`VR`, dry level `VC` and the master level `VM`
//!
//! The network is feed-forward: nothing is written back into the delay line,
//! so the impulse response ends once the impulse leaves the line.

use num_traits::Zero;

use super::arithmetic::Arithmetic;
use super::decoder::CoefficientsOf;
use super::delay_line::DelayLine;
use super::model::{Model, Sample};
use crate::Result;

/// Delay line plus the operating coefficients that read it
pub struct Mixer<M: Model> {
    line: DelayLine<Sample<M>>,
    coefficients: CoefficientsOf<M>,
}

impl<M: Model> Mixer<M> {
    /// Create a mixer whose delay line holds `capacity` samples
    pub fn new(capacity: usize, coefficients: CoefficientsOf<M>) -> Result<Self> {
        Ok(Mixer {
            line: DelayLine::new(capacity)?,
            coefficients,
        })
    }

    /// Current coefficients
    pub fn coefficients(&self) -> &CoefficientsOf<M> {
        &self.coefficients
    }

    /// Replace the coefficients; the delay line keeps its history
    pub fn set_coefficients(&mut self, coefficients: CoefficientsOf<M>) {
        self.coefficients = coefficients;
    }

    /// Delay line capacity
    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }

    /// Silence the delay line
    pub fn reset(&mut self) {
        self.line.reset();
    }

    /// Push one mono sample and compute the stereo output
    #[inline]
    pub fn process(&mut self, input: Sample<M>) -> (Sample<M>, Sample<M>) {
        let c = &self.coefficients;
        self.line.push(input);

        let mut left = <Sample<M> as Zero>::zero();
        let mut right = <Sample<M> as Zero>::zero();
        for ((&tap, &gain_left), &gain_right) in c.taps[1..]
            .iter()
            .zip(c.gains_left.iter())
            .zip(c.gains_right.iter())
        {
            let sample = M::read_tap(&self.line, tap);
            left = add::<M>(left, mul::<M>(sample, gain_left));
            right = add::<M>(right, mul::<M>(sample, gain_right));
        }

        let t0 = M::read_tap(&self.line, c.taps[0]);
        let t0_next = M::read_tap(&self.line, c.cross_feed_next);
        let cross_feed = add::<M>(mul::<M>(t0, c.c0), mul::<M>(t0_next, c.c1));
        left = add::<M>(left, cross_feed);
        right = add::<M>(right, cross_feed);

        let dry = mul::<M>(input, c.center);
        let out_left = mul::<M>(add::<M>(mul::<M>(left, c.left), dry), c.master);
        let out_right = mul::<M>(add::<M>(mul::<M>(right, c.right), dry), c.master);
        (out_left, out_right)
    }
}

#[inline(always)]
fn mul<M: Model>(sample: Sample<M>, gain: Sample<M>) -> Sample<M> {
    M::Arith::mul(sample, gain)
}

#[inline(always)]
fn add<M: Model>(a: Sample<M>, b: Sample<M>) -> Sample<M> {
    M::Arith::add(a, b)
}

impl<M: Model> Clone for Mixer<M> {
    fn clone(&self) -> Self {
        Mixer {
            line: self.line.clone(),
            coefficients: self.coefficients,
        }
    }
}

impl<M: Model> std::fmt::Debug for Mixer<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mixer")
            .field("line", &self.line)
            .field("coefficients", &self.coefficients)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ym7128b::constants::{INPUT_RATE, TAP_TABLE};
    use crate::ym7128b::decoder::decode;
    use crate::ym7128b::model::{FixedModel, FloatModel};
    use crate::ym7128b::registers::{Register, RegisterFile};
    use approx::assert_abs_diff_eq;

    fn float_mixer(regs: &RegisterFile) -> Mixer<FloatModel> {
        Mixer::new(64, decode::<FloatModel>(regs, INPUT_RATE)).unwrap()
    }

    #[test]
    fn test_tap_lanes_are_wired_by_index() {
        let mut regs = RegisterFile::new();
        regs.set(Register::Vm, 0x3F);
        regs.set(Register::Vl, 0x3F);
        regs.set(Register::Vr, 0x3F);
        regs.set(Register::T3, 0);
        regs.set(Register::Gl3, 0x3F);
        regs.set(Register::Gr3, 0x1F);
        // Every other tap points far away
        for reg in [
            Register::T0,
            Register::T1,
            Register::T2,
            Register::T4,
            Register::T5,
            Register::T6,
            Register::T7,
            Register::T8,
        ] {
            regs.set(reg, 31);
        }

        let mut mixer = float_mixer(&regs);
        let (left, right) = mixer.process(0.5);
        assert_abs_diff_eq!(left, 0.5);
        assert_abs_diff_eq!(right, -0.5);
    }

    #[test]
    fn test_tap_delay() {
        let mut regs = RegisterFile::new();
        regs.set(Register::Vm, 0x3F);
        regs.set(Register::Vl, 0x3F);
        regs.set(Register::T1, 1);
        regs.set(Register::Gl1, 0x3F);

        let mut mixer = Mixer::<FloatModel>::new(
            TAP_TABLE[31] as usize + 2,
            decode::<FloatModel>(&regs, INPUT_RATE),
        )
        .unwrap();
        let delay = TAP_TABLE[1] as usize;

        let mut outputs = Vec::new();
        for frame in 0..=delay + 1 {
            let input = if frame == 0 { 1.0 } else { 0.0 };
            outputs.push(mixer.process(input).0);
        }

        for (frame, value) in outputs.iter().enumerate() {
            let expected = if frame == delay { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(*value, expected);
        }
    }

    #[test]
    fn test_cross_feed_reaches_both_sides() {
        let mut regs = RegisterFile::new();
        regs.set(Register::Vm, 0x3F);
        regs.set(Register::Vl, 0x3F);
        regs.set(Register::Vr, 0x3F);
        regs.set(Register::T0, 0);
        regs.set(Register::C0, 0x10); // 0.5
        regs.set(Register::C1, 0x08); // 0.25

        let mut mixer = float_mixer(&regs);
        let (left, right) = mixer.process(1.0);
        assert_abs_diff_eq!(left, 0.5);
        assert_abs_diff_eq!(right, 0.5);

        // One sample later the second coefficient picks the impulse up
        let (left, right) = mixer.process(0.0);
        assert_abs_diff_eq!(left, 0.25);
        assert_abs_diff_eq!(right, 0.25);
    }

    #[test]
    fn test_dry_path_and_master() {
        let mut regs = RegisterFile::new();
        regs.set(Register::Vc, 0x3F);

        let mut mixer = float_mixer(&regs);
        // Master at silence mutes everything
        assert_eq!(mixer.process(0.75), (0.0, 0.0));

        regs.set(Register::Vm, 0x3F);
        mixer.set_coefficients(decode::<FloatModel>(&regs, INPUT_RATE));
        let (left, right) = mixer.process(0.75);
        assert_abs_diff_eq!(left, 0.75);
        assert_abs_diff_eq!(right, 0.75);
    }

    #[test]
    fn test_fixed_accumulators_saturate() {
        let mut regs = RegisterFile::new();
        for reg in Register::ALL {
            regs.set(reg, 0x3F);
        }
        for tap in 0..9u8 {
            regs.set(Register::from_addr(Register::T0.addr() + tap).unwrap(), 0);
        }
        regs.set(Register::C0, 0x1F);
        regs.set(Register::C1, 0x1F);

        let mut mixer = Mixer::<FixedModel>::new(16, decode::<FixedModel>(&regs, INPUT_RATE))
            .unwrap();
        for _ in 0..8 {
            let (left, right) = mixer.process(0x7FFC);
            assert!(left > 0x7F00, "left wrapped: {left}");
            assert!(right > 0x7F00, "right wrapped: {right}");
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let mut regs = RegisterFile::new();
        regs.set(Register::Vm, 0x3F);
        regs.set(Register::Vl, 0x3F);
        regs.set(Register::Gl1, 0x3F);
        regs.set(Register::T1, 1);

        let mut mixer = Mixer::<FloatModel>::new(
            TAP_TABLE[1] as usize + 2,
            decode::<FloatModel>(&regs, INPUT_RATE),
        )
        .unwrap();
        for _ in 0..10 {
            mixer.process(1.0);
        }
        mixer.reset();
        for _ in 0..=TAP_TABLE[1] {
            assert_eq!(mixer.process(0.0), (0.0, 0.0));
        }
        assert_eq!(mixer.capacity(), TAP_TABLE[1] as usize + 2);
    }
}
