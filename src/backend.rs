//! Backend trait abstraction for YM7128B engines
//!
//! This module defines the interface shared by the four engines, so a host can
//! hold any of them behind a `Box<dyn Ym7128bBackend>` and feed normalized
//! samples without knowing the native sample type.

use crate::ym7128b::{Chip, ChipMode, ChipState, Model, Oversampling, REGISTER_COUNT};
use crate::{Result, Ym7128bError};

/// Common interface for YM7128B engines
///
/// # Example
///
/// ```
/// use ym7128b::{ChipFixed, Ym7128bBackend};
///
/// fn run<B: Ym7128bBackend + ?Sized>(chip: &mut B, input: &[f32]) -> Vec<f32> {
///     let mut output = vec![0.0; input.len() * 2 * chip.oversampling()];
///     chip.process_interleaved(input, &mut output).unwrap();
///     output
/// }
///
/// let mut chip = ChipFixed::new().unwrap();
/// Ym7128bBackend::reset(&mut chip);
/// chip.load_registers(&[0x3F; 31]).unwrap();
/// Ym7128bBackend::start(&mut chip).unwrap();
/// let output = run(&mut chip, &[0.0; 16]);
/// assert_eq!(output.len(), 64);
/// ```
pub trait Ym7128bBackend: Send {
    /// Engine of this backend
    fn mode(&self) -> ChipMode;

    /// Lifecycle state
    fn state(&self) -> ChipState;

    /// Processing (input) rate in Hz
    fn sample_rate(&self) -> u32;

    /// Output rate in Hz
    fn output_rate(&self) -> u32 {
        self.sample_rate() * self.oversampling() as u32
    }

    /// Output samples per channel for each input sample
    fn oversampling(&self) -> usize {
        self.mode().oversampling()
    }

    /// Clear registers and history
    fn reset(&mut self);

    /// Begin processing
    fn start(&mut self) -> Result<()>;

    /// Halt processing
    fn stop(&mut self);

    /// Write a register
    ///
    /// # Arguments
    ///
    /// * `addr` - Register address (0x00-0x1E)
    /// * `value` - Register value
    fn write_register(&mut self, addr: u8, value: u8) -> Result<()>;

    /// Read a register
    ///
    /// # Arguments
    ///
    /// * `addr` - Register address (0x00-0x1E)
    fn read_register(&self, addr: u8) -> Result<u8>;

    /// Load all 31 registers at once
    ///
    /// Decodes once instead of once per register.
    fn load_registers(&mut self, regs: &[u8; REGISTER_COUNT]) -> Result<()>;

    /// Dump all 31 registers
    fn dump_registers(&self) -> [u8; REGISTER_COUNT];

    /// Process one input sample into caller-provided channel buffers
    ///
    /// # Arguments
    ///
    /// * `input` - Normalized mono sample
    /// * `left` - Receives [`oversampling`](Self::oversampling) left samples
    /// * `right` - Receives [`oversampling`](Self::oversampling) right samples
    ///
    /// Returns [`Ym7128bError::FrameShape`] when a buffer is too short.
    fn process_normalized(&mut self, input: f32, left: &mut [f32], right: &mut [f32])
        -> Result<()>;

    /// Process a block of input samples into interleaved stereo output
    ///
    /// Each input produces `2 * oversampling()` output samples: the left
    /// channel samples followed by the right channel samples.
    ///
    /// This avoids per-call allocations; prefer this in hot paths.
    fn process_interleaved(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        let width = self.oversampling();
        let expected = input.len() * 2 * width;
        if output.len() < expected {
            return Err(Ym7128bError::FrameShape {
                expected,
                actual: output.len(),
            });
        }

        for (&sample, frame) in input.iter().zip(output.chunks_exact_mut(2 * width)) {
            let (left, right) = frame.split_at_mut(width);
            self.process_normalized(sample, left, right)?;
        }
        Ok(())
    }
}

impl<M, O, const N: usize> Ym7128bBackend for Chip<M, O, N>
where
    M: Model,
    O: Oversampling<M::Arith, N>,
{
    fn mode(&self) -> ChipMode {
        Chip::mode(self)
    }

    fn state(&self) -> ChipState {
        Chip::state(self)
    }

    fn sample_rate(&self) -> u32 {
        Chip::sample_rate(self)
    }

    fn output_rate(&self) -> u32 {
        Chip::output_rate(self)
    }

    fn oversampling(&self) -> usize {
        N
    }

    fn reset(&mut self) {
        Chip::reset(self);
    }

    fn start(&mut self) -> Result<()> {
        Chip::start(self)
    }

    fn stop(&mut self) {
        Chip::stop(self);
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<()> {
        self.write(addr, value)
    }

    fn read_register(&self, addr: u8) -> Result<u8> {
        self.read(addr)
    }

    fn load_registers(&mut self, regs: &[u8; REGISTER_COUNT]) -> Result<()> {
        Chip::load_registers(self, regs)
    }

    fn dump_registers(&self) -> [u8; REGISTER_COUNT] {
        *self.registers().as_slice()
    }

    fn process_normalized(
        &mut self,
        input: f32,
        left: &mut [f32],
        right: &mut [f32],
    ) -> Result<()> {
        let shortest = left.len().min(right.len());
        if shortest < N {
            return Err(Ym7128bError::FrameShape {
                expected: N,
                actual: shortest,
            });
        }

        let frame = Chip::process_normalized(self, input)?;
        left[..N].copy_from_slice(&frame.left);
        right[..N].copy_from_slice(&frame.right);
        Ok(())
    }
}
