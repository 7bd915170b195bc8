//! Delay line
//!
//! Circular history of the mono input. Taps read back from the most recent
//! sample; offset 0 is the sample just pushed.

use num_traits::Zero;

use crate::Result;

/// Fixed-capacity circular buffer of native samples
#[derive(Clone)]
pub struct DelayLine<S> {
    /// Circular buffer of past samples
    buffer: Box<[S]>,
    /// Index of the most recent sample
    position: usize,
}

impl<S: Copy + Zero> DelayLine<S> {
    /// Create a zeroed delay line holding `capacity` samples (at least 1).
    ///
    /// Memory is reserved fallibly so that an out-of-memory condition surfaces
    /// as [`crate::Ym7128bError::AllocationFailure`] instead of aborting.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(capacity)?;
        buffer.resize(capacity, S::zero());
        Ok(Self {
            buffer: buffer.into_boxed_slice(),
            position: 0,
        })
    }

    /// Number of samples held
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Store a sample and advance the cursor
    #[inline]
    pub fn push(&mut self, sample: S) {
        self.position += 1;
        if self.position == self.buffer.len() {
            self.position = 0;
        }
        self.buffer[self.position] = sample;
    }

    /// Sample pushed `offset` steps before the most recent one.
    ///
    /// `offset` is clamped to `capacity - 1`.
    #[inline]
    pub fn read(&self, offset: usize) -> S {
        let len = self.buffer.len();
        let offset = offset.min(len - 1);
        let index = if offset <= self.position {
            self.position - offset
        } else {
            self.position + len - offset
        };
        self.buffer[index]
    }

    /// Clear every sample and rewind the cursor
    pub fn reset(&mut self) {
        self.buffer.fill(S::zero());
        self.position = 0;
    }
}

impl DelayLine<f32> {
    /// Read at a fractional offset, interpolating linearly between neighbours.
    ///
    /// Negative or non-finite offsets read the most recent sample.
    #[inline]
    pub fn read_interpolated(&self, offset: f32) -> f32 {
        let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        let whole = offset.floor();
        let frac = offset - whole;
        let index = whole as usize;
        let newer = self.read(index);
        if frac == 0.0 {
            return newer;
        }
        let older = self.read(index + 1);
        newer + (older - newer) * frac
    }
}

impl<S> std::fmt::Debug for DelayLine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayLine")
            .field("capacity", &self.buffer.len())
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
