//! YM7128B Emulation Domain
//!
//! Register file, coefficient decoding, delay line, tap/gain network,
//! output oversampling and the generic chip pipeline with its four engines.

pub mod arithmetic;
pub mod chip;
pub mod constants;
pub mod decoder;
pub mod delay_line;
pub mod mixer;
pub mod model;
pub mod oversampler;
pub mod registers;

pub use arithmetic::{Arithmetic, FixedMath, FloatMath, ShortMath};
pub use chip::{Chip, ChipFixed, ChipFloat, ChipIdeal, ChipShort, ChipState, StereoFrame};
pub use decoder::{decode, Coefficients, CoefficientsOf};
pub use delay_line::DelayLine;
pub use mixer::Mixer;
pub use model::{ChipMode, FixedModel, FloatModel, IdealModel, Model, Sample, ShortModel};
pub use oversampler::{HalfBand, HalfBandArithmetic, Oversampling, Passthrough};
pub use registers::{Register, RegisterClass, RegisterFile, REGISTER_COUNT};
