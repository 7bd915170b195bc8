//! YM7128B Hardware Constants
//!
//! Clock rates, fixed-point format and the quantized lookup tables used by the
//! Fixed and Short engines. Everything here is immutable data.

/// Chip master clock (Hz)
pub const CLOCK_RATE: u32 = 7_159_090;

/// Input (processing) sample rate of the chip: master clock / 304, rounded
pub const INPUT_RATE: u32 = (CLOCK_RATE + (304 / 2)) / 304;

/// Output clock ratio of the chip DAC
pub const OVERSAMPLING: usize = 2;

/// Output sample rate of the Fixed and Float engines
pub const OUTPUT_RATE: u32 = INPUT_RATE * OVERSAMPLING as u32;

/// Longest tap delay (100 ms) in input samples
pub const MAX_TAP_DELAY: usize = (INPUT_RATE / 10) as usize;

/// Delay line length at the chip rate: longest tap plus its cross-feed neighbour
pub const BUFFER_LENGTH: usize = MAX_TAP_DELAY + 2;

/// Number of taps (`T0..T8`)
pub const TAP_COUNT: usize = 9;

/// Number of output taps wired to the gain lanes (`T1..T8`)
pub const GAIN_LANE_COUNT: usize = 8;

/// Tap code width (`T0..T8`)
pub const TAP_VALUE_BITS: u32 = 5;
/// Tap code mask
pub const TAP_VALUE_MASK: u8 = (1 << TAP_VALUE_BITS) - 1;
/// Largest tap code
pub const TAP_VALUE_MAX: u8 = TAP_VALUE_MASK;

/// Gain code width (sign + 5-bit magnitude)
pub const GAIN_DATA_BITS: u32 = 6;
/// Gain code mask
pub const GAIN_DATA_MASK: u8 = (1 << GAIN_DATA_BITS) - 1;
/// Sign bit of a gain code (set = positive)
pub const GAIN_SIGN_BIT: u8 = 1 << (GAIN_DATA_BITS - 1);
/// Magnitude part of a gain code
pub const GAIN_MAGNITUDE_MASK: u8 = GAIN_SIGN_BIT - 1;
/// Attenuation per magnitude step
pub const GAIN_STEP_DB: f32 = 2.0;

/// Cross-feed coefficient code width (two's complement)
pub const COEFF_VALUE_BITS: u32 = 6;
/// Cross-feed coefficient code mask
pub const COEFF_VALUE_MASK: u8 = (1 << COEFF_VALUE_BITS) - 1;

/// Fixed-point word width
pub const FIXED_BITS: u32 = 16;
/// Fractional bits of the Q1.15 format
pub const FIXED_DECIMALS: u32 = FIXED_BITS - 1;
/// Round-half-up term added before the product shift
pub const FIXED_ROUNDING: i32 = 1 << (FIXED_DECIMALS - 1);
/// Largest fixed-point sample
pub const FIXED_MAX: i16 = i16::MAX;
/// Smallest fixed-point sample
pub const FIXED_MIN: i16 = i16::MIN;

/// Significant bits of a signal word inside the chip
pub const SIGNAL_BITS: u32 = 14;
/// Clears the signal bits the chip does not carry
pub const SIGNAL_MASK: i16 = !((1 << (FIXED_BITS - SIGNAL_BITS)) - 1);

/// Significant bits of a gain word inside the chip
pub const GAIN_BITS: u32 = 12;
/// Clears the gain bits the chip does not carry
pub const GAIN_MASK: i16 = !((1 << (FIXED_BITS - GAIN_BITS)) - 1);

/// Tap delays in input samples at [`INPUT_RATE`], indexed by tap code.
///
/// Linear 100 ms / 31 spacing, rounded to the nearest sample.
pub const TAP_TABLE: [u16; 32] = [
    0, 76, 152, 228, 304, 380, 456, 532, 608, 684, 760, 836, 912, 988, 1064, 1140, 1215, 1291,
    1367, 1443, 1519, 1595, 1671, 1747, 1823, 1899, 1975, 2051, 2127, 2203, 2279, 2355,
];

/// Q1.15 gains indexed by 6-bit gain code, quantized to [`GAIN_BITS`].
///
/// Codes `0x00..=0x1F` are negative, `0x20..=0x3F` positive. Magnitude `0` is
/// silence, `1` is -60 dB and `31` is 0 dB (`0x7FF0`).
pub const GAIN_TABLE: [i16; 64] = [
    // Negative gains
    0, -32, -32, -48, -64, -80, -96, -128, -160, -192, -256, -320, -400, -512, -640, -816,
    -1024, -1296, -1632, -2064, -2592, -3264, -4112, -5184, -6528, -8224, -10352, -13040, -16416,
    -20672, -26016, -32752,
    // Positive gains
    0, 32, 32, 48, 64, 80, 96, 128, 160, 192, 256, 320, 400, 512, 640, 816, 1024, 1296, 1632,
    2064, 2592, 3264, 4112, 5184, 6528, 8224, 10352, 13040, 16416, 20672, 26016, 32752,
];

/// Length of the half-band reconstruction filter (zero-stuffed domain)
pub const OVERSAMPLER_LENGTH: usize = 19;

/// Interpolating phase of the half-band filter: `OVERSAMPLER_LENGTH / 2 + 1` taps
pub const OVERSAMPLER_PHASE_LENGTH: usize = OVERSAMPLER_LENGTH / 2 + 1;

/// Input frames between a sample entering the oversampler and leaving on the
/// pure-delay phase
pub const OVERSAMPLER_LATENCY: usize = OVERSAMPLER_LENGTH / 4;

/// Interpolating phase in Q1.15 (Kaiser beta 6, DC gain exactly 1.0)
pub const OVERSAMPLER_KERNEL_FIXED: [i16; OVERSAMPLER_PHASE_LENGTH] = [
    34, -412, 1675, -5093, 20180, 20180, -5093, 1675, -412, 34,
];

/// Interpolating phase in floating point (Kaiser beta 6, DC gain 1.0)
pub const OVERSAMPLER_KERNEL_FLOAT: [f32; OVERSAMPLER_PHASE_LENGTH] = [
    0.001_052_784,
    -0.012_569_013,
    0.051_109_487,
    -0.155_417_889,
    0.615_824_632,
    0.615_824_632,
    -0.155_417_889,
    0.051_109_487,
    -0.012_569_013,
    0.001_052_784,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_rates() {
        assert_eq!(INPUT_RATE, 23_550);
        assert_eq!(OUTPUT_RATE, 47_100);
        assert_eq!(MAX_TAP_DELAY, 2355);
        assert_eq!(BUFFER_LENGTH, 2357);
    }

    #[test]
    fn test_masks() {
        assert_eq!(SIGNAL_MASK, -4);
        assert_eq!(GAIN_MASK, -16);
        assert_eq!(FIXED_ROUNDING, 0x4000);
    }

    #[test]
    fn test_tap_table_monotonic_and_bounded() {
        for code in 1..TAP_TABLE.len() {
            assert!(
                TAP_TABLE[code] > TAP_TABLE[code - 1],
                "TAP_TABLE[{}] ({}) <= TAP_TABLE[{}] ({})",
                code,
                TAP_TABLE[code],
                code - 1,
                TAP_TABLE[code - 1]
            );
        }
        assert_eq!(TAP_TABLE[0], 0);
        assert_eq!(TAP_TABLE[31] as usize, MAX_TAP_DELAY);
        assert!((TAP_TABLE[31] as usize) + 1 < BUFFER_LENGTH);
    }

    #[test]
    fn test_gain_table_symmetric_and_quantized() {
        for magnitude in 0..32 {
            let negative = GAIN_TABLE[magnitude];
            let positive = GAIN_TABLE[magnitude + 32];
            assert_eq!(negative, -positive, "magnitude {magnitude}");
            assert_eq!(positive & !GAIN_MASK, 0, "magnitude {magnitude} not 12-bit");
        }
        assert_eq!(GAIN_TABLE[0x3F], 0x7FF0);
        assert_eq!(GAIN_TABLE[0x20], 0);
        assert_eq!(GAIN_TABLE[0x00], 0);
    }

    #[test]
    fn test_oversampler_kernels_unity_dc() {
        let fixed: i32 = OVERSAMPLER_KERNEL_FIXED.iter().map(|&k| k as i32).sum();
        assert_eq!(fixed, 1 << FIXED_DECIMALS);

        let float: f32 = OVERSAMPLER_KERNEL_FLOAT.iter().sum();
        assert!((float - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_oversampler_kernels_agree() {
        for (fixed, float) in OVERSAMPLER_KERNEL_FIXED
            .iter()
            .zip(OVERSAMPLER_KERNEL_FLOAT.iter())
        {
            let scaled = *fixed as f32 / 32768.0;
            assert!((scaled - float).abs() < 1e-4);
        }
    }
}
