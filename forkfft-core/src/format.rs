//! Output Formatting
//!
//! Renders samples as `<real> <imag>*i` at a fixed number of decimals, after
//! clamping near-zero components to exactly zero.
//!
//! The clamp threshold is coarse for double precision: a legitimate spectral
//! component smaller than [`NOISE_FLOOR`] is printed as `0`. Output of every
//! node depends on this constant, so it must not change without changing the
//! expected results of the whole tree.

use crate::ComplexSample;

/// Components with an absolute value below this are rendered as exactly zero.
pub const NOISE_FLOOR: f64 = 1e-2;

/// Number of decimals printed for each component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Three decimals (`-p`)
    Short,
    /// Six decimals
    #[default]
    Full,
}

impl Precision {
    /// Digits after the decimal point.
    pub fn digits(self) -> usize {
        match self {
            Precision::Short => 3,
            Precision::Full => 6,
        }
    }

    /// Map a digit count (3 or 6) back to a precision.
    pub fn from_digits(digits: usize) -> Option<Self> {
        match digits {
            3 => Some(Precision::Short),
            6 => Some(Precision::Full),
            _ => None,
        }
    }
}

/// Force each component below the noise floor to `+0.0`, independently.
pub fn suppress_noise(sample: ComplexSample) -> ComplexSample {
    let re = if sample.re.abs() < NOISE_FLOOR {
        0.0
    } else {
        sample.re
    };
    let im = if sample.im.abs() < NOISE_FLOOR {
        0.0
    } else {
        sample.im
    };
    ComplexSample::new(re, im)
}

/// Render a sample for output, without a trailing newline.
pub fn format_sample(sample: ComplexSample, precision: Precision) -> String {
    let clean = suppress_noise(sample);
    let digits = precision.digits();
    format!("{:.*} {:.*}*i", digits, clean.re, digits, clean.im)
}
