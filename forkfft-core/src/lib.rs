#![warn(missing_docs)]
//! forkfft Core - Numerics
//!
//! This crate holds the arithmetic shared by every node of the process tree:
//! - `ComplexSample`, the value carried on every line of the protocol
//! - The radix-2 butterfly that recombines two half-size transforms
//! - Noise-floor suppression and fixed-precision rendering of results
//! - Direct (textbook) DFT and inverse DFT used to cross-check results

mod butterfly;
mod dft;
mod format;

pub use butterfly::{ButterflyPair, butterfly, twiddle};
pub use dft::{dft, inverse_dft, max_abs_error};
pub use format::{NOISE_FLOOR, Precision, format_sample, suppress_noise};

/// A single complex value: real part then imaginary part.
pub type ComplexSample = num_complex::Complex64;

/// Digits after the decimal point used between nodes of the tree.
///
/// Children always emit at this precision, whatever the root was asked for,
/// so rounding does not compound across recursion levels.
pub const WIRE_DIGITS: usize = 6;
