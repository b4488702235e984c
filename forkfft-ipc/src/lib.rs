#![warn(missing_docs)]
//! forkfft Line Protocol
//!
//! Text protocol spoken on every pipe of the process tree. One complex sample
//! per line, real part then imaginary part, optionally suffixed with the
//! imaginary unit:
//!
//! ```text
//! 1.000000 -0.500000*i\n
//! ```
//!
//! Parents write their children's input in this format and read the children's
//! results back in the same format, so the root's stdin, every internal pipe
//! and the root's stdout share one grammar.

mod line;
mod stream;

pub use line::{DecodeError, decode_line, encode_line};
pub use stream::{LineError, LineReader, LineWriter, read_all_samples};

/// Marker accepted (and emitted) after the imaginary part.
pub const IMAGINARY_UNIT: char = 'i';
