#![warn(missing_docs)]
//! # forkfft
//!
//! Fast Fourier transform computed by a tree of processes.
//!
//! Each node reads complex samples from stdin, one per line. A single sample
//! is printed back unchanged. Otherwise the node spawns two copies of itself,
//! sends the even-indexed samples to the first and the odd-indexed samples to
//! the second, waits for both, and recombines their results with the radix-2
//! butterfly:
//!
//! ```text
//!                       x0..x7
//!                 ┌────────┴────────┐
//!             x0 x2 x4 x6       x1 x3 x5 x7
//!             ┌───┴───┐         ┌───┴───┐
//!           x0 x4   x2 x6     x1 x5   x3 x7
//!           ┌┴┐     ┌┴┐       ┌┴┐     ┌┴┐
//!          x0 x4   x2 x6     x1 x5   x3 x7
//! ```
//!
//! The tree has `log2(N)` levels and `N` leaves; every edge is a pair of pipes.
//!
//! - **Line protocol**: `<real> <imag>*i`, six decimals between nodes
//! - **Noise floor**: components below `1e-2` are printed as exactly `0`
//! - **Fail-fast**: any error kills the node, and its parent, up to the root
//!
//! ## Library use
//!
//! ```ignore
//! use forkfft::{ExecutionMode, NodeConfig, Orchestrator};
//!
//! let mut config = NodeConfig::root("forkfft");
//! config.mode = ExecutionMode::InProcess;
//! let mut out = Vec::new();
//! Orchestrator::new(config).run("1 0\n0 0\n".as_bytes(), &mut out)?;
//! ```

// Re-export numerics
pub use forkfft_core::{
    ButterflyPair, ComplexSample, NOISE_FLOOR, Precision, WIRE_DIGITS, butterfly, dft,
    format_sample, inverse_dft, max_abs_error, suppress_noise, twiddle,
};

// Re-export the line protocol
pub use forkfft_ipc::{
    DecodeError, LineError, LineReader, LineWriter, decode_line, encode_line, read_all_samples,
};

// Re-export the orchestrator
pub use forkfft_cli::{
    Cli, ExecutionMode, ForkfftConfig, Half, NodeConfig, NodeError, NodeOutcome, Orchestrator,
    exit_fatal, program_name,
};

/// Run one node of the tree with this process's arguments, stdin and stdout.
///
/// ```ignore
/// fn main() {
///     if let Err(e) = forkfft::run() {
///         forkfft::exit_fatal(&forkfft::program_name(), &e);
///     }
/// }
/// ```
pub use forkfft_cli::run;
