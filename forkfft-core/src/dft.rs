//! Direct DFT
//!
//! O(N²) textbook summations. Slow, but independent of the recursive
//! decomposition, which makes them the reference the tree is checked against.

use crate::ComplexSample;
use std::f64::consts::PI;

fn summation(input: &[ComplexSample], sign: f64) -> Vec<ComplexSample> {
    let n = input.len();
    (0..n)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(j, x)| {
                    let theta = sign * 2.0 * PI * (j * k % n) as f64 / n as f64;
                    x * ComplexSample::new(theta.cos(), theta.sin())
                })
                .sum()
        })
        .collect()
}

/// `X[k] = Σ x[j]·e^(−2πi·jk/N)`
pub fn dft(input: &[ComplexSample]) -> Vec<ComplexSample> {
    summation(input, -1.0)
}

/// `x[j] = (1/N)·Σ X[k]·e^(+2πi·jk/N)`
pub fn inverse_dft(input: &[ComplexSample]) -> Vec<ComplexSample> {
    let scale = 1.0 / input.len().max(1) as f64;
    summation(input, 1.0)
        .into_iter()
        .map(|x| x * scale)
        .collect()
}

/// Largest per-component distance between two equally long sequences.
///
/// Returns `f64::INFINITY` when the lengths differ.
pub fn max_abs_error(a: &[ComplexSample], b: &[ComplexSample]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x.re - y.re).abs().max((x.im - y.im).abs()))
        .fold(0.0, f64::max)
}
