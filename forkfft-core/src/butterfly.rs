//! Butterfly Combiner
//!
//! Radix-2 Cooley–Tukey recombination of one even/odd pair of half-size
//! transform results.
//!
//! ```text
//!   even[k] ──────────────┬──── (+) ──▶ sum[k]        = even[k] + w·odd[k]
//!                         │
//!   odd[k] ── × w(k, N) ──┴──── (−) ──▶ difference[k] = even[k] − w·odd[k]
//! ```

use crate::ComplexSample;
use std::f64::consts::PI;

/// Output of one butterfly step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterflyPair {
    /// `even + w·odd`, lands at index `k`
    pub sum: ComplexSample,
    /// `even − w·odd`, lands at index `k + N/2`
    pub difference: ComplexSample,
}

/// Twiddle factor `cos(θ) + i·sin(θ)` with `θ = −2πk / n`.
#[inline]
pub fn twiddle(k: usize, n: usize) -> ComplexSample {
    let theta = -2.0 * PI * k as f64 / n as f64;
    ComplexSample::new(theta.cos(), theta.sin())
}

/// Combine the `k`-th even and odd half results of a size-`n` transform.
#[inline]
pub fn butterfly(even: ComplexSample, odd: ComplexSample, k: usize, n: usize) -> ButterflyPair {
    let t = twiddle(k, n) * odd;
    ButterflyPair {
        sum: even + t,
        difference: even - t,
    }
}
