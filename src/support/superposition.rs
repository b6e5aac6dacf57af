//! Causal temporal superposition.
//!
//! The borehole wall response to a piecewise constant load history `q` is
//!
//! ```text
//! r[k] = Σ_{j ≤ k} q[j] · Δg[k − j]
//! ```
//!
//! where `Δg` are the increments of the g-function on the same uniform time
//! step. Monthly histories are short and use the direct sum; hourly
//! histories (8760 values per year) go through an FFT.

use rustfft::{FftPlanner, num_complex::Complex};

/// Histories up to this length use the direct sum.
const DIRECT_LIMIT: usize = 512;

/// Returns the increments `g[k] − g[k−1]` with `g[−1] = 0`.
#[must_use]
pub fn increments(g: &[f64]) -> Vec<f64> {
    let mut previous = 0.0;
    g.iter()
        .map(|&value| {
            let step = value - previous;
            previous = value;
            step
        })
        .collect()
}

/// Causal convolution of `load` with `response`, truncated to `load.len()`.
///
/// `response` must be at least as long as `load`.
#[must_use]
pub fn superpose(load: &[f64], response: &[f64]) -> Vec<f64> {
    let n = load.len().min(response.len());
    if n <= DIRECT_LIMIT {
        superpose_direct(&load[..n], &response[..n])
    } else {
        superpose_fft(&load[..n], &response[..n])
    }
}

fn superpose_direct(load: &[f64], response: &[f64]) -> Vec<f64> {
    (0..load.len())
        .map(|k| {
            load[..=k]
                .iter()
                .zip(response[..=k].iter().rev())
                .map(|(q, dg)| q * dg)
                .sum()
        })
        .collect()
}

fn superpose_fft(load: &[f64], response: &[f64]) -> Vec<f64> {
    let n = load.len();
    let fft_size = (2 * n).next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);
    let ifft = planner.plan_fft_inverse(fft_size);

    let padded = |values: &[f64]| -> Vec<Complex<f64>> {
        values
            .iter()
            .map(|&x| Complex::new(x, 0.0))
            .chain(std::iter::repeat_n(Complex::new(0.0, 0.0), fft_size - n))
            .collect()
    };

    let mut signal = padded(load);
    let mut kernel = padded(response);
    fft.process(&mut signal);
    fft.process(&mut kernel);

    for (s, k) in signal.iter_mut().zip(kernel.iter()) {
        *s *= k;
    }
    ifft.process(&mut signal);

    let scale = 1.0 / fft_size as f64;
    signal[..n].iter().map(|c| c.re * scale).collect()
}
