//! Whole-signal DFT with FFT-ordered frequency labels.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{Error, Result};

/// Frequency bins and the matching complex coefficients of one transform.
///
/// Bins follow the usual FFT ordering: DC, the positive half, then the
/// negative half from `-rate/2` back towards zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    sample_rate: u32,
    frequencies: Vec<f64>,
    coefficients: Vec<Complex<f64>>,
}

impl Spectrum {
    /// Wrap already-computed coefficients, labelling bins for `sample_rate`.
    pub fn from_coefficients(sample_rate: u32, coefficients: Vec<Complex<f64>>) -> Self {
        Self {
            sample_rate,
            frequencies: fft_frequencies(coefficients.len(), sample_rate),
            coefficients,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn coefficients(&self) -> &[Complex<f64>] {
        &self.coefficients
    }

    /// `|X[k]|` for every bin.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.norm()).collect()
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Bin spacing in Hz.
    pub fn resolution(&self) -> f64 {
        self.sample_rate as f64 / self.len() as f64
    }
}

/// Forward DFT of `samples`, unscaled.
pub fn analyze(samples: Vec<f64>, rate: u32) -> Result<Spectrum> {
    if rate == 0 {
        return Err(Error::invalid("sample rate must be positive"));
    }
    if samples.is_empty() {
        return Err(Error::EmptyInput("spectral analyzer"));
    }

    let mut buffer: Vec<Complex<f64>> = samples.into_iter().map(|x| Complex::new(x, 0.0)).collect();
    let fft = FftPlanner::new().plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    log::debug!(
        "transformed {} samples, {:.4} Hz per bin",
        buffer.len(),
        rate as f64 / buffer.len() as f64
    );
    Ok(Spectrum::from_coefficients(rate, buffer))
}

/// Centre frequency of each of the `n` bins of a transform at `rate` Hz.
pub fn fft_frequencies(n: usize, rate: u32) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let step = rate as f64 / n as f64;
    let last_positive = (n - 1) / 2;
    (0..n)
        .map(|i| {
            let k = if i <= last_positive {
                i as f64
            } else {
                i as f64 - n as f64
            };
            k * step
        })
        .collect()
}
