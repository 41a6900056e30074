//! Butterworth high-pass design and causal IIR filtering.
//!
//! The design goes through the analog prototype's zeros, poles and gain,
//! maps them to high-pass with a pre-warped cutoff, moves them to the z-plane
//! with the bilinear transform and finally expands them into the `b`/`a`
//! polynomials used by [`TransferFunction::filter`].

use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use rustfft::num_traits::{One, Zero};

use crate::error::{Error, Result};

/// Difference-equation coefficients, normalised so that `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl TransferFunction {
    pub fn order(&self) -> usize {
        self.a.len().max(self.b.len()).saturating_sub(1)
    }

    /// Run the filter over `input` from a zero initial state.
    ///
    /// `y[n] = sum(b[k] * x[n-k]) - sum(a[k] * y[n-k], k >= 1)`
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; input.len()];
        for n in 0..input.len() {
            let mut acc = 0.0;
            for (k, &b) in self.b.iter().enumerate().take(n + 1) {
                acc += b * input[n - k];
            }
            for (k, &a) in self.a.iter().enumerate().take(n + 1).skip(1) {
                acc -= a * output[n - k];
            }
            output[n] = acc / self.a[0];
        }
        output
    }

    /// Complex response at normalised angular frequency `omega` (rad/sample).
    pub fn response(&self, omega: f64) -> Complex<f64> {
        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| Complex::from_polar(c, -omega * k as f64))
                .sum::<Complex<f64>>()
        };
        eval(&self.b) / eval(&self.a)
    }
}

/// Design an `order`-th order digital Butterworth high-pass filter.
pub fn butter_highpass(
    order: usize,
    cutoff_hz: f64,
    sample_rate: f64,
) -> Result<TransferFunction> {
    if order == 0 {
        return Err(Error::invalid("filter order must be at least 1"));
    }
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(Error::invalid(format!("sample rate {sample_rate} Hz")));
    }
    let nyquist = 0.5 * sample_rate;
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(Error::invalid(format!(
            "high-pass cutoff {cutoff_hz} Hz must lie between 0 and Nyquist ({nyquist} Hz)"
        )));
    }
    let normal_cutoff = cutoff_hz / nyquist;

    // Bilinear transform runs at fs = 2, so the cutoff is warped to 4·tan(π·Wn/2).
    let fs = 2.0;
    let warped = 2.0 * fs * (PI * normal_cutoff / fs).tan();

    let n = order as f64;
    let prototype_poles: Vec<Complex<f64>> = (0..order)
        .map(|i| {
            let m = -n + 1.0 + 2.0 * i as f64;
            -Complex::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();

    // Low-pass prototype -> high-pass: p -> wo / p, every zero lands at the origin.
    let poles: Vec<Complex<f64>> = prototype_poles.iter().map(|&p| warped / p).collect();
    let zeros = vec![Complex::<f64>::zero(); order];
    let prototype_gain: Complex<f64> = prototype_poles.iter().map(|&p| -p).product();
    let gain = (Complex::<f64>::one() / prototype_gain).re;

    // s-plane -> z-plane.
    let fs2 = Complex::new(2.0 * fs, 0.0);
    let z_zeros: Vec<Complex<f64>> = zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
    let z_poles: Vec<Complex<f64>> = poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
    let z_gain = gain
        * (zeros.iter().map(|&z| fs2 - z).product::<Complex<f64>>()
            / poles.iter().map(|&p| fs2 - p).product::<Complex<f64>>())
        .re;

    let b = poly(&z_zeros).into_iter().map(|c| z_gain * c.re).collect();
    let a = poly(&z_poles).into_iter().map(|c| c.re).collect();
    Ok(TransferFunction { b, a })
}

/// Monic polynomial coefficients (highest power first) with the given roots.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::one()];
    for &root in roots {
        coeffs.push(Complex::zero());
        for k in (1..coeffs.len()).rev() {
            let prev = coeffs[k - 1];
            coeffs[k] -= root * prev;
        }
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_order_half_band_matches_reference() {
        // Reference values for a 2nd order high-pass at Wn = 0.5.
        let tf = butter_highpass(2, 2000.0, 8000.0).unwrap();
        let b = [
            0.292_893_218_813_452_5,
            -0.585_786_437_626_905,
            0.292_893_218_813_452_5,
        ];
        let a = [1.0, 0.0, 0.171_572_875_253_809_9];
        for (got, want) in tf.b.iter().zip(b) {
            assert!((got - want).abs() < 1e-9, "b: {got} vs {want}");
        }
        for (got, want) in tf.a.iter().zip(a) {
            assert!((got - want).abs() < 1e-9, "a: {got} vs {want}");
        }
    }

    #[test]
    fn fifth_order_rejects_dc_and_passes_nyquist() {
        let tf = butter_highpass(5, 4000.0, 44100.0).unwrap();
        assert_eq!(tf.order(), 5);
        assert_eq!(tf.a[0], 1.0);
        assert!(tf.response(0.0).norm() < 1e-9);
        assert!((tf.response(PI).norm() - 1.0).abs() < 1e-9);

        // -3 dB at the cutoff.
        let at_cutoff = tf.response(2.0 * PI * 4000.0 / 44100.0).norm();
        assert!((at_cutoff - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn filter_is_causal_with_zero_state() {
        let tf = butter_highpass(3, 1000.0, 8000.0).unwrap();
        let mut impulse = vec![0.0; 16];
        impulse[4] = 1.0;
        let out = tf.filter(&impulse);
        assert!(out[..4].iter().all(|&y| y == 0.0));
        assert!((out[4] - tf.b[0]).abs() < 1e-12);
    }

    #[test]
    fn constant_input_decays() {
        let tf = butter_highpass(5, 4000.0, 44100.0).unwrap();
        let out = tf.filter(&vec![1.0; 4410]);
        assert!(out[4000..].iter().all(|y| y.abs() < 1e-6));
    }

    #[test]
    fn rejects_cutoff_outside_band() {
        for (order, cutoff) in [(5, 0.0), (5, 22050.0), (0, 4000.0)] {
            let err = butter_highpass(order, cutoff, 44100.0).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "{cutoff} Hz");
        }
    }
}
