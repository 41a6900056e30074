//! Dominant-peak extraction.
//!
//! The error bars attached to a [`PeakResult`] are a fixed fraction of the
//! peak values. They are a presentation aid, not a confidence interval.

use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::spectrum::Spectrum;

/// Peak search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PeakSearch {
    /// Lowest frequency (Hz) a peak may sit at.
    pub min_peak_freq: f64,
    /// Fraction of the peak values reported as the error bound.
    pub error_rate: f64,
    /// A winner weaker than this fraction of the strongest positive-frequency
    /// bin is treated as noise floor. `0.0` turns the check off.
    ///
    /// The default `1e-3` is a relative -60 dB cut. It can also hide a real
    /// but weak peak that sits more than 60 dB below a stronger one outside
    /// the search range.
    pub noise_floor_ratio: f64,
}

impl Default for PeakSearch {
    fn default() -> Self {
        Self {
            min_peak_freq: 100.0,
            error_rate: 0.05,
            noise_floor_ratio: 1e-3,
        }
    }
}

impl PeakSearch {
    pub fn with_min_peak_freq(mut self, hz: f64) -> Self {
        self.min_peak_freq = hz;
        self
    }

    pub fn with_error_rate(mut self, rate: f64) -> Self {
        self.error_rate = rate;
        self
    }

    pub fn with_noise_floor_ratio(mut self, ratio: f64) -> Self {
        self.noise_floor_ratio = ratio;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.min_peak_freq.is_finite() {
            return Err(Error::invalid(format!(
                "minimum peak frequency {}",
                self.min_peak_freq
            )));
        }
        if !(self.error_rate.is_finite() && self.error_rate >= 0.0) {
            return Err(Error::invalid(format!(
                "error rate {} must be >= 0",
                self.error_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.noise_floor_ratio) {
            return Err(Error::invalid(format!(
                "noise floor ratio {} must lie in [0, 1]",
                self.noise_floor_ratio
            )));
        }
        Ok(())
    }
}

/// The strongest bin of a spectrum, with ± error bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakResult {
    pub frequency: f64,
    pub magnitude: f64,
    pub frequency_error: f64,
    pub magnitude_error: f64,
    /// Index of the peak in [`Spectrum::frequencies`].
    pub bin: usize,
}

impl fmt::Display for PeakResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Peak Frequency = {:.2} ± {:.2} Hz, Peak Magnitude = {:.2} ± {:.2}",
            self.frequency, self.frequency_error, self.magnitude, self.magnitude_error
        )
    }
}

/// Find the largest-magnitude bin at a strictly positive frequency that is at
/// least `search.min_peak_freq`.
///
/// Ties go to the lowest frequency. Fails with [`Error::NoPeakFound`] when no
/// bin qualifies, or when the best one is silent or buried in the noise floor
/// of a stronger peak outside the search range.
pub fn find_peak(spectrum: &Spectrum, search: &PeakSearch) -> Result<PeakResult> {
    search.validate()?;
    let not_found = || Error::NoPeakFound {
        min_peak_freq: search.min_peak_freq,
    };

    let magnitudes = spectrum.magnitudes();
    let positive = || {
        spectrum
            .frequencies()
            .iter()
            .zip(&magnitudes)
            .enumerate()
            .filter(|(_, (freq, _))| **freq > 0.0)
    };

    let strongest = positive().map(|(_, (_, &mag))| mag).fold(0.0, f64::max);

    let mut best: Option<(usize, f64, f64)> = None;
    let floor = search.min_peak_freq;
    for (bin, (&freq, &mag)) in positive().filter(|(_, (freq, _))| **freq >= floor) {
        if best.map_or(true, |(_, _, best_mag)| mag > best_mag) {
            best = Some((bin, freq, mag));
        }
    }

    let (bin, frequency, magnitude) = best.ok_or_else(not_found)?;
    if magnitude <= 0.0 || magnitude.is_nan() || magnitude < search.noise_floor_ratio * strongest {
        log::debug!(
            "{frequency:.2} Hz ({magnitude:.3e}) is under the noise floor of {strongest:.3e}"
        );
        return Err(not_found());
    }

    Ok(PeakResult {
        frequency,
        magnitude,
        frequency_error: search.error_rate * frequency,
        magnitude_error: search.error_rate * magnitude,
        bin,
    })
}
