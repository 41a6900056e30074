//! Signal conditioning: everything that happens to a recording before it is
//! transformed.
//!
//! [`condition`] runs the stages in a fixed order, each feeding the next:
//!
//! 1. background removal (truncate to the shorter recording, subtract)
//! 2. start trim
//! 3. channel collapse to mono
//! 4. DC-offset removal
//! 5. Hamming window
//! 6. Butterworth high-pass
//!
//! Every stage is also public on its own.

use std::f64::consts::PI;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::filter::butter_highpass;
use crate::AudioData;

/// Conditioning parameters.
///
/// The defaults reproduce the tuning used for wood resonance recordings:
/// no trim, 5th order high-pass at 4 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConditionConfig {
    /// Seconds dropped from the start of the recording after background removal.
    pub trim_start_seconds: f64,
    pub highpass_cutoff_hz: f64,
    pub highpass_order: usize,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            trim_start_seconds: 0.0,
            highpass_cutoff_hz: 4000.0,
            highpass_order: 5,
        }
    }
}

impl ConditionConfig {
    pub fn with_trim_start(mut self, seconds: f64) -> Self {
        self.trim_start_seconds = seconds;
        self
    }

    pub fn with_highpass(mut self, cutoff_hz: f64, order: usize) -> Self {
        self.highpass_cutoff_hz = cutoff_hz;
        self.highpass_order = order;
        self
    }
}

/// Turn a raw (possibly multi-channel) recording into analysis-ready mono samples.
pub fn condition(
    samples: AudioData,
    rate: u32,
    background: Option<AudioData>,
    config: &ConditionConfig,
) -> Result<Vec<f64>> {
    if rate == 0 {
        return Err(Error::invalid("sample rate must be positive"));
    }
    if !(config.trim_start_seconds.is_finite() && config.trim_start_seconds >= 0.0) {
        return Err(Error::invalid(format!(
            "trim duration {} s must be a non-negative number",
            config.trim_start_seconds
        )));
    }
    if frame_count(&samples) == 0 {
        return Err(Error::EmptyInput("signal conditioner"));
    }

    let samples = match background {
        Some(background) => remove_background(samples, background)?,
        None => samples,
    };
    let samples = trim_start(samples, rate, config.trim_start_seconds);

    let mut mono = collapse_channels(samples);
    if mono.is_empty() {
        return Err(Error::EmptyInput("signal conditioner"));
    }

    remove_dc_offset(&mut mono);
    apply_hamming(&mut mono);

    if config.highpass_order >= mono.len() {
        return Err(Error::invalid(format!(
            "filter order {} needs more than {} samples",
            config.highpass_order,
            mono.len()
        )));
    }
    let highpass = butter_highpass(
        config.highpass_order,
        config.highpass_cutoff_hz,
        rate as f64,
    )?;
    log::debug!(
        "conditioned {} samples at {} Hz (high-pass {} Hz, order {})",
        mono.len(),
        rate,
        config.highpass_cutoff_hz,
        config.highpass_order
    );
    Ok(highpass.filter(&mono))
}

fn frame_count(data: &AudioData) -> usize {
    data.iter().map(Vec::len).min().unwrap_or(0)
}

/// Subtract `background` from `samples` over their common prefix.
///
/// Both recordings are truncated to the shorter frame count; no alignment is
/// attempted. A mono background is subtracted from every channel, otherwise
/// the channel counts have to agree.
pub fn remove_background(samples: AudioData, background: AudioData) -> Result<AudioData> {
    if background.len() != 1 && background.len() != samples.len() {
        return Err(Error::invalid(format!(
            "background has {} channels, recording has {}",
            background.len(),
            samples.len()
        )));
    }
    let len = frame_count(&samples).min(frame_count(&background));
    log::debug!("subtracting background over {len} frames");

    Ok(samples
        .into_iter()
        .enumerate()
        .map(|(ch, mut channel)| {
            let noise = &background[if background.len() == 1 { 0 } else { ch }];
            channel.truncate(len);
            for (s, n) in channel.iter_mut().zip(noise) {
                *s -= n;
            }
            channel
        })
        .collect())
}

/// Drop the first `seconds * rate` frames.
///
/// A trim longer than the recording is skipped. One of exactly the
/// recording's length leaves every channel empty.
pub fn trim_start(mut samples: AudioData, rate: u32, seconds: f64) -> AudioData {
    if seconds <= 0.0 {
        return samples;
    }
    let trim = (seconds * rate as f64).floor() as usize;
    let frames = frame_count(&samples);
    if trim > frames {
        log::warn!(
            "trim of {seconds} s ({trim} frames) exceeds the {frames} available, skipping"
        );
        return samples;
    }
    for channel in samples.iter_mut() {
        channel.drain(..trim);
    }
    samples
}

/// Average all channels per sample index.
pub fn collapse_channels(samples: AudioData) -> Vec<f64> {
    let channels = samples.len();
    if channels <= 1 {
        return samples.into_iter().next().unwrap_or_default();
    }
    let frames = frame_count(&samples);
    let count = channels as f64;
    (0..frames)
        .map(|i| samples.iter().map(|c| c[i]).sum::<f64>() / count)
        .collect()
}

/// Centre the sequence on zero.
pub fn remove_dc_offset(samples: &mut [f64]) {
    if samples.is_empty() {
        return;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    for sample in samples.iter_mut() {
        *sample -= mean;
    }
}

/// Symmetric Hamming window, `0.54 - 0.46 cos(2πn / (N - 1))`.
pub fn hamming_window(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / denom).cos())
                .collect()
        }
    }
}

pub fn apply_hamming(samples: &mut [f64]) {
    let window = hamming_window(samples.len());
    for (sample, w) in samples.iter_mut().zip(window) {
        *sample *= w;
    }
}
