//! Run a list of analyses and hand each result to a report sink.

use std::path::Path;

use crate::condition::condition;
use crate::config::{AnalysisJob, AnalysisSettings, BatchConfig};
use crate::error::{Error, Result};
use crate::peak::{find_peak, PeakResult};
use crate::report::ReportSink;
use crate::spectrum::{analyze, Spectrum};
use crate::wav::{read_wav_file, Recording};

/// What a batch does when one job fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log a warning, remember the failure and carry on with the next job.
    #[default]
    Skip,
    /// Stop at the first failure and return its error.
    Abort,
}

/// A finished analysis of one recording.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub label: String,
    pub spectrum: Spectrum,
    pub peak: PeakResult,
}

impl Analysis {
    /// Pass this analysis on to `sink`.
    pub fn report_to<S: ReportSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.report(
            &self.label,
            self.spectrum.frequencies(),
            &self.spectrum.magnitudes(),
            &self.peak,
        )
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub completed: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Condition, transform and search one in-memory recording.
pub fn analyze_recording(
    recording: Recording,
    background: Option<Recording>,
    settings: &AnalysisSettings,
) -> Result<(Spectrum, PeakResult)> {
    let rate = recording.sample_rate;
    if let Some(bg) = &background {
        if bg.sample_rate != rate {
            log::warn!(
                "background is {} Hz but recording is {} Hz; subtracting anyway",
                bg.sample_rate,
                rate
            );
        }
    }

    let conditioned = condition(
        recording.channels,
        rate,
        background.map(|bg| bg.channels),
        &settings.conditioning,
    )?;
    let spectrum = analyze(conditioned, rate)?;
    let peak = find_peak(&spectrum, &settings.peak)?;
    Ok((spectrum, peak))
}

/// Load the job's recording (and background) from disk and analyse it.
pub fn run_job(
    job: &AnalysisJob,
    background: Option<&Path>,
    settings: &AnalysisSettings,
) -> Result<Analysis> {
    log::info!("analysing {} ({})", job.label, job.recording.display());
    let recording = read_wav_file(&job.recording, settings.scale)?;
    let background = background
        .map(|path| read_wav_file(path, settings.scale))
        .transpose()?;

    let (spectrum, peak) = analyze_recording(recording, background, settings)?;
    Ok(Analysis {
        label: job.label.clone(),
        spectrum,
        peak,
    })
}

/// Run every job of `config` in order, reporting each success to `sink`.
///
/// With [`FailurePolicy::Abort`] the first failing job's error is returned;
/// with [`FailurePolicy::Skip`] failures are collected in the summary.
pub fn run_batch<S: ReportSink + ?Sized>(
    config: &BatchConfig,
    policy: FailurePolicy,
    sink: &mut S,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for job in &config.jobs {
        let outcome = run_job(job, config.background_for(job), &config.settings)
            .and_then(|analysis| analysis.report_to(sink));

        match outcome {
            Ok(()) => summary.completed.push(job.label.clone()),
            Err(err) => match policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::Skip => {
                    log::warn!("skipping {}: {err}", job.label);
                    summary.failed.push((job.label.clone(), err));
                }
            },
        }
    }

    log::info!(
        "batch finished: {} completed, {} failed",
        summary.completed.len(),
        summary.failed.len()
    );
    Ok(summary)
}
