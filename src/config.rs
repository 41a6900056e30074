//! Batch configuration.
//!
//! A batch is a list of labelled recordings, each with an optional background
//! recording, plus the settings every job shares. It can be built in code or
//! loaded from TOML:
//!
//! ```toml
//! background = "Background Final.wav"
//!
//! [conditioning]
//! trim_start_seconds = 0.5
//!
//! [peak]
//! min_peak_freq = 100.0
//!
//! [[job]]
//! label = "Oak Spectrum"
//! recording = "oak quarter.wav"
//!
//! [[job]]
//! label = "Ash Spectrum"
//! recording = "ash quarter.wav"
//! background = "ash background.wav"
//! ```
//!
//! Relative paths in a loaded file are resolved against the file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::condition::ConditionConfig;
use crate::error::{Error, Result};
use crate::peak::PeakSearch;
use crate::wav::SampleScale;

/// Settings shared by every job of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub scale: SampleScale,
    pub conditioning: ConditionConfig,
    pub peak: PeakSearch,
}

/// One recording to analyse.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisJob {
    /// Title used in reports and plots.
    pub label: String,
    pub recording: PathBuf,
    /// Overrides the batch-wide background for this job.
    #[serde(default)]
    pub background: Option<PathBuf>,
}

impl AnalysisJob {
    pub fn new(label: impl Into<String>, recording: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            recording: recording.into(),
            background: None,
        }
    }

    pub fn with_background(mut self, background: impl Into<PathBuf>) -> Self {
        self.background = Some(background.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Background recording for jobs that don't name their own.
    pub background: Option<PathBuf>,
    #[serde(flatten)]
    pub settings: AnalysisSettings,
    #[serde(rename = "job")]
    pub jobs: Vec<AnalysisJob>,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: AnalysisSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_background(mut self, background: impl Into<PathBuf>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_job(mut self, job: AnalysisJob) -> Self {
        self.jobs.push(job);
        self
    }

    /// Background to subtract for `job`, if any.
    pub fn background_for<'a>(&'a self, job: &'a AnalysisJob) -> Option<&'a Path> {
        job.background.as_deref().or(self.background.as_deref())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid batch file: {e}")))
    }

    /// Load a batch file, resolving relative paths against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        log::debug!("{} job(s) in {}", config.jobs.len(), path.display());
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(background) = self.background.as_mut() {
            resolve(background);
        }
        for job in &mut self.jobs {
            resolve(&mut job.recording);
            if let Some(background) = job.background.as_mut() {
                resolve(background);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config = BatchConfig::from_toml_str(
            r#"
            background = "bg.wav"
            scale = "full_scale"

            [conditioning]
            trim_start_seconds = 0.5
            highpass_cutoff_hz = 3000.0

            [peak]
            error_rate = 0.1

            [[job]]
            label = "Oak Spectrum"
            recording = "oak.wav"

            [[job]]
            label = "Ash Spectrum"
            recording = "ash.wav"
            background = "ash-bg.wav"
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.scale, SampleScale::FullScale);
        assert_eq!(config.settings.conditioning.trim_start_seconds, 0.5);
        assert_eq!(config.settings.conditioning.highpass_cutoff_hz, 3000.0);
        assert_eq!(config.settings.conditioning.highpass_order, 5);
        assert_eq!(config.settings.peak.error_rate, 0.1);
        assert_eq!(config.settings.peak.min_peak_freq, 100.0);
        assert_eq!(config.jobs.len(), 2);
        assert_eq!(
            config.background_for(&config.jobs[0]),
            Some(Path::new("bg.wav"))
        );
        assert_eq!(
            config.background_for(&config.jobs[1]),
            Some(Path::new("ash-bg.wav"))
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = BatchConfig::from_toml_str("").unwrap();
        assert_eq!(config, BatchConfig::default());
        assert_eq!(config.settings.conditioning.highpass_cutoff_hz, 4000.0);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = BatchConfig::from_toml_str("[[job]]\nlabel = 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("batch.toml");
        std::fs::write(
            &file,
            "background = \"bg.wav\"\n[[job]]\nlabel = \"Beech\"\nrecording = \"/abs/beech.wav\"\n",
        )
        .unwrap();

        let config = BatchConfig::load(&file).unwrap();
        assert_eq!(config.background, Some(dir.path().join("bg.wav")));
        assert_eq!(config.jobs[0].recording, PathBuf::from("/abs/beech.wav"));
    }

    #[test]
    fn builder_collects_jobs() {
        let ash = AnalysisJob::new("Ash", "ash.wav").with_background("other.wav");
        let config = BatchConfig::new()
            .with_background("bg.wav")
            .with_job(AnalysisJob::new("Oak", "oak.wav"))
            .with_job(ash);
        assert_eq!(config.jobs.len(), 2);
        assert_eq!(
            config.background_for(&config.jobs[1]),
            Some(Path::new("other.wav"))
        );
    }
}
