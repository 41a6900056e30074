//! Batch runs over WAV files written to a temporary directory.

use std::f64::consts::PI;
use std::path::Path;

use smallvec::smallvec as svec;
use tonewood::{
    read_wav_file, run_batch, write_wav_file, AnalysisJob, BatchConfig, Error, FailurePolicy,
    PeakResult, ReportSink, SampleScale, TextReport,
};

const RATE: u32 = 22050;

/// Keeps what it was given so tests can inspect it.
#[derive(Default)]
struct Collect {
    reports: Vec<(String, usize, PeakResult)>,
}

impl ReportSink for Collect {
    fn report(
        &mut self,
        label: &str,
        frequencies: &[f64],
        magnitudes: &[f64],
        peak: &PeakResult,
    ) -> tonewood::Result<()> {
        assert_eq!(frequencies.len(), magnitudes.len());
        self.reports.push((label.to_string(), frequencies.len(), *peak));
        Ok(())
    }
}

fn write_tone(path: &Path, freq_hz: f64, hum: &[f64]) {
    let step = 2.0 * PI * freq_hz / RATE as f64;
    let samples: Vec<f64> = hum
        .iter()
        .enumerate()
        .map(|(i, h)| 0.5 * (step * i as f64).sin() + h)
        .collect();
    write_wav_file(path, RATE, &svec![samples]).unwrap();
}

fn hum(len: usize) -> Vec<f64> {
    let step = 2.0 * PI * 6000.0 / RATE as f64;
    (0..len).map(|i| 0.25 * (step * i as f64).sin()).collect()
}

#[test]
fn batch_reports_every_job() {
    let dir = tempfile::tempdir().unwrap();
    let hum = hum(11025);
    write_wav_file(dir.path().join("background.wav"), RATE, &svec![hum.clone()]).unwrap();
    write_tone(&dir.path().join("oak.wav"), 5000.0, &hum);
    write_tone(&dir.path().join("ash.wav"), 8000.0, &hum);

    let config = BatchConfig::new()
        .with_background(dir.path().join("background.wav"))
        .with_job(AnalysisJob::new("Oak Spectrum", dir.path().join("oak.wav")))
        .with_job(AnalysisJob::new("Ash Spectrum", dir.path().join("ash.wav")));

    let mut sink = Collect::default();
    let summary = run_batch(&config, FailurePolicy::Abort, &mut sink).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.completed, vec!["Oak Spectrum", "Ash Spectrum"]);
    assert_eq!(sink.reports.len(), 2);

    // The 6 kHz hum lives in the background file and must not win.
    let (label, bins, oak) = &sink.reports[0];
    assert_eq!(label, "Oak Spectrum");
    assert_eq!(*bins, 11025);
    assert!((oak.frequency - 5000.0).abs() <= 2.0, "{}", oak.frequency);
    let (_, _, ash) = &sink.reports[1];
    assert!((ash.frequency - 8000.0).abs() <= 2.0, "{}", ash.frequency);
}

#[test]
fn skip_policy_records_failures_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("beech.wav"), 7000.0, &vec![0.0; 4096]);

    let config = BatchConfig::new()
        .with_job(AnalysisJob::new("Missing", dir.path().join("missing.wav")))
        .with_job(AnalysisJob::new("Beech", dir.path().join("beech.wav")));

    let mut sink = Collect::default();
    let summary = run_batch(&config, FailurePolicy::Skip, &mut sink).unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.completed, vec!["Beech"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "Missing");
    assert!(matches!(summary.failed[0].1, Error::Wav { .. }));
    assert_eq!(sink.reports.len(), 1);
}

#[test]
fn abort_policy_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("oak.wav"), 5000.0, &vec![0.0; 4096]);

    let mut config = BatchConfig::new()
        .with_job(AnalysisJob::new("Oak", dir.path().join("oak.wav")))
        .with_job(AnalysisJob::new("Ash", dir.path().join("oak.wav")));
    // Nothing can sit above Nyquist.
    config.settings.peak.min_peak_freq = 20000.0;

    let mut sink = Collect::default();
    let err = run_batch(&config, FailurePolicy::Abort, &mut sink).unwrap_err();
    assert!(matches!(err, Error::NoPeakFound { .. }));
    assert!(sink.reports.is_empty());
}

#[test]
fn toml_batch_with_text_report() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("oak.wav"), 5000.0, &vec![0.0; 11025]);
    let file = dir.path().join("batch.toml");
    std::fs::write(
        &file,
        r#"
        [peak]
        error_rate = 0.1

        [[job]]
        label = "Oak Spectrum"
        recording = "oak.wav"
        "#,
    )
    .unwrap();

    let config = BatchConfig::load(&file).unwrap();
    let mut text = TextReport::new(Vec::new());
    run_batch(&config, FailurePolicy::Abort, &mut text).unwrap();

    let out = String::from_utf8(text.into_inner()).unwrap();
    let expected = "For Oak Spectrum: Peak Frequency = 5000.00 ± 500.00 Hz, Peak Magnitude = ";
    assert!(out.starts_with(expected), "{out}");
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn written_recording_reads_back_at_full_scale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_tone(&path, 1000.0, &vec![0.0; 512]);

    let rec = read_wav_file(&path, SampleScale::FullScale).unwrap();
    assert_eq!(rec.sample_rate, RATE);
    assert_eq!(rec.frames(), 512);
    assert!(rec.channels[0].iter().all(|s| s.abs() <= 0.5 + 1e-6));
}
