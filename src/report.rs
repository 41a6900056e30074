//! Report sinks: where finished analyses go.

use std::io::{self, Write};

use crate::error::Result;
use crate::peak::PeakResult;

/// Receives one finished analysis at a time.
///
/// `frequencies` and `magnitudes` cover every bin of the spectrum, in FFT
/// order; `peak` is the result of the peak search over them.
pub trait ReportSink {
    fn report(
        &mut self,
        label: &str,
        frequencies: &[f64],
        magnitudes: &[f64],
        peak: &PeakResult,
    ) -> Result<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn report(
        &mut self,
        label: &str,
        frequencies: &[f64],
        magnitudes: &[f64],
        peak: &PeakResult,
    ) -> Result<()> {
        (**self).report(label, frequencies, magnitudes, peak)
    }
}

/// Send every report to both sinks, first `A` then `B`.
impl<A: ReportSink, B: ReportSink> ReportSink for (A, B) {
    fn report(
        &mut self,
        label: &str,
        frequencies: &[f64],
        magnitudes: &[f64],
        peak: &PeakResult,
    ) -> Result<()> {
        self.0.report(label, frequencies, magnitudes, peak)?;
        self.1.report(label, frequencies, magnitudes, peak)
    }
}

/// One summary line per analysis:
///
/// `For Oak Spectrum: Peak Frequency = 5123.00 ± 256.15 Hz, Peak Magnitude = ...`
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextReport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn report(
        &mut self,
        label: &str,
        _frequencies: &[f64],
        _magnitudes: &[f64],
        peak: &PeakResult,
    ) -> Result<()> {
        writeln!(self.out, "For {label}: {peak}")?;
        self.out.flush()?;
        Ok(())
    }
}
