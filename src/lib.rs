//! Offline acoustic spectrum analysis.
//!
//! A recording goes through [`condition`](condition::condition) (background
//! subtraction, trim, mono mix, DC removal, Hamming window, Butterworth
//! high-pass), then [`analyze`](spectrum::analyze) and
//! [`find_peak`](peak::find_peak). Finished analyses are handed to a
//! [`ReportSink`](report::ReportSink): a text line, a plot window, or both.
//!
//! ```no_run
//! use tonewood::{analyze_recording, read_wav_file, AnalysisSettings, SampleScale};
//!
//! let recording = read_wav_file("oak.wav", SampleScale::Raw)?;
//! let background = read_wav_file("background.wav", SampleScale::Raw)?;
//! let (spectrum, peak) =
//!     analyze_recording(recording, Some(background), &AnalysisSettings::default())?;
//! println!("{} bins, {peak}", spectrum.len());
//! # Ok::<(), tonewood::Error>(())
//! ```

use smallvec::SmallVec;

pub mod batch;
pub mod condition;
pub mod config;
pub mod error;
pub mod filter;
pub mod peak;
pub mod plot;
pub mod report;
pub mod spectrum;
pub mod wav;

/// One sample vector per channel.
pub type AudioData = SmallVec<[Vec<f64>; 2]>;

pub use batch::{analyze_recording, run_batch, run_job, Analysis, BatchSummary, FailurePolicy};
pub use condition::{condition, ConditionConfig};
pub use config::{AnalysisJob, AnalysisSettings, BatchConfig};
pub use error::{Error, Result};
pub use peak::{find_peak, PeakResult, PeakSearch};
pub use plot::SpectrumPlot;
pub use report::{ReportSink, TextReport};
pub use spectrum::{analyze, Spectrum};
pub use wav::{read_wav_file, write_wav_file, Recording, SampleScale};
