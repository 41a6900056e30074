//! Error type shared by every stage of the analysis.

use std::path::PathBuf;

/// Errors produced while loading, conditioning, analysing or reporting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A stage was handed a zero-length sample sequence.
    #[error("empty input: {0} received no samples")]
    EmptyInput(&'static str),

    /// A parameter makes no sense for the data it is applied to.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No spectral bin at or above the frequency floor carries a peak.
    #[error("no spectral peak found at or above {min_peak_freq} Hz")]
    NoPeakFound {
        /// Frequency floor the search was run with.
        min_peak_freq: f64,
    },

    /// WAV decoding or encoding failed.
    #[error("WAV file error for {}: {source}", .path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// The WAV encoding is valid but not something we decode.
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Batch configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The plot window could not be opened.
    #[error("plot error: {0}")]
    Plot(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
