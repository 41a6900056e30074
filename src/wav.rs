//! WAV audio source and writer.
//!
//! Recordings are decoded channel-major into [`AudioData`]. Integer PCM is
//! kept in its raw units by default, the way most measurement notebooks see
//! it; [`SampleScale::FullScale`] maps it into `[-1, 1)` instead.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::Deserialize;
use smallvec::smallvec as svec;

use crate::error::{Error, Result};
use crate::AudioData;

/// How integer PCM samples are mapped to `f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleScale {
    /// Keep the decoded integer value (a 16-bit sample stays within ±32768).
    #[default]
    Raw,
    /// Divide by `2^(bits - 1)`.
    FullScale,
}

/// A decoded recording: sample rate plus one sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub sample_rate: u32,
    pub channels: AudioData,
}

impl Recording {
    pub fn new(sample_rate: u32, channels: AudioData) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

pub fn read_wav_file<P: AsRef<Path>>(path: P, scale: SampleScale) -> Result<Recording> {
    let path = path.as_ref();
    let wav_err = |source| Error::Wav {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();
    log::debug!("{}: {:?}", path.display(), spec);

    let num_channels = spec.channels as usize;
    if num_channels == 0 {
        return Err(Error::UnsupportedFormat(format!(
            "{} declares zero channels",
            path.display()
        )));
    }

    let full_scale = match scale {
        SampleScale::Raw => 1.0,
        SampleScale::FullScale => (1u64 << (spec.bits_per_sample.max(1) - 1)) as f64,
    };

    let channels = match spec.sample_format {
        SampleFormat::Int => match spec.bits_per_sample {
            8 => deinterleave::<_, i8>(&mut reader, num_channels, full_scale),
            16 => deinterleave::<_, i16>(&mut reader, num_channels, full_scale),
            24 | 32 => deinterleave::<_, i32>(&mut reader, num_channels, full_scale),
            bits => {
                return Err(Error::UnsupportedFormat(format!(
                    "{bits}-bit integer PCM in {}",
                    path.display()
                )));
            }
        },
        SampleFormat::Float => deinterleave::<_, f32>(&mut reader, num_channels, 1.0),
    }
    .map_err(wav_err)?;

    let recording = Recording::new(spec.sample_rate, channels);
    log::debug!(
        "{}: {} channel(s), {} frames, {:.3} s",
        path.display(),
        recording.channel_count(),
        recording.frames(),
        recording.duration_secs()
    );
    Ok(recording)
}

fn deinterleave<R, S>(
    reader: &mut WavReader<R>,
    num_channels: usize,
    full_scale: f64,
) -> std::result::Result<AudioData, hound::Error>
where
    R: std::io::Read,
    S: hound::Sample + Into<f64>,
{
    let mut data: AudioData = svec![];
    for _ in 0..num_channels {
        data.push(Vec::with_capacity(reader.duration() as usize));
    }

    for (sample_count, result) in reader.samples::<S>().enumerate() {
        let sample: f64 = result?.into();
        data[sample_count % num_channels].push(sample / full_scale);
    }

    Ok(data)
}

/// Write `channels` as a 32-bit float WAV file.
///
/// Every channel must hold the same number of samples.
pub fn write_wav_file<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    channels: &AudioData,
) -> Result<()> {
    let path = path.as_ref();
    let wav_err = |source| Error::Wav {
        path: path.to_path_buf(),
        source,
    };

    if channels.is_empty() {
        return Err(Error::EmptyInput("WAV writer"));
    }
    let frames = channels[0].len();
    if channels.iter().any(|c| c.len() != frames) {
        return Err(Error::invalid("all channels must have the same length"));
    }
    let channel_count = u16::try_from(channels.len())
        .map_err(|_| Error::invalid(format!("{} channels", channels.len())))?;

    let spec = WavSpec {
        channels: channel_count,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for i in 0..frames {
        for channel in channels.iter() {
            writer.write_sample(channel[i] as f32).map_err(wav_err)?;
        }
    }
    writer.finalize().map_err(wav_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_round_trip_keeps_channel_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let data: AudioData = svec![vec![0.25, -0.5, 0.75], vec![-0.125, 0.0, 1.0]];

        write_wav_file(&path, 8000, &data).unwrap();
        let rec = read_wav_file(&path, SampleScale::Raw).unwrap();

        assert_eq!(rec.sample_rate, 8000);
        assert_eq!(rec.channel_count(), 2);
        assert_eq!(rec.frames(), 3);
        assert_eq!(rec.channels[0], vec![0.25, -0.5, 0.75]);
        assert_eq!(rec.channels[1], vec![-0.125, 0.0, 1.0]);
    }

    #[test]
    fn int16_raw_and_full_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcm16.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for s in [0i16, 16384, -32768] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let raw = read_wav_file(&path, SampleScale::Raw).unwrap();
        assert_eq!(raw.channels[0], vec![0.0, 16384.0, -32768.0]);

        let scaled = read_wav_file(&path, SampleScale::FullScale).unwrap();
        assert_eq!(scaled.channels[0], vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_wav_file("/nonexistent/recording.wav", SampleScale::Raw).unwrap_err();
        assert!(err.to_string().contains("recording.wav"));
    }

    #[test]
    fn ragged_channels_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data: AudioData = svec![vec![0.0; 4], vec![0.0; 3]];
        let err = write_wav_file(dir.path().join("x.wav"), 8000, &data).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }
}
