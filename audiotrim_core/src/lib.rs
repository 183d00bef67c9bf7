//! Trim a decoded audio buffer to a time range and stream it through a lossy
//! encoder without monopolising the host executor.
//!
//! The two stages, [`Pipeline::trim`] and [`Pipeline::encode`], work in fixed
//! size chunks, suspend every few chunks so other tasks can run, report
//! [`ProgressEvent`]s and honour a [`CancellationToken`] at each suspension
//! point.

mod buffer;
mod config;
mod encode;
#[cfg(feature = "mp3")]
mod mp3;
mod pipeline;
mod progress;
mod quantize;
mod range;
mod schedule;
mod source;
mod trim;

use std::time::Duration;

use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

pub use buffer::AudioBuffer;
pub use config::{EncoderConfig, Options, OptionsBuilder, DEFAULT_BITRATE_KBPS};
pub use encode::EncoderBackend;
#[cfg(feature = "mp3")]
pub use mp3::{Mp3Encoder, Mp3Error, SUPPORTED_BITRATES_KBPS};
pub use pipeline::Pipeline;
pub use progress::{NoProgress, Phase, ProgressEvent, ProgressReporter};
pub use quantize::{quantize_sample, Dither, Quantizer, FULL_SCALE};
pub use range::{format_timestamp, TimeRange};
pub use source::{load_audio, LoadLimits, SUPPORTED_EXTENSIONS};
pub use tokio_util::sync::CancellationToken;

/// Boxed error produced by an [`EncoderBackend`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading, trimming or encoding audio.
#[derive(Debug, Error)]
pub enum AudioTrimError {
    /// The requested time range is empty, reversed or outside the buffer.
    #[error("invalid time range: {0}")]
    InvalidRange(String),

    /// The buffer handed to the encoder is empty, channel-less or does not
    /// match the encoder configuration.
    #[error("invalid audio buffer: {0}")]
    InvalidBuffer(&'static str),

    /// The encoder rejected its configuration, a block or the final flush.
    #[error("failed to encode audio: {0}")]
    EncodeFailure(#[source] BoxError),

    /// Cancellation was observed at a suspension point.
    #[error("operation was cancelled")]
    Cancelled,

    /// Wrapper around errors produced by the Symphonia decoding library.
    #[error(transparent)]
    Symphonia(#[from] SymphoniaError),

    /// Wrapper around IO errors encountered while reading the source file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The source is not an MP3 or WAV file.
    #[error("unsupported input format; expected an MP3 or WAV file")]
    UnsupportedFormat,

    /// The source file exceeds the configured size limit.
    #[error("input file is {size} bytes, which exceeds the limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// The decoded audio exceeds the configured duration limit.
    #[error("input audio is longer than the limit of {}s", .limit.as_secs())]
    DurationTooLong { limit: Duration },

    /// Error returned when the container does not expose any default track.
    #[error("input stream does not provide a default track")]
    MissingDefaultTrack,

    /// Error returned when the decoder track lacks a sample rate.
    #[error("input stream does not advertise a sample rate")]
    MissingSampleRate,

    /// Error returned when the codec of the track cannot be handled.
    #[error("unsupported codec")]
    UnsupportedCodec,

    /// The source decoded to zero frames.
    #[error("input stream contains no audio")]
    NoAudio,
}

impl AudioTrimError {
    pub(crate) fn encode_failure<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AudioTrimError::EncodeFailure(Box::new(err))
    }
}

/// Trim `buffer` to `range` with default [`Options`] and no progress reporting.
pub async fn trim(buffer: &AudioBuffer, range: TimeRange) -> Result<AudioBuffer, AudioTrimError> {
    Pipeline::default().trim(buffer, range, &mut NoProgress).await
}

/// Encode `buffer` to MP3 with default [`Options`] and no progress reporting.
#[cfg(feature = "mp3")]
pub async fn encode(buffer: &AudioBuffer, config: &EncoderConfig) -> Result<Vec<u8>, AudioTrimError> {
    Pipeline::default()
        .encode::<Mp3Encoder, _>(buffer, config, &mut NoProgress)
        .await
}
