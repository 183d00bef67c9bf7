use log::debug;
use tokio_util::sync::CancellationToken;

use crate::encode::{encode_in_blocks, validate};
use crate::trim::trim_in_chunks;
use crate::{
    AudioBuffer, AudioTrimError, EncoderBackend, EncoderConfig, Options, ProgressReporter,
    TimeRange,
};

/// Trim-and-encode pipeline bound to one set of [`Options`] and one
/// cancellation token.
///
/// Cancelling the token makes the operation currently in flight fail with
/// [`AudioTrimError::Cancelled`] at its next suspension point. A cancelled
/// pipeline stays cancelled; build a new one for the next operation.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    options: Options,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(options: Options) -> Self {
        Self::with_cancellation(options, CancellationToken::new())
    }

    pub fn with_cancellation(options: Options, cancel: CancellationToken) -> Self {
        Self { options, cancel }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Handle the host can use to cancel operations run by this pipeline.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Copy `range` out of `buffer` into a new buffer with the same channel
    /// count and sample rate.
    pub async fn trim<R>(
        &self,
        buffer: &AudioBuffer,
        range: TimeRange,
        progress: &mut R,
    ) -> Result<AudioBuffer, AudioTrimError>
    where
        R: ProgressReporter + ?Sized,
    {
        trim_in_chunks(buffer, range, &self.options, &self.cancel, progress).await
    }

    /// Open a fresh `E` for `config` and encode `buffer` with it.
    pub async fn encode<E, R>(
        &self,
        buffer: &AudioBuffer,
        config: &EncoderConfig,
        progress: &mut R,
    ) -> Result<Vec<u8>, AudioTrimError>
    where
        E: EncoderBackend,
        R: ProgressReporter + ?Sized,
    {
        validate(buffer, config)?;
        let encoder = E::open(config).map_err(AudioTrimError::encode_failure)?;
        self.encode_with(encoder, buffer, config, progress).await
    }

    /// Encode `buffer` with an encoder instance the caller has already opened
    /// for `config`. The instance is consumed.
    pub async fn encode_with<E, R>(
        &self,
        encoder: E,
        buffer: &AudioBuffer,
        config: &EncoderConfig,
        progress: &mut R,
    ) -> Result<Vec<u8>, AudioTrimError>
    where
        E: EncoderBackend,
        R: ProgressReporter + ?Sized,
    {
        encode_in_blocks(encoder, buffer, config, &self.options, &self.cancel, progress).await
    }

    /// Trim `buffer` to `range` and encode the result at `bitrate_kbps`,
    /// reporting both phases to `progress`.
    pub async fn run<E, R>(
        &self,
        buffer: &AudioBuffer,
        range: TimeRange,
        bitrate_kbps: u32,
        progress: &mut R,
    ) -> Result<Vec<u8>, AudioTrimError>
    where
        E: EncoderBackend,
        R: ProgressReporter + ?Sized,
    {
        let trimmed = self.trim(buffer, range, progress).await?;
        let config = EncoderConfig::for_buffer(&trimmed, bitrate_kbps);
        let bytes = self.encode::<E, R>(&trimmed, &config, progress).await?;
        debug!(
            "pipeline produced {} byte(s) for {:.3}s of audio",
            bytes.len(),
            trimmed.duration_secs()
        );
        Ok(bytes)
    }
}
