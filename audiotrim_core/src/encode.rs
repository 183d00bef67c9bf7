use log::debug;
use tokio_util::sync::CancellationToken;

use crate::schedule::Checkpoint;
use crate::{
    AudioBuffer, AudioTrimError, EncoderConfig, Options, Phase, ProgressReporter, Quantizer,
};

/// A stateful streaming encoder instance.
///
/// An instance is opened for one [`EncoderConfig`], receives every block of a
/// single buffer in order and is consumed by [`EncoderBackend::flush`]. Each
/// call may return any number of bytes, including none; the bytes of all calls
/// concatenated in order form the output stream.
pub trait EncoderBackend: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn open(config: &EncoderConfig) -> Result<Self, Self::Error>;

    /// Encode one block. `channels` holds one slice per configured channel,
    /// all of the same length.
    fn encode_block(&mut self, channels: &[&[i16]]) -> Result<Vec<u8>, Self::Error>;

    /// Signal end of input and return any buffered trailing output.
    fn flush(self) -> Result<Vec<u8>, Self::Error>;
}

pub(crate) fn validate(buffer: &AudioBuffer, config: &EncoderConfig) -> Result<(), AudioTrimError> {
    if buffer.channel_count() == 0 {
        return Err(AudioTrimError::InvalidBuffer("buffer has no channels"));
    }
    if buffer.is_empty() {
        return Err(AudioTrimError::InvalidBuffer("buffer contains no frames"));
    }
    if config.channel_count == 0 {
        return Err(AudioTrimError::InvalidBuffer(
            "encoder must be configured for at least one channel",
        ));
    }
    if usize::from(config.channel_count) > buffer.channel_count() {
        return Err(AudioTrimError::InvalidBuffer(
            "buffer has fewer channels than the encoder configuration",
        ));
    }
    if config.sample_rate != buffer.sample_rate() {
        return Err(AudioTrimError::InvalidBuffer(
            "buffer sample rate differs from the encoder configuration",
        ));
    }
    Ok(())
}

/// Quantize `buffer` block by block and feed it through `encoder`.
///
/// Samples are dithered frame by frame, channel 0 before channel 1, so a fixed
/// seed yields identical blocks on every run. On error or cancellation the
/// encoder is dropped without being flushed.
pub(crate) async fn encode_in_blocks<E, R>(
    mut encoder: E,
    buffer: &AudioBuffer,
    config: &EncoderConfig,
    options: &Options,
    cancel: &CancellationToken,
    progress: &mut R,
) -> Result<Vec<u8>, AudioTrimError>
where
    E: EncoderBackend,
    R: ProgressReporter + ?Sized,
{
    validate(buffer, config)?;

    let frame_count = buffer.frame_count();
    let block_frames = options.block_frames().get();
    let sources: Vec<&[f32]> = buffer
        .channels()
        .take(usize::from(config.channel_count))
        .collect();
    debug!(
        "encoding {frame_count} frame(s) x {} channel(s) at {} Hz, {} kbps, blocks of {block_frames}",
        sources.len(),
        config.sample_rate,
        config.bitrate_kbps
    );

    let mut quantizer = Quantizer::new(options.dither(), options.seed());
    let mut blocks: Vec<Vec<i16>> = vec![Vec::with_capacity(block_frames); sources.len()];
    let mut checkpoint = Checkpoint::new(
        Phase::Converting,
        frame_count,
        options.yield_every().get(),
        cancel,
        progress,
    );
    let mut output = Vec::new();
    let mut fragments = 0usize;

    for (block_index, start) in (0..frame_count).step_by(block_frames).enumerate() {
        let end = (start + block_frames).min(frame_count);

        for block in &mut blocks {
            block.clear();
        }
        for frame in start..end {
            for (block, source) in blocks.iter_mut().zip(&sources) {
                block.push(quantizer.quantize(source[frame]));
            }
        }

        let views: Vec<&[i16]> = blocks.iter().map(Vec::as_slice).collect();
        let fragment = encoder
            .encode_block(&views)
            .map_err(AudioTrimError::encode_failure)?;
        if !fragment.is_empty() {
            output.extend_from_slice(&fragment);
            fragments += 1;
        }

        checkpoint.after_chunk(block_index, end).await?;
    }

    let tail = encoder.flush().map_err(AudioTrimError::encode_failure)?;
    if !tail.is_empty() {
        output.extend_from_slice(&tail);
        fragments += 1;
    }

    checkpoint.finish();
    debug!(
        "encoded {} byte(s) from {fragments} non-empty fragment(s)",
        output.len()
    );

    Ok(output)
}
