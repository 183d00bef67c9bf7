use log::debug;
use tokio_util::sync::CancellationToken;

use crate::schedule::Checkpoint;
use crate::{AudioBuffer, AudioTrimError, Options, Phase, ProgressReporter, TimeRange};

/// Copy `range` out of every channel of `buffer`, one chunk at a time.
///
/// Channels are copied in order, each from its first chunk to its last. The
/// chunk counter runs across channels so the suspension cadence does not
/// restart per channel, and progress is the share of all samples copied.
pub(crate) async fn trim_in_chunks<R>(
    buffer: &AudioBuffer,
    range: TimeRange,
    options: &Options,
    cancel: &CancellationToken,
    progress: &mut R,
) -> Result<AudioBuffer, AudioTrimError>
where
    R: ProgressReporter + ?Sized,
{
    let frames = range.frames(buffer)?;
    let length = frames.len();
    let chunk_frames = options.chunk_frames().get();
    debug!(
        "trimming frames {}..{} of {} channel(s) in chunks of {chunk_frames}",
        frames.start,
        frames.end,
        buffer.channel_count()
    );

    let total = length * buffer.channel_count();
    let mut checkpoint = Checkpoint::new(
        Phase::Trimming,
        total,
        options.yield_every().get(),
        cancel,
        progress,
    );

    let mut trimmed = Vec::with_capacity(buffer.channel_count());
    let mut copied = 0usize;
    let mut chunk_index = 0usize;

    for source in buffer.channels() {
        let mut channel = Vec::with_capacity(length);
        for chunk in source[frames.clone()].chunks(chunk_frames) {
            channel.extend_from_slice(chunk);
            copied += chunk.len();
            checkpoint.after_chunk(chunk_index, copied).await?;
            chunk_index += 1;
        }
        trimmed.push(channel);
    }

    checkpoint.finish();
    debug!("trimmed {length} frame(s) per channel in {chunk_index} chunk(s)");

    Ok(AudioBuffer::from_parts(trimmed, buffer.sample_rate()))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::{NoProgress, ProgressEvent};

    fn ramp(channels: usize, frames: usize, rate: u32) -> AudioBuffer {
        let data = (0..channels)
            .map(|channel| {
                (0..frames)
                    .map(|frame| (channel * frames + frame) as f32 / 1_000.0)
                    .collect()
            })
            .collect();
        AudioBuffer::from_channels(data, rate).unwrap()
    }

    fn options(chunk: usize) -> Options {
        Options::builder()
            .chunk_frames(NonZeroUsize::new(chunk).unwrap())
            .build()
    }

    #[tokio::test]
    async fn copies_each_channel_without_mixing() {
        let buffer = ramp(2, 100, 100);
        let cancel = CancellationToken::new();
        let trimmed = trim_in_chunks(
            &buffer,
            TimeRange::new(0.25, 0.75),
            &options(7),
            &cancel,
            &mut NoProgress,
        )
        .await
        .unwrap();

        assert_eq!(trimmed.channel_count(), 2);
        assert_eq!(trimmed.sample_rate(), 100);
        assert_eq!(trimmed.frame_count(), 50);
        for channel in 0..2 {
            assert_eq!(
                trimmed.channel(channel).unwrap(),
                &buffer.channel(channel).unwrap()[25..75]
            );
        }
    }

    #[tokio::test]
    async fn reports_trimming_progress_ending_at_one_hundred() {
        let buffer = ramp(2, 64, 64);
        let cancel = CancellationToken::new();
        let mut events: Vec<ProgressEvent> = Vec::new();
        let mut record = |event: ProgressEvent| events.push(event);
        let opts = Options::builder()
            .chunk_frames(NonZeroUsize::new(4).unwrap())
            .yield_every(NonZeroUsize::new(2).unwrap())
            .build();

        trim_in_chunks(&buffer, TimeRange::new(0.0, 1.0), &opts, &cancel, &mut record)
            .await
            .unwrap();

        // 32 chunks in total, a suspension point after every second one.
        assert_eq!(events.len(), 17);
        assert!(events.iter().all(|event| event.phase == Phase::Trimming));
        assert!(events.iter().all(|event| event.percent <= 100));
        assert_eq!(events.last().map(|event| event.percent), Some(100));
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        let buffer = ramp(1, 64, 64);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = trim_in_chunks(
            &buffer,
            TimeRange::new(0.0, 1.0),
            &options(8),
            &cancel,
            &mut NoProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AudioTrimError::Cancelled));
    }
}
