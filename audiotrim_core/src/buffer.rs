use std::time::Duration;

use crate::AudioTrimError;

/// Planar, floating-point audio owned by the caller.
///
/// Every channel holds the same number of frames. Samples are nominally in
/// `[-1.0, 1.0]` but are not required to be; the encoder saturates anything
/// outside that range.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from one sample vector per channel.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AudioTrimError> {
        if channels.is_empty() {
            return Err(AudioTrimError::InvalidBuffer("buffer has no channels"));
        }
        if sample_rate == 0 {
            return Err(AudioTrimError::InvalidBuffer("sample rate must be greater than zero"));
        }
        let frames = channels[0].len();
        if channels.iter().any(|channel| channel.len() != frames) {
            return Err(AudioTrimError::InvalidBuffer(
                "channels must all hold the same number of frames",
            ));
        }

        Ok(Self::from_parts(channels, sample_rate))
    }

    /// Build a buffer in which every sample of every channel equals `value`.
    pub fn filled(
        channel_count: usize,
        frame_count: usize,
        sample_rate: u32,
        value: f32,
    ) -> Result<Self, AudioTrimError> {
        Self::from_channels(vec![vec![value; frame_count]; channel_count], sample_rate)
    }

    pub(crate) fn from_parts(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> impl ExactSizeIterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Playback length of the buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }
}
