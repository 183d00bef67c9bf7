use std::ops::Range;
use std::time::Duration;

use crate::{AudioBuffer, AudioTrimError};

/// A span of playback time in seconds, `start` inclusive and `end` exclusive.
///
/// The range is not validated on construction; [`TimeRange::frames`] checks it
/// against a concrete buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn from_durations(start: Duration, end: Duration) -> Self {
        Self::new(start.as_secs_f64(), end.as_secs_f64())
    }

    /// Range from `start` to the last frame of `buffer`.
    pub fn until_end(start: Duration, buffer: &AudioBuffer) -> Self {
        Self::new(start.as_secs_f64(), buffer.duration_secs())
    }

    /// Resolve the range to frame offsets `floor(start * rate)..floor(end * rate)`
    /// within `buffer`.
    ///
    /// An `end` equal to [`AudioBuffer::duration_secs`] always resolves to the
    /// frame count, even where `frames / rate * rate` floors one frame short.
    /// Reversed, empty, negative or out-of-bounds ranges are rejected rather
    /// than clamped.
    pub fn frames(&self, buffer: &AudioBuffer) -> Result<Range<usize>, AudioTrimError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(AudioTrimError::InvalidRange(format!(
                "start {} and end {} must be finite",
                self.start, self.end
            )));
        }
        if self.start < 0.0 {
            return Err(AudioTrimError::InvalidRange(format!(
                "start {}s is negative",
                self.start
            )));
        }
        if self.start >= self.end {
            return Err(AudioTrimError::InvalidRange(format!(
                "start {}s must be less than end {}s",
                self.start, self.end
            )));
        }

        let rate = f64::from(buffer.sample_rate());
        let start = (self.start * rate).floor() as usize;
        let frame_count = buffer.frame_count();
        let end = if self.end == buffer.duration_secs() {
            frame_count
        } else {
            (self.end * rate).floor() as usize
        };

        if end > frame_count {
            return Err(AudioTrimError::InvalidRange(format!(
                "end {}s (frame {end}) is past the end of the buffer ({frame_count} frames)",
                self.end
            )));
        }
        if end <= start {
            return Err(AudioTrimError::InvalidRange(format!(
                "range {}s..{}s covers no frames at {} Hz",
                self.start,
                self.end,
                buffer.sample_rate()
            )));
        }

        Ok(start..end)
    }

    /// Keep a start position strictly before `end`, the way a start slider is
    /// nudged when dragged past the end slider.
    pub fn clamp_start(start: f64, end: f64) -> f64 {
        if start >= end {
            (end - 1.0).max(0.0)
        } else {
            start
        }
    }

    /// Keep an end position strictly after `start`.
    pub fn clamp_end(start: f64, end: f64) -> f64 {
        if end <= start {
            start + 1.0
        } else {
            end
        }
    }
}

/// Format a position in seconds as `MM:SS.cc`.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let hundredths = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{minutes:02}:{secs:02}.{hundredths:02}")
}
