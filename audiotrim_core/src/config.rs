use std::num::NonZeroUsize;

use crate::{AudioBuffer, Dither};

/// Bitrate used when the caller does not pick one.
pub const DEFAULT_BITRATE_KBPS: u32 = 192;

const DEFAULT_CHUNK_FRAMES: usize = 4_096;
const DEFAULT_YIELD_EVERY: usize = 4;

/// Tunables shared by the trim and encode stages.
///
/// None of these affect the trimmed samples; they only control working-set
/// size, how often the pipeline suspends and how samples are dithered.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    chunk_frames: NonZeroUsize,
    block_frames: NonZeroUsize,
    yield_every: NonZeroUsize,
    dither: Dither,
    seed: Option<u64>,
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Frames copied per chunk while trimming.
    pub fn chunk_frames(&self) -> NonZeroUsize {
        self.chunk_frames
    }

    /// Frames quantized and handed to the encoder per block.
    pub fn block_frames(&self) -> NonZeroUsize {
        self.block_frames
    }

    /// Number of chunks (or blocks) between suspension points.
    pub fn yield_every(&self) -> NonZeroUsize {
        self.yield_every
    }

    pub fn dither(&self) -> Dither {
        self.dither
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Options {
    fn default() -> Self {
        OptionsBuilder::default().build()
    }
}

/// Builder for [`Options`].
#[derive(Clone, Debug)]
pub struct OptionsBuilder {
    chunk_frames: NonZeroUsize,
    block_frames: NonZeroUsize,
    yield_every: NonZeroUsize,
    dither: Dither,
    seed: Option<u64>,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        let chunk = NonZeroUsize::new(DEFAULT_CHUNK_FRAMES).unwrap_or(NonZeroUsize::MIN);
        Self {
            chunk_frames: chunk,
            block_frames: chunk,
            yield_every: NonZeroUsize::new(DEFAULT_YIELD_EVERY).unwrap_or(NonZeroUsize::MIN),
            dither: Dither::default(),
            seed: None,
        }
    }
}

impl OptionsBuilder {
    pub fn chunk_frames(mut self, frames: NonZeroUsize) -> Self {
        self.chunk_frames = frames;
        self
    }

    pub fn block_frames(mut self, frames: NonZeroUsize) -> Self {
        self.block_frames = frames;
        self
    }

    pub fn yield_every(mut self, chunks: NonZeroUsize) -> Self {
        self.yield_every = chunks;
        self
    }

    pub fn dither(mut self, dither: Dither) -> Self {
        self.dither = dither.sanitized();
        self
    }

    /// Seed the dither generator so repeated runs produce identical output.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Options {
        Options {
            chunk_frames: self.chunk_frames,
            block_frames: self.block_frames,
            yield_every: self.yield_every,
            dither: self.dither,
            seed: self.seed,
        }
    }
}

/// Parameters an encoder instance is opened with.
///
/// `channel_count` selects how many leading channels of the buffer are
/// encoded. The stock MP3 backend accepts one or two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    pub channel_count: u16,
    pub sample_rate: u32,
    pub bitrate_kbps: u32,
}

impl EncoderConfig {
    pub const fn new(channel_count: u16, sample_rate: u32, bitrate_kbps: u32) -> Self {
        Self {
            channel_count,
            sample_rate,
            bitrate_kbps,
        }
    }

    /// Configuration matching `buffer`, keeping at most the first two channels.
    pub fn for_buffer(buffer: &AudioBuffer, bitrate_kbps: u32) -> Self {
        let channel_count = buffer.channel_count().clamp(1, 2) as u16;
        Self::new(channel_count, buffer.sample_rate(), bitrate_kbps)
    }
}
