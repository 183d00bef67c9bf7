use mp3lame_encoder::{
    max_required_buffer_size, Bitrate, Builder, DualPcm, Encoder, FlushNoGap, MonoPcm, Quality,
};
use thiserror::Error;

use crate::{EncoderBackend, EncoderConfig};

/// Worst-case size of the trailing frames LAME emits on flush.
const FLUSH_BUFFER_BYTES: usize = 7_200;

/// Errors reported by the LAME backend.
#[derive(Debug, Error)]
pub enum Mp3Error {
    #[error("failed to allocate a LAME encoder")]
    Allocation,

    #[error("MP3 supports one or two channels, got {0}")]
    UnsupportedChannels(u16),

    #[error("unsupported MP3 bitrate of {0} kbps")]
    UnsupportedBitrate(u32),

    #[error("failed to configure LAME encoder: {0}")]
    Configure(String),

    #[error("block carries {actual} channel(s) but the encoder was opened for {expected}")]
    ChannelMismatch { expected: u16, actual: usize },

    #[error("LAME failed to encode: {0}")]
    Encode(String),
}

/// Constant-bitrate MP3 encoder backed by LAME.
pub struct Mp3Encoder {
    inner: Encoder,
    channels: u16,
}

/// Constant bitrates the LAME backend accepts, in kbps.
pub const SUPPORTED_BITRATES_KBPS: [u32; 12] = [32, 48, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];

const LAME_BITRATES: [Bitrate; 12] = [
    Bitrate::Kbps32,
    Bitrate::Kbps48,
    Bitrate::Kbps64,
    Bitrate::Kbps80,
    Bitrate::Kbps96,
    Bitrate::Kbps112,
    Bitrate::Kbps128,
    Bitrate::Kbps160,
    Bitrate::Kbps192,
    Bitrate::Kbps224,
    Bitrate::Kbps256,
    Bitrate::Kbps320,
];

impl Mp3Encoder {
    fn bitrate(kbps: u32) -> Result<Bitrate, Mp3Error> {
        SUPPORTED_BITRATES_KBPS
            .iter()
            .position(|&supported| supported == kbps)
            .map(|index| LAME_BITRATES[index])
            .ok_or(Mp3Error::UnsupportedBitrate(kbps))
    }
}

fn configure<E: std::fmt::Debug>(err: E) -> Mp3Error {
    Mp3Error::Configure(format!("{err:?}"))
}

fn encode_error<E: std::fmt::Debug>(err: E) -> Mp3Error {
    Mp3Error::Encode(format!("{err:?}"))
}

impl EncoderBackend for Mp3Encoder {
    type Error = Mp3Error;

    fn open(config: &EncoderConfig) -> Result<Self, Mp3Error> {
        if !(1..=2).contains(&config.channel_count) {
            return Err(Mp3Error::UnsupportedChannels(config.channel_count));
        }
        let bitrate = Self::bitrate(config.bitrate_kbps)?;

        let mut builder = Builder::new().ok_or(Mp3Error::Allocation)?;
        builder
            .set_num_channels(config.channel_count as u8)
            .map_err(configure)?;
        builder
            .set_sample_rate(config.sample_rate)
            .map_err(configure)?;
        builder.set_brate(bitrate).map_err(configure)?;
        builder.set_quality(Quality::Best).map_err(configure)?;
        let inner = builder.build().map_err(configure)?;

        Ok(Self {
            inner,
            channels: config.channel_count,
        })
    }

    fn encode_block(&mut self, channels: &[&[i16]]) -> Result<Vec<u8>, Mp3Error> {
        let frames = channels.first().map_or(0, |channel| channel.len());
        let mut output = Vec::with_capacity(max_required_buffer_size(frames));

        match (self.channels, channels) {
            (1, &[mono]) => {
                self.inner
                    .encode_to_vec(MonoPcm(mono), &mut output)
                    .map_err(encode_error)?;
            }
            (2, &[left, right]) => {
                self.inner
                    .encode_to_vec(DualPcm { left, right }, &mut output)
                    .map_err(encode_error)?;
            }
            (expected, _) => {
                return Err(Mp3Error::ChannelMismatch {
                    expected,
                    actual: channels.len(),
                })
            }
        }

        Ok(output)
    }

    fn flush(mut self) -> Result<Vec<u8>, Mp3Error> {
        let mut output = Vec::with_capacity(FLUSH_BUFFER_BYTES);
        self.inner
            .flush_to_vec::<FlushNoGap>(&mut output)
            .map_err(encode_error)?;
        Ok(output)
    }
}
