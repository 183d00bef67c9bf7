use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::{AudioBuffer, AudioTrimError};

/// File extensions accepted by [`load_audio`], lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// Upper bounds enforced while loading a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadLimits {
    pub max_file_bytes: u64,
    pub max_duration: Duration,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 500 * 1024 * 1024,
            max_duration: Duration::from_secs(3_600),
        }
    }
}

fn supported_extension(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Decode the default track of an MP3 or WAV file into an [`AudioBuffer`].
///
/// Packets the decoder cannot make sense of are skipped; any other decoder or
/// container error aborts the load.
pub fn load_audio(path: &Path, limits: &LoadLimits) -> Result<AudioBuffer, AudioTrimError> {
    let extension = supported_extension(path).ok_or(AudioTrimError::UnsupportedFormat)?;

    let size = fs::metadata(path)?.len();
    if size > limits.max_file_bytes {
        return Err(AudioTrimError::FileTooLarge {
            size,
            limit: limits.max_file_bytes,
        });
    }

    let mut hint = Hint::new();
    hint.with_extension(&extension);

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| match err {
            SymphoniaError::Unsupported(_) => AudioTrimError::UnsupportedFormat,
            other => AudioTrimError::from(other),
        })?;
    let mut reader = probed.format;

    let track = reader
        .default_track()
        .ok_or(AudioTrimError::MissingDefaultTrack)?;
    if track.codec_params.codec == CODEC_TYPE_NULL {
        return Err(AudioTrimError::UnsupportedCodec);
    }
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params
        .sample_rate
        .ok_or(AudioTrimError::MissingSampleRate)?;
    let max_frames = (limits.max_duration.as_secs_f64() * f64::from(sample_rate)).ceil() as usize;

    let mut decoder = get_codecs().make(&params, &DecoderOptions::default())?;
    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(err) => return Err(err.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!("skipping undecodable packet: {reason}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }
        let spec = *decoded.spec();
        let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        samples.copy_planar_ref(decoded);

        if channels.is_empty() {
            channels = vec![Vec::new(); spec.channels.count()];
        }
        for (channel, planar) in channels.iter_mut().zip(samples.samples().chunks_exact(frames)) {
            channel.extend_from_slice(planar);
        }

        if channels.first().map_or(0, Vec::len) > max_frames {
            return Err(AudioTrimError::DurationTooLong {
                limit: limits.max_duration,
            });
        }
    }

    if channels.first().map_or(true, Vec::is_empty) {
        return Err(AudioTrimError::NoAudio);
    }

    let buffer = AudioBuffer::from_channels(channels, sample_rate)?;
    info!(
        "loaded '{}': {} channel(s), {} Hz, {:.2}s",
        path.display(),
        buffer.channel_count(),
        buffer.sample_rate(),
        buffer.duration_secs()
    );
    Ok(buffer)
}
