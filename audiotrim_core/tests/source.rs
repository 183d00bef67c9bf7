use audiotrim_core::{load_audio, AudioTrimError, LoadLimits};
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

/// Write a 16-bit PCM WAV file holding a 440 Hz tone on every channel.
///
/// Fixtures are synthesised at runtime so that no binary assets need to be
/// stored in the repository.
fn write_test_tone<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    channels: u16,
    duration_ms: u64,
) -> Result<(), Box<dyn Error>> {
    let total_frames = (sample_rate as u64 * duration_ms + 999) / 1_000;
    let mut samples = Vec::with_capacity(total_frames as usize * 2 * channels as usize);

    for n in 0..total_frames {
        let theta = (n as f32 / sample_rate as f32) * 2.0 * std::f32::consts::PI * 440.0;
        let sample = (theta.sin() * i16::MAX as f32 * 0.5) as i16;
        for _ in 0..channels {
            samples.extend_from_slice(&sample.to_le_bytes());
        }
    }

    let block_align = channels * 2;
    let mut file = File::create(path)?;
    let data_len = samples.len() as u32;
    let chunk_size = 36u32 + data_len;
    file.write_all(b"RIFF")?;
    file.write_all(&chunk_size.to_le_bytes())?;
    file.write_all(b"WAVE")?;
    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?; // PCM header size
    file.write_all(&1u16.to_le_bytes())?; // audio format = PCM
    file.write_all(&channels.to_le_bytes())?;
    file.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * u32::from(block_align);
    file.write_all(&byte_rate.to_le_bytes())?;
    file.write_all(&block_align.to_le_bytes())?;
    file.write_all(&16u16.to_le_bytes())?; // bits per sample
    file.write_all(b"data")?;
    file.write_all(&data_len.to_le_bytes())?;
    file.write_all(&samples)?;
    Ok(())
}

#[test]
fn loads_stereo_wav_into_planar_channels() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("tone.wav");
    write_test_tone(&input_path, 8_000, 2, 1_500)?;

    let buffer = load_audio(&input_path, &LoadLimits::default())?;

    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.sample_rate(), 8_000);
    assert_eq!(buffer.frame_count(), 12_000);
    assert_eq!(buffer.channel(0), buffer.channel(1));
    assert!(buffer
        .channel(0)
        .unwrap()
        .iter()
        .all(|sample| sample.abs() <= 0.51));

    work_dir.close()?;
    Ok(())
}

#[test]
fn accepts_uppercase_extensions() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("TONE.WAV");
    write_test_tone(&input_path, 8_000, 1, 200)?;

    let buffer = load_audio(&input_path, &LoadLimits::default())?;
    assert_eq!(buffer.frame_count(), 1_600);

    work_dir.close()?;
    Ok(())
}

#[test]
fn rejects_unknown_extensions() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("input.bin");
    File::create(&input_path)?.write_all(b"not an audio file")?;

    let err = load_audio(&input_path, &LoadLimits::default()).expect_err("should be rejected");
    assert!(matches!(err, AudioTrimError::UnsupportedFormat));

    work_dir.close()?;
    Ok(())
}

#[test]
fn rejects_garbage_with_a_supported_extension() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("fake.wav");
    File::create(&input_path)?.write_all(b"definitely not RIFF data")?;

    let result = load_audio(&input_path, &LoadLimits::default());
    assert!(result.is_err());

    work_dir.close()?;
    Ok(())
}

#[test]
fn enforces_file_size_limit() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("tone.wav");
    write_test_tone(&input_path, 8_000, 1, 500)?;

    let limits = LoadLimits {
        max_file_bytes: 1_024,
        ..LoadLimits::default()
    };
    let err = load_audio(&input_path, &limits).expect_err("file should be too large");
    match err {
        AudioTrimError::FileTooLarge { size, limit } => {
            assert_eq!(limit, 1_024);
            assert!(size > limit);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    work_dir.close()?;
    Ok(())
}

#[test]
fn enforces_duration_limit() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("long.wav");
    write_test_tone(&input_path, 8_000, 1, 3_000)?;

    let limits = LoadLimits {
        max_duration: Duration::from_secs(2),
        ..LoadLimits::default()
    };
    let err = load_audio(&input_path, &limits).expect_err("audio should be too long");
    assert!(matches!(
        err,
        AudioTrimError::DurationTooLong { limit } if limit == Duration::from_secs(2)
    ));

    work_dir.close()?;
    Ok(())
}

#[test]
fn reports_missing_files_as_io_errors() {
    let err = load_audio(Path::new("does-not-exist.wav"), &LoadLimits::default())
        .expect_err("missing file should fail");
    assert!(matches!(err, AudioTrimError::Io(_)));
}
