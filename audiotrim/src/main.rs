mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use audiotrim_core::{
    format_timestamp, load_audio, Dither, LoadLimits, Mp3Encoder, Options, Pipeline,
    ProgressEvent, TimeRange,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::cli::build_cli;

fn default_file_name() -> String {
    chrono::Local::now()
        .format("trimmed-audio-%Y-%m-%dT%H-%M-%S.mp3")
        .to_string()
}

fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            token.cancel();
        }
    });
}

fn write_output(path: &Path, bytes: &[u8], overwrite: bool) -> anyhow::Result<()> {
    if path.exists() && !overwrite {
        bail!(
            "output file already exists: {} (use --overwrite to replace it)",
            path.display()
        );
    }
    fs::write(path, bytes).with_context(|| format!("failed to write '{}'", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();

    let input_path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");
    if !input_path.is_file() {
        return Err(anyhow!(
            "input file does not exist: {}",
            input_path.display()
        ));
    }

    let start = *matches
        .get_one::<Duration>("start")
        .expect("defaulted argument");
    let end = matches.get_one::<Duration>("end").copied();
    let bitrate = *matches
        .get_one::<u32>("bitrate")
        .expect("defaulted argument");
    let output_dir = matches
        .get_one::<PathBuf>("output")
        .expect("defaulted argument");
    let file_name = matches
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_else(default_file_name);
    let overwrite = matches.get_flag("overwrite");
    let dry_run = matches.get_flag("dry-run");

    if !output_dir.is_dir() {
        bail!("output directory does not exist: {}", output_dir.display());
    }
    let output_path = output_dir.join(file_name);
    if output_path.exists() && !overwrite {
        bail!(
            "output file already exists: {} (use --overwrite to replace it)",
            output_path.display()
        );
    }

    let buffer = load_audio(input_path, &LoadLimits::default())
        .with_context(|| format!("failed to load '{}'", input_path.display()))?;

    let range = match end {
        Some(end) => TimeRange::from_durations(start, end),
        None => TimeRange::until_end(start, &buffer),
    };
    let frames = range.frames(&buffer).with_context(|| {
        let mut message = format!("cannot trim '{}'", input_path.display());
        if range.start >= range.end {
            let start = TimeRange::clamp_start(range.start, range.end);
            message.push_str(&format!(
                "; the start must come before the end, e.g. --start {}",
                format_timestamp(start)
            ));
        }
        message
    })?;

    if dry_run {
        println!(
            "Dry run: would trim {} - {} ({} frame(s) per channel) into:",
            format_timestamp(range.start),
            format_timestamp(range.end),
            frames.len()
        );
        println!("  {}", output_path.display());
        return Ok(());
    }

    let mut options = Options::builder();
    if let Some(seed) = matches.get_one::<u64>("seed") {
        options = options.seed(*seed);
    }
    if matches.get_flag("no-dither") {
        options = options.dither(Dither::None);
    }
    let pipeline = Pipeline::new(options.build());
    cancel_on_ctrl_c(pipeline.cancellation_token());

    let progress = ProgressBar::new(100);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_message("Preparing...");

    let progress_handle = progress.clone();
    let mut report = move |event: ProgressEvent| {
        progress_handle.set_position(u64::from(event.percent));
        progress_handle.set_message(event.to_string());
    };

    info!(
        "trimming {} - {} at {bitrate} kbps",
        format_timestamp(range.start),
        format_timestamp(range.end)
    );
    let result = pipeline
        .run::<Mp3Encoder, _>(&buffer, range, bitrate, &mut report)
        .await
        .with_context(|| format!("failed to trim '{}'", input_path.display()));

    progress.finish_and_clear();

    let bytes = result?;
    write_output(&output_path, &bytes, overwrite)?;
    println!("Saved {} ({} bytes)", output_path.display(), bytes.len());

    Ok(())
}
