use std::path::PathBuf;

use audiotrim_core::SUPPORTED_BITRATES_KBPS;
use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};

pub mod duration;

use duration::parse_position;

fn parse_bitrate(value: &str) -> Result<u32, String> {
    let kbps: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid bitrate '{value}'"))?;
    if SUPPORTED_BITRATES_KBPS.contains(&kbps) {
        Ok(kbps)
    } else {
        let supported: Vec<String> = SUPPORTED_BITRATES_KBPS.iter().map(u32::to_string).collect();
        Err(format!(
            "unsupported bitrate {kbps}; choose one of {}",
            supported.join(", ")
        ))
    }
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Cut a time range out of an MP3 or WAV file and save it as MP3")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("start")
                .short('s')
                .long("start")
                .value_name("TIME")
                .help("Start of the range to keep (e.g. 0, 12.5, 1m30s, 01:30.00)")
                .default_value("0")
                .value_parser(ValueParser::new(parse_position)),
        )
        .arg(
            Arg::new("end")
                .short('e')
                .long("end")
                .value_name("TIME")
                .help("End of the range to keep; defaults to the end of the input")
                .value_parser(ValueParser::new(parse_position)),
        )
        .arg(
            Arg::new("bitrate")
                .short('b')
                .long("bitrate")
                .value_name("KBPS")
                .help("MP3 bitrate in kbps")
                .default_value("192")
                .value_parser(ValueParser::new(parse_bitrate)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("Directory where the trimmed file will be written")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("FILE_NAME")
                .help("Name of the output file; defaults to trimmed-audio-<timestamp>.mp3"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("Seed the dither generator for reproducible output")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("no-dither")
                .long("no-dither")
                .help("Round samples without adding dither noise")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .help("Allow overwriting an existing output file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Show the selected range and output path without encoding")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file_path")
                .value_name("FILE_PATH")
                .help("Path to the input MP3 or WAV file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}
