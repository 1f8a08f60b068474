mod batch;
mod condenser;
mod dialog;
mod error;
mod ffmpeg;
mod filter;
mod job;
mod parser;
mod processor;
mod report;
mod timestamp;

use crate::batch::BatchOpts;
use crate::job::{CondenseJob, CondenseOpts};

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Cut the silence between subtitled dialog out of audio and video files")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Media file to condense, or a directory of media files to condense in one go."
    )]
    input: PathBuf,
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Subtitle file (.srt or .ass) for the input. In directory mode, the directory to look for subtitles in; defaults to the input directory."
    )]
    sub: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "File to write the condensed audio to, or the output directory in directory mode. [default: condensed.mp3, or condensed/ in directory mode]"
    )]
    output: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        help = "Longest silence between two dialog lines that is kept as-is.",
        default_value = "1.0",
        allow_negative_numbers = true,
        value_parser = parse_gap
    )]
    gap: Duration,
    #[arg(
        short,
        long,
        value_name = "INDEX",
        help = "Audio track to take the audio from. Uses the default audio track if not supplied."
    )]
    track: Option<usize>,
    #[arg(
        short,
        long,
        value_name = "EXT",
        help = "Extension (and so format) of the files written in directory mode.",
        default_value = "mp3"
    )]
    extension: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "File with one regex per line. Dialog lines matching any of them are ignored."
    )]
    drop: Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Print how much the input would be condensed, without writing anything."
    )]
    check: bool,
    #[arg(
        short,
        long,
        value_name = "N",
        help = "Process at most N files at the same time."
    )]
    jobs: Option<NonZeroUsize>,
    #[arg(short, long, help = "Log debugging output.", conflicts_with = "quiet")]
    verbose: bool,
    #[arg(short, long, help = "Only log warnings and errors.")]
    quiet: bool,
}

fn parse_gap(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| "Max gap must be a finite number of seconds, 0 or more".to_string())
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn resolve_jobs(cli: &Cli) -> Result<Vec<CondenseJob>> {
    let is_dir = tokio::fs::metadata(&cli.input)
        .await
        .map_or(false, |meta| meta.is_dir());
    if is_dir {
        let sub_dir = cli.sub.as_ref().unwrap_or(&cli.input);
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("condensed"));
        return job::discover(&cli.input, sub_dir, &output, &cli.extension).await;
    }

    let sub = cli
        .sub
        .clone()
        .ok_or_else(|| anyhow!("Provide a subtitle file with --sub when the input is a single file."))?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("condensed.mp3"));
    Ok(vec![CondenseJob::new(cli.input.clone(), sub, output)])
}

async fn run(cli: Cli) -> Result<()> {
    let jobs = resolve_jobs(&cli).await?;

    ffmpeg::ensure_tools(!cli.check)?;

    let patterns = match &cli.drop {
        Some(path) => processor::load_patterns(path).await?,
        None => Vec::new(),
    };

    let opts = CondenseOpts {
        max_gap: cli.gap,
        track: cli.track,
        patterns,
    };
    let batch_opts = BatchOpts {
        check: cli.check,
        jobs: cli.jobs.map(NonZeroUsize::get),
    };
    batch::run(jobs, opts, batch_opts).await
}
