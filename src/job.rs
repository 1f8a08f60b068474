use crate::condenser;
use crate::dialog::Interval;
use crate::error::CondenseError;
use crate::ffmpeg;
use crate::filter::{self, FilterGraph};
use crate::parser::SubtitleFormat;
use crate::processor;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, warn};

const MEDIA_EXTENSIONS: &[&str] = &[
    "aac", "avi", "flac", "flv", "m4a", "m4v", "mka", "mkv", "mov", "mp3", "mp4", "ogg", "opus",
    "ts", "wav", "webm", "wma",
];

// In order of preference when several subtitles match one media file.
const SUBTITLE_EXTENSIONS: &[&str] = &["ass", "ssa", "srt"];

#[derive(Debug, Clone)]
pub struct CondenseOpts {
    pub max_gap: Duration,
    pub track: Option<usize>,
    pub patterns: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub struct CondenseJob {
    pub(crate) input: PathBuf,
    pub(crate) subtitle: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) intervals: Vec<Interval>,
    pub(crate) original_duration: Duration,
    pub(crate) condensed_duration: Duration,
}

impl CondenseJob {
    pub fn new(input: PathBuf, subtitle: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            subtitle,
            output,
            intervals: Vec::new(),
            original_duration: Duration::ZERO,
            condensed_duration: Duration::ZERO,
        }
    }

    pub async fn prepare(&mut self, opts: &CondenseOpts) -> Result<()> {
        let dialogs = self.load_dialogs(opts).await?;
        let total = ffmpeg::probe_duration(&self.input).await?;
        self.condense(&dialogs, total, opts.max_gap)
            .with_context(|| format!("Failed to condense '{}'", self.input.display()))?;
        Ok(())
    }

    /// Dialog timings from the subtitle file, minus any dropped by `opts.patterns`.
    pub async fn load_dialogs(&self, opts: &CondenseOpts) -> Result<Vec<Interval>> {
        let data = tokio::fs::read_to_string(&self.subtitle)
            .await
            .with_context(|| format!("Failed to open subtitle file: '{}'", self.subtitle.display()))?;

        let dialogs = SubtitleFormat::from_path(&self.subtitle)
            .parse(&data)
            .with_context(|| format!("Failed to parse subtitle file: '{}'", self.subtitle.display()))?;
        let found = dialogs.len();

        let intervals = processor::keep_dialogs(dialogs, &opts.patterns);
        if intervals.is_empty() {
            return Err(CondenseError::EmptyDialog)
                .with_context(|| format!("Nothing to condense in '{}'", self.subtitle.display()));
        }
        debug!(
            subtitle = %self.subtitle.display(),
            found,
            kept = intervals.len(),
            "Loaded dialog"
        );
        Ok(intervals)
    }

    pub fn condense(
        &mut self,
        dialogs: &[Interval],
        total: Duration,
        max_gap: Duration,
    ) -> Result<(), CondenseError> {
        self.intervals = condenser::condense(dialogs, max_gap, total)?;
        self.original_duration = total;
        self.condensed_duration = condenser::condensed_duration(&self.intervals);
        Ok(())
    }

    pub fn filter_graph(&self, track: Option<usize>) -> Result<FilterGraph, CondenseError> {
        filter::build(&self.intervals, track)
    }

    pub async fn transcode(&self, opts: &CondenseOpts) -> Result<()> {
        let graph = self.filter_graph(opts.track)?;
        ffmpeg::transcode(&self.input, &graph, &self.output).await?;
        Ok(())
    }
}

/// Pairs every media file in `input_dir` with a subtitle from `sub_dir`.
///
/// A subtitle matches when its name is the media stem, optionally followed by
/// a dotted tag such as a language code (`ep01.mkv` with `ep01.en.ass`).
pub async fn discover(
    input_dir: &Path,
    sub_dir: &Path,
    output_dir: &Path,
    extension: &str,
) -> Result<Vec<CondenseJob>> {
    let media = list_files(input_dir, MEDIA_EXTENSIONS).await?;
    let subtitles = list_files(sub_dir, SUBTITLE_EXTENSIONS).await?;

    let mut jobs = Vec::new();
    for input in media {
        let stem = match input.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        match find_subtitle(&stem, &subtitles) {
            Some(subtitle) => {
                let output = output_dir.join(format!("{}.{}", stem, extension));
                jobs.push(CondenseJob::new(input, subtitle.clone(), output));
            }
            None => warn!(path = %input.display(), "No subtitle found, skipping"),
        }
    }

    if jobs.is_empty() {
        bail!(
            "No media files with matching subtitles found in '{}'",
            input_dir.display()
        );
    }
    Ok(jobs)
}

async fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory: '{}'", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to read directory: '{}'", dir.display()))?
    {
        let path = entry.path();
        if !has_extension(&path, extensions) {
            continue;
        }
        let is_file = tokio::fs::metadata(&path)
            .await
            .map_or(false, |meta| meta.is_file());
        if is_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        })
}

fn find_subtitle<'a>(stem: &str, subtitles: &'a [PathBuf]) -> Option<&'a PathBuf> {
    SUBTITLE_EXTENSIONS.iter().find_map(|&ext| {
        subtitles
            .iter()
            .find(|sub| has_extension(sub, &[ext]) && matches_stem(sub, stem))
    })
}

fn matches_stem(subtitle: &Path, stem: &str) -> bool {
    subtitle
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|sub_stem| sub_stem.strip_prefix(stem))
        .map_or(false, |rest| rest.is_empty() || rest.starts_with('.'))
}
