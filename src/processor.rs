use crate::dialog::{Dialog, Interval};

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

/// Timings of the dialogs matching none of `patterns`, in their original order.
pub fn keep_dialogs(dialogs: Vec<Dialog>, patterns: &[Regex]) -> Vec<Interval> {
    dialogs
        .into_iter()
        .filter(|dialog| !patterns.iter().any(|r| is_match(r, dialog)))
        .map(|dialog| dialog.interval)
        .collect()
}

fn is_match(regex: &Regex, dialog: &Dialog) -> bool {
    dialog.text.lines().any(|line| {
        let mtch = regex.is_match(line);
        if mtch {
            debug!(line, pattern = %regex, "Dropping dialog");
        }
        mtch
    })
}

/// Reads one pattern per line. Blank lines and lines starting with `#` are skipped.
pub async fn load_patterns(path: &Path) -> Result<Vec<Regex>> {
    let patterns = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read pattern file: '{}'", path.display()))?;
    parse_patterns(&patterns)
}

fn parse_patterns(patterns: &str) -> Result<Vec<Regex>> {
    patterns
        .lines()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && !p.starts_with('#'))
        .map(|p| Regex::new(p).with_context(|| format!("Invalid regex: /{}/", p)))
        .collect()
}
