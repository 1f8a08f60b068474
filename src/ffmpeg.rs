use crate::error::CondenseError;
use crate::filter::FilterGraph;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

const FFPROBE: &str = "ffprobe";
const FFMPEG: &str = "ffmpeg";

pub fn ensure_tools(transcode: bool) -> Result<(), CondenseError> {
    which::which(FFPROBE).map_err(|_| CondenseError::ToolMissing { tool: FFPROBE })?;
    if transcode {
        which::which(FFMPEG).map_err(|_| CondenseError::ToolMissing { tool: FFMPEG })?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

pub async fn probe_duration(path: &Path) -> Result<Duration, CondenseError> {
    let output = Command::new(FFPROBE)
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| probe_error(path, err.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(probe_error(
            path,
            format!("{} ({})", stderr.trim(), output.status),
        ));
    }

    let duration = parse_probe(path, &output.stdout)?;
    debug!(path = %path.display(), ?duration, "Probed duration");
    Ok(duration)
}

fn parse_probe(path: &Path, stdout: &[u8]) -> Result<Duration, CondenseError> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|err| probe_error(path, err.to_string()))?;
    let raw = probe
        .format
        .duration
        .ok_or_else(|| probe_error(path, "no duration reported".to_string()))?;
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| probe_error(path, format!("unparsable duration '{}'", raw)))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| probe_error(path, format!("invalid duration '{}'", raw)))
}

fn probe_error(path: &Path, message: String) -> CondenseError {
    CondenseError::Probe {
        path: path.to_path_buf(),
        message,
    }
}

pub fn transcode_args(input: &Path, graph: &FilterGraph, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-filter_complex".to_string(),
        graph.description.clone(),
        "-map".to_string(),
        graph.output.to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Creates the output directory if it is missing.
pub async fn transcode(
    input: &Path,
    graph: &FilterGraph,
    output: &Path,
) -> Result<(), CondenseError> {
    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }

    let args = transcode_args(input, graph, output);
    debug!(?args, "Running ffmpeg");

    let result = Command::new(FFMPEG)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| transcode_error(input, err.to_string()))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(transcode_error(
            input,
            format!("{} ({})", stderr.trim(), result.status),
        ));
    }
    Ok(())
}

fn transcode_error(path: &Path, message: String) -> CondenseError {
    CondenseError::Transcode {
        path: path.to_path_buf(),
        message,
    }
}
