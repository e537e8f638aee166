use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{ReframeError, ReframeResult};

/// Basic metadata about a local media file.
///
/// Immutable once probed; each pipeline stage produces a fresh asset for
/// its own output file rather than mutating an existing one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoAsset {
    /// Path used for probing/decoding.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container duration in seconds, when the container reports one.
    pub duration_hint: Option<f64>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe media metadata through `ffprobe`.
pub fn probe_video(runner: &dyn CommandRunner, path: &Path) -> ReframeResult<VideoAsset> {
    let spec = CommandSpec::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
        .arg(path);
    let out = runner
        .run(&spec)
        .map_err(|e| ReframeError::probe(format!("failed to run ffprobe: {e}")))?;
    if !out.success {
        return Err(ReframeError::probe(format!(
            "ffprobe failed for '{}' ({}): {}",
            path.display(),
            out.status_text(),
            out.stderr_text()
        )));
    }

    let (width, height, duration_hint) = parse_probe_json(&out.stdout)?;
    Ok(VideoAsset {
        path: path.to_path_buf(),
        width,
        height,
        duration_hint,
    })
}

fn parse_probe_json(raw: &[u8]) -> ReframeResult<(u32, u32, Option<f64>)> {
    let parsed: ProbeOut = serde_json::from_slice(raw)
        .map_err(|e| ReframeError::probe(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReframeError::probe("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| ReframeError::probe("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| ReframeError::probe("missing video height from ffprobe"))?;
    if width == 0 || height == 0 {
        return Err(ReframeError::probe("ffprobe reported zero-sized video"));
    }
    let duration_hint = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);
    Ok((width, height, duration_hint))
}
