//! Segment acquisition: fetch a remote source and trim it to a time range.
//!
//! Delegates entirely to external tools: `yt-dlp` downloads the source into
//! a staging directory, then `ffmpeg` re-encodes just the requested range
//! to the caller's output path. The staging directory is a
//! [`tempfile::TempDir`], so the intermediate download is removed on both
//! the success and the failure path.

use std::path::{Path, PathBuf};

use crate::command::{CommandRunner, CommandSpec, discard_partial_output, ensure_parent_dir};
use crate::error::{ReframeError, ReframeResult};
use crate::probe::{VideoAsset, probe_video};
use crate::timecode::TimeRange;

/// Downloader format selector: the best single mp4 rendition, matching the
/// fixed output container of the rest of the pipeline.
const DOWNLOAD_FORMAT: &str = "best[ext=mp4]";

#[derive(Clone, Debug)]
pub struct AcquireConfig {
    /// Opaque source reference handed to the downloader (typically a URL).
    pub source_ref: String,
    /// Final output path for the trimmed segment.
    pub out_path: PathBuf,
    /// Segment to keep.
    pub range: TimeRange,
    pub overwrite: bool,
}

impl AcquireConfig {
    pub fn new(
        source_ref: impl Into<String>,
        out_path: impl Into<PathBuf>,
        range: TimeRange,
    ) -> Self {
        Self {
            source_ref: source_ref.into(),
            out_path: out_path.into(),
            range,
            overwrite: true,
        }
    }

    pub fn validate(&self) -> ReframeResult<()> {
        if self.source_ref.trim().is_empty() {
            return Err(ReframeError::validation("source reference is empty"));
        }
        Ok(())
    }
}

/// Fetch `cfg.source_ref` and write exactly one file at `cfg.out_path`
/// holding the requested range, re-encoded to H.264/AAC.
///
/// The returned asset is probed from the written file, so a segment that
/// the tools could not finish never reaches the next stage.
pub fn acquire_segment(
    runner: &dyn CommandRunner,
    cfg: &AcquireConfig,
) -> ReframeResult<VideoAsset> {
    cfg.validate()?;
    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(ReframeError::validation(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }
    ensure_parent_dir(&cfg.out_path)?;

    let staging = tempfile::tempdir().map_err(|e| {
        ReframeError::acquisition(format!("failed to create staging directory: {e}"))
    })?;
    let download_path = staging.path().join("source.mp4");

    download_source(runner, &cfg.source_ref, &download_path)?;
    trim_segment(runner, &download_path, cfg)?;

    tracing::info!(
        source = %cfg.source_ref,
        out = %cfg.out_path.display(),
        "acquired segment"
    );
    probe_video(runner, &cfg.out_path)
}

fn download_source(
    runner: &dyn CommandRunner,
    source_ref: &str,
    download_path: &Path,
) -> ReframeResult<()> {
    let spec = CommandSpec::new("yt-dlp")
        .args(["-f", DOWNLOAD_FORMAT, "-o"])
        .arg(download_path)
        .arg(source_ref);
    tracing::debug!(cmd = %spec.display_line(), "downloading source");

    let out = runner.run(&spec).map_err(|e| {
        ReframeError::acquisition(format!(
            "failed to run yt-dlp (is it installed and on PATH?): {e}"
        ))
    })?;
    if !out.success {
        return Err(ReframeError::acquisition(format!(
            "yt-dlp failed for '{source_ref}' ({}): {}",
            out.status_text(),
            out.stderr_text()
        )));
    }
    Ok(())
}

fn trim_segment(
    runner: &dyn CommandRunner,
    download_path: &Path,
    cfg: &AcquireConfig,
) -> ReframeResult<()> {
    let spec = CommandSpec::new("ffmpeg")
        .arg(if cfg.overwrite { "-y" } else { "-n" })
        .args(["-loglevel", "error"])
        .args(["-ss", &cfg.range.start().to_arg()])
        .args(["-to", &cfg.range.end().to_arg()])
        .arg("-i")
        .arg(download_path)
        .args(["-c:v", "libx264", "-c:a", "aac"])
        .arg(&cfg.out_path);
    tracing::debug!(cmd = %spec.display_line(), "trimming segment");

    let out = runner.run(&spec).map_err(|e| {
        discard_partial_output(&cfg.out_path);
        ReframeError::acquisition(format!(
            "failed to run ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;
    if !out.success {
        discard_partial_output(&cfg.out_path);
        return Err(ReframeError::acquisition(format!(
            "ffmpeg trim failed ({}): {}",
            out.status_text(),
            out.stderr_text()
        )));
    }
    Ok(())
}
