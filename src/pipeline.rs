//! Sequential orchestration: acquire -> reframe -> play.

use std::path::PathBuf;

use crate::acquire::{AcquireConfig, acquire_segment};
use crate::command::CommandRunner;
use crate::error::ReframeResult;
use crate::geometry::ReframeSpec;
use crate::playback::{PlaybackBackend, PlaybackOutcome};
use crate::reframe::{ReframeConfig, reframe_asset};
use crate::timecode::TimeRange;

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Opaque source reference for the downloader.
    pub source_ref: String,
    /// Segment of the source to keep.
    pub range: TimeRange,
    /// Output geometry of the reframe pass.
    pub spec: ReframeSpec,
    /// Where the trimmed segment lands.
    pub clip_path: PathBuf,
    /// Where the reframed output lands.
    pub reframed_path: PathBuf,
    pub overwrite: bool,
}

/// Run the whole pipeline and present the result.
///
/// Stages run strictly one at a time; the first failing stage halts the
/// pipeline and nothing it produced flows to the next stage (each stage
/// re-probes the file it wrote before handing it on).
#[tracing::instrument(skip_all, fields(source = %cfg.source_ref))]
pub fn run_pipeline(
    runner: &dyn CommandRunner,
    backend: &mut dyn PlaybackBackend,
    cfg: &PipelineConfig,
) -> ReframeResult<PlaybackOutcome> {
    let mut acquire_cfg = AcquireConfig::new(&cfg.source_ref, &cfg.clip_path, cfg.range);
    acquire_cfg.overwrite = cfg.overwrite;
    let clip = acquire_segment(runner, &acquire_cfg)?;

    let mut reframe_cfg = ReframeConfig::new(&cfg.reframed_path, cfg.spec);
    reframe_cfg.overwrite = cfg.overwrite;
    let reframed = reframe_asset(runner, &clip, &reframe_cfg)?;

    backend.play(&reframed)
}
