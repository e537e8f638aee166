//! Reframe execution: apply resolved geometry through an external
//! crop/scale/encode chain.

use std::path::{Path, PathBuf};

use crate::command::{CommandRunner, CommandSpec, discard_partial_output, ensure_parent_dir};
use crate::error::{ReframeError, ReframeResult};
use crate::geometry::{ReframeSpec, ResolvedGeometry, resolve};
use crate::probe::{VideoAsset, probe_video};

/// Fixed output frame rate after reframing.
pub const REFRAME_FPS: u32 = 30;

#[derive(Clone, Debug)]
pub struct ReframeConfig {
    /// Final output path for the reframed video.
    pub out_path: PathBuf,
    pub spec: ReframeSpec,
    pub overwrite: bool,
}

impl ReframeConfig {
    pub fn new(out_path: impl Into<PathBuf>, spec: ReframeSpec) -> Self {
        Self {
            out_path: out_path.into(),
            spec,
            overwrite: true,
        }
    }

    pub fn validate(&self) -> ReframeResult<()> {
        self.spec.validate()?;
        if !self.spec.target_width.is_multiple_of(2) || !self.spec.target_height.is_multiple_of(2) {
            // The fixed codec profile targets yuv420p output.
            return Err(ReframeError::validation(
                "target width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

/// Reframe a probed asset into `cfg.out_path`.
///
/// The geometry is resolved up front; a [`ReframeError::Geometry`] is a
/// caller-visible configuration error and is never retried here. The filter
/// order is fixed: crop first, then scale — scaling first would change the
/// pixel coordinate space the crop rectangle was resolved against.
pub fn reframe_asset(
    runner: &dyn CommandRunner,
    asset: &VideoAsset,
    cfg: &ReframeConfig,
) -> ReframeResult<VideoAsset> {
    cfg.validate()?;
    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(ReframeError::validation(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }
    let geometry = resolve(asset.width, asset.height, &cfg.spec)?;
    ensure_parent_dir(&cfg.out_path)?;
    run_filter_chain(runner, &asset.path, &geometry, cfg)?;

    tracing::info!(
        input = %asset.path.display(),
        out = %cfg.out_path.display(),
        crop_x = geometry.crop.x,
        crop_width = geometry.crop.width,
        "reframed segment"
    );
    probe_video(runner, &cfg.out_path)
}

/// Probe `input_path` first, then reframe it.
pub fn reframe_path(
    runner: &dyn CommandRunner,
    input_path: &Path,
    cfg: &ReframeConfig,
) -> ReframeResult<VideoAsset> {
    let asset = probe_video(runner, input_path)?;
    reframe_asset(runner, &asset, cfg)
}

fn run_filter_chain(
    runner: &dyn CommandRunner,
    input_path: &Path,
    geometry: &ResolvedGeometry,
    cfg: &ReframeConfig,
) -> ReframeResult<()> {
    let crop = geometry.crop;
    let filter = format!(
        "crop={}:{}:{}:{},scale={}:{}",
        crop.width, crop.height, crop.x, crop.y, geometry.scale_width, geometry.scale_height
    );

    let spec = CommandSpec::new("ffmpeg")
        .arg(if cfg.overwrite { "-y" } else { "-n" })
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(input_path)
        .args(["-vf", &filter])
        .args(["-r", &REFRAME_FPS.to_string()])
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac"])
        .arg(&cfg.out_path);
    tracing::debug!(cmd = %spec.display_line(), "running filter chain");

    let out = runner.run(&spec).map_err(|e| {
        discard_partial_output(&cfg.out_path);
        ReframeError::encode(format!(
            "failed to run ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;
    if !out.success {
        discard_partial_output(&cfg.out_path);
        return Err(ReframeError::encode(format!(
            "ffmpeg filter chain failed ({}): {}",
            out.status_text(),
            out.stderr_text()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;
    use crate::command::CommandOutput;

    fn landscape_asset() -> VideoAsset {
        VideoAsset {
            path: PathBuf::from("clip.mp4"),
            width: 1920,
            height: 1080,
            duration_hint: Some(30.0),
        }
    }

    fn portrait_spec() -> ReframeSpec {
        ReframeSpec {
            target_width: 720,
            target_height: 1280,
            horizontal_bias: 0.5,
        }
    }

    #[test]
    fn builds_crop_before_scale() {
        let captured: std::cell::RefCell<Option<OsString>> = std::cell::RefCell::new(None);
        let runner = |spec: &CommandSpec| {
            if spec.program() == "ffmpeg" {
                let argv = spec.argv();
                let vf = argv
                    .iter()
                    .position(|a| a == "-vf")
                    .map(|i| argv[i + 1].clone())
                    .expect("-vf must be present");
                captured.borrow_mut().replace(vf);
            }
            Ok(CommandOutput::succeeded().with_stdout(OUT_PROBE_JSON))
        };

        reframe_asset(&runner, &landscape_asset(), &ReframeConfig::new("out.mp4", portrait_spec()))
            .unwrap();

        // 720/1280 == 9/16, so the crop is 607x1080 at x=657.
        let vf = captured.into_inner().unwrap();
        assert_eq!(vf, OsString::from("crop=607:1080:657:0,scale=720:1280"));
    }

    const OUT_PROBE_JSON: &str = r#"{
        "streams": [{"codec_type": "video", "width": 720, "height": 1280}],
        "format": {"duration": "30.0"}
    }"#;

    #[test]
    fn geometry_errors_skip_the_encoder() {
        let runner = |_: &CommandSpec| -> std::io::Result<CommandOutput> {
            panic!("the filter chain must not run when geometry fails");
        };
        let narrow = VideoAsset {
            path: PathBuf::from("tall.mp4"),
            width: 400,
            height: 1080,
            duration_hint: None,
        };
        let err = reframe_asset(
            &runner,
            &narrow,
            &ReframeConfig::new("out.mp4", portrait_spec()),
        )
        .unwrap_err();
        assert!(matches!(err, ReframeError::Geometry(_)));
    }

    #[test]
    fn odd_target_dimensions_are_rejected() {
        let runner = |_: &CommandSpec| -> std::io::Result<CommandOutput> {
            panic!("invalid config must not reach the tools");
        };
        let cfg = ReframeConfig::new(
            "out.mp4",
            ReframeSpec {
                target_width: 607,
                target_height: 1080,
                horizontal_bias: 0.5,
            },
        );
        let err = reframe_asset(&runner, &landscape_asset(), &cfg).unwrap_err();
        assert!(matches!(err, ReframeError::Validation(_)));
    }

    #[test]
    fn encode_failure_discards_the_half_written_output() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("portrait.mp4");
        let out_for_runner = out_path.clone();

        let runner = move |spec: &CommandSpec| {
            assert_eq!(spec.program(), "ffmpeg");
            std::fs::write(&out_for_runner, b"garbage").unwrap();
            Ok(CommandOutput::failed(1).with_stderr("Conversion failed!"))
        };
        let err = reframe_asset(
            &runner,
            &landscape_asset(),
            &ReframeConfig::new(&out_path, portrait_spec()),
        )
        .unwrap_err();

        assert!(matches!(err, ReframeError::Encode(_)));
        assert!(err.to_string().contains("Conversion failed!"));
        assert!(!out_path.exists());
    }

    #[test]
    fn output_asset_reports_target_dimensions() {
        let runner =
            |_: &CommandSpec| Ok(CommandOutput::succeeded().with_stdout(OUT_PROBE_JSON));
        let asset = reframe_asset(
            &runner,
            &landscape_asset(),
            &ReframeConfig::new("out.mp4", portrait_spec()),
        )
        .unwrap();
        assert_eq!((asset.width, asset.height), (720, 1280));
    }
}
