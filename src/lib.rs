//! Reframe turns a remotely referenced video into a locally playable
//! portrait clip.
//!
//! # Pipeline overview
//!
//! 1. **Acquire**: download the source and trim it to a [`TimeRange`]
//!    (`yt-dlp` + `ffmpeg`).
//! 2. **Probe**: read dimensions/duration into a [`VideoAsset`]
//!    (`ffprobe`).
//! 3. **Reframe**: resolve pure crop/scale geometry, then run the
//!    crop-before-scale filter chain at a fixed 30 fps H.264/AAC profile
//!    (`ffmpeg`).
//! 4. **Play**: present the result through a [`PlaybackBackend`] — the
//!    embedded poll/decode/present loop, or a delegated full-screen
//!    player process.
//!
//! The key design constraints:
//!
//! - **No codec code**: decoding, encoding, and transport are delegated to
//!   the system tools through one narrow [`CommandRunner`] seam.
//! - **Deterministic geometry**: the crop resolver is pure; identical
//!   inputs always yield identical crops.
//! - **Bounded cancellation**: the embedded playback loop polls input once
//!   per iteration, so cancellation lands within one frame interval.
//! - **No partial hand-offs**: a failed stage removes its half-written
//!   output and the next stage never sees it.
#![forbid(unsafe_code)]

pub mod acquire;
pub mod command;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod playback;
pub mod probe;
pub mod reframe;
pub mod timecode;

pub use acquire::{AcquireConfig, acquire_segment};
pub use command::{CommandOutput, CommandRunner, CommandSpec, SystemRunner, tool_on_path};
pub use error::{ReframeError, ReframeResult};
pub use geometry::{CropRect, ReframeSpec, ResolvedGeometry, resolve};
pub use pipeline::{PipelineConfig, run_pipeline};
pub use playback::{
    DisplaySurface, EmbeddedRenderer, ExternalPlayer, FfmpegFrameSource, FrameRGBA, FrameSource,
    InputEvent, OpenDisplay, PlaybackBackend, PlaybackOutcome, PlaybackSession, SessionState,
};
pub use probe::{VideoAsset, probe_video};
pub use reframe::{REFRAME_FPS, ReframeConfig, reframe_asset, reframe_path};
pub use timecode::{TimeRange, Timestamp};
