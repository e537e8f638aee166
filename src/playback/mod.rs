//! Playback sessions over a finished asset.
//!
//! Two interchangeable backends satisfy one contract,
//! [`PlaybackBackend::play`]: the [embedded renderer](embedded) decodes
//! frames itself and drives a cooperative present/poll loop, while the
//! [external delegate](external) hands the whole session to a full-screen
//! player process. Callers observe only the [`PlaybackOutcome`].

/// Embedded renderer: in-process decode, scale, present loop.
pub mod embedded;
/// External full-screen player delegate.
pub mod external;

pub use embedded::{EMBEDDED_FPS, EmbeddedRenderer, FfmpegFrameSource, PlaybackSession};
pub use external::ExternalPlayer;

use crate::error::ReframeResult;
use crate::probe::VideoAsset;

/// How a playback session ended, short of an error.
///
/// A device or decode failure is the `Err` arm of [`PlaybackBackend::play`],
/// not a third outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// All frames were presented.
    Finished,
    /// The viewer ended the session early.
    Cancelled,
}

/// Observable state of a playback session.
///
/// `Idle -> Playing -> {Finished | Cancelled | Failed}`; the three
/// terminal states release the display/decoder resources exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Playing,
    Finished,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled | Self::Failed)
    }
}

/// Pending input drained from a display surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// The windowing system asked the session to close.
    CloseRequested,
    /// The viewer pressed escape.
    Escape,
    /// Any other input; ignored by the session loop.
    Other,
}

impl InputEvent {
    /// Whether this event cancels the session.
    pub fn is_quit(&self) -> bool {
        matches!(self, Self::CloseRequested | Self::Escape)
    }
}

/// One decoded frame, tightly packed RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major.
    pub data: Vec<u8>,
}

/// Pull-based source of decoded frames in presentation order.
///
/// `Ok(None)` means the frames are exhausted; after that the source must
/// keep returning `Ok(None)`.
pub trait FrameSource {
    fn next_frame(&mut self) -> ReframeResult<Option<FrameRGBA>>;
}

/// The display resource a session presents to.
///
/// A surface lives for exactly one session: acquired on entry to
/// `Playing`, dropped on any transition to a terminal state.
pub trait DisplaySurface {
    /// Current output resolution; frames are scaled to this before
    /// presentation.
    fn resolution(&self) -> (u32, u32);

    /// Drain all input events that arrived since the last poll.
    fn poll_input(&mut self) -> Vec<InputEvent>;

    /// Present one frame already scaled to [`Self::resolution`].
    fn present(&mut self, frame: &FrameRGBA) -> ReframeResult<()>;
}

/// Opens the scoped display resource for one session.
pub trait OpenDisplay {
    type Surface: DisplaySurface;

    fn open(&mut self) -> ReframeResult<Self::Surface>;
}

/// Common contract of both playback backends.
pub trait PlaybackBackend {
    /// Present `asset` until it finishes, the viewer cancels, or the
    /// session fails.
    fn play(&mut self, asset: &VideoAsset) -> ReframeResult<PlaybackOutcome>;
}
