//! The embedded playback backend: decode, scale, present, pace.
//!
//! Cooperative and single-threaded. Every loop iteration performs input
//! polling, frame decode, and presentation in that fixed order, then sleeps
//! out the remainder of the frame interval. The poll step is reached once
//! per iteration, so worst-case cancellation latency is one frame interval.

use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use image::RgbaImage;
use image::imageops::FilterType;

use crate::error::{ReframeError, ReframeResult};
use crate::playback::{
    DisplaySurface, FrameRGBA, FrameSource, InputEvent, OpenDisplay, PlaybackBackend,
    PlaybackOutcome, SessionState,
};
use crate::probe::VideoAsset;

/// Nominal presentation rate of the embedded renderer.
pub const EMBEDDED_FPS: u32 = 24;

/// One playback session: the explicit state machine behind
/// [`EmbeddedRenderer`].
///
/// `Idle -> Playing` on [`run`](Self::run), then exactly one terminal
/// transition: `Cancelled` on a quit event, `Finished` when the source is
/// exhausted, `Failed` on a decode or present error (returned as `Err`).
/// A session runs once; the display and decoder it ran over are owned by
/// the caller's scope and dropped there exactly once.
#[derive(Debug)]
pub struct PlaybackSession {
    state: SessionState,
    current_frame_index: u64,
    target_fps: u32,
}

impl PlaybackSession {
    pub fn new(target_fps: u32) -> ReframeResult<Self> {
        if target_fps == 0 {
            return Err(ReframeError::playback("target fps must be non-zero"));
        }
        Ok(Self {
            state: SessionState::Idle,
            current_frame_index: 0,
            target_fps,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames presented so far.
    pub fn current_frame_index(&self) -> u64 {
        self.current_frame_index
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Drive the session to a terminal state.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        surface: &mut dyn DisplaySurface,
    ) -> ReframeResult<PlaybackOutcome> {
        if self.state != SessionState::Idle {
            return Err(ReframeError::playback(
                "a playback session runs exactly once",
            ));
        }
        self.state = SessionState::Playing;

        let interval = Duration::from_secs_f64(1.0 / f64::from(self.target_fps));
        let mut next_deadline = Instant::now() + interval;

        loop {
            // Single poll point per iteration. A quit event cancels before
            // the next frame is decoded or presented.
            if surface.poll_input().iter().any(InputEvent::is_quit) {
                self.state = SessionState::Cancelled;
                return Ok(PlaybackOutcome::Cancelled);
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    self.state = SessionState::Finished;
                    return Ok(PlaybackOutcome::Finished);
                }
                Err(err) => {
                    self.state = SessionState::Failed;
                    return Err(err);
                }
            };

            let target = surface.resolution();
            let frame = if (frame.width, frame.height) == target {
                frame
            } else {
                match scale_frame(frame, target) {
                    Ok(frame) => frame,
                    Err(err) => {
                        self.state = SessionState::Failed;
                        return Err(err);
                    }
                }
            };

            if let Err(err) = surface.present(&frame) {
                self.state = SessionState::Failed;
                return Err(err);
            }
            self.current_frame_index += 1;

            let now = Instant::now();
            if now < next_deadline {
                std::thread::sleep(next_deadline - now);
            }
            next_deadline += interval;
            if next_deadline < now {
                // Way behind (slow decode); re-anchor instead of sprinting.
                next_deadline = now + interval;
            }
        }
    }
}

/// Resample a frame to the surface resolution.
fn scale_frame(frame: FrameRGBA, (width, height): (u32, u32)) -> ReframeResult<FrameRGBA> {
    if width == 0 || height == 0 {
        return Err(ReframeError::playback(
            "display surface reports a zero-sized resolution",
        ));
    }
    let image = RgbaImage::from_raw(frame.width, frame.height, frame.data).ok_or_else(|| {
        ReframeError::playback("frame byte length does not match its dimensions")
    })?;
    let scaled = image::imageops::resize(&image, width, height, FilterType::Triangle);
    Ok(FrameRGBA {
        width,
        height,
        data: scaled.into_raw(),
    })
}

/// Streaming frame decoder over a piped `ffmpeg` child.
///
/// Reads one `width * height * 4` RGBA frame per pull from the child's
/// stdout. A clean end of stream reaps the child and checks its exit
/// status; dropping the source mid-stream (a cancelled session) kills and
/// reaps it instead.
pub struct FfmpegFrameSource {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    finished: bool,
}

impl FfmpegFrameSource {
    /// Spawn the decoder for `asset`.
    pub fn spawn(asset: &VideoAsset) -> ReframeResult<Self> {
        Self::spawn_for(&asset.path, asset.width, asset.height)
    }

    pub fn spawn_for(path: &Path, width: u32, height: u32) -> ReframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReframeError::playback(
                "cannot decode a zero-sized video",
            ));
        }
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error"])
            .arg("-i")
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                ReframeError::playback(format!(
                    "failed to spawn ffmpeg for decode (is it installed and on PATH?): {e}"
                ))
            })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ReframeError::playback("failed to open ffmpeg stdout (unexpected)")
        })?;
        Ok(Self {
            child,
            stdout,
            width,
            height,
            finished: false,
        })
    }

    fn abort(&mut self) {
        self.finished = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn finish(&mut self) -> ReframeResult<()> {
        self.finished = true;
        let status = self
            .child
            .wait()
            .map_err(|e| ReframeError::playback(format!("failed to reap decoder: {e}")))?;
        if !status.success() {
            return Err(ReframeError::playback(format!(
                "ffmpeg decode exited with status {status}"
            )));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> ReframeResult<Option<FrameRGBA>> {
        if self.finished {
            return Ok(None);
        }
        let frame_len = self.width as usize * self.height as usize * 4;
        let mut data = vec![0u8; frame_len];
        let mut filled = 0usize;
        while filled < frame_len {
            match self.stdout.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.abort();
                    return Err(ReframeError::playback(format!(
                        "failed to read decoded frame: {e}"
                    )));
                }
            }
        }
        if filled == 0 {
            self.finish()?;
            return Ok(None);
        }
        if filled < frame_len {
            self.abort();
            return Err(ReframeError::playback(
                "decoder stream ended mid-frame",
            ));
        }
        Ok(Some(FrameRGBA {
            width: self.width,
            height: self.height,
            data,
        }))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if !self.finished {
            self.abort();
        }
    }
}

/// In-process playback backend over a caller-provided display.
pub struct EmbeddedRenderer<D: OpenDisplay> {
    display: D,
    target_fps: u32,
}

impl<D: OpenDisplay> EmbeddedRenderer<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            target_fps: EMBEDDED_FPS,
        }
    }

    pub fn with_fps(mut self, target_fps: u32) -> Self {
        self.target_fps = target_fps;
        self
    }
}

impl<D: OpenDisplay> PlaybackBackend for EmbeddedRenderer<D> {
    fn play(&mut self, asset: &VideoAsset) -> ReframeResult<PlaybackOutcome> {
        let mut source = FfmpegFrameSource::spawn(asset)?;
        let mut surface = self.display.open()?;
        let mut session = PlaybackSession::new(self.target_fps)?;
        let outcome = session.run(&mut source, &mut surface)?;
        tracing::info!(
            frames = session.current_frame_index(),
            state = ?session.state(),
            "playback session ended"
        );
        // Surface and decoder drop here: released exactly once per session.
        Ok(outcome)
    }
}
