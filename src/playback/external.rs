use crate::command::{CommandRunner, CommandSpec};
use crate::error::{ReframeError, ReframeResult};
use crate::playback::{PlaybackBackend, PlaybackOutcome};
use crate::probe::VideoAsset;

/// Playback backend that hands the whole session to an external
/// full-screen player process and blocks until it exits.
///
/// This backend has no frame-level visibility: completion and viewer
/// cancellation are both observed only as process exit. Common players
/// (including the default `ffplay`) exit 0 in both cases, so a cancelled
/// session is indistinguishable from a finished one and is reported as
/// [`PlaybackOutcome::Finished`]. Only a player with disjoint exit codes
/// could do better, and none is assumed.
pub struct ExternalPlayer<'r> {
    runner: &'r dyn CommandRunner,
    program: String,
    args: Vec<String>,
}

impl<'r> ExternalPlayer<'r> {
    /// Full-screen `ffplay` session that exits at end of stream.
    pub fn new(runner: &'r dyn CommandRunner) -> Self {
        Self {
            runner,
            program: "ffplay".to_string(),
            args: ["-fs", "-autoexit", "-loglevel", "error"]
                .map(String::from)
                .to_vec(),
        }
    }

    /// Use a different player binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Replace the fixed player arguments (the asset path is always
    /// appended last).
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl PlaybackBackend for ExternalPlayer<'_> {
    fn play(&mut self, asset: &VideoAsset) -> ReframeResult<PlaybackOutcome> {
        let spec = CommandSpec::new(&self.program)
            .args(&self.args)
            .arg(&asset.path);
        tracing::debug!(cmd = %spec.display_line(), "delegating playback");

        let out = self.runner.run(&spec).map_err(|e| {
            ReframeError::playback(format!(
                "failed to run {} (is it installed and on PATH?): {e}",
                self.program
            ))
        })?;
        if !out.success {
            return Err(ReframeError::playback(format!(
                "{} failed ({}): {}",
                self.program,
                out.status_text(),
                out.stderr_text()
            )));
        }
        Ok(PlaybackOutcome::Finished)
    }
}
