//! Narrow interface to the external command-line collaborators.
//!
//! Every stage that shells out (downloader, encoder, player) goes through
//! [`CommandRunner`], and each stage owns the interpretation of the exit
//! status into its own error kind. Process management stays here; pipeline
//! logic never touches `std::process` directly except for the streaming
//! frame decoder, which needs a live child.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ReframeResult;

/// One external tool invocation: a program name and its argument vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[OsString] {
        &self.args
    }

    /// Loggable single-line rendering of the invocation.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Captured result of a finished tool invocation.
#[derive(Clone, Debug, Default)]
pub struct CommandOutput {
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code when the process exited normally.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<Vec<u8>>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<Vec<u8>>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Trimmed, lossily decoded stderr for error messages.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    /// `"exit code N"` or `"terminated by signal"` for error messages.
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Blocking invocation of one external tool.
///
/// Implemented by [`SystemRunner`] for real child processes and by plain
/// closures in tests, so stage logic can be exercised against scripted
/// exits without the tools installed.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput>;
}

impl<F> CommandRunner for F
where
    F: Fn(&CommandSpec) -> std::io::Result<CommandOutput>,
{
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        self(spec)
    }
}

/// Runs tools as real child processes with captured stdio.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        let output = Command::new(spec.program())
            .args(spec.argv())
            .stdin(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Whether `program` answers a version probe on PATH.
pub fn tool_on_path(runner: &dyn CommandRunner, program: &str, version_arg: &str) -> bool {
    runner
        .run(&CommandSpec::new(program).arg(version_arg))
        .map(|out| out.success)
        .unwrap_or(false)
}

/// Create the parent directory of an output path when missing.
pub fn ensure_parent_dir(path: &Path) -> ReframeResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Remove whatever a failed tool left at the intended output path.
///
/// Failed stages must not leave a half-written file where the next stage
/// would find it; a missing file is fine.
pub fn discard_partial_output(path: &Path) {
    if let Err(err) = std::fs::remove_file(path)
        && err.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %path.display(), %err, "could not remove partial output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builds_program_and_argv() {
        let spec = CommandSpec::new("ffmpeg").arg("-i").args(["a.mp4", "b.mp4"]);
        assert_eq!(spec.program(), "ffmpeg");
        assert_eq!(spec.argv().len(), 3);
        assert_eq!(spec.display_line(), "ffmpeg -i a.mp4 b.mp4");
    }

    #[test]
    fn closures_act_as_runners() {
        let runner = |spec: &CommandSpec| {
            assert_eq!(spec.program(), "yt-dlp");
            Ok(CommandOutput::failed(1).with_stderr("boom"))
        };
        let out = runner.run(&CommandSpec::new("yt-dlp")).unwrap();
        assert!(!out.success);
        assert_eq!(out.stderr_text(), "boom");
        assert_eq!(out.status_text(), "exit code 1");
    }

    #[test]
    fn tool_probe_reports_missing_tools() {
        let missing = |_: &CommandSpec| -> std::io::Result<CommandOutput> {
            Err(std::io::Error::from(std::io::ErrorKind::NotFound))
        };
        assert!(!tool_on_path(&missing, "yt-dlp", "--version"));

        let present = |_: &CommandSpec| Ok(CommandOutput::succeeded());
        assert!(tool_on_path(&present, "ffmpeg", "-version"));
    }

    #[test]
    fn discard_partial_output_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.mp4");
        discard_partial_output(&path);

        std::fs::write(&path, b"partial").unwrap();
        discard_partial_output(&path);
        assert!(!path.exists());
    }
}
