use std::path::Path;
use std::process::Command;

fn ffmpeg_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

fn synth_clip(path: &Path) {
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=size=320x180:rate=30",
            "-t",
            "1",
            "-pix_fmt",
            "yuv420p",
            "-c:v",
            "libx264",
        ])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "ffmpeg failed creating the synth clip");
}

#[test]
fn cli_rejects_missing_arguments() {
    let status = Command::new(env!("CARGO_BIN_EXE_reframe"))
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_rejects_a_backwards_time_range() {
    let output = Command::new(env!("CARGO_BIN_EXE_reframe"))
        .args([
            "fetch",
            "https://example.test/v",
            "--start",
            "00:02:00",
            "--end",
            "00:01:00",
            "--out",
            "clip.mp4",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation error"), "stderr: {stderr}");
}

#[test]
fn cli_reframe_writes_a_portrait_clip() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    synth_clip(&clip);
    let out = dir.path().join("portrait.mp4");

    let status = Command::new(env!("CARGO_BIN_EXE_reframe"))
        .arg("reframe")
        .arg("--in")
        .arg(&clip)
        .arg("--out")
        .arg(&out)
        .args(["--width", "90", "--height", "160"])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out.is_file());
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}
