use std::path::PathBuf;

use clap::{Parser, Subcommand};

use reframe::{
    AcquireConfig, ExternalPlayer, PipelineConfig, PlaybackBackend as _, PlaybackOutcome,
    ReframeConfig, ReframeSpec, SystemRunner, TimeRange, VideoAsset, acquire_segment, probe_video,
    reframe_path, run_pipeline,
};

#[derive(Parser, Debug)]
#[command(name = "reframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download a time-bounded segment of a remote source (requires
    /// `yt-dlp` and `ffmpeg` on PATH).
    Fetch(FetchArgs),
    /// Reframe a local clip to a target aspect (requires `ffmpeg`).
    Reframe(ReframeArgs),
    /// Play a local clip full screen (requires `ffplay` unless a player
    /// is given).
    Play(PlayArgs),
    /// Fetch, reframe, and play in one go.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct FetchArgs {
    /// Source URL or identifier understood by the downloader.
    url: String,

    /// Segment start (seconds or HH:MM:SS).
    #[arg(long)]
    start: String,

    /// Segment end (seconds or HH:MM:SS).
    #[arg(long)]
    end: String,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ReframeArgs {
    /// Input clip.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    shape: ShapeArgs,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Clip to present.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Full-screen player binary to delegate to.
    #[arg(long, default_value = "ffplay")]
    player: String,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Source URL or identifier understood by the downloader.
    url: String,

    /// Segment start (seconds or HH:MM:SS).
    #[arg(long)]
    start: String,

    /// Segment end (seconds or HH:MM:SS).
    #[arg(long)]
    end: String,

    /// Directory receiving the intermediate clip and the reframed output.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[command(flatten)]
    shape: ShapeArgs,

    /// Full-screen player binary to delegate to.
    #[arg(long, default_value = "ffplay")]
    player: String,
}

#[derive(Parser, Debug)]
struct ShapeArgs {
    /// Output width in pixels.
    #[arg(long, default_value_t = 720)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 1280)]
    height: u32,

    /// Horizontal anchor: 0 keeps the left edge, 1 the right, 0.5 the
    /// center.
    #[arg(long, default_value_t = 0.5)]
    bias: f64,
}

impl ShapeArgs {
    fn to_spec(&self) -> ReframeSpec {
        ReframeSpec {
            target_width: self.width,
            target_height: self.height,
            horizontal_bias: self.bias,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Fetch(args) => cmd_fetch(args),
        Command::Reframe(args) => cmd_reframe(args),
        Command::Play(args) => cmd_play(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn cmd_fetch(args: FetchArgs) -> anyhow::Result<()> {
    let range = TimeRange::parse(&args.start, &args.end)?;
    let asset = acquire_segment(&SystemRunner, &AcquireConfig::new(args.url, args.out, range))?;
    print_asset("fetched", &asset);
    Ok(())
}

fn cmd_reframe(args: ReframeArgs) -> anyhow::Result<()> {
    let cfg = ReframeConfig::new(args.out, args.shape.to_spec());
    let asset = reframe_path(&SystemRunner, &args.in_path, &cfg)?;
    print_asset("reframed", &asset);
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let runner = SystemRunner;
    let asset = probe_video(&runner, &args.in_path)?;
    let outcome = ExternalPlayer::new(&runner)
        .with_program(args.player)
        .play(&asset)?;
    print_outcome(outcome);
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let runner = SystemRunner;
    let cfg = PipelineConfig {
        source_ref: args.url,
        range: TimeRange::parse(&args.start, &args.end)?,
        spec: args.shape.to_spec(),
        clip_path: args.out_dir.join("clip.mp4"),
        reframed_path: args.out_dir.join("portrait.mp4"),
        overwrite: true,
    };
    let mut backend = ExternalPlayer::new(&runner).with_program(args.player);
    let outcome = run_pipeline(&runner, &mut backend, &cfg)?;
    print_outcome(outcome);
    Ok(())
}

fn print_asset(verb: &str, asset: &VideoAsset) {
    match asset.duration_hint {
        Some(duration) => println!(
            "{verb} {} ({}x{}, {duration:.1}s)",
            asset.path.display(),
            asset.width,
            asset.height
        ),
        None => println!(
            "{verb} {} ({}x{})",
            asset.path.display(),
            asset.width,
            asset.height
        ),
    }
}

fn print_outcome(outcome: PlaybackOutcome) {
    match outcome {
        PlaybackOutcome::Finished => println!("playback finished"),
        PlaybackOutcome::Cancelled => println!("playback cancelled"),
    }
}
