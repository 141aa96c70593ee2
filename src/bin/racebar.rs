use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "racebar", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the statistics present in a records file.
    Stats(StatsArgs),
    /// Print every frame of one statistic as JSON, without timing.
    Frames(SelectArgs),
    /// Play one statistic in real time, one JSON event per line on stdout.
    Play(SelectArgs),
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Input records JSON (array of `{player, stat, date, value}`).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SelectArgs {
    /// Input records JSON (array of `{player, stat, date, value}`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Statistic to play.
    #[arg(long)]
    stat: String,

    /// Optional configuration JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Aggregation mode.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Leaderboard length per frame.
    #[arg(long)]
    top_k: Option<usize>,

    /// Time each frame stays on screen, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Bucketing granularity.
    #[arg(long, value_enum)]
    granularity: Option<GranularityChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Snapshot,
    Cumulative,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GranularityChoice {
    Exact,
    Day,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Stats(args) => cmd_stats(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn read_records(path: &Path) -> anyhow::Result<Vec<racebar::RawRecord>> {
    racebar::RawRecord::from_path(path)
        .with_context(|| format!("read records '{}'", path.display()))
}

fn build_config(args: &SelectArgs) -> anyhow::Result<racebar::RaceConfig> {
    let mut cfg = match &args.config {
        Some(path) => racebar::RaceConfig::from_path(path)
            .with_context(|| format!("read config '{}'", path.display()))?,
        None => racebar::RaceConfig::default(),
    };
    if let Some(mode) = args.mode {
        cfg.mode = match mode {
            ModeChoice::Snapshot => racebar::AggregationMode::Snapshot,
            ModeChoice::Cumulative => racebar::AggregationMode::Cumulative,
        };
    }
    if let Some(k) = args.top_k {
        cfg.top_k = k;
    }
    if let Some(ms) = args.delay_ms {
        cfg.frame_delay_ms = ms;
    }
    if let Some(g) = args.granularity {
        cfg.granularity = match g {
            GranularityChoice::Exact => racebar::Granularity::ExactTimestamp,
            GranularityChoice::Day => racebar::Granularity::Day,
        };
    }
    cfg.validate()?;
    Ok(cfg)
}

fn open_session<S: racebar::FrameSink + 'static>(
    args: &SelectArgs,
    sink: S,
) -> anyhow::Result<racebar::RaceSession<S>> {
    let records = read_records(&args.in_path)?;
    let cfg = build_config(args)?;
    let (sess, norm) = racebar::RaceSession::from_records(&records, cfg, sink)?;
    for r in &norm.rejected {
        eprintln!("skipped record {}: {}", r.index, r.error);
    }
    Ok(sess)
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let records = read_records(&args.in_path)?;
    let norm = racebar::normalize(&records);
    for stat in racebar::statistics(&norm.observations) {
        println!("{stat}");
    }
    Ok(())
}

fn cmd_frames(args: SelectArgs) -> anyhow::Result<()> {
    let sess = open_session(&args, racebar::InMemorySink::new())?;
    let frames = sess.frames(&args.stat)?;
    let json = serde_json::to_string_pretty(&frames).context("encode frames")?;
    println!("{json}");
    Ok(())
}

fn cmd_play(args: SelectArgs) -> anyhow::Result<()> {
    let sink = racebar::JsonLinesSink::new(std::io::stdout());
    let mut sess = open_session(&args, sink)?;
    sess.play(&args.stat)?;
    let outcome = sess.wait();
    if let Some(err) = sess.scheduler_mut().take_sink_error() {
        return Err(err).context("playback stopped");
    }
    eprintln!("playback {outcome:?}");
    Ok(())
}
