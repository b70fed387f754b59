use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tilelink::{
    BlockConfig, GridEngine, GridHost as _, Millis, Rng64, Scene, SceneEvent, SceneRecorder,
    SvgOverlay, UniformGrid,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tilelink", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a block and print every scene mutation as JSON lines.
    Timeline(TimelineArgs),
    /// Render the line overlay at one instant as SVG.
    Snapshot(SnapshotArgs),
    /// Print the routed path of every connection in one round.
    Routes(RoutesArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Block configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Edge length of one tile in pixels.
    #[arg(long, default_value_t = 80.0)]
    tile_size: f64,

    /// Gap between tiles in pixels.
    #[arg(long, default_value_t = 8.0)]
    gap: f64,

    /// Seed for reveal delays.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Simulated run length in milliseconds.
    #[arg(long, default_value_t = 12_000)]
    until_ms: u64,

    /// Expand the subgrid at this instant.
    #[arg(long)]
    expand_at_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Instant to capture, in milliseconds since the block came into view.
    #[arg(long)]
    at_ms: u64,

    /// Output SVG path. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RoutesArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Round index (0-based).
    #[arg(long, default_value_t = 0)]
    round: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Timeline(args) => cmd_timeline(args),
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Routes(args) => cmd_routes(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<BlockConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let cfg = BlockConfig::from_json(&json).with_context(|| "parse block config")?;
    Ok(cfg)
}

fn build_engine<S: Scene>(
    layout: &LayoutArgs,
    scene: impl FnOnce(&UniformGrid) -> S,
) -> anyhow::Result<GridEngine<UniformGrid, S>> {
    let cfg = read_config(&layout.config)?;
    let host = UniformGrid::new(cfg.grid.dims()?, layout.tile_size, layout.gap);
    let scene = scene(&host);
    let engine = GridEngine::new(cfg, host, scene)?.with_random(Rng64::new(layout.seed));
    Ok(engine)
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(&args.layout, |_| SceneRecorder::new())?;
    engine.observation_unavailable();

    let until = Millis(args.until_ms);
    if let Some(at) = args.expand_at_ms.map(Millis).filter(|at| *at <= until) {
        engine.advance_to(at);
        if !engine.expand() {
            tracing::warn!("subgrid is disabled or already expanded");
        }
    }
    engine.advance_to(until);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for stamped in &engine.scene().events {
        let line = serde_json::to_string(stamped).with_context(|| "encode scene event")?;
        writeln!(out, "{line}").with_context(|| "write timeline")?;
    }
    let state = serde_json::to_string(&engine.state()).with_context(|| "encode engine state")?;
    eprintln!("final state: {state}");
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(&args.layout, |host| {
        SvgOverlay::new(host.wrapper_rect().size())
    })?;
    engine.observation_unavailable();
    let at = Millis(args.at_ms);
    engine.advance_to(at);
    let svg = engine.scene().render(at);

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&path, svg)
                .with_context(|| format!("write svg '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{svg}"),
    }
    Ok(())
}

fn cmd_routes(args: RoutesArgs) -> anyhow::Result<()> {
    let mut engine = build_engine(&args.layout, |_| SceneRecorder::new())?;
    let rounds = engine.config().animation_rounds.len();
    if args.round >= rounds {
        anyhow::bail!("round {} out of range; the block has {rounds} rounds", args.round);
    }

    for _ in 0..args.round {
        engine.play_round();
    }
    engine.scene_mut().clear();
    engine.play_round();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in engine.scene().events() {
        if let SceneEvent::LineInserted { .. } = event {
            let line = serde_json::to_string(event).with_context(|| "encode route")?;
            writeln!(out, "{line}").with_context(|| "write routes")?;
        }
    }
    Ok(())
}
