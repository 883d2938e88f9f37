use std::path::{Path, PathBuf};

use anyhow::Context;
use blocky_common::{Direction, Pose};
use blocky_grid::GridMap;
use blocky_input::Action;
use blocky_kernel::{EngineConfig, Session};
use blocky_render::{DebugTextRenderer, Renderer};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blocky-cli", about = "Inspect maze maps and run headless walks")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML engine config (palette, speeds, collision)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Print a top-down view of a map with the spawn marked
    Map {
        #[arg(short, long)]
        map: PathBuf,
    },
    /// Hold keys for a number of frames and report where the camera ends up
    Walk {
        #[arg(short, long)]
        map: PathBuf,
        /// Number of frames to simulate
        #[arg(short, long, default_value = "120")]
        frames: u32,
        /// Directions held for the whole walk, e.g. `forward,right`
        #[arg(long, value_delimiter = ',', value_parser = parse_direction)]
        hold: Vec<Direction>,
        /// Seconds per frame
        #[arg(short, long, default_value = "0.0166667")]
        step: f32,
    },
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "forward" => Ok(Direction::Forward),
        "backward" => Ok(Direction::Backward),
        "left" => Ok(Direction::Left),
        "right" => Ok(Direction::Right),
        other => Err(format!(
            "unknown direction `{other}` (expected forward, backward, left or right)"
        )),
    }
}

/// Outcome of a scripted walk.
#[derive(Debug)]
struct WalkReport {
    frames: u32,
    pose: Pose,
    /// Frames after which the footprint overlapped a wall.
    wall_overlaps: u32,
}

fn walk(session: &mut Session, hold: &[Direction], frames: u32, step: f32) -> WalkReport {
    for &direction in hold {
        session.apply(Action::press(direction));
    }

    let mut wall_overlaps = 0;
    for _ in 0..frames {
        let pose = session.advance(step);
        if session.resolver().overlaps_solid(pose.position, session.grid()) {
            wall_overlaps += 1;
        }
    }

    WalkReport {
        frames,
        pose: session.pose(),
        wall_overlaps,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => {
            EngineConfig::load(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn load_map(path: &Path, config: &EngineConfig) -> anyhow::Result<GridMap> {
    GridMap::load(path, &config.palette).with_context(|| format!("loading map {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;
    let viewport = (config.window.width, config.window.height);

    match cli.command {
        Commands::Info => {
            println!("blocky-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("grid: {}", blocky_grid::crate_info());
            println!("nav: {}", blocky_nav::crate_info());
            println!("render: {}", blocky_render::crate_info());
            println!("input: {}", blocky_input::crate_info());
            println!("kernel: {}", blocky_kernel::crate_info());
            println!(
                "defaults: radius={} margin={} move_speed={} turn_speed={} fov={}",
                config.collision.radius,
                config.collision.margin,
                config.movement.move_speed,
                config.movement.turn_speed,
                config.projection.fov_degrees
            );
        }
        Commands::Map { map } => {
            let grid = load_map(&map, &config)?;
            let session = Session::new(grid, &config, viewport);
            print!("{}", DebugTextRenderer::new().render(session.grid(), &session.view()));
        }
        Commands::Walk {
            map,
            frames,
            hold,
            step,
        } => {
            let grid = load_map(&map, &config)?;
            let mut session = Session::new(grid, &config, viewport);
            tracing::debug!(?hold, frames, step, "starting walk");
            let report = walk(&mut session, &hold, frames, step);

            print!("{}", DebugTextRenderer::new().render(session.grid(), &session.view()));
            println!(
                "Walked {} frames: pos=({:.3}, {:.3}) yaw={:.3} cell=({}, {})",
                report.frames,
                report.pose.position.x,
                report.pose.position.z,
                report.pose.yaw,
                report.pose.cell().x,
                report.pose.cell().z
            );
            println!(
                "Wall overlap: {}",
                if report.wall_overlaps == 0 {
                    "never".to_string()
                } else {
                    format!("{} frames", report.wall_overlaps)
                }
            );
        }
    }

    Ok(())
}
