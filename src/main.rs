mod config;
mod game;
mod snake;
mod state;
mod term;

use std::{fs::File, path::{Path, PathBuf}, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::GameConfig;
use crate::game::{Flow, SnakeGame};
use crate::state::GameState;

pub type TermInt = u16;
pub type TermCoords = (u16, u16);
/// World position, a multiple of the cell size on both axes.
pub type Coords = (i32, i32);

#[derive(Parser)]
#[command(name = "wrapsnake")]
#[command(about = "Snake on a wrap-around grid, in the terminal")]
struct Args {
    /// World width in logical units
    #[arg(long, default_value_t = config::WORLD_WIDTH)]
    width: i32,

    /// World height in logical units
    #[arg(long, default_value_t = config::WORLD_HEIGHT)]
    height: i32,

    /// Edge length of a grid cell
    #[arg(long, default_value_t = config::GRID_CELL)]
    cell: i32,

    /// Seconds between two moves of the snake
    #[arg(long, default_value_t = config::MOVE_TIME)]
    interval: f32,

    /// Points per apple
    #[arg(long, default_value_t = config::POINTS_PER_APPLE)]
    reward: u32,

    /// Seed for apple placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Frames drawn per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Write logs here (filtered by RUST_LOG, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = GameConfig {
        world_width: args.width,
        world_height: args.height,
        cell: args.cell,
        move_interval: args.interval,
        apple_reward: args.reward,
    };
    config.validate().context("invalid game configuration")?;
    tracing::info!(?config, seed = ?args.seed, "starting");

    let state = match args.seed {
        Some(seed) => GameState::with_seed(config, seed),
        None => GameState::from_entropy(config),
    };

    let mut game = SnakeGame::new(state, args.fps)?;
    let res = run(&mut game);

    // Leave the terminal usable whatever happened
    game.restore();
    res
}

fn run(game: &mut SnakeGame) -> Result<()> {
    game.initialize()?;
    if game.show_intro()? == Flow::Quit {
        return Ok(());
    }
    game.play()
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // The game owns the terminal, so logs only ever go to a file
    let path = match path {
        Some(path) => path,
        None => return Ok(()),
    };

    let file = File::create(path)
        .with_context(|| format!("failed creating log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
