#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Maze Pursuit session.

mod autopilot;
mod config_file;

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use maze_pursuit_core::{ActorId, Direction, Maze, Tile};
use maze_pursuit_simulation::{InputScript, Simulation, SimulationConfig};
use maze_pursuit_system_game_flow::Phase;
use maze_pursuit_world::query;
use serde::Serialize;

/// Command-line arguments for a headless session.
#[derive(Debug, Parser)]
#[command(name = "maze-pursuit", version)]
#[command(about = "Runs a deterministic Maze Pursuit session without a display")]
struct Cli {
    /// Maze layout file; the classic maze is used when omitted
    #[arg(long, value_name = "PATH")]
    maze: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of steps to run before stopping
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// Input script of `<step> <direction>` lines
    #[arg(long, value_name = "PATH", conflicts_with = "autopilot")]
    script: Option<PathBuf>,

    /// Let a path-finding autopilot drive the player
    #[arg(long)]
    autopilot: bool,

    /// Seed for the frightened pursuers' random turns
    #[arg(long)]
    seed: Option<u64>,

    /// Aim the ambusher and flanker exactly when the player faces up
    #[arg(long)]
    no_overflow_bug: bool,

    /// Ignore contacts with hunting pursuers
    #[arg(long)]
    immortal: bool,

    /// Keep running after the game ends instead of stopping
    #[arg(long)]
    keep_going: bool,

    /// Write one JSON line per step to this file
    #[arg(long, value_name = "PATH")]
    record: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => config_file::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.rng_seed = seed;
        }
        if self.no_overflow_bug {
            config.emulate_overflow_bug = false;
        }
        if self.immortal {
            config.immortal = true;
        }
        Ok(config)
    }

    fn maze(&self) -> Result<Maze> {
        match &self.maze {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("failed to read maze at {}", path.display()))?;
                Maze::parse(&source).with_context(|| format!("invalid maze at {}", path.display()))
            }
            None => Maze::classic().context("built-in maze failed to parse"),
        }
    }

    fn script(&self) -> Result<Option<InputScript>> {
        let Some(path) = &self.script else {
            return Ok(None);
        };
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read script at {}", path.display()))?;
        let script = InputScript::parse(&source)
            .with_context(|| format!("invalid script at {}", path.display()))?;
        if script.is_empty() {
            warn!("script at {} holds no entries", path.display());
        }
        Ok(Some(script))
    }
}

/// Where the player's steering comes from.
enum Driver {
    Idle,
    Script(InputScript),
    Autopilot,
}

impl Driver {
    fn intent(&self, step: u64, simulation: &Simulation) -> Option<Direction> {
        match self {
            Self::Idle => None,
            Self::Script(script) => script.direction_at(step),
            Self::Autopilot => {
                let world = simulation.world();
                autopilot::steer(
                    query::maze(world),
                    query::food(world),
                    &query::actor_view(world),
                )
            }
        }
    }
}

/// Final line printed on standard output.
#[derive(Debug, Serialize)]
struct RunSummary {
    steps: u64,
    phase: Phase,
    level: u32,
    score: u32,
    lives: u8,
    food_remaining: u32,
}

#[derive(Debug, Serialize)]
struct StepRecord {
    step: u64,
    phase: Phase,
    score: u32,
    lives: u8,
    actors: Vec<ActorRecord>,
}

#[derive(Debug, Serialize)]
struct ActorRecord {
    id: ActorId,
    tile: Tile,
    direction: Direction,
    state: String,
    target: Option<Tile>,
}

fn record_step(simulation: &Simulation) -> StepRecord {
    let snapshot = simulation.snapshot();
    StepRecord {
        step: snapshot.step,
        phase: snapshot.flow.phase,
        score: snapshot.world.score,
        lives: snapshot.world.lives,
        actors: snapshot
            .world
            .actors
            .iter()
            .map(|actor| ActorRecord {
                id: actor.id,
                tile: actor.tile(),
                direction: actor.motion.direction,
                state: format!("{:?}", actor.state),
                target: actor.target,
            })
            .collect(),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Entry point for the Maze Pursuit command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.simulation_config()?;
    let maze = cli.maze()?;
    let driver = match cli.script()? {
        Some(script) => Driver::Script(script),
        None if cli.autopilot => Driver::Autopilot,
        None => Driver::Idle,
    };
    let mut recorder = match &cli.record {
        Some(path) => Some(BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create record file at {}", path.display())
        })?)),
        None => None,
    };

    let mut simulation = Simulation::new(maze, &config).context("invalid configuration")?;
    info!("{}", query::welcome_banner(simulation.world()));

    for step in 0..cli.ticks {
        let intent = driver.intent(step, &simulation);
        let _ = simulation.step(intent);
        if let Some(writer) = recorder.as_mut() {
            serde_json::to_writer(&mut *writer, &record_step(&simulation))
                .context("failed to serialise step record")?;
            writer
                .write_all(b"\n")
                .context("failed to write step record")?;
        }
        if simulation.phase() == Phase::GameOver && !cli.keep_going {
            info!("game over after {} steps", simulation.steps());
            break;
        }
    }
    if let Some(mut writer) = recorder {
        writer.flush().context("failed to flush step records")?;
    }

    let world = simulation.world();
    let summary = RunSummary {
        steps: simulation.steps(),
        phase: simulation.phase(),
        level: query::level(world),
        score: query::score(world),
        lives: query::lives(world),
        food_remaining: query::food(world).remaining(),
    };
    println!(
        "{}",
        serde_json::to_string(&summary).context("failed to serialise run summary")?
    );
    Ok(())
}
