#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order tick driver wiring the Maze Pursuit world to its systems.
//!
//! One [`Simulation::step`] is one sixtieth of a second. While the game is
//! playing, a step runs the world's clock, the wave scheduler and release
//! controller, steering, movement and contact resolution in that order, then
//! lets the game flow react. Outside play only the game flow advances.

mod config;
mod script;

pub use config::{ConfigError, SimulationConfig};
pub use script::{InputScript, ScriptError};

use log::debug;
use maze_pursuit_core::{Command, Direction, Event, Maze};
use maze_pursuit_system_attack_waves::{AttackWaves, WaveStatus};
use maze_pursuit_system_game_flow::{FlowStatus, GameFlow, Phase};
use maze_pursuit_system_movement::Movement;
use maze_pursuit_system_release::Release;
use maze_pursuit_system_steering::Steering;
use maze_pursuit_world::{self as world, query, query::WorldSnapshot, World};

/// Everything an observer needs to present one step.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSnapshot {
    /// Steps run since the session started.
    pub step: u64,
    /// Game flow phase and presentation hints.
    pub flow: FlowStatus,
    /// Attack wave scheduler state.
    pub waves: WaveStatus,
    /// World state.
    pub world: WorldSnapshot,
}

/// A running game session.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    movement: Movement,
    steering: Steering,
    release: Release,
    waves: AttackWaves,
    flow: GameFlow,
    step: u64,
}

impl Simulation {
    /// Creates a session on `maze` and enters the intro phase.
    pub fn new(maze: Maze, config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut simulation = Self {
            world: World::with_rules(maze, config.rules()),
            movement: Movement::default(),
            steering: Steering::new(config.rng_seed, config.emulate_overflow_bug),
            release: Release::new(),
            waves: AttackWaves::new(),
            flow: GameFlow::new(
                config.phases,
                config.starting_lives,
                config.starting_level,
            ),
            step: 0,
        };
        let mut commands = Vec::new();
        simulation.flow.start(&mut commands);
        let mut ignored = Vec::new();
        simulation.run_flow(commands, &mut ignored);
        Ok(simulation)
    }

    /// Runs one step with the player's intended direction, returning every
    /// event the world broadcast.
    ///
    /// On the game-over screen any intent counts as a request for a new game.
    pub fn step(&mut self, intent: Option<Direction>) -> Vec<Event> {
        self.step = self.step.saturating_add(1);
        let mut events = Vec::new();
        match self.flow.phase() {
            Phase::Playing => self.play(intent, &mut events),
            Phase::GameOver if intent.is_some() => self.flow.request_start(),
            _ => {}
        }

        let mut commands = Vec::new();
        self.flow.handle(&events, &mut commands);
        self.flow.advance(&mut commands);
        self.run_flow(commands, &mut events);
        events
    }

    /// Current game flow phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.flow.phase()
    }

    /// Steps run since the session started.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Captures the current step for observers.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            step: self.step,
            flow: self.flow.status(),
            waves: self.waves.status(),
            world: query::snapshot(&self.world),
        }
    }

    fn play(&mut self, intent: Option<Direction>, events: &mut Vec<Event>) {
        let mut stage = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut stage);
        let mut scheduled = Vec::new();
        self.schedule(&stage, &mut scheduled);
        stage.extend(scheduled);

        let mut commands = Vec::new();
        self.steering.handle(
            &stage,
            &query::actor_view(&self.world),
            query::maze(&self.world),
            query::round_status(&self.world),
            intent,
            &mut commands,
        );
        self.execute(commands, &mut stage);

        let mut commands = Vec::new();
        self.movement.handle(
            &stage,
            &query::actor_view(&self.world),
            query::maze(&self.world),
            query::round_status(&self.world),
            &mut commands,
        );
        commands.push(Command::ResolveContacts);
        let mut moved = Vec::new();
        self.execute(commands, &mut moved);

        let mut scheduled = Vec::new();
        self.schedule(&moved, &mut scheduled);

        events.extend(stage);
        events.extend(moved);
        events.extend(scheduled);
    }

    /// Lets the wave scheduler and release controller react to `events`.
    fn schedule(&mut self, events: &[Event], out: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.waves.handle(events, &mut commands);
        self.release
            .handle(events, &query::actor_view(&self.world), &mut commands);
        self.execute(commands, out);
    }

    fn run_flow(&mut self, mut commands: Vec<Command>, events: &mut Vec<Event>) {
        while !commands.is_empty() {
            let mut produced = Vec::new();
            self.execute(std::mem::take(&mut commands), &mut produced);

            let mut follow_up = Vec::new();
            self.schedule(&produced, &mut follow_up);
            let mut steer = Vec::new();
            self.steering.handle(
                &produced,
                &query::actor_view(&self.world),
                query::maze(&self.world),
                query::round_status(&self.world),
                None,
                &mut steer,
            );
            self.execute(steer, &mut follow_up);
            produced.extend(follow_up);

            self.flow.handle(&produced, &mut commands);
            events.extend(produced);
        }
    }

    fn execute(&mut self, commands: Vec<Command>, out: &mut Vec<Event>) {
        for command in commands {
            debug_command(&command);
            world::apply(&mut self.world, command, out);
        }
    }
}

fn debug_command(command: &Command) {
    if !matches!(
        command,
        Command::Tick
            | Command::AdvanceActor { .. }
            | Command::SteerActor { .. }
            | Command::ResolveContacts
    ) {
        debug!("applying {command:?}");
    }
}
