#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Direction decisions for pursuers and intent forwarding for the player.
//!
//! Pursuers commit to a new direction once per tile: on the tick after they
//! enter a tile, the system resolves their target and picks the neighbor
//! closest to it without ever turning around. A pursuer left facing a wall
//! by a forced reversal is decided again on the next tick.

use log::trace;
use maze_pursuit_core::{
    ActorId, ActorSnapshot, ActorView, Command, Direction, Event, Maze, PursuerId, PursuerState,
    RoundStatus, Tile,
};
use maze_pursuit_system_targeting::{Strategy, TargetContext};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const RNG_STREAM_FRIGHTENED: &str = "frightened";

/// Picks the direction an actor commits to when leaving `tile`.
///
/// Candidates are scanned in [`Direction::TIE_BREAK_ORDER`]. The reverse of
/// `current` is never offered, Up is dropped when `restrict_up` is set and the
/// tile above is upward-restricted, and tiles the actor may not enter are
/// skipped. The remaining candidate whose neighbor lies closest to `target`
/// wins, earlier candidates winning ties. With no candidate left the current
/// direction is kept.
#[must_use]
pub fn decide(
    maze: &Maze,
    tile: Tile,
    current: Direction,
    target: Tile,
    restrict_up: bool,
    through_door: bool,
) -> Direction {
    let mut best: Option<(Direction, i64)> = None;
    for candidate in Direction::TIE_BREAK_ORDER {
        if candidate == current.opposite() {
            continue;
        }
        let neighbor = maze.neighbor(tile, candidate);
        if restrict_up && candidate == Direction::Up && maze.is_upward_restricted(neighbor) {
            continue;
        }
        if !maze.is_enterable(neighbor, through_door) {
            continue;
        }
        let distance = neighbor.distance_squared(target);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((candidate, distance));
        }
    }
    best.map_or(current, |(direction, _)| direction)
}

/// Derives the frightened-fleeing seed used on `level`.
#[must_use]
pub fn derive_level_seed(base: u64, level: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(RNG_STREAM_FRIGHTENED.as_bytes());
    hasher.update(level.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Pure system that turns targets into direction commitments.
#[derive(Debug)]
pub struct Steering {
    seed: u64,
    emulate_overflow_bug: bool,
    rng: ChaCha8Rng,
}

impl Steering {
    /// Creates a steering system seeded for level 1.
    #[must_use]
    pub fn new(seed: u64, emulate_overflow_bug: bool) -> Self {
        Self {
            seed,
            emulate_overflow_bug,
            rng: ChaCha8Rng::seed_from_u64(derive_level_seed(seed, 1)),
        }
    }

    /// Consumes world events and views, emitting `SteerActor` commands.
    ///
    /// `player_intent` is the direction requested by the input collaborator
    /// for this tick, if any.
    pub fn handle(
        &mut self,
        events: &[Event],
        actors: &ActorView,
        maze: &Maze,
        status: RoundStatus,
        player_intent: Option<Direction>,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        for event in events {
            match event {
                Event::LevelStarted { level } => {
                    self.rng = ChaCha8Rng::seed_from_u64(derive_level_seed(self.seed, *level));
                }
                Event::TimeAdvanced { .. } => ticked = true,
                _ => {}
            }
        }
        if !ticked {
            return;
        }

        if let Some(direction) = player_intent {
            out.push(Command::SteerActor {
                actor: ActorId::Player,
                direction: Some(direction),
                target: None,
            });
        }

        let context = TargetContext {
            maze,
            actors,
            status,
            emulate_overflow_bug: self.emulate_overflow_bug,
        };
        for snapshot in actors.iter() {
            let ActorId::Pursuer(pursuer) = snapshot.id else {
                continue;
            };
            let Some(state) = snapshot.pursuer_state() else {
                continue;
            };
            if let Some(command) = self.steer(pursuer, state, snapshot, &context) {
                out.push(command);
            }
        }
    }

    fn steer(
        &mut self,
        pursuer: PursuerId,
        state: PursuerState,
        snapshot: &ActorSnapshot,
        context: &TargetContext<'_>,
    ) -> Option<Command> {
        let strategy = Strategy::for_pursuer(pursuer, state, &context.status);
        if strategy == Strategy::Idle {
            return None;
        }

        if !state.is_in_maze() {
            let target = strategy.target(pursuer, snapshot, context, &mut self.rng);
            return (target != snapshot.target).then_some(Command::SteerActor {
                actor: snapshot.id,
                direction: None,
                target,
            });
        }

        let motion = &snapshot.motion;
        if !(motion.entered_new_tile || motion.blocked) || motion.reversal_pending {
            return None;
        }

        let target = strategy
            .target(pursuer, snapshot, context, &mut self.rng)
            .map(|tile| context.maze.snap_target(tile));
        let direction = match target {
            Some(target) => decide(
                context.maze,
                snapshot.tile(),
                motion.direction,
                target,
                matches!(state, PursuerState::Scattering | PursuerState::Chasing),
                state.passes_door(),
            ),
            None => motion.direction,
        };
        trace!(
            "{pursuer:?} at {:?} heading {direction:?} toward {target:?}",
            snapshot.tile()
        );

        Some(Command::SteerActor {
            actor: snapshot.id,
            direction: Some(direction),
            target,
        })
    }
}
