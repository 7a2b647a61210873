#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Pursuit.
//!
//! The world owns the actors, the food bitmap, score, lives and the power
//! timer. It changes only through [`apply`] and reports every observable
//! change as an [`Event`].

mod house;
mod kinematics;

use log::{debug, info};
use maze_pursuit_core::{
    levels, ActorId, Command, Direction, ElroyStage, Event, FoodKind, FoodMap, Maze, Motion,
    PlayerState, PursuerId, PursuerState, Tile, WaveMode, WELCOME_BANNER,
};

const PELLET_REST_TICKS: u8 = 1;
const ENERGIZER_REST_TICKS: u8 = 3;
const FIRST_PURSUER_POINTS: u32 = 200;
const MAX_PURSUER_CHAIN: u32 = 3;

/// Game rules fixed for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Score at which the single extra life is awarded; zero disables it.
    pub extra_life_score: u32,
    /// When set, hunting pursuers pass through the player harmlessly.
    pub immortal: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            extra_life_score: 10_000,
            immortal: false,
        }
    }
}

#[derive(Clone, Debug)]
struct Player {
    motion: Motion,
    state: PlayerState,
    rest_ticks: u8,
    target: Option<Tile>,
}

impl Player {
    fn at_home(maze: &Maze) -> Self {
        Self {
            motion: Motion::new(maze.player_home(), Direction::Left),
            state: PlayerState::Sleeping,
            rest_ticks: 0,
            target: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Pursuer {
    id: PursuerId,
    motion: Motion,
    state: PursuerState,
    target: Option<Tile>,
    fright_pending: bool,
}

impl Pursuer {
    fn at_home(id: PursuerId, maze: &Maze) -> Self {
        let (state, direction) = match id {
            PursuerId::Direct => (PursuerState::Scattering, Direction::Left),
            PursuerId::Ambusher => (PursuerState::Locked, Direction::Down),
            PursuerId::Flanker | PursuerId::Opportunist => (PursuerState::Locked, Direction::Up),
        };
        Self {
            id,
            motion: Motion::new(maze.pursuer_home(id), direction),
            state,
            target: None,
            fright_pending: false,
        }
    }
}

/// Represents the authoritative Maze Pursuit world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    maze: Maze,
    rules: Rules,
    food: FoodMap,
    player: Player,
    pursuers: [Pursuer; 4],
    tick: u64,
    level: u32,
    score: u32,
    lives: u8,
    extra_life_awarded: bool,
    power_ticks: u32,
    pursuers_eaten: u32,
    wave_mode: WaveMode,
    elroy_suspended: bool,
}

impl World {
    /// Creates a world for the provided maze using the default rules.
    #[must_use]
    pub fn new(maze: Maze) -> Self {
        Self::with_rules(maze, Rules::default())
    }

    /// Creates a world for the provided maze and rules.
    #[must_use]
    pub fn with_rules(maze: Maze, rules: Rules) -> Self {
        let food = maze.initial_food().clone();
        let player = Player::at_home(&maze);
        let pursuers = PursuerId::ALL.map(|id| Pursuer::at_home(id, &maze));
        Self {
            banner: WELCOME_BANNER,
            maze,
            rules,
            food,
            player,
            pursuers,
            tick: 0,
            level: 1,
            score: 0,
            lives: 0,
            extra_life_awarded: false,
            power_ticks: 0,
            pursuers_eaten: 0,
            wave_mode: WaveMode::Scattering,
            elroy_suspended: false,
        }
    }

    fn reset_actors(&mut self) {
        self.power_ticks = 0;
        self.pursuers_eaten = 0;
        self.wave_mode = WaveMode::Scattering;
        self.player = Player::at_home(&self.maze);
        let maze = &self.maze;
        self.pursuers = PursuerId::ALL.map(|id| Pursuer::at_home(id, maze));
    }

    fn hunting_state(&self) -> PursuerState {
        self.wave_mode.pursuer_state()
    }

    fn elroy(&self) -> ElroyStage {
        levels::elroy_stage(self.level, self.food.remaining(), self.elroy_suspended)
    }

    fn add_score(&mut self, points: u32, out_events: &mut Vec<Event>) {
        self.score = self.score.saturating_add(points);
        if !self.extra_life_awarded
            && self.rules.extra_life_score > 0
            && self.score >= self.rules.extra_life_score
        {
            self.extra_life_awarded = true;
            self.lives = self.lives.saturating_add(1);
            debug!("extra life awarded at score {}", self.score);
            out_events.push(Event::ExtraLifeAwarded { lives: self.lives });
        }
    }

    fn advance_player(&mut self, pixels: f32, out_events: &mut Vec<Event>) {
        if self.player.state != PlayerState::Eating {
            return;
        }
        if self.player.rest_ticks > 0 {
            self.player.rest_ticks -= 1;
            return;
        }

        let step = kinematics::advance(&mut self.player.motion, &self.maze, false, pixels);
        record_step(ActorId::Player, step, out_events);

        if self.player.motion.is_teleporting() {
            return;
        }
        let tile = self.player.motion.tile();
        if let Some(kind) = self.food.consume(tile) {
            self.eat_food(tile, kind, out_events);
        }
    }

    fn eat_food(&mut self, tile: Tile, kind: FoodKind, out_events: &mut Vec<Event>) {
        let remaining = self.food.remaining();
        out_events.push(Event::FoodEaten {
            tile,
            kind,
            remaining,
        });
        self.add_score(kind.points(), out_events);
        self.player.rest_ticks = match kind {
            FoodKind::Pellet => PELLET_REST_TICKS,
            FoodKind::Energizer => ENERGIZER_REST_TICKS,
        };

        if kind == FoodKind::Energizer {
            self.start_power(out_events);
        }

        if remaining == 0 {
            info!("maze cleared on level {}", self.level);
            out_events.push(Event::MazeCleared);
        }
    }

    fn start_power(&mut self, out_events: &mut Vec<Event>) {
        let ticks = levels::power_ticks(self.level);
        self.pursuers_eaten = 0;
        if ticks > 0 {
            self.power_ticks = ticks;
            for pursuer in &mut self.pursuers {
                match pursuer.state {
                    PursuerState::Scattering | PursuerState::Chasing | PursuerState::Frightened => {
                        pursuer.state = PursuerState::Frightened;
                    }
                    PursuerState::Locked | PursuerState::LeavingHouse => {
                        pursuer.fright_pending = true;
                    }
                    PursuerState::Dead | PursuerState::EnteringHouse => {}
                }
            }
        }
        debug!("player powered for {ticks} ticks");
        out_events.push(Event::PowerGained { ticks });
    }

    fn end_power(&mut self, out_events: &mut Vec<Event>) {
        let hunting = self.hunting_state();
        for pursuer in &mut self.pursuers {
            pursuer.fright_pending = false;
            if pursuer.state == PursuerState::Frightened {
                pursuer.state = hunting;
            }
        }
        debug!("player power expired");
        out_events.push(Event::PowerLost);
    }

    fn advance_pursuer(&mut self, id: PursuerId, pixels: f32, out_events: &mut Vec<Event>) {
        let hunting = self.hunting_state();
        let powered = self.power_ticks > 0;
        let house = self.maze.house();
        let pursuer = &mut self.pursuers[id.index()];

        match pursuer.state {
            PursuerState::Locked => house::bounce(&mut pursuer.motion, house.bed(id), pixels),
            PursuerState::LeavingHouse => {
                if house::leave(&mut pursuer.motion, house, pixels) {
                    pursuer.state = if pursuer.fright_pending && powered {
                        PursuerState::Frightened
                    } else {
                        hunting
                    };
                    pursuer.fright_pending = false;
                    pursuer.motion.direction = Direction::Left;
                    pursuer.motion.wish_direction = Direction::Left;
                    pursuer.motion.entered_new_tile = true;
                    debug!("{id:?} left the house as {:?}", pursuer.state);
                    out_events.push(Event::PursuerLeftHouse { pursuer: id });
                    if id == PursuerId::Opportunist {
                        self.elroy_suspended = false;
                    }
                }
            }
            PursuerState::Scattering | PursuerState::Chasing | PursuerState::Frightened => {
                let step = kinematics::advance(&mut pursuer.motion, &self.maze, false, pixels);
                record_step(ActorId::Pursuer(id), step, out_events);
            }
            PursuerState::Dead => {
                let step = kinematics::advance(&mut pursuer.motion, &self.maze, true, pixels);
                record_step(ActorId::Pursuer(id), step, out_events);
                if house::reached_entry(&pursuer.motion, house, pixels) {
                    pursuer.motion = Motion::new(house.entry(), Direction::Down);
                    pursuer.state = PursuerState::EnteringHouse;
                    pursuer.target = Some(house.bed(id).tile());
                }
            }
            PursuerState::EnteringHouse => {
                if house::enter(&mut pursuer.motion, house, house.bed(id), pixels) {
                    pursuer.state = PursuerState::LeavingHouse;
                    pursuer.target = None;
                    debug!("{id:?} revived");
                    out_events.push(Event::PursuerRevived { pursuer: id });
                }
            }
        }
    }

    fn resolve_contacts(&mut self, out_events: &mut Vec<Event>) {
        if self.food.is_cleared()
            || self.player.state != PlayerState::Eating
            || self.player.motion.is_teleporting()
        {
            return;
        }

        let player_tile = self.player.motion.tile();
        for id in PursuerId::ALL {
            let pursuer = &self.pursuers[id.index()];
            if pursuer.motion.is_teleporting() || pursuer.motion.tile() != player_tile {
                continue;
            }

            let state = pursuer.state;
            match state {
                PursuerState::Frightened => {
                    let chain = self.pursuers_eaten.min(MAX_PURSUER_CHAIN);
                    let points = FIRST_PURSUER_POINTS << chain;
                    self.pursuers_eaten += 1;
                    let pursuer = &mut self.pursuers[id.index()];
                    pursuer.state = PursuerState::Dead;
                    pursuer.target = None;
                    pursuer.motion.entered_new_tile = true;
                    debug!("{id:?} eaten for {points} points");
                    out_events.push(Event::PursuerEaten {
                        pursuer: id,
                        points,
                    });
                    self.add_score(points, out_events);
                }
                PursuerState::Scattering | PursuerState::Chasing if !self.rules.immortal => {
                    self.player.state = PlayerState::Dead;
                    debug!("player caught by {id:?} on {player_tile:?}");
                    out_events.push(Event::PlayerCaught { pursuer: id });
                    return;
                }
                _ => {}
            }
        }
    }
}

fn record_step(actor: ActorId, step: kinematics::Step, out_events: &mut Vec<Event>) {
    if let Some((from, to)) = step.teleported {
        out_events.push(Event::ActorTeleported { actor, from, to });
    }
    if let Some(tile) = step.entered {
        out_events.push(Event::ActorEnteredTile { actor, tile });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::NewGame { lives } => {
            world.score = 0;
            world.lives = lives;
            world.extra_life_awarded = false;
            info!("new game with {lives} lives");
            out_events.push(Event::GameStarted { lives });
        }
        Command::StartLevel { level } => {
            world.level = level.max(1);
            world.food = world.maze.initial_food().clone();
            world.elroy_suspended = false;
            world.reset_actors();
            info!("level {} started", world.level);
            out_events.push(Event::LevelStarted { level: world.level });
            out_events.push(Event::ActorsReset);
        }
        Command::ResetActors => {
            world.reset_actors();
            out_events.push(Event::ActorsReset);
        }
        Command::WakePlayer => {
            if world.player.state == PlayerState::Sleeping {
                world.player.state = PlayerState::Eating;
            }
        }
        Command::LoseLife => {
            world.lives = world.lives.saturating_sub(1);
            world.elroy_suspended = true;
            info!("life lost, {} remaining", world.lives);
            out_events.push(Event::LifeLost {
                lives_remaining: world.lives,
            });
        }
        Command::EndGame => {
            info!("game over at level {} with score {}", world.level, world.score);
            out_events.push(Event::GameOver {
                score: world.score,
                level: world.level,
            });
        }
        Command::Tick => {
            world.tick = world.tick.saturating_add(1);
            out_events.push(Event::TimeAdvanced { tick: world.tick });
            if world.power_ticks > 0 {
                world.power_ticks -= 1;
                if world.power_ticks == 0 {
                    world.end_power(out_events);
                }
            }
        }
        Command::SetWaveMode { mode } => {
            world.wave_mode = mode;
            for pursuer in &mut world.pursuers {
                if matches!(
                    pursuer.state,
                    PursuerState::Scattering | PursuerState::Chasing
                ) {
                    pursuer.state = mode.pursuer_state();
                }
            }
            debug!("wave mode changed to {mode:?}");
            out_events.push(Event::WaveModeChanged { mode });
        }
        Command::ReversePursuers => {
            for pursuer in &mut world.pursuers {
                if pursuer.state.reverses_on_command() {
                    pursuer.motion.reverse();
                }
            }
            out_events.push(Event::PursuersReversed);
        }
        Command::ReleasePursuer { pursuer } => {
            let entry = &mut world.pursuers[pursuer.index()];
            if entry.state == PursuerState::Locked {
                entry.state = PursuerState::LeavingHouse;
                debug!("{pursuer:?} released");
                out_events.push(Event::PursuerReleased { pursuer });
            }
        }
        Command::SteerActor {
            actor,
            direction,
            target,
        } => match actor {
            ActorId::Player => {
                world.player.target = target;
                if let Some(direction) = direction {
                    world.player.motion.wish_direction = direction;
                }
            }
            ActorId::Pursuer(id) => {
                let pursuer = &mut world.pursuers[id.index()];
                pursuer.target = target;
                if let Some(direction) = direction {
                    if !pursuer.motion.reversal_pending {
                        pursuer.motion.wish_direction = direction;
                    }
                }
            }
        },
        Command::AdvanceActor { actor, pixels } => match actor {
            ActorId::Player => world.advance_player(pixels, out_events),
            ActorId::Pursuer(id) => world.advance_pursuer(id, pixels, out_events),
        },
        Command::ResolveContacts => world.resolve_contacts(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_pursuit_core::{
        ActorId, ActorSnapshot, ActorState, ActorView, FoodMap, Maze, RoundStatus, WaveMode,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the maze layout.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// Provides read-only access to the food bitmap.
    #[must_use]
    pub fn food(world: &World) -> &FoodMap {
        &world.food
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Lives left, including the one in play.
    #[must_use]
    pub fn lives(world: &World) -> u8 {
        world.lives
    }

    /// Current one-based level.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Summarises the round for systems that react to the current tick.
    #[must_use]
    pub fn round_status(world: &World) -> RoundStatus {
        RoundStatus {
            level: world.level,
            wave_mode: world.wave_mode,
            power_ticks: world.power_ticks,
            elroy: world.elroy(),
            food_remaining: world.food.remaining(),
        }
    }

    /// Captures a read-only view of every actor in the maze.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        let player = ActorSnapshot {
            id: ActorId::Player,
            motion: world.player.motion,
            state: ActorState::Player(world.player.state),
            target: world.player.target,
        };
        let pursuers = world.pursuers.iter().map(|pursuer| ActorSnapshot {
            id: ActorId::Pursuer(pursuer.id),
            motion: pursuer.motion,
            state: ActorState::Pursuer(pursuer.state),
            target: pursuer.target,
        });
        ActorView::from_snapshots(std::iter::once(player).chain(pursuers).collect())
    }

    /// Captures everything a renderer or recorder needs for the current tick.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot {
            tick: world.tick,
            level: world.level,
            score: world.score,
            lives: world.lives,
            wave_mode: world.wave_mode,
            power_ticks: world.power_ticks,
            food_remaining: world.food.remaining(),
            food_total: world.food.total(),
            actors: actor_view(world).into_vec(),
        }
    }

    /// Read-only snapshot of the whole world at one tick.
    #[derive(Clone, Debug, PartialEq)]
    pub struct WorldSnapshot {
        /// Number of ticks processed so far.
        pub tick: u64,
        /// Current one-based level.
        pub level: u32,
        /// Current score.
        pub score: u32,
        /// Lives left.
        pub lives: u8,
        /// Global attack mode.
        pub wave_mode: WaveMode,
        /// Ticks of player power left.
        pub power_ticks: u32,
        /// Food items left in the maze.
        pub food_remaining: u32,
        /// Food items placed at level start.
        pub food_total: u32,
        /// Actor snapshots in deterministic order.
        pub actors: Vec<ActorSnapshot>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use maze_pursuit_core::{ActorState, Position};

    fn started_world() -> World {
        let maze = Maze::classic().expect("classic maze parses");
        let mut world = World::new(maze);
        let mut events = Vec::new();
        apply(&mut world, Command::NewGame { lives: 3 }, &mut events);
        apply(&mut world, Command::StartLevel { level: 1 }, &mut events);
        apply(&mut world, Command::WakePlayer, &mut events);
        world
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn place_player(world: &mut World, tile: Tile, direction: Direction) {
        world.player.motion = Motion::new(Position::at_center(tile), direction);
    }

    fn place_pursuer(world: &mut World, id: PursuerId, tile: Tile, state: PursuerState) {
        let pursuer = &mut world.pursuers[id.index()];
        pursuer.motion = Motion::new(Position::at_center(tile), Direction::Left);
        pursuer.state = state;
    }

    #[test]
    fn start_level_places_actors_at_home() {
        let world = started_world();
        let view = query::actor_view(&world);

        let direct = view.pursuer(PursuerId::Direct).expect("direct pursuer");
        assert_eq!(direct.state, ActorState::Pursuer(PursuerState::Scattering));
        assert_eq!(direct.motion.position.pixels(), Vec2::new(112.0, 116.0));
        assert_eq!(direct.motion.direction, Direction::Left);

        for id in [PursuerId::Ambusher, PursuerId::Flanker, PursuerId::Opportunist] {
            let snapshot = view.pursuer(id).expect("pursuer");
            assert_eq!(snapshot.state, ActorState::Pursuer(PursuerState::Locked));
        }

        let player = view.player().expect("player");
        assert_eq!(player.state, ActorState::Player(PlayerState::Eating));
        assert_eq!(player.motion.position.pixels(), Vec2::new(112.0, 212.0));
        assert_eq!(query::food(&world).remaining(), 244);
    }

    #[test]
    fn eating_a_pellet_scores_and_rests_the_player() {
        let mut world = started_world();
        place_player(&mut world, Tile::new(2, 8), Direction::Left);
        world.player.motion.position = Position::from_pixels(Tile::new(2, 8).center() - Vec2::new(3.5, 0.0));

        let events = run(
            &mut world,
            Command::AdvanceActor {
                actor: ActorId::Player,
                pixels: 1.0,
            },
        );
        assert!(events.contains(&Event::FoodEaten {
            tile: Tile::new(1, 8),
            kind: FoodKind::Pellet,
            remaining: 243,
        }));
        assert_eq!(query::score(&world), 10);

        let before = world.player.motion.position;
        let _ = run(
            &mut world,
            Command::AdvanceActor {
                actor: ActorId::Player,
                pixels: 1.0,
            },
        );
        assert_eq!(world.player.motion.position, before, "player rests after eating");
    }

    #[test]
    fn energizer_frightens_hunters_and_marks_caged_pursuers() {
        let mut world = started_world();
        world.player.motion.position = Position::from_pixels(Tile::new(1, 6).center() + Vec2::new(0.0, -4.0));
        world.player.motion.direction = Direction::Down;
        world.player.motion.wish_direction = Direction::Down;

        let events = run(
            &mut world,
            Command::AdvanceActor {
                actor: ActorId::Player,
                pixels: 1.0,
            },
        );
        assert!(events.contains(&Event::PowerGained { ticks: 360 }));
        assert_eq!(
            world.pursuers[PursuerId::Direct.index()].state,
            PursuerState::Frightened
        );
        assert!(world.pursuers[PursuerId::Flanker.index()].fright_pending);
        assert!(query::round_status(&world).is_powered());

        let mut expired = false;
        for _ in 0..360 {
            let events = run(&mut world, Command::Tick);
            expired |= events.contains(&Event::PowerLost);
        }
        assert!(expired);
        assert_eq!(
            world.pursuers[PursuerId::Direct.index()].state,
            PursuerState::Scattering
        );
        assert!(!world.pursuers[PursuerId::Flanker.index()].fright_pending);
    }

    #[test]
    fn zero_length_power_does_not_frighten() {
        let mut world = started_world();
        let _ = run(&mut world, Command::StartLevel { level: 17 });
        let mut events = Vec::new();
        world.start_power(&mut events);
        assert_eq!(events, vec![Event::PowerGained { ticks: 0 }]);
        assert_eq!(
            world.pursuers[PursuerId::Direct.index()].state,
            PursuerState::Scattering
        );
    }

    #[test]
    fn frightened_pursuers_are_eaten_for_doubling_points() {
        let mut world = started_world();
        world.power_ticks = 100;
        place_player(&mut world, Tile::new(6, 8), Direction::Left);
        for id in PursuerId::ALL {
            place_pursuer(&mut world, id, Tile::new(6, 8), PursuerState::Frightened);
        }

        let events = run(&mut world, Command::ResolveContacts);
        let points: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                Event::PursuerEaten { points, .. } => Some(*points),
                _ => None,
            })
            .collect();
        assert_eq!(points, vec![200, 400, 800, 1600]);
        assert_eq!(query::score(&world), 3000);
        assert!(world
            .pursuers
            .iter()
            .all(|pursuer| pursuer.state == PursuerState::Dead));
    }

    #[test]
    fn hunting_pursuer_catches_the_player() {
        let mut world = started_world();
        place_player(&mut world, Tile::new(6, 8), Direction::Left);
        place_pursuer(&mut world, PursuerId::Flanker, Tile::new(6, 8), PursuerState::Chasing);

        let events = run(&mut world, Command::ResolveContacts);
        assert_eq!(
            events,
            vec![Event::PlayerCaught {
                pursuer: PursuerId::Flanker
            }]
        );
        assert_eq!(world.player.state, PlayerState::Dead);
    }

    #[test]
    fn immortal_player_survives_contact() {
        let maze = Maze::classic().expect("classic maze parses");
        let mut world = World::with_rules(
            maze,
            Rules {
                immortal: true,
                ..Rules::default()
            },
        );
        let _ = run(&mut world, Command::StartLevel { level: 1 });
        let _ = run(&mut world, Command::WakePlayer);
        place_player(&mut world, Tile::new(6, 8), Direction::Left);
        place_pursuer(&mut world, PursuerId::Direct, Tile::new(6, 8), PursuerState::Chasing);

        assert!(run(&mut world, Command::ResolveContacts).is_empty());
        assert_eq!(world.player.state, PlayerState::Eating);
    }

    #[test]
    fn cleared_maze_takes_precedence_over_contacts() {
        let mut world = started_world();
        let remaining: Vec<Tile> = world.food.iter().map(|(tile, _)| tile).collect();
        for tile in remaining {
            let _ = world.food.consume(tile);
        }
        place_player(&mut world, Tile::new(6, 8), Direction::Left);
        place_pursuer(&mut world, PursuerId::Direct, Tile::new(6, 8), PursuerState::Chasing);

        assert!(run(&mut world, Command::ResolveContacts).is_empty());
    }

    #[test]
    fn last_pellet_clears_the_maze() {
        let mut world = started_world();
        let keep = Tile::new(1, 8);
        let others: Vec<Tile> = world
            .food
            .iter()
            .map(|(tile, _)| tile)
            .filter(|tile| *tile != keep)
            .collect();
        for tile in others {
            let _ = world.food.consume(tile);
        }
        world.player.motion = Motion::new(
            Position::from_pixels(Tile::new(2, 8).center() - Vec2::new(3.5, 0.0)),
            Direction::Left,
        );

        let events = run(
            &mut world,
            Command::AdvanceActor {
                actor: ActorId::Player,
                pixels: 1.0,
            },
        );
        assert_eq!(events.last(), Some(&Event::MazeCleared));
    }

    #[test]
    fn release_leads_pursuer_out_of_the_house() {
        let mut world = started_world();
        let events = run(
            &mut world,
            Command::ReleasePursuer {
                pursuer: PursuerId::Opportunist,
            },
        );
        assert_eq!(
            events,
            vec![Event::PursuerReleased {
                pursuer: PursuerId::Opportunist
            }]
        );

        let mut left = false;
        for _ in 0..200 {
            let events = run(
                &mut world,
                Command::AdvanceActor {
                    actor: ActorId::Pursuer(PursuerId::Opportunist),
                    pixels: 0.625,
                },
            );
            if events.contains(&Event::PursuerLeftHouse {
                pursuer: PursuerId::Opportunist,
            }) {
                left = true;
                break;
            }
        }
        assert!(left);
        let pursuer = &world.pursuers[PursuerId::Opportunist.index()];
        assert_eq!(pursuer.state, PursuerState::Scattering);
        assert_eq!(pursuer.motion.direction, Direction::Left);
        assert_eq!(pursuer.motion.position, world.maze.house().entry());
    }

    #[test]
    fn releasing_a_free_pursuer_is_ignored() {
        let mut world = started_world();
        let events = run(
            &mut world,
            Command::ReleasePursuer {
                pursuer: PursuerId::Direct,
            },
        );
        assert!(events.is_empty());
    }

    #[test]
    fn dead_pursuer_returns_home_and_revives() {
        let mut world = started_world();
        let id = PursuerId::Flanker;
        {
            let pursuer = &mut world.pursuers[id.index()];
            pursuer.motion = Motion::new(Position::at_center(Tile::new(10, 14)), Direction::Right);
            pursuer.state = PursuerState::Dead;
        }

        let mut revived = false;
        for _ in 0..400 {
            let events = run(
                &mut world,
                Command::AdvanceActor {
                    actor: ActorId::Pursuer(id),
                    pixels: 1.875,
                },
            );
            if events.contains(&Event::PursuerRevived { pursuer: id }) {
                revived = true;
                break;
            }
        }
        assert!(revived);
        let pursuer = &world.pursuers[id.index()];
        assert_eq!(pursuer.state, PursuerState::LeavingHouse);
        assert_eq!(pursuer.motion.position, world.maze.house().bed(id));
    }

    #[test]
    fn reversal_only_targets_active_pursuers() {
        let mut world = started_world();
        let _ = run(&mut world, Command::ReversePursuers);
        assert!(world.pursuers[PursuerId::Direct.index()].motion.reversal_pending);
        assert!(!world.pursuers[PursuerId::Ambusher.index()].motion.reversal_pending);
    }

    #[test]
    fn steering_respects_a_pending_reversal() {
        let mut world = started_world();
        let _ = run(&mut world, Command::ReversePursuers);
        let _ = run(
            &mut world,
            Command::SteerActor {
                actor: ActorId::Pursuer(PursuerId::Direct),
                direction: Some(Direction::Left),
                target: Some(Tile::new(25, 0)),
            },
        );
        let direct = &world.pursuers[PursuerId::Direct.index()];
        assert_eq!(direct.motion.wish_direction, Direction::Right);
        assert_eq!(direct.target, Some(Tile::new(25, 0)));
    }

    #[test]
    fn wave_mode_switch_spares_frightened_pursuers() {
        let mut world = started_world();
        world.pursuers[PursuerId::Ambusher.index()].state = PursuerState::Frightened;
        let _ = run(
            &mut world,
            Command::SetWaveMode {
                mode: WaveMode::Chasing,
            },
        );
        assert_eq!(
            world.pursuers[PursuerId::Direct.index()].state,
            PursuerState::Chasing
        );
        assert_eq!(
            world.pursuers[PursuerId::Ambusher.index()].state,
            PursuerState::Frightened
        );
        assert_eq!(query::round_status(&world).wave_mode, WaveMode::Chasing);
    }

    #[test]
    fn extra_life_is_awarded_once() {
        let mut world = started_world();
        let mut events = Vec::new();
        world.add_score(9_990, &mut events);
        assert!(events.is_empty());
        world.add_score(10, &mut events);
        world.add_score(10_000, &mut events);
        assert_eq!(events, vec![Event::ExtraLifeAwarded { lives: 4 }]);
    }

    #[test]
    fn losing_a_life_suspends_elroy_until_opportunist_leaves() {
        let mut world = started_world();
        let remaining: Vec<Tile> = world.food.iter().map(|(tile, _)| tile).skip(10).collect();
        for tile in remaining {
            let _ = world.food.consume(tile);
        }
        assert_eq!(query::round_status(&world).elroy, ElroyStage::Second);

        let _ = run(&mut world, Command::LoseLife);
        let _ = run(&mut world, Command::ResetActors);
        assert_eq!(query::lives(&world), 2);
        assert_eq!(query::round_status(&world).elroy, ElroyStage::Off);

        let _ = run(
            &mut world,
            Command::ReleasePursuer {
                pursuer: PursuerId::Opportunist,
            },
        );
        for _ in 0..200 {
            let _ = run(
                &mut world,
                Command::AdvanceActor {
                    actor: ActorId::Pursuer(PursuerId::Opportunist),
                    pixels: 0.625,
                },
            );
        }
        assert_eq!(query::round_status(&world).elroy, ElroyStage::Second);
    }

    #[test]
    fn game_over_reports_score_and_level() {
        let mut world = started_world();
        world.score = 1234;
        let events = run(&mut world, Command::EndGame);
        assert_eq!(
            events,
            vec![Event::GameOver {
                score: 1234,
                level: 1
            }]
        );
    }
}
