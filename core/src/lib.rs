#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Pursuit engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots such as [`ActorView`] and [`Maze`], and respond
//! exclusively with new command batches.

pub mod levels;
pub mod maze;

pub use maze::{FoodKind, FoodMap, House, Maze, MazeError, TileClass, CLASSIC_MAZE};

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Pursuit.";

/// Side length of a square tile measured in pixels.
pub const TILE_SIZE: f32 = 8.0;

/// Half the side length of a tile measured in pixels.
pub const HALF_TILE: f32 = TILE_SIZE / 2.0;

/// Number of simulation ticks that make up one second of play.
pub const TICKS_PER_SECOND: u32 = 60;

/// Location of a single maze tile expressed as signed column and row indices.
///
/// Coordinates are signed because the portal space on the tunnel row extends
/// beyond the left and right edges of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    column: i32,
    row: i32,
}

impl Tile {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Tile displaced by the provided column and row deltas.
    #[must_use]
    pub const fn translated(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Adjacent tile in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        self.steps(direction, 1)
    }

    /// Tile reached after moving `count` whole tiles in the provided direction.
    #[must_use]
    pub const fn steps(self, direction: Direction, count: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.translated(dx * count, dy * count)
    }

    /// Euclidean distance between the two tiles measured in tiles.
    #[must_use]
    pub fn euclidean_distance(self, other: Tile) -> f32 {
        (self.distance_squared(other) as f32).sqrt()
    }

    /// Squared Euclidean distance between the two tiles.
    ///
    /// Comparisons that only need an ordering use this form so that ties are
    /// detected exactly rather than through floating point rounding.
    #[must_use]
    pub const fn distance_squared(self, other: Tile) -> i64 {
        let dx = (self.column - other.column) as i64;
        let dy = (self.row - other.row) as i64;
        dx * dx + dy * dy
    }

    /// Pixel coordinate of the tile center.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.column as f32 * TILE_SIZE + HALF_TILE,
            self.row as f32 * TILE_SIZE + HALF_TILE,
        )
    }
}

/// Cardinal movement directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Candidate order used whenever several directions score equally.
    pub const TIE_BREAK_ORDER: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit vector of the direction in tile space, with rows growing downwards.
    #[must_use]
    pub const fn vector(self) -> IVec2 {
        let (dx, dy) = self.delta();
        IVec2::new(dx, dy)
    }

    /// Reports whether the direction runs along the column axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Reports whether switching from `other` to `self` is a 90 degree turn.
    #[must_use]
    pub const fn is_turn_from(self, other: Direction) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }

    const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Location of an actor: the tile it occupies plus a sub-tile pixel offset.
///
/// The offset is measured from the tile center and stays within
/// `-HALF_TILE..HALF_TILE` on both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    tile: Tile,
    offset: Vec2,
}

impl Position {
    /// Creates a position from absolute pixel coordinates.
    #[must_use]
    pub fn from_pixels(pixels: Vec2) -> Self {
        let column = (pixels.x / TILE_SIZE).floor() as i32;
        let row = (pixels.y / TILE_SIZE).floor() as i32;
        let tile = Tile::new(column, row);
        Self {
            tile,
            offset: pixels - tile.center(),
        }
    }

    /// Position resting on the center of the provided tile.
    #[must_use]
    pub fn at_center(tile: Tile) -> Self {
        Self {
            tile,
            offset: Vec2::ZERO,
        }
    }

    /// Position straddling the provided tile and its right-hand neighbor.
    ///
    /// Home positions in the maze sit on the seam between two tiles.
    #[must_use]
    pub fn between(tile: Tile) -> Self {
        Self::from_pixels(tile.center() + Vec2::new(HALF_TILE, 0.0))
    }

    /// Tile currently occupied.
    #[must_use]
    pub const fn tile(&self) -> Tile {
        self.tile
    }

    /// Pixel offset relative to the tile center.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Absolute pixel coordinates.
    #[must_use]
    pub fn pixels(&self) -> Vec2 {
        self.tile.center() + self.offset
    }

    /// Signed offset from the tile center measured along `direction`.
    #[must_use]
    pub fn offset_along(&self, direction: Direction) -> f32 {
        let vector = direction.vector().as_vec2();
        self.offset.dot(vector)
    }

    /// Position with the offset across `direction` snapped onto the tile's
    /// center line.
    #[must_use]
    pub fn centered_across(&self, direction: Direction) -> Self {
        let offset = if direction.is_horizontal() {
            Vec2::new(self.offset.x, 0.0)
        } else {
            Vec2::new(0.0, self.offset.y)
        };
        Self {
            tile: self.tile,
            offset,
        }
    }

    /// Position displaced by the provided pixel delta.
    #[must_use]
    pub fn translated(&self, delta: Vec2) -> Self {
        Self::from_pixels(self.pixels() + delta)
    }
}

/// Kinematic state shared by every actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Current location.
    pub position: Position,
    /// Direction the actor is committed to.
    pub direction: Direction,
    /// Direction the actor intends to take as soon as the maze allows it.
    pub wish_direction: Direction,
    /// Set when the latest advance carried the actor onto a new tile.
    pub entered_new_tile: bool,
    /// Set when the latest advance left the actor stalled at a tile center
    /// in front of a tile it may not enter.
    pub blocked: bool,
    /// Set while a forced reversal awaits execution by the movement engine.
    pub reversal_pending: bool,
    /// Remaining ticks the actor spends hidden inside a portal.
    pub teleport_ticks: u8,
}

impl Motion {
    /// Creates a motion resting at `position`, heading in `direction`.
    #[must_use]
    pub const fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
            wish_direction: direction,
            entered_new_tile: false,
            blocked: false,
            reversal_pending: false,
            teleport_ticks: 0,
        }
    }

    /// Tile currently occupied.
    #[must_use]
    pub const fn tile(&self) -> Tile {
        self.position.tile()
    }

    /// Requests a forced reversal that bypasses the no-reversal rule.
    pub fn reverse(&mut self) {
        self.wish_direction = self.direction.opposite();
        self.reversal_pending = true;
    }

    /// Reports whether the actor is hidden inside a portal.
    #[must_use]
    pub const fn is_teleporting(&self) -> bool {
        self.teleport_ticks > 0
    }
}

/// Identifies one of the four pursuers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PursuerId {
    /// Targets the player's tile directly.
    Direct,
    /// Targets the tile four steps ahead of the player.
    Ambusher,
    /// Targets a reflection through the direct pursuer.
    Flanker,
    /// Chases from afar and retreats to its corner when close.
    Opportunist,
}

impl PursuerId {
    /// Every pursuer in canonical order.
    pub const ALL: [PursuerId; 4] = [
        PursuerId::Direct,
        PursuerId::Ambusher,
        PursuerId::Flanker,
        PursuerId::Opportunist,
    ];

    /// Zero-based index of the pursuer in [`PursuerId::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Direct => 0,
            Self::Ambusher => 1,
            Self::Flanker => 2,
            Self::Opportunist => 3,
        }
    }
}

/// Identifies any mobile actor in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorId {
    /// The player character.
    Player,
    /// One of the pursuers.
    Pursuer(PursuerId),
}

/// Behavioral states available to pursuers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuerState {
    /// Waiting inside the house, bouncing on its bed.
    Locked,
    /// Following the scripted route from the bed out through the door.
    LeavingHouse,
    /// Heading for the assigned maze corner.
    Scattering,
    /// Pursuing a personality-specific target derived from the player.
    Chasing,
    /// Fleeing and vulnerable while the player is powered.
    Frightened,
    /// Caught by the player and returning to the house entry.
    Dead,
    /// Following the scripted route from the house entry down to the bed.
    EnteringHouse,
}

impl PursuerState {
    /// Reports whether the pursuer navigates the maze through steering decisions.
    #[must_use]
    pub const fn is_in_maze(self) -> bool {
        matches!(
            self,
            Self::Scattering | Self::Chasing | Self::Frightened | Self::Dead
        )
    }

    /// Reports whether forced reversals apply to the pursuer.
    #[must_use]
    pub const fn reverses_on_command(self) -> bool {
        matches!(self, Self::Scattering | Self::Chasing | Self::Frightened)
    }

    /// Reports whether the house door is passable in this state.
    #[must_use]
    pub const fn passes_door(self) -> bool {
        matches!(self, Self::LeavingHouse | Self::EnteringHouse | Self::Dead)
    }
}

/// Behavioral states available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Frozen before play begins.
    Sleeping,
    /// Moving through the maze and consuming food.
    Eating,
    /// Caught by a pursuer.
    Dead,
}

/// State label attached to an actor snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorState {
    /// State of the player character.
    Player(PlayerState),
    /// State of a pursuer.
    Pursuer(PursuerState),
}

/// Global attack mode shared by every hunting pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveMode {
    /// Pursuers head for their corners.
    Scattering,
    /// Pursuers chase their personality targets.
    Chasing,
}

impl WaveMode {
    /// Pursuer state matching the mode.
    #[must_use]
    pub const fn pursuer_state(self) -> PursuerState {
        match self {
            Self::Scattering => PursuerState::Scattering,
            Self::Chasing => PursuerState::Chasing,
        }
    }

    /// Mode that follows this one in the wave table.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Scattering => Self::Chasing,
            Self::Chasing => Self::Scattering,
        }
    }
}

/// Speed-up stage of the direct pursuer as the maze empties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElroyStage {
    /// No speed-up active.
    #[default]
    Off,
    /// First speed-up threshold reached.
    First,
    /// Second speed-up threshold reached.
    Second,
}

impl ElroyStage {
    /// Reports whether any speed-up stage is active.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Per-tick summary of the round that systems consult alongside actor views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundStatus {
    /// One-based level number.
    pub level: u32,
    /// Global attack mode.
    pub wave_mode: WaveMode,
    /// Ticks of player power left; zero when unpowered.
    pub power_ticks: u32,
    /// Speed-up stage of the direct pursuer.
    pub elroy: ElroyStage,
    /// Food items left in the maze.
    pub food_remaining: u32,
}

impl RoundStatus {
    /// Reports whether the player currently holds power.
    #[must_use]
    pub const fn is_powered(&self) -> bool {
        self.power_ticks > 0
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets score and lives for a fresh game.
    NewGame {
        /// Lives granted at the start of the game.
        lives: u8,
    },
    /// Refills the maze and places every actor at home for the given level.
    StartLevel {
        /// One-based level number.
        level: u32,
    },
    /// Returns every actor to its home position without refilling food.
    ResetActors,
    /// Lets the sleeping player start moving.
    WakePlayer,
    /// Removes one life after the player was caught.
    LoseLife,
    /// Announces the final result of the game.
    EndGame,
    /// Advances the simulation clock by one tick.
    Tick,
    /// Switches every hunting pursuer to the provided mode.
    SetWaveMode {
        /// Mode that becomes active.
        mode: WaveMode,
    },
    /// Orders every active pursuer to reverse direction.
    ReversePursuers,
    /// Frees a caged pursuer from the house.
    ReleasePursuer {
        /// Pursuer that leaves the house.
        pursuer: PursuerId,
    },
    /// Updates an actor's intended direction and current target tile.
    SteerActor {
        /// Actor being steered.
        actor: ActorId,
        /// New intended direction; `None` keeps the current intention.
        direction: Option<Direction>,
        /// Tile the decision aimed for, if any.
        target: Option<Tile>,
    },
    /// Moves an actor by the provided pixel distance.
    AdvanceActor {
        /// Actor being moved.
        actor: ActorId,
        /// Maximum distance travelled this tick, in pixels.
        pixels: f32,
    },
    /// Resolves player and pursuer contacts after movement.
    ResolveContacts,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that score and lives were reset.
    GameStarted {
        /// Lives available at the start of the game.
        lives: u8,
    },
    /// Announces that a level began with a full maze.
    LevelStarted {
        /// One-based level number.
        level: u32,
    },
    /// Confirms that every actor was returned home.
    ActorsReset,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just started.
        tick: u64,
    },
    /// Reports that an actor crossed onto a new tile.
    ActorEnteredTile {
        /// Actor that moved.
        actor: ActorId,
        /// Tile the actor now occupies.
        tile: Tile,
    },
    /// Reports that an actor was carried through a portal.
    ActorTeleported {
        /// Actor that used the portal.
        actor: ActorId,
        /// Tile the actor left.
        from: Tile,
        /// Tile the actor reappears on.
        to: Tile,
    },
    /// Reports that the player consumed food.
    FoodEaten {
        /// Tile the food occupied.
        tile: Tile,
        /// Kind of food consumed.
        kind: FoodKind,
        /// Food items left in the maze.
        remaining: u32,
    },
    /// Reports that the player became powered.
    PowerGained {
        /// Ticks the power lasts.
        ticks: u32,
    },
    /// Reports that the player's power expired.
    PowerLost,
    /// Reports that the global attack mode changed.
    WaveModeChanged {
        /// Mode that became active.
        mode: WaveMode,
    },
    /// Reports that active pursuers were ordered to reverse.
    PursuersReversed,
    /// Reports that a caged pursuer was released.
    PursuerReleased {
        /// Pursuer that was released.
        pursuer: PursuerId,
    },
    /// Reports that a pursuer finished leaving the house.
    PursuerLeftHouse {
        /// Pursuer that reached the house entry.
        pursuer: PursuerId,
    },
    /// Reports that the player caught a frightened pursuer.
    PursuerEaten {
        /// Pursuer that was caught.
        pursuer: PursuerId,
        /// Points awarded for the catch.
        points: u32,
    },
    /// Reports that a dead pursuer reached its bed and came back to life.
    PursuerRevived {
        /// Pursuer that revived.
        pursuer: PursuerId,
    },
    /// Reports that a hunting pursuer caught the player.
    PlayerCaught {
        /// Pursuer that made the catch.
        pursuer: PursuerId,
    },
    /// Reports that the last food item was consumed.
    MazeCleared,
    /// Reports that a life was removed.
    LifeLost {
        /// Lives left after the loss.
        lives_remaining: u8,
    },
    /// Reports that the score crossed the bonus threshold.
    ExtraLifeAwarded {
        /// Lives available after the award.
        lives: u8,
    },
    /// Announces the final result for persistence collaborators.
    GameOver {
        /// Final score.
        score: u32,
        /// Highest level reached.
        level: u32,
    },
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier of the actor.
    pub id: ActorId,
    /// Kinematic state of the actor.
    pub motion: Motion,
    /// Behavioral state of the actor.
    pub state: ActorState,
    /// Tile the actor currently aims for, if any.
    pub target: Option<Tile>,
}

impl ActorSnapshot {
    /// Tile currently occupied.
    #[must_use]
    pub const fn tile(&self) -> Tile {
        self.motion.tile()
    }

    /// Reports whether the actor is drawn, i.e. not hidden inside a portal.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !self.motion.is_teleporting()
    }

    /// State of the pursuer, or `None` for the player.
    #[must_use]
    pub const fn pursuer_state(&self) -> Option<PursuerState> {
        match self.state {
            ActorState::Pursuer(state) => Some(state),
            ActorState::Player(_) => None,
        }
    }
}

/// Read-only snapshot describing every actor in the maze.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the requested actor, if present.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Snapshot of the player, if present.
    #[must_use]
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.get(ActorId::Player)
    }

    /// Snapshot of the requested pursuer, if present.
    #[must_use]
    pub fn pursuer(&self, pursuer: PursuerId) -> Option<&ActorSnapshot> {
        self.get(ActorId::Pursuer(pursuer))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}
