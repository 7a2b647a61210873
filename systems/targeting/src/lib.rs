#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target selection strategies for pursuers.
//!
//! Every (pursuer, state) pair maps to one [`Strategy`], and every strategy is
//! a small pure function of the current actor view. Strategies return `None`
//! when they cannot resolve a tile, which steering treats as "keep going".

use maze_pursuit_core::{
    ActorSnapshot, ActorView, Direction, Maze, PursuerId, PursuerState, RoundStatus, Tile,
};
use rand::Rng;

/// Tiles the ambusher looks ahead of the player.
pub const AMBUSH_LOOKAHEAD: i32 = 4;

/// Tiles the flanker looks ahead of the player before reflecting.
pub const FLANK_LOOKAHEAD: i32 = 2;

/// Distance in tiles beyond which the opportunist keeps chasing.
pub const OPPORTUNIST_RADIUS: i64 = 8;

/// Read-only inputs shared by every strategy.
#[derive(Clone, Copy, Debug)]
pub struct TargetContext<'a> {
    /// Maze layout.
    pub maze: &'a Maze,
    /// Snapshot of every actor.
    pub actors: &'a ActorView,
    /// Round summary for the current tick.
    pub status: RoundStatus,
    /// Reproduces the arcade projection defect when the player faces Up.
    pub emulate_overflow_bug: bool,
}

/// Tile `steps` tiles ahead of `tile` in `direction`.
///
/// With `emulate_overflow_bug` set, an Up projection is also shifted `steps`
/// tiles to the left, matching the arcade's arithmetic overflow.
#[must_use]
pub fn ahead_of(tile: Tile, direction: Direction, steps: i32, emulate_overflow_bug: bool) -> Tile {
    let ahead = tile.steps(direction, steps);
    if emulate_overflow_bug && direction == Direction::Up {
        ahead.steps(Direction::Left, steps)
    } else {
        ahead
    }
}

/// Target selection rule assigned to a pursuer in a given state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// No pathing; the house choreography moves the pursuer.
    Idle,
    /// Fixed scatter corner of the pursuer.
    Corner,
    /// The player's tile.
    Direct,
    /// Four tiles ahead of the player.
    Ambush,
    /// Reflection of two tiles ahead of the player through the direct pursuer.
    Flank,
    /// The player when far away, the scatter corner when close.
    Opportunist,
    /// A random legal neighbor, fleeing without a plan.
    Flee,
    /// The tile above the house door.
    HouseEntry,
    /// The pursuer's bed inside the house.
    Bed,
}

impl Strategy {
    /// Strategy used by `pursuer` while in `state`.
    ///
    /// The direct pursuer keeps chasing through scatter waves while its elroy
    /// stage is active.
    #[must_use]
    pub fn for_pursuer(pursuer: PursuerId, state: PursuerState, status: &RoundStatus) -> Self {
        match state {
            PursuerState::Locked | PursuerState::LeavingHouse => Self::Idle,
            PursuerState::Scattering
                if !(pursuer == PursuerId::Direct && status.elroy.is_active()) =>
            {
                Self::Corner
            }
            PursuerState::Scattering | PursuerState::Chasing => Self::chase(pursuer),
            PursuerState::Frightened => Self::Flee,
            PursuerState::Dead => Self::HouseEntry,
            PursuerState::EnteringHouse => Self::Bed,
        }
    }

    /// Chase strategy matching the pursuer's personality.
    #[must_use]
    pub const fn chase(pursuer: PursuerId) -> Self {
        match pursuer {
            PursuerId::Direct => Self::Direct,
            PursuerId::Ambusher => Self::Ambush,
            PursuerId::Flanker => Self::Flank,
            PursuerId::Opportunist => Self::Opportunist,
        }
    }

    /// Resolves the target tile for the pursuer described by `me`.
    pub fn target<R>(
        self,
        pursuer: PursuerId,
        me: &ActorSnapshot,
        context: &TargetContext<'_>,
        rng: &mut R,
    ) -> Option<Tile>
    where
        R: Rng + ?Sized,
    {
        let player = context.actors.player();
        let corner = context.maze.scatter_target(pursuer);
        match self {
            Self::Idle => None,
            Self::Corner => Some(corner),
            Self::Direct => player.map(ActorSnapshot::tile),
            Self::Ambush => player.map(|player| {
                ahead_of(
                    player.tile(),
                    player.motion.direction,
                    AMBUSH_LOOKAHEAD,
                    context.emulate_overflow_bug,
                )
            }),
            Self::Flank => {
                let player = player?;
                let direct = context.actors.pursuer(PursuerId::Direct)?;
                let pivot = ahead_of(
                    player.tile(),
                    player.motion.direction,
                    FLANK_LOOKAHEAD,
                    context.emulate_overflow_bug,
                );
                Some(reflect(direct.tile(), pivot))
            }
            Self::Opportunist => {
                let player = player?;
                let radius = OPPORTUNIST_RADIUS * OPPORTUNIST_RADIUS;
                if me.tile().distance_squared(player.tile()) > radius {
                    Some(player.tile())
                } else {
                    Some(corner)
                }
            }
            Self::Flee => flee(me, context.maze, rng),
            Self::HouseEntry => Some(context.maze.house().entry_tile()),
            Self::Bed => Some(context.maze.house().bed(pursuer).tile()),
        }
    }
}

/// Reflection of `origin` through `pivot`: `2 * pivot - origin`.
#[must_use]
pub const fn reflect(origin: Tile, pivot: Tile) -> Tile {
    Tile::new(
        2 * pivot.column() - origin.column(),
        2 * pivot.row() - origin.row(),
    )
}

fn flee<R>(me: &ActorSnapshot, maze: &Maze, rng: &mut R) -> Option<Tile>
where
    R: Rng + ?Sized,
{
    let tile = me.tile();
    let reverse = me.motion.direction.opposite();
    let options: Vec<Tile> = Direction::TIE_BREAK_ORDER
        .into_iter()
        .filter(|direction| *direction != reverse)
        .map(|direction| tile.neighbor(direction))
        .filter(|neighbor| maze.is_enterable(*neighbor, false))
        .collect();
    if options.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..options.len());
    Some(options[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ahead_projects_straight_for_horizontal_directions() {
        let origin = Tile::new(14, 17);
        assert_eq!(ahead_of(origin, Direction::Right, 4, true), Tile::new(18, 17));
        assert_eq!(ahead_of(origin, Direction::Left, 4, true), Tile::new(10, 17));
        assert_eq!(ahead_of(origin, Direction::Down, 4, true), Tile::new(14, 21));
    }

    #[test]
    fn ahead_reproduces_overflow_when_facing_up() {
        let origin = Tile::new(14, 17);
        assert_eq!(ahead_of(origin, Direction::Up, 4, true), Tile::new(10, 13));
        assert_eq!(ahead_of(origin, Direction::Up, 4, false), Tile::new(14, 13));
    }

    #[test]
    fn reflection_doubles_the_vector_through_the_pivot() {
        assert_eq!(reflect(Tile::new(10, 10), Tile::new(12, 14)), Tile::new(14, 18));
        assert_eq!(reflect(Tile::new(3, 3), Tile::new(3, 3)), Tile::new(3, 3));
    }

    #[test]
    fn chase_strategy_follows_personality() {
        assert_eq!(Strategy::chase(PursuerId::Direct), Strategy::Direct);
        assert_eq!(Strategy::chase(PursuerId::Ambusher), Strategy::Ambush);
        assert_eq!(Strategy::chase(PursuerId::Flanker), Strategy::Flank);
        assert_eq!(Strategy::chase(PursuerId::Opportunist), Strategy::Opportunist);
    }
}
