//! Sub-tile movement of a single actor through the maze.

use maze_pursuit_core::{Direction, Maze, Motion, Position, Tile, TILE_SIZE};

/// Ticks an actor stays hidden after being carried through a portal.
pub(crate) const TELEPORT_TICKS: u8 = 2;

/// Observable outcome of advancing an actor by one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Step {
    /// Tile the actor crossed onto, if any.
    pub(crate) entered: Option<Tile>,
    /// Portal tile left behind and exit tile reached, if a portal was used.
    pub(crate) teleported: Option<(Tile, Tile)>,
}

/// Advances the actor by at most `pixels` along its wish or current direction.
///
/// Turns are only committed while the actor sits within one step of the
/// center line of its tile; the cross-axis offset is then snapped to zero.
/// Movement toward a tile the actor may not enter stops at the center of the
/// current tile.
pub(crate) fn advance(motion: &mut Motion, maze: &Maze, through_door: bool, pixels: f32) -> Step {
    motion.entered_new_tile = false;
    motion.blocked = false;
    if motion.teleport_ticks > 0 {
        motion.teleport_ticks -= 1;
        return Step::default();
    }

    let turn_window = pixels.max(1.0);
    let wish = motion.wish_direction;
    let mut position = motion.position;
    let mut direction = motion.direction;

    let turning = wish.is_turn_from(direction);
    let wish_travel = if turning && position.offset_along(direction).abs() > turn_window {
        0.0
    } else {
        travelable(&position, wish, maze, through_door)
    };

    let travel = if wish_travel > 0.0 {
        if turning {
            position = position.centered_across(wish);
        }
        direction = wish;
        wish_travel
    } else {
        travelable(&position, direction, maze, through_door)
    };

    motion.direction = direction;
    if direction == wish {
        motion.reversal_pending = false;
    }

    let distance = pixels.min(travel);
    motion.blocked = distance <= 0.0;
    let mut moved = position.translated(direction.vector().as_vec2() * distance);
    let mut step = Step::default();

    if moved.tile() != motion.position.tile() {
        step.entered = Some(moved.tile());
        motion.entered_new_tile = true;
    }

    if let Some(exit) = maze.portal_exit(moved.tile()) {
        let from = moved.tile();
        moved = Position::from_pixels(exit.center() + moved.offset());
        motion.teleport_ticks = TELEPORT_TICKS;
        step.entered = Some(exit);
        step.teleported = Some((from, exit));
    }

    motion.position = moved;
    step
}

/// Pixels the actor may travel toward `direction` before hitting a blocked tile.
pub(crate) fn travelable(
    position: &Position,
    direction: Direction,
    maze: &Maze,
    through_door: bool,
) -> f32 {
    let next = maze.neighbor(position.tile(), direction);
    if maze.is_enterable(next, through_door) {
        TILE_SIZE
    } else {
        (-position.offset_along(direction)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn classic() -> Maze {
        Maze::classic().expect("classic maze parses")
    }

    fn motion_at(tile: Tile, offset: Vec2, direction: Direction) -> Motion {
        Motion::new(Position::from_pixels(tile.center() + offset), direction)
    }

    #[test]
    fn moves_along_open_corridor() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(3, 8), Vec2::ZERO, Direction::Right);
        let step = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(step, Step::default());
        assert_eq!(motion.position.pixels(), Tile::new(3, 8).center() + Vec2::new(1.25, 0.0));
    }

    #[test]
    fn stops_at_tile_center_in_front_of_wall() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(1, 8), Vec2::new(1.0, 0.0), Direction::Left);
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(motion.position, Position::at_center(Tile::new(1, 8)));
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(motion.position, Position::at_center(Tile::new(1, 8)));
    }

    #[test]
    fn turn_inside_window_snaps_cross_axis() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(6, 8), Vec2::new(0.5, 0.0), Direction::Right);
        motion.wish_direction = Direction::Up;
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(motion.direction, Direction::Up);
        assert_eq!(motion.position.pixels(), Tile::new(6, 8).center() + Vec2::new(0.0, -1.25));
    }

    #[test]
    fn turn_outside_window_keeps_current_direction() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(6, 8), Vec2::new(-3.0, 0.0), Direction::Right);
        motion.wish_direction = Direction::Up;
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(motion.direction, Direction::Right);
        assert_eq!(motion.wish_direction, Direction::Up);
        assert_eq!(motion.position.pixels(), Tile::new(6, 8).center() + Vec2::new(-1.75, 0.0));
    }

    #[test]
    fn blocked_wish_falls_back_to_current_direction() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(3, 8), Vec2::ZERO, Direction::Right);
        motion.wish_direction = Direction::Up;
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(motion.direction, Direction::Right);
    }

    #[test]
    fn crossing_into_next_tile_sets_entered_flag() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(3, 8), Vec2::new(3.5, 0.0), Direction::Right);
        let step = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(step.entered, Some(Tile::new(4, 8)));
        assert!(motion.entered_new_tile);
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert!(!motion.entered_new_tile);
    }

    #[test]
    fn stalling_against_a_wall_marks_the_actor_blocked() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(1, 8), Vec2::new(1.0, 0.0), Direction::Left);
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert!(!motion.blocked, "the last pixel to the center is still progress");
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert!(motion.blocked);

        motion.wish_direction = Direction::Down;
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert!(!motion.blocked);
        assert_eq!(motion.direction, Direction::Down);
    }

    #[test]
    fn reversal_after_a_corner_turn_stalls_at_the_center() {
        let maze = classic();
        // (12,8) opens Up, Left and Right; Down is a wall.
        let mut motion = motion_at(Tile::new(12, 8), Vec2::new(0.0, -0.9375), Direction::Up);
        motion.reverse();
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(motion.position, Position::at_center(Tile::new(12, 8)));
        assert_eq!(motion.direction, Direction::Down);
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert!(motion.blocked);
    }

    #[test]
    fn reversal_executes_immediately_in_open_corridor() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(3, 8), Vec2::ZERO, Direction::Right);
        motion.reverse();
        let _ = advance(&mut motion, &maze, false, 1.0);
        assert_eq!(motion.direction, Direction::Left);
        assert!(!motion.reversal_pending);
    }

    #[test]
    fn doors_block_actors_without_rights() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(13, 14), Vec2::ZERO, Direction::Down);
        let _ = advance(&mut motion, &maze, false, 1.5);
        assert_eq!(motion.position, Position::at_center(Tile::new(13, 14)));
        let _ = advance(&mut motion, &maze, true, 1.5);
        assert_eq!(motion.position.pixels(), Tile::new(13, 14).center() + Vec2::new(0.0, 1.5));
    }

    #[test]
    fn portal_carries_actor_to_far_side_with_offset_preserved() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(-1, 17), Vec2::new(-3.5, 0.0), Direction::Left);
        let step = advance(&mut motion, &maze, false, 1.25);
        assert_eq!(step.teleported, Some((Tile::new(-2, 17), Tile::new(28, 17))));
        assert_eq!(motion.tile(), Tile::new(28, 17));
        assert!((motion.position.offset().x - 3.25).abs() < 1e-4);
        assert_eq!(motion.teleport_ticks, TELEPORT_TICKS);

        let hidden = motion.position;
        for _ in 0..TELEPORT_TICKS {
            let _ = advance(&mut motion, &maze, false, 1.25);
            assert_eq!(motion.position, hidden);
        }
        let _ = advance(&mut motion, &maze, false, 1.25);
        assert!(motion.position.pixels().x < hidden.pixels().x);
    }

    #[test]
    fn repeated_crossings_never_strand_actor_off_grid() {
        let maze = classic();
        let mut motion = motion_at(Tile::new(22, 17), Vec2::ZERO, Direction::Right);
        let mut crossings = 0;
        for _ in 0..2_000 {
            let before = motion.position;
            let hidden = motion.is_teleporting();
            let step = advance(&mut motion, &maze, false, 1.25);
            if step.teleported.is_some() {
                crossings += 1;
            }
            if motion.position == before && !hidden {
                motion.reverse();
            }
            let column = motion.tile().column();
            assert!((-2..=29).contains(&column), "stranded at column {column}");
            assert_eq!(motion.tile().row(), 17);
        }
        assert!(crossings >= 4, "only {crossings} portal crossings");
    }
}
