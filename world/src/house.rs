//! Scripted routes that move pursuers inside the house, ignoring maze walls.

use glam::Vec2;
use maze_pursuit_core::{Direction, House, Motion, Position, HALF_TILE};

const ALIGNMENT_EPSILON: f32 = 0.01;

fn approach(value: f32, goal: f32, step: f32) -> f32 {
    if (goal - value).abs() <= step {
        goal
    } else if goal > value {
        value + step
    } else {
        value - step
    }
}

fn place(motion: &mut Motion, pixels: Vec2, direction: Direction) {
    let previous = motion.position.tile();
    motion.position = Position::from_pixels(pixels);
    motion.direction = direction;
    motion.wish_direction = direction;
    motion.entered_new_tile = motion.position.tile() != previous;
}

/// Bounces a locked pursuer up and down around its bed.
pub(crate) fn bounce(motion: &mut Motion, bed: Position, pixels: f32) {
    let bed = bed.pixels();
    let current = motion.position.pixels();
    let direction = if motion.direction.is_horizontal() {
        Direction::Up
    } else {
        motion.direction
    };
    let goal = match direction {
        Direction::Up => bed.y - HALF_TILE,
        _ => bed.y + HALF_TILE,
    };
    let y = approach(current.y, goal, pixels);
    let next_direction = if y == goal {
        direction.opposite()
    } else {
        direction
    };
    place(motion, Vec2::new(bed.x, y), next_direction);
}

/// Moves a released pursuer toward the house center column, then up through
/// the door. Returns `true` once the entry position is reached.
pub(crate) fn leave(motion: &mut Motion, house: &House, pixels: f32) -> bool {
    let current = motion.position.pixels();
    let center = house.center().pixels();
    let entry = house.entry().pixels();

    let (next, direction) = if (current.x - center.x).abs() > ALIGNMENT_EPSILON {
        let direction = if center.x < current.x {
            Direction::Left
        } else {
            Direction::Right
        };
        (Vec2::new(approach(current.x, center.x, pixels), current.y), direction)
    } else {
        (Vec2::new(center.x, approach(current.y, entry.y, pixels)), Direction::Up)
    };

    place(motion, next, direction);
    next == entry
}

/// Moves an entering pursuer down through the door to the house center, then
/// sideways to its bed. Returns `true` once the bed is reached.
pub(crate) fn enter(motion: &mut Motion, house: &House, bed: Position, pixels: f32) -> bool {
    let current = motion.position.pixels();
    let center = house.center().pixels();
    let bed = bed.pixels();

    let (next, direction) = if center.y - current.y > ALIGNMENT_EPSILON {
        (Vec2::new(center.x, approach(current.y, center.y, pixels)), Direction::Down)
    } else {
        let direction = if bed.x < current.x {
            Direction::Left
        } else {
            Direction::Right
        };
        (Vec2::new(approach(current.x, bed.x, pixels), center.y), direction)
    };

    place(motion, next, direction);
    next == bed
}

/// Reports whether a returning pursuer is close enough to the house entry to
/// start entering this tick.
pub(crate) fn reached_entry(motion: &Motion, house: &House, pixels: f32) -> bool {
    let current = motion.position.pixels();
    let entry = house.entry().pixels();
    (current.y - entry.y).abs() < ALIGNMENT_EPSILON && (current.x - entry.x).abs() <= pixels
}
