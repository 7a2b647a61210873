//! Demo input: walks the player toward the nearest food while avoiding
//! hunting pursuers.

use std::collections::{HashSet, VecDeque};

use maze_pursuit_core::{ActorView, Direction, FoodMap, Maze, PursuerState, Tile};

/// Breadth-first search from the player's tile to the closest food item.
///
/// Tiles holding a scattering or chasing pursuer, and the tiles next to them,
/// are treated as walls. Returns the first step of the path, or `None` when
/// no food is reachable.
pub(crate) fn steer(maze: &Maze, food: &FoodMap, actors: &ActorView) -> Option<Direction> {
    let start = actors.player()?.tile();
    let danger = danger_zone(maze, actors);

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::new();
    for direction in Direction::TIE_BREAK_ORDER {
        if let Some(next) = step(maze, start, direction) {
            if !danger.contains(&next) && visited.insert(next) {
                queue.push_back((next, direction));
            }
        }
    }

    while let Some((tile, first)) = queue.pop_front() {
        if food.kind(tile).is_some() {
            return Some(first);
        }
        for direction in Direction::TIE_BREAK_ORDER {
            if let Some(next) = step(maze, tile, direction) {
                if !danger.contains(&next) && visited.insert(next) {
                    queue.push_back((next, first));
                }
            }
        }
    }
    None
}

fn step(maze: &Maze, tile: Tile, direction: Direction) -> Option<Tile> {
    let next = maze.neighbor(tile, direction);
    let next = maze.portal_exit(next).unwrap_or(next);
    maze.is_enterable(next, false).then_some(next)
}

fn danger_zone(maze: &Maze, actors: &ActorView) -> HashSet<Tile> {
    let mut danger = HashSet::new();
    for snapshot in actors.iter() {
        if !matches!(
            snapshot.pursuer_state(),
            Some(PursuerState::Scattering | PursuerState::Chasing)
        ) {
            continue;
        }
        let tile = snapshot.tile();
        let _ = danger.insert(tile);
        for direction in Direction::TIE_BREAK_ORDER {
            let _ = danger.insert(maze.neighbor(tile, direction));
        }
    }
    danger
}
