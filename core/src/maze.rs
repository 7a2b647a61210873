//! Static maze model: tile classification, derived tile sets and the food bitmap.
//!
//! A maze is parsed once from a character grid and never mutated afterwards.
//! Every query is a table lookup; tiles far outside the grid are reported as
//! [`TileClass::Empty`] instead of failing.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Direction, Position, PursuerId, Tile};

/// Character grid of the classic arcade maze.
pub const CLASSIC_MAZE: &str = include_str!("../mazes/classic.txt");

/// Number of off-grid tiles on each side of a portal row.
const PORTAL_DEPTH: i32 = 2;

/// Classification assigned to every tile of the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileClass {
    /// Impassable for every actor.
    Wall,
    /// Regular walkable floor.
    Corridor,
    /// Walkable floor that slows pursuers down.
    Tunnel,
    /// House door, passable only for pursuers entering or leaving the house.
    Door,
    /// Space outside the playfield.
    Empty,
}

impl TileClass {
    /// Reports whether any actor may walk onto the tile without special rights.
    #[must_use]
    pub const fn is_accessible(self) -> bool {
        matches!(self, Self::Corridor | Self::Tunnel)
    }
}

/// Kinds of food placed in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    /// Regular pellet.
    Pellet,
    /// Energizer that powers the player.
    Energizer,
}

impl FoodKind {
    /// Points awarded for eating the food.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Pellet => 10,
            Self::Energizer => 50,
        }
    }
}

/// Errors raised while parsing a maze source grid.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    /// The source contained no rows.
    #[error("maze source is empty")]
    Empty,
    /// A row differs in width from the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character outside the maze alphabet was found.
    #[error("unknown character {character:?} at column {column}, row {row}")]
    UnknownCharacter {
        /// Offending character.
        character: char,
        /// Zero-based column index.
        column: usize,
        /// Zero-based row index.
        row: usize,
    },
    /// A reserved marker is absent.
    #[error("marker {marker:?} is missing")]
    MissingMarker {
        /// Marker character.
        marker: char,
    },
    /// A reserved marker appears more than once.
    #[error("marker {marker:?} appears more than once")]
    DuplicateMarker {
        /// Marker character.
        marker: char,
    },
    /// No row carries a portal pair on its edges.
    #[error("maze has no tunnel row with portals on both edges")]
    MissingPortals,
    /// A portal marker is not on the grid edge or lacks its partner.
    #[error("portal on row {row} must sit on both grid edges")]
    MisplacedPortal {
        /// Zero-based row index.
        row: usize,
    },
}

/// Mutable food bitmap with two bits per tile: presence and energizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoodMap {
    columns: i32,
    rows: i32,
    bits: Vec<u8>,
    remaining: u32,
    total: u32,
}

impl FoodMap {
    const PRESENT: u8 = 0b01;
    const ENERGIZER: u8 = 0b10;

    fn new(columns: i32, rows: i32) -> Self {
        let cells = usize::try_from(columns * rows).unwrap_or(0);
        Self {
            columns,
            rows,
            bits: vec![0; cells],
            remaining: 0,
            total: 0,
        }
    }

    fn place(&mut self, tile: Tile, kind: FoodKind) {
        if let Some(index) = self.index(tile) {
            let flags = match kind {
                FoodKind::Pellet => Self::PRESENT,
                FoodKind::Energizer => Self::PRESENT | Self::ENERGIZER,
            };
            if self.bits[index] & Self::PRESENT == 0 {
                self.remaining += 1;
                self.total += 1;
            }
            self.bits[index] = flags;
        }
    }

    /// Food currently lying on the tile, if any.
    #[must_use]
    pub fn kind(&self, tile: Tile) -> Option<FoodKind> {
        let bits = self.bits[self.index(tile)?];
        if bits & Self::PRESENT == 0 {
            None
        } else if bits & Self::ENERGIZER == 0 {
            Some(FoodKind::Pellet)
        } else {
            Some(FoodKind::Energizer)
        }
    }

    /// Removes the food lying on the tile, returning what was eaten.
    pub fn consume(&mut self, tile: Tile) -> Option<FoodKind> {
        let kind = self.kind(tile)?;
        let index = self.index(tile)?;
        self.bits[index] &= !Self::PRESENT;
        self.remaining = self.remaining.saturating_sub(1);
        Some(kind)
    }

    /// Number of food items left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Number of food items placed when the maze was filled.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Number of food items eaten since the maze was filled.
    #[must_use]
    pub const fn eaten(&self) -> u32 {
        self.total - self.remaining
    }

    /// Reports whether every food item was eaten.
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        self.remaining == 0
    }

    /// Iterator over the tiles that still carry food.
    pub fn iter(&self) -> impl Iterator<Item = (Tile, FoodKind)> + '_ {
        let columns = self.columns;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, bits)| **bits & Self::PRESENT != 0)
            .map(move |(index, bits)| {
                let index = index as i32;
                let tile = Tile::new(index % columns, index / columns);
                let kind = if bits & Self::ENERGIZER == 0 {
                    FoodKind::Pellet
                } else {
                    FoodKind::Energizer
                };
                (tile, kind)
            })
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if tile.column() < 0
            || tile.row() < 0
            || tile.column() >= self.columns
            || tile.row() >= self.rows
        {
            return None;
        }
        usize::try_from(tile.row() * self.columns + tile.column()).ok()
    }
}

/// Geometry of the pursuer house.
#[derive(Clone, Debug, PartialEq)]
pub struct House {
    entry_tile: Tile,
    entry: Position,
    center: Position,
    beds: [Position; 4],
    doors: Vec<Tile>,
}

impl House {
    /// Tile dead pursuers aim for when returning to the house.
    #[must_use]
    pub const fn entry_tile(&self) -> Tile {
        self.entry_tile
    }

    /// Position just outside the door where pursuers leave and enter.
    #[must_use]
    pub const fn entry(&self) -> Position {
        self.entry
    }

    /// Position at the middle of the house, directly below the door.
    #[must_use]
    pub const fn center(&self) -> Position {
        self.center
    }

    /// Resting position of the provided pursuer inside the house.
    #[must_use]
    pub const fn bed(&self, pursuer: PursuerId) -> Position {
        self.beds[pursuer.index()]
    }

    /// Tiles forming the door.
    #[must_use]
    pub fn doors(&self) -> &[Tile] {
        &self.doors
    }
}

/// Immutable maze grid plus the tiles and sets derived from it.
#[derive(Clone, Debug)]
pub struct Maze {
    columns: i32,
    rows: i32,
    classes: Vec<TileClass>,
    intersections: Vec<bool>,
    house_room: Vec<bool>,
    upward_restricted: Vec<Tile>,
    portal_rows: Vec<i32>,
    food: FoodMap,
    player_home: Position,
    pursuer_homes: [Position; 4],
    scatter_targets: [Tile; 4],
    house: House,
}

impl Maze {
    /// Parses the classic arcade maze.
    pub fn classic() -> Result<Self, MazeError> {
        Self::parse(CLASSIC_MAZE)
    }

    /// Parses a maze from its character grid.
    ///
    /// `#` wall, `.` pellet, `o` energizer, space corridor, `_` empty,
    /// `T` tunnel, `-` door, `<`/`>` portals, `P` player home, `A`..`D`
    /// pursuer homes (`A` marks the house entry) and `a`..`d` scatter
    /// targets.
    pub fn parse(source: &str) -> Result<Self, MazeError> {
        let lines: Vec<&str> = source
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(MazeError::Empty);
        };
        let width = first.chars().count();
        if width == 0 {
            return Err(MazeError::Empty);
        }

        let columns = width as i32;
        let rows = lines.len() as i32;
        let mut classes = Vec::with_capacity(width * lines.len());
        let mut food = FoodMap::new(columns, rows);
        let mut markers: Vec<(char, Tile)> = Vec::new();
        let mut portal_rows = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }

            let mut left_portal = false;
            let mut right_portal = false;
            for (column, character) in line.chars().enumerate() {
                let tile = Tile::new(column as i32, row as i32);
                let class = match character {
                    '#' => TileClass::Wall,
                    '.' => {
                        food.place(tile, FoodKind::Pellet);
                        TileClass::Corridor
                    }
                    'o' => {
                        food.place(tile, FoodKind::Energizer);
                        TileClass::Corridor
                    }
                    ' ' => TileClass::Corridor,
                    '_' => TileClass::Empty,
                    'T' => TileClass::Tunnel,
                    '-' => TileClass::Door,
                    '<' | '>' => {
                        let on_edge = if character == '<' {
                            column == 0
                        } else {
                            column + 1 == width
                        };
                        if !on_edge {
                            return Err(MazeError::MisplacedPortal { row });
                        }
                        if character == '<' {
                            left_portal = true;
                        } else {
                            right_portal = true;
                        }
                        TileClass::Tunnel
                    }
                    'P' | 'A'..='D' => {
                        markers.push((character, tile));
                        TileClass::Corridor
                    }
                    'a'..='d' => {
                        markers.push((character, tile));
                        TileClass::Wall
                    }
                    _ => {
                        return Err(MazeError::UnknownCharacter {
                            character,
                            column,
                            row,
                        })
                    }
                };
                classes.push(class);
            }

            match (left_portal, right_portal) {
                (true, true) => portal_rows.push(row as i32),
                (false, false) => {}
                _ => return Err(MazeError::MisplacedPortal { row }),
            }
        }

        if portal_rows.is_empty() {
            return Err(MazeError::MissingPortals);
        }

        let marker = |wanted: char| -> Result<Tile, MazeError> {
            let mut found = markers.iter().filter(|(character, _)| *character == wanted);
            let Some(&(_, tile)) = found.next() else {
                return Err(MazeError::MissingMarker { marker: wanted });
            };
            if found.next().is_some() {
                return Err(MazeError::DuplicateMarker { marker: wanted });
            }
            Ok(tile)
        };

        let player_marker = marker('P')?;
        let entry_marker = marker('A')?;
        let center_marker = marker('B')?;
        let left_bed_marker = marker('C')?;
        let right_bed_marker = marker('D')?;
        let scatter_targets = [marker('a')?, marker('b')?, marker('c')?, marker('d')?];

        let entry = Position::between(entry_marker);
        let center = Position::between(center_marker);
        let left_bed = Position::between(left_bed_marker);
        let right_bed = Position::between(right_bed_marker);
        let house = House {
            entry_tile: entry_marker,
            entry,
            center,
            beds: [center, center, left_bed, right_bed],
            doors: Vec::new(),
        };

        let mut maze = Self {
            columns,
            rows,
            classes,
            intersections: Vec::new(),
            house_room: Vec::new(),
            upward_restricted: Vec::new(),
            portal_rows,
            food,
            player_home: Position::between(player_marker),
            pursuer_homes: [entry, center, left_bed, right_bed],
            scatter_targets,
            house,
        };

        maze.house.doors = maze
            .grid_tiles()
            .filter(|tile| maze.classify(*tile) == TileClass::Door)
            .collect();
        maze.house_room = maze.flood_house_room(center.tile());
        maze.intersections = maze
            .grid_tiles()
            .map(|tile| {
                maze.classify(tile).is_accessible()
                    && !maze.is_in_house(tile)
                    && Direction::TIE_BREAK_ORDER
                        .iter()
                        .filter(|direction| maze.classify(tile.neighbor(**direction)).is_accessible())
                        .count()
                        >= 3
            })
            .collect();
        maze.upward_restricted = [entry_marker, player_marker]
            .iter()
            .flat_map(|anchor| [anchor.translated(-1, -1), anchor.translated(2, -1)])
            .filter(|tile| maze.classify(*tile).is_accessible())
            .collect();

        Ok(maze)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Classification of the provided tile.
    ///
    /// Tiles beyond the grid edges on a portal row belong to portal space and
    /// classify as [`TileClass::Tunnel`]; anything further out is empty.
    #[must_use]
    pub fn classify(&self, tile: Tile) -> TileClass {
        match self.index(tile) {
            Some(index) => self.classes[index],
            None if self.is_portal(tile) => TileClass::Tunnel,
            None => TileClass::Empty,
        }
    }

    /// Reports whether the tile offers at least three walkable exits.
    #[must_use]
    pub fn is_intersection(&self, tile: Tile) -> bool {
        self.index(tile)
            .and_then(|index| self.intersections.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether scattering or chasing pursuers may not step onto the
    /// tile while heading Up.
    #[must_use]
    pub fn is_upward_restricted(&self, tile: Tile) -> bool {
        self.upward_restricted.contains(&tile)
    }

    /// Tiles that pursuers may not enter heading Up while hunting.
    #[must_use]
    pub fn upward_restricted(&self) -> &[Tile] {
        &self.upward_restricted
    }

    /// Reports whether the tile lies in the off-grid portal space.
    #[must_use]
    pub fn is_portal(&self, tile: Tile) -> bool {
        self.portal_rows.contains(&tile.row())
            && (tile.column() < 0 || tile.column() >= self.columns)
            && tile.column() >= -PORTAL_DEPTH
            && tile.column() < self.columns + PORTAL_DEPTH
    }

    /// Adjacent tile in the provided direction, possibly inside portal space.
    #[must_use]
    pub const fn neighbor(&self, tile: Tile, direction: Direction) -> Tile {
        tile.neighbor(direction)
    }

    /// Reports whether an actor may step onto the tile.
    #[must_use]
    pub fn is_enterable(&self, tile: Tile, through_door: bool) -> bool {
        match self.classify(tile) {
            TileClass::Corridor | TileClass::Tunnel => true,
            TileClass::Door => through_door,
            TileClass::Wall | TileClass::Empty => false,
        }
    }

    /// Reports whether the tile slows pursuers down.
    #[must_use]
    pub fn is_tunnel(&self, tile: Tile) -> bool {
        self.classify(tile) == TileClass::Tunnel
    }

    /// Reports whether the tile belongs to the room behind the house door.
    #[must_use]
    pub fn is_in_house(&self, tile: Tile) -> bool {
        self.index(tile)
            .and_then(|index| self.house_room.get(index).copied())
            .unwrap_or(false)
    }

    /// Tile reached when an actor leaves portal space on the far side.
    ///
    /// Returns `None` while the tile has not yet crossed the outer portal edge.
    #[must_use]
    pub fn portal_exit(&self, tile: Tile) -> Option<Tile> {
        if !self.portal_rows.contains(&tile.row()) {
            return None;
        }
        if tile.column() < 1 - PORTAL_DEPTH {
            Some(Tile::new(self.columns, tile.row()))
        } else if tile.column() > self.columns + PORTAL_DEPTH - 2 {
            Some(Tile::new(-1, tile.row()))
        } else {
            None
        }
    }

    /// Target tile pulled back onto the grid when it lies in portal space.
    #[must_use]
    pub fn snap_target(&self, tile: Tile) -> Tile {
        if self.portal_rows.contains(&tile.row()) {
            Tile::new(tile.column().clamp(0, self.columns - 1), tile.row())
        } else {
            tile
        }
    }

    /// Food bitmap of a freshly filled maze.
    #[must_use]
    pub fn initial_food(&self) -> &FoodMap {
        &self.food
    }

    /// Starting position of the player.
    #[must_use]
    pub const fn player_home(&self) -> Position {
        self.player_home
    }

    /// Starting position of the provided pursuer.
    #[must_use]
    pub const fn pursuer_home(&self, pursuer: PursuerId) -> Position {
        self.pursuer_homes[pursuer.index()]
    }

    /// Corner tile the provided pursuer heads for while scattering.
    #[must_use]
    pub const fn scatter_target(&self, pursuer: PursuerId) -> Tile {
        self.scatter_targets[pursuer.index()]
    }

    /// Geometry of the pursuer house.
    #[must_use]
    pub const fn house(&self) -> &House {
        &self.house
    }

    fn grid_tiles(&self) -> impl Iterator<Item = Tile> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| Tile::new(column, row)))
    }

    fn flood_house_room(&self, start: Tile) -> Vec<bool> {
        let mut room = vec![false; self.classes.len()];
        let mut queue = VecDeque::new();
        if let Some(index) = self.index(start) {
            room[index] = true;
            queue.push_back(start);
        }

        while let Some(tile) = queue.pop_front() {
            for direction in Direction::TIE_BREAK_ORDER {
                let next = tile.neighbor(direction);
                let Some(index) = self.index(next) else {
                    continue;
                };
                if room[index] || self.classes[index] != TileClass::Corridor {
                    continue;
                }
                room[index] = true;
                queue.push_back(next);
            }
        }

        room
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if tile.column() < 0
            || tile.row() < 0
            || tile.column() >= self.columns
            || tile.row() >= self.rows
        {
            return None;
        }
        usize::try_from(tile.row() * self.columns + tile.column()).ok()
    }
}
