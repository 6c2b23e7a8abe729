//! # Game Module
//!
//! Core simulation: the tile grid, characters, turn scheduling, enemy AI and
//! the per-frame visibility pass.
//!
//! This module contains the fundamental building blocks of the Kiikku roguelike:
//! - Spatial grid of tiles addressed by pixel positions
//! - Player and enemy characters sharing one actor component
//! - Turn scheduler alternating the player and enemy phases
//! - Visibility engine producing a fresh light overlay every frame
//! - Game state orchestrating one tick per rendered frame

pub mod actor;
pub mod ai;
pub mod frame;
pub mod grid;
pub mod state;
pub mod turn;
pub mod visibility;

pub use actor::*;
pub use ai::*;
pub use frame::*;
pub use grid::*;
pub use state::*;
pub use turn::*;
pub use visibility::*;

use crate::config::TILE_SIZE;
use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate in world-pixel units.
///
/// Positions of tiles and characters are always multiples of
/// [`TILE_SIZE`]. Conversion to array indices happens only inside
/// [`SpatialGrid`] through [`GridIndex::from_position`].
///
/// # Examples
///
/// ```
/// use kiikku::Position;
///
/// let pos = Position::from_tile(10, 5);
/// assert_eq!(pos.x, 320);
/// assert_eq!(pos.y, 160);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given pixel coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Creates the position of the tile at the given column and row.
    pub fn from_tile(col: i32, row: i32) -> Self {
        Self::new(col * TILE_SIZE, row * TILE_SIZE)
    }

    /// Calculates the Euclidean distance to another position in pixels.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Calculates the Euclidean distance to another position in tile units.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::Position;
    ///
    /// let a = Position::from_tile(0, 0);
    /// let b = Position::from_tile(3, 4);
    /// assert_eq!(a.tile_distance(b), 5.0);
    /// ```
    pub fn tile_distance(self, other: Position) -> f64 {
        self.euclidean_distance(other) / f64::from(TILE_SIZE)
    }

    /// Box range test: both axis offsets are within `radius` tiles.
    ///
    /// The bounds are inclusive, so a target exactly `radius` tiles away on
    /// either axis is still in range.
    pub fn within_box(self, other: Position, radius: u8) -> bool {
        let reach = i32::from(radius) * TILE_SIZE;
        (other.x - self.x).abs() <= reach && (other.y - self.y).abs() <= reach
    }

    /// Returns the neighbouring tile position in the given direction.
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.to_delta();
        Self::new(self.x + dx * TILE_SIZE, self.y + dy * TILE_SIZE)
    }

    /// Snaps an arbitrary pixel position to the tile containing it.
    pub fn snapped(self) -> Position {
        Self::new(
            self.x.div_euclid(TILE_SIZE) * TILE_SIZE,
            self.y.div_euclid(TILE_SIZE) * TILE_SIZE,
        )
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Cardinal directions for grid-step movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four cardinal directions, in the order used for random picks.
    pub const CARDINAL: [Direction; 4] = [
        Direction::West,
        Direction::East,
        Direction::North,
        Direction::South,
    ];

    /// Converts a direction to a delta in tile units.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::Direction;
    ///
    /// assert_eq!(Direction::North.to_delta(), (0, -1));
    /// ```
    pub fn to_delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Converts a tile delta to a direction.
    ///
    /// Returns None if the delta is not a single cardinal step.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }
}

/// Why a requested step was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Destination lies outside the grid or on an unpopulated cell
    OutOfBounds,
    /// Destination tile blocks movement
    Blocked,
    /// Destination holds another character
    Occupied,
}

/// Result of a movement request.
///
/// None of these is an error: a refused move simply leaves state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The character moved and spent one movement point
    Moved { from: Position, to: Position },
    /// The step was illegal; nothing was consumed
    Blocked(BlockReason),
    /// No movement points remain, or the character may not act right now
    Exhausted,
}

impl MoveOutcome {
    /// Returns true if the character actually changed position.
    pub fn moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_tile() {
        let pos = Position::from_tile(5, 10);
        assert_eq!(pos, Position::new(160, 320));
    }

    #[test]
    fn test_tile_distance() {
        let a = Position::from_tile(10, 10);
        let b = Position::from_tile(12, 10);
        assert_eq!(a.tile_distance(b), 2.0);
    }

    #[test]
    fn test_within_box_is_inclusive() {
        let enemy = Position::from_tile(5, 5);
        assert!(enemy.within_box(Position::from_tile(9, 5), 4));
        assert!(enemy.within_box(Position::from_tile(9, 9), 4));
        assert!(!enemy.within_box(Position::from_tile(10, 5), 4));
        assert!(!enemy.within_box(Position::from_tile(5, 0), 4));
    }

    #[test]
    fn test_step_moves_one_tile() {
        let pos = Position::from_tile(3, 3);
        assert_eq!(pos.step(Direction::North), Position::from_tile(3, 2));
        assert_eq!(pos.step(Direction::West), Position::from_tile(2, 3));
    }

    #[test]
    fn test_snapped() {
        assert_eq!(Position::new(45, 70).snapped(), Position::new(32, 64));
        assert_eq!(Position::new(-1, 0).snapped(), Position::new(-32, 0));
    }

    #[test]
    fn test_direction_round_trip_through_delta() {
        for direction in Direction::CARDINAL {
            let (dx, dy) = direction.to_delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(direction));
        }
        assert_eq!(Direction::from_delta(1, 1), None);
    }

    #[test]
    fn test_position_arithmetic() {
        let pos1 = Position::new(5, 10);
        let pos2 = Position::new(3, 2);
        assert_eq!(pos1 + pos2, Position::new(8, 12));
        assert_eq!(pos1 - pos2, Position::new(2, 8));
    }
}
