//! # Spatial Grid
//!
//! Fixed-size tile array and positional lookup.
//!
//! Cells may be unpopulated; looking one up, or looking outside the array,
//! yields `None` and never panics. Callers treat a missing tile as blocking
//! for movement and as dark for lighting.

use crate::config::TILE_SIZE;
use crate::game::{BlockReason, Position};
use serde::{Deserialize, Serialize};

/// Terrain variants produced by the level generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain stone floor
    FloorStone,
    /// Stone floor with a decorative crack sprite
    FloorStoneCracked,
    /// Floor marked as a valid player start or enemy placement
    FloorSpawn,
    /// Rubble-strewn floor from the extreme noise bands
    FloorRubble,
    /// Stone wall
    WallStone,
    /// Moss-covered wall
    WallMoss,
}

impl TileKind {
    /// Returns true for wall variants.
    pub fn is_wall(self) -> bool {
        matches!(self, TileKind::WallStone | TileKind::WallMoss)
    }

    /// Whether a freshly generated tile of this kind blocks movement.
    pub fn blocks_movement(self) -> bool {
        self.is_wall()
    }

    /// Human-readable name for debug readouts.
    pub fn name(self) -> &'static str {
        match self {
            TileKind::FloorStone => "Stone floor",
            TileKind::FloorStoneCracked => "Cracked floor",
            TileKind::FloorSpawn => "Spawn floor",
            TileKind::FloorRubble => "Rubble",
            TileKind::WallStone => "Stone wall",
            TileKind::WallMoss => "Mossy wall",
        }
    }
}

/// A single populated cell of the grid.
///
/// Only generation-time data lives here. Light levels and autotile masks are
/// recomputed every frame by the visibility pass and kept in a separate
/// overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub position: Position,
    pub blocks_movement: bool,
    /// Perimeter tiles can never be destroyed
    pub indestructible: bool,
}

impl Tile {
    /// Creates a tile whose blocking flag follows its kind.
    pub fn new(kind: TileKind, position: Position) -> Self {
        Self {
            kind,
            position,
            blocks_movement: kind.blocks_movement(),
            indestructible: false,
        }
    }

    /// Creates an indestructible boundary wall.
    pub fn perimeter(position: Position) -> Self {
        Self {
            indestructible: true,
            ..Self::new(TileKind::WallStone, position)
        }
    }

    /// Turns a blocking tile into walkable stone floor.
    ///
    /// Returns false (and changes nothing) for walkable or indestructible
    /// tiles. The transition is one way.
    pub fn destroy(&mut self) -> bool {
        if !self.blocks_movement || self.indestructible {
            return false;
        }
        self.kind = TileKind::FloorStone;
        self.blocks_movement = false;
        true
    }
}

/// Column/row index into the tile array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub col: usize,
    pub row: usize,
}

impl GridIndex {
    /// The single conversion from pixel space into array space.
    ///
    /// Negative coordinates have no index. Positions that are not tile
    /// aligned resolve to the tile containing them.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::{GridIndex, Position};
    ///
    /// let index = GridIndex::from_position(Position::new(64, 96)).unwrap();
    /// assert_eq!((index.col, index.row), (2, 3));
    /// assert!(GridIndex::from_position(Position::new(-32, 0)).is_none());
    /// ```
    pub fn from_position(position: Position) -> Option<Self> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        Some(Self {
            col: (position.x / TILE_SIZE) as usize,
            row: (position.y / TILE_SIZE) as usize,
        })
    }

    /// The inverse of [`GridIndex::from_position`].
    pub fn to_position(self) -> Position {
        Position::from_tile(self.col as i32, self.row as i32)
    }
}

/// Owner of every tile in a level.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<Tile>>,
}

impl SpatialGrid {
    /// Creates an empty grid with every cell unpopulated.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Creates a rectangular floor room enclosed by indestructible walls.
    ///
    /// Handy for hand-built encounters and for exercising the simulation on
    /// a known layout.
    pub fn walled_arena(width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        for row in 0..height {
            for col in 0..width {
                let position = GridIndex { col, row }.to_position();
                let tile = if col == 0 || row == 0 || col + 1 == width || row + 1 == height {
                    Tile::perimeter(position)
                } else {
                    Tile::new(TileKind::FloorStone, position)
                };
                grid.insert(tile);
            }
        }
        grid
    }

    /// Width of the array in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the array in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolves a position to an in-bounds index.
    pub fn index_of(&self, position: Position) -> Option<GridIndex> {
        GridIndex::from_position(position)
            .filter(|index| index.col < self.width && index.row < self.height)
    }

    fn slot(&self, index: GridIndex) -> usize {
        index.row * self.width + index.col
    }

    /// Looks up the tile at an index.
    pub fn tile_at(&self, index: GridIndex) -> Option<&Tile> {
        if index.col >= self.width || index.row >= self.height {
            return None;
        }
        self.cells[self.slot(index)].as_ref()
    }

    /// Looks up the tile at a position.
    pub fn get(&self, position: Position) -> Option<&Tile> {
        self.index_of(position).and_then(|index| self.tile_at(index))
    }

    /// Looks up the tile at a position mutably.
    pub fn get_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let index = self.index_of(position)?;
        let slot = self.slot(index);
        self.cells[slot].as_mut()
    }

    /// Stores a tile at its own position, replacing any previous occupant.
    ///
    /// Returns false if the tile lies outside the array.
    pub fn insert(&mut self, tile: Tile) -> bool {
        match self.index_of(tile.position) {
            Some(index) => {
                let slot = self.slot(index);
                self.cells[slot] = Some(tile);
                true
            }
            None => false,
        }
    }

    /// Checks whether a character could stand on this position, ignoring
    /// other characters.
    pub fn check_walkable(&self, position: Position) -> Result<(), BlockReason> {
        match self.get(position) {
            None => Err(BlockReason::OutOfBounds),
            Some(tile) if tile.blocks_movement => Err(BlockReason::Blocked),
            Some(_) => Ok(()),
        }
    }

    /// Returns true if the position holds a walkable tile.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.check_walkable(position).is_ok()
    }

    /// Destroys the tile at a position. See [`Tile::destroy`].
    pub fn destroy(&mut self, position: Position) -> bool {
        self.get_mut(position).is_some_and(Tile::destroy)
    }

    /// Iterates every populated tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    /// Iterates populated tiles inside a square of `radius` tiles around
    /// `center`, in row-major order.
    ///
    /// Work is bounded by the square, not by the size of the array.
    pub fn tiles_in_box(&self, center: Position, radius: u8) -> impl Iterator<Item = &Tile> + '_ {
        let radius = i32::from(radius);
        let center_col = center.x.div_euclid(TILE_SIZE);
        let center_row = center.y.div_euclid(TILE_SIZE);
        let clamp = |value: i32, limit: usize| value.clamp(0, limit as i32) as usize;

        let col_start = clamp(center_col - radius, self.width);
        let col_end = clamp(center_col + radius + 1, self.width);
        let row_start = clamp(center_row - radius, self.height);
        let row_end = clamp(center_row + radius + 1, self.height);

        (row_start..row_end).flat_map(move |row| {
            (col_start..col_end).filter_map(move |col| self.tile_at(GridIndex { col, row }))
        })
    }

    /// Number of populated cells.
    pub fn populated_count(&self) -> usize {
        self.tiles().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_outside_grid_is_none() {
        let grid = SpatialGrid::walled_arena(5, 5);
        assert!(grid.get(Position::from_tile(5, 0)).is_none());
        assert!(grid.get(Position::from_tile(0, 5)).is_none());
        assert!(grid.get(Position::new(-32, 0)).is_none());
    }

    #[test]
    fn test_unpopulated_cell_is_none() {
        let grid = SpatialGrid::new(4, 4);
        assert!(grid.get(Position::from_tile(1, 1)).is_none());
        assert_eq!(
            grid.check_walkable(Position::from_tile(1, 1)),
            Err(BlockReason::OutOfBounds)
        );
    }

    #[test]
    fn test_walled_arena_layout() {
        let grid = SpatialGrid::walled_arena(6, 4);
        assert_eq!(grid.populated_count(), 24);
        assert!(!grid.is_walkable(Position::from_tile(0, 2)));
        assert!(!grid.is_walkable(Position::from_tile(5, 3)));
        assert!(grid.is_walkable(Position::from_tile(2, 2)));
    }

    #[test]
    fn test_destroy_wall_is_one_way() {
        let mut grid = SpatialGrid::walled_arena(6, 6);
        let pos = Position::from_tile(2, 2);
        grid.insert(Tile::new(TileKind::WallMoss, pos));

        assert!(grid.destroy(pos));
        let tile = grid.get(pos).unwrap();
        assert_eq!(tile.kind, TileKind::FloorStone);
        assert!(!tile.blocks_movement);

        // Already floor: nothing left to destroy
        assert!(!grid.destroy(pos));
    }

    #[test]
    fn test_perimeter_is_indestructible() {
        let mut grid = SpatialGrid::walled_arena(6, 6);
        let pos = Position::from_tile(0, 3);
        assert!(!grid.destroy(pos));
        assert!(grid.get(pos).unwrap().blocks_movement);
    }

    #[test]
    fn test_tiles_in_box_is_bounded() {
        let grid = SpatialGrid::walled_arena(20, 20);
        let center = Position::from_tile(10, 10);
        assert_eq!(grid.tiles_in_box(center, 2).count(), 25);

        // Clipped at the array edge
        let corner = Position::from_tile(0, 0);
        assert_eq!(grid.tiles_in_box(corner, 2).count(), 9);
    }

    #[test]
    fn test_insert_out_of_bounds_is_rejected() {
        let mut grid = SpatialGrid::new(2, 2);
        assert!(!grid.insert(Tile::new(TileKind::FloorStone, Position::from_tile(2, 0))));
        assert!(grid.insert(Tile::new(TileKind::FloorStone, Position::from_tile(1, 1))));
        assert_eq!(grid.populated_count(), 1);
    }
}
