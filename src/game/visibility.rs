//! # Visibility Engine
//!
//! Per-frame light levels from distance falloff.
//!
//! The observer (the player) bounds the work with a square box of its
//! visibility radius. Inside that box each tile takes the brightest of the
//! observer's own light and the light of every emitter the observer can see.
//! The result is a fresh [`LightOverlay`]; tiles themselves are never
//! written to, so recomputing with unchanged inputs yields the same overlay.

use crate::game::{Position, SpatialGrid, Tile, TileKind};
use std::collections::HashMap;

/// Brightness of a tile `distance` tiles away from a source with the given
/// visibility stat.
///
/// Full brightness at the source, falling linearly to zero at `visibility`
/// tiles and staying zero beyond. A source with zero visibility emits no
/// light.
///
/// # Examples
///
/// ```
/// use kiikku::light_level;
///
/// assert_eq!(light_level(0.0, 4), 255);
/// assert_eq!(light_level(2.0, 4), 127);
/// assert_eq!(light_level(4.0, 4), 0);
/// assert_eq!(light_level(9.0, 4), 0);
/// ```
pub fn light_level(distance: f64, visibility: u8) -> u8 {
    if visibility == 0 {
        return 0;
    }
    let alpha = (distance / f64::from(visibility)).clamp(0.0, 1.0);
    255 - (alpha * 255.0).round() as u8
}

/// A character acting as a light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSource {
    pub position: Position,
    /// Light radius in tiles
    pub visibility: u8,
}

impl LightSource {
    /// Creates a light source.
    pub fn new(position: Position, visibility: u8) -> Self {
        Self {
            position,
            visibility,
        }
    }

    /// Light this source contributes to a tile at `target`.
    pub fn contribution(&self, target: Position) -> u8 {
        light_level(self.position.tile_distance(target), self.visibility)
    }
}

/// 12-bit autotile mask of a wall tile.
///
/// Orthogonal bits mark a neighbour of a different kind. Diagonal neighbours
/// of a different kind set their outer-corner bit when neither adjacent
/// orthogonal bit is set, and their inner-corner bit otherwise. The mask is
/// purely visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeighbourMask(pub u16);

impl NeighbourMask {
    pub const EMPTY: NeighbourMask = NeighbourMask(0);
    pub const UP: u16 = 1;
    pub const UP_RIGHT_OUTER: u16 = 1 << 1;
    pub const UP_RIGHT_INNER: u16 = 1 << 2;
    pub const RIGHT: u16 = 1 << 3;
    pub const DOWN_RIGHT_OUTER: u16 = 1 << 4;
    pub const DOWN_RIGHT_INNER: u16 = 1 << 5;
    pub const DOWN: u16 = 1 << 6;
    pub const DOWN_LEFT_OUTER: u16 = 1 << 7;
    pub const DOWN_LEFT_INNER: u16 = 1 << 8;
    pub const LEFT: u16 = 1 << 9;
    pub const UP_LEFT_OUTER: u16 = 1 << 10;
    pub const UP_LEFT_INNER: u16 = 1 << 11;

    /// Computes the mask of `tile` from its eight neighbours.
    ///
    /// Unpopulated neighbours never set a bit.
    pub fn compute(grid: &SpatialGrid, tile: &Tile) -> Self {
        let differs = |dx: i32, dy: i32| {
            let (x, y) = (tile.position.x, tile.position.y);
            let size = crate::config::TILE_SIZE;
            grid.get(Position::new(x + dx * size, y + dy * size))
                .is_some_and(|neighbour| neighbour.kind != tile.kind)
        };

        let up = differs(0, -1);
        let right = differs(1, 0);
        let down = differs(0, 1);
        let left = differs(-1, 0);

        let mut bits = 0;
        if up {
            bits |= Self::UP;
        }
        if right {
            bits |= Self::RIGHT;
        }
        if down {
            bits |= Self::DOWN;
        }
        if left {
            bits |= Self::LEFT;
        }

        let corners = [
            ((1, -1), up, right, Self::UP_RIGHT_OUTER, Self::UP_RIGHT_INNER),
            ((1, 1), down, right, Self::DOWN_RIGHT_OUTER, Self::DOWN_RIGHT_INNER),
            ((-1, 1), down, left, Self::DOWN_LEFT_OUTER, Self::DOWN_LEFT_INNER),
            ((-1, -1), up, left, Self::UP_LEFT_OUTER, Self::UP_LEFT_INNER),
        ];
        for ((dx, dy), vertical, horizontal, outer, inner) in corners {
            if differs(dx, dy) {
                bits |= if !vertical && !horizontal { outer } else { inner };
            }
        }

        NeighbourMask(bits)
    }

    /// Returns true if every bit in `flag` is set.
    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }
}

/// One tile that survived culling this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LitTile {
    pub position: Position,
    pub kind: TileKind,
    pub light_level: u8,
    pub neighbour_mask: NeighbourMask,
}

/// Derived lighting for a single frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightOverlay {
    tiles: Vec<LitTile>,
    levels: HashMap<Position, u8>,
}

impl LightOverlay {
    fn push(&mut self, lit: LitTile) {
        self.levels.insert(lit.position, lit.light_level);
        self.tiles.push(lit);
    }

    /// Lit tiles in draw order.
    pub fn tiles(&self) -> &[LitTile] {
        &self.tiles
    }

    /// Light level at a position; zero for culled or absent tiles.
    pub fn light_at(&self, position: Position) -> u8 {
        self.levels.get(&position).copied().unwrap_or(0)
    }

    /// Returns true if the tile at `position` is in the draw list.
    pub fn contains(&self, position: Position) -> bool {
        self.levels.contains_key(&position)
    }

    /// Number of lit tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if nothing is lit.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Computes light overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEngine {
    /// With falloff disabled every tile in the observer's box is fully lit
    pub falloff: bool,
}

impl Default for VisibilityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityEngine {
    /// Creates an engine with distance falloff enabled.
    pub fn new() -> Self {
        Self { falloff: true }
    }

    /// Creates an engine with the given falloff setting.
    pub fn with_falloff(falloff: bool) -> Self {
        Self { falloff }
    }

    /// Computes the overlay for one observer and any number of emitters.
    ///
    /// Emitters outside the observer's visibility box are ignored. Tiles
    /// outside the box, and tiles whose final level is zero, are culled.
    pub fn compute(
        &self,
        grid: &SpatialGrid,
        observer: LightSource,
        emitters: &[LightSource],
    ) -> LightOverlay {
        let visible_emitters: Vec<&LightSource> = emitters
            .iter()
            .filter(|emitter| {
                observer
                    .position
                    .within_box(emitter.position, observer.visibility)
            })
            .collect();

        let mut overlay = LightOverlay::default();
        for tile in grid.tiles_in_box(observer.position, observer.visibility) {
            if !observer.position.within_box(tile.position, observer.visibility) {
                continue;
            }

            let light_level = if self.falloff {
                visible_emitters
                    .iter()
                    .map(|emitter| emitter.contribution(tile.position))
                    .fold(observer.contribution(tile.position), u8::max)
            } else {
                u8::MAX
            };
            if light_level == 0 {
                continue;
            }

            let neighbour_mask = if tile.kind.is_wall() {
                NeighbourMask::compute(grid, tile)
            } else {
                NeighbourMask::EMPTY
            };

            overlay.push(LitTile {
                position: tile.position,
                kind: tile.kind,
                light_level,
                neighbour_mask,
            });
        }

        log::trace!("Visibility pass lit {} tiles", overlay.len());
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_floor(size: usize) -> SpatialGrid {
        let mut grid = SpatialGrid::new(size, size);
        for row in 0..size {
            for col in 0..size {
                grid.insert(Tile::new(
                    TileKind::FloorStone,
                    Position::from_tile(col as i32, row as i32),
                ));
            }
        }
        grid
    }

    #[test]
    fn test_light_level_falloff() {
        assert_eq!(light_level(0.0, 8), 255);
        assert_eq!(light_level(8.0, 8), 0);
        assert_eq!(light_level(100.0, 8), 0);
        assert_eq!(light_level(1.0, 0), 0);
    }

    #[test]
    fn test_tile_two_tiles_away() {
        let grid = open_floor(30);
        let observer = LightSource::new(Position::from_tile(10, 10), 4);
        let overlay = VisibilityEngine::new().compute(&grid, observer, &[]);

        assert!(overlay.contains(Position::from_tile(12, 10)));
        assert_eq!(overlay.light_at(Position::from_tile(12, 10)), 127);
    }

    #[test]
    fn test_box_filter_culls_outside_tiles() {
        let grid = open_floor(30);
        let observer = LightSource::new(Position::from_tile(10, 10), 4);
        let overlay = VisibilityEngine::new().compute(&grid, observer, &[]);

        assert!(!overlay.contains(Position::from_tile(15, 10)));
        // Box corner is inside the filter but too far for any light
        assert!(!overlay.contains(Position::from_tile(14, 14)));
        assert!(overlay
            .tiles()
            .iter()
            .all(|lit| observer.position.within_box(lit.position, 4)));
    }

    #[test]
    fn test_visible_emitter_brightens_tiles() {
        let grid = open_floor(30);
        let observer = LightSource::new(Position::from_tile(10, 10), 8);
        let goblin = LightSource::new(Position::from_tile(16, 10), 4);

        let alone = VisibilityEngine::new().compute(&grid, observer, &[]);
        let with_goblin = VisibilityEngine::new().compute(&grid, observer, &[goblin]);

        let under_goblin = Position::from_tile(16, 10);
        assert!(with_goblin.light_at(under_goblin) > alone.light_at(under_goblin));
        assert_eq!(with_goblin.light_at(under_goblin), 255);
    }

    #[test]
    fn test_hidden_emitter_is_ignored() {
        let grid = open_floor(40);
        let observer = LightSource::new(Position::from_tile(10, 10), 4);
        let far_goblin = LightSource::new(Position::from_tile(16, 10), 4);

        let alone = VisibilityEngine::new().compute(&grid, observer, &[]);
        let with_goblin = VisibilityEngine::new().compute(&grid, observer, &[far_goblin]);
        assert_eq!(alone, with_goblin);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let grid = open_floor(30);
        let observer = LightSource::new(Position::from_tile(12, 12), 6);
        let goblin = LightSource::new(Position::from_tile(14, 11), 4);
        let engine = VisibilityEngine::new();

        let first = engine.compute(&grid, observer, &[goblin]);
        let second = engine.compute(&grid, observer, &[goblin]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_falloff_lights_whole_box() {
        let grid = open_floor(30);
        let observer = LightSource::new(Position::from_tile(10, 10), 3);
        let overlay = VisibilityEngine::with_falloff(false).compute(&grid, observer, &[]);

        assert_eq!(overlay.len(), 49);
        assert!(overlay.tiles().iter().all(|lit| lit.light_level == 255));
    }

    #[test]
    fn test_neighbour_mask_orthogonal_edges() {
        let mut grid = open_floor(5);
        let wall = Tile::new(TileKind::WallStone, Position::from_tile(2, 2));
        grid.insert(wall);
        grid.insert(Tile::new(TileKind::WallStone, Position::from_tile(2, 1)));

        let mask = NeighbourMask::compute(&grid, &wall);
        assert!(!mask.contains(NeighbourMask::UP));
        assert!(mask.contains(NeighbourMask::RIGHT));
        assert!(mask.contains(NeighbourMask::DOWN));
        assert!(mask.contains(NeighbourMask::LEFT));
    }

    #[test]
    fn test_neighbour_mask_corner_disambiguation() {
        // Wall block with a single floor tile diagonally up-right
        let mut grid = SpatialGrid::new(5, 5);
        for row in 0..5 {
            for col in 0..5 {
                grid.insert(Tile::new(TileKind::WallStone, Position::from_tile(col, row)));
            }
        }
        grid.insert(Tile::new(TileKind::FloorStone, Position::from_tile(3, 1)));
        let center = *grid.get(Position::from_tile(2, 2)).unwrap();

        let mask = NeighbourMask::compute(&grid, &center);
        assert_eq!(mask, NeighbourMask(NeighbourMask::UP_RIGHT_OUTER));

        // Opening the tile above turns the corner into an inner corner
        grid.insert(Tile::new(TileKind::FloorStone, Position::from_tile(2, 1)));
        let mask = NeighbourMask::compute(&grid, &center);
        assert_eq!(
            mask,
            NeighbourMask(NeighbourMask::UP | NeighbourMask::UP_RIGHT_INNER)
        );
    }

    #[test]
    fn test_absent_neighbours_set_no_bits() {
        let mut grid = SpatialGrid::new(3, 3);
        let wall = Tile::new(TileKind::WallStone, Position::from_tile(1, 1));
        grid.insert(wall);
        assert_eq!(NeighbourMask::compute(&grid, &wall), NeighbourMask::EMPTY);
    }

    #[test]
    fn test_only_walls_carry_masks() {
        let mut grid = open_floor(10);
        grid.insert(Tile::new(TileKind::WallMoss, Position::from_tile(5, 4)));
        let observer = LightSource::new(Position::from_tile(5, 5), 4);
        let overlay = VisibilityEngine::new().compute(&grid, observer, &[]);

        for lit in overlay.tiles() {
            if lit.kind.is_wall() {
                assert_ne!(lit.neighbour_mask, NeighbourMask::EMPTY);
            } else {
                assert_eq!(lit.neighbour_mask, NeighbourMask::EMPTY);
            }
        }
    }
}
