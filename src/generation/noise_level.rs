//! # Noise Terrain
//!
//! Samples a seeded 2D simplex field over a square domain and classifies
//! each sample into a tile through a fixed band table. The outermost ring of
//! the domain is always indestructible wall.

use crate::game::{GridIndex, Position, SpatialGrid, Tile, TileKind};
use crate::{GenerationConfig, Generator, KiikkuError, KiikkuResult};
use noise::{NoiseFn, OpenSimplex};
use rand::rngs::StdRng;
use rand::Rng;

/// Classification of one interior noise sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Floor,
    CrackedFloor,
    /// Floor that may hold the player's start or an enemy
    SpawnMarker,
    Rubble,
    Wall,
    MossWall,
}

impl Cell {
    /// Tile kind this cell expands into.
    pub fn tile_kind(self) -> TileKind {
        match self {
            Cell::Floor => TileKind::FloorStone,
            Cell::CrackedFloor => TileKind::FloorStoneCracked,
            Cell::SpawnMarker => TileKind::FloorSpawn,
            Cell::Rubble => TileKind::FloorRubble,
            Cell::Wall => TileKind::WallStone,
            Cell::MossWall => TileKind::WallMoss,
        }
    }
}

/// Maps a noise value to a cell through the band table.
///
/// `spawn_roll` and `decor_roll` are uniform draws in `0.0..1.0`; they only
/// matter in the ordinary floor band, where the spawn marker takes
/// precedence over the decorative variant.
///
/// # Examples
///
/// ```
/// use kiikku::{classify_value, Cell, GenerationConfig};
///
/// let config = GenerationConfig::default();
/// assert_eq!(classify_value(0.9, 0.5, 0.5, &config), Cell::Rubble);
/// assert_eq!(classify_value(-0.9, 0.5, 0.5, &config), Cell::Rubble);
/// assert_eq!(classify_value(0.3, 0.5, 0.5, &config), Cell::Wall);
/// assert_eq!(classify_value(0.0, 0.5, 0.5, &config), Cell::Floor);
/// assert_eq!(classify_value(0.0, 0.001, 0.5, &config), Cell::SpawnMarker);
/// assert_eq!(classify_value(-0.65, 0.5, 0.5, &config), Cell::MossWall);
/// ```
pub fn classify_value(value: f64, spawn_roll: f64, decor_roll: f64, config: &GenerationConfig) -> Cell {
    let bands = &config.bands;
    if value.abs() > bands.rubble {
        Cell::Rubble
    } else if value > bands.wall {
        Cell::Wall
    } else if value > bands.floor {
        if spawn_roll < config.spawn_marker_chance {
            Cell::SpawnMarker
        } else if decor_roll < config.decor_floor_chance {
            Cell::CrackedFloor
        } else {
            Cell::Floor
        }
    } else {
        Cell::MossWall
    }
}

/// Generated terrain before encounters are placed.
#[derive(Debug, Clone)]
pub struct NoiseLevel {
    pub grid: SpatialGrid,
    /// Spawn-eligible tiles in row-major order
    pub spawn_points: Vec<Position>,
}

/// Simplex-noise terrain generator.
pub struct NoiseLevelGenerator;

impl NoiseLevelGenerator {
    fn is_border(col: usize, row: usize, samples: usize) -> bool {
        col == 0 || row == 0 || col + 1 == samples || row + 1 == samples
    }
}

impl Generator<NoiseLevel> for NoiseLevelGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> KiikkuResult<NoiseLevel> {
        let field = OpenSimplex::new(rng.gen());
        let mut grid = SpatialGrid::new(config.grid_dimension, config.grid_dimension);
        let mut spawn_points = Vec::new();

        for row in 0..config.samples {
            for col in 0..config.samples {
                let position = GridIndex { col, row }.to_position();
                if Self::is_border(col, row, config.samples) {
                    grid.insert(Tile::perimeter(position));
                    continue;
                }

                let value = field.get([col as f64 * config.step, row as f64 * config.step]);
                let spawn_roll: f64 = rng.gen();
                let decor_roll: f64 = rng.gen();
                let cell = classify_value(value, spawn_roll, decor_roll, config);
                if cell == Cell::SpawnMarker {
                    spawn_points.push(position);
                }
                grid.insert(Tile::new(cell.tile_kind(), position));
            }
        }

        log::debug!(
            "{} sampled {}x{} cells, {} spawn markers",
            self.generator_type(),
            config.samples,
            config.samples,
            spawn_points.len()
        );
        Ok(NoiseLevel { grid, spawn_points })
    }

    fn validate(&self, content: &NoiseLevel, config: &GenerationConfig) -> KiikkuResult<()> {
        for row in 0..config.samples {
            for col in 0..config.samples {
                if !Self::is_border(col, row, config.samples) {
                    continue;
                }
                let intact = content
                    .grid
                    .tile_at(GridIndex { col, row })
                    .is_some_and(|tile| tile.kind.is_wall() && tile.indestructible);
                if !intact {
                    return Err(KiikkuError::InvalidState(format!(
                        "perimeter broken at column {col}, row {row}"
                    )));
                }
            }
        }

        for &spawn in &content.spawn_points {
            let kind = content.grid.get(spawn).map(|tile| tile.kind);
            if kind != Some(TileKind::FloorSpawn) {
                return Err(KiikkuError::InvalidState(format!(
                    "spawn point {spawn:?} is not a spawn floor"
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "NoiseLevelGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;

    #[test]
    fn test_band_boundaries() {
        let config = GenerationConfig::default();
        // Band edges are exclusive on the lower side
        assert_eq!(classify_value(0.7, 0.5, 0.5, &config), Cell::Wall);
        assert_eq!(classify_value(0.1, 0.5, 0.5, &config), Cell::Floor);
        assert_eq!(classify_value(-0.6, 0.5, 0.5, &config), Cell::MossWall);
        assert_eq!(classify_value(-0.7, 0.5, 0.5, &config), Cell::MossWall);
    }

    #[test]
    fn test_spawn_marker_wins_over_decor() {
        let config = GenerationConfig::default();
        assert_eq!(classify_value(0.0, 0.0, 0.0, &config), Cell::SpawnMarker);
        assert_eq!(classify_value(0.0, 0.5, 0.0, &config), Cell::CrackedFloor);
    }

    #[test]
    fn test_rubble_is_walkable() {
        assert!(!Cell::Rubble.tile_kind().blocks_movement());
        assert!(Cell::MossWall.tile_kind().blocks_movement());
    }

    #[test]
    fn test_perimeter_ring_is_wall() {
        let config = GenerationConfig::for_testing(99);
        let mut rng = create_rng(&config);
        let generator = NoiseLevelGenerator;
        let level = generator.generate(&config, &mut rng).unwrap();

        assert!(generator.validate(&level, &config).is_ok());
        assert_eq!(level.grid.populated_count(), config.samples * config.samples);
        for i in 0..config.samples {
            for index in [
                GridIndex { col: i, row: 0 },
                GridIndex { col: i, row: config.samples - 1 },
                GridIndex { col: 0, row: i },
                GridIndex { col: config.samples - 1, row: i },
            ] {
                assert!(level.grid.tile_at(index).unwrap().blocks_movement);
            }
        }
    }

    #[test]
    fn test_cells_outside_domain_stay_empty() {
        let config = GenerationConfig {
            grid_dimension: 50,
            ..GenerationConfig::for_testing(3)
        };
        let mut rng = create_rng(&config);
        let level = NoiseLevelGenerator.generate(&config, &mut rng).unwrap();
        assert!(level.grid.get(Position::from_tile(45, 45)).is_none());
    }

    #[test]
    fn test_validate_detects_broken_perimeter() {
        let config = GenerationConfig::for_testing(5);
        let mut rng = create_rng(&config);
        let generator = NoiseLevelGenerator;
        let mut level = generator.generate(&config, &mut rng).unwrap();
        level
            .grid
            .insert(Tile::new(TileKind::FloorStone, Position::from_tile(0, 5)));

        assert!(generator.validate(&level, &config).is_err());
    }
}
