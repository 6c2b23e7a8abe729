//! # Generation Module
//!
//! Procedural level generation: noise terrain and spawn placement.
//!
//! A level is produced in two passes. [`NoiseLevelGenerator`] samples a
//! seeded simplex field into a walled tile grid and records every
//! spawn-eligible floor tile. [`EncounterGenerator`] then picks the player's
//! start among those tiles and places goblins on the rest.
//!
//! Generation has no recoverable failure: a field that yields no spawn
//! tiles is still a valid (if degenerate) level. Only an invalid
//! [`GenerationConfig`] is rejected.

pub mod encounters;
pub mod noise_level;

pub use encounters::*;
pub use noise_level::*;

use crate::config::{ENEMY_SPAWN_RATE, GRID_DIMENSION, MAX_GRID_DIMENSION};
use crate::game::{Enemy, Position, SpatialGrid};
use crate::{KiikkuError, KiikkuResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How the player's start is chosen among spawn-eligible tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnSelection {
    /// Every spawn tile is equally likely
    #[default]
    Uniform,
    /// First tile is the default; each later tile overrides it with
    /// `player_override_chance`, favouring tiles late in row-major order
    LateBiased,
}

/// Noise value thresholds separating terrain bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseBands {
    /// Absolute values above this become rubble floor
    pub rubble: f64,
    /// Values above this (and not rubble) become stone wall
    pub wall: f64,
    /// Values above this (and not wall) become floor; the rest mossy wall
    pub floor: f64,
}

impl Default for NoiseBands {
    fn default() -> Self {
        Self {
            rubble: 0.7,
            wall: 0.1,
            floor: -0.6,
        }
    }
}

/// Configuration for procedural generation.
///
/// Controls the tile array size, the sampled noise domain, the band table
/// and every spawn probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Edge length of the tile array
    pub grid_dimension: usize,
    /// Edge length of the sampled noise domain, in cells
    pub samples: usize,
    /// Noise-space distance between neighbouring samples
    pub step: f64,
    pub bands: NoiseBands,
    /// Chance an ordinary floor cell becomes spawn-eligible
    pub spawn_marker_chance: f64,
    /// Chance a non-spawn floor cell uses the cracked sprite
    pub decor_floor_chance: f64,
    /// Override chance used by [`SpawnSelection::LateBiased`]
    pub player_override_chance: f64,
    /// Chance each remaining spawn tile receives a goblin
    pub enemy_spawn_rate: f64,
    pub spawn_selection: SpawnSelection,
}

impl GenerationConfig {
    /// Creates the full-size configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.samples, 100);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            grid_dimension: GRID_DIMENSION,
            samples: 100,
            step: 0.1,
            bands: NoiseBands::default(),
            spawn_marker_chance: 0.01,
            decor_floor_chance: 0.01,
            player_override_chance: 0.1,
            enemy_spawn_rate: ENEMY_SPAWN_RATE,
            spawn_selection: SpawnSelection::default(),
        }
    }

    /// Creates a configuration for testing with a small grid.
    ///
    /// Spawn markers are far denser than in play so tiny levels still get
    /// a start position and some goblins.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            grid_dimension: 40,
            samples: 40,
            step: 0.15,
            spawn_marker_chance: 0.05,
            ..Self::new(seed)
        }
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> KiikkuResult<()> {
        if self.grid_dimension > MAX_GRID_DIMENSION {
            return Err(KiikkuError::InvalidConfig(format!(
                "grid dimension {} exceeds the limit of {}",
                self.grid_dimension, MAX_GRID_DIMENSION
            )));
        }
        if self.samples < 3 {
            return Err(KiikkuError::InvalidConfig(format!(
                "sample domain of {} cells leaves no interior",
                self.samples
            )));
        }
        if self.samples > self.grid_dimension {
            return Err(KiikkuError::InvalidConfig(format!(
                "sample domain of {} cells does not fit a {}-tile grid",
                self.samples, self.grid_dimension
            )));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(KiikkuError::InvalidConfig(format!(
                "noise step must be positive, got {}",
                self.step
            )));
        }

        let chances = [
            ("spawn_marker_chance", self.spawn_marker_chance),
            ("decor_floor_chance", self.decor_floor_chance),
            ("player_override_chance", self.player_override_chance),
            ("enemy_spawn_rate", self.enemy_spawn_rate),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(KiikkuError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }

        if !(self.bands.floor < self.bands.wall && self.bands.wall < self.bands.rubble) {
            return Err(KiikkuError::InvalidConfig(
                "noise bands must satisfy floor < wall < rubble".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> KiikkuResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> KiikkuResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// A fully generated level ready to play.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub grid: SpatialGrid,
    /// Player start; the origin when the level has no spawn tiles
    pub player_spawn: Position,
    /// Every spawn-eligible tile in row-major order
    pub spawn_points: Vec<Position>,
    pub enemies: Vec<Enemy>,
    pub seed: u64,
}

/// Runs both generation passes for one configuration.
///
/// The same configuration always yields the same terrain, spawn and enemy
/// placement.
#[cfg_attr(feature = "dev-tools", tracing::instrument(skip_all, fields(seed = config.seed)))]
pub fn generate_level(config: &GenerationConfig) -> KiikkuResult<GeneratedLevel> {
    config.validate()?;
    let started = Instant::now();
    let mut rng = utils::create_rng(config);

    let terrain_generator = NoiseLevelGenerator;
    let terrain = terrain_generator.generate(config, &mut rng)?;
    terrain_generator.validate(&terrain, config)?;

    let encounter_generator = EncounterGenerator::new(&terrain.spawn_points);
    let encounters = encounter_generator.generate(config, &mut rng)?;
    encounter_generator.validate(&encounters, config)?;

    log::info!(
        "Generated level (seed {}) in {:.1}ms: {} spawn tiles, {} goblins",
        config.seed,
        started.elapsed().as_secs_f64() * 1000.0,
        terrain.spawn_points.len(),
        encounters.enemies.len()
    );

    Ok(GeneratedLevel {
        grid: terrain.grid,
        player_spawn: encounters.player_spawn,
        spawn_points: terrain.spawn_points,
        enemies: encounters.enemies,
        seed: config.seed,
    })
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Derives a seed from the wall clock, for unseeded runs.
    pub fn seed_from_clock() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(42)
    }
}
