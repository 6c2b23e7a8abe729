//! # Kiikku Roguelike
//!
//! A turn-based roguelike played on a noise-generated cave grid.
//!
//! ## Architecture Overview
//!
//! The simulation core is independent of any window or renderer. The outer
//! application polls input, hands it to the core once per frame and draws
//! whatever the core returns:
//!
//! - **Spatial Grid**: Fixed-size tile array addressed by pixel positions
//! - **Turn Scheduler**: Alternates control between the player and the enemy party
//! - **Enemy AI**: Visibility-gated greedy chase with a random wander fallback
//! - **Visibility Engine**: Per-tile light levels from distance falloff
//! - **Generation System**: Simplex-noise terrain plus spawn placement
//! - **Rendering System**: macroquad front end consuming the per-frame draw list
//!
//! The per-frame order inside [`GameState::tick`] is fixed: input, scheduler
//! transitions, enemy pass, pruning of dead enemies, visibility, draw list.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scenes;
pub mod settings;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use scenes::*;
pub use settings::*;

/// Core error type for the Kiikku game engine.
///
/// Only configuration, settings I/O and application setup produce errors.
/// Simulation outcomes such as blocked moves are reported as plain values.
#[derive(thiserror::Error, Debug)]
pub enum KiikkuError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Application state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Kiikku codebase.
pub type KiikkuResult<T> = Result<T, KiikkuError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Edge length of one tile in world-pixel units
    pub const TILE_SIZE: i32 = 32;

    /// Default edge length of the tile array, in tiles
    pub const GRID_DIMENSION: usize = 1000;

    /// Largest edge length a generation config may request
    pub const MAX_GRID_DIMENSION: usize = 4096;

    /// Action points granted to the player at the start of each turn
    pub const PLAYER_ACTIONS_PER_TURN: u8 = 3;

    /// Action points granted to each enemy at the start of the enemy phase
    pub const ENEMY_ACTIONS_PER_TURN: u8 = 1;

    /// Seconds the enemy phase must stay settled before control returns
    pub const ENEMY_PHASE_SETTLE_SECONDS: f32 = 0.25;

    /// Consecutive rejected steps after which an enemy gives up its turn
    pub const MAX_BLOCKED_ATTEMPTS: u8 = 3;

    /// Probability that a spawn-eligible tile receives an enemy
    pub const ENEMY_SPAWN_RATE: f64 = 0.7;

    /// Smallest camera zoom the mouse wheel can reach
    pub const MIN_CAMERA_ZOOM: f32 = 0.2;

    /// Zoom change per mouse wheel notch
    pub const ZOOM_STEP: f32 = 0.1;

    /// Multiplier applied to strength plus dexterity for melee damage
    pub const ATTACK_MULTIPLIER: f32 = 1.2;

    /// Multiplier applied to vitality for an enemy's starting health
    pub const HEALTH_PER_VITALITY: f32 = 2.63;
}
