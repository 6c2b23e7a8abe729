//! # Frame Data
//!
//! Everything that crosses the boundary between the simulation core and the
//! outer application each frame: the polled input going in and the draw list
//! plus HUD readouts coming out.

use crate::config::{MIN_CAMERA_ZOOM, ZOOM_STEP};
use crate::game::{CharacterSprite, Direction, NeighbourMask, Phase, Position, TileKind};
use serde::{Deserialize, Serialize};

/// A gameplay or debug command decoded from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Move the player, or the cursor while selecting
    Step(Direction),
    EndTurn,
    ToggleSelection,
    /// Attack the enemy under the cursor
    Attack,
    /// Destroy the tile under the cursor
    Destroy,
    ToggleDebugOverlay,
    CycleTileOverlay,
    ToggleLightFalloff,
    IncreaseVisibility,
    DecreaseVisibility,
    TeleportToCursor,
    SpawnEnemyAtCursor,
}

impl Command {
    /// Returns true for commands that only work in debug mode.
    pub fn is_debug(self) -> bool {
        matches!(
            self,
            Command::ToggleDebugOverlay
                | Command::CycleTileOverlay
                | Command::ToggleLightFalloff
                | Command::IncreaseVisibility
                | Command::DecreaseVisibility
                | Command::TeleportToCursor
                | Command::SpawnEnemyAtCursor
        )
    }
}

/// Input consumed by one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub commands: Vec<Command>,
    /// Mouse wheel movement since the previous frame
    pub wheel_delta: f32,
    pub delta_seconds: f32,
}

impl FrameInput {
    /// An input frame with no commands.
    pub fn idle(delta_seconds: f32) -> Self {
        Self {
            delta_seconds,
            ..Self::default()
        }
    }

    /// An input frame carrying the given commands.
    pub fn with_commands(commands: Vec<Command>, delta_seconds: f32) -> Self {
        Self {
            commands,
            wheel_delta: 0.0,
            delta_seconds,
        }
    }
}

/// Camera following the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub target: Position,
    pub zoom: f32,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            target: Position::origin(),
            zoom: 1.0,
        }
    }
}

impl CameraView {
    /// Applies mouse wheel movement to the zoom level.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::CameraView;
    ///
    /// let mut camera = CameraView::default();
    /// camera.apply_wheel(-20.0);
    /// assert_eq!(camera.zoom, 0.2);
    /// ```
    pub fn apply_wheel(&mut self, wheel_delta: f32) {
        self.zoom = (self.zoom + wheel_delta * ZOOM_STEP).max(MIN_CAMERA_ZOOM);
    }
}

/// What the renderer should draw for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteRef {
    /// Floor sprite chosen by kind alone
    Tile(TileKind),
    /// Wall sprite chosen by kind and neighbour mask
    AutoTile { kind: TileKind, mask: NeighbourMask },
    Character(CharacterSprite),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRecord {
    pub position: Position,
    pub sprite: SpriteRef,
    pub light_level: u8,
}

/// Ordered draw records for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    /// Lit tiles in row-major order
    pub tiles: Vec<DrawRecord>,
    /// Enemies visible to the player
    pub enemies: Vec<DrawRecord>,
    pub player: DrawRecord,
    /// Grid-snapped selection cursor while selecting
    pub cursor: Option<Position>,
}

/// Turn and budget readouts for the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudReadout {
    pub movement_remaining: u8,
    pub actions_remaining: u8,
    pub phase: Phase,
    pub turn_number: u32,
}

/// Per-tile annotation drawn by the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileOverlay {
    #[default]
    None,
    /// Light level of each lit tile
    LightLevel,
    /// Distance from each lit tile to the player, in tiles
    DistanceToPlayer,
}

impl TileOverlay {
    /// The next mode in the debug cycle.
    pub fn next(self) -> Self {
        match self {
            TileOverlay::None => TileOverlay::LightLevel,
            TileOverlay::LightLevel => TileOverlay::DistanceToPlayer,
            TileOverlay::DistanceToPlayer => TileOverlay::None,
        }
    }
}

/// Extra readouts shown while the debug overlay is on.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugReadout {
    pub enemy_count: usize,
    pub closest_enemy: Option<Position>,
    /// Where the closest enemy last saw the player
    pub closest_enemy_last_known: Option<Position>,
    pub tile_under_cursor: Option<TileKind>,
    pub player_visibility: u8,
    pub light_falloff: bool,
    pub tile_overlay: TileOverlay,
    pub enemy_phase_elapsed: f32,
}

/// Output of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub draw_list: DrawList,
    pub hud: HudReadout,
    pub camera: CameraView,
    pub debug: Option<DebugReadout>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_never_below_minimum() {
        let mut camera = CameraView::default();
        camera.apply_wheel(1.0);
        assert!((camera.zoom - 1.1).abs() < 1e-6);

        camera.apply_wheel(-100.0);
        assert_eq!(camera.zoom, MIN_CAMERA_ZOOM);
    }

    #[test]
    fn test_tile_overlay_cycle() {
        let start = TileOverlay::default();
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn test_debug_commands() {
        assert!(Command::TeleportToCursor.is_debug());
        assert!(!Command::Step(Direction::North).is_debug());
        assert!(!Command::Attack.is_debug());
    }
}
