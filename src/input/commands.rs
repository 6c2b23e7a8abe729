//! # Key Bindings
//!
//! Maps keys to simulation commands.

use crate::game::{Command, Direction};
use macroquad::prelude::KeyCode;

/// Gameplay bindings, always active.
pub const GAMEPLAY_BINDINGS: &[(KeyCode, Command)] = &[
    (KeyCode::Up, Command::Step(Direction::North)),
    (KeyCode::W, Command::Step(Direction::North)),
    (KeyCode::Down, Command::Step(Direction::South)),
    (KeyCode::S, Command::Step(Direction::South)),
    (KeyCode::Left, Command::Step(Direction::West)),
    (KeyCode::A, Command::Step(Direction::West)),
    (KeyCode::Right, Command::Step(Direction::East)),
    (KeyCode::D, Command::Step(Direction::East)),
    (KeyCode::Space, Command::ToggleSelection),
    (KeyCode::Enter, Command::EndTurn),
    (KeyCode::V, Command::Attack),
    (KeyCode::B, Command::Destroy),
];

/// Debug bindings, only active in debug mode.
pub const DEBUG_BINDINGS: &[(KeyCode, Command)] = &[
    (KeyCode::F1, Command::ToggleDebugOverlay),
    (KeyCode::F2, Command::CycleTileOverlay),
    (KeyCode::F3, Command::ToggleLightFalloff),
    (KeyCode::I, Command::IncreaseVisibility),
    (KeyCode::K, Command::DecreaseVisibility),
    (KeyCode::T, Command::TeleportToCursor),
    (KeyCode::G, Command::SpawnEnemyAtCursor),
];

/// Looks up the command bound to a key.
///
/// # Examples
///
/// ```
/// use kiikku::{command_for_key, Command, Direction};
/// use macroquad::prelude::KeyCode;
///
/// assert_eq!(command_for_key(KeyCode::W, false), Some(Command::Step(Direction::North)));
/// assert_eq!(command_for_key(KeyCode::F1, false), None);
/// assert_eq!(command_for_key(KeyCode::F1, true), Some(Command::ToggleDebugOverlay));
/// ```
pub fn command_for_key(key: KeyCode, debug_keys: bool) -> Option<Command> {
    let debug: &[(KeyCode, Command)] = if debug_keys { DEBUG_BINDINGS } else { &[] };
    GAMEPLAY_BINDINGS
        .iter()
        .chain(debug.iter())
        .find(|(bound, _)| *bound == key)
        .map(|&(_, command)| command)
}
