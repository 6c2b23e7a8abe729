//! # Input Module
//!
//! Per-frame input polling.
//!
//! The handler turns macroquad key presses and wheel movement into a
//! [`FrameInput`] for the simulation. View changes (pausing, menus) are
//! polled separately by the scene layer.

pub mod commands;

pub use commands::*;

use crate::game::{Command, FrameInput};
use macroquad::prelude::*;

/// Input handler for processing player commands.
pub struct InputHandler {
    /// Whether debug keys produce commands
    pub debug_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(false)
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::InputHandler;
    ///
    /// let input_handler = InputHandler::new(true);
    /// assert!(input_handler.debug_keys_enabled);
    /// ```
    pub fn new(debug_keys_enabled: bool) -> Self {
        Self { debug_keys_enabled }
    }

    /// Collects every bound key pressed this frame, plus wheel and frame
    /// time.
    pub fn poll_frame(&self) -> FrameInput {
        let debug: &[(KeyCode, Command)] = if self.debug_keys_enabled {
            DEBUG_BINDINGS
        } else {
            &[]
        };
        let commands = GAMEPLAY_BINDINGS
            .iter()
            .chain(debug.iter())
            .filter(|(key, _)| is_key_pressed(*key))
            .map(|&(_, command)| command)
            .collect();

        FrameInput {
            commands,
            wheel_delta: normalize_wheel(mouse_wheel().1),
            delta_seconds: get_frame_time(),
        }
    }

    /// Returns true when a pause key was pressed this frame.
    pub fn pause_requested(&self) -> bool {
        is_key_pressed(KeyCode::M) || is_key_pressed(KeyCode::Escape)
    }
}

/// Reduces raw wheel movement to whole notches.
///
/// Backends report wildly different magnitudes per notch; only the
/// direction is kept.
pub fn normalize_wheel(raw: f32) -> f32 {
    if raw == 0.0 || !raw.is_finite() {
        0.0
    } else {
        raw.signum()
    }
}
