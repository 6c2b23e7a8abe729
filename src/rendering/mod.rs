//! # Rendering Module
//!
//! macroquad front end: world drawing from the per-frame draw list, the HUD
//! and the menu screens.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
