//! # User Interface Elements
//!
//! Screen-space HUD and the menu screens.

use crate::game::{DebugReadout, HudReadout, Phase, Position};
use crate::VERSION;
use macroquad::prelude::*;

/// Turn readout and debug panel.
pub struct HudPanel {
    pub font_size: f32,
    pub line_height: f32,
}

impl Default for HudPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines of the turn readout.
pub fn hud_lines(hud: &HudReadout) -> Vec<String> {
    let mut lines = vec![
        format!("Turn {} - {}", hud.turn_number, hud.phase.label()),
        format!("Movement: {}", hud.movement_remaining),
        format!("Actions: {}", hud.actions_remaining),
    ];
    match hud.phase {
        Phase::EnemyPhase => lines.push("PROCESSING TURNS".to_string()),
        Phase::PlayerPhase if hud.movement_remaining == 0 || hud.actions_remaining == 0 => {
            lines.push("ENTER TO END TURN".to_string());
        }
        Phase::PlayerPhase => {}
    }
    lines
}

fn tile_label(position: Option<Position>) -> String {
    position.map_or_else(
        || "none".to_string(),
        |position| {
            let size = crate::config::TILE_SIZE;
            format!("({}, {})", position.x / size, position.y / size)
        },
    )
}

/// Lines of the debug panel.
pub fn debug_lines(debug: &DebugReadout) -> Vec<String> {
    vec![
        format!("Enemies: {}", debug.enemy_count),
        format!("Closest enemy: {}", tile_label(debug.closest_enemy)),
        format!(
            "Closest enemy last saw player at: {}",
            tile_label(debug.closest_enemy_last_known)
        ),
        format!(
            "Tile: {}",
            debug.tile_under_cursor.map_or("none", |kind| kind.name())
        ),
        format!("Visibility: {}", debug.player_visibility),
        format!(
            "Light falloff: {}",
            if debug.light_falloff { "on" } else { "off" }
        ),
        format!("Tile overlay: {:?}", debug.tile_overlay),
        format!("Last enemy phase: {:.2}s", debug.enemy_phase_elapsed),
    ]
}

impl HudPanel {
    pub fn new() -> Self {
        Self {
            font_size: 20.0,
            line_height: 22.0,
        }
    }

    /// Draws the turn readout in the top-left corner and, when present, the
    /// debug panel in the top-right corner.
    pub fn render(&self, hud: &HudReadout, debug: Option<&DebugReadout>) {
        let color = match hud.phase {
            Phase::PlayerPhase => WHITE,
            Phase::EnemyPhase => ORANGE,
        };
        self.draw_block(&hud_lines(hud), 12.0, 12.0, color);

        if let Some(debug) = debug {
            let mut lines = vec![format!("{} fps", get_fps())];
            lines.extend(debug_lines(debug));
            self.draw_block(&lines, screen_width() - 360.0, 12.0, SKYBLUE);
        }
    }

    fn draw_block(&self, lines: &[String], x: f32, y: f32, color: Color) {
        let height = lines.len() as f32 * self.line_height + 8.0;
        let width = lines
            .iter()
            .map(|line| measure_text(line, None, self.font_size as u16, 1.0).width)
            .fold(0.0, f32::max);
        draw_rectangle(x - 6.0, y - 4.0, width + 12.0, height, Color::new(0.0, 0.0, 0.0, 0.7));

        for (i, line) in lines.iter().enumerate() {
            draw_text(
                line,
                x,
                y + self.font_size + i as f32 * self.line_height,
                self.font_size,
                color,
            );
        }
    }
}

fn draw_centered(text: &str, y: f32, size: f32, color: Color) {
    let dims = measure_text(text, None, size as u16, 1.0);
    draw_text(text, (screen_width() - dims.width) / 2.0, y, size, color);
}

/// Draws the main menu.
pub fn render_main_menu() {
    clear_background(BLACK);
    let middle = screen_height() / 2.0;
    draw_centered("KIIKKU", middle - 60.0, 56.0, WHITE);
    draw_centered("Enter: new game", middle + 10.0, 24.0, LIGHTGRAY);
    draw_centered("Esc: quit", middle + 40.0, 24.0, LIGHTGRAY);
    draw_text(&format!("v{VERSION}"), 10.0, screen_height() - 12.0, 16.0, GRAY);
}

/// Draws the pause overlay on top of the last game frame.
pub fn render_pause_menu() {
    draw_rectangle(
        0.0,
        0.0,
        screen_width(),
        screen_height(),
        Color::new(0.0, 0.0, 0.0, 0.6),
    );
    let middle = screen_height() / 2.0;
    draw_centered("PAUSED", middle - 40.0, 48.0, WHITE);
    draw_centered("Esc/P: resume", middle + 10.0, 24.0, LIGHTGRAY);
    draw_centered("Q: main menu", middle + 40.0, 24.0, LIGHTGRAY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TileOverlay;

    #[test]
    fn test_hud_lines() {
        let hud = HudReadout {
            movement_remaining: 4,
            actions_remaining: 2,
            phase: Phase::PlayerPhase,
            turn_number: 3,
        };
        let lines = hud_lines(&hud);
        assert_eq!(lines[0], "Turn 3 - Player turn");
        assert_eq!(lines[1], "Movement: 4");
        assert_eq!(lines[2], "Actions: 2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_hud_hints() {
        let mut hud = HudReadout {
            movement_remaining: 0,
            actions_remaining: 2,
            phase: Phase::PlayerPhase,
            turn_number: 1,
        };
        assert_eq!(hud_lines(&hud).last().unwrap(), "ENTER TO END TURN");

        hud.movement_remaining = 3;
        hud.actions_remaining = 0;
        assert_eq!(hud_lines(&hud).last().unwrap(), "ENTER TO END TURN");

        hud.phase = Phase::EnemyPhase;
        assert_eq!(hud_lines(&hud).last().unwrap(), "PROCESSING TURNS");
    }

    #[test]
    fn test_debug_lines_use_tile_coordinates() {
        let debug = DebugReadout {
            enemy_count: 2,
            closest_enemy: Some(Position::from_tile(4, 7)),
            closest_enemy_last_known: None,
            tile_under_cursor: None,
            player_visibility: 8,
            light_falloff: false,
            tile_overlay: TileOverlay::LightLevel,
            enemy_phase_elapsed: 0.5,
        };
        let lines = debug_lines(&debug);
        assert!(lines.contains(&"Closest enemy: (4, 7)".to_string()));
        assert!(lines.contains(&"Closest enemy last saw player at: none".to_string()));
        assert!(lines.contains(&"Light falloff: off".to_string()));
    }
}
