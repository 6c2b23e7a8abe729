//! # Display Management
//!
//! Screen management and 2D graphics rendering functionality using macroquad.
//!
//! The display never inspects game state. It draws the [`Frame`] produced by
//! the simulation: tiles and characters in world space under a camera that
//! follows the player, then the HUD in screen space.

use crate::config::TILE_SIZE;
use crate::game::{
    CharacterSprite, DrawRecord, Frame, NeighbourMask, Position, SpriteRef, TileKind, TileOverlay,
};
use crate::rendering::HudPanel;
use macroquad::prelude::*;

/// Base colour of each tile kind at full brightness.
pub fn tile_color(kind: TileKind) -> Color {
    match kind {
        TileKind::FloorStone => Color::from_rgba(110, 104, 96, 255),
        TileKind::FloorStoneCracked => Color::from_rgba(96, 90, 82, 255),
        TileKind::FloorSpawn => Color::from_rgba(116, 108, 92, 255),
        TileKind::FloorRubble => Color::from_rgba(84, 78, 70, 255),
        TileKind::WallStone => Color::from_rgba(60, 58, 66, 255),
        TileKind::WallMoss => Color::from_rgba(48, 72, 50, 255),
    }
}

/// Base colour of a character sprite.
pub fn character_color(sprite: CharacterSprite) -> Color {
    match sprite {
        CharacterSprite::PlayerIdle => YELLOW,
        CharacterSprite::GoblinIdle => Color::from_rgba(120, 200, 80, 255),
    }
}

/// Scales a colour by a 0..=255 light level.
pub fn lit(color: Color, light_level: u8) -> Color {
    let factor = f32::from(light_level) / 255.0;
    Color::new(color.r * factor, color.g * factor, color.b * factor, color.a)
}

/// Which edges of a wall tile get an outline.
///
/// Returns `[top, right, bottom, left]`.
pub fn wall_edges(mask: NeighbourMask) -> [bool; 4] {
    [
        mask.contains(NeighbourMask::UP),
        mask.contains(NeighbourMask::RIGHT),
        mask.contains(NeighbourMask::DOWN),
        mask.contains(NeighbourMask::LEFT),
    ]
}

/// Macroquad display manager for the game.
pub struct MacroquadDisplay {
    /// Screen width in pixels
    pub screen_width: f32,
    /// Screen height in pixels
    pub screen_height: f32,
    /// Tile size in world pixels
    pub tile_size: f32,
    /// HUD panel drawn over the map
    pub hud: HudPanel,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    /// Creates a display sized to the current window.
    pub fn new() -> Self {
        Self {
            screen_width: screen_width(),
            screen_height: screen_height(),
            tile_size: TILE_SIZE as f32,
            hud: HudPanel::new(),
        }
    }

    /// Renders the complete game screen for one frame.
    pub fn render_frame(&mut self, frame: &Frame) {
        self.screen_width = screen_width();
        self.screen_height = screen_height();
        clear_background(BLACK);

        set_camera(&self.world_camera(frame));
        for record in &frame.draw_list.tiles {
            self.draw_tile(record);
        }
        for record in &frame.draw_list.enemies {
            self.draw_character(record);
        }
        self.draw_character(&frame.draw_list.player);
        if let Some(cursor) = frame.draw_list.cursor {
            self.draw_cursor(cursor);
        }
        if let Some(debug) = &frame.debug {
            self.draw_tile_overlay(frame, debug.tile_overlay);
        }

        set_default_camera();
        self.hud.render(&frame.hud, frame.debug.as_ref());
    }

    /// Camera centred on the frame's target at the frame's zoom.
    fn world_camera(&self, frame: &Frame) -> Camera2D {
        let zoom = frame.camera.zoom;
        let width = self.screen_width / zoom;
        let height = self.screen_height / zoom;
        let center_x = frame.camera.target.x as f32 + self.tile_size / 2.0;
        let center_y = frame.camera.target.y as f32 + self.tile_size / 2.0;
        Camera2D::from_display_rect(Rect::new(
            center_x - width / 2.0,
            center_y - height / 2.0,
            width,
            height,
        ))
    }

    fn draw_tile(&self, record: &DrawRecord) {
        let x = record.position.x as f32;
        let y = record.position.y as f32;
        match record.sprite {
            SpriteRef::Tile(kind) => {
                draw_rectangle(
                    x,
                    y,
                    self.tile_size,
                    self.tile_size,
                    lit(tile_color(kind), record.light_level),
                );
                if kind == TileKind::FloorStoneCracked {
                    let crack = lit(DARKGRAY, record.light_level);
                    draw_line(x + 6.0, y + 8.0, x + 20.0, y + 24.0, 1.0, crack);
                }
            }
            SpriteRef::AutoTile { kind, mask } => {
                draw_rectangle(
                    x,
                    y,
                    self.tile_size,
                    self.tile_size,
                    lit(tile_color(kind), record.light_level),
                );
                self.draw_wall_edges(x, y, mask, record.light_level);
            }
            SpriteRef::Character(sprite) => {
                self.draw_character_shape(x, y, sprite, record.light_level);
            }
        }
    }

    fn draw_wall_edges(&self, x: f32, y: f32, mask: NeighbourMask, light_level: u8) {
        let size = self.tile_size;
        let color = lit(LIGHTGRAY, light_level);
        let [top, right, bottom, left] = wall_edges(mask);
        if top {
            draw_line(x, y, x + size, y, 2.0, color);
        }
        if right {
            draw_line(x + size, y, x + size, y + size, 2.0, color);
        }
        if bottom {
            draw_line(x, y + size, x + size, y + size, 2.0, color);
        }
        if left {
            draw_line(x, y, x, y + size, 2.0, color);
        }

        let corners = [
            (NeighbourMask::UP_RIGHT_OUTER, x + size, y),
            (NeighbourMask::DOWN_RIGHT_OUTER, x + size, y + size),
            (NeighbourMask::DOWN_LEFT_OUTER, x, y + size),
            (NeighbourMask::UP_LEFT_OUTER, x, y),
        ];
        for (flag, corner_x, corner_y) in corners {
            if mask.contains(flag) {
                draw_circle(corner_x, corner_y, 2.0, color);
            }
        }
    }

    fn draw_character(&self, record: &DrawRecord) {
        if let SpriteRef::Character(sprite) = record.sprite {
            self.draw_character_shape(
                record.position.x as f32,
                record.position.y as f32,
                sprite,
                record.light_level,
            );
        }
    }

    fn draw_character_shape(&self, x: f32, y: f32, sprite: CharacterSprite, light_level: u8) {
        let half = self.tile_size / 2.0;
        draw_circle(
            x + half,
            y + half,
            half * 0.7,
            lit(character_color(sprite), light_level),
        );
    }

    fn draw_cursor(&self, cursor: Position) {
        let pulse = (get_time() as f32 * 4.0).sin() * 0.25 + 0.75;
        draw_rectangle_lines(
            cursor.x as f32,
            cursor.y as f32,
            self.tile_size,
            self.tile_size,
            2.0,
            Color::new(1.0, 1.0, 1.0, pulse),
        );
    }

    fn draw_tile_overlay(&self, frame: &Frame, overlay: TileOverlay) {
        let player = frame.draw_list.player.position;
        for record in &frame.draw_list.tiles {
            let label = match overlay {
                TileOverlay::None => return,
                TileOverlay::LightLevel => record.light_level.to_string(),
                TileOverlay::DistanceToPlayer => {
                    format!("{:.1}", record.position.tile_distance(player))
                }
            };
            draw_text(
                &label,
                record.position.x as f32 + 2.0,
                record.position.y as f32 + 12.0,
                12.0,
                RED,
            );
        }
    }

    /// Draws the loading screen shown while a level generates.
    pub fn render_loading(&self, seed: u64) {
        clear_background(BLACK);
        let text = "Generating level...";
        let size = measure_text(text, None, 32, 1.0);
        draw_text(
            text,
            (screen_width() - size.width) / 2.0,
            screen_height() / 2.0,
            32.0,
            WHITE,
        );
        draw_text(
            &format!("seed {seed}"),
            10.0,
            screen_height() - 12.0,
            16.0,
            GRAY,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lit_scales_channels() {
        let color = lit(WHITE, 0);
        assert_eq!((color.r, color.g, color.b), (0.0, 0.0, 0.0));
        assert_eq!(color.a, 1.0);
        assert_eq!(lit(WHITE, 255), WHITE);
    }

    #[test]
    fn test_wall_edges_follow_orthogonal_bits() {
        let mask = NeighbourMask(NeighbourMask::UP | NeighbourMask::LEFT | NeighbourMask::UP_RIGHT_INNER);
        assert_eq!(wall_edges(mask), [true, false, false, true]);
        assert_eq!(wall_edges(NeighbourMask::EMPTY), [false; 4]);
    }

    #[test]
    fn test_walls_darker_than_floor() {
        let floor = tile_color(TileKind::FloorStone);
        let wall = tile_color(TileKind::WallStone);
        assert!(wall.r + wall.g + wall.b < floor.r + floor.g + floor.b);
    }
}
