//! # Game State Module
//!
//! The simulation context for one play session.
//!
//! [`GameState`] owns the grid, the player, the enemy roster, the selection
//! cursor and the debug flags. The outer application calls
//! [`GameState::tick`] once per rendered frame and draws the returned
//! [`Frame`]. A new game builds a new state; returning to the main menu
//! drops it.

use crate::game::{
    BlockReason, CameraView, ChaseStrategy, Character, Command, DebugReadout, Direction,
    DrawList, DrawRecord, Enemy, EnemyAi, EnemyId, Frame, FrameInput, HudReadout, LightOverlay,
    LightSource, MoveOutcome, Phase, Player, Position, SpatialGrid, SpriteRef, TileKind,
    TileOverlay, TurnScheduler, VisibilityEngine,
};
use crate::{generate_level, GeneratedLevel, GenerationConfig, KiikkuError, KiikkuResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Tunables for the game loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// End the player's turn automatically once both budgets are spent
    pub auto_end_turn: bool,
    /// Seconds the enemy phase must stay settled before control returns
    pub settle_delay: f32,
    pub max_blocked_attempts: u8,
    pub chase_strategy: ChaseStrategy,
    /// Enables debug commands and readouts
    pub debug: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_end_turn: false,
            settle_delay: crate::config::ENEMY_PHASE_SETTLE_SECONDS,
            max_blocked_attempts: crate::config::MAX_BLOCKED_ATTEMPTS,
            chase_strategy: ChaseStrategy::default(),
            debug: false,
        }
    }
}

impl SessionConfig {
    /// Session config with debug tools enabled.
    pub fn debug() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> KiikkuResult<()> {
        if !(self.settle_delay.is_finite() && self.settle_delay >= 0.0) {
            return Err(KiikkuError::InvalidConfig(format!(
                "settle delay must be a non-negative number of seconds, got {}",
                self.settle_delay
            )));
        }
        if self.max_blocked_attempts == 0 {
            return Err(KiikkuError::InvalidConfig(
                "max_blocked_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a targeted or debug action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionOutcome {
    Attacked { damage: f32, killed: bool },
    Destroyed,
    Teleported,
    Spawned(EnemyId),
    /// Selection mode is off, so there is no cursor to target
    NoSelection,
    /// Nothing at the cursor that this action applies to
    NoTarget,
    /// The cursor lies outside the player's visibility box
    OutOfRange,
    /// No action points remain, or the player does not have focus
    Exhausted,
    /// The cursor tile cannot hold a character
    Blocked(BlockReason),
}

impl ActionOutcome {
    /// Returns true if the action changed the world.
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Attacked { .. }
                | ActionOutcome::Destroyed
                | ActionOutcome::Teleported
                | ActionOutcome::Spawned(_)
        )
    }
}

/// Selection cursor used to target actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub active: bool,
    /// Always grid-snapped
    pub cursor: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugFlags {
    pub overlay_enabled: bool,
    pub tile_overlay: TileOverlay,
    /// Distance falloff; when off every tile in the box is fully lit
    pub light_falloff: bool,
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self {
            overlay_enabled: false,
            tile_overlay: TileOverlay::None,
            light_falloff: true,
        }
    }
}

/// Central game state containing all session data.
#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: SpatialGrid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub selection: Selection,
    pub debug: DebugFlags,
    pub camera: CameraView,
    scheduler: TurnScheduler,
    ai: EnemyAi,
    config: SessionConfig,
    overlay: LightOverlay,
    rng: StdRng,
    seed: u64,
}

impl GameState {
    /// Generates a level and starts a session on it.
    pub fn new_game(generation: &GenerationConfig, session: SessionConfig) -> KiikkuResult<Self> {
        let level = generate_level(generation)?;
        Self::from_level(level, session)
    }

    /// Starts a session on an already generated level.
    pub fn from_level(level: GeneratedLevel, session: SessionConfig) -> KiikkuResult<Self> {
        Self::with_actors(level.grid, level.player_spawn, level.enemies, session, level.seed)
    }

    /// Starts a session with an explicit layout.
    ///
    /// Used for hand-built encounters and tests.
    pub fn with_actors(
        grid: SpatialGrid,
        player_position: Position,
        enemies: Vec<Enemy>,
        session: SessionConfig,
        seed: u64,
    ) -> KiikkuResult<Self> {
        session.validate()?;
        let player = Player::new(player_position.snapped());
        let mut state = Self {
            grid,
            selection: Selection {
                active: false,
                cursor: player.position(),
            },
            camera: CameraView {
                target: player.position(),
                ..CameraView::default()
            },
            player,
            enemies,
            debug: DebugFlags::default(),
            scheduler: TurnScheduler::new(session.settle_delay, session.auto_end_turn),
            ai: EnemyAi::new(session.chase_strategy, session.max_blocked_attempts),
            config: session,
            overlay: LightOverlay::default(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        };
        state.recompute_visibility();
        Ok(state)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// Light overlay from the most recent visibility pass.
    pub fn overlay(&self) -> &LightOverlay {
        &self.overlay
    }

    /// Returns true when gameplay commands are accepted.
    pub fn player_has_focus(&self) -> bool {
        self.scheduler.player_has_focus(&self.enemies)
    }

    /// Advances the simulation by one frame.
    ///
    /// The order is fixed: commands, scheduler transitions, one enemy pass,
    /// pruning of dead enemies, visibility, draw list.
    pub fn tick(&mut self, input: &FrameInput) -> Frame {
        self.camera.apply_wheel(input.wheel_delta);
        for &command in &input.commands {
            self.apply_command(command);
        }

        self.scheduler
            .update(input.delta_seconds, &mut self.player, &mut self.enemies);
        if self.scheduler.phase() == Phase::EnemyPhase {
            self.selection.active = false;
        }

        let report = self.scheduler.run_enemy_pass(
            &self.ai,
            &mut self.enemies,
            self.player.position(),
            &self.grid,
            &mut self.rng,
        );
        if report.acted > 0 {
            log::trace!(
                "Enemy pass: {} acted, {} moved, {} rejected",
                report.acted,
                report.moved,
                report.rejected
            );
        }

        self.prune_dead_enemies();
        self.recompute_visibility();
        self.camera.target = self.player.position();
        self.build_frame()
    }

    /// Applies one decoded command.
    pub fn apply_command(&mut self, command: Command) {
        if command.is_debug() {
            if !self.config.debug {
                log::debug!("Ignoring debug command {command:?} outside debug mode");
                return;
            }
            self.apply_debug_command(command);
            return;
        }

        if !self.player_has_focus() {
            return;
        }

        match command {
            Command::Step(direction) => {
                if self.selection.active {
                    self.move_cursor(direction);
                } else {
                    self.move_player(direction);
                }
            }
            Command::EndTurn => {
                self.end_turn();
            }
            Command::ToggleSelection => self.toggle_selection(),
            Command::Attack => {
                self.attack_at_cursor();
            }
            Command::Destroy => {
                self.destroy_at_cursor();
            }
            _ => {}
        }
    }

    fn apply_debug_command(&mut self, command: Command) {
        match command {
            Command::ToggleDebugOverlay => {
                self.debug.overlay_enabled = !self.debug.overlay_enabled;
            }
            Command::CycleTileOverlay => {
                self.debug.tile_overlay = self.debug.tile_overlay.next();
            }
            Command::ToggleLightFalloff => {
                self.debug.light_falloff = !self.debug.light_falloff;
            }
            Command::IncreaseVisibility => self.adjust_player_visibility(1),
            Command::DecreaseVisibility => self.adjust_player_visibility(-1),
            Command::TeleportToCursor => {
                self.teleport_to_cursor();
            }
            Command::SpawnEnemyAtCursor => {
                self.spawn_enemy_at_cursor();
            }
            _ => {}
        }
    }

    /// Moves the player one tile, spending one movement point.
    ///
    /// Refused moves change nothing and cost nothing.
    pub fn move_player(&mut self, direction: Direction) -> MoveOutcome {
        if !self.player_has_focus() || self.player.budget().movement_points == 0 {
            return MoveOutcome::Exhausted;
        }

        let from = self.player.position();
        let to = from.step(direction);
        if let Err(reason) = self.check_free(to) {
            log::debug!("Player step {direction:?} refused: {reason:?}");
            return MoveOutcome::Blocked(reason);
        }

        self.player.actor.position = to;
        self.player.actor.budget.spend_movement();
        MoveOutcome::Moved { from, to }
    }

    /// Ends the player's turn and starts the enemy phase.
    pub fn end_turn(&mut self) -> bool {
        if !self.player_has_focus() {
            return false;
        }
        self.selection.active = false;
        self.scheduler
            .end_player_turn(&mut self.player, &mut self.enemies)
    }

    /// Toggles selection mode; the cursor starts on the player.
    pub fn toggle_selection(&mut self) {
        self.selection.cursor = self.player.position();
        self.selection.active = !self.selection.active;
    }

    /// Moves the selection cursor one tile.
    pub fn move_cursor(&mut self, direction: Direction) {
        if self.selection.active {
            self.selection.cursor = self.selection.cursor.step(direction).snapped();
        }
    }

    /// Checks that the cursor can be targeted by a player action.
    fn targeted_cursor(&self) -> Result<Position, ActionOutcome> {
        if !self.selection.active {
            return Err(ActionOutcome::NoSelection);
        }
        if !self.player_has_focus() || self.player.budget().action_points == 0 {
            return Err(ActionOutcome::Exhausted);
        }
        let cursor = self.selection.cursor;
        if !self.player.actor.sees(cursor) {
            return Err(ActionOutcome::OutOfRange);
        }
        Ok(cursor)
    }

    /// Attacks the enemy under the cursor, spending one action point.
    ///
    /// A killed enemy stays in the roster until the pruning step of the
    /// current tick.
    pub fn attack_at_cursor(&mut self) -> ActionOutcome {
        let cursor = match self.targeted_cursor() {
            Ok(cursor) => cursor,
            Err(outcome) => return outcome,
        };
        let damage = self.player.attack_damage();
        let Some(enemy) = self
            .enemies
            .iter_mut()
            .find(|enemy| enemy.is_alive() && enemy.position() == cursor)
        else {
            return ActionOutcome::NoTarget;
        };

        enemy.take_damage(damage);
        self.player.actor.budget.spend_action();
        log::info!(
            "Attacked enemy with {:.2} damage, leaving {:.2} health",
            damage,
            enemy.health
        );
        ActionOutcome::Attacked {
            damage,
            killed: !enemy.is_alive(),
        }
    }

    /// Destroys the blocking tile under the cursor, spending one action
    /// point.
    pub fn destroy_at_cursor(&mut self) -> ActionOutcome {
        let cursor = match self.targeted_cursor() {
            Ok(cursor) => cursor,
            Err(outcome) => return outcome,
        };
        if !self.grid.destroy(cursor) {
            return ActionOutcome::NoTarget;
        }
        self.player.actor.budget.spend_action();
        log::debug!("Destroyed tile at {cursor:?}");
        ActionOutcome::Destroyed
    }

    /// Moves the player straight to the cursor.
    pub fn teleport_to_cursor(&mut self) -> ActionOutcome {
        if !self.selection.active {
            return ActionOutcome::NoSelection;
        }
        let cursor = self.selection.cursor;
        if let Err(reason) = self.check_free(cursor) {
            return ActionOutcome::Blocked(reason);
        }
        self.player.actor.position = cursor;
        ActionOutcome::Teleported
    }

    /// Adds a goblin at the cursor. It joins from the next enemy phase.
    pub fn spawn_enemy_at_cursor(&mut self) -> ActionOutcome {
        if !self.selection.active {
            return ActionOutcome::NoSelection;
        }
        let cursor = self.selection.cursor;
        if let Err(reason) = self.check_free(cursor) {
            return ActionOutcome::Blocked(reason);
        }
        let goblin = Enemy::goblin(cursor);
        let id = goblin.id;
        self.enemies.push(goblin);
        ActionOutcome::Spawned(id)
    }

    fn adjust_player_visibility(&mut self, delta: i16) {
        let stats = &mut self.player.actor.stats;
        let adjusted = (i16::from(stats.visibility) + delta).clamp(1, i16::from(u8::MAX));
        stats.visibility = adjusted as u8;
        log::debug!("Player visibility set to {}", stats.visibility);
    }

    /// Walkable and free of characters.
    fn check_free(&self, position: Position) -> Result<(), BlockReason> {
        self.grid.check_walkable(position)?;
        let occupied = position == self.player.position()
            || self
                .enemies
                .iter()
                .any(|enemy| enemy.position() == position);
        if occupied {
            Err(BlockReason::Occupied)
        } else {
            Ok(())
        }
    }

    fn prune_dead_enemies(&mut self) {
        let before = self.enemies.len();
        self.enemies.retain(Enemy::is_alive);
        let removed = before - self.enemies.len();
        if removed > 0 {
            log::info!("{removed} enemies died, {} remain", self.enemies.len());
        }
    }

    fn recompute_visibility(&mut self) {
        let observer = LightSource::new(self.player.position(), self.player.stats().visibility);
        let emitters: Vec<LightSource> = self
            .enemies
            .iter()
            .map(|enemy| LightSource::new(enemy.position(), enemy.stats().visibility))
            .collect();
        let engine = VisibilityEngine::with_falloff(self.debug.light_falloff);
        self.overlay = engine.compute(&self.grid, observer, &emitters);
    }

    /// Turn and budget readouts.
    pub fn hud(&self) -> HudReadout {
        let budget = self.player.budget();
        HudReadout {
            movement_remaining: budget.movement_points,
            actions_remaining: budget.action_points,
            phase: self.scheduler.phase(),
            turn_number: self.scheduler.turn_number(),
        }
    }

    /// Enemy closest to the player, if any.
    pub fn closest_enemy(&self) -> Option<&Enemy> {
        let player = self.player.position();
        self.enemies.iter().min_by(|a, b| {
            a.position()
                .tile_distance(player)
                .total_cmp(&b.position().tile_distance(player))
        })
    }

    /// Tile under the cursor while selecting, else under the player.
    pub fn inspected_tile(&self) -> Option<TileKind> {
        let source = if self.selection.active {
            self.selection.cursor
        } else {
            self.player.position()
        };
        self.grid.get(source).map(|tile| tile.kind)
    }

    fn debug_readout(&self) -> Option<DebugReadout> {
        if !(self.config.debug && self.debug.overlay_enabled) {
            return None;
        }
        let closest = self.closest_enemy();
        Some(DebugReadout {
            enemy_count: self.enemies.len(),
            closest_enemy: closest.map(|enemy| enemy.position()),
            closest_enemy_last_known: closest.map(|enemy| enemy.last_known_player_position),
            tile_under_cursor: self.inspected_tile(),
            player_visibility: self.player.stats().visibility,
            light_falloff: self.debug.light_falloff,
            tile_overlay: self.debug.tile_overlay,
            enemy_phase_elapsed: self.scheduler.enemy_phase_elapsed(),
        })
    }

    fn build_frame(&self) -> Frame {
        let tiles = self
            .overlay
            .tiles()
            .iter()
            .map(|lit| DrawRecord {
                position: lit.position,
                sprite: if lit.kind.is_wall() {
                    SpriteRef::AutoTile {
                        kind: lit.kind,
                        mask: lit.neighbour_mask,
                    }
                } else {
                    SpriteRef::Tile(lit.kind)
                },
                light_level: lit.light_level,
            })
            .collect();

        let enemies = self
            .enemies
            .iter()
            .filter(|enemy| self.player.actor.sees(enemy.position()))
            .map(|enemy| character_record(enemy, &self.overlay))
            .collect();

        Frame {
            draw_list: DrawList {
                tiles,
                enemies,
                player: character_record(&self.player, &self.overlay),
                cursor: self.selection.active.then_some(self.selection.cursor),
            },
            hud: self.hud(),
            camera: self.camera,
            debug: self.debug_readout(),
        }
    }
}

fn character_record<C: Character>(character: &C, overlay: &LightOverlay) -> DrawRecord {
    let draw = character.draw(overlay.light_at(character.position()));
    DrawRecord {
        position: draw.position,
        sprite: SpriteRef::Character(draw.sprite),
        light_level: draw.light_level,
    }
}
