//! # Characters
//!
//! The player and the enemies share one [`Actor`] component holding position,
//! baseline stats and the turn budget. Behaviour differs only by
//! [`Controller`].

use crate::config::{
    ATTACK_MULTIPLIER, ENEMY_ACTIONS_PER_TURN, HEALTH_PER_VITALITY, PLAYER_ACTIONS_PER_TURN,
};
use crate::game::Position;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for enemies.
pub type EnemyId = Uuid;

/// Creates a new unique enemy ID.
pub fn new_enemy_id() -> EnemyId {
    Uuid::new_v4()
}

/// Baseline attributes fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Movement points granted per turn
    pub movement: u8,
    /// Sight and light radius, in tiles
    pub visibility: u8,
    pub vitality: u8,
    pub strength: u8,
    pub dexterity: u8,
}

impl Stats {
    /// Starting stats of the player character.
    pub fn player_default() -> Self {
        Self {
            movement: 6,
            visibility: 8,
            vitality: 6,
            strength: 6,
            dexterity: 6,
        }
    }

    /// Stats of the goblin, the only enemy type.
    pub fn goblin() -> Self {
        Self {
            movement: 4,
            visibility: 4,
            vitality: 5,
            strength: 3,
            dexterity: 5,
        }
    }
}

/// Remaining allowance for the current turn.
///
/// Points never underflow: spending with nothing left is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnBudget {
    pub movement_points: u8,
    pub action_points: u8,
    pub finished: bool,
}

impl TurnBudget {
    /// A finished budget with nothing left, used before a character's first turn.
    pub fn exhausted() -> Self {
        Self {
            movement_points: 0,
            action_points: 0,
            finished: true,
        }
    }

    /// A fresh budget for a new turn.
    pub fn fresh(movement_points: u8, action_points: u8) -> Self {
        Self {
            movement_points,
            action_points,
            finished: false,
        }
    }

    /// Spends one movement point. Returns false if none remain.
    pub fn spend_movement(&mut self) -> bool {
        if self.movement_points > 0 {
            self.movement_points -= 1;
            true
        } else {
            false
        }
    }

    /// Spends one action point. Returns false if none remain.
    pub fn spend_action(&mut self) -> bool {
        if self.action_points > 0 {
            self.action_points -= 1;
            true
        } else {
            false
        }
    }

    /// Marks the turn as over.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Returns true when both movement and actions are used up.
    pub fn is_spent(&self) -> bool {
        self.movement_points == 0 && self.action_points == 0
    }
}

impl Default for TurnBudget {
    fn default() -> Self {
        Self::exhausted()
    }
}

/// Who decides what a character does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    PlayerControlled,
    AiControlled,
}

impl Controller {
    /// Action points granted at the start of a turn.
    pub fn actions_per_turn(self) -> u8 {
        match self {
            Controller::PlayerControlled => PLAYER_ACTIONS_PER_TURN,
            Controller::AiControlled => ENEMY_ACTIONS_PER_TURN,
        }
    }
}

/// Shared component of every character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub position: Position,
    pub stats: Stats,
    pub budget: TurnBudget,
    pub controller: Controller,
}

impl Actor {
    /// Creates an actor whose budget is exhausted until its first turn.
    pub fn new(position: Position, stats: Stats, controller: Controller) -> Self {
        Self {
            position,
            stats,
            budget: TurnBudget::exhausted(),
            controller,
        }
    }

    /// Refreshes the budget from stats and the controller's allowance.
    pub fn start_turn(&mut self) {
        self.budget = TurnBudget::fresh(self.stats.movement, self.controller.actions_per_turn());
    }

    /// Box range test against this actor's visibility stat.
    pub fn sees(&self, target: Position) -> bool {
        self.position.within_box(target, self.stats.visibility)
    }
}

/// Sprite states the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterSprite {
    PlayerIdle,
    GoblinIdle,
}

/// Draw record for a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterDraw {
    pub position: Position,
    pub sprite: CharacterSprite,
    pub light_level: u8,
}

/// Capabilities common to the player and enemies.
pub trait Character {
    /// Gets the shared actor component.
    fn actor(&self) -> &Actor;

    /// Gets the shared actor component mutably.
    fn actor_mut(&mut self) -> &mut Actor;

    /// Gets the sprite state used for drawing.
    fn sprite(&self) -> CharacterSprite;

    /// Gets the character's position.
    fn position(&self) -> Position {
        self.actor().position
    }

    /// Gets the character's baseline stats.
    fn stats(&self) -> &Stats {
        &self.actor().stats
    }

    /// Gets the character's turn budget.
    fn budget(&self) -> &TurnBudget {
        &self.actor().budget
    }

    /// Refreshes the turn budget.
    fn start_turn(&mut self) {
        self.actor_mut().start_turn();
    }

    /// Builds the draw record at the given brightness.
    fn draw(&self, light_level: u8) -> CharacterDraw {
        CharacterDraw {
            position: self.position(),
            sprite: self.sprite(),
            light_level,
        }
    }
}

/// The single player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub actor: Actor,
    pub sprite: CharacterSprite,
}

impl Player {
    /// Creates the player with a fresh budget for the opening turn.
    pub fn new(position: Position) -> Self {
        let mut actor = Actor::new(position, Stats::player_default(), Controller::PlayerControlled);
        actor.start_turn();
        Self {
            actor,
            sprite: CharacterSprite::PlayerIdle,
        }
    }

    /// Melee damage dealt by one attack.
    pub fn attack_damage(&self) -> f32 {
        (f32::from(self.actor.stats.strength) + f32::from(self.actor.stats.dexterity))
            * ATTACK_MULTIPLIER
    }
}

impl Character for Player {
    fn actor(&self) -> &Actor {
        &self.actor
    }

    fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    fn sprite(&self) -> CharacterSprite {
        self.sprite
    }
}

/// An AI-controlled enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub actor: Actor,
    pub health: f32,
    /// Where the player was last seen; starts at the enemy's own position
    pub last_known_player_position: Position,
    /// Consecutive refused steps during the current enemy phase
    pub blocked_attempts: u8,
    pub sprite: CharacterSprite,
}

impl Enemy {
    /// Creates a goblin at the given position.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::{Character, Enemy, Position};
    ///
    /// let goblin = Enemy::goblin(Position::from_tile(4, 4));
    /// assert!(goblin.is_alive());
    /// assert!(goblin.budget().finished);
    /// assert_eq!(goblin.last_known_player_position, goblin.position());
    /// ```
    pub fn goblin(position: Position) -> Self {
        let stats = Stats::goblin();
        Self {
            id: new_enemy_id(),
            actor: Actor::new(position, stats, Controller::AiControlled),
            health: f32::from(stats.vitality) * HEALTH_PER_VITALITY,
            last_known_player_position: position,
            blocked_attempts: 0,
            sprite: CharacterSprite::GoblinIdle,
        }
    }

    /// Returns true while health stays above zero.
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtracts damage from current health.
    pub fn take_damage(&mut self, damage: f32) {
        self.health -= damage;
    }

    /// Box test of the player against this enemy's visibility stat.
    pub fn can_see(&self, player_position: Position) -> bool {
        self.actor.sees(player_position)
    }
}

impl Character for Enemy {
    fn actor(&self) -> &Actor {
        &self.actor
    }

    fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    fn sprite(&self) -> CharacterSprite {
        self.sprite
    }

    fn start_turn(&mut self) {
        self.actor.start_turn();
        self.blocked_attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_never_underflows() {
        let mut budget = TurnBudget::fresh(1, 1);
        assert!(budget.spend_movement());
        assert!(!budget.spend_movement());
        assert_eq!(budget.movement_points, 0);

        assert!(budget.spend_action());
        assert!(!budget.spend_action());
        assert_eq!(budget.action_points, 0);
        assert!(budget.is_spent());
    }

    #[test]
    fn test_player_turn_refresh() {
        let mut player = Player::new(Position::origin());
        player.actor.budget = TurnBudget::exhausted();

        player.start_turn();
        assert_eq!(*player.budget(), TurnBudget::fresh(6, 3));
    }

    #[test]
    fn test_enemy_turn_refresh_resets_blocked_attempts() {
        let mut goblin = Enemy::goblin(Position::origin());
        goblin.blocked_attempts = 2;

        goblin.start_turn();
        assert_eq!(*goblin.budget(), TurnBudget::fresh(4, 1));
        assert_eq!(goblin.blocked_attempts, 0);
    }

    #[test]
    fn test_goblin_health_from_vitality() {
        let goblin = Enemy::goblin(Position::origin());
        assert!((goblin.health - 13.15).abs() < 1e-4);
    }

    #[test]
    fn test_player_attack_kills_goblin() {
        let player = Player::new(Position::origin());
        let mut goblin = Enemy::goblin(Position::from_tile(1, 0));

        // (6 + 6) * 1.2 = 14.4 > 13.15
        goblin.take_damage(player.attack_damage());
        assert!(!goblin.is_alive());
    }

    #[test]
    fn test_draw_record() {
        let player = Player::new(Position::from_tile(2, 3));
        let record = player.draw(255);
        assert_eq!(record.position, Position::from_tile(2, 3));
        assert_eq!(record.sprite, CharacterSprite::PlayerIdle);
        assert_eq!(record.light_level, 255);
    }
}
