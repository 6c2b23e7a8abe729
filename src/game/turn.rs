//! # Turn Scheduler
//!
//! Two-phase state machine: the player acts, then every enemy acts during
//! one shared enemy phase, then control returns to the player.
//!
//! Budgets are refreshed only on phase entry. The player's budget is
//! refreshed on entering the player phase and all enemy budgets at once on
//! entering the enemy phase. Control returns to the player only after every
//! enemy reports finished *and* the phase has stayed settled for a short
//! delay, so an empty roster still shows a visible enemy phase.

use crate::game::{Character, Enemy, EnemyAi, EnemyStep, Player, Position, SpatialGrid};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which party currently holds control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PlayerPhase,
    EnemyPhase,
}

impl Phase {
    /// Short label for HUD readouts.
    pub fn label(self) -> &'static str {
        match self {
            Phase::PlayerPhase => "Player turn",
            Phase::EnemyPhase => "Enemy turn",
        }
    }
}

/// Summary of one enemy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnemyPassReport {
    /// Enemies that were given an opportunity to act
    pub acted: usize,
    pub moved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone)]
pub struct TurnScheduler {
    phase: Phase,
    turn_number: u32,
    settle_delay: f32,
    settle_timer: f32,
    enemy_phase_elapsed: f32,
    auto_end_turn: bool,
    /// Set by the turn end; the frame that ended the turn adds no settle time
    just_entered_enemy_phase: bool,
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new(crate::config::ENEMY_PHASE_SETTLE_SECONDS, false)
    }
}

impl TurnScheduler {
    /// Creates a scheduler in the player phase of turn 1.
    pub fn new(settle_delay: f32, auto_end_turn: bool) -> Self {
        Self {
            phase: Phase::PlayerPhase,
            turn_number: 1,
            settle_delay: settle_delay.max(0.0),
            settle_timer: 0.0,
            enemy_phase_elapsed: 0.0,
            auto_end_turn,
            just_entered_enemy_phase: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Seconds spent in the current (or most recent) enemy phase.
    pub fn enemy_phase_elapsed(&self) -> f32 {
        self.enemy_phase_elapsed
    }

    pub fn auto_end_turn(&self) -> bool {
        self.auto_end_turn
    }

    /// Returns true when the player may issue gameplay commands.
    pub fn player_has_focus(&self, enemies: &[Enemy]) -> bool {
        self.phase == Phase::PlayerPhase && enemies.iter().all(|enemy| enemy.budget().finished)
    }

    /// Ends the player phase and refreshes every enemy in one step.
    ///
    /// Returns false (and changes nothing) outside the player phase.
    pub fn end_player_turn(&mut self, player: &mut Player, enemies: &mut [Enemy]) -> bool {
        if self.phase != Phase::PlayerPhase {
            return false;
        }

        player.actor.budget.finish();
        for enemy in enemies.iter_mut() {
            enemy.start_turn();
        }

        self.phase = Phase::EnemyPhase;
        self.settle_timer = 0.0;
        self.enemy_phase_elapsed = 0.0;
        self.just_entered_enemy_phase = true;
        log::debug!(
            "Turn {}: player ended turn, {} enemies acting",
            self.turn_number,
            enemies.len()
        );
        true
    }

    /// Runs the phase transition rules for one frame.
    pub fn update(&mut self, delta_seconds: f32, player: &mut Player, enemies: &mut [Enemy]) {
        match self.phase {
            Phase::PlayerPhase => {
                if self.auto_end_turn && player.budget().is_spent() {
                    self.end_player_turn(player, enemies);
                }
            }
            Phase::EnemyPhase => {
                // Time before the turn ended must not count toward settling
                if std::mem::take(&mut self.just_entered_enemy_phase) {
                    return;
                }
                self.enemy_phase_elapsed += delta_seconds;
                if enemies.iter().all(|enemy| enemy.budget().finished) {
                    self.settle_timer += delta_seconds;
                    if self.settle_timer >= self.settle_delay {
                        self.begin_player_phase(player);
                    }
                } else {
                    self.settle_timer = 0.0;
                }
            }
        }
    }

    fn begin_player_phase(&mut self, player: &mut Player) {
        log::info!(
            "Enemy phase of turn {} finished in {:.2}s",
            self.turn_number,
            self.enemy_phase_elapsed
        );
        self.phase = Phase::PlayerPhase;
        self.settle_timer = 0.0;
        self.turn_number += 1;
        player.start_turn();
    }

    /// Gives every unfinished enemy exactly one opportunity to act.
    ///
    /// Does nothing outside the enemy phase. Enemies move in roster order
    /// and each sees the positions the earlier ones moved to.
    pub fn run_enemy_pass<R: Rng>(
        &self,
        ai: &EnemyAi,
        enemies: &mut [Enemy],
        player_position: Position,
        grid: &SpatialGrid,
        rng: &mut R,
    ) -> EnemyPassReport {
        let mut report = EnemyPassReport::default();
        if self.phase != Phase::EnemyPhase {
            return report;
        }

        let mut occupied: HashSet<Position> =
            enemies.iter().map(|enemy| enemy.position()).collect();

        for enemy in enemies.iter_mut() {
            if enemy.budget().finished {
                continue;
            }
            report.acted += 1;

            // An enemy never blocks itself
            let own = enemy.position();
            occupied.remove(&own);
            match ai.act(enemy, player_position, grid, &occupied, rng) {
                EnemyStep::Moved { .. } => report.moved += 1,
                EnemyStep::Rejected(_) => report.rejected += 1,
                EnemyStep::Idled | EnemyStep::Finished => {}
            }
            occupied.insert(enemy.position());
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_starts_in_player_phase() {
        let scheduler = TurnScheduler::default();
        assert_eq!(scheduler.phase(), Phase::PlayerPhase);
        assert_eq!(scheduler.turn_number(), 1);
    }

    #[test]
    fn test_end_turn_refreshes_all_enemies() {
        let mut scheduler = TurnScheduler::default();
        let mut player = Player::new(Position::from_tile(2, 2));
        let mut enemies = vec![
            Enemy::goblin(Position::from_tile(5, 5)),
            Enemy::goblin(Position::from_tile(6, 6)),
        ];

        assert!(scheduler.end_player_turn(&mut player, &mut enemies));
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);
        assert!(player.budget().finished);
        for enemy in &enemies {
            assert!(!enemy.budget().finished);
            assert_eq!(enemy.budget().movement_points, 4);
            assert_eq!(enemy.budget().action_points, 1);
        }

        // Ending twice is a no-op
        assert!(!scheduler.end_player_turn(&mut player, &mut enemies));
    }

    #[test]
    fn test_empty_roster_still_waits_for_settle_delay() {
        let mut scheduler = TurnScheduler::new(0.25, false);
        let mut player = Player::new(Position::origin());
        let mut enemies: Vec<Enemy> = Vec::new();

        scheduler.end_player_turn(&mut player, &mut enemies);
        scheduler.update(0.1, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);
        scheduler.update(0.1, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);
        scheduler.update(0.1, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);
        scheduler.update(0.1, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::PlayerPhase);
        assert_eq!(scheduler.turn_number(), 2);
        assert!(!player.budget().finished);
    }

    #[test]
    fn test_long_frame_ending_turn_does_not_settle() {
        let mut scheduler = TurnScheduler::new(0.25, false);
        let mut player = Player::new(Position::origin());
        let mut enemies: Vec<Enemy> = Vec::new();

        scheduler.end_player_turn(&mut player, &mut enemies);
        scheduler.update(0.3, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);
        assert_eq!(scheduler.enemy_phase_elapsed(), 0.0);

        scheduler.update(0.3, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::PlayerPhase);
    }

    #[test]
    fn test_active_enemy_resets_settle_timer() {
        let mut scheduler = TurnScheduler::new(0.15, false);
        let mut player = Player::new(Position::origin());
        let mut enemies = vec![Enemy::goblin(Position::from_tile(3, 3))];

        scheduler.end_player_turn(&mut player, &mut enemies);
        for _ in 0..10 {
            scheduler.update(0.1, &mut player, &mut enemies);
        }
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);

        enemies[0].actor.budget.finish();
        scheduler.update(0.1, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);
        scheduler.update(0.1, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::PlayerPhase);
    }

    #[test]
    fn test_auto_end_turn_waits_for_spent_budget() {
        let mut scheduler = TurnScheduler::new(0.25, true);
        let mut player = Player::new(Position::origin());
        let mut enemies: Vec<Enemy> = Vec::new();

        player.actor.budget.movement_points = 0;
        scheduler.update(0.016, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::PlayerPhase);

        player.actor.budget.action_points = 0;
        scheduler.update(0.016, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::EnemyPhase);
    }

    #[test]
    fn test_manual_mode_never_auto_ends() {
        let mut scheduler = TurnScheduler::new(0.25, false);
        let mut player = Player::new(Position::origin());
        let mut enemies: Vec<Enemy> = Vec::new();

        player.actor.budget.movement_points = 0;
        player.actor.budget.action_points = 0;
        scheduler.update(0.016, &mut player, &mut enemies);
        assert_eq!(scheduler.phase(), Phase::PlayerPhase);
    }

    #[test]
    fn test_enemy_pass_only_runs_in_enemy_phase() {
        let scheduler = TurnScheduler::default();
        let grid = SpatialGrid::walled_arena(10, 10);
        let mut enemies = vec![Enemy::goblin(Position::from_tile(3, 3))];
        enemies[0].start_turn();
        let mut rng = StdRng::seed_from_u64(1);

        let report = scheduler.run_enemy_pass(
            &EnemyAi::default(),
            &mut enemies,
            Position::from_tile(5, 5),
            &grid,
            &mut rng,
        );
        assert_eq!(report, EnemyPassReport::default());
        assert_eq!(enemies[0].budget().movement_points, 4);
    }

    #[test]
    fn test_enemies_do_not_stack() {
        let mut scheduler = TurnScheduler::default();
        let grid = SpatialGrid::walled_arena(12, 12);
        let mut player = Player::new(Position::from_tile(8, 2));
        let mut enemies = vec![
            Enemy::goblin(Position::from_tile(5, 2)),
            Enemy::goblin(Position::from_tile(4, 2)),
        ];
        let mut rng = StdRng::seed_from_u64(9);

        scheduler.end_player_turn(&mut player, &mut enemies);
        for _ in 0..20 {
            scheduler.run_enemy_pass(
                &EnemyAi::default(),
                &mut enemies,
                player.position(),
                &grid,
                &mut rng,
            );
            assert_ne!(enemies[0].position(), enemies[1].position());
        }
        assert!(enemies.iter().all(|enemy| enemy.budget().finished));
    }
}
