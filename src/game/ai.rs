//! # Enemy AI
//!
//! Per-enemy movement decisions during the enemy phase.
//!
//! Enemies only ever react to where they last *saw* the player. A sighting
//! uses the box range test against the enemy's own visibility stat. With the
//! player in view the enemy steps toward them; once it stands on the last
//! sighting with the player out of view it wanders in a random cardinal
//! direction; otherwise it idles. Idling still costs a movement point so an
//! enemy can never stall the phase.

use crate::game::{BlockReason, Character, Direction, Enemy, Position, SpatialGrid};
use pathfinding::prelude::astar;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How an enemy chooses its step toward the last sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChaseStrategy {
    /// Single-axis step along the larger offset, ties going to the X axis
    #[default]
    Greedy,
    /// First step of an A* path over walkable tiles, falling back to greedy
    AStar,
}

/// What an enemy wants to do with one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Step(Direction),
    Idle,
}

/// Result of giving one enemy one opportunity to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyStep {
    /// The enemy moved one tile and spent a movement point
    Moved { from: Position, to: Position },
    /// The enemy stayed put and spent a movement point
    Idled,
    /// The chosen tile was illegal; nothing was spent
    Rejected(BlockReason),
    /// The enemy has no turn left to take
    Finished,
}

/// Greedy single-axis direction from `from` toward `to`.
///
/// Returns None when the positions are equal.
///
/// # Examples
///
/// ```
/// use kiikku::{greedy_direction, Direction, Position};
///
/// let from = Position::from_tile(5, 5);
/// assert_eq!(greedy_direction(from, Position::from_tile(8, 6)), Some(Direction::East));
/// assert_eq!(greedy_direction(from, Position::from_tile(4, 1)), Some(Direction::North));
/// // Ties prefer the X axis
/// assert_eq!(greedy_direction(from, Position::from_tile(3, 3)), Some(Direction::West));
/// ```
pub fn greedy_direction(from: Position, to: Position) -> Option<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        return None;
    }
    if dx.abs() >= dy.abs() {
        Direction::from_delta(dx.signum(), 0)
    } else {
        Direction::from_delta(0, dy.signum())
    }
}

/// Decision and validation rules shared by every enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAi {
    pub strategy: ChaseStrategy,
    /// Consecutive rejected steps before an enemy gives up its turn
    pub max_blocked_attempts: u8,
}

impl Default for EnemyAi {
    fn default() -> Self {
        Self::new(ChaseStrategy::Greedy, crate::config::MAX_BLOCKED_ATTEMPTS)
    }
}

impl EnemyAi {
    pub fn new(strategy: ChaseStrategy, max_blocked_attempts: u8) -> Self {
        Self {
            strategy,
            max_blocked_attempts: max_blocked_attempts.max(1),
        }
    }

    /// Updates the enemy's knowledge of the player and picks an intent.
    pub fn decide<R: Rng>(
        &self,
        enemy: &mut Enemy,
        player_position: Position,
        grid: &SpatialGrid,
        rng: &mut R,
    ) -> Intent {
        if enemy.can_see(player_position) {
            enemy.last_known_player_position = player_position;
            let target = enemy.last_known_player_position;
            let direction = match self.strategy {
                ChaseStrategy::Greedy => greedy_direction(enemy.position(), target),
                ChaseStrategy::AStar => path_direction(enemy, target, grid)
                    .or_else(|| greedy_direction(enemy.position(), target)),
            };
            return direction.map_or(Intent::Idle, Intent::Step);
        }

        if enemy.position() == enemy.last_known_player_position {
            let direction = Direction::CARDINAL[rng.gen_range(0..Direction::CARDINAL.len())];
            return Intent::Step(direction);
        }

        Intent::Idle
    }

    /// Gives one enemy one opportunity to act.
    ///
    /// `occupied` holds the positions of every other character; stepping
    /// onto any of them, or onto the player, is rejected.
    pub fn act<R: Rng>(
        &self,
        enemy: &mut Enemy,
        player_position: Position,
        grid: &SpatialGrid,
        occupied: &HashSet<Position>,
        rng: &mut R,
    ) -> EnemyStep {
        if enemy.budget().finished {
            return EnemyStep::Finished;
        }
        if enemy.budget().movement_points == 0 {
            enemy.actor.budget.finish();
            return EnemyStep::Finished;
        }

        let step = match self.decide(enemy, player_position, grid, rng) {
            Intent::Idle => {
                enemy.actor.budget.spend_movement();
                EnemyStep::Idled
            }
            Intent::Step(direction) => {
                let from = enemy.position();
                let to = from.step(direction);
                let verdict = grid.check_walkable(to).and_then(|()| {
                    if to == player_position || occupied.contains(&to) {
                        Err(BlockReason::Occupied)
                    } else {
                        Ok(())
                    }
                });

                match verdict {
                    Ok(()) => {
                        enemy.actor.position = to;
                        enemy.actor.budget.spend_movement();
                        enemy.blocked_attempts = 0;
                        EnemyStep::Moved { from, to }
                    }
                    Err(reason) => {
                        enemy.blocked_attempts = enemy.blocked_attempts.saturating_add(1);
                        log::debug!(
                            "Enemy {} step {:?} rejected: {:?} (attempt {})",
                            enemy.id,
                            direction,
                            reason,
                            enemy.blocked_attempts
                        );
                        if enemy.blocked_attempts >= self.max_blocked_attempts {
                            enemy.actor.budget.finish();
                        }
                        EnemyStep::Rejected(reason)
                    }
                }
            }
        };

        if enemy.budget().movement_points == 0 {
            enemy.actor.budget.finish();
        }
        step
    }
}

/// First step of a shortest walkable path to `target`.
///
/// The search never leaves a square twice the enemy's sight radius, so an
/// unreachable target cannot flood the whole level.
fn path_direction(enemy: &Enemy, target: Position, grid: &SpatialGrid) -> Option<Direction> {
    let start = enemy.position();
    let bound = enemy.stats().visibility.saturating_mul(2);

    let (path, _cost) = astar(
        &start,
        |&position| {
            Direction::CARDINAL
                .iter()
                .map(move |&direction| position.step(direction))
                .filter(|&next| {
                    start.within_box(next, bound) && (next == target || grid.is_walkable(next))
                })
                .map(|next| (next, 1u32))
                .collect::<Vec<_>>()
        },
        |&position| {
            let delta = target - position;
            ((delta.x.abs() + delta.y.abs()) / crate::config::TILE_SIZE) as u32
        },
        |&position| position == target,
    )?;

    let next = *path.get(1)?;
    let delta = next - start;
    Direction::from_delta(
        delta.x / crate::config::TILE_SIZE,
        delta.y / crate::config::TILE_SIZE,
    )
}
