//! # Encounter Generation
//!
//! Chooses the player's start among spawn-eligible tiles and places a goblin
//! on each remaining tile with a fixed probability.

use crate::game::{Enemy, Position};
use crate::{GenerationConfig, Generator, KiikkuError, KiikkuResult, SpawnSelection};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

/// Player start and initial enemy roster.
#[derive(Debug, Clone)]
pub struct Encounters {
    pub player_spawn: Position,
    pub enemies: Vec<Enemy>,
}

/// Picks the index of the player's start tile.
///
/// Returns None when there are no candidates.
pub fn choose_player_spawn<R: Rng>(
    candidates: &[Position],
    selection: SpawnSelection,
    override_chance: f64,
    rng: &mut R,
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    match selection {
        SpawnSelection::Uniform => Some(rng.gen_range(0..candidates.len())),
        SpawnSelection::LateBiased => {
            let mut chosen = 0;
            for index in 1..candidates.len() {
                if rng.gen_bool(override_chance) {
                    chosen = index;
                }
            }
            Some(chosen)
        }
    }
}

/// Places a goblin on each candidate except the player's tile, each with
/// probability `spawn_rate`.
pub fn place_enemies<R: Rng>(
    candidates: &[Position],
    player_spawn: Position,
    spawn_rate: f64,
    rng: &mut R,
) -> Vec<Enemy> {
    candidates
        .iter()
        .filter(|&&position| position != player_spawn)
        .filter(|_| rng.gen_bool(spawn_rate))
        .map(|&position| Enemy::goblin(position))
        .collect()
}

/// Encounter placement over a fixed set of spawn tiles.
pub struct EncounterGenerator<'a> {
    spawn_points: &'a [Position],
}

impl<'a> EncounterGenerator<'a> {
    pub fn new(spawn_points: &'a [Position]) -> Self {
        Self { spawn_points }
    }
}

impl Generator<Encounters> for EncounterGenerator<'_> {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> KiikkuResult<Encounters> {
        let Some(index) = choose_player_spawn(
            self.spawn_points,
            config.spawn_selection,
            config.player_override_chance,
            rng,
        ) else {
            log::warn!("Level has no spawn tiles; player starts at the origin with no enemies");
            return Ok(Encounters {
                player_spawn: Position::origin(),
                enemies: Vec::new(),
            });
        };

        let player_spawn = self.spawn_points[index];
        let enemies = place_enemies(self.spawn_points, player_spawn, config.enemy_spawn_rate, rng);
        Ok(Encounters {
            player_spawn,
            enemies,
        })
    }

    fn validate(&self, content: &Encounters, _config: &GenerationConfig) -> KiikkuResult<()> {
        let mut seen = HashSet::new();
        for enemy in &content.enemies {
            let position = enemy.actor.position;
            if position == content.player_spawn {
                return Err(KiikkuError::InvalidState(format!(
                    "enemy placed on the player's start {position:?}"
                )));
            }
            if !seen.insert(position) {
                return Err(KiikkuError::InvalidState(format!(
                    "two enemies placed on {position:?}"
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}
