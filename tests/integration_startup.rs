//! Integration test to ensure a session can start and run without errors.

use kiikku::{
    Character, Command, Direction, FrameInput, GameState, GenerationConfig, KiikkuResult, Phase,
    Player, Position, SessionConfig, SpatialGrid, TileKind, TurnBudget,
};
use proptest::prelude::*;

#[test]
fn test_basic_startup() -> KiikkuResult<()> {
    let grid = SpatialGrid::walled_arena(12, 12);
    let mut state = GameState::with_actors(
        grid,
        Position::from_tile(5, 5),
        Vec::new(),
        SessionConfig::default(),
        12345,
    )?;

    assert_eq!(state.phase(), Phase::PlayerPhase);
    assert_eq!(state.scheduler().turn_number(), 1);
    assert_eq!(
        state.grid.get(state.player.position()).map(|tile| tile.kind),
        Some(TileKind::FloorStone)
    );

    let frame = state.tick(&FrameInput::idle(1.0 / 60.0));
    assert_eq!(frame.draw_list.player.position, Position::from_tile(5, 5));
    assert!(frame.draw_list.enemies.is_empty());
    assert!(!frame.draw_list.tiles.is_empty());
    assert!(frame.debug.is_none());
    Ok(())
}

#[test]
fn test_debug_session_reports_readouts() -> KiikkuResult<()> {
    let config = GenerationConfig::for_testing(99);
    let mut state = GameState::new_game(&config, SessionConfig::debug())?;

    let frame = state.tick(&FrameInput::with_commands(
        vec![Command::ToggleDebugOverlay],
        1.0 / 60.0,
    ));
    let debug = frame.debug.expect("debug readout present");
    assert_eq!(debug.enemy_count, state.enemies.len());
    assert_eq!(debug.player_visibility, state.player.stats().visibility);
    Ok(())
}

#[test]
fn test_player_walks_and_hud_follows() -> KiikkuResult<()> {
    let mut state = GameState::with_actors(
        SpatialGrid::walled_arena(12, 12),
        Position::from_tile(5, 5),
        Vec::new(),
        SessionConfig::default(),
        1,
    )?;
    let frame = state.tick(&FrameInput::with_commands(
        vec![Command::Step(Direction::East), Command::Step(Direction::East)],
        1.0 / 60.0,
    ));

    assert_eq!(state.player.position(), Position::from_tile(7, 5));
    assert_eq!(
        frame.hud.movement_remaining,
        state.player.stats().movement - 2
    );
    assert_eq!(frame.camera.target, state.player.position());
    Ok(())
}

#[test]
fn test_player_can_be_created() {
    let player = Player::new(Position::from_tile(5, 5));
    assert_eq!(player.position(), Position::from_tile(5, 5));
    assert!(!player.budget().finished);
    assert_eq!(player.stats().movement, 6);
}

proptest! {
    #[test]
    fn prop_budget_never_underflows(
        movement in 0u8..10,
        actions in 0u8..5,
        spends in proptest::collection::vec(any::<bool>(), 0..40),
    ) {
        let mut budget = TurnBudget::fresh(movement, actions);
        let mut moved = 0u8;
        let mut acted = 0u8;
        for spend_movement in spends {
            if spend_movement {
                moved += u8::from(budget.spend_movement());
            } else {
                acted += u8::from(budget.spend_action());
            }
        }
        prop_assert!(moved <= movement);
        prop_assert!(acted <= actions);
        prop_assert_eq!(budget.movement_points, movement - moved);
        prop_assert_eq!(budget.action_points, actions - acted);
    }
}
