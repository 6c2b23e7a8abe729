//! # Scene Management System
//!
//! Application views around the simulation: loading, main menu, pause and
//! the game itself. The game state lives only while a game is running; it is
//! created on entering the loading view and dropped on return to the menu.

use crate::generation::utils::seed_from_clock;
use crate::{
    render_main_menu, render_pause_menu, Frame, GameState, GenerationConfig, InputHandler,
    KiikkuResult, MacroquadDisplay, SessionConfig,
};
use macroquad::prelude::*;

/// The current application view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// A level is being generated
    Loading,
    MainMenu,
    Paused,
    InGame,
}

/// View-level requests decoded from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    StartGame,
    /// Generation finished and the game is ready
    Loaded,
    Pause,
    Resume,
    QuitToMenu,
    Exit,
}

impl View {
    /// Applies a view event. Events that make no sense in the current view
    /// leave it unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::{View, ViewEvent};
    ///
    /// assert_eq!(View::MainMenu.next(ViewEvent::StartGame), View::Loading);
    /// assert_eq!(View::InGame.next(ViewEvent::Pause), View::Paused);
    /// assert_eq!(View::InGame.next(ViewEvent::StartGame), View::InGame);
    /// ```
    pub fn next(self, event: ViewEvent) -> View {
        match (self, event) {
            (View::MainMenu, ViewEvent::StartGame) => View::Loading,
            (View::Loading, ViewEvent::Loaded) => View::InGame,
            (View::InGame, ViewEvent::Pause) => View::Paused,
            (View::Paused, ViewEvent::Resume) => View::InGame,
            (View::Paused, ViewEvent::QuitToMenu) => View::MainMenu,
            (view, _) => view,
        }
    }
}

/// Polls the keys that drive view changes.
fn poll_view_event(view: View, input_handler: &InputHandler) -> Option<ViewEvent> {
    match view {
        View::MainMenu if is_key_pressed(KeyCode::Enter) => Some(ViewEvent::StartGame),
        View::MainMenu if is_key_pressed(KeyCode::Escape) => Some(ViewEvent::Exit),
        View::InGame if input_handler.pause_requested() => Some(ViewEvent::Pause),
        View::Paused if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::P) => {
            Some(ViewEvent::Resume)
        }
        View::Paused if is_key_pressed(KeyCode::Q) => Some(ViewEvent::QuitToMenu),
        _ => None,
    }
}

/// The main scene manager that coordinates all views
pub struct SceneManager {
    view: View,
    game_state: Option<GameState>,
    last_frame: Option<Frame>,
    display: MacroquadDisplay,
    input_handler: InputHandler,
    generation: GenerationConfig,
    session: SessionConfig,
    fixed_seed: Option<u64>,
    pending_seed: u64,
}

impl SceneManager {
    /// Creates a scene manager starting at the main menu.
    ///
    /// With a fixed seed every new game uses that seed; otherwise each game
    /// seeds from the wall clock.
    pub fn new(generation: GenerationConfig, session: SessionConfig, fixed_seed: Option<u64>) -> Self {
        Self {
            view: View::MainMenu,
            game_state: None,
            last_frame: None,
            display: MacroquadDisplay::new(),
            input_handler: InputHandler::new(session.debug),
            generation,
            session,
            fixed_seed,
            pending_seed: 0,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Runs the main scene loop until the player exits from the main menu.
    pub async fn run(&mut self) -> KiikkuResult<()> {
        loop {
            if let Some(event) = poll_view_event(self.view, &self.input_handler) {
                if event == ViewEvent::Exit {
                    log::info!("Exit requested from main menu");
                    break;
                }
                self.handle_event(event);
            }

            match self.view {
                View::MainMenu => render_main_menu(),
                View::Loading => {
                    // Show the loading screen for one frame before blocking
                    self.display.render_loading(self.pending_seed);
                    next_frame().await;
                    self.load_game()?;
                    continue;
                }
                View::InGame => self.update_in_game(),
                View::Paused => {
                    if let Some(frame) = &self.last_frame {
                        self.display.render_frame(frame);
                    }
                    render_pause_menu();
                }
            }
            next_frame().await;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: ViewEvent) {
        let next = self.view.next(event);
        if next == self.view {
            return;
        }
        log::debug!("View {:?} -> {:?}", self.view, next);

        match next {
            View::Loading => {
                self.pending_seed = self.fixed_seed.unwrap_or_else(seed_from_clock);
            }
            View::MainMenu => {
                self.game_state = None;
                self.last_frame = None;
            }
            View::Paused | View::InGame => {}
        }
        self.view = next;
    }

    fn load_game(&mut self) -> KiikkuResult<()> {
        let generation = GenerationConfig {
            seed: self.pending_seed,
            ..self.generation.clone()
        };
        log::info!("Starting new game with seed {}", generation.seed);
        self.game_state = Some(GameState::new_game(&generation, self.session.clone())?);
        self.handle_event(ViewEvent::Loaded);
        Ok(())
    }

    fn update_in_game(&mut self) {
        let Some(game_state) = self.game_state.as_mut() else {
            log::warn!("In-game view without a game; returning to menu");
            self.view = View::MainMenu;
            return;
        };
        let input = self.input_handler.poll_frame();
        let frame = game_state.tick(&input);
        self.display.render_frame(&frame);
        self.last_frame = Some(frame);
    }
}
