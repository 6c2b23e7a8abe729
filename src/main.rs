//! # Kiikku Main Entry Point
//!
//! Parses the command line, merges it over the settings file, initializes
//! logging and hands control to the scene manager.

use clap::Parser;
use kiikku::{ChaseStrategy, GenerationConfig, KiikkuResult, SceneManager, SessionConfig, Settings};
use macroquad::prelude::*;
use std::path::PathBuf;

/// Command line arguments for Kiikku.
#[derive(Parser, Debug)]
#[command(name = "kiikku")]
#[command(about = "A turn-based roguelike on a noise-generated cave grid")]
#[command(version)]
struct Args {
    /// Window width in pixels (overrides the settings file)
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels (overrides the settings file)
    #[arg(long)]
    height: Option<u32>,

    /// Turn music on or off (overrides the settings file)
    #[arg(long)]
    music: Option<bool>,

    /// Enable debug keys and readouts
    #[arg(long)]
    debug: bool,

    /// Random seed for level generation; defaults to the wall clock
    #[arg(short, long)]
    seed: Option<u64>,

    /// End the turn automatically once movement and actions are spent
    #[arg(long)]
    auto_end_turn: bool,

    /// Enemies chase along A* paths instead of greedy steps
    #[arg(long)]
    astar: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Settings file
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
}

impl Args {
    fn merged_settings(&self) -> Settings {
        let mut settings = Settings::load(&self.settings);
        if let Some(width) = self.width {
            settings.resolution.width = width;
        }
        if let Some(height) = self.height {
            settings.resolution.height = height;
        }
        if let Some(music) = self.music {
            settings.music = music;
        }
        settings
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            auto_end_turn: self.auto_end_turn,
            chase_strategy: if self.astar {
                ChaseStrategy::AStar
            } else {
                ChaseStrategy::Greedy
            },
            debug: self.debug,
            ..SessionConfig::default()
        }
    }
}

#[macroquad::main("Kiikku")]
async fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    log::info!("Starting Kiikku v{}", kiikku::VERSION);
    if let Err(e) = run(&args).await {
        log::error!("Fatal error: {e}");
    }
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .is_err()
        {
            eprintln!("Logging already initialized");
        }
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        let result = env_logger::Builder::new()
            .parse_filters(log_level)
            .format_timestamp_millis()
            .try_init();
        if result.is_err() {
            eprintln!("Logging already initialized");
        }
    }
}

async fn run(args: &Args) -> KiikkuResult<()> {
    let settings = args.merged_settings();
    log::info!(
        "Window {}x{}, music {}",
        settings.resolution.width,
        settings.resolution.height,
        if settings.music { "on" } else { "off" }
    );
    request_new_screen_size(
        settings.resolution.width as f32,
        settings.resolution.height as f32,
    );
    next_frame().await;

    let session = args.session_config();
    session.validate()?;
    let generation = GenerationConfig::default();
    generation.validate()?;

    let mut scenes = SceneManager::new(generation, session, args.seed);
    scenes.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        Settings::new().save(&path).unwrap();

        let args = Args::parse_from([
            "kiikku",
            "--width",
            "1024",
            "--music",
            "false",
            "--settings",
            path.to_str().unwrap(),
        ]);
        let settings = args.merged_settings();
        assert_eq!(settings.resolution.width, 1024);
        assert_eq!(settings.resolution.height, 600);
        assert!(!settings.music);
    }

    #[test]
    fn test_session_flags() {
        let args = Args::parse_from(["kiikku", "--debug", "--astar", "--seed", "9"]);
        let session = args.session_config();
        assert!(session.debug);
        assert_eq!(session.chase_strategy, ChaseStrategy::AStar);
        assert!(!session.auto_end_turn);
        assert_eq!(args.seed, Some(9));
    }
}
