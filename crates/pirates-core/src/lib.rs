//! Pirates - a two-player treasure-hunting grid game engine
//!
//! This crate provides the core game logic, including:
//! - Square-grid coordinates and the static tile map
//! - Pirate ships, treasures and marine patrols
//! - Legality checking and application of joint actions
//! - The stochastic environment step (marine patrols, treasure spawns)
//!
//! # Architecture
//!
//! `GameState` owns the whole world and is mutated by one caller at a time.
//! A round is: player 1 acts, player 2 acts, then the environment step runs.
//! Every random choice takes an injected `rand::Rng`, so seeded or mock
//! generators give reproducible games.
//!
//! # Modules
//!
//! - [`grid`]: Coordinates on the square grid
//! - [`board`]: Tile map and neighbor queries
//! - [`pieces`]: Ships, treasures and marines
//! - [`actions`]: Atomic and joint actions, and the events they produce
//! - [`config`]: Initial configuration and its validation
//! - [`game`]: Game state machine
//! - [`bot`]: Agent interface and a sample heuristic agent
//! - [`driver`]: Match harness that runs agents against each other

pub mod actions;
pub mod board;
pub mod bot;
pub mod config;
pub mod driver;
pub mod game;
pub mod grid;
pub mod pieces;

// Re-export commonly used types
pub use actions::{AtomicAction, GameEvent, JointAction};
pub use board::{Board, TileKind};
pub use bot::{Agent, AgentError, SampleBot};
pub use config::{ConfigError, GameConfig, MarineConfig, ShipConfig, TreasureConfig};
pub use driver::{EpisodeOutcome, EpisodeReport, ForfeitReason, Match, MatchReport, MatchSettings};
pub use game::{GameError, GameState, IllegalAction, Violation};
pub use grid::{Coord, Direction};
pub use pieces::{
    InvalidPatrol, Marine, PlayerId, Ship, Treasure, TreasureLocation, PLAYERS, SHIP_CAPACITY,
};
