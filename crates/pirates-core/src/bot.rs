//! Agents that decide what a player does each turn.
//!
//! This module provides:
//! - The `Agent` trait the match driver talks to
//! - `SampleBot`: a simple heuristic player that banks treasure whenever it
//!   can and otherwise moves at random

use crate::actions::{AtomicAction, JointAction};
use crate::game::GameState;
use crate::pieces::PlayerId;
use rand::prelude::*;
use std::collections::HashSet;
use thiserror::Error;

/// How many random joint actions `SampleBot` draws before giving up and
/// waiting with every ship
const MAX_ATTEMPTS: usize = 64;

/// Errors an agent can report instead of choosing an action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("Agent failed: {0}")]
    Failed(String),
}

/// Something that can play one side of a game
pub trait Agent {
    /// Display name used in logs and reports
    fn name(&self) -> &str;

    /// Choose a joint action for `player` given a read-only view of the game.
    ///
    /// An error forfeits the episode, just like an illegal action.
    fn act(&mut self, state: &GameState, player: PlayerId) -> Result<JointAction, AgentError>;
}

/// A bot that deposits and collects when possible and otherwise picks a
/// random legal move for each ship
#[derive(Debug)]
pub struct SampleBot {
    name: String,
    rng: StdRng,
}

impl SampleBot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Candidate actions for each of the player's ships.
    ///
    /// A treasure offered for collection to one ship is not offered to the
    /// ships after it, and plunder only targets enemy ships.
    fn candidates(state: &GameState, player: PlayerId) -> Vec<Vec<AtomicAction>> {
        let mut claimed: HashSet<String> = HashSet::new();

        state
            .ships_of(player)
            .into_iter()
            .map(|ship| {
                let options: Vec<AtomicAction> = state
                    .valid_atomic_actions(ship)
                    .into_iter()
                    .filter(|action| match action {
                        AtomicAction::Collect { treasure, .. } => !claimed.contains(treasure),
                        AtomicAction::Plunder { target, .. } => state
                            .ship(target)
                            .is_some_and(|victim| victim.player != player),
                        _ => true,
                    })
                    .collect();

                for action in &options {
                    if let AtomicAction::Collect { treasure, .. } = action {
                        claimed.insert(treasure.clone());
                    }
                }
                options
            })
            .collect()
    }

    fn pick(&mut self, options: &[AtomicAction]) -> Option<AtomicAction> {
        let preferred = options
            .iter()
            .find(|a| matches!(a, AtomicAction::Deposit { .. }))
            .or_else(|| {
                options
                    .iter()
                    .find(|a| matches!(a, AtomicAction::Collect { .. }))
            });

        match preferred {
            Some(action) => Some(action.clone()),
            None => options.choose(&mut self.rng).cloned(),
        }
    }
}

impl Agent for SampleBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn act(&mut self, state: &GameState, player: PlayerId) -> Result<JointAction, AgentError> {
        let candidates = Self::candidates(state, player);

        for _ in 0..MAX_ATTEMPTS {
            let action: JointAction = candidates
                .iter()
                .filter_map(|options| self.pick(options))
                .collect();
            if state.is_legal(&action, player) {
                return Ok(action);
            }
        }

        Ok(JointAction::wait_all(state.ships_of(player)))
    }
}
