//! Scripted replays.
//!
//! A script holds one joint action per line in the text form accepted by
//! `JointAction::from_str`. Lines alternate between player 1 and player 2,
//! and the environment step runs after every player 2 line. Blank lines and
//! lines starting with `#` are skipped.

use pirates_core::{GameError, GameEvent, GameState, JointAction, PLAYERS};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Line {line}: {source}")]
    Parse { line: usize, source: GameError },

    #[error("Line {line}: {source}")]
    Rejected { line: usize, source: GameError },
}

/// One scripted joint action and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedTurn {
    pub line: usize,
    pub action: JointAction,
}

/// Parse a replay script
pub fn parse_script(text: &str) -> Result<Vec<ScriptedTurn>, ReplayError> {
    text.lines()
        .enumerate()
        .map(|(i, raw)| (i + 1, raw.trim()))
        .filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
        .map(|(line, raw)| {
            raw.parse()
                .map(|action| ScriptedTurn { line, action })
                .map_err(|source| ReplayError::Parse { line, source })
        })
        .collect()
}

/// Play scripted turns against a state, returning every event produced.
///
/// Stops at the first rejected action; the state keeps everything applied
/// before it.
pub fn run<R: Rng>(
    state: &mut GameState,
    turns: &[ScriptedTurn],
    rng: &mut R,
) -> Result<Vec<GameEvent>, ReplayError> {
    let mut events = Vec::new();

    for (i, turn) in turns.iter().enumerate() {
        let player = PLAYERS[i % PLAYERS.len()];
        let applied = state
            .apply_action(player, &turn.action)
            .map_err(|source| ReplayError::Rejected {
                line: turn.line,
                source,
            })?;
        debug!(line = turn.line, player, action = %turn.action, "replayed");
        events.extend(applied);

        if player == PLAYERS[PLAYERS.len() - 1] {
            events.extend(state.environment_step(rng));
        }
    }

    Ok(events)
}
