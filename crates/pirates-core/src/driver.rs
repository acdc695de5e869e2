//! Match harness.
//!
//! Runs two agents against each other on one initial configuration: each
//! round both players act in turn, then the environment step runs. An agent
//! that is too slow, reports an error or submits an illegal action forfeits
//! the episode and is charged a penalty.

use crate::bot::Agent;
use crate::game::GameState;
use crate::pieces::{PlayerId, PLAYERS};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Points charged to an agent that forfeits an episode
pub const FORFEIT_PENALTY: i64 = 10_000;

/// Time an agent may spend choosing one joint action
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub action_timeout: Duration,
    pub forfeit_penalty: i64,
    /// Rounds per episode; defaults to the configuration's `turns_to_go`
    pub rounds: Option<u32>,
    /// Play a second episode with the agents' seats swapped
    pub swap_sides: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            action_timeout: ACTION_TIMEOUT,
            forfeit_penalty: FORFEIT_PENALTY,
            rounds: None,
            swap_sides: true,
        }
    }
}

/// Why an agent forfeited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForfeitReason {
    /// The agent took longer than the action timeout
    Timeout { elapsed_ms: u64 },
    /// The agent reported an error instead of an action
    AgentError { message: String },
    /// The agent submitted an illegal joint action
    IllegalAction { action: String, reason: String },
}

/// How an episode ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    /// All rounds were played
    Completed,
    /// A player forfeited and the episode stopped early
    Forfeited {
        player: PlayerId,
        reason: ForfeitReason,
    },
}

/// Result of one episode, indexed by player (1 then 2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// Agent name in each seat
    pub agents: [String; 2],
    pub rounds_played: u32,
    /// Engine scores when the episode stopped
    pub scores: [i64; 2],
    /// Forfeit penalties charged
    pub penalties: [i64; 2],
    pub outcome: EpisodeOutcome,
}

impl EpisodeReport {
    /// Points each seat earns from this episode.
    ///
    /// A forfeited episode only counts its penalties.
    pub fn points(&self) -> [i64; 2] {
        match self.outcome {
            EpisodeOutcome::Completed => [
                self.scores[0] + self.penalties[0],
                self.scores[1] + self.penalties[1],
            ],
            EpisodeOutcome::Forfeited { .. } => self.penalties,
        }
    }
}

/// Result of a full match, totals indexed by agent in the order passed to
/// [`Match::play`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub episodes: Vec<EpisodeReport>,
    pub totals: [i64; 2],
}

/// Runs agents against each other from a fixed initial state
pub struct Match<R: Rng> {
    initial: GameState,
    settings: MatchSettings,
    rng: R,
}

impl<R: Rng> Match<R> {
    /// Create a match. `rng` drives the environment step.
    pub fn new(initial: GameState, settings: MatchSettings, rng: R) -> Self {
        Self {
            initial,
            settings,
            rng,
        }
    }

    /// Play one episode. `seats[0]` plays as player 1, `seats[1]` as player 2.
    pub fn play_episode(&mut self, mut seats: [&mut dyn Agent; 2]) -> EpisodeReport {
        let rounds = self.settings.rounds.unwrap_or(self.initial.turns_to_go);
        let agents = [seats[0].name().to_string(), seats[1].name().to_string()];
        let mut state = self.initial.clone();
        let mut penalties = [0i64; 2];

        info!(player_1 = %agents[0], player_2 = %agents[1], rounds, "starting episode");

        for round in 0..rounds {
            for (seat, player) in PLAYERS.into_iter().enumerate() {
                let started = Instant::now();
                let decision = seats[seat].act(&state.snapshot(), player);
                let elapsed = started.elapsed();

                let forfeit = if elapsed > self.settings.action_timeout {
                    Some(ForfeitReason::Timeout {
                        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    })
                } else {
                    match decision {
                        Err(err) => Some(ForfeitReason::AgentError {
                            message: err.to_string(),
                        }),
                        Ok(action) => match state.apply_action(player, &action) {
                            Ok(events) => {
                                debug!(round, player, %action, events = events.len(), "applied action");
                                None
                            }
                            Err(err) => Some(ForfeitReason::IllegalAction {
                                action: action.to_string(),
                                reason: err.to_string(),
                            }),
                        },
                    }
                };

                if let Some(reason) = forfeit {
                    warn!(agent = %agents[seat], player, round, ?reason, "agent forfeits episode");
                    penalties[seat] -= self.settings.forfeit_penalty;
                    return EpisodeReport {
                        agents,
                        rounds_played: round,
                        scores: state.scores(),
                        penalties,
                        outcome: EpisodeOutcome::Forfeited { player, reason },
                    };
                }
            }

            let events = state.environment_step(&mut self.rng);
            debug!(round, events = events.len(), "environment step");
        }

        let scores = state.scores();
        info!(score_1 = scores[0], score_2 = scores[1], "episode complete");
        EpisodeReport {
            agents,
            rounds_played: rounds,
            scores,
            penalties,
            outcome: EpisodeOutcome::Completed,
        }
    }

    /// Play a full match: `first` starts as player 1, and when seats are
    /// swapped a second episode puts `second` in that seat.
    pub fn play(&mut self, first: &mut dyn Agent, second: &mut dyn Agent) -> MatchReport {
        let mut episodes = Vec::new();
        let mut totals = [0i64; 2];

        let report = self.play_episode([&mut *first, &mut *second]);
        let points = report.points();
        totals[0] += points[0];
        totals[1] += points[1];
        episodes.push(report);

        if self.settings.swap_sides {
            let report = self.play_episode([&mut *second, &mut *first]);
            let points = report.points();
            totals[0] += points[1];
            totals[1] += points[0];
            episodes.push(report);
        }

        info!(first = totals[0], second = totals[1], "match complete");
        MatchReport { episodes, totals }
    }
}
