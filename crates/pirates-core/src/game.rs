//! Core game state machine.
//!
//! This module contains the main `GameState` struct and all game rules:
//! legality checking for joint actions, the transition function that applies
//! them, and the environment step (marine collisions, marine movement and
//! treasure spawning).

use crate::actions::{AtomicAction, GameEvent, JointAction};
use crate::board::Board;
use crate::config::{ConfigError, GameConfig};
use crate::grid::Coord;
use crate::pieces::{
    Marine, MarineName, PlayerId, Ship, ShipName, Treasure, TreasureLocation, TreasureName,
    PLAYERS, SHIP_CAPACITY,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::{debug, trace};

/// Points lost by a ship's owner each time it shares a tile with a marine
pub const MARINE_COLLISION_PENALTY: i64 = 1;

/// No treasure spawns while this many are in play
pub const MAX_TREASURES: usize = 10;

/// Chance that a treasure spawns during an environment step
pub const TREASURE_SPAWN_PROBABILITY: f64 = 0.3;

/// Rewards of spawned treasures
pub const TREASURE_REWARD_RANGE: RangeInclusive<u32> = 1..=9;

/// Spawned treasures take names `treasure_1` to `treasure_{N}`
const TREASURE_NAME_POOL: usize = 14;

/// Rule broken by an illegal joint action
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Violation {
    #[error("Expected one action for each of {expected} ships, got {found}")]
    WrongActionCount { expected: usize, found: usize },

    #[error("Ship {0} does not exist")]
    UnknownShip(ShipName),

    #[error("Ship {ship} does not belong to player {player}")]
    NotOwner { ship: ShipName, player: PlayerId },

    #[error("Ship {ship} cannot sail from {from} to {to}")]
    Unreachable {
        ship: ShipName,
        from: Coord,
        to: Coord,
    },

    #[error("Treasure {0} does not exist")]
    UnknownTreasure(TreasureName),

    #[error("Ship {ship} is not next to treasure {treasure}")]
    NotAdjacent {
        ship: ShipName,
        treasure: TreasureName,
    },

    #[error("Ship {0} has no free cargo slots")]
    HoldFull(ShipName),

    #[error("Ship {0} is not at base")]
    NotAtBase(ShipName),

    #[error("Ship {ship} is not carrying treasure {treasure}")]
    NotCarrier {
        ship: ShipName,
        treasure: TreasureName,
    },

    #[error("Ships {ship} and {target} are not on the same tile")]
    NotCoLocated { ship: ShipName, target: ShipName },

    #[error("Ship {0} is given more than one action")]
    DuplicateShip(ShipName),

    #[error("Treasure {0} is collected more than once")]
    DuplicateCollect(TreasureName),
}

/// Why a joint action was rejected, and which atomic action broke the rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IllegalAction {
    /// The offending atomic action, if a single one is to blame
    pub action: Option<AtomicAction>,
    pub violation: Violation,
}

impl IllegalAction {
    fn whole(violation: Violation) -> Self {
        Self {
            action: None,
            violation,
        }
    }

    fn at(action: &AtomicAction, violation: Violation) -> Self {
        Self {
            action: Some(action.clone()),
            violation,
        }
    }
}

impl fmt::Display for IllegalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "'{}': {}", action, self.violation),
            None => write!(f, "{}", self.violation),
        }
    }
}

impl std::error::Error for IllegalAction {}

/// Errors that can occur when applying or parsing actions
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Illegal action by player {player}: {reason}")]
    IllegalAction {
        player: PlayerId,
        reason: IllegalAction,
    },

    #[error("Unknown action kind '{0}'")]
    UnknownActionKind(String),

    #[error("Malformed action '{0}'")]
    MalformedAction(String),
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// The static map
    pub board: Board,
    /// All pirate ships, by name
    pub ships: BTreeMap<ShipName, Ship>,
    /// Treasures still in play, by name
    pub treasures: BTreeMap<TreasureName, Treasure>,
    /// Marine patrols, by name
    pub marines: BTreeMap<MarineName, Marine>,
    /// Decremented once per applied joint action, so twice per round. The
    /// driver's round count ends an episode, not this counter.
    pub turns_to_go: u32,
    /// Score of player 1 and player 2
    scores: [i64; 2],
}

impl GameState {
    /// Build the initial state, validating the configuration
    pub fn from_config(config: GameConfig) -> Result<Self, ConfigError> {
        let board = config.board()?;
        config.validate(&board)?;

        let ships = config
            .pirate_ships
            .into_iter()
            .map(|(name, ship)| {
                let state = Ship {
                    player: ship.player,
                    location: ship.location,
                    capacity: ship.capacity,
                };
                (name, state)
            })
            .collect();

        let treasures = config
            .treasures
            .into_iter()
            .map(|(name, t)| (name, Treasure::on_map(t.location, t.reward)))
            .collect();

        let marines = config
            .marine_ships
            .into_iter()
            .map(|(name, m)| (name, Marine::new(m.path, m.index)))
            .collect();

        Ok(Self {
            board,
            ships,
            treasures,
            marines,
            turns_to_go: config.turns_to_go,
            scores: [0; 2],
        })
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_config(GameConfig::from_json(json)?)
    }

    /// Read-only copy handed to agents
    pub fn snapshot(&self) -> GameState {
        self.clone()
    }

    /// Current score of a player
    pub fn score(&self, player: PlayerId) -> i64 {
        score_slot(player).map_or(0, |i| self.scores[i])
    }

    /// Scores of players 1 and 2
    pub fn scores(&self) -> [i64; 2] {
        self.scores
    }

    fn add_score(&mut self, player: PlayerId, delta: i64) {
        if let Some(i) = score_slot(player) {
            self.scores[i] += delta;
        }
    }

    /// Get a ship by name
    pub fn ship(&self, name: &str) -> Option<&Ship> {
        self.ships.get(name)
    }

    /// Get a treasure by name
    pub fn treasure(&self, name: &str) -> Option<&Treasure> {
        self.treasures.get(name)
    }

    /// Names of the ships a player owns, in name order
    pub fn ships_of(&self, player: PlayerId) -> Vec<&str> {
        self.ships
            .iter()
            .filter(|(_, ship)| ship.player == player)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Names of the treasures a ship is carrying
    pub fn cargo_of(&self, ship: &str) -> Vec<TreasureName> {
        self.treasures
            .iter()
            .filter(|(_, t)| t.location.is_carried_by(ship))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Tiles currently occupied by marines
    pub fn marine_positions(&self) -> HashSet<Coord> {
        self.marines.values().map(Marine::position).collect()
    }

    // ==================== Legality ====================

    /// Check a joint action without changing anything.
    ///
    /// Every rule must hold: one action per owned ship, each action valid on
    /// its own, and no two actions naming the same ship or collecting the
    /// same treasure.
    pub fn check_action(&self, action: &JointAction, player: PlayerId) -> Result<(), IllegalAction> {
        let owned = self.ships_of(player).len();
        if action.len() != owned {
            return Err(IllegalAction::whole(Violation::WrongActionCount {
                expected: owned,
                found: action.len(),
            }));
        }

        for atomic in action {
            self.check_atomic(atomic, player)
                .map_err(|violation| IllegalAction::at(atomic, violation))?;
        }

        let mut ships = HashSet::new();
        let mut collected = HashSet::new();
        for atomic in action {
            if !ships.insert(atomic.ship()) {
                return Err(IllegalAction::at(
                    atomic,
                    Violation::DuplicateShip(atomic.ship().to_string()),
                ));
            }
            if let AtomicAction::Collect { treasure, .. } = atomic {
                if !collected.insert(treasure.as_str()) {
                    return Err(IllegalAction::at(
                        atomic,
                        Violation::DuplicateCollect(treasure.clone()),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Boolean form of [`GameState::check_action`]
    pub fn is_legal(&self, action: &JointAction, player: PlayerId) -> bool {
        match self.check_action(action, player) {
            Ok(()) => true,
            Err(reason) => {
                debug!(player, %action, %reason, "rejected joint action");
                false
            }
        }
    }

    /// Check a single atomic action in isolation
    pub fn check_atomic(&self, action: &AtomicAction, player: PlayerId) -> Result<(), Violation> {
        let name = action.ship();
        let ship = self.owned_ship(name, player)?;

        match action {
            AtomicAction::Sail { to, .. } => {
                if !self.board.is_adjacent(ship.location, *to) {
                    return Err(Violation::Unreachable {
                        ship: name.to_string(),
                        from: ship.location,
                        to: *to,
                    });
                }
            }

            AtomicAction::Collect { treasure, .. } => {
                let t = self
                    .treasures
                    .get(treasure)
                    .ok_or_else(|| Violation::UnknownTreasure(treasure.clone()))?;
                if !self.board.neighbors_of(&t.location).contains(&ship.location) {
                    return Err(Violation::NotAdjacent {
                        ship: name.to_string(),
                        treasure: treasure.clone(),
                    });
                }
                if !ship.has_room() {
                    return Err(Violation::HoldFull(name.to_string()));
                }
            }

            AtomicAction::Deposit { treasure, .. } => {
                if ship.location != self.board.base() {
                    return Err(Violation::NotAtBase(name.to_string()));
                }
                let t = self
                    .treasures
                    .get(treasure)
                    .ok_or_else(|| Violation::UnknownTreasure(treasure.clone()))?;
                if !t.location.is_carried_by(name) {
                    return Err(Violation::NotCarrier {
                        ship: name.to_string(),
                        treasure: treasure.clone(),
                    });
                }
            }

            AtomicAction::Plunder { target, .. } => {
                let victim = self
                    .ships
                    .get(target)
                    .ok_or_else(|| Violation::UnknownShip(target.clone()))?;
                if victim.location != ship.location {
                    return Err(Violation::NotCoLocated {
                        ship: name.to_string(),
                        target: target.clone(),
                    });
                }
            }

            AtomicAction::Wait { .. } => {}
        }

        Ok(())
    }

    fn owned_ship(&self, name: &str, player: PlayerId) -> Result<&Ship, Violation> {
        let ship = self
            .ships
            .get(name)
            .ok_or_else(|| Violation::UnknownShip(name.to_string()))?;
        if ship.player != player {
            return Err(Violation::NotOwner {
                ship: name.to_string(),
                player,
            });
        }
        Ok(ship)
    }

    /// Every atomic action this ship could legally take on its own
    pub fn valid_atomic_actions(&self, name: &str) -> Vec<AtomicAction> {
        let mut actions = Vec::new();
        let ship = match self.ships.get(name) {
            Some(s) => s,
            None => return actions,
        };

        for to in self.board.neighbors(ship.location) {
            actions.push(AtomicAction::sail(name, to));
        }

        if ship.has_room() {
            for (treasure, t) in &self.treasures {
                if self.board.neighbors_of(&t.location).contains(&ship.location) {
                    actions.push(AtomicAction::collect(name, treasure.as_str()));
                }
            }
        }

        if ship.location == self.board.base() {
            for treasure in self.cargo_of(name) {
                actions.push(AtomicAction::deposit(name, treasure));
            }
        }

        for (other, victim) in &self.ships {
            if victim.location == ship.location && other != name {
                actions.push(AtomicAction::plunder(name, other.as_str()));
            }
        }

        actions.push(AtomicAction::wait(name));
        actions
    }

    // ==================== Transition ====================

    /// Apply a joint action for a player.
    ///
    /// The action is checked first; an illegal action leaves the state
    /// untouched. Atomic actions are applied in submission order, then the
    /// turn counter is decremented once.
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: &JointAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        if let Err(reason) = self.check_action(action, player) {
            debug!(player, %action, %reason, "refusing to apply illegal action");
            return Err(GameError::IllegalAction { player, reason });
        }

        let mut events = Vec::new();
        for atomic in action {
            events.extend(self.apply_atomic(player, atomic));
        }
        self.turns_to_go = self.turns_to_go.saturating_sub(1);

        Ok(events)
    }

    fn apply_atomic(&mut self, player: PlayerId, action: &AtomicAction) -> Option<GameEvent> {
        match action {
            AtomicAction::Sail { ship, to } => {
                let s = self.ships.get_mut(ship)?;
                let from = s.location;
                s.location = *to;
                Some(GameEvent::ShipSailed {
                    ship: ship.clone(),
                    from,
                    to: *to,
                })
            }

            AtomicAction::Collect { ship, treasure } => {
                let s = self.ships.get_mut(ship)?;
                s.capacity = s.capacity.saturating_sub(1);
                self.treasures.get_mut(treasure)?.location =
                    TreasureLocation::CarriedBy(ship.clone());
                Some(GameEvent::TreasureCollected {
                    ship: ship.clone(),
                    treasure: treasure.clone(),
                })
            }

            AtomicAction::Deposit { ship, treasure } => {
                // Gone if the carrier was plundered earlier in this joint action
                let t = self.treasures.remove(treasure)?;
                let s = self.ships.get_mut(ship)?;
                s.capacity = (s.capacity + 1).min(SHIP_CAPACITY);
                self.add_score(player, i64::from(t.reward));
                Some(GameEvent::TreasureDeposited {
                    player,
                    ship: ship.clone(),
                    treasure: treasure.clone(),
                    reward: t.reward,
                })
            }

            AtomicAction::Plunder { ship, target } => {
                let treasures_lost = self.sink_cargo(target);
                Some(GameEvent::ShipPlundered {
                    attacker: ship.clone(),
                    victim: target.clone(),
                    treasures_lost,
                })
            }

            AtomicAction::Wait { .. } => None,
        }
    }

    /// Destroy everything a ship carries and empty its hold
    fn sink_cargo(&mut self, ship: &str) -> Vec<TreasureName> {
        if let Some(s) = self.ships.get_mut(ship) {
            s.reset_capacity();
        }
        let lost = self.cargo_of(ship);
        for treasure in &lost {
            self.treasures.remove(treasure);
        }
        lost
    }

    // ==================== Environment ====================

    /// Penalize every ship sharing a tile with a marine.
    ///
    /// Each colliding ship loses its cargo, gets its hold reset and costs its
    /// owner [`MARINE_COLLISION_PENALTY`] points. Marines do not move.
    pub fn resolve_marine_collisions(&mut self) -> Vec<GameEvent> {
        let occupied = self.marine_positions();
        let caught: Vec<(ShipName, PlayerId)> = self
            .ships
            .iter()
            .filter(|(_, ship)| occupied.contains(&ship.location))
            .map(|(name, ship)| (name.clone(), ship.player))
            .collect();

        let mut events = Vec::with_capacity(caught.len());
        for (ship, player) in caught {
            let treasures_lost = self.sink_cargo(&ship);
            self.add_score(player, -MARINE_COLLISION_PENALTY);
            debug!(%ship, player, lost = treasures_lost.len(), "marine collision");
            events.push(GameEvent::MarineCollision {
                player,
                ship,
                penalty: MARINE_COLLISION_PENALTY,
                treasures_lost,
            });
        }
        events
    }

    /// Move every marine one random step along its path
    pub fn advance_marines<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for (name, marine) in &mut self.marines {
            let from = marine.position();
            marine.advance(rng);
            let to = marine.position();
            trace!(marine = %name, %from, %to, "marine moved");
            if from != to {
                events.push(GameEvent::MarineMoved {
                    marine: name.clone(),
                    from,
                    to,
                });
            }
        }
        events
    }

    /// Possibly place a new treasure on a random island.
    ///
    /// Nothing happens once [`MAX_TREASURES`] are in play; otherwise a
    /// treasure appears with probability [`TREASURE_SPAWN_PROBABILITY`].
    pub fn maybe_spawn_treasure<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<GameEvent> {
        if self.treasures.len() >= MAX_TREASURES {
            return None;
        }
        if !rng.gen_bool(TREASURE_SPAWN_PROBABILITY) {
            return None;
        }

        let free_names: Vec<TreasureName> = (1..=TREASURE_NAME_POOL)
            .map(|i| format!("treasure_{i}"))
            .filter(|name| !self.treasures.contains_key(name))
            .collect();
        let treasure = free_names.choose(rng)?.clone();
        let location = *self.board.island_tiles().choose(rng)?;
        let reward = rng.gen_range(TREASURE_REWARD_RANGE);

        debug!(%treasure, %location, reward, "treasure spawned");
        self.treasures
            .insert(treasure.clone(), Treasure::on_map(location, reward));
        Some(GameEvent::TreasureSpawned {
            treasure,
            location,
            reward,
        })
    }

    /// Run the end-of-round environment step: collisions, then marine
    /// movement, then a possible treasure spawn.
    pub fn environment_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        let mut events = self.resolve_marine_collisions();
        events.extend(self.advance_marines(rng));
        events.extend(self.maybe_spawn_treasure(rng));
        events
    }
}

fn score_slot(player: PlayerId) -> Option<usize> {
    PLAYERS.iter().position(|p| *p == player)
}
