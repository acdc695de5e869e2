//! Initial game configuration.
//!
//! A configuration describes the map, the base, the starting ships,
//! treasures and marine patrols, and how many turns the game lasts. It is
//! usually loaded from JSON:
//!
//! ```json
//! {
//!   "map": [["B", "S", "I"], ["S", "S", "S"]],
//!   "base": [0, 0],
//!   "pirate_ships": {
//!     "ship_1": { "location": [0, 0], "capacity": 2, "player": 1 },
//!     "ship_2": { "location": [0, 0], "capacity": 2, "player": 2 }
//!   },
//!   "treasures": { "treasure_1": { "location": [0, 2], "reward": 4 } },
//!   "marine_ships": { "marine_1": { "index": 0, "path": [[1, 0], [1, 1]] } },
//!   "turns_to_go": 100
//! }
//! ```
//!
//! Every structural requirement is checked when a `GameState` is built from
//! the configuration, never later during play.

use crate::board::{Board, TileKind};
use crate::grid::Coord;
use crate::pieces::{MarineName, PlayerId, ShipName, TreasureName, PLAYERS, SHIP_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors found while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Map has no tiles")]
    EmptyMap,

    #[error("Map row {row} has {found} tiles, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown tile code '{0}'")]
    UnknownTile(String),

    #[error("Base {0} is not on a base tile")]
    BaseNotOnBaseTile(Coord),

    #[error("{entity} is off the map at {at}")]
    OffMap { entity: String, at: Coord },

    #[error("Ship {ship} belongs to unknown player {player}")]
    UnknownPlayer { ship: ShipName, player: PlayerId },

    #[error("Player {0} has no ships")]
    NoShips(PlayerId),

    #[error("Ship {ship} has capacity {capacity}, maximum is {max}", max = SHIP_CAPACITY)]
    CapacityTooLarge { ship: ShipName, capacity: u8 },

    #[error("Ship {ship} starts on an island at {at}")]
    ShipOnIsland { ship: ShipName, at: Coord },

    #[error("Treasure {treasure} is not on an island at {at}")]
    TreasureNotOnIsland { treasure: TreasureName, at: Coord },

    #[error("Treasure {0} has no reward")]
    ZeroReward(TreasureName),

    #[error("Marine {0} has an empty patrol path")]
    EmptyPatrol(MarineName),

    #[error("Marine {marine} starts at index {index} of a {len}-tile path")]
    PatrolIndexOutOfRange {
        marine: MarineName,
        index: usize,
        len: usize,
    },
}

fn full_capacity() -> u8 {
    SHIP_CAPACITY
}

/// Starting state of a pirate ship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipConfig {
    pub location: Coord,
    #[serde(default = "full_capacity")]
    pub capacity: u8,
    pub player: PlayerId,
}

/// Starting state of a treasure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureConfig {
    pub location: Coord,
    pub reward: u32,
}

/// Patrol of a marine ship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarineConfig {
    #[serde(default)]
    pub index: usize,
    pub path: Vec<Coord>,
}

/// Complete initial configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Tile grid, row by row
    pub map: Vec<Vec<TileKind>>,
    /// Deposit location
    pub base: Coord,
    pub pirate_ships: BTreeMap<ShipName, ShipConfig>,
    #[serde(default)]
    pub treasures: BTreeMap<TreasureName, TreasureConfig>,
    #[serde(default)]
    pub marine_ships: BTreeMap<MarineName, MarineConfig>,
    /// Number of rounds the game lasts
    #[serde(alias = "turns to go")]
    pub turns_to_go: u32,
}

impl GameConfig {
    /// Parse a configuration from JSON.
    ///
    /// Only the shape is checked here; see [`GameConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the board described by this configuration
    pub fn board(&self) -> Result<Board, ConfigError> {
        Board::new(self.map.clone(), self.base)
    }

    /// Check every structural requirement against the board
    pub fn validate(&self, board: &Board) -> Result<(), ConfigError> {
        for (name, ship) in &self.pirate_ships {
            if !PLAYERS.contains(&ship.player) {
                return Err(ConfigError::UnknownPlayer {
                    ship: name.clone(),
                    player: ship.player,
                });
            }
            if ship.capacity > SHIP_CAPACITY {
                return Err(ConfigError::CapacityTooLarge {
                    ship: name.clone(),
                    capacity: ship.capacity,
                });
            }
            match board.tile(ship.location) {
                None => {
                    return Err(ConfigError::OffMap {
                        entity: format!("Ship {name}"),
                        at: ship.location,
                    })
                }
                Some(TileKind::Island) => {
                    return Err(ConfigError::ShipOnIsland {
                        ship: name.clone(),
                        at: ship.location,
                    })
                }
                Some(_) => {}
            }
        }

        for player in PLAYERS {
            if !self.pirate_ships.values().any(|s| s.player == player) {
                return Err(ConfigError::NoShips(player));
            }
        }

        for (name, treasure) in &self.treasures {
            if !board.is_island(treasure.location) {
                return Err(ConfigError::TreasureNotOnIsland {
                    treasure: name.clone(),
                    at: treasure.location,
                });
            }
            if treasure.reward == 0 {
                return Err(ConfigError::ZeroReward(name.clone()));
            }
        }

        for (name, marine) in &self.marine_ships {
            if marine.path.is_empty() {
                return Err(ConfigError::EmptyPatrol(name.clone()));
            }
            if marine.index >= marine.path.len() {
                return Err(ConfigError::PatrolIndexOutOfRange {
                    marine: name.clone(),
                    index: marine.index,
                    len: marine.path.len(),
                });
            }
            if let Some(at) = marine.path.iter().find(|c| !board.in_bounds(**c)) {
                return Err(ConfigError::OffMap {
                    entity: format!("Marine {name}"),
                    at: *at,
                });
            }
        }

        Ok(())
    }
}
