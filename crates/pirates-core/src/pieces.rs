//! Pieces on the map: pirate ships, treasures and marine patrols.
//!
//! This module contains:
//! - Ship state (owner, position, free cargo slots)
//! - Treasure state, whose location is either a tile or a carrying ship
//! - Marine patrols and their random walk along a fixed path

use crate::grid::Coord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Player identifier (1 or 2)
pub type PlayerId = u8;

/// Both players, in turn order
pub const PLAYERS: [PlayerId; 2] = [1, 2];

/// Cargo slots on an empty ship
pub const SHIP_CAPACITY: u8 = 2;

/// Ships are identified by name
pub type ShipName = String;

/// Treasures are identified by name
pub type TreasureName = String;

/// Marines are identified by name
pub type MarineName = String;

/// A pirate ship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// Owning player
    pub player: PlayerId,
    /// Current tile
    pub location: Coord,
    /// Free cargo slots, always in `0..=SHIP_CAPACITY`
    pub capacity: u8,
}

impl Ship {
    /// Create an empty ship at a location
    pub fn new(player: PlayerId, location: Coord) -> Self {
        Self {
            player,
            location,
            capacity: SHIP_CAPACITY,
        }
    }

    /// Whether the ship can take on another treasure
    pub fn has_room(&self) -> bool {
        self.capacity > 0
    }

    /// Empty the hold back to full capacity.
    ///
    /// This resets rather than increments, so a ship loses track of whatever
    /// it was carrying.
    pub fn reset_capacity(&mut self) {
        self.capacity = SHIP_CAPACITY;
    }
}

/// Where a treasure currently is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreasureLocation {
    /// Resting on an island tile, waiting to be collected
    OnMap(Coord),
    /// Loaded on a ship and not yet deposited
    CarriedBy(ShipName),
}

impl TreasureLocation {
    /// The tile, if the treasure has not been collected
    pub fn coord(&self) -> Option<Coord> {
        match self {
            TreasureLocation::OnMap(coord) => Some(*coord),
            TreasureLocation::CarriedBy(_) => None,
        }
    }

    /// Whether this ship is the carrier
    pub fn is_carried_by(&self, ship: &str) -> bool {
        matches!(self, TreasureLocation::CarriedBy(carrier) if carrier == ship)
    }
}

impl fmt::Display for TreasureLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreasureLocation::OnMap(coord) => write!(f, "{coord}"),
            TreasureLocation::CarriedBy(ship) => write!(f, "aboard {ship}"),
        }
    }
}

/// A treasure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasure {
    /// Current location
    pub location: TreasureLocation,
    /// Points scored when deposited at base
    pub reward: u32,
}

impl Treasure {
    /// Create a treasure resting on a tile
    pub fn on_map(location: Coord, reward: u32) -> Self {
        Self {
            location: TreasureLocation::OnMap(location),
            reward,
        }
    }
}

/// A marine patrol walking back and forth along a fixed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatrolRecord")]
pub struct Marine {
    path: Vec<Coord>,
    index: usize,
}

/// Error returned when a deserialized marine's index does not fit its path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Patrol index {index} is outside a {len}-tile path")]
pub struct InvalidPatrol {
    pub index: usize,
    pub len: usize,
}

/// Unchecked wire form of a marine
#[derive(Deserialize)]
struct PatrolRecord {
    path: Vec<Coord>,
    index: usize,
}

impl TryFrom<PatrolRecord> for Marine {
    type Error = InvalidPatrol;

    fn try_from(record: PatrolRecord) -> Result<Self, Self::Error> {
        if record.index >= record.path.len() {
            return Err(InvalidPatrol {
                index: record.index,
                len: record.path.len(),
            });
        }
        Ok(Marine::new(record.path, record.index))
    }
}

impl Marine {
    /// Create a marine. The caller guarantees `path` is non-empty and
    /// `index < path.len()`; configuration loading checks this.
    pub(crate) fn new(path: Vec<Coord>, index: usize) -> Self {
        debug_assert!(index < path.len());
        Self { path, index }
    }

    /// The patrol path
    pub fn path(&self) -> &[Coord] {
        &self.path
    }

    /// Current position along the path
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current tile
    pub fn position(&self) -> Coord {
        self.path[self.index]
    }

    /// A marine with a single-tile path never moves
    pub fn is_stationary(&self) -> bool {
        self.path.len() == 1
    }

    /// Path indices the marine may occupy after its next move
    pub fn next_indices(&self) -> Vec<usize> {
        let last = self.path.len() - 1;
        match self.index {
            _ if last == 0 => vec![0],
            0 => vec![0, 1],
            i if i == last => vec![last - 1, last],
            i => vec![i - 1, i, i + 1],
        }
    }

    /// Move one step of an unbiased random walk on the path indices.
    ///
    /// Returns the new index.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        if !self.is_stationary() {
            let options = self.next_indices();
            self.index = options[rng.gen_range(0..options.len())];
        }
        self.index
    }
}
