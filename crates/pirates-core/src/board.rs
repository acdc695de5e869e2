//! Static map representation and topology.
//!
//! This module contains:
//! - Tile kinds (sea, island, base)
//! - The immutable map grid and the base location
//! - Neighbor queries used for sailing and treasure adjacency

use crate::config::ConfigError;
use crate::grid::{Coord, Direction};
use crate::pieces::TreasureLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of a map tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TileKind {
    /// Open water, ships may sail here
    Sea,
    /// Impassable land; the only place an uncollected treasure can rest
    Island,
    /// Home port where treasures are deposited
    Base,
}

impl TileKind {
    /// Single-letter map code
    pub fn code(&self) -> &'static str {
        match self {
            TileKind::Sea => "S",
            TileKind::Island => "I",
            TileKind::Base => "B",
        }
    }

    /// Whether a ship may occupy this tile
    pub fn is_navigable(&self) -> bool {
        !matches!(self, TileKind::Island)
    }
}

impl FromStr for TileKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(TileKind::Sea),
            "I" => Ok(TileKind::Island),
            "B" => Ok(TileKind::Base),
            other => Err(ConfigError::UnknownTile(other.to_string())),
        }
    }
}

impl TryFrom<String> for TileKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TileKind> for String {
    fn from(kind: TileKind) -> Self {
        kind.code().to_string()
    }
}

/// The game map.
///
/// The grid never changes after construction, so every query here is a pure
/// function of the tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Tiles in row-major order
    tiles: Vec<Vec<TileKind>>,
    /// Where treasures are deposited
    base: Coord,
}

impl Board {
    /// Create a board, checking that the grid is rectangular and the base
    /// lies on a Base tile.
    pub fn new(tiles: Vec<Vec<TileKind>>, base: Coord) -> Result<Self, ConfigError> {
        let cols = tiles.first().map(Vec::len).unwrap_or(0);
        if tiles.is_empty() || cols == 0 {
            return Err(ConfigError::EmptyMap);
        }
        if let Some(row) = tiles.iter().position(|row| row.len() != cols) {
            return Err(ConfigError::RaggedMap {
                row,
                expected: cols,
                found: tiles[row].len(),
            });
        }

        let board = Self { tiles, base };
        match board.tile(base) {
            None => Err(ConfigError::OffMap {
                entity: "base".to_string(),
                at: base,
            }),
            Some(TileKind::Base) => Ok(board),
            Some(_) => Err(ConfigError::BaseNotOnBaseTile(base)),
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.tiles.first().map(Vec::len).unwrap_or(0)
    }

    /// The base tile
    pub fn base(&self) -> Coord {
        self.base
    }

    /// Check if a coordinate lies on the map
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows() && coord.col < self.cols()
    }

    /// Get the tile at a coordinate
    pub fn tile(&self, coord: Coord) -> Option<TileKind> {
        self.tiles.get(coord.row)?.get(coord.col).copied()
    }

    /// Check if a coordinate is an island tile
    pub fn is_island(&self, coord: Coord) -> bool {
        self.tile(coord) == Some(TileKind::Island)
    }

    /// All island tiles, in row-major order
    pub fn island_tiles(&self) -> Vec<Coord> {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(row, tiles)| {
                tiles
                    .iter()
                    .enumerate()
                    .filter(|(_, kind)| **kind == TileKind::Island)
                    .map(move |(col, _)| Coord::new(row, col))
            })
            .collect()
    }

    /// Orthogonally adjacent tiles a ship could occupy.
    ///
    /// Out-of-bounds and island tiles are excluded, so the result holds at
    /// most four coordinates.
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        Direction::ALL
            .iter()
            .filter_map(|dir| coord.step(*dir))
            .filter(|next| self.tile(*next).is_some_and(|kind| kind.is_navigable()))
            .collect()
    }

    /// Neighbors of a treasure location.
    ///
    /// A carried treasure has no spatial neighbors.
    pub fn neighbors_of(&self, location: &TreasureLocation) -> Vec<Coord> {
        match location {
            TreasureLocation::OnMap(coord) => self.neighbors(*coord),
            TreasureLocation::CarriedBy(_) => Vec::new(),
        }
    }

    /// Check if two tiles are adjacent in the navigation sense
    pub fn is_adjacent(&self, from: Coord, to: Coord) -> bool {
        self.neighbors(from).contains(&to)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.tiles {
            let line: Vec<&str> = row.iter().map(TileKind::code).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
