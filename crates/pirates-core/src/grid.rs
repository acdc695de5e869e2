//! Square-grid coordinate system.
//!
//! This module provides the coordinate type shared by the map, ships,
//! treasures and marine patrol paths:
//! - `Coord`: a (row, col) position on the map
//! - `Direction`: the four orthogonal steps a ship can take
//!
//! Rows grow downwards and columns grow to the right, matching the order in
//! which the map rows are written in a configuration file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the four orthogonal directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row 0
    North,
    /// Towards the last row
    South,
    /// Towards the last column
    East,
    /// Towards column 0
    West,
}

impl Direction {
    /// All directions, in the order neighbors are reported
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
    ];
}

/// A tile position on the map.
///
/// Serialized as a `[row, col]` pair so configuration files stay compact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Create a new coordinate
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step one tile in a direction.
    ///
    /// Returns `None` when the step would leave the range of `usize`. The
    /// map bounds are narrower, so callers still need to check them.
    pub fn step(&self, direction: Direction) -> Option<Coord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Coord::new(row, self.col)),
            Direction::South => self.row.checked_add(1).map(|row| Coord::new(row, self.col)),
            Direction::East => self.col.checked_add(1).map(|col| Coord::new(self.row, col)),
            Direction::West => self.col.checked_sub(1).map(|col| Coord::new(self.row, col)),
        }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Coord::new(row, col)
    }
}

impl From<Coord> for (usize, usize) {
    fn from(coord: Coord) -> Self {
        (coord.row, coord.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Error returned when a `row,col` string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid coordinate '{0}', expected <row>,<col>")]
pub struct ParseCoordError(pub String);

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (row, col) = trimmed
            .split_once(',')
            .ok_or_else(|| ParseCoordError(s.to_string()))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| ParseCoordError(s.to_string()))?;
        let col = col
            .trim()
            .parse()
            .map_err(|_| ParseCoordError(s.to_string()))?;
        Ok(Coord::new(row, col))
    }
}
