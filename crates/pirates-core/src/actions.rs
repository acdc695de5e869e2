//! Actions that players can take.
//!
//! This module defines the atomic actions a single ship can perform, the
//! joint action a player submits each turn (one atomic action per owned
//! ship), and the events that result from applying actions and from the
//! environment step.

use crate::game::GameError;
use crate::grid::Coord;
use crate::pieces::{MarineName, PlayerId, ShipName, TreasureName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action verbs, shared by the text and JSON forms
pub const VERBS: [&str; 5] = ["sail", "collect", "deposit", "plunder", "wait"];

/// Everything a single ship can do in one turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtomicAction {
    /// Move to an adjacent navigable tile
    Sail { ship: ShipName, to: Coord },
    /// Pick up a treasure from an adjacent island
    Collect {
        ship: ShipName,
        treasure: TreasureName,
    },
    /// Unload a carried treasure at base
    Deposit {
        ship: ShipName,
        treasure: TreasureName,
    },
    /// Sink the cargo of a ship on the same tile
    Plunder { ship: ShipName, target: ShipName },
    /// Do nothing
    Wait { ship: ShipName },
}

impl AtomicAction {
    /// The ship performing the action
    pub fn ship(&self) -> &str {
        match self {
            AtomicAction::Sail { ship, .. }
            | AtomicAction::Collect { ship, .. }
            | AtomicAction::Deposit { ship, .. }
            | AtomicAction::Plunder { ship, .. }
            | AtomicAction::Wait { ship } => ship,
        }
    }

    /// The verb used in the text form
    pub fn verb(&self) -> &'static str {
        match self {
            AtomicAction::Sail { .. } => "sail",
            AtomicAction::Collect { .. } => "collect",
            AtomicAction::Deposit { .. } => "deposit",
            AtomicAction::Plunder { .. } => "plunder",
            AtomicAction::Wait { .. } => "wait",
        }
    }

    /// Build a sail action
    pub fn sail(ship: impl Into<ShipName>, to: Coord) -> Self {
        AtomicAction::Sail {
            ship: ship.into(),
            to,
        }
    }

    /// Build a collect action
    pub fn collect(ship: impl Into<ShipName>, treasure: impl Into<TreasureName>) -> Self {
        AtomicAction::Collect {
            ship: ship.into(),
            treasure: treasure.into(),
        }
    }

    /// Build a deposit action
    pub fn deposit(ship: impl Into<ShipName>, treasure: impl Into<TreasureName>) -> Self {
        AtomicAction::Deposit {
            ship: ship.into(),
            treasure: treasure.into(),
        }
    }

    /// Build a plunder action
    pub fn plunder(ship: impl Into<ShipName>, target: impl Into<ShipName>) -> Self {
        AtomicAction::Plunder {
            ship: ship.into(),
            target: target.into(),
        }
    }

    /// Build a wait action
    pub fn wait(ship: impl Into<ShipName>) -> Self {
        AtomicAction::Wait { ship: ship.into() }
    }

    /// Parse the JSON form, e.g. `{"kind": "wait", "ship": "ship_1"}`.
    ///
    /// Plain serde deserialization reports an unknown `kind` as a generic
    /// data error; this maps it to [`GameError::UnknownActionKind`].
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|_| GameError::MalformedAction(json.trim().to_string()))?;
        Self::try_from(value)
    }
}

impl TryFrom<serde_json::Value> for AtomicAction {
    type Error = GameError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        if let Some(kind) = value.get("kind").and_then(serde_json::Value::as_str) {
            if !VERBS.contains(&kind) {
                return Err(GameError::UnknownActionKind(kind.to_string()));
            }
        }
        let text = value.to_string();
        serde_json::from_value(value).map_err(|_| GameError::MalformedAction(text))
    }
}

impl fmt::Display for AtomicAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicAction::Sail { ship, to } => write!(f, "sail {} {},{}", ship, to.row, to.col),
            AtomicAction::Collect { ship, treasure } => write!(f, "collect {ship} {treasure}"),
            AtomicAction::Deposit { ship, treasure } => write!(f, "deposit {ship} {treasure}"),
            AtomicAction::Plunder { ship, target } => write!(f, "plunder {ship} {target}"),
            AtomicAction::Wait { ship } => write!(f, "wait {ship}"),
        }
    }
}

impl FromStr for AtomicAction {
    type Err = GameError;

    /// Parse the text form, e.g. `sail ship_1 2,1` or `wait ship_2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let malformed = || GameError::MalformedAction(s.trim().to_string());

        let (verb, rest) = parts.split_first().ok_or_else(malformed)?;
        match (*verb, rest) {
            ("sail", [ship, to]) => {
                let to = to.parse::<Coord>().map_err(|_| malformed())?;
                Ok(AtomicAction::sail(*ship, to))
            }
            ("collect", [ship, treasure]) => Ok(AtomicAction::collect(*ship, *treasure)),
            ("deposit", [ship, treasure]) => Ok(AtomicAction::deposit(*ship, *treasure)),
            ("plunder", [ship, target]) => Ok(AtomicAction::plunder(*ship, *target)),
            ("wait", [ship]) => Ok(AtomicAction::wait(*ship)),
            ("sail" | "collect" | "deposit" | "plunder" | "wait", _) => Err(malformed()),
            (other, _) => Err(GameError::UnknownActionKind(other.to_string())),
        }
    }
}

/// One atomic action per ship owned by the acting player, applied as a unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointAction(Vec<AtomicAction>);

impl JointAction {
    /// Create a joint action from its atomic parts
    pub fn new(actions: Vec<AtomicAction>) -> Self {
        Self(actions)
    }

    /// Every ship waits
    pub fn wait_all<I, S>(ships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ShipName>,
    {
        ships.into_iter().map(|ship| AtomicAction::wait(ship)).collect()
    }

    /// Number of atomic actions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no atomic actions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the atomic actions in submission order
    pub fn iter(&self) -> std::slice::Iter<'_, AtomicAction> {
        self.0.iter()
    }

    /// The atomic actions in submission order
    pub fn actions(&self) -> &[AtomicAction] {
        &self.0
    }

    /// Parse the JSON form: an array of atomic actions
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)
            .map_err(|_| GameError::MalformedAction(json.trim().to_string()))?;
        values.into_iter().map(AtomicAction::try_from).collect()
    }
}

impl FromIterator<AtomicAction> for JointAction {
    fn from_iter<T: IntoIterator<Item = AtomicAction>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a JointAction {
    type Item = &'a AtomicAction;
    type IntoIter = std::slice::Iter<'a, AtomicAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for JointAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl FromStr for JointAction {
    type Err = GameError;

    /// Parse atomic actions separated by `;`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<AtomicAction>)
            .collect()
    }
}

/// Events that occur as a result of actions and environment steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A ship moved
    ShipSailed {
        ship: ShipName,
        from: Coord,
        to: Coord,
    },

    /// A treasure was loaded onto a ship
    TreasureCollected {
        ship: ShipName,
        treasure: TreasureName,
    },

    /// A treasure was unloaded at base and scored
    TreasureDeposited {
        player: PlayerId,
        ship: ShipName,
        treasure: TreasureName,
        reward: u32,
    },

    /// A ship's cargo was destroyed by another ship
    ShipPlundered {
        attacker: ShipName,
        victim: ShipName,
        treasures_lost: Vec<TreasureName>,
    },

    /// A ship ran into a marine patrol
    MarineCollision {
        player: PlayerId,
        ship: ShipName,
        penalty: i64,
        treasures_lost: Vec<TreasureName>,
    },

    /// A marine moved along its path
    MarineMoved {
        marine: MarineName,
        from: Coord,
        to: Coord,
    },

    /// A new treasure appeared on an island
    TreasureSpawned {
        treasure: TreasureName,
        location: Coord,
        reward: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_verb() {
        assert_eq!(
            "sail ship_1 2,1".parse::<AtomicAction>().unwrap(),
            AtomicAction::sail("ship_1", Coord::new(2, 1))
        );
        assert_eq!(
            "collect ship_1 treasure_1".parse::<AtomicAction>().unwrap(),
            AtomicAction::collect("ship_1", "treasure_1")
        );
        assert_eq!(
            "deposit ship_2 treasure_3".parse::<AtomicAction>().unwrap(),
            AtomicAction::deposit("ship_2", "treasure_3")
        );
        assert_eq!(
            "plunder ship_1 ship_3".parse::<AtomicAction>().unwrap(),
            AtomicAction::plunder("ship_1", "ship_3")
        );
        assert_eq!(
            "  wait ship_4 ".parse::<AtomicAction>().unwrap(),
            AtomicAction::wait("ship_4")
        );
    }

    #[test]
    fn test_unknown_verb_fails_fast() {
        let err = "teleport ship_1 0,0".parse::<AtomicAction>().unwrap_err();
        assert!(matches!(err, GameError::UnknownActionKind(ref verb) if verb == "teleport"));
    }

    #[test]
    fn test_malformed_arguments() {
        assert!(matches!(
            "sail ship_1".parse::<AtomicAction>(),
            Err(GameError::MalformedAction(_))
        ));
        assert!(matches!(
            "sail ship_1 north".parse::<AtomicAction>(),
            Err(GameError::MalformedAction(_))
        ));
        assert!(matches!(
            "wait".parse::<AtomicAction>(),
            Err(GameError::MalformedAction(_))
        ));
        assert!(matches!(
            "".parse::<AtomicAction>(),
            Err(GameError::MalformedAction(_))
        ));
    }

    #[test]
    fn test_joint_action_text_form() {
        let joint: JointAction = "collect ship_1 treasure_1; sail ship_2 1,0"
            .parse()
            .unwrap();
        assert_eq!(joint.len(), 2);
        assert_eq!(joint.actions()[0].ship(), "ship_1");
        assert_eq!(joint.actions()[1].verb(), "sail");
        assert_eq!(
            joint.to_string(),
            "collect ship_1 treasure_1; sail ship_2 1,0"
        );
    }

    #[test]
    fn test_joint_action_json_form() {
        let joint = JointAction::new(vec![AtomicAction::wait("ship_1")]);
        let json = serde_json::to_string(&joint).unwrap();
        assert_eq!(json, r#"[{"kind":"wait","ship":"ship_1"}]"#);
    }

    #[test]
    fn test_json_unknown_kind_fails_fast() {
        let err = AtomicAction::from_json(r#"{"kind": "teleport", "ship": "ship_1"}"#).unwrap_err();
        assert!(matches!(err, GameError::UnknownActionKind(ref verb) if verb == "teleport"));

        let err = JointAction::from_json(r#"[{"kind": "wait", "ship": "a"}, {"kind": "fly"}]"#)
            .unwrap_err();
        assert!(matches!(err, GameError::UnknownActionKind(ref verb) if verb == "fly"));
    }

    #[test]
    fn test_json_malformed_action() {
        assert!(matches!(
            AtomicAction::from_json(r#"{"kind": "sail", "ship": "ship_1"}"#),
            Err(GameError::MalformedAction(_))
        ));
        assert!(matches!(
            AtomicAction::from_json(r#"{"ship": "ship_1"}"#),
            Err(GameError::MalformedAction(_))
        ));
        assert!(matches!(
            JointAction::from_json("not json"),
            Err(GameError::MalformedAction(_))
        ));
    }

    #[test]
    fn test_json_known_kinds_parse() {
        assert_eq!(
            AtomicAction::from_json(r#"{"kind": "sail", "ship": "ship_1", "to": [2, 1]}"#).unwrap(),
            AtomicAction::sail("ship_1", Coord::new(2, 1))
        );
        let joint = JointAction::from_json(
            r#"[{"kind": "collect", "ship": "a", "treasure": "t"}, {"kind": "wait", "ship": "b"}]"#,
        )
        .unwrap();
        assert_eq!(
            joint,
            JointAction::new(vec![AtomicAction::collect("a", "t"), AtomicAction::wait("b")])
        );
    }

    #[test]
    fn test_wait_all() {
        let joint = JointAction::wait_all(["a", "b"]);
        assert_eq!(
            joint,
            JointAction::new(vec![AtomicAction::wait("a"), AtomicAction::wait("b")])
        );
    }
}
