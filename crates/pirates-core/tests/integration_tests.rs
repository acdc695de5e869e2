//! Integration tests for the pirates game engine.
//!
//! These tests drive complete turns through the public API on the standard
//! 7x7 scenario: collecting and banking treasure, plunder, marine patrols and
//! full rounds with the environment step.

use pirates_core::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

const SCENARIO: &str = r#"{
    "map": [
        ["S", "S", "I", "S", "S", "S", "S"],
        ["S", "S", "I", "S", "S", "S", "S"],
        ["B", "S", "S", "S", "S", "S", "S"],
        ["S", "S", "I", "S", "S", "I", "S"],
        ["S", "S", "I", "S", "S", "I", "S"],
        ["S", "S", "S", "S", "S", "I", "S"],
        ["S", "S", "S", "S", "S", "I", "I"]
    ],
    "base": [2, 0],
    "pirate_ships": {
        "pirate_ship_1": { "location": [2, 0], "capacity": 2, "player": 1 },
        "pirate_ship_2": { "location": [2, 0], "capacity": 2, "player": 1 },
        "pirate_ship_3": { "location": [2, 0], "capacity": 2, "player": 2 },
        "pirate_ship_4": { "location": [2, 0], "capacity": 2, "player": 2 }
    },
    "treasures": {
        "treasure_1": { "location": [0, 2], "reward": 4 }
    },
    "marine_ships": {
        "marine_1": { "index": 0, "path": [[0, 1], [1, 1], [2, 1], [2, 2], [2, 3], [2, 4]] },
        "marine_2": { "index": 0, "path": [[2, 5], [2, 4], [3, 4], [4, 4]] }
    },
    "turns to go": 200
}"#;

fn new_game() -> GameState {
    GameState::from_json(SCENARIO).unwrap()
}

fn joint(actions: &[&str]) -> JointAction {
    actions.iter().map(|a| a.parse().unwrap()).collect()
}

/// Place both of player 1's ships next to treasure_1, at (0, 1) and (0, 3)
fn ships_beside_treasure() -> GameState {
    let mut game = new_game();
    game.ships.get_mut("pirate_ship_1").unwrap().location = Coord::new(0, 1);
    game.ships.get_mut("pirate_ship_2").unwrap().location = Coord::new(0, 3);
    game
}

#[test]
fn test_initial_state() {
    let game = new_game();
    assert_eq!(game.board.rows(), 7);
    assert_eq!(game.board.cols(), 7);
    assert_eq!(game.board.base(), Coord::new(2, 0));
    assert_eq!(game.ships.len(), 4);
    assert_eq!(game.ships_of(1), vec!["pirate_ship_1", "pirate_ship_2"]);
    assert_eq!(game.turns_to_go, 200);
    assert_eq!(game.scores(), [0, 0]);
    assert_eq!(
        game.treasure("treasure_1").unwrap().location,
        TreasureLocation::OnMap(Coord::new(0, 2))
    );
}

#[test]
fn test_collect_sail_deposit() {
    let mut game = ships_beside_treasure();

    game.apply_action(
        1,
        &joint(&["collect pirate_ship_1 treasure_1", "wait pirate_ship_2"]),
    )
    .unwrap();
    assert_eq!(game.ship("pirate_ship_1").unwrap().capacity, 1);
    assert_eq!(
        game.treasure("treasure_1").unwrap().location,
        TreasureLocation::CarriedBy("pirate_ship_1".into())
    );

    // (0, 1) -> (1, 1) -> (1, 0) -> (2, 0)
    for step in ["1,1", "1,0", "2,0"] {
        let sail = format!("sail pirate_ship_1 {step}");
        game.apply_action(1, &joint(&[sail.as_str(), "wait pirate_ship_2"]))
            .unwrap();
        assert_eq!(
            game.treasure("treasure_1").unwrap().location,
            TreasureLocation::CarriedBy("pirate_ship_1".into())
        );
    }

    let events = game
        .apply_action(
            1,
            &joint(&["deposit pirate_ship_1 treasure_1", "wait pirate_ship_2"]),
        )
        .unwrap();
    assert_eq!(
        events,
        vec![GameEvent::TreasureDeposited {
            player: 1,
            ship: "pirate_ship_1".into(),
            treasure: "treasure_1".into(),
            reward: 4,
        }]
    );
    assert_eq!(game.score(1), 4);
    assert_eq!(game.score(2), 0);
    assert!(game.treasure("treasure_1").is_none());
    assert_eq!(game.ship("pirate_ship_1").unwrap().capacity, SHIP_CAPACITY);
    assert_eq!(game.turns_to_go, 195);
}

#[test]
fn test_mutex_violations_do_not_mutate() {
    let mut game = ships_beside_treasure();
    let before = game.clone();

    let same_treasure = joint(&[
        "collect pirate_ship_1 treasure_1",
        "collect pirate_ship_2 treasure_1",
    ]);
    let err = game.apply_action(1, &same_treasure).unwrap_err();
    assert!(matches!(
        err,
        GameError::IllegalAction {
            reason: IllegalAction {
                violation: Violation::DuplicateCollect(_),
                ..
            },
            ..
        }
    ));
    assert_eq!(game, before);

    let same_ship = joint(&["wait pirate_ship_1", "sail pirate_ship_1 1,1"]);
    assert!(!game.is_legal(&same_ship, 1));
    assert!(game.apply_action(1, &same_ship).is_err());
    assert_eq!(game, before);
}

#[test]
fn test_is_legal_is_pure() {
    let game = ships_beside_treasure();
    let before = game.clone();
    let action = joint(&["collect pirate_ship_1 treasure_1", "sail pirate_ship_2 1,3"]);

    let first = game.check_action(&action, 1);
    let second = game.check_action(&action, 1);
    assert_eq!(first, second);
    assert!(first.is_ok());
    assert_eq!(game, before);

    let bad = joint(&["wait pirate_ship_3", "wait pirate_ship_4"]);
    assert_eq!(game.is_legal(&bad, 1), game.is_legal(&bad, 1));
    assert_eq!(game, before);
}

#[test]
fn test_plunder_destroys_all_cargo() {
    let mut game = ships_beside_treasure();
    game.treasures.insert(
        "treasure_2".into(),
        Treasure::on_map(Coord::new(1, 2), 7),
    );
    game.apply_action(
        1,
        &joint(&["collect pirate_ship_1 treasure_1", "wait pirate_ship_2"]),
    )
    .unwrap();
    game.apply_action(
        1,
        &joint(&["sail pirate_ship_1 1,1", "wait pirate_ship_2"]),
    )
    .unwrap();
    game.apply_action(
        1,
        &joint(&["collect pirate_ship_1 treasure_2", "wait pirate_ship_2"]),
    )
    .unwrap();
    assert_eq!(game.ship("pirate_ship_1").unwrap().capacity, 0);
    assert_eq!(game.cargo_of("pirate_ship_1").len(), 2);

    // Player 2's ship joins the loaded ship, with its own hold already full
    game.ships.get_mut("pirate_ship_3").unwrap().location = Coord::new(1, 1);
    game.ships.get_mut("pirate_ship_3").unwrap().capacity = 0;
    let events = game
        .apply_action(
            2,
            &joint(&["plunder pirate_ship_3 pirate_ship_1", "wait pirate_ship_4"]),
        )
        .unwrap();

    assert_eq!(
        events,
        vec![GameEvent::ShipPlundered {
            attacker: "pirate_ship_3".into(),
            victim: "pirate_ship_1".into(),
            treasures_lost: vec!["treasure_1".into(), "treasure_2".into()],
        }]
    );
    assert!(game.treasures.is_empty());
    assert_eq!(game.ship("pirate_ship_1").unwrap().capacity, SHIP_CAPACITY);
    assert_eq!(game.ship("pirate_ship_3").unwrap().capacity, 0);
    assert_eq!(game.scores(), [0, 0]);
}

#[test]
fn test_marine_collision_round() {
    let mut game = new_game();
    // marine_1 starts at (0, 1)
    game.ships.get_mut("pirate_ship_2").unwrap().location = Coord::new(0, 1);
    game.ships.get_mut("pirate_ship_2").unwrap().capacity = 1;
    game.treasures.insert(
        "treasure_2".into(),
        Treasure {
            location: TreasureLocation::CarriedBy("pirate_ship_2".into()),
            reward: 3,
        },
    );

    let events = game.resolve_marine_collisions();
    assert_eq!(
        events,
        vec![GameEvent::MarineCollision {
            player: 1,
            ship: "pirate_ship_2".into(),
            penalty: 1,
            treasures_lost: vec!["treasure_2".into()],
        }]
    );
    assert_eq!(game.score(1), -1);
    assert_eq!(game.ship("pirate_ship_2").unwrap().capacity, 2);
    assert!(game.treasure("treasure_2").is_none());
    // The uncollected treasure is untouched
    assert!(game.treasure("treasure_1").is_some());
}

#[test]
fn test_six_tile_patrol_moves_at_most_one_step() {
    for seed in 0..200 {
        let mut game = new_game();
        let mut rng = StdRng::seed_from_u64(seed);
        game.advance_marines(&mut rng);
        let index = game.marines["marine_1"].index();
        assert!(index <= 1, "seed {seed} moved marine_1 to index {index}");
    }
}

#[test]
fn test_full_rounds_keep_invariants() {
    let mut game = new_game();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut bots = [
        SampleBot::with_seed("one", 10),
        SampleBot::with_seed("two", 20),
    ];

    for _ in 0..50 {
        for (bot, player) in bots.iter_mut().zip(PLAYERS) {
            let action = bot.act(&game.snapshot(), player).unwrap();
            game.apply_action(player, &action).unwrap();
        }
        game.environment_step(&mut rng);

        assert!(game.treasures.len() <= 10);
        for ship in game.ships.values() {
            assert!(ship.capacity <= SHIP_CAPACITY);
            assert!(!game.board.is_island(ship.location));
        }
        for treasure in game.treasures.values() {
            match &treasure.location {
                TreasureLocation::OnMap(coord) => assert!(game.board.is_island(*coord)),
                TreasureLocation::CarriedBy(ship) => assert!(game.ships.contains_key(ship)),
            }
        }
        for (name, ship) in &game.ships {
            let carried = game.cargo_of(name).len();
            assert_eq!(usize::from(ship.capacity) + carried, usize::from(SHIP_CAPACITY));
        }
    }
    assert_eq!(game.turns_to_go, 100);
}

#[test]
fn test_state_serializes_for_agents() {
    let game = new_game();
    let json = serde_json::to_string(&game.snapshot()).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, game);
}
