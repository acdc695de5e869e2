//! Subcommand implementations.

use crate::cli::{CheckArgs, PlayArgs, ReplayArgs, ScenarioArgs};
use crate::replay;
use anyhow::Context;
use pirates_core::{EpisodeOutcome, GameState, Match, MatchReport, MatchSettings, SampleBot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::time::Duration;
use tracing::info;

/// The 7x7 scenario used when no configuration is given
const DEFAULT_SCENARIO: &str = include_str!("../scenarios/default.json");

fn load_scenario(args: &ScenarioArgs) -> anyhow::Result<GameState> {
    let (source, json) = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            (path.display().to_string(), json)
        }
        None => ("built-in scenario".to_string(), DEFAULT_SCENARIO.to_string()),
    };

    let state = GameState::from_json(&json).with_context(|| format!("loading {source}"))?;
    info!(%source, ships = state.ships.len(), treasures = state.treasures.len(), "scenario loaded");
    Ok(state)
}

pub fn play(args: PlayArgs) -> anyhow::Result<()> {
    let state = load_scenario(&args.scenario)?;
    let settings = MatchSettings {
        action_timeout: Duration::from_secs(args.timeout),
        rounds: args.rounds,
        swap_sides: !args.no_swap,
        ..MatchSettings::default()
    };

    let mut game = Match::new(state, settings, StdRng::seed_from_u64(args.seed));
    let mut first = SampleBot::with_seed("bot-a", args.seed.wrapping_add(1));
    let mut second = SampleBot::with_seed("bot-b", args.seed.wrapping_add(2));
    let report = game.play(&mut first, &mut second);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &MatchReport) {
    for (i, episode) in report.episodes.iter().enumerate() {
        println!(
            "Episode {}: {} (player 1) vs {} (player 2)",
            i + 1,
            episode.agents[0],
            episode.agents[1]
        );
        println!("  rounds played: {}", episode.rounds_played);
        println!(
            "  scores: {} / {}",
            episode.scores[0], episode.scores[1]
        );
        if let EpisodeOutcome::Forfeited { player, reason } = &episode.outcome {
            println!("  player {player} forfeited: {reason:?}");
        }
    }
    println!("Totals: bot-a {}, bot-b {}", report.totals[0], report.totals[1]);
}

pub fn replay(args: ReplayArgs) -> anyhow::Result<()> {
    let mut state = load_scenario(&args.scenario)?;
    let script = fs::read_to_string(&args.actions)
        .with_context(|| format!("reading {}", args.actions.display()))?;
    let turns = replay::parse_script(&script)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let events = replay::run(&mut state, &turns, &mut rng)?;
    info!(turns = turns.len(), events = events.len(), "replay finished");

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

pub fn check(args: CheckArgs) -> anyhow::Result<()> {
    let state = load_scenario(&args.scenario)?;
    println!(
        "OK: {}x{} map, {} ships, {} treasures, {} marines, {} turns",
        state.board.rows(),
        state.board.cols(),
        state.ships.len(),
        state.treasures.len(),
        state.marines.len(),
        state.turns_to_go
    );
    Ok(())
}
