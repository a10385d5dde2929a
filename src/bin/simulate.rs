use std::collections::BTreeSet;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use grid_chase::config::SessionConfig;
use grid_chase::constants::{ADVERSARY_COUNT, DEFAULT_GRID_SIZE, MAX_GRID_SIZE, MIN_GRID_SIZE};
use grid_chase::error::GameError;
use grid_chase::rng::Rng;
use grid_chase::runtime::Ticker;
use grid_chase::session::GameSession;
use grid_chase::types::{Cell, Direction, SessionEndReason};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const MOVES: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];
const TURN_CHANCE: f32 = 0.15;

/// Plays seeded sessions against random input on a virtual clock and checks
/// board invariants after every tick. Exits 1 when any run breaks one.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Side length of the board.
    #[arg(long)]
    size: Option<usize>,
    /// Virtual minutes before a run quits.
    #[arg(long)]
    minutes: Option<u64>,
    #[arg(long)]
    seed: Option<u32>,
    /// Number of consecutive seeds to play.
    #[arg(long, default_value_t = 2)]
    runs: u32,
}

#[derive(Clone, Debug)]
struct Scenario {
    grid_size: usize,
    minutes: u64,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct RunReport {
    seed: u32,
    #[serde(rename = "gridSize")]
    grid_size: usize,
    reason: SessionEndReason,
    #[serde(rename = "virtualMs")]
    virtual_ms: u64,
    score: u64,
    lives: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "powerUpsSpawned")]
    power_ups_spawned: u32,
    turns: u32,
    /// Distinct violations, each tagged with the first virtual time seen.
    anomalies: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BatchLine {
    #[serde(rename = "finishedAt")]
    finished_at: String,
    runs: usize,
    failed: usize,
    #[serde(rename = "livesExhausted")]
    lives_exhausted: usize,
    #[serde(rename = "bestScore")]
    best_score: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let cli = Cli::parse();
    let first_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let grid_size = cli
        .size
        .unwrap_or(DEFAULT_GRID_SIZE)
        .clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
    let minutes = cli.minutes.unwrap_or(3).clamp(1, 30);

    let mut reports = Vec::new();
    let mut failed = 0usize;
    for offset in 0..cli.runs.max(1) {
        let scenario = Scenario {
            grid_size,
            minutes,
            seed: first_seed.wrapping_add(offset),
        };
        let report = match play(&scenario) {
            Ok(report) => report,
            Err(error) => {
                tracing::error!(seed = scenario.seed, "run did not start: {error}");
                failed += 1;
                continue;
            }
        };
        for anomaly in &report.anomalies {
            tracing::warn!(seed = report.seed, "{anomaly}");
        }
        if !report.anomalies.is_empty() {
            failed += 1;
        }
        match serde_json::to_string(&report) {
            Ok(line) => println!("{line}"),
            Err(error) => tracing::error!("cannot encode run report: {error}"),
        }
        reports.push(report);
    }

    let batch = BatchLine {
        finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        runs: reports.len(),
        failed,
        lives_exhausted: reports
            .iter()
            .filter(|report| report.reason == SessionEndReason::LivesExhausted)
            .count(),
        best_score: reports.iter().map(|report| report.score).max().unwrap_or(0),
    };
    match serde_json::to_string(&batch) {
        Ok(line) => println!("{line}"),
        Err(error) => tracing::error!("cannot encode batch line: {error}"),
    }
    if failed > 0 {
        std::process::exit(1);
    }
}

/// Replays the runtime's tickers in virtual milliseconds. Ticks due at the
/// same instant run in `Ticker::ALL` order.
fn play(scenario: &Scenario) -> Result<RunReport, GameError> {
    let config = SessionConfig::new(scenario.grid_size, scenario.seed, "simulator")?;
    let mut session = GameSession::new(config)?;
    let mut input = Rng::new(scenario.seed.rotate_left(16) ^ 0x5eed);
    let limit_ms = scenario.minutes * 60_000;

    let mut due: Vec<(Ticker, u64)> = Ticker::ALL
        .into_iter()
        .map(|ticker| (ticker, ticker.period(&session).as_millis() as u64))
        .collect();
    let mut now_ms = 0;
    let mut lives_lost = 0;
    let mut power_ups_spawned = 0;
    let mut turns = 0;
    let mut seen = BTreeSet::new();
    let mut anomalies = Vec::new();

    session.build_snapshot();
    while !session.is_ended() {
        let Some(slot) = next_due(&due) else {
            break;
        };
        let (ticker, at_ms) = due[slot];
        if at_ms >= limit_ms {
            now_ms = limit_ms;
            session.request_quit();
            break;
        }
        now_ms = at_ms;

        if ticker == Ticker::Player && input.chance(TURN_CHANCE) {
            let dir = MOVES[input.below(MOVES.len())];
            if session.direction() != dir {
                turns += 1;
            }
            session.set_direction(dir);
        }
        let lives_before = session.lives();
        let mut problems = Vec::new();
        if let Err(error) = ticker.run(&mut session) {
            problems.push(format!("{ticker:?} tick failed: {error}"));
        }
        lives_lost += lives_before.saturating_sub(session.lives());
        due[slot].1 = now_ms + ticker.period(&session).as_millis() as u64;

        let snapshot = session.build_snapshot();
        if ticker == Ticker::PowerUps {
            power_ups_spawned += snapshot
                .changes
                .iter()
                .filter(|change| change.cell.power_up().is_some())
                .count() as u32;
        }
        problems.extend(invariant_violations(&session));
        for problem in problems {
            if seen.insert(problem.clone()) {
                anomalies.push(format!("{problem} (first at {now_ms} ms)"));
            }
        }
    }

    let summary = session.summary();
    Ok(RunReport {
        seed: scenario.seed,
        grid_size: scenario.grid_size,
        reason: summary.reason,
        virtual_ms: now_ms,
        score: summary.score,
        lives: summary.lives,
        lives_lost,
        power_ups_spawned,
        turns,
        anomalies,
    })
}

fn next_due(due: &[(Ticker, u64)]) -> Option<usize> {
    due.iter()
        .enumerate()
        .min_by_key(|(index, (_, at_ms))| (*at_ms, *index))
        .map(|(index, _)| index)
}

fn invariant_violations(session: &GameSession) -> Vec<String> {
    let mut problems = Vec::new();
    let grid = session.grid();
    let players = grid.count(Cell::is_player);
    let expected_players = usize::from(!session.is_ended());
    if players != expected_players {
        problems.push(format!("{players} player cells, expected {expected_players}"));
    }
    let adversaries = grid.count(|cell| cell == Cell::Adversary);
    if adversaries != ADVERSARY_COUNT {
        problems.push(format!("{adversaries} adversary cells, expected {ADVERSARY_COUNT}"));
    }
    for pos in session.adversaries() {
        if grid.get(*pos) != Ok(Cell::Adversary) {
            problems.push(format!("adversary ({}, {}) missing from grid", pos.row, pos.col));
        }
    }
    if let Some(pos) = session.player_position() {
        if !grid.get(pos).is_ok_and(Cell::is_player) {
            problems.push(format!("player ({}, {}) missing from grid", pos.row, pos.col));
        }
    }
    if session.lives() == 0 && !session.is_ended() {
        problems.push("no lives left but session still running".to_string());
    }
    problems
}
