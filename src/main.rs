//! Scuffle Headless Demo
//!
//! Runs a CPU-vs-CPU match with no renderer and logs what a presentation
//! layer would react to.
//!
//! ```text
//! scuffle-sim [rules.json] [config.json]
//! ```
//!
//! Both files are optional and may be partial; missing fields keep their
//! defaults. Controllers are forced to CPU on both sides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use scuffle::{
    config::ControllerKind,
    game::{
        events::{GameEvent, GameEventData},
        input::Buttons,
        roster,
        state::PlayerId,
    },
    Match, MatchRules, SimConfig, TICK_RATE, VERSION,
};

/// Give up after ten simulated minutes.
const MAX_TICKS: u32 = TICK_RATE * 600;

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("Scuffle sim v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut args = std::env::args().skip(1);
    let rules = match args.next() {
        Some(path) => load_rules(Path::new(&path))?,
        None => MatchRules::default(),
    };
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => SimConfig::default(),
    };

    let characters = roster::list_characters();
    info!("Roster:");
    for c in &characters {
        info!("  {:<10} {} - {}", c.id, c.name, c.tagline);
    }
    for side in [&rules.p1, &rules.p2] {
        if !characters.iter().any(|c| c.id == side.character) {
            warn!("Unknown character `{}`, falling back to {}", side.character, roster::CHARACTER_IDS[0]);
        }
    }

    let rules = MatchRules {
        p1: scuffle::config::SideConfig {
            controller: ControllerKind::Cpu,
            ..rules.p1
        },
        p2: scuffle::config::SideConfig {
            controller: ControllerKind::Cpu,
            ..rules.p2
        },
        ..rules
    };

    let summary = demo_match(config.clone(), rules.clone())?;

    // Same seed, same match
    info!("=== Verifying Determinism ===");
    let replay = demo_match(config, rules)?;
    if summary == replay {
        info!("DETERMINISM VERIFIED: replay matches");
    } else {
        warn!(?summary, ?replay, "replay diverged");
    }

    Ok(())
}

fn load_rules(path: &Path) -> Result<MatchRules> {
    let text = fs::read_to_string(path).with_context(|| format!("reading rules from {}", path.display()))?;
    MatchRules::from_json_str(&text).with_context(|| format!("parsing rules from {}", path.display()))
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading config from {}", path.display()))?;
    SimConfig::from_json_str(&text).with_context(|| format!("parsing config from {}", path.display()))
}

/// Final ticks, score and health of a finished run.
#[derive(Debug, PartialEq)]
struct Summary {
    ticks: u32,
    score: String,
    health: [f32; 2],
    winner: Option<PlayerId>,
}

fn demo_match(config: SimConfig, rules: MatchRules) -> Result<Summary> {
    info!("=== Starting Demo Match ===");
    info!(
        "{} vs {} on {} (best of {}, seed {:#x})",
        rules.p1.character, rules.p2.character, rules.stage, rules.best_of, rules.seed
    );

    let mut session = Match::new(config, rules).context("invalid match setup")?;
    let idle = [Buttons::NONE; 2];

    let mut hits = 0u32;
    let mut winner = None;
    for t in 0..MAX_TICKS {
        for event in session.step(&idle) {
            if matches!(event.data, GameEventData::HitImpact { .. }) {
                hits += 1;
            }
            if let GameEventData::MatchOver { winner: w, .. } = &event.data {
                winner = Some(*w);
            }
            log_event(&event);
        }

        if t > 0 && t % (TICK_RATE * 10) == 0 {
            let state = session.state();
            info!(
                "Tick {}: round {}, score {}, health {:.0}/{:.0}, {} hits",
                t,
                state.round_index,
                state.score(),
                state.fighters[0].health,
                state.fighters[1].health,
                hits
            );
        }

        if session.is_over() {
            break;
        }
    }

    let state = session.state();
    if !session.is_over() {
        warn!("Match not decided after {} ticks", MAX_TICKS);
    }

    info!("=== Match Results ===");
    info!("Score: {}  Hits landed: {}", state.score(), hits);

    Ok(Summary {
        ticks: state.tick,
        score: state.score().to_string(),
        health: [state.fighters[0].health, state.fighters[1].health],
        winner,
    })
}

fn log_event(event: &GameEvent) {
    match &event.data {
        GameEventData::Ko { loser, winner } => {
            info!("Tick {}: KO! {} down, round to {}", event.tick, loser, winner);
        }
        GameEventData::TimeOver { winner } => match winner {
            Some(w) => info!("Tick {}: time over, round to {}", event.tick, w),
            None => info!("Tick {}: time over, draw", event.tick),
        },
        GameEventData::RoundStarted { round } => {
            info!("Tick {}: Round {}", event.tick, round);
        }
        GameEventData::RoundOver { score } => {
            info!("Tick {}: round over ({})", event.tick, score);
        }
        GameEventData::MatchOver { winner, winner_name, score } => {
            info!("Tick {}: {} ({}) wins the match {}", event.tick, winner_name, winner, score);
        }
        _ => {}
    }
}
