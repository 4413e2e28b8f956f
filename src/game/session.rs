//! Match Session
//!
//! Wraps a [`MatchState`] with its two input sources and a fixed-step
//! accumulator. The embedding layer calls [`Match::update`] once per rendered
//! frame with the wall-clock delta and the latest held buttons; the session
//! runs as many fixed ticks as the accumulated time allows.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigError, ControllerKind, MatchRules, SimConfig};
use crate::core::rng::DeterministicRng;
use crate::game::cpu::{CpuController, Difficulty, InputSource, LocalInput};
use crate::game::events::GameEvent;
use crate::game::input::Buttons;
use crate::game::state::{MatchState, PlayerId};
use crate::game::tick::{tick, InputSources};
use crate::TICK_DT;

// =============================================================================
// FIXED STEPPER
// =============================================================================

/// Wall-clock to fixed-tick accumulator.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedStepper {
    /// Unconsumed time
    pub accumulator: f32,
    /// Tick length
    pub step: f32,
    /// Longest frame delta accepted
    pub max_frame_dt: f32,
    /// Most ticks run for one frame
    pub max_steps: u32,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self {
            accumulator: 0.0,
            step: TICK_DT,
            max_frame_dt: 0.05,
            max_steps: 5,
        }
    }
}

impl FixedStepper {
    /// Add a frame's delta and return how many ticks to run.
    ///
    /// Negative deltas count as zero. Time left over after `max_steps` is
    /// dropped so a long stall cannot snowball.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, self.max_frame_dt);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps {
            self.accumulator = self.accumulator.min(self.step);
        }
        steps
    }
}

// =============================================================================
// MATCH
// =============================================================================

/// A running match plus its input sources.
#[derive(Debug)]
pub struct Match {
    state: MatchState,
    sources: InputSources,
    stepper: FixedStepper,
}

impl Match {
    /// Validate options and set up round one.
    pub fn new(config: SimConfig, rules: MatchRules) -> Result<Self, ConfigError> {
        config.validate()?;
        rules.validate()?;

        let mut rng = DeterministicRng::new(rules.seed);
        let sources = [
            make_source(PlayerId::One, rules.p1.controller, rules.difficulty, &mut rng),
            make_source(PlayerId::Two, rules.p2.controller, rules.difficulty, &mut rng),
        ];

        info!(
            stage = %rules.stage,
            p1 = %rules.p1.character,
            p2 = %rules.p2.character,
            best_of = rules.best_of,
            "match created"
        );

        Ok(Self {
            state: MatchState::new(Arc::new(config), rules),
            sources,
            stepper: FixedStepper::default(),
        })
    }

    /// Advance by one rendered frame.
    ///
    /// `held` is the latest device snapshot per side; CPU sides ignore it.
    pub fn update(&mut self, frame_dt: f32, held: &[Buttons; 2]) -> Vec<GameEvent> {
        for (source, buttons) in self.sources.iter_mut().zip(held) {
            source.feed(*buttons);
        }

        let mut events = Vec::new();
        for _ in 0..self.stepper.advance(frame_dt) {
            let result = tick(&mut self.state, &mut self.sources);
            events.extend(result.events);
        }
        events
    }

    /// Run exactly one fixed tick regardless of wall time.
    pub fn step(&mut self, held: &[Buttons; 2]) -> Vec<GameEvent> {
        for (source, buttons) in self.sources.iter_mut().zip(held) {
            source.feed(*buttons);
        }
        tick(&mut self.state, &mut self.sources).events
    }

    /// Read-only view of the match.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Is the match decided?
    pub fn is_over(&self) -> bool {
        self.state.is_match_over()
    }

    /// Suspend or resume ticking.
    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    /// Flip the pause flag. Returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.paused = !self.state.paused;
        debug!(paused = self.state.paused, "pause toggled");
        self.state.paused
    }

    /// Back to round one with no wins.
    pub fn rematch(&mut self) {
        self.state.rematch();
        self.state.paused = false;
        for source in self.sources.iter_mut() {
            source.reset();
        }
    }

    /// Change CPU difficulty mid-match.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.state.rules.difficulty = difficulty;
        for source in self.sources.iter_mut() {
            source.set_difficulty(difficulty);
        }
        debug!(%difficulty, "difficulty changed");
    }

    /// Change the damage multiplier mid-match.
    pub fn set_damage_scale(&mut self, scale: f32) {
        self.state.set_damage_scale(scale);
    }
}

fn make_source(
    id: PlayerId,
    kind: ControllerKind,
    difficulty: Difficulty,
    rng: &mut DeterministicRng,
) -> Box<dyn InputSource> {
    match kind {
        ControllerKind::Human => Box::new(LocalInput::new()),
        ControllerKind::Cpu => Box::new(CpuController::new(id, difficulty, rng.fork(id.index() as u64 + 1))),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SideConfig;
    use crate::game::events::GameEventData;
    use crate::game::state::MatchPhase;

    const IDLE: [Buttons; 2] = [Buttons::NONE, Buttons::NONE];

    fn cpu_vs_cpu() -> MatchRules {
        MatchRules {
            p1: SideConfig {
                character: "finneas".to_string(),
                controller: ControllerKind::Cpu,
            },
            p2: SideConfig {
                character: "ferbald".to_string(),
                controller: ControllerKind::Cpu,
            },
            ..MatchRules::default()
        }
    }

    #[test]
    fn test_stepper_one_tick_per_frame() {
        let mut stepper = FixedStepper::default();
        let total: u32 = (0..60).map(|_| stepper.advance(TICK_DT)).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_stepper_caps_long_frames() {
        let mut stepper = FixedStepper::default();
        let steps = stepper.advance(2.0);
        assert!(steps <= 3);
        assert!(stepper.accumulator < stepper.step);

        let mut tiny = FixedStepper {
            step: 0.001,
            ..FixedStepper::default()
        };
        assert_eq!(tiny.advance(0.05), 5);
        assert!(tiny.accumulator <= 0.001);
    }

    #[test]
    fn test_stepper_ignores_negative_dt() {
        let mut stepper = FixedStepper::default();
        assert_eq!(stepper.advance(-1.0), 0);
        assert_eq!(stepper.accumulator, 0.0);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = MatchRules {
            best_of: 0,
            ..MatchRules::default()
        };
        assert!(Match::new(SimConfig::default(), rules).is_err());
    }

    #[test]
    fn test_update_runs_ticks() {
        let mut m = Match::new(SimConfig::default(), MatchRules::default()).unwrap();
        let events = m.update(TICK_DT, &IDLE);
        assert_eq!(m.state().tick, 1);
        assert!(events.iter().any(|e| matches!(e.data, GameEventData::Hud(_))));
    }

    #[test]
    fn test_pause_freezes_match() {
        let mut m = Match::new(SimConfig::default(), MatchRules::default()).unwrap();
        assert!(m.toggle_pause());
        for _ in 0..30 {
            m.update(TICK_DT, &IDLE);
        }
        assert_eq!(m.state().tick, 0);
        assert!(!m.toggle_pause());
        m.update(TICK_DT, &IDLE);
        assert_eq!(m.state().tick, 1);
    }

    #[test]
    fn test_human_input_reaches_fighter() {
        let mut m = Match::new(SimConfig::default(), MatchRules::default()).unwrap();
        let right = [Buttons::NONE.with(Buttons::FLAG_RIGHT), Buttons::NONE];
        let start = m.state().fighter(PlayerId::One).position.x;
        for _ in 0..30 {
            m.step(&right);
        }
        assert!(m.state().fighter(PlayerId::One).position.x > start);
    }

    #[test]
    fn test_difficulty_and_damage_scale() {
        let mut m = Match::new(SimConfig::default(), cpu_vs_cpu()).unwrap();
        m.set_difficulty(Difficulty::Easy);
        assert_eq!(m.state().rules.difficulty, Difficulty::Easy);
        m.set_damage_scale(-2.0);
        assert_eq!(m.state().rules.damage_scale, 0.0);
    }

    #[test]
    fn test_cpu_match_progresses_and_rematches() {
        let mut m = Match::new(SimConfig::default(), cpu_vs_cpu()).unwrap();
        let mut hits = 0;
        // Two simulated minutes
        for _ in 0..7200 {
            for e in m.step(&IDLE) {
                if matches!(e.data, GameEventData::HitImpact { .. }) {
                    hits += 1;
                }
            }
            if m.is_over() {
                break;
            }
        }
        assert!(hits > 0);

        m.rematch();
        assert_eq!(m.state().round_index, 1);
        assert_eq!(m.state().phase, MatchPhase::Playing);
        assert_eq!(m.state().score().p1 + m.state().score().p2, 0);
    }
}
