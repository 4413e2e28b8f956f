//! Match State Definitions
//!
//! Everything one fight owns: both fighters, live projectiles and beams,
//! cosmetic timers and the round/match bookkeeping. The per-tick driver lives
//! in [`crate::game::tick`]; this module holds the state and the transitions
//! it triggers (hit impact, KO, time over, round resets).

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::config::{MatchRules, SimConfig};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::combat::Hit;
use crate::game::effects::{self, Announcer, CameraShake, Particle, ParticleKind, Tint};
use crate::game::events::{GameEvent, GameEventData, HudFighter, HudSnapshot, Score, SoundCue};
use crate::game::fighter::{Fighter, FighterCommand};
use crate::game::input::ActionVector;
use crate::game::projectile::{Beam, Projectile};
use crate::game::roster;
use crate::game::stage::Stage;

/// Duration of the "Round N" banner.
const ROUND_BANNER_TIME: f32 = 1.0;
/// Duration of the "KO!" banner.
const KO_BANNER_TIME: f32 = 1.2;
/// Duration of the "TIME!" banner.
const TIME_BANNER_TIME: f32 = 1.0;
/// Sparks per landed hit.
const IMPACT_SPARKS: u32 = 12;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Player slot. Player one starts on the left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    /// Left side
    One,
    /// Right side
    Two,
}

impl PlayerId {
    /// Both slots in update order.
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// Array index (0 or 1).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// The other slot.
    #[inline]
    pub const fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Short label used in banners.
    pub const fn label(self) -> &'static str {
        match self {
            PlayerId::One => "P1",
            PlayerId::Two => "P2",
        }
    }

    /// Facing at spawn.
    #[inline]
    pub const fn initial_facing(self) -> f32 {
        match self {
            PlayerId::One => 1.0,
            PlayerId::Two => -1.0,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Current phase of the match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Fighters are live
    #[default]
    Playing,
    /// KO or time over; waiting out the freeze
    RoundOver,
    /// Someone reached the rounds-to-win count
    MatchOver,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Injected constants (shared, immutable)
    pub config: Arc<SimConfig>,

    /// Per-match options
    pub rules: MatchRules,

    /// Static geometry (shared, immutable)
    pub stage: Arc<Stage>,

    /// Player one and player two
    pub fighters: [Fighter; 2],

    /// Live projectiles
    pub projectiles: Vec<Projectile>,

    /// Live beams
    pub beams: Vec<Beam>,

    /// Cosmetic particles
    pub particles: Vec<Particle>,

    /// Current phase
    pub phase: MatchPhase,

    /// Current round (1-based)
    pub round_index: u32,

    /// Seconds left in the round
    pub timer: f32,

    /// Simulation freeze after a landed hit
    pub hitstop: f32,

    /// Freeze after KO / time over before the round resolves
    pub ko_freeze: f32,

    /// Camera shake
    pub camera: CameraShake,

    /// Banner text
    pub announcer: Announcer,

    /// Ticking suspended
    pub paused: bool,

    /// Ticks since the match started
    pub tick: u32,

    /// Particle spread
    pub rng: DeterministicRng,

    /// Action vectors consumed on the most recent playing tick
    pub last_inputs: [ActionVector; 2],

    /// Events generated since the last drain
    pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a match at round one.
    pub fn new(config: Arc<SimConfig>, rules: MatchRules) -> Self {
        let stage = Arc::new(Stage::by_id(rules.stage));
        let fighters = [
            Fighter::new(PlayerId::One, roster::character(&rules.p1.character), stage.spawns[0], &config),
            Fighter::new(PlayerId::Two, roster::character(&rules.p2.character), stage.spawns[1], &config),
        ];
        let rng = DeterministicRng::new(rules.seed);

        let mut state = Self {
            timer: rules.round_time,
            config,
            rules,
            stage,
            fighters,
            projectiles: Vec::new(),
            beams: Vec::new(),
            particles: Vec::new(),
            phase: MatchPhase::Playing,
            round_index: 1,
            hitstop: 0.0,
            ko_freeze: 0.0,
            camera: CameraShake::default(),
            announcer: Announcer::default(),
            paused: false,
            tick: 0,
            rng,
            last_inputs: [ActionVector::IDLE; 2],
            pending_events: Vec::new(),
        };
        state.round_banner();
        state
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Get a fighter.
    #[inline]
    pub fn fighter(&self, id: PlayerId) -> &Fighter {
        &self.fighters[id.index()]
    }

    /// Get a fighter mutably.
    #[inline]
    pub fn fighter_mut(&mut self, id: PlayerId) -> &mut Fighter {
        &mut self.fighters[id.index()]
    }

    /// Wins needed to take the match.
    #[inline]
    pub fn rounds_to_win(&self) -> u32 {
        self.rules.rounds_to_win()
    }

    /// Current round wins.
    pub fn score(&self) -> Score {
        Score {
            p1: self.fighters[0].wins,
            p2: self.fighters[1].wins,
        }
    }

    /// Is the match decided?
    #[inline]
    pub fn is_match_over(&self) -> bool {
        self.phase == MatchPhase::MatchOver
    }

    /// HUD line for both fighters plus round info.
    pub fn hud_snapshot(&self) -> HudSnapshot {
        let line = |f: &Fighter| HudFighter {
            name: f.character.name.clone(),
            health: if f.max_health > 0.0 { f.health / f.max_health } else { 0.0 },
            focus: if f.focus_max > 0.0 { f.focus / f.focus_max } else { 0.0 },
            wins: f.wins,
        };
        HudSnapshot {
            p1: line(&self.fighters[0]),
            p2: line(&self.fighters[1]),
            timer: self.timer,
            round_index: self.round_index,
            rounds_to_win: self.rounds_to_win(),
            best_of: self.rules.best_of,
        }
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Show banner text and tell the presentation layer.
    pub fn announce(&mut self, text: impl Into<String>, duration: f32) {
        let text = text.into();
        self.announcer.announce(text.clone(), duration);
        self.push_event(GameEvent::announce(self.tick, text, duration));
    }

    fn round_banner(&mut self) {
        self.announce(format!("Round {}", self.round_index), ROUND_BANNER_TIME);
        self.push_event(GameEvent::new(
            self.tick,
            GameEventData::RoundStarted {
                round: self.round_index,
            },
        ));
    }

    /// Emit cosmetic particles from the match RNG.
    pub fn spawn_particles(&mut self, kind: ParticleKind, tint: Tint, at: Vec2, count: u32) {
        match kind {
            ParticleKind::Spark => effects::spawn_sparks(&mut self.rng, at, count, tint, &mut self.particles),
            ParticleKind::Smoke => effects::spawn_smoke(&mut self.rng, at, count, &mut self.particles),
            ParticleKind::Heart => effects::spawn_hearts(&mut self.rng, at, count, &mut self.particles),
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Apply one side effect emitted by `source`'s update.
    pub fn apply_command(&mut self, source: PlayerId, command: FighterCommand) {
        match command {
            FighterCommand::Strike { target, hit, impact } => {
                self.deliver_hit(source, target, &hit, Some(impact));
            }
            FighterCommand::SpawnProjectile(p) => self.projectiles.push(p),
            FighterCommand::SpawnBeam(b) => self.beams.push(b),
            FighterCommand::Announce { text, duration } => self.announce(text, duration),
            FighterCommand::Sound(cue) => self.push_event(GameEvent::sound(self.tick, cue)),
            FighterCommand::Particles { kind, tint, at, count } => {
                self.spawn_particles(kind, tint, at, count);
            }
        }
    }

    /// Resolve a hit from `attacker` against `target`.
    ///
    /// Guard is read from the target's own action vector for this tick. KO is
    /// raised before the impact so a finishing blow still sparks. `impact`
    /// defaults to the center of the target's hurtbox.
    pub fn deliver_hit(&mut self, attacker: PlayerId, target: PlayerId, hit: &Hit, impact: Option<Vec2>) {
        let guard_held = self.last_inputs[target.index()].guard();
        let config = Arc::clone(&self.config);
        let mut out = Vec::new();

        let defender = &mut self.fighters[target.index()];
        let outcome = defender.take_hit(hit, guard_held, &config, self.rules.damage_scale, &mut out);
        let impact = impact.unwrap_or_else(|| defender.hurtbox().center());

        for command in out {
            self.apply_command(target, command);
        }

        if outcome.knocked_out {
            self.on_ko(target);
        }
        if outcome.landed {
            self.on_hit_impact(impact, attacker);
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Hitstop, shake and sparks for a landed hit.
    pub fn on_hit_impact(&mut self, at: Vec2, attacker: PlayerId) {
        let combat = &self.config.combat;
        self.hitstop = self.hitstop.max(combat.hitstop);
        if self.rules.screen_shake {
            self.camera.kick(combat.shake_time, combat.shake_magnitude);
        }
        self.spawn_particles(ParticleKind::Spark, Tint::White, at, IMPACT_SPARKS);
        self.push_event(GameEvent::hit_impact(self.tick, attacker, at));
    }

    /// A fighter was knocked out. Ignored outside the playing phase.
    pub fn on_ko(&mut self, loser: PlayerId) {
        if self.phase != MatchPhase::Playing {
            debug!(%loser, phase = ?self.phase, "KO ignored");
            return;
        }

        self.ko_freeze = self.config.combat.ko_freeze;
        self.push_event(GameEvent::sound(self.tick, SoundCue::Ko));
        self.announce("KO!", KO_BANNER_TIME);

        let winner = loser.opponent();
        self.fighter_mut(winner).wins += 1;
        self.push_event(GameEvent::ko(self.tick, loser));
        self.phase = MatchPhase::RoundOver;

        debug!(%loser, %winner, round = self.round_index, score = %self.score(), "KO");
    }

    /// The round timer ran out. Strictly higher health takes the round.
    pub fn on_time_over(&mut self) {
        if self.phase != MatchPhase::Playing {
            return;
        }

        self.ko_freeze = self.config.combat.time_over_freeze;
        self.announce("TIME!", TIME_BANNER_TIME);

        let (h1, h2) = (self.fighters[0].health, self.fighters[1].health);
        let winner = if h1 > h2 {
            Some(PlayerId::One)
        } else if h2 > h1 {
            Some(PlayerId::Two)
        } else {
            None
        };
        if let Some(id) = winner {
            self.fighter_mut(id).wins += 1;
        }
        self.push_event(GameEvent::new(self.tick, GameEventData::TimeOver { winner }));
        self.phase = MatchPhase::RoundOver;

        info!(round = self.round_index, winner = ?winner, score = %self.score(), "time over");
    }

    /// Reset fighters and the field for the current round index. Wins are kept.
    pub fn restart_round(&mut self) {
        let spawns = self.stage.spawns;
        for (fighter, spawn) in self.fighters.iter_mut().zip(spawns) {
            fighter.reset_for_round(spawn);
            fighter.facing = fighter.id.initial_facing();
        }

        self.projectiles.clear();
        self.beams.clear();
        self.particles.clear();

        self.timer = self.rules.round_time;
        self.hitstop = 0.0;
        self.ko_freeze = 0.0;
        self.camera.clear();
        self.last_inputs = [ActionVector::IDLE; 2];
        self.phase = MatchPhase::Playing;

        self.round_banner();
    }

    /// Advance to the next round.
    pub fn next_round(&mut self) {
        self.round_index += 1;
        info!(round = self.round_index, score = %self.score(), "next round");
        self.restart_round();
    }

    /// Start over from round one with no wins.
    pub fn rematch(&mut self) {
        for fighter in self.fighters.iter_mut() {
            fighter.wins = 0;
        }
        self.round_index = 1;
        info!("rematch");
        self.restart_round();
    }

    /// Change the global damage multiplier mid-match.
    pub fn set_damage_scale(&mut self, scale: f32) {
        self.rules.damage_scale = scale.max(0.0);
    }
}

// =============================================================================
// TESTS
// =============================================================================
