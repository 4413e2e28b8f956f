//! Input Sources
//!
//! Every fighter is driven by an [`InputSource`] that yields one
//! [`ActionVector`] per tick. Humans go through [`LocalInput`], which turns
//! held-button snapshots into pulses; the CPU goes through [`CpuController`].
//!
//! The CPU re-plans on a throttled, jittered cadence rather than every tick.
//! Between plans it keeps holding the same directions, and any attack or jump
//! it decided on is pressed for exactly one tick.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::game::fighter::Fighter;
use crate::game::input::{ActionVector, Buttons, EdgeDetector};
use crate::game::projectile::Projectile;
use crate::game::state::PlayerId;

/// Upper bound of the random delay added to every think interval.
const THINK_JITTER: f32 = 0.04;
/// Focus the CPU wants before it considers a special.
const SPECIAL_FOCUS: f32 = 30.0;

// =============================================================================
// DIFFICULTY
// =============================================================================

/// CPU difficulty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Difficulty {
    /// Slow to react, rarely presses in
    Easy,
    /// Default
    #[default]
    Normal,
    /// Fast and pushy
    Spicy,
}

impl Difficulty {
    /// Lenient lookup: unknown ids fall back to normal.
    pub fn from_id(id: &str) -> Self {
        id.parse().unwrap_or_default()
    }

    /// Lowercase id.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Spicy => "spicy",
        }
    }

    /// Seconds between plans (before jitter).
    pub fn think_interval(self) -> f32 {
        match self {
            Difficulty::Easy => 0.20,
            Difficulty::Normal => 0.13,
            Difficulty::Spicy => 0.08,
        }
    }

    /// Chance to close distance at mid range.
    pub fn aggression(self) -> f32 {
        match self {
            Difficulty::Easy => 0.55,
            Difficulty::Normal => 0.75,
            Difficulty::Spicy => 0.92,
        }
    }

    /// Chance to guard against an active attack in range.
    pub fn guardiness(self) -> f32 {
        match self {
            Difficulty::Easy => 0.25,
            Difficulty::Normal => 0.32,
            Difficulty::Spicy => 0.40,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "spicy" => Ok(Difficulty::Spicy),
            _ => Err(format!("unknown difficulty `{s}`")),
        }
    }
}

impl From<String> for Difficulty {
    fn from(id: String) -> Self {
        Difficulty::from_id(&id)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// INPUT SOURCE
// =============================================================================

/// What an input source may look at when producing a vector.
#[derive(Clone, Copy, Debug)]
pub struct PollContext<'a> {
    /// Tick length
    pub dt: f32,
    /// The fighter being driven
    pub me: &'a Fighter,
    /// The other fighter
    pub opponent: &'a Fighter,
    /// Live projectiles
    pub projectiles: &'a [Projectile],
}

/// Produces one action vector per tick.
pub trait InputSource: fmt::Debug {
    /// Vector for this tick.
    fn poll(&mut self, ctx: &PollContext<'_>) -> ActionVector;

    /// Latest held-button snapshot from a device. Ignored by the CPU.
    fn feed(&mut self, _held: Buttons) {}

    /// Change difficulty mid-match. Ignored by humans.
    fn set_difficulty(&mut self, _difficulty: Difficulty) {}

    /// Drop any remembered state between rounds.
    fn reset(&mut self) {}
}

/// Held buttons from a local device, edge-detected per tick.
#[derive(Clone, Debug, Default)]
pub struct LocalInput {
    held: Buttons,
    edges: EdgeDetector,
}

impl LocalInput {
    /// Nothing held.
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for LocalInput {
    fn poll(&mut self, _ctx: &PollContext<'_>) -> ActionVector {
        self.edges.next(self.held)
    }

    fn feed(&mut self, held: Buttons) {
        self.held = held;
    }
}

// =============================================================================
// CPU CONTROLLER
// =============================================================================

/// Heuristic CPU opponent.
#[derive(Clone, Debug)]
pub struct CpuController {
    id: PlayerId,
    difficulty: Difficulty,
    rng: DeterministicRng,
    clock: f32,
    next_think: f32,
    desired: Buttons,
    burst: Buttons,
}

impl CpuController {
    /// Create a controller with its own random stream.
    pub fn new(id: PlayerId, difficulty: Difficulty, rng: DeterministicRng) -> Self {
        Self {
            id,
            difficulty,
            rng,
            clock: 0.0,
            next_think: 0.0,
            desired: Buttons::NONE,
            burst: Buttons::NONE,
        }
    }

    /// Current difficulty.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Which side this controller drives.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Toward / away helpers on the held set.
    fn hold_toward(&mut self, dx: f32) {
        let flag = if dx > 0.0 { Buttons::FLAG_RIGHT } else { Buttons::FLAG_LEFT };
        self.desired.set(flag, true);
    }

    fn hold_away(&mut self, dx: f32) {
        let flag = if dx > 0.0 { Buttons::FLAG_LEFT } else { Buttons::FLAG_RIGHT };
        self.desired.set(flag, true);
    }

    fn press(&mut self, flag: u8) {
        self.burst.set(flag, true);
    }

    /// Re-plan from the current situation.
    fn think(&mut self, ctx: &PollContext<'_>) {
        let me = ctx.me;
        let opp = ctx.opponent;
        let dx = opp.center_x() - me.center_x();
        let adx = dx.abs();
        let rise = me.position.y - opp.position.y;

        let aggression = self.difficulty.aggression();
        let guardiness = self.difficulty.guardiness();

        // Held directions never carry over between plans
        self.desired = Buttons::NONE;

        let has_focus = me.focus >= SPECIAL_FOCUS;

        // Guard an active attack in range, sometimes backing off
        if opp.attack_active() && adx < 150.0 && self.rng.next_bool(guardiness) {
            self.desired.set(Buttons::FLAG_GUARD, true);
            if self.rng.next_bool(0.4) {
                self.hold_away(dx);
            }
            return;
        }

        // Hop over incoming projectiles
        let me_center = me.point_at(0.5);
        let incoming = ctx.projectiles.iter().any(|p| {
            p.owner != self.id
                && (p.position.x - me_center.x).abs() < 160.0
                && (p.position.y - me_center.y).abs() < 120.0
        });
        if incoming && self.rng.next_bool(0.65) {
            self.press(Buttons::FLAG_UP);
            return;
        }

        // Far: approach, hop now and then
        if adx > 240.0 {
            self.hold_toward(dx);
            if self.rng.next_bool(0.18) && me.on_ground {
                self.press(Buttons::FLAG_UP);
            }
            return;
        }

        if adx < 70.0 && self.rng.next_bool((1.0 - aggression) * 0.6) {
            self.hold_away(dx);
        } else if adx > 110.0 && self.rng.next_bool(aggression) {
            self.hold_toward(dx);
        }

        if me.is_locked() {
            return;
        }

        // Anti-air when the opponent is airborne above
        if !opp.on_ground && rise > 20.0 && adx < 140.0 && self.rng.next_bool(0.5) {
            self.press(Buttons::FLAG_HEAVY);
            return;
        }

        if adx < 95.0 {
            let flag = if self.rng.next_bool(0.7) {
                Buttons::FLAG_LIGHT
            } else {
                Buttons::FLAG_HEAVY
            };
            self.press(flag);
            return;
        }

        if adx < 180.0 {
            let flag = if has_focus && self.rng.next_bool(0.45) {
                Buttons::FLAG_SPECIAL
            } else {
                Buttons::FLAG_HEAVY
            };
            self.press(flag);
            return;
        }

        if has_focus && self.rng.next_bool(0.35) {
            self.press(Buttons::FLAG_SPECIAL);
        }
    }
}

impl InputSource for CpuController {
    fn poll(&mut self, ctx: &PollContext<'_>) -> ActionVector {
        self.clock += ctx.dt;

        if self.clock >= self.next_think {
            let jitter = self.rng.next_f32() * THINK_JITTER;
            self.next_think = self.clock + self.difficulty.think_interval() + jitter;
            self.think(ctx);
        }

        // Pulses last exactly one tick
        let pressed = std::mem::replace(&mut self.burst, Buttons::NONE);
        ActionVector::new(self.desired, pressed)
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    fn reset(&mut self) {
        self.desired = Buttons::NONE;
        self.burst = Buttons::NONE;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::core::vec2::Vec2;
    use crate::game::moves::MoveSlot;
    use crate::game::roster;

    const DT: f32 = 1.0 / 60.0;

    fn pair(gap: f32) -> (Fighter, Fighter) {
        let config = SimConfig::default();
        let y = 430.0 - config.body.height;
        let mut me = Fighter::new(PlayerId::Two, roster::character("parry"), Vec2::new(300.0, y), &config);
        let mut opp = Fighter::new(PlayerId::One, roster::character("izzy"), Vec2::new(300.0 + gap, y), &config);
        me.on_ground = true;
        opp.on_ground = true;
        (me, opp)
    }

    fn cpu(seed: u64) -> CpuController {
        CpuController::new(PlayerId::Two, Difficulty::Normal, DeterministicRng::new(seed))
    }

    fn ctx<'a>(me: &'a Fighter, opp: &'a Fighter, projectiles: &'a [Projectile]) -> PollContext<'a> {
        PollContext {
            dt: DT,
            me,
            opponent: opp,
            projectiles,
        }
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(Difficulty::from_id("spicy"), Difficulty::Spicy);
        assert_eq!(Difficulty::from_id("nightmare"), Difficulty::Normal);
        assert!("nightmare".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Easy.to_string(), "easy");
        assert!(Difficulty::Spicy.think_interval() < Difficulty::Easy.think_interval());
    }

    #[test]
    fn test_far_cpu_approaches() {
        let (me, opp) = pair(400.0);
        let mut cpu = cpu(7);
        let v = cpu.poll(&ctx(&me, &opp, &[]));
        assert!(v.right());
        assert!(!v.left());
        assert!(!v.light_pressed() && !v.heavy_pressed() && !v.special_pressed());
    }

    #[test]
    fn test_close_cpu_attacks_for_one_tick() {
        let (me, opp) = pair(60.0);
        let mut cpu = cpu(11);
        let first = cpu.poll(&ctx(&me, &opp, &[]));
        assert!(first.light_pressed() || first.heavy_pressed());

        // No re-plan before the think interval: pulse is gone
        let second = cpu.poll(&ctx(&me, &opp, &[]));
        assert!(second.pressed.is_empty());
    }

    #[test]
    fn test_think_cadence() {
        let (me, opp) = pair(60.0);
        let mut cpu = cpu(3);
        let mut plans = 0;
        // One simulated second
        for _ in 0..60 {
            let v = cpu.poll(&ctx(&me, &opp, &[]));
            if !v.pressed.is_empty() {
                plans += 1;
            }
        }
        // 0.13..0.17 s per plan
        assert!((6..=8).contains(&plans), "plans = {plans}");
    }

    #[test]
    fn test_locked_cpu_does_not_press_attacks() {
        let (mut me, opp) = pair(60.0);
        me.hitstun = 0.5;
        for seed in 0..50 {
            let mut cpu = cpu(seed);
            let v = cpu.poll(&ctx(&me, &opp, &[]));
            assert!(!v.light_pressed() && !v.heavy_pressed() && !v.special_pressed());
        }
    }

    #[test]
    fn test_cpu_sometimes_guards_active_attack() {
        let config = SimConfig::default();
        let (me, mut opp) = pair(80.0);
        let mut out = Vec::new();
        opp.start_attack(MoveSlot::Light, &config, &mut out).unwrap();
        if let Some(a) = opp.attack.as_mut() {
            a.elapsed = opp.character.moves.light.as_ref().map(|m| m.timing.startup).unwrap_or(0.0);
        }
        assert!(opp.attack_active());

        let guarded = (0..100)
            .filter(|seed| cpu(*seed).poll(&ctx(&me, &opp, &[])).guard())
            .count();
        assert!(guarded > 10 && guarded < 60, "guarded = {guarded}");
    }

    #[test]
    fn test_set_difficulty() {
        let mut cpu = cpu(1);
        cpu.set_difficulty(Difficulty::Spicy);
        assert_eq!(cpu.difficulty(), Difficulty::Spicy);
    }

    #[test]
    fn test_local_input_edges() {
        let (me, opp) = pair(200.0);
        let mut local = LocalInput::new();
        let light = Buttons::NONE.with(Buttons::FLAG_LIGHT);

        local.feed(light);
        assert!(local.poll(&ctx(&me, &opp, &[])).light_pressed());
        // Still held: no new pulse
        let v = local.poll(&ctx(&me, &opp, &[]));
        assert!(v.light() && !v.light_pressed());

        local.feed(Buttons::NONE);
        local.poll(&ctx(&me, &opp, &[]));
        local.feed(light);
        assert!(local.poll(&ctx(&me, &opp, &[])).light_pressed());
    }
}
