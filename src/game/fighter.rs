//! Fighter Entity
//!
//! One fighter's canonical fields plus its per-tick state machine.
//!
//! ```text
//!                ┌───────── hitstun > 0 ─────────┐
//!                ▼                               │
//!   ┌────────┐ commit ┌────────┐ t >= total ┌────┴───┐
//!   │  FREE  │───────►│ ATTACK │───────────►│  FREE  │
//!   └────────┘        └────────┘            └────────┘
//!   idle / crouch / run / jump / fall are derived from velocity, ground
//!   contact and held down; nothing stores the label.
//! ```
//!
//! Fighters never touch each other. Anything that affects the opponent or the
//! world (strikes, spawns, sounds, banners) is pushed as a [`FighterCommand`]
//! and applied by the match loop right after this fighter's update.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::config::SimConfig;
use crate::core::math::{clamp, tick_down, Rect};
use crate::core::vec2::Vec2;
use crate::game::combat::Hit;
use crate::game::effects::{ParticleKind, Tint};
use crate::game::events::SoundCue;
use crate::game::input::ActionVector;
use crate::game::moves::{MoveDef, MoveKind, MoveSlot};
use crate::game::physics;
use crate::game::projectile::{Beam, Projectile};
use crate::game::roster::CharacterDef;
use crate::game::stage::Stage;
use crate::game::state::PlayerId;

/// Grounded horizontal speed above which the fighter reads as running.
pub const RUN_DEADZONE: f32 = 12.0;

/// Offset of a spawned projectile in front of the body center.
const PROJECTILE_FORWARD: f32 = 34.0;
/// Offset of a beam origin in front of the body center.
const BEAM_FORWARD: f32 = 24.0;
/// Horizontal recoil after firing.
const PROJECTILE_RECOIL: f32 = 60.0;

// =============================================================================
// STATE LABEL
// =============================================================================

/// Derived fighter state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FighterState {
    /// Grounded, still
    Idle,
    /// Grounded, holding down
    Crouch,
    /// Grounded, moving
    Run,
    /// Airborne, rising
    Jump,
    /// Airborne, falling
    Fall,
    /// Attack in progress
    Attack,
    /// Reeling from a hit
    Hitstun,
}

// =============================================================================
// STATUS EFFECTS
// =============================================================================

/// Timed status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusEffect {
    /// Left and right are swapped
    Confused,
    /// Movement speed reduced
    Chilled,
}

impl StatusEffect {
    /// Every effect.
    pub const ALL: [StatusEffect; 2] = [StatusEffect::Confused, StatusEffect::Chilled];

    #[inline]
    fn index(self) -> usize {
        match self {
            StatusEffect::Confused => 0,
            StatusEffect::Chilled => 1,
        }
    }
}

/// One countdown per [`StatusEffect`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSlots {
    timers: [f32; 2],
}

impl StatusSlots {
    /// Seconds left on an effect.
    #[inline]
    pub fn remaining(&self, effect: StatusEffect) -> f32 {
        self.timers[effect.index()]
    }

    /// Is the effect running?
    #[inline]
    pub fn is_active(&self, effect: StatusEffect) -> bool {
        self.remaining(effect) > 0.0
    }

    /// Apply an effect, keeping the longer of the current and new duration.
    pub fn apply(&mut self, effect: StatusEffect, duration: f32) {
        let slot = &mut self.timers[effect.index()];
        *slot = slot.max(duration);
    }

    /// Count every slot down.
    pub fn tick(&mut self, dt: f32) {
        for t in self.timers.iter_mut() {
            *t = tick_down(*t, dt);
        }
    }

    /// Clear all effects.
    pub fn clear(&mut self) {
        self.timers = [0.0; 2];
    }
}

// =============================================================================
// ATTACKS
// =============================================================================

/// A committed move in progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackInstance {
    /// Which slot of the character's table
    pub slot: MoveSlot,
    /// Seconds since commit
    pub elapsed: f32,
    /// Melee check already connected
    pub has_hit: bool,
    /// Projectile / beam / teleport already fired
    pub spawned: bool,
}

impl AttackInstance {
    fn new(slot: MoveSlot) -> Self {
        Self {
            slot,
            elapsed: 0.0,
            has_hit: false,
            spawned: false,
        }
    }
}

/// Why a commitment was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// Not enough focus for a special or ultimate.
    #[error("{slot} needs {needed:.0} focus, have {have:.1}")]
    InsufficientFocus {
        /// Requested slot
        slot: MoveSlot,
        /// Required focus
        needed: f32,
        /// Current focus
        have: f32,
    },

    /// Already attacking or in hitstun.
    #[error("fighter is locked")]
    Locked,

    /// The character has no move in this slot.
    #[error("no move in slot {0}")]
    MissingMove(MoveSlot),
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Side effect requested by a fighter, applied by the match loop.
#[derive(Clone, Debug, PartialEq)]
pub enum FighterCommand {
    /// Melee hitbox overlapped the opponent's hurtbox.
    Strike {
        /// Fighter being hit
        target: PlayerId,
        /// Hit to resolve
        hit: Hit,
        /// Impact spark position
        impact: Vec2,
    },
    /// Fire a projectile.
    SpawnProjectile(Projectile),
    /// Create a beam.
    SpawnBeam(Beam),
    /// Show banner text.
    Announce {
        /// Text
        text: String,
        /// Seconds
        duration: f32,
    },
    /// Play a sound.
    Sound(SoundCue),
    /// Emit cosmetic particles.
    Particles {
        /// Look
        kind: ParticleKind,
        /// Color family
        tint: Tint,
        /// Origin
        at: Vec2,
        /// How many
        count: u32,
    },
}

impl FighterCommand {
    pub(crate) fn sparks(at: Vec2, count: u32, tint: Tint) -> Self {
        FighterCommand::Particles {
            kind: ParticleKind::Spark,
            tint,
            at,
            count,
        }
    }

    pub(crate) fn smoke(at: Vec2, count: u32) -> Self {
        FighterCommand::Particles {
            kind: ParticleKind::Smoke,
            tint: Tint::White,
            at,
            count,
        }
    }
}

/// Read-only world a fighter updates against.
#[derive(Clone, Copy, Debug)]
pub struct World<'a> {
    /// Injected constants
    pub config: &'a SimConfig,
    /// Platforms and spawns
    pub stage: &'a Stage,
}

// =============================================================================
// FIGHTER
// =============================================================================

/// A fighter.
#[derive(Clone, Debug)]
pub struct Fighter {
    /// Player slot
    pub id: PlayerId,
    /// Character (shared, immutable)
    pub character: Arc<CharacterDef>,
    /// Top-left of the body
    pub position: Vec2,
    /// Velocity (units/s)
    pub velocity: Vec2,
    /// +1 right, -1 left
    pub facing: f32,
    /// Body width
    pub width: f32,
    /// Body height
    pub height: f32,
    /// Current health (0..=max_health)
    pub health: f32,
    /// Health cap
    pub max_health: f32,
    /// Current focus (0..=focus_max)
    pub focus: f32,
    /// Focus cap
    pub focus_max: f32,
    /// Standing on a platform
    pub on_ground: bool,
    /// The platform stood on is one-way
    pub on_one_way: bool,
    /// Air jumps used since last landing (0 or 1)
    pub jumps_used: u8,
    /// Seconds one-way platforms are ignored
    pub drop_through: f32,
    /// Move in progress
    pub attack: Option<AttackInstance>,
    /// Invulnerability left
    pub iframes: f32,
    /// Hitstun left
    pub hitstun: f32,
    /// Hit-flash left
    pub hitflash: f32,
    /// Status effect timers
    pub status: StatusSlots,
    /// Knocked out this round
    pub dead: bool,
    /// Rounds won (kept across rounds)
    pub wins: u32,
    /// Squash/stretch scalar, eases back to 1
    pub squash: f32,
    /// Walk-cycle phase
    pub bob: f32,
    /// Seconds alive this round
    pub state_time: f32,
    /// Down was held on the last update
    pub holding_down: bool,
    /// Guard was held on the last update
    pub guarding: bool,
}

impl Fighter {
    /// Create a fighter at a spawn point.
    pub fn new(id: PlayerId, character: Arc<CharacterDef>, spawn: Vec2, config: &SimConfig) -> Self {
        Self {
            id,
            character,
            position: spawn,
            velocity: Vec2::ZERO,
            facing: id.initial_facing(),
            width: config.body.width,
            height: config.body.height,
            health: config.combat.max_health,
            max_health: config.combat.max_health,
            focus: 0.0,
            focus_max: config.combat.focus_max,
            on_ground: false,
            on_one_way: false,
            jumps_used: 0,
            drop_through: 0.0,
            attack: None,
            iframes: 0.0,
            hitstun: 0.0,
            hitflash: 0.0,
            status: StatusSlots::default(),
            dead: false,
            wins: 0,
            squash: 1.0,
            bob: 0.0,
            state_time: 0.0,
            holding_down: false,
            guarding: false,
        }
    }

    /// Put back at a spawn with full health. Wins are kept.
    pub fn reset_for_round(&mut self, spawn: Vec2) {
        self.position = spawn;
        self.velocity = Vec2::ZERO;
        self.on_ground = false;
        self.on_one_way = false;
        self.jumps_used = 0;
        self.drop_through = 0.0;
        self.health = self.max_health;
        self.focus = 0.0;
        self.attack = None;
        self.iframes = 0.0;
        self.hitstun = 0.0;
        self.hitflash = 0.0;
        self.status.clear();
        self.dead = false;
        self.state_time = 0.0;
        self.holding_down = false;
        self.guarding = false;
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Body rectangle.
    #[inline]
    pub fn body(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    /// Damageable region, inset from the body.
    #[inline]
    pub fn hurtbox(&self) -> Rect {
        Rect::new(
            self.position.x + 6.0,
            self.position.y + 6.0,
            self.width - 12.0,
            self.height - 10.0,
        )
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.position.x + self.width * 0.5
    }

    /// Point at a fraction of body height on the center line.
    #[inline]
    pub fn point_at(&self, height_fraction: f32) -> Vec2 {
        Vec2::new(self.center_x(), self.position.y + self.height * height_fraction)
    }

    /// Where returning boomerangs aim.
    #[inline]
    pub fn projectile_anchor(&self) -> Vec2 {
        self.point_at(0.35)
    }

    /// World-space hitbox for a box authored facing right.
    pub fn hitbox_rect(&self, local: Rect) -> Rect {
        let oriented = if self.facing < 0.0 {
            local.mirrored_in(self.width)
        } else {
            local
        };
        oriented.offset(self.position)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Derived state label.
    pub fn state(&self) -> FighterState {
        if self.hitstun > 0.0 {
            FighterState::Hitstun
        } else if self.attack.is_some() {
            FighterState::Attack
        } else if !self.on_ground {
            if self.velocity.y < 0.0 {
                FighterState::Jump
            } else {
                FighterState::Fall
            }
        } else if self.holding_down {
            FighterState::Crouch
        } else if self.velocity.x.abs() > RUN_DEADZONE {
            FighterState::Run
        } else {
            FighterState::Idle
        }
    }

    /// Attacking or in hitstun.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.attack.is_some() || self.hitstun > 0.0
    }

    /// The move definition of the attack in progress.
    pub fn current_move(&self) -> Option<&MoveDef> {
        self.attack
            .as_ref()
            .and_then(|a| self.character.moves.get(a.slot))
    }

    /// Is the attack in progress inside its active window?
    pub fn attack_active(&self) -> bool {
        match (self.attack.as_ref(), self.current_move()) {
            (Some(a), Some(def)) => def.timing.is_active(a.elapsed),
            _ => false,
        }
    }

    /// Focus needed to commit a slot.
    pub fn focus_required(&self, slot: MoveSlot, config: &SimConfig) -> f32 {
        let cost = self.character.moves.get(slot).and_then(|m| m.focus_cost);
        match slot {
            MoveSlot::Special => cost.unwrap_or(config.combat.special_cost),
            MoveSlot::Ultimate => cost.unwrap_or(config.combat.ultimate_cost),
            MoveSlot::Light | MoveSlot::Heavy => cost.unwrap_or(0.0),
        }
    }

    /// Add focus, clamped to the cap.
    #[inline]
    pub fn add_focus(&mut self, amount: f32) {
        self.focus = clamp(self.focus + amount, 0.0, self.focus_max);
    }

    // -------------------------------------------------------------------------
    // Commitments
    // -------------------------------------------------------------------------

    /// Commit to a move. Leaves the fighter untouched on error.
    pub fn start_attack(
        &mut self,
        slot: MoveSlot,
        config: &SimConfig,
        out: &mut Vec<FighterCommand>,
    ) -> Result<(), ActionError> {
        if self.is_locked() {
            return Err(ActionError::Locked);
        }
        let (cost, sound) = match self.character.moves.get(slot) {
            Some(def) => (def.focus_cost, def.sound),
            None => return Err(ActionError::MissingMove(slot)),
        };
        let needed = self.focus_required(slot, config);
        if self.focus < needed {
            return Err(ActionError::InsufficientFocus {
                slot,
                needed,
                have: self.focus,
            });
        }

        if let Some(cost) = cost.filter(|c| *c > 0.0) {
            self.add_focus(-cost);
        }
        self.attack = Some(AttackInstance::new(slot));
        self.squash = 0.92;
        out.push(FighterCommand::Sound(sound));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    /// Advance one tick.
    pub fn update(
        &mut self,
        dt: f32,
        input: &ActionVector,
        opponent: &Fighter,
        world: &World<'_>,
        out: &mut Vec<FighterCommand>,
    ) {
        if self.dead {
            return;
        }
        let combat = &world.config.combat;

        self.state_time += dt;
        self.iframes = tick_down(self.iframes, dt);
        self.hitstun = tick_down(self.hitstun, dt);
        self.hitflash = tick_down(self.hitflash, dt);
        self.status.tick(dt);

        if input.guard() {
            self.add_focus(-combat.focus_guard_drain_per_sec * dt);
        } else {
            self.add_focus(combat.focus_regen_per_sec * dt);
        }

        if !self.is_locked() {
            self.facing = if opponent.position.x > self.position.x { 1.0 } else { -1.0 };
        }

        self.holding_down = input.down();
        self.guarding = input.guard();

        if self.hitstun > 0.0 {
            physics::integrate(self, dt, input, world, false, out);
            return;
        }

        if let Some(attack) = self.attack.as_mut() {
            attack.elapsed += dt;
            self.advance_attack(opponent, world, out);
            physics::integrate(self, dt, input, world, false, out);
            return;
        }

        physics::integrate(self, dt, input, world, true, out);
        self.commit_from_input(input, world.config, out);
    }

    /// One commitment per tick: ultimate > light > heavy > special.
    fn commit_from_input(&mut self, input: &ActionVector, config: &SimConfig, out: &mut Vec<FighterCommand>) {
        let wants_ultimate = input.special_pressed() && (input.light() || input.heavy());
        if wants_ultimate {
            match self.start_attack(MoveSlot::Ultimate, config, out) {
                Ok(()) => return,
                Err(err) => debug!(player = %self.id, %err, "ultimate not committed"),
            }
        }

        let slot = if input.light_pressed() {
            MoveSlot::Light
        } else if input.heavy_pressed() {
            MoveSlot::Heavy
        } else if input.special_pressed() {
            MoveSlot::Special
        } else {
            return;
        };

        match self.start_attack(slot, config, out) {
            Ok(()) => {}
            Err(ActionError::InsufficientFocus { .. }) => {
                out.push(FighterCommand::Announce {
                    text: format!("{} needs Focus!", self.id.label()),
                    duration: 0.6,
                });
                out.push(FighterCommand::Sound(SoundCue::Block));
            }
            Err(err) => debug!(player = %self.id, %err, "action absorbed"),
        }
    }

    /// Dash burst, payload spawn, melee check and termination.
    fn advance_attack(&mut self, opponent: &Fighter, world: &World<'_>, out: &mut Vec<FighterCommand>) {
        let Some(mut attack) = self.attack else {
            return;
        };
        let character = Arc::clone(&self.character);
        let Some(def) = character.moves.get(attack.slot) else {
            self.attack = None;
            return;
        };
        let t = attack.elapsed;
        let in_active = def.timing.is_active(t);

        if let Some(dash) = def.kind.dash().filter(|_| in_active) {
            self.velocity.x = dash.speed * self.facing;
            if dash.lock_y {
                self.velocity.y = self.velocity.y.min(0.0);
            }
            if let Some(boost) = dash.up_boost {
                self.velocity.y = self.velocity.y.min(boost);
            }
        }

        if !attack.spawned && t >= def.timing.startup {
            attack.spawned = true;
            if def.kind.spawns_payload() {
                self.spawn_payload(def, world.config, out);
            }
        }

        if in_active && !attack.has_hit && def.has_melee_check() && !opponent.dead {
            if let Some(local) = def.kind.hitbox() {
                let hitbox = self.hitbox_rect(local);
                if hitbox.overlaps(&opponent.hurtbox()) {
                    attack.has_hit = true;
                    out.push(FighterCommand::Strike {
                        target: opponent.id,
                        hit: Hit {
                            payload: def.payload(),
                            from_x: Some(self.center_x()),
                        },
                        impact: hitbox.center(),
                    });
                    self.add_focus(def.damage * world.config.combat.focus_from_damage_dealt);
                }
            }
        }

        self.attack = if t >= def.timing.total() {
            None
        } else {
            Some(attack)
        };
    }

    fn spawn_payload(&mut self, def: &MoveDef, config: &SimConfig, out: &mut Vec<FighterCommand>) {
        let dir = self.facing;
        match &def.kind {
            MoveKind::Projectile { spawn } | MoveKind::Boomerang { spawn, .. } => {
                let return_after = match def.kind {
                    MoveKind::Boomerang { return_after, .. } => Some(return_after),
                    _ => None,
                };
                let origin = Vec2::new(
                    self.center_x() + dir * PROJECTILE_FORWARD,
                    self.position.y + self.height * 0.35,
                );
                for p in Projectile::fan(self.id, origin, dir, spawn, return_after, def.payload()) {
                    out.push(FighterCommand::SpawnProjectile(p));
                }
                self.velocity.x -= dir * PROJECTILE_RECOIL;
                out.push(FighterCommand::sparks(origin, 10, Tint::Blue));
            }
            MoveKind::Beam { beam } => {
                let origin = Vec2::new(
                    self.center_x() + dir * BEAM_FORWARD,
                    self.position.y + self.height * 0.28,
                );
                out.push(FighterCommand::SpawnBeam(Beam::new(self.id, origin, dir, beam, def.payload())));
                out.push(FighterCommand::sparks(
                    Vec2::new(origin.x + dir * 40.0, origin.y),
                    16,
                    Tint::Pink,
                ));
            }
            MoveKind::Teleport { distance } => {
                let margin = config.world.teleport_margin;
                out.push(FighterCommand::smoke(self.point_at(0.6), 18));
                self.position.x = clamp(
                    self.position.x + dir * distance,
                    margin,
                    config.world.width - margin - self.width,
                );
                self.velocity = self.velocity * 0.25;
                self.iframes = self.iframes.max(config.combat.teleport_iframes);
                out.push(FighterCommand::smoke(self.point_at(0.6), 18));
            }
            MoveKind::Melee { .. } | MoveKind::Dash { .. } => {}
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::Buttons;
    use crate::game::roster;
    use crate::game::stage::StageId;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        config: SimConfig,
        stage: Stage,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                config: SimConfig::default(),
                stage: Stage::by_id(StageId::Rooftop),
            }
        }

        fn world(&self) -> World<'_> {
            World {
                config: &self.config,
                stage: &self.stage,
            }
        }

        /// Two grounded fighters `gap` apart on the main floor.
        fn pair(&self, a: &str, b: &str, gap: f32) -> (Fighter, Fighter) {
            let ground_y = 430.0 - self.config.body.height;
            let mut p1 = Fighter::new(PlayerId::One, roster::character(a), Vec2::new(300.0, ground_y), &self.config);
            let mut p2 = Fighter::new(PlayerId::Two, roster::character(b), Vec2::new(300.0 + gap, ground_y), &self.config);
            p1.on_ground = true;
            p2.on_ground = true;
            (p1, p2)
        }
    }

    fn press(prev: Buttons, held: Buttons) -> ActionVector {
        ActionVector::from_snapshots(prev, held)
    }

    #[test]
    fn test_new_fighter_defaults() {
        let rig = Rig::new();
        let (p1, p2) = rig.pair("parry", "izzy", 200.0);
        assert_eq!(p1.facing, 1.0);
        assert_eq!(p2.facing, -1.0);
        assert_eq!(p1.health, 1000.0);
        assert_eq!(p1.focus, 0.0);
        assert_eq!(p1.state(), FighterState::Idle);
    }

    #[test]
    fn test_state_derivation() {
        let rig = Rig::new();
        let (mut f, _) = rig.pair("parry", "izzy", 200.0);

        f.velocity.x = 50.0;
        assert_eq!(f.state(), FighterState::Run);
        f.holding_down = true;
        assert_eq!(f.state(), FighterState::Crouch);

        f.on_ground = false;
        f.velocity.y = -10.0;
        assert_eq!(f.state(), FighterState::Jump);
        f.velocity.y = 10.0;
        assert_eq!(f.state(), FighterState::Fall);

        f.attack = Some(AttackInstance::new(MoveSlot::Light));
        assert_eq!(f.state(), FighterState::Attack);
        f.hitstun = 0.1;
        assert_eq!(f.state(), FighterState::Hitstun);
    }

    #[test]
    fn test_hitbox_mirrors_with_facing() {
        let rig = Rig::new();
        let (mut f, _) = rig.pair("parry", "izzy", 200.0);
        let local = Rect::new(34.0, 18.0, 40.0, 26.0);

        let right = f.hitbox_rect(local);
        assert_eq!(right.x, f.position.x + 34.0);

        f.facing = -1.0;
        let left = f.hitbox_rect(local);
        assert_eq!(left.x, f.position.x + 54.0 - 34.0 - 40.0);
        assert_eq!(left.y, right.y);
    }

    #[test]
    fn test_start_attack_locked_is_noop() {
        let rig = Rig::new();
        let (mut f, _) = rig.pair("parry", "izzy", 200.0);
        let mut out = Vec::new();

        f.start_attack(MoveSlot::Light, &rig.config, &mut out).unwrap();
        let before = f.attack;
        let focus = f.focus;
        out.clear();

        let err = f.start_attack(MoveSlot::Heavy, &rig.config, &mut out).unwrap_err();
        assert_eq!(err, ActionError::Locked);
        assert_eq!(f.attack, before);
        assert_eq!(f.focus, focus);
        assert!(out.is_empty());

        // Hitstun locks too
        f.attack = None;
        f.hitstun = 0.2;
        assert_eq!(
            f.start_attack(MoveSlot::Light, &rig.config, &mut out),
            Err(ActionError::Locked)
        );
        assert!(f.attack.is_none());
    }

    #[test]
    fn test_special_needs_focus_and_announces() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("pillmore", "izzy", 400.0);
        let mut out = Vec::new();
        let special = Buttons::NONE.with(Buttons::FLAG_SPECIAL);

        f.update(DT, &press(Buttons::NONE, special), &opp, &rig.world(), &mut out);
        assert!(f.attack.is_none());
        assert!(out.iter().any(|c| matches!(
            c,
            FighterCommand::Announce { text, duration } if text == "P1 needs Focus!" && *duration == 0.6
        )));
        assert!(out.contains(&FighterCommand::Sound(SoundCue::Block)));

        // With focus it commits and spends the cost
        out.clear();
        f.focus = 50.0;
        f.update(DT, &press(Buttons::NONE, special), &opp, &rig.world(), &mut out);
        assert_eq!(f.attack.map(|a| a.slot), Some(MoveSlot::Special));
        assert!(f.focus < 50.0 - 29.0 && f.focus > 50.0 - 31.0);
    }

    #[test]
    fn test_ultimate_priority_and_fallthrough() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("parry", "izzy", 400.0);
        let mut out = Vec::new();
        let held = Buttons::NONE.with(Buttons::FLAG_LIGHT).with(Buttons::FLAG_SPECIAL);
        let input = ActionVector::new(held, Buttons::NONE.with(Buttons::FLAG_SPECIAL));

        // Full focus: ultimate wins
        f.focus = 100.0;
        f.update(DT, &input, &opp, &rig.world(), &mut out);
        assert_eq!(f.attack.map(|a| a.slot), Some(MoveSlot::Ultimate));
        assert!(f.focus < 1.0);

        // Short on focus: falls through to the special check
        let (mut g, opp) = rig.pair("parry", "izzy", 400.0);
        g.focus = 40.0;
        out.clear();
        g.update(DT, &input, &opp, &rig.world(), &mut out);
        assert_eq!(g.attack.map(|a| a.slot), Some(MoveSlot::Special));
    }

    #[test]
    fn test_melee_hits_once_per_activation() {
        let rig = Rig::new();
        // Close enough for the light hitbox to overlap for the whole active window
        let (mut f, opp) = rig.pair("finneas", "ferbald", 50.0);
        let mut out = Vec::new();
        let light = Buttons::NONE.with(Buttons::FLAG_LIGHT);

        f.update(DT, &press(Buttons::NONE, light), &opp, &rig.world(), &mut out);
        assert!(f.attack.is_some());

        let mut strikes = 0;
        for _ in 0..40 {
            out.clear();
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
            strikes += out
                .iter()
                .filter(|c| matches!(c, FighterCommand::Strike { .. }))
                .count();
        }
        assert_eq!(strikes, 1);
        // Attack is over after its total duration
        assert!(f.attack.is_none());
        // Connecting grants focus
        assert!(f.focus > 42.0 * 0.035);
    }

    #[test]
    fn test_projectile_special_spawns_once() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("pillmore", "izzy", 400.0);
        f.focus = 100.0;
        let mut out = Vec::new();
        let special = Buttons::NONE.with(Buttons::FLAG_SPECIAL);
        f.update(DT, &press(Buttons::NONE, special), &opp, &rig.world(), &mut out);

        let mut spawned = Vec::new();
        for _ in 0..60 {
            out.clear();
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
            for c in out.drain(..) {
                if let FighterCommand::SpawnProjectile(p) = c {
                    spawned.push(p);
                }
            }
        }
        assert_eq!(spawned.len(), 1);
        let p = &spawned[0];
        assert_eq!(p.velocity, Vec2::new(820.0, 0.0));
        assert_eq!(p.radius, 12.0);
        assert_eq!(p.life, 1.6);
        assert_eq!(p.owner, PlayerId::One);
    }

    #[test]
    fn test_teleport_clamps_and_grants_iframes() {
        let rig = Rig::new();
        let (mut f, _) = rig.pair("aardvark", "izzy", 400.0);
        // Opponent far right so facing stays +1
        f.position.x = 800.0;
        let mut opp = f.clone();
        opp.id = PlayerId::Two;
        opp.position.x = 860.0;
        f.focus = 100.0;

        let mut out = Vec::new();
        let special = Buttons::NONE.with(Buttons::FLAG_SPECIAL);
        f.update(DT, &press(Buttons::NONE, special), &opp, &rig.world(), &mut out);
        for _ in 0..10 {
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
        }
        let max_x = rig.config.world.width - rig.config.world.teleport_margin - f.width;
        assert!(f.position.x <= max_x + 1e-3);
        assert!(f.iframes > 0.0);
    }

    #[test]
    fn test_status_slots() {
        let mut s = StatusSlots::default();
        s.apply(StatusEffect::Confused, 0.9);
        s.apply(StatusEffect::Confused, 0.3);
        assert_eq!(s.remaining(StatusEffect::Confused), 0.9);
        assert!(!s.is_active(StatusEffect::Chilled));

        s.tick(1.0);
        for effect in StatusEffect::ALL {
            assert_eq!(s.remaining(effect), 0.0);
        }
    }

    #[test]
    fn test_focus_regen_and_guard_drain() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("parry", "izzy", 300.0);
        let mut out = Vec::new();
        for _ in 0..60 {
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
        }
        assert!((f.focus - 3.2).abs() < 0.05);

        let guard = ActionVector::new(Buttons::NONE.with(Buttons::FLAG_GUARD), Buttons::NONE);
        for _ in 0..60 {
            f.update(DT, &guard, &opp, &rig.world(), &mut out);
        }
        assert_eq!(f.focus, 0.0);
        assert!(f.guarding);
    }

    #[test]
    fn test_dash_drives_velocity_only_in_active_window() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("parry", "izzy", 400.0);
        f.focus = 100.0;
        let mut out = Vec::new();
        let special = Buttons::NONE.with(Buttons::FLAG_SPECIAL);
        f.update(DT, &press(Buttons::NONE, special), &opp, &rig.world(), &mut out);
        assert_eq!(f.attack.map(|a| a.slot), Some(MoveSlot::Special));

        let timing = f.current_move().unwrap().timing;
        let burst = 740.0 * rig.config.physics.locked_ground_damping;
        let mut active_ticks = 0;
        for _ in 0..60 {
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
            let Some(attack) = f.attack else {
                break;
            };
            let t = attack.elapsed;
            if t < timing.startup {
                assert!(f.velocity.x.abs() < 1.0, "t = {t}, vx = {}", f.velocity.x);
            } else if timing.is_active(t) {
                active_ticks += 1;
                assert!((f.velocity.x - burst).abs() < 1e-2, "t = {t}, vx = {}", f.velocity.x);
                // Locked to the floor
                assert!(f.velocity.y <= 0.0);
                assert!(f.on_ground);
            } else {
                assert!(f.velocity.x < burst);
            }
        }
        assert!(active_ticks >= 12, "active ticks = {active_ticks}");
        assert!(f.attack.is_none());
    }

    #[test]
    fn test_dash_lock_y_holds_altitude() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("parry", "izzy", 400.0);
        f.on_ground = false;
        f.position.y = 150.0;
        f.velocity.y = 300.0;
        f.focus = 100.0;
        let mut out = Vec::new();
        let special = Buttons::NONE.with(Buttons::FLAG_SPECIAL);
        f.update(DT, &press(Buttons::NONE, special), &opp, &rig.world(), &mut out);

        let timing = f.current_move().unwrap().timing;
        let one_tick_of_gravity = rig.config.world.gravity * DT;
        let mut checked = 0;
        for _ in 0..30 {
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
            match f.attack {
                Some(a) if timing.is_active(a.elapsed) => {
                    checked += 1;
                    assert!((f.velocity.y - one_tick_of_gravity).abs() < 1e-3, "vy = {}", f.velocity.y);
                    assert!(f.velocity.x > 700.0);
                }
                _ => {}
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_dash_up_boost_lifts_off() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("ferbald", "izzy", 400.0);
        f.focus = 100.0;
        let start_y = f.position.y;
        let mut out = Vec::new();
        let special = Buttons::NONE.with(Buttons::FLAG_SPECIAL);
        f.update(DT, &press(Buttons::NONE, special), &opp, &rig.world(), &mut out);

        let timing = f.current_move().unwrap().timing;
        let lift = -180.0 + rig.config.world.gravity * DT;
        let mut checked = 0;
        let mut highest = start_y;
        for _ in 0..40 {
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
            highest = highest.min(f.position.y);
            match f.attack {
                Some(a) if timing.is_active(a.elapsed) => {
                    checked += 1;
                    assert!((f.velocity.y - lift).abs() < 1e-3, "vy = {}", f.velocity.y);
                    assert!(!f.on_ground);
                }
                _ => {}
            }
        }
        assert!(checked > 0);
        assert!(highest < start_y - 20.0);
    }

    #[test]
    fn test_hitstun_ignores_control() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("parry", "izzy", 300.0);
        f.hitstun = 0.3;
        let x = f.position.x;
        let mut out = Vec::new();
        let mashing = Buttons::NONE
            .with(Buttons::FLAG_RIGHT)
            .with(Buttons::FLAG_UP)
            .with(Buttons::FLAG_LIGHT);

        for _ in 0..10 {
            f.update(DT, &press(Buttons::NONE, mashing), &opp, &rig.world(), &mut out);
            assert_eq!(f.state(), FighterState::Hitstun);
            assert!(f.attack.is_none());
            assert_eq!(f.velocity.x, 0.0);
            assert!(f.on_ground);
        }
        assert_eq!(f.position.x, x);
        assert!(out.is_empty());

        // Control returns once hitstun runs out
        for _ in 0..10 {
            f.update(DT, &press(Buttons::NONE, mashing), &opp, &rig.world(), &mut out);
        }
        assert_eq!(f.hitstun, 0.0);
        assert_eq!(f.attack.map(|a| a.slot), Some(MoveSlot::Light));
    }

    #[test]
    fn test_beam_ultimate_spawns_once() {
        let rig = Rig::new();
        let (mut f, opp) = rig.pair("izzy", "parry", 400.0);
        f.focus = 100.0;
        let held = Buttons::NONE.with(Buttons::FLAG_LIGHT).with(Buttons::FLAG_SPECIAL);
        let input = ActionVector::new(held, Buttons::NONE.with(Buttons::FLAG_SPECIAL));
        let mut out = Vec::new();
        f.update(DT, &input, &opp, &rig.world(), &mut out);
        assert_eq!(f.attack.map(|a| a.slot), Some(MoveSlot::Ultimate));

        let mut beams = Vec::new();
        for _ in 0..60 {
            out.clear();
            f.update(DT, &ActionVector::IDLE, &opp, &rig.world(), &mut out);
            for c in out.drain(..) {
                if let FighterCommand::SpawnBeam(b) = c {
                    beams.push(b);
                }
            }
        }
        assert_eq!(beams.len(), 1);

        let beam = &beams[0];
        assert_eq!(beam.owner, PlayerId::One);
        assert_eq!(beam.origin_x, f.center_x() + 24.0);
        assert_eq!(beam.rect.x, beam.origin_x);
        assert_eq!(beam.rect.w, 520.0);
        assert_eq!(beam.rect.h, 44.0);
        assert!((beam.rect.y - (f.position.y + f.height * 0.28 - 22.0)).abs() < 1e-3);
        assert_eq!(beam.payload.damage, 200.0);
        // The opponent stands inside its reach
        assert!(beam.try_hit(&opp).is_some());
    }
}
