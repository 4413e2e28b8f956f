//! Hit Resolution
//!
//! Turns an incoming [`Hit`] into damage, knockback, stun and focus changes on
//! the defender. The numeric part is a pure function ([`resolve_hit`]) so the
//! blocking rules can be checked in isolation; [`Fighter::take_hit`] applies
//! the result.

use serde::{Serialize, Deserialize};

use crate::config::{GuardConfig, SimConfig};
use crate::core::math::sign;
use crate::core::vec2::Vec2;
use crate::game::effects::{ParticleKind, Tint};
use crate::game::events::SoundCue;
use crate::game::fighter::{Fighter, FighterCommand, StatusEffect};
use crate::game::moves::{HitPayload, OnHitEffect};

/// An incoming hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Damage / stun / knockback
    pub payload: HitPayload,
    /// X the hit came from; knockback points away from it
    pub from_x: Option<f32>,
}

/// Numbers after blocking is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedHit {
    /// Damage before the match damage scale
    pub damage: f32,
    /// Knockback before direction and weight
    pub knockback: Vec2,
    /// Hitstun
    pub hitstun: f32,
    /// Extra focus the guard costs
    pub guard_focus_cost: f32,
}

/// What happened to the defender.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitOutcome {
    /// The hit was applied (not ignored by iFrames or a KO'd target)
    pub landed: bool,
    /// The defender was guarding
    pub blocked: bool,
    /// Health actually removed
    pub health_lost: f32,
    /// This hit knocked the defender out
    pub knocked_out: bool,
}

impl HitOutcome {
    /// Hit that had no effect.
    pub const IGNORED: Self = Self {
        landed: false,
        blocked: false,
        health_lost: 0.0,
        knocked_out: false,
    };
}

/// Guard works whenever it is held with focus above the threshold, whatever
/// the facing.
#[inline]
pub fn is_blocking(guard_held: bool, focus: f32, guard: &GuardConfig) -> bool {
    guard_held && focus > guard.min_focus
}

/// Apply blocking reductions to a payload.
pub fn resolve_hit(payload: &HitPayload, blocked: bool, guard: &GuardConfig) -> ResolvedHit {
    if !blocked {
        return ResolvedHit {
            damage: payload.damage,
            knockback: payload.knockback,
            hitstun: payload.hitstun,
            guard_focus_cost: 0.0,
        };
    }
    let damage = payload.damage * guard.damage_scale;
    ResolvedHit {
        damage,
        knockback: payload
            .knockback
            .scale_xy(guard.knockback_x_scale, guard.knockback_y_scale),
        hitstun: payload.hitstun * guard.hitstun_scale,
        guard_focus_cost: damage * guard.focus_cost_per_damage,
    }
}

/// Knockback direction: away from the hit origin, or backwards without one.
#[inline]
pub fn knockback_direction(defender_center_x: f32, from_x: Option<f32>, facing: f32) -> f32 {
    match from_x {
        Some(x) => sign(defender_center_x - x),
        None => -facing,
    }
}

impl Fighter {
    /// Resolve an incoming hit.
    ///
    /// `guard_held` is the defender's own guard button this tick.
    /// `damage_scale` is the match-wide damage multiplier.
    pub fn take_hit(
        &mut self,
        hit: &Hit,
        guard_held: bool,
        config: &SimConfig,
        damage_scale: f32,
        out: &mut Vec<FighterCommand>,
    ) -> HitOutcome {
        if self.dead || self.iframes > 0.0 {
            return HitOutcome::IGNORED;
        }

        let blocked = is_blocking(guard_held, self.focus, &config.guard);
        let resolved = resolve_hit(&hit.payload, blocked, &config.guard);

        if blocked {
            self.add_focus(-resolved.guard_focus_cost);
            out.push(FighterCommand::Sound(SoundCue::Block));
            out.push(FighterCommand::sparks(self.point_at(0.45), 10, Tint::Blue));
        } else {
            out.push(FighterCommand::Sound(SoundCue::Hit));
        }

        let before = self.health;
        self.health = (self.health - resolved.damage * damage_scale.max(0.0)).max(0.0);
        self.add_focus(resolved.damage * config.combat.focus_from_damage_taken);

        let dir = knockback_direction(self.center_x(), hit.from_x, self.facing);
        let weight = self.character.stats.weight;
        let weight = if weight > 0.0 { weight } else { 1.0 };
        let kb = Vec2::new(resolved.knockback.x * dir / weight, resolved.knockback.y / weight);

        if blocked {
            self.velocity += kb * config.guard.pushback_fraction;
        } else {
            self.velocity.x = kb.x;
            self.velocity.y = self.velocity.y.min(kb.y);
        }

        self.hitstun = self.hitstun.max(resolved.hitstun);
        self.iframes = config.combat.iframes_on_hit;
        self.hitflash = config.combat.hitflash;

        match hit.payload.on_hit {
            Some(OnHitEffect::Charm) => {
                self.status.apply(StatusEffect::Confused, config.combat.confuse_duration);
                out.push(FighterCommand::Particles {
                    kind: ParticleKind::Heart,
                    tint: Tint::Pink,
                    at: self.point_at(0.25),
                    count: 12,
                });
                out.push(FighterCommand::Announce {
                    text: "✨ Confused! ✨".to_string(),
                    duration: 0.7,
                });
            }
            Some(OnHitEffect::Chill) => {
                self.status.apply(StatusEffect::Chilled, config.combat.chill_duration);
                out.push(FighterCommand::sparks(self.point_at(0.25), 10, Tint::Blue));
            }
            None => {}
        }

        let knocked_out = self.health <= 0.0;
        if knocked_out {
            self.dead = true;
        }

        HitOutcome {
            landed: true,
            blocked,
            health_lost: before - self.health,
            knocked_out,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::game::roster;
    use crate::game::state::PlayerId;

    fn defender(config: &SimConfig) -> Fighter {
        let mut f = Fighter::new(
            PlayerId::Two,
            roster::character("finneas"),
            Vec2::new(500.0, 352.0),
            config,
        );
        f.on_ground = true;
        f
    }

    fn payload(damage: f32) -> HitPayload {
        HitPayload {
            damage,
            hitstun: 0.3,
            knockback: Vec2::new(500.0, -300.0),
            on_hit: None,
        }
    }

    #[test]
    fn test_clean_hit() {
        let config = SimConfig::default();
        let mut f = defender(&config);
        let mut out = Vec::new();
        let hit = Hit {
            payload: payload(100.0),
            from_x: Some(400.0),
        };

        let outcome = f.take_hit(&hit, false, &config, 1.0, &mut out);
        assert!(outcome.landed);
        assert!(!outcome.blocked);
        assert_eq!(f.health, 900.0);
        assert_eq!(outcome.health_lost, 100.0);
        // Away from the attacker (attacker is to the left)
        assert_eq!(f.velocity.x, 500.0);
        assert_eq!(f.velocity.y, -300.0);
        assert_eq!(f.hitstun, 0.3);
        assert_eq!(f.iframes, config.combat.iframes_on_hit);
        assert_eq!(f.hitflash, config.combat.hitflash);
        assert!((f.focus - 100.0 * 0.055).abs() < 1e-4);
        assert!(out.contains(&FighterCommand::Sound(SoundCue::Hit)));
    }

    #[test]
    fn test_iframes_ignore_hit() {
        let config = SimConfig::default();
        let mut f = defender(&config);
        f.iframes = 0.1;
        let mut out = Vec::new();
        let hit = Hit {
            payload: payload(100.0),
            from_x: None,
        };

        let outcome = f.take_hit(&hit, false, &config, 1.0, &mut out);
        assert_eq!(outcome, HitOutcome::IGNORED);
        assert_eq!(f.health, 1000.0);
        assert_eq!(f.velocity, Vec2::ZERO);
        assert!(out.is_empty());
    }

    #[test]
    fn test_blocked_hit() {
        let config = SimConfig::default();
        let mut f = defender(&config);
        f.focus = 50.0;
        let mut out = Vec::new();
        let hit = Hit {
            payload: payload(100.0),
            from_x: Some(600.0),
        };

        let outcome = f.take_hit(&hit, true, &config, 1.0, &mut out);
        assert!(outcome.blocked);
        assert!((f.health - 965.0).abs() < 1e-3);
        // Pushed left (attacker on the right), only a fraction of knockback
        assert!(f.velocity.x < 0.0);
        assert!((f.velocity.x - (-500.0 * 0.28 * 0.15)).abs() < 1e-3);
        assert!((f.hitstun - 0.3 * 0.55).abs() < 1e-5);
        // Focus: -35*0.08 guard cost, +35*0.055 taken
        let expected = 50.0 - 35.0 * 0.08 + 35.0 * 0.055;
        assert!((f.focus - expected).abs() < 1e-3);
        assert!(out.contains(&FighterCommand::Sound(SoundCue::Block)));
    }

    #[test]
    fn test_guard_needs_focus() {
        let config = SimConfig::default();
        assert!(!is_blocking(true, 0.5, &config.guard));
        assert!(is_blocking(true, 0.51, &config.guard));
        assert!(!is_blocking(false, 100.0, &config.guard));
    }

    #[test]
    fn test_knockback_without_origin() {
        assert_eq!(knockback_direction(100.0, None, 1.0), -1.0);
        assert_eq!(knockback_direction(100.0, None, -1.0), 1.0);
        assert_eq!(knockback_direction(100.0, Some(50.0), -1.0), 1.0);
    }

    #[test]
    fn test_charm_confuses() {
        let config = SimConfig::default();
        let mut f = defender(&config);
        let mut out = Vec::new();
        let mut p = payload(60.0);
        p.on_hit = Some(OnHitEffect::Charm);

        f.take_hit(&Hit { payload: p, from_x: Some(0.0) }, false, &config, 1.0, &mut out);
        assert_eq!(f.status.remaining(StatusEffect::Confused), 0.9);
        assert!(out.iter().any(|c| matches!(c, FighterCommand::Announce { text, .. } if text.contains("Confused"))));
    }

    #[test]
    fn test_storm_chills() {
        let config = SimConfig::default();
        let mut f = defender(&config);
        let mut out = Vec::new();
        let storm = roster::character("pillmore").moves.ultimate.clone().unwrap();

        f.take_hit(&Hit { payload: storm.payload(), from_x: Some(0.0) }, false, &config, 1.0, &mut out);
        assert_eq!(f.status.remaining(StatusEffect::Chilled), 1.2);
        assert!(!f.status.is_active(StatusEffect::Confused));
    }

    #[test]
    fn test_ko_and_damage_scale() {
        let config = SimConfig::default();
        let mut f = defender(&config);
        let mut out = Vec::new();
        f.health = 50.0;

        let outcome = f.take_hit(&Hit { payload: payload(40.0), from_x: None }, false, &config, 2.0, &mut out);
        assert!(outcome.knocked_out);
        assert_eq!(f.health, 0.0);
        assert_eq!(outcome.health_lost, 50.0);
        assert!(f.dead);

        // Dead fighters ignore further hits
        f.iframes = 0.0;
        let again = f.take_hit(&Hit { payload: payload(40.0), from_x: None }, false, &config, 1.0, &mut out);
        assert_eq!(again, HitOutcome::IGNORED);
    }

    proptest! {
        #[test]
        fn prop_block_scaling(
            damage in 0.0f32..500.0,
            hitstun in 0.0f32..1.0,
            kx in -1000.0f32..1000.0,
            ky in -1000.0f32..1000.0,
        ) {
            let guard = GuardConfig::default();
            let p = HitPayload { damage, hitstun, knockback: Vec2::new(kx, ky), on_hit: None };
            let clean = resolve_hit(&p, false, &guard);
            let blocked = resolve_hit(&p, true, &guard);
            prop_assert!(blocked.damage <= clean.damage * 0.35 + 1e-3);
            prop_assert!(blocked.hitstun <= clean.hitstun * 0.55 + 1e-6);
            prop_assert!(blocked.knockback.x.abs() <= clean.knockback.x.abs());
        }

        #[test]
        fn prop_iframes_immunity(
            damage in 0.0f32..2000.0,
            iframes in 0.001f32..0.5,
            guard_held: bool,
        ) {
            let config = SimConfig::default();
            let mut f = defender(&config);
            f.iframes = iframes;
            f.focus = 40.0;
            let mut out = Vec::new();
            let outcome = f.take_hit(&Hit { payload: payload(damage), from_x: Some(0.0) }, guard_held, &config, 1.0, &mut out);
            prop_assert!(!outcome.landed);
            prop_assert_eq!(f.health, 1000.0);
            prop_assert_eq!(f.velocity, Vec2::ZERO);
            prop_assert_eq!(f.focus, 40.0);
        }

        #[test]
        fn prop_health_and_focus_bounded(
            hits in proptest::collection::vec((0.0f32..600.0, any::<bool>()), 1..30),
            scale in 0.0f32..3.0,
        ) {
            let config = SimConfig::default();
            let mut f = defender(&config);
            f.focus = 60.0;
            let mut out = Vec::new();
            for (damage, guard) in hits {
                f.iframes = 0.0;
                f.take_hit(&Hit { payload: payload(damage), from_x: None }, guard, &config, scale, &mut out);
                prop_assert!(f.health >= 0.0 && f.health <= f.max_health);
                prop_assert!(f.focus >= 0.0 && f.focus <= f.focus_max);
            }
        }
    }
}
