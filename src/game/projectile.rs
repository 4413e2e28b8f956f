//! Projectiles and Beams
//!
//! Projectiles are small circles that fly, optionally fall, bounce on the
//! ground slab, or home back to their owner. Beams are static rectangles that
//! live for a few frames.
//!
//! Owners are referenced by [`PlayerId`] only. The match loop looks the owner
//! up when a boomerang needs a return target and passes `None` if there is
//! nobody to return to.

use serde::{Serialize, Deserialize};

use crate::core::math::Rect;
use crate::core::vec2::Vec2;
use crate::game::combat::Hit;
use crate::game::fighter::Fighter;
use crate::game::moves::{BeamParams, HitPayload, ProjectileSpawn, ProjectileStyle};
use crate::game::stage::Platform;
use crate::game::state::PlayerId;

/// A returning boomerang vanishes this close to its owner.
pub const RETURN_CATCH_RADIUS: f32 = 26.0;
/// Return speed when the boomerang has come to rest.
const RETURN_FALLBACK_SPEED: f32 = 700.0;
/// Share of vertical speed kept on a bounce.
const BOUNCE_RESTITUTION: f32 = 0.6;
/// Share of horizontal speed kept on a bounce.
const BOUNCE_FRICTION: f32 = 0.85;
/// Fan members with gravity get this much of their launch speed upward.
const LOB_FACTOR: f32 = -0.35;

// =============================================================================
// PROJECTILE
// =============================================================================

/// A flying projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Who fired it
    pub owner: PlayerId,
    /// Renderer label
    pub style: ProjectileStyle,
    /// Center
    pub position: Vec2,
    /// Velocity
    pub velocity: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Lifetime
    pub life: f32,
    /// Age
    pub age: f32,
    /// Downward acceleration
    pub gravity: f32,
    /// Bounces left
    pub bounces: u32,
    /// Boomerang turn-around time
    pub return_after: Option<f32>,
    /// Boomerang is heading home
    pub returning: bool,
    /// What it does on contact
    pub payload: HitPayload,
    /// Already connected
    pub has_hit: bool,
    /// Remove at end of tick
    pub dead: bool,
}

impl Projectile {
    /// Build the fan of projectiles one shot produces.
    ///
    /// Members are spread by `spread` radians around the facing direction.
    pub fn fan(
        owner: PlayerId,
        origin: Vec2,
        facing: f32,
        spawn: &ProjectileSpawn,
        return_after: Option<f32>,
        payload: HitPayload,
    ) -> Vec<Projectile> {
        let multi = spawn.multi.max(1);
        let lob = if spawn.gravity != 0.0 { LOB_FACTOR } else { 0.0 };
        (0..multi)
            .map(|i| {
                let angle = (i as f32 - (multi - 1) as f32 / 2.0) * spawn.spread;
                Projectile {
                    owner,
                    style: spawn.style,
                    position: origin,
                    velocity: Vec2::new(
                        angle.cos() * spawn.speed * facing,
                        angle.sin() * spawn.speed * lob,
                    ),
                    radius: spawn.radius,
                    life: spawn.life,
                    age: 0.0,
                    gravity: spawn.gravity,
                    bounces: spawn.bounces,
                    return_after,
                    returning: false,
                    payload,
                    has_hit: false,
                    dead: false,
                }
            })
            .collect()
    }

    /// Collision box.
    #[inline]
    pub fn aabb(&self) -> Rect {
        Rect::around_circle(self.position, self.radius)
    }

    /// Advance one tick.
    ///
    /// `owner_anchor` is where a returning boomerang aims. Returns the bounce
    /// point if the projectile bounced this tick.
    pub fn update(&mut self, dt: f32, owner_anchor: Option<Vec2>, ground: Option<&Platform>) -> Option<Vec2> {
        self.age += dt;
        if self.age >= self.life {
            self.dead = true;
        }
        if self.dead {
            return None;
        }

        if let Some(after) = self.return_after {
            if !self.returning && self.age >= after {
                self.returning = true;
            }
        }

        if self.returning {
            if let Some(target) = owner_anchor {
                let to_owner = target - self.position;
                let len = to_owner.length();
                let len = if len > 0.0 { len } else { 1.0 };
                let speed = self.velocity.length();
                let speed = if speed > 0.0 { speed } else { RETURN_FALLBACK_SPEED };
                self.velocity = to_owner * (speed / len);
                if len < RETURN_CATCH_RADIUS {
                    self.dead = true;
                }
            }
        }

        self.velocity.y += self.gravity * dt;
        self.position += self.velocity * dt;

        if self.bounces > 0 {
            if let Some(ground) = ground {
                if self.position.y + self.radius > ground.top() {
                    self.position.y = ground.top() - self.radius;
                    self.velocity.y = -self.velocity.y.abs() * BOUNCE_RESTITUTION;
                    self.velocity.x *= BOUNCE_FRICTION;
                    self.bounces -= 1;
                    return Some(Vec2::new(self.position.x, self.position.y + self.radius));
                }
            }
        }
        None
    }

    /// Test against the opposing fighter. Hits at most once, then dies.
    pub fn try_hit(&mut self, target: &Fighter) -> Option<Hit> {
        if self.dead || self.has_hit || target.dead || target.id == self.owner {
            return None;
        }
        if !self.aabb().overlaps(&target.hurtbox()) {
            return None;
        }

        self.has_hit = true;
        self.dead = true;
        Some(Hit {
            payload: self.payload,
            from_x: Some(self.position.x),
        })
    }
}

// =============================================================================
// BEAM
// =============================================================================

/// A short-lived damaging rectangle.
///
/// Beams have no hit-once flag: they re-apply on every overlapping tick and
/// are only held back by the target's iFrames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Caster
    pub owner: PlayerId,
    /// Area
    pub rect: Rect,
    /// Caster-side x, used as the knockback origin
    pub origin_x: f32,
    /// Age
    pub age: f32,
    /// Lifetime
    pub life: f32,
    /// What it does on contact
    pub payload: HitPayload,
}

impl Beam {
    /// Lay a beam out from `origin` in the facing direction.
    pub fn new(owner: PlayerId, origin: Vec2, facing: f32, params: &BeamParams, payload: HitPayload) -> Self {
        let x = if facing > 0.0 { origin.x } else { origin.x - params.length };
        Self {
            owner,
            rect: Rect::new(x, origin.y - params.thickness / 2.0, params.length, params.thickness),
            origin_x: origin.x,
            age: 0.0,
            life: params.life,
            payload,
        }
    }

    /// Advance one tick.
    #[inline]
    pub fn update(&mut self, dt: f32) {
        self.age += dt;
    }

    /// Can still deal damage.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.age <= self.life
    }

    /// Should be removed.
    ///
    /// Overlaps [`Beam::is_live`] at `age == life`: the beam gets its last
    /// hit check on that tick and is removed right after.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.life
    }

    /// Test against the opposing fighter.
    pub fn try_hit(&self, target: &Fighter) -> Option<Hit> {
        if !self.is_live() || target.dead || target.iframes > 0.0 || target.id == self.owner {
            return None;
        }
        if !self.rect.overlaps(&target.hurtbox()) {
            return None;
        }
        Some(Hit {
            payload: self.payload,
            from_x: Some(self.origin_x),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
