//! Cosmetic Effects
//!
//! Particles, camera shake and the announcer banner. None of this feeds back
//! into combat; it only exists so a renderer has something to draw. Random
//! spread comes from the match RNG so a seeded run stays reproducible.

use serde::{Serialize, Deserialize};

use crate::core::math::{lerp, tick_down};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;

// =============================================================================
// PARTICLES
// =============================================================================

/// What a particle looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    /// Small fast spark
    Spark,
    /// Slow rising puff
    Smoke,
    /// Floating heart
    Heart,
}

/// Color family for a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tint {
    /// Neutral white
    White,
    /// Guard / projectile blue
    Blue,
    /// Beam / charm pink
    Pink,
}

/// A single cosmetic particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Look
    pub kind: ParticleKind,
    /// Color family
    pub tint: Tint,
    /// Position
    pub position: Vec2,
    /// Velocity
    pub velocity: Vec2,
    /// Vertical acceleration
    pub gravity: f32,
    /// Per-update velocity multiplier
    pub drag: f32,
    /// Lifetime
    pub life: f32,
    /// Age
    pub age: f32,
    /// Draw radius
    pub radius: f32,
    /// Peak opacity
    pub alpha: f32,
    /// Expired
    pub dead: bool,
}

impl Particle {
    /// Advance by `dt`.
    pub fn update(&mut self, dt: f32) {
        self.age += dt;
        if self.age >= self.life {
            self.dead = true;
        }
        if self.dead {
            return;
        }

        self.velocity.y += self.gravity * dt;
        self.position += self.velocity * dt;
        self.velocity = self.velocity * self.drag;
    }
}

/// Advance every particle and drop the expired ones.
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for p in particles.iter_mut() {
        p.update(dt);
    }
    particles.retain(|p| !p.dead);
}

/// Burst of sparks in every direction.
pub fn spawn_sparks(rng: &mut DeterministicRng, at: Vec2, count: u32, tint: Tint, out: &mut Vec<Particle>) {
    for _ in 0..count {
        let dir = rng.random_direction();
        let speed = rng.next_f32_range(120.0, 440.0);
        out.push(Particle {
            kind: ParticleKind::Spark,
            tint,
            position: at,
            velocity: dir * speed,
            gravity: 420.0,
            drag: 0.92,
            life: rng.next_f32_range(0.28, 0.46),
            age: 0.0,
            radius: rng.next_f32_range(2.0, 4.5),
            alpha: 0.95,
            dead: false,
        });
    }
}

/// Upward-biased smoke puff.
pub fn spawn_smoke(rng: &mut DeterministicRng, at: Vec2, count: u32, out: &mut Vec<Particle>) {
    use std::f32::consts::PI;
    for _ in 0..count {
        let angle = -PI / 2.0 + (rng.next_f32() - 0.5) * PI;
        let speed = rng.next_f32_range(60.0, 180.0);
        let mut velocity = Vec2::from_angle(angle) * speed;
        velocity.y -= 40.0;
        out.push(Particle {
            kind: ParticleKind::Smoke,
            tint: Tint::White,
            position: at,
            velocity,
            gravity: -40.0,
            drag: 0.95,
            life: rng.next_f32_range(0.46, 0.68),
            age: 0.0,
            radius: rng.next_f32_range(6.0, 16.0),
            alpha: 0.8,
            dead: false,
        });
    }
}

/// Floating hearts (charm hits).
pub fn spawn_hearts(rng: &mut DeterministicRng, at: Vec2, count: u32, out: &mut Vec<Particle>) {
    use std::f32::consts::PI;
    const TINTS: [Tint; 3] = [Tint::Pink, Tint::Pink, Tint::Blue];
    for _ in 0..count {
        let angle = -PI / 2.0 + (rng.next_f32() - 0.5) * 1.4;
        let speed = rng.next_f32_range(80.0, 240.0);
        let jitter = Vec2::new((rng.next_f32() - 0.5) * 18.0, (rng.next_f32() - 0.5) * 10.0);
        out.push(Particle {
            kind: ParticleKind::Heart,
            tint: rng.choose(&TINTS).copied().unwrap_or(Tint::Pink),
            position: at + jitter,
            velocity: Vec2::from_angle(angle) * speed,
            gravity: 120.0,
            drag: 0.93,
            life: rng.next_f32_range(0.62, 0.97),
            age: 0.0,
            radius: rng.next_f32_range(4.0, 9.0),
            alpha: 0.9,
            dead: false,
        });
    }
}

// =============================================================================
// CAMERA SHAKE
// =============================================================================

/// Decaying camera shake.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraShake {
    /// Seconds of shake left
    pub time: f32,
    /// Current magnitude
    pub magnitude: f32,
}

impl CameraShake {
    /// Start or extend a shake. Never shortens or weakens one in progress.
    pub fn kick(&mut self, time: f32, magnitude: f32) {
        self.time = self.time.max(time);
        self.magnitude = self.magnitude.max(magnitude);
    }

    /// Advance by `dt`; magnitude eases toward zero while active.
    pub fn update(&mut self, dt: f32) {
        if self.is_active() {
            self.time = tick_down(self.time, dt);
            self.magnitude = lerp(self.magnitude, 0.0, 0.2);
        }
    }

    /// Is the camera shaking?
    pub fn is_active(&self) -> bool {
        self.time > 0.0
    }

    /// Stop shaking.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// ANNOUNCER
// =============================================================================

/// Timed banner text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Announcer {
    /// Current text
    pub text: String,
    /// Seconds left
    pub remaining: f32,
}

impl Announcer {
    /// Replace the banner.
    pub fn announce(&mut self, text: impl Into<String>, duration: f32) {
        self.text = text.into();
        self.remaining = duration;
    }

    /// Count down. Returns true on the update where the banner expires.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.is_showing() {
            self.remaining = tick_down(self.remaining, dt);
            return self.remaining == 0.0;
        }
        false
    }

    /// Is a banner showing?
    pub fn is_showing(&self) -> bool {
        self.remaining > 0.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
