//! Move Definitions
//!
//! Static, shared move data. A move is a timing triple plus a payload whose
//! shape depends on its kind, so each variant of [`MoveKind`] carries only the
//! fields that kind uses.
//!
//! ```text
//!  elapsed ─►  0 ──── startup ──── startup+active ──── total
//!              │ wind-up │   ACTIVE window   │ recovery │
//!              └─────────┴───────────────────┴──────────┘
//!                         ▲ payload spawns on the first tick here
//! ```

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::math::Rect;
use crate::core::vec2::Vec2;
use crate::game::events::SoundCue;

// =============================================================================
// SLOTS
// =============================================================================

/// The four named move slots every character has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveSlot {
    /// Fast poke
    Light,
    /// Slow, strong melee
    Heavy,
    /// Focus-gated signature move
    Special,
    /// Full-focus super
    Ultimate,
}

impl MoveSlot {
    /// All slots in table order.
    pub const ALL: [MoveSlot; 4] = [
        MoveSlot::Light,
        MoveSlot::Heavy,
        MoveSlot::Special,
        MoveSlot::Ultimate,
    ];
}

impl fmt::Display for MoveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveSlot::Light => "light",
            MoveSlot::Heavy => "heavy",
            MoveSlot::Special => "special",
            MoveSlot::Ultimate => "ultimate",
        };
        f.write_str(name)
    }
}

// =============================================================================
// TIMING
// =============================================================================

/// Startup / active / recovery durations in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Wind-up before anything happens
    pub startup: f32,
    /// Window in which hitboxes and dashes apply
    pub active: f32,
    /// Lockout after the active window
    pub recovery: f32,
}

impl Timing {
    /// Create a timing triple.
    pub const fn new(startup: f32, active: f32, recovery: f32) -> Self {
        Self {
            startup,
            active,
            recovery,
        }
    }

    /// Total duration.
    #[inline]
    pub fn total(&self) -> f32 {
        self.startup + self.active + self.recovery
    }

    /// Is `t` inside the closed active window `[startup, startup + active]`?
    #[inline]
    pub fn is_active(&self, t: f32) -> bool {
        t >= self.startup && t <= self.startup + self.active
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// Status effect a projectile applies on hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnHitEffect {
    /// Swaps the target's left/right
    Charm,
    /// Slows the target's movement
    Chill,
}

/// Visual style label handed through to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectileStyle {
    /// Plain orb
    #[default]
    Orb,
    /// Pill capsule
    Capsule,
    /// Storm cloud
    Storm,
    /// Paper plan
    Plan,
    /// Heart
    Heart,
}

/// Forward burst applied during the active window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashParams {
    /// Horizontal speed along facing
    pub speed: f32,
    /// Clamp vy to <= 0 (stay grounded)
    pub lock_y: bool,
    /// Clamp vy to <= this (negative = rise)
    pub up_boost: Option<f32>,
}

/// Projectile spawn description.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpawn {
    /// Renderer label
    pub style: ProjectileStyle,
    /// Launch speed
    pub speed: f32,
    /// Collision radius
    pub radius: f32,
    /// Lifetime in seconds
    pub life: f32,
    /// Downward acceleration (0 = straight line)
    pub gravity: f32,
    /// Ground bounces before it stops bouncing
    pub bounces: u32,
    /// Number of projectiles in the fan
    pub multi: u32,
    /// Angle between fan members (radians)
    pub spread: f32,
    /// Status effect applied on hit
    pub on_hit: Option<OnHitEffect>,
}

impl ProjectileSpawn {
    /// Straight single shot.
    pub const fn straight(style: ProjectileStyle, speed: f32, radius: f32, life: f32) -> Self {
        Self {
            style,
            speed,
            radius,
            life,
            gravity: 0.0,
            bounces: 0,
            multi: 1,
            spread: 0.0,
            on_hit: None,
        }
    }
}

/// Static beam rectangle description.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeamParams {
    /// Horizontal reach
    pub length: f32,
    /// Vertical thickness
    pub thickness: f32,
    /// Lifetime in seconds
    pub life: f32,
}

/// What a move does once its startup has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MoveKind {
    /// Hitbox in the active window
    Melee {
        /// Hitbox relative to a right-facing body
        hitbox: Rect,
    },
    /// Hitbox plus a forward burst
    Dash {
        /// Hitbox relative to a right-facing body
        hitbox: Rect,
        /// Burst parameters
        dash: DashParams,
    },
    /// Fires a fan of projectiles
    Projectile {
        /// Spawn description
        spawn: ProjectileSpawn,
    },
    /// Fires a projectile that homes back to its owner
    Boomerang {
        /// Spawn description
        spawn: ProjectileSpawn,
        /// Seconds before it turns around
        return_after: f32,
    },
    /// Creates a short-lived rectangle in front of the caster
    Beam {
        /// Beam geometry
        beam: BeamParams,
    },
    /// Relocates the caster forward
    Teleport {
        /// Forward distance
        distance: f32,
    },
}

impl MoveKind {
    /// Melee hitbox, if the kind has one.
    pub fn hitbox(&self) -> Option<Rect> {
        match self {
            MoveKind::Melee { hitbox } | MoveKind::Dash { hitbox, .. } => Some(*hitbox),
            _ => None,
        }
    }

    /// Dash burst, if the kind has one.
    pub fn dash(&self) -> Option<&DashParams> {
        match self {
            MoveKind::Dash { dash, .. } => Some(dash),
            _ => None,
        }
    }

    /// Does the kind spawn something at the start of its active window?
    pub fn spawns_payload(&self) -> bool {
        matches!(
            self,
            MoveKind::Projectile { .. }
                | MoveKind::Boomerang { .. }
                | MoveKind::Beam { .. }
                | MoveKind::Teleport { .. }
        )
    }
}

// =============================================================================
// MOVE DEFINITION
// =============================================================================

/// Damage, stun and knockback delivered by a hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitPayload {
    /// Raw damage before blocking and damage scale
    pub damage: f32,
    /// Hitstun in seconds
    pub hitstun: f32,
    /// Knockback (x is magnitude away from the attacker, y is signed)
    pub knockback: Vec2,
    /// Status effect applied on landing
    pub on_hit: Option<OnHitEffect>,
}

/// A complete move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveDef {
    /// Display name
    pub name: String,
    /// Kind + payload
    #[serde(flatten)]
    pub kind: MoveKind,
    /// Startup / active / recovery
    pub timing: Timing,
    /// Raw damage
    pub damage: f32,
    /// Hitstun in seconds
    pub hitstun: f32,
    /// Knockback vector
    pub knockback: Vec2,
    /// Focus spent on commit
    pub focus_cost: Option<f32>,
    /// Sound played on commit
    pub sound: SoundCue,
}

impl MoveDef {
    /// The hit this move's melee/beam/projectile payload carries.
    pub fn payload(&self) -> HitPayload {
        let on_hit = match &self.kind {
            MoveKind::Projectile { spawn } | MoveKind::Boomerang { spawn, .. } => spawn.on_hit,
            _ => None,
        };
        HitPayload {
            damage: self.damage,
            hitstun: self.hitstun,
            knockback: self.knockback,
            on_hit,
        }
    }

    /// Does this move have a melee hit check?
    pub fn has_melee_check(&self) -> bool {
        self.damage > 0.0 && self.kind.hitbox().is_some()
    }
}

// =============================================================================
// TESTS
// =============================================================================
