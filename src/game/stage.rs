//! Stage Layout
//!
//! Stages are static geometry: one solid ground slab shared by every stage,
//! a handful of one-way platforms, and two spawn points.
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────┐
//!   │        P1 spawn                     P2 spawn         │
//!   │            ▼        ═══════            ▼             │  ═ one-way
//!   │                 ═══════      ═══════                 │
//!   │     ██████████████████████████████████████████       │  █ ground
//!   └──────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::core::math::Rect;
use crate::core::vec2::Vec2;

/// Stage identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum StageId {
    /// Rooftop with two staggered platforms
    #[default]
    Rooftop,
    /// Alley with two shelves
    Pharmacy,
    /// Lab with three catwalks
    Lab,
}

impl StageId {
    /// All stages.
    pub const ALL: [StageId; 3] = [StageId::Rooftop, StageId::Pharmacy, StageId::Lab];

    /// Lenient lookup: unknown ids fall back to the rooftop.
    pub fn from_id(id: &str) -> Self {
        id.parse().unwrap_or_default()
    }

    /// Lowercase id.
    pub fn as_str(self) -> &'static str {
        match self {
            StageId::Rooftop => "rooftop",
            StageId::Pharmacy => "pharmacy",
            StageId::Lab => "lab",
        }
    }
}

impl FromStr for StageId {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rooftop" => Ok(StageId::Rooftop),
            "pharmacy" => Ok(StageId::Pharmacy),
            "lab" => Ok(StageId::Lab),
            _ => Err(UnknownStage(s.to_string())),
        }
    }
}

impl From<String> for StageId {
    fn from(id: String) -> Self {
        StageId::from_id(&id)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse failure for [`StageId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage `{0}`")]
pub struct UnknownStage(pub String);

/// Label used by renderers and by projectile bounce lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Main floor
    Ground,
    /// Generic ledge
    Platform,
    /// Pharmacy shelf
    Shelf,
    /// Lab catwalk
    Catwalk,
}

/// One axis-aligned platform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Bounds
    pub rect: Rect,
    /// Only collides from above while falling
    pub one_way: bool,
    /// Label
    pub kind: PlatformKind,
}

impl Platform {
    /// Solid platform.
    pub const fn solid(x: f32, y: f32, w: f32, h: f32, kind: PlatformKind) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            one_way: false,
            kind,
        }
    }

    /// One-way platform.
    pub const fn one_way(x: f32, y: f32, w: f32, h: f32, kind: PlatformKind) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            one_way: true,
            kind,
        }
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f32 {
        self.rect.y
    }
}

/// Static stage geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Identifier
    pub id: StageId,
    /// Display name
    pub name: String,
    /// Platforms, ground first
    pub platforms: Vec<Platform>,
    /// Player 1 and player 2 spawn (top-left of the body)
    pub spawns: [Vec2; 2],
}

const GROUND: Platform = Platform::solid(80.0, 430.0, 800.0, 40.0, PlatformKind::Ground);

impl Stage {
    /// Build a stage.
    pub fn by_id(id: StageId) -> Self {
        match id {
            StageId::Rooftop => Self {
                id,
                name: "Tri-State Rooftop".to_string(),
                platforms: vec![
                    GROUND,
                    Platform::one_way(240.0, 330.0, 220.0, 16.0, PlatformKind::Platform),
                    Platform::one_way(520.0, 300.0, 200.0, 16.0, PlatformKind::Platform),
                ],
                spawns: [Vec2::new(260.0, 200.0), Vec2::new(640.0, 200.0)],
            },
            StageId::Pharmacy => Self {
                id,
                name: "Back Alley Pharmacy".to_string(),
                platforms: vec![
                    GROUND,
                    Platform::one_way(190.0, 320.0, 200.0, 16.0, PlatformKind::Shelf),
                    Platform::one_way(570.0, 350.0, 190.0, 16.0, PlatformKind::Shelf),
                ],
                spawns: [Vec2::new(250.0, 200.0), Vec2::new(650.0, 200.0)],
            },
            StageId::Lab => Self {
                id,
                name: "Not-So-Evil Lab".to_string(),
                platforms: vec![
                    GROUND,
                    Platform::one_way(260.0, 340.0, 180.0, 16.0, PlatformKind::Catwalk),
                    Platform::one_way(520.0, 340.0, 180.0, 16.0, PlatformKind::Catwalk),
                    Platform::one_way(410.0, 270.0, 140.0, 16.0, PlatformKind::Catwalk),
                ],
                spawns: [Vec2::new(230.0, 200.0), Vec2::new(690.0, 200.0)],
            },
        }
    }

    /// The solid ground slab used for projectile bounces.
    pub fn ground(&self) -> Option<&Platform> {
        self.platforms
            .iter()
            .find(|p| !p.one_way && p.kind == PlatformKind::Ground)
    }
}

// =============================================================================
// TESTS
// =============================================================================
