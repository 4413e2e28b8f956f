//! Scalar Math and Rectangles
//!
//! Small helpers shared by the fighter, projectile and orchestrator code.
//!
//! ## Coordinate System
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  (0,0) ───────────────────────────────────────► +x          │
//! │    │                                                        │
//! │    │     Rect { x, y, w, h }: (x, y) is the TOP-LEFT corner │
//! │    │                                                        │
//! │    ▼ +y (down: gravity is positive, jumps are negative vy)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use serde::{Serialize, Deserialize};

use super::vec2::Vec2;

/// Clamp `v` into `[lo, hi]`.
///
/// Unlike `f32::clamp` this never panics when `lo > hi`; the lower bound wins,
/// matching how stage bounds behave on very narrow stages.
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(v))
}

/// Linear interpolation. `t = 0` returns `a`, `t = 1` returns `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign of `v` as -1, 0 or +1.
#[inline]
pub fn sign(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else if v > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Move `current` toward zero by multiplying with `factor`, snapping to exactly
/// zero once the magnitude drops below `threshold`.
#[inline]
pub fn decay_toward_zero(current: f32, factor: f32, threshold: f32) -> f32 {
    let next = current * factor;
    if next.abs() < threshold {
        0.0
    } else {
        next
    }
}

/// Countdown helper: subtract `dt`, floored at zero.
#[inline]
pub fn tick_down(timer: f32, dt: f32) -> f32 {
    if timer > 0.0 {
        (timer - dt).max(0.0)
    } else {
        0.0
    }
}

// =============================================================================
// RECT
// =============================================================================

/// Axis-aligned rectangle (top-left origin).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square bounding box around a circle.
    #[inline]
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap test. Touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Does the horizontal span `[x, x + w)` overlap this rectangle's span?
    #[inline]
    pub fn overlaps_span(&self, x: f32, w: f32) -> bool {
        x + w > self.x && x < self.right()
    }

    /// Mirror a box given relative to a right-facing owner of width `owner_w`
    /// so that it sits on the owner's left side instead.
    #[inline]
    pub fn mirrored_in(&self, owner_w: f32) -> Rect {
        Rect::new(owner_w - self.x - self.w, self.y, self.w, self.h)
    }

    /// Translate by an offset.
    #[inline]
    pub fn offset(&self, by: Vec2) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }
}

/// Free-function form of [`Rect::overlaps`].
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}

// =============================================================================
// TESTS
// =============================================================================
