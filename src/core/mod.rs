//! Core primitives.
//!
//! Math helpers, the 2D vector and the seedable RNG. Nothing in here knows
//! about fighters or matches.

pub mod math;
pub mod vec2;
pub mod rng;

// Re-export core types
pub use math::{Rect, clamp, lerp, sign, rects_overlap};
pub use vec2::Vec2;
pub use rng::DeterministicRng;
