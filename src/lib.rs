//! # Scuffle Simulation Core
//!
//! Fixed-timestep simulation for a two-player platform fighter: fighter
//! state machines, combat resolution and the round/match lifecycle.
//! Rendering, audio and menus live outside this crate and consume the
//! [`game::GameEvent`] stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SCUFFLE SIM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── math.rs     - clamp / lerp / sign, Rect                 │
//! │  ├── vec2.rs     - 2D vector                                 │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │                                                              │
//! │  config.rs       - SimConfig + MatchRules (serde, validated) │
//! │                                                              │
//! │  game/           - Match simulation                          │
//! │  ├── input.rs    - Action vectors and edge detection         │
//! │  ├── moves.rs    - Move definitions                          │
//! │  ├── roster.rs   - Characters                                │
//! │  ├── stage.rs    - Platforms and spawns                      │
//! │  ├── fighter.rs  - Fighter state machine                     │
//! │  ├── physics.rs  - Movement and landing                      │
//! │  ├── combat.rs   - Hit resolution                            │
//! │  ├── projectile.rs - Projectiles and beams                   │
//! │  ├── effects.rs  - Particles, shake, announcer               │
//! │  ├── events.rs   - Presentation events                       │
//! │  ├── state.rs    - Match state, round transitions            │
//! │  ├── tick.rs     - Authoritative simulation loop             │
//! │  ├── cpu.rs      - Local and CPU input sources               │
//! │  └── session.rs  - Fixed-step driver, pause, rematch         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Given the same rules (seed included) and the same held-button stream,
//! a match plays out identically on the same build. All randomness comes
//! from the seeded [`DeterministicRng`]. There is no guarantee across
//! machines: the simulation uses `f32`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod game;

// Re-export commonly used types
pub use core::vec2::Vec2;
pub use core::rng::DeterministicRng;
pub use config::{ConfigError, MatchRules, SimConfig};
pub use game::session::Match;
pub use game::state::{MatchState, PlayerId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Seconds per tick
pub const TICK_DT: f32 = 1.0 / TICK_RATE as f32;
