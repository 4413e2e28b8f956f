//! Game Logic Module
//!
//! All match simulation code.
//!
//! ## Module Structure
//!
//! - `input`: Held buttons, action vectors, edge detection
//! - `moves`: Move definitions (timing, payload kinds)
//! - `roster`: The six characters and their move tables
//! - `stage`: Stage geometry and spawns
//! - `fighter`: Fighter entity and per-tick state machine
//! - `physics`: Movement integration and platform landing
//! - `combat`: Hit resolution (guard, damage, knockback, status)
//! - `projectile`: Projectiles and beams
//! - `effects`: Particles, camera shake, announcer
//! - `events`: Presentation events
//! - `state`: Match state and round transitions
//! - `tick`: Authoritative simulation loop
//! - `cpu`: Input sources (local and CPU)
//! - `session`: Fixed-step driver

pub mod input;
pub mod moves;
pub mod roster;
pub mod stage;
pub mod fighter;
pub mod physics;
pub mod combat;
pub mod projectile;
pub mod effects;
pub mod events;
pub mod state;
pub mod tick;
pub mod cpu;
pub mod session;

// Re-export key types
pub use input::{ActionVector, Buttons, EdgeDetector};
pub use fighter::{ActionError, Fighter, FighterState, StatusEffect};
pub use state::{MatchState, MatchPhase, PlayerId};
pub use tick::{tick, TickResult};
pub use cpu::{CpuController, Difficulty, InputSource, LocalInput};
pub use session::{FixedStepper, Match};
pub use events::{GameEvent, GameEventData};
