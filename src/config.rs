//! Simulation Configuration
//!
//! Every tunable number the simulation reads lives here, injected at match
//! construction. There is no global mutable state: the orchestrator owns one
//! `Arc<SimConfig>` and hands `&SimConfig` to fighters and projectiles.
//!
//! Both [`SimConfig`] and [`MatchRules`] deserialize from partial JSON; any
//! field left out keeps its default.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::cpu::Difficulty;
use crate::game::stage::StageId;

// =============================================================================
// ERRORS
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// Human-readable constraint
        reason: String,
    },
}

fn require(ok: bool, field: &'static str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        })
    }
}

// =============================================================================
// WORLD
// =============================================================================

/// Stage-independent world dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Playfield width
    pub width: f32,
    /// Playfield height
    pub height: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Fighters are clamped this far inside the left/right edges
    pub edge_margin: f32,
    /// Teleports are clamped this far inside the left/right edges
    pub teleport_margin: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            gravity: 2400.0,
            edge_margin: 30.0,
            teleport_margin: 80.0,
        }
    }
}

// =============================================================================
// PHYSICS
// =============================================================================

/// Movement tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Grounded run speed
    pub move_speed: f32,
    /// Airborne drift speed
    pub air_move_speed: f32,
    /// Jump impulse (negative = up)
    pub jump_velocity: f32,
    /// Double-jump impulse (negative = up)
    pub double_jump_velocity: f32,
    /// Terminal fall speed
    pub max_fall: f32,
    /// Per-tick multiplier when grounded with no horizontal input
    pub ground_friction: f32,
    /// Per-tick multiplier when airborne with no horizontal input
    pub air_drag: f32,
    /// Per-tick multiplier on the ground while not in control
    pub locked_ground_damping: f32,
    /// Per-tick multiplier in the air while not in control
    pub locked_air_damping: f32,
    /// Blend factor toward target speed on the ground
    pub ground_blend: f32,
    /// Blend factor toward target speed in the air
    pub air_blend: f32,
    /// Speed multiplier while guarding or holding down
    pub slow_move_scale: f32,
    /// Horizontal speed below which friction snaps to zero
    pub stop_threshold: f32,
    /// Extra gravity fraction while fast-falling
    pub fast_fall_scale: f32,
    /// Seconds one-way platforms are ignored after a drop
    pub drop_through_time: f32,
    /// Fraction of fighter overlap resolved per tick
    pub push_out_strength: f32,
    /// Speed multiplier while chilled
    pub chill_speed_scale: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: 420.0,
            air_move_speed: 340.0,
            jump_velocity: -940.0,
            double_jump_velocity: -860.0,
            max_fall: 1200.0,
            ground_friction: 0.86,
            air_drag: 0.985,
            locked_ground_damping: 0.93,
            locked_air_damping: 0.985,
            ground_blend: 0.35,
            air_blend: 0.22,
            slow_move_scale: 0.55,
            stop_threshold: 8.0,
            fast_fall_scale: 0.35,
            drop_through_time: 0.22,
            push_out_strength: 0.8,
            chill_speed_scale: 0.6,
        }
    }
}

// =============================================================================
// COMBAT
// =============================================================================

/// Health, focus economy and hit-feel timings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Health at round start
    pub max_health: f32,
    /// Focus cap
    pub focus_max: f32,
    /// Attacker focus gained per point of damage dealt
    pub focus_from_damage_dealt: f32,
    /// Defender focus gained per point of damage taken
    pub focus_from_damage_taken: f32,
    /// Focus drained per second while guard is held
    pub focus_guard_drain_per_sec: f32,
    /// Focus regenerated per second while not guarding
    pub focus_regen_per_sec: f32,
    /// Default special cost when a move does not set one
    pub special_cost: f32,
    /// Default ultimate cost when a move does not set one
    pub ultimate_cost: f32,
    /// Global freeze applied on every landed hit
    pub hitstop: f32,
    /// Hit-flash duration
    pub hitflash: f32,
    /// Invulnerability granted after being hit
    pub iframes_on_hit: f32,
    /// Invulnerability granted by a teleport
    pub teleport_iframes: f32,
    /// Pause after a KO before the round resolves
    pub ko_freeze: f32,
    /// Pause after time runs out before the round resolves
    pub time_over_freeze: f32,
    /// Confused duration applied by a charm hit
    pub confuse_duration: f32,
    /// Chilled duration applied by a chill hit
    pub chill_duration: f32,
    /// Camera shake duration on impact
    pub shake_time: f32,
    /// Camera shake magnitude on impact
    pub shake_magnitude: f32,
    /// Particle time scale while hitstop is active
    pub hitstop_particle_scale: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_health: 1000.0,
            focus_max: 100.0,
            focus_from_damage_dealt: 0.035,
            focus_from_damage_taken: 0.055,
            focus_guard_drain_per_sec: 8.0,
            focus_regen_per_sec: 3.2,
            special_cost: 30.0,
            ultimate_cost: 100.0,
            hitstop: 0.055,
            hitflash: 0.11,
            iframes_on_hit: 0.22,
            teleport_iframes: 0.20,
            ko_freeze: 1.0,
            time_over_freeze: 0.7,
            confuse_duration: 0.9,
            chill_duration: 1.2,
            shake_time: 0.12,
            shake_magnitude: 8.0,
            hitstop_particle_scale: 0.35,
        }
    }
}

/// Blocking rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Guard only works while focus is strictly above this
    pub min_focus: f32,
    /// Damage multiplier on a blocked hit
    pub damage_scale: f32,
    /// Horizontal knockback multiplier on a blocked hit
    pub knockback_x_scale: f32,
    /// Vertical knockback multiplier on a blocked hit
    pub knockback_y_scale: f32,
    /// Hitstun multiplier on a blocked hit
    pub hitstun_scale: f32,
    /// Focus lost per point of (reduced) blocked damage
    pub focus_cost_per_damage: f32,
    /// Fraction of knockback added to velocity while blocking
    pub pushback_fraction: f32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_focus: 0.5,
            damage_scale: 0.35,
            knockback_x_scale: 0.28,
            knockback_y_scale: 0.25,
            hitstun_scale: 0.55,
            focus_cost_per_damage: 0.08,
            pushback_fraction: 0.15,
        }
    }
}

/// Fighter body dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Body width
    pub width: f32,
    /// Body height
    pub height: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            width: 54.0,
            height: 78.0,
        }
    }
}

// =============================================================================
// SIM CONFIG
// =============================================================================

/// All numeric constants, immutable for the lifetime of a match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World dimensions and gravity
    pub world: WorldConfig,
    /// Movement tuning
    pub physics: PhysicsConfig,
    /// Health / focus / hit feel
    pub combat: CombatConfig,
    /// Blocking rules
    pub guard: GuardConfig,
    /// Body size
    pub body: BodyConfig,
}

impl SimConfig {
    /// Parse from (possibly partial) JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that would break the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.world.width > 0.0, "world.width", "must be positive")?;
        require(self.world.height > 0.0, "world.height", "must be positive")?;
        require(self.world.gravity >= 0.0, "world.gravity", "must not be negative")?;
        require(self.body.width > 0.0, "body.width", "must be positive")?;
        require(self.body.height > 0.0, "body.height", "must be positive")?;
        require(
            self.world.width > 2.0 * self.world.edge_margin + self.body.width,
            "world.edge_margin",
            "leaves no room for a fighter",
        )?;
        require(self.combat.max_health > 0.0, "combat.max_health", "must be positive")?;
        require(self.combat.focus_max > 0.0, "combat.focus_max", "must be positive")?;
        require(
            (0.0..=1.0).contains(&self.physics.ground_blend)
                && (0.0..=1.0).contains(&self.physics.air_blend),
            "physics.ground_blend",
            "blend factors must be within 0..=1",
        )?;
        require(
            (0.0..=1.0).contains(&self.guard.damage_scale)
                && (0.0..=1.0).contains(&self.guard.hitstun_scale),
            "guard.damage_scale",
            "guard scales must be within 0..=1",
        )?;
        Ok(())
    }
}

// =============================================================================
// MATCH RULES
// =============================================================================

/// Who drives a side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Held buttons supplied by the embedding layer
    #[default]
    Human,
    /// Built-in CPU source
    Cpu,
}

/// Per-side setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideConfig {
    /// Character id (unknown ids fall back to the first roster entry)
    pub character: String,
    /// Input source
    pub controller: ControllerKind,
}

impl Default for SideConfig {
    fn default() -> Self {
        Self {
            character: "parry".to_string(),
            controller: ControllerKind::Human,
        }
    }
}

/// Per-match options chosen before the fight starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Stage
    pub stage: StageId,
    /// Player 1 side
    pub p1: SideConfig,
    /// Player 2 side
    pub p2: SideConfig,
    /// Best-of round count; rounds to win = ceil(best_of / 2)
    pub best_of: u32,
    /// Round timer in seconds; 0 disables the timer
    pub round_time: f32,
    /// Global damage multiplier (mutable mid-match)
    pub damage_scale: f32,
    /// Emit camera shake on impact
    pub screen_shake: bool,
    /// CPU difficulty (mutable mid-match)
    pub difficulty: Difficulty,
    /// Seed for CPU jitter and particles
    pub seed: u64,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            stage: StageId::Rooftop,
            p1: SideConfig::default(),
            p2: SideConfig {
                character: "pillmore".to_string(),
                controller: ControllerKind::Cpu,
            },
            best_of: 3,
            round_time: 99.0,
            damage_scale: 1.0,
            screen_shake: true,
            difficulty: Difficulty::Normal,
            seed: 0x5C0F_F1E,
        }
    }
}

impl MatchRules {
    /// Training preset: human vs CPU, no timer, single round.
    pub fn training() -> Self {
        Self {
            best_of: 1,
            round_time: 0.0,
            damage_scale: 1.0,
            stage: StageId::Rooftop,
            ..Self::default()
        }
    }

    /// Parse from (possibly partial) JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Rounds needed to take the match.
    pub fn rounds_to_win(&self) -> u32 {
        self.best_of.div_ceil(2).max(1)
    }

    /// Check option ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.best_of >= 1, "best_of", "must be at least 1")?;
        require(self.round_time >= 0.0, "round_time", "must not be negative")?;
        require(self.damage_scale >= 0.0, "damage_scale", "must not be negative")?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(MatchRules::default().validate().is_ok());
        assert!(MatchRules::training().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(r#"{ "world": { "gravity": 1800 } }"#).unwrap();
        assert_eq!(config.world.gravity, 1800.0);
        assert_eq!(config.world.width, 960.0);
        assert_eq!(config.combat.max_health, 1000.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimConfig::from_json_str(r#"{ "combat": { "max_health": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "combat.max_health", .. }));

        let err = MatchRules::from_json_str(r#"{ "best_of": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "best_of", .. }));

        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rounds_to_win() {
        let mut rules = MatchRules::default();
        rules.best_of = 3;
        assert_eq!(rules.rounds_to_win(), 2);
        rules.best_of = 5;
        assert_eq!(rules.rounds_to_win(), 3);
        rules.best_of = 1;
        assert_eq!(rules.rounds_to_win(), 1);
        rules.best_of = 4;
        assert_eq!(rules.rounds_to_win(), 2);
    }

    #[test]
    fn test_rules_json() {
        let rules = MatchRules::from_json_str(
            r#"{ "stage": "lab", "p1": { "character": "izzy", "controller": "cpu" }, "difficulty": "spicy" }"#,
        )
        .unwrap();
        assert_eq!(rules.stage, StageId::Lab);
        assert_eq!(rules.p1.character, "izzy");
        assert_eq!(rules.p1.controller, ControllerKind::Cpu);
        assert_eq!(rules.difficulty, Difficulty::Spicy);
        assert_eq!(rules.best_of, 3);
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let rules = MatchRules::from_json_str(r#"{ "stage": "moon", "difficulty": "nightmare" }"#).unwrap();
        assert_eq!(rules.stage, StageId::Rooftop);
        assert_eq!(rules.difficulty, Difficulty::Normal);

        let rules = MatchRules::from_json_str(r#"{ "stage": "pharmacy", "difficulty": "easy" }"#).unwrap();
        assert_eq!(rules.stage, StageId::Pharmacy);
        assert_eq!(rules.difficulty, Difficulty::Easy);
    }
}
