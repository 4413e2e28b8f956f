//! Character Roster
//!
//! Six characters built from a shared base move table. Each overrides names,
//! a few base numbers and its special/ultimate slots.

use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::core::math::Rect;
use crate::core::vec2::Vec2;
use crate::game::events::SoundCue;
use crate::game::moves::{
    BeamParams, DashParams, MoveDef, MoveKind, MoveSlot, OnHitEffect, ProjectileSpawn,
    ProjectileStyle, Timing,
};

const SPECIAL_COST: f32 = 30.0;
const ULTIMATE_COST: f32 = 100.0;

// =============================================================================
// TYPES
// =============================================================================

/// Per-character multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Movement speed multiplier
    pub speed: f32,
    /// Knockback divisor
    pub weight: f32,
    /// Jump impulse multiplier
    pub jump_boost: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            speed: 1.0,
            weight: 1.0,
            jump_boost: 1.0,
        }
    }
}

/// Four named slots. A missing slot is a no-op when requested.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTable {
    /// Light attack
    pub light: Option<MoveDef>,
    /// Heavy attack
    pub heavy: Option<MoveDef>,
    /// Special attack
    pub special: Option<MoveDef>,
    /// Ultimate attack
    pub ultimate: Option<MoveDef>,
}

impl MoveTable {
    /// Look up a slot.
    pub fn get(&self, slot: MoveSlot) -> Option<&MoveDef> {
        match slot {
            MoveSlot::Light => self.light.as_ref(),
            MoveSlot::Heavy => self.heavy.as_ref(),
            MoveSlot::Special => self.special.as_ref(),
            MoveSlot::Ultimate => self.ultimate.as_ref(),
        }
    }
}

/// A playable character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterDef {
    /// Lookup id
    pub id: String,
    /// Display name
    pub name: String,
    /// Select-screen blurb
    pub tagline: String,
    /// Multipliers
    pub stats: Stats,
    /// Moves
    pub moves: MoveTable,
}

/// Id / name / tagline triple for a select screen.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CharacterSummary {
    /// Lookup id
    pub id: String,
    /// Display name
    pub name: String,
    /// Select-screen blurb
    pub tagline: String,
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Ids of every character, in roster order.
pub const CHARACTER_IDS: [&str; 6] = ["parry", "pillmore", "finneas", "ferbald", "izzy", "aardvark"];

/// Build a character by id. Unknown ids fall back to the first entry.
pub fn character(id: &str) -> Arc<CharacterDef> {
    let def = match id {
        "pillmore" => pillmore(),
        "finneas" => finneas(),
        "ferbald" => ferbald(),
        "izzy" => izzy(),
        "aardvark" => aardvark(),
        "parry" => parry(),
        other => {
            tracing::debug!(id = other, "unknown character id, using default");
            parry()
        }
    };
    Arc::new(def)
}

/// Select-screen listing.
pub fn list_characters() -> Vec<CharacterSummary> {
    CHARACTER_IDS
        .iter()
        .map(|id| {
            let c = character(id);
            CharacterSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                tagline: c.tagline.clone(),
            }
        })
        .collect()
}

// =============================================================================
// BUILDERS
// =============================================================================

fn melee(name: &str, timing: Timing, damage: f32, hitstun: f32, kb: (f32, f32), hitbox: Rect) -> MoveDef {
    MoveDef {
        name: name.to_string(),
        kind: MoveKind::Melee { hitbox },
        timing,
        damage,
        hitstun,
        knockback: Vec2::new(kb.0, kb.1),
        focus_cost: None,
        sound: SoundCue::Light,
    }
}

fn with_cost(mut def: MoveDef, cost: f32, sound: SoundCue) -> MoveDef {
    def.focus_cost = Some(cost);
    def.sound = sound;
    def
}

fn with_kind(mut def: MoveDef, kind: MoveKind) -> MoveDef {
    def.kind = kind;
    def
}

fn dash(speed: f32) -> DashParams {
    DashParams {
        speed,
        lock_y: false,
        up_boost: None,
    }
}

fn base_moves() -> MoveTable {
    let light = melee(
        "Light",
        Timing::new(0.07, 0.10, 0.18),
        42.0,
        0.18,
        (360.0, -220.0),
        Rect::new(34.0, 18.0, 40.0, 26.0),
    );
    let mut heavy = melee(
        "Heavy",
        Timing::new(0.13, 0.12, 0.30),
        86.0,
        0.28,
        (520.0, -360.0),
        Rect::new(36.0, 8.0, 54.0, 34.0),
    );
    heavy.sound = SoundCue::Heavy;
    let special = with_cost(
        melee(
            "Special",
            Timing::new(0.14, 0.16, 0.34),
            90.0,
            0.32,
            (560.0, -320.0),
            Rect::new(40.0, 14.0, 56.0, 34.0),
        ),
        SPECIAL_COST,
        SoundCue::Special,
    );
    let ultimate = with_cost(
        melee(
            "Ultimate",
            Timing::new(0.22, 0.24, 0.44),
            160.0,
            0.40,
            (760.0, -520.0),
            Rect::new(42.0, 6.0, 70.0, 44.0),
        ),
        ULTIMATE_COST,
        SoundCue::Special,
    );
    MoveTable {
        light: Some(light),
        heavy: Some(heavy),
        special: Some(special),
        ultimate: Some(ultimate),
    }
}

/// Rename the light and heavy slots.
fn rename(moves: &mut MoveTable, light: &str, heavy: &str) {
    if let Some(m) = moves.light.as_mut() {
        m.name = light.to_string();
    }
    if let Some(m) = moves.heavy.as_mut() {
        m.name = heavy.to_string();
    }
}

fn parry() -> CharacterDef {
    let mut moves = base_moves();
    rename(&mut moves, "Tail Tap", "Tail Slam");
    if let Some(h) = moves.heavy.as_mut() {
        h.knockback = Vec2::new(560.0, -420.0);
    }
    moves.special = Some(with_cost(
        with_kind(
            melee("Tail Tornado", Timing::new(0.10, 0.22, 0.22), 96.0, 0.30, (640.0, -260.0), Rect::default()),
            MoveKind::Dash {
                hitbox: Rect::new(28.0, 10.0, 64.0, 46.0),
                dash: DashParams {
                    lock_y: true,
                    ..dash(740.0)
                },
            },
        ),
        SPECIAL_COST,
        SoundCue::Special,
    ));
    moves.ultimate = Some(with_cost(
        with_kind(
            melee("Agent Spin-Cycle", Timing::new(0.12, 0.42, 0.36), 180.0, 0.46, (860.0, -420.0), Rect::default()),
            MoveKind::Dash {
                hitbox: Rect::new(22.0, 6.0, 74.0, 54.0),
                dash: dash(900.0),
            },
        ),
        ULTIMATE_COST,
        SoundCue::Special,
    ));
    CharacterDef {
        id: "parry".to_string(),
        name: "Parry the Platypus".to_string(),
        tagline: "Silent. Slightly damp. Very committed.".to_string(),
        stats: Stats {
            speed: 1.08,
            weight: 0.92,
            jump_boost: 1.06,
        },
        moves,
    }
}

fn pillmore() -> CharacterDef {
    let mut moves = base_moves();
    rename(&mut moves, "Receipt Slap", "Syringe Uppercut");
    if let Some(h) = moves.heavy.as_mut() {
        h.kind = MoveKind::Melee {
            hitbox: Rect::new(28.0, -2.0, 56.0, 56.0),
        };
        h.knockback = Vec2::new(520.0, -520.0);
    }
    moves.special = Some(with_cost(
        with_kind(
            melee("Capsule Toss", Timing::new(0.18, 0.02, 0.26), 74.0, 0.24, (520.0, -240.0), Rect::default()),
            MoveKind::Projectile {
                spawn: ProjectileSpawn::straight(ProjectileStyle::Capsule, 820.0, 12.0, 1.6),
            },
        ),
        SPECIAL_COST,
        SoundCue::Special,
    ));
    moves.ultimate = Some(with_cost(
        with_kind(
            melee("Side-Effects Storm", Timing::new(0.22, 0.06, 0.40), 120.0, 0.36, (660.0, -320.0), Rect::default()),
            MoveKind::Projectile {
                spawn: ProjectileSpawn {
                    gravity: 380.0,
                    bounces: 1,
                    multi: 3,
                    spread: 0.22,
                    on_hit: Some(OnHitEffect::Chill),
                    ..ProjectileSpawn::straight(ProjectileStyle::Storm, 760.0, 16.0, 2.3)
                },
            },
        ),
        ULTIMATE_COST,
        SoundCue::Special,
    ));
    CharacterDef {
        id: "pillmore".to_string(),
        name: "Dr. Pillmore".to_string(),
        tagline: "Licensed to refill... chaos.".to_string(),
        stats: Stats {
            speed: 0.92,
            weight: 1.18,
            jump_boost: 0.94,
        },
        moves,
    }
}

fn finneas() -> CharacterDef {
    let mut moves = base_moves();
    rename(&mut moves, "Blueprint Bonk", "Idea Hammer");
    moves.special = Some(with_cost(
        with_kind(
            melee("Boomer-Plan", Timing::new(0.14, 0.02, 0.18), 68.0, 0.22, (460.0, -240.0), Rect::default()),
            MoveKind::Boomerang {
                spawn: ProjectileSpawn::straight(ProjectileStyle::Plan, 720.0, 10.0, 2.2),
                return_after: 0.8,
            },
        ),
        SPECIAL_COST,
        SoundCue::Special,
    ));
    moves.ultimate = Some(with_cost(
        with_kind(
            melee("Weekend Montage", Timing::new(0.16, 0.30, 0.36), 170.0, 0.42, (740.0, -420.0), Rect::default()),
            MoveKind::Dash {
                hitbox: Rect::new(22.0, 0.0, 82.0, 54.0),
                dash: dash(540.0),
            },
        ),
        ULTIMATE_COST,
        SoundCue::Special,
    ));
    CharacterDef {
        id: "finneas".to_string(),
        name: "Finneas the Planner".to_string(),
        tagline: "Has a plan for your plan's plan.".to_string(),
        stats: Stats::default(),
        moves,
    }
}

fn ferbald() -> CharacterDef {
    let mut moves = base_moves();
    rename(&mut moves, "Quiet Elbow", "Wrench Whack");
    moves.special = Some(with_cost(
        with_kind(
            melee("Rocket Boots", Timing::new(0.12, 0.26, 0.24), 102.0, 0.30, (680.0, -280.0), Rect::default()),
            MoveKind::Dash {
                hitbox: Rect::new(30.0, 12.0, 64.0, 44.0),
                dash: DashParams {
                    up_boost: Some(-180.0),
                    ..dash(820.0)
                },
            },
        ),
        SPECIAL_COST,
        SoundCue::Special,
    ));
    moves.ultimate = Some(with_cost(
        melee(
            "Silent Megadrill",
            Timing::new(0.18, 0.22, 0.34),
            190.0,
            0.44,
            (820.0, -520.0),
            Rect::new(36.0, 0.0, 70.0, 56.0),
        ),
        ULTIMATE_COST,
        SoundCue::Heavy,
    ));
    CharacterDef {
        id: "ferbald".to_string(),
        name: "Ferbald the Quiet".to_string(),
        tagline: "Says nothing. Hits loudly.".to_string(),
        stats: Stats {
            speed: 0.98,
            weight: 1.08,
            jump_boost: 0.98,
        },
        moves,
    }
}

fn izzy() -> CharacterDef {
    let mut moves = base_moves();
    rename(&mut moves, "Cheer Chop", "Friendship Forearm");
    moves.special = Some(with_cost(
        with_kind(
            melee("Heart-String", Timing::new(0.16, 0.02, 0.22), 60.0, 0.32, (320.0, -160.0), Rect::default()),
            MoveKind::Projectile {
                spawn: ProjectileSpawn {
                    on_hit: Some(OnHitEffect::Charm),
                    ..ProjectileSpawn::straight(ProjectileStyle::Heart, 640.0, 12.0, 2.0)
                },
            },
        ),
        SPECIAL_COST,
        SoundCue::Special,
    ));
    moves.ultimate = Some(with_cost(
        with_kind(
            melee("Friendship Beam", Timing::new(0.24, 0.16, 0.46), 200.0, 0.42, (860.0, -260.0), Rect::default()),
            MoveKind::Beam {
                beam: BeamParams {
                    length: 520.0,
                    thickness: 44.0,
                    life: 0.16,
                },
            },
        ),
        ULTIMATE_COST,
        SoundCue::Special,
    ));
    CharacterDef {
        id: "izzy".to_string(),
        name: "Izzy Bella-Ring".to_string(),
        tagline: "Weaponized enthusiasm.".to_string(),
        stats: Stats {
            speed: 1.04,
            weight: 0.96,
            jump_boost: 1.06,
        },
        moves,
    }
}

fn aardvark() -> CharacterDef {
    let mut moves = base_moves();
    rename(&mut moves, "Notebook Jab", "Grapple Pop");
    moves.special = Some(with_cost(
        with_kind(
            melee("Smoke Poof", Timing::new(0.12, 0.02, 0.22), 0.0, 0.0, (0.0, 0.0), Rect::default()),
            MoveKind::Teleport { distance: 220.0 },
        ),
        SPECIAL_COST,
        SoundCue::Special,
    ));
    moves.ultimate = Some(with_cost(
        with_kind(
            melee("Top-Secret Pounce", Timing::new(0.14, 0.34, 0.40), 170.0, 0.44, (820.0, -420.0), Rect::default()),
            MoveKind::Dash {
                hitbox: Rect::new(26.0, 6.0, 74.0, 50.0),
                dash: dash(880.0),
            },
        ),
        ULTIMATE_COST,
        SoundCue::Heavy,
    ));
    CharacterDef {
        id: "aardvark".to_string(),
        name: "Agent Aardvark".to_string(),
        tagline: "This message will self-destruct into confetti.".to_string(),
        stats: Stats {
            speed: 1.02,
            weight: 0.98,
            jump_boost: 1.02,
        },
        moves,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_character_has_four_slots() {
        for id in CHARACTER_IDS {
            let c = character(id);
            assert_eq!(c.id, id);
            for slot in MoveSlot::ALL {
                let m = c.moves.get(slot).unwrap_or_else(|| panic!("{id} missing {slot}"));
                assert!(m.timing.total() > 0.0);
            }
        }
    }

    #[test]
    fn test_unknown_id_falls_back() {
        let c = character("nobody");
        assert_eq!(c.id, CHARACTER_IDS[0]);
    }

    #[test]
    fn test_costs() {
        for id in CHARACTER_IDS {
            let c = character(id);
            assert_eq!(c.moves.get(MoveSlot::Light).unwrap().focus_cost, None);
            assert_eq!(c.moves.get(MoveSlot::Heavy).unwrap().focus_cost, None);
            assert_eq!(c.moves.get(MoveSlot::Special).unwrap().focus_cost, Some(SPECIAL_COST));
            assert_eq!(c.moves.get(MoveSlot::Ultimate).unwrap().focus_cost, Some(ULTIMATE_COST));
        }
    }

    #[test]
    fn test_signature_kinds() {
        let pill = character("pillmore");
        match pill.moves.get(MoveSlot::Special).unwrap().kind {
            MoveKind::Projectile { spawn } => {
                assert_eq!(spawn.speed, 820.0);
                assert_eq!(spawn.radius, 12.0);
                assert_eq!(spawn.life, 1.6);
                assert_eq!(spawn.multi, 1);
            }
            other => panic!("unexpected kind {other:?}"),
        }

        let izzy = character("izzy");
        assert!(matches!(
            izzy.moves.get(MoveSlot::Ultimate).unwrap().kind,
            MoveKind::Beam { .. }
        ));
        assert_eq!(
            izzy.moves.get(MoveSlot::Special).unwrap().payload().on_hit,
            Some(OnHitEffect::Charm)
        );
        assert_eq!(
            pill.moves.get(MoveSlot::Ultimate).unwrap().payload().on_hit,
            Some(OnHitEffect::Chill)
        );

        let aard = character("aardvark");
        assert!(matches!(
            aard.moves.get(MoveSlot::Special).unwrap().kind,
            MoveKind::Teleport { distance } if distance == 220.0
        ));
    }

    #[test]
    fn test_list_characters() {
        let list = list_characters();
        assert_eq!(list.len(), CHARACTER_IDS.len());
        assert_eq!(list[1].name, "Dr. Pillmore");
    }
}
