//! Fighter Physics
//!
//! Movement integration against the static platform set, plus the
//! fighter-vs-fighter push-out. Only axis-aligned landings are resolved:
//! platforms are floors, never walls or ceilings.

use crate::core::math::{clamp, decay_toward_zero, lerp};
use crate::core::vec2::Vec2;
use crate::game::events::SoundCue;
use crate::game::fighter::{Fighter, FighterCommand, StatusEffect, World};
use crate::game::input::ActionVector;
use crate::game::stage::Platform;

/// Integrate one tick of movement.
///
/// With `can_control` false (hitstun, attacking) the fighter only damps,
/// falls and lands.
pub fn integrate(
    f: &mut Fighter,
    dt: f32,
    input: &ActionVector,
    world: &World<'_>,
    can_control: bool,
    out: &mut Vec<FighterCommand>,
) {
    let phys = &world.config.physics;
    let gravity = world.config.world.gravity;
    let stats = f.character.stats;

    let input = if f.status.is_active(StatusEffect::Confused) {
        input.mirrored()
    } else {
        *input
    };

    if can_control {
        let base_speed = if f.on_ground { phys.move_speed } else { phys.air_move_speed };
        let mut move_speed = base_speed * stats.speed;
        if f.status.is_active(StatusEffect::Chilled) {
            move_speed *= phys.chill_speed_scale;
        }
        let control_speed = if input.guard() || input.down() {
            move_speed * phys.slow_move_scale
        } else {
            move_speed
        };
        let blend = if f.on_ground { phys.ground_blend } else { phys.air_blend };

        match input.horizontal() {
            dir if dir != 0.0 => {
                f.velocity.x = lerp(f.velocity.x, dir * control_speed, blend);
            }
            _ => {
                let friction = if f.on_ground { phys.ground_friction } else { phys.air_drag };
                f.velocity.x = decay_toward_zero(f.velocity.x, friction, phys.stop_threshold);
            }
        }

        if input.jump_pressed() {
            jump(f, &input, world, out);
        }
    } else {
        f.velocity.x *= if f.on_ground {
            phys.locked_ground_damping
        } else {
            phys.locked_air_damping
        };
    }

    // Fast fall
    if !f.on_ground && can_control && input.down() {
        f.velocity.y += gravity * phys.fast_fall_scale * dt;
    }

    f.velocity.y = (f.velocity.y + gravity * dt).min(phys.max_fall);

    let prev = f.position;
    f.position += f.velocity * dt;

    let margin = world.config.world.edge_margin;
    f.position.x = clamp(f.position.x, margin, world.config.world.width - margin - f.width);

    land_on_platforms(f, prev, &world.stage.platforms);

    // Prevent sinking
    if f.on_ground && f.velocity.y > 0.0 {
        f.velocity.y = 0.0;
    }

    f.drop_through = (f.drop_through - dt).max(0.0);

    f.squash = lerp(f.squash, 1.0, 0.18);
    f.bob += dt * if f.on_ground {
        (f.velocity.x.abs() / 40.0).min(10.0)
    } else {
        1.5
    };
}

/// Jump pulse handling: ground jump, one air jump, or a drop through a
/// one-way platform when down is held.
fn jump(f: &mut Fighter, input: &ActionVector, world: &World<'_>, out: &mut Vec<FighterCommand>) {
    let phys = &world.config.physics;
    let boost = f.character.stats.jump_boost;

    if f.on_ground && f.on_one_way && input.down() {
        f.drop_through = phys.drop_through_time;
        f.on_ground = false;
        f.on_one_way = false;
        return;
    }

    if f.on_ground {
        f.velocity.y = phys.jump_velocity * boost;
        f.on_ground = false;
        f.on_one_way = false;
        f.jumps_used = 0;
        f.squash = 1.08;
        out.push(FighterCommand::Sound(SoundCue::Jump));
        out.push(FighterCommand::smoke(f.point_at(1.0), 10));
    } else if f.jumps_used < 1 {
        f.jumps_used += 1;
        f.velocity.y = phys.double_jump_velocity * boost;
        f.squash = 1.06;
        out.push(FighterCommand::Sound(SoundCue::Jump));
        out.push(FighterCommand::smoke(f.point_at(0.8), 10));
    }

    if input.down() {
        f.drop_through = phys.drop_through_time;
    }
}

/// Land on any platform whose top the feet crossed this tick.
///
/// One-way platforms only catch a falling fighter that is not dropping
/// through.
pub fn land_on_platforms(f: &mut Fighter, prev: Vec2, platforms: &[Platform]) {
    let prev_bottom = prev.y + f.height;
    let bottom = f.position.y + f.height;

    f.on_ground = false;
    f.on_one_way = false;

    for p in platforms {
        if !p.rect.overlaps_span(f.position.x, f.width) {
            continue;
        }
        if p.one_way && (f.drop_through > 0.0 || f.velocity.y <= 0.0) {
            continue;
        }
        if prev_bottom <= p.top() && bottom >= p.top() {
            f.position.y = p.top() - f.height;
            f.on_ground = true;
            f.on_one_way = p.one_way;
            f.jumps_used = 0;
        }
    }
}

/// Push overlapping fighters apart horizontally.
pub fn resolve_fighter_overlap(fighters: &mut [Fighter; 2], strength: f32) {
    let ha = fighters[0].hurtbox();
    let hb = fighters[1].hurtbox();
    if !ha.overlaps(&hb) {
        return;
    }

    let a_left = ha.x < hb.x;
    let overlap = if a_left { ha.right() - hb.x } else { hb.right() - ha.x };
    let push = overlap * 0.5 * strength;

    if a_left {
        fighters[0].position.x -= push;
        fighters[1].position.x += push;
    } else {
        fighters[0].position.x += push;
        fighters[1].position.x -= push;
    }
}

// =============================================================================
// TESTS
// =============================================================================
