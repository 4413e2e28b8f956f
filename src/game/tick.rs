//! Authoritative Simulation Tick
//!
//! One fixed step of the match. Everything that changes match state goes
//! through [`tick`], in a fixed order:
//!
//! ```text
//!   announcer ─► pause? ─► hitstop? ─► round over? ─► timer
//!       ─► inputs ─► fighter 1 ─► fighter 2 ─► projectiles ─► beams
//!       ─► push-out ─► particles ─► camera ─► HUD
//! ```
//!
//! Each fighter's commands are applied right after its own update, so
//! fighter 2 already sees the result of a strike from fighter 1.

use std::sync::Arc;

#[cfg(feature = "debug-tracing")]
use tracing::trace;
use tracing::info;

use crate::core::math::tick_down;
use crate::game::cpu::{InputSource, PollContext};
use crate::game::effects::{update_particles, ParticleKind, Tint};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::fighter::{Fighter, World};
use crate::game::input::ActionVector;
use crate::game::physics::resolve_fighter_overlap;
use crate::game::state::{MatchPhase, MatchState, PlayerId};
use crate::TICK_DT;

/// One input source per player slot.
pub type InputSources = [Box<dyn InputSource>; 2];

/// Sparks at a projectile bounce.
const BOUNCE_SPARKS: u32 = 8;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// A KO or time over happened this tick
    pub round_ended: bool,
    /// The match was decided this tick
    pub match_ended: bool,
    /// Match winner (set together with `match_ended`)
    pub winner: Option<PlayerId>,
}

/// Run one simulation tick of [`TICK_DT`] seconds.
pub fn tick(state: &mut MatchState, sources: &mut InputSources) -> TickResult {
    let dt = TICK_DT;
    let mut result = TickResult::default();

    // Banner decays even while paused
    if state.announcer.update(dt) {
        state.push_event(GameEvent::announce(state.tick, "", 0.0));
    }

    if state.paused {
        result.events = state.take_events();
        return result;
    }

    state.tick = state.tick.wrapping_add(1);

    if state.hitstop > 0.0 {
        state.hitstop = tick_down(state.hitstop, dt);
        update_particles(&mut state.particles, dt * state.config.combat.hitstop_particle_scale);
        result.events = state.take_events();
        return result;
    }

    match state.phase {
        MatchPhase::RoundOver => {
            state.ko_freeze = tick_down(state.ko_freeze, dt);
            update_particles(&mut state.particles, dt);
            if state.ko_freeze <= 0.0 {
                handle_round_end(state, sources, &mut result);
            }
            result.events = state.take_events();
            return result;
        }
        MatchPhase::MatchOver => {
            result.events = state.take_events();
            return result;
        }
        MatchPhase::Playing => {}
    }

    // 1. Round timer (0 disables it)
    if state.rules.round_time > 0.0 {
        state.timer = tick_down(state.timer, dt);
        if state.timer <= 0.0 {
            state.on_time_over();
            result.round_ended = true;
            result.events = state.take_events();
            return result;
        }
    }

    // 2. Gather one action vector per fighter
    let inputs = poll_inputs(state, sources, dt);
    state.last_inputs = inputs;

    // 3. Fighters, in slot order
    update_fighters(state, &inputs, dt);

    // 4. Projectiles
    update_projectiles(state, dt);

    // 5. Beams
    update_beams(state, dt);

    // 6. Push-out, particles, camera
    let strength = state.config.physics.push_out_strength;
    resolve_fighter_overlap(&mut state.fighters, strength);
    update_particles(&mut state.particles, dt);
    state.camera.update(dt);

    #[cfg(feature = "debug-tracing")]
    trace!(
        tick = state.tick,
        p1_health = state.fighters[0].health,
        p2_health = state.fighters[1].health,
        projectiles = state.projectiles.len(),
        beams = state.beams.len(),
        "tick"
    );

    // 7. HUD
    let hud = state.hud_snapshot();
    state.push_event(GameEvent::new(state.tick, GameEventData::Hud(hud)));

    result.round_ended = state.phase != MatchPhase::Playing;
    result.events = state.take_events();
    result
}

fn poll_inputs(state: &MatchState, sources: &mut InputSources, dt: f32) -> [ActionVector; 2] {
    let mut inputs = [ActionVector::IDLE; 2];
    for id in PlayerId::ALL {
        let ctx = PollContext {
            dt,
            me: state.fighter(id),
            opponent: state.fighter(id.opponent()),
            projectiles: &state.projectiles,
        };
        inputs[id.index()] = sources[id.index()].poll(&ctx);
    }
    inputs
}

fn update_fighters(state: &mut MatchState, inputs: &[ActionVector; 2], dt: f32) {
    let config = Arc::clone(&state.config);
    let stage = Arc::clone(&state.stage);
    let world = World {
        config: &config,
        stage: &stage,
    };

    let mut commands = Vec::new();
    for id in PlayerId::ALL {
        {
            let (me, opponent) = split_pair(&mut state.fighters, id);
            me.update(dt, &inputs[id.index()], opponent, &world, &mut commands);
        }
        for command in commands.drain(..) {
            state.apply_command(id, command);
        }
    }
}

/// Mutable `id`, shared opponent.
fn split_pair(fighters: &mut [Fighter; 2], id: PlayerId) -> (&mut Fighter, &Fighter) {
    let (first, second) = fighters.split_at_mut(1);
    match id {
        PlayerId::One => (&mut first[0], &second[0]),
        PlayerId::Two => (&mut second[0], &first[0]),
    }
}

fn update_projectiles(state: &mut MatchState, dt: f32) {
    let stage = Arc::clone(&state.stage);
    let ground = stage.ground();

    let mut projectiles = std::mem::take(&mut state.projectiles);
    for p in projectiles.iter_mut() {
        let anchor = Some(state.fighter(p.owner).projectile_anchor());
        if let Some(at) = p.update(dt, anchor, ground) {
            state.spawn_particles(ParticleKind::Spark, Tint::White, at, BOUNCE_SPARKS);
        }

        let target = p.owner.opponent();
        if let Some(hit) = p.try_hit(state.fighter(target)) {
            state.deliver_hit(p.owner, target, &hit, Some(p.position));
        }
    }
    projectiles.retain(|p| !p.dead);

    // Nothing spawns projectiles mid-loop, but keep anything that did
    projectiles.append(&mut state.projectiles);
    state.projectiles = projectiles;
}

fn update_beams(state: &mut MatchState, dt: f32) {
    let mut beams = std::mem::take(&mut state.beams);
    for b in beams.iter_mut() {
        b.update(dt);
        let target = b.owner.opponent();
        if let Some(hit) = b.try_hit(state.fighter(target)) {
            state.deliver_hit(b.owner, target, &hit, None);
        }
    }
    beams.retain(|b| !b.is_expired());

    beams.append(&mut state.beams);
    state.beams = beams;
}

/// KO / time-over freeze finished: decide the match or start the next round.
fn handle_round_end(state: &mut MatchState, sources: &mut InputSources, result: &mut TickResult) {
    let score = state.score();
    let needed = state.rounds_to_win();

    if score.p1 >= needed || score.p2 >= needed {
        state.phase = MatchPhase::MatchOver;
        let winner = if score.p1 > score.p2 { PlayerId::One } else { PlayerId::Two };
        let winner_name = state.fighter(winner).character.name.clone();

        info!(%winner, name = %winner_name, %score, "match over");
        state.push_event(GameEvent::match_over(state.tick, winner, winner_name, score));

        result.match_ended = true;
        result.winner = Some(winner);
        return;
    }

    state.push_event(GameEvent::new(state.tick, GameEventData::RoundOver { score }));
    state.next_round();
    for source in sources.iter_mut() {
        source.reset();
    }
}

// =============================================================================
// TESTS
// =============================================================================
