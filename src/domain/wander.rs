/// NPC wandering: randomized idle/walk transitions.
///
/// Per tick, per NPC:
///   - idle:   start walking with `start_chance`, picking a random facing
///   - moving: stop with `stop_chance`
///   - moving and not stopping: step `speed` along facing (x only, clamped),
///     advance the walk frame on gated ticks, flip facing with `turn_chance`
///
/// A tick that starts or stops an NPC does not also move it.
/// NPCs never change `y` after they are spawned.

use rand::Rng;

use super::entity::{Bounds, Entity, Facing, PALETTE};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WanderPolicy {
    pub start_chance: f64,
    pub stop_chance: f64,
    pub turn_chance: f64,
    pub anim_period: u32,
}

impl Default for WanderPolicy {
    fn default() -> Self {
        WanderPolicy { start_chance: 0.01, stop_chance: 0.02, turn_chance: 0.01, anim_period: 5 }
    }
}

/// What a wander tick did to one NPC (beyond plain walking).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WanderChange {
    None,
    Started,
    Stopped,
    Turned,
}

fn random_facing<R: Rng + ?Sized>(rng: &mut R) -> Facing {
    if rng.gen_bool(0.5) { Facing::Left } else { Facing::Right }
}

/// Spawn `count` NPCs with random color, position, speed and facing.
/// Positions are drawn inside `bounds` so the clamp invariant holds from
/// the first frame.
pub fn spawn_npcs<R: Rng + ?Sized>(count: usize, bounds: &Bounds, rng: &mut R) -> Vec<Entity> {
    (0..count)
        .map(|i| Entity {
            id: format!("npc-{i}"),
            x: rng.gen_range(bounds.min_x..=bounds.max_x),
            y: rng.gen_range(bounds.min_y..=bounds.max_y),
            facing: random_facing(rng),
            is_moving: rng.gen_bool(0.3),
            speed: 1.0 + rng.gen_range(0.0..2.0),
            anim_frame: 0,
            name: format!("NPC {}", i + 1),
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
        })
        .collect()
}

/// One wander tick for a single NPC.
pub fn wander<R: Rng + ?Sized>(
    npc: &mut Entity,
    policy: &WanderPolicy,
    bounds: &Bounds,
    frame_gate: bool,
    rng: &mut R,
) -> WanderChange {
    if !npc.is_moving {
        if rng.gen_bool(policy.start_chance) {
            npc.is_moving = true;
            npc.facing = random_facing(rng);
            return WanderChange::Started;
        }
        return WanderChange::None;
    }

    if rng.gen_bool(policy.stop_chance) {
        npc.is_moving = false;
        return WanderChange::Stopped;
    }

    npc.x = bounds.clamp_x(npc.x + npc.speed * npc.facing.sign());
    if frame_gate {
        npc.advance_frame();
    }
    if rng.gen_bool(policy.turn_chance) {
        npc.facing = npc.facing.flipped();
        return WanderChange::Turned;
    }
    WanderChange::None
}
