/// The step function: advances the meadow by one tick.
///
/// Processing order:
///   1. Tick counter
///   2. Player movement from held directions
///   3. NPC wandering, in spawn order
///   4. Change detection (by value) for the repaint decision
///
/// Randomness is injected so tests can seed it.

use rand::Rng;

use crate::domain::entity::{Entity, HeldDirections};
use crate::domain::motion::{self, move_player};
use crate::domain::wander::{wander, WanderChange};
use super::event::SceneEvent;
use super::world::SceneState;

#[derive(Clone, Debug, Default)]
pub struct StepOutcome {
    pub events: Vec<SceneEvent>,
    /// True if any entity differs from its pre-tick state.
    pub changed: bool,
}

pub fn step<R: Rng + ?Sized>(scene: &mut SceneState, held: HeldDirections, rng: &mut R) -> StepOutcome {
    let mut events = Vec::new();
    scene.tick += 1;

    let before_player = scene.player.clone();
    let before_npcs: Vec<Entity> = scene.npcs.clone();

    resolve_player(scene, held, &mut events);
    resolve_npcs(scene, rng, &mut events);

    let changed = scene.player != before_player || scene.npcs != before_npcs;
    StepOutcome { events, changed }
}

fn resolve_player(scene: &mut SceneState, held: HeldDirections, events: &mut Vec<SceneEvent>) {
    let gate = motion::frame_gate(scene.tick, scene.player_anim_period);
    if move_player(&mut scene.player, held, &scene.bounds, gate) {
        events.push(SceneEvent::PlayerStride { frame: scene.player.anim_frame });
    }
}

fn resolve_npcs<R: Rng + ?Sized>(scene: &mut SceneState, rng: &mut R, events: &mut Vec<SceneEvent>) {
    let gate = motion::frame_gate(scene.tick, scene.wander.anim_period);
    for (index, npc) in scene.npcs.iter_mut().enumerate() {
        let change = wander(npc, &scene.wander, &scene.bounds, gate, rng);
        let event = match change {
            WanderChange::Started => SceneEvent::NpcStarted { index },
            WanderChange::Stopped => SceneEvent::NpcStopped { index },
            WanderChange::Turned => SceneEvent::NpcTurned { index },
            WanderChange::None => continue,
        };
        log::trace!("tick {}: {:?}", scene.tick, event);
        events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::Facing;
    use crate::domain::profile::Profile;
    use crate::domain::wander::WanderPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const STILL: WanderPolicy = WanderPolicy { start_chance: 0.0, stop_chance: 0.0, turn_chance: 0.0, anim_period: 5 };

    fn scene(seed: u64) -> (SceneState, StdRng) {
        let cfg = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let s = SceneState::new(&cfg.scene, &Profile::default(), &mut rng);
        (s, rng)
    }

    fn frozen_npcs(s: &mut SceneState) {
        s.wander = STILL;
        for n in s.npcs.iter_mut() {
            n.is_moving = false;
        }
    }

    const UP_LEFT: HeldDirections = HeldDirections { up: true, down: false, left: true, right: false };

    #[test]
    fn scenario_up_left_one_tick() {
        let (mut s, mut rng) = scene(1);
        frozen_npcs(&mut s);
        let out = step(&mut s, UP_LEFT, &mut rng);
        assert_eq!((s.player.x, s.player.y), (397.0, 297.0));
        assert_eq!(s.player.facing, Facing::Left);
        assert!(s.player.is_moving);
        assert!(out.changed);
        assert_eq!(s.tick, 1);
    }

    #[test]
    fn nothing_held_and_npcs_idle_is_unchanged() {
        let (mut s, mut rng) = scene(2);
        frozen_npcs(&mut s);
        let out = step(&mut s, HeldDirections::NONE, &mut rng);
        assert!(!out.changed);
        assert!(out.events.is_empty());
    }

    #[test]
    fn player_stride_on_gated_ticks_only() {
        let (mut s, mut rng) = scene(3);
        frozen_npcs(&mut s);
        let right = HeldDirections { right: true, ..HeldDirections::NONE };
        let mut strides = 0;
        for _ in 0..40 {
            let out = step(&mut s, right, &mut rng);
            strides += out.events.iter().filter(|e| matches!(e, SceneEvent::PlayerStride { .. })).count();
        }
        assert_eq!(strides, 4);
        assert_eq!(s.player.anim_frame, 0);
    }

    #[test]
    fn frame_frozen_while_idle() {
        let (mut s, mut rng) = scene(4);
        frozen_npcs(&mut s);
        s.player.anim_frame = 3;
        for _ in 0..50 {
            step(&mut s, HeldDirections::NONE, &mut rng);
            assert_eq!(s.player.anim_frame, 3);
        }
    }

    #[test]
    fn long_run_keeps_everyone_in_bounds() {
        let (mut s, mut rng) = scene(5);
        s.wander = WanderPolicy { start_chance: 0.1, stop_chance: 0.02, turn_chance: 0.05, anim_period: 5 };
        let patterns = [
            HeldDirections { up: true, left: true, ..HeldDirections::NONE },
            HeldDirections { down: true, right: true, ..HeldDirections::NONE },
            HeldDirections { up: true, down: true, left: true, right: true },
        ];
        for t in 0..3_000 {
            let held = patterns[(t / 400) % patterns.len()];
            step(&mut s, held, &mut rng);
            assert!(s.bounds.contains(s.player.x, s.player.y));
            assert!(s.player.anim_frame < 4);
            for n in &s.npcs {
                assert!(n.x >= 20.0 && n.x <= 780.0);
                assert!(n.anim_frame < 4);
            }
        }
    }

    #[test]
    fn npc_events_follow_spawn_order() {
        let (mut s, mut rng) = scene(6);
        s.wander = WanderPolicy { start_chance: 1.0, stop_chance: 0.0, turn_chance: 0.0, anim_period: 5 };
        for n in s.npcs.iter_mut() {
            n.is_moving = false;
        }
        let out = step(&mut s, HeldDirections::NONE, &mut rng);
        let started: Vec<usize> = out
            .events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::NpcStarted { index } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![0, 1, 2, 3, 4]);
        assert!(out.changed);
    }
}
