/// SceneState: the complete snapshot of a running meadow.
///
/// One player plus a fixed batch of NPCs, all inside `bounds`.
/// Built once per session and dropped on teardown; nothing is persisted.

use rand::Rng;

use crate::config::SceneConfig;
use crate::domain::entity::{Bounds, Entity};
use crate::domain::profile::Profile;
use crate::domain::wander::{self, WanderPolicy};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneState {
    pub player: Entity,
    pub npcs: Vec<Entity>,
    pub bounds: Bounds,
    pub tick: u64,

    // ── Tuning (copied from config at start) ──
    pub player_anim_period: u32,
    pub wander: WanderPolicy,
}

impl SceneState {
    pub fn new<R: Rng + ?Sized>(cfg: &SceneConfig, profile: &Profile, rng: &mut R) -> Self {
        let bounds = Bounds::SCENE;
        SceneState {
            player: Entity::player(profile.display_name(), profile.color(), cfg.player_speed),
            npcs: wander::spawn_npcs(cfg.npc_count, &bounds, rng),
            bounds,
            tick: 0,
            player_anim_period: cfg.player_anim_period,
            wander: cfg.wander,
        }
    }

    pub fn moving_count(&self) -> usize {
        self.npcs.iter().filter(|n| n.is_moving).count() + usize::from(self.player.is_moving)
    }
}
