/// Scene painter: turns a `SceneState` into drawing calls on a `Surface`.
///
/// Order: grass, decorative tufts, NPCs in spawn order, player last so it is
/// never hidden behind an NPC. Every offset is mirrored by facing.
/// Nothing here depends on time or randomness, so painting the same state
/// twice gives the same picture.

use std::f32::consts::FRAC_PI_2;

use crate::domain::entity::{Entity, Rgb};
use crate::sim::world::SceneState;
use super::canvas::{quad_bezier, Surface};

pub const GRASS: Rgb = Rgb::new(0x8d, 0xeb, 0xb3);
pub const TUFT: Rgb = Rgb::new(0x7b, 0xc9, 0x9a);
const EYE_WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
const PUPIL: Rgb = Rgb::new(0, 0, 0);
const LABEL: Rgb = Rgb::new(0, 0, 0);

const TUFT_COUNT: usize = 50;
const TAIL_SEGMENTS: usize = 8;

pub fn paint_scene<S: Surface + ?Sized>(surface: &mut S, scene: &SceneState) {
    surface.clear(GRASS);
    paint_tufts(surface);
    for npc in &scene.npcs {
        paint_entity(surface, npc);
    }
    paint_entity(surface, &scene.player);
}

/// Tuft `i`: scattered by sin/cos of its index, size from a small hash.
pub fn tuft_rect(i: usize) -> (f32, f32, f32, f32) {
    let f = i as f32;
    let x = (f * 324.0).sin() * 800.0;
    let y = (f * 142.0).cos() * 600.0;
    let w = 10.0 + ((i * 37 + 11) % 31) as f32;
    let h = 10.0 + ((i * 53 + 7) % 31) as f32;
    (x, y, w, h)
}

fn paint_tufts<S: Surface + ?Sized>(surface: &mut S) {
    for i in 0..TUFT_COUNT {
        let (x, y, w, h) = tuft_rect(i);
        surface.fill_rect(x, y, w, h, TUFT);
    }
}

/// Extra leg length per leg: a trot while moving, straight legs at rest.
pub fn leg_offsets(e: &Entity) -> [f32; 4] {
    if !e.is_moving {
        return [0.0; 4];
    }
    let theta = e.anim_frame as f32 * FRAC_PI_2;
    let s = theta.sin() * 5.0;
    let c = theta.cos() * 5.0;
    [s, c, c, s]
}

/// Left edge of each leg relative to the anchor: front pair, back pair.
fn leg_xs(s: f32) -> [f32; 4] {
    if s > 0.0 { [10.0, 15.0, -15.0, -10.0] } else { [-15.0, -20.0, 10.0, 5.0] }
}

pub fn paint_entity<S: Surface + ?Sized>(surface: &mut S, e: &Entity) {
    let s = e.facing.sign();
    let (x, y) = (e.x, e.y);

    // body
    surface.fill_ellipse(x, y, 25.0, 15.0, e.color);
    // head
    surface.fill_ellipse(x + 15.0 * s, y - 5.0, 12.0, 12.0, e.color);
    // eye + pupil, pupil nudged further toward facing
    surface.fill_ellipse(x + 18.0 * s, y - 7.0, 4.0, 4.0, EYE_WHITE);
    surface.fill_ellipse(x + 19.0 * s, y - 7.0, 2.0, 2.0, PUPIL);

    // tail: out along the top curve, back along the bottom one
    let root = (x - 20.0 * s, y);
    let tip = (x - 40.0 * s, y);
    let mut tail = vec![root];
    tail.extend(quad_bezier(root, (x - 30.0 * s, y - 15.0), tip, TAIL_SEGMENTS));
    tail.extend(quad_bezier(tip, (x - 30.0 * s, y + 5.0), root, TAIL_SEGMENTS));
    surface.fill_polygon(&tail, e.color);

    let offsets = leg_offsets(e);
    for (lx, off) in leg_xs(s).iter().zip(offsets) {
        surface.fill_rect(x + lx, y + 10.0, 5.0, 10.0 + off, e.color);
    }

    surface.fill_text_centered(x, y - 25.0, &e.name, LABEL);
}
