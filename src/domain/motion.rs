/// Player motion: one tick of keyboard-driven movement.
///
/// Directions are applied in a fixed order (up, down, left, right) and
/// compose additively, each step clamped to the walkable bounds. When left
/// and right are both held the right branch runs last, so the pony ends up
/// facing right.

use super::entity::{Bounds, Entity, Facing, HeldDirections};

/// Apply one tick of held input to the player.
///
/// `frame_gate` opens the walk-cycle advance for this tick; the frame only
/// moves while the player is moving. Returns true if the walk frame advanced.
pub fn move_player(p: &mut Entity, held: HeldDirections, bounds: &Bounds, frame_gate: bool) -> bool {
    if held.up {
        p.y = bounds.clamp_y(p.y - p.speed);
    }
    if held.down {
        p.y = bounds.clamp_y(p.y + p.speed);
    }
    if held.left {
        p.x = bounds.clamp_x(p.x - p.speed);
        p.facing = Facing::Left;
    }
    if held.right {
        p.x = bounds.clamp_x(p.x + p.speed);
        p.facing = Facing::Right;
    }

    p.is_moving = held.any();

    if p.is_moving && frame_gate {
        p.advance_frame();
        return true;
    }
    false
}

/// Coarse time gate for the walk cycle: open on every `period`-th tick.
pub fn frame_gate(tick: u64, period: u32) -> bool {
    tick % u64::from(period.max(1)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PALETTE;

    fn pony() -> Entity {
        Entity::player("Pony", PALETTE[0], 3.0)
    }

    fn held(up: bool, down: bool, left: bool, right: bool) -> HeldDirections {
        HeldDirections { up, down, left, right }
    }

    #[test]
    fn up_left_diagonal() {
        let mut p = pony();
        move_player(&mut p, held(true, false, true, false), &Bounds::SCENE, false);
        assert_eq!((p.x, p.y), (397.0, 297.0));
        assert_eq!(p.facing, Facing::Left);
        assert!(p.is_moving);
    }

    #[test]
    fn left_and_right_cancel_and_face_right() {
        let mut p = pony();
        p.facing = Facing::Left;
        move_player(&mut p, held(false, false, true, true), &Bounds::SCENE, false);
        assert_eq!(p.x, 400.0);
        assert_eq!(p.facing, Facing::Right);
        assert!(p.is_moving);
    }

    #[test]
    fn clamps_at_every_edge() {
        let b = Bounds::SCENE;
        let mut p = pony();
        for _ in 0..500 {
            move_player(&mut p, held(true, false, true, false), &b, true);
            assert!(b.contains(p.x, p.y));
        }
        assert_eq!((p.x, p.y), (20.0, 50.0));

        for _ in 0..500 {
            move_player(&mut p, held(false, true, false, true), &b, true);
            assert!(b.contains(p.x, p.y));
        }
        assert_eq!((p.x, p.y), (780.0, 550.0));
    }

    #[test]
    fn all_four_held_stays_in_bounds() {
        let b = Bounds::SCENE;
        let mut p = pony();
        p.x = 21.0;
        p.y = 549.0;
        move_player(&mut p, held(true, true, true, true), &b, false);
        assert!(b.contains(p.x, p.y));
    }

    #[test]
    fn idle_holds_frame_and_stops() {
        let mut p = pony();
        p.anim_frame = 2;
        p.is_moving = true;
        let advanced = move_player(&mut p, HeldDirections::NONE, &Bounds::SCENE, true);
        assert!(!advanced);
        assert!(!p.is_moving);
        assert_eq!(p.anim_frame, 2);
        assert_eq!((p.x, p.y), (400.0, 300.0));
    }

    #[test]
    fn frame_advances_only_when_gated() {
        let mut p = pony();
        let right = held(false, false, false, true);
        assert!(!move_player(&mut p, right, &Bounds::SCENE, false));
        assert_eq!(p.anim_frame, 0);
        assert!(move_player(&mut p, right, &Bounds::SCENE, true));
        assert_eq!(p.anim_frame, 1);
    }

    #[test]
    fn gate_every_period() {
        let opened: Vec<u64> = (1..=30).filter(|&t| frame_gate(t, 10)).collect();
        assert_eq!(opened, vec![10, 20, 30]);
        // A zero period would divide by zero; treat it as every tick.
        assert!(frame_gate(7, 0));
    }
}
