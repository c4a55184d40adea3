/// Entities: the player pony and the wandering NPCs.
/// State machine is minimal: an entity is either idle or moving.

/// Logical drawing surface size. All positions are in these units.
pub const SURFACE_W: f32 = 800.0;
pub const SURFACE_H: f32 = 600.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// +1 for right, -1 for left. Used to mirror drawing offsets and steps.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// The eight swatches a pony can wear.
pub const PALETTE: [Rgb; 8] = [
    Rgb::new(0xFF, 0x9A, 0xA2), // pink
    Rgb::new(0xFF, 0xDA, 0xC1), // peach
    Rgb::new(0xB5, 0xEA, 0xD7), // mint
    Rgb::new(0xC7, 0xCE, 0xEA), // periwinkle
    Rgb::new(0xF1, 0xE8, 0xB8), // butter
    Rgb::new(0xE2, 0xF0, 0xCB), // pale green
    Rgb::new(0xA2, 0xD2, 0xFF), // sky
    Rgb::new(0xFF, 0xC6, 0xFF), // lilac
];

/// Animation cycle length (frames 0..=3).
pub const ANIM_FRAMES: u8 = 4;

/// Walkable rectangle. Anchors never leave it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    /// The meadow on the 800×600 surface: keeps the body and label on screen.
    pub const SCENE: Bounds = Bounds { min_x: 20.0, max_x: 780.0, min_y: 50.0, max_y: 550.0 };

    pub fn clamp_x(&self, x: f32) -> f32 {
        x.max(self.min_x).min(self.max_x)
    }

    pub fn clamp_y(&self, y: f32) -> f32 {
        y.max(self.min_y).min(self.max_y)
    }

    #[cfg(test)]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Movement keys held this tick. Directions are independent, so
/// diagonals (and even opposite pairs) are allowed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HeldDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldDirections {
    pub const NONE: HeldDirections = HeldDirections { up: false, down: false, left: false, right: false };

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Union of two sources (keyboard + gamepad).
    pub fn merge(self, other: HeldDirections) -> HeldDirections {
        HeldDirections {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }
}

/// A movable, drawable character. Pure data; compared by value to decide
/// whether a repaint is needed.
#[derive(Clone, PartialEq, Debug)]
pub struct Entity {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub is_moving: bool,
    pub speed: f32,
    pub anim_frame: u8,
    pub name: String,
    pub color: Rgb,
}

impl Entity {
    pub const PLAYER_ID: &'static str = "player";

    /// The player at the meadow centre, facing right, standing still.
    pub fn player(name: &str, color: Rgb, speed: f32) -> Self {
        Entity {
            id: Self::PLAYER_ID.to_string(),
            x: 400.0,
            y: 300.0,
            facing: Facing::Right,
            is_moving: false,
            speed,
            anim_frame: 0,
            name: name.to_string(),
            color,
        }
    }

    /// Advance the walk cycle by one frame, wrapping at `ANIM_FRAMES`.
    pub fn advance_frame(&mut self) {
        self.anim_frame = (self.anim_frame + 1) % ANIM_FRAMES;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_clamp_both_axes() {
        let b = Bounds::SCENE;
        assert_eq!(b.clamp_x(-5.0), 20.0);
        assert_eq!(b.clamp_x(900.0), 780.0);
        assert_eq!(b.clamp_y(0.0), 50.0);
        assert_eq!(b.clamp_y(551.0), 550.0);
        assert_eq!(b.clamp_x(400.0), 400.0);
        assert!(b.contains(20.0, 550.0));
        assert!(!b.contains(19.9, 300.0));
    }

    #[test]
    fn frame_wraps_at_four() {
        let mut e = Entity::player("Pony", PALETTE[0], 3.0);
        for expected in [1, 2, 3, 0, 1] {
            e.advance_frame();
            assert_eq!(e.anim_frame, expected);
        }
    }

    #[test]
    fn held_merge_is_union() {
        let kb = HeldDirections { up: true, ..HeldDirections::NONE };
        let pad = HeldDirections { left: true, ..HeldDirections::NONE };
        let both = kb.merge(pad);
        assert!(both.up && both.left && !both.down && !both.right);
        assert!(!HeldDirections::NONE.any());
    }

    #[test]
    fn facing_sign_mirrors() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }
}
