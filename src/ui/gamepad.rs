/// Gamepad support via gilrs.
///
/// Directions (D-pad or left stick) feed the meadow as held input and the
/// menus as edge presses. Face/shoulder buttons are bound to three actions
/// from `[gamepad]` in config.toml:
///   confirm   Start / A
///   cancel    Select / B
///   settings  Y (leave the meadow)

use std::collections::HashSet;

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::HeldDirections;

/// Stick travel needed before it counts as a direction.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const DEADZONE: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PadButton {
    South,
    East,
    West,
    North,
    LeftBumper,
    RightBumper,
    Start,
    Select,
}

/// Names accepted in config.toml (matched case-insensitively).
const BUTTON_NAMES: &[(&str, PadButton)] = &[
    ("a", PadButton::South),
    ("south", PadButton::South),
    ("b", PadButton::East),
    ("east", PadButton::East),
    ("x", PadButton::West),
    ("west", PadButton::West),
    ("y", PadButton::North),
    ("north", PadButton::North),
    ("l1", PadButton::LeftBumper),
    ("lb", PadButton::LeftBumper),
    ("r1", PadButton::RightBumper),
    ("rb", PadButton::RightBumper),
    ("start", PadButton::Start),
    ("select", PadButton::Select),
    ("back", PadButton::Select),
];

impl PadButton {
    fn parse(name: &str) -> Option<PadButton> {
        let name = name.trim();
        BUTTON_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, b)| b)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<PadButton> {
        Some(match btn {
            Button::South => PadButton::South,
            Button::East => PadButton::East,
            Button::West => PadButton::West,
            Button::North => PadButton::North,
            Button::LeftTrigger => PadButton::LeftBumper,
            Button::RightTrigger => PadButton::RightBumper,
            Button::Start => PadButton::Start,
            Button::Select => PadButton::Select,
            _ => return None,
        })
    }
}

/// Buttons bound to each action.
struct Bindings {
    confirm: Vec<PadButton>,
    cancel: Vec<PadButton>,
    settings: Vec<PadButton>,
}

impl Bindings {
    fn defaults() -> Self {
        Bindings {
            confirm: vec![PadButton::Start, PadButton::South],
            cancel: vec![PadButton::Select, PadButton::East],
            settings: vec![PadButton::North],
        }
    }

    /// Parse a configured list; unknown names are skipped, and a list with
    /// nothing usable keeps `fallback`.
    fn bind(names: &[String], fallback: &[PadButton]) -> Vec<PadButton> {
        let parsed: Vec<PadButton> = names.iter().filter_map(|n| PadButton::parse(n)).collect();
        if parsed.is_empty() {
            for n in names {
                log::warn!("unknown gamepad button {n:?}");
            }
            fallback.to_vec()
        } else {
            parsed
        }
    }
}

fn stick_directions(x: f32, y: f32) -> HeldDirections {
    HeldDirections {
        up: y > DEADZONE,
        down: y < -DEADZONE,
        left: x < -DEADZONE,
        right: x > DEADZONE,
    }
}

/// Directions that are held now but were not before.
fn rising(now: HeldDirections, before: HeldDirections) -> HeldDirections {
    HeldDirections {
        up: now.up && !before.up,
        down: now.down && !before.down,
        left: now.left && !before.left,
        right: now.right && !before.right,
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    held: HashSet<PadButton>,
    /// Buttons that went down since the last `update()`.
    pressed: HashSet<PadButton>,
    dpad: HeldDirections,
    stick: (f32, f32),
    /// Combined directions as of the previous frame, for edge detection.
    last_dirs: HeldDirections,
    dir_edges: HeldDirections,

    bindings: Bindings,
    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                log::debug!("gamepad support unavailable: {e}");
                None
            }
        };
        #[cfg(feature = "gamepad")]
        let connected = gilrs.as_ref().is_some_and(|g| g.gamepads().next().is_some());
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            held: HashSet::new(),
            pressed: HashSet::new(),
            dpad: HeldDirections::NONE,
            stick: (0.0, 0.0),
            last_dirs: HeldDirections::NONE,
            dir_edges: HeldDirections::NONE,
            bindings: Bindings::defaults(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let d = Bindings::defaults();
        self.bindings = Bindings {
            confirm: Bindings::bind(&cfg.confirm, &d.confirm),
            cancel: Bindings::bind(&cfg.cancel, &d.cancel),
            settings: Bindings::bind(&cfg.settings, &d.settings),
        };
    }

    /// Call once per frame, after draining the terminal.
    pub fn update(&mut self) {
        self.pressed.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        self.latch_directions();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };
        let events: Vec<EventType> = std::iter::from_fn(|| gilrs.next_event()).map(|e| e.event).collect();

        for event in events {
            match event {
                EventType::ButtonPressed(btn, _) => self.on_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.on_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick.0 = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick.1 = v,
                EventType::Connected => {
                    log::debug!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::debug!("gamepad disconnected");
                    self.connected = false;
                    self.reset();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn on_button(&mut self, btn: Button, down: bool) {
        self.connected = true;
        let dpad = &mut self.dpad;
        match btn {
            Button::DPadUp => dpad.up = down,
            Button::DPadDown => dpad.down = down,
            Button::DPadLeft => dpad.left = down,
            Button::DPadRight => dpad.right = down,
            other => {
                if let Some(b) = PadButton::from_gilrs(other) {
                    self.set_button(b, down);
                }
            }
        }
    }

    fn set_button(&mut self, b: PadButton, down: bool) {
        if down {
            if self.held.insert(b) {
                self.pressed.insert(b);
            }
        } else {
            self.held.remove(&b);
        }
    }

    fn latch_directions(&mut self) {
        let now = self.held_directions();
        self.dir_edges = rising(now, self.last_dirs);
        self.last_dirs = now;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn reset(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.dpad = HeldDirections::NONE;
        self.stick = (0.0, 0.0);
    }

    // ── Queries ──

    fn any_pressed(&self, buttons: &[PadButton]) -> bool {
        buttons.iter().any(|b| self.pressed.contains(b))
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(&self.bindings.confirm)
    }

    pub fn cancel_pressed(&self) -> bool {
        self.any_pressed(&self.bindings.cancel)
    }

    pub fn settings_pressed(&self) -> bool {
        self.any_pressed(&self.bindings.settings)
    }

    /// D-pad and stick, for continuous movement.
    pub fn held_directions(&self) -> HeldDirections {
        self.dpad.merge(stick_directions(self.stick.0, self.stick.1))
    }

    /// Directions that went down this frame, for menu navigation.
    pub fn directions_pressed(&self) -> HeldDirections {
        self.dir_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            held: HashSet::new(),
            pressed: HashSet::new(),
            dpad: HeldDirections::NONE,
            stick: (0.0, 0.0),
            last_dirs: HeldDirections::NONE,
            dir_edges: HeldDirections::NONE,
            bindings: Bindings::defaults(),
            connected: false,
        }
    }

    #[test]
    fn button_names_ignore_case() {
        assert_eq!(PadButton::parse("START"), Some(PadButton::Start));
        assert_eq!(PadButton::parse(" Back "), Some(PadButton::Select));
        assert_eq!(PadButton::parse("north"), Some(PadButton::North));
        assert_eq!(PadButton::parse("Turbo"), None);
    }

    #[test]
    fn config_replaces_only_usable_lists() {
        let mut gp = pad();
        gp.load_button_config(&GamepadConfig {
            confirm: vec!["X".into(), "bogus".into()],
            cancel: vec!["bogus".into()],
            settings: vec![],
        });
        assert_eq!(gp.bindings.confirm, vec![PadButton::West]);
        assert_eq!(gp.bindings.cancel, vec![PadButton::Select, PadButton::East]);
        assert_eq!(gp.bindings.settings, vec![PadButton::North]);
    }

    #[test]
    fn stick_diagonal_held_and_edge_once() {
        let mut gp = pad();
        gp.stick = (-0.8, 0.6);
        gp.update();
        let held = gp.held_directions();
        assert!(held.left && held.up && !held.right && !held.down);
        assert!(gp.directions_pressed().left);

        gp.update();
        assert!(gp.held_directions().left);
        assert!(!gp.directions_pressed().left);

        gp.stick = (0.1, 0.0);
        gp.update();
        assert!(!gp.held_directions().any());
    }

    #[test]
    fn action_fires_on_press_not_hold() {
        let mut gp = pad();
        gp.set_button(PadButton::North, true);
        assert!(gp.settings_pressed());
        gp.update();
        gp.set_button(PadButton::North, true);
        assert!(!gp.settings_pressed());
        gp.set_button(PadButton::North, false);
        gp.set_button(PadButton::North, true);
        assert!(gp.settings_pressed());
    }
}
