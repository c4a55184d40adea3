/// Key sampler: which movement keys are held right now.
///
/// Fed by press/release edges from the terminal; read synchronously by the
/// stepper once per tick. Arrow keys and WASD map onto the same four
/// directions, and the directions are independent of each other.
///
/// A key with no press/repeat for `hold_timeout` counts as released. This
/// runs even when the terminal reports releases, since kitty-protocol
/// terminals send no release for text keys like `w` unless every key is
/// reported as an escape code. A trusted release just drops the key early.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use crate::domain::entity::HeldDirections;

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];

pub struct KeySampler {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,
    hold_timeout: Duration,
    /// Whether Release events are trusted. Only true when the terminal
    /// confirmed keyboard enhancement.
    pub honor_release: bool,
}

impl KeySampler {
    pub fn new(hold_timeout: Duration) -> Self {
        KeySampler {
            last_active: HashMap::with_capacity(16),
            hold_timeout,
            honor_release: false,
        }
    }

    pub fn press(&mut self, code: KeyCode, at: Instant) {
        self.last_active.insert(code, at);
    }

    pub fn release(&mut self, code: KeyCode) {
        if self.honor_release {
            self.last_active.remove(&code);
        }
    }

    /// Drop keys whose last press is older than the hold timeout.
    pub fn expire(&mut self, now: Instant) {
        let timeout = self.hold_timeout;
        self.last_active.retain(|_, t| now.saturating_duration_since(*t) < timeout);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.contains_key(&code)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn held_directions(&self) -> HeldDirections {
        HeldDirections {
            up: self.any_held(KEYS_UP),
            down: self.any_held(KEYS_DOWN),
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
        }
    }

    pub fn clear(&mut self) {
        self.last_active.clear();
    }
}
