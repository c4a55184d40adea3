/// Terminal event drain.
///
/// Collects every pending key event once per frame without blocking. Held
/// state for movement lives in the scene's `KeySampler`; this only hands the
/// raw events over, plus a flag when the terminal was resized.
///
/// Release events only arrive when keyboard enhancement is active.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Raw key events collected during the last drain, in arrival order.
    pub keys: Vec<KeyEvent>,
    pub resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            keys: Vec::with_capacity(8),
            resized: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.keys.clear();
        self.resized = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.keys.push(key),
                Ok(Event::Resize(..)) => self.resized = true,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal read failed: {e}");
                    break;
                }
            }
        }
    }

    /// Press and repeat events only; menus act on these.
    pub fn presses(&self) -> impl Iterator<Item = &KeyEvent> {
        self.keys.iter().filter(|k| k.kind != KeyEventKind::Release)
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers, kind, state: KeyEventState::NONE }
    }

    #[test]
    fn presses_skip_releases() {
        let mut input = InputState::new();
        input.keys = vec![
            key(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Press),
            key(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release),
            key(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Repeat),
        ];
        assert_eq!(input.presses().count(), 2);
    }

    #[test]
    fn ctrl_c_needs_control() {
        let mut input = InputState::new();
        input.keys = vec![key(KeyCode::Char('c'), KeyModifiers::NONE, KeyEventKind::Press)];
        assert!(!input.ctrl_c_pressed());
        input.keys.push(key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press));
        assert!(input.ctrl_c_pressed());
    }
}
