/// AppState: which screen is up and what each screen holds.
///
/// Phases:
///   Customize ──Start──▶ Playing ──Settings──▶ Customize
///   Customize ──Chats──▶ Messenger ──Esc──▶ Customize
///
/// Leaving `Playing` tears the session down before it is dropped, so the
/// tick and key routing die with it.

use std::time::Instant;

use crate::config::GameConfig;
use crate::domain::chat::ChatState;
use crate::domain::profile::Profile;
use super::session::SceneSession;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Customize,
    Playing,
    Messenger,
}

pub struct AppState {
    pub phase: Phase,
    pub profile: Profile,
    pub session: Option<SceneSession>,
    pub chat: ChatState,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    /// Set whenever something visible changed; cleared by the renderer.
    pub dirty: bool,
    pub honor_release: bool,
    /// Shown in the meadow HUD.
    pub pad_connected: bool,
}

impl AppState {
    pub fn new(cfg: &GameConfig) -> Self {
        AppState {
            phase: Phase::Customize,
            profile: Profile::new(&cfg.profile.name, cfg.profile.color),
            session: None,
            chat: ChatState::new(),
            message: String::new(),
            message_timer: 0,
            dirty: true,
            honor_release: false,
            pad_connected: false,
        }
    }

    pub fn set_message(&mut self, msg: &str, ticks: u32) {
        self.message = msg.to_string();
        self.message_timer = ticks;
        self.dirty = true;
    }

    /// Count down the status message; clears it when the timer runs out.
    /// A zero timer means "until replaced".
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
                self.dirty = true;
            }
        }
    }

    /// Start a fresh meadow with the current profile.
    pub fn start_scene(&mut self, cfg: &GameConfig, now: Instant) {
        self.end_scene();
        let mut session = SceneSession::start(cfg, &self.profile, now);
        session.set_honor_release(self.honor_release);
        self.install_session(session);
    }

    /// Install an already-built session (used with seeded sessions in tests).
    pub fn install_session(&mut self, session: SceneSession) {
        self.session = Some(session);
        self.phase = Phase::Playing;
        self.message.clear();
        self.message_timer = 0;
        self.dirty = true;
    }

    /// Back to the customization screen. The running scene is torn down.
    pub fn open_settings(&mut self) {
        self.end_scene();
        self.phase = Phase::Customize;
        self.dirty = true;
    }

    pub fn open_messenger(&mut self) {
        self.end_scene();
        self.phase = Phase::Messenger;
        self.dirty = true;
    }

    pub fn close_messenger(&mut self) {
        self.phase = Phase::Customize;
        self.dirty = true;
    }

    fn end_scene(&mut self) {
        if let Some(mut s) = self.session.take() {
            s.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::HeldDirections;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(app: &AppState, cfg: &GameConfig, now: Instant) -> SceneSession {
        SceneSession::start_with_rng(cfg, &app.profile, now, StdRng::seed_from_u64(3))
    }

    #[test]
    fn starts_on_customize_with_config_profile() {
        let mut cfg = GameConfig::default();
        cfg.profile.name = "Clover".into();
        cfg.profile.color = 6;
        let app = AppState::new(&cfg);
        assert_eq!(app.phase, Phase::Customize);
        assert_eq!(app.profile.name, "Clover");
        assert_eq!(app.profile.color_index, 6);
        assert!(app.session.is_none());
    }

    #[test]
    fn settings_drops_session() {
        let cfg = GameConfig::default();
        let now = Instant::now();
        let mut app = AppState::new(&cfg);
        let s = seeded(&app, &cfg, now);
        app.install_session(s);
        assert_eq!(app.phase, Phase::Playing);

        app.open_settings();
        assert_eq!(app.phase, Phase::Customize);
        assert!(app.session.is_none());
    }

    #[test]
    fn restart_gives_fresh_player() {
        let cfg = GameConfig::default();
        let t0 = Instant::now();
        let mut app = AppState::new(&cfg);
        let s = seeded(&app, &cfg, t0);
        app.install_session(s);
        let held = HeldDirections { down: true, ..HeldDirections::NONE };
        for i in 1..=10 {
            if let Some(s) = app.session.as_mut() {
                s.poll(t0 + std::time::Duration::from_millis(16 * i), held);
            }
        }
        let y = app.session.as_ref().map(|s| s.scene().player.y);
        assert_eq!(y, Some(330.0));

        app.open_settings();
        app.profile.push_char('!');
        app.start_scene(&cfg, Instant::now());
        let scene = app.session.as_ref().unwrap().scene();
        assert_eq!((scene.player.x, scene.player.y), (400.0, 300.0));
        assert_eq!(scene.player.name, "Pony!");
    }

    #[test]
    fn message_timer_clears() {
        let mut app = AppState::new(&GameConfig::default());
        app.set_message("hello", 2);
        app.tick_message();
        assert_eq!(app.message, "hello");
        app.tick_message();
        assert!(app.message.is_empty());
    }

    #[test]
    fn messenger_round_trip_keeps_chat() {
        let mut app = AppState::new(&GameConfig::default());
        app.open_messenger();
        assert_eq!(app.phase, Phase::Messenger);
        app.chat.select_contact(4);
        app.close_messenger();
        assert_eq!(app.phase, Phase::Customize);
        assert_eq!(app.chat.selected, Some(4));
    }
}
