/// SceneSession: one run of the meadow, from Start to teardown.
///
/// Owns everything the tick needs: the scene, the key sampler, the fixed-rate
/// ticker and the random source. Input reaches the stepper only through the
/// session, so once `teardown()` has run neither a late tick nor a stale key
/// event can touch the scene again.

use std::time::{Duration, Instant};

use crossterm::event::{KeyEvent, KeyEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::entity::HeldDirections;
use crate::domain::profile::Profile;
use super::sampler::KeySampler;
use super::step::{self, StepOutcome};
use super::world::SceneState;

/// Fixed-interval schedule. A late tick is followed at once by the next one,
/// but missed ticks are not replayed.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
    cancelled: bool,
}

impl Ticker {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Ticker { interval, next: start + interval, cancelled: false }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if self.cancelled || now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next < now {
            self.next = now;
        }
        true
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

pub struct SceneSession {
    scene: SceneState,
    sampler: KeySampler,
    ticker: Ticker,
    rng: StdRng,
    live: bool,
}

impl SceneSession {
    pub fn start(cfg: &GameConfig, profile: &Profile, now: Instant) -> Self {
        Self::start_with_rng(cfg, profile, now, StdRng::from_entropy())
    }

    pub fn start_with_rng(cfg: &GameConfig, profile: &Profile, now: Instant, mut rng: StdRng) -> Self {
        let scene = SceneState::new(&cfg.scene, profile, &mut rng);
        log::info!(
            "scene start: {} as {:?}, {} npcs, tick {} ms",
            scene.player.name, scene.player.color, scene.npcs.len(), cfg.scene.tick_rate_ms
        );
        SceneSession {
            scene,
            sampler: KeySampler::new(Duration::from_millis(cfg.input.hold_timeout_ms)),
            ticker: Ticker::new(Duration::from_millis(cfg.scene.tick_rate_ms), now),
            rng,
            live: true,
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn set_honor_release(&mut self, honor: bool) {
        self.sampler.honor_release = honor;
    }

    /// Route one raw key event into the sampler. Ignored after teardown.
    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if !self.live {
            return;
        }
        match key.kind {
            KeyEventKind::Release => self.sampler.release(key.code),
            _ => self.sampler.press(key.code, now),
        }
    }

    /// Run one tick if the ticker is due. `extra` is OR-ed with the keyboard
    /// (gamepad directions).
    pub fn poll(&mut self, now: Instant, extra: HeldDirections) -> Option<StepOutcome> {
        if !self.live {
            return None;
        }
        self.sampler.expire(now);
        if !self.ticker.due(now) {
            return None;
        }
        let held = self.sampler.held_directions().merge(extra);
        Some(step::step(&mut self.scene, held, &mut self.rng))
    }

    /// Stop ticking and forget held keys. Idempotent.
    pub fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        self.ticker.cancel();
        self.sampler.clear();
        log::info!("scene teardown after {} ticks", self.scene.tick);
    }
}

impl Drop for SceneSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    const TICK: Duration = Duration::from_millis(16);

    fn session(t0: Instant) -> SceneSession {
        let mut cfg = GameConfig::default();
        cfg.scene.wander.start_chance = 0.0;
        cfg.scene.wander.stop_chance = 0.0;
        let mut s = SceneSession::start_with_rng(&cfg, &Profile::default(), t0, StdRng::seed_from_u64(11));
        for n in s.scene.npcs.iter_mut() {
            n.is_moving = false;
        }
        s
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ticker_waits_for_interval() {
        let t0 = Instant::now();
        let mut t = Ticker::new(TICK, t0);
        assert!(!t.due(t0));
        assert!(!t.due(t0 + Duration::from_millis(10)));
        assert!(t.due(t0 + TICK));
        assert!(!t.due(t0 + TICK));
        assert!(t.due(t0 + TICK * 2));
    }

    #[test]
    fn late_tick_runs_once_then_next_immediately() {
        let t0 = Instant::now();
        let mut t = Ticker::new(TICK, t0);
        let late = t0 + TICK * 10;
        assert!(t.due(late));
        assert!(t.due(late));
        assert!(!t.due(late));
        assert!(t.due(late + TICK));
    }

    #[test]
    fn cancelled_ticker_never_fires() {
        let t0 = Instant::now();
        let mut t = Ticker::new(TICK, t0);
        t.cancel();
        assert!(t.cancelled);
        assert!(!t.due(t0 + TICK * 100));
    }

    #[test]
    fn held_key_moves_player_on_tick() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.handle_key(&press(KeyCode::Char('a')), t0);
        assert!(s.poll(t0 + Duration::from_millis(5), HeldDirections::NONE).is_none());
        let out = s.poll(t0 + TICK, HeldDirections::NONE).unwrap();
        assert!(out.changed);
        assert_eq!(s.scene().player.x, 397.0);
    }

    #[test]
    fn gamepad_directions_merge_with_keys() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.handle_key(&press(KeyCode::Up), t0);
        let pad = HeldDirections { right: true, ..HeldDirections::NONE };
        s.poll(t0 + TICK, pad).unwrap();
        assert_eq!((s.scene().player.x, s.scene().player.y), (403.0, 297.0));
    }

    #[test]
    fn stale_input_after_teardown_is_ignored() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.handle_key(&press(KeyCode::Right), t0);
        s.teardown();
        let frozen = s.scene().clone();

        s.handle_key(&press(KeyCode::Down), t0 + TICK);
        assert!(!s.sampler.held_directions().any());
        for i in 1..20 {
            assert!(s.poll(t0 + TICK * i, HeldDirections { left: true, ..HeldDirections::NONE }).is_none());
        }
        assert_eq!(s.scene(), &frozen);
        assert!(!s.live);
        s.teardown();
    }

    #[test]
    fn release_stops_motion_with_enhancement() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.set_honor_release(true);
        s.handle_key(&press(KeyCode::Right), t0);
        let mut up = press(KeyCode::Right);
        up.kind = KeyEventKind::Release;
        s.handle_key(&up, t0 + Duration::from_millis(1));
        s.poll(t0 + TICK, HeldDirections::NONE).unwrap();
        assert_eq!(s.scene().player.x, 400.0);
        assert!(!s.scene().player.is_moving);
    }

    #[test]
    fn tapped_letter_stops_after_hold_timeout_with_enhancement() {
        // Kitty-protocol terminals send no release for 'd'.
        let t0 = Instant::now();
        let mut s = session(t0);
        s.set_honor_release(true);
        s.handle_key(&press(KeyCode::Char('d')), t0);

        let later = t0 + Duration::from_secs(10);
        s.poll(later, HeldDirections::NONE).unwrap();
        s.poll(later + Duration::from_millis(20), HeldDirections::NONE).unwrap();
        assert!(!s.sampler.held_directions().right);
        assert_eq!(s.scene().player.x, 400.0);
        assert!(!s.scene().player.is_moving);
    }
}
