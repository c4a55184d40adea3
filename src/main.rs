/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use config::GameConfig;
use domain::chat::{clock_label, ChatFocus};
use domain::profile::NAME_LIMIT;
use sim::app::{AppState, Phase};
use sim::session::Ticker;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{play_scene_events, Sfx, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// Status messages stay up for about two seconds.
const MESSAGE_TICKS: u32 = 120;
const MAX_RENDER_FAILURES: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Flow {
    Continue,
    Quit,
}

fn main() {
    // stderr shares the terminal; redirect it (2>meadow.log) to read debug output.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let mut app = AppState::new(&config);

    let mut renderer = Renderer::new();
    match renderer.init() {
        Ok(enhanced) => app.honor_release = enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    }

    let sound = SoundEngine::new();

    let result = app_loop(&mut app, &mut renderer, sound.as_ref(), &config);

    // Stop the scene before the terminal goes back to normal.
    app.open_settings();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Meadow error: {e}");
    }

    println!("Bye, {}!", app.profile.display_name());
}

fn app_loop(
    app: &mut AppState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut ui_tick = Ticker::new(Duration::from_millis(config.scene.tick_rate_ms), Instant::now());
    let mut render_failures = 0u32;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if gp.connected != app.pad_connected {
            app.pad_connected = gp.connected;
            app.dirty = true;
        }

        let now = Instant::now();
        let flow = match app.phase {
            Phase::Customize => handle_customize(app, &kb, &gp, sound, config, now),
            Phase::Playing => handle_playing(app, &kb, &gp, now),
            Phase::Messenger => handle_messenger(app, &kb, &gp, sound, config),
        };
        if flow == Flow::Quit {
            break;
        }

        if let Some(session) = app.session.as_mut() {
            if let Some(outcome) = session.poll(now, gp.held_directions()) {
                if outcome.changed {
                    app.dirty = true;
                }
                play_scene_events(sound, &outcome.events);
            }
        }

        if ui_tick.due(now) {
            app.tick_message();
        }

        if app.dirty || kb.resized {
            // A failed repaint is skipped; only a terminal that keeps failing ends the loop.
            match renderer.render(app) {
                Ok(()) => render_failures = 0,
                Err(e) => {
                    render_failures += 1;
                    log::warn!("repaint skipped: {e}");
                    if render_failures >= MAX_RENDER_FAILURES {
                        return Err(e.into());
                    }
                }
            }
            app.dirty = false;
        }
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Plain character typed without Ctrl/Alt.
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}

// ── Customize ──

fn handle_customize(
    app: &mut AppState,
    kb: &InputState,
    gp: &GamepadState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    now: Instant,
) -> Flow {
    let mut start = gp.confirm_pressed();
    let pad = gp.directions_pressed();
    if pad.left {
        app.profile.cycle_color(-1);
        app.dirty = true;
    }
    if pad.right {
        app.profile.cycle_color(1);
        app.dirty = true;
    }

    for key in kb.presses() {
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Enter => start = true,
            KeyCode::Tab => {
                app.open_messenger();
                return Flow::Continue;
            }
            KeyCode::Left => app.profile.cycle_color(-1),
            KeyCode::Right => app.profile.cycle_color(1),
            KeyCode::Backspace => app.profile.pop_char(),
            _ => {
                if let Some(c) = typed_char(key) {
                    if !app.profile.push_char(c) && app.profile.name.chars().count() >= NAME_LIMIT {
                        app.set_message(&format!("Names are at most {NAME_LIMIT} characters"), MESSAGE_TICKS);
                    }
                }
            }
        }
        app.dirty = true;
    }

    if start {
        app.start_scene(config, now);
        if let Some(sfx) = sound {
            sfx.play(Sfx::Start);
        }
        let greeting = format!("Welcome to the meadow, {}!", app.profile.display_name());
        app.set_message(&greeting, MESSAGE_TICKS);
    }
    Flow::Continue
}

// ── Playing ──

fn handle_playing(app: &mut AppState, kb: &InputState, gp: &GamepadState, now: Instant) -> Flow {
    if gp.settings_pressed() || gp.cancel_pressed() {
        app.open_settings();
        return Flow::Continue;
    }

    for key in &kb.keys {
        let leave = key.kind != KeyEventKind::Release
            && matches!(key.code, KeyCode::Esc | KeyCode::F(1));
        if leave {
            app.open_settings();
            return Flow::Continue;
        }
        if let Some(session) = app.session.as_mut() {
            session.handle_key(key, now);
        }
    }
    Flow::Continue
}

// ── Messenger ──

fn wall_clock(utc_offset_minutes: i32) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    clock_label(secs, utc_offset_minutes)
}

fn handle_messenger(
    app: &mut AppState,
    kb: &InputState,
    gp: &GamepadState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Flow {
    if gp.cancel_pressed() {
        app.close_messenger();
        return Flow::Continue;
    }
    let pad = gp.directions_pressed();
    if pad.up || pad.down {
        app.chat.focus = ChatFocus::Contacts;
        app.chat.move_cursor(if pad.up { -1 } else { 1 });
        app.dirty = true;
    }
    if gp.confirm_pressed() && app.chat.select_at_cursor() {
        if let Some(sfx) = sound {
            sfx.play(Sfx::Select);
        }
        app.dirty = true;
    }

    for key in kb.presses() {
        let chat = &mut app.chat;
        match key.code {
            KeyCode::Esc => {
                app.close_messenger();
                return Flow::Continue;
            }
            KeyCode::Tab => chat.cycle_focus(),
            KeyCode::Up | KeyCode::Down => {
                chat.focus = ChatFocus::Contacts;
                chat.move_cursor(if key.code == KeyCode::Up { -1 } else { 1 });
            }
            KeyCode::Enter => match chat.focus {
                ChatFocus::Draft => {
                    if chat.send(&wall_clock(config.messenger.utc_offset_minutes)) {
                        if let Some(sfx) = sound {
                            sfx.play(Sfx::Send);
                        }
                    }
                }
                ChatFocus::Search | ChatFocus::Contacts => {
                    if chat.select_at_cursor() {
                        if let Some(sfx) = sound {
                            sfx.play(Sfx::Select);
                        }
                    }
                }
            },
            KeyCode::Backspace => chat.pop_char(),
            _ => {
                if let Some(c) = typed_char(key) {
                    chat.push_char(c);
                }
            }
        }
        app.dirty = true;
    }
    Flow::Continue
}
