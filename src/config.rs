/// Settings from `config.toml`: scene tuning, input timing, the starting
/// profile and gamepad bindings.
///
/// Every key is optional. Values are clamped into safe ranges when the file
/// is converted, so the rest of the crate never sees a zero period or a
/// probability above one.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::entity::PALETTE;
use crate::domain::profile::DEFAULT_NAME;
use crate::domain::wander::WanderPolicy;

/// Hard cap on the NPC batch; the meadow gets unreadable past this.
const MAX_NPCS: usize = 32;
/// Real zones span UTC-12 to UTC+14.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub scene: SceneConfig,
    pub input: InputConfig,
    pub profile: ProfileConfig,
    pub gamepad: GamepadConfig,
    pub messenger: MessengerConfig,
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub tick_rate_ms: u64,
    pub player_speed: f32,
    pub npc_count: usize,
    pub player_anim_period: u32,  // ticks between walk frames while moving
    pub wander: WanderPolicy,
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    /// Fallback release detection for terminals without key-up events.
    pub hold_timeout_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ProfileConfig {
    pub name: String,
    pub color: usize,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub settings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct MessengerConfig {
    /// Local time offset for sent-message timestamps.
    pub utc_offset_minutes: i32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    scene: TomlScene,
    #[serde(default)]
    input: TomlInput,
    #[serde(default)]
    profile: TomlProfile,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    messenger: TomlMessenger,
}

#[derive(Deserialize, Debug)]
struct TomlScene {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_npc_count")]
    npc_count: usize,
    #[serde(default = "default_player_anim")]
    player_anim_period: u32,
    #[serde(default = "default_npc_anim")]
    npc_anim_period: u32,
    #[serde(default = "default_start_chance")]
    npc_start_chance: f64,
    #[serde(default = "default_stop_chance")]
    npc_stop_chance: f64,
    #[serde(default = "default_turn_chance")]
    npc_turn_chance: f64,
}

#[derive(Deserialize, Debug)]
struct TomlInput {
    #[serde(default = "default_hold_timeout")]
    hold_timeout_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlProfile {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    color: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_settings")]
    settings: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlMessenger {
    #[serde(default)]
    utc_offset_minutes: i32,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }     // ~60 ticks per second
fn default_player_speed() -> f32 { 3.0 }
fn default_npc_count() -> usize { 5 }
fn default_player_anim() -> u32 { 10 }
fn default_npc_anim() -> u32 { 5 }
fn default_start_chance() -> f64 { 0.01 }
fn default_stop_chance() -> f64 { 0.02 }
fn default_turn_chance() -> f64 { 0.01 }
fn default_hold_timeout() -> u64 { 160 }
fn default_name() -> String { DEFAULT_NAME.into() }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into(), "B".into()] }
fn default_settings() -> Vec<String> { vec!["Y".into()] }

impl Default for TomlScene {
    fn default() -> Self {
        TomlScene {
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
            npc_count: default_npc_count(),
            player_anim_period: default_player_anim(),
            npc_anim_period: default_npc_anim(),
            npc_start_chance: default_start_chance(),
            npc_stop_chance: default_stop_chance(),
            npc_turn_chance: default_turn_chance(),
        }
    }
}

impl Default for TomlInput {
    fn default() -> Self {
        TomlInput { hold_timeout_ms: default_hold_timeout() }
    }
}

impl Default for TomlProfile {
    fn default() -> Self {
        TomlProfile { name: default_name(), color: 0 }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            settings: default_settings(),
        }
    }
}

/// Probabilities outside [0, 1] would make `gen_bool` panic.
fn chance(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        let speed = if t.scene.player_speed.is_finite() && t.scene.player_speed > 0.0 {
            t.scene.player_speed
        } else {
            default_player_speed()
        };
        GameConfig {
            scene: SceneConfig {
                tick_rate_ms: t.scene.tick_rate_ms.max(1),
                player_speed: speed,
                npc_count: t.scene.npc_count.min(MAX_NPCS),
                player_anim_period: t.scene.player_anim_period.max(1),
                wander: WanderPolicy {
                    start_chance: chance(t.scene.npc_start_chance),
                    stop_chance: chance(t.scene.npc_stop_chance),
                    turn_chance: chance(t.scene.npc_turn_chance),
                    anim_period: t.scene.npc_anim_period.max(1),
                },
            },
            input: InputConfig { hold_timeout_ms: t.input.hold_timeout_ms },
            profile: ProfileConfig {
                name: t.profile.name,
                color: t.profile.color % PALETTE.len(),
            },
            gamepad: GamepadConfig {
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                settings: t.gamepad.settings,
            },
            messenger: MessengerConfig {
                utc_offset_minutes: t
                    .messenger
                    .utc_offset_minutes
                    .clamp(-MAX_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES),
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// First readable `config.toml` from `candidate_dirs()`, or defaults.
    /// A file that fails to parse is reported and ignored.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(cfg) => {
                    log::info!("loaded {}", path.display());
                    return cfg;
                }
                Err(e @ ConfigError::Parse(_)) => {
                    log::warn!("{e}; using default settings");
                    return GameConfig::default();
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        log::debug!("no config.toml found; using defaults");
        GameConfig::default()
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TomlConfig = toml::from_str(text)?;
        Ok(cfg.into())
    }
}

/// Where `config.toml` may live, most specific first: next to the binary,
/// the working directory, then the per-user and system data dirs.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();
    let user = std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local/share/meadow"))
        .filter(|d| d.is_dir());
    let system = Some(PathBuf::from("/usr/share/meadow")).filter(|d| d.is_dir());

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in [exe_dir, cwd, user, system].into_iter().flatten() {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}
