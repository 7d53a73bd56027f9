/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub session: SessionConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
}

/// Simulation constants. Units are world pixels and ticks.
#[derive(Clone, Debug, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_underwater_gravity")]
    pub underwater_gravity: f32,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_jump_force")]
    pub jump_force: f32,
    #[serde(default = "default_swim_force")]
    pub swim_force: f32,
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    #[serde(default = "default_air_acceleration")]
    pub air_acceleration: f32,
    #[serde(default = "default_water_acceleration")]
    pub water_acceleration: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_air_friction")]
    pub air_friction: f32,
    #[serde(default = "default_water_friction")]
    pub water_friction: f32,
    #[serde(default = "default_terminal_velocity")]
    pub terminal_velocity: f32,
    #[serde(default = "default_terminal_velocity_water")]
    pub terminal_velocity_water: f32,
    #[serde(default = "default_goomba_speed")]
    pub goomba_speed: f32,
    #[serde(default = "default_spiny_speed")]
    pub spiny_speed: f32,
    #[serde(default = "default_mushroom_speed")]
    pub mushroom_speed: f32,
    #[serde(default = "default_star_speed")]
    pub star_speed: f32,
    #[serde(default = "default_fireball_speed")]
    pub fireball_speed: f32,
    #[serde(default = "default_boo_speed")]
    pub boo_speed: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Simulation ticks per countdown second.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
    #[serde(default = "default_lives")]
    pub starting_lives: u32,
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
    #[serde(default = "default_ammo")]
    pub starting_ammo: u32,
    #[serde(default = "default_view_width")]
    pub view_width: f32,
    /// Fixed RNG seed. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub fire: Vec<String>,
    pub run: Vec<String>,
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: Option<PhysicsConfig>,
    #[serde(default)]
    session: Option<SessionConfig>,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_fire")]
    fire: Vec<String>,
    #[serde(default = "default_pad_run")]
    run: Vec<String>,
    #[serde(default = "default_pad_pause")]
    pause: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_tile_size() -> f32 { 40.0 }
fn default_gravity() -> f32 { 0.6 }
fn default_underwater_gravity() -> f32 { 0.15 }
fn default_move_speed() -> f32 { 6.0 }
fn default_jump_force() -> f32 { -13.0 }
fn default_swim_force() -> f32 { -4.0 }
fn default_acceleration() -> f32 { 0.6 }
fn default_air_acceleration() -> f32 { 0.4 }
fn default_water_acceleration() -> f32 { 0.25 }
fn default_friction() -> f32 { 0.8 }
fn default_air_friction() -> f32 { 0.95 }
fn default_water_friction() -> f32 { 0.92 }
fn default_terminal_velocity() -> f32 { 12.0 }
fn default_terminal_velocity_water() -> f32 { 3.0 }
fn default_goomba_speed() -> f32 { 1.0 }
fn default_spiny_speed() -> f32 { 1.2 }
fn default_mushroom_speed() -> f32 { 2.0 }
fn default_star_speed() -> f32 { 3.0 }
fn default_fireball_speed() -> f32 { 9.0 }
fn default_boo_speed() -> f32 { 1.0 }

fn default_tick_rate() -> u64 { 16 }      // ~60 ticks per second
fn default_ticks_per_second() -> u32 { 60 }
fn default_lives() -> u32 { 3 }
fn default_time_limit() -> u32 { 300 }
fn default_ammo() -> u32 { 50 }
fn default_view_width() -> f32 { 1280.0 }

fn default_pad_jump() -> Vec<String> { vec!["A".into()] }
fn default_pad_fire() -> Vec<String> { vec!["X".into(), "R1".into()] }
fn default_pad_run() -> Vec<String> { vec!["B".into()] }
fn default_pad_pause() -> Vec<String> { vec!["Start".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pad_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_levels_dir() -> String { "levels".into() }

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            tile_size: default_tile_size(),
            gravity: default_gravity(),
            underwater_gravity: default_underwater_gravity(),
            move_speed: default_move_speed(),
            jump_force: default_jump_force(),
            swim_force: default_swim_force(),
            acceleration: default_acceleration(),
            air_acceleration: default_air_acceleration(),
            water_acceleration: default_water_acceleration(),
            friction: default_friction(),
            air_friction: default_air_friction(),
            water_friction: default_water_friction(),
            terminal_velocity: default_terminal_velocity(),
            terminal_velocity_water: default_terminal_velocity_water(),
            goomba_speed: default_goomba_speed(),
            spiny_speed: default_spiny_speed(),
            mushroom_speed: default_mushroom_speed(),
            star_speed: default_star_speed(),
            fireball_speed: default_fireball_speed(),
            boo_speed: default_boo_speed(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            tick_rate_ms: default_tick_rate(),
            ticks_per_second: default_ticks_per_second(),
            starting_lives: default_lives(),
            time_limit: default_time_limit(),
            starting_ammo: default_ammo(),
            view_width: default_view_width(),
            seed: None,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            fire: default_pad_fire(),
            run: default_pad_run(),
            pause: default_pad_pause(),
            confirm: default_pad_confirm(),
            cancel: default_pad_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory, XDG data, system data.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly. Invalid text yields the defaults.
    pub fn from_toml_str(text: &str) -> Self {
        let toml_cfg = match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("config parse error: {e}; using default settings");
                TomlConfig::default()
            }
        };
        GameConfig::from_toml(toml_cfg, &[])
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            physics: toml_cfg.physics.unwrap_or_default(),
            session: toml_cfg.session.unwrap_or_default(),
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                fire: toml_cfg.gamepad.fire,
                run: toml_cfg.gamepad.run,
                pause: toml_cfg.gamepad.pause,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a packaged binary still finds data next to the real file.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/pipeland");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/pipeland");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    log::info!("loaded {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{} parse error: {e}; using default settings", path.display());
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}
