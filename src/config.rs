/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub physics: PhysicsConfig,
    pub round: RoundConfig,
    pub skins: Vec<String>,
    pub input: InputConfig,
    pub frame_ms: u64,
    pub max_frame_dt: f32,
    pub log_file: Option<PathBuf>,
}

/// Fixed layout in world pixels. Screen y grows downward.
#[derive(Clone, Debug)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    pub floor_margin: f32,
}

impl ScreenConfig {
    /// The y coordinate characters stand on.
    pub fn floor(&self) -> f32 {
        self.height - self.floor_margin
    }

    /// Fixed slot x-coordinates, one per character.
    pub fn slots(&self, count: usize) -> Vec<f32> {
        let step = (self.width / 12.0).floor();
        (1..=count).map(|i| step * i as f32).collect()
    }
}

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub scroll_speed: f32,
    pub jump_velocity: f32,  // magnitude, applied upward
    pub spin_impulse: f32,   // added on top of current upward velocity
    pub spin_hop: f32,       // instantaneous lift when the spin starts
    pub hit_velocity: f32,   // bounce when hit
    pub walk_frame_secs: f32,
    pub spin_secs: f32,
    pub spin_hold_secs: f32,
    pub slide_secs: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            scroll_speed: default_scroll_speed(),
            jump_velocity: default_jump_velocity(),
            spin_impulse: default_spin_impulse(),
            spin_hop: default_spin_hop(),
            hit_velocity: default_hit_velocity(),
            walk_frame_secs: default_walk_frame(),
            spin_secs: default_spin_secs(),
            spin_hold_secs: default_spin_hold(),
            slide_secs: default_slide_secs(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RoundConfig {
    pub duration_secs: f32,
    pub spawn_min_secs: f32,
    pub spawn_max_secs: f32,
    /// Collectible heights, in pixels above the floor.
    pub collectible_heights: Vec<f32>,
    pub seed: Option<u64>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        RoundConfig {
            duration_secs: default_duration(),
            spawn_min_secs: default_spawn_min(),
            spawn_max_secs: default_spawn_max(),
            collectible_heights: default_collectible_heights(),
            seed: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    /// Key names, one per character index.
    pub keys: Vec<String>,
    /// Gamepad button names, one per character index.
    pub buttons: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    screen: TomlScreen,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    round: TomlRound,
    #[serde(default)]
    players: TomlPlayers,
    #[serde(default)]
    input: TomlInput,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlScreen {
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
    #[serde(default = "default_floor_margin")]
    floor_margin: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_scroll_speed")]
    scroll_speed: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
    #[serde(default = "default_spin_impulse")]
    spin_impulse: f32,
    #[serde(default = "default_spin_hop")]
    spin_hop: f32,
    #[serde(default = "default_hit_velocity")]
    hit_velocity: f32,
    #[serde(default = "default_walk_frame")]
    walk_frame_secs: f32,
    #[serde(default = "default_spin_secs")]
    spin_secs: f32,
    #[serde(default = "default_spin_hold")]
    spin_hold_secs: f32,
    #[serde(default = "default_slide_secs")]
    slide_secs: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRound {
    #[serde(default = "default_duration")]
    duration_secs: f32,
    #[serde(default = "default_spawn_min")]
    spawn_min_secs: f32,
    #[serde(default = "default_spawn_max")]
    spawn_max_secs: f32,
    #[serde(default = "default_collectible_heights")]
    collectible_heights: Vec<f32>,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlPlayers {
    #[serde(default = "default_skins")]
    skins: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlInput {
    #[serde(default = "default_keys")]
    keys: Vec<String>,
    #[serde(default = "default_buttons")]
    buttons: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_max_frame_dt")]
    max_frame_dt: f32,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_width() -> f32 { 1280.0 }
fn default_height() -> f32 { 720.0 }
fn default_floor_margin() -> f32 { 70.0 }

fn default_gravity() -> f32 { 3000.0 }
fn default_scroll_speed() -> f32 { 301.0 }
fn default_jump_velocity() -> f32 { 1200.0 }
fn default_spin_impulse() -> f32 { 400.0 }
fn default_spin_hop() -> f32 { 20.0 }
fn default_hit_velocity() -> f32 { 800.0 }
fn default_walk_frame() -> f32 { 0.1 }
fn default_spin_secs() -> f32 { 0.33 }
fn default_spin_hold() -> f32 { 0.1 }
fn default_slide_secs() -> f32 { 0.3 }

fn default_duration() -> f32 { 60.0 }
fn default_spawn_min() -> f32 { 2.5 }
fn default_spawn_max() -> f32 { 5.0 }
fn default_collectible_heights() -> Vec<f32> { vec![60.0, 220.0, 380.0] }

fn default_skins() -> Vec<String> {
    vec!["alienblue".into(), "aliengreen".into(), "alienpink".into(), "alienyellow".into()]
}

fn default_keys() -> Vec<String> { vec!["1".into(), "2".into(), "3".into(), "4".into()] }
fn default_buttons() -> Vec<String> { vec!["A".into(), "B".into(), "X".into(), "Y".into()] }

fn default_frame_ms() -> u64 { 16 }
fn default_max_frame_dt() -> f32 { 0.1 }

/// Floor for `max_frame_dt`; the simulation never steps backwards or stalls.
const MIN_FRAME_DT: f32 = 0.001;

impl Default for TomlScreen {
    fn default() -> Self {
        TomlScreen {
            width: default_width(),
            height: default_height(),
            floor_margin: default_floor_margin(),
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            scroll_speed: default_scroll_speed(),
            jump_velocity: default_jump_velocity(),
            spin_impulse: default_spin_impulse(),
            spin_hop: default_spin_hop(),
            hit_velocity: default_hit_velocity(),
            walk_frame_secs: default_walk_frame(),
            spin_secs: default_spin_secs(),
            spin_hold_secs: default_spin_hold(),
            slide_secs: default_slide_secs(),
        }
    }
}

impl Default for TomlRound {
    fn default() -> Self {
        TomlRound {
            duration_secs: default_duration(),
            spawn_min_secs: default_spawn_min(),
            spawn_max_secs: default_spawn_max(),
            collectible_heights: default_collectible_heights(),
            seed: None,
        }
    }
}

impl Default for TomlPlayers {
    fn default() -> Self {
        TomlPlayers { skins: default_skins() }
    }
}

impl Default for TomlInput {
    fn default() -> Self {
        TomlInput {
            keys: default_keys(),
            buttons: default_buttons(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            frame_ms: default_frame_ms(),
            max_frame_dt: default_max_frame_dt(),
            log_file: None,
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        GameConfig::from_toml(load_toml(&search_dirs))
    }

    /// Parse config text directly. Parse errors fall back to defaults.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Self {
        GameConfig::from_toml(toml::from_str::<TomlConfig>(text).unwrap_or_default())
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let skins = if cfg.players.skins.is_empty() {
            eprintln!("Warning: [players] skins is empty, using the default four.");
            default_skins()
        } else {
            cfg.players.skins
        };

        // A reversed interval would make the spawn range empty.
        let (spawn_min, spawn_max) = {
            let (a, b) = (cfg.round.spawn_min_secs.max(0.0), cfg.round.spawn_max_secs.max(0.0));
            if a <= b { (a, b) } else { (b, a) }
        };

        let collectible_heights = if cfg.round.collectible_heights.is_empty() {
            default_collectible_heights()
        } else {
            cfg.round.collectible_heights
        };

        GameConfig {
            screen: ScreenConfig {
                width: cfg.screen.width,
                height: cfg.screen.height,
                floor_margin: cfg.screen.floor_margin,
            },
            physics: PhysicsConfig {
                gravity: cfg.physics.gravity,
                scroll_speed: cfg.physics.scroll_speed,
                jump_velocity: cfg.physics.jump_velocity,
                spin_impulse: cfg.physics.spin_impulse,
                spin_hop: cfg.physics.spin_hop,
                hit_velocity: cfg.physics.hit_velocity,
                walk_frame_secs: cfg.physics.walk_frame_secs,
                spin_secs: cfg.physics.spin_secs,
                spin_hold_secs: cfg.physics.spin_hold_secs,
                slide_secs: cfg.physics.slide_secs,
            },
            round: RoundConfig {
                duration_secs: cfg.round.duration_secs.max(0.0),
                spawn_min_secs: spawn_min,
                spawn_max_secs: spawn_max,
                collectible_heights,
                seed: cfg.round.seed,
            },
            skins,
            input: InputConfig {
                keys: cfg.input.keys,
                buttons: cfg.input.buttons,
            },
            frame_ms: cfg.general.frame_ms.max(1),
            max_frame_dt: cfg.general.max_frame_dt.max(MIN_FRAME_DT),
            log_file: cfg.general.log_file.filter(|s| !s.is_empty()).map(PathBuf::from),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
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
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
