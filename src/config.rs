use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_game_config);
    }
}

/// Every tunable number in the game.
///
/// The defaults reproduce the classic feel: 200×20 platforms, gaps between
/// 200 and 400 units, a bridge that grows 2 units every 10 ms, and a half
/// second pause before it tips over.
///
/// ## Partial config files
///
/// Every field carries #[serde(default)] through the container attribute, so a
/// `bridge.ron` that only sets `move_duration: 0.5` still loads: everything
/// missing comes from `GameConfig::default()`.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Width and height of every platform.
    pub platform_size: (f32, f32),
    /// Center of the first platform of each attempt.
    pub first_platform: (f32, f32),
    /// Lower bound (inclusive) of the center-to-center distance between platforms.
    pub min_gap: f32,
    /// Upper bound (exclusive) of the center-to-center distance between platforms.
    pub max_gap: f32,
    pub growth_interval_ms: u64,
    pub growth_step: f32,
    /// Seconds between releasing the press and the bridge starting to tip.
    pub drop_delay: f32,
    /// Seconds the bridge takes to rotate flat.
    pub rotation_duration: f32,
    /// Seconds the player takes to walk across (or fall).
    pub move_duration: f32,
    /// Angle of a bridge lying flat, in degrees.
    pub fallen_angle: f32,
    /// How far short of the gap a bridge may be and still count.
    pub length_tolerance: f32,
    /// Maximum distance between bridge tip and indicator for the bonus.
    pub bonus_radius: f32,
    pub bonus_points: u32,
    pub base_points: u32,
    /// How far the player drops when the bridge is too short or too long.
    pub fall_depth: f32,
    pub player_size: (f32, f32),
    pub indicator_size: (f32, f32),
    pub bridge_width: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            platform_size: (200.0, 20.0),
            first_platform: (0.0, -100.0),
            min_gap: 200.0,
            max_gap: 400.0,
            growth_interval_ms: 10,
            growth_step: 2.0,
            drop_delay: DEFAULT.drop_delay,
            rotation_duration: DEFAULT.rotation_duration,
            move_duration: DEFAULT.move_duration,
            fallen_angle: -90.0,
            length_tolerance: 2.0,
            bonus_radius: 10.0,
            bonus_points: 10,
            base_points: 1,
            fall_depth: 500.0,
            player_size: (30.0, 50.0),
            indicator_size: (10.0, 6.0),
            bridge_width: 6.0,
        }
    }
}

/// Fallback timings for values a config file got wrong.
struct DefaultTimings {
    drop_delay: f32,
    rotation_duration: f32,
    move_duration: f32,
}

const DEFAULT: DefaultTimings = DefaultTimings {
    drop_delay: 0.5,
    rotation_duration: 0.5,
    move_duration: 0.3,
};

/// Negative, NaN or absurdly large seconds cannot become a Duration. Those
/// are logged and replaced by the built-in value.
fn seconds_or_default(name: &str, secs: f32, default: f32) -> Duration {
    match Duration::try_from_secs_f32(secs) {
        Ok(duration) => duration,
        Err(e) => {
            error!("Invalid {} of {} seconds ({}). Using {}.", name, secs, e, default);
            Duration::from_secs_f32(default)
        }
    }
}

impl GameConfig {
    pub fn platform_size(&self) -> Vec2 {
        Vec2::new(self.platform_size.0, self.platform_size.1)
    }

    pub fn first_platform(&self) -> Vec2 {
        Vec2::new(self.first_platform.0, self.first_platform.1)
    }

    pub fn player_size(&self) -> Vec2 {
        Vec2::new(self.player_size.0, self.player_size.1)
    }

    pub fn indicator_size(&self) -> Vec2 {
        Vec2::new(self.indicator_size.0, self.indicator_size.1)
    }

    /// Never zero: a zero-length repeating timer would fire without end.
    pub fn growth_interval(&self) -> Duration {
        Duration::from_millis(self.growth_interval_ms.max(1))
    }

    pub fn drop_delay(&self) -> Duration {
        seconds_or_default("drop_delay", self.drop_delay, DEFAULT.drop_delay)
    }

    pub fn rotation_duration(&self) -> Duration {
        seconds_or_default(
            "rotation_duration",
            self.rotation_duration,
            DEFAULT.rotation_duration,
        )
    }

    pub fn move_duration(&self) -> Duration {
        seconds_or_default("move_duration", self.move_duration, DEFAULT.move_duration)
    }

    /// Draws a center-to-center platform distance from `[min_gap, max_gap)`.
    /// An inverted or empty range in a config file collapses to `min_gap`.
    pub fn sample_gap<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max_gap > self.min_gap {
            rng.gen_range(self.min_gap..self.max_gap)
        } else {
            self.min_gap
        }
    }
}

// =============================================================================
// Loading
//
// Same approach as a save file: look for a RON file, parse it with serde, and
// if anything goes wrong log it and keep the defaults. A broken config file
// should never stop the game from starting.
// =============================================================================

const CONFIG_FILE: &str = "bridge.ron";

/// Candidate locations, in priority order: the working directory first so a
/// developer can tweak values next to the binary, then the per-user config dir.
fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("bridge-builder").join(CONFIG_FILE));
    }
    paths
}

/// Parses a RON document into a config. Returns None (after logging) if the
/// document is malformed.
pub fn parse_config(contents: &str) -> Option<GameConfig> {
    match ron::from_str::<GameConfig>(contents) {
        Ok(config) => Some(config),
        Err(e) => {
            error!("Failed to parse config: {}. Using defaults.", e);
            None
        }
    }
}

fn read_config() -> Option<GameConfig> {
    for path in config_file_paths() {
        if !path.exists() {
            continue;
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let config = parse_config(&contents)?;
                info!("Loaded config from {:?}: {:?}", path, config);
                return Some(config);
            }
            Err(e) => {
                error!("Failed to read config file {:?}: {}. Using defaults.", path, e);
                return None;
            }
        }
    }

    info!("No config file found. Using defaults.");
    None
}

fn load_game_config(mut commands: Commands) {
    let config = read_config().unwrap_or_default();
    commands.insert_resource(config);
}
