// Configuration for the hud-feed binary

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::color::{parse_hex_color, to_hex_color};
use crate::core::constants::{
    ThemeDefaults, DARK_THEME, DEFAULT_RECONNECT_DELAY, DEFAULT_SERVER_URL, LIGHT_THEME,
};
use crate::core::render::{StandingsTheme, TraceColors};
use crate::core::standings::LayoutMetrics;
use crate::core::traces::TraceChannels;

// =============================================================================
// CONFIGURATION STRUCTURES
// =============================================================================

/// Telemetry server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,
    /// Ask the server for canned preview data
    #[serde(default)]
    pub preview: bool,
    /// Flat delay before reconnecting after a close or failure
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY.as_millis() as u64
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            preview: false,
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl ServerSettings {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Optional color overrides, "#RRGGBB". Invalid values fall back to the theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeColors {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub selected_highlight: Option<String>,
    #[serde(default)]
    pub fastest_highlight: Option<String>,
    #[serde(default)]
    pub separator: Option<String>,
}

/// Standings board settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsSettings {
    /// Rows always shown at the top of each class
    #[serde(default = "default_show_top_n")]
    pub show_top_n: usize,
    #[serde(default)]
    pub light_theme: bool,
    /// Height of the drivers section in pixels
    #[serde(default = "default_section_height")]
    pub section_height: u32,
    #[serde(default)]
    pub layout: LayoutMetrics,
    #[serde(default)]
    pub colors: ThemeColors,
}

fn default_show_top_n() -> usize {
    3
}

fn default_section_height() -> u32 {
    600
}

impl Default for StandingsSettings {
    fn default() -> Self {
        Self {
            show_top_n: default_show_top_n(),
            light_theme: false,
            section_height: default_section_height(),
            layout: LayoutMetrics::default(),
            colors: ThemeColors::default(),
        }
    }
}

impl StandingsSettings {
    /// Theme defaults with the configured overrides applied
    pub fn theme(&self) -> StandingsTheme {
        let defaults: &ThemeDefaults = if self.light_theme {
            &LIGHT_THEME
        } else {
            &DARK_THEME
        };
        let c = &self.colors;
        StandingsTheme {
            background: color_or(c.background.as_deref(), defaults.background),
            text: color_or(c.text.as_deref(), defaults.text),
            selected_highlight: color_or(
                c.selected_highlight.as_deref(),
                defaults.selected_highlight,
            ),
            fastest_highlight: color_or(
                c.fastest_highlight.as_deref(),
                defaults.fastest_highlight,
            ),
            separator: color_or(c.separator.as_deref(), defaults.separator),
        }
    }
}

/// Input traces settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracesSettings {
    #[serde(default = "default_history_seconds")]
    pub history_seconds: u64,
    #[serde(default = "default_true")]
    pub include_throttle: bool,
    #[serde(default = "default_true")]
    pub include_brake: bool,
    #[serde(default)]
    pub include_clutch: bool,
    #[serde(default = "default_true")]
    pub include_steering: bool,
    #[serde(default = "default_sample_hz")]
    pub sample_hz: u32,
    #[serde(default)]
    pub throttle_color: Option<String>,
    #[serde(default)]
    pub brake_color: Option<String>,
    #[serde(default)]
    pub brake_abs_color: Option<String>,
    #[serde(default)]
    pub clutch_color: Option<String>,
    #[serde(default)]
    pub steering_color: Option<String>,
}

fn default_history_seconds() -> u64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_sample_hz() -> u32 {
    50
}

impl Default for TracesSettings {
    fn default() -> Self {
        Self {
            history_seconds: default_history_seconds(),
            include_throttle: true,
            include_brake: true,
            include_clutch: false,
            include_steering: true,
            sample_hz: default_sample_hz(),
            throttle_color: None,
            brake_color: None,
            brake_abs_color: None,
            clutch_color: None,
            steering_color: None,
        }
    }
}

impl TracesSettings {
    pub fn channels(&self) -> TraceChannels {
        TraceChannels {
            throttle: self.include_throttle,
            brake: self.include_brake,
            clutch: self.include_clutch,
            steering: self.include_steering,
        }
    }

    pub fn history(&self) -> Duration {
        Duration::from_secs(self.history_seconds)
    }

    pub fn colors(&self) -> TraceColors {
        let d = TraceColors::default();
        TraceColors {
            throttle: color_or(self.throttle_color.as_deref(), &d.throttle),
            brake: color_or(self.brake_color.as_deref(), &d.brake),
            brake_abs: color_or(self.brake_abs_color.as_deref(), &d.brake_abs),
            clutch: color_or(self.clutch_color.as_deref(), &d.clutch),
            steering: color_or(self.steering_color.as_deref(), &d.steering),
        }
    }
}

/// Rolling start countdown settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingStartSettings {
    /// Countdown is hidden once the leader is closer than this
    #[serde(default = "default_min_distance_meters")]
    pub min_distance_meters: f64,
    /// Distance over which the side bars fill up
    #[serde(default = "default_bar_range_meters")]
    pub bar_range_meters: f64,
}

fn default_min_distance_meters() -> f64 {
    300.0
}

fn default_bar_range_meters() -> f64 {
    1500.0
}

impl Default for RollingStartSettings {
    fn default() -> Self {
        Self {
            min_distance_meters: default_min_distance_meters(),
            bar_range_meters: default_bar_range_meters(),
        }
    }
}

/// Dash gauge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugesSettings {
    /// Shift-light blink period
    #[serde(default = "default_blink_interval_ms")]
    pub blink_interval_ms: u64,
    /// Steering angle at which the steering dot stops
    #[serde(default = "default_steering_limit")]
    pub steering_limit: f64,
}

fn default_blink_interval_ms() -> u64 {
    50
}

fn default_steering_limit() -> f64 {
    0.245
}

impl Default for GaugesSettings {
    fn default() -> Self {
        Self {
            blink_interval_ms: default_blink_interval_ms(),
            steering_limit: default_steering_limit(),
        }
    }
}

impl GaugesSettings {
    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }
}

/// Leaderboard widget settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    /// Board height in pixels; rows that do not fully fit are dropped
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

fn default_viewport_height() -> u32 {
    600
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            viewport_height: default_viewport_height(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log to stdout
    #[serde(default = "default_true")]
    pub console: bool,
    /// Log file path (relative to the config file or absolute). Empty = no file logging.
    #[serde(default)]
    pub log_file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            console: true,
            log_file: String::new(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub standings: StandingsSettings,
    #[serde(default)]
    pub traces: TracesSettings,
    #[serde(default)]
    pub rolling_start: RollingStartSettings,
    #[serde(default)]
    pub gauges: GaugesSettings,
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,
}

/// Configured hex color, or the fallback when missing or invalid
fn color_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(hex) => match parse_hex_color(hex) {
            Some(rgb) => to_hex_color(rgb),
            None => {
                warn!(color = %hex, "[config] Invalid color, using default");
                fallback.to_string()
            }
        },
        None => fallback.to_string(),
    }
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    pub const CONFIG_FILENAME: &'static str = "hud_telemetry.toml";

    /// Config file next to the running binary, or in the working directory
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(Self::CONFIG_FILENAME)))
            .unwrap_or_else(|| PathBuf::from(Self::CONFIG_FILENAME))
    }

    /// Load configuration from `path`, defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "[config] Looking for config");

        if !path.exists() {
            debug!("[config] No config found, using defaults");
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        info!(path = %path.display(), "[config] Loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Log file path resolved against the config file's directory
    pub fn log_file_path(&self, config_path: &Path) -> Option<PathBuf> {
        if self.logging.log_file.is_empty() {
            return None;
        }
        let log_path = PathBuf::from(&self.logging.log_file);
        if log_path.is_absolute() {
            return Some(log_path);
        }
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(log_path))
    }
}
