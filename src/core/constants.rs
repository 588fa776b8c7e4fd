//! Feed and widget constants - defaults, palette, timings
//!
//! Layout metrics live in `standings::layout`.

use std::time::Duration;

use super::color::Rgb;

// =============================================================================
// TELEMETRY SERVER
// =============================================================================

/// Local telemetry server
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:42049";

/// Flat delay between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Capacity of the socket thread → owner channel
pub const FEED_CHANNEL_CAPACITY: usize = 256;

/// Granularity of the reconnect sleep; bounds how late a shutdown is noticed
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pause between non-blocking socket reads
pub const READ_IDLE_SLEEP: Duration = Duration::from_millis(10);

// =============================================================================
// HUD-FEED LOOP
// =============================================================================

/// Owner loop period (feed polling, trace sampling checks)
pub const FEED_LOOP_TICK: Duration = Duration::from_millis(10);

/// Minimum time between two logged renders of a widget
pub const RENDER_INTERVAL: Duration = Duration::from_millis(250);

// =============================================================================
// SESSION
// =============================================================================

/// `session.currentSessionType` of a race
pub const SESSION_TYPE_RACE: &str = "RACE";

// =============================================================================
// GAUGES
// =============================================================================

pub const RPM_BAR_RED: &str = "#FB0004";
pub const RPM_BAR_BLINK: &str = "#69C3C2";
pub const RPM_BAR_BACKGROUND: &str = "#EEEEEE";
/// Ends of the RPM bar fade, solid red to pale
pub const RPM_BAR_RED_RGB: Rgb = Rgb::new(0xFB, 0x00, 0x04);
pub const RPM_BAR_FADE_END_RGB: Rgb = Rgb::new(0xD9, 0xC4, 0xD7);

pub const ABS_ACTIVE_COLOR: &str = "#FACC15";
pub const ABS_FLASH_COLOR: &str = "#BDBDBD";
pub const ABS_INACTIVE_COLOR: &str = "#BDBDBD";

/// ABS light toggles at this rate while active
pub const ABS_FLASH_INTERVAL: Duration = Duration::from_millis(60);

/// `steeringAnglePct` magnitude of full lock, for the trace mapping
pub const STEERING_FULL_LOCK_PCT: f64 = 0.3;

// =============================================================================
// TRACES
// =============================================================================

pub const TRACE_THROTTLE_COLOR: &str = "#22C55E";
pub const TRACE_BRAKE_COLOR: &str = "#EF4444";
pub const TRACE_BRAKE_ABS_COLOR: &str = "#FACC15";
pub const TRACE_CLUTCH_COLOR: &str = "#38BDF8";
pub const TRACE_STEERING_COLOR: &str = "#1E3A8A";

// =============================================================================
// ROLLING START
// =============================================================================

pub const COUNTDOWN_FAR_COLOR: &str = "#DC2626";
pub const COUNTDOWN_MID_COLOR: &str = "#FACC15";
pub const COUNTDOWN_NEAR_COLOR: &str = "#22C55E";

/// Distance shown by the preview countdown
pub const PREVIEW_COUNTDOWN_METERS: f64 = 300.0;

// =============================================================================
// LEADERBOARD
// =============================================================================

pub const LEADERBOARD_TEXT_COLOR: &str = "#FFFFFF";
pub const LEADERBOARD_SELECTED_COLOR: &str = "#111111";
pub const LEADERBOARD_SEPARATOR_COLOR: &str = "#000000";

// =============================================================================
// STANDINGS THEMES
// =============================================================================

/// Colors a standings theme resolves to when nothing is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeDefaults {
    pub background: &'static str,
    pub text: &'static str,
    pub selected_highlight: &'static str,
    pub fastest_highlight: &'static str,
    pub separator: &'static str,
}

pub const DARK_THEME: ThemeDefaults = ThemeDefaults {
    background: "#222324",
    text: "#FFFFFF",
    selected_highlight: "#3A4A6A",
    fastest_highlight: "#9B59B6",
    separator: "#6D6D6D",
};

pub const LIGHT_THEME: ThemeDefaults = ThemeDefaults {
    background: "#F0F0F0",
    text: "#333333",
    selected_highlight: "#E0E0E0",
    fastest_highlight: "#FF8A65",
    separator: "#B4B4B4",
};
