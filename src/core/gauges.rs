//! Dash gauge computations - RPM bar, speed, steering point, blink phases
//!
//! Everything here is a pure function of the current telemetry values and,
//! for blinking elements, of the elapsed time.

use std::time::Duration;

use super::color::lerp_rgb;
use super::constants::{
    ABS_ACTIVE_COLOR, ABS_FLASH_COLOR, ABS_FLASH_INTERVAL, ABS_INACTIVE_COLOR, RPM_BAR_BACKGROUND,
    RPM_BAR_BLINK, RPM_BAR_FADE_END_RGB, RPM_BAR_RED, RPM_BAR_RED_RGB,
};

/// Number of blocks in the RPM bar
pub const RPM_BLOCKS: u32 = 100;

/// Shift-light thresholds as published by the game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpmStages {
    pub first: f64,
    pub shift: f64,
    pub last: f64,
    pub blink: f64,
}

/// Position of `rpm` between the first and last stage, in [0, 1]
///
/// Zero when the game has not published stages yet.
pub fn rpm_ratio(rpm: f64, stages: &RpmStages) -> f64 {
    if stages.first == 0.0 || stages.last == 0.0 {
        return 0.0;
    }
    let range = stages.last - stages.first;
    if range <= 0.0 {
        return if rpm >= stages.last { 1.0 } else { 0.0 };
    }
    ((rpm - stages.first) / range).clamp(0.0, 1.0)
}

/// Lit blocks out of `RPM_BLOCKS`
pub fn rpm_blocks(rpm: f64, stages: &RpmStages) -> u32 {
    (rpm_ratio(rpm, stages) * RPM_BLOCKS as f64).floor() as u32
}

/// Whether a blinking element is in its "on" phase after `elapsed`
pub fn blink_on(elapsed: Duration, interval: Duration) -> bool {
    if interval.is_zero() {
        return true;
    }
    (elapsed.as_nanos() / interval.as_nanos()) % 2 == 0
}

/// Color of the lit RPM blocks
///
/// - at or above the blink stage: alternates blink color / background
/// - up to half the range: solid red
/// - above: fades from red to the pale end color
pub fn rpm_bar_color(rpm: f64, stages: &RpmStages, elapsed: Duration, blink: Duration) -> String {
    if stages.blink > 0.0 && rpm >= stages.blink {
        return if blink_on(elapsed, blink) {
            RPM_BAR_BLINK.to_string()
        } else {
            RPM_BAR_BACKGROUND.to_string()
        };
    }
    let ratio = rpm_ratio(rpm, stages);
    if ratio <= 0.5 {
        return RPM_BAR_RED.to_string();
    }
    lerp_rgb(RPM_BAR_RED_RGB, RPM_BAR_FADE_END_RGB, (ratio - 0.5) * 2.0).css()
}

/// Speed in the driver's units, floored, with its unit label
pub fn display_speed(speed_kph: f64, speed_mph: f64, imperial: bool) -> (u32, &'static str) {
    let (speed, unit) = if imperial {
        (speed_mph, "mph")
    } else {
        (speed_kph, "km/h")
    };
    (speed.max(0.0).floor() as u32, unit)
}

/// Steering dot position on the dash arc, clamped at `limit` then scaled ×4
pub fn steering_point(steering_angle_pct: f64, limit: f64) -> f64 {
    let limit = limit.abs();
    steering_angle_pct.clamp(-limit, limit) * 4.0
}

/// Color of the ABS light
pub fn abs_light_color(active: bool, elapsed: Duration) -> &'static str {
    if !active {
        return ABS_INACTIVE_COLOR;
    }
    // The light starts lit and flashes off every other interval
    if blink_on(elapsed, ABS_FLASH_INTERVAL) {
        ABS_ACTIVE_COLOR
    } else {
        ABS_FLASH_COLOR
    }
}
