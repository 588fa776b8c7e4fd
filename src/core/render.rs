//! Text rendering of the widgets
//!
//! Each widget renders to a list of lines, every line carrying the color the
//! overlay would draw it with. The binary logs them; tests inspect them.

use std::time::Duration;

use super::constants::{
    ThemeDefaults, DARK_THEME, LEADERBOARD_SELECTED_COLOR, LEADERBOARD_SEPARATOR_COLOR,
    LEADERBOARD_TEXT_COLOR, LIGHT_THEME, PREVIEW_COUNTDOWN_METERS, TRACE_BRAKE_ABS_COLOR,
    TRACE_BRAKE_COLOR, TRACE_CLUTCH_COLOR, TRACE_STEERING_COLOR, TRACE_THROTTLE_COLOR,
};
use super::format::{format_current_time, format_distance, gear_label};
use super::gauges::{
    abs_light_color, display_speed, rpm_bar_color, rpm_blocks, steering_point, RPM_BLOCKS,
};
use super::leaderboard::LeaderboardRows;
use super::standings::BoardLayout;
use super::traces::{InputTraces, TraceBuffer};
use super::views::{Countdown, GearRpm, InputTelemetry, RollingStart, StandingsSession};

/// Width of the text bars, in characters
const BAR_WIDTH: usize = 20;
/// Samples shown by a trace sparkline
const SPARK_WIDTH: usize = 30;
const SPARK_LEVELS: &[char] = &['_', '.', '-', '~', '=', '*', '#'];

/// One rendered line and its color
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub color: Option<String>,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    fn colored(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Some(color.into()),
        }
    }
}

/// `[#####-----]` for a ratio in [0, 1]
pub fn text_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Last samples of a trace as a one-line sparkline
pub fn sparkline(buffer: &TraceBuffer, width: usize) -> String {
    let skip = buffer.len().saturating_sub(width);
    let top = (SPARK_LEVELS.len() - 1) as f64;
    buffer
        .samples()
        .skip(skip)
        .map(|s| SPARK_LEVELS[(s.v.clamp(0.0, 1.0) * top).round() as usize])
        .collect()
}

fn percent(ratio: f64) -> u32 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u32
}

// =============================================================================
// INPUTS
// =============================================================================

/// Trace colors, hex strings
#[derive(Debug, Clone, PartialEq)]
pub struct TraceColors {
    pub throttle: String,
    pub brake: String,
    pub brake_abs: String,
    pub clutch: String,
    pub steering: String,
}

impl Default for TraceColors {
    fn default() -> Self {
        Self {
            throttle: TRACE_THROTTLE_COLOR.to_string(),
            brake: TRACE_BRAKE_COLOR.to_string(),
            brake_abs: TRACE_BRAKE_ABS_COLOR.to_string(),
            clutch: TRACE_CLUTCH_COLOR.to_string(),
            steering: TRACE_STEERING_COLOR.to_string(),
        }
    }
}

pub fn render_inputs(
    view: &InputTelemetry,
    traces: &InputTraces,
    colors: &TraceColors,
    elapsed: Duration,
) -> Vec<Line> {
    let rt = &view.realtime;
    let (speed, unit) = display_speed(rt.speed_kph, rt.speed_mph, rt.display_units.is_imperial());
    let mut lines = vec![
        Line::plain(format!("gear {}  {} {}", gear_label(rt.gear), speed, unit)),
        Line::colored(
            format!("THR {} {:>3}%", text_bar(rt.throttle, BAR_WIDTH), percent(rt.throttle)),
            colors.throttle.as_str(),
        ),
        Line::colored(
            format!("BRK {} {:>3}%", text_bar(rt.brake, BAR_WIDTH), percent(rt.brake)),
            if rt.abs_active {
                colors.brake_abs.as_str()
            } else {
                colors.brake.as_str()
            },
        ),
        Line::colored("ABS", abs_light_color(rt.abs_active, elapsed)),
    ];
    if let Some(clutch) = rt.clutch {
        lines.push(Line::colored(
            format!("CLU {} {:>3}%", text_bar(clutch, BAR_WIDTH), percent(clutch)),
            colors.clutch.as_str(),
        ));
    }

    let channels = traces.channels();
    let spark = |label: &str, buffer: &TraceBuffer, color: &str| {
        Line::colored(format!("{} |{}|", label, sparkline(buffer, SPARK_WIDTH)), color)
    };
    if channels.throttle {
        lines.push(spark("thr", &traces.throttle, &colors.throttle));
    }
    if channels.brake {
        lines.push(spark("brk", &traces.brake, &colors.brake));
        lines.push(spark("abs", &traces.abs, &colors.brake_abs));
    }
    if channels.clutch {
        lines.push(spark("clu", &traces.clutch, &colors.clutch));
    }
    if channels.steering {
        lines.push(spark("str", &traces.steering, &colors.steering));
    }
    lines
}

// =============================================================================
// GEAR / RPM
// =============================================================================

pub fn render_gear_rpm(
    view: &GearRpm,
    elapsed: Duration,
    blink_interval: Duration,
    steering_limit: f64,
) -> Vec<Line> {
    let rt = &view.realtime;
    let stages = rt.stages();
    let blocks = rpm_blocks(rt.rpm, &stages);
    let (speed, unit) = display_speed(rt.speed_kph, rt.speed_mph, rt.display_units.is_imperial());

    let mut lines = vec![
        Line::colored(
            format!(
                "RPM {} {:.0}",
                text_bar(blocks as f64 / RPM_BLOCKS as f64, BAR_WIDTH),
                rt.rpm
            ),
            rpm_bar_color(rt.rpm, &stages, elapsed, blink_interval),
        ),
        Line::plain(format!("gear {}  {} {}", gear_label(rt.gear), speed, unit)),
    ];
    if let Some(pct) = rt.steering_angle_pct {
        lines.push(Line::plain(format!(
            "steering {:+.2}",
            steering_point(pct, steering_limit)
        )));
    }
    lines
}

// =============================================================================
// ROLLING START
// =============================================================================

/// Countdown lines; preview mode always shows a fixed countdown
pub fn render_rolling_start(
    view: Option<&RollingStart>,
    preview: bool,
    min_distance_meters: f64,
    bar_range_meters: f64,
) -> Vec<Line> {
    let countdown = if preview {
        Some(Countdown::new(PREVIEW_COUNTDOWN_METERS, bar_range_meters))
    } else {
        view.and_then(|v| v.countdown(min_distance_meters, bar_range_meters))
    };
    let Some(countdown) = countdown else {
        return Vec::new();
    };

    let bar = text_bar(countdown.bar_percent / 50.0, BAR_WIDTH / 2);
    let text = if countdown.show_number {
        format!("{} {} {}", bar, format_distance(countdown.distance_meters), bar)
    } else {
        format!("{} {}", bar, bar)
    };
    vec![Line::colored(text, countdown.color)]
}

// =============================================================================
// LEADERBOARD
// =============================================================================

/// One line per row: position, name, license, iRating and its change
pub fn render_leaderboard(board: &LeaderboardRows) -> Vec<Line> {
    let mut lines = Vec::with_capacity(board.rows.len() + 1);
    for (idx, row) in board.rows.iter().enumerate() {
        let irating = row.irating.map(|r| r.to_string()).unwrap_or_default();
        let text = format!(
            "{}{:>3}  {:<22} {:<7} {:>5} {:>4}",
            if row.is_selected { ">" } else { " " },
            row.position,
            row.name,
            row.license.as_deref().unwrap_or(""),
            irating,
            row.irating_change.as_deref().unwrap_or(""),
        );
        let color = if row.is_selected {
            LEADERBOARD_SELECTED_COLOR
        } else {
            LEADERBOARD_TEXT_COLOR
        };
        lines.push(Line::colored(text.trim_end(), color));
        if board.separator_after == Some(idx) {
            lines.push(Line::colored("  ---", LEADERBOARD_SEPARATOR_COLOR));
        }
    }
    lines
}

// =============================================================================
// STANDINGS
// =============================================================================

/// Resolved standings colors
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsTheme {
    pub background: String,
    pub text: String,
    pub selected_highlight: String,
    pub fastest_highlight: String,
    pub separator: String,
}

impl StandingsTheme {
    pub fn from_defaults(defaults: &ThemeDefaults) -> Self {
        Self {
            background: defaults.background.to_string(),
            text: defaults.text.to_string(),
            selected_highlight: defaults.selected_highlight.to_string(),
            fastest_highlight: defaults.fastest_highlight.to_string(),
            separator: defaults.separator.to_string(),
        }
    }

    pub fn dark() -> Self {
        Self::from_defaults(&DARK_THEME)
    }

    pub fn light() -> Self {
        Self::from_defaults(&LIGHT_THEME)
    }
}

/// `R | 00:12:03 / 00:30:00  (20 drivers)  36°`
pub fn standings_header(session: &StandingsSession) -> String {
    let mut parts = Vec::new();
    if let Some(initial) = session.session_type.as_deref().and_then(|s| s.chars().next()) {
        parts.push(format!("{} |", initial));
    }
    if let Some(current) = session.session_current_time {
        let mut clock = format_current_time(current);
        if let Some(duration) = session.session_duration {
            clock.push_str(&format!(" / {}", format_current_time(duration)));
        }
        parts.push(clock);
    }
    if let Some(registered) = session.drivers_registered {
        parts.push(format!("({} drivers)", registered));
    }
    if let Some(temperature) = session.temperature {
        parts.push(format!("{}°", temperature));
    }
    parts.join("  ")
}

pub const NOT_ENOUGH_SPACE: &str = "Not enough space";

pub fn render_standings(
    session: &StandingsSession,
    layout: &BoardLayout,
    theme: &StandingsTheme,
) -> Vec<Line> {
    let groups = match layout {
        BoardLayout::Unmeasured => return Vec::new(),
        BoardLayout::NotEnoughSpace => {
            return vec![
                Line::colored(standings_header(session), theme.text.as_str()),
                Line::colored(NOT_ENOUGH_SPACE, theme.text.as_str()),
            ]
        }
        BoardLayout::Groups(groups) => groups,
    };

    let mut lines = vec![Line::colored(standings_header(session), theme.text.as_str())];
    for group in groups {
        lines.push(Line::colored(
            format!("{} ({})", group.name, group.driver_count),
            group.color.as_str(),
        ));
        for (idx, row) in group.rows.iter().enumerate() {
            let text = format!(
                "{}{:>3}  #{:<4} {:<24} {:>6}  {}",
                if row.is_selected { ">" } else { " " },
                row.class_position,
                row.car_number,
                row.name,
                row.irating.as_deref().unwrap_or(""),
                row.fastest_lap.as_deref().unwrap_or("--:--.---"),
            );
            let color = if row.is_selected {
                &theme.selected_highlight
            } else if row.is_fastest {
                &theme.fastest_highlight
            } else {
                &theme.text
            };
            lines.push(Line::colored(text.trim_end(), color.as_str()));
            if group.separator_after == Some(idx) {
                lines.push(Line::colored("  ...", theme.separator.as_str()));
            }
        }
    }
    lines
}
