//! Typed views - one per widget
//!
//! Each view declares its subscription through `TelemetryView::fields()` and
//! is deserialized from the validated tree. serde field names follow the
//! server's camelCase keys.

use serde::Deserialize;

use super::constants::{
    COUNTDOWN_FAR_COLOR, COUNTDOWN_MID_COLOR, COUNTDOWN_NEAR_COLOR, SESSION_TYPE_RACE,
};
use super::field::FieldSpec;
use super::gauges::RpmStages;
use super::validate::TelemetryView;

const DISPLAY_UNITS: &[&str] = &["IMPERIAL", "METRIC"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayUnits {
    Imperial,
    Metric,
}

impl DisplayUnits {
    pub fn is_imperial(&self) -> bool {
        matches!(self, DisplayUnits::Imperial)
    }
}

// =============================================================================
// INPUT TELEMETRY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputTelemetry {
    pub realtime: InputRealtime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRealtime {
    pub throttle: f64,
    pub brake: f64,
    pub steering_angle_pct: f64,
    pub gear: i64,
    pub speed_kph: f64,
    pub speed_mph: f64,
    pub display_units: DisplayUnits,
    pub abs_active: bool,
    pub clutch: Option<f64>,
}

impl TelemetryView for InputTelemetry {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::number("realtime.throttle"),
            FieldSpec::number("realtime.brake"),
            FieldSpec::number("realtime.steeringAnglePct"),
            FieldSpec::integer("realtime.gear"),
            FieldSpec::number("realtime.speedKph"),
            FieldSpec::number("realtime.speedMph"),
            FieldSpec::enumeration("realtime.displayUnits", DISPLAY_UNITS),
            FieldSpec::boolean("realtime.absActive"),
            FieldSpec::number("realtime.clutch").optional(),
        ]
    }
}

// =============================================================================
// GEAR / RPM
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GearRpm {
    pub realtime: GearRpmRealtime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearRpmRealtime {
    pub gear: i64,
    pub speed_kph: f64,
    pub speed_mph: f64,
    pub display_units: DisplayUnits,
    pub rpm: f64,
    pub rpm_stage_first: f64,
    pub rpm_stage_shift: f64,
    pub rpm_stage_last: f64,
    pub rpm_stage_blink: f64,
    pub steering_angle_pct: Option<f64>,
}

impl GearRpmRealtime {
    pub fn stages(&self) -> RpmStages {
        RpmStages {
            first: self.rpm_stage_first,
            shift: self.rpm_stage_shift,
            last: self.rpm_stage_last,
            blink: self.rpm_stage_blink,
        }
    }
}

impl TelemetryView for GearRpm {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::integer("realtime.gear"),
            FieldSpec::number("realtime.speedKph"),
            FieldSpec::number("realtime.speedMph"),
            FieldSpec::enumeration("realtime.displayUnits", DISPLAY_UNITS),
            FieldSpec::number("realtime.rpm"),
            FieldSpec::number("realtime.rpmStageFirst"),
            FieldSpec::number("realtime.rpmStageShift"),
            FieldSpec::number("realtime.rpmStageLast"),
            FieldSpec::number("realtime.rpmStageBlink"),
            FieldSpec::number("realtime.steeringAnglePct").optional(),
        ]
    }
}

// =============================================================================
// ROLLING START
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RollingStart {
    pub drivers: Vec<RollingDriver>,
    pub session: RollingSession,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingDriver {
    pub position: i64,
    pub lap_dist_pct: f64,
    pub laps_completed: i64,
    pub is_car_on_track: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingSession {
    pub current_session_type: String,
    pub track_length_meters: f64,
}

impl TelemetryView for RollingStart {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::integer("drivers[].position"),
            // The server publishes -1 for cars without a valid lap position
            FieldSpec::number("drivers[].lapDistPct").non_negative(),
            FieldSpec::integer("drivers[].lapsCompleted").non_negative(),
            FieldSpec::boolean("drivers[].isCarOnTrack"),
            FieldSpec::string("session.currentSessionType"),
            FieldSpec::number("session.trackLengthMeters"),
        ]
    }
}

/// Countdown to the start line
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    /// Whole meters left
    pub distance_meters: f64,
    /// Width of each side bar, percent of the screen (0 to 50)
    pub bar_percent: f64,
    pub color: &'static str,
    /// The number is only drawn once the bars start filling
    pub show_number: bool,
}

impl Countdown {
    pub fn new(distance_meters: f64, bar_range_meters: f64) -> Self {
        let (bar_percent, ratio) = if bar_range_meters > 0.0 {
            let ratio = distance_meters / bar_range_meters;
            ((1.0 - ratio).clamp(0.0, 1.0) * 50.0, ratio)
        } else {
            (50.0, 0.0)
        };
        let color = if ratio > 2.0 / 3.0 {
            COUNTDOWN_FAR_COLOR
        } else if ratio > 1.0 / 3.0 {
            COUNTDOWN_MID_COLOR
        } else {
            COUNTDOWN_NEAR_COLOR
        };
        Self {
            distance_meters,
            bar_percent,
            color,
            show_number: distance_meters <= bar_range_meters,
        }
    }
}

impl RollingStart {
    /// Meters the race leader still has to cover before the start line
    ///
    /// `None` outside a race, without a leader, or once the leader has
    /// completed a lap.
    pub fn leader_distance(&self) -> Option<f64> {
        if self.session.current_session_type != SESSION_TYPE_RACE {
            return None;
        }
        let leader = self.drivers.iter().find(|d| d.position == 1)?;
        if leader.laps_completed > 0 {
            return None;
        }
        let track = self.session.track_length_meters;
        Some((track - leader.lap_dist_pct * track).floor())
    }

    /// Countdown to display, hidden under `min_distance_meters`
    pub fn countdown(&self, min_distance_meters: f64, bar_range_meters: f64) -> Option<Countdown> {
        let distance = self.leader_distance()?;
        if distance < min_distance_meters {
            return None;
        }
        Some(Countdown::new(distance, bar_range_meters))
    }
}

// =============================================================================
// STANDINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandingsFeed {
    pub drivers: Vec<StandingsDriver>,
    pub session: StandingsSession,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsDriver {
    pub car_idx: i64,
    pub car_number: i64,
    pub first_name: String,
    pub last_name: String,
    pub position: i64,
    pub class_position: i64,
    pub middle_name: Option<String>,
    pub i_rating: Option<i64>,
    pub car_class_id: Option<i64>,
    pub car_class_short_name: Option<String>,
    pub is_selected: Option<bool>,
    pub fastest_lap: Option<f64>,
}

impl StandingsDriver {
    pub fn selected(&self) -> bool {
        self.is_selected.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsSession {
    pub session_type: Option<String>,
    pub session_current_time: Option<f64>,
    pub session_duration: Option<f64>,
    pub temperature: Option<f64>,
    pub drivers_registered: Option<i64>,
}

impl TelemetryView for StandingsFeed {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::integer("drivers[].carIdx"),
            FieldSpec::integer("drivers[].carNumber"),
            FieldSpec::string("drivers[].firstName"),
            FieldSpec::string("drivers[].lastName"),
            FieldSpec::integer("drivers[].position"),
            FieldSpec::integer("drivers[].classPosition"),
            FieldSpec::string("drivers[].middleName").optional(),
            FieldSpec::integer("drivers[].iRating").optional(),
            FieldSpec::integer("drivers[].carClassId").optional(),
            FieldSpec::string("drivers[].carClassShortName").optional(),
            FieldSpec::boolean("drivers[].isSelected").optional(),
            FieldSpec::number("drivers[].fastestLap")
                .non_negative()
                .optional(),
            FieldSpec::string("session.sessionType").optional(),
            FieldSpec::number("session.sessionCurrentTime")
                .non_negative()
                .optional(),
            FieldSpec::number("session.sessionDuration")
                .non_negative()
                .optional(),
            FieldSpec::number("session.temperature").optional(),
            FieldSpec::integer("session.driversRegistered").optional(),
        ]
    }
}

// =============================================================================
// LEADERBOARD
// =============================================================================

/// Overall-position leaderboard with iRating and license columns
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeaderboardFeed {
    pub drivers: Vec<LeaderboardDriver>,
    pub realtime: Spectate,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardDriver {
    pub car_id: i64,
    pub position: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub i_rating: Option<i64>,
    pub i_rating_change: Option<f64>,
    pub i_racing_lic_string: Option<String>,
    pub i_racing_lic_sub_level: Option<f64>,
    pub is_selected: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spectate {
    pub spectate_car_id: Option<i64>,
}

impl LeaderboardFeed {
    /// Classified drivers by position
    ///
    /// Position 0 means not classified yet and car 0 is the pace car; both
    /// are left out.
    pub fn ranked(&self) -> Vec<&LeaderboardDriver> {
        let mut ranked: Vec<&LeaderboardDriver> = self
            .drivers
            .iter()
            .filter(|d| d.position > 0 && d.car_id != 0)
            .collect();
        ranked.sort_by_key(|d| d.position);
        ranked
    }

    /// Car to highlight: the first flagged driver, else the spectated car
    pub fn selected_car(&self) -> Option<i64> {
        self.drivers
            .iter()
            .find(|d| d.is_selected == Some(true))
            .map(|d| d.car_id)
            .or(self.realtime.spectate_car_id)
    }
}

impl TelemetryView for LeaderboardFeed {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::integer("drivers[].carId"),
            FieldSpec::integer("drivers[].position"),
            FieldSpec::string("drivers[].firstName").optional(),
            FieldSpec::string("drivers[].lastName").optional(),
            FieldSpec::integer("drivers[].iRating").optional(),
            FieldSpec::number("drivers[].iRatingChange").optional(),
            FieldSpec::string("drivers[].iRacingLicString").optional(),
            FieldSpec::number("drivers[].iRacingLicSubLevel").optional(),
            FieldSpec::boolean("drivers[].isSelected").optional(),
            FieldSpec::integer("realtime.spectateCarId").optional(),
        ]
    }
}

// =============================================================================
// TESTS
// =============================================================================
