//! Formatting utilities for telemetry display.

/// Session clock as `HH:MM:SS`.
pub fn format_current_time(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    format!("{:02}:{:02}:{:02}", hours, mins, total % 60)
}

/// Lap time as `MM:SS.mmm`.
pub fn format_fastest_lap(secs: f64) -> String {
    let secs = secs.max(0.0);
    let mins = (secs / 60.0).floor() as u64;
    let whole = (secs % 60.0).floor() as u64;
    let millis = ((secs * 1000.0) % 1000.0).floor() as u64;
    format!("{:02}:{:02}.{:03}", mins, whole, millis)
}

/// iRating in thousands with one decimal (`1834` → `1.8k`).
pub fn format_irating(rating: i64) -> String {
    let tenths = (rating as f64 / 100.0).round() / 10.0;
    format!("{}k", tenths)
}

/// Gear as shown on the dash: `N`, `R` or the gear number.
pub fn gear_label(gear: i64) -> String {
    match gear {
        0 => "N".to_string(),
        g if g < 0 => "R".to_string(),
        g => g.to_string(),
    }
}

/// Whole meters, `1234 m`.
pub fn format_distance(meters: f64) -> String {
    format!("{} m", meters.max(0.0).round() as u64)
}

/// Full display name, middle name only when present.
pub fn full_name(first: &str, middle: Option<&str>, last: &str) -> String {
    match middle.filter(|m| !m.is_empty()) {
        Some(middle) => format!("{} {} {}", first, middle, last),
        None => format!("{} {}", first, last),
    }
}

/// Initial and last name, `A. Silva`
pub fn short_name(first: Option<&str>, last: Option<&str>) -> String {
    let last = last.unwrap_or("");
    match first.and_then(|f| f.chars().next()) {
        Some(initial) => format!("{}. {}", initial, last),
        None => last.to_string(),
    }
}

/// License class with its safety rating, `A 3.45`
pub fn format_license(class: Option<&str>, safety_rating: Option<f64>) -> Option<String> {
    match (class.filter(|c| !c.is_empty()), safety_rating) {
        (Some(class), Some(sr)) => Some(format!("{} {:.2}", class, sr)),
        (Some(class), None) => Some(class.to_string()),
        (None, Some(sr)) => Some(format!("{:.2}", sr)),
        (None, None) => None,
    }
}

/// Signed, rounded iRating change: `+12`, `-3`, `0`
pub fn format_rating_change(change: f64) -> String {
    let rounded = change.round() as i64;
    match rounded.signum() {
        1 => format!("+{}", rounded),
        _ => rounded.to_string(),
    }
}
