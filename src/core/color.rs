//! Color utilities
//!
//! Parsing, formatting and blending of the colors used by the widgets.

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, `rgb(r, g, b)`
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parse hex color "#RRGGBB"
///
/// The leading `#` is optional. Returns `None` for anything that is not six
/// hex digits.
///
/// # Examples
///
/// ```
/// use hud_telemetry::core::color::{parse_hex_color, Rgb};
///
/// assert_eq!(parse_hex_color("#FF0000"), Some(Rgb::new(255, 0, 0)));
/// assert_eq!(parse_hex_color("#FFF"), None);
/// ```
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

/// Convert back to hex "#RRGGBB"
pub fn to_hex_color(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}

/// Linear blend between two colors, `t` clamped to [0, 1]
pub fn lerp_rgb(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb::new(
        channel(from.r, to.r),
        channel(from.g, to.g),
        channel(from.b, to.b),
    )
}

/// Stable pastel color for a car class id
///
/// Hues are spread by the golden angle so neighbouring ids stay distinct.
pub fn class_color(class_id: i64) -> String {
    let hue = (class_id as f64 * 137.508) % 360.0;
    format!("hsl({}, 60%, 80%)", format_hue(hue))
}

fn format_hue(hue: f64) -> String {
    let rounded = (hue * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// Opacity in [0, 1] as a two-digit alpha suffix ("80" for 0.5)
pub fn opacity_to_hex(value: f64) -> String {
    let v = value.clamp(0.0, 1.0);
    format!("{:02X}", (v * 255.0).round() as u8)
}
