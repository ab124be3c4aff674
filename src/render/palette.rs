//! Named colors for every panel and `#rrggbb` conversion helpers.
//!
//! Snapshots arrive from the simulation driver with object colors encoded as
//! CSS-style hex strings. [`parse_hex`] turns them into Bevy colors and falls
//! back to [`FALLBACK`] (with a warning) when the string cannot be read, so a
//! malformed color never prevents a frame from rendering.

use bevy::color::{Alpha, Color, Srgba};
use bevy::log::warn;

pub const fn hex(rgb: u32) -> Color {
    Color::srgb(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

pub const BACKGROUND: Color = hex(0xf8f9fa);
pub const GROUND: Color = hex(0x27ae60);
pub const GRID: Color = hex(0xdee2e6);
pub const TEXT: Color = hex(0x2c3e50);
pub const LABEL: Color = hex(0x7f8c8d);
pub const AXIS: Color = hex(0x2c3e50);
pub const CHART_GRID: Color = hex(0xecf0f1);
pub const CHART_BACKGROUND: Color = hex(0xffffff);

pub const DISPLACEMENT: Color = hex(0xf39c12);
pub const VELOCITY: Color = hex(0xe74c3c);
pub const ORBIT: Color = hex(0x9b59b6);
pub const ORBIT_RADIUS: Color = hex(0x8e44ad);

pub const FORCE_GRAVITY: Color = hex(0xe74c3c);
pub const FORCE_NET: Color = hex(0x9b59b6);
pub const FORCE_NORMAL: Color = hex(0x3498db);
pub const FORCE_TENSION: Color = hex(0xf39c12);
pub const FORCE_APPLIED: Color = hex(0x27ae60);
pub const FORCE_CENTRIPETAL: Color = hex(0x8e44ad);

pub const SERIES_POSITION: Color = hex(0x3498db);
pub const SERIES_VELOCITY: Color = hex(0xe74c3c);
pub const SERIES_ACCELERATION: Color = hex(0xf39c12);

pub const ENERGY_KINETIC: Color = hex(0xe74c3c);
pub const ENERGY_POTENTIAL: Color = hex(0x3498db);
pub const ENERGY_MECHANICAL: Color = hex(0x2ecc71);

pub const DEFAULT_OBJECT: Color = hex(0x3498db);
pub const FALLBACK: Color = hex(0x95a5a6);

/// Opacity of trajectory polylines
pub const TRAJECTORY_ALPHA: f32 = 0.375;
/// Opacity of the ground band
pub const GROUND_ALPHA: f32 = 0.3;

/// Parses `#rrggbb`, `#rgb` or `#rrggbbaa`, falling back to [`FALLBACK`].
pub fn parse_hex(value: &str) -> Color {
    match Srgba::hex(value) {
        Ok(srgba) => Color::Srgba(srgba),
        Err(err) => {
            warn!("Unreadable color {value:?} ({err}); using fallback");
            FALLBACK
        }
    }
}

/// Formats a color as `#rrggbb` (or `#rrggbbaa` when translucent).
pub fn to_hex(color: Color) -> String {
    color.to_srgba().to_hex()
}

/// Returns `color` with its opacity replaced.
pub fn translucent(color: Color, alpha: f32) -> Color {
    color.with_alpha(alpha)
}

/// Serde adapter storing a [`Color`] as a hex string.
pub mod hex_color {
    use bevy::color::Color;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(super::parse_hex(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_reads_css_colors() {
        let color = parse_hex("#3498db").to_srgba();
        assert!((color.red - 0x34 as f32 / 255.0).abs() < 1e-6);
        assert!((color.green - 0x98 as f32 / 255.0).abs() < 1e-6);
        assert!((color.blue - 0xdb as f32 / 255.0).abs() < 1e-6);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn test_parse_hex_falls_back_on_garbage() {
        assert_eq!(parse_hex("not a color"), FALLBACK);
        assert_eq!(parse_hex(""), FALLBACK);
    }

    #[test]
    fn test_hex_round_trip_for_named_colors() {
        for color in [BACKGROUND, GROUND, VELOCITY, ORBIT, ENERGY_MECHANICAL] {
            let restored = parse_hex(&to_hex(color)).to_srgba();
            let original = color.to_srgba();
            assert!((restored.red - original.red).abs() < 1.0 / 255.0);
            assert!((restored.green - original.green).abs() < 1.0 / 255.0);
            assert!((restored.blue - original.blue).abs() < 1.0 / 255.0);
        }
    }

    #[test]
    fn test_translucent_only_changes_alpha() {
        let faded = translucent(GROUND, GROUND_ALPHA).to_srgba();
        let solid = GROUND.to_srgba();
        assert_eq!(faded.alpha, GROUND_ALPHA);
        assert_eq!(faded.red, solid.red);
    }
}
