//! Badge styling and configuration.
//!
//! All size-like fields derive from one fixed set of pixel defaults scaled
//! by a single user-chosen percentage, so the badge keeps its proportions
//! at any size. The resolved [`BadgeConfig`] is an immutable value object
//! built once per run and passed explicitly to the renderer; nothing reads
//! mutable module-level state.

pub mod font;
pub mod render;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use render::BadgeRenderer;

/// Default star/text color.
pub const DEFAULT_COLOR: &str = "#FFC108";

/// Unscaled pixel defaults for the badge geometry.
mod defaults {
    pub const OFFSET_RIGHT: u32 = 28;
    pub const OFFSET_BOTTOM: u32 = 28;
    pub const PAD_X: u32 = 12;
    pub const PAD_Y: u32 = 9;
    pub const CORNER_RADIUS: u32 = 10;
    pub const STAR_SIZE: u32 = 24;
    pub const STAR_TEXT_GAP: u32 = 9;
    pub const FONT_SIZE: u32 = 29;
    pub const BG_ALPHA: u8 = 160;
}

/// Raw badge styling input, as read from the defaults file or the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeOptions {
    /// Star fill color, `#RRGGBB`
    pub star_color: String,
    /// Rating text color, `#RRGGBB`
    pub text_color: String,
    /// Background alpha; 0 transparent, 255 opaque
    pub opacity: u8,
    /// Uniform size scale in percent (10-400)
    pub scale_percent: f64,
    /// Distance from the right image edge, px
    pub offset_right: u32,
    /// Distance from the bottom image edge, px
    pub offset_bottom: u32,
    /// Round the left badge corners
    pub round_left: bool,
    /// Round the right badge corners
    pub round_right: bool,
}

impl Default for BadgeOptions {
    fn default() -> Self {
        Self {
            star_color: DEFAULT_COLOR.to_string(),
            text_color: DEFAULT_COLOR.to_string(),
            opacity: defaults::BG_ALPHA,
            scale_percent: 100.0,
            offset_right: defaults::OFFSET_RIGHT,
            offset_bottom: defaults::OFFSET_BOTTOM,
            round_left: true,
            round_right: true,
        }
    }
}

/// Resolved, immutable rendering parameters.
#[derive(Debug, Clone)]
pub struct BadgeConfig {
    pub offset_right: u32,
    pub offset_bottom: u32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub corner_radius: u32,
    pub star_size: u32,
    pub star_text_gap: u32,
    pub font_size: u32,
    pub background: Rgba<u8>,
    pub star_color: Rgba<u8>,
    pub text_color: Rgba<u8>,
    pub round_left: bool,
    pub round_right: bool,
}

impl BadgeConfig {
    /// Validate raw options and resolve them against the scaled defaults.
    pub fn from_options(opts: &BadgeOptions) -> Result<Self> {
        if !(10.0..=400.0).contains(&opts.scale_percent) {
            return Err(Error::config(format!(
                "scale must be between 10 and 400 percent, got {}",
                opts.scale_percent
            )));
        }
        let scale = opts.scale_percent / 100.0;

        let [r, g, b] = parse_hex_color(&opts.star_color)?;
        let star_color = Rgba([r, g, b, 255]);
        let [r, g, b] = parse_hex_color(&opts.text_color)?;
        let text_color = Rgba([r, g, b, 255]);

        Ok(Self {
            offset_right: opts.offset_right,
            offset_bottom: opts.offset_bottom,
            pad_x: scaled(defaults::PAD_X, scale),
            pad_y: scaled(defaults::PAD_Y, scale),
            corner_radius: scaled(defaults::CORNER_RADIUS, scale),
            star_size: scaled(defaults::STAR_SIZE, scale),
            star_text_gap: scaled(defaults::STAR_TEXT_GAP, scale),
            font_size: scaled(defaults::FONT_SIZE, scale),
            background: Rgba([0, 0, 0, opts.opacity]),
            star_color,
            text_color,
            round_left: opts.round_left,
            round_right: opts.round_right,
        })
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self::from_options(&BadgeOptions::default()).expect("defaults are valid")
    }
}

/// Scale a size-like field, never below one pixel.
fn scaled(value: u32, scale: f64) -> u32 {
    ((f64::from(value) * scale).round() as u32).max(1)
}

/// Parse `#RRGGBB` (leading `#` optional) into RGB components.
pub fn parse_hex_color(s: &str) -> Result<[u8; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::config(format!("color must be #RRGGBB, got {s:?}")));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    match (channel(0), channel(2), channel(4)) {
        (Ok(r), Ok(g), Ok(b)) => Ok([r, g, b]),
        _ => Err(Error::config(format!("color must be #RRGGBB, got {s:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFC108").unwrap(), [0xFF, 0xC1, 0x08]);
        assert_eq!(parse_hex_color("ffc108").unwrap(), [0xFF, 0xC1, 0x08]);
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
        assert!(parse_hex_color("").is_err());
    }

    #[test]
    fn test_default_config_uses_unscaled_defaults() {
        let cfg = BadgeConfig::default();
        assert_eq!(cfg.star_size, 24);
        assert_eq!(cfg.font_size, 29);
        assert_eq!(cfg.background, Rgba([0, 0, 0, 160]));
        assert!(cfg.round_left && cfg.round_right);
    }

    #[test]
    fn test_scale_applies_to_size_fields_only() {
        let opts = BadgeOptions {
            scale_percent: 200.0,
            ..Default::default()
        };
        let cfg = BadgeConfig::from_options(&opts).unwrap();
        assert_eq!(cfg.star_size, 48);
        assert_eq!(cfg.font_size, 58);
        assert_eq!(cfg.pad_y, 18);
        // Offsets are user-positioned, not scaled
        assert_eq!(cfg.offset_right, 28);
        assert_eq!(cfg.offset_bottom, 28);
    }

    #[test]
    fn test_scale_floors_at_one_pixel() {
        let opts = BadgeOptions {
            scale_percent: 10.0,
            ..Default::default()
        };
        let cfg = BadgeConfig::from_options(&opts).unwrap();
        assert!(cfg.pad_y >= 1);
        assert!(cfg.star_text_gap >= 1);
        assert!(cfg.corner_radius >= 1);
    }

    #[test]
    fn test_scale_out_of_range_rejected() {
        for bad in [5.0, 401.0, 0.0] {
            let opts = BadgeOptions {
                scale_percent: bad,
                ..Default::default()
            };
            assert!(BadgeConfig::from_options(&opts).is_err());
        }
    }

    #[test]
    fn test_options_toml_round_trip() {
        let opts = BadgeOptions {
            star_color: "#00FF00".into(),
            opacity: 200,
            ..Default::default()
        };
        let text = toml::to_string_pretty(&opts).unwrap();
        let parsed: BadgeOptions = toml::from_str(&text).unwrap();
        assert_eq!(parsed.star_color, "#00FF00");
        assert_eq!(parsed.opacity, 200);
        assert_eq!(parsed.scale_percent, 100.0);
    }
}
