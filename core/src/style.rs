//! Colors, palettes and the style presets shared by every sub-view of a panel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default aspect ratio of the panel (width / height).
pub const DEFAULT_ASPECT_RATIO: f64 = 288.0 / 410.0;

/// Default preferred panel width in pixels.
pub const DEFAULT_WIDTH: i32 = 288;

/// Default tint: blue used for idle keys, empty dots and controls.
pub const DEFAULT_TINT: Color = Color::rgb(0x5e, 0xa2, 0xff);

/// Default highlight: purple used for pressed keys and filled dots.
pub const DEFAULT_HIGHLIGHT: Color = Color::rgb(0xa2, 0x77, 0xff);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("invalid color '{0}', expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    #[error("aspect ratio must be a positive number")]
    InvalidAspectRatio,

    #[error("panel width must be positive")]
    InvalidWidth,
}

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const CLEAR: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 0xff)
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Channels scaled to `0.0..=1.0`, in cairo's `set_source_rgba` order.
    pub fn to_f64(self) -> (f64, f64, f64, f64) {
        (
            f64::from(self.red) / 255.0,
            f64::from(self.green) / 255.0,
            f64::from(self.blue) / 255.0,
            f64::from(self.alpha) / 255.0,
        )
    }

    /// Linear blend towards `other`; `t` is clamped to `0.0..=1.0`.
    pub fn mix(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
        };
        Color {
            red: lerp(self.red, other.red),
            green: lerp(self.green, other.green),
            blue: lerp(self.blue, other.blue),
            alpha: lerp(self.alpha, other.alpha),
        }
    }
}

impl FromStr for Color {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StyleError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let alpha = if hex.len() == 8 { channel(6)? } else { 0xff };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)?;
        if self.alpha != 0xff {
            write!(f, "{:02x}", self.alpha)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Every color a panel paints with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub dot_filled: Color,
    pub dot_empty: Color,
    pub key_border: Color,
    pub key_border_highlighted: Color,
    pub key_text: Color,
    pub key_text_highlighted: Color,
    pub key_background: Color,
    pub delete_label: Color,
    pub biometric_tint: Color,
}

impl Palette {
    /// Opaque keys on a plain background.
    pub fn standard(tint: Color, highlight: Color) -> Self {
        Self {
            dot_filled: highlight,
            dot_empty: tint,
            key_border: tint,
            key_border_highlighted: highlight,
            key_text: tint,
            key_text_highlighted: highlight,
            key_background: Color::WHITE,
            delete_label: tint,
            biometric_tint: tint,
        }
    }

    /// White-on-clear palette for panels composed over a blurred background.
    pub fn vibrant(highlight: Color) -> Self {
        Self {
            dot_filled: Color::WHITE,
            dot_empty: Color::WHITE,
            key_border: Color::CLEAR,
            key_border_highlighted: Color::WHITE,
            key_text: Color::WHITE,
            key_text_highlighted: highlight,
            key_background: Color::CLEAR,
            delete_label: Color::WHITE,
            biometric_tint: Color::WHITE,
        }
    }
}

/// Complete visual configuration of a panel, applied in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub tint: Color,
    pub highlight: Color,
    pub vibrancy: bool,
    pub palette: Palette,
    pub digit_font: String,
    pub symbols_font: String,
    pub biometric_icon: String,
    pub delete_icon: Option<String>,
    pub delete_label: String,
    pub aspect_ratio: f64,
    pub width: i32,
}

impl Style {
    pub fn standard(tint: Color, highlight: Color) -> Self {
        Self {
            tint,
            highlight,
            vibrancy: false,
            palette: Palette::standard(tint, highlight),
            digit_font: "Sans".to_string(),
            symbols_font: "Sans".to_string(),
            biometric_icon: "fingerprint-symbolic".to_string(),
            delete_icon: None,
            delete_label: "Delete".to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            width: DEFAULT_WIDTH,
        }
    }

    pub fn vibrant(tint: Color, highlight: Color) -> Self {
        Self::standard(tint, highlight).with_vibrancy(true)
    }

    /// Same fonts, icons and geometry with the palette re-derived for `vibrancy`.
    pub fn with_vibrancy(&self, vibrancy: bool) -> Self {
        let palette = if vibrancy {
            Palette::vibrant(self.highlight)
        } else {
            Palette::standard(self.tint, self.highlight)
        };
        Self {
            vibrancy,
            palette,
            ..self.clone()
        }
    }

    /// Preferred height for the preferred width at the configured ratio.
    pub fn height(&self) -> i32 {
        (f64::from(self.width) / self.aspect_ratio).round() as i32
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(StyleError::InvalidAspectRatio);
        }
        if self.width <= 0 {
            return Err(StyleError::InvalidWidth);
        }
        Ok(())
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::standard(DEFAULT_TINT, DEFAULT_HIGHLIGHT)
    }
}

/// Partial style as read from a configuration file.
///
/// Missing fields fall back to the preset selected by `tint`, `highlight` and
/// `vibrancy`; palette entries given explicitly override the preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverrides {
    pub tint: Option<Color>,
    pub highlight: Option<Color>,
    pub vibrancy: bool,
    pub dot_filled: Option<Color>,
    pub dot_empty: Option<Color>,
    pub key_border: Option<Color>,
    pub key_border_highlighted: Option<Color>,
    pub key_text: Option<Color>,
    pub key_text_highlighted: Option<Color>,
    pub key_background: Option<Color>,
    pub delete_label_color: Option<Color>,
    pub biometric_tint: Option<Color>,
    pub digit_font: Option<String>,
    pub symbols_font: Option<String>,
    pub biometric_icon: Option<String>,
    pub delete_icon: Option<String>,
    pub delete_label: Option<String>,
    pub aspect_ratio: Option<f64>,
    pub width: Option<i32>,
}

impl StyleOverrides {
    pub fn into_style(self) -> Result<Style, StyleError> {
        let base = Style::standard(
            self.tint.unwrap_or(DEFAULT_TINT),
            self.highlight.unwrap_or(DEFAULT_HIGHLIGHT),
        )
        .with_vibrancy(self.vibrancy);

        let p = base.palette;
        let palette = Palette {
            dot_filled: self.dot_filled.unwrap_or(p.dot_filled),
            dot_empty: self.dot_empty.unwrap_or(p.dot_empty),
            key_border: self.key_border.unwrap_or(p.key_border),
            key_border_highlighted: self
                .key_border_highlighted
                .unwrap_or(p.key_border_highlighted),
            key_text: self.key_text.unwrap_or(p.key_text),
            key_text_highlighted: self.key_text_highlighted.unwrap_or(p.key_text_highlighted),
            key_background: self.key_background.unwrap_or(p.key_background),
            delete_label: self.delete_label_color.unwrap_or(p.delete_label),
            biometric_tint: self.biometric_tint.unwrap_or(p.biometric_tint),
        };

        let style = Style {
            palette,
            digit_font: self.digit_font.unwrap_or(base.digit_font),
            symbols_font: self.symbols_font.unwrap_or(base.symbols_font),
            biometric_icon: self.biometric_icon.unwrap_or(base.biometric_icon),
            delete_icon: self.delete_icon.or(base.delete_icon),
            delete_label: self.delete_label.unwrap_or(base.delete_label),
            aspect_ratio: self.aspect_ratio.unwrap_or(base.aspect_ratio),
            width: self.width.unwrap_or(base.width),
            ..base
        };
        style.validate()?;
        Ok(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!("#5ea2ff".parse::<Color>().unwrap(), DEFAULT_TINT);
        assert_eq!(
            "#ffffff80".parse::<Color>().unwrap(),
            Color::rgba(0xff, 0xff, 0xff, 0x80)
        );
        assert!("5ea2ff".parse::<Color>().is_err());
        assert!("#5ea2f".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(DEFAULT_HIGHLIGHT.to_string(), "#a277ff");
        assert_eq!(Color::CLEAR.to_string(), "#00000000");
    }

    #[test]
    fn test_color_mix() {
        let black = Color::rgb(0, 0, 0);
        assert_eq!(black.mix(Color::WHITE, 0.0), black);
        assert_eq!(black.mix(Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(black.mix(Color::WHITE, 0.5), Color::rgb(128, 128, 128));
        assert_eq!(black.mix(Color::WHITE, 7.0), Color::WHITE);
    }

    #[test]
    fn test_vibrancy_swaps_whole_palette() {
        let standard = Style::default();
        let vibrant = standard.with_vibrancy(true);

        assert!(vibrant.vibrancy);
        assert_eq!(vibrant.palette, Palette::vibrant(DEFAULT_HIGHLIGHT));
        assert_eq!(vibrant.digit_font, standard.digit_font);
        assert_eq!(vibrant.width, standard.width);

        let back = vibrant.with_vibrancy(false);
        assert_eq!(back, standard);
    }

    #[test]
    fn test_standard_palette_colors() {
        let p = Palette::standard(DEFAULT_TINT, DEFAULT_HIGHLIGHT);
        assert_eq!(p.dot_empty, DEFAULT_TINT);
        assert_eq!(p.dot_filled, DEFAULT_HIGHLIGHT);
        assert_eq!(p.key_background, Color::WHITE);
        assert_eq!(p.key_text_highlighted, DEFAULT_HIGHLIGHT);
    }

    #[test]
    fn test_default_height_follows_ratio() {
        assert_eq!(Style::default().height(), 410);
    }

    #[test]
    fn test_validate() {
        let mut style = Style::default();
        assert!(style.validate().is_ok());
        style.aspect_ratio = 0.0;
        assert_eq!(style.validate(), Err(StyleError::InvalidAspectRatio));
        style.aspect_ratio = 1.0;
        style.width = -1;
        assert_eq!(style.validate(), Err(StyleError::InvalidWidth));
    }

    #[test]
    fn test_overrides_from_json() {
        let json = r##"{
            "tint": "#112233",
            "vibrancy": false,
            "dot_filled": "#ff4d6d",
            "delete_label": "Back"
        }"##;
        let overrides: StyleOverrides = serde_json::from_str(json).unwrap();
        let style = overrides.into_style().unwrap();

        assert_eq!(style.tint, Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(style.palette.key_text, Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(style.palette.dot_filled, Color::rgb(0xff, 0x4d, 0x6d));
        assert_eq!(style.delete_label, "Back");
        assert_eq!(style.aspect_ratio, DEFAULT_ASPECT_RATIO);
    }

    #[test]
    fn test_overrides_reject_bad_values() {
        assert!(serde_json::from_str::<StyleOverrides>(r#"{"tint": "blue"}"#).is_err());
        assert!(serde_json::from_str::<StyleOverrides>(r##"{"colour": "#ffffff"}"##).is_err());

        let overrides: StyleOverrides = serde_json::from_str(r#"{"width": 0}"#).unwrap();
        assert_eq!(overrides.into_style(), Err(StyleError::InvalidWidth));
    }
}
