// ABOUTME: Color representation and conversion utilities.
// ABOUTME: Parses and emits CSS hex colors and holds the chart color tables.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("Color must start with '#': {0}")]
    MissingHash(String),

    #[error("Color must have 3, 6 or 8 hex digits: {0}")]
    BadLength(String),

    #[error("Invalid hex digit in color: {0}")]
    BadDigit(String),
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Build from 0-255 channel values
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(hex.to_string()))?;

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => digits.to_string(),
            _ => return Err(ColorError::BadLength(hex.to_string())),
        };

        let channel = |i: usize| -> Result<f32, ColorError> {
            expanded
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .map(|v| v as f32 / 255.0)
                .ok_or_else(|| ColorError::BadDigit(hex.to_string()))
        };

        let alpha = if expanded.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// `#rrggbb`, ignoring alpha
    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }

    /// CSS value: hex when opaque, `rgba()` otherwise
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            self.to_hex()
        } else {
            format!(
                "rgba({},{},{},{:.2})",
                to_byte(self.r),
                to_byte(self.g),
                to_byte(self.b),
                self.a.clamp(0.0, 1.0)
            )
        }
    }

    /// Linear interpolation between two colors, `t` clamped to 0..=1
    pub fn lerp(&self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Mix toward white by `amount` (0.0 = unchanged, 1.0 = white)
    pub fn lighten(&self, amount: f32) -> Color {
        let lighter = self.lerp(Color::WHITE, amount);
        lighter.with_alpha(self.a)
    }

    pub fn with_alpha(&self, a: f32) -> Color {
        Color::rgba(self.r, self.g, self.b, a)
    }
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        if color.a >= 1.0 {
            color.to_hex()
        } else {
            format!("{}{:02x}", color.to_hex(), to_byte(color.a))
        }
    }
}

/// Color table shared by every chart: chrome colors, a categorical series
/// ramp, and the four status colors used for alert severities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub grid: Color,
    pub accent: Color,
    pub series: Vec<Color>,
    pub critical: Color,
    pub warning: Color,
    pub info: Color,
    pub ok: Color,
}

impl Palette {
    /// White background, Tableau-style categorical ramp
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            background: Color::from_u8(0xff, 0xff, 0xff),
            foreground: Color::from_u8(0x1f, 0x29, 0x37),
            muted: Color::from_u8(0x6b, 0x72, 0x80),
            grid: Color::from_u8(0xe5, 0xe7, 0xeb),
            accent: Color::from_u8(0x25, 0x63, 0xeb),
            series: vec![
                Color::from_u8(0x4e, 0x79, 0xa7),
                Color::from_u8(0xf2, 0x8e, 0x2b),
                Color::from_u8(0xe1, 0x57, 0x59),
                Color::from_u8(0x76, 0xb7, 0xb2),
                Color::from_u8(0x59, 0xa1, 0x4f),
                Color::from_u8(0xed, 0xc9, 0x48),
                Color::from_u8(0xb0, 0x7a, 0xa1),
                Color::from_u8(0xff, 0x9d, 0xa7),
                Color::from_u8(0x9c, 0x75, 0x5f),
                Color::from_u8(0xba, 0xb0, 0xac),
            ],
            critical: Color::from_u8(0xdc, 0x26, 0x26),
            warning: Color::from_u8(0xd9, 0x77, 0x06),
            info: Color::from_u8(0x25, 0x63, 0xeb),
            ok: Color::from_u8(0x05, 0x96, 0x69),
        }
    }

    /// Slate background for dashboards shown on wall displays
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            background: Color::from_u8(0x0f, 0x17, 0x2a),
            foreground: Color::from_u8(0xe2, 0xe8, 0xf0),
            muted: Color::from_u8(0x94, 0xa3, 0xb8),
            grid: Color::from_u8(0x33, 0x41, 0x55),
            accent: Color::from_u8(0x38, 0xbd, 0xf8),
            series: vec![
                Color::from_u8(0x60, 0xa5, 0xfa),
                Color::from_u8(0xfb, 0x92, 0x3c),
                Color::from_u8(0xf8, 0x71, 0x71),
                Color::from_u8(0x2d, 0xd4, 0xbf),
                Color::from_u8(0x4a, 0xde, 0x80),
                Color::from_u8(0xfa, 0xcc, 0x15),
                Color::from_u8(0xc0, 0x84, 0xfc),
                Color::from_u8(0xf4, 0x72, 0xb6),
            ],
            critical: Color::from_u8(0xef, 0x44, 0x44),
            warning: Color::from_u8(0xf5, 0x9e, 0x0b),
            info: Color::from_u8(0x38, 0xbd, 0xf8),
            ok: Color::from_u8(0x22, 0xc5, 0x5e),
        }
    }

    /// Categorical color for series `index`, wrapping around the ramp
    pub fn series_color(&self, index: usize) -> Color {
        if self.series.is_empty() {
            return self.accent;
        }
        self.series[index % self.series.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}
