//! Colour palette and weighted colour roles.
//!
//! Colours are linear `Vec3` RGB triples in `0.0..=1.0`, the same
//! representation the renderers consume. Palettes serialize as `"#rrggbb"`
//! strings so configuration files stay readable.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Parse a `#rrggbb` (or `rrggbb`, or short `#rgb`) hex string into RGB.
///
/// Returns `None` for anything that is not a valid hex colour.
pub fn hex_to_rgb(hex: &str) -> Option<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);

    match digits.len() {
        6 => Some(Vec3::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        3 => {
            let expand = |i: usize| {
                let c = &digits[i..i + 1];
                channel(&format!("{c}{c}"))
            };
            Some(Vec3::new(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

/// Format an RGB colour as a lowercase `#rrggbb` string.
pub fn rgb_to_hex(rgb: Vec3) -> String {
    let [r, g, b] = rgb_to_bytes(rgb);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Quantize an RGB colour to 8-bit channels.
pub fn rgb_to_bytes(rgb: Vec3) -> [u8; 3] {
    let c = rgb.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8]
}

/// Serde adapter storing a `Vec3` colour as a hex string.
mod hex_color {
    use glam::Vec3;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rgb: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::rgb_to_hex(*rgb))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::hex_to_rgb(&s).ok_or_else(|| D::Error::custom(format!("invalid hex colour '{s}'")))
    }
}

/// The site colour scheme the field draws with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    /// Main accent (most particles, light-theme connections).
    #[serde(with = "hex_color")]
    pub primary: Vec3,
    /// Lighter accent (dark-theme connections).
    #[serde(with = "hex_color")]
    pub primary_light: Vec3,
    #[serde(with = "hex_color")]
    pub secondary: Vec3,
    /// Page background in the dark theme.
    #[serde(with = "hex_color")]
    pub dark: Vec3,
    /// Page background in the light theme.
    #[serde(with = "hex_color")]
    pub light: Vec3,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Vec3::new(37.0, 99.0, 235.0) / 255.0,      // #2563eb
            primary_light: Vec3::new(96.0, 165.0, 250.0) / 255.0, // #60a5fa
            secondary: Vec3::new(16.0, 185.0, 129.0) / 255.0,   // #10b981
            dark: Vec3::new(31.0, 41.0, 55.0) / 255.0,          // #1f2937
            light: Vec3::new(249.0, 250.0, 251.0) / 255.0,      // #f9fafb
        }
    }
}

impl Palette {
    /// Resolve a particle colour role to RGB.
    pub fn resolve(&self, role: ParticleColor) -> Vec3 {
        match role {
            ParticleColor::Primary => self.primary,
            ParticleColor::PrimaryLight => self.primary_light,
            ParticleColor::Secondary => self.secondary,
        }
    }

    /// Stroke colour for connection lines under the given theme.
    ///
    /// Dark pages get the light accent so the lines stay visible.
    pub fn connection_color(&self, theme: Theme) -> Vec3 {
        match theme {
            Theme::Dark => self.primary_light,
            Theme::Light => self.primary,
        }
    }

    /// Background colour behind the field under the given theme.
    pub fn background(&self, theme: Theme) -> Vec3 {
        match theme {
            Theme::Dark => self.dark,
            Theme::Light => self.light,
        }
    }
}

/// Colour role assigned to a particle at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleColor {
    Primary,
    PrimaryLight,
    Secondary,
}

/// Relative odds of each [`ParticleColor`] role.
///
/// Weights need not sum to one; [`ColorWeights::pick`] normalizes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorWeights {
    pub primary: f32,
    pub primary_light: f32,
    pub secondary: f32,
}

impl Default for ColorWeights {
    fn default() -> Self {
        Self {
            primary: 0.7,
            primary_light: 0.2,
            secondary: 0.1,
        }
    }
}

impl ColorWeights {
    /// Sum of all weights.
    pub fn total(&self) -> f32 {
        self.primary + self.primary_light + self.secondary
    }

    /// Map a uniform sample `u` in `[0, 1)` to a colour role.
    ///
    /// Cumulative bands are laid out in primary, primary-light, secondary
    /// order, so with the default weights `u < 0.7` is primary and
    /// `u < 0.9` is primary-light.
    pub fn pick(&self, u: f32) -> ParticleColor {
        let total = self.total();
        if total <= 0.0 {
            return ParticleColor::Primary;
        }

        let scaled = u * total;
        if scaled < self.primary {
            ParticleColor::Primary
        } else if scaled < self.primary + self.primary_light {
            ParticleColor::PrimaryLight
        } else {
            ParticleColor::Secondary
        }
    }
}
