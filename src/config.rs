//! Field configuration.
//!
//! [`FieldConfig`] holds every constant the simulator reads. It can be built
//! with chained `with_*` calls or loaded from a JSON file:
//!
//! ```ignore
//! let config = FieldConfig::default()
//!     .with_particle_count(120)
//!     .with_connection_distance(120.0);
//!
//! config.save("field.json")?;
//! let loaded = FieldConfig::load("field.json")?;
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::{ColorWeights, Palette};
use crate::error::{ConfigError, FieldError};

fn default_ease_factor() -> f32 {
    0.1
}

fn default_hover_scale() -> f32 {
    2.0
}

fn default_repel_strength() -> f32 {
    0.5
}

fn default_connection_alpha() -> f32 {
    0.5
}

fn default_line_width() -> f32 {
    0.5
}

fn default_theme_delay_ms() -> u64 {
    100
}

/// Particle field settings.
///
/// Distances and speeds are in surface units (pixels) and per-frame steps;
/// there is no time scaling.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Fixed population size.
    pub particle_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Upper bound on each velocity component's magnitude is half of this.
    pub max_speed: f32,
    /// Pairs closer than this are joined by a line.
    pub connection_distance: f32,
    /// Radius around the pointer inside which particles grow and are pushed away.
    pub pointer_radius: f32,
    #[serde(default)]
    pub color_weights: ColorWeights,
    #[serde(default)]
    pub palette: Palette,
    /// Fraction of the remaining radius gap closed per frame.
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f32,
    /// Target radius multiplier while the pointer is near.
    #[serde(default = "default_hover_scale")]
    pub hover_scale: f32,
    /// Repulsion displacement at zero distance from the pointer.
    #[serde(default = "default_repel_strength")]
    pub repel_strength: f32,
    /// Connection alpha at zero distance; falls linearly to 0 at the threshold.
    #[serde(default = "default_connection_alpha")]
    pub connection_alpha: f32,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    /// Delay between a theme toggle and the field re-reading the theme.
    #[serde(default = "default_theme_delay_ms")]
    pub theme_delay_ms: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 80,
            min_radius: 1.0,
            max_radius: 5.0,
            max_speed: 0.5,
            connection_distance: 150.0,
            pointer_radius: 150.0,
            color_weights: ColorWeights::default(),
            palette: Palette::default(),
            ease_factor: default_ease_factor(),
            hover_scale: default_hover_scale(),
            repel_strength: default_repel_strength(),
            connection_alpha: default_connection_alpha(),
            line_width: default_line_width(),
            theme_delay_ms: default_theme_delay_ms(),
        }
    }
}

impl FieldConfig {
    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the spawn radius range.
    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min;
        self.max_radius = max;
        self
    }

    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.max_speed = speed;
        self
    }

    pub fn with_connection_distance(mut self, distance: f32) -> Self {
        self.connection_distance = distance;
        self
    }

    pub fn with_pointer_radius(mut self, radius: f32) -> Self {
        self.pointer_radius = radius;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_color_weights(mut self, weights: ColorWeights) -> Self {
        self.color_weights = weights;
        self
    }

    /// Delay before a theme toggle is picked up.
    pub fn theme_delay(&self) -> Duration {
        Duration::from_millis(self.theme_delay_ms)
    }

    /// Check the constructor preconditions.
    ///
    /// The simulator itself does not call this; out-of-range values are a
    /// caller error. Hosts that accept user-supplied files run it after
    /// loading.
    pub fn validate(&self) -> Result<(), FieldError> {
        let positive = [
            ("minRadius", self.min_radius),
            ("connectionDistance", self.connection_distance),
            ("pointerRadius", self.pointer_radius),
            ("lineWidth", self.line_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FieldError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.max_radius >= self.min_radius) {
            return Err(FieldError::InvalidConfig(format!(
                "maxRadius ({}) is below minRadius ({})",
                self.max_radius, self.min_radius
            )));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(FieldError::InvalidConfig(format!(
                "maxSpeed must be non-negative, got {}",
                self.max_speed
            )));
        }
        if !(self.ease_factor > 0.0 && self.ease_factor <= 1.0) {
            return Err(FieldError::InvalidConfig(format!(
                "easeFactor must be in (0, 1], got {}",
                self.ease_factor
            )));
        }
        if !(self.hover_scale >= 1.0) {
            return Err(FieldError::InvalidConfig(format!(
                "hoverScale must be at least 1, got {}",
                self.hover_scale
            )));
        }
        if !(self.color_weights.total() > 0.0) {
            return Err(FieldError::InvalidConfig(
                "colorWeights must have a positive sum".into(),
            ));
        }
        Ok(())
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FieldConfig::default();
        assert_eq!(config.particle_count, 80);
        assert_eq!(config.min_radius, 1.0);
        assert_eq!(config.max_radius, 5.0);
        assert_eq!(config.max_speed, 0.5);
        assert_eq!(config.connection_distance, 150.0);
        assert_eq!(config.pointer_radius, 150.0);
        assert_eq!(config.theme_delay(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = FieldConfig::default()
            .with_particle_count(12)
            .with_radius_range(2.0, 3.0)
            .with_connection_distance(50.0);
        assert_eq!(config.particle_count, 12);
        assert_eq!(config.min_radius, 2.0);
        assert_eq!(config.max_radius, 3.0);
        assert_eq!(config.connection_distance, 50.0);
    }

    #[test]
    fn test_validate_rejects_inverted_radius() {
        let config = FieldConfig::default().with_radius_range(5.0, 1.0);
        assert!(matches!(config.validate(), Err(FieldError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let config = FieldConfig::default().with_connection_distance(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "particleCount": 10,
            "minRadius": 1.0,
            "maxRadius": 2.0,
            "maxSpeed": 0.25,
            "connectionDistance": 90.0,
            "pointerRadius": 60.0
        }"#;
        let config: FieldConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.ease_factor, 0.1);
        assert_eq!(config.palette, Palette::default());
        assert_eq!(config.theme_delay_ms, 100);
    }

    #[test]
    fn test_save_load_file() {
        let path = std::env::temp_dir().join(format!("netfield-config-{}.json", std::process::id()));
        let config = FieldConfig::default().with_particle_count(33);
        config.save(&path).unwrap();
        let loaded = FieldConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.particle_count, 33);
        assert_eq!(loaded.connection_distance, config.connection_distance);
    }
}
