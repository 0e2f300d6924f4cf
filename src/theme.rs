//! Light/dark theme state.
//!
//! The field never owns the page theme. It only caches the last value it was
//! told about through [`ParticleField::set_theme`](crate::ParticleField::set_theme).
//! This module holds the pieces a host uses to decide *what* to tell it:
//!
//! - [`Theme`] is the flag itself.
//! - [`ThemePreference`] is the persisted user choice (`dark`, `light`, or
//!   follow the system), stored as a small JSON file.
//! - [`ThemeWatcher`] defers the re-read after a toggle notification.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Effective page theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl From<winit::window::Theme> for Theme {
    fn from(theme: winit::window::Theme) -> Self {
        match theme {
            winit::window::Theme::Dark => Theme::Dark,
            winit::window::Theme::Light => Theme::Light,
        }
    }
}

/// Saved theme choice.
///
/// An explicit choice always wins over the platform theme; `System`
/// tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Serialize, Deserialize)]
struct PreferenceFile {
    theme: ThemePreference,
}

impl ThemePreference {
    /// Resolve the effective theme given the platform's current theme.
    pub fn resolve(self, system: Theme) -> Theme {
        match self {
            ThemePreference::System => system,
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
        }
    }

    /// Flip the effective theme and pin it as an explicit choice.
    ///
    /// Returns the new preference; callers persist it with [`save`](Self::save).
    pub fn toggle(self, system: Theme) -> Self {
        match self.resolve(system).toggled() {
            Theme::Dark => ThemePreference::Dark,
            Theme::Light => ThemePreference::Light,
        }
    }

    /// Whether a platform theme change should be applied.
    pub fn follows_system(self) -> bool {
        self == ThemePreference::System
    }

    /// Load a saved preference. A missing file means [`ThemePreference::System`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(ThemePreference::System);
        }
        let json = fs::read_to_string(path)?;
        let file: PreferenceFile = serde_json::from_str(&json)?;
        Ok(file.theme)
    }

    /// Save this preference as `{"theme": "..."}`.
    pub fn save(self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string(&PreferenceFile { theme: self })?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Deferred theme re-read.
///
/// A toggle notification arms the watcher; [`poll`](Self::poll) reports
/// `true` once the delay has elapsed, after which the host reads the
/// current theme and forwards it to the field. Repeated notifications
/// before the deadline push it back.
#[derive(Debug, Clone)]
pub struct ThemeWatcher {
    delay: Duration,
    due: Option<Instant>,
}

impl ThemeWatcher {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    /// Arm a re-read `delay` after `now`.
    pub fn notify(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    /// Whether a re-read is armed.
    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Returns `true` exactly once per notification, when it falls due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_resolution() {
        assert_eq!(ThemePreference::System.resolve(Theme::Dark), Theme::Dark);
        assert_eq!(ThemePreference::System.resolve(Theme::Light), Theme::Light);
        assert_eq!(ThemePreference::Light.resolve(Theme::Dark), Theme::Light);
        assert_eq!(ThemePreference::Dark.resolve(Theme::Light), Theme::Dark);
    }

    #[test]
    fn test_toggle_pins_explicit_choice() {
        let pref = ThemePreference::System.toggle(Theme::Dark);
        assert_eq!(pref, ThemePreference::Light);
        assert!(!pref.follows_system());

        let pref = pref.toggle(Theme::Dark);
        assert_eq!(pref, ThemePreference::Dark);
    }

    #[test]
    fn test_preference_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("netfield-theme-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        assert_eq!(ThemePreference::load(&path).unwrap(), ThemePreference::System);

        ThemePreference::Dark.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"theme":"dark"}"#);
        assert_eq!(ThemePreference::load(&path).unwrap(), ThemePreference::Dark);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_watcher_fires_once_after_delay() {
        let start = Instant::now();
        let mut watcher = ThemeWatcher::new(Duration::from_millis(100));
        assert!(!watcher.poll(start));

        watcher.notify(start);
        assert!(watcher.is_pending());
        assert!(!watcher.poll(start + Duration::from_millis(50)));
        assert!(watcher.poll(start + Duration::from_millis(100)));
        assert!(!watcher.poll(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_watcher_renotify_pushes_deadline() {
        let start = Instant::now();
        let mut watcher = ThemeWatcher::new(Duration::from_millis(100));
        watcher.notify(start);
        watcher.notify(start + Duration::from_millis(80));
        assert!(!watcher.poll(start + Duration::from_millis(120)));
        assert!(watcher.poll(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_zero_delay_reads_on_next_poll() {
        let now = Instant::now();
        let mut watcher = ThemeWatcher::new(Duration::ZERO);
        watcher.notify(now);
        assert!(watcher.poll(now));
    }
}
