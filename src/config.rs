//! Navigator settings, persisted as TOML under `~/.config/padnav/`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".config/padnav";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavigatorSettings {
    /// Leading-edge window for navigation and for scroll requests.
    pub throttle_ms: u64,
    /// Deadzone of the left stick (navigation).
    pub navigation_stick_threshold: f64,
    /// Deadzone of the right stick (scrolling).
    pub scroll_stick_threshold: f64,
    /// Fraction of the client extent scrolled to reveal a navigation candidate.
    pub navigation_scroll_speed: f64,
    /// Smooth stick scrolling. Scrolls made while navigating are always immediate.
    pub smooth_scroll: bool,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            throttle_ms: 250,
            navigation_stick_threshold: 0.6,
            scroll_stick_threshold: 0.4,
            navigation_scroll_speed: 0.5,
            smooth_scroll: true,
        }
    }
}

impl NavigatorSettings {
    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle_ms == 0 {
            return Err(ConfigError::Invalid("throttle_ms must be positive".into()));
        }
        for (name, value) in [
            ("navigation_stick_threshold", self.navigation_stick_threshold),
            ("scroll_stick_threshold", self.scroll_stick_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if !(self.navigation_scroll_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "navigation_scroll_speed must be positive, got {}",
                self.navigation_scroll_speed
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Reading settings from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Settings from the default location, or the defaults if that fails.
    pub fn load_or_default() -> Self {
        let path = default_path();
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// `~/.config/padnav/settings.toml`
pub fn default_path() -> PathBuf {
    let mut path = get_home_dir();
    path.push(CONFIG_DIR);
    path.push(SETTINGS_FILE);
    path
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_layout() {
        let settings = NavigatorSettings::default();
        assert_eq!(settings.throttle_window(), Duration::from_millis(250));
        assert_eq!(settings.navigation_stick_threshold, 0.6);
        assert_eq!(settings.scroll_stick_threshold, 0.4);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let settings = NavigatorSettings::from_toml_str("throttle_ms = 100\nsmooth_scroll = false")
            .expect("settings parse");
        assert_eq!(settings.throttle_ms, 100);
        assert!(!settings.smooth_scroll);
        assert_eq!(settings.navigation_scroll_speed, 0.5);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let zero_window = NavigatorSettings {
            throttle_ms: 0,
            ..Default::default()
        };
        assert!(matches!(zero_window.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            NavigatorSettings::from_toml_str("scroll_stick_threshold = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            NavigatorSettings::from_toml_str("navigation_scroll_speed = 0.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            NavigatorSettings::from_toml_str("throttle_ms = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = std::env::temp_dir().join(format!("padnav-settings-{}", std::process::id()));
        let path = dir.join(SETTINGS_FILE);
        let settings = NavigatorSettings {
            throttle_ms: 180,
            smooth_scroll: false,
            ..Default::default()
        };

        settings.save(&path).expect("settings saved");
        let loaded = NavigatorSettings::load(&path).expect("settings loaded");
        assert_eq!(loaded, settings);

        let _ = fs::remove_dir_all(&dir);
    }
}
