use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cw::DecoderConfig;
use crate::error::{Error, Result};
use crate::practice::DrillFilter;

/// Supported keying speed range. The poll period is sized against `MAX_WPM`.
pub const MIN_WPM: u32 = 1;
pub const MAX_WPM: u32 = 60;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Decoder settings
    pub wpm: u32,
    pub auto_word_space: bool,
    pub direct_mode: bool,

    // Feedback, persisted for the host
    pub beep_volume: u8,

    // Practice settings
    pub drill: DrillFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wpm: 10,
            auto_word_space: false,
            direct_mode: false,
            beep_volume: 0,
            drill: DrillFilter::default(),
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("morse-ime");
            path.push("settings.json");
            path
        })
    }

    /// Load settings from the default location, or return defaults on any
    /// problem. Loaded values are clamped into the supported range.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("could not determine config path, using defaults");
            return Self::default();
        };

        if !path.exists() {
            info!(?path, "config file does not exist, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                info!(?path, "loaded settings");
                settings.clamped()
            }
            Err(e) => {
                warn!(?path, error = %e, "failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| Error::InvalidConfig("could not determine config directory".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write with explicit sync to ensure data reaches disk
        let mut file = fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        info!(?path, "saved settings");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.wpm == 0 {
            return Err(Error::InvalidConfig("words per minute must be positive".into()));
        }
        Ok(())
    }

    /// Clamp speed into `MIN_WPM..=MAX_WPM`
    pub fn clamped(mut self) -> Self {
        let wpm = self.wpm.clamp(MIN_WPM, MAX_WPM);
        if wpm != self.wpm {
            warn!(requested = self.wpm, wpm, "words per minute out of range, clamped");
            self.wpm = wpm;
        }
        self
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            wpm: self.wpm,
            auto_word_space: self.auto_word_space,
            direct_mode: self.direct_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.decoder_config(), DecoderConfig::default());
        assert_eq!(settings.drill, DrillFilter::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            wpm: 25,
            auto_word_space: true,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "wpm": 18 }"#).unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.wpm, 18);
        assert!(!settings.direct_mode);
        assert_eq!(settings.drill, DrillFilter::default());
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(Error::Json(_))));
        assert!(matches!(
            Settings::load_from(&dir.path().join("absent.json")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_zero_wpm_rejected_and_clamped() {
        let settings = Settings {
            wpm: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
        assert_eq!(settings.clone().clamped().wpm, MIN_WPM);

        let dir = tempfile::tempdir().unwrap();
        assert!(settings.save_to(&dir.path().join("s.json")).is_err());

        let fast = Settings {
            wpm: 200,
            ..Settings::default()
        };
        assert_eq!(fast.clamped().wpm, MAX_WPM);
    }
}
