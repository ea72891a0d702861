//! Configuration management for EvenTone
//!
//! This crate handles loading, saving and accessing
//! application configuration.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tone_core::{Band, Error, SkillLevel, TICK_INTERVAL_MS};

/// Equalizer gains in dB, one per band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqSettings {
    pub low_db: f32,
    pub mid_db: f32,
    pub high_db: f32,
}

impl EqSettings {
    pub fn gain(&self, band: Band) -> f32 {
        match band {
            Band::Low => self.low_db,
            Band::Mid => self.mid_db,
            Band::High => self.high_db,
        }
    }

    pub fn set_gain(&mut self, band: Band, gain_db: f32) {
        match band {
            Band::Low => self.low_db = gain_db,
            Band::Mid => self.mid_db = gain_db,
            Band::High => self.high_db = gain_db,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Wording tier for EQ suggestions
    pub skill_level: SkillLevel,

    /// Milliseconds between analysis passes
    pub tick_interval_ms: u64,

    /// Preferred audio input device (empty string means system default)
    pub input_device: String,

    /// Optional TOML file replacing the built-in advisory table
    pub advisory_table: Option<PathBuf>,

    /// Initial equalizer gains
    pub eq: EqSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skill_level: SkillLevel::default(),
            tick_interval_ms: TICK_INTERVAL_MS,
            input_device: "".to_string(),
            advisory_table: None,
            eq: EqSettings::default(),
        }
    }
}

/// Configuration manager
pub struct ConfigManager {
    settings: Settings,
    config_file: PathBuf,
}

impl ConfigManager {
    /// Create a config manager backed by the user's config directory
    pub fn new() -> Result<Self, Error> {
        let mut config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Failed to determine config directory".to_string()))?;
        config_dir.push("eventone");

        Self::with_file(config_dir.join("config.toml"))
    }

    /// Create a new ConfigManager with a custom file path
    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_file = path.as_ref().to_path_buf();
        let settings = if config_file.exists() {
            Self::load_from_file(&config_file)?
        } else {
            debug!("Config file {:?} not found, using defaults", config_file);
            Settings::default()
        };

        Ok(Self {
            settings,
            config_file,
        })
    }

    /// Load settings from a TOML file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        if settings.tick_interval_ms == 0 {
            return Err(Error::Config(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(settings)
    }

    /// Save settings to the config file
    pub fn save(&self) -> Result<(), Error> {
        let toml = toml::to_string_pretty(&self.settings)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = self.config_file.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        fs::write(&self.config_file, toml)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        debug!("Saved config to {:?}", self.config_file);
        Ok(())
    }

    /// Path of the backing config file
    pub fn path(&self) -> &Path {
        &self.config_file
    }

    /// Get the current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to settings
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}
