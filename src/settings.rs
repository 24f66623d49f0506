//! Demo settings with persistence
//!
//! Settings are saved to `~/.config/isoarpg/settings.toml`

use std::fs;
use std::path::PathBuf;

use enjon_game::SimulationConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationConfig,
    pub demo: DemoSettings,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("isoarpg"))
    }

    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Shape of the headless demo run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Frames to simulate before exiting
    pub frames: u32,
    /// Wall-clock seconds each frame pretends to take
    pub frame_time: f32,
    pub ai_count: u32,
    /// Frames between status lines in the log
    pub report_every: u32,
    /// Optional JSON file of extra weapon and loot profiles
    pub profiles: Option<PathBuf>,
    /// Write the effective settings back to disk on exit
    pub save_on_exit: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_time: 1.0 / 30.0,
            ai_count: 8,
            report_every: 60,
            profiles: None,
            save_on_exit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str("[demo]\nai_count = 3\n").unwrap();
        assert_eq!(settings.demo.ai_count, 3);
        assert_eq!(settings.demo.frames, 600);
        assert_eq!(settings.simulation.cell_size, 64.0);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut settings = Settings::default();
        settings.simulation.seed = 42;
        settings.demo.profiles = Some(PathBuf::from("profiles.json"));
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.simulation.seed, 42);
        assert_eq!(back.demo.profiles, Some(PathBuf::from("profiles.json")));
    }
}
