//! Persisted settings, read once at startup

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings the run loop consults. Built once, then only ever read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// unrendered catch-up steps per rendered frame; 0 renders every step
    pub frame_skip: u32,
    pub sound_enabled: bool,
    pub fps_counter_enabled: bool,
    pub jit_enabled: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_skip: 0,
            sound_enabled: true,
            fps_counter_enabled: true,
            jit_enabled: false,
        }
    }
}

/// Where program images are looked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub program_dir: PathBuf,
    /// matched case-insensitively, without the dot
    pub program_extension: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            program_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("emuloop"),
            program_extension: "nds".to_string(),
        }
    }
}

/// Terminal presentation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// presented frames per second; 0 leaves presentation uncapped
    pub frame_limit: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { frame_limit: 60 }
    }
}

/// Everything in `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub runtime: RuntimeConfig,
    pub paths: PathConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load the user's configuration, writing out defaults on first run
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("emuloop")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runtime.frame_skip, 0);
        assert!(config.runtime.sound_enabled);
        assert!(config.runtime.fps_counter_enabled);
        assert!(!config.runtime.jit_enabled);
        assert_eq!(config.paths.program_extension, "nds");
        assert_eq!(config.display.frame_limit, 60);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("[runtime]\nframe_skip = 3\njit_enabled = true\n").unwrap();
        assert_eq!(parsed.runtime.frame_skip, 3);
        assert!(parsed.runtime.jit_enabled);
        assert!(parsed.runtime.sound_enabled);
        assert_eq!(parsed.display, DisplayConfig::default());
    }

    #[test]
    fn test_negative_frame_skip_rejected() {
        assert!(toml::from_str::<Config>("[runtime]\nframe_skip = -1\n").is_err());
    }

    #[test]
    fn test_first_load_writes_defaults() -> Result<(), ConfigError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path)?;
        assert!(path.exists());
        assert_eq!(Config::load_from(&path)?, config);
        Ok(())
    }
}
