// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves canvas, font, palette and treemap settings from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Palette;

/// Built-in color tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaletteName {
    #[default]
    Light,
    Dark,
}

impl PaletteName {
    pub fn all() -> &'static [PaletteName] {
        &[PaletteName::Light, PaletteName::Dark]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaletteName::Light => "Light",
            PaletteName::Dark => "Dark",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            PaletteName::Light => Palette::light(),
            PaletteName::Dark => Palette::dark(),
        }
    }
}

/// Treemap rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemapSettings {
    /// Levels below the focused node to draw (0 = all)
    pub max_depth: usize,
    /// Rects narrower than this (px) get no label
    pub min_label_width: f32,
    /// Gap between a rect's outline and its fill (px)
    pub padding: f32,
}

impl Default for TreemapSettings {
    fn default() -> Self {
        Self {
            max_depth: 2,
            min_label_width: 36.0,
            padding: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas dimensions in px
    pub width: u32,
    pub height: u32,

    /// CSS font-family for all text
    pub font_family: String,

    /// Base font size in px; titles and labels scale from it
    pub font_size: f32,

    /// Color table
    pub palette: PaletteName,

    pub treemap: TreemapSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            font_family: "Inter, Helvetica, Arial, sans-serif".to_string(),
            font_size: 12.0,
            palette: PaletteName::default(),
            treemap: TreemapSettings::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl Config {
    /// Get the default config file path (~/.config/chartdeck/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chartdeck").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)?;
        Ok(path)
    }

    /// Render to TOML without touching disk
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
