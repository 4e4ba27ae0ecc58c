// ABOUTME: Shared types and configuration for chartdeck.
// ABOUTME: Defines colors, color tables, number formatting, and config file handling.

pub mod color;
pub mod config;
pub mod format;

pub use color::{Color, Palette};
pub use config::{Config, ConfigError, PaletteName, TreemapSettings};
