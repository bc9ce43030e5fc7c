//! Per-installation terrain constants.
//!
//! Every tile of an installation shares the same resolution and sample
//! spacing, so these live in one place and are handed to the window and the
//! elevation field at construction.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tiles::{DEFAULT_SAMPLE_COUNT, DEFAULT_SAMPLE_SIZE, DEFAULT_WINDOW_SIZE};

/// Terrain configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Samples per tile side (S)
    pub sample_count: usize,
    /// Distance between adjacent samples in meters
    pub sample_size: f32,
    /// Tiles per window side (W)
    pub window_size: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            sample_size: DEFAULT_SAMPLE_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl TerrainConfig {
    /// Create a config with explicit values (not validated).
    pub fn new(sample_count: usize, sample_size: f32, window_size: usize) -> Self {
        Self {
            sample_count,
            sample_size,
            window_size,
        }
    }

    /// Load a config from a JSON file.
    ///
    /// Missing fields take their defaults; the result is validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a config from a JSON string and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: TerrainConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a usable grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count < 2 {
            return Err(ConfigError::Invalid(format!(
                "sample_count must be at least 2, got {}",
                self.sample_count
            )));
        }
        if self.sample_count > i32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "sample_count {} does not fit the sample index range",
                self.sample_count
            )));
        }
        if !self.sample_size.is_finite() || self.sample_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sample_size must be positive, got {}",
                self.sample_size
            )));
        }
        if self.window_size == 0 {
            return Err(ConfigError::Invalid("window_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Tile edge length in meters
    pub fn tile_size(&self) -> f32 {
        self.sample_count as f32 * self.sample_size
    }
}
