//! Error types for tile storage and configuration.
//!
//! None of these reach the height query path: a tile that cannot be read is
//! treated as absent and queries over it return flat ground.

use std::path::PathBuf;

/// Errors that can occur while reading or writing tile files.
#[derive(Debug, thiserror::Error)]
pub enum TileStoreError {
    /// IO error (permissions, truncated read, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Header file exists but is not valid JSON for a tile header
    #[error("Malformed tile header: {0}")]
    Header(#[from] serde_json::Error),
    /// Header declares a different resolution than the installation uses
    #[error("Tile {path:?} has {found} samples per side, expected {expected}")]
    SampleCountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    /// Raw sample file is not exactly S*S little-endian u16 values
    #[error("Raw sample file {path:?} is {found} bytes, expected {expected}")]
    RawSizeMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Errors that can occur while loading a terrain configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
