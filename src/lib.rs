//! Terrain elevation over an unbounded grid of tiles.
//!
//! Tiles are loaded lazily into a sliding window and queried for ground
//! height, interpolated on the same triangles the terrain mesh draws.

pub mod config;
pub mod coords;
pub mod elevation;
pub mod error;
pub mod tiles;

pub use config::TerrainConfig;
pub use coords::{GridCoordinate, SamplePoint, WorldLocation};
pub use elevation::{ElevationField, QuadSplit, ResidentElevation};
pub use error::{ConfigError, TileStoreError};
pub use tiles::{FileTileStore, MemoryTileStore, NoiseTileStore, TileData, TileSamples, TileStore, TileWindow};
