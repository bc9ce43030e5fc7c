//! Elevation tiles and the window that caches them.
//!
//! The world is an unbounded grid of square tiles, each holding an S×S raster
//! of raw elevation samples. Only a W×W window of the grid is kept in memory;
//! tiles are loaded lazily through a [`TileStore`] the first time they are
//! requested.
//!
//! # Default Installation
//!
//! | Quantity        | Value  |
//! |-----------------|--------|
//! | Samples / side  | 256    |
//! | Sample spacing  | 8 m    |
//! | Tile size       | 2048 m |
//! | Window          | 8×8    |

pub mod data;
pub mod naming;
pub mod procedural;
pub mod storage;
pub mod store;
pub mod window;

pub use data::{TileData, TileSamples};
pub use naming::tile_name;
pub use procedural::NoiseTileStore;
pub use storage::{FileTileStore, TileHeader};
pub use store::{MemoryTileStore, TileStore};
pub use window::{CacheStats, TileWindow};

/// Samples per tile side
pub const DEFAULT_SAMPLE_COUNT: usize = 256;

/// Meters between adjacent samples
pub const DEFAULT_SAMPLE_SIZE: f32 = 8.0;

/// Tiles per window side
pub const DEFAULT_WINDOW_SIZE: usize = 8;
