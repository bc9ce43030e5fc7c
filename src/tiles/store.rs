//! Source of tile data for the window.

use std::collections::HashMap;
use std::sync::Arc;

use super::data::{TileData, TileSamples};
use crate::coords::GridCoordinate;

/// Loads one tile's elevation raster on demand.
///
/// Implementations must be deterministic for a given coordinate and must
/// return [`TileData::Empty`] rather than fail when nothing is stored there.
/// Loads are blocking; the window calls them from its single writer.
pub trait TileStore {
    fn load(&self, coord: GridCoordinate) -> TileData;
}

impl<T: TileStore + ?Sized> TileStore for &T {
    fn load(&self, coord: GridCoordinate) -> TileData {
        (**self).load(coord)
    }
}

impl<T: TileStore + ?Sized> TileStore for Box<T> {
    fn load(&self, coord: GridCoordinate) -> TileData {
        (**self).load(coord)
    }
}

impl<T: TileStore + ?Sized> TileStore for Arc<T> {
    fn load(&self, coord: GridCoordinate) -> TileData {
        (**self).load(coord)
    }
}

/// Tiles held in memory, keyed by grid coordinate.
///
/// Useful for embedding pre-built terrain and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryTileStore {
    tiles: HashMap<GridCoordinate, TileData>,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tile, replacing any previous one at the same coordinate
    pub fn insert(&mut self, coord: GridCoordinate, samples: TileSamples) {
        self.tiles.insert(coord, TileData::loaded(samples));
    }

    pub fn remove(&mut self, coord: GridCoordinate) -> bool {
        self.tiles.remove(&coord).is_some()
    }

    pub fn contains(&self, coord: GridCoordinate) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileStore for MemoryTileStore {
    fn load(&self, coord: GridCoordinate) -> TileData {
        self.tiles.get(&coord).cloned().unwrap_or_default()
    }
}
