//! File-backed tile store.
//!
//! Each tile is two files in one directory, named after the tile's quadtree
//! name (see [`tile_name`]):
//! `{base_dir}/{name}.json` holds the header (floor, scale, resolution) and
//! `{base_dir}/{name}_y.raw` holds S×S little-endian u16 samples, row-major
//! from the north-west corner.

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data::{TileData, TileSamples};
use super::naming::tile_name;
use super::store::TileStore;
use crate::coords::GridCoordinate;
use crate::error::TileStoreError;

/// Per-tile metadata stored next to the raw samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileHeader {
    /// Height in meters of raw sample 0
    pub floor: f32,
    /// Meters per raw sample unit
    pub scale: f32,
    /// Samples per side
    pub sample_count: usize,
}

/// Storage manager for tiles on disk.
pub struct FileTileStore {
    /// Directory holding the tile files
    base_dir: PathBuf,
    /// Resolution every tile must have
    sample_count: usize,
}

impl FileTileStore {
    /// Create a store reading tiles of `sample_count` samples per side from `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P, sample_count: usize) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            sample_count,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Get the header path for a tile
    fn header_path(&self, coord: GridCoordinate) -> PathBuf {
        self.base_dir.join(format!("{}.json", tile_name(coord)))
    }

    /// Get the raw sample path for a tile
    fn raw_path(&self, coord: GridCoordinate) -> PathBuf {
        self.base_dir.join(format!("{}_y.raw", tile_name(coord)))
    }

    /// Check if a tile exists on disk
    pub fn tile_exists(&self, coord: GridCoordinate) -> bool {
        self.header_path(coord).exists()
    }

    /// Read a tile from disk.
    ///
    /// Returns None if the tile has no header file.
    pub fn read_tile(&self, coord: GridCoordinate) -> Result<Option<TileSamples>, TileStoreError> {
        let header_path = self.header_path(coord);

        let file = match File::open(&header_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let header: TileHeader = serde_json::from_reader(BufReader::new(file))?;

        if header.sample_count != self.sample_count {
            return Err(TileStoreError::SampleCountMismatch {
                path: header_path,
                expected: self.sample_count,
                found: header.sample_count,
            });
        }

        let raw_path = self.raw_path(coord);
        let bytes = fs::read(&raw_path)?;
        let expected = self.sample_count * self.sample_count * std::mem::size_of::<u16>();
        if bytes.len() != expected {
            return Err(TileStoreError::RawSizeMismatch {
                path: raw_path,
                expected,
                found: bytes.len(),
            });
        }

        let samples: Vec<u16> = bytemuck::pod_collect_to_vec::<u8, u16>(&bytes)
            .into_iter()
            .map(u16::from_le)
            .collect();

        Ok(TileSamples::new(header.scale, header.floor, self.sample_count, samples))
    }

    /// Write a tile to disk, creating the directory if needed.
    pub fn write_tile(&self, coord: GridCoordinate, tile: &TileSamples) -> Result<(), TileStoreError> {
        if tile.sample_count() != self.sample_count {
            return Err(TileStoreError::SampleCountMismatch {
                path: self.header_path(coord),
                expected: self.sample_count,
                found: tile.sample_count(),
            });
        }

        fs::create_dir_all(&self.base_dir)?;

        let header = TileHeader {
            floor: tile.offset,
            scale: tile.scale,
            sample_count: tile.sample_count(),
        };
        fs::write(self.header_path(coord), serde_json::to_vec_pretty(&header)?)?;

        let little_endian: Vec<u16> = tile.samples().iter().map(|s| s.to_le()).collect();
        fs::write(self.raw_path(coord), bytemuck::cast_slice::<u16, u8>(&little_endian))?;

        Ok(())
    }

    /// Delete a tile from disk (if it exists).
    pub fn delete_tile(&self, coord: GridCoordinate) -> std::io::Result<()> {
        for path in [self.header_path(coord), self.raw_path(coord)] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

impl TileStore for FileTileStore {
    fn load(&self, coord: GridCoordinate) -> TileData {
        match self.read_tile(coord) {
            Ok(Some(samples)) => TileData::loaded(samples),
            Ok(None) => TileData::Empty,
            Err(e) => {
                log::warn!("Treating tile {} as empty: {}", coord, e);
                TileData::Empty
            }
        }
    }
}
