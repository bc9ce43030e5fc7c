//! Loaded tile contents.

use std::sync::Arc;

/// Raw elevation raster of one tile.
///
/// Samples are stored row-major, one row per z (north to south), each row
/// running west to east. Height in meters is `sample * scale + offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileSamples {
    /// Meters per raw sample unit
    pub scale: f32,
    /// Height in meters of a raw sample of zero (the tile floor)
    pub offset: f32,
    sample_count: usize,
    samples: Vec<u16>,
}

impl TileSamples {
    /// Wrap a raw sample grid.
    ///
    /// Returns None unless `samples` holds exactly `sample_count²` values.
    pub fn new(scale: f32, offset: f32, sample_count: usize, samples: Vec<u16>) -> Option<Self> {
        if sample_count == 0 || samples.len() != sample_count * sample_count {
            return None;
        }
        Some(Self {
            scale,
            offset,
            sample_count,
            samples,
        })
    }

    /// A tile whose samples are all the same raw value
    pub fn flat(scale: f32, offset: f32, sample_count: usize, raw: u16) -> Self {
        Self {
            scale,
            offset,
            sample_count,
            samples: vec![raw; sample_count * sample_count],
        }
    }

    /// Build a tile by evaluating `f(x, z)` for every sample.
    pub fn from_fn(scale: f32, offset: f32, sample_count: usize, mut f: impl FnMut(usize, usize) -> u16) -> Self {
        let mut samples = Vec::with_capacity(sample_count * sample_count);
        for z in 0..sample_count {
            for x in 0..sample_count {
                samples.push(f(x, z));
            }
        }
        Self {
            scale,
            offset,
            sample_count,
            samples,
        }
    }

    /// Samples per side
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Raw samples in row-major order
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Raw sample at local indices
    pub fn raw(&self, x: usize, z: usize) -> u16 {
        debug_assert!(
            x < self.sample_count && z < self.sample_count,
            "sample ({}, {}) outside a {}-sample tile",
            x,
            z,
            self.sample_count
        );
        self.samples[z * self.sample_count + x]
    }

    /// Height in meters at local indices
    pub fn height(&self, x: usize, z: usize) -> f32 {
        self.raw(x, z) as f32 * self.scale + self.offset
    }

    /// Approximate memory footprint in bytes
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.samples.len() * std::mem::size_of::<u16>()
    }
}

/// What the store returned for one grid coordinate.
///
/// `Empty` means no file exists there; the ground is flat at height 0.
/// Cloning is cheap and shares the loaded samples.
#[derive(Clone, Debug, Default)]
pub enum TileData {
    #[default]
    Empty,
    Loaded(Arc<TileSamples>),
}

impl TileData {
    pub fn loaded(samples: TileSamples) -> Self {
        TileData::Loaded(Arc::new(samples))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TileData::Empty)
    }

    pub fn samples(&self) -> Option<&Arc<TileSamples>> {
        match self {
            TileData::Empty => None,
            TileData::Loaded(samples) => Some(samples),
        }
    }

    /// Height in meters at local indices; 0 for an empty tile
    pub fn height(&self, x: usize, z: usize) -> f32 {
        match self {
            TileData::Empty => 0.0,
            TileData::Loaded(samples) => samples.height(x, z),
        }
    }

    /// True if both values refer to the same loaded samples, or both are empty.
    pub fn same_as(&self, other: &TileData) -> bool {
        match (self, other) {
            (TileData::Empty, TileData::Empty) => true,
            (TileData::Loaded(a), TileData::Loaded(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn memory_size(&self) -> usize {
        match self {
            TileData::Empty => 0,
            TileData::Loaded(samples) => samples.memory_size(),
        }
    }
}
