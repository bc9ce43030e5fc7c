//! Deterministic procedural tiles.
//!
//! Noise is sampled at world sample coordinates, so the same world point
//! gives the same raw value no matter which tile asks for it and adjacent
//! tiles continue each other without stitching.

use std::collections::HashSet;

use noise::{NoiseFn, Perlin};

use super::data::{TileData, TileSamples};
use super::store::TileStore;
use crate::coords::GridCoordinate;

/// Tile store generating fractal Perlin terrain on demand.
pub struct NoiseTileStore {
    noise: Perlin,
    sample_count: usize,
    /// Meters per raw sample unit
    scale: f32,
    /// Height of raw sample 0
    floor: f32,
    /// Peak-to-trough relief in meters
    relief: f32,
    /// Base frequency in cycles per sample
    frequency: f64,
    octaves: u32,
    persistence: f64,
    /// Coordinates reported as having no tile
    missing: HashSet<GridCoordinate>,
}

impl NoiseTileStore {
    pub fn new(seed: u32, sample_count: usize) -> Self {
        Self {
            noise: Perlin::new(seed),
            sample_count,
            scale: 0.05,
            floor: 0.0,
            relief: 400.0,
            frequency: 1.0 / 96.0,
            octaves: 4,
            persistence: 0.5,
            missing: HashSet::new(),
        }
    }

    /// Set the height range to `[floor, floor + relief]`
    pub fn with_relief(mut self, floor: f32, relief: f32) -> Self {
        self.floor = floor;
        self.relief = relief.max(0.0);
        // Keep the raw range inside u16
        self.scale = (self.relief / u16::MAX as f32).max(f32::EPSILON);
        self
    }

    /// Mark coordinates that load as empty
    pub fn with_missing(mut self, coords: impl IntoIterator<Item = GridCoordinate>) -> Self {
        self.missing.extend(coords);
        self
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Raw sample at a world sample position (x east, z south)
    fn raw_at(&self, world_x: i64, world_z: i64) -> u16 {
        let value = fbm_noise(
            &self.noise,
            world_x as f64 * self.frequency,
            world_z as f64 * self.frequency,
            self.octaves,
            self.persistence,
            2.0,
        );
        let unit = ((value + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
        (unit * self.relief / self.scale).round().clamp(0.0, u16::MAX as f32) as u16
    }

    /// Generate the samples for one tile (ignores the missing set)
    pub fn generate(&self, coord: GridCoordinate) -> TileSamples {
        let s = self.sample_count as i64;
        let base_x = coord.tile_x as i64 * s;
        // Tile rows grow north while sample rows run south
        let base_z = -(coord.tile_z as i64) * s;
        TileSamples::from_fn(self.scale, self.floor, self.sample_count, |x, z| {
            self.raw_at(base_x + x as i64, base_z + z as i64)
        })
    }
}

impl TileStore for NoiseTileStore {
    fn load(&self, coord: GridCoordinate) -> TileData {
        if self.missing.contains(&coord) {
            return TileData::Empty;
        }
        TileData::loaded(self.generate(coord))
    }
}

fn fbm_noise(noise: &Perlin, x: f64, z: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, z * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_value == 0.0 {
        0.0
    } else {
        total / max_value
    }
}
