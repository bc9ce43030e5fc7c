//! Coordinate system for the tile grid.
//!
//! Three levels: grid coordinates naming a tile, sample-space points inside a
//! tile (S×S samples, x from west to east, z from north to south) and world
//! locations in meters relative to a tile centre (x east, z north).
//!
//! Tile indices grow east (`tile_x`) and north (`tile_z`). Because sample z
//! runs north to south, overflowing a tile at z >= S moves to the tile *south*
//! (`tile_z - 1`) and underflowing below 0 moves north (`tile_z + 1`).

use crate::config::TerrainConfig;

/// Integer coordinate of a tile in the unbounded world grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoordinate {
    /// Tile column, increasing eastwards
    pub tile_x: i32,
    /// Tile row, increasing northwards
    pub tile_z: i32,
}

impl GridCoordinate {
    pub const fn new(tile_x: i32, tile_z: i32) -> Self {
        Self { tile_x, tile_z }
    }

    /// Coordinate shifted by whole tiles, saturating at the grid edge
    pub const fn offset(&self, dx: i32, dz: i32) -> Self {
        Self {
            tile_x: self.tile_x.saturating_add(dx),
            tile_z: self.tile_z.saturating_add(dz),
        }
    }
}

impl From<(i32, i32)> for GridCoordinate {
    fn from((tile_x, tile_z): (i32, i32)) -> Self {
        Self::new(tile_x, tile_z)
    }
}

impl std::fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.tile_x, self.tile_z)
    }
}

/// Roll an integer sample index into `[0, S)`, returning (tile shift, local).
fn roll_index(value: i32, sample_count: usize) -> (i32, usize) {
    let s = sample_count as i32;
    (value.div_euclid(s), value.rem_euclid(s) as usize)
}

/// Roll a continuous sample position into `[0, S)`, returning (tile shift, local).
fn roll_position(value: f32, sample_count: usize) -> (f64, f32) {
    // Non-finite input has no meaningful tile; pin it to the origin sample.
    if !value.is_finite() {
        return (0.0, 0.0);
    }

    let mut shift = (value as f64 / sample_count as f64).floor();
    let mut local = (value as f64 - shift * sample_count as f64) as f32;

    // A tiny negative value can round up to exactly S.
    let size = sample_count as f32;
    if local >= size {
        local -= size;
        shift += 1.0;
    }
    // Far out the remainder has no precision left
    if !(0.0..size).contains(&local) {
        local = 0.0;
    }

    (shift, local)
}

/// Apply a whole-tile shift, saturating at the edge of the i32 grid.
fn shift_tile(tile: i32, shift: f64) -> i32 {
    // f64 holds every i32 exactly and `as` saturates.
    (tile as f64 + shift) as i32
}

/// Normalize an integer sample index against tile `coord`.
///
/// Returns the tile that actually holds the sample and the local indices,
/// both in `[0, S)`.
pub fn normalize_sample(
    coord: GridCoordinate,
    x: i32,
    z: i32,
    sample_count: usize,
) -> (GridCoordinate, usize, usize) {
    let (shift_x, local_x) = roll_index(x, sample_count);
    let (shift_z, local_z) = roll_index(z, sample_count);
    let tile = GridCoordinate::new(coord.tile_x.saturating_add(shift_x), coord.tile_z.saturating_sub(shift_z));
    (tile, local_x, local_z)
}

/// A query position in sample space: a tile plus a (possibly out-of-range)
/// sample offset inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub coord: GridCoordinate,
    /// Samples east of the tile's west edge
    pub x: f32,
    /// Samples south of the tile's north edge
    pub z: f32,
}

impl SamplePoint {
    pub fn new(tile_x: i32, tile_z: i32, x: f32, z: f32) -> Self {
        Self {
            coord: GridCoordinate::new(tile_x, tile_z),
            x,
            z,
        }
    }

    /// Move any overflow into neighbouring tiles so that `x` and `z` lie in
    /// `[0, S)`.
    pub fn normalized(&self, sample_count: usize) -> Self {
        let (shift_x, x) = roll_position(self.x, sample_count);
        let (shift_z, z) = roll_position(self.z, sample_count);
        Self {
            coord: GridCoordinate::new(
                shift_tile(self.coord.tile_x, shift_x),
                shift_tile(self.coord.tile_z, -shift_z),
            ),
            x,
            z,
        }
    }

    /// True if both offsets already lie inside the tile
    pub fn is_normalized(&self, sample_count: usize) -> bool {
        let size = sample_count as f32;
        (0.0..size).contains(&self.x) && (0.0..size).contains(&self.z)
    }
}

/// A position in the world: a tile plus an offset in meters from its centre.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldLocation {
    pub tile_x: i32,
    pub tile_z: i32,
    /// Meters east of the tile centre
    pub x: f32,
    /// Meters above the datum
    pub y: f32,
    /// Meters north of the tile centre
    pub z: f32,
}

impl WorldLocation {
    pub fn new(tile_x: i32, tile_z: i32, x: f32, y: f32, z: f32) -> Self {
        Self {
            tile_x,
            tile_z,
            x,
            y,
            z,
        }
    }

    /// Grid coordinate of the tile this location is expressed against
    pub fn coord(&self) -> GridCoordinate {
        GridCoordinate::new(self.tile_x, self.tile_z)
    }

    /// Build a location from absolute meters measured from the centre of tile (0, 0).
    pub fn from_absolute(x: f64, y: f32, z: f64, tile_size: f32) -> Self {
        let size = tile_size as f64;
        let half = size / 2.0;
        let tile_x = ((x + half) / size).floor();
        let tile_z = ((z + half) / size).floor();
        Self {
            tile_x: shift_tile(0, tile_x),
            tile_z: shift_tile(0, tile_z),
            x: (x - tile_x * size) as f32,
            y,
            z: (z - tile_z * size) as f32,
        }
    }

    /// Absolute meters from the centre of tile (0, 0), as (x, y, z)
    pub fn to_absolute(&self, tile_size: f32) -> (f64, f64, f64) {
        let size = tile_size as f64;
        (
            self.tile_x as f64 * size + self.x as f64,
            self.y as f64,
            self.tile_z as f64 * size + self.z as f64,
        )
    }

    /// Re-express the location against the tile that contains it, so that
    /// `x` and `z` lie within half a tile of the centre.
    pub fn normalized(&self, tile_size: f32) -> Self {
        let half = tile_size / 2.0;
        let shift_x = ((self.x + half) / tile_size).floor();
        let shift_z = ((self.z + half) / tile_size).floor();
        Self {
            tile_x: shift_tile(self.tile_x, shift_x as f64),
            tile_z: shift_tile(self.tile_z, shift_z as f64),
            x: self.x - shift_x * tile_size,
            y: self.y,
            z: self.z - shift_z * tile_size,
        }
    }

    /// Convert to a sample-space point on the same tile (not normalized).
    pub fn to_sample_point(&self, config: &TerrainConfig) -> SamplePoint {
        let half = config.tile_size() / 2.0;
        SamplePoint::new(
            self.tile_x,
            self.tile_z,
            (self.x + half) / config.sample_size,
            (half - self.z) / config.sample_size,
        )
    }
}

impl std::fmt::Display for WorldLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{}):({:.2},{:.2},{:.2})",
            self.tile_x, self.tile_z, self.x, self.y, self.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: usize = 256;

    #[test]
    fn test_normalize_sample_in_range() {
        let (tile, x, z) = normalize_sample(GridCoordinate::new(3, -2), 10, 255, S);
        assert_eq!(tile, GridCoordinate::new(3, -2));
        assert_eq!((x, z), (10, 255));
    }

    #[test]
    fn test_normalize_sample_overflow_directions() {
        let origin = GridCoordinate::new(0, 0);

        // East overflow moves east, west underflow moves west
        assert_eq!(normalize_sample(origin, 256, 0, S), (GridCoordinate::new(1, 0), 0, 0));
        assert_eq!(normalize_sample(origin, -1, 0, S), (GridCoordinate::new(-1, 0), 255, 0));

        // Positive z overflow goes south (tile_z - 1), negative goes north
        assert_eq!(normalize_sample(origin, 0, 256, S), (GridCoordinate::new(0, -1), 0, 0));
        assert_eq!(normalize_sample(origin, 0, -1, S), (GridCoordinate::new(0, 1), 0, 255));

        // Several tiles at once
        assert_eq!(normalize_sample(origin, 3 * 256 + 5, -2 * 256 - 7, S), (GridCoordinate::new(3, 3), 5, 249));
    }

    #[test]
    fn test_sample_point_normalization_scenario() {
        let point = SamplePoint::new(5, 5, 260.0, -3.0).normalized(S);
        assert_eq!(point.coord, GridCoordinate::new(6, 6));
        assert_eq!(point.x, 4.0);
        assert_eq!(point.z, 253.0);
        assert!(point.is_normalized(S));
    }

    #[test]
    fn test_sample_point_tiny_negative_stays_in_range() {
        let point = SamplePoint::new(0, 0, -1.0e-9, 0.5).normalized(S);
        assert!(point.is_normalized(S));
        assert!(point.x < S as f32);
    }

    #[test]
    fn test_sample_point_huge_offsets_saturate() {
        let point = SamplePoint::new(5, 5, 1.0e12, 0.5).normalized(S);
        assert_eq!(point.coord, GridCoordinate::new(i32::MAX, 5));
        assert!(point.is_normalized(S));

        let point = SamplePoint::new(-5, 5, -f32::MAX, f32::MAX).normalized(S);
        assert_eq!(point.coord, GridCoordinate::new(i32::MIN, i32::MIN));
        assert!(point.is_normalized(S));
    }

    #[test]
    fn test_normalize_sample_at_grid_edge() {
        let edge = GridCoordinate::new(i32::MAX, i32::MIN);
        let (tile, x, z) = normalize_sample(edge, i32::MAX, i32::MAX, S);
        assert_eq!(tile, GridCoordinate::new(i32::MAX, i32::MIN));
        assert_eq!((x, z), (255, 255));
        assert_eq!(edge.offset(1, -1), edge);
    }

    #[test]
    fn test_sample_point_non_finite() {
        let point = SamplePoint::new(2, 2, f32::NAN, f32::INFINITY).normalized(S);
        assert_eq!(point.coord, GridCoordinate::new(2, 2));
        assert_eq!((point.x, point.z), (0.0, 0.0));
    }

    #[test]
    fn test_world_location_to_sample_point() {
        let config = TerrainConfig::default();

        let centre = WorldLocation::new(4, 7, 0.0, 0.0, 0.0).to_sample_point(&config);
        assert_eq!(centre, SamplePoint::new(4, 7, 128.0, 128.0));

        // North-west corner of the tile is sample (0, 0)
        let nw = WorldLocation::new(4, 7, -1024.0, 0.0, 1024.0).to_sample_point(&config);
        assert_eq!((nw.x, nw.z), (0.0, 0.0));

        // South-east corner is sample (S, S), which belongs to the next tiles
        let se = WorldLocation::new(4, 7, 1024.0, 0.0, -1024.0)
            .to_sample_point(&config)
            .normalized(config.sample_count);
        assert_eq!(se, SamplePoint::new(5, 6, 0.0, 0.0));
    }

    #[test]
    fn test_world_location_normalized() {
        let loc = WorldLocation::new(0, 0, 1500.0, 12.0, -3000.0).normalized(2048.0);
        assert_eq!((loc.tile_x, loc.tile_z), (1, -1));
        assert_eq!(loc.x, 1500.0 - 2048.0);
        assert_eq!(loc.z, -3000.0 + 2048.0);
        assert_eq!(loc.y, 12.0);
    }

    #[test]
    fn test_world_location_absolute_round_trip() {
        let loc = WorldLocation::from_absolute(-5000.0, 3.0, 9000.0, 2048.0);
        assert_eq!((loc.tile_x, loc.tile_z), (-2, 4));
        assert!(loc.x.abs() <= 1024.0 && loc.z.abs() <= 1024.0);

        let (x, y, z) = loc.to_absolute(2048.0);
        assert!((x + 5000.0).abs() < 1e-3);
        assert!((y - 3.0).abs() < 1e-6);
        assert!((z - 9000.0).abs() < 1e-3);
    }
}
