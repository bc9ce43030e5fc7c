//! Height queries over a tile window.

use super::split::{QuadCorners, QuadSplit};
use crate::config::TerrainConfig;
use crate::coords::{normalize_sample, GridCoordinate, SamplePoint, WorldLocation};
use crate::tiles::{TileData, TileStore, TileWindow};

/// Ground height lookup on top of a [`TileWindow`].
///
/// Holds no state of its own beyond the installation constants; every query
/// goes through the borrowed window, which loads and moves as needed.
pub struct ElevationField<'w, S> {
    window: &'w mut TileWindow<S>,
    config: TerrainConfig,
}

impl<'w, S: TileStore> ElevationField<'w, S> {
    /// Query through `window`, which from now on only accepts tiles of the
    /// configured resolution.
    pub fn new(window: &'w mut TileWindow<S>, config: TerrainConfig) -> Self {
        window.set_sample_count(config.sample_count);
        Self { window, config }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn window(&self) -> &TileWindow<S> {
        &*self.window
    }

    /// Exact height at an integer sample.
    ///
    /// Sample indices outside `[0, S)` refer to neighbouring tiles. An absent
    /// tile has height 0.
    pub fn height_at_sample(&mut self, tile_x: i32, tile_z: i32, x: i32, z: i32) -> f32 {
        let (coord, x, z) = normalize_sample(GridCoordinate::new(tile_x, tile_z), x, z, self.config.sample_count);
        self.window.get(coord).height(x, z)
    }

    /// Height at a continuous sample position, on the same triangles the
    /// terrain mesh draws.
    pub fn height_at(&mut self, tile_x: i32, tile_z: i32, x: f32, z: f32) -> f32 {
        self.height_at_point(SamplePoint::new(tile_x, tile_z, x, z))
    }

    /// Height at a sample-space point.
    pub fn height_at_point(&mut self, point: SamplePoint) -> f32 {
        let sample_count = self.config.sample_count;
        let height = interpolate_point(point, sample_count, |coord, x, z| {
            Some(self.window.get(coord).height(x, z))
        });
        height.unwrap_or_default()
    }

    /// Height under a world location (its own `y` is ignored).
    pub fn height_at_location(&mut self, location: &WorldLocation) -> f32 {
        let point = location.to_sample_point(&self.config);
        self.height_at_point(point)
    }

    /// Read-only view of the tiles loaded so far.
    pub fn resident(&self) -> ResidentElevation<'_, S> {
        ResidentElevation::new(&*self.window, self.config)
    }
}

/// Height lookup over the tiles a window already holds.
///
/// Never loads or moves anything, so it only needs `&TileWindow` and any
/// number of views can read at once. Queries touching a tile that is not
/// resident return `None`.
pub struct ResidentElevation<'w, S> {
    window: &'w TileWindow<S>,
    config: TerrainConfig,
}

impl<'w, S> Clone for ResidentElevation<'w, S> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            config: self.config,
        }
    }
}

impl<'w, S: TileStore> ResidentElevation<'w, S> {
    pub fn new(window: &'w TileWindow<S>, config: TerrainConfig) -> Self {
        Self { window, config }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Exact height at an integer sample, if its tile is resident.
    pub fn height_at_sample(&self, tile_x: i32, tile_z: i32, x: i32, z: i32) -> Option<f32> {
        let (coord, x, z) = normalize_sample(GridCoordinate::new(tile_x, tile_z), x, z, self.config.sample_count);
        self.resident_height(coord, x, z)
    }

    /// Height at a continuous sample position, if all four quad corners are
    /// resident.
    pub fn height_at(&self, tile_x: i32, tile_z: i32, x: f32, z: f32) -> Option<f32> {
        self.height_at_point(SamplePoint::new(tile_x, tile_z, x, z))
    }

    pub fn height_at_point(&self, point: SamplePoint) -> Option<f32> {
        interpolate_point(point, self.config.sample_count, |coord, x, z| self.resident_height(coord, x, z))
    }

    pub fn height_at_location(&self, location: &WorldLocation) -> Option<f32> {
        self.height_at_point(location.to_sample_point(&self.config))
    }

    fn resident_height(&self, coord: GridCoordinate, x: usize, z: usize) -> Option<f32> {
        let data = self.window.peek(coord)?;
        match data {
            // A window that was never pinned may hold tiles of another resolution
            TileData::Loaded(samples) if samples.sample_count() != self.config.sample_count => None,
            _ => Some(data.height(x, z)),
        }
    }
}

/// Interpolate on the mesh triangle holding `point`, reading corner heights
/// through `sample` with normalized tile-local indices.
fn interpolate_point(
    point: SamplePoint,
    sample_count: usize,
    mut sample: impl FnMut(GridCoordinate, usize, usize) -> Option<f32>,
) -> Option<f32> {
    let point = point.normalized(sample_count);

    let ux = point.x.floor() as i32;
    let uz = point.z.floor() as i32;
    let fx = point.x - ux as f32;
    let fz = point.z - uz as f32;

    let mut corner = |dx: i32, dz: i32| {
        let (coord, x, z) = normalize_sample(point.coord, ux + dx, uz + dz, sample_count);
        sample(coord, x, z)
    };

    let corners = QuadCorners {
        nw: corner(0, 0)?,
        ne: corner(1, 0)?,
        sw: corner(0, 1)?,
        se: corner(1, 1)?,
    };

    Some(QuadSplit::for_quad(ux, uz).interpolate(&corners, fx, fz))
}

impl<S: TileStore> TileWindow<S> {
    /// Query heights through this window.
    pub fn elevation(&mut self, config: TerrainConfig) -> ElevationField<'_, S> {
        ElevationField::new(self, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{MemoryTileStore, NoiseTileStore, TileSamples};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const S: usize = 256;
    const EPS: f32 = 1e-3;

    fn config() -> TerrainConfig {
        TerrainConfig::new(S, 8.0, 8)
    }

    /// Tile whose raw sample is a simple function of position and tile id
    fn ramp_tile(coord: GridCoordinate) -> TileSamples {
        let base = ((coord.tile_x * 7 + coord.tile_z * 3).rem_euclid(50)) as usize;
        TileSamples::from_fn(0.5, -20.0, S, move |x, z| ((x + 2 * z + base * 100) % 60000) as u16)
    }

    fn ramp_store(tiles: &[(i32, i32)]) -> MemoryTileStore {
        let mut store = MemoryTileStore::new();
        for &(x, z) in tiles {
            let coord = GridCoordinate::new(x, z);
            store.insert(coord, ramp_tile(coord));
        }
        store
    }

    #[test]
    fn test_exact_sample_uses_scale_and_offset() {
        let mut window = TileWindow::new(ramp_store(&[(0, 0)]), 8);
        let mut field = window.elevation(config());

        let expected = ramp_tile(GridCoordinate::new(0, 0)).height(10, 20);
        assert_eq!(field.height_at_sample(0, 0, 10, 20), expected);
    }

    #[test]
    fn test_grid_points_are_exact() {
        let mut window = TileWindow::new(NoiseTileStore::new(5, S), 8);
        let mut field = window.elevation(config());

        for z in (0..S as i32).step_by(17) {
            for x in (0..S as i32).step_by(13) {
                let exact = field.height_at_sample(2, -1, x, z);
                let interpolated = field.height_at(2, -1, x as f32, z as f32);
                assert!((exact - interpolated).abs() < EPS, "({}, {}): {} vs {}", x, z, exact, interpolated);
            }
        }
    }

    #[test]
    fn test_normalization_matches_neighbour_tiles() {
        let store = ramp_store(&[(4, 4), (5, 4), (3, 4), (4, 3), (4, 5), (5, 3), (3, 5)]);
        let mut window = TileWindow::new(store, 8);
        let mut field = window.elevation(config());

        let s = S as i32;
        let cases = [
            // (x, z) relative to tile (4, 4) and the same sample addressed directly
            ((s + 3, 10), (5, 4, 3, 10)),
            ((-1, 10), (3, 4, s - 1, 10)),
            ((10, s + 2), (4, 3, 10, 2)),
            ((10, -5), (4, 5, 10, s - 5)),
            ((s + 1, s + 1), (5, 3, 1, 1)),
            ((-2, -2), (3, 5, s - 2, s - 2)),
        ];

        for ((x, z), (tx, tz, lx, lz)) in cases {
            let rolled = field.height_at_sample(4, 4, x, z);
            let direct = field.height_at_sample(tx, tz, lx, lz);
            assert_eq!(rolled, direct, "({}, {}) vs tile ({}, {}) at ({}, {})", x, z, tx, tz, lx, lz);
        }
    }

    #[test]
    fn test_continuous_normalization_scenario() {
        let store = ramp_store(&[(6, 6)]);
        let mut window = TileWindow::new(store, 8);
        let mut field = window.elevation(config());

        let rolled = field.height_at(5, 5, 260.0, -3.0);
        let direct = field.height_at(6, 6, 4.0, 253.0);
        assert_eq!(rolled, direct);
        assert_eq!(direct, ramp_tile(GridCoordinate::new(6, 6)).height(4, 253));
    }

    #[test]
    fn test_random_out_of_range_points_match_shifted_tile() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut window = TileWindow::new(NoiseTileStore::new(9, S), 8);
        let mut field = window.elevation(config());
        let size = S as f32;

        for _ in 0..200 {
            let x: f32 = rng.gen_range(-600.0..600.0);
            let z: f32 = rng.gen_range(-600.0..600.0);

            let shift_x = (x / size).floor();
            let shift_z = (z / size).floor();
            let local_x = x - shift_x * size;
            let local_z = z - shift_z * size;

            let rolled = field.height_at(0, 0, x, z);
            let direct = field.height_at(shift_x as i32, -(shift_z as i32), local_x, local_z);
            assert!((rolled - direct).abs() < EPS, "({}, {}): {} vs {}", x, z, rolled, direct);
        }
    }

    #[test]
    fn test_empty_tile_is_flat_zero() {
        let mut window = TileWindow::new(MemoryTileStore::new(), 8);
        let mut field = window.elevation(config());

        assert_eq!(field.height_at_sample(7, -3, 0, 0), 0.0);
        assert_eq!(field.height_at_sample(7, -3, 255, 128), 0.0);
        for (x, z) in [(0.0, 0.0), (0.3, 0.9), (127.5, 33.25), (255.99, 255.99)] {
            assert_eq!(field.height_at(7, -3, x, z), 0.0);
        }
    }

    #[test]
    fn test_sw_triangle_scenario() {
        // Corners nw=10, ne=12, sw=8, se=9 at quad (0, 0) of tile (5, 5)
        let raw = |x: usize, z: usize| match (x, z) {
            (0, 0) => 10,
            (1, 0) => 12,
            (0, 1) => 8,
            (1, 1) => 9,
            _ => 0,
        };
        let mut store = MemoryTileStore::new();
        store.insert(GridCoordinate::new(5, 5), TileSamples::from_fn(1.0, 0.0, S, raw));

        let mut window = TileWindow::new(store, 8);
        let mut field = window.elevation(config());

        let h = field.height_at(5, 5, 0.25, 0.75);
        assert!((h - 8.75).abs() < 1e-5, "got {}", h);

        // Same point on the NE side of the diagonal uses the other triangle
        let h = field.height_at(5, 5, 0.75, 0.25);
        assert!((h - (10.0 + 2.0 * 0.75 + (9.0 - 12.0) * 0.25)).abs() < 1e-5, "got {}", h);
    }

    #[test]
    fn test_split_follows_quad_parity() {
        // A single raised sample at (11, 11) separates the two diagonals:
        // in quad (10, 10) it is the SE corner, in quad (11, 10) the SW corner.
        let raw = |x: usize, z: usize| if (x, z) == (11, 11) { 100 } else { 0 };
        let mut store = MemoryTileStore::new();
        store.insert(GridCoordinate::new(0, 0), TileSamples::from_fn(1.0, 0.0, S, raw));
        let mut window = TileWindow::new(store, 8);
        let mut field = window.elevation(config());

        // Quad (10, 10) is even/even: NW-SE diagonal touches the raised SE corner,
        // so its midpoint is raised
        assert!((field.height_at(0, 0, 10.5, 10.5) - 50.0).abs() < EPS);

        // Quad (11, 10) is odd/even: NE-SW diagonal runs from (12, 10) to (11, 11)
        assert!((field.height_at(0, 0, 11.5, 10.5) - 50.0).abs() < EPS);
        // and the NW triangle near (11, 10) sees the raised SW corner linearly
        assert!((field.height_at(0, 0, 11.25, 10.5) - 50.0).abs() < EPS);

        // Quad (11, 11) is odd/odd: NW-SE diagonal starts at the raised corner
        assert!((field.height_at(0, 0, 11.5, 11.5) - 50.0).abs() < EPS);
        // while the NE triangle of that quad falls off along x
        assert!((field.height_at(0, 0, 11.75, 11.25) - 25.0).abs() < EPS);
    }

    #[test]
    fn test_query_across_tile_edge() {
        let mut window = TileWindow::new(NoiseTileStore::new(2, S), 8);
        let mut field = window.elevation(config());

        // Last quad of tile (0, 0) takes its east corners from tile (1, 0)
        let h = field.height_at(0, 0, 255.0, 100.0);
        assert_eq!(h, field.height_at_sample(0, 0, 255, 100));
        let edge = field.height_at(0, 0, 256.0, 100.0);
        assert_eq!(edge, field.height_at_sample(1, 0, 0, 100));

        let mid = field.height_at(0, 0, 255.5, 100.0);
        let (lo, hi) = if h < edge { (h, edge) } else { (edge, h) };
        assert!(mid >= lo - EPS && mid <= hi + EPS);
    }

    #[test]
    fn test_huge_offsets_are_normalized() {
        let mut window = TileWindow::new(MemoryTileStore::new(), 8);
        let mut field = window.elevation(config());

        assert_eq!(field.height_at(5, 5, 1.0e12, 0.5), 0.0);
        assert_eq!(field.height_at(5, 5, -1.0e30, 1.0e30), 0.0);
        assert_eq!(field.height_at_sample(i32::MAX, i32::MIN, i32::MAX, i32::MAX), 0.0);
        assert_eq!(window.origin().tile_z, i32::MIN);
    }

    #[test]
    fn test_tile_of_other_resolution_is_empty() {
        let mut store = MemoryTileStore::new();
        store.insert(GridCoordinate::new(0, 0), TileSamples::flat(1.0, 5.0, 16, 3));
        let mut window = TileWindow::new(store, 8);
        let mut field = window.elevation(config());

        assert_eq!(field.height_at(0, 0, 100.0, 100.0), 0.0);
        assert_eq!(field.height_at_sample(0, 0, 15, 15), 0.0);
        assert_eq!(window.sample_count(), Some(S));
    }

    #[test]
    fn test_resident_view_reads_without_loading() {
        let mut window = TileWindow::new(NoiseTileStore::new(4, S), 8);
        let mut field = window.elevation(config());
        let expected = field.height_at(0, 0, 10.25, 20.5);
        let exact = field.height_at_sample(0, 0, 10, 20);

        let view = field.resident();
        assert_eq!(view.height_at(0, 0, 10.25, 20.5), Some(expected));
        assert_eq!(view.height_at_sample(0, 0, 10, 20), Some(exact));
        // Tile (1, 0) was never requested
        assert_eq!(view.height_at_sample(1, 0, 0, 0), None);
        assert_eq!(view.height_at(0, 0, 255.5, 3.0), None);

        let loads = window.stats().loads;
        let view = ResidentElevation::new(&window, config());
        let heights: Vec<Option<f32>> = std::thread::scope(|scope| {
            let readers: Vec<_> = (0..4)
                .map(|i| {
                    let view = view.clone();
                    scope.spawn(move || view.height_at(0, 0, 10.25 + i as f32, 20.5))
                })
                .collect();
            readers.into_iter().map(|reader| reader.join().unwrap()).collect()
        });
        assert!(heights.iter().all(Option::is_some));
        assert_eq!(heights[0], Some(expected));
        assert_eq!(window.stats().loads, loads);
    }

    #[test]
    fn test_resident_view_treats_empty_tiles_as_zero() {
        let mut window = TileWindow::new(MemoryTileStore::new(), 8);
        window.get(GridCoordinate::new(3, 3));
        let view = ResidentElevation::new(&window, config());

        assert_eq!(view.height_at(3, 3, 7.5, 7.5), Some(0.0));
        assert_eq!(view.height_at(3, 3, 255.5, 7.5), None);
    }

    #[test]
    fn test_height_at_location() {
        let mut window = TileWindow::new(NoiseTileStore::new(3, S), 8);
        let cfg = config();
        let mut field = window.elevation(cfg);

        // Tile centre is sample (128, 128)
        let centre = WorldLocation::new(2, 3, 0.0, 999.0, 0.0);
        assert_eq!(field.height_at_location(&centre), field.height_at_sample(2, 3, 128, 128));

        // 8 m east and 16 m north of the centre
        let moved = WorldLocation::new(2, 3, 8.0, 0.0, 16.0);
        assert_eq!(field.height_at_location(&moved), field.height_at_sample(2, 3, 129, 126));

        // Same ground expressed against a neighbouring tile
        let here = WorldLocation::new(2, 3, 1000.0, 0.0, -700.0);
        let there = WorldLocation::new(3, 3, 1000.0 - cfg.tile_size(), 0.0, -700.0);
        let a = field.height_at_location(&here);
        let b = field.height_at_location(&there);
        assert!((a - b).abs() < EPS, "{} vs {}", a, b);
    }
}
