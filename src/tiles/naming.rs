//! Tile file names.
//!
//! Route tiles are named by their position in a quadtree over the grid
//! range `[-16384, 16384)` on both axes. Each level picks one of four
//! quadrants; pairs of levels are packed into one hex digit, eight digits in
//! all, behind a `-` prefix. Tile (0, 0) is `-7ffffffc`.

use crate::coords::GridCoordinate;

/// Half extent of the named grid on each axis
pub const NAMED_GRID_EXTENT: i32 = 16384;

const HEX: &[u8; 16] = b"0123456789abcdef";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Quadrant {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Quadrant {
    /// High half of a digit (first level of the pair)
    fn high(self) -> u8 {
        match self {
            Quadrant::NorthWest => 0,
            Quadrant::NorthEast => 4,
            Quadrant::SouthEast => 8,
            Quadrant::SouthWest => 12,
        }
    }

    /// Low half of a digit (second level of the pair)
    fn low(self) -> u8 {
        match self {
            Quadrant::NorthWest => 0,
            Quadrant::NorthEast => 1,
            Quadrant::SouthEast => 2,
            Quadrant::SouthWest => 3,
        }
    }
}

/// Bisecting walk down the quadtree towards one target coordinate.
struct QuadWalk {
    target: GridCoordinate,
    min_x: i32,
    max_x: i32,
    min_z: i32,
    max_z: i32,
}

impl QuadWalk {
    fn new(target: GridCoordinate) -> Self {
        Self {
            target,
            min_x: -NAMED_GRID_EXTENT,
            max_x: NAMED_GRID_EXTENT,
            min_z: -NAMED_GRID_EXTENT,
            max_z: NAMED_GRID_EXTENT,
        }
    }

    fn step(&mut self) -> Quadrant {
        let mid_x = (self.min_x + self.max_x) / 2;
        let east = self.target.tile_x >= mid_x;
        if east {
            self.min_x = mid_x;
        } else {
            self.max_x = mid_x;
        }

        let mid_z = (self.min_z + self.max_z) / 2;
        let north = self.target.tile_z >= mid_z;
        if north {
            self.min_z = mid_z;
        } else {
            self.max_z = mid_z;
        }

        match (east, north) {
            (false, false) => Quadrant::SouthWest,
            (false, true) => Quadrant::NorthWest,
            (true, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthEast,
        }
    }
}

/// File stem of the tile at `coord`.
///
/// Coordinates outside the named range still produce a name (the walk simply
/// saturates at the edge), but neighbouring out-of-range tiles share it.
pub fn tile_name(coord: GridCoordinate) -> String {
    let mut walk = QuadWalk::new(coord);
    let mut name = String::with_capacity(9);
    name.push('-');

    for digit in 0..8 {
        let high = walk.step().high();
        let quad = walk.step();
        // The last digit carries a single level
        let low = if digit == 7 { 0 } else { quad.low() };
        name.push(HEX[(high + low) as usize] as char);
    }

    name
}
