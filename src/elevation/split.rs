//! Triangle split of a sample quad.
//!
//! The terrain mesh divides every 2×2 block of samples into two triangles,
//! alternating the diagonal in a checkerboard. Height queries must use the
//! same triangles or they disagree with the drawn surface along the
//! diagonals. Both sides take the rule from here.
//!
//! Corners are named on a grid where x runs west to east and z runs north to
//! south, so the quad at `(ux, uz)` has `nw = (ux, uz)`, `ne = (ux + 1, uz)`,
//! `sw = (ux, uz + 1)` and `se = (ux + 1, uz + 1)`.

/// Corner of a sample quad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    /// Offset from the quad's north-west sample, as (dx, dz)
    pub fn offset(self) -> (usize, usize) {
        match self {
            Corner::NorthWest => (0, 0),
            Corner::NorthEast => (1, 0),
            Corner::SouthWest => (0, 1),
            Corner::SouthEast => (1, 1),
        }
    }
}

/// Which diagonal divides a quad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuadSplit {
    /// Diagonal from the north-west to the south-east corner
    NorthWestSouthEast,
    /// Diagonal from the north-east to the south-west corner
    NorthEastSouthWest,
}

/// One of the two triangles of a split quad, named by the corner it owns
/// that is not on the diagonal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuadTriangle {
    NorthEast,
    SouthWest,
    NorthWest,
    SouthEast,
}

/// Heights at the four corners of a quad
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QuadCorners {
    pub nw: f32,
    pub ne: f32,
    pub sw: f32,
    pub se: f32,
}

impl QuadSplit {
    /// Split used for the quad whose north-west sample is `(ux, uz)`.
    ///
    /// Quads with equal x and z parity split NW–SE, the others NE–SW.
    #[inline]
    pub fn for_quad(ux: i32, uz: i32) -> Self {
        if (ux & 1) == (uz & 1) {
            QuadSplit::NorthWestSouthEast
        } else {
            QuadSplit::NorthEastSouthWest
        }
    }

    /// The two triangles in the order and winding the mesh emits them.
    pub fn triangles(self) -> [[Corner; 3]; 2] {
        use Corner::*;
        match self {
            QuadSplit::NorthWestSouthEast => [[NorthWest, SouthEast, SouthWest], [NorthWest, NorthEast, SouthEast]],
            QuadSplit::NorthEastSouthWest => [[NorthEast, SouthEast, SouthWest], [NorthWest, NorthEast, SouthWest]],
        }
    }

    /// Triangle containing the fractional position `(fx, fz)` in `[0, 1]²`.
    ///
    /// Points on the diagonal belong to either triangle; both planes agree
    /// there, so the tie goes to the south-west / north-west side.
    #[inline]
    pub fn triangle_at(self, fx: f32, fz: f32) -> QuadTriangle {
        match self {
            QuadSplit::NorthWestSouthEast => {
                if fx > fz {
                    QuadTriangle::NorthEast
                } else {
                    QuadTriangle::SouthWest
                }
            }
            QuadSplit::NorthEastSouthWest => {
                if fx + fz < 1.0 {
                    QuadTriangle::NorthWest
                } else {
                    QuadTriangle::SouthEast
                }
            }
        }
    }

    /// Height at `(fx, fz)` on the plane of the triangle that contains it.
    #[inline]
    pub fn interpolate(self, c: &QuadCorners, fx: f32, fz: f32) -> f32 {
        match self.triangle_at(fx, fz) {
            QuadTriangle::NorthEast => c.nw + (c.ne - c.nw) * fx + (c.se - c.ne) * fz,
            QuadTriangle::SouthWest => c.nw + (c.se - c.sw) * fx + (c.sw - c.nw) * fz,
            QuadTriangle::NorthWest => c.nw + (c.ne - c.nw) * fx + (c.sw - c.nw) * fz,
            QuadTriangle::SouthEast => c.se + (c.sw - c.se) * (1.0 - fx) + (c.ne - c.se) * (1.0 - fz),
        }
    }
}

/// Triangle-list indices for a square patch of `quads_per_side`² quads.
///
/// Vertices are numbered row-major, `quads_per_side + 1` per row, starting at
/// the north-west corner. Each quad contributes the two triangles of
/// [`QuadSplit::triangles`] for its local position.
pub fn patch_triangle_indices(quads_per_side: usize) -> Vec<u32> {
    let stride = quads_per_side as u32 + 1;
    let mut indices = Vec::with_capacity(quads_per_side * quads_per_side * 6);

    for z in 0..quads_per_side {
        for x in 0..quads_per_side {
            let nw = z as u32 * stride + x as u32;
            let vertex = |corner: Corner| match corner {
                Corner::NorthWest => nw,
                Corner::NorthEast => nw + 1,
                Corner::SouthWest => nw + stride,
                Corner::SouthEast => nw + stride + 1,
            };

            for triangle in QuadSplit::for_quad(x as i32, z as i32).triangles() {
                indices.extend(triangle.iter().map(|&corner| vertex(corner)));
            }
        }
    }

    indices
}
