//! Ground height queries.
//!
//! Heights between samples are interpolated on the triangles of the terrain
//! mesh, not bilinearly, so that anything placed on the ground sits exactly
//! on the drawn surface.

pub mod field;
pub mod split;

pub use field::{ElevationField, ResidentElevation};
pub use split::{patch_triangle_indices, Corner, QuadCorners, QuadSplit, QuadTriangle};
