use glam::Vec3;

/// Provides simple axis-aligned bounding box functionality.
///
/// The corners are stored as six contiguous floats in `(min.x, min.y, min.z,
/// max.x, max.y, max.z)` order, so batch code can pull `(min.x, min.y,
/// min.z, max.x)` out of a box with a single 128-bit load.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Location with the lowest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub min: Vec3,
    /// Location with the highest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub max: Vec3,
}

impl BoundingBox {
    /// Constructs a bounding box from the specified minimum and maximum.
    #[inline(always)]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Determines if a bounding box intersects another bounding box. Boxes
    /// that touch at a face, edge, or corner count as intersecting.
    #[inline(always)]
    pub fn intersects(&self, other: &Self) -> bool {
        self.max.x >= other.min.x
            && self.max.y >= other.min.y
            && self.max.z >= other.min.z
            && other.max.x >= self.min.x
            && other.max.y >= self.min.y
            && other.max.z >= self.min.z
    }
}
