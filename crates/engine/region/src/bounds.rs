//! Axis-aligned bounding boxes for region meshes
//!
//! The box is the broad-phase filter in front of the ray test: a point
//! outside the box on any axis is rejected without touching a triangle.
//! It is also handed to the renderer so region geometry can be placed and
//! scaled inside the color cube.

use crate::error::{RegionError, Result};
use crate::mesh::{MeshData, Point3};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box
///
/// Invariant: `min.c <= max.c` on every axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Point3,
    /// Maximum corner of the bounding box
    pub max: Point3,
}

impl BoundingBox {
    /// Create a new bounding box from two corners
    ///
    /// The corners are reordered per axis, so the invariant holds for any input.
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Compute the tight box around every vertex of a mesh
    ///
    /// Starts from the first vertex and folds componentwise min/max over all
    /// the others. This is the vertex box, not a hull.
    ///
    /// # Errors
    /// [`RegionError::EmptyMesh`] if the mesh has no triangles.
    pub fn from_mesh(mesh: &MeshData) -> Result<Self> {
        let mut vertices = mesh.vertices();
        let first = vertices.next().ok_or(RegionError::EmptyMesh)?;

        let (min, max) = vertices.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));

        Ok(Self { min, max })
    }

    /// Test whether a point lies inside the box, boundary included
    #[inline]
    pub fn contains(&self, point: Point3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Center point of the box
    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the box along each axis
    pub fn size(&self) -> Point3 {
        self.max - self.min
    }

    /// Map a position in the unit box onto this box
    ///
    /// `(0,0,0)` maps to `min` and `(1,1,1)` to `max`. This is how region
    /// geometry modelled in a unit box samples the color field.
    pub fn to_region_coord(&self, unit: Point3) -> Point3 {
        self.min + unit * (self.max - self.min)
    }
}

/// Compute the bounding box of a mesh
///
/// Free-function form of [`BoundingBox::from_mesh`].
pub fn compute_bounding_box(mesh: &MeshData) -> Result<BoundingBox> {
    BoundingBox::from_mesh(mesh)
}
