//! Multi-region containment
//!
//! A [`Region`] pairs a mesh with its bounding box, computed once up front so
//! every query reuses it. [`is_inside_any`] ORs containment over a list of
//! regions.

use crate::bounds::BoundingBox;
use crate::classify::{classify, is_inside, Classification};
use crate::error::Result;
use crate::mesh::{MeshData, Point3};

/// A closed mesh together with its precomputed bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    mesh: MeshData,
    bbox: BoundingBox,
}

impl Region {
    /// Build a region, computing its bounding box
    ///
    /// # Errors
    /// [`RegionError::EmptyMesh`](crate::RegionError::EmptyMesh) if the mesh
    /// has no triangles.
    pub fn new(mesh: MeshData) -> Result<Self> {
        let bbox = BoundingBox::from_mesh(&mesh)?;
        Ok(Self { mesh, bbox })
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Test whether the point is enclosed by this region
    #[inline]
    pub fn contains(&self, point: Point3) -> bool {
        is_inside(point, &self.mesh, &self.bbox)
    }

    /// Like [`Region::contains`], with ray diagnostics
    pub fn classify(&self, point: Point3) -> Classification {
        classify(point, &self.mesh, &self.bbox)
    }
}

impl AsRef<Region> for Region {
    fn as_ref(&self) -> &Region {
        self
    }
}

/// Test whether a point is enclosed by at least one region
///
/// Stops at the first region that contains the point. An empty list encloses
/// nothing.
pub fn is_inside_any<R: AsRef<Region>>(point: Point3, regions: &[R]) -> bool {
    regions.iter().any(|region| region.as_ref().contains(point))
}
