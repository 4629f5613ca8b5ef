//! Triangle soup representation
//!
//! A [`MeshData`] is an ordered list of triangles with no adjacency
//! information. Shared vertices are simply repeated in every triangle that
//! uses them, which is what the asset loader hands over after flattening an
//! indexed or non-indexed buffer geometry.
//!
//! Coordinates are validated on construction: a mesh never carries NaN or
//! infinite values into the classifier.

use crate::error::{RegionError, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A point in the conceptual space
pub type Point3 = DVec3;

/// A single facet defined by three vertices
///
/// No normal is stored. When orientation matters it is derived from the
/// vertex order with the right-hand rule, see [`Triangle::normal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
}

impl Triangle {
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Vertices in winding order
    #[inline]
    pub fn vertices(&self) -> [Point3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Unnormalized face normal following the winding order
    ///
    /// Its length is twice the triangle area; zero for degenerate triangles.
    pub fn normal(&self) -> Point3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0)
    }

    pub fn centroid(&self) -> Point3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    fn first_non_finite(&self) -> Option<usize> {
        self.vertices().iter().position(|v| !v.is_finite())
    }
}

/// An ordered triangle soup
///
/// Triangle order is irrelevant for containment but is preserved so that
/// iteration (and therefore every derived result) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshData {
    triangles: Vec<Triangle>,
}

impl MeshData {
    /// Create a mesh from triangles, rejecting non-finite coordinates
    pub fn new(triangles: Vec<Triangle>) -> Result<Self> {
        for (index, triangle) in triangles.iter().enumerate() {
            if let Some(vertex) = triangle.first_non_finite() {
                return Err(RegionError::NonFiniteVertex {
                    triangle: index,
                    vertex,
                });
            }
        }
        Ok(Self { triangles })
    }

    /// Create a mesh from a non-indexed position buffer
    ///
    /// Every three consecutive positions form one triangle.
    pub fn from_positions(positions: &[[f64; 3]]) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(RegionError::IncompleteTriangle {
                len: positions.len(),
            });
        }

        let triangles = positions
            .chunks_exact(3)
            .map(|tri| {
                Triangle::new(
                    DVec3::from_array(tri[0]),
                    DVec3::from_array(tri[1]),
                    DVec3::from_array(tri[2]),
                )
            })
            .collect();

        Self::new(triangles)
    }

    /// Create a mesh from an indexed position buffer
    ///
    /// # Arguments
    /// * `positions` - Vertex positions
    /// * `indices` - Triangle list, three indices per triangle
    pub fn from_indexed(positions: &[[f64; 3]], indices: &[u32]) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(RegionError::IncompleteTriangle { len: indices.len() });
        }

        let vertex = |index: u32| -> Result<DVec3> {
            positions
                .get(index as usize)
                .map(|p| DVec3::from_array(*p))
                .ok_or(RegionError::IndexOutOfRange {
                    index,
                    vertex_count: positions.len(),
                })
        };

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for face in indices.chunks_exact(3) {
            triangles.push(Triangle::new(
                vertex(face[0])?,
                vertex(face[1])?,
                vertex(face[2])?,
            ));
        }

        Self::new(triangles)
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Iterate over every vertex of every triangle, in order
    pub fn vertices(&self) -> impl Iterator<Item = Point3> + '_ {
        self.triangles.iter().flat_map(|t| t.vertices())
    }
}
