//! Error types for region construction

use thiserror::Error;

/// Result type for region operations
pub type Result<T> = std::result::Result<T, RegionError>;

/// Errors raised while building meshes, bounding boxes and region sets
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    /// Mesh has no triangles, so no bounding box exists
    #[error("Mesh has no triangles")]
    EmptyMesh,

    /// A vertex coordinate is NaN or infinite
    #[error("Non-finite coordinate in triangle {triangle}, vertex {vertex}")]
    NonFiniteVertex { triangle: usize, vertex: usize },

    /// Vertex or index buffer length is not a multiple of three
    #[error("Buffer of length {len} does not describe whole triangles")]
    IncompleteTriangle { len: usize },

    /// Index buffer refers past the end of the position buffer
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
