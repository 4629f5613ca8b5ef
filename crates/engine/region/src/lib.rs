//! Region geometry for conceptual-space visualization
//!
//! A region is a closed triangle mesh marking out a named area of a
//! conceptual space, such as the set of colors called "red" inside the RGB
//! cube. This crate answers one question about such meshes: is a point
//! inside?
//!
//! # Example
//!
//! ```
//! use region::{compute_bounding_box, is_inside, MeshData};
//! use region::glam::DVec3;
//!
//! // Tetrahedron in the corner of the unit cube
//! let positions = [
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//! ];
//! let indices = [0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3];
//! let mesh = MeshData::from_indexed(&positions, &indices).unwrap();
//! let bbox = compute_bounding_box(&mesh).unwrap();
//!
//! assert!(is_inside(DVec3::splat(0.1), &mesh, &bbox));
//! assert!(!is_inside(DVec3::splat(0.9), &mesh, &bbox));
//! ```

pub mod aggregate;
pub mod bounds;
pub mod classify;
pub mod error;
pub mod mesh;
pub mod set;

pub use aggregate::{is_inside_any, Region};
pub use bounds::{compute_bounding_box, BoundingBox};
pub use classify::{classify, is_inside, Classification, DegenerateRayHit, MAX_RAY_ATTEMPTS};
pub use error::{RegionError, Result};
pub use mesh::{MeshData, Point3, Triangle};
pub use set::{LoadedRegion, RegionId, RegionSet, RegionSetKey};

pub use glam;
