//! Color-space voxel fields
//!
//! Turns a set of region meshes into a dense RGBA texture over the unit
//! cube. Each voxel's color is its own position read as RGB, and its alpha
//! marks whether the position lies inside any region, so a volume renderer
//! shows the regions solid against a faint view of the whole space.
//!
//! # Example
//!
//! ```
//! use field::{generate_field, DIM_ALPHA, OPAQUE_ALPHA};
//! use region::{MeshData, RegionSet};
//!
//! let positions = [
//!     [0.1, 0.1, 0.1],
//!     [0.9, 0.1, 0.1],
//!     [0.1, 0.9, 0.1],
//!     [0.1, 0.1, 0.9],
//! ];
//! let indices = [0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3];
//! let mesh = MeshData::from_indexed(&positions, &indices).unwrap();
//! let set = RegionSet::build(vec![("corner", mesh)]);
//!
//! let grid = generate_field(set.regions(), 8).unwrap();
//! assert_eq!(grid.alpha(1, 1, 1), Some(OPAQUE_ALPHA));
//! assert_eq!(grid.alpha(7, 7, 7), Some(DIM_ALPHA));
//! ```
//!
//! # Features
//!
//! - `parallel` (default): fill z-slabs on the rayon pool
//! - `wasm`: `WasmColorSpace` bindings for the browser visualizer

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod space;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use cache::{FieldCache, FieldKey, GenerationToken};
pub use config::{
    FieldConfig, CHANNELS, DEFAULT_RESOLUTION, DIM_ALPHA, MAX_RESOLUTION, OPAQUE_ALPHA,
};
pub use error::{FieldError, Result};
pub use generator::{generate_field, generate_field_cancellable, generate_field_with};
pub use grid::{normalized_position, TextureDescriptor, VoxelGrid};
pub use space::{ConceptualSpace, Dimension, Transform, TransformKind};

#[cfg(feature = "wasm")]
pub use wasm::WasmColorSpace;
