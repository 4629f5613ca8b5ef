//! Field generation settings
//!
//! Defaults reproduce the color-space texture used by the visualizer: a 64³
//! grid, fully opaque voxels inside highlighted regions and dimmed ones
//! everywhere else.

use crate::error::{FieldError, Result};
use serde::{Deserialize, Serialize};

/// Samples per axis of the default grid
pub const DEFAULT_RESOLUTION: usize = 64;

/// Alpha of voxels inside a region, or of every voxel when no region is loaded
pub const OPAQUE_ALPHA: u8 = 255;

/// Alpha of voxels outside every region (about 10% opacity)
pub const DIM_ALPHA: u8 = 26;

/// Largest accepted samples per axis; the buffer is then 512 MiB
pub const MAX_RESOLUTION: usize = 512;

/// Bytes per voxel: R, G, B, A
pub const CHANNELS: usize = 4;

fn default_resolution() -> usize {
    DEFAULT_RESOLUTION
}

fn default_opaque_alpha() -> u8 {
    OPAQUE_ALPHA
}

fn default_dim_alpha() -> u8 {
    DIM_ALPHA
}

fn default_parallel() -> bool {
    true
}

/// Configuration for a field generation pass
///
/// Every field is optional when deserializing:
///
/// ```toml
/// resolution = 32
/// dim_alpha = 40
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Samples per axis
    #[serde(default = "default_resolution")]
    pub resolution: usize,

    #[serde(default = "default_opaque_alpha")]
    pub opaque_alpha: u8,

    #[serde(default = "default_dim_alpha")]
    pub dim_alpha: u8,

    /// Split the grid over a worker pool (ignored without the `parallel` feature)
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            opaque_alpha: OPAQUE_ALPHA,
            dim_alpha: DIM_ALPHA,
            parallel: true,
        }
    }
}

impl FieldConfig {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_alphas(mut self, opaque: u8, dim: u8) -> Self {
        self.opaque_alpha = opaque;
        self.dim_alpha = dim;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse a configuration from TOML and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the resolution lies in `2..=MAX_RESOLUTION`
    pub fn validate(&self) -> Result<()> {
        self.buffer_len().map(|_| ())
    }

    /// Total number of voxels in the grid, if the resolution is valid
    pub fn voxel_count(&self) -> Result<usize> {
        self.buffer_len().map(|len| len / CHANNELS)
    }

    /// Byte length of the packed RGBA buffer
    ///
    /// # Errors
    /// [`FieldError::InvalidResolution`] outside `2..=MAX_RESOLUTION`, or if
    /// the buffer size does not fit in `usize` on this target.
    pub fn buffer_len(&self) -> Result<usize> {
        let n = self.resolution;
        if !(2..=MAX_RESOLUTION).contains(&n) {
            return Err(FieldError::InvalidResolution(n));
        }
        n.checked_pow(3)
            .and_then(|voxels| voxels.checked_mul(CHANNELS))
            .ok_or(FieldError::InvalidResolution(n))
    }
}
