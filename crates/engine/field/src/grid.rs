//! Dense RGBA voxel grid
//!
//! Voxels are stored x-fastest, then y, then z, four bytes each, which is the
//! layout a 3D texture upload expects:
//!
//! ```text
//! offset = (z * N * N + y * N + x) * 4 + channel
//! ```

use crate::config::CHANNELS;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Map a sample index to its coordinate in `[0, 1]`
///
/// Index 0 maps to exactly 0.0 and index `resolution - 1` to exactly 1.0.
/// `resolution` must be at least 2.
#[inline]
pub fn normalized_position(index: usize, resolution: usize) -> f64 {
    index as f64 / (resolution - 1) as f64
}

/// Layout of a voxel buffer as handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureDescriptor {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub channels: usize,
    pub bytes_per_channel: usize,
}

impl TextureDescriptor {
    pub fn byte_len(&self) -> usize {
        self.width * self.height * self.depth * self.channels * self.bytes_per_channel
    }
}

/// A cubic grid of RGBA voxels over the unit cube
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    resolution: usize,
    data: Vec<u8>,
}

impl VoxelGrid {
    /// Wrap a packed buffer of `resolution³ * 4` bytes
    pub(crate) fn from_raw(resolution: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), resolution.pow(3) * CHANNELS);
        Self { resolution, data }
    }

    /// Samples per axis
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Byte offset of voxel `(x, y, z)`
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let n = self.resolution;
        (z * n * n + y * n + x) * CHANNELS
    }

    /// RGBA value of voxel `(x, y, z)`, or `None` if out of range
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Option<[u8; 4]> {
        let n = self.resolution;
        if x >= n || y >= n || z >= n {
            return None;
        }
        self.voxels().get(self.index(x, y, z) / CHANNELS).copied()
    }

    pub fn alpha(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        self.voxel(x, y, z).map(|rgba| rgba[3])
    }

    /// Point in `[0, 1]³` sampled by voxel `(x, y, z)`
    pub fn position(&self, x: usize, y: usize, z: usize) -> DVec3 {
        DVec3::new(
            normalized_position(x, self.resolution),
            normalized_position(y, self.resolution),
            normalized_position(z, self.resolution),
        )
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The buffer viewed as RGBA texels
    pub fn voxels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn descriptor(&self) -> TextureDescriptor {
        TextureDescriptor {
            width: self.resolution,
            height: self.resolution,
            depth: self.resolution,
            channels: CHANNELS,
            bytes_per_channel: 1,
        }
    }

    /// Number of voxels with the given alpha
    pub fn count_alpha(&self, alpha: u8) -> usize {
        self.voxels().iter().filter(|v| v[3] == alpha).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(resolution: usize) -> VoxelGrid {
        let data = (0..resolution.pow(3) * CHANNELS).map(|i| (i % 251) as u8).collect();
        VoxelGrid::from_raw(resolution, data)
    }

    #[test]
    fn test_normalized_position_endpoints() {
        for n in [2, 3, 4, 7, 64, 100] {
            assert_eq!(normalized_position(0, n), 0.0);
            assert_eq!(normalized_position(n - 1, n), 1.0);
        }
        assert_eq!(normalized_position(1, 3), 0.5);
    }

    #[test]
    fn test_index_packing() {
        let g = grid(4);
        assert_eq!(g.index(0, 0, 0), 0);
        assert_eq!(g.index(1, 0, 0), 4);
        assert_eq!(g.index(0, 1, 0), 16);
        assert_eq!(g.index(0, 0, 1), 64);
        assert_eq!(g.index(3, 3, 3), (4 * 4 * 4 - 1) * 4);
    }

    #[test]
    fn test_voxel_matches_bytes() {
        let g = grid(3);
        let offset = g.index(2, 1, 1);
        let bytes = &g.as_bytes()[offset..offset + 4];
        assert_eq!(g.voxel(2, 1, 1).unwrap(), [bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(g.alpha(2, 1, 1), Some(bytes[3]));
    }

    #[test]
    fn test_voxel_out_of_range() {
        let g = grid(3);
        assert_eq!(g.voxel(3, 0, 0), None);
        assert_eq!(g.alpha(0, 0, 5), None);
    }

    #[test]
    fn test_descriptor() {
        let g = grid(5);
        let d = g.descriptor();
        assert_eq!((d.width, d.height, d.depth), (5, 5, 5));
        assert_eq!(d.channels, 4);
        assert_eq!(d.bytes_per_channel, 1);
        assert_eq!(d.byte_len(), g.as_bytes().len());
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let json = serde_json::to_string(&grid(2).descriptor()).unwrap();
        assert!(json.contains("\"bytesPerChannel\":1"));
    }

    #[test]
    fn test_position_corners() {
        let g = grid(4);
        assert_eq!(g.position(0, 0, 0), DVec3::ZERO);
        assert_eq!(g.position(3, 3, 3), DVec3::ONE);
    }
}
