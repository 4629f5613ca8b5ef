//! Voxel field generation
//!
//! Every voxel samples the point `(x, y, z) / (N - 1)` of the unit cube. Its
//! color is that point read as RGB; its alpha says whether any region
//! encloses the point. With no regions loaded the whole cube is opaque.
//!
//! The grid is filled one z-slab at a time. With the `parallel` feature the
//! slabs are spread over the rayon pool; each slab is written by exactly one
//! worker and the output is byte-identical to the serial loop.

use crate::cache::GenerationToken;
use crate::config::{FieldConfig, CHANNELS};
use crate::error::{FieldError, Result};
use crate::grid::{normalized_position, VoxelGrid};
use glam::DVec3;
use region::{is_inside_any, Region};

/// Generate a field with default alphas
///
/// # Errors
/// [`FieldError::InvalidResolution`] unless `resolution` lies in
/// `2..=MAX_RESOLUTION`.
pub fn generate_field<R>(regions: &[R], resolution: usize) -> Result<VoxelGrid>
where
    R: AsRef<Region> + Sync,
{
    generate_field_with(regions, &FieldConfig::new(resolution))
}

/// Generate a field with explicit settings
pub fn generate_field_with<R>(regions: &[R], config: &FieldConfig) -> Result<VoxelGrid>
where
    R: AsRef<Region> + Sync,
{
    generate(regions, config, None)
}

/// Generate a field, giving up as soon as `token` goes stale
///
/// The token is checked before every z-slab. A cancelled pass returns
/// [`FieldError::Cancelled`] and its partial buffer is dropped.
pub fn generate_field_cancellable<R>(
    regions: &[R],
    config: &FieldConfig,
    token: &GenerationToken,
) -> Result<VoxelGrid>
where
    R: AsRef<Region> + Sync,
{
    generate(regions, config, Some(token))
}

fn generate<R>(
    regions: &[R],
    config: &FieldConfig,
    token: Option<&GenerationToken>,
) -> Result<VoxelGrid>
where
    R: AsRef<Region> + Sync,
{
    let len = config.buffer_len()?;

    #[cfg(not(target_arch = "wasm32"))]
    let started = std::time::Instant::now();

    let n = config.resolution;
    let slab_len = len / n;
    let mut data = vec![0u8; len];

    let fill = |(z, slab): (usize, &mut [u8])| -> Result<()> {
        if token.is_some_and(GenerationToken::is_stale) {
            return Err(FieldError::Cancelled);
        }
        fill_slab(slab, z, regions, config);
        Ok(())
    };

    for_each_slab(&mut data, slab_len, config.parallel, fill)?;

    #[cfg(not(target_arch = "wasm32"))]
    tracing::debug!(
        "Generated {}^3 field over {} region(s) in {:?}",
        n,
        regions.len(),
        started.elapsed()
    );

    #[cfg(target_arch = "wasm32")]
    tracing::debug!("Generated {}^3 field over {} region(s)", n, regions.len());

    Ok(VoxelGrid::from_raw(n, data))
}

#[cfg(feature = "parallel")]
fn for_each_slab<F>(data: &mut [u8], slab_len: usize, parallel: bool, fill: F) -> Result<()>
where
    F: Fn((usize, &mut [u8])) -> Result<()> + Send + Sync,
{
    use rayon::prelude::*;

    if parallel {
        data.par_chunks_mut(slab_len).enumerate().try_for_each(fill)
    } else {
        data.chunks_mut(slab_len).enumerate().try_for_each(fill)
    }
}

#[cfg(not(feature = "parallel"))]
fn for_each_slab<F>(data: &mut [u8], slab_len: usize, _parallel: bool, fill: F) -> Result<()>
where
    F: Fn((usize, &mut [u8])) -> Result<()>,
{
    data.chunks_mut(slab_len).enumerate().try_for_each(fill)
}

/// Fill every voxel of the slab at depth `z`
fn fill_slab<R: AsRef<Region>>(slab: &mut [u8], z: usize, regions: &[R], config: &FieldConfig) {
    let n = config.resolution;
    let pz = normalized_position(z, n);

    for (i, voxel) in slab.chunks_exact_mut(CHANNELS).enumerate() {
        let p = DVec3::new(normalized_position(i % n, n), normalized_position(i / n, n), pz);

        let alpha = if regions.is_empty() || is_inside_any(p, regions) {
            config.opaque_alpha
        } else {
            config.dim_alpha
        };

        voxel.copy_from_slice(&[to_channel(p.x), to_channel(p.y), to_channel(p.z), alpha]);
    }
}

/// Quantize a coordinate in `[0, 1]` to a color channel, rounding to nearest
#[inline]
fn to_channel(value: f64) -> u8 {
    (value * 255.0).round() as u8
}
