//! Cache of generated fields
//!
//! Fields are keyed by the identity of the region set (its sorted ids) and
//! the resolution. Ids say nothing about mesh contents, so a caller that
//! replaces a region's mesh under the same id must call
//! [`FieldCache::invalidate`].
//!
//! Invalidation also bumps an epoch shared with every [`GenerationToken`]
//! handed out earlier. Generations holding an old token stop at the next
//! slab, and their results are refused by [`FieldCache::insert`].

use crate::config::FieldConfig;
use crate::error::Result;
use crate::generator::generate_field_cancellable;
use crate::grid::VoxelGrid;
use region::{RegionSet, RegionSetKey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cache key: which regions, at which resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub regions: RegionSetKey,
    pub resolution: usize,
}

impl FieldKey {
    pub fn new(set: &RegionSet, resolution: usize) -> Self {
        Self {
            regions: set.key(),
            resolution,
        }
    }
}

/// Handle telling an in-flight generation whether its inputs are still current
#[derive(Debug, Clone)]
pub struct GenerationToken {
    epoch: Arc<AtomicU64>,
    issued: u64,
}

impl GenerationToken {
    /// True once the cache that issued this token has been invalidated
    pub fn is_stale(&self) -> bool {
        self.epoch.load(Ordering::Acquire) != self.issued
    }
}

/// Generated fields by region set and resolution
#[derive(Debug)]
pub struct FieldCache {
    config: FieldConfig,
    entries: HashMap<FieldKey, Arc<VoxelGrid>>,
    epoch: Arc<AtomicU64>,
}

impl FieldCache {
    /// Create an empty cache; `config` supplies everything but the resolution
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Token bound to the current epoch
    pub fn token(&self) -> GenerationToken {
        GenerationToken {
            epoch: Arc::clone(&self.epoch),
            issued: self.epoch.load(Ordering::Acquire),
        }
    }

    /// Drop every cached field and mark outstanding tokens stale
    pub fn invalidate(&mut self) {
        let previous = self.epoch.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(
            "Invalidated field cache at epoch {} ({} entries dropped)",
            previous,
            self.entries.len()
        );
        self.entries.clear();
    }

    pub fn get(&self, key: &FieldKey) -> Option<Arc<VoxelGrid>> {
        self.entries.get(key).cloned()
    }

    /// Store a field produced under `token`
    ///
    /// Results of stale generations are discarded and `None` is returned.
    pub fn insert(
        &mut self,
        key: FieldKey,
        grid: VoxelGrid,
        token: &GenerationToken,
    ) -> Option<Arc<VoxelGrid>> {
        if token.is_stale() {
            tracing::debug!("Discarding stale {}^3 field", key.resolution);
            return None;
        }
        let grid = Arc::new(grid);
        self.entries.insert(key, Arc::clone(&grid));
        Some(grid)
    }

    /// Return the cached field for `set` at `resolution`, generating it on a miss
    pub fn get_or_generate(
        &mut self,
        set: &RegionSet,
        resolution: usize,
    ) -> Result<Arc<VoxelGrid>> {
        let key = FieldKey::new(set, resolution);
        if let Some(grid) = self.get(&key) {
            tracing::trace!("Field cache hit at resolution {}", resolution);
            return Ok(grid);
        }

        let token = self.token();
        let config = self.config.with_resolution(resolution);
        let grid = generate_field_cancellable(set.regions(), &config, &token)?;

        let grid = Arc::new(grid);
        self.entries.insert(key, Arc::clone(&grid));
        Ok(grid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FieldCache {
    fn default() -> Self {
        Self::new(FieldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use region::glam::DVec3;
    use region::{MeshData, Region, Triangle};
    use std::sync::atomic::AtomicBool;
    use std::sync::Barrier;

    fn tetrahedron() -> MeshData {
        let a = DVec3::splat(0.1);
        let b = a + DVec3::X * 0.5;
        let c = a + DVec3::Y * 0.5;
        let d = a + DVec3::Z * 0.5;
        MeshData::new(vec![
            Triangle::new(a, c, b),
            Triangle::new(a, b, d),
            Triangle::new(a, d, c),
            Triangle::new(b, c, d),
        ])
        .unwrap()
    }

    #[test]
    fn test_cache_hit_returns_same_grid() {
        let set = RegionSet::build(vec![("t", tetrahedron())]);
        let mut cache = FieldCache::default();

        let first = cache.get_or_generate(&set, 6).unwrap();
        let second = cache.get_or_generate(&set, 6).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_resolution_is_part_of_key() {
        let set = RegionSet::build(vec![("t", tetrahedron())]);
        let mut cache = FieldCache::default();

        let small = cache.get_or_generate(&set, 4).unwrap();
        let large = cache.get_or_generate(&set, 5).unwrap();
        assert_eq!(small.resolution(), 4);
        assert_eq!(large.resolution(), 5);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalidate_clears_and_stales_tokens() {
        let set = RegionSet::build(vec![("t", tetrahedron())]);
        let mut cache = FieldCache::default();
        cache.get_or_generate(&set, 4).unwrap();

        let token = cache.token();
        assert!(!token.is_stale());

        cache.invalidate();
        assert!(cache.is_empty());
        assert!(token.is_stale());
        assert!(!cache.token().is_stale());
    }

    #[test]
    fn test_insert_refuses_stale_result() {
        let set = RegionSet::build(vec![("t", tetrahedron())]);
        let mut cache = FieldCache::default();
        let key = FieldKey::new(&set, 4);
        let token = cache.token();

        let config = cache.config().with_resolution(4);
        let grid = generate_field_cancellable(set.regions(), &config, &token).unwrap();

        cache.invalidate();
        assert!(cache.insert(key.clone(), grid, &token).is_none());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_insert_accepts_current_result() {
        let set = RegionSet::build(vec![("t", tetrahedron())]);
        let mut cache = FieldCache::default();
        let key = FieldKey::new(&set, 4);
        let token = cache.token();

        let config = cache.config().with_resolution(4);
        let grid = generate_field_cancellable(set.regions(), &config, &token).unwrap();

        let stored = cache.insert(key.clone(), grid, &token).unwrap();
        assert!(Arc::ptr_eq(&stored, &cache.get(&key).unwrap()));
    }

    #[test]
    fn test_invalid_resolution_is_not_cached() {
        let set = RegionSet::new();
        let mut cache = FieldCache::default();
        assert!(matches!(
            cache.get_or_generate(&set, 1),
            Err(FieldError::InvalidResolution(1))
        ));
        assert!(cache.is_empty());
    }

    /// Region that holds the first lookup until the test thread lets it go
    struct PausingRegion {
        region: Region,
        paused: AtomicBool,
        started: Barrier,
        resume: Barrier,
    }

    impl AsRef<Region> for PausingRegion {
        fn as_ref(&self) -> &Region {
            if !self.paused.swap(true, Ordering::SeqCst) {
                self.started.wait();
                self.resume.wait();
            }
            &self.region
        }
    }

    #[test]
    fn test_invalidate_cancels_running_generation() {
        let mut cache = FieldCache::default();
        let token = cache.token();
        let regions = [PausingRegion {
            region: Region::new(tetrahedron()).unwrap(),
            paused: AtomicBool::new(false),
            started: Barrier::new(2),
            resume: Barrier::new(2),
        }];
        let config = FieldConfig::new(16).with_parallel(false);

        let result = std::thread::scope(|scope| {
            let worker = scope.spawn(|| generate_field_cancellable(&regions, &config, &token));

            // The worker is now inside the first slab
            regions[0].started.wait();
            cache.invalidate();
            regions[0].resume.wait();

            worker.join().unwrap()
        });

        assert!(matches!(result, Err(FieldError::Cancelled)));
        assert!(cache.is_empty());
    }
}
