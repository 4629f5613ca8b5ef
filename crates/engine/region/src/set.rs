//! Named regions loaded for one generation pass
//!
//! A [`RegionSet`] is built from `(id, mesh)` pairs. Regions that cannot be
//! classified against (empty meshes) are left out and recorded as rejected,
//! so one bad asset never prevents the others from being drawn.

use crate::aggregate::{is_inside_any, Region};
use crate::bounds::BoundingBox;
use crate::error::RegionError;
use crate::mesh::{MeshData, Point3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a region, typically its asset path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A region ready for classification, tagged with its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRegion {
    pub id: RegionId,
    pub region: Region,
}

impl LoadedRegion {
    pub fn bbox(&self) -> &BoundingBox {
        self.region.bbox()
    }
}

impl AsRef<Region> for LoadedRegion {
    fn as_ref(&self) -> &Region {
        &self.region
    }
}

/// Identity of a region set: the sorted list of its region ids
///
/// Two sets holding the same ids compare equal regardless of load order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionSetKey(Vec<RegionId>);

impl RegionSetKey {
    pub fn ids(&self) -> &[RegionId] {
        &self.0
    }
}

/// Regions loaded for one pass, plus those that were rejected
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<LoadedRegion>,
    rejected: Vec<(RegionId, RegionError)>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(id, mesh)` pairs, preserving their order
    pub fn build<I, K>(meshes: I) -> Self
    where
        I: IntoIterator<Item = (K, MeshData)>,
        K: Into<RegionId>,
    {
        let mut set = Self::new();
        for (id, mesh) in meshes {
            // Rejections are recorded on the set
            let _ = set.insert(id, mesh);
        }
        set
    }

    /// Add a region, replacing any region with the same id
    ///
    /// On failure the region is recorded as rejected and the error returned.
    pub fn insert(&mut self, id: impl Into<RegionId>, mesh: MeshData) -> Result<(), RegionError> {
        let id = id.into();
        self.remove(&id);

        match Region::new(mesh) {
            Ok(region) => {
                self.regions.push(LoadedRegion { id, region });
                Ok(())
            }
            Err(err) => {
                self.reject(id, err.clone());
                Err(err)
            }
        }
    }

    /// Record a region whose geometry could not be built
    ///
    /// Any region already loaded under `id` is dropped, the same as a failed
    /// [`insert`](Self::insert).
    pub fn reject(&mut self, id: impl Into<RegionId>, err: RegionError) {
        let id = id.into();
        self.remove(&id);
        tracing::warn!("Excluding region '{}': {}", id, err);
        self.rejected.push((id, err));
    }

    /// Remove a region (or its rejection record) by id
    pub fn remove(&mut self, id: &RegionId) -> Option<LoadedRegion> {
        self.rejected.retain(|(rejected, _)| rejected != id);
        let position = self.regions.iter().position(|r| &r.id == id)?;
        Some(self.regions.remove(position))
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.rejected.clear();
    }

    pub fn get(&self, id: &RegionId) -> Option<&LoadedRegion> {
        self.regions.iter().find(|r| &r.id == id)
    }

    /// Loaded regions in insertion order
    pub fn regions(&self) -> &[LoadedRegion] {
        &self.regions
    }

    /// Regions left out, with the reason
    pub fn rejected(&self) -> &[(RegionId, RegionError)] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.iter().map(|r| &r.id)
    }

    /// Identity of the loaded regions, independent of load order
    pub fn key(&self) -> RegionSetKey {
        let mut ids: Vec<RegionId> = self.ids().cloned().collect();
        ids.sort();
        RegionSetKey(ids)
    }

    /// Test whether a point is enclosed by any loaded region
    pub fn contains(&self, point: Point3) -> bool {
        is_inside_any(point, &self.regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Triangle;
    use glam::DVec3;

    fn tetrahedron(offset: f64) -> MeshData {
        let o = DVec3::splat(offset);
        let a = o;
        let b = o + DVec3::new(0.2, 0.0, 0.0);
        let c = o + DVec3::new(0.0, 0.2, 0.0);
        let d = o + DVec3::new(0.0, 0.0, 0.2);
        MeshData::new(vec![
            Triangle::new(a, c, b),
            Triangle::new(a, b, d),
            Triangle::new(a, d, c),
            Triangle::new(b, c, d),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_excludes_empty_meshes() {
        let set = RegionSet::build(vec![
            ("regions/red.glb", tetrahedron(0.1)),
            ("regions/empty.glb", MeshData::default()),
            ("regions/blue.glb", tetrahedron(0.6)),
        ]);

        assert_eq!(set.len(), 2);
        let ids: Vec<&str> = set.ids().map(RegionId::as_str).collect();
        assert_eq!(ids, vec!["regions/red.glb", "regions/blue.glb"]);

        assert_eq!(set.rejected().len(), 1);
        assert_eq!(set.rejected()[0].0.as_str(), "regions/empty.glb");
        assert_eq!(set.rejected()[0].1, RegionError::EmptyMesh);
    }

    #[test]
    fn test_key_ignores_load_order() {
        let forward = RegionSet::build(vec![("a", tetrahedron(0.1)), ("b", tetrahedron(0.5))]);
        let backward = RegionSet::build(vec![("b", tetrahedron(0.5)), ("a", tetrahedron(0.1))]);
        assert_eq!(forward.key(), backward.key());
        assert_eq!(forward.key().ids().len(), 2);
    }

    #[test]
    fn test_key_ignores_rejected_regions() {
        let with_rejected =
            RegionSet::build(vec![("a", tetrahedron(0.1)), ("z", MeshData::default())]);
        let without = RegionSet::build(vec![("a", tetrahedron(0.1))]);
        assert_eq!(with_rejected.key(), without.key());
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut set = RegionSet::new();
        set.insert("a", tetrahedron(0.1)).unwrap();
        set.insert("a", tetrahedron(0.6)).unwrap();

        assert_eq!(set.len(), 1);
        assert!(set.contains(DVec3::splat(0.62)));
        assert!(!set.contains(DVec3::splat(0.12)));
    }

    #[test]
    fn test_insert_valid_clears_previous_rejection() {
        let mut set = RegionSet::new();
        assert!(set.insert("a", MeshData::default()).is_err());
        assert_eq!(set.rejected().len(), 1);

        set.insert("a", tetrahedron(0.1)).unwrap();
        assert!(set.rejected().is_empty());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_reject_replaces_loaded_region() {
        let mut set = RegionSet::build(vec![("a", tetrahedron(0.1)), ("b", tetrahedron(0.5))]);
        let err = RegionError::IndexOutOfRange {
            index: 9,
            vertex_count: 3,
        };

        set.reject("a", err.clone());
        assert!(set.get(&RegionId::from("a")).is_none());
        assert!(!set.contains(DVec3::splat(0.12)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.rejected(), &[(RegionId::from("a"), err)]);

        // A second failure under the same id keeps a single record
        set.reject("a", RegionError::EmptyMesh);
        assert_eq!(set.rejected(), &[(RegionId::from("a"), RegionError::EmptyMesh)]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut set = RegionSet::build(vec![("a", tetrahedron(0.1)), ("b", tetrahedron(0.5))]);

        let removed = set.remove(&RegionId::from("a")).unwrap();
        assert_eq!(removed.id.as_str(), "a");
        assert!(set.get(&RegionId::from("a")).is_none());
        assert!(set.get(&RegionId::from("b")).is_some());
        assert!(set.remove(&RegionId::from("missing")).is_none());

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_region_id_serializes_as_string() {
        let id = RegionId::from("regions/red.glb");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"regions/red.glb\"");
    }
}
