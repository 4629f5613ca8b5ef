//! JSON region files
//!
//! ```json
//! { "id": "regions/red.glb", "positions": [[0, 0, 0], [1, 0, 0], ...], "indices": [0, 1, 2, ...] }
//! ```
//!
//! `indices` is optional; without it every three consecutive positions form
//! a triangle.

use anyhow::{Context, Result};
use region::MeshData;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFile {
    pub id: String,
    pub positions: Vec<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<u32>>,
}

impl RegionFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read region file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse region file {}", path.display()))
    }

    /// Flatten the buffers into a triangle soup
    pub fn to_mesh(&self) -> Result<MeshData> {
        let mesh = match &self.indices {
            Some(indices) => MeshData::from_indexed(&self.positions, indices),
            None => MeshData::from_positions(&self.positions),
        };
        mesh.with_context(|| format!("Invalid geometry in region '{}'", self.id))
    }
}

/// Load every file, returning `(id, mesh)` pairs in argument order
///
/// Files that cannot be read or parsed are fatal; geometry that parses but
/// encloses nothing is left for the region set to reject.
pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<(String, MeshData)>> {
    paths
        .iter()
        .map(|path| {
            let file = RegionFile::load(path.as_ref())?;
            let mesh = file.to_mesh()?;
            tracing::debug!("Loaded region '{}' with {} triangles", file.id, mesh.len());
            Ok((file.id, mesh))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_indexed() {
        let file = write_json(
            r#"{ "id": "tetra",
                 "positions": [[0,0,0],[1,0,0],[0,1,0],[0,0,1]],
                 "indices": [0,2,1, 0,1,3, 0,3,2, 1,2,3] }"#,
        );
        let region = RegionFile::load(file.path()).unwrap();
        assert_eq!(region.id, "tetra");
        assert_eq!(region.to_mesh().unwrap().len(), 4);
    }

    #[test]
    fn test_load_non_indexed() {
        let file = write_json(r#"{ "id": "tri", "positions": [[0,0,0],[1,0,0],[0,1,0]] }"#);
        let region = RegionFile::load(file.path()).unwrap();
        assert!(region.indices.is_none());
        assert_eq!(region.to_mesh().unwrap().len(), 1);
    }

    #[test]
    fn test_bad_index_is_reported() {
        let region = RegionFile {
            id: "broken".into(),
            positions: vec![[0.0; 3]; 3],
            indices: Some(vec![0, 1, 9]),
        };
        let err = region.to_mesh().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = RegionFile::load(Path::new("/nonexistent/region.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/region.json"));
    }

    #[test]
    fn test_load_all_keeps_order_and_empty_meshes() {
        let a = write_json(r#"{ "id": "a", "positions": [[0,0,0],[1,0,0],[0,1,0]] }"#);
        let b = write_json(r#"{ "id": "b", "positions": [] }"#);

        let loaded = load_all(&[a.path(), b.path()]).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].0, "a");
        assert_eq!(loaded[1].0, "b");
        assert!(loaded[1].1.is_empty());
    }
}
