use crate::cache::FieldCache;
use crate::config::FieldConfig;
use region::{BoundingBox, MeshData, RegionError, RegionId, RegionSet};
use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Box placement handed to the renderer for one region
#[derive(Serialize)]
struct BoxInfo {
    min: [f64; 3],
    max: [f64; 3],
    center: [f64; 3],
    size: [f64; 3],
}

impl From<&BoundingBox> for BoxInfo {
    fn from(bbox: &BoundingBox) -> Self {
        Self {
            min: bbox.min.to_array(),
            max: bbox.max.to_array(),
            center: bbox.center().to_array(),
            size: bbox.size().to_array(),
        }
    }
}

struct ColorSpaceState {
    regions: RegionSet,
    cache: FieldCache,
}

/// Highlighted regions of a color space and the texture they produce
#[wasm_bindgen]
pub struct WasmColorSpace {
    inner: RefCell<ColorSpaceState>,
}

#[wasm_bindgen]
impl WasmColorSpace {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(ColorSpaceState {
                regions: RegionSet::new(),
                cache: FieldCache::new(FieldConfig::default()),
            }),
        }
    }

    /// Load or replace a region from a flattened position buffer
    ///
    /// # Arguments
    /// * `id` - Region identifier, usually the asset path
    /// * `positions` - `[x0, y0, z0, x1, ...]`
    /// * `indices` - Triangle indices for indexed geometry; consecutive
    ///   position triples form triangles when absent
    #[wasm_bindgen(js_name = addRegion)]
    pub fn add_region(
        &self,
        id: String,
        positions: Vec<f64>,
        indices: Option<Vec<u32>>,
    ) -> Result<(), JsValue> {
        let mesh = mesh_from_buffers(&positions, indices.as_deref());

        let mut state = self.inner.borrow_mut();
        state.cache.invalidate();
        let result = match mesh {
            Ok(mesh) => state.regions.insert(id.as_str(), mesh),
            Err(err) => {
                state.regions.reject(id.as_str(), err.clone());
                Err(err)
            }
        };
        result.map_err(|e| JsValue::from_str(&format!("Region '{}' excluded: {}", id, e)))
    }

    /// Remove a region; returns whether it was loaded
    #[wasm_bindgen(js_name = removeRegion)]
    pub fn remove_region(&self, id: &str) -> bool {
        let mut state = self.inner.borrow_mut();
        state.cache.invalidate();
        state.regions.remove(&RegionId::from(id)).is_some()
    }

    #[wasm_bindgen(js_name = clearRegions)]
    pub fn clear_regions(&self) {
        let mut state = self.inner.borrow_mut();
        state.cache.invalidate();
        state.regions.clear();
    }

    /// Generate (or fetch from cache) the RGBA texture at `resolution`
    #[wasm_bindgen(js_name = generate)]
    pub fn generate(&self, resolution: usize) -> Result<js_sys::Uint8Array, JsValue> {
        let mut state = self.inner.borrow_mut();
        let ColorSpaceState { regions, cache } = &mut *state;

        let grid = cache
            .get_or_generate(regions, resolution)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(js_sys::Uint8Array::from(grid.as_bytes()))
    }

    /// Texture layout at `resolution`:
    /// `{ width, height, depth, channels, bytesPerChannel }`
    #[wasm_bindgen(js_name = descriptor)]
    pub fn descriptor(&self, resolution: usize) -> Result<JsValue, JsValue> {
        let mut state = self.inner.borrow_mut();
        let ColorSpaceState { regions, cache } = &mut *state;

        let grid = cache
            .get_or_generate(regions, resolution)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        serde_wasm_bindgen::to_value(&grid.descriptor())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// `{ min, max, center, size }` of a loaded region, or `undefined`
    #[wasm_bindgen(js_name = boundingBox)]
    pub fn bounding_box(&self, id: &str) -> Result<JsValue, JsValue> {
        let state = self.inner.borrow();
        match state.regions.get(&RegionId::from(id)) {
            Some(loaded) => serde_wasm_bindgen::to_value(&BoxInfo::from(loaded.bbox()))
                .map_err(|e| JsValue::from_str(&e.to_string())),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = regionIds)]
    pub fn region_ids(&self) -> Vec<String> {
        self.inner
            .borrow()
            .regions
            .ids()
            .map(|id| id.as_str().to_string())
            .collect()
    }

    /// Ids of regions that failed to load
    #[wasm_bindgen(js_name = rejectedIds)]
    pub fn rejected_ids(&self) -> Vec<String> {
        self.inner
            .borrow()
            .regions
            .rejected()
            .iter()
            .map(|(id, _)| id.as_str().to_string())
            .collect()
    }
}

impl Default for WasmColorSpace {
    fn default() -> Self {
        Self::new()
    }
}

/// Unflatten `[x0, y0, z0, x1, ...]` and build the triangle soup
fn mesh_from_buffers(positions: &[f64], indices: Option<&[u32]>) -> Result<MeshData, RegionError> {
    if positions.len() % 3 != 0 {
        return Err(RegionError::IncompleteTriangle {
            len: positions.len(),
        });
    }
    let points: Vec<[f64; 3]> = positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    match indices {
        Some(indices) => MeshData::from_indexed(&points, indices),
        None => MeshData::from_positions(&points),
    }
}
