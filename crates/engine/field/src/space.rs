//! Conceptual-space axes
//!
//! The voxel grid always spans the unit cube. A [`ConceptualSpace`] gives
//! each of its three axes a name and a value range, optionally followed by a
//! nonlinear transform, so that a voxel can be read back as a point of the
//! space it visualizes (e.g. L*a*b* rather than raw RGB).
//!
//! Definitions are JSON:
//!
//! ```json
//! { "dimensions": [
//!     { "name": "L", "min": 0, "max": 100,
//!       "transform": { "type": "power",
//!                      "params": { "scale": 116, "exponent": 0.333, "offset": -16 } } },
//!     { "name": "a", "min": -128, "max": 127 },
//!     { "name": "b", "min": -128, "max": 127 }
//! ] }
//! ```

use crate::error::{FieldError, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// `scale * x + offset`
    Linear,
    /// `scale * x^exponent + offset`
    Power,
    /// `scale * log_base(x) + offset`, natural log unless `base` is given
    Logarithmic,
    /// Linear interpolation between `breakpoint -> value` pairs, clamped at both ends
    Piecewise,
}

/// Nonlinear mapping applied after an axis value is denormalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(rename = "type")]
    pub kind: TransformKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
}

impl Transform {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    fn param(&self, name: &str, default: f64) -> f64 {
        self.params.get(name).copied().unwrap_or(default)
    }

    /// Breakpoints of a piecewise transform, sorted by input
    fn breakpoints(&self) -> Result<Vec<(f64, f64)>> {
        let mut points = self
            .params
            .iter()
            .map(|(key, &value)| {
                key.parse::<f64>()
                    .ok()
                    .filter(|x| x.is_finite())
                    .map(|x| (x, value))
                    .ok_or_else(|| {
                        FieldError::Space(format!("Piecewise breakpoint '{}' is not a number", key))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if points.is_empty() {
            return Err(FieldError::Space("Piecewise transform has no breakpoints".into()));
        }

        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(points)
    }

    fn validate(&self) -> Result<()> {
        match self.kind {
            TransformKind::Piecewise => self.breakpoints().map(|_| ()),
            TransformKind::Logarithmic => {
                let base = self.param("base", std::f64::consts::E);
                if base <= 0.0 || base == 1.0 {
                    return Err(FieldError::Space(format!("Invalid logarithm base {}", base)));
                }
                Ok(())
            }
            TransformKind::Linear | TransformKind::Power => Ok(()),
        }
    }

    /// Apply the transform to a value
    pub fn apply(&self, x: f64) -> Result<f64> {
        let scale = self.param("scale", 1.0);
        let offset = self.param("offset", 0.0);

        let y = match self.kind {
            TransformKind::Linear => scale * x + offset,
            TransformKind::Power => scale * x.powf(self.param("exponent", 1.0)) + offset,
            TransformKind::Logarithmic => {
                let base = self.param("base", std::f64::consts::E);
                scale * x.ln() / base.ln() + offset
            }
            TransformKind::Piecewise => interpolate(&self.breakpoints()?, x),
        };
        Ok(y)
    }
}

fn interpolate(points: &[(f64, f64)], x: f64) -> f64 {
    let (first, last) = (points[0], points[points.len() - 1]);
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }

    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x <= x1 {
            let t = (x - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    last.1
}

/// A named axis of a conceptual space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Axis value at normalized coordinate `t` (0 maps to `min`, 1 to `max`)
    pub fn denormalize(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }

    /// Normalized coordinate of an axis value
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    /// Denormalize `t`, then apply the axis transform if there is one
    pub fn value_at(&self, t: f64) -> Result<f64> {
        let value = self.denormalize(t);
        match &self.transform {
            Some(transform) => transform.apply(value),
            None => Ok(value),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(FieldError::Space(format!(
                "Dimension '{}' has invalid range [{}, {}]",
                self.name, self.min, self.max
            )));
        }
        if let Some(transform) = &self.transform {
            transform.validate()?;
        }
        Ok(())
    }
}

/// Three named axes spanning the voxel grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptualSpace {
    pub dimensions: Vec<Dimension>,
}

impl ConceptualSpace {
    /// Number of axes a field can map onto
    pub const AXES: usize = 3;

    /// Build a space and check it
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self> {
        let space = Self { dimensions };
        space.validate()?;
        Ok(space)
    }

    /// The 8-bit RGB cube the default field colors are drawn from
    pub fn rgb() -> Self {
        Self {
            dimensions: vec![
                Dimension::new("R", 0.0, 255.0),
                Dimension::new("G", 0.0, 255.0),
                Dimension::new("B", 0.0, 255.0),
            ],
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let space: Self = serde_json::from_str(content)?;
        space.validate()?;
        Ok(space)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimensions.len() != Self::AXES {
            return Err(FieldError::Space(format!(
                "Expected {} dimensions, found {}",
                Self::AXES,
                self.dimensions.len()
            )));
        }
        self.dimensions.iter().try_for_each(Dimension::validate)
    }

    pub fn names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Conceptual-space coordinates of a point of the unit cube
    pub fn value_at(&self, unit: DVec3) -> Result<[f64; 3]> {
        self.validate()?;
        let [x, y, z] = unit.to_array();
        Ok([
            self.dimensions[0].value_at(x)?,
            self.dimensions[1].value_at(y)?,
            self.dimensions[2].value_at(z)?,
        ])
    }

    /// Unit-cube position of an untransformed point of the space
    pub fn unit_position(&self, values: [f64; 3]) -> Result<DVec3> {
        self.validate()?;
        Ok(DVec3::new(
            self.dimensions[0].normalize(values[0]),
            self.dimensions[1].normalize(values[1]),
            self.dimensions[2].normalize(values[2]),
        ))
    }
}

impl Default for ConceptualSpace {
    fn default() -> Self {
        Self::rgb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAB: &str = r#"{
        "dimensions": [
            { "name": "L", "min": 0, "max": 100,
              "transform": { "type": "power",
                             "params": { "scale": 116, "exponent": 0.3333333333333333,
                                         "offset": -16 } } },
            { "name": "a", "min": -128, "max": 127,
              "transform": { "type": "linear", "params": { "scale": 1, "offset": 0 } } },
            { "name": "b", "min": -128, "max": 127,
              "transform": { "type": "linear", "params": { "scale": 1, "offset": 0 } } }
        ]
    }"#;

    #[test]
    fn test_parse_lab() {
        let space = ConceptualSpace::from_json_str(LAB).unwrap();
        assert_eq!(space.names(), vec!["L", "a", "b"]);
        assert_eq!(space.dimensions[0].transform.as_ref().unwrap().kind, TransformKind::Power);
    }

    #[test]
    fn test_lab_values() {
        let space = ConceptualSpace::from_json_str(LAB).unwrap();

        let [l, a, b] = space.value_at(DVec3::new(0.08, 0.0, 1.0)).unwrap();
        // L = 116 * 8^(1/3) - 16
        assert!((l - 216.0).abs() < 1e-9);
        assert_eq!(a, -128.0);
        assert_eq!(b, 127.0);
    }

    #[test]
    fn test_rgb_space_matches_field_colors() {
        let space = ConceptualSpace::rgb();
        let [r, g, b] = space.value_at(DVec3::new(0.0, 0.5, 1.0)).unwrap();
        assert_eq!((r, g, b), (0.0, 127.5, 255.0));

        let unit = space.unit_position([0.0, 127.5, 255.0]).unwrap();
        assert_eq!(unit, DVec3::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_rejects_wrong_dimension_count() {
        let json = r#"{ "dimensions": [ { "name": "x", "min": 0, "max": 1 } ] }"#;
        assert!(matches!(ConceptualSpace::from_json_str(json), Err(FieldError::Space(_))));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let result = ConceptualSpace::new(vec![
            Dimension::new("x", 1.0, 0.0),
            Dimension::new("y", 0.0, 1.0),
            Dimension::new("z", 0.0, 1.0),
        ]);
        assert!(matches!(result, Err(FieldError::Space(_))));
    }

    #[test]
    fn test_rejects_unknown_transform() {
        let json = r#"{ "dimensions": [
            { "name": "x", "min": 0, "max": 1, "transform": { "type": "cubic" } },
            { "name": "y", "min": 0, "max": 1 },
            { "name": "z", "min": 0, "max": 1 }
        ] }"#;
        assert!(matches!(ConceptualSpace::from_json_str(json), Err(FieldError::Space(_))));
    }

    #[test]
    fn test_logarithmic_transform() {
        let t = Transform::new(TransformKind::Logarithmic)
            .with_param("base", 10.0)
            .with_param("scale", 2.0);
        assert!((t.apply(1000.0).unwrap() - 6.0).abs() < 1e-12);

        let natural = Transform::new(TransformKind::Logarithmic);
        assert!((natural.apply(std::f64::consts::E).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_logarithmic_rejects_base_one() {
        let space = ConceptualSpace::new(vec![
            Dimension::new("x", 1.0, 10.0)
                .with_transform(Transform::new(TransformKind::Logarithmic).with_param("base", 1.0)),
            Dimension::new("y", 0.0, 1.0),
            Dimension::new("z", 0.0, 1.0),
        ]);
        assert!(matches!(space, Err(FieldError::Space(_))));
    }

    #[test]
    fn test_piecewise_interpolates_and_clamps() {
        let t = Transform::new(TransformKind::Piecewise)
            .with_param("0", 0.0)
            .with_param("0.5", 0.8)
            .with_param("1", 1.0);

        assert_eq!(t.apply(-1.0).unwrap(), 0.0);
        assert!((t.apply(0.25).unwrap() - 0.4).abs() < 1e-12);
        assert!((t.apply(0.75).unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(t.apply(2.0).unwrap(), 1.0);
    }

    #[test]
    fn test_piecewise_rejects_bad_breakpoint() {
        let t = Transform::new(TransformKind::Piecewise).with_param("mid", 0.5);
        assert!(matches!(t.apply(0.5), Err(FieldError::Space(_))));
        assert!(Transform::new(TransformKind::Piecewise).apply(0.5).is_err());
    }

    #[test]
    fn test_serialize_omits_empty_fields() {
        let json = serde_json::to_string(&Dimension::new("R", 0.0, 255.0)).unwrap();
        assert_eq!(json, r#"{"name":"R","min":0.0,"max":255.0}"#);
    }
}
