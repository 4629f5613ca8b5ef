//! Point-in-mesh classification by ray parity
//!
//! A ray is cast from the query point and the triangles it crosses are
//! counted. An odd count means the point is enclosed by the surface, an even
//! count means it is outside. The mesh must be closed for the answer to mean
//! anything; this is assumed, not checked.
//!
//! # Crossing test
//!
//! Every vertex is projected onto the plane orthogonal to the ray, with the
//! query point at the origin of that plane. The ray hits a triangle when the
//! origin lies inside the projected triangle, i.e. when the three edge
//! orientations `cross(a, b)`, `cross(b, c)`, `cross(c, a)` share one sign.
//!
//! The orientation of an edge is `a.u * b.v - a.v * b.u`. Swapping the
//! endpoints negates it exactly in floating point, so two triangles sharing
//! an edge always see opposite signs for it and the origin can never fall
//! into both or into neither.
//!
//! When an orientation is exactly zero (the ray passes through an edge or a
//! vertex) the sign is taken from an infinitesimal displacement of the origin
//! by `(ε, ε²)` in the projection plane. The displaced ray is in general
//! position, so an edge-incident hit is owned by exactly one of the adjoining
//! triangles and a vertex hit by exactly one triangle of the fan.
//!
//! Along the ray the test is half-open: a hit counts only if it lies strictly
//! ahead of the origin.
//!
//! # Degenerate hits
//!
//! If an orientation overflows, or a hit has no usable projected area, the
//! crossing cannot be decided. The whole query is retried with the next
//! direction of a fixed, slightly skewed set. After the last attempt the
//! unresolved triangles are left out of the count and the best-effort answer
//! is returned.

use crate::bounds::BoundingBox;
use crate::mesh::{MeshData, Point3, Triangle};
use glam::DVec3;
use thiserror::Error;

/// Ray directions tried in order; the first is the canonical +X axis
const RAY_DIRECTIONS: [[f64; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [1.0, 0.314_159_265_358_979_3, 0.141_421_356_237_309_5],
    [1.0, -0.173_205_080_756_887_7, 0.271_828_182_845_904_5],
    [1.0, 0.223_606_797_749_979, -0.301_029_995_663_981_2],
];

/// Number of ray directions tried before falling back to a best-effort count
pub const MAX_RAY_ATTEMPTS: usize = RAY_DIRECTIONS.len();

/// A triangle whose crossing with the current ray cannot be decided
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Ray crossing with triangle {triangle} is unresolvable")]
pub struct DegenerateRayHit {
    /// Index of the triangle in the mesh
    pub triangle: usize,
}

/// Outcome of a point-in-mesh query with diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the point is enclosed by the mesh
    pub inside: bool,
    /// Number of crossings counted on the accepted ray
    pub crossings: usize,
    /// Rays cast; zero when the bounding box rejected the point
    pub attempts: usize,
    /// Triangles left out of the count because no ray resolved them
    pub excluded: usize,
}

impl Classification {
    fn rejected() -> Self {
        Self {
            inside: false,
            crossings: 0,
            attempts: 0,
            excluded: 0,
        }
    }
}

/// Test whether a point is enclosed by a closed mesh
///
/// # Arguments
/// * `point` - Query point
/// * `mesh` - Closed triangle mesh
/// * `bbox` - The mesh's exact bounding box (see [`BoundingBox::from_mesh`])
pub fn is_inside(point: Point3, mesh: &MeshData, bbox: &BoundingBox) -> bool {
    classify(point, mesh, bbox).inside
}

/// Classify a point against a closed mesh, reporting how the answer was found
pub fn classify(point: Point3, mesh: &MeshData, bbox: &BoundingBox) -> Classification {
    if !bbox.contains(point) {
        return Classification::rejected();
    }

    let mut count = RayCount::default();
    for (attempt, direction) in RAY_DIRECTIONS.iter().enumerate() {
        let frame = RayFrame::new(point, DVec3::from_array(*direction));
        count = cast(&frame, mesh);

        match count.first_degenerate {
            None => {
                return Classification {
                    inside: count.crossings % 2 == 1,
                    crossings: count.crossings,
                    attempts: attempt + 1,
                    excluded: 0,
                };
            }
            Some(hit) => {
                tracing::trace!(
                    "{} at {:?}, attempt {} of {}",
                    hit,
                    point,
                    attempt + 1,
                    MAX_RAY_ATTEMPTS
                );
            }
        }
    }

    tracing::debug!(
        "Excluding {} unresolved triangle(s) for point {:?}",
        count.excluded,
        point
    );

    Classification {
        inside: count.crossings % 2 == 1,
        crossings: count.crossings,
        attempts: MAX_RAY_ATTEMPTS,
        excluded: count.excluded,
    }
}

/// Crossing tally for one ray
#[derive(Debug, Default)]
struct RayCount {
    crossings: usize,
    excluded: usize,
    first_degenerate: Option<DegenerateRayHit>,
}

fn cast(frame: &RayFrame, mesh: &MeshData) -> RayCount {
    let mut count = RayCount::default();

    for (index, triangle) in mesh.triangles().iter().enumerate() {
        match frame.crosses(triangle, index) {
            Ok(true) => count.crossings += 1,
            Ok(false) => {}
            Err(hit) => {
                count.excluded += 1;
                count.first_degenerate.get_or_insert(hit);
            }
        }
    }

    count
}

/// A vertex expressed in ray coordinates
#[derive(Debug, Clone, Copy)]
struct Projected {
    u: f64,
    v: f64,
    /// Signed distance along the ray
    depth: f64,
}

/// Orthonormal frame with the ray along `dir` and its origin at the query point
#[derive(Debug, Clone, Copy)]
struct RayFrame {
    origin: Point3,
    dir: DVec3,
    u: DVec3,
    v: DVec3,
}

impl RayFrame {
    fn new(origin: Point3, direction: DVec3) -> Self {
        let dir = direction.normalize();
        // Axis-aligned frame keeps the canonical projection free of rounding
        let (u, v) = if dir == DVec3::X {
            (DVec3::Y, DVec3::Z)
        } else {
            dir.any_orthonormal_pair()
        };
        Self { origin, dir, u, v }
    }

    #[inline]
    fn project(&self, p: Point3) -> Projected {
        let d = p - self.origin;
        Projected {
            u: d.dot(self.u),
            v: d.dot(self.v),
            depth: d.dot(self.dir),
        }
    }

    /// Decide whether the ray crosses a triangle strictly ahead of its origin
    fn crosses(&self, triangle: &Triangle, index: usize) -> Result<bool, DegenerateRayHit> {
        let degenerate = DegenerateRayHit { triangle: index };

        let a = self.project(triangle.v0);
        let b = self.project(triangle.v1);
        let c = self.project(triangle.v2);

        let s0 = edge_sign(a, b).ok_or(degenerate)?;
        let s1 = edge_sign(b, c).ok_or(degenerate)?;
        let s2 = edge_sign(c, a).ok_or(degenerate)?;

        if s0 == 0 || s0 != s1 || s1 != s2 {
            return Ok(false);
        }

        // Unnormalized barycentric weights of the origin, one per opposite edge
        let wa = cross(b, c);
        let wb = cross(c, a);
        let wc = cross(a, b);
        let area = wa + wb + wc;

        if area == 0.0 || !area.is_finite() {
            return Err(degenerate);
        }

        let depth = (wa * a.depth + wb * b.depth + wc * c.depth) / area;
        if !depth.is_finite() {
            return Err(degenerate);
        }

        Ok(depth > 0.0)
    }
}

/// Orientation of the origin relative to the directed edge `a -> b`
#[inline]
fn cross(a: Projected, b: Projected) -> f64 {
    a.u * b.v - a.v * b.u
}

/// Sign of the edge orientation with symbolic tie-breaking
///
/// Returns `None` when the orientation is not finite. Returns `Some(0)` only
/// when both endpoints project onto the same point, in which case the edge
/// has no extent and cannot own the origin.
fn edge_sign(a: Projected, b: Projected) -> Option<i8> {
    let e = cross(a, b);
    if !e.is_finite() {
        return None;
    }
    if e != 0.0 {
        return Some(sign(e));
    }

    // Origin displaced by (ε, ε²): orientation gains -(b.v - a.v)·ε + (b.u - a.u)·ε²
    let dv = b.v - a.v;
    if dv != 0.0 {
        return Some(-sign(dv));
    }
    Some(sign(b.u - a.u))
}

#[inline]
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}
