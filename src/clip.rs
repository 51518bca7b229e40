//! Sutherland-Hodgman clipping against a camera-space depth plane.
//!
//! Polygons are clipped against the plane `z = plane_z`; the side with
//! `z > plane_z` (in front of the camera) is kept. Besides the camera-space
//! position, each vertex carries its normal and its object-space position,
//! and those are interpolated at the same parameter as the position so
//! lighting can still be evaluated at new vertices.

use serde::{ Serialize, Deserialize };

use crate::consts::NEAR_PLANE_Z;
use crate::vector::Vector3;

/// What happens to faces that reach behind the camera.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityPolicy {
    /// A face is drawn only if every vertex is in front of the camera
    /// (`z > 0`), otherwise it is dropped whole.
    Cull,

    /// Faces are clipped against a near plane just in front of the camera,
    /// keeping whatever part of them is visible.
    Clip,
}

impl Default for VisibilityPolicy {
    fn default() -> VisibilityPolicy {
        VisibilityPolicy::Cull
    }
}

impl VisibilityPolicy {
    /// The part of a camera-space polygon that should be drawn.
    ///
    /// Returns `None` when nothing drawable (at least three vertices) is
    /// left.
    ///
    /// ```
    /// # use letter_raster::vector::Vector3;
    /// # use letter_raster::clip::{ ClipVertex, VisibilityPolicy };
    /// let v = |z: f64| ClipVertex::new(
    ///     Vector3::new(z, 1.0, z), Vector3::zero(), Vector3::zero());
    /// let tri = [v(-2.0), v(4.0), v(6.0)];
    ///
    /// assert!(VisibilityPolicy::Cull.apply(&tri).is_none());
    /// assert_eq!(VisibilityPolicy::Clip.apply(&tri).unwrap().len(), 4);
    /// ```
    pub fn apply(&self, vertices: &[ClipVertex]) -> Option<Vec<ClipVertex>> {
        let visible = match self {
            VisibilityPolicy::Cull if fully_in_front(vertices, 0.0) => {
                vertices.to_vec()
            }
            VisibilityPolicy::Cull => return None,
            VisibilityPolicy::Clip => clip_polygon(vertices, NEAR_PLANE_Z),
        };

        if visible.len() >= 3 {
            Some(visible)
        } else {
            None
        }
    }
}

/// A polygon vertex as seen by the clipper.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClipVertex {
    /// Camera-space position.
    pub position: Vector3,
    /// Object-space normal.
    pub normal: Vector3,
    /// Object-space position.
    pub origin: Vector3,
}

impl ClipVertex {
    pub fn new(position: Vector3, normal: Vector3, origin: Vector3)
        -> ClipVertex {
        ClipVertex { position, normal, origin }
    }

    /// The point at parameter `t` along the edge from `self` to `other`,
    /// with every attribute interpolated in lockstep.
    fn lerp(&self, other: &ClipVertex, t: f64) -> ClipVertex {
        ClipVertex {
            position: self.position.lerp(&other.position, t),
            normal: self.normal.lerp(&other.normal, t),
            origin: self.origin.lerp(&other.origin, t),
        }
    }
}

/// Whether every vertex lies strictly in front of the plane `z = plane_z`.
pub fn fully_in_front(vertices: &[ClipVertex], plane_z: f64) -> bool {
    vertices.iter().all(|v| v.position.z > plane_z)
}

/// Clips a convex polygon against the plane `z = plane_z`.
///
/// Vertices are walked in their original order, looking at each edge from
/// the previous vertex to the current one. An edge that crosses the plane
/// contributes its intersection point, found at
/// `t = (plane_z - z_prev) / (z_curr - z_prev)`, with `z` set exactly to
/// `plane_z`. The result may be empty (the polygon is entirely behind the
/// plane) and may have more vertices than the input.
///
/// # Examples
///
/// ```
/// # use letter_raster::vector::Vector3;
/// # use letter_raster::clip::{ ClipVertex, clip_polygon };
/// let v = |x: f64, z: f64| ClipVertex::new(
///     Vector3::new(x, 0.0, z), Vector3::zero(), Vector3::zero());
///
/// // A triangle poking through the plane loses its tip.
/// let clipped = clip_polygon(&[v(0.0, -1.0), v(1.0, 1.0), v(-1.0, 1.0)], 0.0);
/// assert_eq!(clipped.len(), 4);
/// assert!(clipped.iter().all(|c| c.position.z >= 0.0));
/// ```
pub fn clip_polygon(vertices: &[ClipVertex], plane_z: f64) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(vertices.len() + 2);
    let n = vertices.len();

    for i in 0..n {
        let curr = &vertices[i];
        let prev = &vertices[(i + n - 1) % n];
        let curr_in = curr.position.z > plane_z;
        let prev_in = prev.position.z > plane_z;

        if curr_in != prev_in {
            let t = (plane_z - prev.position.z)
                / (curr.position.z - prev.position.z);
            let mut cut = prev.lerp(curr, t);
            cut.position.z = plane_z;
            out.push(cut);
        }

        if curr_in {
            out.push(*curr);
        }
    }

    out
}

#[cfg(test)]
fn vertex(x: f64, y: f64, z: f64) -> ClipVertex {
    ClipVertex::new(
        Vector3::new(x, y, z),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(x, y, z),
    )
}

#[test]
fn polygon_in_front_is_unchanged() {
    let quad = [
        vertex(0.0, 0.0, 5.0),
        vertex(1.0, 0.0, 5.0),
        vertex(1.0, 1.0, 6.0),
        vertex(0.0, 1.0, 6.0),
    ];

    assert!(fully_in_front(&quad, 0.0));
    assert_eq!(clip_polygon(&quad, 0.0), quad.to_vec());
}

#[test]
fn polygon_behind_is_removed() {
    let tri = [
        vertex(0.0, 0.0, -5.0),
        vertex(1.0, 0.0, 0.0),
        vertex(1.0, 1.0, -1.0),
    ];

    assert!(!fully_in_front(&tri, 0.0));
    assert!(clip_polygon(&tri, 0.0).is_empty());
}

#[test]
fn straddling_quad_is_cut_at_plane() {
    // Left half behind the camera, right half in front.
    let quad = [
        vertex(-1.0, 0.0, -1.0),
        vertex(1.0, 0.0, 1.0),
        vertex(1.0, 1.0, 1.0),
        vertex(-1.0, 1.0, -1.0),
    ];

    let clipped = clip_polygon(&quad, 0.0);
    assert_eq!(clipped.len(), 4);

    // Edge 0 -> 1 enters, then 1 and 2 are kept, edge 2 -> 3 leaves.
    assert_eq!(clipped[0].position, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(clipped[1], quad[1]);
    assert_eq!(clipped[2], quad[2]);
    assert_eq!(clipped[3].position, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn attributes_interpolate_in_lockstep() {
    let a = ClipVertex::new(
        Vector3::new(0.0, 0.0, -2.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(10.0, 0.0, 0.0),
    );
    let b = ClipVertex::new(
        Vector3::new(0.0, 4.0, 6.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(10.0, 8.0, 0.0),
    );
    let c = ClipVertex::new(
        Vector3::new(4.0, 0.0, 6.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(18.0, 0.0, 0.0),
    );

    let clipped = clip_polygon(&[a, b, c], 0.0);

    // The closing edge c -> a is cut first, then a -> b, which crosses
    // z = 0 a quarter of the way along.
    assert_eq!(clipped.len(), 4);
    let cut = clipped[1];
    assert_eq!(cut.position, Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(cut.normal, Vector3::new(0.75, 0.25, 0.0));
    assert_eq!(cut.origin, Vector3::new(10.0, 2.0, 0.0));
}

#[test]
fn clips_against_offset_plane() {
    let tri = [
        vertex(0.0, 0.0, 0.5),
        vertex(1.0, 0.0, 3.0),
        vertex(0.0, 1.0, 3.0),
    ];

    let clipped = clip_polygon(&tri, 1.0);
    assert_eq!(clipped.len(), 4);
    assert!(clipped.iter().all(|v| v.position.z >= 1.0));
}

#[test]
fn empty_polygon_stays_empty() {
    assert!(clip_polygon(&[], 0.0).is_empty());
}

#[test]
fn cull_keeps_only_whole_faces() {
    let front = [
        vertex(0.0, 0.0, 0.5),
        vertex(1.0, 0.0, 0.5),
        vertex(1.0, 1.0, 0.5),
    ];
    let touching = [
        vertex(0.0, 0.0, 0.0),
        vertex(1.0, 0.0, 5.0),
        vertex(1.0, 1.0, 5.0),
    ];

    assert_eq!(VisibilityPolicy::Cull.apply(&front), Some(front.to_vec()));
    assert!(VisibilityPolicy::Cull.apply(&touching).is_none());
}

#[test]
fn clip_uses_near_plane() {
    // Entirely in front of the camera but not past the near plane.
    let close = [
        vertex(0.0, 0.0, 0.5),
        vertex(1.0, 0.0, 0.5),
        vertex(1.0, 1.0, 0.5),
    ];
    let touching = [
        vertex(0.0, 0.0, 0.0),
        vertex(1.0, 0.0, 5.0),
        vertex(1.0, 1.0, 5.0),
    ];

    assert!(VisibilityPolicy::Clip.apply(&close).is_none());

    let kept = VisibilityPolicy::Clip.apply(&touching).unwrap();
    assert_eq!(kept.len(), 4);
    assert!(kept.iter().all(|v| v.position.z >= 1.0));
}

#[test]
fn default_policy_culls() {
    assert_eq!(VisibilityPolicy::default(), VisibilityPolicy::Cull);
}
