use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::matrix::{ Axis, Matrix4 };
use crate::vector::Vector3;

/// Which letterform a `Mesh` is built as.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// A "Д": two slanted legs meeting at the top, a long crossbar near the
    /// bottom and two feet hanging under the crossbar ends.
    D,
    /// An "Н": two upright posts joined by a middle bar.
    N,
}

/// A planar, convex polygon with a base color.
///
/// The normal and center are computed once, when the face is constructed.
/// Faces are never edited in place; changing geometry means building new
/// faces.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    /// Vertex positions, in winding order.
    pub vertices: Vec<Vector3>,

    /// Index of each vertex in the owning mesh's vertex list. Empty for faces
    /// built outside a mesh.
    pub indices: Vec<usize>,

    pub color: Color,
    pub normal: Vector3,
    pub center: Vector3,
}

impl Face {
    /// Creates a face that doesn't belong to a mesh.
    pub fn new(vertices: Vec<Vector3>, color: Color) -> Face {
        Face::indexed(vertices, Vec::new(), color)
    }

    fn indexed(vertices: Vec<Vector3>, indices: Vec<usize>, color: Color)
        -> Face {
        let normal = Face::polygon_normal(&vertices);
        let center = Vector3::mean(&vertices);

        Face { vertices, indices, color, normal, center }
    }

    /// Unit normal of a polygon from its first three vertices.
    ///
    /// The normal is `(v1 - v0) x (v2 - v0)`, normalized. Polygons with fewer
    /// than three vertices (and collinear ones) get the zero vector.
    pub fn polygon_normal(vertices: &[Vector3]) -> Vector3 {
        if vertices.len() < 3 {
            return Vector3::zero();
        }

        let e1 = vertices[1] - vertices[0];
        let e2 = vertices[2] - vertices[0];
        e1.cross(&e2).normalize()
    }
}

/// Collects vertices and faces while a letter is being built.
///
/// Vertex positions are deduplicated: a position shared by several bars is
/// stored once, and every face touching it refers to the same index.
struct MeshBuilder {
    vertices: Vec<Vector3>,
    faces: Vec<Face>,
    color: Color,
}

impl MeshBuilder {
    fn new(color: Color) -> MeshBuilder {
        MeshBuilder { vertices: Vec::new(), faces: Vec::new(), color }
    }

    /// Index of `v`, adding it if no stored vertex has exactly its
    /// position. Corners shared by bars are computed the same way, so they
    /// match bit for bit.
    fn vertex_index(&mut self, v: Vector3) -> usize {
        let same = |u: &Vector3| u.x == v.x && u.y == v.y && u.z == v.z;
        if let Some(i) = self.vertices.iter().position(same) {
            return i;
        }

        self.vertices.push(v);
        self.vertices.len() - 1
    }

    fn add_face(&mut self, vertices: Vec<Vector3>) {
        let indices = vertices.iter().map(|v| self.vertex_index(*v)).collect();
        self.faces.push(Face::indexed(vertices, indices, self.color));
    }

    /// Extrudes a quadrilateral bar from its front and back outlines.
    ///
    /// Emits the front and back faces, four side faces and the top and
    /// bottom caps. Side faces are tested against the object-space origin,
    /// not the bar's own center: a side whose normal points away from the
    /// origin is rewound so that it faces the origin.
    fn add_bar(&mut self, front: [Vector3; 4], back: [Vector3; 4]) {
        for v in front.iter().chain(back.iter()) {
            self.vertex_index(*v);
        }

        self.add_face(vec![front[0], front[1], front[2], front[3]]);
        self.add_face(vec![back[0], back[3], back[2], back[1]]);

        for i in 0..4 {
            let next = (i + 1) % 4;
            let mut side = vec![front[i], back[i], back[next], front[next]];

            let normal = Face::polygon_normal(&side);
            let center = Vector3::mean(&side);
            if normal.dot(&-center) < 0.0 {
                side = vec![front[i], front[next], back[next], back[i]];
            }

            self.add_face(side);
        }

        self.add_face(vec![front[0], front[1], back[1], back[0]]);
        self.add_face(vec![front[3], front[2], back[2], back[3]]);
    }

    fn build(self) -> (Vec<Vector3>, Vec<Face>) {
        (self.vertices, self.faces)
    }
}

/// Front (z = -hd) and back (z = +hd) outlines of a bar.
fn extrude(outline: [(f64, f64); 4], hd: f64) -> ([Vector3; 4], [Vector3; 4]) {
    let at = |z: f64| {
        [
            Vector3::new(outline[0].0, outline[0].1, z),
            Vector3::new(outline[1].0, outline[1].1, z),
            Vector3::new(outline[2].0, outline[2].1, z),
            Vector3::new(outline[3].0, outline[3].1, z),
        ]
    };

    (at(-hd), at(hd))
}

fn build_d(b: &mut MeshBuilder, h: f64, w: f64, d: f64, ox: f64) {
    let t = h * 0.1;
    let (hw, hd) = (w / 2.0, d / 2.0);

    // The crossbar sits just above the baseline.
    let crossbar_y = t / 2.0 + 1.0;
    let crossbar_top = crossbar_y + t / 2.0;
    let crossbar_bottom = crossbar_y - t / 2.0;

    let left_x = ox - hw;
    let right_x = ox + hw;

    let left_leg = [
        (left_x, crossbar_top),
        (left_x + t, crossbar_top),
        (ox + t / 2.0, h),
        (ox - t / 2.0, h),
    ];
    let right_leg = [
        (right_x - t, crossbar_top),
        (right_x, crossbar_top),
        (ox + t / 2.0, h),
        (ox - t / 2.0, h),
    ];

    let extension = t * 3.5;
    let bar_left = left_x + t - extension;
    let bar_right = right_x - t + extension;
    let crossbar = [
        (bar_left, crossbar_top),
        (bar_right, crossbar_top),
        (bar_right, crossbar_bottom),
        (bar_left, crossbar_bottom),
    ];

    let foot = h * 0.18;
    let left_foot = [
        (bar_left, crossbar_bottom),
        (bar_left + t, crossbar_bottom),
        (bar_left + t, crossbar_bottom - foot),
        (bar_left, crossbar_bottom - foot),
    ];
    let right_foot = [
        (bar_right - t, crossbar_bottom),
        (bar_right, crossbar_bottom),
        (bar_right, crossbar_bottom - foot),
        (bar_right - t, crossbar_bottom - foot),
    ];

    for outline in [left_leg, right_leg, crossbar, left_foot, right_foot] {
        let (front, back) = extrude(outline, hd);
        b.add_bar(front, back);
    }
}

fn build_n(b: &mut MeshBuilder, h: f64, w: f64, d: f64, ox: f64) {
    let t = h * 0.1;
    let (hw, hd, hh) = (w / 2.0, d / 2.0, h / 2.0);

    let (fl, bl) = extrude([
        (ox - hw, h),
        (ox - hw + t, h),
        (ox - hw + t, 0.0),
        (ox - hw, 0.0),
    ], hd);
    let (fr, br) = extrude([
        (ox + hw - t, h),
        (ox + hw, h),
        (ox + hw, 0.0),
        (ox + hw - t, 0.0),
    ], hd);
    let (fb, bb) = extrude([
        (ox - hw + t, hh + t / 2.0),
        (ox + hw - t, hh + t / 2.0),
        (ox + hw - t, hh - t / 2.0),
        (ox - hw + t, hh - t / 2.0),
    ], hd);

    b.add_bar(fl, bl);
    b.add_bar(fr, br);
    b.add_bar(fb, bb);

    // Junctions between the bar ends and the posts, in both windings.
    b.add_face(vec![fl[1], fb[0], bb[0], bl[1]]);
    b.add_face(vec![bl[1], bb[0], fb[0], fl[1]]);
    b.add_face(vec![fl[2], fb[3], bb[3], bl[2]]);
    b.add_face(vec![bl[2], bb[3], fb[3], fl[2]]);
    b.add_face(vec![fr[0], fb[1], bb[1], br[0]]);
    b.add_face(vec![br[0], bb[1], fb[1], fr[0]]);
    b.add_face(vec![fr[3], fb[2], bb[2], br[3]]);
    b.add_face(vec![br[3], bb[2], fb[2], fr[3]]);
}

/// An extruded letter.
///
/// A mesh owns its object-space geometry (built from `height`, `width`,
/// `depth`, the horizontal offset and the shape) together with a model
/// transform and a uniform scale. Geometry is only ever rebuilt as a whole;
/// rotating and scaling touch nothing but the transform and scale.
///
/// # Examples
///
/// ```
/// # use letter_raster::mesh::{ Mesh, Shape };
/// let d = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);
/// assert!(!d.vertices().is_empty());
/// assert!(d.faces().iter().all(|f| f.vertices.len() >= 3));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    height: f64,
    width: f64,
    depth: f64,
    offset_x: f64,
    shape: Shape,

    vertices: Vec<Vector3>,
    faces: Vec<Face>,

    transform: Matrix4,
    scale: f64,
}

impl Mesh {
    pub fn new(height: f64, width: f64, depth: f64, offset_x: f64,
        shape: Shape) -> Mesh {
        let mut mesh = Mesh {
            height,
            width,
            depth,
            offset_x,
            shape,
            vertices: Vec::new(),
            faces: Vec::new(),
            transform: Mesh::initial_transform(),
            scale: 1.0,
        };

        mesh.rebuild();
        mesh
    }

    /// The transform a freshly built mesh starts with.
    ///
    /// The letters are built upright in a y-up frame; flipping them half a
    /// turn about X makes them face the camera upright on a y-down screen.
    pub fn initial_transform() -> Matrix4 {
        Matrix4::rotation_x(180.0)
    }

    fn rebuild(&mut self) {
        let mut builder = MeshBuilder::new(Color::letter());
        let (h, w, d, ox) = (self.height, self.width, self.depth, self.offset_x);

        match self.shape {
            Shape::D => build_d(&mut builder, h, w, d, ox),
            Shape::N => build_n(&mut builder, h, w, d, ox),
        }

        let (vertices, faces) = builder.build();
        self.vertices = vertices;
        self.faces = faces;
    }

    /// Changes the size parameters and rebuilds the geometry from scratch.
    pub fn set_dimensions(&mut self, height: f64, width: f64, depth: f64) {
        self.height = height;
        self.width = width;
        self.depth = depth;
        self.rebuild();
    }

    /// Rotates the mesh about `axis`, on top of its current orientation.
    pub fn rotate(&mut self, axis: Axis, degrees: f64) {
        self.transform = Matrix4::rotation(axis, degrees) * self.transform;
    }

    /// Replaces the uniform scale factor.
    pub fn set_scale(&mut self, factor: f64) {
        self.scale = factor;
    }

    /// Restores the initial orientation and a scale of `1.0`.
    pub fn reset_transform(&mut self) {
        self.transform = Mesh::initial_transform();
        self.scale = 1.0;
    }

    /// The full object-to-world matrix under a scene-wide object transform.
    pub fn model_matrix(&self, object_transform: &Matrix4) -> Matrix4 {
        *object_transform * self.transform
            * Matrix4::scaling(self.scale, self.scale, self.scale)
    }

    /// Per-vertex normals, parallel to `vertices()`.
    ///
    /// Each is the normalized sum of the normals of every face touching the
    /// vertex; a vertex no face touches gets `(0, 0, 1)`.
    pub fn vertex_normals(&self) -> Vec<Vector3> {
        let mut sums = vec![Vector3::zero(); self.vertices.len()];
        let mut counts = vec![0usize; self.vertices.len()];

        for face in self.faces.iter() {
            for &i in face.indices.iter() {
                sums[i] = sums[i] + face.normal;
                counts[i] += 1;
            }
        }

        sums.into_iter().zip(counts)
            .map(|(sum, count)| if count > 0 {
                sum.normalize()
            } else {
                Vector3::new(0.0, 0.0, 1.0)
            })
            .collect()
    }

    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn transform(&self) -> Matrix4 {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// `(height, width, depth)`.
    pub fn dimensions(&self) -> (f64, f64, f64) {
        (self.height, self.width, self.depth)
    }
}

#[test]
fn face_normal_and_center() {
    let f = Face::new(vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    ], Color::letter());

    assert_eq!(f.normal, Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(f.center, Vector3::new(0.5, 0.5, 0.0));
}

#[test]
fn degenerate_face_has_zero_normal() {
    let f = Face::new(vec![
        Vector3::new(1.0, 2.0, 3.0),
        Vector3::new(4.0, 5.0, 6.0),
    ], Color::letter());

    assert_eq!(f.normal, Vector3::zero());
    assert_eq!(Face::new(Vec::new(), Color::letter()).center, Vector3::zero());
}

#[test]
fn face_normal_invariant_under_scale_and_translation() {
    let base = vec![
        Vector3::new(1.0, 0.5, -2.0),
        Vector3::new(3.0, 1.0, -1.0),
        Vector3::new(2.0, 4.0, 0.5),
    ];
    let n = Face::new(base.clone(), Color::letter()).normal;

    for &k in [0.01, 0.5, 3.0, 250.0].iter() {
        let scaled = base.iter().map(|v| *v * k).collect();
        assert_eq!(Face::new(scaled, Color::letter()).normal, n);
    }

    let offset = Vector3::new(-40.0, 12.5, 300.0);
    let moved = base.iter().map(|v| *v + offset).collect();
    assert_eq!(Face::new(moved, Color::letter()).normal, n);
}

#[test]
fn d_shape_scenario() {
    let d = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);

    // Five bars, eight faces each.
    assert_eq!(d.faces().len(), 40);
    assert!(d.vertices().len() > 0);
    assert!(d.faces().iter().all(|f| f.vertices.len() >= 3));
    assert_eq!(d.transform(), Matrix4::rotation_x(180.0));
    assert_eq!(d.scale(), 1.0);
}

#[test]
fn n_shape_has_bars_and_junctions() {
    let n = Mesh::new(100.0, 60.0, 30.0, 60.0, Shape::N);

    assert_eq!(n.faces().len(), 3 * 8 + 8);
    assert!(n.faces().iter().all(|f| f.vertices.len() == 4));
    assert!(n.faces().iter().all(|f| f.normal.length() > 0.99));
}

#[test]
fn vertices_are_unique() {
    let d = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);
    let vs = d.vertices();

    for i in 0..vs.len() {
        for j in (i + 1)..vs.len() {
            assert!(vs[i] != vs[j]);
        }
    }

    // The legs share their top corners, and each foot shares one outer
    // corner with the crossbar, on both the front and the back.
    assert_eq!(vs.len(), 5 * 8 - 4 - 2 - 2);
}

#[test]
fn tiny_letters_keep_every_vertex() {
    let full = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);
    let tiny = Mesh::new(1e-3, 6e-4, 3e-4, 0.0, Shape::D);

    // Corners closer together than the float tolerance stay apart.
    assert_eq!(tiny.vertices().len(), full.vertices().len());
    assert_eq!(tiny.faces().len(), full.faces().len());
}

#[test]
fn face_indices_point_at_their_vertices() {
    let n = Mesh::new(80.0, 50.0, 20.0, 10.0, Shape::N);

    for f in n.faces() {
        assert_eq!(f.indices.len(), f.vertices.len());
        for (v, &i) in f.vertices.iter().zip(f.indices.iter()) {
            assert_eq!(n.vertices()[i], *v);
        }
    }
}

#[test]
fn side_faces_pass_the_orientation_check() {
    let mut b = MeshBuilder::new(Color::letter());
    let (front, back) = extrude([
        (10.0, 20.0), (30.0, 20.0), (30.0, 5.0), (10.0, 5.0)
    ], 4.0);
    b.add_bar(front, back);
    let (_, faces) = b.build();

    assert_eq!(faces.len(), 8);
    for side in &faces[2..6] {
        assert!(side.normal.dot(&-side.center) >= 0.0);
    }
}

#[test]
fn rebuild_is_idempotent() {
    let mut d = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);
    let before = d.clone();

    d.set_dimensions(100.0, 60.0, 30.0);
    assert_eq!(d, before);

    d.set_dimensions(150.0, 60.0, 30.0);
    assert!(d.vertices() != before.vertices());
    assert_eq!(d.dimensions(), (150.0, 60.0, 30.0));
}

#[test]
fn rotate_then_unrotate_restores_transform() {
    let mut m = Mesh::new(100.0, 60.0, 30.0, 60.0, Shape::N);
    let original = m.transform();

    for &axis in [Axis::X, Axis::Y, Axis::Z].iter() {
        for &deg in [10.0, -35.0, 90.0, 181.0].iter() {
            m.rotate(axis, deg);
            m.rotate(axis, -deg);
            assert_eq!(m.transform(), original);
        }
    }
}

#[test]
fn rotation_and_scale_leave_geometry_alone() {
    let mut m = Mesh::new(100.0, 60.0, 30.0, 60.0, Shape::N);
    let vertices = m.vertices().to_vec();

    m.rotate(Axis::Y, 30.0);
    m.set_scale(1.7);
    assert_eq!(m.vertices(), &vertices[..]);
    assert_eq!(m.scale(), 1.7);

    m.reset_transform();
    assert_eq!(m.transform(), Mesh::initial_transform());
    assert_eq!(m.scale(), 1.0);
}

#[test]
fn vertex_normals_are_unit() {
    let d = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);
    let normals = d.vertex_normals();

    assert_eq!(normals.len(), d.vertices().len());
    for n in normals {
        assert!(crate::feq(n.length(), 1.0));
    }
}
