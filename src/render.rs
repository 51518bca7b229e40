//! Turning meshes into an ordered list of filled screen polygons.
//!
//! There is no depth buffer: faces are sorted far to near and painted in
//! that order, so nearer faces cover farther ones.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::camera::{ Camera, Point2, Viewport };
use crate::clip::{ ClipVertex, VisibilityPolicy };
use crate::color::Color;
use crate::light::{ vertex_intensity, Light };
use crate::matrix::Matrix4;
use crate::mesh::Mesh;
use crate::shading::{ fill_for, FillSpec, ShadingMode };
use crate::vector::Vector3;

/// A visible face after projection, before it is given a fill.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedFace {
    /// Mean camera-space depth of the (possibly clipped) vertices.
    pub depth: f64,
    pub points: Vec<Point2>,
    pub intensities: Vec<f64>,

    /// The object-space normal of the source face.
    pub normal: Vector3,
    pub color: Color,
}

/// One polygon of a frame, ready to paint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrawPolygon {
    pub points: Vec<Point2>,
    pub fill: FillSpec,
}

/// Everything needed to paint one image, in painting order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Frame {
    pub polygons: Vec<DrawPolygon>,

    /// Where the light source is drawn, if it is in front of the camera.
    pub light_marker: Option<Point2>,
}

/// Projects every visible face of a mesh.
///
/// Vertices go through the mesh's model matrix (under `object_transform`)
/// and then the camera. Faces are kept, dropped or cut according to
/// `policy`. Each kept vertex is lit with its object-space normal against
/// the light direction carried back into object space.
pub fn project_mesh(mesh: &Mesh, object_transform: &Matrix4, camera: &Camera,
    light: &Light, viewport: &Viewport, policy: VisibilityPolicy)
    -> Vec<ProjectedFace> {
    let model = mesh.model_matrix(object_transform);
    let to_camera = camera.transform() * model;
    let light_dir = (model.inverse_rotation() * light.direction()).normalize();

    let normals = mesh.vertex_normals();
    let in_camera: Vec<Vector3> = mesh.vertices().iter()
        .map(|v| to_camera * *v)
        .collect();

    let mut projected = Vec::with_capacity(mesh.faces().len());

    for face in mesh.faces().iter() {
        let vertices: Vec<ClipVertex> = face.indices.iter()
            .map(|&i| ClipVertex::new(in_camera[i], normals[i],
                mesh.vertices()[i]))
            .collect();

        let visible = match policy.apply(&vertices) {
            Some(visible) => visible,
            None => continue,
        };

        let points: Option<Vec<Point2>> = visible.iter()
            .map(|v| viewport.project(v.position))
            .collect();
        let points = match points {
            Some(points) => points,
            None => continue,
        };

        let intensities = visible.iter()
            .map(|v| vertex_intensity(v.normal.normalize(), light_dir,
                model * v.origin, camera.position))
            .collect();

        let depth = visible.iter().map(|v| v.position.z).sum::<f64>()
            / visible.len() as f64;

        projected.push(ProjectedFace {
            depth,
            points,
            intensities,
            normal: face.normal,
            color: face.color,
        });
    }

    debug!("{:?}: {} of {} faces visible", mesh.shape(), projected.len(),
        mesh.faces().len());

    projected
}

/// Sorts projected faces far to near and gives each its fill.
///
/// The sort is stable, so faces at equal depth keep the order they were
/// projected in.
pub fn compose(mut faces: Vec<ProjectedFace>, mode: ShadingMode,
    light_dir: Vector3, light_marker: Option<Point2>) -> Frame {
    faces.sort_by(|a, b| b.depth.partial_cmp(&a.depth)
        .unwrap_or(Ordering::Equal));

    let polygons = faces.into_iter()
        .map(|face| {
            let fill = fill_for(mode, face.color, face.normal, light_dir,
                &face.points, &face.intensities);
            DrawPolygon { points: face.points, fill }
        })
        .collect();

    Frame { polygons, light_marker }
}

/// The most recently built frame and the viewport it was built for.
///
/// Anything that changes what a frame would contain must `invalidate()` the
/// cache; a different viewport makes it stale on its own.
#[derive(Clone, Debug, Default)]
pub struct RenderCache {
    valid: bool,
    viewport: Option<Viewport>,
    frame: Frame,
}

impl RenderCache {
    pub fn new() -> RenderCache {
        Default::default()
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Whether the stored frame can be reused for `viewport`.
    pub fn is_fresh(&self, viewport: &Viewport) -> bool {
        self.valid && self.viewport.as_ref() == Some(viewport)
    }

    /// Replaces the stored frame and marks it valid.
    pub fn store(&mut self, viewport: Viewport, frame: Frame) -> &Frame {
        self.valid = true;
        self.viewport = Some(viewport);
        self.frame = frame;

        &self.frame
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

#[cfg(test)]
fn face_at(depth: f64) -> ProjectedFace {
    ProjectedFace {
        depth,
        points: vec![
            Point2::new(0.0, 0.0),
            Point2::new(depth, 0.0),
            Point2::new(depth, depth),
        ],
        intensities: vec![0.5; 3],
        normal: Vector3::new(0.0, 0.0, -1.0),
        color: Color::letter(),
    }
}

#[test]
fn compose_paints_far_to_near() {
    let faces = vec![face_at(2.0), face_at(7.0), face_at(4.0)];
    let frame = compose(faces, ShadingMode::Phong, Vector3::new(0.0, 0.0, -1.0),
        None);

    let order: Vec<f64> = frame.polygons.iter().map(|p| p.points[1].x).collect();
    assert_eq!(order, vec![7.0, 4.0, 2.0]);
}

#[test]
fn compose_keeps_order_of_equal_depths() {
    let mut first = face_at(3.0);
    first.color = Color::white();
    let second = face_at(3.0);

    let frame = compose(vec![first, second], ShadingMode::Monotone,
        Vector3::new(0.0, 0.0, -1.0), None);

    assert_eq!(frame.polygons[0].fill, FillSpec::Solid { color: Color::white() });
    assert_eq!(frame.polygons[1].fill, FillSpec::Solid { color: Color::letter() });
}

#[test]
fn default_view_sees_every_face() {
    use crate::consts::{ DEFAULT_DEPTH, DEFAULT_HEIGHT, DEFAULT_WIDTH };
    use crate::mesh::Shape;

    let mesh = Mesh::new(DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_DEPTH, -60.0,
        Shape::D);
    let faces = project_mesh(&mesh, &Matrix4::identity(), &Camera::default(),
        &Light::default(), &Viewport::fixed(800.0, 600.0),
        VisibilityPolicy::Cull);

    // The whole letter is well in front of the default camera.
    assert_eq!(faces.len(), mesh.faces().len());
    for face in faces.iter() {
        assert!(face.depth > 0.0);
        assert_eq!(face.points.len(), face.intensities.len());
        assert!(face.intensities.iter().all(|&i| i >= 0.3 && i <= 1.0));
    }
}

#[test]
fn mesh_behind_camera_is_absent() {
    use crate::mesh::Shape;

    let mesh = Mesh::new(100.0, 60.0, 30.0, 60.0, Shape::N);
    let camera = Camera::new(Vector3::new(0.0, 0.0, 400.0), [0.0, 0.0, 0.0]);

    for policy in [VisibilityPolicy::Cull, VisibilityPolicy::Clip].iter() {
        let faces = project_mesh(&mesh, &Matrix4::identity(), &camera,
            &Light::default(), &Viewport::fixed(800.0, 600.0), *policy);
        assert!(faces.is_empty());
    }
}

#[test]
fn straddling_mesh_clips_instead_of_culling() {
    use crate::mesh::Shape;

    // The camera sits inside the letter's depth.
    let mesh = Mesh::new(100.0, 60.0, 30.0, 0.0, Shape::N);
    let camera = Camera::new(Vector3::new(0.0, 50.0, 0.0), [0.0, 0.0, 0.0]);
    let view = Viewport::fixed(800.0, 600.0);

    let culled = project_mesh(&mesh, &Matrix4::identity(), &camera,
        &Light::default(), &view, VisibilityPolicy::Cull);
    let clipped = project_mesh(&mesh, &Matrix4::identity(), &camera,
        &Light::default(), &view, VisibilityPolicy::Clip);

    assert!(clipped.len() > culled.len());
    assert!(clipped.iter().all(|f| f.points.iter()
        .all(|p| p.x.is_finite() && p.y.is_finite())));
}

#[test]
fn lighting_turns_with_the_letter() {
    use crate::consts::AMBIENT_STRENGTH;
    use crate::matrix::Axis;
    use crate::mesh::Shape;

    let facing = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);
    let mut turned = facing.clone();
    turned.rotate(Axis::Y, 180.0);

    // Light from the camera's side, along -z.
    let light = Light::new(Vector3::new(0.0, 0.0, -1.0));
    let project = |mesh: &Mesh| project_mesh(mesh, &Matrix4::identity(),
        &Camera::default(), &light, &Viewport::fixed(800.0, 600.0),
        VisibilityPolicy::Cull);
    let (before, after) = (project(&facing), project(&turned));

    assert_eq!(before.len(), facing.faces().len());
    assert_eq!(after.len(), before.len());

    // Half a turn swaps which caps face the light: every lit vertex goes
    // dark and every dark one is lit.
    for (a, b) in before.iter().zip(after.iter()) {
        for (&ia, &ib) in a.intensities.iter().zip(b.intensities.iter()) {
            let (lit, dark) = if ia > ib { (ia, ib) } else { (ib, ia) };
            assert!(crate::feq(dark, AMBIENT_STRENGTH));
            assert!(lit > AMBIENT_STRENGTH + 0.1);
        }
    }
}

#[test]
fn highlight_depends_on_world_position() {
    use crate::mesh::Shape;

    let mesh = Mesh::new(100.0, 60.0, 30.0, -60.0, Shape::D);
    let camera = Camera::default();
    let view = Viewport::fixed(800.0, 600.0);
    let normals = mesh.vertex_normals();

    // A vertex whose normal leans towards +z, and a direction at right
    // angles to that normal which also leans towards +z.
    let i = (0..normals.len())
        .filter(|&j| normals[j].z > 0.0)
        .min_by(|&a, &b| normals[a].z.partial_cmp(&normals[b].z).unwrap())
        .unwrap();
    let n = normals[i];
    let across = (Vector3::new(0.0, 0.0, 1.0) - n * n.z).normalize();

    // Once carried into object space, the light lies along the normal.
    let rotation = mesh.transform();
    let light = Light::new(rotation * n);

    let (face, k) = mesh.faces().iter().enumerate()
        .find_map(|(f, face)| face.indices.iter().position(|&j| j == i)
            .map(|k| (f, k)))
        .unwrap();

    // Moves the whole letter so vertex `i` ends up at `camera + offset`.
    let intensity_at = |offset: Vector3| {
        let to = camera.position + offset - rotation * mesh.vertices()[i];
        let placed = Matrix4::translation(to.x, to.y, to.z);
        let faces = project_mesh(&mesh, &placed, &camera, &light, &view,
            VisibilityPolicy::Cull);

        assert_eq!(faces.len(), mesh.faces().len());
        faces[face].intensities[k]
    };

    // Seen straight down the reflection the highlight saturates; seen
    // side-on only ambient and diffuse remain.
    assert!(crate::feq(intensity_at(n * 2000.0), 1.0));
    assert!(crate::feq(intensity_at(across * 2000.0), 0.9));
}

#[test]
fn cache_tracks_validity_and_viewport() {
    let mut cache = RenderCache::new();
    let view = Viewport::fixed(800.0, 600.0);
    assert!(!cache.is_fresh(&view));

    cache.store(view, Frame::default());
    assert!(cache.is_fresh(&view));
    assert!(!cache.is_fresh(&Viewport::fixed(640.0, 480.0)));

    cache.invalidate();
    assert!(!cache.is_fresh(&view));
}
