use serde::{ Serialize, Deserialize };
use tracing::debug;

use crate::camera::{ Camera, Viewport };
use crate::canvas::Canvas;
use crate::clip::VisibilityPolicy;
use crate::color::Color;
use crate::consts::{ BASE_SCALE, DEFAULT_DEPTH, DEFAULT_HEIGHT, DEFAULT_WIDTH,
    D_OFFSET_X, N_OFFSET_X };
use crate::light::Light;
use crate::matrix::{ Axis, Matrix4 };
use crate::mesh::{ Mesh, Shape };
use crate::render::{ compose, project_mesh, Frame, RenderCache };
use crate::shading::ShadingMode;
use crate::vector::Vector3;

/// Selects one of the two letters in a `Scene`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Letter {
    D,
    N,
}

/// Everything that goes into a picture of the two letters.
///
/// A scene owns both meshes, the camera, the mirroring applied to every
/// object, the light and the drawing options. Frames are built on demand and
/// cached; every setter that changes what a frame would show throws the
/// cached frame away.
///
/// # Examples
///
/// ```
/// # use letter_raster::scene::{ Scene, Letter };
/// # use letter_raster::matrix::Axis;
/// let mut scene = Scene::new();
/// let faces = scene.render_frame(800.0, 600.0).polygons.len();
///
/// scene.rotate(Letter::D, Axis::Y, 30.0);
/// assert!(!scene.has_fresh_frame(800.0, 600.0));
/// assert_eq!(scene.render_frame(800.0, 600.0).polygons.len(), faces);
/// ```
#[derive(Clone, Debug)]
pub struct Scene {
    d: Mesh,
    n: Mesh,
    camera: Camera,

    /// Mirroring per axis, and the object transform derived from it.
    mirror: [bool; 3],
    object_transform: Matrix4,

    light: Light,
    shading: ShadingMode,
    visibility: VisibilityPolicy,

    /// Whether the view scale follows the viewport size.
    auto_scale: bool,
    base_scale: f64,

    cache: RenderCache,
}

impl Default for Scene {
    fn default() -> Scene {
        Scene::new()
    }
}

impl Scene {
    /// The default scene: both letters side by side, facing the camera.
    pub fn new() -> Scene {
        Scene {
            d: Mesh::new(DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_DEPTH,
                D_OFFSET_X, Shape::D),
            n: Mesh::new(DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_DEPTH,
                N_OFFSET_X, Shape::N),
            camera: Camera::default(),
            mirror: [false; 3],
            object_transform: Matrix4::identity(),
            light: Light::default(),
            shading: ShadingMode::default(),
            visibility: VisibilityPolicy::default(),
            auto_scale: true,
            base_scale: BASE_SCALE,
            cache: RenderCache::new(),
        }
    }

    pub fn mesh(&self, which: Letter) -> &Mesh {
        match which {
            Letter::D => &self.d,
            Letter::N => &self.n,
        }
    }

    fn mesh_mut(&mut self, which: Letter) -> &mut Mesh {
        match which {
            Letter::D => &mut self.d,
            Letter::N => &mut self.n,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn shading_mode(&self) -> ShadingMode {
        self.shading
    }

    pub fn visibility(&self) -> VisibilityPolicy {
        self.visibility
    }

    pub fn mirror(&self) -> [bool; 3] {
        self.mirror
    }

    pub fn object_transform(&self) -> Matrix4 {
        self.object_transform
    }

    /// Rotates one letter about `axis`, on top of its current orientation.
    pub fn rotate(&mut self, which: Letter, axis: Axis, degrees: f64) {
        self.mesh_mut(which).rotate(axis, degrees);
        self.cache.invalidate();
    }

    /// Sets one letter's uniform scale.
    pub fn set_scale(&mut self, which: Letter, factor: f64) {
        self.mesh_mut(which).set_scale(factor);
        self.cache.invalidate();
    }

    /// Resizes one letter, rebuilding its geometry.
    pub fn set_dimensions(&mut self, which: Letter, height: f64, width: f64,
        depth: f64) {
        self.mesh_mut(which).set_dimensions(height, width, depth);
        self.cache.invalidate();
    }

    /// Replaces the camera's Euler angles, in degrees.
    pub fn set_camera_rotation(&mut self, rotation: [f64; 3]) {
        self.camera.rotation = rotation;
        self.cache.invalidate();
    }

    /// Turns the camera further about one axis.
    pub fn rotate_camera(&mut self, axis: Axis, degrees: f64) {
        self.camera.rotate(axis, degrees);
        self.cache.invalidate();
    }

    pub fn set_camera_position(&mut self, position: Vector3) {
        self.camera.position = position;
        self.cache.invalidate();
    }

    /// Toggles mirroring across one axis.
    ///
    /// The object transform is rebuilt from the three flags, so mirroring an
    /// axis twice restores it.
    pub fn set_mirror(&mut self, axis: Axis) {
        let flag = &mut self.mirror[axis.index()];
        *flag = !*flag;

        let sign = |mirrored: bool| if mirrored { -1.0 } else { 1.0 };
        self.object_transform = Matrix4::scaling(sign(self.mirror[0]),
            sign(self.mirror[1]), sign(self.mirror[2]));
        self.cache.invalidate();
    }

    /// Points the light along `direction`, which is normalized.
    pub fn set_light_direction(&mut self, direction: Vector3) {
        self.light = Light::new(direction);
        self.cache.invalidate();
    }

    /// Points the light using one of the lighting sliders.
    pub fn set_light_from_slider(&mut self, axis: Axis, degrees: f64) {
        self.light = Light::from_slider(axis, degrees);
        self.cache.invalidate();
    }

    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        self.shading = mode;
        self.cache.invalidate();
    }

    pub fn set_visibility(&mut self, policy: VisibilityPolicy) {
        self.visibility = policy;
        self.cache.invalidate();
    }

    /// Chooses between a view scale that follows the viewport size and a
    /// fixed `base_scale`.
    pub fn set_view_scale(&mut self, auto_scale: bool, base_scale: f64) {
        self.auto_scale = auto_scale;
        self.base_scale = base_scale;
        self.cache.invalidate();
    }

    /// Restores the camera, both letters' orientation and scale, the
    /// mirroring, the base view scale and the light. Letter sizes, drawing
    /// options and whether the view scale follows the image are kept.
    pub fn reset(&mut self) {
        self.camera = Camera::default();
        self.d.reset_transform();
        self.n.reset_transform();
        self.mirror = [false; 3];
        self.object_transform = Matrix4::identity();
        self.base_scale = BASE_SCALE;
        self.light = Light::default();
        self.cache.invalidate();
    }

    /// The viewport a `width` by `height` frame is projected into.
    pub fn viewport(&self, width: f64, height: f64) -> Viewport {
        if self.auto_scale {
            Viewport::auto_scaled(width, height)
        } else {
            Viewport::new(width, height, self.base_scale)
        }
    }

    /// Whether `render_frame` would reuse its cached frame at this size.
    pub fn has_fresh_frame(&self, width: f64, height: f64) -> bool {
        self.cache.is_fresh(&self.viewport(width, height))
    }

    /// The frame for a `width` by `height` view, rebuilt only if something
    /// changed since it was last built.
    pub fn render_frame(&mut self, width: f64, height: f64) -> &Frame {
        let viewport = self.viewport(width, height);
        if self.cache.is_fresh(&viewport) {
            return self.cache.frame();
        }

        debug!("Rebuilding {}x{} frame ({:?}, {:?})", width, height,
            self.shading, self.visibility);

        let mut faces = Vec::new();
        for mesh in [&self.d, &self.n].iter() {
            faces.extend(project_mesh(mesh, &self.object_transform,
                &self.camera, &self.light, &viewport, self.visibility));
        }

        // The marker sits in world space, outside the mirroring.
        let marker = viewport.project(self.camera.transform()
            * self.light.position());

        let frame = compose(faces, self.shading, self.light.direction(), marker);
        self.cache.store(viewport, frame)
    }

    /// Paints the current frame over the whole canvas.
    pub fn paint(&mut self, canvas: &mut Canvas) {
        let frame = self.render_frame(canvas.width as f64, canvas.height as f64);

        canvas.clear(&Color::background());
        for polygon in frame.polygons.iter() {
            canvas.fill_polygon(&polygon.points, &polygon.fill);
        }

        if let Some(marker) = frame.light_marker {
            canvas.draw_light_marker(marker, &Color::light_marker());
        }
    }
}

#[test]
fn default_scene_shows_both_letters() {
    let mut scene = Scene::new();
    let total = scene.mesh(Letter::D).faces().len()
        + scene.mesh(Letter::N).faces().len();

    let frame = scene.render_frame(800.0, 600.0);
    assert_eq!(frame.polygons.len(), total);
    assert!(frame.light_marker.is_some());
}

#[test]
fn frame_is_cached_until_something_changes() {
    let mut scene = Scene::new();
    assert!(!scene.has_fresh_frame(800.0, 600.0));

    scene.render_frame(800.0, 600.0);
    assert!(scene.has_fresh_frame(800.0, 600.0));
    // A different viewport needs its own frame.
    assert!(!scene.has_fresh_frame(640.0, 480.0));

    let changes: &[fn(&mut Scene)] = &[
        |s| s.rotate(Letter::N, Axis::X, 10.0),
        |s| s.set_scale(Letter::D, 1.5),
        |s| s.set_dimensions(Letter::D, 120.0, 60.0, 30.0),
        |s| s.set_camera_rotation([5.0, 0.0, 0.0]),
        |s| s.rotate_camera(Axis::Z, 10.0),
        |s| s.set_camera_position(Vector3::new(0.0, 0.0, -500.0)),
        |s| s.set_mirror(Axis::Y),
        |s| s.set_light_direction(Vector3::new(0.0, 0.0, -1.0)),
        |s| s.set_light_from_slider(Axis::X, 45.0),
        |s| s.set_shading_mode(ShadingMode::Gouraud),
        |s| s.set_visibility(VisibilityPolicy::Clip),
        |s| s.set_view_scale(false, 3.0),
        |s| s.reset(),
    ];

    for change in changes.iter() {
        scene.render_frame(800.0, 600.0);
        change(&mut scene);
        assert!(!scene.has_fresh_frame(800.0, 600.0));
    }
}

#[test]
fn rebuilt_frame_reflects_change() {
    let mut scene = Scene::new();
    scene.render_frame(800.0, 600.0);

    scene.set_shading_mode(ShadingMode::Gouraud);
    let frame = scene.render_frame(800.0, 600.0);

    assert!(frame.polygons.iter().all(|p| matches!(p.fill,
        crate::shading::FillSpec::Linear { .. })));
}

#[test]
fn mirroring_twice_restores_identity() {
    let mut scene = Scene::new();

    scene.set_mirror(Axis::X);
    assert_eq!(scene.mirror(), [true, false, false]);
    assert_eq!(scene.object_transform(), Matrix4::scaling(-1.0, 1.0, 1.0));

    scene.set_mirror(Axis::Z);
    assert_eq!(scene.object_transform(), Matrix4::scaling(-1.0, 1.0, -1.0));

    scene.set_mirror(Axis::X);
    scene.set_mirror(Axis::Z);
    assert_eq!(scene.object_transform(), Matrix4::identity());
}

#[test]
fn monotone_floors_faces_turned_from_light() {
    use crate::shading::FillSpec;

    let mut scene = Scene::new();
    scene.set_shading_mode(ShadingMode::Monotone);
    scene.set_light_direction(Vector3::new(0.0, 0.0, -1.0));

    let frame = scene.render_frame(800.0, 600.0);
    let solid = |c: Color| FillSpec::Solid { color: c };

    // Front and back caps have normals along +Z and -Z.
    assert!(frame.polygons.iter().any(|p| p.fill == solid(Color::letter() * 0.3)));
    assert!(frame.polygons.iter().any(|p| p.fill == solid(Color::letter())));
    for polygon in frame.polygons.iter() {
        match polygon.fill {
            FillSpec::Solid { color } => assert!(color.r >= 0.3 - 1e-9),
            ref other => panic!("expected a solid fill, got {:?}", other),
        }
    }
}

#[test]
fn nothing_behind_the_camera_is_drawn() {
    let mut scene = Scene::new();
    // Looking away from the letters and the light.
    scene.set_camera_position(Vector3::new(0.0, 0.0, 400.0));

    let frame = scene.render_frame(800.0, 600.0);
    assert!(frame.polygons.is_empty());
    assert!(frame.light_marker.is_none());
}

#[test]
fn reset_restores_defaults() {
    let mut scene = Scene::new();
    let fresh = scene.clone();

    scene.rotate(Letter::D, Axis::Y, 40.0);
    scene.set_scale(Letter::N, 0.5);
    scene.rotate_camera(Axis::X, 15.0);
    scene.set_mirror(Axis::Y);
    scene.set_light_direction(Vector3::new(1.0, 0.0, 0.0));
    scene.set_view_scale(false, 3.0);
    scene.set_shading_mode(ShadingMode::Monotone);
    scene.reset();

    assert_eq!(scene.mesh(Letter::D), fresh.mesh(Letter::D));
    assert_eq!(scene.mesh(Letter::N), fresh.mesh(Letter::N));
    assert_eq!(scene.camera(), fresh.camera());
    assert_eq!(scene.mirror(), [false; 3]);
    assert_eq!(scene.object_transform(), Matrix4::identity());
    assert_eq!(scene.light(), fresh.light());
    // The fixed scale goes back to its base value but stays fixed.
    assert_eq!(scene.viewport(800.0, 600.0), Viewport::fixed(800.0, 600.0));
    // Drawing options survive a reset.
    assert_eq!(scene.shading_mode(), ShadingMode::Monotone);
}

#[test]
fn view_scale_follows_image_size_by_default() {
    let mut scene = Scene::new();
    assert_eq!(scene.viewport(800.0, 600.0).scale, 1.0);
    assert_eq!(scene.viewport(1200.0, 1200.0).scale, 2.0);

    scene.set_view_scale(false, 1.5);
    assert_eq!(scene.viewport(800.0, 600.0).scale, 1.5);
    assert_eq!(scene.viewport(1200.0, 1200.0).scale, 1.5);

    scene.reset();
    assert_eq!(scene.viewport(800.0, 600.0).scale, BASE_SCALE);
}

#[test]
fn paint_clears_and_draws() {
    let mut scene = Scene::new();
    scene.set_view_scale(false, BASE_SCALE);
    let mut canvas = Canvas::new(160, 120);
    scene.paint(&mut canvas);

    // Below both letters.
    assert_eq!(canvas.read_pixel(80, 110).unwrap(), Color::background());
    assert_eq!(canvas.read_pixel(159, 119).unwrap(), Color::background());
    // On the crossbar of the D.
    assert_ne!(canvas.read_pixel(12, 51).unwrap(), Color::background());
}
