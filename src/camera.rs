use serde::{ Serialize, Deserialize };

use crate::feq;
use crate::consts::{ AUTO_SCALE_REFERENCE, BASE_SCALE, CAMERA_DISTANCE,
    FOCAL_LENGTH };
use crate::matrix::{ Axis, Matrix4 };
use crate::vector::Vector3;

/// A point on the screen, in pixels from the top-left corner.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl PartialEq for Point2 {
    fn eq(&self, other: &Point2) -> bool {
        feq(self.x, other.x) && feq(self.y, other.y)
    }
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Point2 {
        Point2 { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// The mean of a set of points; the origin for an empty set.
    pub fn centroid(points: &[Point2]) -> Point2 {
        if points.is_empty() {
            return Point2::default();
        }

        let n = points.len() as f64;
        let (sx, sy) = points.iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));

        Point2::new(sx / n, sy / n)
    }
}

/// The viewer.
///
/// The camera sits at `position` and is turned by three Euler angles (in
/// degrees), applied as X, then Y, then Z. Everything in the world is mapped
/// into camera space by `transform()`, where the camera looks down +Z.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vector3,
    pub rotation: [f64; 3],
}

impl Default for Camera {
    fn default() -> Camera {
        Camera {
            position: Vector3::new(0.0, 0.0, -CAMERA_DISTANCE),
            rotation: [0.0, 0.0, 0.0],
        }
    }
}

impl Camera {
    pub fn new(position: Vector3, rotation: [f64; 3]) -> Camera {
        Camera { position, rotation }
    }

    /// Adds `degrees` to the rotation about one axis.
    pub fn rotate(&mut self, axis: Axis, degrees: f64) {
        self.rotation[axis.index()] += degrees;
    }

    /// The world-to-camera matrix.
    ///
    /// ```
    /// # use letter_raster::camera::Camera;
    /// # use letter_raster::vector::Vector3;
    /// let camera = Camera::default();
    /// let origin = camera.transform() * Vector3::zero();
    /// assert_eq!(origin, Vector3::new(0.0, 0.0, 400.0));
    /// ```
    pub fn transform(&self) -> Matrix4 {
        let [rx, ry, rz] = self.rotation;
        let p = self.position;

        Matrix4::rotation_x(rx) * Matrix4::rotation_y(ry) * Matrix4::rotation_z(rz)
            * Matrix4::translation(-p.x, -p.y, -p.z)
    }
}

/// The pixel surface a frame is projected onto.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,

    /// Overall zoom applied on top of the perspective divide.
    pub scale: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scale: f64) -> Viewport {
        Viewport { width, height, scale }
    }

    /// A viewport whose scale follows its size, so a 600 pixel square view
    /// has a scale of 1.
    pub fn auto_scaled(width: f64, height: f64) -> Viewport {
        Viewport::new(width, height, Viewport::auto_scale(width, height))
    }

    /// A viewport at the fixed default scale.
    pub fn fixed(width: f64, height: f64) -> Viewport {
        Viewport::new(width, height, BASE_SCALE)
    }

    pub fn auto_scale(width: f64, height: f64) -> f64 {
        width.min(height) / AUTO_SCALE_REFERENCE
    }

    /// Projects a camera-space point to the screen.
    ///
    /// Points on or behind the camera plane (`z <= 0`) have no projection.
    /// The longer side of the viewport is squeezed by the aspect ratio so
    /// the letters keep their proportions.
    ///
    /// # Examples
    ///
    /// ```
    /// # use letter_raster::camera::{ Point2, Viewport };
    /// # use letter_raster::vector::Vector3;
    /// let view = Viewport::new(600.0, 600.0, 1.0);
    ///
    /// let p = view.project(Vector3::new(100.0, 0.0, 300.0)).unwrap();
    /// assert_eq!(p, Point2::new(400.0, 300.0));
    /// assert!(view.project(Vector3::new(0.0, 0.0, -1.0)).is_none());
    /// ```
    pub fn project(&self, point: Vector3) -> Option<Point2> {
        if point.z <= 0.0 {
            return None;
        }

        let factor = FOCAL_LENGTH / point.z;
        let aspect = self.width / self.height;
        let (ax, ay) = if aspect > 1.0 {
            (1.0 / aspect, 1.0)
        } else {
            (1.0, aspect)
        };

        Some(Point2::new(
            point.x * factor * self.scale * ax + self.width / 2.0,
            point.y * factor * self.scale * ay + self.height / 2.0,
        ))
    }
}

#[test]
fn default_camera_sees_origin() {
    let camera = Camera::default();
    let view = Viewport::fixed(800.0, 600.0);

    let p = camera.transform() * Vector3::zero();
    assert!(feq(p.z, 400.0));

    let screen = view.project(p).unwrap();
    assert!(screen.x.is_finite() && screen.y.is_finite());
    assert_eq!(screen, Point2::new(400.0, 300.0));
}

#[test]
fn camera_translates_before_rotating() {
    let camera = Camera::new(Vector3::new(0.0, 0.0, -10.0), [0.0, 90.0, 0.0]);
    let p = camera.transform() * Vector3::zero();

    // The origin is 10 ahead of the camera, then swung about Y.
    assert_eq!(p, Vector3::new(10.0, 0.0, 0.0));
}

#[test]
fn rotate_accumulates_per_axis() {
    let mut camera = Camera::default();
    camera.rotate(Axis::Y, 15.0);
    camera.rotate(Axis::Y, 15.0);
    camera.rotate(Axis::Z, -5.0);

    assert_eq!(camera.rotation, [0.0, 30.0, -5.0]);
}

#[test]
fn wide_viewport_squeezes_x() {
    let view = Viewport::new(800.0, 400.0, 1.0);
    let p = view.project(Vector3::new(100.0, 100.0, 300.0)).unwrap();

    assert_eq!(p, Point2::new(450.0, 300.0));
}

#[test]
fn tall_viewport_squeezes_y() {
    let view = Viewport::new(400.0, 800.0, 1.0);
    let p = view.project(Vector3::new(100.0, 100.0, 300.0)).unwrap();

    assert_eq!(p, Point2::new(300.0, 450.0));
}

#[test]
fn camera_plane_has_no_projection() {
    let view = Viewport::fixed(800.0, 600.0);

    assert!(view.project(Vector3::new(1.0, 1.0, 0.0)).is_none());
}

#[test]
fn auto_scale_follows_short_side() {
    assert_eq!(Viewport::auto_scaled(1200.0, 600.0).scale, 1.0);
    assert_eq!(Viewport::auto_scaled(300.0, 900.0).scale, 0.5);
}

#[test]
fn centroid_of_points() {
    let pts = [Point2::new(0.0, 0.0), Point2::new(4.0, 0.0), Point2::new(4.0, 2.0),
        Point2::new(0.0, 2.0)];

    assert_eq!(Point2::centroid(&pts), Point2::new(2.0, 1.0));
    assert_eq!(Point2::centroid(&[]), Point2::default());
}
