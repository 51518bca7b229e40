use crate::consts::{ AMBIENT_STRENGTH, DIFFUSE_STRENGTH, SPECULAR_STRENGTH,
    SHININESS, LIGHT_DISTANCE };
use crate::matrix::Axis;
use crate::vector::Vector3;

/// A directional light.
///
/// The light shines along `direction` (always unit length). `position` is
/// where the light is drawn as a marker: the direction pushed out to a fixed
/// distance from the world origin. It doesn't affect shading.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    direction: Vector3,
    position: Vector3,
}

impl Default for Light {
    fn default() -> Light {
        Light::new(Vector3::new(0.5, 0.5, -1.0))
    }
}

impl Light {
    /// Creates a light shining along `direction`, which is normalized.
    pub fn new(direction: Vector3) -> Light {
        let direction = direction.normalize();

        Light { direction, position: direction * LIGHT_DISTANCE }
    }

    /// Builds a direction from a single lighting slider.
    ///
    /// Each slider sweeps the light around a fixed offset of
    /// `(0.5, 0.5, -0.5)`: the X and Y sliders swing the light in the XZ and
    /// YZ planes, while the Z slider spins it around the view axis.
    ///
    /// ```
    /// # use letter_raster::light::Light;
    /// # use letter_raster::matrix::Axis;
    /// # use letter_raster::vector::Vector3;
    /// let light = Light::from_slider(Axis::Z, 0.0);
    /// assert_eq!(light.direction(), Vector3::new(0.5, 0.0, -1.0).normalize());
    /// ```
    pub fn from_slider(axis: Axis, degrees: f64) -> Light {
        let r = degrees.to_radians();
        let swing = std::f64::consts::FRAC_1_SQRT_2;

        let direction = match axis {
            Axis::X => Vector3::new(
                r.sin() * swing + 0.5,
                0.5,
                -r.cos() * swing - 0.5,
            ),
            Axis::Y => Vector3::new(
                0.5,
                r.sin() * swing + 0.5,
                -r.cos() * swing - 0.5,
            ),
            Axis::Z => Vector3::new(r.cos() * 0.5, r.sin() * 0.5, -1.0),
        };

        Light::new(direction)
    }

    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }
}

/// Calculates the Phong-style lighting intensity at a vertex.
///
/// `normal` and `light_dir` are unit vectors in the same (object) space;
/// `position` and `eye` are the vertex and camera positions in world space.
///
/// The result is the sum of a fixed ambient term, a diffuse term and a
/// specular term, clamped to `[0.3, 1.0]`. A surface facing away from the
/// light (`normal . light_dir <= 0`) receives ambient light only.
///
/// # Examples
///
/// ```
/// # use letter_raster::light::vertex_intensity;
/// # use letter_raster::vector::Vector3;
/// let n = Vector3::new(0.0, 0.0, 1.0);
/// let away = Vector3::new(0.0, 0.0, -1.0);
/// let i = vertex_intensity(n, away, Vector3::zero(), Vector3::new(0.0, 0.0, -400.0));
/// assert_eq!(i, 0.3);
/// ```
pub fn vertex_intensity(normal: Vector3, light_dir: Vector3, position: Vector3,
    eye: Vector3) -> f64 {
    let light_dot_normal = normal.dot(&light_dir);
    if light_dot_normal <= 0.0 {
        return AMBIENT_STRENGTH;
    }

    let view = (eye - position).normalize();
    let diffuse = DIFFUSE_STRENGTH * light_dot_normal;

    // Mirror of the light direction about the normal
    let reflected = light_dir.reflect(&normal).normalize();
    let specular = SPECULAR_STRENGTH
        * reflected.dot(&view).max(0.0).powi(SHININESS);

    (AMBIENT_STRENGTH + diffuse + specular).clamp(AMBIENT_STRENGTH, 1.0)
}

/// Intensity of a flat-shaded face: how squarely it faces the light, but
/// never darker than the ambient floor.
pub fn face_intensity(normal: Vector3, light_dir: Vector3) -> f64 {
    normal.dot(&light_dir).max(AMBIENT_STRENGTH)
}

#[test]
fn light_is_normalized_and_placed() {
    let light = Light::new(Vector3::new(0.0, 3.0, -4.0));

    assert_eq!(light.direction(), Vector3::new(0.0, 0.6, -0.8));
    assert_eq!(light.position(), Vector3::new(0.0, 180.0, -240.0));
}

#[test]
fn default_light() {
    let light = Light::default();
    let expected = Vector3::new(0.5, 0.5, -1.0).normalize();

    assert_eq!(light.direction(), expected);
    assert_eq!(light.position(), expected * 300.0);
}

#[test]
fn sliders_at_zero_lean_towards_viewer() {
    let x = Light::from_slider(Axis::X, 0.0);
    let expected = Vector3::new(0.5, 0.5, -(std::f64::consts::FRAC_1_SQRT_2 + 0.5));

    assert_eq!(x.direction(), expected.normalize());
    assert_eq!(Light::from_slider(Axis::Y, 0.0).direction(), x.direction());
}

#[test]
fn light_facing_away_is_ambient_only() {
    let n = Vector3::new(0.0, 1.0, 0.0);
    let l = Vector3::new(0.0, -1.0, 0.0);

    assert_eq!(vertex_intensity(n, l, Vector3::zero(), Vector3::new(0.0, 5.0, 0.0)),
        0.3);
    // Perpendicular light counts as facing away.
    let side = Vector3::new(1.0, 0.0, 0.0);
    assert_eq!(vertex_intensity(n, side, Vector3::zero(), Vector3::zero()), 0.3);
}

#[test]
fn light_along_normal_without_highlight() {
    // Reflection points back into the surface, away from the eye.
    let n = Vector3::new(0.0, 0.0, 1.0);
    let eye = Vector3::new(0.0, 0.0, 10.0);

    assert!(crate::feq(vertex_intensity(n, n, Vector3::zero(), eye), 0.9));
}

#[test]
fn full_highlight_clamps_to_one() {
    // Light grazing in at 45 degrees, eye on the mirror direction.
    let n = Vector3::new(0.0, 1.0, 0.0);
    let l = Vector3::new(1.0, 1.0, 0.0).normalize();
    let r = l.reflect(&n);
    let eye = r * 10.0;

    assert_eq!(vertex_intensity(n, l, Vector3::zero(), eye), 1.0);
}

#[test]
fn intensity_is_always_in_range() {
    let dirs = [
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 0.5, 0.2),
        Vector3::new(0.3, -0.7, 0.9),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.5, 0.5, -1.0),
        Vector3::new(-0.2, 0.9, 0.1),
    ];

    for n in dirs.iter() {
        for l in dirs.iter() {
            for e in dirs.iter() {
                let i = vertex_intensity(n.normalize(), l.normalize(),
                    Vector3::new(3.0, -2.0, 1.0), *e * 400.0);
                assert!(i >= 0.3 && i <= 1.0);
            }
        }
    }
}

#[test]
fn face_intensity_has_floor() {
    let n = Vector3::new(0.0, 0.0, 1.0);

    assert_eq!(face_intensity(n, Vector3::new(0.0, 0.0, -1.0)), 0.3);
    assert_eq!(face_intensity(n, n), 1.0);
}
