use std::ops::{ Add, Sub, Neg, Mul };

use serde::{ Serialize, Deserialize };

use crate::feq;

/// A point or direction in 3D space.
///
/// `Vector3` is a plain value type; every operation returns a new vector.
/// Whether a `Vector3` is a position or a direction is decided by how it is
/// used: `Matrix4 * Vector3` always treats it as a point.
///
/// # Examples
///
/// ```
/// # use letter_raster::vector::Vector3;
/// let v = Vector3::new(3.0, 0.0, 4.0);
/// assert_eq!(v.length(), 5.0);
/// assert_eq!(v.normalize(), Vector3::new(0.6, 0.0, 0.8));
/// ```
#[derive(Debug, Default, Copy, Clone, PartialOrd, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Vector3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

/// Conversion from a vector of floats, as found in scene descriptions.
///
/// Missing trailing components default to `0.0`; extra ones are ignored.
impl From<&Vec<f64>> for Vector3 {
    fn from(v: &Vec<f64>) -> Vector3 {
        Vector3 {
            x: v.get(0).copied().unwrap_or(0.0),
            y: v.get(1).copied().unwrap_or(0.0),
            z: v.get(2).copied().unwrap_or(0.0),
        }
    }
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    pub fn zero() -> Vector3 {
        Vector3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn length(&self) -> f64 {
        f64::sqrt(self.x.powi(2) + self.y.powi(2) + self.z.powi(2))
    }

    /// Scales a vector to unit length.
    ///
    /// A zero-length vector has no direction; it normalizes to the zero
    /// vector instead of producing NaNs.
    pub fn normalize(&self) -> Vector3 {
        let len = self.length();
        if len == 0.0 {
            return Vector3::zero();
        }

        Vector3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Vector3) -> Vector3 {
        *self - (*normal * (2.0 * normal.dot(self)))
    }

    /// Linearly interpolates between `self` (at `t == 0`) and `other`
    /// (at `t == 1`).
    pub fn lerp(&self, other: &Vector3, t: f64) -> Vector3 {
        *self + (*other - *self) * t
    }

    /// Arithmetic mean of a set of points; the zero vector if there are none.
    pub fn mean(points: &[Vector3]) -> Vector3 {
        if points.is_empty() {
            return Vector3::zero();
        }

        let sum = points.iter().fold(Vector3::zero(), |acc, p| acc + *p);
        sum * (1.0 / points.len() as f64)
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

/// Implements scalar right-multiplication for a vector.
///
/// ```
/// use letter_raster::vector::Vector3;
///
/// let v = Vector3::new(1.0, -2.0, 3.0);
/// assert_eq!(v * 2.0, Vector3::new(2.0, -4.0, 6.0));
/// ```
impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        other * self
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a = Vector3::new(3.0, -2.0, 5.0);
    let b = Vector3::new(-2.0, 3.0, 1.0);

    assert_eq!(a + b, Vector3::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let a = Vector3::new(3.0, 2.0, 1.0);
    let b = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(a - b, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    assert_eq!(-Vector3::new(1.0, -2.0, 3.0), Vector3::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_scalar_both_sides() {
    let v = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(v * 3.5, Vector3::new(3.5, -7.0, 10.5));
    assert_eq!(0.5 * v, Vector3::new(0.5, -1.0, 1.5));
}

#[test]
fn length_of_vector() {
    assert_eq!(Vector3::new(-1.0, -2.0, -3.0).length(), f64::sqrt(14.0));
}

#[test]
fn normalize_has_unit_length() {
    let samples = [
        Vector3::new(4.0, 0.0, 0.0),
        Vector3::new(1.0, 2.0, 3.0),
        Vector3::new(-0.001, 500.0, 7.5),
        Vector3::new(1e-3, -1e-3, 1e-3),
    ];

    for v in samples.iter() {
        assert!(crate::feq(v.normalize().length(), 1.0));
    }
}

#[test]
fn normalize_zero_is_zero() {
    let n = Vector3::zero().normalize();

    assert_eq!(n, Vector3::zero());
    assert!(n.x.is_finite() && n.y.is_finite() && n.z.is_finite());
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector3::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector3::new(1.0, -2.0, 1.0));
}

#[test]
fn reflect_45() {
    let v = Vector3::new(1.0, -1.0, 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn lerp_midpoint() {
    let a = Vector3::new(0.0, 0.0, -2.0);
    let b = Vector3::new(4.0, 2.0, 2.0);

    assert_eq!(a.lerp(&b, 0.5), Vector3::new(2.0, 1.0, 0.0));
}

#[test]
fn mean_of_points() {
    let pts = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(2.0, 0.0, 0.0),
        Vector3::new(2.0, 2.0, 0.0),
        Vector3::new(0.0, 2.0, 0.0),
    ];

    assert_eq!(Vector3::mean(&pts), Vector3::new(1.0, 1.0, 0.0));
    assert_eq!(Vector3::mean(&[]), Vector3::zero());
}

#[test]
fn from_short_float_vec() {
    let v: Vector3 = (&vec![1.0, 2.0]).into();

    assert_eq!(v, Vector3::new(1.0, 2.0, 0.0));
}
