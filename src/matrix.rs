use std::ops::{ Index, IndexMut, Mul };
use std::convert::From;

use serde::{ Serialize, Deserialize };

use crate::feq;
use crate::vector::Vector3;

/// A coordinate axis, used to pick rotations and mirroring.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Position of the axis in `[x, y, z]` ordered arrays.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A 4x4 matrix in homogeneous coordinates.
///
/// Every transform in the renderer is one of these: per-letter model
/// transforms, the mirroring object transform and the camera transform.
/// Elements are stored row-major and indexed by `(row, col)`.
///
/// Unlike a zero-filled buffer, the `Default` matrix is the identity, so a
/// freshly constructed transform leaves geometry untouched.
///
/// Rotation factories take angles in **degrees**; they are converted to
/// radians internally.
///
/// # Examples
///
/// Composing transforms (the rightmost matrix is applied first):
///
/// ```
/// # use letter_raster::vector::Vector3;
/// # use letter_raster::matrix::Matrix4;
/// let t = Matrix4::translation(10.0, 5.0, 7.0)
///     * Matrix4::scaling(5.0, 5.0, 5.0)
///     * Matrix4::rotation_x(90.0);
/// assert_eq!(t * Vector3::new(1.0, 0.0, 1.0), Vector3::new(15.0, 0.0, 7.0));
/// ```
#[derive(Copy, Clone, Debug, PartialOrd)]
pub struct Matrix4 {
    data: [f64; 16],
}

/// Determines whether two `Matrix4`s are equal.
///
/// Matrices are compared element-wise. Note that equality is approximate, as
/// `Matrix4` elements are floating point numbers.
impl PartialEq for Matrix4 {
    fn eq(&self, other: &Matrix4) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Default for Matrix4 {
    fn default() -> Matrix4 {
        Matrix4::identity()
    }
}

impl Matrix4 {
    /// Instantiates a 4x4 identity matrix.
    pub fn identity() -> Matrix4 {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix4 { data: buf }
    }

    /// Instantiates a 4x4 translation matrix.
    ///
    /// This matrix offsets a point by `x`, `y` and `z`.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4 {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    /// Instantiates a 4x4 scaling matrix.
    ///
    /// Negative factors mirror geometry across the corresponding axis.
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4 {
        let mut scale = Self::identity();
        scale[(0, 0)] = x;
        scale[(1, 1)] = y;
        scale[(2, 2)] = z;

        scale
    }

    /// Instantiates a rotation about the X axis by `degrees`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use letter_raster::vector::Vector3;
    /// # use letter_raster::matrix::Matrix4;
    /// let m = Matrix4::rotation_x(90.0);
    /// assert_eq!(m * Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(degrees: f64) -> Matrix4 {
        let r = degrees.to_radians();
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] = -r.sin();
        rotate[(2, 1)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation about the Y axis by `degrees`.
    pub fn rotation_y(degrees: f64) -> Matrix4 {
        let r = degrees.to_radians();
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation about the Z axis by `degrees`.
    pub fn rotation_z(degrees: f64) -> Matrix4 {
        let r = degrees.to_radians();
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] = -r.sin();
        rotate[(1, 0)] =  r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation about `axis` by `degrees`.
    pub fn rotation(axis: Axis, degrees: f64) -> Matrix4 {
        match axis {
            Axis::X => Self::rotation_x(degrees),
            Axis::Y => Self::rotation_y(degrees),
            Axis::Z => Self::rotation_z(degrees),
        }
    }

    /// Produces the transpose of a matrix.
    pub fn transposition(&self) -> Matrix4 {
        let mut buf = self.clone();

        for r in 0..4 {
            for c in (r+1)..4 {
                let tmp = buf[(r, c)];
                buf[(r, c)] = buf[(c, r)];
                buf[(c, r)] = tmp;
            }
        }

        buf
    }

    /// Approximates the inverse of the rotational part of a transform.
    ///
    /// Returns the transpose of the upper-left 3x3 block, with no translation
    /// and an identity bottom row. This is **not** a general inverse: it is
    /// exact only when the 3x3 block is orthonormal (a pure rotation,
    /// optionally combined with mirroring). With uniform scaling it yields
    /// the inverse rotation times the scale factor, which is harmless for
    /// directions that get renormalized afterwards. Sheared or non-uniformly
    /// scaled matrices give wrong results; the renderer never builds those.
    pub fn inverse_rotation(&self) -> Matrix4 {
        let mut inv = Self::identity();
        for r in 0..3 {
            for c in 0..3 {
                inv[(r, c)] = self[(c, r)];
            }
        }

        inv
    }
}

impl From<[f64; 16]> for Matrix4 {
    fn from(data: [f64; 16]) -> Matrix4 {
        Matrix4 { data }
    }
}

impl Index<(usize, usize)> for Matrix4 {
    type Output = f64;

    fn index<'a>(&'a self, index: (usize, usize)) -> &'a f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4 {
    fn index_mut<'a>(&'a mut self, index: (usize, usize)) -> &'a mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Multiplication between two matrices.
///
/// Note that matrix multiplication is not commutative; in other words, for
/// matrix `A` and matrix `B`, `A * B` is not necessarily equal to `B * A`.
impl Mul<Matrix4> for Matrix4 {
    type Output = Matrix4;

    fn mul(self, other: Matrix4) -> Matrix4 {
        let mut res = Matrix4 { data: [0.0; 16] };

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
                    + self[(r, 3)] * other[(3, c)]
            }
        }

        res
    }
}

/// Transforms a point.
///
/// The vector is extended with `w = 1.0`. If the transformed `w` is nonzero,
/// `x`, `y` and `z` are divided by it (the perspective divide); for affine
/// matrices `w` stays `1.0` and the divide changes nothing.
///
/// # Examples
///
/// ```
/// # use letter_raster::vector::Vector3;
/// # use letter_raster::matrix::Matrix4;
/// let mut m = Matrix4::identity();
/// m[(3, 3)] = 2.0;
/// assert_eq!(m * Vector3::new(2.0, 4.0, 6.0), Vector3::new(1.0, 2.0, 3.0));
/// ```
impl Mul<Vector3> for Matrix4 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        let mut buf: [f64; 4] = Default::default();

        for r in 0..4 {
            buf[r] = self[(r, 0)] * other.x
                + self[(r, 1)] * other.y
                + self[(r, 2)] * other.z
                + self[(r, 3)];
        }

        let w = buf[3];
        if w != 0.0 {
            Vector3::new(buf[0] / w, buf[1] / w, buf[2] / w)
        } else {
            Vector3::new(buf[0], buf[1], buf[2])
        }
    }
}

#[test]
fn identity() {
    let i = Matrix4::identity();
    let a: Matrix4 = [ 0.0, 1.0,  2.0,  4.0,
                       1.0, 2.0,  4.0,  8.0,
                       2.0, 4.0,  8.0, 16.0,
                       4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
    assert_eq!(Matrix4::default(), i);
}

#[test]
fn transpose() {
    let a: Matrix4 = [ 0.0, 9.0, 3.0, 0.0,
                       9.0, 8.0, 0.0, 8.0,
                       1.0, 8.0, 5.0, 3.0,
                       0.0, 0.0, 5.0, 8.0, ].into();

    let t: Matrix4 = [ 0.0, 9.0, 1.0, 0.0,
                       9.0, 8.0, 8.0, 0.0,
                       3.0, 0.0, 5.0, 5.0,
                       0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(t, a.transposition());
    assert_eq!(t.transposition(), a);
}

#[test]
fn composition_is_associative_not_commutative() {
    let a = Matrix4::rotation_x(30.0);
    let b = Matrix4::translation(1.0, 2.0, 3.0);
    let c = Matrix4::scaling(2.0, -1.0, 0.5);

    assert_eq!((a * b) * c, a * (b * c));
    assert!(a * b != b * a);
}

#[test]
fn translate_point() {
    let m = Matrix4::translation(5.0, -3.0, 2.0);

    assert_eq!(m * Vector3::new(-3.0, 4.0, 5.0), Vector3::new(2.0, 1.0, 7.0));
}

#[test]
fn scaling_reflection() {
    let m = Matrix4::scaling(-1.0, 1.0, 1.0);

    assert_eq!(m * Vector3::new(2.0, 3.0, 4.0), Vector3::new(-2.0, 3.0, 4.0));
}

#[test]
fn rotate_y_and_z() {
    let p = Vector3::new(0.0, 0.0, 1.0);
    assert_eq!(Matrix4::rotation_y(90.0) * p, Vector3::new(1.0, 0.0, 0.0));

    let q = Vector3::new(0.0, 1.0, 0.0);
    assert_eq!(Matrix4::rotation_z(90.0) * q, Vector3::new(-1.0, 0.0, 0.0));
    assert_eq!(Matrix4::rotation_z(45.0) * q,
        Vector3::new(-2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0));
}

#[test]
fn rotation_then_opposite_rotation_is_identity() {
    for &deg in [0.0, 10.0, 45.0, 90.0, 137.5, 180.0, -270.0, 720.0].iter() {
        assert_eq!(Matrix4::rotation_x(-deg) * Matrix4::rotation_x(deg),
            Matrix4::identity());
        assert_eq!(Matrix4::rotation_y(-deg) * Matrix4::rotation_y(deg),
            Matrix4::identity());
        assert_eq!(Matrix4::rotation_z(-deg) * Matrix4::rotation_z(deg),
            Matrix4::identity());
    }
}

#[test]
fn inverse_rotation_undoes_rotation() {
    let m = Matrix4::rotation_z(25.0) * Matrix4::rotation_x(-70.0)
        * Matrix4::rotation_y(110.0);
    let v = Vector3::new(0.3, -1.2, 2.5);

    assert_eq!(m.inverse_rotation() * (m * v), v);
}

#[test]
fn inverse_rotation_drops_translation() {
    let m = Matrix4::translation(10.0, 20.0, 30.0) * Matrix4::rotation_y(90.0);
    let inv = m.inverse_rotation();

    assert_eq!(inv[(0, 3)], 0.0);
    assert_eq!(inv[(1, 3)], 0.0);
    assert_eq!(inv[(2, 3)], 0.0);
    assert_eq!(inv * Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn projective_matrix_divides_by_w() {
    // Copies z into w, like a pinhole projection.
    let mut m = Matrix4::identity();
    m[(3, 2)] = 1.0;
    m[(3, 3)] = 0.0;

    assert_eq!(m * Vector3::new(4.0, 2.0, 2.0), Vector3::new(2.0, 1.0, 1.0));
    // w == 0: left undivided rather than producing infinities.
    assert_eq!(m * Vector3::new(4.0, 2.0, 0.0), Vector3::new(4.0, 2.0, 0.0));
}
