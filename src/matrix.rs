use std::fmt;
use std::ops::{ Index, IndexMut, Mul };
use std::convert::From;

use crate::feq;
use crate::tuple::Tuple4D;
use crate::error::{ Result, TracerError };

/// Removes one row and one column from a square, row-major block of size `n`.
///
/// For the 3x3 block
///
/// ```text
/// [ 1.0, 0.0, 2.0,
///   3.0, 1.0, 0.0,
///   1.0, 1.0, 1.0 ]
/// ```
///
/// striking `row == 1`, `col == 2` leaves `[ 1.0, 0.0, 1.0, 1.0 ]`.
fn strike(data: &[f64], n: usize, row: usize, col: usize) -> Vec<f64> {
    data.iter()
        .enumerate()
        .filter(|(i, _)| i / n != row && i % n != col)
        .map(|(_, v)| *v)
        .collect()
}

fn cofactor_sign(row: usize, col: usize) -> f64 {
    if (row + col) % 2 == 0 { 1.0 } else { -1.0 }
}

/// Determinant of a square, row-major block of size `n`.
///
/// Expands along row 0, recursing through the `(n-1)`x`(n-1)` submatrices
/// until a 2x2 block is reached.
fn laplace(data: &[f64], n: usize) -> f64 {
    match n {
        0 => 1.0,
        1 => data[0],
        2 => data[0] * data[3] - data[1] * data[2],
        _ => (0..n)
            .map(|c| {
                data[c] * cofactor_sign(0, c) * laplace(&strike(data, n, 0, c), n - 1)
            })
            .sum(),
    }
}

/// A 4x4 matrix.
///
/// These matrices encode transformations in 3D space, acting on both vectors
/// and points (`w` components of `0.0` and `1.0`, respectively). Elements are
/// stored row-major and indexed by `(row, col)`.
///
/// Methods which modify matrices come in pairs: `transpose` works in place,
/// `transposition` returns a new matrix.
///
/// # Examples
///
/// Creating an identity matrix:
///
/// ```
/// # use whitted::matrix::Matrix4D;
/// let mat = Matrix4D::identity();
/// assert_eq!(mat.determinant(), 1.0);
/// ```
///
/// Calculating a view transformation (for cameras, etc.):
///
/// ```
/// # use whitted::tuple::Tuple4D;
/// # use whitted::matrix::Matrix4D;
/// let from = Tuple4D::point(0.0, 0.0, 8.0);
/// let to = Tuple4D::point(0.0, 0.0, 0.0);
/// let up = Tuple4D::vector(0.0, 1.0, 0.0);
/// let view = Matrix4D::view_transform(from, to, up);
/// assert_eq!(view, Matrix4D::translation(0.0, 0.0, -8.0));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Matrix4D {
    data: [f64; 16],
}

/// Matrices are compared element-wise, within `EPSILON`.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix4D {
    /// Creates a new `Matrix4D`. All elements are initialized to `0.0`.
    pub fn new() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    pub fn identity() -> Matrix4D {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix4D { data: buf }
    }

    /// Offsets a point by `x`, `y` and `z`. Vectors are unaffected.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    /// Scales along the X, Y and Z axes. A negative factor reflects.
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut scale = Self::identity();
        scale[(0, 0)] = x;
        scale[(1, 1)] = y;
        scale[(2, 2)] = z;

        scale
    }

    /// Rotation about the X axis by `r` radians.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted::tuple::Tuple4D;
    /// # use whitted::matrix::Matrix4D;
    /// let point = Tuple4D::point(0.0, 1.0, 0.0);
    /// let m = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * point, Tuple4D::point(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] = -r.sin();
        rotate[(2, 1)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Rotation about the Y axis by `r` radians.
    pub fn rotation_y(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Rotation about the Z axis by `r` radians.
    pub fn rotation_z(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] = -r.sin();
        rotate[(1, 0)] =  r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Instantiates a 4x4 shearing matrix.
    ///
    /// Each parameter moves one coordinate in proportion to another; `xy`
    /// moves `x` in proportion to `y`, `zx` moves `z` in proportion to `x`,
    /// and so on.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted::tuple::Tuple4D;
    /// # use whitted::matrix::Matrix4D;
    /// let point = Tuple4D::point(2.0, 3.0, 4.0);
    /// let m = Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// assert_eq!(m * point, Tuple4D::point(5.0, 3.0, 4.0));
    /// ```
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        let mut shear = Self::identity();
        shear[(0, 1)] = xy;
        shear[(0, 2)] = xz;
        shear[(1, 0)] = yx;
        shear[(1, 2)] = yz;
        shear[(2, 0)] = zx;
        shear[(2, 1)] = zy;

        shear
    }

    /// Generates a view transformation.
    ///
    /// `from` is where the eye is, `to` is where it looks and `up` roughly
    /// points up. The result moves the *world* relative to the eye, which
    /// sits at the origin looking down negative Z.
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D) -> Matrix4D {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation: Matrix4D = [
                left.x,     left.y,     left.z,    0.0,
             true_up.x,  true_up.y,  true_up.z,    0.0,
            -forward.x, -forward.y, -forward.z,    0.0,
                   0.0,        0.0,        0.0,    1.0,
        ].into();

        orientation * Matrix4D::translation(-from.x, -from.y, -from.z)
    }

    /// Turns this matrix into its own transpose.
    pub fn transpose(&mut self) {
        *self = self.transposition();
    }

    /// Returns the transpose of this matrix; `A^T(i, j) == A(j, i)`.
    pub fn transposition(&self) -> Matrix4D {
        let mut buf = Matrix4D::new();

        for r in 0..4 {
            for c in 0..4 {
                buf[(c, r)] = self[(r, c)];
            }
        }

        buf
    }

    /// The determinant of the 3x3 submatrix left after removing `row`, `col`.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        laplace(&strike(&self.data, 4, row, col), 3)
    }

    /// The minor at `row`, `col`, negated when `row + col` is odd.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        self.minor(row, col) * cofactor_sign(row, col)
    }

    pub fn determinant(&self) -> f64 {
        laplace(&self.data, 4)
    }

    /// Calculates the inverse of a `Matrix4D`, if it exists.
    ///
    /// A `Matrix4D` is invertible if its determinant is finite and nonzero;
    /// otherwise `TracerError::NonInvertibleMatrix` is returned. A NaN entry,
    /// such as a view transform looking from a point to itself, counts as
    /// singular. Degenerate transforms
    /// (a zero scale, for instance) are valid input, so this is an error and
    /// not a panic.
    ///
    /// Note the transposed placement: the cofactor at `(r, c)` lands at
    /// `(c, r)` of the inverse.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted::matrix::Matrix4D;
    /// let flat = Matrix4D::scaling(1.0, 0.0, 1.0);
    /// assert!(flat.inverse().is_err());
    /// ```
    pub fn inverse(&self) -> Result<Matrix4D> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(TracerError::NonInvertibleMatrix);
        }

        let mut inv = Matrix4D::new();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        Ok(inv)
    }

    /// Composes transformations in the order they are applied.
    ///
    /// `Matrix4D::chain(&[a, b, c])` is `c * b * a`: `a` acts on a point
    /// first. An empty chain is the identity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted::tuple::Tuple4D;
    /// # use whitted::matrix::Matrix4D;
    /// let m = Matrix4D::chain(&[
    ///     Matrix4D::scaling(2.0, 2.0, 2.0),
    ///     Matrix4D::translation(1.0, 0.0, 0.0),
    /// ]);
    /// assert_eq!(m * Tuple4D::point(1.0, 1.0, 1.0), Tuple4D::point(3.0, 2.0, 2.0));
    /// ```
    pub fn chain(steps: &[Matrix4D]) -> Matrix4D {
        steps.iter().fold(Matrix4D::identity(), |acc, step| *step * acc)
    }

    /// Compares two matrices element-wise with an explicit tolerance.
    pub fn approx_eq(&self, other: &Matrix4D, tolerance: f64) -> bool {
        self.data.iter()
            .zip(other.data.iter())
            .all(|(x, y)| (x - y).abs() < tolerance)
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Multiplication between two matrices.
///
/// Not commutative: `a * b` applies `b` first when the product acts on a
/// tuple.
///
/// # Examples
///
/// ```
/// # use whitted::matrix::Matrix4D;
/// let m1 = Matrix4D::scaling(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::scaling(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::scaling(8.0, 9.0, 8.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::new();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = (0..4).map(|k| self[(r, k)] * other[(k, c)]).sum();
            }
        }

        res
    }
}

/// Multiplication between a matrix and a `Tuple4D` (tuples on the right).
impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, other: Tuple4D) -> Tuple4D {
        let row = |r: usize| {
            self[(r, 0)] * other.x
                + self[(r, 1)] * other.y
                + self[(r, 2)] * other.z
                + self[(r, 3)] * other.w
        };

        Tuple4D { x: row(0), y: row(1), z: row(2), w: row(3) }
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn identity() {
    let i = Matrix4D::identity();
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
}

#[test]
fn transpose() {
    let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                        9.0, 8.0, 0.0, 8.0,
                        1.0, 8.0, 5.0, 3.0,
                        0.0, 0.0, 5.0, 8.0, ].into();

    let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                        9.0, 8.0, 8.0, 0.0,
                        3.0, 0.0, 5.0, 5.0,
                        0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(t, a.transposition());
    assert_eq!(t.transposition(), a);

    let mut b = a;
    b.transpose();
    assert_eq!(b, t);
    assert_eq!(Matrix4D::identity().transposition(), Matrix4D::identity());
}

#[test]
fn strike_row_and_column() {
    let a = [  1.0, 5.0,  0.0,
              -3.0, 2.0,  7.0,
               0.0, 6.0, -3.0, ];

    assert_eq!(strike(&a, 3, 0, 2), vec![-3.0, 2.0, 0.0, 6.0]);
}

#[test]
fn small_determinants() {
    assert_eq!(laplace(&[1.0, 5.0, -3.0, 2.0], 2), 17.0);

    let a = [  1.0, 2.0,  6.0,
              -5.0, 8.0, -4.0,
               2.0, 6.0,  4.0, ];

    assert_eq!(laplace(&a, 3), -196.0);
}

#[test]
fn mat4_determinant() {
    let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                        -3.0,  1.0,  7.0,  3.0,
                         1.0,  2.0, -9.0,  6.0,
                        -6.0,  7.0,  7.0, -9.0, ].into();

    assert_eq!(a.cofactor(0, 0), 690.0);
    assert_eq!(a.cofactor(0, 1), 447.0);
    assert_eq!(a.cofactor(0, 2), 210.0);
    assert_eq!(a.cofactor(0, 3), 51.0);
    assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn mat4_inverse() {
    let a: Matrix4D = [ -5.0,  2.0,  6.0, -8.0,
                         1.0, -5.0,  1.0,  8.0,
                         7.0,  7.0, -6.0, -7.0,
                         1.0, -3.0,  7.0,  4.0, ].into();

    let i: Matrix4D = [  0.21805,  0.45113,  0.24060, -0.04511,
                        -0.80827, -1.45677, -0.44361,  0.52068,
                        -0.07895, -0.22368, -0.05263,  0.19737,
                        -0.52256, -0.81391, -0.30075,  0.30639, ].into();

    let b = a.inverse().unwrap();

    assert_eq!(a.determinant(), 532.0);
    assert_eq!(a.cofactor(2, 3), -160.0);
    assert_eq!(b[(3, 2)], -160.0 / 532.0);
    // Reference values are rounded to five places.
    assert!(b.approx_eq(&i, 0.0001));
}

#[test]
fn product_times_inverse_recovers_factor() {
    let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                         3.0,  8.0,  2.0, -9.0,
                        -4.0,  4.0,  4.0,  1.0,
                        -6.0,  5.0, -1.0,  1.0, ].into();

    let b: Matrix4D = [ 8.0,  2.0, 2.0, 2.0,
                        3.0, -1.0, 7.0, 0.0,
                        7.0,  0.0, 5.0, 4.0,
                        6.0, -2.0, 0.0, 5.0  ].into();

    let c = a * b;
    assert_eq!(a, c * b.inverse().unwrap());
}

#[test]
fn inverse_round_trip() {
    let a: Matrix4D = [ 9.0,  3.0,  0.0,  9.0,
                       -5.0, -2.0, -6.0, -3.0,
                       -4.0,  9.0,  6.0,  4.0,
                       -7.0,  6.0,  6.0,  2.0, ].into();

    assert_eq!(a.inverse().unwrap().inverse().unwrap(), a);
    assert_eq!(a.transposition().transposition(), a);
}

#[test]
fn non_invertible_matrix_is_an_error() {
    let a: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                         9.0,  6.0,  2.0,  6.0,
                         0.0, -5.0,  1.0, -5.0,
                         0.0,  0.0,  0.0,  0.0, ].into();

    assert_eq!(a.determinant(), 0.0);
    assert!(matches!(a.inverse(), Err(TracerError::NonInvertibleMatrix)));
}

#[test]
fn nan_matrix_is_not_invertible() {
    let eye = Tuple4D::point(0.0, 1.0, -5.0);
    let degenerate = Matrix4D::view_transform(eye, eye, Tuple4D::vector(0.0, 1.0, 0.0));

    assert!(degenerate.determinant().is_nan());
    assert!(matches!(degenerate.inverse(), Err(TracerError::NonInvertibleMatrix)));
}

#[test]
fn translation_moves_points_not_vectors() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let point = Tuple4D::point(-3.0, 4.0, 5.0);
    let vector = Tuple4D::vector(-3.0, 4.0, 5.0);

    assert_eq!(transform * point, Tuple4D::point(2.0, 1.0, 7.0));
    assert_eq!(transform.inverse().unwrap() * point, Tuple4D::point(-8.0, 7.0, 3.0));
    assert_eq!(transform * vector, vector);
}

#[test]
fn scaling_and_reflection() {
    let transform = Matrix4D::scaling(2.0, 3.0, 4.0);
    let vector = Tuple4D::vector(-4.0, 6.0, 8.0);

    assert_eq!(transform * vector, Tuple4D::vector(-8.0, 18.0, 32.0));
    assert_eq!(transform.inverse().unwrap() * vector, Tuple4D::vector(-2.0, 2.0, 2.0));
    assert_eq!(Matrix4D::scaling(-1.0, 1.0, 1.0) * Tuple4D::point(2.0, 3.0, 4.0),
        Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn rotations_quarter_turns() {
    let half_pi = std::f64::consts::PI / 2.0;
    let s = 2.0f64.sqrt() / 2.0;

    assert_eq!(Matrix4D::rotation_x(half_pi / 2.0) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, s, s));
    assert_eq!(Matrix4D::rotation_y(half_pi) * Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(Matrix4D::rotation_z(half_pi) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0));
}

#[test]
fn shearing_each_axis() {
    let p = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(Matrix4D::shearing(0.0, 1.0, 0.0, 0.0, 0.0, 0.0) * p, Tuple4D::point(6.0, 3.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 1.0, 0.0, 0.0, 0.0) * p, Tuple4D::point(2.0, 5.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 1.0, 0.0, 0.0) * p, Tuple4D::point(2.0, 7.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 1.0, 0.0) * p, Tuple4D::point(2.0, 3.0, 6.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0) * p, Tuple4D::point(2.0, 3.0, 7.0));
}

#[test]
fn chain_applies_first_step_first() {
    let p = Tuple4D::point(1.0, 0.0, 1.0);
    let a = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    let b = Matrix4D::scaling(5.0, 5.0, 5.0);
    let c = Matrix4D::translation(10.0, 5.0, 7.0);

    assert_eq!(Matrix4D::chain(&[a, b, c]), c * b * a);
    assert_eq!(Matrix4D::chain(&[a, b, c]) * p, Tuple4D::point(15.0, 0.0, 7.0));
    assert_eq!(Matrix4D::chain(&[]), Matrix4D::identity());
}

#[test]
fn view_transforms() {
    let origin = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(origin, Tuple4D::point(0.0, 0.0, -1.0), up),
        Matrix4D::identity());
    assert_eq!(Matrix4D::view_transform(origin, Tuple4D::point(0.0, 0.0, 1.0), up),
        Matrix4D::scaling(-1.0, 1.0, -1.0));
}

#[test]
fn arbitrary_view() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);

    let a: Matrix4D = [ -0.50709, 0.50709,  0.67612, -2.36643,
                         0.76772, 0.60609,  0.12122, -2.82843,
                        -0.35857, 0.59761, -0.71714,  0.00000,
                         0.00000, 0.00000,  0.00000,  1.00000, ].into();

    assert!(Matrix4D::view_transform(from, to, up).approx_eq(&a, 0.0001));
}
