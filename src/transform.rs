use crate::matrix::Matrix4D;
use crate::error::Result;

/// A transformation matrix paired with its inverse.
///
/// The inverse is computed once, when the transform is built, so the render
/// loop never inverts a matrix. Building a `Transform` from a singular matrix
/// fails with `TracerError::NonInvertibleMatrix`.
///
/// The inverse transpose (used to carry normals back to world space) is
/// cached alongside the inverse.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    forward: Matrix4D,
    inverse: Matrix4D,
    inverse_transpose: Matrix4D,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Transform {
        Transform {
            forward: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            inverse_transpose: Matrix4D::identity(),
        }
    }

    pub fn new(forward: Matrix4D) -> Result<Transform> {
        let inverse = forward.inverse()?;

        Ok(Transform {
            forward,
            inverse,
            inverse_transpose: inverse.transposition(),
        })
    }

    /// Object-to-parent (or object-to-world) matrix.
    pub fn matrix(&self) -> &Matrix4D {
        &self.forward
    }

    /// Parent-to-object matrix.
    pub fn inverse(&self) -> &Matrix4D {
        &self.inverse
    }

    pub fn inverse_transpose(&self) -> &Matrix4D {
        &self.inverse_transpose
    }
}

#[test]
fn transform_caches_inverse() {
    let t = Transform::new(Matrix4D::translation(5.0, -3.0, 2.0)).unwrap();

    assert_eq!(*t.inverse(), Matrix4D::translation(-5.0, 3.0, -2.0));
    assert_eq!(*t.inverse_transpose(), t.inverse().transposition());
    assert_eq!(*t.matrix() * *t.inverse(), Matrix4D::identity());
}

#[test]
fn singular_matrix_is_rejected() {
    use crate::TracerError;

    let res = Transform::new(Matrix4D::scaling(0.0, 1.0, 1.0));
    assert!(matches!(res, Err(TracerError::NonInvertibleMatrix)));
}
