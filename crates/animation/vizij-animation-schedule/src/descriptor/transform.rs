//! Affine transform decomposition.
//!
//! Matrices use nalgebra's column-vector convention: translation lives in the
//! last column and the bottom row of an affine matrix is `[0, 0, 0, 1]`.

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

/// 4x4 transform matrix
pub type Matrix4 = nalgebra::Matrix4<f32>;

const EPSILON: f32 = 1e-6;
const ORTHONORMAL_TOLERANCE: f32 = 1e-3;

/// Scale, rotation and translation recovered from an affine matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub scale: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub translation: Vector3<f32>,
}

/// Split `matrix` into scale, rotation and translation.
///
/// Returns `None` for non-finite, projective, singular or sheared matrices.
pub fn decompose(matrix: &Matrix4) -> Option<Decomposed> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let bottom_is_affine = matrix[(3, 0)].abs() <= EPSILON
        && matrix[(3, 1)].abs() <= EPSILON
        && matrix[(3, 2)].abs() <= EPSILON
        && (matrix[(3, 3)] - 1.0).abs() <= EPSILON;
    if !bottom_is_affine {
        return None;
    }

    let linear: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let translation = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);

    let mut scale = Vector3::new(
        linear.column(0).norm(),
        linear.column(1).norm(),
        linear.column(2).norm(),
    );
    if scale.iter().any(|s| *s <= EPSILON) {
        return None;
    }
    // Mirror transforms keep a proper rotation by flipping one scale axis.
    if linear.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    let rotation = Matrix3::from_columns(&[
        linear.column(0) / scale.x,
        linear.column(1) / scale.y,
        linear.column(2) / scale.z,
    ]);
    if (rotation.transpose() * rotation - Matrix3::identity()).amax() > ORTHONORMAL_TOLERANCE {
        return None;
    }

    let rotation =
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation));
    Some(Decomposed {
        scale,
        rotation,
        translation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, Vector3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn recovers_components() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let matrix = Translation3::new(10.0, -4.0, 2.0).to_homogeneous()
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 1.0));

        let parts = decompose(&matrix).unwrap();
        assert!((parts.translation - Vector3::new(10.0, -4.0, 2.0)).norm() < 1e-5);
        assert!((parts.scale - Vector3::new(2.0, 3.0, 1.0)).norm() < 1e-5);
        assert!(parts.rotation.angle_to(&rotation) < 1e-4);
    }

    #[test]
    fn identity_decomposes() {
        let parts = decompose(&Matrix4::identity()).unwrap();
        assert_eq!(parts.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(parts.translation, Vector3::zeros());
    }

    #[test]
    fn rejects_degenerate_matrices() {
        assert!(decompose(&Matrix4::zeros()).is_none());

        let mut projective = Matrix4::identity();
        projective[(3, 2)] = 0.5;
        assert!(decompose(&projective).is_none());

        let mut sheared = Matrix4::identity();
        sheared[(0, 1)] = 1.0;
        assert!(decompose(&sheared).is_none());

        let mut nan = Matrix4::identity();
        nan[(1, 1)] = f32::NAN;
        assert!(decompose(&nan).is_none());
    }
}
