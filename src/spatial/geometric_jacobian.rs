use na::{DMatrix, DVector, Isometry3, Matrix3xX};
use std::ops::Mul;

use crate::{
    spatial::{spatial_vector::SpatialVector, wrench::Wrench},
    types::Float,
    util::colwise_cross,
};

/// A geometric Jacobian maps a vector of joint velocities to a twist.
#[derive(PartialEq, Debug, Clone)]
pub struct GeometricJacobian {
    pub angular: Matrix3xX<Float>,
    pub linear: Matrix3xX<Float>,
}

impl GeometricJacobian {
    pub fn zeros(ncols: usize) -> Self {
        GeometricJacobian {
            angular: Matrix3xX::zeros(ncols),
            linear: Matrix3xX::zeros(ncols),
        }
    }

    /// Re-express the columns in the frame `iso` maps into
    pub fn transform(&self, iso: &Isometry3<Float>) -> GeometricJacobian {
        let rot = iso.rotation.to_rotation_matrix().into_inner();
        let trans = iso.translation.vector;
        let angular = rot.mul(&self.angular);
        let linear = rot.mul(&self.linear) + colwise_cross(&trans, &angular);

        GeometricJacobian { angular, linear }
    }

    /// Inverse of [`GeometricJacobian::transform`]
    pub fn inv_transform(&self, iso: &Isometry3<Float>) -> GeometricJacobian {
        let rot_t = iso.rotation.to_rotation_matrix().into_inner().transpose();
        let trans = iso.translation.vector;
        let angular = rot_t.mul(&self.angular);
        let linear = rot_t.mul(&(&self.linear - colwise_cross(&trans, &self.angular)));

        GeometricJacobian { angular, linear }
    }

    pub fn dim(&self) -> usize {
        if self.angular.ncols() != self.linear.ncols() {
            panic!("Geometric Jacobian's angular dimension does not match linear dimension");
        }

        self.angular.ncols()
    }

    /// Twist produced by the joint velocity `v`
    pub fn mul_vec(&self, v: &[Float]) -> SpatialVector {
        let mut out = SpatialVector::zero();
        for (i, vi) in v.iter().enumerate() {
            out.angular += self.angular.column(i) * *vi;
            out.linear += self.linear.column(i) * *vi;
        }
        out
    }

    /// Sᵀ·f, the generalized force a wrench exerts through these columns
    pub fn transpose_mul_wrench(&self, f: &Wrench) -> DVector<Float> {
        self.angular.transpose() * f.angular + self.linear.transpose() * f.linear
    }

    /// 6 x n matrix, linear rows first
    pub fn to_matrix(&self) -> DMatrix<Float> {
        let n = self.dim();
        let mut m = DMatrix::zeros(6, n);
        m.view_mut((0, 0), (3, n)).copy_from(&self.linear);
        m.view_mut((3, 0), (3, n)).copy_from(&self.angular);
        m
    }
}

#[cfg(test)]
mod geometric_jacobian_tests {
    use crate::assert_vec_close;
    use na::{vector, Translation3, UnitQuaternion};

    use super::*;
    use crate::spatial::transform::IsometryExt;

    #[test]
    fn transform_matches_motion_action() {
        // Arrange
        let jac = GeometricJacobian {
            angular: Matrix3xX::from_columns(&[vector![0., 0., 1.], vector![1., 0., 0.]]),
            linear: Matrix3xX::from_columns(&[vector![0.5, 0., 0.], vector![0., 0., 2.]]),
        };
        let iso = Isometry3::from_parts(
            Translation3::new(0.3, -1., 2.),
            UnitQuaternion::from_euler_angles(0.2, -0.4, 1.1),
        );
        let v = [0.7, -1.3];

        // Act
        let moved = jac.transform(&iso);

        // Assert
        let expected = iso.act_motion(&jac.mul_vec(&v));
        let actual = moved.mul_vec(&v);
        assert_vec_close!(actual.angular, expected.angular, 1e-12);
        assert_vec_close!(actual.linear, expected.linear, 1e-12);

        let back = moved.inv_transform(&iso);
        assert_vec_close!(back.angular, jac.angular, 1e-12);
        assert_vec_close!(back.linear, jac.linear, 1e-12);
    }

    #[test]
    fn matrix_rows_are_linear_then_angular() {
        let jac = GeometricJacobian {
            angular: Matrix3xX::from_columns(&[vector![0., 0., 1.]]),
            linear: Matrix3xX::from_columns(&[vector![2., 0., 0.]]),
        };
        let m = jac.to_matrix();
        assert_eq!(m[(0, 0)], 2.);
        assert_eq!(m[(5, 0)], 1.);
    }
}
