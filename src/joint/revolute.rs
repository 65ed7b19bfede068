use na::{Isometry3, Matrix3xX, Translation3, UnitQuaternion, UnitVector3};
use nalgebra::Vector3;
use rand::Rng;

use crate::{spatial::geometric_jacobian::GeometricJacobian, types::Float, PI};

/// Represents a revolute joint connecting a predecessor and a successor body.
/// A continuous joint is a revolute joint without position limits.
///
/// Note: joint frame is defined as the successor body frame
#[derive(Clone, Debug, PartialEq)]
pub struct RevoluteJoint {
    pub axis: UnitVector3<Float>, // axis of rotation expressed in successor body frame
    pub unbounded: bool,
}

impl RevoluteJoint {
    pub fn default() -> Self {
        RevoluteJoint {
            axis: Vector3::z_axis(),
            unbounded: false,
        }
    }

    pub fn new(axis: UnitVector3<Float>) -> Self {
        RevoluteJoint {
            axis,
            unbounded: false,
        }
    }

    pub fn continuous(axis: UnitVector3<Float>) -> Self {
        RevoluteJoint {
            axis,
            unbounded: true,
        }
    }

    /// Rotation about axis by q
    pub fn transform(&self, q: &[Float]) -> Isometry3<Float> {
        Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&self.axis, q[0]),
        )
    }

    pub fn motion_subspace(&self) -> GeometricJacobian {
        GeometricJacobian {
            angular: Matrix3xX::from_column_slice(self.axis.as_slice()),
            linear: Matrix3xX::zeros(1),
        }
    }

    /// Continuous joints draw their angle from [-π, π] whatever the limits.
    pub fn random_configuration<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lower: &[Float],
        upper: &[Float],
        out: &mut [Float],
    ) {
        out[0] = if self.unbounded {
            rng.random_range(-PI..=PI)
        } else {
            rng.random_range(lower[0]..=upper[0])
        };
    }
}

#[cfg(test)]
mod revolute_tests {
    use crate::assert_vec_close;
    use super::*;
    use crate::spatial::transform::IsometryExt;

    #[test]
    fn quarter_turn_about_z() {
        // Arrange
        let joint = RevoluteJoint::default();

        // Act
        let iso = joint.transform(&[PI / 2.0]);

        // Assert
        let x = iso.rotation * Vector3::x();
        assert_vec_close!(x, Vector3::<Float>::y(), 1e-12);
        assert_eq!(iso.trans(), Vector3::zeros());
    }

    #[test]
    fn continuous_joint_ignores_limits() {
        let joint = RevoluteJoint::continuous(Vector3::x_axis());
        let mut rng = rand::rng();
        let mut out = [0.];
        for _ in 0..20 {
            joint.random_configuration(
                &mut rng,
                &[Float::NEG_INFINITY],
                &[Float::INFINITY],
                &mut out,
            );
            assert!(out[0].abs() <= PI);
        }
    }
}
