use na::{Isometry3, Matrix2, Matrix3xX, Rotation2, Translation3, UnitQuaternion, Vector2, Vector3};
use rand::Rng;

use crate::{spatial::geometric_jacobian::GeometricJacobian, types::Float, PI};

/// Below this angle the SE(2) exponential uses its Taylor series
const SMALL_ANGLE: Float = 1e-6;

/// Motion in the xy-plane of the predecessor frame.
///
/// q = [x y θ], v = [vx vy ω] with the linear part in the successor frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarJoint;

impl PlanarJoint {
    pub fn transform(&self, q: &[Float]) -> Isometry3<Float> {
        Isometry3::from_parts(
            Translation3::new(q[0], q[1], 0.),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), q[2]),
        )
    }

    #[rustfmt::skip]
    pub fn motion_subspace(&self) -> GeometricJacobian {
        GeometricJacobian {
            angular: Matrix3xX::from_column_slice(&[
                0., 0., 0.,
                0., 0., 0.,
                0., 0., 1.,
            ]),
            linear: Matrix3xX::from_column_slice(&[
                1., 0., 0.,
                0., 1., 0.,
                0., 0., 0.,
            ]),
        }
    }

    /// Compose with the SE(2) exponential of the local velocity
    pub fn integrate(&self, q: &[Float], v: &[Float], out: &mut [Float]) {
        let omega = v[2];
        let dp = se2_left_jacobian(omega) * Vector2::new(v[0], v[1]);
        let p = Vector2::new(q[0], q[1]) + Rotation2::new(q[2]) * dp;
        out[0] = p.x;
        out[1] = p.y;
        out[2] = q[2] + omega;
    }

    /// SE(2) logarithm of q0⁻¹ q1, with the angle wrapped to (-π, π]
    pub fn difference(&self, q0: &[Float], q1: &[Float], out: &mut [Float]) {
        let dtheta = (q1[2] - q0[2]).sin().atan2((q1[2] - q0[2]).cos());
        let dp = Rotation2::new(q0[2]).inverse() * Vector2::new(q1[0] - q0[0], q1[1] - q0[1]);
        // V is a scaled rotation, never singular for |θ| <= π
        let v = se2_left_jacobian(dtheta).try_inverse().unwrap_or_else(Matrix2::identity) * dp;
        out[0] = v.x;
        out[1] = v.y;
        out[2] = dtheta;
    }

    /// Position uniform within the bounds, angle uniform in [-π, π]
    pub fn random_configuration<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lower: &[Float],
        upper: &[Float],
        out: &mut [Float],
    ) {
        out[0] = rng.random_range(lower[0]..=upper[0]);
        out[1] = rng.random_range(lower[1]..=upper[1]);
        out[2] = rng.random_range(-PI..=PI);
    }
}

/// V(θ) such that exp([vx vy θ]) translates by V(θ)·[vx vy]
fn se2_left_jacobian(theta: Float) -> Matrix2<Float> {
    let (a, b) = if theta.abs() < SMALL_ANGLE {
        (1. - theta * theta / 6., theta / 2.)
    } else {
        (theta.sin() / theta, (1. - theta.cos()) / theta)
    };
    Matrix2::new(a, -b, b, a)
}
