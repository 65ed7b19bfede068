use na::{Isometry3, Matrix3, Matrix3xX, Quaternion, Translation3, UnitQuaternion};
use rand::Rng;

use crate::{
    spatial::{
        explog::{exp6, log6},
        geometric_jacobian::GeometricJacobian,
        spatial_vector::SpatialVector,
        transform::IsometryExt,
    },
    types::Float,
    TWO_PI,
};

/// A free-flyer joint: six unconstrained degrees of freedom.
///
/// q = [x y z qx qy qz qw], the placement of the successor in the predecessor.
/// v = [vx vy vz wx wy wz], the successor twist in its own frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatingJoint;

impl FloatingJoint {
    pub fn transform(&self, q: &[Float]) -> Isometry3<Float> {
        isometry_from_xyzquat(q)
    }

    pub fn motion_subspace(&self) -> GeometricJacobian {
        GeometricJacobian {
            angular: {
                let mut matrix = Matrix3xX::zeros(6);
                matrix
                    .fixed_view_mut::<3, 3>(0, 3)
                    .copy_from(&Matrix3::identity());
                matrix
            },
            linear: {
                let mut matrix = Matrix3xX::zeros(6);
                matrix
                    .fixed_view_mut::<3, 3>(0, 0)
                    .copy_from(&Matrix3::identity());
                matrix
            },
        }
    }

    /// q ⊕ v = M(q) · exp6(v)
    pub fn integrate(&self, q: &[Float], v: &[Float], out: &mut [Float]) {
        let m = isometry_from_xyzquat(q) * exp6(&SpatialVector::from_slice(v));
        write_xyzquat(&m, out);
    }

    /// log6(M(q0)⁻¹ · M(q1)), the local twist carrying q0 to q1 in unit time
    pub fn difference(&self, q0: &[Float], q1: &[Float], out: &mut [Float]) {
        let m0 = isometry_from_xyzquat(q0);
        let m1 = isometry_from_xyzquat(q1);
        let nu = log6(&(m0.inverse() * m1));
        out[..6].copy_from_slice(nu.to_vector6().as_slice());
    }

    pub fn neutral(&self, out: &mut [Float]) {
        out[..7].copy_from_slice(&[0., 0., 0., 0., 0., 0., 1.]);
    }

    /// Translation uniform within the bounds, rotation uniform over SO(3).
    pub fn random_configuration<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lower: &[Float],
        upper: &[Float],
        out: &mut [Float],
    ) {
        for i in 0..3 {
            out[i] = rng.random_range(lower[i]..=upper[i]);
        }
        let rotation = uniform_rotation(rng);
        out[3..7].copy_from_slice(rotation.coords.as_slice());
    }

    pub fn normalize(&self, q: &mut [Float]) {
        let quat = UnitQuaternion::new_normalize(Quaternion::new(q[6], q[3], q[4], q[5]));
        q[3..7].copy_from_slice(quat.coords.as_slice());
    }
}

/// Placement encoded by `[x y z qx qy qz qw]`. The quaternion is normalized.
pub fn isometry_from_xyzquat(q: &[Float]) -> Isometry3<Float> {
    Isometry3::from_parts(
        Translation3::new(q[0], q[1], q[2]),
        UnitQuaternion::new_normalize(Quaternion::new(q[6], q[3], q[4], q[5])),
    )
}

/// Inverse of [`isometry_from_xyzquat`], written to the head of `out`
pub fn write_xyzquat(m: &Isometry3<Float>, out: &mut [Float]) {
    out[..7].copy_from_slice(&m.to_xyzquat());
}

/// Shoemake's subgroup algorithm
/// Reference: "Uniform random rotations", Graphics Gems III
pub fn uniform_rotation<R: Rng + ?Sized>(rng: &mut R) -> UnitQuaternion<Float> {
    let u1: Float = rng.random_range(0.0..1.0);
    let u2: Float = rng.random_range(0.0..1.0);
    let u3: Float = rng.random_range(0.0..1.0);
    let r1 = (1. - u1).sqrt();
    let r2 = u1.sqrt();
    let (s2, c2) = (TWO_PI * u2).sin_cos();
    let (s3, c3) = (TWO_PI * u3).sin_cos();
    UnitQuaternion::new_normalize(Quaternion::new(r2 * c3, r1 * s2, r1 * c2, r2 * s3))
}
