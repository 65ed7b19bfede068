//! Exponential and logarithm maps of SO(3) and SE(3).
//!
//! Reference: Appendix of "Modern Robotics" by Lynch & Park, and
//! "A micro Lie theory for state estimation in robotics" by Solà et al.

use na::{Isometry3, Matrix3, Translation3, UnitQuaternion, Vector3};

use crate::{spatial::spatial_vector::SpatialVector, types::Float, util::skew_symmetric};

/// Below this angle the closed forms are replaced by their Taylor series
const SMALL_ANGLE: Float = 1e-4;

/// Rotation of angle |ω| about ω/|ω|
pub fn exp3(omega: &Vector3<Float>) -> UnitQuaternion<Float> {
    UnitQuaternion::from_scaled_axis(*omega)
}

/// Inverse of [`exp3`], with angle in [0, π]
pub fn log3(rotation: &UnitQuaternion<Float>) -> Vector3<Float> {
    rotation.scaled_axis()
}

/// Left Jacobian of SO(3), V(ω), which maps the linear part of a twist to
/// the translation of its exponential
fn left_jacobian(omega: &Vector3<Float>) -> Matrix3<Float> {
    let t = omega.norm();
    let w = skew_symmetric(omega);
    let w2 = w * w;
    let (a, b) = if t < SMALL_ANGLE {
        let t2 = t * t;
        (0.5 - t2 / 24., 1. / 6. - t2 / 120.)
    } else {
        let t2 = t * t;
        ((1. - t.cos()) / t2, (t - t.sin()) / (t2 * t))
    };
    Matrix3::identity() + a * w + b * w2
}

/// Inverse of [`left_jacobian`]
fn left_jacobian_inv(omega: &Vector3<Float>) -> Matrix3<Float> {
    let t = omega.norm();
    let w = skew_symmetric(omega);
    let w2 = w * w;
    let c = if t < SMALL_ANGLE {
        1. / 12. + t * t / 720.
    } else {
        (1. - t * t.sin() / (2. * (1. - t.cos()))) / (t * t)
    };
    Matrix3::identity() - 0.5 * w + c * w2
}

/// Placement reached by following the constant twist `nu` for unit time
pub fn exp6(nu: &SpatialVector) -> Isometry3<Float> {
    let rotation = exp3(&nu.angular);
    let translation = left_jacobian(&nu.angular) * nu.linear;
    Isometry3::from_parts(Translation3::from(translation), rotation)
}

/// Inverse of [`exp6`]
pub fn log6(m: &Isometry3<Float>) -> SpatialVector {
    let angular = log3(&m.rotation);
    let linear = left_jacobian_inv(&angular) * m.translation.vector;
    SpatialVector { angular, linear }
}
