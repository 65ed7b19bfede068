use na::{Matrix3, Matrix3xX, Vector3};

use crate::types::Float;

/// Multiply a spatial inertia with a spatial motion vector
/// | J         c_hat | | w |   | Jw        + c_hat v |
/// | c_hat^T   m     | | v | = | c_hat^T w + mv      |
pub fn mul_inertia(
    J: &Matrix3<Float>,
    c: &Vector3<Float>,
    m: Float,
    w: &Vector3<Float>,
    v: &Vector3<Float>,
) -> (Vector3<Float>, Vector3<Float>) {
    let angular = J * w + c.cross(v);
    let linear = m * v - c.cross(w);
    (angular, linear)
}

/// Also known as spatial motion cross product
/// Reference: Chapter 2.9 Spatial Cross Products in "Robot Dynamics Algorithms" by Roy Featherstone
pub fn se3_commutator(
    xw: &Vector3<Float>,
    xv: &Vector3<Float>,
    yw: &Vector3<Float>,
    yv: &Vector3<Float>,
) -> (Vector3<Float>, Vector3<Float>) {
    let angular = xw.cross(yw);
    let linear = xw.cross(yv) + xv.cross(yw);
    (angular, linear)
}

/// Perform column-wise cross product
pub fn colwise_cross(a: &Vector3<Float>, b: &Matrix3xX<Float>) -> Matrix3xX<Float> {
    let ncols = b.ncols();
    let mut result = Matrix3xX::zeros(ncols);
    for i in 0..ncols {
        result.set_column(i, &a.cross(&b.column(i)));
    }
    result
}

/// Returns the skew-symmetric matrix [v]x such that [v]x * u = v x u
#[rustfmt::skip]
pub fn skew_symmetric(v: &Vector3<Float>) -> Matrix3<Float> {
    Matrix3::new(
        0., -v.z, v.y,
        v.z, 0., -v.x,
        -v.y, v.x, 0.,
    )
}

/// Reorder a `[x y z qx qy qz qw]` pose into the `[x y z qw qx qy qz]` layout
/// the viewer expects.
pub fn xyzquat_to_viewer_configuration(xyzquat: &[Float; 7]) -> [Float; 7] {
    [
        xyzquat[0], xyzquat[1], xyzquat[2], xyzquat[6], xyzquat[3], xyzquat[4], xyzquat[5],
    ]
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        let diff = (left - right).abs();
        if diff > tol {
            panic!(
                "assertion failed: {} ~= {} \
                (tolerance: {}, difference: {})",
                left, right, tol, diff
            );
        }
    };
}

#[macro_export]
macro_rules! assert_vec_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        assert_eq!(left.len(), right.len(), "length mismatch");
        let tol = $tolerance;
        for (a, b) in left.iter().zip(right.iter()) {
            $crate::assert_close!(a, b, tol);
        }
    };
}


#[cfg(test)]
mod util_tests {
    use super::*;
    use na::vector;

    #[test]
    fn skew_matches_cross() {
        let a = vector![1., -2., 3.];
        let b = vector![0.5, 4., -1.];
        assert_vec_close!(skew_symmetric(&a) * b, a.cross(&b), 1e-12);
    }

    #[test]
    fn viewer_configuration_moves_w_first() {
        let xyzquat = [1., 2., 3., 0.1, 0.2, 0.3, 0.9];
        assert_eq!(
            xyzquat_to_viewer_configuration(&xyzquat),
            [1., 2., 3., 0.9, 0.1, 0.2, 0.3]
        );
    }
}
