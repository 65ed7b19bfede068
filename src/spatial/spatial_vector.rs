use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use na::{zero, Vector3, Vector6};

use crate::{spatial::wrench::Wrench, types::Float, util::se3_commutator};

/// A spatial motion vector: a twist, or the spatial acceleration of a body.
/// Flattened as `[linear; angular]` when it crosses a public vector
/// boundary.
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct SpatialVector {
    pub angular: Vector3<Float>,
    pub linear: Vector3<Float>,
}

impl SpatialVector {
    pub fn zero() -> Self {
        SpatialVector {
            angular: zero(),
            linear: zero(),
        }
    }

    pub fn new(angular: Vector3<Float>, linear: Vector3<Float>) -> Self {
        SpatialVector { angular, linear }
    }

    pub fn angular(angular: Vector3<Float>) -> Self {
        SpatialVector {
            angular,
            linear: zero(),
        }
    }

    pub fn linear(linear: Vector3<Float>) -> Self {
        SpatialVector {
            angular: zero(),
            linear,
        }
    }

    /// Read a `[linear; angular]` six-vector from the head of `s`.
    pub fn from_slice(s: &[Float]) -> Self {
        SpatialVector {
            linear: Vector3::new(s[0], s[1], s[2]),
            angular: Vector3::new(s[3], s[4], s[5]),
        }
    }

    pub fn to_vector6(&self) -> Vector6<Float> {
        Vector6::new(
            self.linear.x,
            self.linear.y,
            self.linear.z,
            self.angular.x,
            self.angular.y,
            self.angular.z,
        )
    }

    /// Motion cross product, self ×ₘ other
    pub fn cross_motion(&self, other: &SpatialVector) -> SpatialVector {
        let (angular, linear) =
            se3_commutator(&self.angular, &self.linear, &other.angular, &other.linear);
        SpatialVector { angular, linear }
    }

    /// Force cross product, self ×* force
    pub fn cross_force(&self, force: &Wrench) -> Wrench {
        Wrench {
            angular: self.angular.cross(&force.angular) + self.linear.cross(&force.linear),
            linear: self.angular.cross(&force.linear),
        }
    }
}

impl Mul<Float> for &SpatialVector {
    type Output = SpatialVector;

    fn mul(self, rhs: Float) -> Self::Output {
        SpatialVector {
            angular: self.angular * rhs,
            linear: self.linear * rhs,
        }
    }
}

impl Mul<Float> for SpatialVector {
    type Output = SpatialVector;

    fn mul(self, rhs: Float) -> Self::Output {
        &self * rhs
    }
}

impl Add for &SpatialVector {
    type Output = SpatialVector;

    fn add(self, rhs: Self) -> Self::Output {
        SpatialVector {
            angular: self.angular + rhs.angular,
            linear: self.linear + rhs.linear,
        }
    }
}

impl Add for SpatialVector {
    type Output = SpatialVector;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl AddAssign for SpatialVector {
    fn add_assign(&mut self, rhs: Self) {
        self.angular += rhs.angular;
        self.linear += rhs.linear;
    }
}

impl Sub for SpatialVector {
    type Output = SpatialVector;

    fn sub(self, rhs: Self) -> Self::Output {
        SpatialVector {
            angular: self.angular - rhs.angular,
            linear: self.linear - rhs.linear,
        }
    }
}

impl Neg for SpatialVector {
    type Output = SpatialVector;

    fn neg(self) -> Self::Output {
        SpatialVector {
            angular: -self.angular,
            linear: -self.linear,
        }
    }
}

#[cfg(test)]
mod spatial_vector_tests {
    use crate::{assert_close, assert_vec_close};
    use na::vector;

    use super::*;

    #[test]
    fn flattening_puts_linear_first() {
        let v = SpatialVector::new(vector![1., 2., 3.], vector![4., 5., 6.]);
        let flat = v.to_vector6();
        assert_eq!(flat, Vector6::new(4., 5., 6., 1., 2., 3.));
        assert_eq!(SpatialVector::from_slice(flat.as_slice()), v);
    }

    #[test]
    fn cross_with_itself_vanishes() {
        // Arrange
        let v = SpatialVector::new(vector![0.3, -1., 2.], vector![1., 0.5, -0.2]);

        // Act
        let vxv = v.cross_motion(&v);

        // Assert
        assert_vec_close!(vxv.angular, Vector3::<Float>::zeros(), 1e-12);
        assert_vec_close!(vxv.linear, Vector3::<Float>::zeros(), 1e-12);
    }

    /// Motion and force cross products are dual: (v ×* f) · m = -f · (v ×ₘ m)
    #[test]
    fn force_cross_is_dual_of_motion_cross() {
        let v = SpatialVector::new(vector![0.3, -1., 2.], vector![1., 0.5, -0.2]);
        let m = SpatialVector::new(vector![-0.7, 0.1, 0.4], vector![2., -1., 0.3]);
        let f = Wrench::new(vector![0.2, 0.9, -1.1], vector![0.5, 0.5, 1.5]);

        let lhs = v.cross_force(&f).dot(&m);
        let rhs = -f.dot(&v.cross_motion(&m));

        assert_close!(lhs, rhs, 1e-12);
    }
}
