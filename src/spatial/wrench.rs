use std::ops::{Add, AddAssign, Sub, SubAssign};

use na::{Vector3, Vector6};

use crate::{spatial::spatial_vector::SpatialVector, types::Float};

/// A wrench represents a system of forces.
/// The wrench w^i expressed in frame i in defined as
///     w^i = (τ^i f^i) = ∑ over j (r_j^i \cross f_j^i   f_j^i)
/// where the f_j^i are forces expressed in frame i, exerted at positions r_j^i.
/// τ^i is the total torque and f^i is the total force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wrench {
    pub angular: Vector3<Float>,
    pub linear: Vector3<Float>,
}

impl Wrench {
    pub fn zero() -> Self {
        Wrench {
            angular: Vector3::zeros(),
            linear: Vector3::zeros(),
        }
    }

    pub fn new(angular: Vector3<Float>, linear: Vector3<Float>) -> Self {
        Wrench { angular, linear }
    }

    /// Return the wrench of a force applied at point
    pub fn from_force(point: &Vector3<Float>, force: &Vector3<Float>) -> Self {
        Wrench {
            angular: point.cross(force),
            linear: *force,
        }
    }

    /// Power of this wrench against a motion
    pub fn dot(&self, motion: &SpatialVector) -> Float {
        self.angular.dot(&motion.angular) + self.linear.dot(&motion.linear)
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
}

impl<'a, 'b> Add<&'b Wrench> for &'a Wrench {
    type Output = Wrench;

    fn add(self, rhs: &Wrench) -> Wrench {
        Wrench {
            angular: self.angular + rhs.angular,
            linear: self.linear + rhs.linear,
        }
    }
}

impl Add for Wrench {
    type Output = Wrench;

    fn add(self, rhs: Wrench) -> Wrench {
        &self + &rhs
    }
}

impl AddAssign for Wrench {
    fn add_assign(&mut self, rhs: Self) {
        self.angular += rhs.angular;
        self.linear += rhs.linear;
    }
}

impl<'a, 'b> Sub<&'b Wrench> for &'a Wrench {
    type Output = Wrench;

    fn sub(self, rhs: &Wrench) -> Wrench {
        Wrench {
            angular: self.angular - rhs.angular,
            linear: self.linear - rhs.linear,
        }
    }
}

impl Sub for Wrench {
    type Output = Wrench;

    fn sub(self, rhs: Wrench) -> Wrench {
        &self - &rhs
    }
}

impl SubAssign<&Wrench> for Wrench {
    fn sub_assign(&mut self, rhs: &Wrench) {
        self.angular -= rhs.angular;
        self.linear -= rhs.linear;
    }
}

#[cfg(test)]
mod wrench_tests {
    use na::vector;

    use super::*;

    #[test]
    fn force_at_point_produces_moment() {
        // Arrange
        let point = vector![1., 0., 0.];
        let force = vector![0., 0., -10.];

        // Act
        let w = Wrench::from_force(&point, &force);

        // Assert
        assert_eq!(w.angular, vector![0., 10., 0.]);
        assert_eq!(w.to_vector6(), Vector6::new(0., 0., -10., 0., 10., 0.));
    }
}
