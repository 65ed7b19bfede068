use std::ops::{Add, AddAssign};

use na::{Isometry3, Matrix3, Matrix6, Point3, Vector3};

use crate::{
    spatial::{spatial_vector::SpatialVector, transform::IsometryExt, wrench::Wrench},
    types::Float,
    util::{mul_inertia, skew_symmetric},
};

/// A spatial inertia, or inertia matrix, represents the mass distribution of a
/// rigid body.
/// A spatial inertia expressed in frame i is defined as:
/// I^i = | J         c_hat |
///       | c_hat^T     mI  |
/// where J is the mass moment of inertia, m is the total mass, and c is the
/// 'cross part', which is the center of mass position scaled by m.
///
/// !!! Warning
///     The __moment__ field of a __SpatialInertia__ is the moment of inertia
///     about the origin of its frame, not about the center of mass.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialInertia {
    pub moment: Matrix3<Float>,
    pub cross_part: Vector3<Float>,
    pub mass: Float,
}

impl SpatialInertia {
    pub fn new(moment: Matrix3<Float>, cross_part: Vector3<Float>, mass: Float) -> Self {
        SpatialInertia {
            moment,
            cross_part,
            mass,
        }
    }

    pub fn zero() -> Self {
        SpatialInertia {
            moment: Matrix3::zeros(),
            cross_part: Vector3::zeros(),
            mass: 0.,
        }
    }

    /// Build from mass, center of mass, and the rotational inertia about the
    /// center of mass, all expressed in the body frame.
    pub fn from_com(mass: Float, com: &Vector3<Float>, inertia_com: &Matrix3<Float>) -> Self {
        let moment = inertia_com
            + mass * (com.norm_squared() * Matrix3::identity() - com * com.transpose());
        SpatialInertia {
            moment,
            cross_part: mass * com,
            mass,
        }
    }

    /// Center of mass in the inertia's frame. Origin for a massless body.
    pub fn center_of_mass(&self) -> Point3<Float> {
        if self.mass <= 0. {
            return Point3::origin();
        }
        Point3::from(self.cross_part / self.mass)
    }

    /// Re-express the inertia in the frame `iso` maps into
    pub fn transform(&self, iso: &Isometry3<Float>) -> SpatialInertia {
        let R = iso.rot();
        let p = iso.trans();

        let J = self.moment;
        let mc = self.cross_part;
        let m = self.mass;

        let Rmc = R * mc;
        let mp = m * p;
        let mcnew = Rmc + mp;
        let X = Rmc * p.transpose();
        let Y = X + X.transpose() + mp * p.transpose();
        let Jnew = R * J * R.transpose() - Y + Y.trace() * Matrix3::identity();

        SpatialInertia {
            moment: Jnew,
            cross_part: mcnew,
            mass: m,
        }
    }

    /// Momentum of the body moving with `motion`
    pub fn mul_motion(&self, motion: &SpatialVector) -> Wrench {
        let (angular, linear) = mul_inertia(
            &self.moment,
            &self.cross_part,
            self.mass,
            &motion.angular,
            &motion.linear,
        );
        Wrench { angular, linear }
    }

    /// 6x6 matrix acting on `[linear; angular]` motions
    pub fn matrix(&self) -> Matrix6<Float> {
        let c_hat = skew_symmetric(&self.cross_part);
        let mut out = Matrix6::zeros();
        out.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&(self.mass * Matrix3::identity()));
        out.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-c_hat));
        out.fixed_view_mut::<3, 3>(3, 0).copy_from(&c_hat);
        out.fixed_view_mut::<3, 3>(3, 3).copy_from(&self.moment);
        out
    }
}

impl<'a, 'b> Add<&'b SpatialInertia> for &'a SpatialInertia {
    type Output = SpatialInertia;

    fn add(self, rhs: &SpatialInertia) -> SpatialInertia {
        SpatialInertia {
            moment: self.moment + rhs.moment,
            cross_part: self.cross_part + rhs.cross_part,
            mass: self.mass + rhs.mass,
        }
    }
}

impl<'a, 'b> AddAssign<&'b SpatialInertia> for SpatialInertia {
    fn add_assign(&mut self, rhs: &Self) {
        self.moment += rhs.moment;
        self.cross_part += rhs.cross_part;
        self.mass += rhs.mass;
    }
}

#[cfg(test)]
mod inertia_tests {
    use crate::{assert_close, assert_vec_close};
    use na::{vector, Translation3, UnitQuaternion};

    use super::*;

    #[test]
    fn point_mass_moment_about_origin() {
        // Arrange
        let m = 2.;
        let c = vector![1., 0., 0.];

        // Act
        let inertia = SpatialInertia::from_com(m, &c, &Matrix3::zeros());

        // Assert
        assert_close!(inertia.moment[(0, 0)], 0., 1e-12);
        assert_close!(inertia.moment[(1, 1)], 2., 1e-12);
        assert_close!(inertia.moment[(2, 2)], 2., 1e-12);
        assert_vec_close!(inertia.center_of_mass().coords, c, 1e-12);
    }

    /// Moving the body and moving the inertia must give the same momentum
    #[test]
    fn transform_is_consistent_with_momentum() {
        // Arrange
        let inertia = SpatialInertia::from_com(
            1.5,
            &vector![0.1, -0.2, 0.3],
            &Matrix3::from_diagonal(&vector![0.02, 0.03, 0.04]),
        );
        let iso = Isometry3::from_parts(
            Translation3::new(0.5, 1., -0.3),
            UnitQuaternion::from_euler_angles(0.4, -0.2, 0.9),
        );
        let v = SpatialVector::new(vector![0.3, -0.1, 0.8], vector![1., 0., -2.]);

        // Act
        let moved = inertia.transform(&iso);

        // Assert
        let expected = iso.act_force(&inertia.mul_motion(&v));
        let actual = moved.mul_motion(&iso.act_motion(&v));
        assert_vec_close!(actual.angular, expected.angular, 1e-12);
        assert_vec_close!(actual.linear, expected.linear, 1e-12);
    }

    #[test]
    fn matrix_agrees_with_mul_motion() {
        let inertia = SpatialInertia::from_com(
            3.,
            &vector![0., 0.2, 0.1],
            &Matrix3::from_diagonal(&vector![0.1, 0.2, 0.3]),
        );
        let v = SpatialVector::new(vector![0.3, -0.1, 0.8], vector![1., 0., -2.]);
        let h = inertia.matrix() * v.to_vector6();
        assert_vec_close!(h, inertia.mul_motion(&v).to_vector6(), 1e-12);
    }
}
