use na::{Isometry3, Matrix3, Translation3, UnitQuaternion, Vector3};

use crate::{
    spatial::{spatial_vector::SpatialVector, wrench::Wrench},
    types::Float,
};

/// SE(3) action of a placement on spatial quantities.
///
/// A placement `aMb` maps coordinates in frame b to frame a. `act_*` moves a
/// quantity expressed in b into a, `act_inv_*` goes the other way.
pub trait IsometryExt {
    fn act_motion(&self, m: &SpatialVector) -> SpatialVector;

    fn act_inv_motion(&self, m: &SpatialVector) -> SpatialVector;

    fn act_force(&self, f: &Wrench) -> Wrench;

    fn act_inv_force(&self, f: &Wrench) -> Wrench;

    /// `[x y z qx qy qz qw]`
    fn to_xyzquat(&self) -> [Float; 7];

    fn rot(&self) -> Matrix3<Float>;

    fn trans(&self) -> Vector3<Float>;
}

impl IsometryExt for Isometry3<Float> {
    fn act_motion(&self, m: &SpatialVector) -> SpatialVector {
        let angular = self.rotation * m.angular;
        let linear = self.rotation * m.linear + self.translation.vector.cross(&angular);
        SpatialVector { angular, linear }
    }

    fn act_inv_motion(&self, m: &SpatialVector) -> SpatialVector {
        let p = self.translation.vector;
        let angular = self.rotation.inverse_transform_vector(&m.angular);
        let linear = self
            .rotation
            .inverse_transform_vector(&(m.linear - p.cross(&m.angular)));
        SpatialVector { angular, linear }
    }

    fn act_force(&self, f: &Wrench) -> Wrench {
        let linear = self.rotation * f.linear;
        let angular = self.rotation * f.angular + self.translation.vector.cross(&linear);
        Wrench { angular, linear }
    }

    fn act_inv_force(&self, f: &Wrench) -> Wrench {
        let p = self.translation.vector;
        let linear = self.rotation.inverse_transform_vector(&f.linear);
        let angular = self
            .rotation
            .inverse_transform_vector(&(f.angular - p.cross(&f.linear)));
        Wrench { angular, linear }
    }

    fn to_xyzquat(&self) -> [Float; 7] {
        let t = self.translation.vector;
        let q = self.rotation.coords;
        [t.x, t.y, t.z, q.x, q.y, q.z, q.w]
    }

    fn rot(&self) -> Matrix3<Float> {
        self.rotation.to_rotation_matrix().into_inner()
    }

    fn trans(&self) -> Vector3<Float> {
        self.translation.vector
    }
}

/// Placement from URDF-style `xyz` and roll-pitch-yaw
pub fn xyz_rpy(xyz: &Vector3<Float>, rpy: &Vector3<Float>) -> Isometry3<Float> {
    let translation = Translation3::new(xyz.x, xyz.y, xyz.z);
    let rotation = UnitQuaternion::from_euler_angles(rpy.x, rpy.y, rpy.z);
    Isometry3::from_parts(translation, rotation)
}

#[cfg(test)]
mod transform_tests {
    use crate::{assert_close, assert_vec_close};
    use na::vector;

    use super::*;

    fn placement() -> Isometry3<Float> {
        xyz_rpy(&vector![1., -0.5, 2.], &vector![0.3, 0.1, -1.2])
    }

    #[test]
    fn motion_action_round_trips() {
        // Arrange
        let m = placement();
        let v = SpatialVector::new(vector![0.1, 0.2, -0.3], vector![1., 2., 3.]);

        // Act
        let back = m.act_inv_motion(&m.act_motion(&v));

        // Assert
        assert_vec_close!(back.angular, v.angular, 1e-12);
        assert_vec_close!(back.linear, v.linear, 1e-12);
    }

    /// Power is frame independent
    #[test]
    fn force_action_preserves_power() {
        let m = placement();
        let v = SpatialVector::new(vector![0.1, 0.2, -0.3], vector![1., 2., 3.]);
        let f = Wrench::new(vector![-1., 0.4, 0.], vector![0.2, 0.2, 5.]);

        let power_local = f.dot(&v);
        let power_moved = m.act_force(&f).dot(&m.act_motion(&v));
        assert_close!(power_local, power_moved, 1e-12);

        let back = m.act_inv_force(&m.act_force(&f));
        assert_vec_close!(back.angular, f.angular, 1e-12);
    }

    #[test]
    fn xyzquat_is_scalar_last() {
        let m = Isometry3::from_parts(
            Translation3::new(1., 2., 3.),
            UnitQuaternion::from_euler_angles(0., 0., std::f64::consts::FRAC_PI_2),
        );
        let x = m.to_xyzquat();
        assert_eq!(&x[..3], &[1., 2., 3.]);
        assert_close!(x[5], (0.5 as Float).sqrt(), 1e-12);
        assert_close!(x[6], (0.5 as Float).sqrt(), 1e-12);
    }
}
