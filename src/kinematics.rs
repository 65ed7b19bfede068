use na::DVector;

use crate::{data::Data, model::Model, spatial::transform::IsometryExt, types::Float};

/// Inputs of a kinematic pass, one variant per derivative order.
#[derive(Clone, Copy, Debug)]
pub enum KinematicsLevel<'a> {
    Position(&'a DVector<Float>),
    Velocity(&'a DVector<Float>, &'a DVector<Float>),
    Acceleration(&'a DVector<Float>, &'a DVector<Float>, &'a DVector<Float>),
}

impl<'a> KinematicsLevel<'a> {
    pub fn q(&self) -> &'a DVector<Float> {
        match *self {
            KinematicsLevel::Position(q)
            | KinematicsLevel::Velocity(q, _)
            | KinematicsLevel::Acceleration(q, _, _) => q,
        }
    }

    pub fn v(&self) -> Option<&'a DVector<Float>> {
        match *self {
            KinematicsLevel::Position(_) => None,
            KinematicsLevel::Velocity(_, v) | KinematicsLevel::Acceleration(_, v, _) => Some(v),
        }
    }

    pub fn a(&self) -> Option<&'a DVector<Float>> {
        match *self {
            KinematicsLevel::Acceleration(_, _, a) => Some(a),
            _ => None,
        }
    }
}

/// Update the joint placements, and with them the joint velocities and
/// accelerations when the level provides them.
///
/// Velocities and accelerations are expressed in the joint frame. A joint's
/// own contribution is S·v, and S·a + v ×ₘ S·v for the acceleration.
pub fn forward_kinematics(model: &Model, data: &mut Data, level: KinematicsLevel) {
    let q = level.q().as_slice();
    let v = level.v().map(|v| v.as_slice());
    let a = level.a().map(|a| a.as_slice());

    for i in 1..model.njoints() {
        let joint = &model.joints[i];
        let parent = model.parents[i];

        data.li_mi[i] = model.joint_placements[i] * joint.transform(model.joint_q(i, q));
        data.o_mi[i] = data.o_mi[parent] * data.li_mi[i];

        let Some(v) = v else {
            continue;
        };
        let vj = joint.joint_velocity(model.joint_v(i, v));
        data.v[i] = data.li_mi[i].act_inv_motion(&data.v[parent]) + vj;

        if let Some(a) = a {
            let aj = joint.joint_velocity(model.joint_v(i, a));
            data.a[i] = data.li_mi[i].act_inv_motion(&data.a[parent])
                + aj
                + data.v[i].cross_motion(&vj);
        }
    }
}

#[cfg(test)]
mod kinematics_tests {
    use crate::{assert_close, assert_vec_close};
    use na::{dvector, vector, Isometry3, Vector3};

    use super::*;
    use crate::{
        configuration::{integrate, random_configuration},
        inertia::SpatialInertia,
        joint::{revolute::RevoluteJoint, JointModel},
        parser::build_model_from_urdf,
        spatial::explog::log6,
        util::test_utils::{random_dvector, SIMPLE_ARM_URDF},
        PI,
    };

    /// Two revolute joints about z, links of length 1 along x
    fn planar_double_pendulum() -> Model {
        let mut model = Model::new("double_pendulum");
        let shoulder = model.add_joint(
            0,
            JointModel::Revolute(RevoluteJoint::new(Vector3::z_axis())),
            Isometry3::identity(),
            "shoulder",
            "upper",
            None,
        );
        model.add_joint(
            shoulder,
            JointModel::Revolute(RevoluteJoint::new(Vector3::z_axis())),
            Isometry3::translation(1., 0., 0.),
            "elbow",
            "lower",
            None,
        );
        let rod = SpatialInertia::from_com(1., &vector![0.5, 0., 0.], &na::Matrix3::zeros());
        model.append_body_to_joint(1, &rod, &Isometry3::identity());
        model.append_body_to_joint(2, &rod, &Isometry3::identity());
        model
    }

    #[test]
    fn placements_of_double_pendulum() {
        // Arrange
        let model = planar_double_pendulum();
        let mut data = model.create_data();
        let q = dvector![PI / 2., -PI / 2.];

        // Act
        forward_kinematics(&model, &mut data, KinematicsLevel::Position(&q));

        // Assert
        assert_vec_close!(data.o_mi[2].translation.vector, vector![0., 1., 0.], 1e-12);
        assert_close!(data.o_mi[2].rotation.angle(), 0., 1e-12);
    }

    #[test]
    fn velocity_of_double_pendulum() {
        // Arrange
        let model = planar_double_pendulum();
        let mut data = model.create_data();
        let q = dvector![0., 0.];
        let v = dvector![1., 2.];

        // Act
        forward_kinematics(&model, &mut data, KinematicsLevel::Velocity(&q, &v));

        // Assert: the elbow frame spins at 3 rad/s and its origin moves at 1 m/s
        assert_vec_close!(data.v[2].angular, vector![0., 0., 3.], 1e-12);
        assert_vec_close!(data.v[2].linear, vector![0., 1., 0.], 1e-12);
    }

    #[test]
    fn centripetal_acceleration() {
        // Arrange
        let model = planar_double_pendulum();
        let mut data = model.create_data();
        let q = dvector![0., 0.];
        let v = dvector![2., 0.];
        let a = dvector![0., 0.];

        // Act
        forward_kinematics(&model, &mut data, KinematicsLevel::Acceleration(&q, &v, &a));

        // Assert: classical acceleration of the elbow origin is -ω² r x̂
        let (w, lin) = (data.v[2].angular, data.v[2].linear);
        let classical = data.a[2].linear + w.cross(&lin);
        assert_vec_close!(classical, vector![-4., 0., 0.], 1e-12);
    }

    /// The joint velocity agrees with a finite difference of placements
    #[test]
    fn velocity_matches_finite_difference() {
        // Arrange
        let mut model =
            build_model_from_urdf(SIMPLE_ARM_URDF, Some(crate::joint::RootJoint::FreeFlyer))
                .unwrap();
        for i in 0..3 {
            model.lower_position_limit[i] = -1.;
            model.upper_position_limit[i] = 1.;
        }
        let mut data = model.create_data();
        let mut rng = rand::rng();
        let q = random_configuration(&model, &mut rng).unwrap();
        let v = random_dvector(&mut rng, model.nv, 1.);
        let eps = 1e-7;

        // Act
        forward_kinematics(&model, &mut data, KinematicsLevel::Velocity(&q, &v));
        let before = data.o_mi.clone();
        let velocities = data.v.clone();
        let q_next = integrate(&model, &q, &(&v * eps));
        forward_kinematics(&model, &mut data, KinematicsLevel::Position(&q_next));

        // Assert
        for i in 1..model.njoints() {
            let delta = log6(&(before[i].inverse() * data.o_mi[i]));
            assert_vec_close!(delta.angular / eps, velocities[i].angular, 1e-5);
            assert_vec_close!(delta.linear / eps, velocities[i].linear, 1e-5);
        }
    }
}
