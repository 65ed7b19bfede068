use na::{DVector, Matrix3xX, Point3, Vector3};

use crate::{
    data::Data,
    kinematics::{forward_kinematics, KinematicsLevel},
    model::Model,
    types::Float,
    util::colwise_cross,
};

/// Center of mass of the whole robot in the world frame.
///
/// Also fills, for every joint, the mass and center of mass of the subtree it
/// supports, with their velocity and acceleration when `level` provides them.
/// Index 0 holds the whole robot. With `update_kinematics` false the joint
/// placements, velocities and accelerations already in `data` are used.
pub fn center_of_mass(
    model: &Model,
    data: &mut Data,
    level: KinematicsLevel,
    update_kinematics: bool,
) -> Vector3<Float> {
    if update_kinematics {
        forward_kinematics(model, data, level);
    }
    let with_velocity = level.v().is_some();
    let with_acceleration = level.a().is_some();

    let n = model.njoints();
    data.mass[0] = 0.;
    data.com[0] = Vector3::zeros();
    data.vcom[0] = Vector3::zeros();
    data.acom[0] = Vector3::zeros();

    for i in 1..n {
        let inertia = &model.inertias[i];
        let m = inertia.mass;
        let lever = inertia.center_of_mass().coords;
        let o_mi = &data.o_mi[i];

        data.mass[i] = m;
        data.com[i] = m * o_mi.transform_point(&Point3::from(lever)).coords;

        if with_velocity {
            let v = &data.v[i];
            let point_velocity = v.linear + v.angular.cross(&lever);
            data.vcom[i] = m * (o_mi.rotation * point_velocity);

            if with_acceleration {
                let a = &data.a[i];
                let point_acceleration =
                    a.linear + a.angular.cross(&lever) + v.angular.cross(&point_velocity);
                data.acom[i] = m * (o_mi.rotation * point_acceleration);
            }
        }
    }

    for i in (1..n).rev() {
        let parent = model.parents[i];
        data.mass[parent] += data.mass[i];
        let (com, vcom, acom) = (data.com[i], data.vcom[i], data.acom[i]);
        data.com[parent] += com;
        if with_velocity {
            data.vcom[parent] += vcom;
        }
        if with_acceleration {
            data.acom[parent] += acom;
        }
    }

    for i in 0..n {
        let m = data.mass[i];
        if m <= 0. {
            continue;
        }
        data.com[i] /= m;
        if with_velocity {
            data.vcom[i] /= m;
        }
        if with_acceleration {
            data.acom[i] /= m;
        }
    }

    data.com[0]
}

/// Jacobian of the world center of mass, 3 x nv.
///
/// A joint moves the center of mass of its subtree like a point of its own
/// body, weighted by the share of the total mass the subtree carries.
pub fn jacobian_center_of_mass(
    model: &Model,
    data: &mut Data,
    q: &DVector<Float>,
) -> Matrix3xX<Float> {
    center_of_mass(model, data, KinematicsLevel::Position(q), true);

    data.jcom.fill(0.);
    let total = data.mass[0];
    if total <= 0. {
        return data.jcom.clone();
    }

    for i in 1..model.njoints() {
        let s = model.joints[i].motion_subspace().transform(&data.o_mi[i]);
        let lever = data.com[i];
        let columns = (&s.linear - colwise_cross(&lever, &s.angular)) * (data.mass[i] / total);
        data.jcom
            .columns_mut(model.idx_v[i], s.dim())
            .copy_from(&columns);
    }

    data.jcom.clone()
}

#[cfg(test)]
mod center_of_mass_tests {
    use crate::{assert_close, assert_vec_close};
    use na::{dvector, vector, Isometry3, Matrix3};

    use super::*;
    use crate::{
        configuration::{integrate, random_configuration},
        inertia::SpatialInertia,
        joint::{prismatic::PrismaticJoint, JointModel, RootJoint},
        parser::build_model_from_urdf,
        util::test_utils::{random_dvector, SIMPLE_ARM_URDF},
    };

    fn floating_arm() -> Model {
        let mut model =
            build_model_from_urdf(SIMPLE_ARM_URDF, Some(RootJoint::FreeFlyer)).unwrap();
        for i in 0..3 {
            model.lower_position_limit[i] = -1.;
            model.upper_position_limit[i] = 1.;
        }
        model
    }

    #[test]
    fn two_point_masses() {
        // Arrange
        let mut model = Model::new("slider");
        let slider = model.add_joint(
            0,
            JointModel::Prismatic(PrismaticJoint::new(na::Vector3::x_axis())),
            Isometry3::identity(),
            "slide",
            "cart",
            None,
        );
        let point = |m| SpatialInertia::from_com(m, &Vector3::zeros(), &Matrix3::zeros());
        model.append_body_to_joint(slider, &point(1.), &Isometry3::translation(0., 1., 0.));
        model.append_body_to_joint(slider, &point(3.), &Isometry3::translation(0., -1., 0.));
        let mut data = model.create_data();
        let q = dvector![2.];
        let v = dvector![0.5];

        // Act
        let com = center_of_mass(&model, &mut data, KinematicsLevel::Velocity(&q, &v), true);

        // Assert
        assert_vec_close!(com, vector![2., -0.5, 0.], 1e-12);
        assert_vec_close!(data.vcom[0], vector![0.5, 0., 0.], 1e-12);
        assert_close!(data.mass[0], 4., 1e-12);
    }

    #[test]
    fn total_mass_at_root() {
        let model = build_model_from_urdf(SIMPLE_ARM_URDF, None).unwrap();
        let mut data = model.create_data();
        let q = DVector::zeros(model.nq);

        center_of_mass(&model, &mut data, KinematicsLevel::Position(&q), true);

        // base_link is welded to the universe, so its mass is not counted
        assert_close!(data.mass[0], model.mass(), 1e-12);
        assert_close!(data.mass[1], 1. + 0.7, 1e-12);
    }

    /// Finite difference of the CoM position agrees with both the CoM
    /// velocity and the CoM Jacobian
    #[test]
    fn velocity_and_jacobian_match_finite_difference() {
        // Arrange
        let model = floating_arm();
        let mut data = model.create_data();
        let mut rng = rand::rng();
        let q = random_configuration(&model, &mut rng).unwrap();
        let v = random_dvector(&mut rng, model.nv, 1.);
        let eps = 1e-7;

        // Act
        center_of_mass(&model, &mut data, KinematicsLevel::Velocity(&q, &v), true);
        let (com, vcom) = (data.com[0], data.vcom[0]);
        let jcom = jacobian_center_of_mass(&model, &mut data, &q);
        let q_next = integrate(&model, &q, &(&v * eps));
        let com_next = center_of_mass(&model, &mut data, KinematicsLevel::Position(&q_next), true);

        // Assert
        let fd = (com_next - com) / eps;
        assert_vec_close!(fd, vcom, 1e-5);
        assert_vec_close!(jcom * &v, vcom, 1e-9);
    }

    #[test]
    fn acceleration_matches_finite_difference() {
        // Arrange
        let model = floating_arm();
        let mut data = model.create_data();
        let mut rng = rand::rng();
        let q = random_configuration(&model, &mut rng).unwrap();
        let v = random_dvector(&mut rng, model.nv, 1.);
        let a = random_dvector(&mut rng, model.nv, 1.);
        let eps = 1e-6;

        // Act
        center_of_mass(&model, &mut data, KinematicsLevel::Acceleration(&q, &v, &a), true);
        let (vcom, acom) = (data.vcom[0], data.acom[0]);
        let q_next = integrate(&model, &q, &(&v * eps));
        let v_next = &v + &a * eps;
        center_of_mass(&model, &mut data, KinematicsLevel::Velocity(&q_next, &v_next), true);

        // Assert
        let fd = (data.vcom[0] - vcom) / eps;
        assert_vec_close!(fd, acom, 1e-4);
    }
}
