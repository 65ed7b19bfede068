use na::{DMatrix, DVector};

use crate::{
    data::Data,
    kinematics::{forward_kinematics, KinematicsLevel},
    model::Model,
    momentum::MomentumMatrix,
    spatial::{geometric_jacobian::GeometricJacobian, transform::IsometryExt},
    types::Float,
};

/// Recursive Newton-Euler: the joint torques τ that produce acceleration
/// `a` at configuration `q` and velocity `v`, gravity included.
///
/// Forward pass, per body in its joint frame:
///     f_i = I_i * a_i + v_i \dualcross I_i * v_i
/// where a_i carries the fictitious upward gravity acceleration. The backward
/// pass projects f_i on the motion subspace and adds it to the parent.
///
/// Reference: Table 5.1 in "Robot Dynamics Algorithms" by Roy Featherstone
pub fn rnea(
    model: &Model,
    data: &mut Data,
    q: &DVector<Float>,
    v: &DVector<Float>,
    a: &DVector<Float>,
) -> DVector<Float> {
    let (q, v, a) = (q.as_slice(), v.as_slice(), a.as_slice());
    data.a_gf[0] = -model.gravity;

    for i in 1..model.njoints() {
        let joint = &model.joints[i];
        let parent = model.parents[i];

        data.li_mi[i] = model.joint_placements[i] * joint.transform(model.joint_q(i, q));
        data.o_mi[i] = data.o_mi[parent] * data.li_mi[i];

        let vj = joint.joint_velocity(model.joint_v(i, v));
        let aj = joint.joint_velocity(model.joint_v(i, a));
        data.v[i] = data.li_mi[i].act_inv_motion(&data.v[parent]) + vj;
        let coriolis = data.v[i].cross_motion(&vj);
        data.a[i] = data.li_mi[i].act_inv_motion(&data.a[parent]) + aj + coriolis;
        data.a_gf[i] = data.li_mi[i].act_inv_motion(&data.a_gf[parent]) + aj + coriolis;

        let inertia = &model.inertias[i];
        let momentum = inertia.mul_motion(&data.v[i]);
        data.f[i] = inertia.mul_motion(&data.a_gf[i]) + data.v[i].cross_force(&momentum);
    }

    for i in (1..model.njoints()).rev() {
        let joint = &model.joints[i];
        let tau = joint.motion_subspace().transpose_mul_wrench(&data.f[i]);
        data.tau.rows_mut(model.idx_v[i], joint.nv()).copy_from(&tau);

        let parent = model.parents[i];
        if parent > 0 {
            let f = data.li_mi[i].act_force(&data.f[i]);
            data.f[parent] += f;
        }
    }

    data.tau.clone()
}

/// Compute the 'dynamics bias term', i.e. the term
///     c(q, v)
/// in the unconstrained joint-space equations of motion
///     M(q) vdot + c(q, v) = τ
/// Gravity is part of it.
pub fn nonlinear_effects(
    model: &Model,
    data: &mut Data,
    q: &DVector<Float>,
    v: &DVector<Float>,
) -> DVector<Float> {
    let zero = DVector::zeros(model.nv);
    data.nle = rnea(model, data, q, v, &zero);
    data.nle.clone()
}

/// Torques that hold the robot still against gravity
pub fn compute_generalized_gravity(
    model: &Model,
    data: &mut Data,
    q: &DVector<Float>,
) -> DVector<Float> {
    let zero = DVector::zeros(model.nv);
    data.g = rnea(model, data, q, &zero, &zero);
    data.g.clone()
}

/// Composite rigid body algorithm: the joint-space mass matrix M(q).
///
/// Composite inertias and motion subspaces are expressed in the world frame,
/// so that block (j, i) is S_jᵀ · Ic_i · S_i for every j supporting i. The
/// matrix is returned full and symmetric.
///
/// Reference: Chapter 6.2 in "Robot Dynamics Algorithms" by Roy Featherstone
pub fn crba(model: &Model, data: &mut Data, q: &DVector<Float>) -> DMatrix<Float> {
    forward_kinematics(model, data, KinematicsLevel::Position(q));

    let n = model.njoints();
    for i in 0..n {
        data.ycrb[i] = model.inertias[i].transform(&data.o_mi[i]);
    }
    for i in (1..n).rev() {
        let parent = model.parents[i];
        if parent > 0 {
            let child = data.ycrb[i].clone();
            data.ycrb[parent] += &child;
        }
    }

    let subspaces: Vec<GeometricJacobian> = (0..n)
        .map(|i| model.joints[i].motion_subspace().transform(&data.o_mi[i]))
        .collect();

    data.m.fill(0.);
    for i in 1..n {
        let (iv, nv) = (model.idx_v[i], model.joints[i].nv());
        let F = MomentumMatrix::mul(&data.ycrb[i], &subspaces[i]);
        for &j in model.supports(i).iter().skip(1) {
            let (jv, nvj) = (model.idx_v[j], model.joints[j].nv());
            let block = F.transpose_mul(&subspaces[j]);
            data.m.view_mut((jv, iv), (nvj, nv)).copy_from(&block);
            data.m.view_mut((iv, jv), (nv, nvj)).copy_from(&block.transpose());
        }
    }

    data.m.clone()
}

/// Compute the joint acceleration vector vdot that satisfies the joint-space
/// equations of motion:
///     M(q)vdot + c(q, v) = τ
///
/// Panics when M(q) is not positive definite, e.g. for a model with a
/// massless subtree.
pub fn forward_dynamics(
    model: &Model,
    data: &mut Data,
    q: &DVector<Float>,
    v: &DVector<Float>,
    tau: &DVector<Float>,
) -> DVector<Float> {
    let nle = nonlinear_effects(model, data, q, v);
    let mass_matrix = crba(model, data, q);

    if let Some(chol) = mass_matrix.clone().cholesky() {
        data.ddq = chol.solve(&(tau - &nle));
        data.ddq.clone()
    } else {
        panic!(
            r#"Failed to solve for vdot in M(q) vdot + c(q, v) = τ
        where M = {},
              c = {}
        "#,
            mass_matrix, nle
        )
    }
}

#[cfg(test)]
mod dynamics_tests {
    use crate::{assert_close, assert_vec_close};
    use na::{dvector, vector, Isometry3, Matrix3, UnitQuaternion, Vector3};

    use super::*;
    use crate::{
        center_of_mass::center_of_mass,
        configuration::random_configuration,
        inertia::SpatialInertia,
        joint::{revolute::RevoluteJoint, JointModel, RootJoint},
        parser::build_model_from_urdf,
        util::test_utils::{random_dvector, SIMPLE_ARM_URDF},
        GRAVITY, PI,
    };

    /// A uniform rod of mass m and length l hinged at one end, lying along
    /// the x axis of its joint frame
    fn rod_pendulum(
        m: Float,
        l: Float,
        placement: Isometry3<Float>,
        axis: Vector3<Float>,
    ) -> Model {
        let mut model = Model::new("rod_pendulum");
        let joint = model.add_joint(
            0,
            JointModel::Revolute(RevoluteJoint::new(na::Unit::new_normalize(axis))),
            placement,
            "hinge",
            "rod",
            None,
        );
        let moment_com = Matrix3::from_diagonal(&vector![0., m * l * l / 12., m * l * l / 12.]);
        let rod = SpatialInertia::from_com(m, &vector![l / 2., 0., 0.], &moment_com);
        model.append_body_to_joint(joint, &rod, &Isometry3::identity());
        model
    }

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
    fn dynamics_horizontal_right_rod() {
        // Arrange
        let m = 5.0; // Mass of rod
        let l: Float = 7.0; // Length of rod
        let model = rod_pendulum(m, l, Isometry3::identity(), vector![0., 1., 0.]);
        let mut data = model.create_data();

        // Act
        let joint_accels = forward_dynamics(
            &model,
            &mut data,
            &dvector![0.],
            &dvector![0.],
            &dvector![0.],
        );

        // Assert
        assert_close!(joint_accels[0], 3.0 * GRAVITY / (2.0 * l), 1e-12);
    }

    /// world frame ^z       rod/joint frame ^y
    ///             |  / y                   |
    ///             | /                      |
    ///             |/                       |
    ///             +----> x                 +---->x
    /// separated by some distance in x
    #[test]
    fn dynamics_horizontal_right_rod_rotated_moved_rod() {
        // Arrange
        let m = 5.0;
        let l: Float = 7.0;
        let d: Float = 11.0;
        let placement = Isometry3::from_parts(
            vector![d, 0., 0.].into(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 2.0),
        );
        let model = rod_pendulum(m, l, placement, vector![0., 0., 1.]);
        let mut data = model.create_data();

        // Act
        let joint_accels = forward_dynamics(
            &model,
            &mut data,
            &dvector![0.],
            &dvector![0.],
            &dvector![0.],
        );

        // Assert
        assert_close!(joint_accels[0], -3.0 * GRAVITY / (2.0 * l), 1e-12);
    }

    #[test]
    fn gravity_holds_rod_horizontal() {
        let (m, l) = (2., 1.5);
        let model = rod_pendulum(m, l, Isometry3::identity(), vector![0., 1., 0.]);
        let mut data = model.create_data();

        let g = compute_generalized_gravity(&model, &mut data, &dvector![0.]);

        // the hinge pushes the rod up against its weight
        assert_close!(g[0], -m * GRAVITY * l / 2., 1e-12);
    }

    #[test]
    fn mass_matrix_is_symmetric_positive_definite() {
        // Arrange
        let model = floating_arm();
        let mut data = model.create_data();
        let q = random_configuration(&model, &mut rand::rng()).unwrap();

        // Act
        let mass_matrix = crba(&model, &mut data, &q);

        // Assert
        assert_eq!(mass_matrix.shape(), (model.nv, model.nv));
        assert_vec_close!(&mass_matrix, mass_matrix.transpose(), 1e-12);
        assert!(mass_matrix.clone().cholesky().is_some());
        // the base block carries the total mass
        for k in 0..3 {
            assert_close!(mass_matrix[(k, k)], model.mass(), 1e-9);
        }
    }

    /// Column i of M is the torque for a unit acceleration of joint i,
    /// without gravity
    #[test]
    fn mass_matrix_matches_rnea_columns() {
        // Arrange
        let model = floating_arm();
        let mut data = model.create_data();
        let q = random_configuration(&model, &mut rand::rng()).unwrap();
        let zero = DVector::zeros(model.nv);

        // Act
        let mass_matrix = crba(&model, &mut data, &q);
        let g = compute_generalized_gravity(&model, &mut data, &q);

        // Assert
        for i in 0..model.nv {
            let mut e = DVector::zeros(model.nv);
            e[i] = 1.;
            let column = rnea(&model, &mut data, &q, &zero, &e) - &g;
            assert_vec_close!(column, mass_matrix.column(i), 1e-9);
        }
    }

    #[test]
    fn nonlinear_effects_at_rest_is_gravity() {
        let model = floating_arm();
        let mut data = model.create_data();
        let q = random_configuration(&model, &mut rand::rng()).unwrap();

        let nle = nonlinear_effects(&model, &mut data, &q, &DVector::zeros(model.nv));
        let g = compute_generalized_gravity(&model, &mut data, &q);

        assert_vec_close!(nle, g, 1e-12);
    }

    /// Without torques a free-floating robot's center of mass falls at g
    #[test]
    fn free_fall() {
        // Arrange
        let model = floating_arm();
        let mut data = model.create_data();
        let mut rng = rand::rng();
        let q = random_configuration(&model, &mut rng).unwrap();
        let v = random_dvector(&mut rng, model.nv, 1.);
        let tau = DVector::zeros(model.nv);

        // Act
        let vdot = forward_dynamics(&model, &mut data, &q, &v, &tau);

        // Assert
        center_of_mass(&model, &mut data, KinematicsLevel::Acceleration(&q, &v, &vdot), true);
        assert_vec_close!(data.acom[0], vector![0., 0., -GRAVITY], 1e-9);
    }

    #[test]
    fn forward_dynamics_inverts_rnea() {
        // Arrange
        let model = floating_arm();
        let mut data = model.create_data();
        let mut rng = rand::rng();
        let q = random_configuration(&model, &mut rng).unwrap();
        let v = random_dvector(&mut rng, model.nv, 1.);
        let tau = random_dvector(&mut rng, model.nv, 5.);

        // Act
        let vdot = forward_dynamics(&model, &mut data, &q, &v, &tau);

        // Assert
        let tau_back = rnea(&model, &mut data, &q, &v, &vdot);
        assert_vec_close!(tau_back, tau, 1e-8);
    }
}
