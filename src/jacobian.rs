use na::{DMatrix, DVector};

use crate::{
    data::Data,
    kinematics::{forward_kinematics, KinematicsLevel},
    model::Model,
    types::{Float, JointIndex},
};

/// Fill `data.j` with the motion subspace of every joint expressed in the
/// world frame. Rows are `[linear; angular]`.
pub fn compute_jacobians<'d>(
    model: &Model,
    data: &'d mut Data,
    q: &DVector<Float>,
) -> &'d DMatrix<Float> {
    forward_kinematics(model, data, KinematicsLevel::Position(q));

    for i in 1..model.njoints() {
        let s = model.joints[i].motion_subspace().transform(&data.o_mi[i]);
        data.j
            .columns_mut(model.idx_v[i], s.dim())
            .copy_from(&s.to_matrix());
    }
    &data.j
}

/// Jacobian of the frame of joint `index`, 6 x nv.
///
/// Maps the joint velocity to the twist of that frame, in the world frame or
/// in the joint frame itself when `local_frame` is set. Columns of joints
/// that do not support `index` are zero. With `update_kinematics` false the
/// placements already in `data` are used and `q` is ignored.
pub fn joint_jacobian(
    model: &Model,
    data: &mut Data,
    q: &DVector<Float>,
    index: JointIndex,
    local_frame: bool,
    update_kinematics: bool,
) -> DMatrix<Float> {
    if update_kinematics {
        forward_kinematics(model, data, KinematicsLevel::Position(q));
    }

    let mut jacobian = DMatrix::zeros(6, model.nv);
    for &j in model.supports(index).iter().skip(1) {
        let mut s = model.joints[j].motion_subspace().transform(&data.o_mi[j]);
        if local_frame {
            s = s.inv_transform(&data.o_mi[index]);
        }
        jacobian
            .columns_mut(model.idx_v[j], s.dim())
            .copy_from(&s.to_matrix());
    }
    jacobian
}
