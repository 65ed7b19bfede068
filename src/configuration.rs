//! Operations on configuration vectors of a whole model.
//!
//! Each joint owns `nq` entries of a configuration and `nv` entries of a
//! velocity, located by the model's `idx_q` and `idx_v`.

use na::DVector;
use rand::Rng;

use crate::{
    error::{Error, Result},
    joint::floating::{isometry_from_xyzquat, write_xyzquat},
    model::Model,
    spatial::{explog::exp6, spatial_vector::SpatialVector},
    types::Float,
};

/// q ⊕ v, joint by joint
pub fn integrate(model: &Model, q: &DVector<Float>, v: &DVector<Float>) -> DVector<Float> {
    let mut out = q.clone();
    for i in 1..model.njoints() {
        let iq = model.idx_q[i];
        let nq = model.joints[i].nq();
        model.joints[i].integrate(
            model.joint_q(i, q.as_slice()),
            model.joint_v(i, v.as_slice()),
            &mut out.as_mut_slice()[iq..iq + nq],
        );
    }
    out
}

/// The velocity carrying q0 to q1 in unit time, q1 ⊖ q0
pub fn difference(model: &Model, q0: &DVector<Float>, q1: &DVector<Float>) -> DVector<Float> {
    let mut out = DVector::zeros(model.nv);
    for i in 1..model.njoints() {
        let iv = model.idx_v[i];
        let nv = model.joints[i].nv();
        model.joints[i].difference(
            model.joint_q(i, q0.as_slice()),
            model.joint_q(i, q1.as_slice()),
            &mut out.as_mut_slice()[iv..iv + nv],
        );
    }
    out
}

/// Configuration at fraction `u` of the way from q0 to q1
pub fn interpolate(
    model: &Model,
    q0: &DVector<Float>,
    q1: &DVector<Float>,
    u: Float,
) -> DVector<Float> {
    let mut out = q0.clone();
    for i in 1..model.njoints() {
        let iq = model.idx_q[i];
        let nq = model.joints[i].nq();
        model.joints[i].interpolate(
            model.joint_q(i, q0.as_slice()),
            model.joint_q(i, q1.as_slice()),
            u,
            &mut out.as_mut_slice()[iq..iq + nq],
        );
    }
    out
}

pub fn distance(model: &Model, q0: &DVector<Float>, q1: &DVector<Float>) -> Float {
    difference(model, q0, q1).norm()
}

pub fn neutral(model: &Model) -> DVector<Float> {
    let mut out = DVector::zeros(model.nq);
    for i in 1..model.njoints() {
        let iq = model.idx_q[i];
        let nq = model.joints[i].nq();
        model.joints[i].neutral(&mut out.as_mut_slice()[iq..iq + nq]);
    }
    out
}

/// Draw a configuration within the model's position limits.
///
/// Fails with [`Error::UnboundedLimits`] when a joint needs a limit that is
/// not finite. Continuous joints and free-flyer rotations need none.
pub fn random_configuration<R: Rng + ?Sized>(
    model: &Model,
    rng: &mut R,
) -> Result<DVector<Float>> {
    let lower = model.lower_position_limit.as_slice();
    let upper = model.upper_position_limit.as_slice();

    let mut out = neutral(model);
    for i in 1..model.njoints() {
        let joint = &model.joints[i];
        let iq = model.idx_q[i];
        let bounded = iq..iq + joint.bounded_nq();
        if !lower[bounded.clone()].iter().chain(&upper[bounded]).all(|x| x.is_finite()) {
            return Err(Error::UnboundedLimits(model.names[i].clone()));
        }
        joint.random_configuration(
            rng,
            model.joint_q(i, lower),
            model.joint_q(i, upper),
            &mut out.as_mut_slice()[iq..iq + joint.nq()],
        );
    }
    Ok(out)
}

/// Renormalize the quaternions of `q` in place
pub fn normalize(model: &Model, q: &mut DVector<Float>) {
    for i in 1..model.njoints() {
        let iq = model.idx_q[i];
        let nq = model.joints[i].nq();
        model.joints[i].normalize(&mut q.as_mut_slice()[iq..iq + nq]);
    }
}

/// Apply `dq` to a floating-base configuration in place.
///
/// The base block `q[0..7]` is replaced by `M(q) · exp6(dq[0..6])`, the
/// twist taken in the base frame. The joint block is accumulated,
/// `q[7..] += dq[6..]`. Panics when `q` or `dq` is too short.
pub fn increment(q: &mut DVector<Float>, dq: &DVector<Float>) {
    let base = isometry_from_xyzquat(&q.as_slice()[..7]);
    let twist = SpatialVector::from_slice(&dq.as_slice()[..6]);
    write_xyzquat(&(base * exp6(&twist)), &mut q.as_mut_slice()[..7]);

    for i in 7..q.len() {
        q[i] += dq[i - 1];
    }
}
