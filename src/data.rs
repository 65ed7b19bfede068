use na::{DMatrix, DVector, Isometry3, Matrix3xX, Vector3};

use crate::{
    inertia::SpatialInertia,
    model::Model,
    spatial::{spatial_vector::SpatialVector, wrench::Wrench},
    types::Float,
};

/// Working set of the algorithms, sized for one [`Model`].
///
/// Per-joint vectors are indexed like the model's, the universe at 0.
/// Motions and forces are expressed in the joint frame, centers of mass in
/// the world frame.
#[derive(Clone, Debug)]
pub struct Data {
    /// Placement of each joint in its parent joint
    pub li_mi: Vec<Isometry3<Float>>,
    /// Placement of each joint in the world
    pub o_mi: Vec<Isometry3<Float>>,
    pub v: Vec<SpatialVector>,
    pub a: Vec<SpatialVector>,
    /// Accelerations including the fictitious gravity acceleration
    pub a_gf: Vec<SpatialVector>,
    pub f: Vec<Wrench>,

    /// Composite rigid body inertias, in the world frame
    pub ycrb: Vec<SpatialInertia>,
    /// Subtree centers of mass, with their velocity and acceleration
    pub com: Vec<Vector3<Float>>,
    pub vcom: Vec<Vector3<Float>>,
    pub acom: Vec<Vector3<Float>>,
    /// Subtree masses
    pub mass: Vec<Float>,

    /// Joint-space inertia matrix
    pub m: DMatrix<Float>,
    pub nle: DVector<Float>,
    pub tau: DVector<Float>,
    pub g: DVector<Float>,
    pub ddq: DVector<Float>,
    /// Joint Jacobians, world frame, 6 x nv
    pub j: DMatrix<Float>,
    pub jcom: Matrix3xX<Float>,
}

impl Data {
    pub fn new(model: &Model) -> Self {
        let n = model.njoints();
        let nv = model.nv;
        Data {
            li_mi: vec![Isometry3::identity(); n],
            o_mi: vec![Isometry3::identity(); n],
            v: vec![SpatialVector::zero(); n],
            a: vec![SpatialVector::zero(); n],
            a_gf: vec![SpatialVector::zero(); n],
            f: vec![Wrench::zero(); n],
            ycrb: vec![SpatialInertia::zero(); n],
            com: vec![Vector3::zeros(); n],
            vcom: vec![Vector3::zeros(); n],
            acom: vec![Vector3::zeros(); n],
            mass: vec![0.; n],
            m: DMatrix::zeros(nv, nv),
            nle: DVector::zeros(nv),
            tau: DVector::zeros(nv),
            g: DVector::zeros(nv),
            ddq: DVector::zeros(nv),
            j: DMatrix::zeros(6, nv),
            jcom: Matrix3xX::zeros(nv),
        }
    }
}
