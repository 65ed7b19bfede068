use na::{DVector, Isometry3};
use tracing::debug;

use crate::{
    data::Data,
    inertia::SpatialInertia,
    joint::{fixed::FixedJoint, JointModel},
    spatial::spatial_vector::SpatialVector,
    types::{Float, JointIndex},
    GRAVITY,
};

/// Position, velocity and effort bounds of a one-dof joint, from URDF `<limit>`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointLimits {
    pub lower: Float,
    pub upper: Float,
    pub velocity: Float,
    pub effort: Float,
}

impl JointLimits {
    pub fn unbounded() -> Self {
        JointLimits {
            lower: Float::NEG_INFINITY,
            upper: Float::INFINITY,
            velocity: Float::INFINITY,
            effort: Float::INFINITY,
        }
    }
}

/// A body welded to a moving body through fixed joints. Its inertia is
/// already merged into the body of `last_moving_parent`.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBody {
    pub name: String,
    pub last_moving_parent: JointIndex,
    /// Placement of this body in the frame of `last_moving_parent`
    pub placement: Isometry3<Float>,
    pub has_visual: bool,
}

/// The kinematic tree. Every per-joint vector has the universe at index 0.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub nq: usize,
    pub nv: usize,

    pub names: Vec<String>,
    pub parents: Vec<JointIndex>,
    pub joints: Vec<JointModel>,
    pub joint_placements: Vec<Isometry3<Float>>,
    pub inertias: Vec<SpatialInertia>,
    pub idx_q: Vec<usize>,
    pub idx_v: Vec<usize>,

    pub body_names: Vec<String>,
    pub has_visual: Vec<bool>,
    pub fixed_bodies: Vec<FixedBody>,

    pub gravity: SpatialVector,

    pub lower_position_limit: DVector<Float>,
    pub upper_position_limit: DVector<Float>,
    pub velocity_limit: DVector<Float>,
    pub effort_limit: DVector<Float>,
    pub damping: DVector<Float>,
    pub friction: DVector<Float>,
}

impl Model {
    /// An empty model: the universe only.
    pub fn new(name: &str) -> Self {
        Model {
            name: name.to_string(),
            nq: 0,
            nv: 0,
            names: vec!["universe".to_string()],
            parents: vec![0],
            joints: vec![JointModel::Fixed(FixedJoint)],
            joint_placements: vec![Isometry3::identity()],
            inertias: vec![SpatialInertia::zero()],
            idx_q: vec![0],
            idx_v: vec![0],
            body_names: vec!["universe".to_string()],
            has_visual: vec![false],
            fixed_bodies: vec![],
            gravity: SpatialVector::linear(na::vector![0., 0., -GRAVITY]),
            lower_position_limit: DVector::zeros(0),
            upper_position_limit: DVector::zeros(0),
            velocity_limit: DVector::zeros(0),
            effort_limit: DVector::zeros(0),
            damping: DVector::zeros(0),
            friction: DVector::zeros(0),
        }
    }

    /// Append a joint under `parent`, with a massless body of the same index.
    /// `limits` applies to one-dof joints; other joints are unbounded except
    /// for the free-flyer quaternion, bounded by ±1.
    pub fn add_joint(
        &mut self,
        parent: JointIndex,
        joint: JointModel,
        placement: Isometry3<Float>,
        name: &str,
        body_name: &str,
        limits: Option<JointLimits>,
    ) -> JointIndex {
        let nq = joint.nq();
        let nv = joint.nv();
        let limits = limits.unwrap_or_else(JointLimits::unbounded);

        let mut lower = vec![limits.lower; nq];
        let mut upper = vec![limits.upper; nq];
        if let JointModel::FreeFlyer(_) = joint {
            lower[3..].fill(-1.);
            upper[3..].fill(1.);
        }
        extend(&mut self.lower_position_limit, &lower);
        extend(&mut self.upper_position_limit, &upper);
        extend(&mut self.velocity_limit, &vec![limits.velocity; nv]);
        extend(&mut self.effort_limit, &vec![limits.effort; nv]);
        extend(&mut self.damping, &vec![0.; nv]);
        extend(&mut self.friction, &vec![0.; nv]);

        let id = self.joints.len();
        debug!(id, name, parent, kind = joint.shortname(), "adding joint");

        self.names.push(name.to_string());
        self.parents.push(parent);
        self.joints.push(joint);
        self.joint_placements.push(placement);
        self.inertias.push(SpatialInertia::zero());
        self.idx_q.push(self.nq);
        self.idx_v.push(self.nv);
        self.body_names.push(body_name.to_string());
        self.has_visual.push(false);

        self.nq += nq;
        self.nv += nv;
        id
    }

    /// Rigidly attach `inertia`, located at `placement` in the joint frame, to
    /// the body of `joint`.
    pub fn append_body_to_joint(
        &mut self,
        joint: JointIndex,
        inertia: &SpatialInertia,
        placement: &Isometry3<Float>,
    ) {
        self.inertias[joint] += &inertia.transform(placement);
    }

    pub fn create_data(&self) -> Data {
        Data::new(self)
    }

    pub fn njoints(&self) -> usize {
        self.joints.len()
    }

    pub fn nbodies(&self) -> usize {
        self.body_names.len()
    }

    /// First joint with this name
    pub fn joint_id(&self, name: &str) -> Option<JointIndex> {
        self.names.iter().position(|n| n == name)
    }

    /// Alias of [`Model::joint_id`]
    pub fn index(&self, name: &str) -> Option<JointIndex> {
        self.joint_id(name)
    }

    /// Index of the moving body with this name
    pub fn body_id(&self, name: &str) -> Option<JointIndex> {
        self.body_names.iter().position(|n| n == name)
    }

    pub fn fixed_body_id(&self, name: &str) -> Option<usize> {
        self.fixed_bodies.iter().position(|b| b.name == name)
    }

    /// Joint carrying the named link, moving or fixed, and the link
    /// placement in that joint's frame
    pub fn frame_of_link(&self, name: &str) -> Option<(JointIndex, Isometry3<Float>)> {
        if let Some(id) = self.body_id(name) {
            return Some((id, Isometry3::identity()));
        }
        self.fixed_body_id(name).map(|id| {
            let body = &self.fixed_bodies[id];
            (body.last_moving_parent, body.placement)
        })
    }

    /// Entries of the configuration `q` that belong to joint `i`
    pub fn joint_q<'q>(&self, i: JointIndex, q: &'q [Float]) -> &'q [Float] {
        &q[self.idx_q[i]..self.idx_q[i] + self.joints[i].nq()]
    }

    /// Entries of the velocity `v` that belong to joint `i`
    pub fn joint_v<'v>(&self, i: JointIndex, v: &'v [Float]) -> &'v [Float] {
        &v[self.idx_v[i]..self.idx_v[i] + self.joints[i].nv()]
    }

    /// Joints from the universe down to `joint`, inclusive
    pub fn supports(&self, joint: JointIndex) -> Vec<JointIndex> {
        let mut chain = vec![joint];
        let mut i = joint;
        while i != 0 {
            i = self.parents[i];
            chain.push(i);
        }
        chain.reverse();
        chain
    }

    /// Total mass of the moving bodies
    pub fn mass(&self) -> Float {
        self.inertias.iter().skip(1).map(|i| i.mass).sum()
    }
}

fn extend(v: &mut DVector<Float>, values: &[Float]) {
    let mut data = v.as_slice().to_vec();
    data.extend_from_slice(values);
    *v = DVector::from_vec(data);
}
