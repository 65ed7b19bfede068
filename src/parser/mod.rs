//! Build a [`Model`] from a URDF description.

use std::{collections::HashMap, fs, path::Path};

use na::{Isometry3, Matrix3, Unit, Vector3};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    inertia::SpatialInertia,
    joint::{
        floating::FloatingJoint, planar::PlanarJoint, prismatic::PrismaticJoint,
        revolute::RevoluteJoint, JointModel, RootJoint,
    },
    model::{FixedBody, JointLimits, Model},
    types::{Float, JointIndex},
};

pub mod types;
pub mod urdf;

use types::{UrdfJoint, UrdfJointType, UrdfLink, UrdfRobot};
pub use urdf::parse_urdf_str;

/// Load the URDF at `path` into a model. With a `root_joint`, the root link
/// is attached to the universe through it; otherwise the root link is welded
/// to the universe.
pub fn build_model_from_urdf(
    path: impl AsRef<Path>,
    root_joint: Option<RootJoint>,
) -> Result<Model> {
    let xml = fs::read_to_string(path.as_ref())?;
    build_model_from_urdf_str(&xml, root_joint)
}

pub fn build_model_from_urdf_str(xml: &str, root_joint: Option<RootJoint>) -> Result<Model> {
    let robot = parse_urdf_str(xml)?;
    build_model(&robot, root_joint)
}

/// Name of the joint created for the `root_joint` argument
pub const ROOT_JOINT_NAME: &str = "root_joint";

pub fn build_model(robot: &UrdfRobot, root_joint: Option<RootJoint>) -> Result<Model> {
    let root = find_root_link(robot)?;

    let mut children: HashMap<&str, Vec<&UrdfJoint>> = HashMap::new();
    for joint in &robot.joints {
        children.entry(joint.parent.as_str()).or_default().push(joint);
    }

    let mut builder = ModelBuilder {
        robot,
        children,
        model: Model::new(&robot.name),
        visited: vec![],
    };

    let root_id = match root_joint {
        Some(rj) => {
            let id = builder.model.add_joint(
                0,
                rj.model(),
                Isometry3::identity(),
                ROOT_JOINT_NAME,
                &root.name,
                None,
            );
            builder.attach_moving_body(id, root);
            id
        }
        None => {
            builder.attach_fixed_body(0, root, Isometry3::identity());
            0
        }
    };
    builder.visited.push(root.name.clone());
    builder.visit(root, root_id, Isometry3::identity())?;

    let model = builder.model;
    info!(
        robot = %model.name,
        njoints = model.njoints(),
        nbodies = model.nbodies(),
        nfixed = model.fixed_bodies.len(),
        nq = model.nq,
        nv = model.nv,
        "built model"
    );
    Ok(model)
}

/// The unique link that is no joint's child
fn find_root_link(robot: &UrdfRobot) -> Result<&UrdfLink> {
    for joint in &robot.joints {
        for link in [&joint.parent, &joint.child] {
            if robot.link(link).is_none() {
                return Err(Error::undefined_link(link.clone(), joint.name.clone()));
            }
        }
    }

    let roots: Vec<&UrdfLink> = robot
        .links
        .iter()
        .filter(|l| !robot.joints.iter().any(|j| j.child == l.name))
        .collect();

    match roots.as_slice() {
        [] => Err(Error::NoRootLink),
        [root] => Ok(*root),
        _ => Err(Error::MultipleRootLinks(
            roots.iter().map(|l| l.name.clone()).collect(),
        )),
    }
}

/// Inertia of a link in its own frame
fn link_inertia(link: &UrdfLink) -> SpatialInertia {
    match &link.inertial {
        Some(inertial) => SpatialInertia::from_com(
            inertial.mass,
            &Vector3::zeros(),
            &inertial.inertia.to_matrix(),
        )
        .transform(&inertial.origin.to_isometry()),
        None => SpatialInertia::new(Matrix3::zeros(), Vector3::zeros(), 0.),
    }
}

fn joint_model(joint: &UrdfJoint) -> Option<JointModel> {
    let axis = Unit::new_normalize(joint.axis);
    match joint.joint_type {
        UrdfJointType::Revolute => Some(JointModel::Revolute(RevoluteJoint::new(axis))),
        UrdfJointType::Continuous => Some(JointModel::Revolute(RevoluteJoint::continuous(axis))),
        UrdfJointType::Prismatic => Some(JointModel::Prismatic(PrismaticJoint::new(axis))),
        UrdfJointType::Floating => Some(JointModel::FreeFlyer(FloatingJoint)),
        UrdfJointType::Planar => Some(JointModel::Planar(PlanarJoint)),
        UrdfJointType::Fixed => None,
    }
}

fn joint_limits(joint: &UrdfJoint) -> Option<JointLimits> {
    let limit = joint.limit?;
    let (lower, upper) = match joint.joint_type {
        UrdfJointType::Revolute | UrdfJointType::Prismatic => (limit.lower, limit.upper),
        _ => (Float::NEG_INFINITY, Float::INFINITY),
    };
    Some(JointLimits {
        lower,
        upper,
        velocity: limit.velocity,
        effort: limit.effort,
    })
}

struct ModelBuilder<'a> {
    robot: &'a UrdfRobot,
    children: HashMap<&'a str, Vec<&'a UrdfJoint>>,
    model: Model,
    visited: Vec<String>,
}

impl<'a> ModelBuilder<'a> {
    fn attach_moving_body(&mut self, id: JointIndex, link: &UrdfLink) {
        self.model
            .append_body_to_joint(id, &link_inertia(link), &Isometry3::identity());
        self.model.has_visual[id] = !link.visuals.is_empty();
    }

    fn attach_fixed_body(
        &mut self,
        parent: JointIndex,
        link: &UrdfLink,
        placement: Isometry3<Float>,
    ) {
        self.model
            .append_body_to_joint(parent, &link_inertia(link), &placement);
        self.model.fixed_bodies.push(FixedBody {
            name: link.name.clone(),
            last_moving_parent: parent,
            placement,
            has_visual: !link.visuals.is_empty(),
        });
    }

    /// Add the subtree below `link`. `placement` locates `link` in the frame
    /// of `parent`, its last moving ancestor.
    fn visit(
        &mut self,
        link: &'a UrdfLink,
        parent: JointIndex,
        placement: Isometry3<Float>,
    ) -> Result<()> {
        let joints = self.children.get(link.name.as_str()).cloned().unwrap_or_default();
        for joint in joints {
            if self.visited.contains(&joint.child) {
                return Err(Error::KinematicLoop(joint.child.clone()));
            }
            self.visited.push(joint.child.clone());

            let child = self
                .robot
                .link(&joint.child)
                .ok_or_else(|| Error::undefined_link(joint.child.clone(), joint.name.clone()))?;
            let child_placement = placement * joint.origin.to_isometry();

            match joint_model(joint) {
                None => {
                    debug!(joint = %joint.name, link = %child.name, parent, "merging fixed joint");
                    self.attach_fixed_body(parent, child, child_placement);
                    self.visit(child, parent, child_placement)?;
                }
                Some(jm) => {
                    let id = self.model.add_joint(
                        parent,
                        jm,
                        child_placement,
                        &joint.name,
                        &child.name,
                        joint_limits(joint),
                    );
                    if let Some(dynamics) = joint.dynamics {
                        let iv = self.model.idx_v[id];
                        let nv = self.model.joints[id].nv();
                        self.model.damping.rows_mut(iv, nv).fill(dynamics.damping);
                        self.model.friction.rows_mut(iv, nv).fill(dynamics.friction);
                    }
                    self.attach_moving_body(id, child);
                    self.visit(child, id, Isometry3::identity())?;
                }
            }
        }
        Ok(())
    }
}
