//! Intermediate representation of a URDF document.

use na::{Isometry3, Matrix3, Vector3};

use crate::{spatial::transform::xyz_rpy, types::Float};

#[derive(Debug, Clone, PartialEq)]
pub struct UrdfRobot {
    pub name: String,
    pub links: Vec<UrdfLink>,
    pub joints: Vec<UrdfJoint>,
}

impl UrdfRobot {
    pub fn new(name: impl Into<String>) -> Self {
        UrdfRobot {
            name: name.into(),
            links: vec![],
            joints: vec![],
        }
    }

    pub fn link(&self, name: &str) -> Option<&UrdfLink> {
        self.links.iter().find(|l| l.name == name)
    }

    pub fn joint(&self, name: &str) -> Option<&UrdfJoint> {
        self.joints.iter().find(|j| j.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UrdfOrigin {
    pub xyz: Vector3<Float>,
    pub rpy: Vector3<Float>,
}

impl UrdfOrigin {
    pub fn new(xyz: Vector3<Float>, rpy: Vector3<Float>) -> Self {
        UrdfOrigin { xyz, rpy }
    }

    pub fn to_isometry(&self) -> Isometry3<Float> {
        xyz_rpy(&self.xyz, &self.rpy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UrdfInertia {
    pub ixx: Float,
    pub ixy: Float,
    pub ixz: Float,
    pub iyy: Float,
    pub iyz: Float,
    pub izz: Float,
}

impl UrdfInertia {
    #[rustfmt::skip]
    pub fn to_matrix(&self) -> Matrix3<Float> {
        Matrix3::new(
            self.ixx, self.ixy, self.ixz,
            self.ixy, self.iyy, self.iyz,
            self.ixz, self.iyz, self.izz,
        )
    }
}

/// Mass properties. The inertia tensor is about the center of mass, in the
/// frame given by `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UrdfInertial {
    pub origin: UrdfOrigin,
    pub mass: Float,
    pub inertia: UrdfInertia,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UrdfGeometry {
    Box { size: Vector3<Float> },
    Cylinder { radius: Float, length: Float },
    Sphere { radius: Float },
    Mesh {
        filename: String,
        scale: Option<Vector3<Float>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrdfVisual {
    pub name: Option<String>,
    pub origin: UrdfOrigin,
    pub geometry: UrdfGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrdfCollision {
    pub name: Option<String>,
    pub origin: UrdfOrigin,
    pub geometry: UrdfGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrdfLink {
    pub name: String,
    pub inertial: Option<UrdfInertial>,
    pub visuals: Vec<UrdfVisual>,
    pub collisions: Vec<UrdfCollision>,
}

impl UrdfLink {
    pub fn new(name: impl Into<String>) -> Self {
        UrdfLink {
            name: name.into(),
            inertial: None,
            visuals: vec![],
            collisions: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrdfJointType {
    Revolute,
    Continuous,
    Prismatic,
    Fixed,
    Floating,
    Planar,
}

impl UrdfJointType {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "revolute" => Some(UrdfJointType::Revolute),
            "continuous" => Some(UrdfJointType::Continuous),
            "prismatic" => Some(UrdfJointType::Prismatic),
            "fixed" => Some(UrdfJointType::Fixed),
            "floating" => Some(UrdfJointType::Floating),
            "planar" => Some(UrdfJointType::Planar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrdfJointLimit {
    pub lower: Float,
    pub upper: Float,
    pub effort: Float,
    pub velocity: Float,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrdfJointDynamics {
    pub damping: Float,
    pub friction: Float,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrdfJoint {
    pub name: String,
    pub joint_type: UrdfJointType,
    pub parent: String,
    pub child: String,
    pub origin: UrdfOrigin,
    pub axis: Vector3<Float>,
    pub limit: Option<UrdfJointLimit>,
    pub dynamics: Option<UrdfJointDynamics>,
}
