use fixed::FixedJoint;
use floating::FloatingJoint;
use na::Isometry3;
use planar::PlanarJoint;
use prismatic::PrismaticJoint;
use rand::Rng;
use revolute::RevoluteJoint;
use serde::{Deserialize, Serialize};

use crate::{
    spatial::{geometric_jacobian::GeometricJacobian, spatial_vector::SpatialVector},
    types::Float,
};

pub mod fixed;
pub mod floating;
pub mod planar;
pub mod prismatic;
pub mod revolute;

/// Joint attaching the root link of a description to the universe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootJoint {
    FreeFlyer,
    Planar,
}

impl RootJoint {
    pub fn model(&self) -> JointModel {
        match self {
            RootJoint::FreeFlyer => JointModel::FreeFlyer(FloatingJoint),
            RootJoint::Planar => JointModel::Planar(PlanarJoint),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JointModel {
    Revolute(RevoluteJoint),
    Prismatic(PrismaticJoint),
    FreeFlyer(FloatingJoint),
    Planar(PlanarJoint),
    Fixed(FixedJoint),
}

impl JointModel {
    pub fn nq(&self) -> usize {
        match self {
            JointModel::Revolute(_) | JointModel::Prismatic(_) => 1,
            JointModel::FreeFlyer(_) => 7,
            JointModel::Planar(_) => 3,
            JointModel::Fixed(_) => 0,
        }
    }

    pub fn nv(&self) -> usize {
        match self {
            JointModel::Revolute(_) | JointModel::Prismatic(_) => 1,
            JointModel::FreeFlyer(_) => 6,
            JointModel::Planar(_) => 3,
            JointModel::Fixed(_) => 0,
        }
    }

    pub fn shortname(&self) -> &'static str {
        match self {
            JointModel::Revolute(j) if j.unbounded => "continuous",
            JointModel::Revolute(_) => "revolute",
            JointModel::Prismatic(_) => "prismatic",
            JointModel::FreeFlyer(_) => "free_flyer",
            JointModel::Planar(_) => "planar",
            JointModel::Fixed(_) => "fixed",
        }
    }

    /// Number of leading configuration entries sampled from the position
    /// limits by [`JointModel::random_configuration`]. These limits must be
    /// finite.
    pub fn bounded_nq(&self) -> usize {
        match self {
            JointModel::Revolute(j) if j.unbounded => 0,
            JointModel::Revolute(_) | JointModel::Prismatic(_) => 1,
            JointModel::FreeFlyer(_) => 3,
            JointModel::Planar(_) => 2,
            JointModel::Fixed(_) => 0,
        }
    }

    /// Transform from successor frame to predecessor frame, excluding the
    /// joint placement
    pub fn transform(&self, q: &[Float]) -> Isometry3<Float> {
        match self {
            JointModel::Revolute(j) => j.transform(q),
            JointModel::Prismatic(j) => j.transform(q),
            JointModel::FreeFlyer(j) => j.transform(q),
            JointModel::Planar(j) => j.transform(q),
            JointModel::Fixed(j) => j.transform(),
        }
    }

    /// Motion subspace S expressed in the successor frame
    pub fn motion_subspace(&self) -> GeometricJacobian {
        match self {
            JointModel::Revolute(j) => j.motion_subspace(),
            JointModel::Prismatic(j) => j.motion_subspace(),
            JointModel::FreeFlyer(j) => j.motion_subspace(),
            JointModel::Planar(j) => j.motion_subspace(),
            JointModel::Fixed(j) => j.motion_subspace(),
        }
    }

    /// Successor twist relative to predecessor, in the successor frame: S·v
    pub fn joint_velocity(&self, v: &[Float]) -> SpatialVector {
        self.motion_subspace().mul_vec(&v[..self.nv()])
    }

    pub fn integrate(&self, q: &[Float], v: &[Float], out: &mut [Float]) {
        match self {
            JointModel::FreeFlyer(j) => j.integrate(q, v, out),
            JointModel::Planar(j) => j.integrate(q, v, out),
            _ => {
                for i in 0..self.nq() {
                    out[i] = q[i] + v[i];
                }
            }
        }
    }

    pub fn difference(&self, q0: &[Float], q1: &[Float], out: &mut [Float]) {
        match self {
            JointModel::FreeFlyer(j) => j.difference(q0, q1, out),
            JointModel::Planar(j) => j.difference(q0, q1, out),
            _ => {
                for i in 0..self.nv() {
                    out[i] = q1[i] - q0[i];
                }
            }
        }
    }

    /// Point at fraction u along the geodesic from q0 to q1
    pub fn interpolate(&self, q0: &[Float], q1: &[Float], u: Float, out: &mut [Float]) {
        match self {
            JointModel::FreeFlyer(_) | JointModel::Planar(_) => {
                let mut v = vec![0.; self.nv()];
                self.difference(q0, q1, &mut v);
                v.iter_mut().for_each(|x| *x *= u);
                self.integrate(q0, &v, out);
            }
            _ => {
                for i in 0..self.nq() {
                    out[i] = (1. - u) * q0[i] + u * q1[i];
                }
            }
        }
    }

    pub fn neutral(&self, out: &mut [Float]) {
        match self {
            JointModel::FreeFlyer(j) => j.neutral(out),
            _ => out[..self.nq()].fill(0.),
        }
    }

    /// Draw a configuration. The first [`JointModel::bounded_nq`] limits must
    /// be finite.
    pub fn random_configuration<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lower: &[Float],
        upper: &[Float],
        out: &mut [Float],
    ) {
        match self {
            JointModel::Revolute(j) => j.random_configuration(rng, lower, upper, out),
            JointModel::Prismatic(_) => out[0] = rng.random_range(lower[0]..=upper[0]),
            JointModel::FreeFlyer(j) => j.random_configuration(rng, lower, upper, out),
            JointModel::Planar(j) => j.random_configuration(rng, lower, upper, out),
            JointModel::Fixed(_) => {}
        }
    }

    pub fn normalize(&self, q: &mut [Float]) {
        if let JointModel::FreeFlyer(j) = self {
            j.normalize(q);
        }
    }
}
