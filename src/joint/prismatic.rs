use na::{Isometry3, Matrix3xX, Translation3, UnitQuaternion, UnitVector3};

use crate::{spatial::geometric_jacobian::GeometricJacobian, types::Float};

/// Represents a prismatic joint connecting a predecessor and a successor body.
///
/// Note: joint frame is defined as the successor body frame
#[derive(Clone, Debug, PartialEq)]
pub struct PrismaticJoint {
    pub axis: UnitVector3<Float>, // axis expressed in successor body frame
}

impl PrismaticJoint {
    pub fn new(axis: UnitVector3<Float>) -> Self {
        PrismaticJoint { axis }
    }

    /// Translation along axis by q
    pub fn transform(&self, q: &[Float]) -> Isometry3<Float> {
        Isometry3::from_parts(
            Translation3::from(self.axis.into_inner() * q[0]),
            UnitQuaternion::identity(),
        )
    }

    pub fn motion_subspace(&self) -> GeometricJacobian {
        GeometricJacobian {
            angular: Matrix3xX::zeros(1),
            linear: Matrix3xX::from_column_slice(self.axis.as_slice()),
        }
    }
}
