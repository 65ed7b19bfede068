use na::{Isometry3, Matrix3xX};

use crate::{spatial::geometric_jacobian::GeometricJacobian, types::Float};

/// A joint without degrees of freedom. Only the universe uses it: fixed
/// URDF joints are merged into their parent body.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedJoint;

impl FixedJoint {
    pub fn transform(&self) -> Isometry3<Float> {
        Isometry3::identity()
    }

    pub fn motion_subspace(&self) -> GeometricJacobian {
        GeometricJacobian {
            angular: Matrix3xX::zeros(0),
            linear: Matrix3xX::zeros(0),
        }
    }
}
