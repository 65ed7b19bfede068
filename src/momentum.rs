use na::{DMatrix, Matrix3xX};

use crate::{
    inertia::SpatialInertia, spatial::geometric_jacobian::GeometricJacobian, types::Float,
    util::colwise_cross,
};

/// A momentum matrix maps a joint velocity vector to a momentum.
/// Both operands must be expressed in the same frame.
pub struct MomentumMatrix {
    pub angular: Matrix3xX<Float>,
    pub linear: Matrix3xX<Float>,
}

impl MomentumMatrix {
    // Computes the momentum matrix given spatial inertia and jacobian
    pub fn mul(inertia: &SpatialInertia, jacobian: &GeometricJacobian) -> MomentumMatrix {
        let Jw = &jacobian.angular;
        let Jv = &jacobian.linear;
        let J = inertia.moment;
        let m = inertia.mass;
        let c = inertia.cross_part;

        let ang = J * Jw + colwise_cross(&c, Jv);
        let lin = m * Jv - colwise_cross(&c, Jw);

        MomentumMatrix {
            angular: ang,
            linear: lin,
        }
    }

    /// Jᵀ · self, a block of the joint-space inertia matrix
    pub fn transpose_mul(&self, jacobian: &GeometricJacobian) -> DMatrix<Float> {
        jacobian.angular.transpose() * &self.angular + jacobian.linear.transpose() * &self.linear
    }
}
