pub mod explog;
pub mod geometric_jacobian;
pub mod spatial_vector;
pub mod transform;
pub mod wrench;
