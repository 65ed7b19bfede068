pub type Float = f64;

/// Index of a joint in a [`Model`](crate::model::Model). Index 0 is the universe.
pub type JointIndex = usize;
