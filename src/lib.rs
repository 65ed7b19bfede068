#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod center_of_mass;
pub mod config;
pub mod configuration;
pub mod data;
pub mod dynamics;
pub mod error;
#[cfg(feature = "geometry")]
pub mod geometry;
pub mod inertia;
pub mod jacobian;
pub mod joint;
pub mod kinematics;
pub mod model;
pub mod momentum;
pub mod parser;
pub mod plot;
pub mod robot_wrapper;
pub mod spatial;
pub mod types;
pub mod util;
pub mod viewer;

// Wasm bindings
#[cfg(target_arch = "wasm32")]
pub mod interface;

pub use error::{Error, Result};
pub use kinematics::KinematicsLevel;
pub use robot_wrapper::{ComResult, RobotWrapper};

pub const GRAVITY: Float = 9.81;

pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * PI;
