use na::DVector;
use wasm_bindgen::prelude::*;
use web_sys::js_sys::{Float32Array, Float64Array};

use crate::{
    center_of_mass::center_of_mass,
    configuration,
    data::Data,
    dynamics::{compute_generalized_gravity, crba},
    joint::RootJoint,
    kinematics::{forward_kinematics, KinematicsLevel},
    model::Model,
    parser::build_model_from_urdf_str,
    spatial::transform::IsometryExt,
    types::Float,
};

/// WebAssembly interface to a robot model and its data.
#[wasm_bindgen]
pub struct InterfaceRobot {
    model: Model,
    data: Data,
}

#[wasm_bindgen]
impl InterfaceRobot {
    /// Build a robot from URDF text. A `floating` robot gets a free-flyer
    /// root joint.
    pub fn fromUrdf(xml: &str, floating: bool) -> Result<InterfaceRobot, JsValue> {
        console_error_panic_hook::set_once();

        let root_joint = floating.then_some(RootJoint::FreeFlyer);
        let model = build_model_from_urdf_str(xml, root_joint)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let data = model.create_data();
        Ok(InterfaceRobot { model, data })
    }

    pub fn nq(&self) -> usize {
        self.model.nq
    }

    pub fn nv(&self) -> usize {
        self.model.nv
    }

    pub fn neutral(&self) -> Float64Array {
        Float64Array::from(configuration::neutral(&self.model).as_slice())
    }

    pub fn increment(&self, q: &[Float], dq: &[Float]) -> Float64Array {
        let mut q = DVector::from_column_slice(q);
        configuration::increment(&mut q, &DVector::from_column_slice(dq));
        Float64Array::from(q.as_slice())
    }

    pub fn com(&mut self, q: &[Float]) -> Float64Array {
        let q = DVector::from_column_slice(q);
        let com = center_of_mass(
            &self.model,
            &mut self.data,
            KinematicsLevel::Position(&q),
            true,
        );
        Float64Array::from(com.as_slice())
    }

    /// Mass matrix, column major
    pub fn mass(&mut self, q: &[Float]) -> Float64Array {
        let m = crba(&self.model, &mut self.data, &DVector::from_column_slice(q));
        Float64Array::from(m.as_slice())
    }

    pub fn gravity(&mut self, q: &[Float]) -> Float64Array {
        let g = compute_generalized_gravity(
            &self.model,
            &mut self.data,
            &DVector::from_column_slice(q),
        );
        Float64Array::from(g.as_slice())
    }

    /// World `[x y z qx qy qz qw]` of every body with a visual, moving
    /// bodies first, then fixed bodies
    #[wasm_bindgen(js_name = visualPoses)]
    pub fn visual_poses(&mut self, q: &[Float]) -> Float32Array {
        let q = DVector::from_column_slice(q);
        forward_kinematics(&self.model, &mut self.data, KinematicsLevel::Position(&q));

        let moving = (1..self.model.nbodies())
            .filter(|&i| self.model.has_visual[i])
            .map(|i| self.data.o_mi[i]);
        let fixed = self
            .model
            .fixed_bodies
            .iter()
            .filter(|b| b.has_visual)
            .map(|b| self.data.o_mi[b.last_moving_parent] * b.placement);

        let poses: Vec<f32> = moving
            .chain(fixed)
            .flat_map(|pose| pose.to_xyzquat())
            .map(|x| x as f32)
            .collect();
        Float32Array::from(poses.as_slice())
    }
}
