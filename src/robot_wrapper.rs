//! A robot loaded from a URDF, with named accessors for its kinematic and
//! dynamic quantities and an optional viewer to play motions in.

use std::{
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use na::{DMatrix, DVector, Isometry3, Matrix3xX, Vector3};
use tracing::{debug, warn};

use crate::{
    center_of_mass::{center_of_mass, jacobian_center_of_mass},
    config::ViewerConfig,
    configuration,
    data::Data,
    dynamics::{compute_generalized_gravity, crba, nonlinear_effects},
    error::{Error, Result},
    jacobian::{compute_jacobians, joint_jacobian},
    joint::RootJoint,
    kinematics::{forward_kinematics, KinematicsLevel},
    model::Model,
    parser::build_model_from_urdf,
    spatial::{spatial_vector::SpatialVector, transform::IsometryExt},
    types::{Float, JointIndex},
    util::xyzquat_to_viewer_configuration,
    viewer::{frame_sleep, Gui, TcpGui, Viewer, ViewerError},
};

cfg_if::cfg_if! {
    if #[cfg(feature = "geometry")] {
        use crate::geometry::{build_geom_from_urdf, GeometryData, GeometryModel};

        /// Visual and collision geometry of the robot, with its world placements
        pub struct Geometry {
            pub model: GeometryModel,
            pub data: GeometryData,
        }

        fn load_geometry<P: AsRef<Path>>(
            model: &Model,
            filename: &Path,
            package_dirs: Option<&[P]>,
        ) -> Result<Geometry> {
            let dirs = match package_dirs {
                Some(dirs) => validate_package_dirs(dirs)?,
                None => vec![],
            };
            let geometry_model = build_geom_from_urdf(model, filename, &dirs)?;
            let geometry_data = GeometryData::new(&geometry_model);
            Ok(Geometry {
                model: geometry_model,
                data: geometry_data,
            })
        }

        /// Every entry must be a non-empty path with a UTF-8 spelling
        fn validate_package_dirs<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<PathBuf>> {
            dirs.iter()
                .enumerate()
                .map(|(index, dir)| {
                    let dir = dir.as_ref();
                    if dir.as_os_str().is_empty() || dir.to_str().is_none() {
                        return Err(Error::InvalidPackageDirs {
                            index,
                            entry: dir.to_path_buf(),
                        });
                    }
                    Ok(dir.to_path_buf())
                })
                .collect()
        }
    } else {
        /// Geometry is compiled out of this build
        pub struct Geometry;

        fn load_geometry<P: AsRef<Path>>(
            _model: &Model,
            _filename: &Path,
            _package_dirs: Option<&[P]>,
        ) -> Result<Geometry> {
            Err(Error::GeometryUnsupported)
        }
    }
}

/// Center of mass, with as many time derivatives as the level asked for
#[derive(Clone, Debug, PartialEq)]
pub enum ComResult {
    Position(Vector3<Float>),
    PositionVelocity(Vector3<Float>, Vector3<Float>),
    Full(Vector3<Float>, Vector3<Float>, Vector3<Float>),
}

impl ComResult {
    pub fn position(&self) -> &Vector3<Float> {
        match self {
            ComResult::Position(c)
            | ComResult::PositionVelocity(c, _)
            | ComResult::Full(c, _, _) => c,
        }
    }
}

pub struct RobotWrapper {
    pub model: Model,
    pub data: Data,
    pub geometry: Geometry,
    pub model_filename: PathBuf,
    /// Zero velocity
    pub v0: DVector<Float>,
    /// Neutral configuration
    pub q0: DVector<Float>,
    pub viewer: Option<Viewer>,
}

impl RobotWrapper {
    /// Load the robot in `filename`. `package_dirs` are searched, before
    /// `ROS_PACKAGE_PATH`, for `package://` meshes. With a `root_joint` the
    /// robot base moves freely through it.
    pub fn new<P: AsRef<Path>>(
        filename: impl AsRef<Path>,
        package_dirs: Option<&[P]>,
        root_joint: Option<RootJoint>,
    ) -> Result<Self> {
        let filename = filename.as_ref();
        let model = build_model_from_urdf(filename, root_joint)?;
        let data = model.create_data();
        let geometry = load_geometry(&model, filename, package_dirs)?;

        let v0 = DVector::zeros(model.nv);
        let q0 = configuration::neutral(&model);
        debug!(file = %filename.display(), nq = model.nq, nv = model.nv, "loaded robot");

        Ok(RobotWrapper {
            model,
            data,
            geometry,
            model_filename: filename.to_path_buf(),
            v0,
            q0,
            viewer: None,
        })
    }

    pub fn nq(&self) -> usize {
        self.model.nq
    }

    pub fn nv(&self) -> usize {
        self.model.nv
    }

    /// Move `q` by `dq` in place. See [`configuration::increment`].
    pub fn increment(&self, q: &mut DVector<Float>, dq: &DVector<Float>) {
        configuration::increment(q, dq);
    }

    pub fn com(&mut self, level: KinematicsLevel, update_kinematics: bool) -> ComResult {
        let com = center_of_mass(&self.model, &mut self.data, level, update_kinematics);
        match level {
            KinematicsLevel::Position(_) => ComResult::Position(com),
            KinematicsLevel::Velocity(..) => ComResult::PositionVelocity(com, self.data.vcom[0]),
            KinematicsLevel::Acceleration(..) => {
                ComResult::Full(com, self.data.vcom[0], self.data.acom[0])
            }
        }
    }

    pub fn jcom(&mut self, q: &DVector<Float>) -> Matrix3xX<Float> {
        jacobian_center_of_mass(&self.model, &mut self.data, q)
    }

    /// Joint-space mass matrix
    pub fn mass(&mut self, q: &DVector<Float>) -> DMatrix<Float> {
        crba(&self.model, &mut self.data, q)
    }

    /// Coriolis, centrifugal and gravity torques
    pub fn bias(&mut self, q: &DVector<Float>, v: &DVector<Float>) -> DVector<Float> {
        nonlinear_effects(&self.model, &mut self.data, q, v)
    }

    pub fn gravity(&mut self, q: &DVector<Float>) -> DVector<Float> {
        compute_generalized_gravity(&self.model, &mut self.data, q)
    }

    pub fn forward_kinematics(&mut self, level: KinematicsLevel) {
        forward_kinematics(&self.model, &mut self.data, level);
    }

    /// World placement of joint `index`
    pub fn position(
        &mut self,
        q: &DVector<Float>,
        index: JointIndex,
        update_kinematics: bool,
    ) -> Isometry3<Float> {
        if update_kinematics {
            self.forward_kinematics(KinematicsLevel::Position(q));
        }
        self.data.o_mi[index]
    }

    /// Velocity of joint `index`, in its own frame
    pub fn velocity(
        &mut self,
        q: &DVector<Float>,
        v: &DVector<Float>,
        index: JointIndex,
        update_kinematics: bool,
    ) -> SpatialVector {
        if update_kinematics {
            self.forward_kinematics(KinematicsLevel::Velocity(q, v));
        }
        self.data.v[index]
    }

    /// Acceleration of joint `index`, in its own frame
    pub fn acceleration(
        &mut self,
        q: &DVector<Float>,
        v: &DVector<Float>,
        a: &DVector<Float>,
        index: JointIndex,
        update_kinematics: bool,
    ) -> SpatialVector {
        if update_kinematics {
            self.forward_kinematics(KinematicsLevel::Acceleration(q, v, a));
        }
        self.data.a[index]
    }

    pub fn jacobian(
        &mut self,
        q: &DVector<Float>,
        index: JointIndex,
        update_kinematics: bool,
        local_frame: bool,
    ) -> DMatrix<Float> {
        joint_jacobian(
            &self.model,
            &mut self.data,
            q,
            index,
            local_frame,
            update_kinematics,
        )
    }

    pub fn compute_jacobians(&mut self, q: &DVector<Float>) -> DMatrix<Float> {
        compute_jacobians(&self.model, &mut self.data, q).clone()
    }

    pub fn index(&self, name: &str) -> Result<JointIndex> {
        self.model
            .index(name)
            .ok_or_else(|| Error::UnknownName(name.to_string()))
    }

    #[cfg(feature = "geometry")]
    pub fn geometry_model(&self) -> &GeometryModel {
        &self.geometry.model
    }

    #[cfg(feature = "geometry")]
    pub fn geometry_data(&self) -> &GeometryData {
        &self.geometry.data
    }

    /// Refresh the world placements of the geometry objects from `q`
    #[cfg(feature = "geometry")]
    pub fn update_geometry_placements(&mut self, q: &DVector<Float>) {
        forward_kinematics(&self.model, &mut self.data, KinematicsLevel::Position(q));
        self.geometry.data.update_placements(&self.geometry.model, &self.data);
    }

    fn viewer_root_node_name(&self) -> String {
        match &self.viewer {
            Some(viewer) => viewer.root_node_name.clone(),
            None => ViewerConfig::default().root_node_name,
        }
    }

    /// Viewer node of the moving body `index`
    pub fn viewer_node_name(&self, index: JointIndex) -> Result<String> {
        let name = &self.model.body_names[index];
        if !self.model.has_visual[index] {
            return Err(Error::NoVisual(name.clone()));
        }
        Ok(format!("{}/{}", self.viewer_root_node_name(), name))
    }

    /// Viewer node of the fixed body `index`
    pub fn viewer_fixed_node_name(&self, index: usize) -> Result<String> {
        let body = &self.model.fixed_bodies[index];
        if !body.has_visual {
            return Err(Error::NoVisual(body.name.clone()));
        }
        Ok(format!("{}/{}", self.viewer_root_node_name(), body.name))
    }

    pub fn has_viewer(&self) -> bool {
        self.viewer.is_some()
    }

    /// Connect to the viewer at `config.address`. On failure a warning is
    /// logged and the robot is left without a viewer.
    pub fn init_display(&mut self, config: &ViewerConfig) {
        self.init_display_with(
            |config| TcpGui::connect(config).map(|gui| Box::new(gui) as Box<dyn Gui>),
            config,
        );
    }

    /// Like [`RobotWrapper::init_display`], with the viewer built by
    /// `connector`
    pub fn init_display_with<F>(&mut self, connector: F, config: &ViewerConfig)
    where
        F: FnOnce(&ViewerConfig) -> std::result::Result<Box<dyn Gui>, ViewerError>,
    {
        let gui = match connector(config) {
            Ok(gui) => gui,
            Err(e) => {
                warn!(
                    error = %e,
                    "Error while starting the viewer client. \
                     Check whether the viewer is properly started"
                );
                self.viewer = None;
                return;
            }
        };
        self.viewer = Some(Viewer::new(gui, &config.root_node_name));

        if config.load_model {
            let loaded = self.load_display_model(
                &config.root_node_name,
                &config.window_name,
                config.mesh_dir.as_deref(),
            );
            if let Err(e) = loaded {
                warn!(error = %e, "could not load the robot in the viewer");
                self.viewer = None;
            }
        }
    }

    /// Create the viewer window and load the robot under `node_name`.
    /// Meshes are looked up in `mesh_dir`, by default next to the URDF.
    pub fn load_display_model(
        &mut self,
        node_name: &str,
        window_name: &str,
        mesh_dir: Option<&str>,
    ) -> Result<()> {
        let Some(viewer) = self.viewer.as_mut() else {
            warn!("no viewer to load the model in");
            return Ok(());
        };

        // Some viewers answer a lookup of a missing window with an error
        match viewer.gui.get_window_id(window_name) {
            Ok(Some(id)) => {
                viewer.window_id = Some(id);
                warn!(
                    window = window_name,
                    "Window already created. Cannot (re-)load the model."
                );
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => debug!(window = window_name, error = %e, "no window found, creating it"),
        }

        let id = viewer.gui.create_window(window_name)?;
        viewer.window_id = Some(id);

        let mesh_dir = match mesh_dir {
            Some(dir) => dir.to_string(),
            None => {
                let dir = self.model_filename.parent().unwrap_or_else(|| Path::new("."));
                format!("{}/", dir.display())
            }
        };

        viewer.gui.create_scene_with_floor("world")?;
        viewer.gui.add_scene_to_window("world", id)?;
        viewer.gui.add_urdf(
            node_name,
            &self.model_filename.to_string_lossy(),
            &mesh_dir,
        )?;
        Ok(())
    }

    /// Show the robot at configuration `q`
    pub fn display(&mut self, q: &DVector<Float>) -> Result<()> {
        if self.viewer.is_none() {
            return Ok(());
        }
        forward_kinematics(&self.model, &mut self.data, KinematicsLevel::Position(q));

        let Some(viewer) = self.viewer.as_mut() else {
            return Ok(());
        };
        for i in 1..self.model.nbodies() {
            if !self.model.has_visual[i] {
                continue;
            }
            let pose = xyzquat_to_viewer_configuration(&self.data.o_mi[i].to_xyzquat());
            let node = viewer.node_name(&self.model.body_names[i]);
            viewer.gui.apply_configuration(&node, &pose)?;
        }
        for body in self.model.fixed_bodies.iter().filter(|b| b.has_visual) {
            let o_mb = self.data.o_mi[body.last_moving_parent] * body.placement;
            let pose = xyzquat_to_viewer_configuration(&o_mb.to_xyzquat());
            let node = viewer.node_name(&body.name);
            viewer.gui.apply_configuration(&node, &pose)?;
        }
        viewer.gui.refresh()?;
        Ok(())
    }

    /// Display each column of `trajectory` in turn, `dt` seconds apart
    pub fn play(&mut self, trajectory: &DMatrix<Float>, dt: Float) -> Result<()> {
        let period = Duration::try_from_secs_f64(dt).unwrap_or_default();
        for k in 0..trajectory.ncols() {
            let start = Instant::now();
            self.display(&trajectory.column(k).into_owned())?;
            if let Some(pause) = frame_sleep(period, start.elapsed()) {
                thread::sleep(pause);
            }
        }
        Ok(())
    }
}


#[cfg(all(test, not(feature = "geometry")))]
mod robot_wrapper_no_geometry_tests {
    use super::*;
    use crate::util::test_utils::SIMPLE_ARM_URDF;

    #[test]
    fn loading_needs_geometry_support() {
        let result = RobotWrapper::new::<PathBuf>(SIMPLE_ARM_URDF, None, None);
        assert!(matches!(result, Err(Error::GeometryUnsupported)));
    }
}
