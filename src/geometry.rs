//! Visual and collision geometry of a robot, attached to the joints of its
//! [`Model`]. Meshes keep their resolved path and scale; no mesh data is read.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use na::{Isometry3, Vector3};
use tracing::{debug, warn};

use crate::{
    data::Data,
    error::{Error, Result},
    model::Model,
    parser::{
        parse_urdf_str,
        types::{UrdfGeometry, UrdfRobot},
    },
    types::{Float, JointIndex},
};

/// Environment variable listing extra package directories
pub const ROS_PACKAGE_PATH: &str = "ROS_PACKAGE_PATH";

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Mesh { path: PathBuf, scale: Vector3<Float> },
    /// URDF cylinders are loaded as capsules of the same radius and length
    Capsule { radius: Float, length: Float },
    Box { size: Vector3<Float> },
    Sphere { radius: Float },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeometryObject {
    pub name: String,
    pub parent_joint: JointIndex,
    /// Placement in the frame of `parent_joint`
    pub placement: Isometry3<Float>,
    pub shape: Shape,
    pub mesh_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct GeometryModel {
    pub collision_objects: Vec<GeometryObject>,
    pub visual_objects: Vec<GeometryObject>,
}

impl GeometryModel {
    pub fn visual_id(&self, name: &str) -> Option<usize> {
        self.visual_objects.iter().position(|g| g.name == name)
    }

    pub fn collision_id(&self, name: &str) -> Option<usize> {
        self.collision_objects.iter().position(|g| g.name == name)
    }
}

/// World placements of the objects of a [`GeometryModel`]
#[derive(Clone, Debug)]
pub struct GeometryData {
    pub o_mg_collisions: Vec<Isometry3<Float>>,
    pub o_mg_visuals: Vec<Isometry3<Float>>,
}

impl GeometryData {
    pub fn new(geom_model: &GeometryModel) -> Self {
        GeometryData {
            o_mg_collisions: vec![Isometry3::identity(); geom_model.collision_objects.len()],
            o_mg_visuals: vec![Isometry3::identity(); geom_model.visual_objects.len()],
        }
    }

    /// Place every object from the joint placements in `data`, which must be
    /// up to date.
    pub fn update_placements(&mut self, geom_model: &GeometryModel, data: &Data) {
        let place = |g: &GeometryObject| data.o_mi[g.parent_joint] * g.placement;
        self.o_mg_collisions = geom_model.collision_objects.iter().map(place).collect();
        self.o_mg_visuals = geom_model.visual_objects.iter().map(place).collect();
    }
}

/// Load the geometry of the URDF at `path` for `model`, built from the same
/// file.
///
/// `package://` meshes are searched in `package_dirs`, then in the entries of
/// `ROS_PACKAGE_PATH`.
pub fn build_geom_from_urdf(
    model: &Model,
    path: impl AsRef<Path>,
    package_dirs: &[PathBuf],
) -> Result<GeometryModel> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let robot = parse_urdf_str(&xml)?;
    let urdf_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_geom(model, &robot, urdf_dir, &hint_directories(package_dirs))
}

fn hint_directories(package_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = package_dirs.to_vec();
    if let Some(paths) = env::var_os(ROS_PACKAGE_PATH) {
        dirs.extend(env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
    }
    dirs
}

fn build_geom(
    model: &Model,
    robot: &UrdfRobot,
    urdf_dir: &Path,
    hints: &[PathBuf],
) -> Result<GeometryModel> {
    let mut geom_model = GeometryModel::default();

    for link in &robot.links {
        let Some((parent_joint, link_placement)) = model.frame_of_link(&link.name) else {
            warn!(link = %link.name, "link is not part of the model, skipping its geometry");
            continue;
        };

        let shapes = link
            .visuals
            .iter()
            .map(|v| (&v.name, &v.origin, &v.geometry, true))
            .chain(
                link.collisions
                    .iter()
                    .map(|c| (&c.name, &c.origin, &c.geometry, false)),
            );

        let (mut nvisual, mut ncollision) = (0, 0);
        for (name, origin, geometry, visual) in shapes {
            let counter = if visual { &mut nvisual } else { &mut ncollision };
            let name = name
                .clone()
                .unwrap_or_else(|| format!("{}_{}", link.name, counter));
            *counter += 1;

            let shape = to_shape(geometry, urdf_dir, hints)?;
            let mesh_path = match &shape {
                Shape::Mesh { path, .. } => Some(path.clone()),
                _ => None,
            };
            let object = GeometryObject {
                name,
                parent_joint,
                placement: link_placement * origin.to_isometry(),
                shape,
                mesh_path,
            };
            if visual {
                geom_model.visual_objects.push(object);
            } else {
                geom_model.collision_objects.push(object);
            }
        }
    }

    debug!(
        nvisual = geom_model.visual_objects.len(),
        ncollision = geom_model.collision_objects.len(),
        "built geometry model"
    );
    Ok(geom_model)
}

fn to_shape(geometry: &UrdfGeometry, urdf_dir: &Path, hints: &[PathBuf]) -> Result<Shape> {
    Ok(match geometry {
        UrdfGeometry::Box { size } => Shape::Box { size: *size },
        UrdfGeometry::Cylinder { radius, length } => Shape::Capsule {
            radius: *radius,
            length: *length,
        },
        UrdfGeometry::Sphere { radius } => Shape::Sphere { radius: *radius },
        UrdfGeometry::Mesh { filename, scale } => Shape::Mesh {
            path: resolve_mesh(filename, urdf_dir, hints)?,
            scale: scale.unwrap_or_else(|| Vector3::repeat(1.)),
        },
    })
}

/// Locate a mesh file name as written in a URDF
pub fn resolve_mesh(filename: &str, urdf_dir: &Path, hints: &[PathBuf]) -> Result<PathBuf> {
    if let Some(relative) = filename.strip_prefix("package://") {
        if hints.is_empty() {
            return Err(Error::NoPackageDirs(filename.to_string()));
        }
        let searched: Vec<PathBuf> = hints.iter().map(|dir| dir.join(relative)).collect();
        return searched
            .iter()
            .find(|candidate| candidate.exists())
            .cloned()
            .ok_or_else(|| Error::MeshNotFound {
                mesh: filename.to_string(),
                searched: searched.clone(),
            });
    }

    let path = Path::new(filename.strip_prefix("file://").unwrap_or(filename));
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(urdf_dir.join(path))
    }
}
