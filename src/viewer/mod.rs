//! Client side of an external 3D viewer.
//!
//! The viewer holds a tree of named nodes. The robot is loaded under a root
//! node, one child node per link with a visual, and is animated by setting
//! node placements as `[x y z qw qx qy qz]`.

use std::time::Duration;

use thiserror::Error;

use crate::types::Float;

pub mod recorder;
pub mod tcp;

pub use recorder::SceneRecorder;
pub use tcp::TcpGui;

pub type WindowId = i64;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("cannot connect to viewer at {address}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("viewer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed viewer message: {0}")]
    Protocol(String),

    #[error("viewer closed the connection")]
    Disconnected,

    #[error("viewer refused the request: {0}")]
    Remote(String),
}

/// The calls a viewer answers
pub trait Gui {
    /// Id of the window with this name, if it exists
    fn get_window_id(&mut self, name: &str) -> Result<Option<WindowId>, ViewerError>;

    fn create_window(&mut self, name: &str) -> Result<WindowId, ViewerError>;

    fn create_scene_with_floor(&mut self, scene: &str) -> Result<(), ViewerError>;

    fn add_scene_to_window(&mut self, scene: &str, window: WindowId) -> Result<(), ViewerError>;

    /// Load the URDF at `urdf_path` under `node`, meshes looked up in `mesh_dir`
    fn add_urdf(
        &mut self,
        node: &str,
        urdf_path: &str,
        mesh_dir: &str,
    ) -> Result<(), ViewerError>;

    /// Place `node` at `[x y z qw qx qy qz]`
    fn apply_configuration(
        &mut self,
        node: &str,
        configuration: &[Float; 7],
    ) -> Result<(), ViewerError>;

    fn refresh(&mut self) -> Result<(), ViewerError>;
}

/// A connected viewer session
pub struct Viewer {
    pub gui: Box<dyn Gui>,
    pub root_node_name: String,
    pub window_id: Option<WindowId>,
}

impl Viewer {
    pub fn new(gui: Box<dyn Gui>, root_node_name: &str) -> Self {
        Viewer {
            gui,
            root_node_name: root_node_name.to_string(),
            window_id: None,
        }
    }

    /// Node of a body under the root node
    pub fn node_name(&self, body_name: &str) -> String {
        format!("{}/{}", self.root_node_name, body_name)
    }
}

/// How long to sleep after rendering a frame that took `elapsed`, to hold a
/// period of `dt`. None when the frame is already late.
pub fn frame_sleep(dt: Duration, elapsed: Duration) -> Option<Duration> {
    dt.checked_sub(elapsed).filter(|d| !d.is_zero())
}
