use std::{
    cell::{Ref, RefCell},
    collections::HashMap,
    rc::Rc,
};

use super::{Gui, ViewerError, WindowId};
use crate::types::Float;

/// Everything a [`SceneRecorder`] was asked to show
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub windows: Vec<String>,
    pub scenes: Vec<String>,
    pub scene_windows: Vec<(String, WindowId)>,
    /// (node, urdf path, mesh dir)
    pub urdfs: Vec<(String, String, String)>,
    /// Last configuration applied to each node
    pub configurations: HashMap<String, [Float; 7]>,
    pub refreshes: usize,
}

/// An in-memory viewer. Clones share the same [`Scene`], so a test can keep
/// one while the robot owns another.
#[derive(Clone, Debug, Default)]
pub struct SceneRecorder {
    scene: Rc<RefCell<Scene>>,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> Ref<'_, Scene> {
        self.scene.borrow()
    }
}

impl Gui for SceneRecorder {
    fn get_window_id(&mut self, name: &str) -> Result<Option<WindowId>, ViewerError> {
        let scene = self.scene.borrow();
        Ok(scene
            .windows
            .iter()
            .position(|w| w == name)
            .map(|i| i as WindowId))
    }

    fn create_window(&mut self, name: &str) -> Result<WindowId, ViewerError> {
        let mut scene = self.scene.borrow_mut();
        scene.windows.push(name.to_string());
        Ok((scene.windows.len() - 1) as WindowId)
    }

    fn create_scene_with_floor(&mut self, name: &str) -> Result<(), ViewerError> {
        self.scene.borrow_mut().scenes.push(name.to_string());
        Ok(())
    }

    fn add_scene_to_window(&mut self, name: &str, window: WindowId) -> Result<(), ViewerError> {
        let mut scene = self.scene.borrow_mut();
        if !scene.scenes.iter().any(|s| s == name) {
            return Err(ViewerError::Remote(format!("no scene named {}", name)));
        }
        scene.scene_windows.push((name.to_string(), window));
        Ok(())
    }

    fn add_urdf(
        &mut self,
        node: &str,
        urdf_path: &str,
        mesh_dir: &str,
    ) -> Result<(), ViewerError> {
        self.scene.borrow_mut().urdfs.push((
            node.to_string(),
            urdf_path.to_string(),
            mesh_dir.to_string(),
        ));
        Ok(())
    }

    fn apply_configuration(
        &mut self,
        node: &str,
        configuration: &[Float; 7],
    ) -> Result<(), ViewerError> {
        self.scene
            .borrow_mut()
            .configurations
            .insert(node.to_string(), *configuration);
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), ViewerError> {
        self.scene.borrow_mut().refreshes += 1;
        Ok(())
    }
}
